use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::mpsc;
use std::thread;

use styrene_arbiter::{Arbiter, ArbiterConfig, FieldTable, NetworkObject};

fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .is_test(true)
        .try_init();
}

#[derive(Debug, Default, PartialEq)]
struct Announce {
    hops: i8,
    online: bool,
    node: String,
    note: Option<String>,
}

impl NetworkObject for Announce {
    fn describe(table: &mut FieldTable<Self>) {
        table
            .field("hops", 1, |a| &a.hops, |a| &mut a.hops)
            .field("online", 2, |a| &a.online, |a| &mut a.online)
            .field("node", 3, |a| &a.node, |a| &mut a.node)
            .optional("note", 4, |a| &a.note, |a| &mut a.note);
    }
}

#[derive(Debug, Default, PartialEq)]
struct Other {
    value: i32,
}

impl NetworkObject for Other {
    fn describe(table: &mut FieldTable<Self>) {
        table.field("value", 1, |o| &o.value, |o| &mut o.value);
    }
}

/// One direction of a socket pair: writes go to a channel, reads drain the
/// peer's channel in whatever chunks arrive.
struct PipeEnd {
    tx: mpsc::Sender<Vec<u8>>,
    rx: mpsc::Receiver<Vec<u8>>,
    pending: VecDeque<u8>,
}

fn pipe() -> (PipeEnd, PipeEnd) {
    let (a_tx, b_rx) = mpsc::channel();
    let (b_tx, a_rx) = mpsc::channel();
    (
        PipeEnd { tx: a_tx, rx: a_rx, pending: VecDeque::new() },
        PipeEnd { tx: b_tx, rx: b_rx, pending: VecDeque::new() },
    )
}

impl Read for PipeEnd {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            match self.rx.recv() {
                Ok(chunk) => self.pending.extend(chunk),
                Err(_) => return Ok(0),
            }
        }
        let len = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..len)) {
            *slot = byte;
        }
        Ok(len)
    }
}

impl Write for PipeEnd {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Split writes so the reader sees partial envelopes.
        for chunk in buf.chunks(5) {
            self.tx
                .send(chunk.to_vec())
                .map_err(|_| io::Error::from(io::ErrorKind::BrokenPipe))?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn records_cross_threads_over_a_chunked_pipe() {
    init_logging();
    let (left, right) = pipe();
    let config = ArbiterConfig { log_envelopes: true, ..ArbiterConfig::default() };

    let echo = thread::spawn(move || {
        let mut arbiter = Arbiter::with_config(right, config);
        let received: Announce = arbiter.receive_object().expect("receive");
        let reply = Announce { hops: received.hops + 1, ..received };
        arbiter.send_object(&reply).expect("reply");
    });

    let mut arbiter = Arbiter::new(left);
    let outbound = Announce {
        hops: 2,
        online: true,
        node: "a1b2c3".into(),
        note: Some("relay".into()),
    };
    arbiter.send_object(&outbound).expect("send");
    let reply: Announce = arbiter.receive_object().expect("reply");
    echo.join().expect("echo thread");

    assert_eq!(reply.hops, 3);
    assert_eq!(reply.node, "a1b2c3");
    assert_eq!(reply.note.as_deref(), Some("relay"));
}

#[test]
fn receiver_with_different_schema_rejects() {
    init_logging();
    let (left, right) = pipe();
    let mut sender = Arbiter::new(left);
    let mut receiver = Arbiter::new(right);

    sender.send_object(&Other { value: 7 }).expect("send");
    let err = receiver.receive_object::<Announce>().expect_err("mismatch");
    assert!(err.is_mismatch());
}

#[test]
fn dropped_peer_surfaces_as_transport_error() {
    init_logging();
    let (left, right) = pipe();
    drop(left);
    let mut receiver = Arbiter::new(right);
    let err = receiver.receive_object::<Other>().expect_err("closed");
    assert!(err.is_transport());
}

#[test]
fn config_file_drives_arbiter_settings() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("arbiter.toml");
    std::fs::write(&path, "strict_utf8 = false\nmax_string_len = 16\n").expect("write");

    let config = ArbiterConfig::from_path(&path).expect("load");
    assert!(!config.strict_utf8);
    assert_eq!(config.max_string_len, 16);

    let (left, _right) = pipe();
    let mut arbiter = Arbiter::with_config(left, config);
    let long = Announce { node: "x".repeat(17), ..Announce::default() };
    assert!(arbiter.send_object(&long).is_err());
}

#[test]
fn malformed_config_file_is_invalid_data() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("arbiter.toml");
    std::fs::write(&path, "strict_utf8 = \"sometimes\"\n").expect("write");
    let err = ArbiterConfig::from_path(&path).expect_err("invalid");
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
}
