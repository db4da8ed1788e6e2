use criterion::{black_box, criterion_group, criterion_main, Criterion};
use styrene_arbiter::{Decoder, Encoder, FieldTable, NetworkObject, SchemaDescriber};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Telemetry {
    node: Uuid,
    seq: i64,
    rssi: i16,
    snr: i8,
    battery: Option<i32>,
    online: bool,
    label: String,
    note: Option<String>,
}

impl NetworkObject for Telemetry {
    fn describe(table: &mut FieldTable<Self>) {
        table
            .field("node", 1, |t| &t.node, |t| &mut t.node)
            .field("seq", 2, |t| &t.seq, |t| &mut t.seq)
            .field("rssi", 3, |t| &t.rssi, |t| &mut t.rssi)
            .field("snr", 4, |t| &t.snr, |t| &mut t.snr)
            .optional("battery", 5, |t| &t.battery, |t| &mut t.battery)
            .field("online", 6, |t| &t.online, |t| &mut t.online)
            .field("label", 7, |t| &t.label, |t| &mut t.label)
            .optional("note", 8, |t| &t.note, |t| &mut t.note);
    }
}

fn sample() -> Telemetry {
    Telemetry {
        node: Uuid::from_u128(0x1122_3344_5566_7788_99aa_bbcc_ddee_ff00),
        seq: 1_770_000_000,
        rssi: -92,
        snr: 7,
        battery: Some(87),
        online: true,
        label: "bench-node-telemetry".into(),
        note: None,
    }
}

fn bench_describe(c: &mut Criterion) {
    c.bench_function("arbiter/describe_schema", |b| {
        b.iter(|| {
            let schema = SchemaDescriber::default()
                .describe::<Telemetry>()
                .expect("schema should derive");
            black_box(schema);
        });
    });
}

fn bench_encode(c: &mut Criterion) {
    let schema = SchemaDescriber::default().describe::<Telemetry>().expect("schema");
    let record = sample();
    c.bench_function("arbiter/encode", |b| {
        b.iter(|| {
            let bytes = Encoder::default()
                .encode(black_box(&record), &schema)
                .expect("encode should succeed");
            black_box(bytes);
        });
    });
}

fn bench_decode(c: &mut Criterion) {
    let schema = SchemaDescriber::default().describe::<Telemetry>().expect("schema");
    let bytes = Encoder::default().encode(&sample(), &schema).expect("encode");
    c.bench_function("arbiter/decode", |b| {
        b.iter(|| {
            let decoded: Telemetry = Decoder::default()
                .decode(black_box(&bytes), &schema)
                .expect("decode should succeed");
            black_box(decoded);
        });
    });
}

criterion_group!(arbiter_benches, bench_describe, bench_encode, bench_decode);
criterion_main!(arbiter_benches);
