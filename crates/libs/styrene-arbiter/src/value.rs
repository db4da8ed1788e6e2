//! Runtime element values and the mapping from Rust field types.

use uuid::Uuid;

use crate::kind::{ElementKind, ValueType};

/// The value of one element, as read from or written to a record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Boolean(bool),
    String(String),
    Uuid(Uuid),
}

impl Value {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Byte(_) => ElementKind::Byte,
            Self::Short(_) => ElementKind::Short,
            Self::Int(_) => ElementKind::Int,
            Self::Long(_) => ElementKind::Long,
            Self::Boolean(_) => ElementKind::Boolean,
            Self::String(_) => ElementKind::String,
            Self::Uuid(_) => ElementKind::Uuid,
        }
    }
}

/// A Rust type that can back a record element.
///
/// `to_value` returns `None` when the field currently holds no value;
/// `from_value` returns `None` when the value has the wrong kind for the field.
pub trait FieldValue: Sized {
    const VALUE_TYPE: ValueType;

    fn to_value(&self) -> Option<Value>;

    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! scalar_field_value {
    ($ty:ty, $value_type:ident, $variant:ident) => {
        scalar_field_value!($ty, $value_type, $variant, |v| *v);
    };
    ($ty:ty, $value_type:ident, $variant:ident, |$v:ident| $to:expr) => {
        impl FieldValue for $ty {
            const VALUE_TYPE: ValueType = ValueType::$value_type;

            fn to_value(&self) -> Option<Value> {
                let $v = self;
                Some(Value::$variant($to))
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

scalar_field_value!(i8, I8, Byte);
scalar_field_value!(i16, I16, Short);
scalar_field_value!(i32, I32, Int);
scalar_field_value!(i64, I64, Long);
scalar_field_value!(bool, Bool, Boolean);
scalar_field_value!(Uuid, Uuid, Uuid);
scalar_field_value!(String, String, String, |v| v.clone());

impl<T: FieldValue> FieldValue for Option<T> {
    const VALUE_TYPE: ValueType = T::VALUE_TYPE.wrapped_in_option();

    fn to_value(&self) -> Option<Value> {
        self.as_ref().and_then(T::to_value)
    }

    fn from_value(value: Value) -> Option<Self> {
        T::from_value(value).map(Some)
    }
}

// Types a record may declare but the wire cannot carry. Schema derivation
// rejects them before any accessor runs.
macro_rules! unmapped_field_value {
    ($ty:ty, $value_type:ident) => {
        impl FieldValue for $ty {
            const VALUE_TYPE: ValueType = ValueType::$value_type;

            fn to_value(&self) -> Option<Value> {
                None
            }

            fn from_value(_value: Value) -> Option<Self> {
                None
            }
        }
    };
}

unmapped_field_value!(f32, F32);
unmapped_field_value!(f64, F64);
unmapped_field_value!(char, Char);

impl<T> FieldValue for Vec<T> {
    const VALUE_TYPE: ValueType = ValueType::List;

    fn to_value(&self) -> Option<Value> {
        None
    }

    fn from_value(_value: Value) -> Option<Self> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldValue, Value};
    use crate::kind::{ElementKind, ValueType};
    use uuid::Uuid;

    #[test]
    fn scalars_roundtrip_through_values() {
        assert_eq!(44i32.to_value(), Some(Value::Int(44)));
        assert_eq!(i32::from_value(Value::Int(44)), Some(44));
        assert_eq!(i32::from_value(Value::Long(44)), None);
        assert_eq!(
            String::from_value(Value::String("hi".into())),
            Some("hi".to_string())
        );
    }

    #[test]
    fn copy_scalars_and_strings_read_out_unchanged() {
        let id = Uuid::from_u128(7);
        assert_eq!(id.to_value(), Some(Value::Uuid(id)));
        assert_eq!(true.to_value(), Some(Value::Boolean(true)));
        assert_eq!((-5i8).to_value(), Some(Value::Byte(-5)));
        let label = String::from("relay");
        assert_eq!(label.to_value(), Some(Value::String("relay".into())));
        assert_eq!(label, "relay");
    }

    #[test]
    fn option_reports_absence() {
        let absent: Option<i16> = None;
        assert_eq!(absent.to_value(), None);
        assert_eq!(Some(8i16).to_value(), Some(Value::Short(8)));
        assert_eq!(Option::<i16>::from_value(Value::Short(8)), Some(Some(8)));
        assert_eq!(<Option<i16>>::VALUE_TYPE, ValueType::OptionI16);
        assert_eq!(<Option<Option<i16>>>::VALUE_TYPE, ValueType::OptionWrapped);
    }

    #[test]
    fn value_kinds_match_variants() {
        assert_eq!(Value::Uuid(Uuid::nil()).kind(), ElementKind::Uuid);
        assert_eq!(Value::Boolean(true).kind(), ElementKind::Boolean);
        assert_eq!(Value::String(String::new()).kind(), ElementKind::String);
    }

    #[test]
    fn unmapped_types_declare_their_value_type() {
        assert_eq!(f32::VALUE_TYPE, ValueType::F32);
        assert_eq!(<Vec<u8>>::VALUE_TYPE, ValueType::List);
        assert_eq!(1.5f64.to_value(), None);
    }
}
