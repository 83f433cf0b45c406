//! Custom serde Serializer that flattens a parsed config document (a
//! `serde_json::Value`, a `toml::Table`, or any `Serialize` tree) into dotted
//! key/scalar pairs.
//!
//! Objects and tables are recursed into, building dotted key paths:
//! `{"server": {"port": 80}}` → `[("server.port", Leaf::Int(80))]`.
//! Arrays are not supported as config values and are skipped entirely.

use serde::ser::{self, Serialize};

/// A scalar found at the end of a dotted key path.
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Null,
}

/// Flatten a `Serialize` value into dotted key/leaf pairs, in document order.
pub fn flatten<S: Serialize + ?Sized>(source: &S) -> Result<Vec<(String, Leaf)>, FlattenError> {
    let mut out = Vec::new();
    let serializer = FlattenSerializer {
        prefix: String::new(),
        out: &mut out,
    };
    source.serialize(serializer)?;
    Ok(out)
}

/// A document shape that cannot be flattened (non-string map keys, bytes).
#[derive(Debug, thiserror::Error)]
#[error("cannot flatten config document: {0}")]
pub struct FlattenError(String);

impl ser::Error for FlattenError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        FlattenError(msg.to_string())
    }
}

struct FlattenSerializer<'a> {
    prefix: String,
    out: &'a mut Vec<(String, Leaf)>,
}

impl FlattenSerializer<'_> {
    fn emit(self, leaf: Leaf) -> Result<(), FlattenError> {
        self.out.push((self.prefix, leaf));
        Ok(())
    }
}

/// Small integer types all land in `Leaf::Int`.
macro_rules! widen_to_i64 {
    ($($method:ident($ty:ty)),* $(,)?) => {$(
        fn $method(self, v: $ty) -> Result<(), FlattenError> {
            self.serialize_i64(i64::from(v))
        }
    )*};
}

impl<'a> ser::Serializer for FlattenSerializer<'a> {
    type Ok = ();
    type Error = FlattenError;
    type SerializeSeq = SkipSeq;
    type SerializeTuple = SkipSeq;
    type SerializeTupleStruct = SkipSeq;
    type SerializeTupleVariant = SkipSeq;
    type SerializeMap = FlattenMapSerializer<'a>;
    type SerializeStruct = FlattenStructSerializer<'a>;
    type SerializeStructVariant = FlattenStructSerializer<'a>;

    fn serialize_bool(self, v: bool) -> Result<(), Self::Error> {
        self.emit(Leaf::Bool(v))
    }

    widen_to_i64!(
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
    );

    fn serialize_i64(self, v: i64) -> Result<(), Self::Error> {
        self.emit(Leaf::Int(v))
    }

    fn serialize_u64(self, v: u64) -> Result<(), Self::Error> {
        match i64::try_from(v) {
            Ok(i) => self.emit(Leaf::Int(i)),
            Err(_) => self.emit(Leaf::Float(v as f64)),
        }
    }

    fn serialize_f32(self, v: f32) -> Result<(), Self::Error> {
        self.serialize_f64(v as f64)
    }

    fn serialize_f64(self, v: f64) -> Result<(), Self::Error> {
        self.emit(Leaf::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<(), Self::Error> {
        self.serialize_str(&v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<(), Self::Error> {
        self.emit(Leaf::Str(v.to_string()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), Self::Error> {
        Err(FlattenError("bytes not supported".into()))
    }

    fn serialize_none(self) -> Result<(), Self::Error> {
        self.emit(Leaf::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), Self::Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), Self::Error> {
        self.emit(Leaf::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), Self::Error> {
        self.emit(Leaf::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<(), Self::Error> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Ok(SkipSeq)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Ok(SkipSeq)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Ok(SkipSeq)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Ok(SkipSeq)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Ok(FlattenMapSerializer {
            prefix: self.prefix,
            out: self.out,
            current_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(FlattenStructSerializer {
            prefix: self.prefix,
            out: self.out,
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Ok(FlattenStructSerializer {
            prefix: self.prefix,
            out: self.out,
        })
    }
}

fn dotted(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

struct FlattenStructSerializer<'a> {
    prefix: String,
    out: &'a mut Vec<(String, Leaf)>,
}

impl ser::SerializeStruct for FlattenStructSerializer<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        // toml datetimes serialize as a single private field holding the text
        // form; keep them at the parent path.
        let prefix = if key.starts_with("$__toml_private") {
            self.prefix.clone()
        } else {
            dotted(&self.prefix, key)
        };
        let serializer = FlattenSerializer {
            prefix,
            out: self.out,
        };
        value.serialize(serializer)
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FlattenStructSerializer<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        ser::SerializeStruct::serialize_field(self, key, value)
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

struct FlattenMapSerializer<'a> {
    prefix: String,
    out: &'a mut Vec<(String, Leaf)>,
    current_key: Option<String>,
}

impl ser::SerializeMap for FlattenMapSerializer<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), Self::Error> {
        self.current_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| FlattenError("map value without a key".into()))?;
        let serializer = FlattenSerializer {
            prefix: dotted(&self.prefix, &key),
            out: self.out,
        };
        value.serialize(serializer)
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

// Arrays carry no config keys; every element is dropped.

struct SkipSeq;

macro_rules! skip_elements {
    ($($trait:ident :: $method:ident),* $(,)?) => {$(
        impl ser::$trait for SkipSeq {
            type Ok = ();
            type Error = FlattenError;

            fn $method<T: Serialize + ?Sized>(&mut self, _: &T) -> Result<(), FlattenError> {
                Ok(())
            }

            fn end(self) -> Result<(), FlattenError> {
                Ok(())
            }
        }
    )*};
}

skip_elements!(
    SerializeSeq::serialize_element,
    SerializeTuple::serialize_element,
    SerializeTupleStruct::serialize_field,
    SerializeTupleVariant::serialize_field,
);

/// Turns a map key into a path segment. Only string-like keys are accepted.
struct KeySerializer;

fn non_string_key() -> FlattenError {
    FlattenError("map keys must be strings".into())
}

macro_rules! reject_scalar_keys {
    ($($method:ident($ty:ty)),* $(,)?) => {$(
        fn $method(self, _: $ty) -> Result<String, FlattenError> {
            Err(non_string_key())
        }
    )*};
}

type NoKey = ser::Impossible<String, FlattenError>;

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = FlattenError;
    type SerializeSeq = NoKey;
    type SerializeTuple = NoKey;
    type SerializeTupleStruct = NoKey;
    type SerializeTupleVariant = NoKey;
    type SerializeMap = NoKey;
    type SerializeStruct = NoKey;
    type SerializeStructVariant = NoKey;

    fn serialize_str(self, key: &str) -> Result<String, FlattenError> {
        Ok(key.to_owned())
    }

    fn serialize_char(self, key: char) -> Result<String, FlattenError> {
        Ok(String::from(key))
    }

    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        name: &'static str,
    ) -> Result<String, FlattenError> {
        Ok(name.to_owned())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        inner: &T,
    ) -> Result<String, FlattenError> {
        inner.serialize(self)
    }

    reject_scalar_keys!(
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_f32(f32),
        serialize_f64(f64),
        serialize_bytes(&[u8]),
    );

    fn serialize_none(self) -> Result<String, FlattenError> {
        Err(non_string_key())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _: &T) -> Result<String, FlattenError> {
        Err(non_string_key())
    }

    fn serialize_unit(self) -> Result<String, FlattenError> {
        Err(non_string_key())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<String, FlattenError> {
        Err(non_string_key())
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Result<String, FlattenError> {
        Err(non_string_key())
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<NoKey, FlattenError> {
        Err(non_string_key())
    }

    fn serialize_tuple(self, _: usize) -> Result<NoKey, FlattenError> {
        Err(non_string_key())
    }

    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<NoKey, FlattenError> {
        Err(non_string_key())
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<NoKey, FlattenError> {
        Err(non_string_key())
    }

    fn serialize_map(self, _: Option<usize>) -> Result<NoKey, FlattenError> {
        Err(non_string_key())
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Result<NoKey, FlattenError> {
        Err(non_string_key())
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<NoKey, FlattenError> {
        Err(non_string_key())
    }
}
