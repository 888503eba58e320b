//! `Decode`/`Encode` for standard library and chrono types.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::errors::{DecodeError, EncodeError};
use crate::{Decode, Encode};

/// Decode a leaf value through its serde impl.
pub fn decode_scalar<T: DeserializeOwned>(decoder: &Decoder<'_>) -> Result<T, DecodeError> {
    T::deserialize(decoder.value())
        .map_err(|_| DecodeError::type_mismatch(decoder.coding_path(), std::any::type_name::<T>(), decoder.value()))
}

/// Encode a leaf value through its serde impl.
pub fn encode_scalar<T: Serialize + ?Sized>(value: &T, encoder: &mut Encoder) -> Result<(), EncodeError> {
    encoder.set_value(serde_json::to_value(value)?);
    Ok(())
}

macro_rules! scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Decode for $ty {
                fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
                    decode_scalar(decoder)
                }
            }

            impl Encode for $ty {
                fn encode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
                    encode_scalar(self, encoder)
                }
            }
        )*
    };
}

scalar!(
    bool,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    char,
    String,
    chrono::DateTime<chrono::Utc>,
    chrono::NaiveDate,
    chrono::NaiveDateTime,
);

macro_rules! float {
    ($($ty:ty),*) => {
        $(
            impl Decode for $ty {
                fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
                    decode_scalar(decoder)
                }
            }

            impl Encode for $ty {
                fn encode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
                    if !self.is_finite() {
                        return Err(EncodeError::invalid_value(
                            encoder.coding_path(),
                            format!("{self} has no JSON representation"),
                        ));
                    }
                    encode_scalar(self, encoder)
                }
            }
        )*
    };
}

float!(f32, f64);

impl Encode for str {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
        encode_scalar(self, encoder)
    }
}

impl Decode for Value {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(decoder.value().clone())
    }
}

impl Encode for Value {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
        encoder.set_value(self.clone());
        Ok(())
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
        (**self).encode(encoder)
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        if decoder.is_null() {
            return Ok(None);
        }
        T::decode(decoder).map(Some)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
        match self {
            Some(value) => value.encode(encoder),
            None => {
                encoder.set_value(Value::Null);
                Ok(())
            }
        }
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        T::decode(decoder).map(Box::new)
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
        (**self).encode(encoder)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        decoder.elements()?.iter().map(T::decode).collect()
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
        encoder.encode_elements(self)
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
        encoder.encode_elements(self)
    }
}

impl<T: Decode> Decode for BTreeMap<String, T> {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        decoder
            .entries()?
            .into_iter()
            .map(|(key, value)| Ok::<_, DecodeError>((key.to_owned(), T::decode(&value)?)))
            .collect()
    }
}

impl<T: Encode> Encode for BTreeMap<String, T> {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
        encoder.encode_entries(self)
    }
}

impl<T: Decode, S: BuildHasher + Default> Decode for HashMap<String, T, S> {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
        decoder
            .entries()?
            .into_iter()
            .map(|(key, value)| Ok::<_, DecodeError>((key.to_owned(), T::decode(&value)?)))
            .collect()
    }
}

impl<T: Encode, S: BuildHasher> Encode for HashMap<String, T, S> {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
        encoder.encode_entries(self)
    }
}
