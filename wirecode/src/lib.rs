//! Runtime for types annotated with the wirecode coding macros.
//!
//! The macros generate `Decode`/`Encode` impls that walk a
//! [`serde_json::Value`] tree through keyed and single-value containers:
//!
//! ```ignore
//! use wirecode::codable;
//!
//! #[codable]
//! struct User {
//!     #[coding(rename = "userId")]
//!     id: u64,
//!     nickname: Option<String>,
//!     #[coding(skip)]
//!     session: Option<String>,
//! }
//!
//! let user: User = wirecode::from_str(r#"{ "userId": 7 }"#)?;
//! assert_eq!(wirecode::to_string(&user)?, r#"{"userId":7}"#);
//! ```

extern crate self as wirecode;

mod decoder;
mod encoder;
mod errors;
mod impls;
mod key;
mod path;
pub mod strategy;

pub use decoder::{Decoder, KeyedDecodingContainer, SingleValueDecodingContainer};
pub use encoder::{Encoder, KeyedEncodingContainer, SingleValueEncodingContainer};
pub use errors::{DecodeError, EncodeError};
pub use impls::{decode_scalar, encode_scalar};
pub use key::CodingKey;
pub use path::{CodingPath, PathSegment};
pub use strategy::{
    Coerced, DecodeStrategy, DefaultOf, Direct, EncodeStrategy, LossySequence, Rfc3339, UnixTimestamp, ValueProvider,
};
pub use wirecode_macros::{all_of, codable, decodable, encodable, one_of};

use serde_json::Value;

/// A type that can be built from its wire form.
pub trait Decode: Sized {
    fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError>;
}

/// A type that can write its wire form.
pub trait Encode {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), EncodeError>;
}

pub fn from_value<T: Decode>(value: &Value) -> Result<T, DecodeError> {
    T::decode(&Decoder::new(value))
}

pub fn from_str<T: Decode>(input: &str) -> Result<T, DecodeError> {
    let value: Value = serde_json::from_str(input)?;
    from_value(&value)
}

pub fn from_slice<T: Decode>(input: &[u8]) -> Result<T, DecodeError> {
    let value: Value = serde_json::from_slice(input)?;
    from_value(&value)
}

pub fn to_value<T: Encode + ?Sized>(value: &T) -> Result<Value, EncodeError> {
    let mut encoder = Encoder::new();
    value.encode(&mut encoder)?;
    Ok(encoder.into_value())
}

pub fn to_string<T: Encode + ?Sized>(value: &T) -> Result<String, EncodeError> {
    Ok(serde_json::to_string(&to_value(value)?)?)
}

pub fn to_string_pretty<T: Encode + ?Sized>(value: &T) -> Result<String, EncodeError> {
    Ok(serde_json::to_string_pretty(&to_value(value)?)?)
}
