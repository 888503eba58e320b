//! Pluggable per-field coding and fallback providers.
//!
//! A field annotated `#[coding(strategy = S)]` is decoded through
//! `S::decode` and encoded through `S::encode` instead of its own `Decode`
//! and `Encode` impls. `#[coding(default = P)]` supplies `P::provide()` when
//! the key is absent or decoding fails.

use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::errors::{DecodeError, EncodeError};
use crate::{Decode, Encode};

pub trait DecodeStrategy {
    type Value;

    fn decode(decoder: &Decoder<'_>) -> Result<Self::Value, DecodeError>;
}

pub trait EncodeStrategy {
    type Value;

    fn encode(value: &Self::Value, encoder: &mut Encoder) -> Result<(), EncodeError>;
}

/// Supplies the value of a field that is absent or failed to decode.
pub trait ValueProvider {
    type Value;

    fn provide() -> Self::Value;
}

/// The type's own `Decode`/`Encode` impls, used when a field only has a provider.
pub struct Direct<T>(PhantomData<T>);

impl<T: Decode> DecodeStrategy for Direct<T> {
    type Value = T;

    fn decode(decoder: &Decoder<'_>) -> Result<T, DecodeError> {
        T::decode(decoder)
    }
}

impl<T: Encode> EncodeStrategy for Direct<T> {
    type Value = T;

    fn encode(value: &T, encoder: &mut Encoder) -> Result<(), EncodeError> {
        value.encode(encoder)
    }
}

/// Provides `T::default()`.
pub struct DefaultOf<T>(PhantomData<T>);

impl<T: Default> ValueProvider for DefaultOf<T> {
    type Value = T;

    fn provide() -> T {
        T::default()
    }
}

/// An array whose undecodable elements are dropped instead of failing the whole.
pub struct LossySequence<T>(PhantomData<T>);

impl<T: Decode> DecodeStrategy for LossySequence<T> {
    type Value = Vec<T>;

    fn decode(decoder: &Decoder<'_>) -> Result<Vec<T>, DecodeError> {
        Ok(decoder
            .elements()?
            .iter()
            .filter_map(|element| T::decode(element).ok())
            .collect())
    }
}

impl<T: Encode> EncodeStrategy for LossySequence<T> {
    type Value = Vec<T>;

    fn encode(value: &Vec<T>, encoder: &mut Encoder) -> Result<(), EncodeError> {
        encoder.encode_elements(value)
    }
}

/// `DateTime<Utc>` as seconds since the Unix epoch.
///
/// Decodes integers and fractional numbers; encodes whole seconds as an
/// integer and anything finer as a float.
pub struct UnixTimestamp;

impl DecodeStrategy for UnixTimestamp {
    type Value = DateTime<Utc>;

    fn decode(decoder: &Decoder<'_>) -> Result<DateTime<Utc>, DecodeError> {
        let value = decoder.value();
        let parsed = match value {
            Value::Number(number) => match number.as_i64() {
                Some(seconds) => DateTime::from_timestamp(seconds, 0),
                None => number.as_f64().and_then(|seconds| {
                    let whole = seconds.floor();
                    let nanos = ((seconds - whole) * 1e9).round() as u32;
                    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
                }),
            },
            other => return Err(DecodeError::type_mismatch(decoder.coding_path(), "a Unix timestamp", other)),
        };
        parsed.ok_or_else(|| DecodeError::data_corrupted(decoder.coding_path(), format!("timestamp {value} is out of range")))
    }
}

impl EncodeStrategy for UnixTimestamp {
    type Value = DateTime<Utc>;

    fn encode(value: &DateTime<Utc>, encoder: &mut Encoder) -> Result<(), EncodeError> {
        let seconds = value.timestamp();
        let nanos = value.timestamp_subsec_nanos();
        if nanos == 0 {
            encoder.set_value(Value::from(seconds));
        } else {
            encoder.set_value(Value::from(seconds as f64 + f64::from(nanos) / 1e9));
        }
        Ok(())
    }
}

/// `DateTime<Utc>` as an RFC 3339 string. Offsets are normalised to UTC.
pub struct Rfc3339;

impl DecodeStrategy for Rfc3339 {
    type Value = DateTime<Utc>;

    fn decode(decoder: &Decoder<'_>) -> Result<DateTime<Utc>, DecodeError> {
        let Value::String(text) = decoder.value() else {
            return Err(DecodeError::type_mismatch(decoder.coding_path(), "an RFC 3339 string", decoder.value()));
        };
        DateTime::parse_from_rfc3339(text)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|err| DecodeError::data_corrupted(decoder.coding_path(), format!("invalid RFC 3339 date `{text}`: {err}")))
    }
}

impl EncodeStrategy for Rfc3339 {
    type Value = DateTime<Utc>;

    fn encode(value: &DateTime<Utc>, encoder: &mut Encoder) -> Result<(), EncodeError> {
        encoder.set_value(Value::String(value.to_rfc3339()));
        Ok(())
    }
}

/// A scalar accepted either natively or as its string rendering (`"42"`, `"true"`).
pub struct Coerced<T>(PhantomData<T>);

impl<T> DecodeStrategy for Coerced<T>
where
    T: Decode + FromStr,
    T::Err: Display,
{
    type Value = T;

    fn decode(decoder: &Decoder<'_>) -> Result<T, DecodeError> {
        match (T::decode(decoder), decoder.value()) {
            (Ok(value), _) => Ok(value),
            (Err(_), Value::String(text)) => text
                .trim()
                .parse::<T>()
                .map_err(|err| DecodeError::data_corrupted(decoder.coding_path(), format!("cannot convert `{text}`: {err}"))),
            (Err(err), _) => Err(err),
        }
    }
}

impl<T: Encode> EncodeStrategy for Coerced<T> {
    type Value = T;

    fn encode(value: &T, encoder: &mut Encoder) -> Result<(), EncodeError> {
        value.encode(encoder)
    }
}
