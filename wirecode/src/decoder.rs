use std::marker::PhantomData;

use serde_json::{Map, Value};

use crate::errors::DecodeError;
use crate::key::CodingKey;
use crate::path::CodingPath;
use crate::strategy::DecodeStrategy;
use crate::Decode;

/// Read access to one value of the document and its location.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    value: &'a Value,
    path: CodingPath,
}

impl<'a> Decoder<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self {
            value,
            path: CodingPath::root(),
        }
    }

    pub(crate) fn at(value: &'a Value, path: CodingPath) -> Self {
        Self { value, path }
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    pub fn coding_path(&self) -> CodingPath {
        self.path.clone()
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    pub fn decode<T: Decode>(&self) -> Result<T, DecodeError> {
        T::decode(self)
    }

    /// View the value as an object addressed by `K`.
    pub fn keyed_container<K: CodingKey>(&self) -> Result<KeyedDecodingContainer<'a, K>, DecodeError> {
        match self.value {
            Value::Object(map) => Ok(KeyedDecodingContainer {
                map,
                path: self.path.clone(),
                _keys: PhantomData,
            }),
            other => Err(DecodeError::type_mismatch(self.coding_path(), "an object", other)),
        }
    }

    /// View the value as a whole.
    pub fn single_value_container(&self) -> SingleValueDecodingContainer<'a> {
        SingleValueDecodingContainer { decoder: self.clone() }
    }

    /// One decoder per array element.
    pub fn elements(&self) -> Result<Vec<Decoder<'a>>, DecodeError> {
        match self.value {
            Value::Array(items) => Ok(items
                .iter()
                .enumerate()
                .map(|(index, item)| Decoder::at(item, self.path.push_index(index)))
                .collect()),
            other => Err(DecodeError::type_mismatch(self.coding_path(), "an array", other)),
        }
    }

    /// One decoder per object entry, in the map's order.
    pub fn entries(&self) -> Result<Vec<(&'a str, Decoder<'a>)>, DecodeError> {
        match self.value {
            Value::Object(map) => Ok(map
                .iter()
                .map(|(key, value)| (key.as_str(), Decoder::at(value, self.path.push_key(key))))
                .collect()),
            other => Err(DecodeError::type_mismatch(self.coding_path(), "an object", other)),
        }
    }
}

/// An object whose members are looked up by `K`. Unknown keys are ignored.
#[derive(Debug)]
pub struct KeyedDecodingContainer<'a, K> {
    map: &'a Map<String, Value>,
    path: CodingPath,
    _keys: PhantomData<K>,
}

impl<'a, K: CodingKey> KeyedDecodingContainer<'a, K> {
    pub fn coding_path(&self) -> CodingPath {
        self.path.clone()
    }

    /// Recognised keys present in the object, in the object's order.
    pub fn all_keys(&self) -> Vec<K> {
        self.map.keys().filter_map(|key| K::from_key(key)).collect()
    }

    pub fn contains(&self, key: K) -> bool {
        self.map.contains_key(key.as_str())
    }

    /// Decoder for the member under `key`, which must exist.
    pub fn nested_decoder(&self, key: K) -> Result<Decoder<'a>, DecodeError> {
        self.present(key)
            .ok_or_else(|| DecodeError::key_not_found(self.coding_path(), key.as_str()))
    }

    pub fn decode<T: Decode>(&self, key: K) -> Result<T, DecodeError> {
        T::decode(&self.nested_decoder(key)?)
    }

    /// `None` when the key is absent or holds `null`.
    pub fn decode_if_present<T: Decode>(&self, key: K) -> Result<Option<T>, DecodeError> {
        match self.present(key) {
            Some(decoder) if !decoder.is_null() => T::decode(&decoder).map(Some),
            _ => Ok(None),
        }
    }

    /// Decode through `S`; `fallback` replaces an absent key or a failed decode.
    pub fn decode_coded<S: DecodeStrategy>(
        &self,
        key: K,
        fallback: Option<fn() -> S::Value>,
    ) -> Result<S::Value, DecodeError> {
        match (self.present(key), fallback) {
            (Some(decoder), fallback) => recover(S::decode(&decoder), fallback),
            (None, Some(fallback)) => Ok(fallback()),
            (None, None) => Err(DecodeError::key_not_found(self.coding_path(), key.as_str())),
        }
    }

    /// Optional flavour of [`Self::decode_coded`]; absent or `null` is `None`
    /// unless a fallback is given.
    pub fn decode_coded_if_present<S: DecodeStrategy>(
        &self,
        key: K,
        fallback: Option<fn() -> Option<S::Value>>,
    ) -> Result<Option<S::Value>, DecodeError> {
        match self.present(key) {
            Some(decoder) if !decoder.is_null() => recover(S::decode(&decoder).map(Some), fallback),
            _ => Ok(fallback.and_then(|fallback| fallback())),
        }
    }

    fn present(&self, key: K) -> Option<Decoder<'a>> {
        let name = key.as_str();
        self.map
            .get(name)
            .map(|value| Decoder::at(value, self.path.push_key(name)))
    }
}

/// The current value as a whole. Compositions decode every member from it.
#[derive(Debug, Clone)]
pub struct SingleValueDecodingContainer<'a> {
    decoder: Decoder<'a>,
}

impl<'a> SingleValueDecodingContainer<'a> {
    pub fn coding_path(&self) -> CodingPath {
        self.decoder.coding_path()
    }

    pub fn decoder(&self) -> &Decoder<'a> {
        &self.decoder
    }

    pub fn decode_nil(&self) -> bool {
        self.decoder.is_null()
    }

    pub fn decode<T: Decode>(&self) -> Result<T, DecodeError> {
        T::decode(&self.decoder)
    }

    /// `None` for `null`, or when the value lacks what `T` needs at this
    /// level (a composed member whose keys are absent). Errors deeper down
    /// and type mismatches still propagate.
    pub fn decode_if_present<T: Decode>(&self) -> Result<Option<T>, DecodeError> {
        if self.decode_nil() {
            return Ok(None);
        }
        self.absent_as_none(T::decode(&self.decoder))
    }

    /// Decode through `S`; `fallback` replaces `null` or a failed decode.
    pub fn decode_coded<S: DecodeStrategy>(&self, fallback: Option<fn() -> S::Value>) -> Result<S::Value, DecodeError> {
        match fallback {
            Some(fallback) if self.decode_nil() => Ok(fallback()),
            fallback => recover(S::decode(&self.decoder), fallback),
        }
    }

    pub fn decode_coded_if_present<S: DecodeStrategy>(
        &self,
        fallback: Option<fn() -> Option<S::Value>>,
    ) -> Result<Option<S::Value>, DecodeError> {
        if self.decode_nil() {
            return Ok(fallback.and_then(|fallback| fallback()));
        }
        match self.absent_as_none(S::decode(&self.decoder)) {
            Ok(None) => Ok(fallback.and_then(|fallback| fallback())),
            result => recover(result, fallback),
        }
    }

    fn absent_as_none<T>(&self, result: Result<T, DecodeError>) -> Result<Option<T>, DecodeError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_absence_at(&self.decoder.path) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

fn recover<T>(result: Result<T, DecodeError>, fallback: Option<fn() -> T>) -> Result<T, DecodeError> {
    match (result, fallback) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(fallback)) => Ok(fallback()),
        (Err(err), None) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::Direct;
    use serde_json::json;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Keys {
        Name,
        Age,
    }

    impl CodingKey for Keys {
        fn as_str(&self) -> &'static str {
            match self {
                Self::Name => "name",
                Self::Age => "age",
            }
        }

        fn from_key(key: &str) -> Option<Self> {
            match key {
                "name" => Some(Self::Name),
                "age" => Some(Self::Age),
                _ => None,
            }
        }
    }

    fn forty_two() -> u32 {
        42
    }

    #[test]
    fn keyed_lookup_and_paths() {
        let value = json!({ "name": "Ada", "age": "old", "extra": true });
        let decoder = Decoder::new(&value);
        let container = decoder.keyed_container::<Keys>().unwrap();
        assert_eq!(container.decode::<String>(Keys::Name).unwrap(), "Ada");
        assert_eq!(container.all_keys(), [Keys::Age, Keys::Name]);

        let err = container.decode::<u32>(Keys::Age).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "$.age");
    }

    #[test]
    fn non_object_is_a_type_mismatch() {
        let value = json!([1, 2]);
        let err = Decoder::new(&value).keyed_container::<Keys>().unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch { expected: "an object", .. }));
    }

    #[test]
    fn if_present_treats_null_as_absent() {
        let value = json!({ "name": null });
        let decoder = Decoder::new(&value);
        let container = decoder.keyed_container::<Keys>().unwrap();
        assert_eq!(container.decode_if_present::<String>(Keys::Name).unwrap(), None);
        assert_eq!(container.decode_if_present::<u32>(Keys::Age).unwrap(), None);
    }

    #[test]
    fn coded_fallback_covers_absent_and_invalid() {
        let value = json!({ "name": "x" });
        let decoder = Decoder::new(&value);
        let container = decoder.keyed_container::<Keys>().unwrap();
        let age = container.decode_coded::<Direct<u32>>(Keys::Age, Some(forty_two)).unwrap();
        assert_eq!(age, 42);
        let name = container.decode_coded::<Direct<u32>>(Keys::Name, Some(forty_two)).unwrap();
        assert_eq!(name, 42);

        let err = container.decode_coded::<Direct<u32>>(Keys::Age, None).unwrap_err();
        assert!(matches!(err, DecodeError::KeyNotFound { .. }));
    }

    #[test]
    fn single_value_reads_whole_value() {
        let value = json!(7);
        let decoder = Decoder::new(&value);
        let container = decoder.single_value_container();
        assert_eq!(container.decode::<u8>().unwrap(), 7);
        assert!(!container.decode_nil());
        assert!(container.decode_coded::<Direct<String>>(None).is_err());
    }

    #[derive(Debug, PartialEq)]
    struct Named(String);

    impl Decode for Named {
        fn decode(decoder: &Decoder<'_>) -> Result<Self, DecodeError> {
            decoder.keyed_container::<Keys>()?.decode(Keys::Name).map(Named)
        }
    }

    #[test]
    fn single_value_if_present_treats_missing_keys_as_absent() {
        let value = json!({ "age": 3 });
        let container = Decoder::new(&value).single_value_container();
        assert_eq!(container.decode_if_present::<Named>().unwrap(), None);

        let value = json!({ "name": "Ada" });
        let container = Decoder::new(&value).single_value_container();
        assert_eq!(container.decode_if_present::<Named>().unwrap(), Some(Named("Ada".into())));

        let value = json!({ "name": 3 });
        let container = Decoder::new(&value).single_value_container();
        let err = container.decode_if_present::<Named>().unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch { .. }));
    }

    #[test]
    fn elements_carry_indices() {
        let value = json!([1, "two"]);
        let elements = Decoder::new(&value).elements().unwrap();
        assert_eq!(elements[1].coding_path().to_string(), "$[1]");
    }
}
