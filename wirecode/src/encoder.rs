use std::marker::PhantomData;

use serde_json::{Map, Value};

use crate::Encode;
use crate::errors::{EncodeError, describe};
use crate::key::CodingKey;
use crate::path::CodingPath;
use crate::strategy::EncodeStrategy;

/// Builds the wire value of one node of the document.
///
/// Starts out as `null`. Keyed containers turn it into an object; writing
/// several objects through the single-value container merges them.
#[derive(Debug, Default)]
pub struct Encoder {
    value: Value,
    path: CodingPath,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn at(path: CodingPath) -> Self {
        Self {
            value: Value::Null,
            path,
        }
    }

    pub fn coding_path(&self) -> CodingPath {
        self.path.clone()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Replace the encoded value outright.
    pub fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    pub fn keyed_container<K: CodingKey>(&mut self) -> KeyedEncodingContainer<'_, K> {
        if !self.value.is_object() {
            self.value = Value::Object(Map::new());
        }
        KeyedEncodingContainer {
            encoder: self,
            _keys: PhantomData,
        }
    }

    pub fn single_value_container(&mut self) -> SingleValueEncodingContainer<'_> {
        SingleValueEncodingContainer { encoder: self }
    }

    /// Encode `value` as a child at `path`, returning its wire value.
    fn encode_child<T: Encode + ?Sized>(&self, value: &T, path: CodingPath) -> Result<Value, EncodeError> {
        let mut child = Encoder::at(path);
        value.encode(&mut child)?;
        Ok(child.into_value())
    }

    /// Write every item as an array element.
    pub fn encode_elements<'v, T, I>(&mut self, items: I) -> Result<(), EncodeError>
    where
        T: Encode + 'v,
        I: IntoIterator<Item = &'v T>,
    {
        let mut array = Vec::new();
        for (index, item) in items.into_iter().enumerate() {
            array.push(self.encode_child(item, self.path.push_index(index))?);
        }
        self.value = Value::Array(array);
        Ok(())
    }

    /// Write every entry as an object member.
    pub fn encode_entries<'v, T, I>(&mut self, entries: I) -> Result<(), EncodeError>
    where
        T: Encode + 'v,
        I: IntoIterator<Item = (&'v String, &'v T)>,
    {
        let mut map = Map::new();
        for (key, item) in entries {
            map.insert(key.clone(), self.encode_child(item, self.path.push_key(key))?);
        }
        self.value = Value::Object(map);
        Ok(())
    }

    /// Combine `value` with what is already encoded.
    fn merge(&mut self, value: Value) -> Result<(), EncodeError> {
        if value.is_null() {
            return Ok(());
        }
        if self.value.is_null() {
            self.value = value;
            return Ok(());
        }
        match (&mut self.value, value) {
            (Value::Object(current), Value::Object(more)) => {
                current.extend(more);
                Ok(())
            }
            (current, value) => Err(EncodeError::invalid_value(
                self.path.clone(),
                format!("cannot combine {} with {} in one value", describe(current), describe(&value)),
            )),
        }
    }
}

/// Writes object members under keys of `K`.
#[derive(Debug)]
pub struct KeyedEncodingContainer<'a, K> {
    encoder: &'a mut Encoder,
    _keys: PhantomData<K>,
}

impl<K: CodingKey> KeyedEncodingContainer<'_, K> {
    pub fn coding_path(&self) -> CodingPath {
        self.encoder.coding_path()
    }

    pub fn encode<T: Encode + ?Sized>(&mut self, value: &T, key: K) -> Result<(), EncodeError> {
        let encoded = self.encoder.encode_child(value, self.child_path(key))?;
        self.insert(key, encoded);
        Ok(())
    }

    /// `None` leaves the key out.
    pub fn encode_if_present<T: Encode>(&mut self, value: &Option<T>, key: K) -> Result<(), EncodeError> {
        match value {
            Some(value) => self.encode(value, key),
            None => Ok(()),
        }
    }

    pub fn encode_nil(&mut self, key: K) -> Result<(), EncodeError> {
        self.insert(key, Value::Null);
        Ok(())
    }

    pub fn encode_coded<S: EncodeStrategy>(&mut self, value: &S::Value, key: K) -> Result<(), EncodeError> {
        let mut child = Encoder::at(self.child_path(key));
        S::encode(value, &mut child)?;
        self.insert(key, child.into_value());
        Ok(())
    }

    pub fn encode_coded_if_present<S: EncodeStrategy>(
        &mut self,
        value: &Option<S::Value>,
        key: K,
    ) -> Result<(), EncodeError> {
        match value {
            Some(value) => self.encode_coded::<S>(value, key),
            None => Ok(()),
        }
    }

    fn child_path(&self, key: K) -> CodingPath {
        self.encoder.path.push_key(key.as_str())
    }

    fn insert(&mut self, key: K, value: Value) {
        if let Value::Object(map) = &mut self.encoder.value {
            map.insert(key.as_str().to_owned(), value);
        }
    }
}

/// Writes into the encoder's own value. Objects written one after another merge.
#[derive(Debug)]
pub struct SingleValueEncodingContainer<'a> {
    encoder: &'a mut Encoder,
}

impl SingleValueEncodingContainer<'_> {
    pub fn coding_path(&self) -> CodingPath {
        self.encoder.coding_path()
    }

    pub fn encode<T: Encode + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        let encoded = self.encoder.encode_child(value, self.encoder.coding_path())?;
        self.encoder.merge(encoded)
    }

    pub fn encode_if_present<T: Encode>(&mut self, value: &Option<T>) -> Result<(), EncodeError> {
        match value {
            Some(value) => self.encode(value),
            None => Ok(()),
        }
    }

    /// Writes `null`, which only succeeds while nothing else has been written.
    pub fn encode_nil(&mut self) -> Result<(), EncodeError> {
        if self.encoder.value.is_null() {
            Ok(())
        } else {
            Err(EncodeError::invalid_value(
                self.encoder.coding_path(),
                "cannot write null over an encoded value",
            ))
        }
    }

    pub fn encode_coded<S: EncodeStrategy>(&mut self, value: &S::Value) -> Result<(), EncodeError> {
        let mut child = Encoder::at(self.encoder.coding_path());
        S::encode(value, &mut child)?;
        self.encoder.merge(child.into_value())
    }

    pub fn encode_coded_if_present<S: EncodeStrategy>(&mut self, value: &Option<S::Value>) -> Result<(), EncodeError> {
        match value {
            Some(value) => self.encode_coded::<S>(value),
            None => Ok(()),
        }
    }
}
