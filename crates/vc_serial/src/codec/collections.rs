//! Codecs for std containers and `IndexMap`.
//!
//! - [`ArrayCodec`]: `Vec<T>`, read from a sequence, merged by appending.
//! - [`CollectionCodec`]: `VecDeque<T>`, `HashSet<T, S>` and `BTreeSet<T>`.
//! - [`DictionaryCodec`]: `HashMap<K, V, S>`, `BTreeMap<K, V>` and
//!   `IndexMap<K, V, S>`, read from a mapping; the child's keys shadow the
//!   parent's on merge.

use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::sync::Arc;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use super::{CodecAdapter, CodecCaps, CodecCx, CodecRegistry, Decoded, DynCodec, TypeCodec};
use crate::error::{CopyError, DecodeError, EncodeError, ValueMismatch};
use crate::node::{DataNode, MappingNode, SequenceNode};
use crate::result::{DictionaryResult, ResultNode, SequenceResult};
use crate::validation::ValidationNode;
use crate::value::{DataType, Value};

fn element<T: DataType>(result: &ResultNode) -> Result<T, ValueMismatch> {
    let value = result.value();
    value
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| ValueMismatch::new(T::type_path(), value.value_type_path()))
}

// -----------------------------------------------------------------------------
// ArrayCodec

/// Codec of `Vec<T>`.
pub struct ArrayCodec<T>(PhantomData<fn() -> T>);

impl<T> ArrayCodec<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for ArrayCodec<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

fn rebuild_vec<T: DataType>(elements: &[ResultNode]) -> Result<Box<dyn Value>, ValueMismatch> {
    let items = elements
        .iter()
        .map(element::<T>)
        .collect::<Result<Vec<T>, _>>()?;
    Ok(Box::new(items))
}

impl<T: DataType> TypeCodec<Vec<T>> for ArrayCodec<T> {
    #[inline]
    fn capabilities(&self) -> CodecCaps {
        CodecCaps::SEQUENCE
    }

    fn read_sequence(&self, cx: CodecCx<'_>, node: &SequenceNode) -> Result<Decoded<Vec<T>>, DecodeError> {
        let mut items = Vec::with_capacity(node.len());
        let mut results = Vec::with_capacity(node.len());
        for item in node {
            let decoded = cx.read::<T>(item)?;
            items.push(decoded.value);
            results.push(decoded.result);
        }
        let result = SequenceResult::new(Box::new(items.clone()), results, rebuild_vec::<T>);
        Ok(Decoded::new(items, ResultNode::Array(result)))
    }

    fn validate_sequence(&self, cx: CodecCx<'_>, node: &SequenceNode) -> ValidationNode {
        ValidationNode::Sequence(node.iter().map(|item| cx.validate::<T>(item)).collect())
    }

    fn write(&self, cx: CodecCx<'_>, value: &Vec<T>, always_write: bool) -> Result<DataNode, EncodeError> {
        let mut node = SequenceNode::with_capacity(value.len());
        for item in value {
            node.push(cx.write(item, always_write)?);
        }
        Ok(node.into())
    }

    /// Copies into the existing elements of `target` where it can.
    fn copy(&self, cx: CodecCx<'_>, source: &Vec<T>, target: &mut Vec<T>) -> Result<(), CopyError> {
        target.truncate(source.len());
        let reused = target.len();
        for (from, to) in source.iter().zip(target.iter_mut()) {
            cx.copy(from, to)?;
        }
        for from in &source[reused..] {
            target.push(cx.create_copy(from)?);
        }
        Ok(())
    }

    fn create_copy(&self, cx: CodecCx<'_>, source: &Vec<T>) -> Result<Vec<T>, CopyError> {
        source.iter().map(|item| cx.create_copy(item)).collect()
    }
}

impl<T: DataType> DataType for Vec<T> {
    fn default_codec() -> Arc<dyn DynCodec> {
        CodecAdapter::shared(ArrayCodec::<T>::new())
    }

    fn register_dependencies(registry: &mut CodecRegistry) {
        registry.register::<T>();
    }
}

// -----------------------------------------------------------------------------
// CollectionCodec

/// A container read from a sequence whose order is not significant for
/// merging.
pub trait CollectionType: DataType + Default {
    type Item: DataType;

    /// Equal items collapse into one, as in a set.
    const UNIQUE: bool = false;

    fn add(&mut self, item: Self::Item);

    fn items(&self) -> impl Iterator<Item = &Self::Item>;

    /// Number of items.
    fn count(&self) -> usize;
}

impl<T: DataType> CollectionType for VecDeque<T> {
    type Item = T;

    #[inline]
    fn add(&mut self, item: T) {
        self.push_back(item);
    }

    #[inline]
    fn items(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    #[inline]
    fn count(&self) -> usize {
        self.len()
    }
}

impl<T: DataType + Ord> CollectionType for BTreeSet<T> {
    type Item = T;
    const UNIQUE: bool = true;

    #[inline]
    fn add(&mut self, item: T) {
        self.insert(item);
    }

    #[inline]
    fn items(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    #[inline]
    fn count(&self) -> usize {
        self.len()
    }
}

impl<T, S> CollectionType for HashSet<T, S>
where
    T: DataType + Eq + Hash,
    S: BuildHasher + Default + Clone + Send + Sync + 'static,
{
    type Item = T;
    const UNIQUE: bool = true;

    #[inline]
    fn add(&mut self, item: T) {
        self.insert(item);
    }

    #[inline]
    fn items(&self) -> impl Iterator<Item = &T> {
        self.iter()
    }

    #[inline]
    fn count(&self) -> usize {
        self.len()
    }
}

/// Codec of any [`CollectionType`].
pub struct CollectionCodec<C>(PhantomData<fn() -> C>);

impl<C> CollectionCodec<C> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<C> Default for CollectionCodec<C> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

fn rebuild_collection<C: CollectionType>(
    elements: &[ResultNode],
) -> Result<Box<dyn Value>, ValueMismatch> {
    let mut collection = C::default();
    for result in elements {
        collection.add(element::<C::Item>(result)?);
    }
    Ok(Box::new(collection))
}

impl<C: CollectionType> TypeCodec<C> for CollectionCodec<C> {
    #[inline]
    fn capabilities(&self) -> CodecCaps {
        CodecCaps::SEQUENCE
    }

    fn read_sequence(&self, cx: CodecCx<'_>, node: &SequenceNode) -> Result<Decoded<C>, DecodeError> {
        let mut collection = C::default();
        let mut results = Vec::with_capacity(node.len());
        for item in node {
            let decoded = cx.read::<C::Item>(item)?;
            let count = collection.count();
            collection.add(decoded.value);
            // A repeated set item leaves no element behind.
            if collection.count() > count {
                results.push(decoded.result);
            }
        }
        let result = SequenceResult::new(Box::new(collection.clone()), results, rebuild_collection::<C>)
            .with_unique(C::UNIQUE);
        Ok(Decoded::new(collection, ResultNode::Collection(result)))
    }

    fn validate_sequence(&self, cx: CodecCx<'_>, node: &SequenceNode) -> ValidationNode {
        ValidationNode::Sequence(
            node.iter()
                .map(|item| cx.validate::<C::Item>(item))
                .collect(),
        )
    }

    fn write(&self, cx: CodecCx<'_>, value: &C, always_write: bool) -> Result<DataNode, EncodeError> {
        let mut node = SequenceNode::with_capacity(value.count());
        for item in value.items() {
            node.push(cx.write(item, always_write)?);
        }
        Ok(node.into())
    }

    fn copy(&self, cx: CodecCx<'_>, source: &C, target: &mut C) -> Result<(), CopyError> {
        *target = self.create_copy(cx, source)?;
        Ok(())
    }

    fn create_copy(&self, cx: CodecCx<'_>, source: &C) -> Result<C, CopyError> {
        let mut copy = C::default();
        for item in source.items() {
            copy.add(cx.create_copy(item)?);
        }
        Ok(copy)
    }
}

impl<T: DataType> DataType for VecDeque<T> {
    fn default_codec() -> Arc<dyn DynCodec> {
        CodecAdapter::shared(CollectionCodec::<Self>::new())
    }

    fn register_dependencies(registry: &mut CodecRegistry) {
        registry.register::<T>();
    }
}

impl<T: DataType + Ord> DataType for BTreeSet<T> {
    fn default_codec() -> Arc<dyn DynCodec> {
        CodecAdapter::shared(CollectionCodec::<Self>::new())
    }

    fn register_dependencies(registry: &mut CodecRegistry) {
        registry.register::<T>();
    }
}

impl<T, S> DataType for HashSet<T, S>
where
    T: DataType + Eq + Hash,
    S: BuildHasher + Default + Clone + Send + Sync + 'static,
{
    fn default_codec() -> Arc<dyn DynCodec> {
        CodecAdapter::shared(CollectionCodec::<Self>::new())
    }

    fn register_dependencies(registry: &mut CodecRegistry) {
        registry.register::<T>();
    }
}

// -----------------------------------------------------------------------------
// DictionaryCodec

/// A container read from a mapping.
pub trait DictionaryType: DataType + Default {
    type Key: DataType;
    type Item: DataType;

    /// Inserts an entry, replacing the value of an equal key.
    fn put(&mut self, key: Self::Key, item: Self::Item);

    fn entries(&self) -> impl Iterator<Item = (&Self::Key, &Self::Item)>;

    /// Number of entries.
    fn count(&self) -> usize;
}

impl<K, V, S> DictionaryType for HashMap<K, V, S>
where
    K: DataType + Eq + Hash,
    V: DataType,
    S: BuildHasher + Default + Clone + Send + Sync + 'static,
{
    type Key = K;
    type Item = V;

    #[inline]
    fn put(&mut self, key: K, item: V) {
        self.insert(key, item);
    }

    #[inline]
    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }

    #[inline]
    fn count(&self) -> usize {
        self.len()
    }
}

impl<K: DataType + Ord, V: DataType> DictionaryType for BTreeMap<K, V> {
    type Key = K;
    type Item = V;

    #[inline]
    fn put(&mut self, key: K, item: V) {
        self.insert(key, item);
    }

    #[inline]
    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }

    #[inline]
    fn count(&self) -> usize {
        self.len()
    }
}

impl<K, V, S> DictionaryType for IndexMap<K, V, S>
where
    K: DataType + Eq + Hash,
    V: DataType,
    S: BuildHasher + Default + Clone + Send + Sync + 'static,
{
    type Key = K;
    type Item = V;

    #[inline]
    fn put(&mut self, key: K, item: V) {
        self.insert(key, item);
    }

    #[inline]
    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }

    #[inline]
    fn count(&self) -> usize {
        self.len()
    }
}

/// Codec of any [`DictionaryType`].
pub struct DictionaryCodec<M>(PhantomData<fn() -> M>);

impl<M> DictionaryCodec<M> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<M> Default for DictionaryCodec<M> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

fn rebuild_dictionary<M: DictionaryType>(
    entries: &[(ResultNode, ResultNode)],
) -> Result<Box<dyn Value>, ValueMismatch> {
    let mut map = M::default();
    for (key, value) in entries {
        map.put(element::<M::Key>(key)?, element::<M::Item>(value)?);
    }
    Ok(Box::new(map))
}

impl<M: DictionaryType> TypeCodec<M> for DictionaryCodec<M> {
    #[inline]
    fn capabilities(&self) -> CodecCaps {
        CodecCaps::MAPPING
    }

    fn read_mapping(&self, cx: CodecCx<'_>, node: &MappingNode) -> Result<Decoded<M>, DecodeError> {
        let mut map = M::default();
        let mut results = Vec::with_capacity(node.len());
        for (key, value) in node {
            let key = cx.read::<M::Key>(key)?;
            let value = cx.read::<M::Item>(value)?;
            map.put(key.value, value.value);
            results.push((key.result, value.result));
        }
        let result = DictionaryResult::new(Box::new(map.clone()), results, rebuild_dictionary::<M>);
        Ok(Decoded::new(map, ResultNode::Dictionary(result)))
    }

    fn validate_mapping(&self, cx: CodecCx<'_>, node: &MappingNode) -> ValidationNode {
        ValidationNode::Mapping(
            node.iter()
                .map(|(key, value)| (cx.validate::<M::Key>(key), cx.validate::<M::Item>(value)))
                .collect(),
        )
    }

    fn write(&self, cx: CodecCx<'_>, value: &M, always_write: bool) -> Result<DataNode, EncodeError> {
        let mut node = MappingNode::with_capacity(value.count());
        for (key, item) in value.entries() {
            node.insert(cx.write(key, always_write)?, cx.write(item, always_write)?);
        }
        Ok(node.into())
    }

    fn copy(&self, cx: CodecCx<'_>, source: &M, target: &mut M) -> Result<(), CopyError> {
        *target = self.create_copy(cx, source)?;
        Ok(())
    }

    fn create_copy(&self, cx: CodecCx<'_>, source: &M) -> Result<M, CopyError> {
        let mut copy = M::default();
        for (key, item) in source.entries() {
            copy.put(cx.create_copy(key)?, cx.create_copy(item)?);
        }
        Ok(copy)
    }
}

impl<K, V, S> DataType for HashMap<K, V, S>
where
    K: DataType + Eq + Hash,
    V: DataType,
    S: BuildHasher + Default + Clone + Send + Sync + 'static,
{
    fn default_codec() -> Arc<dyn DynCodec> {
        CodecAdapter::shared(DictionaryCodec::<Self>::new())
    }

    fn register_dependencies(registry: &mut CodecRegistry) {
        registry.register::<K>();
        registry.register::<V>();
    }
}

impl<K: DataType + Ord, V: DataType> DataType for BTreeMap<K, V> {
    fn default_codec() -> Arc<dyn DynCodec> {
        CodecAdapter::shared(DictionaryCodec::<Self>::new())
    }

    fn register_dependencies(registry: &mut CodecRegistry) {
        registry.register::<K>();
        registry.register::<V>();
    }
}

impl<K, V, S> DataType for IndexMap<K, V, S>
where
    K: DataType + Eq + Hash,
    V: DataType,
    S: BuildHasher + Default + Clone + Send + Sync + 'static,
{
    fn default_codec() -> Arc<dyn DynCodec> {
        CodecAdapter::shared(DictionaryCodec::<Self>::new())
    }

    fn register_dependencies(registry: &mut CodecRegistry) {
        registry.register::<K>();
        registry.register::<V>();
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::{BTreeSet, VecDeque};
    use std::collections::HashMap;

    use indexmap::IndexMap;

    use crate::SerializationManager;
    use crate::node::{DataNode, MappingNode, SequenceNode};

    fn json(text: &str) -> DataNode {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn arrays() {
        let manager = SerializationManager::default();
        let value = manager.read_value::<Vec<u16>>(&json("[1, 2, 3]"), None).unwrap();
        assert_eq!(value, [1, 2, 3]);
        assert_eq!(
            manager.write(&value, false, None).unwrap(),
            SequenceNode::from_iter(["1", "2", "3"]).into()
        );
        assert!(manager.read_value::<Vec<u16>>(&json("[1, -2]"), None).is_err());
    }

    #[test]
    fn collections() {
        let manager = SerializationManager::default();
        let set = manager.read_value::<BTreeSet<String>>(&json(r#"["b", "a", "b"]"#), None).unwrap();
        assert_eq!(set.len(), 2);
        let queue = manager.read_value::<VecDeque<i8>>(&json("[3, 1]"), None).unwrap();
        assert_eq!(queue.front(), Some(&3));
    }

    #[test]
    fn dictionaries_keep_document_order() {
        let manager = SerializationManager::default();
        let map = manager
            .read_value::<IndexMap<String, u8>>(&json(r#"{"z": 1, "a": 2}"#), None)
            .unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), ["z", "a"]);

        let mut expected = MappingNode::new();
        expected.insert("z", "1");
        expected.insert("a", "2");
        assert_eq!(manager.write(&map, false, None).unwrap(), expected.into());
    }

    #[test]
    fn dictionary_validation_points_at_bad_entries() {
        let manager = SerializationManager::default();
        let node = json(r#"{"1": "one", "x": "two", "3": "three"}"#);
        let report = manager.validate::<HashMap<u32, String>>(&node, None);
        let errors = report.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].node, DataNode::scalar("x"));
    }

    #[test]
    fn array_copy_is_deep() {
        let manager = SerializationManager::default();
        let source = vec![vec![String::from("a")], vec![]];
        let mut target = vec![vec![String::from("old")]; 3];
        manager.copy(&source, &mut target, None).unwrap();
        assert_eq!(target, source);
        let created = manager.create_copy(&source, None).unwrap();
        assert_eq!(created, source);
    }
}
