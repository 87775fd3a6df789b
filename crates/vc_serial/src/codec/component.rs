//! Component sets: heterogeneous values keyed by kind name.
//!
//! In a document a component set is a sequence of mappings. Each mapping
//! names its kind under the `type` key; the other keys are read with the
//! codec of the type registered for that kind:
//!
//! ```yaml
//! - type: Sprite
//!   layer: 2
//! - type: Physics
//! ```

use alloc::sync::Arc;
use core::any::TypeId;
use core::fmt;

use indexmap::IndexMap;

use super::{CodecAdapter, CodecCaps, CodecCx, Decoded, DynCodec, TypeCodec};
use crate::error::{CopyError, DecodeError, EncodeError};
use crate::node::{DataNode, MappingNode, SequenceNode};
use crate::result::{ComponentEntry, ComponentSetResult, ResultNode};
use crate::utils::{HashMap, StableHashState};
use crate::validation::ValidationNode;
use crate::value::{DataType, Value};

/// Key naming the kind of a component entry.
pub const TYPE_KEY: &str = "type";

// -----------------------------------------------------------------------------
// ComponentKind

/// A registered component kind.
#[derive(Clone)]
pub struct ComponentKind {
    name: Box<str>,
    type_id: TypeId,
    type_path: &'static str,
    references: Arc<[Box<str>]>,
    codec: fn() -> Arc<dyn DynCodec>,
}

impl ComponentKind {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.type_path
    }

    /// Capability markers, starting with the kind's own name.
    #[inline]
    pub fn references(&self) -> &Arc<[Box<str>]> {
        &self.references
    }

    /// Two kinds conflict when they share a capability marker. A parent's
    /// component is dropped on merge if it conflicts with one of the child's.
    pub fn conflicts_with(&self, other: &ComponentKind) -> bool {
        self.references
            .iter()
            .any(|marker| other.references.contains(marker))
    }
}

impl fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentKind")
            .field("name", &self.name)
            .field("type_path", &self.type_path)
            .field("references", &self.references)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// ComponentKinds

/// Registry of component kinds by name.
///
/// # Examples
///
/// ```
/// use vc_serial::codec::ComponentKinds;
///
/// let mut kinds = ComponentKinds::new();
/// kinds.register::<u32>("Health", &["Damageable"]);
/// kinds.register::<u32>("Armor", &["Damageable"]);
/// kinds.register::<String>("Label", &[]);
///
/// assert!(kinds.conflicts("Health", "Armor"));
/// assert!(!kinds.conflicts("Health", "Label"));
/// ```
#[derive(Debug, Default)]
pub struct ComponentKinds {
    kinds: HashMap<Box<str>, ComponentKind>,
}

impl ComponentKinds {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` as a kind holding a `T`, with extra capability
    /// markers. Returns the kind previously registered under `name`.
    pub fn register<T: DataType>(&mut self, name: &str, markers: &[&str]) -> Option<ComponentKind> {
        let references = core::iter::once(name)
            .chain(markers.iter().copied().filter(|marker| *marker != name))
            .map(Box::from)
            .collect();
        let kind = ComponentKind {
            name: name.into(),
            type_id: TypeId::of::<T>(),
            type_path: T::type_path(),
            references,
            codec: T::default_codec,
        };
        let previous = self.kinds.insert(name.into(), kind);
        if previous.is_some() {
            log::warn!("replacing component kind `{name}`");
        }
        previous
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&ComponentKind> {
        self.kinds.get(name)
    }

    /// Whether two registered kinds share a capability marker.
    pub fn conflicts(&self, a: &str, b: &str) -> bool {
        match (self.get(a), self.get(b)) {
            (Some(a), Some(b)) => a.conflicts_with(b),
            _ => false,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentKind> {
        self.kinds.values()
    }
}

// -----------------------------------------------------------------------------
// ComponentSet

/// Components keyed by kind name, in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentSet {
    entries: IndexMap<Box<str>, Box<dyn Value>, StableHashState>,
}

impl ComponentSet {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn contains(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }

    /// Inserts `value` as the `kind` component, returning the previous one.
    #[inline]
    pub fn insert<T: DataType>(&mut self, kind: &str, value: T) -> Option<Box<dyn Value>> {
        self.insert_value(kind, Box::new(value))
    }

    pub fn insert_value(&mut self, kind: &str, value: Box<dyn Value>) -> Option<Box<dyn Value>> {
        self.entries.insert(kind.into(), value)
    }

    #[inline]
    pub fn get<T: DataType>(&self, kind: &str) -> Option<&T> {
        self.get_value(kind)?.downcast_ref()
    }

    #[inline]
    pub fn get_mut<T: DataType>(&mut self, kind: &str) -> Option<&mut T> {
        self.entries.get_mut(kind)?.downcast_mut()
    }

    #[inline]
    pub fn get_value(&self, kind: &str) -> Option<&dyn Value> {
        self.entries.get(kind).map(|value| &**value)
    }

    #[inline]
    pub fn remove(&mut self, kind: &str) -> Option<Box<dyn Value>> {
        self.entries.shift_remove(kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Value)> {
        self.entries.iter().map(|(kind, value)| (&**kind, &**value))
    }
}

impl DataType for ComponentSet {
    fn type_path() -> &'static str {
        "ComponentSet"
    }

    fn default_codec() -> Arc<dyn DynCodec> {
        CodecAdapter::shared(ComponentSetCodec)
    }
}

// -----------------------------------------------------------------------------
// ComponentSetCodec

/// Codec of [`ComponentSet`], resolving kinds through the manager's
/// [`ComponentKinds`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ComponentSetCodec;

impl ComponentSetCodec {
    fn kind<'a>(cx: CodecCx<'a>, name: &str) -> Option<(&'a ComponentKind, Arc<dyn DynCodec>)> {
        let kind = cx.manager().components().get(name)?;
        let codec = cx
            .manager()
            .codecs()
            .get_or_insert_with(kind.type_id, kind.codec);
        Some((kind, codec))
    }

    /// Splits an entry into its kind name and the remaining fields.
    fn split(node: &DataNode) -> Result<(&str, MappingNode), DecodeError> {
        let mapping = node.as_mapping().ok_or(DecodeError::MissingComponentType)?;
        let name = mapping
            .get(TYPE_KEY)
            .and_then(DataNode::as_scalar)
            .ok_or(DecodeError::MissingComponentType)?
            .value();
        let mut fields = mapping.clone();
        fields.remove(TYPE_KEY);
        Ok((name, fields))
    }
}

impl TypeCodec<ComponentSet> for ComponentSetCodec {
    #[inline]
    fn capabilities(&self) -> CodecCaps {
        CodecCaps::SEQUENCE
    }

    fn read_sequence(
        &self,
        cx: CodecCx<'_>,
        node: &SequenceNode,
    ) -> Result<Decoded<ComponentSet>, DecodeError> {
        let mut set = ComponentSet::new();
        let mut entries = Vec::with_capacity(node.len());
        for item in node {
            let (name, fields) = Self::split(item)?;
            let (kind, codec) =
                Self::kind(cx, name).ok_or_else(|| DecodeError::UnknownComponent(name.into()))?;
            if set.contains(name) {
                return Err(DecodeError::DuplicateComponent(name.into()));
            }
            let decoded = codec
                .read_mapping(cx, &fields)
                .map_err(|err| err.in_field(ComponentSet::type_path(), name))?;
            set.insert_value(name, decoded.value);
            entries.push(ComponentEntry {
                kind: kind.name.clone(),
                references: kind.references.clone(),
                result: decoded.result,
            });
        }
        let result = ComponentSetResult::new(set.clone(), entries);
        Ok(Decoded::new(set, ResultNode::ComponentSet(result)))
    }

    fn validate_sequence(&self, cx: CodecCx<'_>, node: &SequenceNode) -> ValidationNode {
        let mut seen = Vec::with_capacity(node.len());
        let items = node
            .iter()
            .map(|item| {
                let (name, fields) = match Self::split(item) {
                    Ok(split) => split,
                    Err(err) => return ValidationNode::error(item.clone(), err.to_string()),
                };
                let Some((_, codec)) = Self::kind(cx, name) else {
                    let err = DecodeError::UnknownComponent(name.into());
                    return ValidationNode::error(item.clone(), err.to_string());
                };
                if seen.contains(&name) {
                    let err = DecodeError::DuplicateComponent(name.into());
                    return ValidationNode::error(item.clone(), err.to_string());
                }
                seen.push(name);
                codec.validate_mapping(cx, &fields)
            })
            .collect();
        ValidationNode::Sequence(items)
    }

    fn write(&self, cx: CodecCx<'_>, value: &ComponentSet, always_write: bool) -> Result<DataNode, EncodeError> {
        let mut node = SequenceNode::with_capacity(value.len());
        for (name, component) in value.iter() {
            let (_, codec) = Self::kind(cx, name)
                .ok_or_else(|| EncodeError::custom(format!("unknown component kind `{name}`")))?;
            let DataNode::Mapping(fields) = codec.write(cx, component, always_write)? else {
                return Err(EncodeError::custom(format!(
                    "component `{name}` did not write a mapping"
                )));
            };
            let mut entry = MappingNode::with_capacity(fields.len() + 1);
            entry.insert(TYPE_KEY, name);
            entry.splice(fields);
            node.push(entry);
        }
        Ok(node.into())
    }

    fn copy(&self, cx: CodecCx<'_>, source: &ComponentSet, target: &mut ComponentSet) -> Result<(), CopyError> {
        target.entries.retain(|name, _| source.contains(name));
        for (name, component) in source.iter() {
            let (_, codec) = Self::kind(cx, name)
                .ok_or_else(|| CopyError::custom(format!("unknown component kind `{name}`")))?;
            let reuse = target
                .get_value(name)
                .is_some_and(|existing| existing.value_type_id() == component.value_type_id());
            match target.entries.get_mut(name) {
                Some(existing) if reuse => codec.copy(cx, component, &mut **existing)?,
                _ => {
                    target.insert_value(name, codec.create_copy(cx, component)?);
                }
            }
        }
        Ok(())
    }

    fn create_copy(&self, cx: CodecCx<'_>, source: &ComponentSet) -> Result<ComponentSet, CopyError> {
        let mut copy = ComponentSet::new();
        self.copy(cx, source, &mut copy)?;
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;

    use super::ComponentSet;
    use crate::error::DecodeError;
    use crate::node::DataNode;
    use crate::{SerializationConfig, SerializationManager};

    type Stats = BTreeMap<String, u32>;

    fn manager() -> SerializationManager {
        let mut manager = SerializationManager::new(SerializationConfig::DEFAULT);
        manager
            .register_component::<Stats>("Health", &["Damageable"])
            .register_component::<Stats>("Armor", &["Damageable"])
            .register_component::<BTreeMap<String, String>>("Label", &[]);
        manager
    }

    fn json(text: &str) -> DataNode {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn read_and_write() {
        let manager = manager();
        let node = json(r#"[{"type": "Health", "max": 10}, {"type": "Label", "text": "crate"}]"#);
        let set = manager.read_value::<ComponentSet>(&node, None).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get::<Stats>("Health").and_then(|s| s.get("max")), Some(&10));
        assert_eq!(manager.write(&set, false, None).unwrap(), node);
    }

    #[test]
    fn unknown_and_duplicate_kinds() {
        let manager = manager();
        let err = manager
            .read_value::<ComponentSet>(&json(r#"[{"type": "Mana"}]"#), None)
            .unwrap_err();
        assert_eq!(err, DecodeError::UnknownComponent("Mana".into()));

        let err = manager
            .read_value::<ComponentSet>(&json(r#"[{"type": "Label"}, {"type": "Label"}]"#), None)
            .unwrap_err();
        assert_eq!(err, DecodeError::DuplicateComponent("Label".into()));

        let err = manager
            .read_value::<ComponentSet>(&json(r#"[{"name": "Label"}]"#), None)
            .unwrap_err();
        assert_eq!(err, DecodeError::MissingComponentType);
    }

    #[test]
    fn validation_reports_each_entry() {
        let manager = manager();
        let node = json(r#"[{"type": "Mana"}, {"type": "Armor", "value": "x"}, {"type": "Label"}]"#);
        let report = manager.validate::<ComponentSet>(&node, None);
        assert_eq!(report.errors().len(), 2);
    }

    #[test]
    fn copy_replaces_and_removes() {
        let manager = manager();
        let mut source = ComponentSet::new();
        source.insert("Health", Stats::from([("max".into(), 5)]));
        let mut target = ComponentSet::new();
        target.insert("Health", Stats::from([("min".into(), 1)]));
        target.insert("Armor", Stats::new());

        manager.copy(&source, &mut target, None).unwrap();
        assert_eq!(target, source);
    }
}
