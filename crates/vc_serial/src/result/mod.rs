//! Result trees.
//!
//! Every read produces a [`ResultNode`] next to the value. It mirrors the
//! shape of what was decoded and, for data definitions, records per field
//! whether the document set it explicitly (`mapped`). Prototype inheritance
//! is a pure result-to-result operation; see
//! [`ResultNode::push_inheritance_from`].

use alloc::sync::Arc;

use crate::codec::ComponentSet;
use crate::error::ValueMismatch;
use crate::schema::{InheritancePolicy, TypeSchema};
use crate::value::{DataType, Value};

// -----------------------------------------------------------------------------
// Modules

mod merge;

// -----------------------------------------------------------------------------
// Rebuild functions

/// Builds a container value from its element results.
pub type RebuildSequence = fn(&[ResultNode]) -> Result<Box<dyn Value>, ValueMismatch>;

/// Builds a keyed container value from its key/value results.
pub type RebuildDictionary = fn(&[(ResultNode, ResultNode)]) -> Result<Box<dyn Value>, ValueMismatch>;

// -----------------------------------------------------------------------------
// ResultNode

/// A decoded value together with how it was decoded.
///
/// Each node exclusively owns its children; merging always produces fresh
/// nodes.
#[derive(Debug, Clone)]
pub enum ResultNode {
    /// A leaf value. Merging keeps the child.
    Scalar(ScalarResult),
    /// An ordered list. Merging appends the child's elements to the parent's.
    Array(SequenceResult),
    /// A set-like container. Merged like [`ResultNode::Array`].
    Collection(SequenceResult),
    /// A keyed container. The child's keys shadow the parent's.
    Dictionary(DictionaryResult),
    /// A data definition with one entry per schema field.
    Definition(DefinitionResult),
    /// Components keyed by kind name.
    ComponentSet(ComponentSetResult),
}

impl ResultNode {
    /// A scalar result holding `value`.
    #[inline]
    pub fn scalar<T: DataType>(value: T) -> Self {
        Self::Scalar(ScalarResult::new(Box::new(value)))
    }

    /// Name of the variant, for diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Array(_) => "array",
            Self::Collection(_) => "collection",
            Self::Dictionary(_) => "dictionary",
            Self::Definition(_) => "definition",
            Self::ComponentSet(_) => "component set",
        }
    }

    /// The decoded value.
    pub fn value(&self) -> &dyn Value {
        match self {
            Self::Scalar(node) => &*node.value,
            Self::Array(node) | Self::Collection(node) => &*node.value,
            Self::Dictionary(node) => &*node.value,
            Self::Definition(node) => &*node.value,
            Self::ComponentSet(node) => &node.value,
        }
    }

    pub fn into_value(self) -> Box<dyn Value> {
        match self {
            Self::Scalar(node) => node.value,
            Self::Array(node) | Self::Collection(node) => node.value,
            Self::Dictionary(node) => node.value,
            Self::Definition(node) => node.value,
            Self::ComponentSet(node) => Box::new(node.value),
        }
    }

    #[inline]
    pub fn downcast_ref<T: DataType>(&self) -> Option<&T> {
        self.value().downcast_ref()
    }

    /// Unboxes the decoded value.
    #[inline]
    pub fn take<T: DataType>(self) -> Result<T, ValueMismatch> {
        self.into_value().take()
    }

    #[inline]
    pub const fn as_definition(&self) -> Option<&DefinitionResult> {
        match self {
            Self::Definition(node) => Some(node),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_component_set(&self) -> Option<&ComponentSetResult> {
        match self {
            Self::ComponentSet(node) => Some(node),
            _ => None,
        }
    }

    /// Element results of an array or collection.
    #[inline]
    pub fn elements(&self) -> Option<&[ResultNode]> {
        match self {
            Self::Array(node) | Self::Collection(node) => Some(&node.elements),
            _ => None,
        }
    }
}

impl PartialEq for ResultNode {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a.value.value_eq(&*b.value),
            (Self::Array(a), Self::Array(b)) | (Self::Collection(a), Self::Collection(b)) => {
                a.value.value_eq(&*b.value) && a.elements == b.elements
            }
            (Self::Dictionary(a), Self::Dictionary(b)) => {
                a.value.value_eq(&*b.value) && a.entries == b.entries
            }
            (Self::Definition(a), Self::Definition(b)) => {
                a.schema.type_id() == b.schema.type_id()
                    && a.value.value_eq(&*b.value)
                    && a.fields == b.fields
            }
            (Self::ComponentSet(a), Self::ComponentSet(b)) => {
                a.value == b.value && a.entries == b.entries
            }
            _ => false,
        }
    }
}

// -----------------------------------------------------------------------------
// ScalarResult

#[derive(Debug, Clone)]
pub struct ScalarResult {
    value: Box<dyn Value>,
}

impl ScalarResult {
    #[inline]
    pub const fn new(value: Box<dyn Value>) -> Self {
        Self { value }
    }
}

// -----------------------------------------------------------------------------
// SequenceResult

/// Result of an array or collection read.
#[derive(Debug, Clone)]
pub struct SequenceResult {
    value: Box<dyn Value>,
    elements: Vec<ResultNode>,
    rebuild: RebuildSequence,
    unique: bool,
}

impl SequenceResult {
    #[inline]
    pub const fn new(value: Box<dyn Value>, elements: Vec<ResultNode>, rebuild: RebuildSequence) -> Self {
        Self {
            value,
            elements,
            rebuild,
            unique: false,
        }
    }

    /// Marks the elements as a set: merging keeps one of each equal value.
    #[inline]
    pub const fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    #[inline]
    pub const fn is_unique(&self) -> bool {
        self.unique
    }

    #[inline]
    pub fn elements(&self) -> &[ResultNode] {
        &self.elements
    }
}

// -----------------------------------------------------------------------------
// DictionaryResult

/// Result of a keyed container read.
#[derive(Debug, Clone)]
pub struct DictionaryResult {
    value: Box<dyn Value>,
    entries: Vec<(ResultNode, ResultNode)>,
    rebuild: RebuildDictionary,
}

impl DictionaryResult {
    #[inline]
    pub const fn new(
        value: Box<dyn Value>,
        entries: Vec<(ResultNode, ResultNode)>,
        rebuild: RebuildDictionary,
    ) -> Self {
        Self {
            value,
            entries,
            rebuild,
        }
    }

    #[inline]
    pub fn entries(&self) -> &[(ResultNode, ResultNode)] {
        &self.entries
    }
}

// -----------------------------------------------------------------------------
// DefinitionResult

/// How one schema field was decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
    /// The document set this field explicitly.
    pub mapped: bool,
    pub inheritance: InheritancePolicy,
    /// Present for mapped fields.
    pub result: Option<ResultNode>,
}

impl FieldEntry {
    #[inline]
    pub const fn unmapped(inheritance: InheritancePolicy) -> Self {
        Self {
            mapped: false,
            inheritance,
            result: None,
        }
    }

    #[inline]
    pub const fn mapped(inheritance: InheritancePolicy, result: ResultNode) -> Self {
        Self {
            mapped: true,
            inheritance,
            result: Some(result),
        }
    }
}

/// Result of a data definition read.
///
/// `fields` follows the schema's field order.
#[derive(Debug, Clone)]
pub struct DefinitionResult {
    value: Box<dyn Value>,
    schema: Arc<TypeSchema>,
    fields: Vec<FieldEntry>,
}

impl DefinitionResult {
    #[inline]
    pub const fn new(value: Box<dyn Value>, schema: Arc<TypeSchema>, fields: Vec<FieldEntry>) -> Self {
        Self {
            value,
            schema,
            fields,
        }
    }

    #[inline]
    pub fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    #[inline]
    pub fn fields(&self) -> &[FieldEntry] {
        &self.fields
    }

    /// The entry of the field tagged `tag`.
    pub fn field(&self, tag: &str) -> Option<&FieldEntry> {
        self.fields.get(self.schema.field_index(tag)?)
    }

    /// Whether the field tagged `tag` was set by the document.
    #[inline]
    pub fn is_mapped(&self, tag: &str) -> bool {
        self.field(tag).is_some_and(|entry| entry.mapped)
    }
}

// -----------------------------------------------------------------------------
// ComponentSetResult

/// One component of a [`ComponentSetResult`].
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentEntry {
    pub kind: Box<str>,
    /// Capability markers of the kind, including its own name.
    pub references: Arc<[Box<str>]>,
    pub result: ResultNode,
}

impl ComponentEntry {
    /// Two kinds conflict when they share a capability marker.
    pub fn conflicts_with(&self, other: &ComponentEntry) -> bool {
        self.references
            .iter()
            .any(|marker| other.references.contains(marker))
    }
}

/// Result of a component set read.
#[derive(Debug, Clone)]
pub struct ComponentSetResult {
    value: ComponentSet,
    entries: Vec<ComponentEntry>,
}

impl ComponentSetResult {
    #[inline]
    pub const fn new(value: ComponentSet, entries: Vec<ComponentEntry>) -> Self {
        Self { value, entries }
    }

    /// Rebuilds the set from `entries`.
    pub fn from_entries(entries: Vec<ComponentEntry>) -> Self {
        let mut value = ComponentSet::new();
        for entry in &entries {
            value.insert_value(&entry.kind, entry.result.value().clone_value());
        }
        Self { value, entries }
    }

    #[inline]
    pub fn entries(&self) -> &[ComponentEntry] {
        &self.entries
    }

    #[inline]
    pub fn entry(&self, kind: &str) -> Option<&ComponentEntry> {
        self.entries.iter().find(|entry| &*entry.kind == kind)
    }
}
