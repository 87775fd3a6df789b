use alloc::sync::Arc;
use core::any::TypeId;
use core::fmt;

use super::{FieldFlags, FieldGetter, FieldGetterMut, InheritancePolicy};
use crate::codec::{CodecCaps, DynCodec};
use crate::node::NodeKind;
use crate::value::Value;

/// A field of a built [`TypeSchema`](super::TypeSchema).
///
/// Holds the resolved tag, the default value and the codecs used for each
/// operation.
pub struct FieldDefinition {
    pub(super) name: &'static str,
    pub(super) tag: Option<Box<str>>,
    pub(super) type_id: TypeId,
    pub(super) type_path: &'static str,
    pub(super) priority: i32,
    pub(super) flags: FieldFlags,
    pub(super) inheritance: InheritancePolicy,
    pub(super) default_value: Box<dyn Value>,
    pub(super) codec: Arc<dyn DynCodec>,
    pub(super) custom: Option<Arc<dyn DynCodec>>,
    pub(super) getter: FieldGetter,
    pub(super) getter_mut: Option<FieldGetterMut>,
}

impl FieldDefinition {
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The document key; `None` for an included field.
    #[inline]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    #[inline]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.type_path
    }

    #[inline]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    #[inline]
    pub const fn flags(&self) -> FieldFlags {
        self.flags
    }

    #[inline]
    pub const fn inheritance(&self) -> InheritancePolicy {
        self.inheritance
    }

    #[inline]
    pub const fn is_include(&self) -> bool {
        self.tag.is_none()
    }

    #[inline]
    pub const fn is_required(&self) -> bool {
        self.flags.contains(FieldFlags::REQUIRED)
    }

    #[inline]
    pub const fn is_read_only(&self) -> bool {
        self.flags.contains(FieldFlags::READ_ONLY)
    }

    #[inline]
    pub const fn is_server_only(&self) -> bool {
        self.flags.contains(FieldFlags::SERVER_ONLY)
    }

    /// Whether a peer with the given authority reads and writes this field.
    #[inline]
    pub const fn is_visible(&self, authoritative: bool) -> bool {
        authoritative || !self.is_server_only()
    }

    /// The value of this field in a default instance of its owner.
    #[inline]
    pub fn default_value(&self) -> &dyn Value {
        &*self.default_value
    }

    /// The registry codec of the declared type.
    #[inline]
    pub fn codec(&self) -> &Arc<dyn DynCodec> {
        &self.codec
    }

    #[inline]
    pub fn custom_codec(&self) -> Option<&Arc<dyn DynCodec>> {
        self.custom.as_ref()
    }

    /// Reads this field from `owner`.
    #[inline]
    pub fn get<'a>(&self, owner: &'a dyn Value) -> Option<&'a dyn Value> {
        (self.getter)(owner.as_any())
    }

    /// Mutable access to this field; `None` if `owner` has the wrong type
    /// or the field has no mutable accessor.
    #[inline]
    pub fn get_mut<'a>(&self, owner: &'a mut dyn Value) -> Option<&'a mut dyn Value> {
        let getter_mut = self.getter_mut?;
        getter_mut(owner.as_any_mut())
    }

    #[inline]
    pub const fn is_settable(&self) -> bool {
        self.getter_mut.is_some()
    }

    /// The custom codec if it declares `caps`, otherwise the registry codec.
    fn pick(&self, caps: CodecCaps) -> &Arc<dyn DynCodec> {
        match &self.custom {
            Some(custom) if custom.capabilities().contains(caps) => custom,
            _ => &self.codec,
        }
    }

    /// The codec that reads a node of shape `kind`.
    #[inline]
    pub fn reader(&self, kind: NodeKind) -> &Arc<dyn DynCodec> {
        self.pick(match kind {
            NodeKind::Scalar => CodecCaps::READ_SCALAR,
            NodeKind::Sequence => CodecCaps::READ_SEQUENCE,
            NodeKind::Mapping => CodecCaps::READ_MAPPING,
        })
    }

    /// The codec that validates a node of shape `kind`.
    ///
    /// A custom codec that reads the shape without validating it is still
    /// preferred, so validation agrees with reading.
    pub fn validator(&self, kind: NodeKind) -> &Arc<dyn DynCodec> {
        match &self.custom {
            Some(custom)
                if custom.capabilities().validates(kind) || custom.capabilities().reads(kind) =>
            {
                custom
            }
            _ => &self.codec,
        }
    }

    #[inline]
    pub fn writer(&self) -> &Arc<dyn DynCodec> {
        self.pick(CodecCaps::WRITE)
    }

    #[inline]
    pub fn copier(&self) -> &Arc<dyn DynCodec> {
        self.pick(CodecCaps::COPY)
    }

    /// Structural equality through the field's codec.
    #[inline]
    pub fn values_equal(&self, a: &dyn Value, b: &dyn Value) -> bool {
        self.custom.as_ref().unwrap_or(&self.codec).equals(a, b)
    }

    /// Whether `value` equals this field's default.
    #[inline]
    pub fn is_default(&self, value: &dyn Value) -> bool {
        self.values_equal(value, &*self.default_value)
    }
}

impl fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("type_path", &self.type_path)
            .field("priority", &self.priority)
            .field("flags", &self.flags)
            .field("inheritance", &self.inheritance)
            .field("default_value", &self.default_value)
            .field("codec", &self.codec.codec_name())
            .field("custom", &self.custom.as_ref().map(|codec| codec.codec_name()))
            .finish()
    }
}
