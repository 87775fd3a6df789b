use alloc::sync::Arc;
use core::any::{Any, TypeId};
use core::fmt;

use super::{DataDefinition, FieldFlags, InheritancePolicy};
use crate::codec::{CodecAdapter, DynCodec, TypeCodec};
use crate::value::{DataType, Value};

/// Reads a field from its owner. `None` if the owner has the wrong type.
pub type FieldGetter = fn(&dyn Any) -> Option<&dyn Value>;

/// Mutable form of [`FieldGetter`].
pub type FieldGetterMut = fn(&mut dyn Any) -> Option<&mut dyn Value>;

// -----------------------------------------------------------------------------
// FieldDescriptor

/// A field as declared, before the schema is built.
///
/// # Examples
///
/// ```
/// use vc_serial::schema::{FieldDescriptor, InheritancePolicy};
///
/// let field = FieldDescriptor::new::<Vec<String>>("tags")
///     .with_tag("labels")
///     .with_priority(5)
///     .with_inheritance(InheritancePolicy::Always)
///     .required();
///
/// assert_eq!(field.name(), "tags");
/// assert_eq!(field.tag(), Some("labels"));
/// assert!(field.type_is::<Vec<String>>());
/// ```
#[derive(Clone)]
pub struct FieldDescriptor {
    name: &'static str,
    tag: Option<&'static str>,
    type_id: TypeId,
    type_path: &'static str,
    priority: i32,
    flags: FieldFlags,
    inheritance: InheritancePolicy,
    include: bool,
    default_codec: fn() -> Arc<dyn DynCodec>,
    custom_codec: Option<fn() -> Arc<dyn DynCodec>>,
    getter: Option<FieldGetter>,
    getter_mut: Option<FieldGetterMut>,
}

impl FieldDescriptor {
    /// A field named `name` holding a `F`, with default settings.
    #[inline]
    pub fn new<F: DataType>(name: &'static str) -> Self {
        Self {
            name,
            tag: None,
            type_id: TypeId::of::<F>(),
            type_path: F::type_path(),
            priority: 0,
            flags: FieldFlags::empty(),
            inheritance: InheritancePolicy::Default,
            include: false,
            default_codec: F::default_codec,
            custom_codec: None,
            getter: None,
            getter_mut: None,
        }
    }

    /// Overrides the lowerCamel default tag.
    #[inline]
    pub const fn with_tag(mut self, tag: &'static str) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Higher priorities are processed first.
    #[inline]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[inline]
    pub const fn with_inheritance(mut self, inheritance: InheritancePolicy) -> Self {
        self.inheritance = inheritance;
        self
    }

    #[inline]
    pub const fn with_flags(mut self, flags: FieldFlags) -> Self {
        self.flags = self.flags.union(flags);
        self
    }

    #[inline]
    pub const fn required(self) -> Self {
        self.with_flags(FieldFlags::REQUIRED)
    }

    #[inline]
    pub const fn read_only(self) -> Self {
        self.with_flags(FieldFlags::READ_ONLY)
    }

    #[inline]
    pub const fn server_only(self) -> Self {
        self.with_flags(FieldFlags::SERVER_ONLY)
    }

    /// Reads this field from the whole enclosing mapping and splices it back
    /// on write. An included field has no tag.
    #[inline]
    pub const fn included(mut self) -> Self {
        self.include = true;
        self
    }

    /// Uses `make` instead of the registry codec, for the capabilities the
    /// codec declares.
    #[inline]
    pub const fn with_custom_codec(mut self, make: fn() -> Arc<dyn DynCodec>) -> Self {
        self.custom_codec = Some(make);
        self
    }

    #[inline]
    pub const fn with_accessors(mut self, getter: FieldGetter, getter_mut: FieldGetterMut) -> Self {
        self.getter = Some(getter);
        self.getter_mut = Some(getter_mut);
        self
    }

    /// Sets only the getter; the field can then only be read-only.
    #[inline]
    pub const fn with_getter(mut self, getter: FieldGetter) -> Self {
        self.getter = Some(getter);
        self
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The explicit tag, if any.
    #[inline]
    pub const fn tag(&self) -> Option<&'static str> {
        self.tag
    }

    #[inline]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
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
        self.include
    }

    #[inline]
    pub(crate) const fn default_codec(&self) -> fn() -> Arc<dyn DynCodec> {
        self.default_codec
    }

    #[inline]
    pub(crate) const fn custom_codec(&self) -> Option<fn() -> Arc<dyn DynCodec>> {
        self.custom_codec
    }

    #[inline]
    pub(crate) const fn getter(&self) -> Option<FieldGetter> {
        self.getter
    }

    #[inline]
    pub(crate) const fn getter_mut(&self) -> Option<FieldGetterMut> {
        self.getter_mut
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("type_path", &self.type_path)
            .field("priority", &self.priority)
            .field("flags", &self.flags)
            .field("inheritance", &self.inheritance)
            .field("include", &self.include)
            .finish_non_exhaustive()
    }
}

/// Builds a custom codec factory for a field of type `F`.
#[inline]
pub fn custom_codec<F: DataType, C: TypeCodec<F> + Default>() -> Arc<dyn DynCodec> {
    CodecAdapter::<F, C>::shared(C::default())
}

// -----------------------------------------------------------------------------
// DefinitionInfo

/// The declaration of a [`DataDefinition`]: its fields plus the functions
/// the engine needs to create and finish instances.
#[derive(Clone)]
pub struct DefinitionInfo {
    type_id: TypeId,
    type_path: &'static str,
    fields: Vec<FieldDescriptor>,
    instantiate: fn() -> Box<dyn Value>,
    after_read: fn(&mut dyn Value),
}

fn instantiate<T: DataDefinition>() -> Box<dyn Value> {
    Box::new(T::default())
}

fn after_read<T: DataDefinition>(value: &mut dyn Value) {
    if let Some(value) = value.downcast_mut::<T>() {
        value.after_deserialization();
    }
}

impl DefinitionInfo {
    /// An empty declaration for `T`.
    #[inline]
    pub fn new<T: DataDefinition>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_path: T::type_path(),
            fields: Vec::new(),
            instantiate: instantiate::<T>,
            after_read: after_read::<T>,
        }
    }

    #[inline]
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    #[inline]
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.fields.extend(fields);
        self
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
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[inline]
    pub(crate) fn into_parts(
        self,
    ) -> (
        Vec<FieldDescriptor>,
        fn() -> Box<dyn Value>,
        fn(&mut dyn Value),
    ) {
        (self.fields, self.instantiate, self.after_read)
    }
}

impl fmt::Debug for DefinitionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinitionInfo")
            .field("type_path", &self.type_path)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}
