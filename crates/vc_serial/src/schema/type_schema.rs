use core::any::TypeId;
use core::fmt;

use super::FieldDefinition;
use crate::error::ValueMismatch;
use crate::result::FieldEntry;
use crate::utils::HashMap;
use crate::value::Value;

/// The built schema of a [`DataDefinition`](super::DataDefinition).
///
/// Immutable once built and shared through `Arc`.
pub struct TypeSchema {
    pub(super) type_id: TypeId,
    pub(super) type_path: &'static str,
    /// Sorted by descending priority; declaration order among equals.
    pub(super) fields: Box<[FieldDefinition]>,
    pub(super) tags: HashMap<Box<str>, usize>,
    pub(super) includes: Box<[usize]>,
    pub(super) instantiate: fn() -> Box<dyn Value>,
    pub(super) after_read: fn(&mut dyn Value),
}

impl TypeSchema {
    #[inline]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.type_path
    }

    /// All fields, in processing order.
    #[inline]
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    #[inline]
    pub fn field(&self, index: usize) -> Option<&FieldDefinition> {
        self.fields.get(index)
    }

    /// Index of the field tagged `tag`.
    #[inline]
    pub fn field_index(&self, tag: &str) -> Option<usize> {
        self.tags.get(tag).copied()
    }

    #[inline]
    pub fn field_by_tag(&self, tag: &str) -> Option<&FieldDefinition> {
        self.fields.get(self.field_index(tag)?)
    }

    /// The included fields, in processing order.
    pub fn includes(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.includes.iter().map(|&index| &self.fields[index])
    }

    /// A new default instance.
    #[inline]
    pub fn instantiate(&self) -> Box<dyn Value> {
        (self.instantiate)()
    }

    /// Runs the type's `after_deserialization` hook on `value`.
    #[inline]
    pub fn run_after_read(&self, value: &mut dyn Value) {
        (self.after_read)(value);
    }

    /// Builds an instance from per-field results.
    ///
    /// Starts from a default instance and sets every mapped field whose value
    /// differs from the default, then runs the hook if `run_hooks`.
    ///
    /// `entries` must follow [`TypeSchema::fields`].
    pub fn instantiate_from(
        &self,
        entries: &[FieldEntry],
        run_hooks: bool,
    ) -> Result<Box<dyn Value>, ValueMismatch> {
        let mut value = self.instantiate();
        self.apply_mapped(entries, &mut *value)?;
        if run_hooks {
            self.run_after_read(&mut *value);
        }
        Ok(value)
    }

    /// Sets every mapped, non-default field of `target` from `entries`.
    ///
    /// Unmapped fields keep whatever `target` holds. `entries` must follow
    /// [`TypeSchema::fields`].
    pub fn apply_mapped(&self, entries: &[FieldEntry], target: &mut dyn Value) -> Result<(), ValueMismatch> {
        for (field, entry) in self.fields.iter().zip(entries) {
            let Some(result) = entry.result.as_ref().filter(|_| entry.mapped) else {
                continue;
            };
            let result = result.value();
            if field.is_default(result) {
                continue;
            }
            if let Some(slot) = field.get_mut(target) {
                slot.assign(result.clone_value())?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for TypeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSchema")
            .field("type_path", &self.type_path)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}
