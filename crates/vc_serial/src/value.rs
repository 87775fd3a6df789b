use alloc::sync::Arc;
use core::any::{Any, TypeId};
use core::fmt;

use crate::codec::{CodecRegistry, DynCodec};
use crate::error::ValueMismatch;

// -----------------------------------------------------------------------------
// DataType

/// A type that can be stored in a data field.
///
/// The engine reads, writes, copies and compares values through the codec
/// returned by [`DataType::default_codec`], unless the [`CodecRegistry`]
/// holds an override for the type or the field names a custom codec.
///
/// Implemented for primitives, `String`, `Option`, the std collections,
/// `IndexMap`, [`ComponentSet`](crate::codec::ComponentSet) and
/// [`DataNode`](crate::node::DataNode). Structs get it from
/// `#[derive(DataDefinition)]`; `FromStr + Display` types can use
/// [`impl_scalar_data_type!`](crate::impl_scalar_data_type).
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be stored in a data field",
    note = "consider `#[derive(DataDefinition)]` or `impl_scalar_data_type!`"
)]
pub trait DataType: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Name used in diagnostics.
    fn type_path() -> &'static str {
        core::any::type_name::<Self>()
    }

    /// The built-in codec for this type.
    fn default_codec() -> Arc<dyn DynCodec>;

    /// Registers the types this type is built from.
    ///
    /// Called once by [`CodecRegistry::register`] after `Self` was inserted.
    fn register_dependencies(_registry: &mut CodecRegistry) {}
}

// -----------------------------------------------------------------------------
// Value

/// Object-safe form of a [`DataType`].
///
/// Result trees, defaults and component sets store values as
/// `Box<dyn Value>`; every [`DataType`] implements it.
pub trait Value: Any + Send + Sync {
    fn value_type_path(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Deep copy through `Clone`.
    fn clone_value(&self) -> Box<dyn Value>;

    /// Structural equality; `false` for different types.
    fn value_eq(&self, other: &dyn Value) -> bool;

    /// Replaces `self` with `value` if both have the same type.
    fn assign(&mut self, value: Box<dyn Value>) -> Result<(), ValueMismatch>;

    fn debug_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T: DataType> Value for T {
    #[inline]
    fn value_type_path(&self) -> &'static str {
        <T as DataType>::type_path()
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    #[inline]
    fn clone_value(&self) -> Box<dyn Value> {
        Box::new(self.clone())
    }

    fn value_eq(&self, other: &dyn Value) -> bool {
        match other.as_any().downcast_ref::<T>() {
            Some(other) => self == other,
            None => false,
        }
    }

    fn assign(&mut self, value: Box<dyn Value>) -> Result<(), ValueMismatch> {
        let found = value.value_type_path();
        match value.into_any().downcast::<T>() {
            Ok(value) => {
                *self = *value;
                Ok(())
            }
            Err(_) => Err(ValueMismatch::new(<T as DataType>::type_path(), found)),
        }
    }

    #[inline]
    fn debug_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl dyn Value {
    /// The [`TypeId`] of the concrete value.
    #[inline]
    pub fn value_type_id(&self) -> TypeId {
        self.as_any().type_id()
    }

    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }

    /// Unboxes the concrete value.
    pub fn take<T: DataType>(self: Box<Self>) -> Result<T, ValueMismatch> {
        let found = self.value_type_path();
        self.into_any()
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| ValueMismatch::new(T::type_path(), found))
    }
}

impl fmt::Debug for dyn Value {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.debug_value(f)
    }
}

impl PartialEq for dyn Value {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.value_eq(other)
    }
}

impl Clone for Box<dyn Value> {
    #[inline]
    fn clone(&self) -> Self {
        (**self).clone_value()
    }
}

#[cfg(test)]
mod tests {
    use super::Value;

    #[test]
    fn erased_equality_and_clone() {
        let a: Box<dyn Value> = Box::new(vec![1_i32, 2]);
        let b = a.clone();
        assert_eq!(&*a, &*b);
        assert!(b.is::<Vec<i32>>());

        let c: Box<dyn Value> = Box::new(vec![1_i64, 2]);
        assert!(!a.value_eq(&*c));
    }

    #[test]
    fn assign_and_take() {
        let mut slot: Box<dyn Value> = Box::new(String::from("old"));
        slot.assign(Box::new(String::from("new"))).unwrap();
        assert_eq!(slot.downcast_ref::<String>().map(String::as_str), Some("new"));

        let err = slot.assign(Box::new(3_u8)).unwrap_err();
        assert_eq!(err.found, "u8");

        assert_eq!(slot.take::<String>().unwrap(), "new");
    }
}
