use core::any::{Any, TypeId};
use core::fmt;

use crate::utils::{TypeIdMap, new_type_id_map};

/// Per-call bag handed to every codec.
///
/// The engine never looks inside; codecs use it for their own needs,
/// e.g. whether this is a prototype-definition pass, or any typed value
/// inserted by the caller.
///
/// # Examples
///
/// ```
/// use vc_serial::SerializationContext;
///
/// struct Scale(f32);
///
/// let mut cx = SerializationContext::for_prototypes();
/// cx.insert(Scale(2.0));
/// assert!(cx.is_prototype_pass());
/// assert_eq!(cx.get::<Scale>().map(|s| s.0), Some(2.0));
/// ```
#[derive(Default)]
pub struct SerializationContext {
    prototype_pass: bool,
    extensions: Option<TypeIdMap<Box<dyn Any + Send + Sync>>>,
}

impl SerializationContext {
    #[inline]
    pub const fn new() -> Self {
        Self {
            prototype_pass: false,
            extensions: None,
        }
    }

    /// A context for reading or writing prototype definitions.
    #[inline]
    pub const fn for_prototypes() -> Self {
        Self {
            prototype_pass: true,
            extensions: None,
        }
    }

    #[inline]
    pub const fn is_prototype_pass(&self) -> bool {
        self.prototype_pass
    }

    /// Stores `value`, returning the previous value of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) -> Option<T> {
        self.extensions
            .get_or_insert_with(new_type_id_map)
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    #[inline]
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.extensions
            .as_ref()?
            .get(&TypeId::of::<T>())?
            .downcast_ref()
    }

    #[inline]
    pub fn get_mut<T: Any + Send + Sync>(&mut self) -> Option<&mut T> {
        self.extensions
            .as_mut()?
            .get_mut(&TypeId::of::<T>())?
            .downcast_mut()
    }

    #[inline]
    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.extensions
            .as_ref()
            .is_some_and(|map| map.contains_key(&TypeId::of::<T>()))
    }
}

impl fmt::Debug for SerializationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializationContext")
            .field("prototype_pass", &self.prototype_pass)
            .field("extensions", &self.extensions.as_ref().map_or(0, |map| map.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::SerializationContext;

    #[test]
    fn extensions_are_typed() {
        let mut cx = SerializationContext::new();
        assert!(!cx.contains::<u32>());
        assert_eq!(cx.insert(3_u32), None);
        assert_eq!(cx.insert(4_u32), Some(3));
        *cx.get_mut::<u32>().unwrap() += 1;
        assert_eq!(cx.get::<u32>(), Some(&5));
        assert_eq!(cx.get::<i32>(), None);
    }
}
