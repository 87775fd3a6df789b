//! Hashing helpers shared by the registries and the document model.
//!
//! - [`StableHashState`]: `foldhash` with a fixed seed, so document hashes do
//!   not depend on process state.
//! - [`TypeIdHashState`]: passes the `u64` written by [`TypeId`] straight
//!   through; used for every registry keyed by type.

use core::any::TypeId;
use core::hash::{BuildHasher, Hasher};

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// StableHashState

const STABLE_SEED: FixedState = FixedState::with_seed(0x6A09E667F3BCC909);

/// Seeded `foldhash` state with deterministic output.
#[derive(Copy, Clone, Default, Debug)]
pub struct StableHashState;

impl BuildHasher for StableHashState {
    type Hasher = FoldHasher<'static>;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        STABLE_SEED.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// TypeIdHashState

/// Hasher that keeps the last `u64` it was given.
///
/// Only meant for [`TypeId`] keys, which are already well distributed.
#[derive(Copy, Clone, Default, Debug)]
pub struct TypeIdHasher {
    hash: u64,
}

impl Hasher for TypeIdHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.hash = self.hash.rotate_left(8) ^ u64::from(*byte);
        }
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }
}

/// [`BuildHasher`] for [`TypeIdHasher`].
#[derive(Copy, Clone, Default, Debug)]
pub struct TypeIdHashState;

impl BuildHasher for TypeIdHashState {
    type Hasher = TypeIdHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        TypeIdHasher { hash: 0 }
    }
}

// -----------------------------------------------------------------------------
// Maps

/// `hashbrown` map with [`StableHashState`].
pub type HashMap<K, V> = hashbrown::HashMap<K, V, StableHashState>;

/// `hashbrown` map keyed by [`TypeId`].
pub type TypeIdMap<V> = hashbrown::HashMap<TypeId, V, TypeIdHashState>;

/// Creates an empty [`TypeIdMap`].
#[inline]
pub const fn new_type_id_map<V>() -> TypeIdMap<V> {
    hashbrown::HashMap::with_hasher(TypeIdHashState)
}

#[cfg(test)]
mod tests {
    use core::any::TypeId;
    use core::hash::BuildHasher;

    use super::{StableHashState, new_type_id_map};

    #[test]
    fn stable_hash_is_repeatable() {
        let a = StableHashState.hash_one(("amount", 3_u32));
        let b = StableHashState.hash_one(("amount", 3_u32));
        assert_eq!(a, b);
    }

    #[test]
    fn type_id_map_roundtrip() {
        let mut map = new_type_id_map::<&str>();
        map.insert(TypeId::of::<u8>(), "u8");
        map.insert(TypeId::of::<String>(), "String");
        assert_eq!(map.get(&TypeId::of::<u8>()), Some(&"u8"));
        assert_eq!(map.get(&TypeId::of::<String>()), Some(&"String"));
        assert!(map.get(&TypeId::of::<i8>()).is_none());
    }
}
