use alloc::sync::Arc;
use core::any::TypeId;
use core::fmt;
use std::sync::{OnceLock, PoisonError, RwLock};

use super::TypeSchema;
use crate::error::SchemaError;
use crate::utils::{TypeIdMap, new_type_id_map};

type SchemaCell = Arc<OnceLock<Result<Arc<TypeSchema>, SchemaError>>>;

/// Cache of built schemas, keyed by type.
///
/// Each type gets one cell. The first caller builds the schema inside the
/// cell; concurrent callers for the same type block on it and then share
/// the published schema. A failed build is cached like a successful one.
pub struct SchemaRegistry {
    cells: RwLock<TypeIdMap<SchemaCell>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            cells: RwLock::new(new_type_id_map()),
        }
    }

    /// The built schema of `type_id`, if a build already finished.
    pub fn get(&self, type_id: TypeId) -> Option<Result<Arc<TypeSchema>, SchemaError>> {
        self.cells
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)?
            .get()
            .cloned()
    }

    /// Returns the schema of `type_id`, calling `build` if no build has
    /// been published yet.
    ///
    /// `build` runs at most once per type and must not request schemas.
    pub fn get_or_build(
        &self,
        type_id: TypeId,
        build: impl FnOnce() -> Result<TypeSchema, SchemaError>,
    ) -> Result<Arc<TypeSchema>, SchemaError> {
        let cell = self.cell(type_id);
        cell.get_or_init(|| {
            let schema = build().map(Arc::new);
            match &schema {
                Ok(schema) => log::debug!(
                    "built schema of `{}` with {} fields",
                    schema.type_path(),
                    schema.fields().len()
                ),
                Err(err) => log::error!("{err}"),
            }
            schema
        })
        .clone()
    }

    fn cell(&self, type_id: TypeId) -> SchemaCell {
        if let Some(cell) = self
            .cells
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
        {
            return cell.clone();
        }
        self.cells
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(type_id)
            .or_default()
            .clone()
    }

    /// Number of types with a finished build.
    pub fn len(&self) -> usize {
        self.cells
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|cell| cell.get().is_some())
            .count()
    }
}

impl Default for SchemaRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("schemas", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use core::any::TypeId;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;

    use super::SchemaRegistry;
    use crate::codec::CodecRegistry;
    use crate::error::SchemaError;
    use crate::schema::{DataDefinition, DefinitionInfo, SchemaBuilder};

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Empty;

    impl crate::DataType for Empty {
        fn default_codec() -> Arc<dyn crate::codec::DynCodec> {
            crate::codec::DefinitionCodec::<Self>::shared()
        }
    }

    impl DataDefinition for Empty {
        fn definition() -> DefinitionInfo {
            DefinitionInfo::new::<Self>()
        }
    }

    #[test]
    fn concurrent_builds_publish_once() {
        const THREADS: usize = 8;

        let registry = SchemaRegistry::new();
        let codecs = CodecRegistry::new();
        let builds = AtomicUsize::new(0);
        let barrier = Barrier::new(THREADS);

        let schemas: Vec<_> = std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(THREADS);
            for _ in 0..THREADS {
                handles.push(scope.spawn(|| {
                    barrier.wait();
                    registry
                        .get_or_build(TypeId::of::<Empty>(), || {
                            builds.fetch_add(1, Ordering::SeqCst);
                            SchemaBuilder::new(&codecs).build(Empty::definition())
                        })
                        .unwrap()
                }));
            }
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(schemas.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn failures_are_cached() {
        let registry = SchemaRegistry::new();
        let failure = || SchemaError::MissingGetter {
            type_path: "Empty",
            field: "x",
        };

        let first = registry.get_or_build(TypeId::of::<Empty>(), || Err(failure()));
        let second = registry.get_or_build(TypeId::of::<Empty>(), || unreachable!());
        assert_eq!(first.unwrap_err(), failure());
        assert_eq!(second.unwrap_err(), failure());
        assert!(registry.get(TypeId::of::<u8>()).is_none());
    }
}
