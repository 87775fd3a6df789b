use alloc::collections::BTreeSet;
use core::cmp::Reverse;

use super::{DefinitionInfo, FieldDefinition, FieldDescriptor, TypeSchema, lower_camel};
use crate::codec::CodecRegistry;
use crate::error::SchemaError;
use crate::utils::HashMap;
use crate::value::Value;

/// Turns a [`DefinitionInfo`] into a [`TypeSchema`].
///
/// Field codecs are resolved through the given registry; types it does not
/// know yet get their default codec inserted.
///
/// # Examples
///
/// ```
/// use vc_serial::codec::CodecRegistry;
/// use vc_serial::schema::{DataDefinition, SchemaBuilder};
/// # use vc_serial::schema::{DefinitionInfo, FieldDescriptor};
/// # use vc_serial::{DataType, Value};
/// # #[derive(Debug, Clone, PartialEq, Default)]
/// # struct Door { locked: bool }
/// # impl DataType for Door {
/// #     fn default_codec() -> std::sync::Arc<dyn vc_serial::codec::DynCodec> {
/// #         vc_serial::codec::DefinitionCodec::<Self>::shared()
/// #     }
/// # }
/// # impl DataDefinition for Door {
/// #     fn definition() -> DefinitionInfo {
/// #         DefinitionInfo::new::<Self>().with_field(FieldDescriptor::new::<bool>("locked").with_accessors(
/// #             |o| o.downcast_ref::<Self>().map(|o| &o.locked as &dyn Value),
/// #             |o| o.downcast_mut::<Self>().map(|o| &mut o.locked as &mut dyn Value),
/// #         ))
/// #     }
/// # }
///
/// let registry = CodecRegistry::with_primitives();
/// let schema = SchemaBuilder::new(&registry).build(Door::definition()).unwrap();
/// assert!(schema.field_by_tag("locked").is_some());
/// ```
pub struct SchemaBuilder<'a> {
    registry: &'a CodecRegistry,
}

impl<'a> SchemaBuilder<'a> {
    #[inline]
    pub const fn new(registry: &'a CodecRegistry) -> Self {
        Self { registry }
    }

    /// Builds the schema.
    ///
    /// # Errors
    ///
    /// Fails on the first defect found: a missing accessor, a custom codec
    /// with no capability, or two fields sharing a tag.
    pub fn build(&self, info: DefinitionInfo) -> Result<TypeSchema, SchemaError> {
        let type_id = info.type_id();
        let type_path = info.type_path();
        let (mut descriptors, instantiate, after_read) = info.into_parts();

        // Stable: equal priorities keep declaration order.
        descriptors.sort_by_key(|field| Reverse(field.priority()));

        let defaults = instantiate();
        let mut fields = Vec::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            fields.push(self.build_field(type_path, descriptor, &*defaults)?);
        }

        let mut tags = HashMap::<Box<str>, usize>::default();
        let mut duplicates = BTreeSet::new();
        let mut includes = Vec::new();
        for (index, field) in fields.iter().enumerate() {
            match field.tag() {
                None => includes.push(index),
                Some(tag) => {
                    if tags.insert(tag.into(), index).is_some() {
                        duplicates.insert(String::from(tag));
                    }
                }
            }
        }
        if !duplicates.is_empty() {
            return Err(SchemaError::DuplicateTags {
                type_path,
                tags: duplicates.into_iter().collect(),
            });
        }

        Ok(TypeSchema {
            type_id,
            type_path,
            fields: fields.into_boxed_slice(),
            tags,
            includes: includes.into_boxed_slice(),
            instantiate,
            after_read,
        })
    }

    fn build_field(
        &self,
        type_path: &'static str,
        descriptor: &FieldDescriptor,
        defaults: &dyn Value,
    ) -> Result<FieldDefinition, SchemaError> {
        let name = descriptor.name();
        let missing_getter = || SchemaError::MissingGetter {
            type_path,
            field: name,
        };

        let getter = descriptor.getter().ok_or_else(missing_getter)?;
        let default_value = getter(defaults.as_any())
            .ok_or_else(missing_getter)?
            .clone_value();

        let read_only = descriptor.flags().contains(super::FieldFlags::READ_ONLY);
        if descriptor.getter_mut().is_none() && !read_only {
            return Err(SchemaError::MissingSetter {
                type_path,
                field: name,
            });
        }

        let custom = match descriptor.custom_codec() {
            Some(make) => {
                let codec = make();
                if codec.capabilities().is_empty() {
                    return Err(SchemaError::NoCodecCapability {
                        type_path,
                        field: name,
                        codec: codec.codec_name(),
                    });
                }
                Some(codec)
            }
            None => None,
        };

        let codec = self
            .registry
            .get_or_insert_with(descriptor.type_id(), descriptor.default_codec());

        let tag = if descriptor.is_include() {
            None
        } else {
            Some(match descriptor.tag() {
                Some(tag) => tag.into(),
                None => lower_camel(name).into_boxed_str(),
            })
        };

        Ok(FieldDefinition {
            name,
            tag,
            type_id: descriptor.type_id(),
            type_path: descriptor.type_path(),
            priority: descriptor.priority(),
            flags: descriptor.flags(),
            inheritance: descriptor.inheritance(),
            default_value,
            codec,
            custom,
            getter,
            getter_mut: descriptor.getter_mut(),
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use super::SchemaBuilder;
    use crate::codec::{CodecCaps, CodecRegistry, DefinitionCodec, DynCodec, TypeCodec};
    use crate::error::SchemaError;
    use crate::schema::{DataDefinition, DefinitionInfo, FieldDescriptor, custom_codec};
    use crate::value::{DataType, Value};

    #[derive(Debug, Clone, PartialEq)]
    struct Turret {
        range: f32,
        ammo: u32,
        name: String,
    }

    impl Default for Turret {
        fn default() -> Self {
            Self {
                range: 7.5,
                ammo: 30,
                name: String::new(),
            }
        }
    }

    impl DataType for Turret {
        fn default_codec() -> Arc<dyn DynCodec> {
            DefinitionCodec::<Self>::shared()
        }
    }

    macro_rules! field {
        ($field:ident: $ty:ty) => {
            FieldDescriptor::new::<$ty>(stringify!($field)).with_accessors(
                |o| o.downcast_ref::<Turret>().map(|o| &o.$field as &dyn Value),
                |o| o.downcast_mut::<Turret>().map(|o| &mut o.$field as &mut dyn Value),
            )
        };
    }

    impl DataDefinition for Turret {
        fn definition() -> DefinitionInfo {
            DefinitionInfo::new::<Self>()
                .with_field(field!(range: f32))
                .with_field(field!(ammo: u32).with_priority(10))
                .with_field(field!(name: String).with_priority(10))
        }
    }

    fn build(info: DefinitionInfo) -> Result<crate::schema::TypeSchema, SchemaError> {
        SchemaBuilder::new(&CodecRegistry::with_primitives()).build(info)
    }

    #[test]
    fn priority_sort_is_stable() {
        let schema = build(Turret::definition()).unwrap();
        let names: Vec<_> = schema.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["ammo", "name", "range"]);
        assert_eq!(schema.field_index("range"), Some(2));
    }

    #[test]
    fn defaults_come_from_default_instance() {
        let schema = build(Turret::definition()).unwrap();
        let range = schema.field_by_tag("range").unwrap();
        assert_eq!(range.default_value().downcast_ref::<f32>(), Some(&7.5));
        assert!(range.is_default(&7.5_f32));
        assert!(!range.is_default(&1.0_f32));
    }

    #[test]
    fn duplicate_tags() {
        let info = Turret::definition().with_field(field!(ammo: u32).with_tag("range"));
        let err = build(info).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateTags {
                type_path: Turret::type_path(),
                tags: vec!["range".into()],
            }
        );
    }

    #[test]
    fn accessors_are_checked() {
        let info = DefinitionInfo::new::<Turret>().with_field(FieldDescriptor::new::<u32>("ammo"));
        assert!(matches!(build(info), Err(SchemaError::MissingGetter { field: "ammo", .. })));

        let info = DefinitionInfo::new::<Turret>().with_field(
            FieldDescriptor::new::<u32>("ammo")
                .with_getter(|o| o.downcast_ref::<Turret>().map(|o| &o.ammo as &dyn Value)),
        );
        assert!(matches!(build(info), Err(SchemaError::MissingSetter { field: "ammo", .. })));
    }

    #[test]
    fn custom_codec_needs_a_capability() {
        #[derive(Default)]
        struct Nothing;
        impl TypeCodec<u32> for Nothing {
            fn capabilities(&self) -> CodecCaps {
                CodecCaps::empty()
            }
        }

        let info = DefinitionInfo::new::<Turret>()
            .with_field(field!(ammo: u32).with_custom_codec(custom_codec::<u32, Nothing>));
        assert!(matches!(
            build(info),
            Err(SchemaError::NoCodecCapability { field: "ammo", .. })
        ));
    }
}
