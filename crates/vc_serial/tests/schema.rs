use std::sync::Arc;

use vc_serial::error::{DecodeError, SchemaError};
use vc_serial::node::DataNode;
use vc_serial::schema::{FieldFlags, InheritancePolicy};
use vc_serial::{DataDefinition, SerializationManager};

#[derive(DataDefinition, Debug, Clone, PartialEq, Default)]
struct Wallet {
    #[datafield(tag = "amount")]
    coins: u32,
    #[datafield(tag = "amount")]
    gems: u32,
}

#[derive(DataDefinition, Debug, Clone, PartialEq, Default)]
#[datadef(auto_register)]
struct Door {
    #[datafield(priority = -1)]
    locked: bool,
    #[datafield(required, priority = 5, inherit = "never")]
    key_id: String,
    #[datafield(server_only, read_only)]
    hinge: Option<u8>,
    wallet: Option<Wallet>,
}

#[test]
fn duplicate_tags_are_a_schema_defect() {
    let manager = SerializationManager::default();
    assert_eq!(
        manager.schema::<Wallet>().unwrap_err(),
        SchemaError::DuplicateTags {
            type_path: core::any::type_name::<Wallet>(),
            tags: vec!["amount".into()],
        }
    );

    // Reading reports the cached defect instead of decoding anything.
    let node: DataNode = serde_json::from_str(r#"{ "amount": 3 }"#).unwrap();
    let err = manager.read_value::<Wallet>(&node, None).unwrap_err();
    assert!(matches!(err, DecodeError::Schema(SchemaError::DuplicateTags { .. })));
}

#[test]
fn schema_fields() {
    let manager = SerializationManager::default();
    let schema = manager.schema::<Door>().unwrap();

    let tags: Vec<_> = schema.fields().iter().map(|field| field.tag()).collect();
    assert_eq!(tags, [Some("keyId"), Some("hinge"), Some("wallet"), Some("locked")]);

    let key = schema.field_by_tag("keyId").unwrap();
    assert_eq!(key.name(), "key_id");
    assert_eq!(key.priority(), 5);
    assert!(key.is_required());
    assert_eq!(key.inheritance(), InheritancePolicy::Never);

    let hinge = schema.field_by_tag("hinge").unwrap();
    assert_eq!(hinge.flags(), FieldFlags::SERVER_ONLY | FieldFlags::READ_ONLY);
    assert!(!hinge.is_visible(false));

    // Cached: the same schema every time.
    assert!(Arc::ptr_eq(&schema, &manager.schema::<Door>().unwrap()));
}

#[test]
fn initialize_reports_every_defect() {
    let mut manager = SerializationManager::default();
    manager.register::<Door>();

    // `Door` depends on `Wallet`, which is broken.
    let errors = manager.initialize().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], SchemaError::DuplicateTags { .. }));
    assert!(manager.schema::<Door>().is_ok());
}

#[test]
fn schemas_build_once_across_threads() {
    let manager = SerializationManager::default();
    let schemas: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| manager.schema::<Door>().unwrap()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });
    assert!(schemas.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[cfg(feature = "auto_register")]
#[test]
fn auto_register_collects_marked_types() {
    use core::any::TypeId;

    let mut manager = SerializationManager::default();
    if manager.auto_register() {
        assert!(manager.codecs().contains(TypeId::of::<Door>()));
        assert!(manager.codecs().contains(TypeId::of::<Option<Wallet>>()));
        assert!(manager.codecs().contains(TypeId::of::<Wallet>()));
        // Repeated calls are no-ops.
        assert!(manager.auto_register());
    }
}
