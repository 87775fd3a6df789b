use vc_serial::node::DataNode;
use vc_serial::validation::ValidationNode;
use vc_serial::{DataDefinition, SerializationConfig, SerializationManager};

#[derive(DataDefinition, Debug, Clone, PartialEq, Default)]
struct Range {
    min: f64,
    max: f64,
}

#[derive(DataDefinition, Debug, Clone, PartialEq, Default)]
struct Spell {
    #[datafield(required)]
    id: String,
    cost: u32,
    range: Range,
    schools: Vec<String>,
    #[datafield(include)]
    extra: Extra,
    #[datafield(server_only)]
    mana_bias: i32,
}

#[derive(DataDefinition, Debug, Clone, PartialEq, Default)]
struct Extra {
    cooldown: f32,
}

fn node(json: &str) -> DataNode {
    serde_json::from_str(json).unwrap()
}

fn messages(report: &ValidationNode) -> Vec<String> {
    report.errors().iter().map(ToString::to_string).collect()
}

#[test]
fn valid_documents() {
    let manager = SerializationManager::default();
    let report = manager.validate::<Spell>(
        &node(r#"{ "id": "bolt", "cost": 3, "range": { "min": 0.5, "max": 1e3 }, "cooldown": 2 }"#),
        None,
    );
    assert!(report.is_valid(), "{:?}", messages(&report));
}

#[test]
fn every_unknown_key_is_reported() {
    let manager = SerializationManager::default();
    let report = manager.validate::<Spell>(
        &node(r#"{ "id": "bolt", "colour": "red", "cost": 3, "size": 2, "schools": ["fire"] }"#),
        None,
    );

    let errors = report.errors();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|error| !error.fatal));
    assert_eq!(errors[0].node, DataNode::scalar("colour"));
    assert_eq!(errors[1].node, DataNode::scalar("size"));

    // The known keys were still checked.
    let ValidationNode::Mapping(entries) = &report else {
        panic!("expected a mapping report");
    };
    assert_eq!(entries.len(), 5);
    assert!(matches!(entries[2].0, ValidationNode::Validated(_)));
    assert!(matches!(entries[2].1, ValidationNode::Validated(_)));
}

#[test]
fn errors_point_at_nested_nodes() {
    let manager = SerializationManager::default();
    let report = manager.validate::<Spell>(
        &node(r#"{ "id": "bolt", "cost": "lots", "range": { "min": "near", "max": 4 } }"#),
        None,
    );

    let errors = report.errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].node, DataNode::scalar("lots"));
    assert_eq!(errors[1].node, DataNode::scalar("near"));
    assert!(report.has_fatal_errors());
}

#[test]
fn missing_required_field_is_fatal() {
    let manager = SerializationManager::default();
    let report = manager.validate::<Spell>(&node(r#"{ "cost": 1 }"#), None);
    assert!(report.has_fatal_errors());
    assert_eq!(messages(&report).len(), 1);
    assert!(messages(&report)[0].contains("`id`"));
}

#[test]
fn wrong_shapes_are_errors() {
    let manager = SerializationManager::default();

    let report = manager.validate::<Spell>(&node(r#"["not", "a", "mapping"]"#), None);
    assert!(!report.is_valid());

    let report = manager.validate::<Spell>(&node(r#"{ "id": "a", "schools": "fire" }"#), None);
    assert_eq!(report.errors().len(), 1);
}

#[test]
fn server_only_keys_on_clients() {
    let document = node(r#"{ "id": "a", "manaBias": "lots" }"#);

    let server = SerializationManager::default();
    assert_eq!(server.validate::<Spell>(&document, None).errors().len(), 1);

    // Reading skips the key on a client, so its value is not checked.
    let client = SerializationManager::new(SerializationConfig::new().with_authoritative(false));
    let report = client.validate::<Spell>(&document, None);
    assert!(report.is_valid(), "{:?}", messages(&report));
    let ValidationNode::Mapping(entries) = &report else {
        panic!("expected a mapping report");
    };
    assert!(matches!(entries[1].1, ValidationNode::Inconclusive(_)));
}
