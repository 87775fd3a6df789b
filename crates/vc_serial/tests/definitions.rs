use std::collections::BTreeMap;

use vc_serial::codec::{CodecCaps, CodecCx, Decoded, TypeCodec};
use vc_serial::error::{DecodeError, EncodeError};
use vc_serial::node::{DataNode, ScalarNode};
use vc_serial::{DataDefinition, SerializationConfig, SerializationManager};

fn node(json: &str) -> DataNode {
    serde_json::from_str(json).unwrap()
}

fn json(node: &DataNode) -> String {
    serde_json::to_string(node).unwrap()
}

#[derive(DataDefinition, Debug, Clone, PartialEq, Default)]
struct Stats {
    strength: i32,
    agility: i32,
}

#[derive(DataDefinition, Debug, Clone, PartialEq, Default)]
#[datadef(hook = Self::recount)]
struct Creature {
    #[datafield(required, priority = 10)]
    id: String,
    display_name: Option<String>,
    speed: f32,
    tags: Vec<String>,
    loot: BTreeMap<String, u32>,
    #[datafield(include)]
    stats: Stats,
    #[datafield(server_only)]
    spawn_weight: u32,
    #[datafield(read_only)]
    legacy_id: String,
    #[datafield(skip)]
    tag_count: usize,
}

impl Creature {
    fn recount(&mut self) {
        self.tag_count = self.tags.len();
    }
}

fn creature() -> Creature {
    Creature {
        id: "wolf".into(),
        display_name: Some("Grey Wolf".into()),
        speed: 1.5,
        tags: vec!["beast".into(), "pack".into()],
        loot: BTreeMap::from([("pelt".into(), 2), ("fang".into(), 1)]),
        stats: Stats {
            strength: 4,
            agility: 7,
        },
        spawn_weight: 3,
        legacy_id: String::new(),
        tag_count: 2,
    }
}

#[test]
fn round_trip() {
    let manager = SerializationManager::default();
    let wolf = creature();

    let written = manager.write(&wolf, true, None).unwrap();
    let read = manager.read_value::<Creature>(&written, None).unwrap();
    assert_eq!(read, wolf);
}

#[test]
fn defaults_are_omitted() {
    let manager = SerializationManager::default();
    let bare = Creature {
        id: "rat".into(),
        ..Creature::default()
    };

    let written = manager.write(&bare, false, None).unwrap();
    assert_eq!(json(&written), r#"{"id":"rat"}"#);

    // Required fields are written even when default.
    let written = manager.write(&Creature::default(), false, None).unwrap();
    assert_eq!(json(&written), r#"{"id":""}"#);
}

#[test]
fn output_follows_priority_and_tags() {
    let manager = SerializationManager::default();
    let written = manager.write(&creature(), false, None).unwrap();
    let keys: Vec<String> = written
        .as_mapping()
        .unwrap()
        .keys()
        .map(|key| key.as_scalar().unwrap().value().to_owned())
        .collect();

    // Written in reverse schema order, included fields too. `id` has the
    // highest priority and comes last.
    assert_eq!(
        keys,
        ["spawnWeight", "agility", "strength", "loot", "tags", "speed", "displayName", "id"]
    );
}

#[test]
fn required_field_is_named() {
    let manager = SerializationManager::default();
    let err = manager
        .read_value::<Creature>(&node(r#"{ "speed": 2 }"#), None)
        .unwrap_err();
    assert_eq!(
        err,
        DecodeError::MissingRequiredField {
            type_path: core::any::type_name::<Creature>(),
            tag: "id".into(),
        }
    );
    assert!(err.to_string().contains("`id`"));
}

#[test]
fn bad_scalars_name_their_field() {
    let manager = SerializationManager::default();
    let err = manager
        .read_value::<Creature>(&node(r#"{ "id": "a", "speed": "fast" }"#), None)
        .unwrap_err();
    assert!(matches!(err.root_cause(), DecodeError::Parse { .. }));
    assert!(err.to_string().starts_with("in field `speed`"));
}

#[test]
fn server_only_fields() {
    let document = node(r#"{ "id": "a", "spawnWeight": 9 }"#);

    let server = SerializationManager::default();
    let read = server.read_value::<Creature>(&document, None).unwrap();
    assert_eq!(read.spawn_weight, 9);

    let client = SerializationManager::new(SerializationConfig::new().with_authoritative(false));
    let read = client.read_value::<Creature>(&document, None).unwrap();
    assert_eq!(read.spawn_weight, 0);

    let written = client.write(&creature(), true, None).unwrap();
    assert!(!written.as_mapping().unwrap().has("spawnWeight"));
}

#[test]
fn read_only_fields_are_read_not_written() {
    let manager = SerializationManager::default();
    let read = manager
        .read_value::<Creature>(&node(r#"{ "id": "a", "legacyId": "old" }"#), None)
        .unwrap();
    assert_eq!(read.legacy_id, "old");

    let written = manager.write(&read, true, None).unwrap();
    assert!(!written.as_mapping().unwrap().has("legacyId"));
}

#[test]
fn included_fields_share_the_mapping() {
    let manager = SerializationManager::default();
    let decoded = manager
        .read::<Creature>(&node(r#"{ "id": "a", "strength": 5 }"#), None)
        .unwrap();
    assert_eq!(
        decoded.value.stats,
        Stats {
            strength: 5,
            agility: 0
        }
    );

    let result = decoded.result.as_definition().unwrap();
    assert!(result.is_mapped("id"));
    assert!(!result.is_mapped("speed"));
}

#[test]
fn hooks_run_unless_skipped() {
    let manager = SerializationManager::default();
    let document = node(r#"{ "id": "a", "tags": ["x", "y", "z"] }"#);

    let read = manager.read_value::<Creature>(&document, None).unwrap();
    assert_eq!(read.tag_count, 3);

    let read = manager.read_with::<Creature>(&document, None, true).unwrap();
    assert_eq!(read.value.tag_count, 0);
}

#[test]
fn populate_keeps_unset_fields() {
    let manager = SerializationManager::default();
    let mut wolf = creature();
    let document = node(r#"{ "id": "wolf", "speed": 3 }"#);

    let result = manager
        .populate(&mut wolf, document.as_mapping().unwrap(), None, false)
        .unwrap();

    assert_eq!(wolf.speed, 3.0);
    assert_eq!(wolf.tags, ["beast", "pack"]);
    assert!(result.as_definition().unwrap().is_mapped("speed"));
    assert!(!result.as_definition().unwrap().is_mapped("tags"));
}

#[test]
fn populate_ignores_default_values() {
    let manager = SerializationManager::default();
    let mut wolf = creature();
    let document = node(r#"{ "id": "wolf", "speed": 0, "tags": [], "agility": 0 }"#);

    let result = manager
        .populate(&mut wolf, document.as_mapping().unwrap(), None, false)
        .unwrap();

    // Mapped, but a default value never replaces what the target holds.
    assert_eq!(wolf.speed, 1.5);
    assert_eq!(wolf.tags, ["beast", "pack"]);
    assert_eq!(wolf.stats.agility, 7);
    assert!(result.as_definition().unwrap().is_mapped("speed"));
}

#[test]
fn populate_merges_into_included_fields() {
    let manager = SerializationManager::default();
    let mut wolf = creature();
    let document = node(r#"{ "id": "wolf", "strength": 9 }"#);

    manager
        .populate(&mut wolf, document.as_mapping().unwrap(), None, false)
        .unwrap();
    assert_eq!(
        wolf.stats,
        Stats {
            strength: 9,
            agility: 7
        }
    );
}

#[test]
fn copies_are_independent() {
    let manager = SerializationManager::default();
    let mut source = creature();
    let mut target = Creature::default();

    manager.copy(&source, &mut target, None).unwrap();
    assert_eq!(target.tags, source.tags);

    source.tags.push("alpha".into());
    source.loot.insert("claw".into(), 1);
    assert_eq!(target.tags, ["beast", "pack"]);
    assert!(!target.loot.contains_key("claw"));

    let copy = manager.create_copy(&source, None).unwrap();
    assert_eq!(copy.tags.len(), 3);
    // Skipped fields are not part of the definition.
    assert_eq!(copy.tag_count, 0);
}

// -----------------------------------------------------------------------------
// Custom codecs

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Rgb(u8, u8, u8);

impl vc_serial::DataType for Rgb {
    fn default_codec() -> std::sync::Arc<dyn vc_serial::codec::DynCodec> {
        vc_serial::codec::CodecAdapter::shared(HexCodec)
    }
}

#[derive(Default)]
struct HexCodec;

impl TypeCodec<Rgb> for HexCodec {
    fn capabilities(&self) -> CodecCaps {
        CodecCaps::SCALAR
    }

    fn read_scalar(&self, _: CodecCx<'_>, node: &ScalarNode) -> Result<Decoded<Rgb>, DecodeError> {
        let hex = node
            .value()
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6)
            .ok_or_else(|| DecodeError::custom("expected `#rrggbb`"))?;
        let channel = |at: usize| {
            u8::from_str_radix(&hex[at..at + 2], 16).map_err(|e| DecodeError::parse("Rgb", hex, e))
        };
        Ok(Decoded::scalar(Rgb(channel(0)?, channel(2)?, channel(4)?)))
    }

    fn write(&self, _: CodecCx<'_>, value: &Rgb, _: bool) -> Result<DataNode, EncodeError> {
        Ok(DataNode::scalar(format!("#{:02x}{:02x}{:02x}", value.0, value.1, value.2)))
    }
}

/// Reads an `Rgb` from `[r, g, b]` too. Writing falls back to `HexCodec`.
#[derive(Default)]
struct TripleCodec;

impl TypeCodec<Rgb> for TripleCodec {
    fn capabilities(&self) -> CodecCaps {
        CodecCaps::READ_SEQUENCE
    }

    fn read_sequence(
        &self,
        cx: CodecCx<'_>,
        node: &vc_serial::node::SequenceNode,
    ) -> Result<Decoded<Rgb>, DecodeError> {
        let [r, g, b] = node.as_slice() else {
            return Err(DecodeError::custom("expected three channels"));
        };
        let channel = |node: &DataNode| cx.read::<u8>(node).map(|decoded| decoded.value);
        Ok(Decoded::scalar(Rgb(channel(r)?, channel(g)?, channel(b)?)))
    }
}

#[derive(DataDefinition, Debug, Clone, PartialEq, Default)]
struct Paint {
    #[datafield(codec = TripleCodec)]
    color: Rgb,
    #[datafield(tag = "trim")]
    trim_color: Rgb,
}

#[test]
fn custom_codecs_cover_their_shapes() {
    let manager = SerializationManager::default();

    let paint = manager
        .read_value::<Paint>(&node(r##"{ "color": [255, 0, 16], "trim": "#00ff00" }"##), None)
        .unwrap();
    assert_eq!(paint.color, Rgb(255, 0, 16));
    assert_eq!(paint.trim_color, Rgb(0, 255, 0));

    // The custom codec cannot read scalars; the type's own codec does.
    let paint = manager
        .read_value::<Paint>(&node(r##"{ "color": "#0000ff" }"##), None)
        .unwrap();
    assert_eq!(paint.color, Rgb(0, 0, 255));

    let written = manager.write(&paint, false, None).unwrap();
    assert_eq!(json(&written), r##"{"color":"#0000ff"}"##);
}

#[test]
fn clients_do_not_copy_server_only_fields() {
    let client = SerializationManager::new(SerializationConfig::new().with_authoritative(false));
    let source = creature();

    let mut target = Creature::default();
    client.copy(&source, &mut target, None).unwrap();
    assert_eq!(target.spawn_weight, 0);
    assert_eq!(target.tags, source.tags);

    let copy = client.create_copy(&source, None).unwrap();
    assert_eq!(copy.spawn_weight, 0);

    let server = SerializationManager::default();
    assert_eq!(server.create_copy(&source, None).unwrap().spawn_weight, 3);
}
