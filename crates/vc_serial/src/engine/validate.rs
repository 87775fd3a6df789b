use crate::codec::CodecCx;
use crate::node::{DataNode, MappingNode, NodeKind};
use crate::schema::TypeSchema;
use crate::validation::ValidationNode;

/// Validates `node` against `schema` without creating an instance.
///
/// Produces a [`ValidationNode::Mapping`] with one entry per key of `node`:
///
/// - a non-scalar key is an error, its value is not checked;
/// - an unknown key is a non-fatal error, its value is not checked, unless
///   an included field knows it;
/// - a known key is validated with its field codec, except a server-only
///   key on a non-authoritative peer, whose value is inconclusive since
///   reading skips it.
///
/// Each missing required field adds a fatal error entry keyed by its tag.
pub fn validate(cx: CodecCx<'_>, schema: &TypeSchema, node: &MappingNode) -> ValidationNode {
    let authoritative = cx.is_authoritative();
    let included: Vec<ValidationNode> = schema
        .includes()
        .filter(|field| field.is_visible(authoritative))
        .map(|field| field.validator(NodeKind::Mapping).validate_mapping(cx, node))
        .collect();

    let mut entries = Vec::with_capacity(node.len());
    for (key, value) in node.iter() {
        let Some(tag) = key.as_scalar() else {
            entries.push((
                ValidationNode::error(key.clone(), "key is not a scalar"),
                ValidationNode::Inconclusive(value.clone()),
            ));
            continue;
        };

        if let Some(field) = schema.field_by_tag(tag.value()) {
            let value = if field.is_visible(authoritative) {
                field.validator(value.kind()).validate(cx, value)
            } else {
                ValidationNode::Inconclusive(value.clone())
            };
            entries.push((ValidationNode::Validated(key.clone()), value));
            continue;
        }

        if let Some(entry) = included.iter().find_map(|result| included_entry(result, key)) {
            entries.push(entry.clone());
            continue;
        }

        entries.push((
            ValidationNode::warning(
                key.clone(),
                format!("field `{}` not found in `{}`", tag.value(), schema.type_path()),
            ),
            ValidationNode::Inconclusive(value.clone()),
        ));
    }

    // Entries an included field reports for keys absent from the node, i.e.
    // its missing required fields.
    for result in &included {
        if let ValidationNode::Mapping(found) = result {
            entries.extend(
                found
                    .iter()
                    .filter(|(key, _)| key.node().is_some_and(|key| node.get_node(key).is_none()))
                    .cloned(),
            );
        }
    }

    for field in schema.fields() {
        let Some(tag) = field.tag() else { continue };
        if field.is_required() && field.is_visible(authoritative) && !node.has(tag) {
            entries.push((
                ValidationNode::error(
                    DataNode::scalar(tag),
                    format!("required field `{tag}` of `{}` is missing", schema.type_path()),
                ),
                ValidationNode::Inconclusive(DataNode::null()),
            ));
        }
    }

    ValidationNode::Mapping(entries)
}

/// The entry an included field's result holds for `key`, if it knows it.
fn included_entry<'a>(
    result: &'a ValidationNode,
    key: &DataNode,
) -> Option<&'a (ValidationNode, ValidationNode)> {
    let ValidationNode::Mapping(entries) = result else {
        return None;
    };
    entries
        .iter()
        .find(|(own, _)| matches!(own, ValidationNode::Validated(own) if own == key))
}
