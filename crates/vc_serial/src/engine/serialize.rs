use crate::codec::CodecCx;
use crate::error::EncodeError;
use crate::node::{DataNode, MappingNode};
use crate::schema::TypeSchema;
use crate::value::Value;

/// Writes the fields of `source` into a mapping.
///
/// Fields are visited in reverse schema order. Read-only fields are never
/// written, nor are server-only fields on a non-authoritative peer. Unless
/// `always_write`, a field that is not required and equals its default is
/// left out.
///
/// # Errors
///
/// Any field write failure, wrapped with the field name, or an included
/// field whose codec did not produce a mapping.
pub fn serialize(
    cx: CodecCx<'_>,
    schema: &TypeSchema,
    source: &dyn Value,
    always_write: bool,
) -> Result<MappingNode, EncodeError> {
    let authoritative = cx.is_authoritative();
    let mut mapping = MappingNode::with_capacity(schema.fields().len());
    for field in schema.fields().iter().rev() {
        if field.is_read_only() || !field.is_visible(authoritative) {
            continue;
        }
        let value = field
            .get(source)
            .ok_or_else(|| super::owner_mismatch(schema, source))?;
        if !always_write && !field.is_required() && field.is_default(value) {
            continue;
        }

        let node = field
            .writer()
            .write(cx, value, always_write)
            .map_err(|err| err.in_field(schema.type_path(), field.name()))?;
        match (field.tag(), node) {
            (Some(tag), node) => {
                mapping.insert(tag, node);
            }
            (None, DataNode::Mapping(included)) => mapping.splice(included),
            (None, _) => {
                return Err(EncodeError::IncludeNotMapping {
                    type_path: schema.type_path(),
                    field: field.name(),
                });
            }
        }
    }
    Ok(mapping)
}
