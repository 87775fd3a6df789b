use crate::codec::CodecCx;
use crate::error::DecodeError;
use crate::node::{MappingNode, NodeKind};
use crate::result::FieldEntry;
use crate::schema::{FieldDefinition, TypeSchema};
use crate::value::Value;

/// Reads `node` into `target`, field by field, in schema order.
///
/// Returns one [`FieldEntry`] per schema field. A field is mapped when the
/// node holds its tag, or for an included field, one of the included tags.
/// A mapped value equal to the field default is not assigned, so `target`
/// keeps what it held. Server-only fields are left untouched on a
/// non-authoritative peer. The
/// `after_deserialization` hook runs last unless the context skips hooks.
///
/// # Errors
///
/// A missing required tag or any field read failure, wrapped with the
/// field it happened in.
pub fn populate(
    cx: CodecCx<'_>,
    schema: &TypeSchema,
    target: &mut dyn Value,
    node: &MappingNode,
) -> Result<Vec<FieldEntry>, DecodeError> {
    let authoritative = cx.is_authoritative();
    let mut entries = Vec::with_capacity(schema.fields().len());
    for field in schema.fields() {
        let entry = if field.is_visible(authoritative) && field.is_settable() {
            populate_field(cx, schema, field, target, node)?
        } else {
            FieldEntry::unmapped(field.inheritance())
        };
        entries.push(entry);
    }
    if !cx.skip_hooks() {
        schema.run_after_read(target);
    }
    Ok(entries)
}

fn populate_field(
    cx: CodecCx<'_>,
    schema: &TypeSchema,
    field: &FieldDefinition,
    target: &mut dyn Value,
    node: &MappingNode,
) -> Result<FieldEntry, DecodeError> {
    let Some(tag) = field.tag() else {
        return populate_included(cx, schema, field, target, node);
    };
    let decoded = match node.get(tag) {
        Some(child) => field
            .reader(child.kind())
            .read(cx, child)
            .map_err(|err| err.in_field(schema.type_path(), tag))?,
        None if field.is_required() => {
            return Err(DecodeError::MissingRequiredField {
                type_path: schema.type_path(),
                tag: tag.into(),
            });
        }
        None => return Ok(FieldEntry::unmapped(field.inheritance())),
    };

    if !field.is_default(&*decoded.value) {
        let mismatch = super::owner_mismatch(schema, target);
        field
            .get_mut(target)
            .ok_or(mismatch)?
            .assign(decoded.value)?;
    }
    Ok(FieldEntry::mapped(field.inheritance(), decoded.result))
}

/// An included field reads the whole mapping. It counts as mapped only when
/// the mapping sets one of its own fields, and only those fields are written
/// into the existing value.
fn populate_included(
    cx: CodecCx<'_>,
    schema: &TypeSchema,
    field: &FieldDefinition,
    target: &mut dyn Value,
    node: &MappingNode,
) -> Result<FieldEntry, DecodeError> {
    let decoded = field
        .reader(NodeKind::Mapping)
        .read_mapping(cx, node)
        .map_err(|err| err.in_field(schema.type_path(), field.name()))?;

    let mismatch = super::owner_mismatch(schema, target);
    let slot = field.get_mut(target).ok_or(mismatch)?;
    match decoded.result.as_definition() {
        Some(nested) => {
            if !nested.fields().iter().any(|entry| entry.mapped) {
                return Ok(FieldEntry::unmapped(field.inheritance()));
            }
            nested.schema().apply_mapped(nested.fields(), slot)?;
            if !cx.skip_hooks() {
                nested.schema().run_after_read(slot);
            }
        }
        None => {
            if !field.is_default(&*decoded.value) {
                slot.assign(decoded.value)?;
            }
        }
    }
    Ok(FieldEntry::mapped(field.inheritance(), decoded.result))
}
