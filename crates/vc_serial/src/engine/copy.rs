use crate::codec::CodecCx;
use crate::error::CopyError;
use crate::schema::TypeSchema;
use crate::value::Value;

/// Copies every field of `source` into `target` through the field codecs.
///
/// Fields without a mutable accessor are skipped, and so are server-only
/// fields on a non-authoritative peer. Copies are deep as far
/// as the field codecs make them.
///
/// # Errors
///
/// A field codec failure, wrapped with the field name.
pub fn copy(
    cx: CodecCx<'_>,
    schema: &TypeSchema,
    source: &dyn Value,
    target: &mut dyn Value,
) -> Result<(), CopyError> {
    let authoritative = cx.is_authoritative();
    for field in schema.fields() {
        if !field.is_visible(authoritative) {
            continue;
        }
        let from = field
            .get(source)
            .ok_or_else(|| super::owner_mismatch(schema, source))?;
        let Some(to) = field.get_mut(target) else {
            continue;
        };
        field
            .copier()
            .copy(cx, from, to)
            .map_err(|err| err.in_field(schema.type_path(), field.name()))?;
    }
    Ok(())
}
