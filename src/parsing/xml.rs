use quick_xml::events::BytesStart;
use std::path::Path;

use crate::error::MetadataError;

/// Get an unescaped attribute value from a start tag
pub(crate) fn get_attribute(
    e: &BytesStart,
    name: &str,
    source: &Path,
) -> Result<Option<String>, MetadataError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| MetadataError::xml(source, err))?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|err| MetadataError::xml(source, err))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Get a required attribute, reporting `element@name` when it is absent
pub(crate) fn require_attribute(
    e: &BytesStart,
    element: &str,
    name: &str,
    source: &Path,
) -> Result<String, MetadataError> {
    get_attribute(e, name, source)?.ok_or_else(|| {
        MetadataError::missing_field(source.display().to_string(), format!("{element}@{name}"))
    })
}

/// Parse a numeric attribute value
pub(crate) fn parse_number(
    value: &str,
    field: &str,
    source: &Path,
) -> Result<u32, MetadataError> {
    value.trim().parse().map_err(|_| {
        MetadataError::InvalidFormat(format!(
            "{}: {field} '{value}' is not a valid number",
            source.display()
        ))
    })
}
