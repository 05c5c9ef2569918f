//! Struct tag handling for `json:"..."` naming overrides

use crate::types::Field;

const JSON_KEY: &str = "json:";

/// The member name a field is emitted under
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldName {
    /// Name taken from the `json` tag
    Tagged(String),
    /// The field's own Go identifier
    Identifier(String),
    /// `json:"-"`; the field is never serialized
    Skipped,
    /// Embedded field without a tag name
    Embedded,
}

impl FieldName {
    pub fn as_member(&self) -> Option<&str> {
        match self {
            FieldName::Tagged(name) | FieldName::Identifier(name) => Some(name),
            FieldName::Skipped | FieldName::Embedded => None,
        }
    }
}

/// Strip the literal delimiters from a raw tag
///
/// Raw string tags lose their backquotes; interpreted string tags lose their
/// double quotes and have `\"` unescaped.
fn tag_contents(raw: &str) -> String {
    let raw = raw.trim();
    if let Some(inner) = raw.strip_prefix('`').and_then(|r| r.strip_suffix('`')) {
        return inner.to_string();
    }
    if raw.len() >= 2 {
        if let Some(inner) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
            return inner.replace("\\\"", "\"").replace("\\\\", "\\");
        }
    }
    raw.to_string()
}

/// Locate the quoted value of the `json` key, if any
fn json_value(contents: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(offset) = contents[search_from..].find(JSON_KEY) {
        let start = search_from + offset;
        let at_key_boundary = contents[..start]
            .chars()
            .next_back()
            .map_or(true, |c| c.is_whitespace());
        let after = &contents[start + JSON_KEY.len()..];
        if at_key_boundary {
            let quoted = after.strip_prefix('"')?;
            let end = quoted.find('"')?;
            return Some(&quoted[..end]);
        }
        search_from = start + JSON_KEY.len();
    }
    None
}

/// Extract the serialization name from a raw struct tag
///
/// Returns `None` when there is no tag, no `json` key, the value is
/// malformed, or the name part is empty (`json:",omitempty"`).
///
/// # Examples
/// ```
/// use go2ts_core::tags::resolve_json_name;
/// assert_eq!(resolve_json_name(Some("`json:\"id\"`")), Some("id".to_string()));
/// assert_eq!(resolve_json_name(Some("`json:\"id,omitempty\"`")), Some("id".to_string()));
/// assert_eq!(resolve_json_name(Some("`xml:\"x\"`")), None);
/// assert_eq!(resolve_json_name(None), None);
/// ```
pub fn resolve_json_name(tag: Option<&str>) -> Option<String> {
    let contents = tag_contents(tag?);
    let value = json_value(&contents)?;
    let name = value.split(',').next().unwrap_or_default();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Decide the member name for a field
pub fn resolve_field_name(field: &Field) -> FieldName {
    if let Some(raw) = field.tag.as_deref() {
        let contents = tag_contents(raw);
        if json_value(&contents) == Some("-") {
            return FieldName::Skipped;
        }
    }

    match (resolve_json_name(field.tag.as_deref()), &field.name) {
        (Some(tagged), _) => FieldName::Tagged(tagged),
        (None, Some(ident)) => FieldName::Identifier(ident.clone()),
        (None, None) => FieldName::Embedded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DeclaredType, PrimitiveKind};

    fn int_field(name: &str) -> Field {
        Field::new(name, DeclaredType::primitive(PrimitiveKind::Int))
    }

    #[test]
    fn test_picks_json_among_other_keys() {
        let tag = r#"`xml:"other" json:"wanted,omitempty" yaml:"y"`"#;
        assert_eq!(resolve_json_name(Some(tag)), Some("wanted".to_string()));
    }

    #[test]
    fn test_ignores_keys_that_only_end_in_json() {
        assert_eq!(resolve_json_name(Some(r#"`myjson:"nope"`"#)), None);
        assert_eq!(
            resolve_json_name(Some(r#"`myjson:"nope" json:"yes"`"#)),
            Some("yes".to_string())
        );
    }

    #[test]
    fn test_malformed_tags_yield_nothing() {
        assert_eq!(resolve_json_name(Some("`json:`")), None);
        assert_eq!(resolve_json_name(Some("`json:\"unterminated`")), None);
        assert_eq!(resolve_json_name(Some("`json:id`")), None);
        assert_eq!(resolve_json_name(Some("")), None);
        assert_eq!(resolve_json_name(Some("`")), None);
    }

    #[test]
    fn test_interpreted_string_tag() {
        assert_eq!(
            resolve_json_name(Some(r#""json:\"id\"""#)),
            Some("id".to_string())
        );
    }

    #[test]
    fn test_field_name_falls_back_to_identifier() {
        let field = int_field("Count").with_tag("`json:\",omitempty\"`");
        assert_eq!(
            resolve_field_name(&field),
            FieldName::Identifier("Count".to_string())
        );
        assert_eq!(
            resolve_field_name(&int_field("Count")),
            FieldName::Identifier("Count".to_string())
        );
    }

    #[test]
    fn test_dash_skips_but_dash_comma_names() {
        let skipped = int_field("Secret").with_tag("`json:\"-\"`");
        assert_eq!(resolve_field_name(&skipped), FieldName::Skipped);

        let named = int_field("Dash").with_tag("`json:\"-,\"`");
        assert_eq!(resolve_field_name(&named), FieldName::Tagged("-".to_string()));
    }

    #[test]
    fn test_embedded_fields() {
        let bare = Field::embedded(DeclaredType::named("Base"));
        assert_eq!(resolve_field_name(&bare), FieldName::Embedded);

        let tagged = Field::embedded(DeclaredType::named("Base")).with_tag("`json:\"base\"`");
        assert_eq!(
            resolve_field_name(&tagged),
            FieldName::Tagged("base".to_string())
        );
    }
}
