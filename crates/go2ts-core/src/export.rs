//! Export marker matching and the per-unit export set
//!
//! The export set must be complete before any declaration is translated:
//! a field referencing a declaration further down the file resolves by
//! membership in the finished set, never by source position.

use crate::error::CoreError;
use crate::ir::{CompilationUnit, Declaration};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, trace};

pub const DEFAULT_MARKER: &str = "// @ts-export";

/// Strip comment delimiters and surrounding whitespace
fn normalize(text: &str) -> &str {
    let text = text.trim();
    if let Some(rest) = text.strip_prefix("//") {
        return rest.trim();
    }
    if let Some(inner) = text.strip_prefix("/*").and_then(|t| t.strip_suffix("*/")) {
        return inner.trim();
    }
    text
}

/// A normalized export marker
///
/// `// @ts-export` and `//@ts-export` are the same marker. Matching is
/// case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    raw: String,
    normalized: String,
}

impl Marker {
    pub fn new(text: impl Into<String>) -> Result<Self, CoreError> {
        let raw = text.into();
        let normalized = normalize(&raw).to_string();
        if normalized.is_empty() {
            return Err(CoreError::InvalidMarker(format!(
                "marker '{}' has no content after the comment opener",
                raw
            )));
        }
        Ok(Self { raw, normalized })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Does this comment carry the marker?
    pub fn matches(&self, comment: &str) -> bool {
        if normalize(comment) == self.normalized {
            return true;
        }
        // multi-line block comments: the marker may sit on any inner line
        let comment = comment.trim();
        match comment.strip_prefix("/*").and_then(|c| c.strip_suffix("*/")) {
            Some(inner) => inner
                .lines()
                .map(|line| line.trim().trim_start_matches('*').trim())
                .any(|line| line == self.normalized),
            None => false,
        }
    }

    /// Is the declaration a struct whose doc block carries the marker?
    pub fn marks(&self, declaration: &Declaration) -> bool {
        declaration.ty.is_record() && declaration.doc.iter().any(|line| self.matches(line))
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            raw: DEFAULT_MARKER.to_string(),
            normalized: normalize(DEFAULT_MARKER).to_string(),
        }
    }
}

/// Names of the declarations selected for translation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSet {
    names: BTreeSet<String>,
}

impl ExportSet {
    /// Scan every declaration of the unit
    pub fn build(unit: &CompilationUnit, marker: &Marker) -> Self {
        let mut names = BTreeSet::new();
        for declaration in &unit.declarations {
            if marker.marks(declaration) {
                trace!("export marker found on {}", declaration.name);
                names.insert(declaration.name.clone());
            }
        }
        debug!(
            "package {}: {} of {} declarations exported",
            unit.package,
            names.len(),
            unit.declarations.len()
        );
        Self { names }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DeclaredType, PrimitiveKind};

    fn record(name: &str) -> Declaration {
        Declaration::new(name, DeclaredType::record(vec![]))
    }

    #[test]
    fn test_spaced_and_unspaced_markers_match() -> Result<(), CoreError> {
        let marker = Marker::new("// @ts-export")?;
        assert!(marker.matches("// @ts-export"));
        assert!(marker.matches("//@ts-export"));
        assert!(marker.matches("   // @ts-export   "));
        assert!(!marker.matches("// @TS-export"));
        assert!(!marker.matches("// @ts-export please"));
        assert!(!marker.matches("// see @ts-export"));

        let unspaced = Marker::new("//@ts-export")?;
        assert!(unspaced.matches("// @ts-export"));
        Ok(())
    }

    #[test]
    fn test_block_comment_marker() -> Result<(), CoreError> {
        let marker = Marker::new("// @ts-export")?;
        assert!(marker.matches("/* @ts-export */"));
        assert!(marker.matches("/*\n * User model\n * @ts-export\n */"));
        assert!(!marker.matches("/* @ts-exported */"));
        Ok(())
    }

    #[test]
    fn test_empty_marker_rejected() {
        assert!(Marker::new("//").is_err());
        assert!(Marker::new("   ").is_err());
    }

    #[test]
    fn test_only_marked_records_are_exported() -> Result<(), CoreError> {
        let marker = Marker::new("// @typescript")?;
        let mut unit = CompilationUnit::new("models");
        unit.add_declaration(record("Marked").with_doc("// @typescript"));
        unit.add_declaration(record("Unmarked").with_doc("// just a struct"));
        unit.add_declaration(record("Bare"));
        unit.add_declaration(
            Declaration::new("Alias", DeclaredType::primitive(PrimitiveKind::String))
                .with_doc("// @typescript"),
        );

        let set = ExportSet::build(&unit, &marker);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["Marked"]);
        assert!(!set.contains("Alias"));
        Ok(())
    }
}
