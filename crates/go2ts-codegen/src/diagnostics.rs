//! Structured diagnostics for lossy translation
//!
//! Translation never fails once source has parsed; every place where the
//! output loses information (a fallback to `any`, a dropped field, a
//! duplicate declaration) is recorded here instead. Callers decide whether
//! diagnostics are warnings or errors.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Where a diagnostic was raised
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Go package name
    pub package: Option<String>,
    /// Declaration name (e.g., "User")
    pub type_name: Option<String>,
    /// Go field name (e.g., "CreatedAt")
    pub field: Option<String>,
}

impl Location {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn in_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn in_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [&self.package, &self.type_name, &self.field]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        if parts.is_empty() {
            write!(f, "<unknown location>")
        } else {
            write!(f, "{}", parts.join("."))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCategory {
    /// Named reference to a declaration outside the export set
    UnexportedReference,
    /// Pointer, function, channel, interface, qualified or generic type
    UnsupportedType,
    /// Embedded field without a json name
    EmbeddedField,
    /// Field tagged `json:"-"`
    SkippedField,
    /// A second declaration with an already translated name
    DuplicateDeclaration,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::UnexportedReference => write!(f, "UNEXPORTED_REFERENCE"),
            DiagnosticCategory::UnsupportedType => write!(f, "UNSUPPORTED_TYPE"),
            DiagnosticCategory::EmbeddedField => write!(f, "EMBEDDED_FIELD"),
            DiagnosticCategory::SkippedField => write!(f, "SKIPPED_FIELD"),
            DiagnosticCategory::DuplicateDeclaration => write!(f, "DUPLICATE_DECLARATION"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub location: Location,
    pub message: String,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(category: DiagnosticCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            location: Location::new(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn unexported_reference(name: &str, marker: &str) -> Self {
        Self::new(
            DiagnosticCategory::UnexportedReference,
            format!("'{}' is not exported; emitted as any", name),
        )
        .with_suggestion(format!("mark {} with '{}'", name, marker))
    }

    pub fn unsupported_type(description: &str) -> Self {
        Self::new(
            DiagnosticCategory::UnsupportedType,
            format!("'{}' has no TypeScript equivalent; emitted as any", description),
        )
    }

    pub fn embedded_field(description: &str) -> Self {
        Self::new(
            DiagnosticCategory::EmbeddedField,
            format!("embedded field '{}' was dropped", description),
        )
        .with_suggestion("give the field a name or a json tag")
    }

    pub fn skipped_field(name: &str) -> Self {
        Self::new(
            DiagnosticCategory::SkippedField,
            format!("field '{}' is tagged json:\"-\" and was omitted", name),
        )
    }

    pub fn duplicate_declaration(name: &str, line: usize) -> Self {
        Self::new(
            DiagnosticCategory::DuplicateDeclaration,
            format!(
                "'{}' redeclared at line {}; the first declaration was kept",
                name, line
            ),
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] at {}: {}", self.category, self.location, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

/// Collector for diagnostics raised during one translation
///
/// Package and type context is applied to every diagnostic added while it is
/// set, so resolver code only has to describe the problem.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    #[serde(skip)]
    package_context: Option<String>,
    #[serde(skip)]
    type_context: Option<String>,
    #[serde(skip)]
    field_context: Option<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_package_context(&mut self, package: impl Into<String>) {
        self.package_context = Some(package.into());
    }

    pub fn set_type_context(&mut self, type_name: impl Into<String>) {
        self.type_context = Some(type_name.into());
        self.field_context = None;
    }

    pub fn set_field_context(&mut self, field: impl Into<String>) {
        self.field_context = Some(field.into());
    }

    pub fn clear_field_context(&mut self) {
        self.field_context = None;
    }

    pub fn clear_type_context(&mut self) {
        self.type_context = None;
        self.field_context = None;
    }

    pub fn add(&mut self, mut diagnostic: Diagnostic) {
        if diagnostic.location.package.is_none() {
            diagnostic.location.package = self.package_context.clone();
        }
        if diagnostic.location.type_name.is_none() {
            diagnostic.location.type_name = self.type_context.clone();
        }
        if diagnostic.location.field.is_none() {
            diagnostic.location.field = self.field_context.clone();
        }
        self.entries.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn by_category(
        &self,
        category: DiagnosticCategory,
    ) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.category == category)
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// Report grouped by category, at most ten entries per group
    pub fn format_summary(&self) -> String {
        if self.entries.is_empty() {
            return "No diagnostics".to_string();
        }

        let mut by_category: BTreeMap<DiagnosticCategory, Vec<&Diagnostic>> = BTreeMap::new();
        for entry in &self.entries {
            by_category.entry(entry.category).or_default().push(entry);
        }

        let mut lines = Vec::new();
        lines.push(format!("Found {} diagnostic(s):", self.entries.len()));
        lines.push(String::new());

        for (category, entries) in by_category {
            lines.push(format!("## {} ({}):", category, entries.len()));
            for entry in entries.iter().take(10) {
                lines.push(format!("  - {}", entry));
            }
            if entries.len() > 10 {
                lines.push(format!("  ... and {} more", entries.len() - 10));
            }
            lines.push(String::new());
        }

        lines.join("\n")
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CodegenError;

    #[test]
    fn test_location_display() {
        let loc = Location::new()
            .in_package("models")
            .in_type("User")
            .in_field("CreatedAt");
        assert_eq!(format!("{}", loc), "models.User.CreatedAt");
        assert_eq!(format!("{}", Location::new().in_type("User")), "User");
        assert_eq!(
            format!("{}", Location::new().in_package("models").in_type("User")),
            "models.User"
        );
        assert_eq!(format!("{}", Location::new()), "<unknown location>");
    }

    #[test]
    fn test_context_is_applied() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.set_package_context("models");
        diagnostics.set_type_context("User");
        diagnostics.set_field_context("Avatar");
        diagnostics.add(Diagnostic::unsupported_type("*Image"));
        diagnostics.set_type_context("Group");
        diagnostics.add(Diagnostic::skipped_field("Secret"));

        let entries = diagnostics.entries();
        assert_eq!(entries[0].location.to_string(), "models.User.Avatar");
        // switching type clears the field
        assert_eq!(entries[1].location.to_string(), "models.Group");
    }

    #[test]
    fn test_by_category_and_merge() {
        let mut first = Diagnostics::new();
        first.add(Diagnostic::unexported_reference("Bin", "// @ts-export"));

        let mut second = Diagnostics::new();
        second.add(Diagnostic::unsupported_type("chan int"));
        second.add(Diagnostic::unexported_reference("Employee", "// @ts-export"));

        first.merge(second);
        assert_eq!(first.count(), 3);
        assert_eq!(
            first
                .by_category(DiagnosticCategory::UnexportedReference)
                .count(),
            2
        );
    }

    #[test]
    fn test_format_summary_is_grouped() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.add(Diagnostic::duplicate_declaration("User", 12));
        diagnostics.add(Diagnostic::unexported_reference("Bin", "// @ts-export"));

        let summary = diagnostics.format_summary();
        assert!(summary.starts_with("Found 2 diagnostic(s):"));
        let unexported = summary.find("UNEXPORTED_REFERENCE");
        let duplicate = summary.find("DUPLICATE_DECLARATION");
        assert!(unexported.is_some() && duplicate.is_some());
        assert!(unexported < duplicate);
        assert!(summary.contains("suggestion: mark Bin with '// @ts-export'"));
    }

    #[test]
    fn test_into_codegen_error() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.add(Diagnostic::embedded_field("Base"));

        match CodegenError::from(diagnostics) {
            CodegenError::Diagnostics { count, .. } => assert_eq!(count, 1),
            other => panic!("expected diagnostics error, got {:?}", other),
        }
    }
}
