//! TypeScript generation from Go declarations
//!
//! Translation runs in two passes over a unit. The first builds the
//! [`ExportSet`]; the second emits one `export type` per marked struct. Named
//! references are emitted by name and never expanded, so forward and cyclic
//! references need no ordering or cycle detection.

use crate::diagnostics::{Diagnostic, DiagnosticCategory, Diagnostics, Location};
use crate::error::CodegenError;
use crate::Codegen;
use go2ts_core::tags::{resolve_field_name, FieldName};
use go2ts_core::{CompilationUnit, DeclaredType, ExportSet, Field, Marker, TsType};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, instrument, trace};

const INDENT: &str = "    ";

/// The generated text for one exported declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedDefinition {
    pub name: String,
    pub source: String,
}

/// Output of translating one unit
///
/// Definitions are kept in source declaration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Translation {
    definitions: IndexMap<String, GeneratedDefinition>,
    diagnostics: Diagnostics,
}

impl Translation {
    pub fn definitions(&self) -> &IndexMap<String, GeneratedDefinition> {
        &self.definitions
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.definitions.get(name).map(|d| d.source.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// All definitions separated by blank lines
    pub fn to_blob(&self) -> String {
        self.definitions
            .values()
            .map(|d| d.source.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The name → definition mapping as a JSON object
    pub fn to_json(&self) -> Result<String, CodegenError> {
        let mapping: IndexMap<&str, &str> = self
            .definitions
            .iter()
            .map(|(name, d)| (name.as_str(), d.source.as_str()))
            .collect();
        Ok(serde_json::to_string_pretty(&mapping)?)
    }

    /// Append another unit's results; the first definition of a name wins
    pub fn merge(&mut self, other: Translation) {
        for (name, definition) in other.definitions {
            if self.definitions.contains_key(&name) {
                self.diagnostics.add(
                    Diagnostic::new(
                        DiagnosticCategory::DuplicateDeclaration,
                        format!(
                            "'{}' is defined by more than one package; the first was kept",
                            name
                        ),
                    )
                    .at(Location::new().in_type(name.clone())),
                );
                continue;
            }
            self.definitions.insert(name, definition);
        }
        self.diagnostics.merge(other.diagnostics);
    }
}

/// Can `name` be written as a bare property key?
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        serde_json::to_string(name).unwrap_or_else(|_| format!("\"{}\"", name))
    }
}

/// Recursive resolution of declared types, recording every lossy fallback
struct TypeResolver<'a> {
    exports: &'a ExportSet,
    marker: &'a str,
    diagnostics: &'a mut Diagnostics,
    field_path: Vec<String>,
}

impl<'a> TypeResolver<'a> {
    fn new(exports: &'a ExportSet, marker: &'a str, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            exports,
            marker,
            diagnostics,
            field_path: Vec::new(),
        }
    }

    fn resolve(&mut self, ty: &DeclaredType) -> String {
        match ty {
            DeclaredType::Primitive { primitive } => primitive.ts_type().to_string(),
            DeclaredType::NamedReference { name } => {
                if self.exports.contains(name) {
                    name.clone()
                } else {
                    let diagnostic = Diagnostic::unexported_reference(name, self.marker);
                    self.diagnostics.add(diagnostic);
                    TsType::Any.to_string()
                }
            }
            DeclaredType::Sequence { element } => format!("{}[]", self.resolve(element)),
            DeclaredType::Mapping { key, value } => {
                let key = self.resolve(key);
                let value = self.resolve(value);
                format!("{{ [key: {}]: {} }}", key, value)
            }
            DeclaredType::AnonymousRecord { fields } => {
                let members = self.members(fields);
                if members.is_empty() {
                    "{}".to_string()
                } else {
                    let body = members
                        .iter()
                        .map(|(name, ty)| format!("{}: {}", name, ty))
                        .collect::<Vec<_>>()
                        .join("; ");
                    format!("{{ {} }}", body)
                }
            }
            DeclaredType::Unsupported { description } => {
                self.diagnostics.add(Diagnostic::unsupported_type(description));
                TsType::Any.to_string()
            }
        }
    }

    /// Emitted `(key, type)` pairs for a field list, in declaration order
    fn members(&mut self, fields: &[Field]) -> Vec<(String, String)> {
        let mut members = Vec::with_capacity(fields.len());
        for field in fields {
            let label = field.name.clone().unwrap_or_else(|| field.ty.to_string());
            self.field_path.push(label.clone());
            self.diagnostics.set_field_context(self.field_path.join("."));

            match resolve_field_name(field) {
                FieldName::Skipped => {
                    self.diagnostics.add(Diagnostic::skipped_field(&label));
                }
                FieldName::Embedded => {
                    self.diagnostics.add(Diagnostic::embedded_field(&label));
                }
                name => {
                    let key = property_key(name.as_member().unwrap_or(&label));
                    let ty = self.resolve(&field.ty);
                    trace!("member {} -> {}: {}", label, key, ty);
                    members.push((key, ty));
                }
            }

            self.field_path.pop();
            if self.field_path.is_empty() {
                self.diagnostics.clear_field_context();
            } else {
                self.diagnostics.set_field_context(self.field_path.join("."));
            }
        }
        members
    }

    fn definition(&mut self, name: &str, fields: &[Field]) -> GeneratedDefinition {
        let body = self
            .members(fields)
            .iter()
            .map(|(key, ty)| format!("{}{}: {};", INDENT, key, ty))
            .collect::<Vec<_>>()
            .join("\n");

        GeneratedDefinition {
            name: name.to_string(),
            source: format!("export type {} = {{\n{}\n}};\n", name, body),
        }
    }
}

/// Resolve a declared type to its TypeScript expression
///
/// Named references resolve by name only when exported; everything the
/// translator cannot express becomes `any`.
pub fn resolve_type(ty: &DeclaredType, exports: &ExportSet) -> String {
    let mut diagnostics = Diagnostics::new();
    TypeResolver::new(exports, "", &mut diagnostics).resolve(ty)
}

/// Generate the `export type` block for one struct
pub fn translate_struct(name: &str, fields: &[Field], exports: &ExportSet) -> GeneratedDefinition {
    let mut diagnostics = Diagnostics::new();
    TypeResolver::new(exports, "", &mut diagnostics).definition(name, fields)
}

/// Translate every marked struct of a unit
#[instrument(skip(unit, marker), fields(package = %unit.package), level = "info")]
pub fn translate_unit(unit: &CompilationUnit, marker: &Marker) -> Translation {
    let exports = ExportSet::build(unit, marker);

    let mut definitions: IndexMap<String, GeneratedDefinition> = IndexMap::new();
    let mut diagnostics = Diagnostics::new();
    diagnostics.set_package_context(unit.package.clone());

    for declaration in &unit.declarations {
        if !exports.contains(&declaration.name) || !marker.marks(declaration) {
            continue;
        }
        let Some(fields) = declaration.fields() else {
            continue;
        };

        diagnostics.set_type_context(declaration.name.clone());
        if definitions.contains_key(&declaration.name) {
            diagnostics.add(Diagnostic::duplicate_declaration(
                &declaration.name,
                declaration.line,
            ));
            continue;
        }

        let definition = TypeResolver::new(&exports, marker.as_str(), &mut diagnostics)
            .definition(&declaration.name, fields);
        debug!("generated {} ({} fields)", declaration.name, fields.len());
        definitions.insert(declaration.name.clone(), definition);
    }
    diagnostics.clear_type_context();

    Translation {
        definitions,
        diagnostics,
    }
}

/// [`Codegen`] front end over [`translate_unit`]
#[derive(Debug, Clone, Default)]
pub struct TypeScriptCodegen {
    marker: Marker,
    strict: bool,
    diagnostics: Diagnostics,
}

impl TypeScriptCodegen {
    pub fn new(marker: Marker) -> Self {
        Self {
            marker,
            strict: false,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Fail generation when any diagnostic was raised
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    /// Diagnostics of the most recent `generate` call
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

impl Codegen for TypeScriptCodegen {
    fn generate(&mut self, unit: &CompilationUnit) -> Result<String, CodegenError> {
        let translation = translate_unit(unit, &self.marker);
        let blob = translation.to_blob();
        self.diagnostics = translation.into_diagnostics();

        if self.strict && !self.diagnostics.is_empty() {
            return Err(self.diagnostics.clone().into());
        }
        Ok(blob)
    }
}
