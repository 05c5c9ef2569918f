//! Intermediate representation of parsed Go source

use crate::error::CoreError;
use crate::types::{DeclaredType, Field};
use serde::{Deserialize, Serialize};

/// Declarations parsed from one Go file, or from every file of one package
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    /// Go package name from the `package` clause
    pub package: String,
    /// Files the declarations came from, in merge order
    pub source_files: Vec<String>,
    pub declarations: Vec<Declaration>,
}

/// A named `type` declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    /// Raw comment lines of the leading annotation block
    pub doc: Vec<String>,
    pub ty: DeclaredType,
    /// 1-based line of the declared name
    pub line: usize,
}

impl Declaration {
    pub fn new(name: impl Into<String>, ty: DeclaredType) -> Self {
        Self {
            name: name.into(),
            doc: Vec::new(),
            ty,
            line: 0,
        }
    }

    pub fn with_doc(mut self, line: impl Into<String>) -> Self {
        self.doc.push(line.into());
        self
    }

    /// Fields of a struct declaration; `None` for every other kind
    pub fn fields(&self) -> Option<&[Field]> {
        match &self.ty {
            DeclaredType::AnonymousRecord { fields } => Some(fields),
            _ => None,
        }
    }
}

impl CompilationUnit {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            source_files: Vec::new(),
            declarations: Vec::new(),
        }
    }

    pub fn add_declaration(&mut self, declaration: Declaration) {
        self.declarations.push(declaration);
    }

    pub fn find(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name == name)
    }

    /// Append another unit of the same package, keeping declaration order
    pub fn merge(mut self, other: CompilationUnit) -> Self {
        if self.package.is_empty() {
            self.package = other.package;
        }
        self.source_files.extend(other.source_files);
        self.declarations.extend(other.declarations);
        self
    }

    /// Pretty JSON dump of the unit
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrimitiveKind;

    #[test]
    fn test_merge_keeps_order() {
        let mut a = CompilationUnit::new("models");
        a.source_files.push("a.go".to_string());
        a.add_declaration(Declaration::new("A", DeclaredType::record(vec![])));

        let mut b = CompilationUnit::new("models");
        b.source_files.push("b.go".to_string());
        b.add_declaration(Declaration::new(
            "B",
            DeclaredType::primitive(PrimitiveKind::Int),
        ));

        let merged = a.merge(b);
        let names: Vec<_> = merged.declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(merged.source_files, vec!["a.go", "b.go"]);
        assert!(merged.find("A").and_then(|d| d.fields()).is_some());
        assert!(merged.find("B").and_then(|d| d.fields()).is_none());
    }

    #[test]
    fn test_json_dump_tags_type_kinds() -> Result<(), Box<dyn std::error::Error>> {
        let mut unit = CompilationUnit::new("models");
        unit.add_declaration(Declaration::new(
            "Ids",
            DeclaredType::sequence(DeclaredType::primitive(PrimitiveKind::Int64)),
        ));
        let json = unit.to_json()?;
        assert!(json.contains("\"kind\": \"sequence\""));
        assert!(json.contains("\"primitive\": \"int64\""));
        Ok(())
    }
}
