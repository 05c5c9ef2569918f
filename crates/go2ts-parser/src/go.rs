//! Recursive-descent parser for Go type declarations
//!
//! Builds a [`CompilationUnit`] holding every `type` declaration of a file.
//! Doc comments are attached the way `go/parser` does it: the comment group
//! ending on the line directly above the `type` keyword (or above a spec
//! inside a `type ( ... )` group) belongs to the declaration.

use crate::error::ParserError;
use crate::lexer::{self, Comment, Token, TokenKind};
use crate::Parser;
use go2ts_core::{CompilationUnit, Declaration, DeclaredType, Field};
use std::collections::HashMap;
use tracing::{debug, instrument, trace};

/// Predeclared identifiers that denote interfaces rather than data
const INTERFACE_IDENTS: &[&str] = &["any", "error", "comparable"];

#[derive(Debug, Clone)]
pub struct GoParser {
    file_name: String,
}

impl GoParser {
    pub fn new() -> Self {
        Self {
            file_name: "<source>".to_string(),
        }
    }

    /// Name used in error messages and recorded in the unit's source files
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    #[instrument(skip(self, source), fields(file = %self.file_name), level = "debug")]
    pub fn parse_source(&self, source: &str) -> Result<CompilationUnit, ParserError> {
        let lexed = lexer::scan(source, &self.file_name)?;
        let mut state = ParseState::new(&self.file_name, lexed.tokens, &lexed.comments);
        let unit = state.parse_file()?;
        debug!(
            "parsed package {} with {} type declarations",
            unit.package,
            unit.declarations.len()
        );
        Ok(unit)
    }
}

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for GoParser {
    type Input = str;

    fn parse(&self, input: &str) -> Result<CompilationUnit, ParserError> {
        self.parse_source(input)
    }
}

/// Comment groups indexed by the line they end on
struct DocIndex {
    by_end_line: HashMap<usize, Vec<String>>,
}

impl DocIndex {
    /// Adjacent comments (no blank line between) form one group
    ///
    /// A comment that follows code on its line ends the current group and is
    /// never part of one.
    fn new(comments: &[Comment]) -> Self {
        let mut by_end_line = HashMap::new();
        let mut group: Vec<String> = Vec::new();
        let mut group_end = 0;

        for comment in comments {
            if comment.trailing {
                if !group.is_empty() {
                    by_end_line.insert(group_end, std::mem::take(&mut group));
                }
                continue;
            }
            if !group.is_empty() && comment.line > group_end + 1 {
                by_end_line.insert(group_end, std::mem::take(&mut group));
            }
            group.push(comment.text.clone());
            group_end = comment.end_line;
        }
        if !group.is_empty() {
            by_end_line.insert(group_end, group);
        }

        Self { by_end_line }
    }

    fn doc_above(&self, line: usize) -> Vec<String> {
        line.checked_sub(1)
            .and_then(|above| self.by_end_line.get(&above))
            .cloned()
            .unwrap_or_default()
    }
}

struct ParseState<'a> {
    file: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    docs: DocIndex,
}

impl<'a> ParseState<'a> {
    fn new(file: &'a str, tokens: Vec<Token>, comments: &[Comment]) -> Self {
        Self {
            file,
            tokens,
            pos: 0,
            docs: DocIndex::new(comments),
        }
    }

    fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error_at(&self, token: &Token, message: impl Into<String>) -> ParserError {
        ParserError::parse(self.file, token.line, token.column, message)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParserError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let found = self.peek().clone();
            Err(self.error_at(&found, format!("expected {}, found {}", what, found)))
        }
    }

    fn skip_semicolons(&mut self) {
        while self.eat(TokenKind::Semicolon) {}
    }

    /// Skip from an opening bracket to its match, inclusive
    fn skip_balanced(&mut self) -> Result<(), ParserError> {
        let open = self.advance();
        let mut depth = 1usize;
        while depth > 0 {
            let token = self.advance();
            match token.kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => depth -= 1,
                TokenKind::Eof => {
                    return Err(self.error_at(&open, format!("unclosed {}", open)));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Skip a `const`, `var` or `func` declaration up to its terminating semicolon
    fn skip_declaration(&mut self) -> Result<(), ParserError> {
        loop {
            match self.peek_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return Ok(());
                }
                TokenKind::Eof => return Ok(()),
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                    self.skip_balanced()?
                }
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    let token = self.peek().clone();
                    return Err(self.error_at(&token, format!("unexpected {}", token)));
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn parse_file(&mut self) -> Result<CompilationUnit, ParserError> {
        self.skip_semicolons();
        self.expect(TokenKind::Package, "package clause")?;
        let package = self.expect(TokenKind::Ident, "package name")?;
        self.skip_semicolons();

        let mut unit = CompilationUnit::new(package.lexeme);
        unit.source_files.push(self.file.to_string());

        loop {
            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Semicolon => {
                    self.advance();
                }
                TokenKind::Type => {
                    for declaration in self.parse_type_decl()? {
                        unit.add_declaration(declaration);
                    }
                }
                TokenKind::Import | TokenKind::Const | TokenKind::Var | TokenKind::Func => {
                    self.advance();
                    self.skip_declaration()?;
                }
                _ => {
                    let token = self.peek().clone();
                    return Err(self.error_at(
                        &token,
                        format!("expected declaration, found {}", token),
                    ));
                }
            }
        }

        Ok(unit)
    }

    fn parse_type_decl(&mut self) -> Result<Vec<Declaration>, ParserError> {
        let keyword = self.advance();
        let group_doc = self.docs.doc_above(keyword.line);

        if !self.eat(TokenKind::LParen) {
            let declaration = self.parse_type_spec(group_doc)?;
            self.expect_spec_end()?;
            return Ok(vec![declaration]);
        }

        let mut declarations = Vec::new();
        loop {
            self.skip_semicolons();
            if self.eat(TokenKind::RParen) {
                break;
            }
            let spec_line = self.peek().line;
            let mut doc = group_doc.clone();
            if spec_line > keyword.line {
                doc.extend(self.docs.doc_above(spec_line));
            }
            declarations.push(self.parse_type_spec(doc)?);
            if !self.check(TokenKind::RParen) {
                self.expect(TokenKind::Semicolon, "';' or newline after type spec")?;
            }
        }
        self.expect_spec_end()?;
        Ok(declarations)
    }

    fn expect_spec_end(&mut self) -> Result<(), ParserError> {
        if self.check(TokenKind::Eof) {
            return Ok(());
        }
        self.expect(TokenKind::Semicolon, "';' or newline after declaration")
            .map(|_| ())
    }

    fn parse_type_spec(&mut self, doc: Vec<String>) -> Result<Declaration, ParserError> {
        let name = self.expect(TokenKind::Ident, "type name")?;

        // `type List[T any] ...` carries type parameters; `type Grid [N]int`
        // is an array. An identifier followed by anything but `]` means
        // parameters.
        if self.check(TokenKind::LBracket)
            && self.peek_kind_at(1) == TokenKind::Ident
            && self.peek_kind_at(2) != TokenKind::RBracket
        {
            self.skip_balanced()?;
        }
        self.eat(TokenKind::Assign);

        let ty = self.parse_type()?;
        trace!("type {} = {}", name.lexeme, ty);

        Ok(Declaration {
            name: name.lexeme,
            doc,
            ty,
            line: name.line,
        })
    }

    fn parse_type(&mut self) -> Result<DeclaredType, ParserError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Ident => self.parse_type_name(),
            TokenKind::Star => {
                self.advance();
                let pointee = self.parse_type()?;
                Ok(DeclaredType::unsupported(format!("*{}", pointee)))
            }
            TokenKind::LBracket => {
                self.advance();
                if !self.eat(TokenKind::RBracket) {
                    // array length: any constant expression up to the matching `]`
                    let mut depth = 1usize;
                    while depth > 0 {
                        let inner = self.advance();
                        match inner.kind {
                            TokenKind::LBracket | TokenKind::LParen => depth += 1,
                            TokenKind::RBracket | TokenKind::RParen => depth -= 1,
                            TokenKind::Eof => {
                                return Err(self.error_at(&token, "unclosed array length"))
                            }
                            _ => {}
                        }
                    }
                }
                Ok(DeclaredType::sequence(self.parse_type()?))
            }
            TokenKind::Map => {
                self.advance();
                self.expect(TokenKind::LBracket, "'[' after map")?;
                let key = self.parse_type()?;
                self.expect(TokenKind::RBracket, "']' after map key type")?;
                let value = self.parse_type()?;
                Ok(DeclaredType::mapping(key, value))
            }
            TokenKind::Struct => {
                self.advance();
                Ok(DeclaredType::record(self.parse_struct_body()?))
            }
            TokenKind::Chan => {
                self.advance();
                self.eat(TokenKind::Arrow);
                let element = self.parse_type()?;
                Ok(DeclaredType::unsupported(format!("chan {}", element)))
            }
            TokenKind::Arrow => {
                self.advance();
                self.expect(TokenKind::Chan, "'chan' after '<-'")?;
                let element = self.parse_type()?;
                Ok(DeclaredType::unsupported(format!("<-chan {}", element)))
            }
            TokenKind::Func => {
                self.advance();
                self.skip_signature()?;
                Ok(DeclaredType::unsupported("func"))
            }
            TokenKind::Interface => {
                self.advance();
                if !self.check(TokenKind::LBrace) {
                    return Err(self.error_at(&token, "expected '{' after interface"));
                }
                self.skip_balanced()?;
                Ok(DeclaredType::unsupported("interface"))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            _ => Err(self.error_at(&token, format!("expected type, found {}", token))),
        }
    }

    /// `T`, `pkg.T`, `T[Args]`
    fn parse_type_name(&mut self) -> Result<DeclaredType, ParserError> {
        let ident = self.advance();
        let mut ty = if self.eat(TokenKind::Dot) {
            let selected = self.expect(TokenKind::Ident, "identifier after '.'")?;
            DeclaredType::unsupported(format!("{}.{}", ident.lexeme, selected.lexeme))
        } else if INTERFACE_IDENTS.contains(&ident.lexeme.as_str()) {
            DeclaredType::unsupported(ident.lexeme.clone())
        } else {
            DeclaredType::from_ident(&ident.lexeme)
        };

        if self.check(TokenKind::LBracket) {
            self.skip_balanced()?;
            ty = DeclaredType::unsupported(format!("{}[...]", ty));
        }
        Ok(ty)
    }

    /// Parameters and optional results of a function type
    fn skip_signature(&mut self) -> Result<(), ParserError> {
        if !self.check(TokenKind::LParen) {
            let token = self.peek().clone();
            return Err(self.error_at(&token, "expected '(' in function type"));
        }
        self.skip_balanced()?;
        match self.peek_kind() {
            TokenKind::LParen => self.skip_balanced(),
            TokenKind::Ident
            | TokenKind::Star
            | TokenKind::LBracket
            | TokenKind::Map
            | TokenKind::Struct
            | TokenKind::Chan
            | TokenKind::Arrow
            | TokenKind::Func
            | TokenKind::Interface => self.parse_type().map(|_| ()),
            _ => Ok(()),
        }
    }

    fn parse_struct_body(&mut self) -> Result<Vec<Field>, ParserError> {
        self.expect(TokenKind::LBrace, "'{' after struct")?;
        let mut fields = Vec::new();

        loop {
            self.skip_semicolons();
            if self.eat(TokenKind::RBrace) {
                break;
            }
            fields.extend(self.parse_field_decl()?);
            if !self.check(TokenKind::RBrace) {
                self.expect(TokenKind::Semicolon, "';' or newline after field")?;
            }
        }

        Ok(fields)
    }

    /// `List[int]` alone on a field line embeds a generic instantiation;
    /// `Items []int` or `Grid [3]int` name a field of array type
    fn is_embedded_instantiation(&mut self) -> Result<bool, ParserError> {
        let start = self.pos;
        self.advance();
        let skipped = self.skip_balanced();
        let embedded = matches!(
            self.peek_kind(),
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::String
        );
        self.pos = start;
        skipped.map(|_| embedded)
    }

    fn parse_field_decl(&mut self) -> Result<Vec<Field>, ParserError> {
        let embedded = match self.peek_kind() {
            TokenKind::Star => true,
            TokenKind::Ident => match self.peek_kind_at(1) {
                TokenKind::Dot | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::String => {
                    true
                }
                TokenKind::LBracket => self.is_embedded_instantiation()?,
                _ => false,
            },
            _ => {
                let token = self.peek().clone();
                return Err(self.error_at(&token, format!("expected field, found {}", token)));
            }
        };

        let fields = if embedded {
            vec![Field::embedded(self.parse_type()?)]
        } else {
            let mut names = vec![self.advance().lexeme];
            while self.eat(TokenKind::Comma) {
                names.push(self.expect(TokenKind::Ident, "field name")?.lexeme);
            }
            let ty = self.parse_type()?;
            names
                .into_iter()
                .map(|name| Field::new(name, ty.clone()))
                .collect()
        };

        let tag = if self.check(TokenKind::String) {
            Some(self.advance().lexeme)
        } else {
            None
        };

        Ok(fields
            .into_iter()
            .map(|mut field| {
                field.tag = tag.clone();
                field
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use go2ts_core::PrimitiveKind;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Result<CompilationUnit, ParserError> {
        GoParser::new().with_file_name("test.go").parse(source)
    }

    #[test]
    fn test_simple_struct_with_doc() -> Result<(), ParserError> {
        let unit = parse(
            "package test\n\n// @ts-export\ntype Simple struct {\n    ID int `json:\"id\"`\n    Name string `json:\"name\"`\n}\n",
        )?;
        assert_eq!(unit.package, "test");
        assert_eq!(unit.declarations.len(), 1);

        let simple = &unit.declarations[0];
        assert_eq!(simple.name, "Simple");
        assert_eq!(simple.doc, vec!["// @ts-export".to_string()]);
        assert_eq!(
            simple.fields().map(|f| f.to_vec()),
            Some(vec![
                Field::new("ID", DeclaredType::primitive(PrimitiveKind::Int))
                    .with_tag("`json:\"id\"`"),
                Field::new("Name", DeclaredType::primitive(PrimitiveKind::String))
                    .with_tag("`json:\"name\"`"),
            ])
        );
        Ok(())
    }

    #[test]
    fn test_doc_must_touch_declaration() -> Result<(), ParserError> {
        let unit = parse("package test\n// @ts-export\n\ntype Detached struct{}\n")?;
        assert!(unit.declarations[0].doc.is_empty());
        Ok(())
    }

    #[test]
    fn test_doc_group_spans_adjacent_lines() -> Result<(), ParserError> {
        let unit = parse(
            "package test\n// unrelated\n\n// User is a user.\n// @ts-export\ntype User struct{}\n",
        )?;
        assert_eq!(
            unit.declarations[0].doc,
            vec!["// User is a user.".to_string(), "// @ts-export".to_string()]
        );
        Ok(())
    }

    #[test]
    fn test_composite_field_types() -> Result<(), ParserError> {
        let unit = parse(
            "package test\ntype C struct {\n    Numbers []int\n    Grid [3][3]float64\n    Mapping map[string]bool\n    Ptr *string\n    When time.Time\n    Fn func(int) (string, error)\n    Ch <-chan int\n    Any interface{}\n    Other any\n    Inline struct { A int; B string }\n}\n",
        )?;
        let fields = unit.declarations[0].fields().map(|f| f.to_vec()).unwrap_or_default();
        let types: Vec<String> = fields.iter().map(|f| f.ty.to_string()).collect();
        assert_eq!(
            types,
            vec![
                "[]int",
                "[][]float64",
                "map[string]bool",
                "*string",
                "time.Time",
                "func",
                "<-chan int",
                "interface",
                "any",
                "struct { 2 fields }",
            ]
        );
        assert!(matches!(fields[3].ty, DeclaredType::Unsupported { .. }));
        Ok(())
    }

    #[test]
    fn test_multi_name_and_embedded_fields() -> Result<(), ParserError> {
        let unit = parse(
            "package test\ntype P struct {\n    Base\n    *Other\n    io.Reader\n    X, Y int `json:\"coord\"`\n}\n",
        )?;
        let fields = unit.declarations[0].fields().map(|f| f.to_vec()).unwrap_or_default();
        let names: Vec<Option<&str>> = fields.iter().map(|f| f.name.as_deref()).collect();
        assert_eq!(names, vec![None, None, None, Some("X"), Some("Y")]);
        assert_eq!(fields[4].tag.as_deref(), Some("`json:\"coord\"`"));
        Ok(())
    }

    #[test]
    fn test_generic_embedded_field() -> Result<(), ParserError> {
        let unit = parse(
            "package test\ntype Page struct {\n    List[int]\n    Cursor[string] `json:\"cursor\"`\n    Items []int\n    Total int\n}\n",
        )?;
        let fields = unit.declarations[0].fields().map(|f| f.to_vec()).unwrap_or_default();
        assert_eq!(
            fields,
            vec![
                Field::embedded(DeclaredType::unsupported("List[...]")),
                Field::embedded(DeclaredType::unsupported("Cursor[...]"))
                    .with_tag("`json:\"cursor\"`"),
                Field::new(
                    "Items",
                    DeclaredType::sequence(DeclaredType::primitive(PrimitiveKind::Int))
                ),
                Field::new("Total", DeclaredType::primitive(PrimitiveKind::Int)),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_trailing_comments_are_not_doc() -> Result<(), ParserError> {
        let unit = parse(
            "package test\ntype (\n\tA struct{ X int } // @ts-export\n\tB struct{ Y int }\n)\n\nvar debug = true // @ts-export\ntype Internal struct{ Z int }\n\n// Kept is documented.\nvar kept = 1 // trailing\n// @ts-export\ntype Marked struct{}\n",
        )?;
        let docs: Vec<(&str, Vec<String>)> = unit
            .declarations
            .iter()
            .map(|d| (d.name.as_str(), d.doc.clone()))
            .collect();
        assert_eq!(
            docs,
            vec![
                ("A", vec![]),
                ("B", vec![]),
                ("Internal", vec![]),
                ("Marked", vec!["// @ts-export".to_string()]),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_grouped_declarations_and_skipped_code() -> Result<(), ParserError> {
        let source = r#"package models

import (
    "fmt"
    "time"
)

const Max = 10

var registry = map[string]int{"a": 1}

// @ts-export
type (
    // Account holds balances.
    Account struct {
        Balance float64 `json:"balance"`
    }

    ID string

    // @ts-export
    Ledger[T any] struct {
        Entries []T
    }
)

func (a *Account) String() string {
    if a == nil {
        return "<nil>"
    }
    return fmt.Sprintf("%v", a.Balance)
}

type Grid [4]int
"#;
        let unit = parse(source)?;
        let names: Vec<&str> = unit.declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Account", "ID", "Ledger", "Grid"]);

        assert_eq!(
            unit.declarations[0].doc,
            vec!["// @ts-export".to_string(), "// Account holds balances.".to_string()]
        );
        assert_eq!(unit.declarations[1].doc, vec!["// @ts-export".to_string()]);
        assert_eq!(
            unit.declarations[2].doc,
            vec!["// @ts-export".to_string(), "// @ts-export".to_string()]
        );
        assert_eq!(
            unit.declarations[3].ty,
            DeclaredType::sequence(DeclaredType::primitive(PrimitiveKind::Int))
        );
        Ok(())
    }

    #[test]
    fn test_alias_declaration() -> Result<(), ParserError> {
        let unit = parse("package test\ntype Name = string\n")?;
        assert_eq!(
            unit.declarations[0].ty,
            DeclaredType::primitive(PrimitiveKind::String)
        );
        Ok(())
    }

    #[test]
    fn test_malformed_source_reports_position() {
        let err = parse("package test\ntype Broken struct {\n    A int\n").err();
        assert!(matches!(err, Some(ParserError::Parse { line: 4, .. })), "{:?}", err);

        let err = parse("type A struct{}").err();
        assert!(matches!(err, Some(ParserError::Parse { line: 1, column: 1, .. })));

        let err = parse("package test\ntype A struct { 42 }\n").err();
        assert!(matches!(err, Some(ParserError::Parse { line: 2, .. })));
    }
}
