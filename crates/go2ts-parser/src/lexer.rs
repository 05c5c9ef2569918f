//! Scanner for Go source text
//!
//! Produces the token stream (with automatic semicolons inserted the way the
//! Go language reference describes) and, separately, every comment with its line span so
//! the parser can attach doc comments to declarations.

use crate::error::ParserError;
use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    Number,
    /// Interpreted or raw string literal, delimiters included
    String,
    Char,

    // Keywords the parser cares about
    Package,
    Import,
    Type,
    Struct,
    Map,
    Chan,
    Func,
    Interface,
    Const,
    Var,
    /// Any other Go keyword
    Keyword,

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Dot,
    Ellipsis,
    Star,
    Assign,
    Arrow,
    /// Any other operator
    Operator,

    Eof,
}

fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    let kind = match ident {
        "package" => TokenKind::Package,
        "import" => TokenKind::Import,
        "type" => TokenKind::Type,
        "struct" => TokenKind::Struct,
        "map" => TokenKind::Map,
        "chan" => TokenKind::Chan,
        "func" => TokenKind::Func,
        "interface" => TokenKind::Interface,
        "const" => TokenKind::Const,
        "var" => TokenKind::Var,
        "break" | "case" | "continue" | "default" | "defer" | "else" | "fallthrough" | "for"
        | "go" | "goto" | "if" | "range" | "return" | "select" | "switch" => TokenKind::Keyword,
        _ => return None,
    };
    Some(kind)
}

/// Operators, longest first so the scan is maximal munch
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "&^", "+", "-", "*", "/", "%", "&", "|",
    "^", "<", ">", "=", "!", "~", "(", ")", "[", "]", "{", "}", ",", ";", ".", ":",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of file"),
            TokenKind::Semicolon if self.lexeme == "\n" => write!(f, "newline"),
            _ => write!(f, "'{}'", self.lexeme),
        }
    }
}

/// A `//` or `/* */` comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub line: usize,
    pub end_line: usize,
    /// Follows code on its starting line, so it can never be a doc comment
    pub trailing: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub comments: Vec<Comment>,
}

pub struct Scanner<'a> {
    source: &'a str,
    file: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
    comments: Vec<Comment>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str, file: &'a str) -> Self {
        Self {
            source,
            file,
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
            tokens: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Tokenize the entire source
    pub fn scan(mut self) -> Result<Lexed, ParserError> {
        if self.peek() == Some('\u{feff}') {
            self.advance();
            self.column = 1;
        }
        while let Some(c) = self.peek() {
            match c {
                '\n' => {
                    self.insert_semicolon();
                    self.advance();
                }
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '/' if matches!(self.peek_second(), Some('/')) => self.scan_line_comment(),
                '/' if matches!(self.peek_second(), Some('*')) => self.scan_block_comment()?,
                '"' => self.scan_interpreted_string()?,
                '`' => self.scan_raw_string()?,
                '\'' => self.scan_char()?,
                c if c.is_ascii_digit() => self.scan_number(),
                '.' if self.peek_second().is_some_and(|n| n.is_ascii_digit()) => {
                    self.scan_number()
                }
                c if is_ident_start(c) => self.scan_identifier(),
                _ => self.scan_operator()?,
            }
        }
        self.insert_semicolon();
        let (line, column) = (self.line, self.column);
        self.tokens.push(Token::new(TokenKind::Eof, "", line, column));

        Ok(Lexed {
            tokens: self.tokens,
            comments: self.comments,
        })
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.chars.clone();
        chars.next();
        chars.next().map(|(_, c)| c)
    }

    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(offset, _)| *offset)
            .unwrap_or(self.source.len())
    }

    fn advance(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, line: usize, column: usize, message: impl Into<String>) -> ParserError {
        ParserError::parse(self.file, line, column, message)
    }

    /// Go inserts a semicolon at a newline after a line's final token when
    /// that token could end a statement
    fn insert_semicolon(&mut self) {
        let Some(last) = self.tokens.last() else {
            return;
        };
        let terminates = match last.kind {
            TokenKind::Ident
            | TokenKind::Number
            | TokenKind::String
            | TokenKind::Char
            | TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::RBrace => true,
            TokenKind::Keyword => matches!(
                last.lexeme.as_str(),
                "break" | "continue" | "fallthrough" | "return"
            ),
            TokenKind::Operator => matches!(last.lexeme.as_str(), "++" | "--"),
            _ => false,
        };
        if terminates {
            let (line, column) = (self.line, self.column);
            self.tokens
                .push(Token::new(TokenKind::Semicolon, "\n", line, column));
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: usize, column: usize) {
        let source = self.source;
        let end = self.offset();
        self.tokens
            .push(Token::new(kind, &source[start..end], line, column));
    }

    fn follows_code(&self, line: usize) -> bool {
        self.tokens.last().is_some_and(|token| token.line == line)
    }

    fn scan_line_comment(&mut self) {
        let start = self.offset();
        let line = self.line;
        while self.peek().is_some_and(|c| c != '\n') {
            self.advance();
        }
        let end = self.offset();
        let trailing = self.follows_code(line);
        self.comments.push(Comment {
            text: self.source[start..end].trim_end_matches('\r').to_string(),
            line,
            end_line: line,
            trailing,
        });
    }

    fn scan_block_comment(&mut self) -> Result<(), ParserError> {
        let start = self.offset();
        let (line, column) = (self.line, self.column);
        self.advance();
        self.advance();
        loop {
            match self.advance() {
                None => return Err(self.error(line, column, "comment not terminated")),
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    break;
                }
                Some(_) => {}
            }
        }
        let end = self.offset();
        let end_line = self.line;
        let trailing = self.follows_code(line);
        self.comments.push(Comment {
            text: self.source[start..end].to_string(),
            line,
            end_line,
            trailing,
        });
        // a block comment spanning lines acts like a newline
        if end_line > line {
            self.insert_semicolon();
        }
        Ok(())
    }

    fn scan_interpreted_string(&mut self) -> Result<(), ParserError> {
        let start = self.offset();
        let (line, column) = (self.line, self.column);
        self.advance();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(self.error(line, column, "string literal not terminated"))
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        self.push(TokenKind::String, start, line, column);
        Ok(())
    }

    fn scan_raw_string(&mut self) -> Result<(), ParserError> {
        let start = self.offset();
        let (line, column) = (self.line, self.column);
        self.advance();
        loop {
            match self.advance() {
                None => return Err(self.error(line, column, "raw string literal not terminated")),
                Some('`') => break,
                Some(_) => {}
            }
        }
        self.push(TokenKind::String, start, line, column);
        Ok(())
    }

    fn scan_char(&mut self) -> Result<(), ParserError> {
        let start = self.offset();
        let (line, column) = (self.line, self.column);
        self.advance();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(self.error(line, column, "rune literal not terminated"))
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some('\'') => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        self.push(TokenKind::Char, start, line, column);
        Ok(())
    }

    /// Loose number scan: digits, letters (hex, prefixes, exponents, `i`),
    /// underscores, dots, and a sign directly after an exponent marker
    fn scan_number(&mut self) {
        let start = self.offset();
        let (line, column) = (self.line, self.column);
        let mut previous = '\0';
        while let Some(c) = self.peek() {
            let signed_exponent =
                matches!(c, '+' | '-') && matches!(previous, 'e' | 'E' | 'p' | 'P');
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || signed_exponent {
                previous = c;
                self.advance();
            } else {
                break;
            }
        }
        self.push(TokenKind::Number, start, line, column);
    }

    fn scan_identifier(&mut self) {
        let start = self.offset();
        let (line, column) = (self.line, self.column);
        while self.peek().is_some_and(is_ident_continue) {
            self.advance();
        }
        let source = self.source;
        let end = self.offset();
        let kind = lookup_keyword(&source[start..end]).unwrap_or(TokenKind::Ident);
        self.push(kind, start, line, column);
    }

    fn scan_operator(&mut self) -> Result<(), ParserError> {
        let start = self.offset();
        let (line, column) = (self.line, self.column);
        let source = self.source;
        let rest = &source[start..];
        let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) else {
            let c = self.peek().unwrap_or_default();
            return Err(self.error(line, column, format!("unexpected character '{}'", c)));
        };
        for _ in 0..op.chars().count() {
            self.advance();
        }
        let kind = match *op {
            "(" => TokenKind::LParen,
            ")" => TokenKind::RParen,
            "{" => TokenKind::LBrace,
            "}" => TokenKind::RBrace,
            "[" => TokenKind::LBracket,
            "]" => TokenKind::RBracket,
            "," => TokenKind::Comma,
            ";" => TokenKind::Semicolon,
            "." => TokenKind::Dot,
            "..." => TokenKind::Ellipsis,
            "*" => TokenKind::Star,
            "=" => TokenKind::Assign,
            "<-" => TokenKind::Arrow,
            _ => TokenKind::Operator,
        };
        self.push(kind, start, line, column);
        Ok(())
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Tokenize Go source
pub fn scan(source: &str, file: &str) -> Result<Lexed, ParserError> {
    Scanner::new(source, file).scan()
}
