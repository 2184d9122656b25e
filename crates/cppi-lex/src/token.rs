//! The fixed token-kind set the lexer emits.

use std::fmt;

/// The closed set of lexical categories the language recognises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Int,
    Float,
    Double,
    Char,
    Bool,
    Void,
    Long,
    Short,
    Unsigned,
    Signed,
    If,
    Else,
    While,
    For,
    Return,
    Break,
    Continue,
    Do,
    True,
    False,
    Include,
    Iostream,
    Namespace,
    Std,
    Using,
    Class,
    Struct,
    Const,
    Enum,
    Auto,
    New,
    Delete,
    Switch,
    Case,
    Default,
    Nullptr,

    // Fused std:: tokens
    StdCout,
    StdEndl,
    StdString,

    // Literals
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,
    CharLiteral,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    AndAnd,
    OrOr,
    Bang,
    PlusPlus,
    MinusMinus,
    Shl, // "<<"
    Amp,

    // Punctuation
    Semicolon,
    Comma,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Dot,
    Colon,
    Arrow,
    ScopeResolution, // "::"

    // Preprocessor
    Hash,

    // Meta
    Identifier,
    Newline,
    Eof,
    Unknown,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl TokenKind {
    /// Looks up the fixed keyword table. Returns `None` for anything that is
    /// an ordinary identifier.
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        use TokenKind::*;
        Some(match s {
            "int" => Int,
            "float" => Float,
            "double" => Double,
            "char" => Char,
            "bool" => Bool,
            "void" => Void,
            "long" => Long,
            "short" => Short,
            "unsigned" => Unsigned,
            "signed" => Signed,
            "if" => If,
            "else" => Else,
            "while" => While,
            "for" => For,
            "return" => Return,
            "break" => Break,
            "continue" => Continue,
            "do" => Do,
            "true" => True,
            "false" => False,
            "include" => Include,
            "iostream" => Iostream,
            "namespace" => Namespace,
            "std" => Std,
            "using" => Using,
            "class" => Class,
            "struct" => Struct,
            "const" => Const,
            "enum" => Enum,
            "auto" => Auto,
            "new" => New,
            "delete" => Delete,
            "switch" => Switch,
            "case" => Case,
            "default" => Default,
            "nullptr" => Nullptr,
            _ => return None,
        })
    }
}

/// An immutable lexical unit produced in source order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }
}
