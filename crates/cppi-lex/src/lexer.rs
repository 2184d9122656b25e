//! The lexer: source text in, a flat `Vec<Token>` terminated by `Eof` out.
//!
//! Lexing never fails (§7): anything that doesn't match a known shape
//! becomes an `Unknown` token and scanning continues. Errors are left for
//! the parser and later phases to raise.

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Tokenizes the entire source, always ending with exactly one `Eof`.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn next_token(&mut self) -> Token {
        self.skip_insignificant();

        let line = self.cursor.line();
        let column = self.cursor.column();
        let start = self.cursor.position();

        if self.cursor.is_at_end() {
            return Token::new(TokenKind::Eof, "", line, column);
        }

        let c = self.cursor.current_char();
        match c {
            '\n' => {
                self.cursor.advance();
                Token::new(TokenKind::Newline, "\n", line, column)
            }
            '(' => self.single(TokenKind::LParen, line, column),
            ')' => self.single(TokenKind::RParen, line, column),
            '{' => self.single(TokenKind::LBrace, line, column),
            '}' => self.single(TokenKind::RBrace, line, column),
            '[' => self.single(TokenKind::LBracket, line, column),
            ']' => self.single(TokenKind::RBracket, line, column),
            ',' => self.single(TokenKind::Comma, line, column),
            ';' => self.single(TokenKind::Semicolon, line, column),
            '#' => self.single(TokenKind::Hash, line, column),
            '.' => self.single(TokenKind::Dot, line, column),
            '*' => self.single(TokenKind::Star, line, column),
            '%' => self.single(TokenKind::Percent, line, column),
            '/' => self.single(TokenKind::Slash, line, column),
            ':' => self.lex_colon(line, column),
            '+' => self.lex_plus(line, column),
            '-' => self.lex_minus(line, column),
            '=' => self.lex_equals(line, column),
            '!' => self.lex_bang(line, column),
            '<' => self.lex_less(line, column),
            '>' => self.lex_greater(line, column),
            '&' => self.lex_ampersand(line, column),
            '|' => self.lex_pipe(line, column, start),
            '"' => self.lex_string(line, column, start),
            '\'' => self.lex_char(line, column, start),
            c if is_ident_start(c) => self.lex_identifier_or_keyword(line, column, start),
            c if c.is_ascii_digit() => self.lex_number(line, column, start),
            _ => {
                self.cursor.advance();
                Token::new(TokenKind::Unknown, self.cursor.slice_from(start), line, column)
            }
        }
    }

    /// Skips spaces, tabs, carriage returns, and comments. Newlines are left
    /// for the caller to turn into `NEWLINE` tokens.
    fn skip_insignificant(&mut self) {
        loop {
            match self.cursor.current_char() {
                ' ' | '\t' | '\r' => {
                    self.cursor.advance();
                }
                '/' if self.cursor.peek_char(1) == '/' => {
                    while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                        self.cursor.advance();
                    }
                }
                '/' if self.cursor.peek_char(1) == '*' => {
                    self.cursor.advance();
                    self.cursor.advance();
                    while !self.cursor.is_at_end()
                        && !(self.cursor.current_char() == '*' && self.cursor.peek_char(1) == '/')
                    {
                        self.cursor.advance();
                    }
                    if !self.cursor.is_at_end() {
                        self.cursor.advance();
                        self.cursor.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn single(&mut self, kind: TokenKind, line: u32, column: u32) -> Token {
        let start = self.cursor.position();
        self.cursor.advance();
        Token::new(kind, self.cursor.slice_from(start), line, column)
    }

    fn two_or_one(
        &mut self,
        second: char,
        two_kind: TokenKind,
        one_kind: TokenKind,
        line: u32,
        column: u32,
    ) -> Token {
        let start = self.cursor.position();
        self.cursor.advance();
        if self.cursor.match_char(second) {
            Token::new(two_kind, self.cursor.slice_from(start), line, column)
        } else {
            Token::new(one_kind, self.cursor.slice_from(start), line, column)
        }
    }

    fn lex_colon(&mut self, line: u32, column: u32) -> Token {
        self.two_or_one(':', TokenKind::ScopeResolution, TokenKind::Colon, line, column)
    }

    fn lex_plus(&mut self, line: u32, column: u32) -> Token {
        self.two_or_one('+', TokenKind::PlusPlus, TokenKind::Plus, line, column)
    }

    fn lex_minus(&mut self, line: u32, column: u32) -> Token {
        let start = self.cursor.position();
        self.cursor.advance();
        if self.cursor.match_char('-') {
            Token::new(TokenKind::MinusMinus, self.cursor.slice_from(start), line, column)
        } else if self.cursor.match_char('>') {
            Token::new(TokenKind::Arrow, self.cursor.slice_from(start), line, column)
        } else {
            Token::new(TokenKind::Minus, self.cursor.slice_from(start), line, column)
        }
    }

    fn lex_equals(&mut self, line: u32, column: u32) -> Token {
        self.two_or_one('=', TokenKind::EqEq, TokenKind::Eq, line, column)
    }

    fn lex_bang(&mut self, line: u32, column: u32) -> Token {
        self.two_or_one('=', TokenKind::NotEq, TokenKind::Bang, line, column)
    }

    fn lex_less(&mut self, line: u32, column: u32) -> Token {
        let start = self.cursor.position();
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Token::new(TokenKind::LtEq, self.cursor.slice_from(start), line, column)
        } else if self.cursor.match_char('<') {
            Token::new(TokenKind::Shl, self.cursor.slice_from(start), line, column)
        } else {
            Token::new(TokenKind::Lt, self.cursor.slice_from(start), line, column)
        }
    }

    fn lex_greater(&mut self, line: u32, column: u32) -> Token {
        self.two_or_one('=', TokenKind::GtEq, TokenKind::Gt, line, column)
    }

    fn lex_ampersand(&mut self, line: u32, column: u32) -> Token {
        self.two_or_one('&', TokenKind::AndAnd, TokenKind::Amp, line, column)
    }

    fn lex_pipe(&mut self, line: u32, column: u32, start: usize) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('|') {
            Token::new(TokenKind::OrOr, self.cursor.slice_from(start), line, column)
        } else {
            Token::new(TokenKind::Unknown, self.cursor.slice_from(start), line, column)
        }
    }

    fn lex_string(&mut self, line: u32, column: u32, start: usize) -> Token {
        self.cursor.advance(); // opening quote
        while !self.cursor.is_at_end() && self.cursor.current_char() != '"' {
            if self.cursor.current_char() == '\\' {
                self.cursor.advance();
                if !self.cursor.is_at_end() {
                    self.cursor.advance();
                }
            } else {
                self.cursor.advance();
            }
        }
        if !self.cursor.is_at_end() {
            self.cursor.advance(); // closing quote
        }
        Token::new(TokenKind::StringLiteral, self.cursor.slice_from(start), line, column)
    }

    fn lex_char(&mut self, line: u32, column: u32, start: usize) -> Token {
        self.cursor.advance(); // opening quote
        while !self.cursor.is_at_end() && self.cursor.current_char() != '\'' {
            if self.cursor.current_char() == '\\' {
                self.cursor.advance();
                if !self.cursor.is_at_end() {
                    self.cursor.advance();
                }
            } else {
                self.cursor.advance();
            }
        }
        if !self.cursor.is_at_end() {
            self.cursor.advance(); // closing quote
        }
        Token::new(TokenKind::CharLiteral, self.cursor.slice_from(start), line, column)
    }

    fn lex_number(&mut self, line: u32, column: u32, start: usize) -> Token {
        let mut is_float = false;
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }
        if self.cursor.current_char() == '.' && self.cursor.peek_char(1).is_ascii_digit() {
            is_float = true;
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }
        let kind = if is_float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntegerLiteral
        };
        Token::new(kind, self.cursor.slice_from(start), line, column)
    }

    /// Scans `[A-Za-z_][A-Za-z0-9_]*`, then applies the keyword table and the
    /// `std::<ident>` fusion rule (§4.1).
    fn lex_identifier_or_keyword(&mut self, line: u32, column: u32, start: usize) -> Token {
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);

        if text == "std"
            && self.cursor.current_char() == ':'
            && self.cursor.peek_char(1) == ':'
            && is_ident_start(self.cursor.peek_char(2))
        {
            self.cursor.advance(); // first ':'
            self.cursor.advance(); // second ':'
            let ident_start = self.cursor.position();
            while is_ident_continue(self.cursor.current_char()) {
                self.cursor.advance();
            }
            let ident = self.cursor.slice_from(ident_start);
            return match ident {
                "cout" => Token::new(TokenKind::StdCout, "std::cout", line, column),
                "endl" => Token::new(TokenKind::StdEndl, "std::endl", line, column),
                "string" => Token::new(TokenKind::StdString, "std::string", line, column),
                other => Token::new(TokenKind::Identifier, format!("std::{other}"), line, column),
            };
        }

        if let Some(kind) = TokenKind::keyword_from_str(text) {
            Token::new(kind, text, line, column)
        } else {
            Token::new(TokenKind::Identifier, text, line, column)
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn ends_in_exactly_one_eof() {
        let tokens = Lexer::new("int x = 1;").tokenize();
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
        assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
    }

    #[test]
    fn empty_source_yields_only_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn keywords_are_recognised() {
        assert_eq!(kinds("int"), vec![TokenKind::Int, TokenKind::Eof]);
        assert_eq!(kinds("return"), vec![TokenKind::Return, TokenKind::Eof]);
    }

    #[test]
    fn fuses_std_cout_and_endl() {
        assert_eq!(
            kinds("std::cout std::endl"),
            vec![TokenKind::StdCout, TokenKind::StdEndl, TokenKind::Eof]
        );
    }

    #[test]
    fn fuses_unknown_std_qualified_name_as_identifier() {
        let tokens = Lexer::new("std::vector").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].lexeme, "std::vector");
    }

    #[test]
    fn bare_std_scope_resolution_splits_into_two_tokens() {
        assert_eq!(
            kinds("std::"),
            vec![TokenKind::Std, TokenKind::ScopeResolution, TokenKind::Eof]
        );
    }

    #[test]
    fn two_char_operators_take_priority_over_one_char() {
        assert_eq!(
            kinds("<<=="),
            vec![TokenKind::Shl, TokenKind::EqEq, TokenKind::Eof]
        );
        assert_eq!(kinds("++"), vec![TokenKind::PlusPlus, TokenKind::Eof]);
        assert_eq!(kinds("&&"), vec![TokenKind::AndAnd, TokenKind::Eof]);
    }

    #[test]
    fn integer_and_float_literals_are_distinguished() {
        assert_eq!(kinds("42"), vec![TokenKind::IntegerLiteral, TokenKind::Eof]);
        assert_eq!(kinds("3.14"), vec![TokenKind::FloatLiteral, TokenKind::Eof]);
    }

    #[test]
    fn string_literal_keeps_surrounding_quotes_in_lexeme() {
        let tokens = Lexer::new(r#""hi""#).tokenize();
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].lexeme, "\"hi\"");
    }

    #[test]
    fn comments_are_stripped_but_newlines_survive() {
        assert_eq!(
            kinds("// comment\nint"),
            vec![TokenKind::Newline, TokenKind::Int, TokenKind::Eof]
        );
        assert_eq!(kinds("/* block \n comment */int"), vec![TokenKind::Int, TokenKind::Eof]);
    }

    #[test]
    fn unknown_byte_becomes_unknown_token_and_scanning_continues() {
        assert_eq!(kinds("@int"), vec![TokenKind::Unknown, TokenKind::Int, TokenKind::Eof]);
    }
}
