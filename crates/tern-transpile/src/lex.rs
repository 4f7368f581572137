//! Tokenizer for a single Tern line.
//!
//! Tokens only carry byte spans into the line; expression operands are
//! later sliced out of the original text verbatim.

use crate::symbols::Type;

/// Statement-level keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Const,
    Type(Type),
    If,
    Elif,
    Else,
    While,
    For,
    Func,
}

impl Keyword {
    pub fn from_ident(word: &str) -> Option<Keyword> {
        let kw = match word {
            "const" => Keyword::Const,
            "if" => Keyword::If,
            "elif" => Keyword::Elif,
            "else" => Keyword::Else,
            "while" => Keyword::While,
            "for" => Keyword::For,
            "func" => Keyword::Func,
            _ => return Type::from_keyword(word).map(Keyword::Type),
        };
        Some(kw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Ident,
    Number,
    /// String or character literal, quotes included.
    Str,
    Punct(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }

    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }

    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.kind == TokenKind::Keyword(kw)
    }
}

pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether `text` is exactly one identifier.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if is_ident_start(c) => chars.all(is_ident_char),
        _ => false,
    }
}

/// Split a line into tokens. Never fails: unknown characters become
/// punctuation and an unterminated string runs to the end of the line.
pub fn tokenize(src: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }

        let kind = if is_ident_start(c) {
            while chars.next_if(|(_, c)| is_ident_char(*c)).is_some() {}
            TokenKind::Ident
        } else if c.is_ascii_digit() {
            while chars
                .next_if(|(_, c)| is_ident_char(*c) || *c == '.')
                .is_some()
            {}
            TokenKind::Number
        } else if c == '"' || c == '\'' {
            let mut escaped = false;
            for (_, next) in chars.by_ref() {
                if escaped {
                    escaped = false;
                } else if next == '\\' {
                    escaped = true;
                } else if next == c {
                    break;
                }
            }
            TokenKind::Str
        } else {
            TokenKind::Punct(c)
        };

        let end = chars.peek().map_or(src.len(), |(i, _)| *i);
        let kind = match kind {
            TokenKind::Ident => Keyword::from_ident(&src[start..end])
                .map_or(TokenKind::Ident, TokenKind::Keyword),
            other => other,
        };
        tokens.push(Token { kind, start, end });
    }

    tokens
}
