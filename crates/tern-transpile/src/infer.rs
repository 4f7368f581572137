//! Best-effort static type inference over expression text.
//!
//! The heuristics run in a fixed order and the first match wins; later
//! rules rely on earlier ones having excluded literals.

use crate::lex::is_ident_char;
use crate::symbols::{SymbolTable, Type};

/// Infer the type of an expression from its surface text.
pub fn infer(expr: &str, symbols: &SymbolTable) -> Type {
    let expr = expr.trim();

    if expr.starts_with('"') {
        return Type::String;
    }
    if expr == "true" || expr == "false" {
        return Type::Bool;
    }
    if expr.starts_with('(') && expr.contains(',') {
        return Type::Tuple;
    }
    if expr.starts_with('[') {
        return Type::List;
    }
    if expr.starts_with('{') {
        return Type::Dict;
    }

    let unsigned = expr.strip_prefix('-').unwrap_or(expr);
    if expr.contains('.') && unsigned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Type::Float;
    }
    if expr
        .char_indices()
        .all(|(i, c)| c.is_ascii_digit() || (i == 0 && c == '-'))
    {
        return Type::Int;
    }

    // An identifier directly followed by `[` is an indexing base, handled below.
    let ident = leading_identifier(expr);
    if !ident.is_empty() && !expr[ident.len()..].trim_start().starts_with('[') {
        let ty = symbols.lookup(ident);
        if ty != Type::Unknown {
            return ty;
        }
    }

    if let Some(open) = expr.find('[') {
        let base = trailing_identifier(expr[..open].trim_end());
        if matches!(symbols.lookup(base), Type::List | Type::String) {
            // Strings index to their character code.
            return Type::Int;
        }
    }

    Type::Int
}

/// The maximal run of identifier characters at the start of `text`.
pub fn leading_identifier(text: &str) -> &str {
    let end = text
        .char_indices()
        .find(|(_, c)| !is_ident_char(*c))
        .map_or(text.len(), |(i, _)| i);
    &text[..end]
}

/// The maximal run of identifier characters at the end of `text`.
pub fn trailing_identifier(text: &str) -> &str {
    let start = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_ident_char(*c))
        .last()
        .map_or(text.len(), |(i, _)| i);
    &text[start..]
}
