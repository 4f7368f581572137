//! Textual rewrites applied to expression operands before emission.

use crate::lex::{TokenKind, tokenize};
use crate::symbols::{SymbolTable, Type};
use std::borrow::Cow;

/// Clock calls and their C equivalents.
pub const TIME_FUNCTIONS: &[(&str, &str)] = &[
    ("time.now()", "((long)time(NULL))"),
    ("date.now()", "((long)time(NULL))"),
    ("clock.now()", "((double)clock() / CLOCKS_PER_SEC)"),
];

/// Replace every known clock call with its C equivalent.
pub fn substitute_time(expr: &str) -> Cow<'_, str> {
    if !expr.contains(".now()") {
        return Cow::Borrowed(expr);
    }
    let mut out = expr.to_string();
    for (call, replacement) in TIME_FUNCTIONS {
        if out.contains(call) {
            out = out.replace(call, replacement);
        }
    }
    Cow::Owned(out)
}

/// Insert the `.data` storage accessor after list and tuple identifiers
/// that are indexed with `[`.
pub fn container_access<'a>(expr: &'a str, symbols: &SymbolTable) -> Cow<'a, str> {
    let tokens = tokenize(expr);
    let mut out = String::new();
    let mut copied = 0;

    for (i, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::Ident {
            continue;
        }
        let indexed = tokens.get(i + 1).is_some_and(|next| next.is_punct('['));
        let member = i > 0 && tokens[i - 1].is_punct('.');
        if indexed
            && !member
            && matches!(symbols.lookup(token.text(expr)), Type::List | Type::Tuple)
        {
            out.push_str(&expr[copied..token.end]);
            out.push_str(".data");
            copied = token.end;
        }
    }

    if copied == 0 {
        return Cow::Borrowed(expr);
    }
    out.push_str(&expr[copied..]);
    Cow::Owned(out)
}

/// Apply every rewrite to an expression operand.
pub fn rewrite_expr(expr: &str, symbols: &SymbolTable) -> String {
    let accessed = container_access(expr.trim(), symbols);
    substitute_time(&accessed).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_substitution() {
        assert_eq!(substitute_time("time.now()"), "((long)time(NULL))");
        assert_eq!(
            substitute_time("clock.now() - start"),
            "((double)clock() / CLOCKS_PER_SEC) - start"
        );
        assert_eq!(
            substitute_time("date.now() + time.now()"),
            "((long)time(NULL)) + ((long)time(NULL))"
        );
        assert!(matches!(substitute_time("x + 1"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_container_access() {
        let mut symbols = SymbolTable::default();
        symbols.register("xs", Type::List, false).unwrap();
        symbols.register("t", Type::Tuple, false).unwrap();
        symbols.register("s", Type::String, false).unwrap();

        assert_eq!(container_access("xs[0] + 1", &symbols), "xs.data[0] + 1");
        assert_eq!(
            container_access("xs[i] * t[1]", &symbols),
            "xs.data[i] * t.data[1]"
        );
        assert_eq!(container_access("s[0]", &symbols), "s[0]");
        assert_eq!(container_access("xs", &symbols), "xs");
        assert_eq!(container_access("a.xs[0]", &symbols), "a.xs[0]");
        assert_eq!(container_access("\"xs[0]\"", &symbols), "\"xs[0]\"");
    }

    #[test]
    fn test_rewrite_expr_combines() {
        let mut symbols = SymbolTable::default();
        symbols.register("xs", Type::List, false).unwrap();
        assert_eq!(
            rewrite_expr(" xs[0] + time.now() ", &symbols),
            "xs.data[0] + ((long)time(NULL))"
        );
    }
}
