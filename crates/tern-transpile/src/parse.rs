//! Statement parser.
//!
//! Every significant line holds exactly one statement. The first token
//! picks the statement form; operands are sliced verbatim out of the line
//! so expressions reach the output unchanged. Parsing never fails: a
//! malformed line still produces a statement (with fallback operands)
//! alongside the errors found.

use crate::error::SyntaxError;
use crate::lex::{Keyword, Token, TokenKind, is_identifier, tokenize};
use crate::scope::Closing;
use crate::symbols::Type;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration<'a> {
    pub is_const: bool,
    /// `None` for `const NAME = value`, which infers its type.
    pub ty: Option<Type>,
    pub name: Option<&'a str>,
    pub value: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictOp {
    Set,
    Get,
}

impl DictOp {
    pub fn name(self) -> &'static str {
        match self {
            DictOp::Set => "dset",
            DictOp::Get => "dget",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            DictOp::Set => 3,
            DictOp::Get => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement<'a> {
    Declare(Declaration<'a>),
    Print {
        expr: Option<&'a str>,
    },
    If {
        cond: &'a str,
        closing: Closing,
    },
    Elif {
        cond: &'a str,
        closing: Closing,
    },
    Else {
        closing: Closing,
    },
    While {
        cond: &'a str,
        closing: Closing,
    },
    ForRange {
        var: &'a str,
        start: &'a str,
        end: &'a str,
        step: &'a str,
        closing: Closing,
    },
    ForIn {
        var: &'a str,
        iterable: &'a str,
        closing: Closing,
    },
    Func {
        name: Option<&'a str>,
        closing: Closing,
    },
    Append {
        list: &'a str,
        value: &'a str,
    },
    Dict {
        op: DictOp,
        args: Vec<&'a str>,
    },
    /// Anything unrecognised, passed through as a C statement.
    Raw(&'a str),
    /// Nothing to emit; the accompanying errors say why.
    Invalid,
}

impl Statement<'_> {
    /// Whether this statement extends an open `if` chain.
    pub fn is_continuation(&self) -> bool {
        matches!(self, Statement::Elif { .. } | Statement::Else { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<'a> {
    pub statement: Statement<'a>,
    pub errors: Vec<SyntaxError>,
}

/// Parse one line with comments and indentation already removed.
pub fn parse_line(text: &str) -> Parsed<'_> {
    let mut parser = Parser {
        src: text,
        tokens: tokenize(text),
        errors: Vec::new(),
    };
    let statement = parser.statement();
    Parsed {
        statement,
        errors: parser.errors,
    }
}

/// Split `text` at every `sep` outside brackets and string literals.
///
/// Parts are trimmed. An empty input yields no parts.
pub fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for token in tokenize(text) {
        match token.kind {
            TokenKind::Punct('(' | '[' | '{') => depth += 1,
            TokenKind::Punct(')' | ']' | '}') => depth -= 1,
            TokenKind::Punct(c) if c == sep && depth == 0 => {
                parts.push(text[start..token.start].trim());
                start = token.end;
            }
            _ => {}
        }
    }
    let last = text[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last);
    }
    parts
}

/// Whether `token` is the contextual keyword `word`. `in` and `to` are
/// only special inside a `for` header and stay usable as names elsewhere.
fn is_word(token: &Token, src: &str, word: &str) -> bool {
    token.kind == TokenKind::Ident && token.text(src) == word
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn statement(&mut self) -> Statement<'a> {
        let Some(first) = self.tokens.first().copied() else {
            return Statement::Raw(self.src);
        };
        match first.kind {
            TokenKind::Keyword(Keyword::Const) => self.declaration(true),
            TokenKind::Keyword(Keyword::Type(_)) if self.spaced_after(0) => {
                self.declaration(false)
            }
            TokenKind::Ident if self.is_punct(1, '(') => match first.text(self.src) {
                "print" => self.print(),
                "append" => self.append(),
                "dset" => self.dict(DictOp::Set),
                "dget" => self.dict(DictOp::Get),
                _ => Statement::Raw(self.src),
            },
            TokenKind::Keyword(Keyword::If) => {
                let (cond, closing) = self.condition(1, "if", "1");
                Statement::If { cond, closing }
            }
            TokenKind::Keyword(Keyword::Elif) => {
                let (cond, closing) = self.condition(1, "elif", "1");
                Statement::Elif { cond, closing }
            }
            TokenKind::Keyword(Keyword::Else) => {
                if self.is_keyword(1, Keyword::If) {
                    let (cond, closing) = self.condition(2, "else if", "1");
                    Statement::Elif { cond, closing }
                } else {
                    self.else_branch()
                }
            }
            TokenKind::Keyword(Keyword::While) => {
                let (cond, closing) = self.condition(1, "while", "0");
                Statement::While { cond, closing }
            }
            TokenKind::Keyword(Keyword::For) => self.for_loop(),
            TokenKind::Keyword(Keyword::Func) => self.func(),
            _ => Statement::Raw(self.src),
        }
    }

    fn declaration(&mut self, is_const: bool) -> Statement<'a> {
        let mut i = usize::from(is_const);
        let mut statement = "const";
        let ty = match self.tokens.get(i).map(|t| t.kind) {
            Some(TokenKind::Keyword(Keyword::Type(ty))) => {
                i += 1;
                statement = ty.as_str();
                Some(ty)
            }
            _ => None,
        };

        let name = match self.tokens.get(i) {
            Some(t) if t.kind == TokenKind::Ident => {
                i += 1;
                Some(t.text(self.src))
            }
            _ => {
                self.error(SyntaxError::MissingOperand {
                    what: "variable name",
                    statement,
                });
                None
            }
        };

        let value = if i >= self.tokens.len() {
            if is_const && name.is_some() {
                self.error(SyntaxError::MissingOperand {
                    what: "value",
                    statement,
                });
            }
            None
        } else if self.is_punct(i, '=') {
            let value = self.slice(i + 1, self.tokens.len());
            if value.is_empty() {
                self.error(SyntaxError::MissingOperand {
                    what: "value",
                    statement,
                });
                None
            } else {
                Some(value)
            }
        } else {
            self.error(SyntaxError::MissingToken {
                token: "=",
                statement,
            });
            None
        };

        Statement::Declare(Declaration {
            is_const,
            ty,
            name,
            value,
        })
    }

    fn print(&mut self) -> Statement<'a> {
        let (from, to) = self.call_arguments("print");
        let expr = self.slice(from, to);
        if expr.is_empty() {
            self.error(SyntaxError::MissingOperand {
                what: "value",
                statement: "print",
            });
            return Statement::Print { expr: None };
        }
        Statement::Print { expr: Some(expr) }
    }

    fn append(&mut self) -> Statement<'a> {
        let args = self.arguments("append", 2);
        match args.as_slice() {
            &[list, value] => Statement::Append { list, value },
            _ => Statement::Invalid,
        }
    }

    fn dict(&mut self, op: DictOp) -> Statement<'a> {
        let args = self.arguments(op.name(), op.arity());
        if args.is_empty() {
            return Statement::Invalid;
        }
        Statement::Dict { op, args }
    }

    /// Arguments of an intrinsic call, or nothing if the count is wrong.
    fn arguments(&mut self, name: &'static str, expected: usize) -> Vec<&'a str> {
        let (from, to) = self.call_arguments(name);
        let args = split_top_level(self.slice(from, to), ',');
        if args.len() != expected {
            self.error(SyntaxError::Arity {
                name,
                expected,
                got: args.len(),
            });
            return Vec::new();
        }
        if args.iter().any(|a| a.is_empty()) {
            self.error(SyntaxError::MissingOperand {
                what: "argument",
                statement: name,
            });
            return Vec::new();
        }
        args
    }

    /// Token range between the `(` at index 1 and its matching `)`.
    fn call_arguments(&mut self, statement: &'static str) -> (usize, usize) {
        let mut depth = 0i32;
        for i in 1..self.tokens.len() {
            match self.tokens[i].kind {
                TokenKind::Punct('(' | '[' | '{') => depth += 1,
                TokenKind::Punct(')' | ']' | '}') => {
                    depth -= 1;
                    if depth == 0 {
                        if i + 1 < self.tokens.len() {
                            let rest = self.slice(i + 1, self.tokens.len());
                            self.error(SyntaxError::Unexpected(rest.to_string()));
                        }
                        return (2, i);
                    }
                }
                _ => {}
            }
        }
        self.error(SyntaxError::MissingToken {
            token: ")",
            statement,
        });
        (2, self.tokens.len())
    }

    fn condition(
        &mut self,
        from: usize,
        statement: &'static str,
        fallback: &'static str,
    ) -> (&'a str, Closing) {
        let (end, closing) = self.header(from, statement);
        let cond = self.slice(from, end);
        if cond.is_empty() {
            self.error(SyntaxError::MissingOperand {
                what: "condition",
                statement,
            });
            return (fallback, closing);
        }
        (cond, closing)
    }

    fn else_branch(&mut self) -> Statement<'a> {
        let len = self.tokens.len();
        let (end, closing) = if self.is_punct(len - 1, '{') {
            (len - 1, Closing::Brace)
        } else if self.is_punct(len - 1, ':') {
            (len - 1, Closing::Indent)
        } else {
            (len, Closing::Indent)
        };
        if end > 1 {
            let extra = self.slice(1, end);
            self.error(SyntaxError::Unexpected(extra.to_string()));
        }
        Statement::Else { closing }
    }

    fn for_loop(&mut self) -> Statement<'a> {
        let (end, closing) = self.header(1, "for");

        let src = self.src;
        if let Some(in_at) = self.find(1, end, |t| is_word(t, src, "in")) {
            let var = self.loop_variable(1, in_at);
            let mut iterable = self.slice(in_at + 1, end);
            if iterable.is_empty() {
                self.error(SyntaxError::MissingOperand {
                    what: "iterable",
                    statement: "for",
                });
                iterable = "\"\"";
            }
            return Statement::ForIn {
                var,
                iterable,
                closing,
            };
        }

        let eq = self.find(1, end, |t| t.is_punct('='));
        let to = self.find(eq.map_or(1, |e| e + 1), end, |t| is_word(t, src, "to"));
        let var = self.loop_variable(1, eq.or(to).unwrap_or(end));

        let start = match eq {
            Some(eq) => {
                let start = self.slice(eq + 1, to.unwrap_or(end));
                if start.is_empty() {
                    self.error(SyntaxError::MissingOperand {
                        what: "start value",
                        statement: "for",
                    });
                    "0"
                } else {
                    start
                }
            }
            None => {
                self.error(SyntaxError::MissingToken {
                    token: "=",
                    statement: "for",
                });
                "0"
            }
        };

        let (bound, step) = match to {
            Some(to) => self.range_end(to + 1, end),
            None => {
                self.error(SyntaxError::MissingToken {
                    token: "to",
                    statement: "for",
                });
                ("", None)
            }
        };
        let bound = if bound.is_empty() && to.is_some() {
            self.error(SyntaxError::MissingOperand {
                what: "end value",
                statement: "for",
            });
            "0"
        } else if bound.is_empty() {
            "0"
        } else {
            bound
        };
        let step = match step {
            Some("") => {
                self.error(SyntaxError::MissingOperand {
                    what: "step",
                    statement: "for",
                });
                "1"
            }
            Some(step) => step,
            None => "1",
        };

        Statement::ForRange {
            var,
            start,
            end: bound,
            step,
            closing,
        }
    }

    /// Split `END(STEP)` off a for-range bound. A group directly after an
    /// identifier is a call and stays part of the bound unless whitespace
    /// separates the two.
    fn range_end(&self, from: usize, to: usize) -> (&'a str, Option<&'a str>) {
        if to > from + 1 && self.is_punct(to - 1, ')') {
            let mut depth = 0i32;
            for i in (from..to).rev() {
                match self.tokens[i].kind {
                    TokenKind::Punct(')') => depth += 1,
                    TokenKind::Punct('(') => {
                        depth -= 1;
                        if depth == 0 {
                            let before = self.tokens[i - 1];
                            let call = before.kind == TokenKind::Ident
                                && before.end == self.tokens[i].start;
                            if i > from && !call {
                                return (self.slice(from, i), Some(self.slice(i + 1, to - 1)));
                            }
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
        (self.slice(from, to), None)
    }

    fn loop_variable(&mut self, from: usize, to: usize) -> &'a str {
        let var = self.slice(from, to);
        if var.is_empty() {
            self.error(SyntaxError::MissingOperand {
                what: "loop variable",
                statement: "for",
            });
            return "_i";
        }
        if !is_identifier(var) {
            self.error(SyntaxError::InvalidName(var.to_string()));
            return "_i";
        }
        var
    }

    fn func(&mut self) -> Statement<'a> {
        let (mut end, closing) = self.header(1, "func");
        if end >= 3 && self.is_punct(end - 2, '(') && self.is_punct(end - 1, ')') {
            end -= 2;
        }
        let name = self.slice(1, end);
        let name = if name.is_empty() {
            self.error(SyntaxError::MissingOperand {
                what: "function name",
                statement: "func",
            });
            None
        } else if !is_identifier(name) {
            self.error(SyntaxError::InvalidName(name.to_string()));
            None
        } else {
            Some(name)
        };
        Statement::Func { name, closing }
    }

    /// Find the header terminator. A missing `:` is reported and the
    /// block is treated as indent-delimited.
    fn header(&mut self, from: usize, statement: &'static str) -> (usize, Closing) {
        let len = self.tokens.len();
        if len > from && self.is_punct(len - 1, '{') {
            (len - 1, Closing::Brace)
        } else if len > from && self.is_punct(len - 1, ':') {
            (len - 1, Closing::Indent)
        } else {
            self.error(SyntaxError::MissingToken {
                token: ":",
                statement,
            });
            (len, Closing::Indent)
        }
    }

    /// First token in `from..to` outside brackets that matches `pred`.
    fn find(&self, from: usize, to: usize, pred: impl Fn(&Token) -> bool) -> Option<usize> {
        let mut depth = 0i32;
        for i in from..to {
            let token = &self.tokens[i];
            if depth == 0 && pred(token) {
                return Some(i);
            }
            match token.kind {
                TokenKind::Punct('(' | '[' | '{') => depth += 1,
                TokenKind::Punct(')' | ']' | '}') => depth -= 1,
                _ => {}
            }
        }
        None
    }

    /// Source text covered by tokens `from..to`, trimmed.
    fn slice(&self, from: usize, to: usize) -> &'a str {
        if from >= to || to > self.tokens.len() {
            return "";
        }
        self.src[self.tokens[from].start..self.tokens[to - 1].end].trim()
    }

    fn is_punct(&self, i: usize, c: char) -> bool {
        self.tokens.get(i).is_some_and(|t| t.is_punct(c))
    }

    fn is_keyword(&self, i: usize, kw: Keyword) -> bool {
        self.tokens.get(i).is_some_and(|t| t.is_keyword(kw))
    }

    /// Whether token `i` is followed by whitespace or the end of the line.
    fn spaced_after(&self, i: usize) -> bool {
        match self.tokens.get(i + 1) {
            Some(next) => next.start > self.tokens[i].end,
            None => true,
        }
    }

    fn error(&mut self, error: SyntaxError) {
        self.errors.push(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement(text: &str) -> Statement<'_> {
        let parsed = parse_line(text);
        assert!(parsed.errors.is_empty(), "{}: {:?}", text, parsed.errors);
        parsed.statement
    }

    #[test]
    fn test_declarations() {
        assert_eq!(
            statement("int x = 5"),
            Statement::Declare(Declaration {
                is_const: false,
                ty: Some(Type::Int),
                name: Some("x"),
                value: Some("5"),
            })
        );
        assert_eq!(
            statement("const float PI = 3.14"),
            Statement::Declare(Declaration {
                is_const: true,
                ty: Some(Type::Float),
                name: Some("PI"),
                value: Some("3.14"),
            })
        );
        assert_eq!(
            statement("const N = 10"),
            Statement::Declare(Declaration {
                is_const: true,
                ty: None,
                name: Some("N"),
                value: Some("10"),
            })
        );
        assert_eq!(
            statement("list xs"),
            Statement::Declare(Declaration {
                is_const: false,
                ty: Some(Type::List),
                name: Some("xs"),
                value: None,
            })
        );
    }

    #[test]
    fn test_type_keyword_needs_whitespace() {
        assert_eq!(statement("int(x);"), Statement::Raw("int(x);"));
        assert_eq!(statement("integer = 3"), Statement::Raw("integer = 3"));
    }

    #[test]
    fn test_declaration_errors() {
        let parsed = parse_line("int = 5");
        assert_eq!(
            parsed.errors,
            vec![SyntaxError::MissingOperand {
                what: "variable name",
                statement: "int",
            }]
        );
        let parsed = parse_line("int x 5");
        assert_eq!(
            parsed.errors,
            vec![SyntaxError::MissingToken {
                token: "=",
                statement: "int",
            }]
        );
    }

    #[test]
    fn test_print_keeps_expression_verbatim() {
        assert_eq!(
            statement("print(add(a, b) * 2)"),
            Statement::Print {
                expr: Some("add(a, b) * 2")
            }
        );
        assert_eq!(statement("printf(\"%d\", x);"), Statement::Raw("printf(\"%d\", x);"));
    }

    #[test]
    fn test_print_errors() {
        assert_eq!(parse_line("print()").statement, Statement::Print { expr: None });
        let parsed = parse_line("print(x");
        assert_eq!(parsed.statement, Statement::Print { expr: Some("x") });
        assert_eq!(parsed.errors.len(), 1);
    }

    #[test]
    fn test_headers() {
        assert_eq!(
            statement("if x > 0:"),
            Statement::If {
                cond: "x > 0",
                closing: Closing::Indent
            }
        );
        assert_eq!(
            statement("while i < 10 {"),
            Statement::While {
                cond: "i < 10",
                closing: Closing::Brace
            }
        );
        assert_eq!(
            statement("else if y:"),
            Statement::Elif {
                cond: "y",
                closing: Closing::Indent
            }
        );
        assert_eq!(
            statement("else"),
            Statement::Else {
                closing: Closing::Indent
            }
        );
        assert!(statement("elif z {").is_continuation());
    }

    #[test]
    fn test_keywords_are_whole_words() {
        assert_eq!(statement("iffy = 1;"), Statement::Raw("iffy = 1;"));
        assert_eq!(statement("format(x);"), Statement::Raw("format(x);"));
    }

    #[test]
    fn test_missing_colon_and_condition() {
        let parsed = parse_line("if x > 0");
        assert_eq!(
            parsed.statement,
            Statement::If {
                cond: "x > 0",
                closing: Closing::Indent
            }
        );
        assert_eq!(
            parsed.errors,
            vec![SyntaxError::MissingToken {
                token: ":",
                statement: "if",
            }]
        );

        let parsed = parse_line("while:");
        assert_eq!(
            parsed.statement,
            Statement::While {
                cond: "0",
                closing: Closing::Indent
            }
        );
        assert_eq!(parsed.errors.len(), 1);
    }

    #[test]
    fn test_for_range() {
        assert_eq!(
            statement("for i = 1 to 5:"),
            Statement::ForRange {
                var: "i",
                start: "1",
                end: "5",
                step: "1",
                closing: Closing::Indent
            }
        );
        assert_eq!(
            statement("for i = n to 0 (-2) {"),
            Statement::ForRange {
                var: "i",
                start: "n",
                end: "0",
                step: "-2",
                closing: Closing::Brace
            }
        );
        // A call in the bound is not a step.
        assert_eq!(
            statement("for i = 0 to len(xs):"),
            Statement::ForRange {
                var: "i",
                start: "0",
                end: "len(xs)",
                step: "1",
                closing: Closing::Indent
            }
        );
        // A literal cannot be called, so the group is a step.
        assert_eq!(
            statement("for i = 1 to 10(2):"),
            Statement::ForRange {
                var: "i",
                start: "1",
                end: "10",
                step: "2",
                closing: Closing::Indent
            }
        );
        assert_eq!(
            statement("for i = 0 to (n - 1)(3):"),
            Statement::ForRange {
                var: "i",
                start: "0",
                end: "(n - 1)",
                step: "3",
                closing: Closing::Indent
            }
        );
    }

    #[test]
    fn test_contextual_words_are_names() {
        assert_eq!(
            statement("int end = 3"),
            Statement::Declare(Declaration {
                is_const: false,
                ty: Some(Type::Int),
                name: Some("end"),
                value: Some("3"),
            })
        );
        assert_eq!(
            statement("int to = 1"),
            Statement::Declare(Declaration {
                is_const: false,
                ty: Some(Type::Int),
                name: Some("to"),
                value: Some("1"),
            })
        );
        assert_eq!(
            statement("for i = n to end:"),
            Statement::ForRange {
                var: "i",
                start: "n",
                end: "end",
                step: "1",
                closing: Closing::Indent
            }
        );
    }

    #[test]
    fn test_for_range_fallbacks() {
        let parsed = parse_line("for = 1 to:");
        assert_eq!(
            parsed.statement,
            Statement::ForRange {
                var: "_i",
                start: "1",
                end: "0",
                step: "1",
                closing: Closing::Indent
            }
        );
        assert_eq!(parsed.errors.len(), 2);
    }

    #[test]
    fn test_for_in() {
        assert_eq!(
            statement("for c in \"ab\":"),
            Statement::ForIn {
                var: "c",
                iterable: "\"ab\"",
                closing: Closing::Indent
            }
        );
        assert_eq!(
            statement("for x in [1, 2] {"),
            Statement::ForIn {
                var: "x",
                iterable: "[1, 2]",
                closing: Closing::Brace
            }
        );
    }

    #[test]
    fn test_func() {
        assert_eq!(
            statement("func greet:"),
            Statement::Func {
                name: Some("greet"),
                closing: Closing::Indent
            }
        );
        assert_eq!(
            statement("func greet() {"),
            Statement::Func {
                name: Some("greet"),
                closing: Closing::Brace
            }
        );
        let parsed = parse_line("func a b:");
        assert_eq!(
            parsed.statement,
            Statement::Func {
                name: None,
                closing: Closing::Indent
            }
        );
        assert_eq!(parsed.errors, vec![SyntaxError::InvalidName("a b".into())]);
    }

    #[test]
    fn test_intrinsics() {
        assert_eq!(
            statement("append(xs, f(1, 2))"),
            Statement::Append {
                list: "xs",
                value: "f(1, 2)"
            }
        );
        assert_eq!(
            statement("dset(d, \"a,b\", 1)"),
            Statement::Dict {
                op: DictOp::Set,
                args: vec!["d", "\"a,b\"", "1"]
            }
        );
        let parsed = parse_line("dget(d)");
        assert_eq!(parsed.statement, Statement::Invalid);
        assert_eq!(
            parsed.errors,
            vec![SyntaxError::Arity {
                name: "dget",
                expected: 2,
                got: 1
            }]
        );
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(split_top_level("1, (2, 3), \"a,b\"", ','), vec!["1", "(2, 3)", "\"a,b\""]);
        assert_eq!(split_top_level("\"k\": [1, 2]", ':'), vec!["\"k\"", "[1, 2]"]);
        assert!(split_top_level("  ", ',').is_empty());
        assert_eq!(split_top_level("1,", ','), vec!["1", ""]);
    }
}
