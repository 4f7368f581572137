//! Statement-level intermediate form for the C target.
//!
//! Each node carries operands that are already rewritten and resolved;
//! rendering to text happens in [`crate::output`]. Block structure is
//! flat: openers are followed by their body and a matching [`Node::Close`].

use crate::symbols::Type;

/// Initialiser of a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Init {
    /// Verbatim expression.
    Expr(String),
    /// The type's zero value, or no initialiser for scalars without one.
    Default,
    /// Elements of a list or tuple literal.
    Elements(Vec<String>),
    /// Key/value pairs of a dictionary literal.
    Entries(Vec<(String, String)>),
}

/// How a `print` renders its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintFormat {
    Str,
    Bool,
    Float,
    Int,
    List,
    Tuple,
    Dict,
}

impl PrintFormat {
    pub fn for_type(ty: Type) -> Self {
        match ty {
            Type::String => PrintFormat::Str,
            Type::Bool => PrintFormat::Bool,
            Type::Float => PrintFormat::Float,
            Type::List => PrintFormat::List,
            Type::Tuple => PrintFormat::Tuple,
            Type::Dict => PrintFormat::Dict,
            Type::Int | Type::Unknown => PrintFormat::Int,
        }
    }
}

/// What a desugared for-in loop walks over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iteration {
    /// Characters of a NUL-terminated string, bound as their codes.
    Chars,
    /// Elements of a list or tuple.
    Items,
    /// Keys of a dictionary.
    Keys,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Declare {
        ty: Type,
        name: String,
        init: Init,
        is_const: bool,
    },
    Print {
        format: PrintFormat,
        expr: String,
    },
    If {
        cond: String,
    },
    ElseIf {
        cond: String,
    },
    Else,
    While {
        cond: String,
    },
    /// Inclusive counted loop.
    ForRange {
        var: String,
        start: String,
        end: String,
        /// `None` means an increment of one.
        step: Option<String>,
        descending: bool,
    },
    /// Index loop over `source`, binding each element to `var`.
    ForEach {
        var: String,
        index: String,
        source: String,
        iteration: Iteration,
    },
    /// Bare `{` opening a helper scope.
    OpenScope,
    /// Runtime call used as a statement.
    Call {
        func: String,
        args: Vec<String>,
    },
    /// Statement copied through from the source.
    Raw(String),
    Close,
}

impl Node {
    /// Whether this node opens a C scope that a later `Close` ends.
    pub fn opens_scope(&self) -> bool {
        matches!(
            self,
            Node::If { .. }
                | Node::While { .. }
                | Node::ForRange { .. }
                | Node::ForEach { .. }
                | Node::OpenScope
        )
    }
}

/// A user function and its emitted body.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    /// Line of the `func` statement.
    pub line: usize,
    pub body: Vec<Node>,
}

/// A whole compilation unit: functions in declaration order, then the
/// statements of the program entry point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Unit {
    pub functions: Vec<Function>,
    pub main: Vec<Node>,
}
