//! Line-oriented transpiler from the Tern scripting language to C.
//!
//! Tern is a small indentation-or-brace language: one statement per line,
//! seven value types, `if`/`while`/`for` blocks and parameterless
//! functions. `tern-transpile` translates it in a single pass into one
//! self-contained C translation unit.
//!
//! # Architecture
//!
//! ```text
//! Source            Parse                 Lower                 Write
//! ──────────    ──────────────    ───────────────────────    ──────────
//! significant → one Statement  →  symbols + block stack  →  prelude +
//! lines         per line           → Node streams            functions +
//! (source.rs)   (lex.rs,           (lower.rs, ir.rs)         main
//!               parse.rs)                                    (output/c.rs)
//! ```
//!
//! Problems never stop the pass. They accumulate as diagnostics, and the
//! caller decides from [`Transpiled::is_ok`] whether to write the result.
//!
//! # Example
//!
//! ```
//! use tern_transpile::{Options, transpile};
//!
//! let result = transpile("int x = 5\nprint(x)\n", &Options::default());
//! assert!(result.is_ok());
//! assert!(result.render().contains("printf(\"%d\\n\", (int)(x));"));
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod infer;
pub mod ir;
pub mod lex;
pub mod lower;
pub mod output;
pub mod parse;
pub mod rewrite;
pub mod runtime;
pub mod scope;
pub mod source;
pub mod symbols;

pub use config::{Limits, Mode, Options};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{CapacityError, ModeError, Resource, SyntaxError};
pub use infer::infer;
pub use lower::{Transpiled, transpile};
pub use output::CWriter;
pub use symbols::{SymbolTable, Type};
