//! Runtime prelude prepended to every generated translation unit.
//!
//! Provides the container types (`List`, `Tuple`, `Dict`) and the helpers
//! generated code calls: `list_new`, `list_of`, `append`, `len`, `slice`,
//! `tuple_new`, `tuple_of`, `dict_new`, `dset`, `dget` and one printer per
//! container. Clock calls are rewritten to `<time.h>` functions, which the
//! prelude includes.

pub const PRELUDE: &str = include_str!("runtime/prelude.c");
