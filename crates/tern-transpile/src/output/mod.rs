//! Output writers - emit IR as target source code.

pub mod c;

pub use c::CWriter;
