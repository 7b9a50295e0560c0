//! Output generation for the assembled corpus.
//!
//! One submodule per output format:
//!
//! - [`csv`]: writes the final row set as a delimited text file, one line
//!   per search result, with the fixed corpus column schema.

pub mod csv;
