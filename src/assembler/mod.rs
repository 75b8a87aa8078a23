//! The Assembler module is in charge of taking a
//! Hack source file and producing a Vec<Instruction>.
//!
//! It does this in a single pass: a byte-level scanner
//! feeds a parser that encodes each instruction as soon
//! as it is seen and backpatches forward references.

pub mod ast;
pub mod error;
pub mod parser;
pub mod scanner;
pub mod symbols;

use std::io::Read;

pub use self::error::Result;
pub use self::parser::Program;

/// Assembles everything `reader` yields. State is local to the call.
pub fn assemble<R: Read>(reader: R) -> Result<Program> {
    parser::Parser::new(reader)?.run()
}
