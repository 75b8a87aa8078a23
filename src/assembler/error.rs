//! Errors raised while assembling a Hack source file.
use std::fmt;
use thiserror::Error;

/// A 1-based line and column in the source text.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The three bit fields of a compute instruction.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Field {
    Dest,
    Comp,
    Jump,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Field::Dest => write!(f, "destination"),
            Field::Comp => write!(f, "comparison"),
            Field::Jump => write!(f, "jump"),
        }
    }
}

#[derive(Error, Debug)]
pub enum AssemblerError {
    #[error("invalid {field} mnemonic `{mnemonic}` at {position}")]
    InvalidMnemonic {
        field: Field,
        mnemonic: String,
        position: Position,
    },

    #[error("unexpected end of input at {position}: expected {expected}")]
    UnexpectedEof {
        expected: &'static str,
        position: Position,
    },

    #[error("unexpected character `{ch}` at {position}")]
    UnexpectedCharacter { ch: char, position: Position },

    #[error("address instruction without a value at {position}")]
    EmptyToken { position: Position },

    #[error("invalid label `{label}` at {position}")]
    InvalidLabel { label: String, position: Position },

    #[error("label `{label}` at {position} is already declared")]
    DuplicateLabel { label: String, position: Position },

    #[error("`{symbol}` at {position} is a predefined symbol and cannot be declared as a label")]
    ReservedSymbol { symbol: String, position: Position },

    #[error("literal `{literal}` at {position} does not fit in 15 bits (max 32767)")]
    LiteralOutOfRange { literal: String, position: Position },

    #[error("program exceeds 32768 instructions at {position}")]
    ProgramTooLarge { position: Position },

    #[error("no data memory left for variable `{symbol}`")]
    OutOfDataMemory { symbol: String },

    #[error("unable to read source: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AssemblerError>;
