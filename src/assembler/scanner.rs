//! The scanner presents Hack source as a pull cursor over raw bytes
//! with a single character of lookahead.
use std::io::{BufReader, Bytes, Read};
use super::error::{Position, Result};

/// Begins an address instruction, e.g. `@17`.
pub const AT_SIGN: u8 = b'@';
/// Begins a label declaration, e.g. `(LOOP)`.
pub const OPEN_PAREN: u8 = b'(';
/// Ends a label declaration.
pub const CLOSE_PAREN: u8 = b')';
/// Begins a comment running to the end of the line.
pub const COMMENT_START: u8 = b'/';

/// What the current character says about the token that starts there.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TokenKind {
    End,
    Comment,
    Label,
    Address,
    Compute,
}

pub struct Scanner<R: Read> {
    source: Bytes<BufReader<R>>,
    // None once the input is exhausted.
    current: Option<u8>,
    line: usize,
    column: usize,
}

impl<R: Read> Scanner<R> {
    /// Creates a scanner and loads the first character.
    pub fn new(reader: R) -> Result<Self> {
        let mut scanner = Scanner {
            source: BufReader::new(reader).bytes(),
            current: None,
            line: 1,
            column: 0,
        };
        scanner.advance()?;
        Ok(scanner)
    }

    /// Reads the next byte into the current slot. Running past the end
    /// of input is not an error; the slot just stays empty.
    pub fn advance(&mut self) -> Result<()> {
        if self.current == Some(b'\n') {
            self.line += 1;
            self.column = 0;
        }
        self.current = self.source.next().transpose()?;
        if self.current.is_some() {
            self.column += 1;
        }
        Ok(())
    }

    #[inline]
    pub fn current(&self) -> Option<u8> {
        self.current
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.current.is_none()
    }

    /// Position of the current character. At end of input this points
    /// just past the last character read.
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    pub fn kind(&self) -> TokenKind {
        match self.current {
            None => TokenKind::End,
            Some(COMMENT_START) => TokenKind::Comment,
            Some(OPEN_PAREN) => TokenKind::Label,
            Some(AT_SIGN) => TokenKind::Address,
            Some(_) => TokenKind::Compute,
        }
    }

    pub fn skip_whitespace(&mut self) -> Result<()> {
        while self.current.map_or(false, is_whitespace) {
            self.advance()?;
        }
        Ok(())
    }

    /// Consumes a comment up to, but not including, the newline.
    pub fn skip_comment(&mut self) -> Result<()> {
        while let Some(ch) = self.current {
            if ch == b'\n' {
                break;
            }
            self.advance()?;
        }
        Ok(())
    }

    /// Collects characters until whitespace or end of input, leaving the
    /// cursor on the delimiter.
    pub fn word(&mut self) -> Result<String> {
        let mut sb = String::new();
        while let Some(ch) = self.current {
            if is_whitespace(ch) {
                break;
            }
            sb.push(ch as char);
            self.advance()?;
        }
        Ok(sb)
    }
}

pub fn is_whitespace(ch: u8) -> bool {
    matches!(ch, b' ' | b'\t' | b'\r' | b'\n')
}

pub fn is_alpha(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

pub fn is_digit(ch: u8) -> bool {
    ch.is_ascii_digit()
}

/// Characters a user symbol may begin with.
pub fn is_symbol_start(ch: u8) -> bool {
    is_alpha(ch) || matches!(ch, b'.' | b'$' | b':')
}
