//! The Parser drives the Scanner over a Hack source file and encodes each
//! instruction as soon as it is recognized. Symbols are resolved in the
//! same pass; see the `symbols` module for how forward references are
//! patched.
use std::convert::TryFrom;
use std::io::Read;
use super::ast::*;
use super::error::{AssemblerError, Field, Position, Result};
use super::scanner::{self, Scanner, TokenKind, CLOSE_PAREN};
use super::symbols::SymbolTable;

/// The result of a successful run.
pub struct Program {
    pub instructions: Vec<Instruction>,
    /// Source text of each instruction, index for index.
    pub listing: Vec<String>,
    pub symbols: SymbolTable,
}

pub struct Parser<R: Read> {
    scanner: Scanner<R>,
    program: Vec<Instruction>,
    listing: Vec<String>,
    symbols: SymbolTable,
    pc: u16,
}

impl<R: Read> Parser<R> {
    pub fn new(reader: R) -> Result<Self> {
        Ok(Parser {
            scanner: Scanner::new(reader)?,
            program: Vec::with_capacity(256),
            listing: Vec::with_capacity(256),
            symbols: SymbolTable::new(),
            pc: 0,
        })
    }

    /// Run the parser, consuming itself and returning the assembled program.
    pub fn run(mut self) -> Result<Program> {
        'mainloop: loop {
            self.scanner.skip_whitespace()?;

            match self.scanner.kind() {
                TokenKind::End => break 'mainloop,
                TokenKind::Comment => self.scanner.skip_comment()?,
                TokenKind::Label => self.label()?,
                TokenKind::Address => {
                    let ins = self.address()?;
                    self.program.push(ins);
                },
                TokenKind::Compute => {
                    let ins = self.compute()?;
                    self.program.push(ins);
                },
            }

            // Recognizers stop on the delimiter that ended their token.
            self.scanner.advance()?;
        }

        self.symbols.allocate_variables(&mut self.program)?;
        info!("assembled {} instruction(s)", self.program.len());

        Ok(Program {
            instructions: self.program,
            listing: self.listing,
            symbols: self.symbols,
        })
    }

    /// Parses `@value`. Decimal literals, optionally signed with `+`, are
    /// encoded directly; anything else is a symbol and may be patched later.
    fn address(&mut self) -> Result<Instruction> {
        let position = self.scanner.position();
        self.count_instruction(position)?;
        // Skip the @.
        self.scanner.advance()?;

        let token = self.scanner.word()?;
        if token.is_empty() {
            return Err(if self.scanner.at_end() {
                AssemblerError::UnexpectedEof { expected: "an address after `@`", position }
            } else {
                AssemblerError::EmptyToken { position }
            });
        }
        self.listing.push(format!("@{}", token));

        let digits = token.strip_prefix('+').unwrap_or(token.as_str());
        if !digits.is_empty() && digits.bytes().all(scanner::is_digit) {
            let value = match digits.parse::<u32>() {
                Ok(v) if v <= MAX_ADDRESS as u32 => v as u16,
                _ => return Err(AssemblerError::LiteralOutOfRange { literal: token, position }),
            };
            self.symbols.define_literal(&token, value);
            return Ok(Instruction::address(value));
        }

        let index = self.program.len();
        Ok(Instruction::address(self.symbols.reference(&token, index)))
    }

    /// Parses `dest=comp;jump` one character at a time.
    fn compute(&mut self) -> Result<Instruction> {
        let position = self.scanner.position();
        self.count_instruction(position)?;

        let mut dest = None;
        let mut comp = None;
        let mut seen_eq = false;
        let mut sb = String::new();
        let mut text = String::new();

        while let Some(ch) = self.scanner.current() {
            if scanner::is_whitespace(ch) {
                break;
            }
            text.push(ch as char);
            match ch {
                b'=' if !seen_eq && comp.is_none() => {
                    dest = Some(lookup::<Dest>(Field::Dest, &sb, position)?);
                    seen_eq = true;
                    sb.clear();
                },
                b';' if comp.is_none() => {
                    comp = Some(lookup::<Comp>(Field::Comp, &sb, position)?);
                    sb.clear();
                },
                b'=' | b';' => {
                    return Err(AssemblerError::UnexpectedCharacter {
                        ch: ch as char,
                        position: self.scanner.position(),
                    });
                },
                _ => sb.push(ch as char),
            }
            self.scanner.advance()?;
        }

        // Whatever is left closes the comparison, or the jump if `;` was seen.
        let ins = match comp {
            None => Instruction::compute(dest, lookup(Field::Comp, &sb, position)?, None),
            Some(comp) => Instruction::compute(dest, comp, Some(lookup(Field::Jump, &sb, position)?)),
        };
        self.listing.push(text);
        Ok(ins)
    }

    /// Parses `(NAME)` and binds NAME to the current program counter.
    fn label(&mut self) -> Result<()> {
        let position = self.scanner.position();
        // Skip the (.
        self.scanner.advance()?;

        let mut sb = String::new();
        loop {
            match self.scanner.current() {
                Some(CLOSE_PAREN) => break,
                Some(ch) => sb.push(ch as char),
                None => return Err(AssemblerError::UnexpectedEof {
                    expected: "`)` to close the label",
                    position: self.scanner.position(),
                }),
            }
            self.scanner.advance()?;
        }

        let valid = match sb.as_bytes().first() {
            Some(&first) => scanner::is_symbol_start(first) && !sb.bytes().any(scanner::is_whitespace),
            None => false,
        };
        if !valid {
            return Err(AssemblerError::InvalidLabel { label: sb, position });
        }

        self.symbols.declare_label(&sb, self.pc, position, &mut self.program)
    }

    fn count_instruction(&mut self, position: Position) -> Result<()> {
        self.pc = self.pc.checked_add(1)
            .filter(|pc| *pc <= MAX_ADDRESS + 1)
            .ok_or(AssemblerError::ProgramTooLarge { position })?;
        Ok(())
    }
}

fn lookup<'a, T>(field: Field, mnemonic: &'a str, position: Position) -> Result<T>
where
    T: TryFrom<&'a str, Error = String>,
{
    T::try_from(mnemonic).map_err(|mnemonic| AssemblerError::InvalidMnemonic { field, mnemonic, position })
}
