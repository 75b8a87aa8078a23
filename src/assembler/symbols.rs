//! Symbol resolution with deferred patching.
//!
//! A symbol seen in an address instruction before it is known is recorded
//! as pending along with every program position that used it. Declaring a
//! label patches those positions at once. Whatever is still pending when
//! the source is exhausted is a variable and receives a data memory address
//! from 16 upwards, in the order the names were first seen.
use std::collections::HashMap;
use indexmap::IndexMap;
use super::ast::{Instruction, MAX_ADDRESS};
use super::error::{AssemblerError, Position, Result};

/// First data memory address handed out to variables.
pub const VARIABLE_BASE: u16 = 16;
/// Variables may not spill into memory-mapped IO.
pub const SCREEN: u16 = 16384;
const KBD: u16 = 24576;

const PREDEFINED: [(&str, u16); 23] = [
    ("R0", 0), ("R1", 1), ("R2", 2), ("R3", 3),
    ("R4", 4), ("R5", 5), ("R6", 6), ("R7", 7),
    ("R8", 8), ("R9", 9), ("R10", 10), ("R11", 11),
    ("R12", 12), ("R13", 13), ("R14", 14), ("R15", 15),
    ("SCREEN", SCREEN), ("KBD", KBD),
    ("SP", 0), ("LCL", 1), ("ARG", 2), ("THIS", 3), ("THAT", 4),
];

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Symbol {
    Predefined(u16),
    /// A decimal literal, stored under its own spelling.
    Literal(u16),
    Label(u16),
    Variable(u16),
    Pending,
}

impl Symbol {
    /// The resolved value, or None while still pending.
    pub fn value(&self) -> Option<u16> {
        use Symbol::*;
        match *self {
            Predefined(v) | Literal(v) | Label(v) | Variable(v) => Some(v),
            Pending => None,
        }
    }
}

pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
    // Keeps first-pending order for variable allocation.
    references: IndexMap<String, Vec<usize>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut symbols = HashMap::with_capacity(64);
        for (name, value) in PREDEFINED.iter() {
            symbols.insert(name.to_string(), Symbol::Predefined(*value));
        }
        SymbolTable { symbols, references: IndexMap::new() }
    }

    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.symbols.get(name).copied()
    }

    /// Names still waiting on a value, in the order they were first seen.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.references.keys().map(String::as_str)
    }

    pub fn define_literal(&mut self, spelling: &str, value: u16) {
        self.symbols.insert(spelling.to_owned(), Symbol::Literal(value));
    }

    /// Looks up `name` for the address instruction at `index`. Unknown or
    /// pending names record the index and yield the placeholder value 0.
    pub fn reference(&mut self, name: &str, index: usize) -> u16 {
        match self.symbols.get(name).copied() {
            Some(Symbol::Pending) => {
                if let Some(indices) = self.references.get_mut(name) {
                    indices.push(index);
                }
                0
            },
            Some(symbol) => symbol.value().unwrap_or(0),
            None => {
                trace!("`{}` is unresolved, deferring instruction {}", name, index);
                self.symbols.insert(name.to_owned(), Symbol::Pending);
                self.references.insert(name.to_owned(), vec![index]);
                0
            },
        }
    }

    /// Binds `name` to the program counter and patches every instruction
    /// that referenced it so far.
    pub fn declare_label(
        &mut self,
        name: &str,
        pc: u16,
        position: Position,
        program: &mut [Instruction],
    ) -> Result<()> {
        match self.symbols.get(name).copied() {
            Some(Symbol::Predefined(_)) => {
                return Err(AssemblerError::ReservedSymbol { symbol: name.to_owned(), position });
            },
            Some(Symbol::Label(_)) => {
                return Err(AssemblerError::DuplicateLabel { label: name.to_owned(), position });
            },
            _ => {},
        }
        // A label past the last instruction slot has no address to jump to.
        if pc > MAX_ADDRESS {
            return Err(AssemblerError::ProgramTooLarge { position });
        }

        self.symbols.insert(name.to_owned(), Symbol::Label(pc));
        if let Some(indices) = self.references.shift_remove(name) {
            debug!("label `{}` = {} patches {} earlier reference(s)", name, pc, indices.len());
            patch(program, &indices, pc);
        } else {
            debug!("label `{}` = {}", name, pc);
        }
        Ok(())
    }

    /// Gives every still-pending name a data memory address and patches its
    /// references. Called once after the whole source has been scanned.
    pub fn allocate_variables(&mut self, program: &mut [Instruction]) -> Result<()> {
        let mut next = VARIABLE_BASE;
        for (name, indices) in self.references.drain(..) {
            if next >= SCREEN {
                return Err(AssemblerError::OutOfDataMemory { symbol: name });
            }
            debug!("variable `{}` = {}", name, next);
            patch(program, &indices, next);
            self.symbols.insert(name, Symbol::Variable(next));
            next += 1;
        }
        Ok(())
    }

    /// User-visible symbols (labels and variables) sorted by value.
    pub fn resolved(&self) -> Vec<(&str, Symbol)> {
        let mut out: Vec<(&str, Symbol)> = self.symbols.iter()
            .filter(|(_, s)| matches!(s, Symbol::Label(_) | Symbol::Variable(_)))
            .map(|(n, s)| (n.as_str(), *s))
            .collect();
        out.sort_by_key(|(n, s)| (s.value(), *n));
        out
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

fn patch(program: &mut [Instruction], indices: &[usize], value: u16) {
    for &index in indices {
        program[index] = Instruction::address(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::new(1, 1)
    }

    #[test]
    fn test_predefined() {
        let table = SymbolTable::new();
        for i in 0..16 {
            assert_eq!(table.get(&format!("R{}", i)), Some(Symbol::Predefined(i)));
        }
        assert_eq!(table.get("SCREEN"), Some(Symbol::Predefined(16384)));
        assert_eq!(table.get("KBD"), Some(Symbol::Predefined(24576)));
        assert_eq!(table.get("SP"), Some(Symbol::Predefined(0)));
        assert_eq!(table.get("LCL"), Some(Symbol::Predefined(1)));
        assert_eq!(table.get("ARG"), Some(Symbol::Predefined(2)));
        assert_eq!(table.get("THIS"), Some(Symbol::Predefined(3)));
        assert_eq!(table.get("THAT"), Some(Symbol::Predefined(4)));
        assert_eq!(table.get("R16"), None);
        assert_eq!(table.pending().count(), 0);
    }

    #[test]
    fn test_reference_predefined() {
        let mut table = SymbolTable::new();
        assert_eq!(table.reference("SCREEN", 0), 16384);
        assert_eq!(table.reference("R7", 1), 7);
        assert_eq!(table.pending().count(), 0);
    }

    #[test]
    fn test_reference_pending() {
        let mut table = SymbolTable::new();
        assert_eq!(table.reference("b", 0), 0);
        assert_eq!(table.reference("a", 1), 0);
        assert_eq!(table.reference("b", 2), 0);
        assert_eq!(table.get("a"), Some(Symbol::Pending));
        assert_eq!(table.pending().collect::<Vec<_>>(), vec!["b", "a"]);

        let mut program = vec![Instruction::default(); 3];
        table.allocate_variables(&mut program).unwrap();
        let words: Vec<u16> = program.iter().map(Instruction::assemble).collect();
        assert_eq!(words, vec![16, 17, 16]);
    }

    #[test]
    fn test_declare_label_patches() {
        let mut table = SymbolTable::new();
        let mut program = vec![Instruction::default(); 4];
        table.reference("x", 0);
        table.reference("LOOP", 1);
        table.reference("LOOP", 3);

        table.declare_label("LOOP", 9, pos(), &mut program).unwrap();
        assert_eq!(program[1].assemble(), 9);
        assert_eq!(program[3].assemble(), 9);
        assert_eq!(program[0].assemble(), 0);
        assert_eq!(table.get("LOOP"), Some(Symbol::Label(9)));
        assert_eq!(table.pending().collect::<Vec<_>>(), vec!["x"]);

        // Later references resolve immediately and are not recorded.
        assert_eq!(table.reference("LOOP", 4), 9);
        assert_eq!(table.pending().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn test_declare_label_conflicts() {
        let mut table = SymbolTable::new();
        let mut program: Vec<Instruction> = Vec::new();
        table.declare_label("END", 0, pos(), &mut program).unwrap();
        assert!(matches!(
            table.declare_label("END", 3, pos(), &mut program),
            Err(AssemblerError::DuplicateLabel { .. })
        ));
        // The first declaration stands.
        assert_eq!(table.get("END"), Some(Symbol::Label(0)));

        assert!(matches!(
            table.declare_label("SCREEN", 3, pos(), &mut program),
            Err(AssemblerError::ReservedSymbol { .. })
        ));
        assert_eq!(table.get("SCREEN"), Some(Symbol::Predefined(16384)));
    }

    #[test]
    fn test_declare_label_past_end() {
        let mut table = SymbolTable::new();
        let mut program = vec![Instruction::default(); 1];
        table.reference("END", 0);
        assert!(matches!(
            table.declare_label("END", MAX_ADDRESS + 1, pos(), &mut program),
            Err(AssemblerError::ProgramTooLarge { .. })
        ));
        assert_eq!(table.get("END"), Some(Symbol::Pending));

        table.declare_label("END", MAX_ADDRESS, pos(), &mut program).unwrap();
        assert_eq!(program[0].assemble(), MAX_ADDRESS);
    }

    #[test]
    fn test_allocate_variables() {
        let mut table = SymbolTable::new();
        let mut program = vec![Instruction::default(); 5];
        table.reference("i", 0);
        table.reference("sum", 1);
        table.reference("i", 2);
        table.reference("gone", 3);
        table.reference("sum", 4);
        table.declare_label("gone", 5, pos(), &mut program).unwrap();

        table.allocate_variables(&mut program).unwrap();
        let words: Vec<u16> = program.iter().map(Instruction::assemble).collect();
        assert_eq!(words, vec![16, 17, 16, 5, 17]);
        assert_eq!(table.get("i"), Some(Symbol::Variable(16)));
        assert_eq!(table.get("sum"), Some(Symbol::Variable(17)));
        assert_eq!(table.pending().count(), 0);

        assert_eq!(
            table.resolved(),
            vec![("gone", Symbol::Label(5)), ("i", Symbol::Variable(16)), ("sum", Symbol::Variable(17))]
        );
    }

    #[test]
    fn test_allocate_out_of_memory() {
        let mut table = SymbolTable::new();
        let count = (SCREEN - VARIABLE_BASE) as usize + 1;
        let mut program = vec![Instruction::default(); count];
        for i in 0..count {
            table.reference(&format!("v{}", i), i);
        }
        match table.allocate_variables(&mut program) {
            Err(AssemblerError::OutOfDataMemory { symbol }) => assert_eq!(symbol, format!("v{}", count - 1)),
            _ => panic!("expected OutOfDataMemory"),
        }
    }
}
