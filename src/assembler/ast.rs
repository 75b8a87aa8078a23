//! This module describes the Hack machine language.
//!
//! Every instruction is a single 16-bit word. There are two forms:
//!
//! ```text
//! @value          ; address instruction: 0vvv vvvv vvvv vvvv
//! dest=comp;jump  ; compute instruction: 111a cccc ccdd djjj
//! ```
//!
//! Either `dest=` or `;jump` may be left out of a compute instruction.
//! Labels are declared with `(NAME)` and take up no space in the program.
//!
//! Example source file:
//!
//! ```nasm
//! // Adds 2 and 3 and stores the result in RAM[0].
//! @2
//! D=A
//! @3
//! D=D+A
//! @0
//! M=D
//! (END)
//! @END
//! 0;JMP
//! ```

use std::convert::TryFrom;
use std::fmt;

/// Bits 15..13 of every compute instruction.
const COMPUTE_PREFIX: u16 = 0b111 << 13;
const COMP_OFFSET: u16 = 6;
const DEST_OFFSET: u16 = 3;

/// Largest value an address instruction can carry. The top bit of the
/// word is the opcode and must stay 0.
pub const MAX_ADDRESS: u16 = 0x7FFF;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Instruction(u16);

impl Instruction {
    pub fn address(value: u16) -> Self {
        Instruction(value & MAX_ADDRESS)
    }

    pub fn compute(dest: Option<Dest>, comp: Comp, jump: Option<Jump>) -> Self {
        let mut word = COMPUTE_PREFIX | (comp.to_u16() << COMP_OFFSET);
        if let Some(dest) = dest {
            word |= dest.to_u16() << DEST_OFFSET;
        }
        if let Some(jump) = jump {
            word |= jump.to_u16();
        }
        Instruction(word)
    }

    /// Returns the binary machine word for this instruction.
    pub fn assemble(&self) -> u16 {
        self.0
    }

    pub fn is_compute(&self) -> bool {
        self.0 & COMPUTE_PREFIX == COMPUTE_PREFIX
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:016b}", self.0)
    }
}

/// Where the result of a computation is stored.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Dest {
    M,
    D,
    MD,
    A,
    AM,
    AD,
    AMD,
}

impl TryFrom<&str> for Dest {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        use Dest::*;
        match value {
            "M"   => Ok(M),
            "D"   => Ok(D),
            "MD"  => Ok(MD),
            "A"   => Ok(A),
            "AM"  => Ok(AM),
            "AD"  => Ok(AD),
            "AMD" => Ok(AMD),
            _     => Err(value.to_owned()),
        }
    }
}

impl Dest {
    pub fn to_u16(&self) -> u16 {
        use Dest::*;
        match self {
            M   => 0b001,
            D   => 0b010,
            MD  => 0b011,
            A   => 0b100,
            AM  => 0b101,
            AD  => 0b110,
            AMD => 0b111,
        }
    }
}

/// Jump condition, tested against the ALU output.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Jump {
    JGT,
    JEQ,
    JGE,
    JLT,
    JNE,
    JLE,
    JMP,
}

impl TryFrom<&str> for Jump {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        use Jump::*;
        match value {
            "JGT" => Ok(JGT),
            "JEQ" => Ok(JEQ),
            "JGE" => Ok(JGE),
            "JLT" => Ok(JLT),
            "JNE" => Ok(JNE),
            "JLE" => Ok(JLE),
            "JMP" => Ok(JMP),
            _     => Err(value.to_owned()),
        }
    }
}

impl Jump {
    pub fn to_u16(&self) -> u16 {
        use Jump::*;
        match self {
            JGT => 0b001,
            JEQ => 0b010,
            JGE => 0b011,
            JLT => 0b100,
            JNE => 0b101,
            JLE => 0b110,
            JMP => 0b111,
        }
    }
}

/// ALU operation. Variants reading `M` set the `a` bit, the top bit of
/// the 7-bit field.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Comp {
    Zero,
    One,
    MinusOne,
    D,
    A,
    M,
    NotD,
    NotA,
    NotM,
    NegD,
    NegA,
    NegM,
    DPlusOne,
    APlusOne,
    MPlusOne,
    DMinusOne,
    AMinusOne,
    MMinusOne,
    DPlusA,
    DPlusM,
    DMinusA,
    DMinusM,
    AMinusD,
    MMinusD,
    DAndA,
    DAndM,
    DOrA,
    DOrM,
}

impl TryFrom<&str> for Comp {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        use Comp::*;
        match value {
            "0"   => Ok(Zero),
            "1"   => Ok(One),
            "-1"  => Ok(MinusOne),
            "D"   => Ok(D),
            "A"   => Ok(A),
            "M"   => Ok(M),
            "!D"  => Ok(NotD),
            "!A"  => Ok(NotA),
            "!M"  => Ok(NotM),
            "-D"  => Ok(NegD),
            "-A"  => Ok(NegA),
            "-M"  => Ok(NegM),
            "D+1" => Ok(DPlusOne),
            "A+1" => Ok(APlusOne),
            "M+1" => Ok(MPlusOne),
            "D-1" => Ok(DMinusOne),
            "A-1" => Ok(AMinusOne),
            "M-1" => Ok(MMinusOne),
            "D+A" => Ok(DPlusA),
            "D+M" => Ok(DPlusM),
            "D-A" => Ok(DMinusA),
            "D-M" => Ok(DMinusM),
            "A-D" => Ok(AMinusD),
            "M-D" => Ok(MMinusD),
            "D&A" => Ok(DAndA),
            "D&M" => Ok(DAndM),
            "D|A" => Ok(DOrA),
            "D|M" => Ok(DOrM),
            _     => Err(value.to_owned()),
        }
    }
}

impl Comp {
    /// Returns the `a c1..c6` bits of the operation.
    pub fn to_u16(&self) -> u16 {
        use Comp::*;
        match self {
            Zero      => 0b0101010,
            One       => 0b0111111,
            MinusOne  => 0b0111010,
            D         => 0b0001100,
            A         => 0b0110000,
            M         => 0b1110000,
            NotD      => 0b0001101,
            NotA      => 0b0110001,
            NotM      => 0b1110001,
            NegD      => 0b0001111,
            NegA      => 0b0110011,
            NegM      => 0b1110011,
            DPlusOne  => 0b0011111,
            APlusOne  => 0b0110111,
            MPlusOne  => 0b1110111,
            DMinusOne => 0b0001110,
            AMinusOne => 0b0110010,
            MMinusOne => 0b1110010,
            DPlusA    => 0b0000010,
            DPlusM    => 0b1000010,
            DMinusA   => 0b0010011,
            DMinusM   => 0b1010011,
            AMinusD   => 0b0000111,
            MMinusD   => 0b1000111,
            DAndA     => 0b0000000,
            DAndM     => 0b1000000,
            DOrA      => 0b0010101,
            DOrM      => 0b1010101,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMP_MNEMONICS: [&str; 28] = [
        "0", "1", "-1", "D", "A", "M", "!D", "!A", "!M", "-D", "-A", "-M",
        "D+1", "A+1", "M+1", "D-1", "A-1", "M-1", "D+A", "D+M", "D-A", "D-M",
        "A-D", "M-D", "D&A", "D&M", "D|A", "D|M",
    ];

    #[test]
    fn test_dest() {
        let names = ["M", "D", "MD", "A", "AM", "AD", "AMD"];
        for (i, name) in names.iter().enumerate() {
            assert_eq!(Dest::try_from(*name).unwrap().to_u16(), i as u16 + 1);
        }
        assert_eq!(Dest::try_from("DM"), Err("DM".to_owned()));
        assert!(Dest::try_from("").is_err());
        assert!(Dest::try_from("m").is_err());
    }

    #[test]
    fn test_jump() {
        let names = ["JGT", "JEQ", "JGE", "JLT", "JNE", "JLE", "JMP"];
        for (i, name) in names.iter().enumerate() {
            assert_eq!(Jump::try_from(*name).unwrap().to_u16(), i as u16 + 1);
        }
        assert_eq!(Jump::try_from("JUMP"), Err("JUMP".to_owned()));
        assert!(Jump::try_from("").is_err());
    }

    #[test]
    fn test_comp_is_distinct() {
        let mut codes: Vec<u16> = COMP_MNEMONICS.iter()
            .map(|m| Comp::try_from(*m).unwrap().to_u16())
            .collect();
        assert!(codes.iter().all(|c| *c < 0b1000_0000));
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 28);

        assert!(Comp::try_from("D+D").is_err());
        assert!(Comp::try_from("A+D").is_err());
        assert!(Comp::try_from("2").is_err());
    }

    #[test]
    fn test_comp_memory_bit() {
        // Swapping A for M changes only the `a` bit.
        for m in COMP_MNEMONICS.iter().filter(|m| m.contains('A')) {
            let a = Comp::try_from(*m).unwrap();
            let mem = Comp::try_from(m.replace('A', "M").as_str()).unwrap();
            assert_eq!(a.to_u16() & 0b1000000, 0);
            assert_eq!(a.to_u16() | 0b1000000, mem.to_u16());
        }
    }

    #[test]
    fn test_compute() {
        assert_eq!(Instruction::compute(Some(Dest::D), Comp::A, None).to_string(), "1110110000010000");
        assert_eq!(Instruction::compute(Some(Dest::D), Comp::DPlusA, None).to_string(), "1110000010010000");
        assert_eq!(Instruction::compute(Some(Dest::M), Comp::D, None).to_string(), "1110001100001000");
        assert_eq!(Instruction::compute(None, Comp::Zero, Some(Jump::JMP)).to_string(), "1110101010000111");
        assert_eq!(
            Instruction::compute(Some(Dest::AMD), Comp::DOrM, Some(Jump::JLE)).assemble(),
            0b111_1010101_111_110
        );
        assert!(Instruction::compute(None, Comp::DAndA, None).is_compute());
    }

    #[test]
    fn test_address() {
        for i in (0..=MAX_ADDRESS).step_by(97) {
            let ins = Instruction::address(i);
            assert_eq!(ins.assemble(), i);
            assert!(!ins.is_compute());
        }
        assert_eq!(Instruction::address(16384).to_string(), "0100000000000000");
        assert_eq!(Instruction::address(0).to_string(), "0000000000000000");
        assert_eq!(Instruction::default(), Instruction::address(0));
    }
}
