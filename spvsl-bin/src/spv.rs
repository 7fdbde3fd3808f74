//! SPIR-V binary framing: instruction words, literal strings, the module
//! header and a decoder for inspecting emitted modules.

use std::fmt;

pub use spirv::Op;

use crate::{Error, Result};

/// SPIR-V 1.0
pub const VERSION: u32 = 0x0001_0000;

/// Unregistered vendor, tool version 1.
pub const GENERATOR_MAGIC: u32 = 1;

/// Sections of a module, in the order they are concatenated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
pub enum Section {
    /// Capabilities, extended instruction imports, memory model, entry
    /// points and execution modes.
    Header,
    Debug,
    Decorate,
    /// Types, constants and module-scope variables.
    Define,
    /// Function-scope variables. Must directly follow the first label.
    Declare,
    Code,
}

impl Section {
    pub const COUNT: usize = 6;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Appends one instruction: `(word_count << 16) | opcode` followed by its
/// operands.
pub fn push_instruction(out: &mut Vec<u32>, op: Op, operands: &[u32]) {
    let word_count = operands.len() + 1;
    assert!(word_count <= u16::MAX as usize, "instruction too long");

    out.push(((word_count as u32) << 16) | op as u32);
    out.extend_from_slice(operands);
}

/// Encodes a literal string: UTF-8, nul-terminated, zero-padded to a whole
/// number of little-endian words.
pub fn encode_string(s: &str) -> Vec<u32> {
    let bytes = s.as_bytes();
    let mut words = Vec::with_capacity(bytes.len() / 4 + 1);
    for chunk in bytes.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        words.push(u32::from_le_bytes(word));
    }
    if bytes.len() % 4 == 0 {
        words.push(0);
    }
    words
}

pub fn decode_string(words: &[u32]) -> Option<String> {
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    let end = bytes.iter().position(|b| *b == 0)?;
    String::from_utf8(bytes[..end].to_vec()).ok()
}

/// The five header words of a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleHeader {
    pub version: u32,
    pub generator: u32,
    /// Every id in the module is less than this.
    pub bound: u32,
}

impl ModuleHeader {
    pub fn new(bound: u32) -> Self {
        ModuleHeader {
            version: VERSION,
            generator: GENERATOR_MAGIC,
            bound,
        }
    }

    pub fn to_words(&self) -> [u32; 5] {
        [
            spirv::MAGIC_NUMBER,
            self.version,
            self.generator,
            self.bound,
            0,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub op: Op,
    pub operands: Vec<u32>,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Op{:?}", self.op)?;
        for operand in &self.operands {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}

/// Splits a stream of words into instructions, checking that every word
/// count stays within the stream.
pub fn decode_instructions(mut words: &[u32]) -> Result<Vec<Instruction>> {
    let mut res = Vec::new();
    while let Some(first) = words.first() {
        let word_count = (first >> 16) as usize;
        let opcode = first & 0xffff;

        if word_count == 0 || word_count > words.len() {
            return Err(Error::InvalidModule {
                problem: format!(
                    "word count {word_count} of instruction {} is out of bounds",
                    res.len()
                ),
            });
        }
        let op = Op::from_u32(opcode).ok_or_else(|| Error::InvalidModule {
            problem: format!("unknown opcode {opcode}"),
        })?;

        res.push(Instruction {
            op,
            operands: words[1..word_count].to_vec(),
        });
        words = &words[word_count..];
    }
    Ok(res)
}

/// Decodes a whole module: header and instructions.
pub fn decode_module(words: &[u32]) -> Result<(ModuleHeader, Vec<Instruction>)> {
    let [magic, version, generator, bound, schema] = match words.get(..5) {
        Some(&[a, b, c, d, e]) => [a, b, c, d, e],
        _ => {
            return Err(Error::InvalidModule {
                problem: "module is shorter than its header".into(),
            })
        }
    };
    if magic != spirv::MAGIC_NUMBER {
        return Err(Error::InvalidModule {
            problem: format!("bad magic number {magic:#010x}"),
        });
    }
    if schema != 0 {
        return Err(Error::InvalidModule {
            problem: format!("unknown schema {schema}"),
        });
    }

    let header = ModuleHeader {
        version,
        generator,
        bound,
    };
    Ok((header, decode_instructions(&words[5..])?))
}

pub fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}
