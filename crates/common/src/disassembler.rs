//! Disassembler: turns a program image into a human-readable listing.
//!
//! Intcode does not separate code from data, so the listing is a linear
//! sweep from address 0. Words that do not decode, or instructions whose
//! operands run past the end of the image, are listed as `DATA`.

use crate::instruction::Instruction;
use crate::program::Program;

/// Disassemble a program into one line per instruction or data word.
///
/// Each line is `ADDR: TEXT` with the address right-aligned to four columns.
pub fn disassemble(program: &Program) -> String {
    let words = program.words();
    let mut out = String::new();
    let mut addr = 0;

    while addr < words.len() {
        let decoded = Instruction::decode(&words[addr])
            .ok()
            .filter(|instr| addr + instr.width() <= words.len());

        let (text, width) = match decoded {
            Some(instr) => {
                let operands = &words[addr + 1..addr + instr.width()];
                (instr.render(operands), instr.width())
            }
            None => (format!("DATA {}", words[addr]), 1),
        };

        out.push_str(&format!("{addr:>4}: {text}\n"));
        addr += width;
    }

    out
}
