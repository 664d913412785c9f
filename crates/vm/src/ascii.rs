//! ASCII encoding on top of plain input and output words.
//!
//! ASCII-mode programs read text one character code at a time, each line
//! terminated by 10, and print text the same way. Values outside the ASCII
//! range usually carry a final numeric answer.

use intcode_common::Word;
use num_traits::ToPrimitive;

/// Newline, the line terminator ASCII programs expect.
pub const NEWLINE: u8 = b'\n';

/// Encode a line of text as input words, appending a newline.
pub fn encode_line(line: &str) -> Vec<Word> {
    line.bytes()
        .chain(std::iter::once(NEWLINE))
        .map(Word::from)
        .collect()
}

/// Decode a single word as an ASCII character.
pub fn as_char(word: &Word) -> Option<char> {
    word.to_u8().filter(u8::is_ascii).map(char::from)
}

/// Render output words as text.
///
/// ASCII codes become characters. Any other value is written in decimal on
/// a line of its own.
pub fn render(words: &[Word]) -> String {
    let mut out = String::new();
    for word in words {
        match as_char(word) {
            Some(c) => out.push(c),
            None => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str(&word.to_string());
                out.push('\n');
            }
        }
    }
    out
}
