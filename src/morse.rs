// src/morse.rs
// International Morse code table and token decoding

use std::collections::HashMap;
use std::sync::LazyLock;

/// Separator emitted between words in a token string.
pub const WORD_MARKER: &str = " / ";

/// Substituted for any token group missing from the table.
pub const UNKNOWN_CHAR: char = '?';

pub const MORSE_TABLE: &[(&str, char)] = &[
    (".-", 'A'),
    ("-...", 'B'),
    ("-.-.", 'C'),
    ("-..", 'D'),
    (".", 'E'),
    ("..-.", 'F'),
    ("--.", 'G'),
    ("....", 'H'),
    ("..", 'I'),
    (".---", 'J'),
    ("-.-", 'K'),
    (".-..", 'L'),
    ("--", 'M'),
    ("-.", 'N'),
    ("---", 'O'),
    (".--.", 'P'),
    ("--.-", 'Q'),
    (".-.", 'R'),
    ("...", 'S'),
    ("-", 'T'),
    ("..-", 'U'),
    ("...-", 'V'),
    (".--", 'W'),
    ("-..-", 'X'),
    ("-.--", 'Y'),
    ("--..", 'Z'),
    (".----", '1'),
    ("..---", '2'),
    ("...--", '3'),
    ("....-", '4'),
    (".....", '5'),
    ("-....", '6'),
    ("--...", '7'),
    ("---..", '8'),
    ("----.", '9'),
    ("-----", '0'),
    (".-.-.-", '.'),
    ("--..--", ','),
    ("..--..", '?'),
    (".----.", '\''),
    ("-.-.--", '!'),
    ("-..-.", '/'),
    ("-.--.", '('),
    ("-.--.-", ')'),
    (".-...", '&'),
    ("---...", ':'),
    ("-.-.-.", ';'),
    ("-...-", '='),
    (".-.-.", '+'),
    ("-....-", '-'),
    ("..--.-", '_'),
    (".-..-.", '"'),
    ("...-..-", '$'),
    (".--.-.", '@'),
    // The word marker splits out as its own group.
    ("/", ' '),
];

static CODE_TO_CHAR: LazyLock<HashMap<&'static str, char>> =
    LazyLock::new(|| MORSE_TABLE.iter().copied().collect());

static CHAR_TO_CODE: LazyLock<HashMap<char, &'static str>> = LazyLock::new(|| {
    MORSE_TABLE
        .iter()
        .filter(|(code, _)| *code != "/")
        .map(|&(code, c)| (c, code))
        .collect()
});

pub fn morse_to_char(code: &str) -> Option<char> {
    CODE_TO_CHAR.get(code).copied()
}

/// Returns the dot/dash code for `c`, case-insensitively.
pub fn encode_char(c: char) -> Option<&'static str> {
    CHAR_TO_CODE.get(&c.to_ascii_uppercase()).copied()
}

/// Decodes a token string into text.
///
/// Groups are split on whitespace and looked up one by one; the word marker
/// becomes a space and anything unknown becomes [`UNKNOWN_CHAR`].
pub fn decode(tokens: &str) -> String {
    tokens
        .split_whitespace()
        .map(|group| morse_to_char(group).unwrap_or(UNKNOWN_CHAR))
        .collect()
}
