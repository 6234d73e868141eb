//! Character → key stroke translation table (US-QWERTY layout).

use super::{KeyCode, KeyStroke};

/// Translates a character to the key stroke that produces it.
///
/// Returns `None` for characters the virtual keyboard cannot produce through
/// key events (anything outside printable ASCII plus `\n`/`\t`); the text
/// synthesizer skips those silently.
pub fn char_to_keystroke(c: char) -> Option<KeyStroke> {
    use KeyCode::*;

    let stroke = match c {
        'a'..='z' => KeyStroke::plain(letter(c)),
        'A'..='Z' => KeyStroke::shifted(letter(c.to_ascii_lowercase())),
        '0'..='9' => KeyStroke::plain(digit(c)),

        ' ' => KeyStroke::plain(Space),
        '\n' => KeyStroke::plain(Enter),
        '\t' => KeyStroke::plain(Tab),

        ',' => KeyStroke::plain(Comma),
        '.' => KeyStroke::plain(Period),
        '-' => KeyStroke::plain(Minus),
        '=' => KeyStroke::plain(Equals),
        '[' => KeyStroke::plain(LeftBracket),
        ']' => KeyStroke::plain(RightBracket),
        '\\' => KeyStroke::plain(Backslash),
        ';' => KeyStroke::plain(Semicolon),
        '\'' => KeyStroke::plain(Apostrophe),
        '/' => KeyStroke::plain(Slash),
        '`' => KeyStroke::plain(Grave),

        // Shifted digit row
        '!' => KeyStroke::shifted(Digit1),
        '@' => KeyStroke::shifted(Digit2),
        '#' => KeyStroke::shifted(Digit3),
        '$' => KeyStroke::shifted(Digit4),
        '%' => KeyStroke::shifted(Digit5),
        '^' => KeyStroke::shifted(Digit6),
        '&' => KeyStroke::shifted(Digit7),
        '*' => KeyStroke::shifted(Digit8),
        '(' => KeyStroke::shifted(Digit9),
        ')' => KeyStroke::shifted(Digit0),

        // Shifted punctuation
        '_' => KeyStroke::shifted(Minus),
        '+' => KeyStroke::shifted(Equals),
        '{' => KeyStroke::shifted(LeftBracket),
        '}' => KeyStroke::shifted(RightBracket),
        '|' => KeyStroke::shifted(Backslash),
        ':' => KeyStroke::shifted(Semicolon),
        '"' => KeyStroke::shifted(Apostrophe),
        '<' => KeyStroke::shifted(Comma),
        '>' => KeyStroke::shifted(Period),
        '?' => KeyStroke::shifted(Slash),
        '~' => KeyStroke::shifted(Grave),

        _ => return None,
    };
    Some(stroke)
}

/// Key code for a lowercase ASCII letter.
fn letter(c: char) -> KeyCode {
    debug_assert!(c.is_ascii_lowercase());
    // KeyA..KeyZ are contiguous device codes 29..54.
    const LETTERS: [KeyCode; 26] = {
        use KeyCode::*;
        [
            KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM, KeyN,
            KeyO, KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,
        ]
    };
    LETTERS[(c as u8 - b'a') as usize]
}

/// Key code for an ASCII digit.
fn digit(c: char) -> KeyCode {
    debug_assert!(c.is_ascii_digit());
    const DIGITS: [KeyCode; 10] = {
        use KeyCode::*;
        [
            Digit0, Digit1, Digit2, Digit3, Digit4, Digit5, Digit6, Digit7, Digit8, Digit9,
        ]
    };
    DIGITS[(c as u8 - b'0') as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_letters_are_plain_strokes() {
        let stroke = char_to_keystroke('a').expect("mapped");
        assert_eq!(stroke, KeyStroke::plain(KeyCode::KeyA));
        let stroke = char_to_keystroke('z').expect("mapped");
        assert_eq!(stroke, KeyStroke::plain(KeyCode::KeyZ));
    }

    #[test]
    fn test_uppercase_letters_are_shifted_strokes() {
        let stroke = char_to_keystroke('Q').expect("mapped");
        assert_eq!(stroke, KeyStroke::shifted(KeyCode::KeyQ));
    }

    #[test]
    fn test_digits_map_to_digit_row() {
        assert_eq!(
            char_to_keystroke('0'),
            Some(KeyStroke::plain(KeyCode::Digit0))
        );
        assert_eq!(
            char_to_keystroke('9'),
            Some(KeyStroke::plain(KeyCode::Digit9))
        );
    }

    #[test]
    fn test_shifted_symbols_use_digit_row() {
        assert_eq!(
            char_to_keystroke('!'),
            Some(KeyStroke::shifted(KeyCode::Digit1))
        );
        assert_eq!(
            char_to_keystroke(')'),
            Some(KeyStroke::shifted(KeyCode::Digit0))
        );
    }

    #[test]
    fn test_whitespace_maps_to_space_enter_tab() {
        assert_eq!(char_to_keystroke(' '), Some(KeyStroke::plain(KeyCode::Space)));
        assert_eq!(char_to_keystroke('\n'), Some(KeyStroke::plain(KeyCode::Enter)));
        assert_eq!(char_to_keystroke('\t'), Some(KeyStroke::plain(KeyCode::Tab)));
    }

    #[test]
    fn test_unmapped_characters_return_none() {
        assert_eq!(char_to_keystroke('é'), None);
        assert_eq!(char_to_keystroke('€'), None);
        assert_eq!(char_to_keystroke('\u{7}'), None);
    }

    #[test]
    fn test_every_printable_ascii_character_is_mapped() {
        for b in 0x20u8..0x7F {
            let c = b as char;
            assert!(
                char_to_keystroke(c).is_some(),
                "printable ASCII {c:?} must have a key stroke"
            );
        }
    }
}
