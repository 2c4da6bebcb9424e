//! The logical meaning of the calculator keys.

use picalc_gpio::keypad::KeyIndex;

/// What a key press means to the calculator.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Symbol {
    /// A decimal digit, 0 through 9.
    Digit(u8),
    /// The `+` key.
    Plus,
    /// The `-` key.
    Minus,
    /// The `*` key.
    Times,
    /// The `/` key.
    Divide,
    /// The `C` key.
    Clear,
    /// The `=` key.
    Equals,
}

/// The pad legend, row by row, indexed by flat [KeyIndex]:
///
/// ```text
/// 7 8 9 /
/// 4 5 6 *
/// 1 2 3 +
/// C 0 = -
/// ```
const LAYOUT: [Symbol; KeyIndex::COUNT] = {
    use Symbol::*;
    [
        Digit(7), Digit(8), Digit(9), Divide,
        Digit(4), Digit(5), Digit(6), Times,
        Digit(1), Digit(2), Digit(3), Plus,
        Clear, Digit(0), Equals, Minus,
    ]
};

impl Symbol {
    /// Looks up the symbol for a physical key. Total: every key has one.
    pub fn from_key(key: KeyIndex) -> Symbol {
        LAYOUT[key.index() as usize]
    }

    pub fn is_digit(self) -> bool {
        matches!(self, Symbol::Digit(_))
    }

    /// The digit value for digit symbols, `None` otherwise.
    pub fn digit_value(self) -> Option<u8> {
        match self {
            Symbol::Digit(value) => Some(value),
            _ => None,
        }
    }

    /// The character echoed on the display for this symbol.
    pub fn to_char(self) -> char {
        match self {
            Symbol::Digit(value) => char::from(b'0' + value),
            Symbol::Plus => '+',
            Symbol::Minus => '-',
            Symbol::Times => '*',
            Symbol::Divide => '/',
            Symbol::Clear => 'C',
            Symbol::Equals => '=',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> impl Iterator<Item = KeyIndex> {
        (0..KeyIndex::COUNT as u8).map(|index| KeyIndex::from_index(index).unwrap())
    }

    #[test]
    fn lookup_is_total_and_stable() {
        for key in keys() {
            assert_eq!(Symbol::from_key(key), Symbol::from_key(key));
        }
    }

    #[test]
    fn legend_matches_the_pad() {
        let legend: String = keys().map(|key| Symbol::from_key(key).to_char()).collect();
        assert_eq!(legend, "789/456*123+C0=-");
    }

    #[test]
    fn every_digit_appears_exactly_once() {
        let mut counts = [0u8; 10];
        for key in keys() {
            if let Some(value) = Symbol::from_key(key).digit_value() {
                counts[value as usize] += 1;
            }
        }
        assert_eq!(counts, [1; 10]);
    }

    #[test]
    fn digit_classification_matches_the_value() {
        for key in keys() {
            let symbol = Symbol::from_key(key);
            assert_eq!(symbol.is_digit(), symbol.digit_value().is_some());
            if let Some(value) = symbol.digit_value() {
                assert!(value <= 9);
                assert_eq!(symbol.to_char(), char::from_digit(value as u32, 10).unwrap());
            }
        }
    }
}
