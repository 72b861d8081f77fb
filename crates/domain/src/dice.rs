//! Damage dice value objects and parsing
//!
//! Supports formulas like "1d20+5", "2d6-1", "d8", and the looser forms
//! models tend to emit ("2d6 + STR", "1d4 piercing").

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error when parsing a dice formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceParseError {
    /// The formula string is empty
    #[error("Empty dice formula")]
    Empty,
    /// Invalid format - expected XdY or XdY+Z
    #[error("Invalid dice format: {0}")]
    InvalidFormat(String),
    /// Dice count must be at least 1
    #[error("Dice count must be at least 1")]
    InvalidDiceCount,
    /// Die size must be at least 2
    #[error("Die size must be at least 2")]
    InvalidDieSize,
}

/// A parsed dice formula like "2d6+3"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceFormula {
    /// Number of dice to roll (X in XdY)
    pub dice_count: u32,
    /// Size of each die (Y in XdY)
    pub die_size: u32,
    /// Flat modifier after rolling (+Z or -Z)
    pub modifier: i32,
}

impl DiceFormula {
    /// Formula used when a damage string cannot be read.
    pub const FALLBACK: DiceFormula = DiceFormula {
        dice_count: 1,
        die_size: 6,
        modifier: 0,
    };

    /// Parse a strict dice formula string like "1d20+5", "2d6-1", "d8".
    pub fn parse(input: &str) -> Result<Self, DiceParseError> {
        let input: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        if input.is_empty() {
            return Err(DiceParseError::Empty);
        }

        let d_pos = input.find('d').ok_or_else(|| {
            DiceParseError::InvalidFormat(format!("Missing 'd' separator in '{}'", input))
        })?;

        let dice_count_str = &input[..d_pos];
        let dice_count: u32 = if dice_count_str.is_empty() {
            1
        } else {
            dice_count_str.parse().map_err(|_| {
                DiceParseError::InvalidFormat(format!("Invalid dice count: '{}'", dice_count_str))
            })?
        };
        if dice_count == 0 {
            return Err(DiceParseError::InvalidDiceCount);
        }

        let after_d = &input[d_pos + 1..];
        let (die_size_str, modifier) = match after_d.find(|c: char| c == '+' || c == '-') {
            Some(0) => {
                return Err(DiceParseError::InvalidFormat(format!(
                    "Invalid die size: '{}'",
                    after_d
                )))
            }
            Some(sign_pos) => {
                let mod_str = &after_d[sign_pos..];
                let modifier: i32 = mod_str.parse().map_err(|_| {
                    DiceParseError::InvalidFormat(format!("Invalid modifier: '{}'", mod_str))
                })?;
                (&after_d[..sign_pos], modifier)
            }
            None => (after_d, 0),
        };

        let die_size: u32 = die_size_str.parse().map_err(|_| {
            DiceParseError::InvalidFormat(format!("Invalid die size: '{}'", die_size_str))
        })?;
        if die_size < 2 {
            return Err(DiceParseError::InvalidDieSize);
        }

        Ok(Self {
            dice_count,
            die_size,
            modifier,
        })
    }

    /// Find the first `NdM` run inside free text ("2d6 + STR", "1d4 piercing").
    ///
    /// A missing count reads as 1. The modifier is never extracted here.
    pub fn find_in(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        for (idx, byte) in bytes.iter().enumerate() {
            if !matches!(byte, b'd' | b'D') {
                continue;
            }
            let size_digits = bytes[idx + 1..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count();
            if size_digits == 0 {
                continue;
            }
            let count_digits = bytes[..idx]
                .iter()
                .rev()
                .take_while(|b| b.is_ascii_digit())
                .count();
            // Reject letters glued to the die ("add6" is not a formula)
            let count_start = idx - count_digits;
            if count_start > 0 && bytes[count_start - 1].is_ascii_alphabetic() {
                continue;
            }

            let count = if count_digits == 0 {
                1
            } else {
                text[count_start..idx].parse().ok()?
            };
            let size: u32 = text[idx + 1..idx + 1 + size_digits].parse().ok()?;
            if count == 0 || size < 2 {
                continue;
            }
            return Some(Self {
                dice_count: count,
                die_size: size,
                modifier: 0,
            });
        }
        None
    }

    /// Strict parse, then a free-text scan, then the 1d6 fallback.
    ///
    /// The flag is `true` when the fallback was used.
    pub fn parse_lenient(input: &str) -> (Self, bool) {
        match Self::parse(input) {
            Ok(formula) => (formula, false),
            Err(_) => match Self::find_in(input) {
                Some(formula) => (formula, false),
                None => (Self::FALLBACK, true),
            },
        }
    }
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modifier {
            0 => write!(f, "{}d{}", self.dice_count, self.die_size),
            m if m > 0 => write!(f, "{}d{}+{}", self.dice_count, self.die_size, m),
            m => write!(f, "{}d{}{}", self.dice_count, self.die_size, m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_formulas() {
        let f = DiceFormula::parse("2d8").unwrap();
        assert_eq!((f.dice_count, f.die_size, f.modifier), (2, 8, 0));

        let f = DiceFormula::parse("1d6 + 2").unwrap();
        assert_eq!((f.dice_count, f.die_size, f.modifier), (1, 6, 2));

        let f = DiceFormula::parse("d12-1").unwrap();
        assert_eq!((f.dice_count, f.die_size, f.modifier), (1, 12, -1));
    }

    #[test]
    fn rejects_bad_formulas() {
        assert_eq!(DiceFormula::parse(""), Err(DiceParseError::Empty));
        assert_eq!(DiceFormula::parse("0d6"), Err(DiceParseError::InvalidDiceCount));
        assert_eq!(DiceFormula::parse("1d1"), Err(DiceParseError::InvalidDieSize));
        assert!(matches!(
            DiceFormula::parse("special"),
            Err(DiceParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn finds_dice_in_loose_text() {
        let f = DiceFormula::find_in("2d6 + STR").unwrap();
        assert_eq!((f.dice_count, f.die_size), (2, 6));

        let f = DiceFormula::find_in("takes 1d4 piercing").unwrap();
        assert_eq!((f.dice_count, f.die_size), (1, 4));

        assert!(DiceFormula::find_in("add6 damage").is_none());
        assert!(DiceFormula::find_in("no dice here").is_none());
    }

    #[test]
    fn lenient_parse_falls_back_to_one_d_six() {
        let (formula, fell_back) = DiceFormula::parse_lenient("special");
        assert!(fell_back);
        assert_eq!(formula, DiceFormula::FALLBACK);

        let (formula, fell_back) = DiceFormula::parse_lenient("1d10 + Strength modifier");
        assert!(!fell_back);
        assert_eq!((formula.dice_count, formula.die_size), (1, 10));
    }

    #[test]
    fn display_round_trips_modifier_sign() {
        assert_eq!(DiceFormula::parse("2d6+3").unwrap().to_string(), "2d6+3");
        assert_eq!(DiceFormula::parse("2d6-3").unwrap().to_string(), "2d6-3");
    }
}
