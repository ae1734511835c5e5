//! Teaching combinations and their marker counts.

use serde::{Deserialize, Serialize};

pub const BLICKET_MARKER: char = '*';
pub const NONBLICKET_MARKER: char = '.';

/// Counts of each marker in a teaching combo. Position never matters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComboCounts {
    pub blickets: u32,
    pub nonblickets: u32,
}

impl ComboCounts {
    pub fn new(blickets: u32, nonblickets: u32) -> Self {
        Self {
            blickets,
            nonblickets,
        }
    }

    /// Count markers in a combo string such as `"*.**"`. Other characters are
    /// not counted.
    pub fn of(combo: &str) -> Self {
        combo.chars().fold(Self::default(), |mut counts, c| {
            match c {
                BLICKET_MARKER => counts.blickets += 1,
                NONBLICKET_MARKER => counts.nonblickets += 1,
                _ => {}
            }
            counts
        })
    }

    /// Canonical combo string: blickets first, then non-blickets.
    pub fn to_combo(&self) -> String {
        let mut combo = String::with_capacity((self.blickets + self.nonblickets) as usize);
        combo.extend(std::iter::repeat_n(BLICKET_MARKER, self.blickets as usize));
        combo.extend(std::iter::repeat_n(NONBLICKET_MARKER, self.nonblickets as usize));
        combo
    }
}

impl From<&str> for ComboCounts {
    fn from(combo: &str) -> Self {
        Self::of(combo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_ignore_order() {
        assert_eq!(ComboCounts::of("***."), ComboCounts::new(3, 1));
        assert_eq!(ComboCounts::of("*.**"), ComboCounts::new(3, 1));
        assert_eq!(ComboCounts::of(".*.*"), ComboCounts::new(2, 2));
    }

    #[test]
    fn test_empty_combo() {
        assert_eq!(ComboCounts::of(""), ComboCounts::new(0, 0));
    }

    #[test]
    fn test_unknown_characters_are_not_counted() {
        assert_eq!(ComboCounts::of("* . x*"), ComboCounts::new(2, 1));
    }

    #[test]
    fn test_canonical_combo() {
        assert_eq!(ComboCounts::of(".*.*").to_combo(), "**..");
        assert_eq!(ComboCounts::default().to_combo(), "");
    }
}
