//! Pitch classes and note spelling.

use serde::{Deserialize, Serialize};

const NOTE_NAMES_SHARP: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const NOTE_NAMES_FLAT: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Pitch classes conventionally spelled with flats.
static FLAT_SIDE: [u8; 6] = [1, 3, 5, 6, 8, 10];

/// A pitch class 0-11, C=0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);

    pub fn new(value: u8) -> Self {
        Self(value % 12)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Parse a note name: a letter A-G plus an optional single # or b.
    /// Rejects anything with trailing characters.
    pub fn parse(name: &str) -> Option<Self> {
        let (pc, rest) = Self::parse_prefix(name)?;
        if rest.is_empty() {
            Some(pc)
        } else {
            None
        }
    }

    /// Parse a note name off the front of `text`, returning the remainder.
    /// Used by chord-symbol parsing where the remainder is the quality suffix.
    pub fn parse_prefix(text: &str) -> Option<(Self, &str)> {
        let mut chars = text.char_indices();
        let (_, letter) = chars.next()?;
        let base = match letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };

        match chars.next() {
            Some((i, '#')) => Some((Self::new(base + 1), &text[i + 1..])),
            Some((i, 'b')) => Some((Self::new(base + 11), &text[i + 1..])),
            Some((i, _)) => Some((Self::new(base), &text[i..])),
            None => Some((Self::new(base), "")),
        }
    }

    /// Canonical spelling: flat-side pitch classes use flat names.
    pub fn name(self) -> &'static str {
        let idx = self.0 as usize;
        if FLAT_SIDE.contains(&self.0) {
            NOTE_NAMES_FLAT[idx]
        } else {
            NOTE_NAMES_SHARP[idx]
        }
    }

    pub fn transpose(self, semitones: u8) -> Self {
        Self::new(self.0 + semitones)
    }
}

impl std::fmt::Display for PitchClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_naturals() {
        assert_eq!(PitchClass::parse("C"), Some(PitchClass::new(0)));
        assert_eq!(PitchClass::parse("A"), Some(PitchClass::new(9)));
        assert_eq!(PitchClass::parse("B"), Some(PitchClass::new(11)));
    }

    #[test]
    fn parses_accidentals() {
        assert_eq!(PitchClass::parse("F#"), Some(PitchClass::new(6)));
        assert_eq!(PitchClass::parse("Bb"), Some(PitchClass::new(10)));
        assert_eq!(PitchClass::parse("Cb"), Some(PitchClass::new(11)));
    }

    #[test]
    fn rejects_junk() {
        assert_eq!(PitchClass::parse("H"), None);
        assert_eq!(PitchClass::parse(""), None);
        assert_eq!(PitchClass::parse("C#m"), None);
    }

    #[test]
    fn prefix_parse_returns_remainder() {
        let (pc, rest) = PitchClass::parse_prefix("Am7").unwrap();
        assert_eq!(pc, PitchClass::new(9));
        assert_eq!(rest, "m7");

        let (pc, rest) = PitchClass::parse_prefix("Ebmaj7").unwrap();
        assert_eq!(pc, PitchClass::new(3));
        assert_eq!(rest, "maj7");
    }

    #[test]
    fn flat_side_spelled_flat() {
        assert_eq!(PitchClass::new(3).name(), "Eb");
        assert_eq!(PitchClass::new(10).name(), "Bb");
        assert_eq!(PitchClass::new(6).name(), "Gb");
        assert_eq!(PitchClass::new(7).name(), "G");
    }

    #[test]
    fn transpose_wraps() {
        assert_eq!(PitchClass::new(11).transpose(2), PitchClass::new(1));
    }
}
