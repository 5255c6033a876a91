//! Roman-numeral scale-degree notation and conversion to chord symbols.

use serde::{Deserialize, Serialize};

use crate::chord::ChordSymbol;
use crate::notes::PitchClass;
use crate::scales::ScaleKind;
use crate::TheoryError;

const NUMERAL_NAMES: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];

/// A roman numeral: a scale degree 0-6 plus chord quality encoded by case
/// (lowercase = minor). Conversion to a chord is total once parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RomanNumeral {
    degree: u8,
    minor: bool,
}

impl RomanNumeral {
    /// Construct from a degree 0-6. Callers use the named constants below
    /// for template tables.
    pub const fn new(degree: u8, minor: bool) -> Self {
        Self { degree, minor }
    }

    /// Parse I..VII / i..vii. The degree lookup is case-insensitive; the
    /// quality is minor iff the input is entirely lowercase.
    pub fn parse(text: &str) -> Result<Self, TheoryError> {
        let upper = text.to_ascii_uppercase();
        let degree = NUMERAL_NAMES
            .iter()
            .position(|&n| n == upper)
            .ok_or_else(|| TheoryError::UnknownNumeral(text.to_string()))?;
        let minor = text == text.to_ascii_lowercase();
        Ok(Self::new(degree as u8, minor))
    }

    pub fn degree(self) -> u8 {
        self.degree
    }

    pub fn is_minor(self) -> bool {
        self.minor
    }

    /// Root pitch = key pitch + scale interval at this degree, mod 12;
    /// quality "m" iff the numeral is lowercase.
    pub fn to_chord(self, key: PitchClass, scale: ScaleKind) -> ChordSymbol {
        let offset = scale.intervals()[self.degree as usize];
        let root = key.transpose(offset);
        let quality = if self.minor { "m" } else { "" };
        ChordSymbol::new(root, quality)
    }
}

impl std::fmt::Display for RomanNumeral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = NUMERAL_NAMES[self.degree as usize];
        if self.minor {
            write!(f, "{}", name.to_ascii_lowercase())
        } else {
            write!(f, "{}", name)
        }
    }
}

/// String-boundary convenience: parse numeral and key name, then convert.
pub fn roman_numeral_to_chord(
    numeral: &str,
    key: &str,
    scale: ScaleKind,
) -> Result<ChordSymbol, TheoryError> {
    let numeral = RomanNumeral::parse(numeral)?;
    let key = PitchClass::parse(key).ok_or_else(|| TheoryError::UnknownKey(key.to_string()))?;
    Ok(numeral.to_chord(key, scale))
}
