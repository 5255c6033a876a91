//! Music theory primitives for Woodshed.
//!
//! Everything here is pure arithmetic over pitch classes: scale interval
//! tables, roman-numeral to chord conversion, and chord-symbol parsing.
//! No I/O, no allocation beyond the returned symbols.

pub mod chord;
pub mod notes;
pub mod roman;
pub mod scales;

pub use chord::ChordSymbol;
pub use notes::PitchClass;
pub use roman::{roman_numeral_to_chord, RomanNumeral};
pub use scales::{adjust_scale, ScaleKind};

use thiserror::Error;

/// Errors from the theory layer. Conversion is total once inputs parse;
/// these only surface at the string boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TheoryError {
    #[error("unrecognized roman numeral: {0}")]
    UnknownNumeral(String),

    #[error("unrecognized key name: {0}")]
    UnknownKey(String),

    #[error("unrecognized scale name: {0}")]
    UnknownScale(String),
}
