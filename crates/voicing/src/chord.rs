//! Chord symbols: a root pitch class plus a quality suffix.

use serde::{Deserialize, Serialize};

use crate::notes::PitchClass;

/// A chord symbol like "Am7": root pitch class + textual quality suffix.
/// The suffix is kept verbatim; the theory layer only ever needs to
/// distinguish major (empty) from minor ("m") when it generates chords.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChordSymbol {
    pub root: PitchClass,
    pub quality: String,
}

impl ChordSymbol {
    pub fn new(root: PitchClass, quality: impl Into<String>) -> Self {
        Self {
            root,
            quality: quality.into(),
        }
    }

    /// Parse a chord symbol by prefix-matching the root (letter plus
    /// optional #/b); everything after the root is the quality suffix.
    ///
    /// Unparseable input yields C major. That fallback is deliberate:
    /// chord symbols arrive from model output and user input, and the
    /// pipeline must keep moving.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        match PitchClass::parse_prefix(trimmed) {
            Some((root, quality)) => Self::new(root, quality),
            None => Self::new(PitchClass::C, ""),
        }
    }

    /// Canonical textual form, e.g. "Am7", "Eb", "G7".
    pub fn name(&self) -> String {
        format!("{}{}", self.root.name(), self.quality)
    }

    pub fn is_minor(&self) -> bool {
        self.quality.starts_with('m') && !self.quality.starts_with("maj")
    }
}

impl std::fmt::Display for ChordSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.root.name(), self.quality)
    }
}
