//! Diatonic scale definitions and the starting-chord scale adjustment.

use serde::{Deserialize, Serialize};

use crate::TheoryError;

/// A diatonic scale: seven semitone offsets from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleKind {
    Major,
    Minor,
    Dorian,
    Mixolydian,
}

impl ScaleKind {
    /// Semitone offsets from the root for each of the seven degrees.
    pub fn intervals(self) -> [u8; 7] {
        match self {
            ScaleKind::Major => [0, 2, 4, 5, 7, 9, 11],
            ScaleKind::Minor => [0, 2, 3, 5, 7, 8, 10],
            ScaleKind::Dorian => [0, 2, 3, 5, 7, 9, 10],
            ScaleKind::Mixolydian => [0, 2, 4, 5, 7, 9, 10],
        }
    }

    /// Case-insensitive name lookup.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "major" => Some(ScaleKind::Major),
            "minor" => Some(ScaleKind::Minor),
            "dorian" => Some(ScaleKind::Dorian),
            "mixolydian" => Some(ScaleKind::Mixolydian),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScaleKind::Major => "major",
            ScaleKind::Minor => "minor",
            ScaleKind::Dorian => "dorian",
            ScaleKind::Mixolydian => "mixolydian",
        }
    }
}

impl std::fmt::Display for ScaleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScaleKind {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| TheoryError::UnknownScale(s.to_string()))
    }
}

/// If the requested starting chord is minor-flavored and the scale is major,
/// switch to minor. This is a single narrow heuristic: it looks only at a
/// trailing "m" (excluding "maj" spellings) and does not try to infer other
/// modes from the chord quality.
pub fn adjust_scale(scale: ScaleKind, starting_chord: Option<&str>) -> ScaleKind {
    if scale != ScaleKind::Major {
        return scale;
    }
    match starting_chord {
        Some(chord) if chord.ends_with('m') && !chord.contains("maj") => ScaleKind::Minor,
        _ => scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn interval_tables_have_seven_degrees_in_range() {
        for scale in [
            ScaleKind::Major,
            ScaleKind::Minor,
            ScaleKind::Dorian,
            ScaleKind::Mixolydian,
        ] {
            let intervals = scale.intervals();
            assert_eq!(intervals[0], 0);
            assert!(intervals.windows(2).all(|w| w[0] < w[1]));
            assert!(intervals.iter().all(|&i| i < 12));
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(ScaleKind::parse("Major"), Some(ScaleKind::Major));
        assert_eq!(ScaleKind::parse("MINOR"), Some(ScaleKind::Minor));
        assert_eq!(ScaleKind::parse("locrian"), None);
    }

    #[test]
    fn minor_starting_chord_flips_major_to_minor() {
        assert_eq!(
            adjust_scale(ScaleKind::Major, Some("Am")),
            ScaleKind::Minor
        );
    }

    #[test]
    fn maj_spellings_do_not_flip() {
        // "Cmaj7" contains "maj" and ends in '7' anyway
        assert_eq!(
            adjust_scale(ScaleKind::Major, Some("Cmaj7")),
            ScaleKind::Major
        );
        // trailing 'm' but "maj" present
        assert_eq!(
            adjust_scale(ScaleKind::Major, Some("Cmajm")),
            ScaleKind::Major
        );
    }

    #[test]
    fn seventh_chords_do_not_flip() {
        // "Am7" ends in '7', not 'm' - deliberately outside the heuristic
        assert_eq!(
            adjust_scale(ScaleKind::Major, Some("Am7")),
            ScaleKind::Major
        );
    }

    #[test]
    fn non_major_scales_unchanged() {
        assert_eq!(
            adjust_scale(ScaleKind::Dorian, Some("Am")),
            ScaleKind::Dorian
        );
        assert_eq!(adjust_scale(ScaleKind::Minor, None), ScaleKind::Minor);
    }
}
