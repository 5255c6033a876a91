//! Generation parameters and their resolution to typed values.

use serde::{Deserialize, Serialize};
use voicing::{adjust_scale, PitchClass, ScaleKind};

/// Raw generation request as it arrives from callers: free strings with
/// documented defaults. Resolution is lenient - unknown names fall back to
/// the defaults rather than erroring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(default = "default_key")]
    pub key: String,

    #[serde(default = "default_scale")]
    pub scale: String,

    #[serde(default = "default_mood")]
    pub mood: String,

    #[serde(default = "default_style")]
    pub style: String,

    #[serde(default)]
    pub starting_chord: Option<String>,
}

fn default_key() -> String {
    "C".to_string()
}

fn default_scale() -> String {
    "major".to_string()
}

fn default_mood() -> String {
    "happy".to_string()
}

fn default_style() -> String {
    "any style".to_string()
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            key: default_key(),
            scale: default_scale(),
            mood: default_mood(),
            style: default_style(),
            starting_chord: None,
        }
    }
}

/// Mood vocabulary for prompting and fallback template selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Energetic,
    Calm,
    Dreamy,
}

impl Mood {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "happy" => Some(Mood::Happy),
            "sad" => Some(Mood::Sad),
            "energetic" => Some(Mood::Energetic),
            "calm" => Some(Mood::Calm),
            "dreamy" => Some(Mood::Dreamy),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Energetic => "energetic",
            Mood::Calm => "calm",
            Mood::Dreamy => "dreamy",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Typed parameters after defaulting and the starting-chord scale
/// adjustment. Everything downstream (prompt, fallback, persistence)
/// reads these, so the adjustment happens exactly once.
#[derive(Debug, Clone)]
pub struct ResolvedParams {
    pub key: PitchClass,
    pub scale: ScaleKind,
    pub mood: Mood,
    pub style: String,
    pub starting_chord: Option<String>,
}

impl ResolvedParams {
    pub fn resolve(params: &GenerationParams) -> Self {
        let key = PitchClass::parse(&params.key).unwrap_or(PitchClass::C);
        let scale = ScaleKind::parse(&params.scale).unwrap_or(ScaleKind::Major);
        let mood = Mood::parse(&params.mood).unwrap_or(Mood::Happy);
        let scale = adjust_scale(scale, params.starting_chord.as_deref());

        Self {
            key,
            scale,
            mood,
            style: params.style.clone(),
            starting_chord: params.starting_chord.clone(),
        }
    }

    /// Canonical key name, e.g. "C", "Eb"
    pub fn key_name(&self) -> &'static str {
        self.key.name()
    }
}
