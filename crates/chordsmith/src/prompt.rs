//! Prompt construction for the generative model.
//!
//! The output contract stated here (chord counts, insight counts and
//! lengths) is read from [`crate::contract`]; the validator enforces the
//! same numbers.

use crate::contract;
use crate::params::ResolvedParams;

/// System instruction sent with every request
pub const SYSTEM_PROMPT: &str = "You are an expert music theorist and songwriter. \
You design chord progressions that are idiomatic for the requested key, scale, mood, \
and style. You always respond with a single JSON object and nothing else.";

/// Build the deterministic user prompt for one generation request.
pub fn build_prompt(params: &ResolvedParams) -> String {
    let mut prompt = format!(
        "Write a chord progression in {key} {scale} with a {mood} mood, suited to {style}.",
        key = params.key_name(),
        scale = params.scale,
        mood = params.mood,
        style = params.style,
    );

    if let Some(chord) = &params.starting_chord {
        prompt.push_str(&format!(" Begin the progression on {}.", chord));
    }

    prompt.push_str(&format!(
        "\n\nRespond with one JSON object containing exactly these keys:\n\
         - \"chords\": an array of at least {min_chords} chord symbols \
         (prefer {pref_min} to {pref_max}), e.g. \"Am7\" or \"F\"\n\
         - \"insights\": an array of at least {min_insights} strings, each at least \
         3 sentences ({min_chars} characters or more), explaining why the progression \
         works harmonically and how to use it\n\
         - \"numerals\": an array of roman numerals parallel to \"chords\", \
         e.g. \"ii\" or \"V\"\n",
        min_chords = contract::MIN_CHORDS,
        pref_min = contract::PREFERRED_CHORDS_MIN,
        pref_max = contract::PREFERRED_CHORDS_MAX,
        min_insights = contract::MIN_INSIGHTS,
        min_chars = contract::MIN_INSIGHT_CHARS,
    ));

    prompt
}
