//! Single source of truth for the model output contract.
//!
//! The prompt states these numbers and the validator enforces them; both
//! read from here so the two can never drift apart.

/// Minimum chord count for an accepted model response
pub const MIN_CHORDS: usize = 6;

/// Preferred chord count range, stated in the prompt
pub const PREFERRED_CHORDS_MIN: usize = 8;
pub const PREFERRED_CHORDS_MAX: usize = 12;

/// Minimum number of insight strings
pub const MIN_INSIGHTS: usize = 3;

/// Minimum length of each insight, in characters
pub const MIN_INSIGHT_CHARS: usize = 100;
