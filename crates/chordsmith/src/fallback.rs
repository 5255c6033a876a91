//! Deterministic, network-free progression synthesis.
//!
//! When the model path fails - transport fault, unparseable output,
//! rejected structure - the pipeline lands here and cannot fail again.
//! A template library keyed by (scale, mood) supplies roman-numeral
//! progressions; the chosen template is converted through the theory
//! layer and described by three synthesized insight strings.

use rand::Rng;
use voicing::{RomanNumeral, ScaleKind};

use crate::orchestrator::{GeneratedProgression, GenerationSource};
use crate::params::{Mood, ResolvedParams};

const fn maj(degree: u8) -> RomanNumeral {
    RomanNumeral::new(degree, false)
}

const fn min(degree: u8) -> RomanNumeral {
    RomanNumeral::new(degree, true)
}

static MAJOR_HAPPY: &[&[RomanNumeral]] = &[
    // I V vi IV
    &[maj(0), maj(4), min(5), maj(3)],
    // I IV V I
    &[maj(0), maj(3), maj(4), maj(0)],
    // I vi IV V
    &[maj(0), min(5), maj(3), maj(4)],
    // I IV vi V
    &[maj(0), maj(3), min(5), maj(4)],
];

static MAJOR_SAD: &[&[RomanNumeral]] = &[
    // vi IV I V
    &[min(5), maj(3), maj(0), maj(4)],
    // I iii vi IV
    &[maj(0), min(2), min(5), maj(3)],
    // vi V IV V
    &[min(5), maj(4), maj(3), maj(4)],
];

static MAJOR_ENERGETIC: &[&[RomanNumeral]] = &[
    // I V IV V
    &[maj(0), maj(4), maj(3), maj(4)],
    // I V vi iii IV I IV V
    &[
        maj(0),
        maj(4),
        min(5),
        min(2),
        maj(3),
        maj(0),
        maj(3),
        maj(4),
    ],
    // IV V I vi
    &[maj(3), maj(4), maj(0), min(5)],
];

static MAJOR_CALM: &[&[RomanNumeral]] = &[
    // I iii IV I
    &[maj(0), min(2), maj(3), maj(0)],
    // I IV I V
    &[maj(0), maj(3), maj(0), maj(4)],
    // I vi ii V
    &[maj(0), min(5), min(1), maj(4)],
];

static MINOR_SAD: &[&[RomanNumeral]] = &[
    // i VI III VII
    &[min(0), maj(5), maj(2), maj(6)],
    // i iv VII i
    &[min(0), min(3), maj(6), min(0)],
    // i VII VI VII
    &[min(0), maj(6), maj(5), maj(6)],
    // i iv v i
    &[min(0), min(3), min(4), min(0)],
];

static MINOR_ENERGETIC: &[&[RomanNumeral]] = &[
    // i VII VI VII
    &[min(0), maj(6), maj(5), maj(6)],
    // i VI VII i
    &[min(0), maj(5), maj(6), min(0)],
    // i v VI VII
    &[min(0), min(4), maj(5), maj(6)],
];

static MINOR_CALM: &[&[RomanNumeral]] = &[
    // i III VII VI
    &[min(0), maj(2), maj(6), maj(5)],
    // i v VI III
    &[min(0), min(4), maj(5), maj(2)],
    // i iv VI VII
    &[min(0), min(3), maj(5), maj(6)],
];

static MINOR_DREAMY: &[&[RomanNumeral]] = &[
    // i VI iv VII
    &[min(0), maj(5), min(3), maj(6)],
    // i III iv i
    &[min(0), maj(2), min(3), min(0)],
    // i VII iv VI
    &[min(0), maj(6), min(3), maj(5)],
];

static DORIAN_DREAMY: &[&[RomanNumeral]] = &[
    // i IV i IV
    &[min(0), maj(3), min(0), maj(3)],
    // i IV VII i
    &[min(0), maj(3), maj(6), min(0)],
    // i v IV i
    &[min(0), min(4), maj(3), min(0)],
];

static DORIAN_CALM: &[&[RomanNumeral]] = &[
    // i ii IV i
    &[min(0), min(1), maj(3), min(0)],
    // i IV v i
    &[min(0), maj(3), min(4), min(0)],
    // i VII IV i
    &[min(0), maj(6), maj(3), min(0)],
];

static MIXOLYDIAN_HAPPY: &[&[RomanNumeral]] = &[
    // I VII IV I
    &[maj(0), maj(6), maj(3), maj(0)],
    // I IV VII I
    &[maj(0), maj(3), maj(6), maj(0)],
    // I IV I VII
    &[maj(0), maj(3), maj(0), maj(6)],
];

static MIXOLYDIAN_ENERGETIC: &[&[RomanNumeral]] = &[
    // I VII I IV
    &[maj(0), maj(6), maj(0), maj(3)],
    // I IV VII IV
    &[maj(0), maj(3), maj(6), maj(3)],
    // I VII IV VII
    &[maj(0), maj(6), maj(3), maj(6)],
];

struct TemplateBucket {
    scale: ScaleKind,
    mood: Mood,
    templates: &'static [&'static [RomanNumeral]],
}

static LIBRARY: &[TemplateBucket] = &[
    TemplateBucket {
        scale: ScaleKind::Major,
        mood: Mood::Happy,
        templates: MAJOR_HAPPY,
    },
    TemplateBucket {
        scale: ScaleKind::Major,
        mood: Mood::Sad,
        templates: MAJOR_SAD,
    },
    TemplateBucket {
        scale: ScaleKind::Major,
        mood: Mood::Energetic,
        templates: MAJOR_ENERGETIC,
    },
    TemplateBucket {
        scale: ScaleKind::Major,
        mood: Mood::Calm,
        templates: MAJOR_CALM,
    },
    TemplateBucket {
        scale: ScaleKind::Minor,
        mood: Mood::Sad,
        templates: MINOR_SAD,
    },
    TemplateBucket {
        scale: ScaleKind::Minor,
        mood: Mood::Energetic,
        templates: MINOR_ENERGETIC,
    },
    TemplateBucket {
        scale: ScaleKind::Minor,
        mood: Mood::Calm,
        templates: MINOR_CALM,
    },
    TemplateBucket {
        scale: ScaleKind::Minor,
        mood: Mood::Dreamy,
        templates: MINOR_DREAMY,
    },
    TemplateBucket {
        scale: ScaleKind::Dorian,
        mood: Mood::Dreamy,
        templates: DORIAN_DREAMY,
    },
    TemplateBucket {
        scale: ScaleKind::Dorian,
        mood: Mood::Calm,
        templates: DORIAN_CALM,
    },
    TemplateBucket {
        scale: ScaleKind::Mixolydian,
        mood: Mood::Happy,
        templates: MIXOLYDIAN_HAPPY,
    },
    TemplateBucket {
        scale: ScaleKind::Mixolydian,
        mood: Mood::Energetic,
        templates: MIXOLYDIAN_ENERGETIC,
    },
];

/// Templates for a (scale, mood) combination. Unknown combinations fall
/// back to the major/happy bucket, which always exists.
fn templates_for(scale: ScaleKind, mood: Mood) -> &'static [&'static [RomanNumeral]] {
    LIBRARY
        .iter()
        .find(|bucket| bucket.scale == scale && bucket.mood == mood)
        .map(|bucket| bucket.templates)
        .unwrap_or(MAJOR_HAPPY)
}

/// Synthesize a progression without touching the network. Never fails:
/// one template is chosen uniformly at random and converted through the
/// theory layer.
pub fn generate(params: &ResolvedParams) -> GeneratedProgression {
    let templates = templates_for(params.scale, params.mood);
    let index = rand::rng().random_range(0..templates.len());
    generate_from(params, templates[index])
}

fn generate_from(params: &ResolvedParams, template: &[RomanNumeral]) -> GeneratedProgression {
    let chords: Vec<String> = template
        .iter()
        .map(|numeral| numeral.to_chord(params.key, params.scale).name())
        .collect();
    let numerals: Vec<String> = template.iter().map(|n| n.to_string()).collect();
    let insights = synthesize_insights(params, template, &chords);

    GeneratedProgression {
        chords,
        numerals: Some(numerals),
        insights,
        source: GenerationSource::Fallback,
    }
}

fn synthesize_insights(
    params: &ResolvedParams,
    template: &[RomanNumeral],
    chords: &[String],
) -> Vec<String> {
    let mood_clause = match params.mood {
        Mood::Happy => "leans on bright major colors that keep the energy lifted",
        Mood::Sad => "lets the minor colors sit in the foreground for a wistful, reflective tone",
        Mood::Energetic => "pushes toward the dominant to keep the motion driving forward",
        Mood::Calm => "moves in small, unhurried steps so nothing disturbs the even pulse",
        Mood::Dreamy => "blurs the pull of the tonic so the harmony seems to float in place",
    };

    let character = format!(
        "A {} progression in {} {}: the harmony {}. Voiced simply and played for {}, \
         it sits comfortably under a melody, and the short loopable shape repeats \
         without drawing attention to the seam.",
        params.mood,
        params.key_name(),
        params.scale,
        mood_clause,
        params.style,
    );

    let mid = template.len() / 2;
    let motion_clause = if has_degree(template, 3) && has_degree(template, 2) {
        "Both the mediant and the subdominant appear, so the line gets color from the \
         middle of the scale as well as the usual plagal warmth."
    } else if has_degree(template, 3) {
        "The subdominant pull in the middle adds plagal warmth without ever fighting \
         the home key for attention."
    } else if has_degree(template, 2) {
        "The mediant chord lends a soft inner color that sits between the tonic and \
         dominant poles of the key."
    } else {
        "The motion stays close to the tonic and dominant poles, which keeps the \
         progression sturdy and easy to follow by ear."
    };

    let movement = format!(
        "The first half moves {} before the second half settles into {}. {}",
        join_names(&chords[..mid]),
        join_names(&chords[mid..]),
        motion_clause,
    );

    let resolves = template.last() == template.first();
    let resolution = if resolves {
        format!(
            "Because the progression ends where it began, on {}, every pass resolves \
             back to the tonic; each repeat lands with a sense of arrival, which makes \
             the loop feel closed and complete.",
            chords[0],
        )
    } else {
        format!(
            "The progression ends away from its opening {}, so the final chord hands \
             its tension to the next repeat; the loop stays open-ended, inviting another \
             pass instead of a full stop.",
            chords[0],
        )
    };

    vec![character, movement, resolution]
}

fn has_degree(template: &[RomanNumeral], degree: u8) -> bool {
    template.iter().any(|n| n.degree() == degree)
}

fn join_names(chords: &[String]) -> String {
    chords.join(" to ")
}
