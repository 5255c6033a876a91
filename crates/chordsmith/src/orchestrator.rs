//! The generation state machine.
//!
//! START -> PROMPTING -> AWAITING_MODEL -> VALIDATING -> {SUCCESS|FALLBACK}
//! -> DONE, collapsed into one sequential async fn. Exactly one model call
//! is made per request; every failure mode after parameter resolution
//! routes to the deterministic fallback, so generation itself never fails.
//! There is no retry and no backoff around the model call: the first
//! fault of any kind lands on the fallback path.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::fallback;
use crate::model::ChordModel;
use crate::params::{GenerationParams, ResolvedParams};
use crate::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::validate::{normalize_chords, validate, Verdict};

/// Which path produced a progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationSource {
    Model,
    Fallback,
}

/// The pipeline's output. Persistence is the caller's responsibility.
///
/// `numerals` is always present on the fallback path and parallel to
/// `chords` there; on the model path it is passed through as returned,
/// unchecked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedProgression {
    pub chords: Vec<String>,
    pub numerals: Option<Vec<String>>,
    pub insights: Vec<String>,
    pub source: GenerationSource,
}

/// Coordinates prompt building, the single model call, validation, and
/// the fallback. Stateless apart from the shared model client, so
/// concurrent requests are safe by construction.
pub struct GenerationOrchestrator {
    model: Arc<dyn ChordModel>,
}

impl GenerationOrchestrator {
    pub fn new(model: Arc<dyn ChordModel>) -> Self {
        Self { model }
    }

    /// Run the full pipeline for one request. Infallible: the result is
    /// model output when it passes validation, a fallback progression
    /// otherwise.
    pub async fn generate(&self, params: &GenerationParams) -> GeneratedProgression {
        let resolved = ResolvedParams::resolve(params);
        let prompt = build_prompt(&resolved);

        let raw = match self.model.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "model call failed, using fallback");
                return fallback::generate(&resolved);
            }
        };

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "model output was not valid JSON, using fallback");
                return fallback::generate(&resolved);
            }
        };

        match validate(&value) {
            Verdict::Reject(reason) => {
                warn!(reason, "model output rejected, using fallback");
                fallback::generate(&resolved)
            }
            Verdict::Accept => {
                // validate() guarantees chords is an array here
                let chords = value
                    .get("chords")
                    .and_then(Value::as_array)
                    .map(|entries| normalize_chords(entries))
                    .unwrap_or_default();
                let insights = string_array(&value, "insights");
                let numerals = value
                    .get("numerals")
                    .and_then(Value::as_array)
                    .map(|entries| {
                        entries
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect::<Vec<_>>()
                    });

                info!(chords = chords.len(), "model output accepted");
                GeneratedProgression {
                    chords,
                    numerals,
                    insights,
                    source: GenerationSource::Model,
                }
            }
        }
    }
}

fn string_array(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelError;
    use async_trait::async_trait;
    use serde_json::json;

    struct CannedModel(String);

    #[async_trait]
    impl ChordModel for CannedModel {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, ModelError> {
            Ok(self.0.clone())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ChordModel for FailingModel {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, ModelError> {
            Err(ModelError::MissingContent)
        }
    }

    fn long_insight() -> String {
        "The dominant sets up each return to the tonic, and the relative minor adds a \
         shaded interior color that keeps the loop from feeling static over many repeats."
            .to_string()
    }

    fn good_payload() -> String {
        json!({
            "chords": ["C", "G", {"name": "Am"}, "F", "Em", {"name": "Dm", "notation": "D-"}],
            "insights": [long_insight(), long_insight(), long_insight()],
            "numerals": ["I", "V", "vi", "IV", "iii", "ii"],
        })
        .to_string()
    }

    fn orchestrator(model: impl ChordModel + 'static) -> GenerationOrchestrator {
        GenerationOrchestrator::new(Arc::new(model))
    }

    #[tokio::test]
    async fn accepted_model_output_is_normalized() {
        let result = orchestrator(CannedModel(good_payload()))
            .generate(&GenerationParams::default())
            .await;

        assert_eq!(result.source, GenerationSource::Model);
        assert_eq!(result.chords, vec!["C", "G", "Am", "F", "Em", "Dm"]);
        assert_eq!(result.insights.len(), 3);
        assert_eq!(result.numerals.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn model_success_path_meets_the_ai_floor() {
        let result = orchestrator(CannedModel(good_payload()))
            .generate(&GenerationParams::default())
            .await;
        assert!(result.chords.len() >= crate::contract::MIN_CHORDS);
    }

    #[tokio::test]
    async fn model_error_falls_back() {
        let result = orchestrator(FailingModel)
            .generate(&GenerationParams::default())
            .await;

        assert_eq!(result.source, GenerationSource::Fallback);
        assert!(result.chords.len() >= 4);
        assert_eq!(result.insights.len(), 3);
    }

    #[tokio::test]
    async fn unparseable_json_falls_back() {
        let result = orchestrator(CannedModel("here are your chords: C, F, G".to_string()))
            .generate(&GenerationParams::default())
            .await;
        assert_eq!(result.source, GenerationSource::Fallback);
    }

    #[tokio::test]
    async fn rejected_structure_falls_back() {
        let payload = json!({
            "chords": ["C", "F"],
            "insights": [long_insight(), long_insight(), long_insight()],
        })
        .to_string();

        let result = orchestrator(CannedModel(payload))
            .generate(&GenerationParams::default())
            .await;
        assert_eq!(result.source, GenerationSource::Fallback);
    }

    #[tokio::test]
    async fn fallback_numerals_reconvert_to_chords() {
        let params = GenerationParams {
            key: "C".to_string(),
            scale: "major".to_string(),
            mood: "happy".to_string(),
            style: "pop".to_string(),
            starting_chord: None,
        };
        let result = orchestrator(FailingModel).generate(&params).await;

        assert_eq!(result.source, GenerationSource::Fallback);
        let numerals = result.numerals.expect("fallback carries numerals");
        assert_eq!(numerals.len(), result.chords.len());
        for (numeral, chord) in numerals.iter().zip(&result.chords) {
            let reconverted =
                voicing::roman_numeral_to_chord(numeral, "C", voicing::ScaleKind::Major).unwrap();
            assert_eq!(&reconverted.name(), chord);
        }
    }
}
