//! Turns a conversation into a structured diagnosis and a list of
//! coping strategies by asking the model and parsing its free text
//! answer. Parsing never fails: anything missing or malformed falls
//! back to fixed defaults.

use anyhow::Result;
use serde_json::json;

use super::gateway::{Inference, generate_or_fallback};
use super::prompt::{Prompt, render, transcript_context};
use crate::chat::models::{Diagnosis, Message};

const CONDITIONS_LABEL: &str = "- **Conditions:**";
const SEVERITY_LABEL: &str = "- **Severity:**";
const CONFIDENCE_LABEL: &str = "- **Confidence:**";

pub const DEFAULT_CONDITION: &str = "General stress";
pub const DEFAULT_SEVERITY: i64 = 3;
pub const DEFAULT_CONFIDENCE: i64 = 80;

/// The labeled fields of a diagnosis summary response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisSummary {
    pub conditions: Vec<String>,
    pub severity: i64,
    pub confidence: i64,
}

impl Default for DiagnosisSummary {
    fn default() -> Self {
        Self {
            conditions: vec![DEFAULT_CONDITION.to_string()],
            severity: DEFAULT_SEVERITY,
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl DiagnosisSummary {
    /// Reads the first `- **Conditions:**`, `- **Severity:**` and
    /// `- **Confidence:**` lines of `text`. A missing line uses that
    /// field's default. A severity or confidence that is present but
    /// not an integer discards the whole summary in favor of the
    /// defaults.
    pub fn parse(text: &str) -> Self {
        match Self::try_parse(text) {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!("Diagnosis parsing error: {}", e);
                Self::default()
            }
        }
    }

    fn try_parse(text: &str) -> Result<Self> {
        let conditions = match labeled_value(text, CONDITIONS_LABEL) {
            Some(raw) => split_conditions(raw),
            None => vec![DEFAULT_CONDITION.to_string()],
        };
        let severity = match labeled_value(text, SEVERITY_LABEL) {
            Some(raw) => raw.parse::<i64>()?,
            None => DEFAULT_SEVERITY,
        };
        let confidence = match labeled_value(text, CONFIDENCE_LABEL) {
            Some(raw) => raw.replace('%', "").trim().parse::<i64>()?,
            None => DEFAULT_CONFIDENCE,
        };

        Ok(Self {
            conditions,
            severity,
            confidence,
        })
    }
}

// Text after `label` on the first line that starts with it
fn labeled_value<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    text.lines()
        .find_map(|line| line.strip_prefix(label))
        .map(str::trim)
}

fn split_conditions(raw: &str) -> Vec<String> {
    let conditions: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect();
    if conditions.is_empty() {
        vec![DEFAULT_CONDITION.to_string()]
    } else {
        conditions
    }
}

/// Collects `-` bullet lines with the bullet markers stripped. When
/// there are none the whole response becomes the only item.
pub fn parse_bullets(text: &str) -> Vec<String> {
    let items: Vec<String> = text
        .lines()
        .filter(|line| line.starts_with('-'))
        .map(|line| line.trim_matches(|c| c == '-' || c == ' ').trim().to_string())
        .collect();
    if items.is_empty() {
        vec![text.trim().to_string()]
    } else {
        items
    }
}

/// Forms a diagnosis from the full message history. Makes two backend
/// calls: one for the summary fields and one for the emotion labels.
pub async fn diagnose(
    backend: &dyn Inference,
    system: &str,
    history: &[Message],
) -> Result<Diagnosis> {
    let context = transcript_context(history.iter().map(|m| (m.role, m.content.as_str())));

    let summary_prompt = render(Prompt::DiagnosisSummary, &json!({ "context": context }))?;
    let emotions_prompt = render(Prompt::Emotions, &json!({ "context": context }))?;

    let summary = match backend.generate(system, &summary_prompt).await {
        Ok(text) => DiagnosisSummary::parse(&text),
        Err(e) => {
            tracing::error!("Diagnosis request failed, using defaults: {}", e);
            DiagnosisSummary::default()
        }
    };
    let emotions = parse_bullets(&generate_or_fallback(backend, system, &emotions_prompt).await);

    Ok(Diagnosis {
        emotions,
        conditions: summary.conditions,
        severity: summary.severity,
        confidence: summary.confidence,
    })
}

/// Asks for coping strategies tailored to `diagnosis`.
pub async fn coping_strategies(
    backend: &dyn Inference,
    system: &str,
    diagnosis: &Diagnosis,
) -> Result<Vec<String>> {
    let prompt = render(
        Prompt::CopingStrategies,
        &json!({
            "emotions": diagnosis.emotions,
            "conditions": diagnosis.conditions,
            "severity": diagnosis.severity,
        }),
    )?;
    let response = generate_or_fallback(backend, system, &prompt).await;
    Ok(parse_bullets(&response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::ScriptedInference;
    use crate::openai::{CONNECTION_FALLBACK, Role};

    #[test]
    fn it_parses_a_complete_summary() {
        let text = "**Diagnosis Summary:**\n- **Conditions:** Anxiety, Insomnia\n- **Severity:** 4\n- **Confidence:** 75%\n";
        let summary = DiagnosisSummary::parse(text);
        assert_eq!(summary.conditions, vec!["Anxiety", "Insomnia"]);
        assert_eq!(summary.severity, 4);
        assert_eq!(summary.confidence, 75);
    }

    #[test]
    fn it_defaults_missing_fields_individually() {
        let summary = DiagnosisSummary::parse("- **Severity:** 2");
        assert_eq!(summary.conditions, vec![DEFAULT_CONDITION]);
        assert_eq!(summary.severity, 2);
        assert_eq!(summary.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn it_falls_back_entirely_on_unparsable_severity() {
        let text = "- **Conditions:** Grief\n- **Severity:** high\n- **Confidence:** 90%";
        assert_eq!(DiagnosisSummary::parse(text), DiagnosisSummary::default());
    }

    #[test]
    fn it_falls_back_entirely_on_unparsable_confidence() {
        let text = "- **Conditions:** Grief\n- **Severity:** 5\n- **Confidence:** very";
        assert_eq!(DiagnosisSummary::parse(text), DiagnosisSummary::default());
    }

    #[test]
    fn it_keeps_out_of_range_values() {
        let text = "- **Severity:** 9\n- **Confidence:** 250%";
        let summary = DiagnosisSummary::parse(text);
        assert_eq!(summary.severity, 9);
        assert_eq!(summary.confidence, 250);
    }

    #[test]
    fn it_uses_the_first_matching_line() {
        let text = "- **Severity:** 1\n- **Severity:** 5";
        assert_eq!(DiagnosisSummary::parse(text).severity, 1);
    }

    #[test]
    fn it_defaults_empty_conditions() {
        let summary = DiagnosisSummary::parse("- **Conditions:**   \n- **Severity:** 3");
        assert_eq!(summary.conditions, vec![DEFAULT_CONDITION]);
    }

    #[test]
    fn it_parses_bullets() {
        let text = "Here you go:\n- **anxiety**\n- stress -\nnot a bullet\n-sadness";
        assert_eq!(
            parse_bullets(text),
            vec!["**anxiety**", "stress", "sadness"]
        );
    }

    #[test]
    fn it_uses_whole_response_without_bullets() {
        assert_eq!(parse_bullets("  Mostly tired.  \n"), vec!["Mostly tired."]);
    }

    #[tokio::test]
    async fn it_diagnoses_from_two_backend_calls() {
        let backend = ScriptedInference::new(vec![
            Ok("- **Conditions:** Burnout\n- **Severity:** 4\n- **Confidence:** 70%".to_string()),
            Ok("- exhaustion\n- frustration".to_string()),
        ]);
        let history = vec![Message::new(Role::User, "Work is too much")];

        let diagnosis = diagnose(&backend, "sys", &history).await.unwrap();

        assert_eq!(diagnosis.conditions, vec!["Burnout"]);
        assert_eq!(diagnosis.severity, 4);
        assert_eq!(diagnosis.confidence, 70);
        assert_eq!(diagnosis.emotions, vec!["exhaustion", "frustration"]);
        let prompts = backend.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("**User**: Work is too much"));
        assert!(prompts[1].contains("primary emotions"));
    }

    #[tokio::test]
    async fn it_degrades_when_the_backend_is_down() {
        let backend = ScriptedInference::failing();
        let history = vec![Message::new(Role::User, "hello")];

        let diagnosis = diagnose(&backend, "sys", &history).await.unwrap();
        assert_eq!(diagnosis.conditions, vec![DEFAULT_CONDITION]);
        assert_eq!(diagnosis.severity, DEFAULT_SEVERITY);
        assert_eq!(diagnosis.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(diagnosis.emotions, vec![CONNECTION_FALLBACK]);

        let strategies = coping_strategies(&backend, "sys", &diagnosis).await.unwrap();
        assert_eq!(strategies, vec![CONNECTION_FALLBACK]);
    }

    #[tokio::test]
    async fn it_parses_coping_strategies() {
        let backend = ScriptedInference::new(vec![Ok(
            "### Try these\n- Box breathing: four counts each\n- Short walks\n- Journaling".to_string(),
        )]);
        let diagnosis = Diagnosis {
            emotions: vec![String::from("worry")],
            conditions: vec![String::from("Anxiety")],
            severity: 3,
            confidence: 80,
        };

        let strategies = coping_strategies(&backend, "sys", &diagnosis).await.unwrap();
        assert_eq!(strategies.len(), 3);
        assert_eq!(strategies[0], "Box breathing: four counts each");
        assert!(backend.prompts()[0].contains("- **Conditions:** Anxiety"));
    }
}
