//! Reusable prompts using Handlebars for templating. Handlebars adds
//! additional security controls since it can't do much out of the box
//! without registering your own helpers. This is ideal since output
//! from LLMs should be considered untrusted and Handlebars forces you
//! to add only what you need.

use std::fmt;
use std::sync::LazyLock;

use anyhow::Result;
use handlebars::{Handlebars, handlebars_helper};
use serde::Serialize;

use crate::openai::Role;

// Joins a list of strings with ", " for inline rendering
handlebars_helper!(join: |v: array| v
    .iter()
    .filter_map(|i| i.as_str())
    .collect::<Vec<&str>>()
    .join(", "));

#[derive(Debug, Clone, Copy)]
pub enum Prompt {
    Reply,
    DiagnosedReply,
    DiagnosisSummary,
    Emotions,
    CopingStrategies,
    WindowedReply,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const REPLY_PROMPT: &str = r"<s>[INST] The conversation so far in **Markdown**:

{{context}}

Please respond in **Markdown** with an empathetic and supportive message that includes the following sections:

- **Your Feelings:** Validate your current emotional state.
- **Next Steps:** Provide one or two useful suggestions seamlessly integrated into the text.
- **Reflection:** Ask a reflective question to encourage further sharing.

Avoid using explicit labels like 'Actionable Tip' or 'Open-Ended Question.' Use headers, bullet points, **bold** text, and *italics* where it helps clarity. [/INST]";

const DIAGNOSED_REPLY_PROMPT: &str = r"<s>[INST] The conversation so far in **Markdown**:

{{context}}

Given the **diagnosis** with conditions: {{join conditions}} and severity: **{{severity}}**, please respond in **Markdown** with an empathetic message that includes the following sections:

- **Your Feelings:** Briefly acknowledge and validate your current emotional state.
- **Next Steps:** Provide one or two coping suggestions or strategies naturally integrated into the text.
- **Reflection:** Pose a thoughtful, open-ended question to guide further discussion.

Use headers, bullet lists, **bold**, and *italics* as appropriate. [/INST]";

const DIAGNOSIS_SUMMARY_PROMPT: &str = r"<s>[INST] Based on the conversation below, provide a **diagnosis summary** in **Markdown**. Include a list of potential **conditions**, a **severity** score (1-5), and a **confidence** percentage (0-100%).

### Conversation Log
{{context}}

**Diagnosis Summary:**
- **Conditions:**
- **Severity:**
- **Confidence:**

Fill in the details accordingly. [/INST]";

const EMOTIONS_PROMPT: &str = r#"<s>[INST] Analyze the following message and list the primary emotions in **Markdown** bullet points (e.g., **anxiety**, **stress**, **sadness**, **grief**):

"{{context}}"

Respond only with the list. [/INST]"#;

const COPING_STRATEGIES_PROMPT: &str = r"<s>[INST] Based on the following diagnosis details in **Markdown**:

- **Emotions:** {{join emotions}}
- **Conditions:** {{join conditions}}
- **Severity:** {{severity}}

Provide **three actionable coping strategies** in **Markdown**. Format your answer using bullet points and integrate a brief explanation for each suggestion. Please do not use explicit labels for the sections; instead, structure the response with user-friendly headings. [/INST]";

const WINDOWED_REPLY_PROMPT: &str = r"The conversation so far:

{{context}}

Reply to the user's latest message as the Assistant. Keep the tone warm and supportive.";

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    // Prompts are plain text, not HTML
    registry.register_escape_fn(handlebars::no_escape);
    registry.register_helper("join", Box::new(join));
    for (prompt, template) in [
        (Prompt::Reply, REPLY_PROMPT),
        (Prompt::DiagnosedReply, DIAGNOSED_REPLY_PROMPT),
        (Prompt::DiagnosisSummary, DIAGNOSIS_SUMMARY_PROMPT),
        (Prompt::Emotions, EMOTIONS_PROMPT),
        (Prompt::CopingStrategies, COPING_STRATEGIES_PROMPT),
        (Prompt::WindowedReply, WINDOWED_REPLY_PROMPT),
    ] {
        registry
            .register_template_string(&prompt.to_string(), template)
            .expect("Failed to register template");
    }
    registry
}

static TEMPLATES: LazyLock<Handlebars<'static>> = LazyLock::new(templates);

/// Renders `prompt` with `data`.
pub fn render<T: Serialize>(prompt: Prompt, data: &T) -> Result<String> {
    Ok(TEMPLATES.render(&prompt.to_string(), data)?)
}

/// Renders a transcript as `**Role**: content` lines, the format every
/// prompt uses for conversation context.
pub fn transcript_context<'a, I>(messages: I) -> String
where
    I: IntoIterator<Item = (Role, &'a str)>,
{
    messages
        .into_iter()
        .map(|(role, content)| format!("**{}**: {}", role.label(), content))
        .collect::<Vec<String>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transcript_context() {
        let context = transcript_context(vec![
            (Role::User, "I can't sleep"),
            (Role::Assistant, "That sounds hard."),
        ]);
        assert_eq!(context, "**User**: I can't sleep\n**Assistant**: That sounds hard.");
    }

    #[test]
    fn test_render_does_not_html_escape() {
        let out = render(Prompt::Reply, &json!({"context": "**User**: it's \"fine\" <3"})).unwrap();
        assert!(out.contains("**User**: it's \"fine\" <3"));
    }

    #[test]
    fn test_render_diagnosed_reply_joins_conditions() {
        let out = render(
            Prompt::DiagnosedReply,
            &json!({"context": "", "conditions": ["Anxiety", "Insomnia"], "severity": 4}),
        )
        .unwrap();
        assert!(out.contains("conditions: Anxiety, Insomnia and severity: **4**"));
    }

    #[test]
    fn test_render_strict_mode_rejects_missing_fields() {
        assert!(render(Prompt::CopingStrategies, &json!({"emotions": []})).is_err());
    }
}
