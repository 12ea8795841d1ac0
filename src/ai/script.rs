// src/ai/script.rs
//! Script generation: one chosen topic plus a style produce a ~400-word
//! spoken short-video script. Styles come from a fixed basic set, a named
//! persona preset, or pass through as a free-text label.

use serde::{Deserialize, Serialize};

use crate::ai::client::{BochaSearchClient, ChatClient, ChatMessage};
use crate::ai::topics::TopicSeed;
use crate::ai::AiError;

/// Plain tone labels: mapped to a one-line style instruction.
pub const BASIC_STYLES: &[&str] = &["humorous", "serious", "emotional", "suspense", "casual"];

/// Named persona presets with a fuller instruction block.
pub const STYLE_PRESETS: &[(&str, &str)] = &[
    (
        "gossip-insider",
        "Persona: an entertainment-industry insider dishing to close friends. \
         Speak in the first person, drop small knowing details, keep sentences \
         short and punchy, and land every beat with a hook to the next one.",
    ),
    (
        "calm-analyst",
        "Persona: a level-headed commentator who has seen every hype cycle. \
         Walk through the facts in order, flag what is verified versus rumor, \
         and close with one measured takeaway the viewer can repeat.",
    ),
    (
        "hype-narrator",
        "Persona: a high-energy narrator for countdown-style videos. Open with \
         the most dramatic fact, escalate fast, use direct address (\"you\"), \
         and end on a cliffhanger question for the comments.",
    ),
];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRequest {
    pub original_title: String,
    #[serde(default)]
    pub original_summary: Option<String>,
    pub selected_topic: String,
    #[serde(default)]
    pub topic_description: Option<String>,
    #[serde(default)]
    pub selected_style: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    /// Optional web-search context to ground the script in current facts.
    #[serde(default)]
    pub search_results: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptOut {
    pub content: String,
    pub selected_topic: String,
    pub original_title: String,
}

/// Resolve a style label into its instruction prefix. Unknown labels pass
/// through as a free-text persona description.
pub fn style_instruction(style: &str) -> String {
    let style = style.trim();
    if style.is_empty() {
        return "Write in a neutral, engaging tone.".to_string();
    }
    if BASIC_STYLES.iter().any(|s| s.eq_ignore_ascii_case(style)) {
        return format!("Write in a {style} style.");
    }
    if let Some((_, preset)) = STYLE_PRESETS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(style))
    {
        return (*preset).to_string();
    }
    format!("Adopt the following persona/style: {style}")
}

fn build_prompt(req: &ScriptRequest) -> String {
    let style = style_instruction(req.selected_style.as_deref().unwrap_or_default());
    let search_block = req
        .search_results
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| format!("[Latest search context]\n{s}\n\n"))
        .unwrap_or_default();
    let grounding_note = if search_block.is_empty() {
        ""
    } else {
        "Work the search context in so the facts are current and accurate.\n\n"
    };

    format!(
        "{style}\n\n\
         Now write a short-video script from the following material:\n\n\
         [Original trending item]\n\
         Title: {title}\n\
         Summary: {summary}\n\n\
         {search_block}\
         [Chosen topic]\n\
         {topic}\n\n\
         [Topic notes]\n\
         {notes}\n\n\
         [Platform] {platform}\n\n\
         Stay on the chosen topic, keep the persona and style above, and aim \
         for roughly 400 words of spoken script that reads naturally aloud.\n\n\
         {grounding_note}\
         Output the complete word-for-word script only, no section labels.",
        title = req.original_title,
        summary = req.original_summary.as_deref().unwrap_or("none"),
        topic = req.selected_topic,
        notes = req.topic_description.as_deref().unwrap_or("none"),
        platform = req.platform.as_deref().unwrap_or("general"),
    )
}

pub async fn generate_script(
    client: &dyn ChatClient,
    req: &ScriptRequest,
) -> Result<ScriptOut, AiError> {
    let prompt = build_prompt(req);
    let content = client.chat(&[ChatMessage::user(prompt)]).await?;
    Ok(ScriptOut {
        content,
        selected_topic: req.selected_topic.clone(),
        original_title: req.original_title.clone(),
    })
}

// ------------------------------------------------------------
// One-call draft composition: keywords -> web search -> script
// ------------------------------------------------------------

/// Planned-topic script request: the topic carries its seed refs, and the
/// submitted trending items supply the context for those refs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRequest {
    pub topic: DraftTopic,
    pub style: String,
    #[serde(default)]
    pub hot_items: Vec<TopicSeed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DraftTopic {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub angle: String,
    #[serde(default)]
    pub refs: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: String,
    pub topic_id: String,
    pub content: String,
    pub style: String,
    pub created_at: String,
    pub finalized: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftOut {
    pub draft: Draft,
}

/// Search keywords from a topic: alphanumeric runs (CJK included) longer than
/// one character, capped at five.
pub fn extract_keywords(title: &str, angle: &str) -> String {
    let text = format!("{title} {angle}");
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() > 1)
        .take(5)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compose a draft in one call: extract keywords from the topic, ground them
/// with a web search (best effort; a failed search degrades to a placeholder
/// note rather than failing the draft), then generate the script.
pub async fn compose_draft(
    chat: &dyn ChatClient,
    search: &BochaSearchClient,
    req: &DraftRequest,
) -> Result<DraftOut, AiError> {
    let keywords = extract_keywords(&req.topic.title, &req.topic.angle);
    let search_summary = match search.web_search(&keywords, 10).await {
        Ok(resp) => resp
            .summary
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "No recent results found.".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "draft grounding search failed");
            "Search temporarily unavailable.".to_string()
        }
    };

    let related: String = req
        .hot_items
        .iter()
        .filter(|it| req.topic.refs.contains(&it.id))
        .map(|it| format!("- {}: {}\n", it.title, it.summary.as_deref().unwrap_or("")))
        .collect();

    let style = style_instruction(&req.style);
    let user_prompt = format!(
        "Topic:\n\
         Title: {title}\n\
         Angle: {angle}\n\n\
         Related trending items:\n{related}\n\
         Background search summary:\n{search_summary}\n\n\
         From the material above, write roughly 400 words of spoken \
         short-video script that reads naturally aloud. Output the complete \
         word-for-word script only, no section labels.",
        title = req.topic.title,
        angle = req.topic.angle,
    );

    let content = chat
        .chat(&[ChatMessage::system(style), ChatMessage::user(user_prompt)])
        .await?;

    let now = chrono::Utc::now();
    let now_ms = now.timestamp_millis();
    Ok(DraftOut {
        draft: Draft {
            id: format!("draft_{now_ms}"),
            topic_id: req
                .topic
                .id
                .clone()
                .unwrap_or_else(|| format!("topic_{now_ms}")),
            content,
            style: req.style.clone(),
            created_at: now.to_rfc3339(),
            finalized: false,
        },
    })
}
