// src/ai/topics.rs
//! Topic proposal generation: one hot item in, up to five distinct
//! short-video topic angles out. Parsing tolerates format drift: the expected
//! `Topic N:` delimiter is tried first, naive line-splitting is the fallback.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ai::client::{ChatClient, ChatMessage};
use crate::ai::{json, AiError};

pub const MAX_TOPICS: usize = 5;

/// At most this many trending items feed one batch prompt.
const MAX_SEED_ITEMS: usize = 10;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicProposals {
    pub topics: Vec<String>,
    pub original_title: String,
}

fn build_prompt(title: &str, summary: Option<&str>, platform: Option<&str>) -> String {
    format!(
        r#"Goal:
You run an entertainment short-video account. From the trending item below,
produce {MAX_TOPICS} independent short-video topic proposals. Each proposal must cut in
from a different angle with no overlap between them, and each needs a
three-sentence explanation.

Trending item:
Title: {title}
Summary: {summary}
Platform: {platform}

Steps:
1. Extract the core tension or emotional hook behind the trend.
2. Generate {MAX_TOPICS} proposals with distinct angles, each a natural entry from the
   trend but heading somewhere different.
3. Compress each proposal into a one-line headline, then expand it in three
   sentences.

Output format:
Topic 1: [one-line headline]
Notes: [sentence one: the angle] [sentence two: the core point] [sentence three: why it spreads]

Topic 2: [one-line headline]
Notes: [sentence one: the angle] [sentence two: the core point] [sentence three: why it spreads]

...and so on, {MAX_TOPICS} topics in total."#,
        summary = summary.filter(|s| !s.is_empty()).unwrap_or("none"),
        platform = platform.filter(|s| !s.is_empty()).unwrap_or("unknown"),
    )
}

/// Split the model's free-text reply into discrete proposals. Blocks are
/// delimited by `Topic N:` headings; a leading block without `Notes:` is
/// treated as preamble and skipped. When no heading matches at all, fall back
/// to keeping the first few substantial lines.
pub fn parse_topics(content: &str) -> Vec<String> {
    static RE_HEADING: OnceCell<Regex> = OnceCell::new();
    let re = RE_HEADING.get_or_init(|| Regex::new(r"(?mi)^\s*Topic\s*\d+\s*:").unwrap());

    let mut topics: Vec<String> = Vec::new();
    let blocks: Vec<&str> = re.split(content).collect();
    for (i, block) in blocks.iter().enumerate() {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }
        if i == 0 && !block.contains("Notes:") {
            continue;
        }
        topics.push(format!("Topic {}: {}", topics.len() + 1, block));
        if topics.len() == MAX_TOPICS {
            break;
        }
    }

    if topics.is_empty() {
        topics = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && (l.contains("Topic") || l.chars().count() > 10))
            .take(MAX_TOPICS)
            .map(str::to_string)
            .collect();
    }

    topics
}

/// Trending item as handed to the batch topic prompts: just enough to cite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSeed {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
}

/// One planned topic: headline, angle, and the seed item ids it draws on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Topic {
    pub title: String,
    pub angle: String,
    #[serde(default)]
    pub refs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicBatch {
    pub topics: Vec<Topic>,
}

const BATCH_SYSTEM_PROMPT: &str = "You are a short-video topic planner. From \
today's trending items, produce 5 topics. Each topic needs a clear headline \
and a distinct cut-in angle; no two topics may share a narrative frame, and \
every topic must cite the ids of the trending items it draws on. Reply with \
JSON only, in this shape:\n\
{\"topics\": [{\"title\": \"headline\", \"angle\": \"angle description\", \"refs\": [\"item id\"]}]}";

/// Seed items that survive the exclusion list, capped for prompt size.
fn seed_items<'a>(items: &'a [TopicSeed], exclude_ids: &[String]) -> Vec<&'a TopicSeed> {
    items
        .iter()
        .filter(|it| !exclude_ids.contains(&it.id))
        .take(MAX_SEED_ITEMS)
        .collect()
}

fn seed_block(seeds: &[&TopicSeed]) -> Result<String, AiError> {
    let lines: String = seeds
        .iter()
        .map(|it| {
            format!(
                "- {} ({})\n",
                it.title,
                it.source_name.as_deref().unwrap_or("unknown")
            )
        })
        .collect();
    let details =
        serde_json::to_string_pretty(seeds).map_err(|e| AiError::Upstream(e.to_string()))?;
    Ok(format!(
        "Trending items:\n{lines}\nItem details:\n{details}"
    ))
}

/// Plan a fresh batch of topics over a set of trending items, skipping any
/// the user already dismissed.
pub async fn generate_topic_batch(
    client: &dyn ChatClient,
    items: &[TopicSeed],
    exclude_ids: &[String],
) -> Result<TopicBatch, AiError> {
    let seeds = seed_items(items, exclude_ids);
    let user_prompt = format!(
        "Generate 5 topics from the following trending items.\n\n{}",
        seed_block(&seeds)?
    );
    let response = client
        .chat(&[
            ChatMessage::system(BATCH_SYSTEM_PROMPT),
            ChatMessage::user(user_prompt),
        ])
        .await?;
    let batch: TopicBatch = json::parse_lenient(&response)?;
    if batch.topics.is_empty() {
        return Err(AiError::Unparseable);
    }
    tracing::debug!(topics = batch.topics.len(), "topic batch generated");
    Ok(batch)
}

/// Plan another batch while steering clear of topics the user already has.
pub async fn expand_topic_batch(
    client: &dyn ChatClient,
    items: &[TopicSeed],
    exclude_ids: &[String],
    existing: &[Topic],
) -> Result<TopicBatch, AiError> {
    let seeds = seed_items(items, exclude_ids);
    let existing_lines: String = existing
        .iter()
        .map(|t| format!("- {}: {}\n", t.title, t.angle))
        .collect();
    let user_prompt = format!(
        "Generate 5 completely new topics from the following trending items.\n\n\
         Existing topics (avoid overlapping with any of these):\n{existing_lines}\n\
         {}",
        seed_block(&seeds)?
    );
    let response = client
        .chat(&[
            ChatMessage::system(BATCH_SYSTEM_PROMPT),
            ChatMessage::user(user_prompt),
        ])
        .await?;
    let batch: TopicBatch = json::parse_lenient(&response)?;
    if batch.topics.is_empty() {
        return Err(AiError::Unparseable);
    }
    tracing::debug!(
        topics = batch.topics.len(),
        existing = existing.len(),
        "topic batch expanded"
    );
    Ok(batch)
}

pub async fn generate_topics(
    client: &dyn ChatClient,
    title: &str,
    summary: Option<&str>,
    platform: Option<&str>,
) -> Result<TopicProposals, AiError> {
    let prompt = build_prompt(title, summary, platform);
    let content = client.chat(&[ChatMessage::user(prompt)]).await?;
    let topics = parse_topics(&content);
    if topics.is_empty() {
        return Err(AiError::Unparseable);
    }
    tracing::debug!(count = topics.len(), "topics generated");
    Ok(TopicProposals {
        topics,
        original_title: title.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_reply_splits_into_numbered_topics() {
        let reply = "Here are some ideas.\n\
            Topic 1: The fandom angle\nNotes: One. Two. Three.\n\n\
            Topic 2: The industry angle\nNotes: One. Two. Three.\n\n\
            Topic 3: The nostalgia angle\nNotes: One. Two. Three.";
        let topics = parse_topics(reply);
        assert_eq!(topics.len(), 3);
        assert!(topics[0].starts_with("Topic 1: The fandom angle"));
        assert!(topics[2].starts_with("Topic 3: The nostalgia angle"));
    }

    #[test]
    fn at_most_five_topics_survive() {
        let reply = (1..=8)
            .map(|i| format!("Topic {i}: angle {i}\nNotes: a. b. c."))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(parse_topics(&reply).len(), MAX_TOPICS);
    }

    #[test]
    fn missing_delimiter_falls_back_to_line_split() {
        let reply = "An angle about the fans and their rituals\n\
            short\n\
            Another angle about the platform economics here";
        let topics = parse_topics(reply);
        assert_eq!(topics.len(), 2, "short line is dropped");
    }

    fn seed(id: &str) -> TopicSeed {
        TopicSeed {
            id: id.to_string(),
            title: format!("title {id}"),
            summary: None,
            source_name: Some("src".into()),
        }
    }

    #[test]
    fn seed_items_honor_exclusions_and_the_cap() {
        let items: Vec<TopicSeed> = (0..14).map(|i| seed(&format!("i{i}"))).collect();
        let excluded = vec!["i0".to_string(), "i3".to_string()];
        let kept = seed_items(&items, &excluded);
        assert_eq!(kept.len(), MAX_SEED_ITEMS);
        assert!(kept.iter().all(|it| it.id != "i0" && it.id != "i3"));
        assert_eq!(kept[0].id, "i1");
    }

    #[test]
    fn batch_json_deserializes_with_default_refs() {
        let batch: TopicBatch = serde_json::from_str(
            r#"{"topics": [{"title": "t", "angle": "a"}, {"title": "u", "angle": "b", "refs": ["x"]}]}"#,
        )
        .unwrap();
        assert_eq!(batch.topics.len(), 2);
        assert!(batch.topics[0].refs.is_empty());
        assert_eq!(batch.topics[1].refs, vec!["x"]);
    }

    #[test]
    fn renumbering_is_sequential_when_preamble_is_skipped() {
        let reply = "Let me think about this trend first...\n\
            Topic 1: A\nNotes: x. y. z.\n\
            Topic 2: B\nNotes: x. y. z.";
        let topics = parse_topics(reply);
        assert_eq!(topics.len(), 2);
        assert!(topics[0].starts_with("Topic 1: A"));
        assert!(topics[1].starts_with("Topic 2: B"));
    }
}
