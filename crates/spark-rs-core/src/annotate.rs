//! Extract corrections, score and suggestions from a model reply.
//!
//! A strict JSON envelope is preferred. Replies that are not a valid envelope
//! go through the inline tag extractor, which never fails: a missing or
//! malformed tag leaves its field unset.

use crate::text::cached_regex;
use log::debug;
use regex::Regex;
use serde::Deserialize;
use spark_rs_protocol::AiResponse;
use std::sync::OnceLock;

const MAX_SCORE: u8 = 10;

static CORRECTION_RE: OnceLock<Option<Regex>> = OnceLock::new();
static SCORE_RE: OnceLock<Option<Regex>> = OnceLock::new();
static SUGGESTIONS_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// Annotate a raw reply.
pub fn annotate(raw: &str) -> AiResponse {
    match parse_envelope(raw) {
        Some(response) => response,
        None => parse_tags(raw),
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    reply: String,
    #[serde(default)]
    corrections: Vec<String>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    suggestions: Vec<String>,
}

/// Decode the JSON envelope; `None` when the reply is not one or fails validation.
pub fn parse_envelope(raw: &str) -> Option<AiResponse> {
    let trimmed = raw.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    let envelope: Envelope = match serde_json::from_str(trimmed) {
        Ok(envelope) => envelope,
        Err(err) => {
            debug!("reply is not a JSON envelope (err={})", err);
            return None;
        }
    };
    if envelope.reply.trim().is_empty() {
        return None;
    }
    let score = match envelope.score {
        Some(score) if (0.0..=f64::from(MAX_SCORE)).contains(&score) => Some(score.round() as u8),
        Some(_) => return None,
        None => None,
    };
    Some(AiResponse {
        content: envelope.reply,
        corrections: non_empty(envelope.corrections),
        score,
        suggestions: non_empty(envelope.suggestions),
    })
}

/// Inline tag extraction; the reply text is kept as-is.
pub fn parse_tags(raw: &str) -> AiResponse {
    let corrections = cached_regex(&CORRECTION_RE, r"\[CORRECTION\]([\s\S]*?)\[/CORRECTION\]")
        .and_then(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
        .map(|found| vec![found.as_str().trim().to_string()]);

    let score = cached_regex(&SCORE_RE, r"\[SCORE\](\d+)/10\[/SCORE\]")
        .and_then(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
        .and_then(|found| found.as_str().parse::<u8>().ok())
        .filter(|score| *score <= MAX_SCORE);

    let suggestions = cached_regex(&SUGGESTIONS_RE, r"\[SUGGESTIONS\]([\s\S]*?)\[/SUGGESTIONS\]")
        .and_then(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
        .map(|found| {
            found
                .as_str()
                .split('\n')
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        });

    AiResponse {
        content: raw.to_string(),
        corrections,
        score,
        suggestions,
    }
}

fn non_empty(items: Vec<String>) -> Option<Vec<String>> {
    let items: Vec<String> = items
        .into_iter()
        .filter(|item| !item.trim().is_empty())
        .collect();
    (!items.is_empty()).then_some(items)
}
