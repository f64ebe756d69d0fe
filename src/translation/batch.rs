/*!
 * Batch prompt construction and response parsing.
 *
 * A batch is sent as a JSON array of source texts and the model is asked
 * to answer with a JSON array of the same length. Models do not always
 * comply, so parsing strips markdown fences, accepts a
 * `{"translations": [...]}` wrapper and falls back to the outermost
 * `[...]` span found in the output.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::errors::ProviderError;
use crate::language::Language;

/// Upper bound for the output token budget of one request
pub const MAX_OUTPUT_TOKENS: u32 = 4096;

/// Default system prompt. Placeholders: {source_language}, {target_language}
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional translator. Translate {source_language} text into {target_language} accurately while preserving meaning, tone, and formatting.
Your response must be a valid JSON array.
Rules:
1. Return format: [\"translation1\", \"translation2\", ...]
2. Use double quotes for strings and escape quotes, backslashes and newlines inside them
3. No extra text, no markdown, no code blocks, no explanations
4. Exactly the same number of elements as the input, in the same order
5. Preserve formatting (newlines, bullets, numbering) in each translation";

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*```[a-zA-Z]*\s*$").unwrap());
static JSON_ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\[.*\]").unwrap());

/// Fill the language placeholders of a system prompt template
pub fn build_system_prompt(template: &str, source: Language, target: Language) -> String {
    template
        .replace("{source_language}", source.english_name())
        .replace("{target_language}", target.english_name())
}

/// User message carrying the texts as a JSON array
pub fn build_user_prompt(texts: &[String], source: Language, target: Language) -> String {
    let payload = serde_json::to_string(texts).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Translate these {count} {source} text(s) to {target}. Return ONLY a valid JSON array with exactly {count} translation(s):\n{payload}",
        count = texts.len(),
        source = source.english_name(),
        target = target.english_name(),
        payload = payload,
    )
}

/// Output budget: roughly twice the input length plus headroom, capped
pub fn estimate_max_tokens(texts: &[String], cap: u32) -> u32 {
    let input_chars: usize = texts.iter().map(|t| t.chars().count()).sum();
    let estimate = input_chars.saturating_mul(2).saturating_add(500);
    u32::try_from(estimate).unwrap_or(u32::MAX).min(cap)
}

/// Parse a model answer into one optional translation per input.
///
/// Elements that are `null`, blank or not strings become `None`. A response
/// that is not an array, or whose length differs from `expected`, is an
/// error because positions can no longer be trusted.
pub fn parse_translations(raw: &str, expected: usize) -> Result<Vec<Option<String>>, ProviderError> {
    let items = extract_array(raw).ok_or_else(|| {
        ProviderError::MalformedResponse(format!(
            "no JSON array in response: {}",
            crate::translation::cache::truncate_text(raw.trim(), 120)
        ))
    })?;

    if items.len() != expected {
        return Err(ProviderError::MalformedResponse(format!(
            "expected {} translation(s), got {}",
            expected,
            items.len()
        )));
    }

    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::String(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        })
        .collect())
}

fn extract_array(raw: &str) -> Option<Vec<Value>> {
    if let Some(items) = parse_array_value(raw.trim()) {
        return Some(items);
    }

    let unfenced = CODE_FENCE.replace_all(raw, "");
    if let Some(items) = parse_array_value(unfenced.trim()) {
        debug!("Recovered JSON array after stripping code fences");
        return Some(items);
    }

    let span = JSON_ARRAY.find(&unfenced)?;
    debug!("Recovered JSON array from surrounding text");
    parse_array_value(span.as_str())
}

fn parse_array_value(text: &str) -> Option<Vec<Value>> {
    match serde_json::from_str::<Value>(text).ok()? {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => match map.remove("translations") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}
