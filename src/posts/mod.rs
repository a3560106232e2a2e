use serde_json::Value;

use crate::errors::ShapeError;
use crate::wire::{PostBatch, PostDraft};

/// Validate a parsed model reply into a [`PostBatch`].
///
/// - The value must be an array.
/// - Every entry must be an object with exactly `title` and `content`,
///   both non-blank strings.
/// - There must be exactly six entries.
///
/// Entries are checked before the count so a malformed entry is reported by
/// index even when the array is also the wrong length.
pub fn parse_batch(value: Value) -> Result<PostBatch, ShapeError> {
    let Value::Array(items) = value else {
        return Err(ShapeError::NotAList);
    };

    let mut drafts = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        drafts.push(parse_entry(index, item)?);
    }

    if drafts.len() != PostBatch::LEN {
        return Err(ShapeError::Count { expected: PostBatch::LEN, found: drafts.len() });
    }
    Ok(PostBatch::from_checked(drafts))
}

fn parse_entry(index: usize, item: Value) -> Result<PostDraft, ShapeError> {
    let entry_err = |reason: String| ShapeError::Entry { index, reason };

    let Value::Object(mut map) = item else {
        return Err(entry_err("not an object".into()));
    };

    let title = take_text(&mut map, "title").map_err(entry_err)?;
    let content = take_text(&mut map, "content").map_err(entry_err)?;

    if !map.is_empty() {
        let mut extra: Vec<&str> = map.keys().map(String::as_str).collect();
        extra.sort_unstable();
        return Err(entry_err(format!("unexpected field(s): {}", extra.join(", "))));
    }

    Ok(PostDraft { title, content })
}

fn take_text(map: &mut serde_json::Map<String, Value>, key: &str) -> Result<String, String> {
    match map.remove(key) {
        None => Err(format!("missing \"{key}\"")),
        Some(Value::String(s)) if s.trim().is_empty() => Err(format!("\"{key}\" is empty")),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(_) => Err(format!("\"{key}\" is not a string")),
    }
}

/// Indices of drafts whose content exceeds `limit` characters.
/// The limit is advisory, so callers only warn about these.
pub fn over_limit(batch: &PostBatch, limit: usize) -> Vec<usize> {
    batch
        .iter()
        .enumerate()
        .filter(|(_, d)| d.char_count() > limit)
        .map(|(i, _)| i)
        .collect()
}
