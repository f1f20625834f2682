//! Errors at the input boundary
//!
//! Normalization and threading never fail; only reading input does.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use thiserror::Error;

use crate::models::{RawComment, RawPost};

/// Input shape errors
#[derive(Error, Debug)]
pub enum Error {
    /// The document is not a JSON array (or an object wrapping one)
    #[error("Expected a JSON array of {0}")]
    NotAnArray(&'static str),

    /// A post entry is not a JSON object
    #[error("Post at index {0} is not a JSON object")]
    NotAnObject(usize),
}

/// Pull the list out of a response body: a bare array, or an object with
/// the list under `key` (e.g. `{"posts": [...]}`).
fn extract_list(value: Value, key: &str, what: &'static str) -> Result<Vec<Value>, Error> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(Error::NotAnArray(what)),
        },
        _ => Err(Error::NotAnArray(what)),
    }
}

/// Parse a posts response body
pub fn parse_posts_json(body: &str) -> Result<Vec<RawPost>> {
    let value: Value = serde_json::from_str(body).context("Failed to parse posts JSON")?;
    let items = extract_list(value, "posts", "posts")?;

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(map) => Ok(RawPost(map)),
            _ => Err(anyhow::Error::from(Error::NotAnObject(idx))),
        })
        .collect()
}

/// Parse a comments response body; malformed entries degrade, they never fail the body
pub fn parse_comments_json(body: &str) -> Result<Vec<RawComment>> {
    let value: Value = serde_json::from_str(body).context("Failed to parse comments JSON")?;
    let items = extract_list(value, "comments", "comments")?;
    Ok(items.into_iter().map(RawComment::from_value).collect())
}

/// Read a file (or stdin for `-`) into a string
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Load posts from a file
pub fn load_posts_json(path: &Path) -> Result<Vec<RawPost>> {
    parse_posts_json(&read_input(path)?)
}

/// Load comments from a file
pub fn load_comments_json(path: &Path) -> Result<Vec<RawComment>> {
    parse_comments_json(&read_input(path)?)
}
