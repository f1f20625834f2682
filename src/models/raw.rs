//! Server-shaped records as they arrive over HTTP

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Accepted keys for the liked-users list
pub const LIKED_USERS_KEYS: &[&str] = &["_liked_users", "likedUserIds", "liked_user_ids"];
/// Accepted keys for the "liked by current user" flag
pub const LIKED_FLAG_KEYS: &[&str] = &["liked_by_user", "likedByCurrentUser", "liked_by_current_user"];
/// Accepted keys for the repost count
pub const REPOST_COUNT_KEYS: &[&str] = &["repost_count", "repostCount"];
/// Accepted keys for the reposting user
pub const REPOSTED_BY_KEYS: &[&str] = &["reposted_by_users", "repostedByUser", "reposted_by_user"];
/// Accepted keys for the tagged people list
pub const TAG_KEYS: &[&str] = &["tag_people", "tagPeople"];
/// Accepted keys for the likes count
pub const LIKES_COUNT_KEYS: &[&str] = &["likes_count", "likesCount", "likes"];
/// Accepted keys for the comments count
pub const COMMENTS_COUNT_KEYS: &[&str] = &["comments_count", "commentsCount"];

/// A raw post: a JSON object with an optional nested `fields` bag.
///
/// Lookups try each accepted key at the top level first, then under `fields`.
/// `null` counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPost(pub Map<String, Value>);

impl RawPost {
    /// Wrap a decoded JSON value; non-objects become an empty post.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// The nested `fields` bag, if it is an object
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        self.0.get("fields").and_then(Value::as_object)
    }

    /// Look up a top-level value only
    pub fn top(&self, keys: &[&str]) -> Option<&Value> {
        lookup(&self.0, keys)
    }

    /// Look up a value under `fields` only
    pub fn nested(&self, keys: &[&str]) -> Option<&Value> {
        self.fields().and_then(|fields| lookup(fields, keys))
    }

    /// Top-level value, falling back to the `fields` copy
    pub fn get(&self, keys: &[&str]) -> Option<&Value> {
        self.top(keys).or_else(|| self.nested(keys))
    }

    /// `fields` value, falling back to the top-level copy
    pub fn get_nested_first(&self, keys: &[&str]) -> Option<&Value> {
        self.nested(keys).or_else(|| self.top(keys))
    }

    /// Embedded raw comments. Every entry yields a comment, see
    /// [`RawComment::from_value`].
    pub fn comments(&self) -> Option<Vec<RawComment>> {
        let items = self.get(&["comments"])?.as_array()?;
        Some(items.iter().cloned().map(RawComment::from_value).collect())
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

/// A raw comment record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawComment {
    /// String or numeric id
    #[serde(default, alias = "comment_id")]
    pub id: Value,
    /// Body; may carry entity- or curly-encoded emoji
    #[serde(default, alias = "comment_content", deserialize_with = "de_text")]
    pub content: String,
    /// Server timestamp
    #[serde(default, alias = "comment_date", deserialize_with = "de_text")]
    pub date: String,
    /// Parent reference, see [`crate::decode::normalize_parent_id`]
    #[serde(default, alias = "parentId", alias = "comment_parent")]
    pub parent_id: Value,
    /// Display name
    #[serde(default, alias = "comment_author", deserialize_with = "de_text")]
    pub author: String,
    /// Author user id (string or number)
    #[serde(default, alias = "authorUserId", alias = "user_id")]
    pub author_user_id: Value,
    /// Avatar URL
    #[serde(default, alias = "authorAvatarUrl", deserialize_with = "de_opt_url")]
    pub author_avatar_url: Option<String>,
}

impl RawComment {
    /// Decode one entry of a comments list without ever rejecting it.
    ///
    /// Non-objects become an empty comment. An object serde still rejects
    /// (e.g. both `parent_id` and `parentId` present) keeps its id, parent
    /// and content and drops the rest.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(map) = value else {
            tracing::debug!("Comment entry is not an object: {value}");
            return Self::default();
        };

        match serde_json::from_value(Value::Object(map.clone())) {
            Ok(comment) => comment,
            Err(e) => {
                tracing::debug!("Comment record partly malformed ({e}), keeping core fields");
                let text = |keys: &[&str]| crate::decode::value_to_text(lookup(&map, keys));
                let raw = |keys: &[&str]| lookup(&map, keys).cloned().unwrap_or_default();
                Self {
                    id: raw(&["id", "comment_id"]),
                    content: text(&["content", "comment_content"]),
                    date: text(&["date", "comment_date"]),
                    parent_id: raw(&["parent_id", "parentId", "comment_parent"]),
                    author: text(&["author", "comment_author"]),
                    author_user_id: raw(&["author_user_id", "authorUserId", "user_id"]),
                    author_avatar_url: None,
                }
            }
        }
    }
}

// Accept a string, a number or null for a text field
fn de_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(crate::decode::value_to_text(value.as_ref()))
}

// Accept only a non-blank string as a URL; `false`, numbers and the like are absent
fn de_opt_url<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_preferred() {
        let raw = RawPost::from_value(json!({
            "repost_count": 2,
            "fields": { "repost_count": "5" }
        }));
        assert_eq!(raw.get(REPOST_COUNT_KEYS), Some(&json!(2)));
        assert_eq!(raw.get_nested_first(REPOST_COUNT_KEYS), Some(&json!("5")));
    }

    #[test]
    fn test_null_counts_as_absent() {
        let raw = RawPost::from_value(json!({
            "repostCount": null,
            "fields": { "repostCount": 3 }
        }));
        assert_eq!(raw.get(REPOST_COUNT_KEYS), Some(&json!(3)));
    }

    #[test]
    fn test_non_object_is_empty() {
        let raw = RawPost::from_value(json!([1, 2]));
        assert!(raw.0.is_empty());
        assert!(raw.comments().is_none());
    }

    #[test]
    fn test_comment_aliases() {
        let comment: RawComment = serde_json::from_value(json!({
            "id": 9,
            "parentId": "3",
            "authorUserId": 4,
            "content": "hi"
        }))
        .unwrap();
        assert_eq!(comment.id, json!(9));
        assert_eq!(comment.parent_id, json!("3"));
        assert_eq!(comment.author_user_id, json!(4));
        assert!(comment.date.is_empty());
    }

    #[test]
    fn test_comment_null_text_fields() {
        let comment: RawComment = serde_json::from_value(json!({
            "id": "1",
            "content": null,
            "author": 12
        }))
        .unwrap();
        assert!(comment.content.is_empty());
        assert_eq!(comment.author, "12");
    }

    #[test]
    fn test_comment_wrongly_typed_fields_default() {
        for avatar in [json!(false), json!(123), json!({}), json!("  ")] {
            let comment: RawComment = serde_json::from_value(json!({
                "id": 1,
                "author_avatar_url": avatar,
                "content": { "rendered": "x" }
            }))
            .unwrap();
            assert_eq!(comment.author_avatar_url, None);
            assert!(comment.content.is_empty());
        }
    }

    #[test]
    fn test_comments_never_dropped() {
        let raw = RawPost::from_value(json!({
            "comments": [
                { "id": 1, "author_avatar_url": false },
                { "id": 2, "author_avatar_url": 123 },
                { "id": 3 },
                "garbage",
                { "id": 5, "parent_id": "1", "parentId": "2", "content": "both" }
            ]
        }));
        let comments = raw.comments().unwrap();
        assert_eq!(comments.len(), 5);
        assert_eq!(comments[3], RawComment::default());
        assert_eq!(comments[4].id, json!(5));
        assert_eq!(comments[4].parent_id, json!("1"));
        assert_eq!(comments[4].content, "both");
    }
}
