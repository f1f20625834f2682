//! Raw post → [`PostViewModel`] normalization
//!
//! Normalization is pure and never fails: any field that cannot be decoded
//! falls back to an empty list, `false`, `0` or `"0m"`, so a malformed post
//! still renders.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::config::Config;
use crate::decode::{
    decode_count, decode_csv_list, decode_csv_str, decode_truthy, try_decode_integer,
    try_decode_truthy, value_to_id, value_to_text,
};
use crate::models::{
    COMMENTS_COUNT_KEYS, DEFAULT_PLACEHOLDER_IMAGE, LIKED_FLAG_KEYS, LIKED_USERS_KEYS,
    LIKES_COUNT_KEYS, PostViewModel, REPOST_COUNT_KEYS, REPOSTED_BY_KEYS, RawPost, RepostInfo,
    TAG_KEYS,
};
use crate::thread::thread_comments;

/// Zone-less layouts the server uses; these are read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Layouts that carry an explicit offset
const ZONED_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f %z"];

/// Inputs to normalization besides the raw post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Signed-in user, for "liked by me"
    pub current_user_id: Option<String>,
    /// Thumbnail for posts without images
    pub placeholder_image: String,
    /// Reference time for the relative age
    pub now: DateTime<Utc>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            current_user_id: None,
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
            now: Utc::now(),
        }
    }
}

impl NormalizeOptions {
    /// Options for `current_user_id` with the default placeholder, as of now
    pub fn for_user(current_user_id: Option<&str>) -> Self {
        Self {
            current_user_id: current_user_id.map(str::to_owned),
            ..Self::default()
        }
    }

    /// Options from the configured user and placeholder, as of now
    pub fn from_config(config: &Config) -> Self {
        Self {
            current_user_id: config.current_user().map(str::to_owned),
            placeholder_image: config.placeholder_image.clone(),
            now: Utc::now(),
        }
    }

    /// Same options with a different reference time
    #[must_use]
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    fn current_user(&self) -> Option<&str> {
        self.current_user_id
            .as_deref()
            .map(str::trim)
            .filter(|user| !user.is_empty())
    }
}

/// Normalize a post against the current time
pub fn normalize_post(raw: &RawPost, current_user_id: Option<&str>) -> PostViewModel {
    normalize_post_with(raw, &NormalizeOptions::for_user(current_user_id))
}

/// Normalize a batch of posts, keeping order
pub fn normalize_posts(raws: &[RawPost], options: &NormalizeOptions) -> Vec<PostViewModel> {
    raws.iter().map(|raw| normalize_post_with(raw, options)).collect()
}

/// Normalize a post with an explicit "now" for the relative age
pub fn normalize_post_at(
    raw: &RawPost,
    current_user_id: Option<&str>,
    now: DateTime<Utc>,
) -> PostViewModel {
    normalize_post_with(raw, &NormalizeOptions::for_user(current_user_id).at(now))
}

/// Normalize a post with full options
pub fn normalize_post_with(raw: &RawPost, options: &NormalizeOptions) -> PostViewModel {
    let id = value_to_id(raw.get(&["id", "ID"])).unwrap_or_default();

    let images = list_field(&id, "images", raw.get_nested_first(&["images"]));
    let tags = list_field(&id, "tag_people", raw.get_nested_first(TAG_KEYS));
    let summary_image = images
        .first()
        .cloned()
        .unwrap_or_else(|| options.placeholder_image.clone());

    let videos = list_field(&id, "video", raw.get_nested_first(&["video", "videos"]));
    let has_video = !videos.is_empty();
    let primary_video = videos.first().cloned();

    let liked_user_ids = list_field(&id, "liked_users", raw.get_nested_first(LIKED_USERS_KEYS));
    let liked = flag_field(&id, "liked_by_user", raw.get(LIKED_FLAG_KEYS))
        || options
            .current_user()
            .is_some_and(|user| liked_user_ids.iter().any(|liker| liker == user));

    let mut likes = count_field(&id, "likes_count", raw.get_nested_first(LIKES_COUNT_KEYS));
    if likes == 0 && !liked_user_ids.is_empty() {
        likes = u32::try_from(liked_user_ids.len()).unwrap_or(u32::MAX);
    }

    let repost_count = count_field(&id, "repost_count", raw.get(REPOST_COUNT_KEYS));
    let reposted_by = raw.get(REPOSTED_BY_KEYS).and_then(|value| {
        let resolved = resolve_repost(value);
        if resolved.is_none() {
            tracing::debug!("Post {id}: reposted_by {value} has no user id, not a repost card");
        }
        resolved
    });
    let is_repost_card = reposted_by.is_some();

    let date = value_to_text(raw.get(&["date", "created_at", "post_date"]));
    let created_at = parse_server_date(&date);
    if created_at.is_none() {
        tracing::debug!("Post {id}: unparsable date {date:?}, using 0m");
    }
    let time_ago = format_age(created_at, options.now);

    let comments = raw.comments().map(|list| thread_comments(&list));
    let comments_count = match raw.get(COMMENTS_COUNT_KEYS) {
        Some(value) => count_field(&id, "comments_count", Some(value)),
        None => comments
            .as_ref()
            .map_or(0, |c| crate::models::count_all_nodes(c) as u32),
    };

    let title = html_escape::decode_html_entities(&value_to_text(raw.get(&["title"]))).to_string();
    let author_avatar_url = Some(value_to_text(raw.get(&["author_avatar_url", "authorAvatarUrl"])))
        .filter(|url| !url.trim().is_empty());

    PostViewModel {
        title,
        author: value_to_text(raw.get(&["author", "author_name"])),
        author_id: value_to_text(raw.get(&["author_id", "authorId"])),
        author_avatar_url,
        date,
        time_ago,
        event: value_to_text(raw.get_nested_first(&["event"])),
        location: value_to_text(raw.get_nested_first(&["location"])),
        tags,
        images,
        summary_image,
        videos,
        has_video,
        primary_video,
        liked_user_ids,
        likes,
        liked,
        comments_count,
        repost_count,
        reposted_by,
        is_repost_card,
        are_friends: flag_field(&id, "are_friends", raw.get(&["are_friends", "areFriends"])),
        is_following: flag_field(&id, "is_following", raw.get(&["is_following", "isFollowing"])),
        is_saved: flag_field(&id, "is_saved", raw.get(&["is_saved", "isSaved"])),
        is_followed: flag_field(&id, "is_followed", raw.get(&["is_followed", "isFollowed"])),
        comments: comments.unwrap_or_default(),
        id,
    }
}

/// Decode a flag, logging values that are neither a true nor a false encoding
fn flag_field(id: &str, field: &str, value: Option<&Value>) -> bool {
    if let Some(value) = value {
        if try_decode_truthy(Some(value)).is_none() {
            tracing::debug!("Post {id}: {field} = {value} is not a boolean, using false");
        }
    }
    decode_truthy(value)
}

/// Decode a count, logging values that do not parse
fn count_field(id: &str, field: &str, value: Option<&Value>) -> u32 {
    if let Some(value) = value {
        if try_decode_integer(Some(value)).is_none() {
            tracing::debug!("Post {id}: {field} = {value} is not a number, using 0");
        }
    }
    decode_count(value)
}

/// Decode a list, logging values that are neither a string nor an array
fn list_field(id: &str, field: &str, value: Option<&Value>) -> Vec<String> {
    if let Some(value @ (Value::Object(_) | Value::Bool(_))) = value {
        tracing::debug!("Post {id}: {field} = {value} is not a list, using []");
    }
    decode_csv_list(value)
}

/// Resolve the reposting user from whatever shape the server sent.
///
/// Returns `None` when no id can be found; the repost card depends on the id,
/// not on the repost count.
fn resolve_repost(value: &Value) -> Option<RepostInfo> {
    match value {
        Value::Object(map) => {
            let user_id = ["id", "user_id", "ID"]
                .iter()
                .find_map(|key| value_to_id(map.get(*key)))?;
            let display_name = ["display_name", "name", "user_login", "username"]
                .iter()
                .map(|key| value_to_text(map.get(*key)))
                .find(|name| !name.trim().is_empty())
                .unwrap_or_default();
            Some(RepostInfo {
                user_id,
                display_name,
            })
        }
        Value::String(s) if s.trim_start().starts_with('{') || s.trim_start().starts_with('[') => {
            serde_json::from_str::<Value>(s)
                .ok()
                .and_then(|parsed| resolve_repost(&parsed))
        }
        Value::String(s) => decode_csv_str(s).into_iter().next().map(|user_id| RepostInfo {
            user_id,
            display_name: String::new(),
        }),
        Value::Number(_) => value_to_id(Some(value)).map(|user_id| RepostInfo {
            user_id,
            display_name: String::new(),
        }),
        Value::Array(items) => items.iter().find_map(resolve_repost),
        Value::Bool(_) | Value::Null => None,
    }
}

/// Parse a server timestamp.
///
/// A bare `YYYY-MM-DD HH:MM:SS` is read as UTC; an explicit zone or offset is honored.
pub fn parse_server_date(date: &str) -> Option<DateTime<Utc>> {
    let date = date.trim();
    if date.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.with_timezone(&Utc));
    }

    ZONED_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(date, fmt).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(date, fmt).ok())
                .map(|naive| naive.and_utc())
        })
}

/// Relative age of `date` against the current time
pub fn time_ago(date: &str) -> String {
    time_ago_at(date, Utc::now())
}

/// Relative age of `date` against `now`: "Nm" under an hour, "Nh" under a
/// day, otherwise "Nd". Unparsable and future dates yield "0m".
pub fn time_ago_at(date: &str, now: DateTime<Utc>) -> String {
    format_age(parse_server_date(date), now)
}

fn format_age(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created_at) = created_at else {
        return "0m".to_string();
    };

    let duration = now.signed_duration_since(created_at);
    if duration.num_minutes() < 60 {
        format!("{}m", duration.num_minutes().max(0))
    } else if duration.num_hours() < 24 {
        format!("{}h", duration.num_hours())
    } else {
        format!("{}d", duration.num_days())
    }
}
