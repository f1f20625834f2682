//! In-memory feed state for one screen
//!
//! Posts are rebuilt on every fetch. Comment trees are keyed by post id and
//! overwritten unconditionally on each successful response, so the latest
//! response always wins. Like/save/follow toggles are applied to the view
//! models before the server confirms.

use chrono::{DateTime, Utc};

use crate::cache::LookupCache;
use crate::config::Config;
use crate::models::{CommentNode, PostViewModel, RawComment, RawPost, truncate_forest};
use crate::normalize::{NormalizeOptions, normalize_posts};
use crate::thread::thread_comments;

/// Feed state
#[derive(Debug)]
pub struct FeedState {
    /// Configuration
    pub config: Config,
    /// Normalized posts, in server order
    pub posts: Vec<PostViewModel>,
    /// Comment trees by post id
    comment_trees: LookupCache<String, Vec<CommentNode>>,
    /// Username → user id memo
    users: LookupCache<String, String>,
}

impl FeedState {
    /// Create an empty feed
    pub fn new(config: Config) -> Self {
        let comment_trees = LookupCache::new(config.comment_cache_capacity);
        let users = LookupCache::new(config.user_cache_capacity);
        Self::with_caches(config, comment_trees, users)
    }

    /// Create an empty feed with caches supplied by the caller
    pub fn with_caches(
        config: Config,
        comment_trees: LookupCache<String, Vec<CommentNode>>,
        users: LookupCache<String, String>,
    ) -> Self {
        Self {
            config,
            posts: Vec::new(),
            comment_trees,
            users,
        }
    }

    /// Replace the feed with a fresh fetch
    pub fn replace_posts(&mut self, raws: &[RawPost]) {
        self.replace_posts_at(raws, Utc::now());
    }

    /// Replace the feed with a fresh fetch, computing ages against `now`
    pub fn replace_posts_at(&mut self, raws: &[RawPost], now: DateTime<Utc>) {
        let options = NormalizeOptions::from_config(&self.config).at(now);
        self.posts = normalize_posts(raws, &options);
        tracing::debug!("Feed refreshed with {} posts", self.posts.len());
    }

    /// Get a post by id
    pub fn post(&self, post_id: &str) -> Option<&PostViewModel> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    fn post_mut(&mut self, post_id: &str) -> Option<&mut PostViewModel> {
        self.posts.iter_mut().find(|p| p.id == post_id)
    }

    /// Thread and store the comments from a response for `post_id`.
    ///
    /// Overwrites whatever was stored before and updates the post's comment
    /// count. Returns the number of comments threaded.
    pub fn set_comments(&mut self, post_id: &str, raws: &[RawComment]) -> usize {
        let tree = thread_comments(raws);
        let count = crate::models::count_all_nodes(&tree);

        if let Some(post) = self.post_mut(post_id) {
            post.comments_count = u32::try_from(count).unwrap_or(u32::MAX);
        }
        self.comment_trees.insert(post_id.to_string(), tree);
        count
    }

    /// Full comment tree for a post
    pub fn comments(&self, post_id: &str) -> Option<Vec<CommentNode>> {
        self.comment_trees.get(&post_id.to_string())
    }

    /// Comment tree limited to the configured reply depth
    pub fn rendered_comments(&self, post_id: &str) -> Vec<CommentNode> {
        let mut tree = self.comments(post_id).unwrap_or_default();
        truncate_forest(&mut tree, self.config.reply_depth);
        tree
    }

    /// Flip "liked" for `user_id` on a post. Returns the new state.
    pub fn toggle_like(&mut self, post_id: &str, user_id: &str) -> Option<bool> {
        let post = self.post_mut(post_id)?;
        post.liked = !post.liked;

        if post.liked {
            post.likes = post.likes.saturating_add(1);
            if !post.liked_user_ids.iter().any(|id| id == user_id) {
                post.liked_user_ids.push(user_id.to_string());
            }
        } else {
            post.likes = post.likes.saturating_sub(1);
            post.liked_user_ids.retain(|id| id != user_id);
        }

        Some(post.liked)
    }

    /// Flip "saved" on a post. Returns the new state.
    pub fn toggle_save(&mut self, post_id: &str) -> Option<bool> {
        let post = self.post_mut(post_id)?;
        post.is_saved = !post.is_saved;
        Some(post.is_saved)
    }

    /// Flip "following" for an author across every post of theirs.
    ///
    /// Returns how many posts were updated.
    pub fn toggle_follow(&mut self, author_id: &str) -> usize {
        let Some(now_following) = self
            .posts
            .iter()
            .find(|p| p.author_id == author_id)
            .map(|p| !p.is_following)
        else {
            return 0;
        };

        let mut touched = 0;
        for post in self.posts.iter_mut().filter(|p| p.author_id == author_id) {
            post.is_following = now_following;
            touched += 1;
        }
        touched
    }

    /// Remember a username → user id mapping
    pub fn remember_user(&self, username: &str, user_id: &str) {
        self.users
            .insert(username.trim().to_lowercase(), user_id.to_string());
    }

    /// Look up a remembered user id
    pub fn resolve_user(&self, username: &str) -> Option<String> {
        self.users.get(&username.trim().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feed() -> FeedState {
        let config = Config {
            current_user_id: Some("42".to_string()),
            ..Config::default()
        };
        let mut state = FeedState::new(config);
        state.replace_posts(&[
            RawPost::from_value(json!({
                "id": 1,
                "author_id": "7",
                "fields": { "_liked_users": "5,42" }
            })),
            RawPost::from_value(json!({ "id": 2, "author_id": "7", "is_following": "0" })),
            RawPost::from_value(json!({ "id": 3, "author_id": "8" })),
        ]);
        state
    }

    fn comment_list(value: serde_json::Value) -> Vec<RawComment> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_replace_posts_uses_config_user() {
        let state = feed();
        assert_eq!(state.posts.len(), 3);
        assert!(state.post("1").unwrap().liked);
        assert!(!state.post("2").unwrap().liked);
    }

    #[test]
    fn test_replace_posts_uses_config_placeholder() {
        let config = Config {
            placeholder_image: "blank.png".to_string(),
            ..Config::default()
        };
        let mut state = FeedState::new(config);
        state.replace_posts(&[
            RawPost::from_value(json!({ "id": 1 })),
            RawPost::from_value(json!({ "id": 2, "fields": { "images": "a.jpg,b.jpg" } })),
        ]);
        assert_eq!(state.post("1").unwrap().summary_image, "blank.png");
        assert_eq!(state.post("2").unwrap().summary_image, "a.jpg");
    }

    #[test]
    fn test_toggle_like() {
        let mut state = feed();
        assert_eq!(state.toggle_like("1", "42"), Some(false));
        let post = state.post("1").unwrap();
        assert_eq!(post.likes, 1);
        assert_eq!(post.liked_user_ids, vec!["5"]);

        assert_eq!(state.toggle_like("1", "42"), Some(true));
        assert_eq!(state.post("1").unwrap().likes, 2);
        assert_eq!(state.toggle_like("missing", "42"), None);
    }

    #[test]
    fn test_unlike_never_goes_negative() {
        let mut state = feed();
        state.posts[2].liked = true;
        assert_eq!(state.toggle_like("3", "42"), Some(false));
        assert_eq!(state.post("3").unwrap().likes, 0);
    }

    #[test]
    fn test_toggle_save() {
        let mut state = feed();
        assert_eq!(state.toggle_save("2"), Some(true));
        assert_eq!(state.toggle_save("2"), Some(false));
    }

    #[test]
    fn test_toggle_follow_all_author_posts() {
        let mut state = feed();
        assert_eq!(state.toggle_follow("7"), 2);
        assert!(state.post("1").unwrap().is_following);
        assert!(state.post("2").unwrap().is_following);
        assert!(!state.post("3").unwrap().is_following);
        assert_eq!(state.toggle_follow("nobody"), 0);
    }

    #[test]
    fn test_set_comments_last_write_wins() {
        let mut state = feed();
        state.set_comments("1", &comment_list(json!([{ "id": 1 }, { "id": 2 }])));
        let count = state.set_comments("1", &comment_list(json!([{ "id": 9 }])));

        assert_eq!(count, 1);
        let tree = state.comments("1").unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, "9");
        assert_eq!(state.post("1").unwrap().comments_count, 1);
    }

    #[test]
    fn test_rendered_comments_respects_depth() {
        let mut state = feed();
        state.set_comments(
            "2",
            &comment_list(json!([
                { "id": 1, "date": "2024-01-01 10:00:00" },
                { "id": 2, "parent_id": 1, "date": "2024-01-01 11:00:00" },
                { "id": 3, "parent_id": 2, "date": "2024-01-01 12:00:00" }
            ])),
        );

        let rendered = state.rendered_comments("2");
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].depth(), 2);
        assert_eq!(crate::models::count_all_nodes(&rendered), 3);
        assert_eq!(state.comments("2").unwrap()[0].depth(), 3);
        assert!(state.rendered_comments("unknown").is_empty());
    }

    #[test]
    fn test_user_cache() {
        let state = feed();
        state.remember_user(" Ana ", "12");
        assert_eq!(state.resolve_user("ana"), Some("12".to_string()));
        assert_eq!(state.resolve_user("bo"), None);
    }

    #[test]
    fn test_injected_caches_are_shared() {
        let trees = LookupCache::new(1);
        let mut state = FeedState::with_caches(Config::default(), trees.clone(), LookupCache::unbounded());
        state.set_comments("a", &comment_list(json!([{ "id": 1 }])));
        state.set_comments("b", &comment_list(json!([{ "id": 2 }])));

        assert_eq!(trees.len(), 1);
        assert!(state.comments("a").is_none());
        assert!(state.comments("b").is_some());
    }
}
