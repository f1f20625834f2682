//! Post view model (canonical shape used by rendering code)

use serde::{Deserialize, Serialize};

use super::CommentNode;

/// Placeholder thumbnail when a post carries no images
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "https://placehold.co/600x400?text=No+Image";

/// Who reposted a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepostInfo {
    /// Reposting user's id
    pub user_id: String,
    /// Reposting user's display name (may be empty)
    pub display_name: String,
}

/// A normalized post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostViewModel {
    /// Post id
    pub id: String,
    /// Title with HTML entities decoded
    pub title: String,
    /// Author display name
    pub author: String,
    /// Author user id
    pub author_id: String,
    /// Author avatar URL
    pub author_avatar_url: Option<String>,
    /// Raw server timestamp
    pub date: String,
    /// Relative age ("5m", "2h", "3d")
    pub time_ago: String,
    /// Event label
    pub event: String,
    /// Location label
    pub location: String,
    /// Tagged people
    pub tags: Vec<String>,
    /// Image URLs
    pub images: Vec<String>,
    /// First image, or the configured placeholder when there are none
    pub summary_image: String,
    /// Video URLs
    pub videos: Vec<String>,
    /// Whether the post has a video
    pub has_video: bool,
    /// First video URL
    pub primary_video: Option<String>,
    /// Users who liked the post
    pub liked_user_ids: Vec<String>,
    /// Number of likes
    pub likes: u32,
    /// Whether the current user liked the post
    pub liked: bool,
    /// Number of comments
    pub comments_count: u32,
    /// Number of reposts
    pub repost_count: u32,
    /// Reposting user, when this is a repost card
    pub reposted_by: Option<RepostInfo>,
    /// Whether to render as a repost card
    pub is_repost_card: bool,
    /// Current user and author are friends
    pub are_friends: bool,
    /// Current user follows the author
    pub is_following: bool,
    /// Current user saved the post
    pub is_saved: bool,
    /// Author follows the current user
    pub is_followed: bool,
    /// Embedded comments, threaded
    pub comments: Vec<CommentNode>,
}

impl PostViewModel {
    /// Reposting user's id, if any
    pub fn reposted_by_id(&self) -> Option<&str> {
        self.reposted_by.as_ref().map(|r| r.user_id.as_str())
    }

    /// Reposting user's display name, if any
    pub fn reposted_by_name(&self) -> Option<&str> {
        self.reposted_by.as_ref().map(|r| r.display_name.as_str())
    }

    /// Get a short preview of the title (for list display)
    pub fn preview(&self, max_chars: usize) -> String {
        let title = self.title.replace('\n', " ");
        if title.chars().count() <= max_chars {
            title
        } else {
            let cut: String = title.chars().take(max_chars.saturating_sub(3)).collect();
            format!("{cut}...")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repost_accessors() {
        let mut post = PostViewModel::default();
        assert_eq!(post.reposted_by_id(), None);

        post.reposted_by = Some(RepostInfo {
            user_id: "9".to_string(),
            display_name: "Ana".to_string(),
        });
        assert_eq!(post.reposted_by_id(), Some("9"));
        assert_eq!(post.reposted_by_name(), Some("Ana"));
    }

    #[test]
    fn test_preview_counts_chars() {
        let post = PostViewModel {
            title: "héllo wörld, long title".to_string(),
            ..Default::default()
        };
        assert_eq!(post.preview(8), "héllo...");
        assert_eq!(post.preview(100), "héllo wörld, long title");
    }
}
