//! Threaded comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RawComment;
use crate::decode::{normalize_parent_id, value_to_id, value_to_text};
use crate::emoji;

/// A comment plus its ordered direct replies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentNode {
    /// Comment id (stringified, may be empty for malformed records)
    pub id: String,
    /// Normalized parent id, `None` for root comments
    pub parent_id: Option<String>,
    /// Body as received
    pub content: String,
    /// Raw server timestamp
    pub date: String,
    /// Parsed timestamp used for ordering
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,
    /// Author display name
    pub author: String,
    /// Author user id
    pub author_user_id: String,
    /// Author avatar URL
    pub author_avatar_url: Option<String>,
    /// Replies, oldest first
    pub children: Vec<CommentNode>,
}

impl CommentNode {
    /// Build a childless node from a raw record
    pub fn from_raw(raw: &RawComment) -> Self {
        Self {
            id: value_to_id(Some(&raw.id)).unwrap_or_default(),
            parent_id: normalize_parent_id(Some(&raw.parent_id)),
            content: raw.content.clone(),
            date: raw.date.clone(),
            created_at: crate::normalize::parse_server_date(&raw.date),
            author: raw.author.clone(),
            author_user_id: value_to_text(Some(&raw.author_user_id)),
            author_avatar_url: raw.author_avatar_url.clone(),
            children: Vec::new(),
        }
    }

    /// Content with entity- and curly-encoded emoji decoded for display
    pub fn display_content(&self) -> String {
        emoji::decode_content(&self.content)
    }

    /// Number of nodes in this subtree, including this one
    pub fn count(&self) -> usize {
        1 + count_all_nodes(&self.children)
    }

    /// Levels in this subtree (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Self::depth).max().unwrap_or(0)
    }

    /// Limit the subtree to `levels` levels, counting this node as one.
    ///
    /// Descendants below the last level are lifted into it and ordered by
    /// date, so no comment is lost. Anything under two levels keeps this node
    /// and a flattened reply list.
    pub fn truncate_depth(&mut self, levels: usize) {
        if levels <= 2 {
            let mut lifted = Vec::new();
            for child in std::mem::take(&mut self.children) {
                drain_into(child, &mut lifted);
            }
            sort_by_date(&mut lifted);
            self.children = lifted;
            return;
        }

        for child in &mut self.children {
            child.truncate_depth(levels - 1);
        }
    }
}

/// Total node count across a forest
pub fn count_all_nodes(nodes: &[CommentNode]) -> usize {
    nodes.iter().map(CommentNode::count).sum()
}

/// Truncate every root to `levels` levels (roots count as level one)
pub fn truncate_forest(roots: &mut [CommentNode], levels: usize) {
    for root in roots {
        root.truncate_depth(levels);
    }
}

/// Stable sort by parsed date; unparsable dates first
pub(crate) fn sort_by_date(nodes: &mut [CommentNode]) {
    nodes.sort_by_key(|node| node.created_at);
}

fn drain_into(mut node: CommentNode, out: &mut Vec<CommentNode>) {
    let children = std::mem::take(&mut node.children);
    out.push(node);
    for child in children {
        drain_into(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(id: &str, date: &str) -> CommentNode {
        let raw: RawComment =
            serde_json::from_value(json!({ "id": id, "date": date })).unwrap();
        CommentNode::from_raw(&raw)
    }

    #[test]
    fn test_from_raw_normalizes_ids() {
        let raw: RawComment = serde_json::from_value(json!({
            "id": 12,
            "parent_id": "undefined",
            "author_user_id": 3
        }))
        .unwrap();
        let node = CommentNode::from_raw(&raw);
        assert_eq!(node.id, "12");
        assert_eq!(node.parent_id, None);
        assert_eq!(node.author_user_id, "3");
    }

    #[test]
    fn test_count_and_depth() {
        let mut root = node("1", "2024-01-01 10:00:00");
        let mut child = node("2", "2024-01-01 11:00:00");
        child.children.push(node("3", "2024-01-01 12:00:00"));
        root.children.push(child);

        assert_eq!(root.count(), 3);
        assert_eq!(root.depth(), 3);
        assert_eq!(count_all_nodes(&[root.clone(), node("4", "")]), 4);
    }

    #[test]
    fn test_truncate_lifts_descendants() {
        let mut root = node("1", "2024-01-01 10:00:00");
        let mut child = node("2", "2024-01-01 11:00:00");
        child.children.push(node("3", "2024-01-01 10:30:00"));
        root.children.push(child);

        let mut roots = vec![root];
        truncate_forest(&mut roots, 2);

        assert_eq!(count_all_nodes(&roots), 3);
        assert_eq!(roots[0].depth(), 2);
        let ids: Vec<_> = roots[0].children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2"]);
    }

    #[test]
    fn test_display_content_decodes_emoji() {
        let mut n = node("1", "");
        n.content = "hi &#x1F600;".to_string();
        assert_eq!(n.display_content(), "hi \u{1F600}");
    }
}
