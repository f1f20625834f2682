//! Flat comment list → reply tree

use std::collections::HashMap;

use crate::models::{CommentNode, RawComment, sort_by_date};

/// Thread a flat, unordered comment list into root comments with nested replies.
///
/// - A parent reference that is a root sentinel, points at the comment itself,
///   names an unknown id, or would close a cycle makes the comment a root.
///   No comment is ever dropped.
/// - The first occurrence of an id defines the node; later duplicates are ignored.
/// - Roots and every reply list are ordered by date, oldest first, keeping
///   input order for equal or unparsable dates (unparsable sorts first).
pub fn thread_comments(flat: &[RawComment]) -> Vec<CommentNode> {
    let mut nodes: Vec<CommentNode> = Vec::with_capacity(flat.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(flat.len());

    for raw in flat {
        let node = CommentNode::from_raw(raw);
        if node.id.is_empty() {
            nodes.push(node);
            continue;
        }

        let key = node.id.to_lowercase();
        if index.contains_key(&key) {
            tracing::debug!("Ignoring duplicate comment id {}", node.id);
            continue;
        }
        index.insert(key, nodes.len());
        nodes.push(node);
    }

    // Resolve parents in input order, refusing any link that would make a
    // node its own ancestor.
    let mut parent_of: Vec<Option<usize>> = vec![None; nodes.len()];
    for (idx, node) in nodes.iter().enumerate() {
        let Some(parent_key) = node.parent_id.as_deref() else {
            continue;
        };
        let Some(&parent_idx) = index.get(parent_key) else {
            tracing::debug!("Comment {}: parent {parent_key} not found, placing at root", node.id);
            continue;
        };
        if is_ancestor_or_self(idx, parent_idx, &parent_of) {
            tracing::debug!("Comment {}: parent {parent_key} would form a cycle, placing at root", node.id);
            continue;
        }
        parent_of[idx] = Some(parent_idx);
    }

    let mut child_lists: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut roots = Vec::new();
    for (idx, parent) in parent_of.iter().enumerate() {
        match parent {
            Some(parent_idx) => child_lists[*parent_idx].push(idx),
            None => roots.push(idx),
        }
    }

    // Pre-order walk; assembling in reverse finishes every child before its parent.
    let mut order = Vec::with_capacity(nodes.len());
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(idx) = stack.pop() {
        order.push(idx);
        stack.extend(child_lists[idx].iter().rev().copied());
    }

    let mut slots: Vec<Option<CommentNode>> = nodes.into_iter().map(Some).collect();
    for &idx in order.iter().rev() {
        let mut children: Vec<CommentNode> = child_lists[idx]
            .iter()
            .filter_map(|child| slots[*child].take())
            .collect();
        sort_by_date(&mut children);
        if let Some(node) = slots[idx].as_mut() {
            node.children = children;
        }
    }

    let mut tree: Vec<CommentNode> = roots.iter().filter_map(|idx| slots[*idx].take()).collect();
    sort_by_date(&mut tree);
    tree
}

/// Whether `candidate` is `start` or one of its ancestors
fn is_ancestor_or_self(candidate: usize, start: usize, parent_of: &[Option<usize>]) -> bool {
    let mut current = Some(start);
    while let Some(idx) = current {
        if idx == candidate {
            return true;
        }
        current = parent_of[idx];
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::count_all_nodes;
    use serde_json::{Value, json};

    fn comments(values: Value) -> Vec<RawComment> {
        serde_json::from_value(values).unwrap()
    }

    fn ids(nodes: &[CommentNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(thread_comments(&[]).is_empty());
    }

    #[test]
    fn test_children_sorted_by_date() {
        let input = comments(json!([
            { "id": 1, "parent_id": null, "date": "2024-01-01 10:00:00" },
            { "id": 2, "parent_id": 1, "date": "2024-01-01 11:00:00" },
            { "id": 3, "parent_id": "1", "date": "2024-01-01 09:00:00" }
        ]));
        let tree = thread_comments(&input);

        assert_eq!(ids(&tree), vec!["1"]);
        assert_eq!(ids(&tree[0].children), vec!["3", "2"]);
    }

    #[test]
    fn test_roots_sorted_and_ties_stable() {
        let input = comments(json!([
            { "id": "b", "date": "2024-01-01 10:00:00" },
            { "id": "a", "date": "2024-01-01 09:00:00" },
            { "id": "c", "date": "2024-01-01 10:00:00" },
            { "id": "d", "date": "garbage" }
        ]));
        let tree = thread_comments(&input);
        assert_eq!(ids(&tree), vec!["d", "a", "b", "c"]);
    }

    #[test]
    fn test_orphans_become_roots() {
        let input = comments(json!([
            { "id": 1, "parent_id": "999", "date": "2024-01-01 10:00:00" },
            { "id": 2, "parent_id": "0", "date": "2024-01-01 11:00:00" },
            { "id": 3, "parent_id": "undefined" },
            { "id": 4, "parent_id": "NaN" },
            { "id": 5 }
        ]));
        let tree = thread_comments(&input);
        assert_eq!(tree.len(), 5);
        assert_eq!(count_all_nodes(&tree), input.len());
    }

    #[test]
    fn test_self_reference_is_root() {
        let input = comments(json!([{ "id": 7, "parent_id": "7" }]));
        let tree = thread_comments(&input);
        assert_eq!(ids(&tree), vec!["7"]);
        assert!(tree[0].children.is_empty());
    }

    #[test]
    fn test_two_node_cycle_keeps_both() {
        let input = comments(json!([
            { "id": 1, "parent_id": 2, "date": "2024-01-01 10:00:00" },
            { "id": 2, "parent_id": 1, "date": "2024-01-01 11:00:00" }
        ]));
        let tree = thread_comments(&input);

        // The first link wins: 1 hangs under 2, and 2 cannot then hang under 1.
        assert_eq!(ids(&tree), vec!["2"]);
        assert_eq!(ids(&tree[0].children), vec!["1"]);
        assert_eq!(count_all_nodes(&tree), 2);
    }

    #[test]
    fn test_duplicate_ids_first_wins() {
        let input = comments(json!([
            { "id": 1, "content": "first" },
            { "id": "1", "content": "second" },
            { "id": 2, "parent_id": 1 }
        ]));
        let tree = thread_comments(&input);
        assert_eq!(count_all_nodes(&tree), 2);
        assert_eq!(tree[0].content, "first");
        assert_eq!(ids(&tree[0].children), vec!["2"]);
    }

    #[test]
    fn test_deep_chain() {
        let input: Vec<RawComment> = (1..=2000)
            .map(|i| {
                serde_json::from_value(json!({ "id": i, "parent_id": i - 1 })).unwrap()
            })
            .collect();
        let tree = thread_comments(&input);
        assert_eq!(tree.len(), 1);
        assert_eq!(count_all_nodes(&tree), 2000);
    }

    #[test]
    fn test_reply_before_parent_in_input() {
        let input = comments(json!([
            { "id": 2, "parent_id": 1, "date": "2024-01-01 11:00:00" },
            { "id": 1, "date": "2024-01-01 10:00:00" }
        ]));
        let tree = thread_comments(&input);
        assert_eq!(ids(&tree), vec!["1"]);
        assert_eq!(ids(&tree[0].children), vec!["2"]);
    }

    #[test]
    fn test_case_insensitive_parent_match() {
        let input = comments(json!([
            { "id": "AbC" },
            { "id": "x", "parent_id": "ABC" }
        ]));
        let tree = thread_comments(&input);
        assert_eq!(ids(&tree), vec!["AbC"]);
        assert_eq!(ids(&tree[0].children), vec!["x"]);
    }

    #[test]
    fn test_empty_ids_kept_as_roots() {
        let input = comments(json!([{ "content": "a" }, { "content": "b", "parent_id": "" }]));
        let tree = thread_comments(&input);
        assert_eq!(tree.len(), 2);
    }
}
