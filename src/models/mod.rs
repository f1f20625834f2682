//! Data models: raw server records and their normalized forms

mod comment;
mod post;
mod raw;

pub use comment::{CommentNode, count_all_nodes, truncate_forest};
pub(crate) use comment::sort_by_date;
pub use post::{DEFAULT_PLACEHOLDER_IMAGE, PostViewModel, RepostInfo};
pub use raw::{
    COMMENTS_COUNT_KEYS, LIKED_FLAG_KEYS, LIKED_USERS_KEYS, LIKES_COUNT_KEYS, REPOST_COUNT_KEYS,
    REPOSTED_BY_KEYS, RawComment, RawPost, TAG_KEYS,
};
