//! # perchfeed
//!
//! Feed normalization and comment threading for a social REST API whose
//! payloads are loosely typed.
//!
//! ## Overview
//!
//! The server sends booleans as `true`, `1` or `"true"`, lists as CSV strings,
//! JSON-encoded strings or arrays, and comments as a flat list with parent
//! references. perchfeed turns those records into one canonical view model per
//! post and a reply tree per comment list, without ever failing on a
//! malformed field.
//!
//! ## Architecture
//!
//! ```text
//!   raw posts (JSON)                     raw comments (JSON)
//!          │                                    │
//!          ▼                                    ▼
//! ┌─────────────────┐                  ┌─────────────────┐
//! │    Normalize    │                  │     Thread      │
//! │                 │                  │                 │
//! │ • Truthy flags  │                  │ • Parent ids    │
//! │ • CSV lists     │                  │ • Orphans/cycles│
//! │ • Repost info   │                  │ • Date order    │
//! │ • Time ago      │                  │                 │
//! └─────────────────┘                  └─────────────────┘
//!          │                                    │
//!          └──────────────────┬─────────────────┘
//!                             ▼
//!                   ┌─────────────────┐
//!                   │      Feed       │
//!                   │                 │
//!                   │ • Posts         │
//!                   │ • Comment trees │
//!                   │ • Toggles       │
//!                   └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`decode`] — Truthy, CSV and integer decoding helpers
//! - [`normalize`] — Raw post → [`PostViewModel`]
//! - [`thread`] — Flat comments → [`CommentNode`] tree
//! - [`emoji`] — Invertible emoji encodings for charset-lossy storage
//! - [`cache`] — Injectable bounded lookup cache
//! - [`feed`] — In-memory feed with optimistic toggles
//! - [`config`] — Configuration management
//! - [`models`] — Raw records and view models
//!
//! ## Example
//!
//! ```
//! use perchfeed::{RawPost, normalize_post};
//! use serde_json::json;
//!
//! let raw = RawPost::from_value(json!({ "fields": { "_liked_users": "5,42,7" } }));
//! let post = normalize_post(&raw, Some("42"));
//! assert!(post.liked);
//! ```

#![doc(html_root_url = "https://docs.rs/perchfeed/0.1.0")]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::uninlined_format_args)]

pub mod cache;
pub mod config;
pub mod decode;
pub mod emoji;
pub mod error;
pub mod feed;
pub mod models;
pub mod normalize;
pub mod paths;
pub mod thread;

// Re-export main types for convenience
pub use cache::LookupCache;
pub use config::Config;
pub use decode::{decode_csv_list, decode_integer, decode_truthy, normalize_parent_id};
pub use error::Error;
pub use feed::FeedState;
pub use models::{CommentNode, PostViewModel, RawComment, RawPost, RepostInfo, count_all_nodes};
pub use normalize::{
    NormalizeOptions, normalize_post, normalize_post_with, normalize_posts, time_ago,
};
pub use thread::thread_comments;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
