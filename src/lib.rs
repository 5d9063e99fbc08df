//! Boolean search queries over short texts.
//!
//! ```
//! use bq::search_query::{normalize, parse};
//!
//! let predicate = parse("測定 (掃除 OR -メンテナンス)").unwrap().normalized();
//! assert!(predicate.matches(&normalize("測定と掃除を実施")));
//! assert!(!predicate.matches(&normalize("測定とメンテナンス")));
//! ```

pub mod config;
pub mod search_query;
