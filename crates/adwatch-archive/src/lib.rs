//! Client for the ads-transparency archive and the classifier that turns its
//! items into [`adwatch_core::AdRecord`]s.

pub mod classify;
pub mod client;
pub mod error;
pub mod pagination;
pub mod types;

pub use classify::{classify_item, Classification, Rejection};
pub use client::{ArchiveClient, ARCHIVE_FIELDS, PAGE_SIZE};
pub use error::ArchiveError;
pub use pagination::next_page_url;
pub use types::{ArchivePage, Paging, RawAd};
