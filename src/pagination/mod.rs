//! Pagination module
//!
//! # Overview
//!
//! Every read endpoint returns one envelope format: an items array plus
//! pagination metadata, with field names that differ per object type. This
//! module turns those envelopes into [`Page`] values and flattens the page
//! sequence into a single ordered stream of items behind [`PagesCursor`].
//!
//! The cursor also supports checkpoint/resume: [`PagesCursor::checkpoint`]
//! captures the offset the current page was fetched at plus the in-page
//! position, and [`PagesCursor::resume`] re-fetches that page and skips the
//! already-consumed prefix. The streaming poller leans on this to re-probe
//! a page for newly appended items without re-emitting.

mod cursor;
mod page;

pub use cursor::{PageCheckpoint, PagesCursor};
pub use page::{fetch_page, Page};

#[cfg(test)]
mod tests;
