//! Source module
//!
//! Read-side entry points that turn paginated endpoint responses into
//! [`SourceRecord`](crate::types::SourceRecord)s.
//!
//! # Overview
//!
//! The source module provides:
//! - `BatchReader` - One-shot walk of an endpoint, pull or drain style
//! - `StreamingPoller` - Long-lived poll loop feeding a `RecordSink`
//! - `StopHandle` - Cooperative cancellation for the poll loop

mod batch;
mod streaming;

pub use batch::BatchReader;
pub use streaming::{RecordSink, StopHandle, StreamingPoller};
