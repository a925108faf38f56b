//! Core types for the Grokipedia client.
//!
//! This crate provides the pieces shared by every other component:
//! - The error taxonomy (`GrokipediaError`, `ErrorKind`)
//! - Typed records for pages, search hits and edit requests
//! - Response envelopes for the three service endpoints

mod edit_request;
mod error;
pub mod lenient;
mod page;
mod search;

pub use edit_request::{EditRequest, EditRequestsResponse, SupportingEvidence};
pub use error::{ErrorKind, GrokipediaError, Result};
pub use page::{Citation, Image, Page, PageMetadata, PageResponse, PageStats};
pub use search::{SearchResponse, SearchResult};
