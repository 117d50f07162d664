//! Scrape module for fetching listing pages and running tasks
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching with rotated browser headers
//! - Page wrapping and link resolution
//! - Per-source politeness pacing
//! - Overall run orchestration

mod fetcher;
mod orchestrator;
mod page;
mod pacing;

pub use fetcher::{build_http_client, Fetcher, UserAgentPool, DEFAULT_USER_AGENTS};
pub use orchestrator::{run_scrape, Orchestrator};
pub use page::ParsedPage;
pub use pacing::{Politeness, SourceGates};
