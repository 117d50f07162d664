//! Integration tests for the scraper
//!
//! These tests use wiremock to create mock HTTP servers and run whole
//! scrapes end-to-end against a real SQLite report store.

mod scrape_tests;
