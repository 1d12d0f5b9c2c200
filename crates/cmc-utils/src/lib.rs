//! Shared utilities for cmc-scrape
//!
//! This crate provides the plumbing used around the scraping core:
//! tracing setup and browser user-agent selection.

pub mod logging;
pub mod user_agent;

pub use logging::init_tracing_with;
pub use user_agent::{FALLBACK_USER_AGENT, random_user_agent};
