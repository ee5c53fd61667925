// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Letters Guard
//!
//! Write-path protection for the letters comment feature:
//!
//! - Allow-list HTML sanitizer for comment bodies
//! - Fixed-window rate limiting per client (5 comments per minute default)
//! - API-wide rate limiting (100 requests per minute default)
//! - Comment validation (author, thread, length limits)
//! - Client identification from proxy headers

pub mod client_ip;
pub mod comment;
pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod sanitizer;

pub use comment::{prepare_comment, CommentError, CommentSubmission, PreparedComment};
pub use config::Config;
pub use limiter::{RateDecision, RateLimiter};
pub use sanitizer::{extract_plain_text, sanitize_html};
