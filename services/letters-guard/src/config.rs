// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the letters guard.
//!
//! Defaults match the limits the letters comment route has always used:
//! five comments per client per minute, 10 000 characters per comment, and
//! a looser 100 requests per minute across the whole API.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Configuration for the letters guard service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Limiter applied to comment submissions
    #[serde(default = "RateLimitConfig::comments")]
    pub comment_limit: RateLimitConfig,

    /// Limiter applied to every API request
    #[serde(default = "RateLimitConfig::api")]
    pub api_limit: RateLimitConfig,

    /// Seconds between sweeps of expired rate windows (default: 60)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Comment validation limits
    #[serde(default)]
    pub comment: CommentConfig,

    /// Use proxy headers to identify clients (default: true)
    #[serde(default = "default_true")]
    pub trust_forwarded_headers: bool,

    /// Browser origins allowed to call the API (default: none)
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Fixed-window limiter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests accepted per key per window
    pub max_requests: u32,

    /// Window length in milliseconds
    pub window_ms: u64,
}

/// Limits applied when preparing a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentConfig {
    /// Maximum characters in raw and sanitized content (default: 10000)
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,

    /// Length of the plain-text excerpt (default: 140)
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_max_content_chars() -> usize {
    10_000
}

fn default_excerpt_chars() -> usize {
    140
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            comment_limit: RateLimitConfig::comments(),
            api_limit: RateLimitConfig::api(),
            sweep_interval_secs: default_sweep_interval_secs(),
            comment: CommentConfig::default(),
            trust_forwarded_headers: default_true(),
            allowed_origins: Vec::new(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::comments()
    }
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            max_content_chars: default_max_content_chars(),
            excerpt_chars: default_excerpt_chars(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Comment submissions: 5 per minute.
    pub fn comments() -> Self {
        Self {
            max_requests: 5,
            window_ms: 60_000,
        }
    }

    /// General API traffic: 100 per minute.
    pub fn api() -> Self {
        Self {
            max_requests: 100,
            window_ms: 60_000,
        }
    }

    /// Get the window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl Config {
    /// Defaults overlaid with environment variables.
    ///
    /// Unparseable values are ignored and the default is kept.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(v) = parse_var(&lookup, "COMMENT_MAX_REQUESTS") {
            config.comment_limit.max_requests = v;
        }
        if let Some(v) = parse_var(&lookup, "COMMENT_WINDOW_MS") {
            config.comment_limit.window_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "API_MAX_REQUESTS") {
            config.api_limit.max_requests = v;
        }
        if let Some(v) = parse_var(&lookup, "API_WINDOW_MS") {
            config.api_limit.window_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "SWEEP_INTERVAL_SECS") {
            config.sweep_interval_secs = v;
        }
        if let Some(v) = parse_var(&lookup, "MAX_CONTENT_CHARS") {
            config.comment.max_content_chars = v;
        }
        if let Some(v) = parse_var(&lookup, "TRUST_FORWARDED_HEADERS") {
            config.trust_forwarded_headers = v;
        }
        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            config.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = parse_var(&lookup, "METRICS_ENABLED") {
            config.metrics.enabled = v;
        }

        config
    }

    /// Get the sweep interval, never shorter than one second
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(name).and_then(|raw| raw.trim().parse().ok())
}
