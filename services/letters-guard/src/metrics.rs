// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for limiter decisions and comment handling.

use crate::limiter::RateDecision;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};

/// Metrics owned by one service instance.
///
/// Each instance has its own registry so tests can build many side by side.
pub struct GuardMetrics {
    registry: Registry,
    decisions: IntCounterVec,
    tracked_keys: IntGaugeVec,
    comments: IntCounterVec,
    sanitized: IntCounter,
}

impl GuardMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let decisions = IntCounterVec::new(
            Opts::new(
                "letters_guard_rate_decisions_total",
                "Rate limiter decisions by scope and outcome",
            ),
            &["scope", "outcome"],
        )?;
        let tracked_keys = IntGaugeVec::new(
            Opts::new(
                "letters_guard_tracked_keys",
                "Client keys held by each limiter after the last sweep",
            ),
            &["scope"],
        )?;
        let comments = IntCounterVec::new(
            Opts::new(
                "letters_guard_comments_total",
                "Comment submissions by result code",
            ),
            &["result"],
        )?;
        let sanitized = IntCounter::new(
            "letters_guard_sanitize_total",
            "Documents passed through the HTML sanitizer",
        )?;

        registry.register(Box::new(decisions.clone()))?;
        registry.register(Box::new(tracked_keys.clone()))?;
        registry.register(Box::new(comments.clone()))?;
        registry.register(Box::new(sanitized.clone()))?;

        Ok(Self {
            registry,
            decisions,
            tracked_keys,
            comments,
            sanitized,
        })
    }

    pub fn record_decision(&self, scope: &str, decision: &RateDecision) {
        let outcome = if decision.allowed { "allowed" } else { "limited" };
        self.decisions.with_label_values(&[scope, outcome]).inc();
    }

    pub fn set_tracked_keys(&self, scope: &str, keys: usize) {
        self.tracked_keys
            .with_label_values(&[scope])
            .set(i64::try_from(keys).unwrap_or(i64::MAX));
    }

    /// `result` is `accepted` or a rejection code.
    pub fn record_comment(&self, result: &str) {
        self.comments.with_label_values(&[result]).inc();
    }

    pub fn record_sanitize(&self) {
        self.sanitized.inc();
    }

    /// Render every metric in the Prometheus text format.
    pub fn encode(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
