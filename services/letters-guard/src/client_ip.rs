// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Rate-limit key derivation from request metadata.

use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Key used when nothing identifies the client.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Proxy headers consulted in order. `true` means the header may carry a
/// comma-separated chain whose first entry is the original client.
const FORWARDED_HEADERS: &[(&str, bool)] = &[
    ("x-forwarded-for", true),
    ("x-real-ip", false),
    ("x-vercel-forwarded-for", true),
];

/// Derive the client key for a request.
///
/// With `trust_forwarded` set, proxy headers win over the socket peer.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded: bool) -> String {
    if trust_forwarded {
        for (name, chained) in FORWARDED_HEADERS {
            let Some(value) = headers.get(*name).and_then(|v| v.to_str().ok()) else {
                continue;
            };
            let value = if *chained {
                value.split(',').next().unwrap_or(value)
            } else {
                value
            };
            let value = value.trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
