// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Allow-list HTML sanitizer for user comments.
//!
//! The input goes through a fixed sequence of regex rewrites rather than a
//! parse tree:
//!
//! 1. `<script>` and `<style>` blocks are removed with their content
//! 2. `on*=` event handler attributes are stripped everywhere
//! 3. Opening tags outside [`ALLOWED_TAGS`] are dropped; allowed tags lose
//!    all attributes, except `<a>` which is rebuilt with a safe `href`
//! 4. Closing tags outside the allow-list are dropped
//! 5. Empty paragraphs are collapsed and the result is trimmed
//!
//! Closing tags for allowed names are kept even when no matching opening
//! tag survived.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Tags that survive sanitization.
pub const ALLOWED_TAGS: &[&str] = &[
    "b",
    "strong",
    "i",
    "em",
    "u",
    "s",
    "span",
    "p",
    "br",
    "ul",
    "ol",
    "li",
    "a",
    "blockquote",
    "code",
    "pre",
    "h2",
    "h3",
];

static RE_SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script.*?</script>").unwrap());

static RE_STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style.*?</style>").unwrap());

/// Matches on* event handler attributes (e.g. onclick="...", onerror='...').
static RE_EVENT_HANDLER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\son[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).unwrap());

static RE_OPEN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^>\s/]+)([^>]*)>").unwrap());

static RE_CLOSE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</([^>]+)>").unwrap());

/// `href` value in double quotes, single quotes, or bare.
static RE_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).unwrap()
});

static RE_SAFE_SCHEME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^https?://").unwrap());

static RE_EMPTY_PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<p>\s*</p>").unwrap());

static RE_ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

fn is_allowed(tag: &str) -> bool {
    let tag = tag.to_ascii_lowercase();
    ALLOWED_TAGS.contains(&tag.as_str())
}

/// Reduce arbitrary HTML to the allow-listed subset.
///
/// Never fails; empty input yields an empty string.
pub fn sanitize_html(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let out = RE_SCRIPT_BLOCK.replace_all(input, "");
    let out = RE_STYLE_BLOCK.replace_all(&out, "");
    let out = RE_EVENT_HANDLER.replace_all(&out, "");
    let out = RE_OPEN_TAG.replace_all(&out, rewrite_open_tag);
    let out = RE_CLOSE_TAG.replace_all(&out, |caps: &Captures| {
        if is_allowed(&caps[1]) {
            caps[0].to_string()
        } else {
            String::new()
        }
    });
    let out = RE_EMPTY_PARAGRAPH.replace_all(&out, "");

    out.trim().to_string()
}

/// [`sanitize_html`] for optional input; `None` yields an empty string.
pub fn sanitize_optional(input: Option<&str>) -> String {
    input.map(sanitize_html).unwrap_or_default()
}

fn rewrite_open_tag(caps: &Captures) -> String {
    if !is_allowed(&caps[1]) {
        return String::new();
    }
    let tag = caps[1].to_ascii_lowercase();
    if tag != "a" {
        return format!("<{tag}>");
    }

    let href = safe_href(&caps[2]);
    format!(r#"<a href="{href}" rel="noopener noreferrer" target="_blank">"#)
}

/// Resolve the link target of an `<a>` attribute string.
///
/// Only absolute http(s) URLs are kept; anything else becomes `#`.
fn safe_href(attrs: &str) -> String {
    let href = RE_HREF
        .captures(attrs)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str().trim())
        .unwrap_or("");

    if RE_SAFE_SCHEME.is_match(href) {
        // A quote from a single-quoted value would end our double-quoted attribute
        href.replace('"', "&quot;")
    } else {
        "#".to_string()
    }
}

/// Strip every tag and collapse whitespace, for previews and summaries.
///
/// Tags become word breaks, so adjacent paragraphs do not run together.
pub fn extract_plain_text(html: &str) -> String {
    let text = RE_ANY_TAG.replace_all(html, " ");
    RE_WHITESPACE.replace_all(&text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize_html(""), "");
        assert_eq!(sanitize_optional(None), "");
        assert_eq!(sanitize_optional(Some("<b>x</b>")), "<b>x</b>");
    }

    #[test]
    fn test_script_and_style_removed() {
        let out = sanitize_html("a<script>alert('x')</script>b<STYLE type=x>body{}</STYLE>c");
        assert_eq!(out, "abc");

        let out = sanitize_html("<p>hi</p><ScRiPt>\nsteal(document.cookie)\n</sCrIpT>");
        assert_eq!(out, "<p>hi</p>");
    }

    #[test]
    fn test_non_greedy_block_removal() {
        let out = sanitize_html("<script>1</script>keep<script>2</script>");
        assert_eq!(out, "keep");
    }

    #[test]
    fn test_disallowed_tag_dropped_content_kept() {
        assert_eq!(sanitize_html("<div onclick='x'>hi</div>"), "hi");
        assert_eq!(sanitize_html("<img src=x onerror=alert(1)>"), "");
        assert_eq!(sanitize_html("<iframe src=\"https://evil\"></iframe>ok"), "ok");
    }

    #[test]
    fn test_event_handlers_stripped_everywhere() {
        let out = sanitize_html(r#"<span onmouseover="steal()" ONCLICK='x' onload=y>t</span>"#);
        assert_eq!(out, "<span>t</span>");
        assert!(!out.to_lowercase().contains("onmouseover"));
    }

    #[test]
    fn test_allowed_tags_lose_attributes() {
        assert_eq!(sanitize_html("<b>bold</b>"), "<b>bold</b>");
        assert_eq!(
            sanitize_html(r#"<P class="x" style="color:red">text</P>"#),
            "<p>text</P>"
        );
        assert_eq!(sanitize_html("line<br/>next"), "line<br>next");
    }

    #[test]
    fn test_unsafe_href_neutralized() {
        assert_eq!(
            sanitize_html("<a href='javascript:alert(1)'>x</a>"),
            r##"<a href="#" rel="noopener noreferrer" target="_blank">x</a>"##
        );
        assert_eq!(
            sanitize_html("<a>no href</a>"),
            r##"<a href="#" rel="noopener noreferrer" target="_blank">no href</a>"##
        );
        assert_eq!(
            sanitize_html(r#"<a href="/relative">r</a>"#),
            r##"<a href="#" rel="noopener noreferrer" target="_blank">r</a>"##
        );
    }

    #[test]
    fn test_safe_href_preserved() {
        assert_eq!(
            sanitize_html(r#"<a href="https://example.com">go</a>"#),
            r#"<a href="https://example.com" rel="noopener noreferrer" target="_blank">go</a>"#
        );
        assert_eq!(
            sanitize_html(r#"<A HREF=HTTP://example.com/a?b=1 target="_self" rel="opener">go</A>"#),
            r#"<a href="HTTP://example.com/a?b=1" rel="noopener noreferrer" target="_blank">go</A>"#
        );
        assert_eq!(
            sanitize_html("<a title='t' href='  https://example.com/x  '>go</a>"),
            r#"<a href="https://example.com/x" rel="noopener noreferrer" target="_blank">go</a>"#
        );
    }

    #[test]
    fn test_href_quote_cannot_break_attribute() {
        let out = sanitize_html(r#"<a href='https://x.test/"evil'>go</a>"#);
        assert_eq!(
            out,
            r#"<a href="https://x.test/&quot;evil" rel="noopener noreferrer" target="_blank">go</a>"#
        );
    }

    #[test]
    fn test_closing_tags() {
        assert_eq!(sanitize_html("a</div>b</em>"), "ab</em>");
        assert_eq!(sanitize_html("</STRONG>"), "</STRONG>");
    }

    #[test]
    fn test_empty_paragraphs_collapse() {
        assert_eq!(sanitize_html("<p></p><p>  </p>"), "");
        assert_eq!(sanitize_html("<p>\n</p><p>x</p>"), "<p>x</p>");
        assert_eq!(sanitize_html("<p class='a'> </p>"), "");
    }

    #[test]
    fn test_result_trimmed() {
        assert_eq!(sanitize_html("  \n<em>x</em>\t "), "<em>x</em>");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "<b>bold</b>",
            r#"<a href="https://example.com" onclick="x">go</a>"#,
            "<a href='javascript:alert(1)'>x</a>",
            "<div><p>para <i>it</i></p><script>x</script><ul><li>one</li></ul></div>",
            "<p></p><h2 id=t>Title</h2>plain",
        ];
        for input in inputs {
            let once = sanitize_html(input);
            assert_eq!(sanitize_html(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_extract_plain_text() {
        assert_eq!(extract_plain_text("<p>a</p><p>b</p>"), "a b");
        assert_eq!(extract_plain_text("<p>a</p>\n\n<p>b</p>"), "a b");
        assert_eq!(extract_plain_text("  <b> x </b>\ty  "), "x y");
        assert_eq!(extract_plain_text("a<br>b"), "a b");
        assert_eq!(extract_plain_text("<br><br>"), "");
    }
}
