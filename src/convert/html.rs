use std::sync::LazyLock;

use regex::{Captures, Regex};

static ZERO_WIDTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[\u{200B}\u{200C}\u{200D}\u{FEFF}]|&#8203;|&#x200b;").unwrap());

// <hN ...><a ...>inner</a></hN> where inner holds no other anchor
static LINKED_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<(h[1-6])(\s[^>]*)?>\s*<a(?:\s[^>]*)?>((?:[^<]|<(?:[^aA/>][^>]*|/[^aA>][^>]*|[aA][^\s>][^>]*|/[aA][^\s>][^>]*)>)*)</a>\s*</(h[1-6])>",
    )
    .unwrap()
});
static EMPTY_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"\s+id="""#).unwrap());
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(h[1-6])(\s[^>]*)?>(.*?)</(h[1-6])>").unwrap());
static ID_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(?:^|\s)id\s*=").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static NON_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s-]+").unwrap());
static EMPTY_INLINE_P_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)<p(?:\s[^>]*)?>\s*(?:(?:<(?:em|strong|span|i|b|u)(?:\s[^>]*)?>\s*)+(?:</(?:em|strong|span|i|b|u)>\s*)+)+</p>",
    )
    .unwrap()
});
static EMPTY_P_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<p(?:\s[^>]*)?>\s*</p>").unwrap());
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static BEFORE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\n{{2,}}(<(?:{BLOCK_TAGS})\b)")).unwrap()
});
static AFTER_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(</(?:{BLOCK_TAGS})>)\n{{2,}}")).unwrap()
});

const BLOCK_TAGS: &str = "h[1-6]|p|ul|ol|li|blockquote|figure|figcaption|pre|table|div|hr";

const ALIGN_REPLACEMENTS: &[(&str, &str)] = &[
    ("w-richtext-align-fullwidth", "w-richtext-align-center"),
    (r#"data-rt-align="fullwidth""#, r#"data-rt-align="center""#),
];

/// Normalize Webflow rich-text HTML for embedding as a document body.
///
/// Pattern-based, not a parse/reserialize: each pass is a textual rewrite and the
/// passes run in a fixed order. Output always ends with exactly one newline.
pub fn clean(html: &str) -> String {
    let mut out = html.replace("\r\n", "\n").replace('\r', "\n");
    out = ZERO_WIDTH_RE.replace_all(&out, "").into_owned();
    out = unwrap_linked_headings(&out);
    out = EMPTY_ID_RE.replace_all(&out, "").into_owned();
    out = assign_heading_ids(&out);
    for (from, to) in ALIGN_REPLACEMENTS {
        out = out.replace(from, to);
    }
    out = EMPTY_INLINE_P_RE.replace_all(&out, "").into_owned();
    out = EMPTY_P_RE.replace_all(&out, "").into_owned();
    out = BLANK_RUN_RE.replace_all(&out, "\n\n").into_owned();
    out = BEFORE_BLOCK_RE.replace_all(&out, "\n${1}").into_owned();
    out = AFTER_BLOCK_RE.replace_all(&out, "${1}\n").into_owned();

    let mut trimmed = out.trim().to_string();
    trimmed.push('\n');
    trimmed
}

fn unwrap_linked_headings(html: &str) -> String {
    LINKED_HEADING_RE
        .replace_all(html, |caps: &Captures| {
            if !caps[1].eq_ignore_ascii_case(&caps[4]) {
                return caps[0].to_string();
            }
            let attrs = caps.get(2).map_or("", |m| m.as_str());
            format!("<{}{}>{}</{}>", &caps[1], attrs, &caps[3], &caps[4])
        })
        .into_owned()
}

fn assign_heading_ids(html: &str) -> String {
    HEADING_RE
        .replace_all(html, |caps: &Captures| {
            let attrs = caps.get(2).map_or("", |m| m.as_str());
            if !caps[1].eq_ignore_ascii_case(&caps[4]) || ID_ATTR_RE.is_match(attrs) {
                return caps[0].to_string();
            }
            let id = anchor_id(&caps[3]);
            if id.is_empty() {
                return caps[0].to_string();
            }
            format!("<{} id=\"{}\"{}>{}</{}>", &caps[1], id, attrs, &caps[3], &caps[4])
        })
        .into_owned()
}

/// Derive an anchor id from heading inner HTML: "Tips &amp; Tricks" → "tips-and-tricks".
pub fn anchor_id(inner_html: &str) -> String {
    let text = TAG_RE.replace_all(inner_html, "");
    let text = text.replace("&nbsp;", " ").replace("&amp;", "and").to_lowercase();
    let text = NON_SLUG_RE.replace_all(&text, "");
    let text = SEPARATOR_RE.replace_all(&text, "-");
    text.trim_matches('-').to_string()
}
