use anyhow::{Context, Result};
use quick_xml::events::Event;
use tracing::info;

/// Path segment that marks a blog post page.
const BLOG_POST_MARKER: &str = "/blog-post/";

/// Fetch the site's sitemap and return blog post URLs in sitemap order.
pub async fn fetch_blog_urls(client: &reqwest::Client, sitemap_url: &str) -> Result<Vec<String>> {
    info!("Fetching sitemap: {}", sitemap_url);
    let xml = client
        .get(sitemap_url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .context("Failed to fetch sitemap")?
        .text()
        .await
        .context("Failed to read sitemap body")?;

    let all_urls = parse_urlset(&xml)?;
    info!("Total URLs in sitemap: {}", all_urls.len());

    let filtered = filter_blog_posts(all_urls);
    info!("Blog post pages after filtering: {}", filtered.len());
    Ok(filtered)
}

pub fn filter_blog_posts(urls: Vec<String>) -> Vec<String> {
    urls.into_iter()
        .filter(|url| url.contains(BLOG_POST_MARKER))
        .collect()
}

/// Last non-empty path segment: `https://site/blog-post/my-post/` → `my-post`.
pub fn slug_from_url(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_string()
}

/// Parse a urlset XML and return all <loc> URLs. Elements are matched by local
/// name so the sitemap namespace (with or without a prefix) doesn't matter.
fn parse_urlset(xml: &str) -> Result<Vec<String>> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut urls = Vec::new();
    let mut in_url = false;
    let mut in_loc = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"url" => in_url = true,
                b"loc" if in_url => in_loc = true,
                _ => {}
            },
            Ok(Event::Text(e)) if in_loc => push_loc(&mut urls, &e.unescape()?),
            Ok(Event::CData(e)) if in_loc => {
                push_loc(&mut urls, std::str::from_utf8(&e.into_inner())?)
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"loc" => in_loc = false,
                b"url" => in_url = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e).context("Malformed sitemap XML"),
            _ => {}
        }
        buf.clear();
    }
    Ok(urls)
}

fn push_loc(urls: &mut Vec<String>, loc: &str) {
    let loc = loc.trim();
    if !loc.is_empty() {
        urls.push(loc.to_string());
    }
}
