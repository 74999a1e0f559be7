use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use ::scraper::{Html, Selector};
use tracing::{debug, info, warn};

use crate::sitemap::slug_from_url;

static CONTENT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.rich-text.w-richtext").unwrap());

/// Scrape stats returned after completion.
#[derive(Debug)]
pub struct ScrapeStats {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
}

/// slug → rich-text markup, `None` where the page yielded nothing.
pub type ScrapedContent = HashMap<String, Option<String>>;

pub fn build_client(user_agent: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .build()
        .context("Failed to create HTTP client")
}

/// Scrape pages one at a time, pausing `delay` between requests.
///
/// Failures never abort the run: the page's slug is recorded as `None`.
pub async fn scrape_pages(
    client: &reqwest::Client,
    urls: &[String],
    delay: Duration,
) -> Result<(ScrapedContent, ScrapeStats)> {
    let total = urls.len();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut scraped = ScrapedContent::with_capacity(total);
    let mut ok = 0usize;
    let mut errors = 0usize;

    for (i, url) in urls.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let slug = slug_from_url(url);
        pb.set_message(slug.clone());
        debug!("[{}/{}] Scraping {}", i + 1, total, url);

        let content = scrape_one(client, url).await;
        if content.is_some() {
            ok += 1;
        } else {
            errors += 1;
        }
        scraped.insert(slug, content);
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!("Scraped {} pages ({} ok, {} errors)", total, ok, errors);

    Ok((scraped, ScrapeStats { total, ok, errors }))
}

async fn scrape_one(client: &reqwest::Client, url: &str) -> Option<String> {
    let body = match fetch_page(client, url).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Error scraping {}: {:#}", url, e);
            return None;
        }
    };
    let content = extract_content(&body);
    if content.is_none() {
        warn!("No rich-text div found for {}", url);
    }
    content
}

async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await.context("HTTP request failed")?;
    let response = response.error_for_status()?;
    Ok(response.text().await?)
}

/// Outer HTML of the first rich-text container on the page.
pub fn extract_content(page_html: &str) -> Option<String> {
    let document = Html::parse_document(page_html);
    document.select(&CONTENT_SELECTOR).next().map(|el| el.html())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_rich_text_div() {
        let html = std::fs::read_to_string("tests/fixtures/blog_post.html").unwrap();
        let content = extract_content(&html).unwrap();
        assert!(content.starts_with("<div class=\"rich-text w-richtext\">"));
        assert!(content.contains("<h2>Why RAG?</h2>"));
        assert!(!content.contains("Not the body"));
        assert!(content.ends_with("</div>"));
    }

    #[test]
    fn class_order_does_not_matter() {
        let html = r#"<html><body><div class="w-richtext rich-text"><p>x</p></div></body></html>"#;
        assert_eq!(
            extract_content(html).as_deref(),
            Some(r#"<div class="w-richtext rich-text"><p>x</p></div>"#)
        );
    }

    #[tokio::test]
    async fn unreachable_pages_become_absent() {
        let client = build_client("test").unwrap();
        let urls = vec![
            "http://127.0.0.1:9/blog-post/x".to_string(),
            "http://127.0.0.1:9/blog-post/y/".to_string(),
        ];
        let (scraped, stats) = scrape_pages(&client, &urls, Duration::ZERO).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.ok, 0);
        assert_eq!(stats.errors, urls.len());
        assert_eq!(scraped.len(), 2);
        assert_eq!(scraped.get("x"), Some(&None));
        assert_eq!(scraped.get("y"), Some(&None));
    }

    #[test]
    fn missing_container() {
        assert!(extract_content("<html><body><div class=\"rich-text\">x</div></body></html>").is_none());
        assert!(extract_content("").is_none());
    }
}
