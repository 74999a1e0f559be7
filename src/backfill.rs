use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::csv_source::{MergeStats, Table};
use crate::error::ImportError;
use crate::scraper::{self, ScrapeStats, ScrapedContent};
use crate::settings::Settings;
use crate::sitemap;

#[derive(Debug)]
pub struct BackfillReport {
    pub scrape: ScrapeStats,
    pub merge: MergeStats,
}

/// Scrape every blog post listed in the sitemap and write the rich-text markup
/// into the CSV's content column, keyed by slug.
pub async fn run(settings: &Settings, limit: Option<usize>) -> Result<BackfillReport> {
    let csv_path = &settings.csv_path;
    if !csv_path.exists() {
        return Err(ImportError::SourceNotFound(csv_path.clone()).into());
    }

    let client = scraper::build_client(&settings.user_agent)?;
    let mut urls = sitemap::fetch_blog_urls(&client, &settings.sitemap_url).await?;
    if let Some(n) = limit {
        urls.truncate(n);
    }
    println!("Found {} blog post URLs", urls.len());

    let delay = Duration::from_millis(settings.delay_ms);
    let (scraped, scrape) = scraper::scrape_pages(&client, &urls, delay).await?;

    // a limited run only covers part of the sitemap, so leave other rows alone
    let merge = merge_into_csv(csv_path, &settings.content_column, &scraped, limit.is_some())?;
    Ok(BackfillReport { scrape, merge })
}

/// Read the CSV, fill `column` from `scraped` and replace the file in place.
pub fn merge_into_csv(
    csv_path: &Path,
    column: &str,
    scraped: &ScrapedContent,
    keep_existing: bool,
) -> Result<MergeStats> {
    info!("Loading CSV from {}", csv_path.display());
    let mut table = Table::read(csv_path)?;
    let stats = table.merge_column(column, scraped, keep_existing)?;
    table.write_atomic(csv_path)?;
    info!("Updated CSV saved to {}", csv_path.display());
    Ok(stats)
}

impl BackfillReport {
    pub fn print(&self) {
        let m = &self.merge;
        println!(
            "Scraped {} pages ({} ok, {} errors).",
            self.scrape.total, self.scrape.ok, self.scrape.errors
        );
        println!("Total blog posts in CSV: {}", m.total);
        println!("Successfully scraped:    {}", m.enriched);
        println!("Failed to scrape:        {}", m.total - m.enriched);
        if !m.missing.is_empty() {
            println!("\nFailed slugs:");
            for slug in &m.missing {
                println!("  - {}", slug);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::select::Selection;
    use crate::csv_source::read_rows;
    use crate::import::{self, ImportOptions};

    fn settings(csv_path: &Path) -> Settings {
        Settings {
            csv_path: csv_path.to_path_buf(),
            out_dir: "content".into(),
            extension: "mdx".into(),
            sitemap_url: "http://127.0.0.1:9/sitemap.xml".into(),
            delay_ms: 0,
            content_column: "scraped_content".into(),
            user_agent: "test".into(),
        }
    }

    #[tokio::test]
    async fn missing_csv_fails_before_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&settings(&dir.path().join("nope.csv")), None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ImportError>(),
            Some(ImportError::SourceNotFound(_))
        ));
    }

    #[test]
    fn scraped_page_flows_into_import() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("posts.csv");
        std::fs::write(
            &csv_path,
            "Name,Slug,Published On,Meta description,Author,Blog Post Content\n\
             RAG in Practice,rag-in-practice,Tue Jul 16 2024 12:00:00 GMT+0000 (UTC),Grounding.,Pranav,\n\
             Hello World,hello-world,Sun Jun 02 2024 19:09:10 GMT+0000 (UTC),A test.,Jane,<p>Hi</p>\n",
        )
        .unwrap();

        let page = std::fs::read_to_string("tests/fixtures/blog_post.html").unwrap();
        let scraped = ScrapedContent::from([
            ("rag-in-practice".to_string(), scraper::extract_content(&page)),
            ("hello-world".to_string(), None),
        ]);
        let stats = merge_into_csv(&csv_path, "scraped_content", &scraped, false).unwrap();
        assert_eq!(stats.enriched, 1);
        assert_eq!(stats.missing, ["hello-world"]);

        let rows = read_rows(&csv_path, "scraped_content").unwrap();
        assert!(rows[0].scraped_content.contains("Why RAG?"));
        assert_eq!(rows[1].scraped_content, "");

        let mut s = settings(&csv_path);
        s.out_dir = dir.path().join("content");
        let opts = ImportOptions {
            selection: Selection::Slug("rag-in-practice".into()),
            overwrite: false,
            dry_run: false,
        };
        import::run(&s, &opts).unwrap();
        let doc = std::fs::read_to_string(s.out_dir.join("rag-in-practice.mdx")).unwrap();
        assert!(doc.contains("<h2 id=\"why-rag\">Why RAG?</h2>"));
    }
}
