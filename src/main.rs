mod backfill;
mod convert;
mod csv_source;
mod error;
mod import;
mod scraper;
mod settings;
mod sitemap;
mod writer;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};

use convert::select::Selection;
use settings::Settings;

#[derive(Parser)]
#[command(name = "webflow_migrate", about = "Migrate a Webflow blog CSV export into MDX posts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert CSV rows into MDX files with frontmatter
    Import {
        /// Path to the CSV export
        #[arg(long = "csv")]
        csv_path: Option<PathBuf>,
        /// Output directory for documents
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Output file extension
        #[arg(long)]
        ext: Option<String>,
        #[command(flatten)]
        select: SelectArgs,
        /// Overwrite existing files
        #[arg(long)]
        overwrite: bool,
        /// Print what would happen without writing files
        #[arg(long)]
        dry_run: bool,
    },
    /// Scrape blog posts listed in the sitemap into the CSV's content column
    Backfill {
        /// Path to the CSV export (rewritten in place)
        #[arg(long = "csv")]
        csv_path: Option<PathBuf>,
        /// Max pages to scrape (default: all in sitemap)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// List blog post URLs found in the sitemap
    Urls,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SelectArgs {
    /// Import exactly one row matching this slug
    #[arg(long)]
    slug: Option<String>,
    /// Import the first N rows
    #[arg(long, allow_negative_numbers = true)]
    limit: Option<i64>,
    /// Import all rows
    #[arg(long)]
    all: bool,
}

impl From<SelectArgs> for Selection {
    fn from(args: SelectArgs) -> Self {
        match (args.slug, args.limit) {
            (Some(slug), _) => Selection::Slug(slug),
            (None, Some(n)) => Selection::Limit(n),
            (None, None) => Selection::All,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;

    let result = match cli.command {
        Commands::Import {
            csv_path,
            out_dir,
            ext,
            select,
            overwrite,
            dry_run,
        } => {
            let settings = settings.with_overrides(csv_path, out_dir, ext);
            let opts = import::ImportOptions {
                selection: select.into(),
                overwrite,
                dry_run,
            };
            let report = import::run(&settings, &opts)?;
            if !report.dry_run {
                println!(
                    "Imported {} post(s) into {}",
                    report.paths.len(),
                    settings.out_dir.display()
                );
                for p in &report.paths {
                    println!(" - {}", p.display());
                }
            }
            Ok(())
        }
        Commands::Backfill { csv_path, limit } => {
            let settings = settings.with_overrides(csv_path, None, None);
            let report = backfill::run(&settings, limit).await?;
            report.print();
            Ok(())
        }
        Commands::Urls => {
            let client = scraper::build_client(&settings.user_agent)?;
            let urls = sitemap::fetch_blog_urls(&client, &settings.sitemap_url).await?;
            for url in &urls {
                println!("{}  {}", sitemap::slug_from_url(url), url);
            }
            println!("\n{} blog posts", urls.len());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
