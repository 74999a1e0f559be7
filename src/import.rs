use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::convert::record::Post;
use crate::convert::select::Selection;
use crate::csv_source;
use crate::error::ImportError;
use crate::settings::Settings;
use crate::writer;

pub struct ImportOptions {
    pub selection: Selection,
    pub overwrite: bool,
    pub dry_run: bool,
}

/// Paths written (or, on a dry run, that would be written).
#[derive(Debug)]
pub struct ImportReport {
    pub paths: Vec<PathBuf>,
    pub dry_run: bool,
}

/// Convert selected CSV rows into documents, strictly in file order.
///
/// The first bad row stops the batch; documents already written stay on disk.
pub fn run(settings: &Settings, opts: &ImportOptions) -> Result<ImportReport> {
    let csv_path = &settings.csv_path;
    if !csv_path.exists() {
        return Err(ImportError::SourceNotFound(csv_path.clone()).into());
    }
    if !opts.dry_run {
        fs::create_dir_all(&settings.out_dir)
            .with_context(|| format!("Failed to create {}", settings.out_dir.display()))?;
    }

    let rows = csv_source::read_rows(csv_path, &settings.content_column)?;
    info!("Loaded {} rows from {}", rows.len(), csv_path.display());
    let chosen = opts.selection.apply(rows)?;
    info!("Selected {} rows ({:?})", chosen.len(), opts.selection);

    let mut paths = Vec::with_capacity(chosen.len());
    for (i, row) in chosen.iter().enumerate() {
        let post = Post::try_from(row)
            .with_context(|| format!("Row {} (slug {:?})", i + 1, row.slug.trim()))?;
        if opts.dry_run {
            let path = writer::document_path(&settings.out_dir, &post.slug, &settings.extension);
            println!("[dry-run] would write: {}", path.display());
            paths.push(path);
            continue;
        }
        let path = writer::write_document(&settings.out_dir, &post, &settings.extension, opts.overwrite)?;
        debug!("Wrote {}", path.display());
        paths.push(path);
    }

    Ok(ImportReport {
        paths,
        dry_run: opts.dry_run,
    })
}
