use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::convert::record::Post;
use crate::convert::yaml::double_quote;
use crate::error::ImportError;

/// Frontmatter block followed by the cleaned HTML body.
pub fn build_document(post: &Post) -> String {
    let mut fm = vec![
        "---".to_string(),
        format!("title: {}", double_quote(&post.title)),
        format!("slug: {}", post.slug),
        format!("publishedAt: {}", double_quote(&post.published_at)),
    ];
    if !post.created_at.is_empty() {
        fm.push(format!("createdAt: {}", double_quote(&post.created_at)));
    }
    if !post.updated_at.is_empty() {
        fm.push(format!("updatedAt: {}", double_quote(&post.updated_at)));
    }
    fm.push(format!("summary: {}", double_quote(&post.summary)));
    fm.push("authors:".to_string());
    fm.push(format!("  - name: {}", double_quote(&post.author)));
    if !post.category.is_empty() {
        fm.push(format!("category: {}", double_quote(&post.category)));
    }
    if !post.cover_image.is_empty() {
        fm.push(format!("image: {}", double_quote(&post.cover_image)));
    }
    fm.extend(["---".to_string(), String::new(), String::new()]);

    fm.join("\n") + &post.html_body
}

pub fn document_path(out_dir: &Path, slug: &str, extension: &str) -> PathBuf {
    out_dir.join(format!("{}.{}", slug, extension))
}

/// Write `{slug}.{extension}` under `out_dir`. An existing file is an error
/// unless `overwrite` is set.
pub fn write_document(out_dir: &Path, post: &Post, extension: &str, overwrite: bool) -> Result<PathBuf> {
    let path = document_path(out_dir, &post.slug, extension);
    if path.exists() && !overwrite {
        return Err(ImportError::AlreadyExists(path).into());
    }
    fs::write(&path, build_document(post))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
