use serde::Deserialize;

use super::{date, html};
use crate::error::ImportError;

/// One raw row of the Webflow CSV export. Unknown columns are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceRow {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Slug", default)]
    pub slug: String,
    #[serde(rename = "Published On", default)]
    pub published_on: String,
    #[serde(rename = "Created On", default)]
    pub created_on: String,
    #[serde(rename = "Updated On", default)]
    pub updated_on: String,
    #[serde(rename = "Meta description", default)]
    pub meta_description: String,
    #[serde(rename = "Author", default)]
    pub author: String,
    #[serde(rename = "Post category", default)]
    pub post_category: String,
    #[serde(rename = "Blog Post Cover", default)]
    pub cover: String,
    #[serde(rename = "Blog Post Content", default)]
    pub content: String,
    /// Filled from the backfill column, if the CSV has one.
    #[serde(skip)]
    pub scraped_content: String,
}

/// A validated, normalized blog post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub title: String,
    pub slug: String,
    pub published_at: String,
    pub created_at: String,
    pub updated_at: String,
    pub summary: String,
    pub author: String,
    pub category: String,
    pub cover_image: String,
    pub html_body: String,
}

impl TryFrom<&SourceRow> for Post {
    type Error = ImportError;

    fn try_from(row: &SourceRow) -> Result<Self, Self::Error> {
        let title = row.name.trim().to_string();
        let slug = row.slug.trim().to_string();
        let published_at = parse_date("Published On", &row.published_on)?;
        let created_at = parse_date("Created On", &row.created_on)?;
        let updated_at = parse_date("Updated On", &row.updated_on)?;
        let summary = row.meta_description.trim().to_string();
        let author = row.author.trim().to_string();

        let missing: Vec<&'static str> = [
            ("Name", &title),
            ("Slug", &slug),
            ("Published On", &published_at),
            ("Meta description", &summary),
            ("Author", &author),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_empty())
        .map(|(k, _)| k)
        .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingFields(missing));
        }

        let body = if row.content.trim().is_empty() {
            &row.scraped_content
        } else {
            &row.content
        };

        Ok(Post {
            title,
            slug,
            published_at,
            created_at,
            updated_at,
            summary,
            author,
            category: row.post_category.trim().to_string(),
            cover_image: row.cover.trim().to_string(),
            html_body: html::clean(body),
        })
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<String, ImportError> {
    date::to_iso_date(value).map_err(|source| ImportError::InvalidDate {
        field,
        value: value.to_string(),
        source,
    })
}
