use super::record::SourceRow;
use crate::error::ImportError;

/// Which rows of the source an import run touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Slug(String),
    Limit(i64),
    All,
}

impl Selection {
    /// Pick rows in source order. Runs before any per-row normalization.
    pub fn apply(&self, rows: Vec<SourceRow>) -> Result<Vec<SourceRow>, ImportError> {
        match self {
            Selection::Slug(slug) => {
                let target = slug.trim();
                let chosen: Vec<_> = rows
                    .into_iter()
                    .filter(|r| r.slug.trim() == target)
                    .collect();
                if chosen.is_empty() {
                    return Err(ImportError::SlugNotFound(target.to_string()));
                }
                Ok(chosen)
            }
            Selection::Limit(n) if *n <= 0 => Err(ImportError::InvalidLimit(*n)),
            Selection::Limit(n) => Ok(rows.into_iter().take(*n as usize).collect()),
            Selection::All => Ok(rows),
        }
    }
}
