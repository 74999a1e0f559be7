use std::collections::HashMap;
use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tempfile::NamedTempFile;

use crate::convert::record::SourceRow;

const SLUG_COLUMN: &str = "Slug";

/// Read every row of the export as a `SourceRow`, in file order.
///
/// `content_column` is the backfill column; when present its value is carried
/// on the row as a body fallback.
pub fn read_rows(path: &Path, content_column: &str) -> Result<Vec<SourceRow>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);
    let headers = reader.headers()?.clone();
    let scraped_idx = headers.iter().position(|h| h == content_column);

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Bad CSV record at row {}", i + 1))?;
        let mut row: SourceRow = record
            .deserialize(Some(&headers))
            .with_context(|| format!("Bad CSV record at row {}", i + 1))?;
        if let Some(value) = scraped_idx.and_then(|idx| record.get(idx)) {
            row.scraped_content = value.to_string();
        }
        rows.push(row);
    }
    Ok(rows)
}

/// The whole CSV held in memory, all columns preserved.
pub struct Table {
    pub headers: StringRecord,
    pub records: Vec<StringRecord>,
}

/// Outcome of merging scraped content into the table.
#[derive(Debug, Default)]
pub struct MergeStats {
    pub total: usize,
    pub enriched: usize,
    pub missing: Vec<String>,
}

impl Table {
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);
        let headers = reader.headers()?.clone();
        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self { headers, records })
    }

    /// Add (or overwrite) `column`, filled from `content` by each row's slug.
    ///
    /// With `keep_existing` unset, rows without content get an empty cell. With
    /// it set (a partial scrape), only rows with scraped content are rewritten
    /// and every other cell keeps its current value.
    pub fn merge_column(
        &mut self,
        column: &str,
        content: &HashMap<String, Option<String>>,
        keep_existing: bool,
    ) -> Result<MergeStats> {
        let slug_idx = self
            .headers
            .iter()
            .position(|h| h == SLUG_COLUMN)
            .with_context(|| format!("CSV has no {} column", SLUG_COLUMN))?;
        let col_idx = match self.headers.iter().position(|h| h == column) {
            Some(idx) => idx,
            None => {
                self.headers.push_field(column);
                self.headers.len() - 1
            }
        };
        let width = self.headers.len();

        let mut stats = MergeStats {
            total: self.records.len(),
            ..Default::default()
        };
        for record in &mut self.records {
            let slug = record.get(slug_idx).unwrap_or("").trim().to_string();
            let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
            fields.resize(width, String::new());

            match content.get(&slug).and_then(|v| v.as_deref()) {
                Some(value) => fields[col_idx] = value.to_string(),
                None if keep_existing => {}
                None => fields[col_idx].clear(),
            }
            if fields[col_idx].is_empty() {
                stats.missing.push(slug);
            } else {
                stats.enriched += 1;
            }
            *record = StringRecord::from(fields);
        }
        Ok(stats)
    }

    /// Write to a temp file beside `path`, then rename over it. An existing
    /// file's permissions carry over to the replacement.
    pub fn write_atomic(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        {
            let mut writer = WriterBuilder::new().flexible(true).from_writer(&mut tmp);
            writer.write_record(&self.headers)?;
            for record in &self.records {
                writer.write_record(record)?;
            }
            writer.flush()?;
        }
        if let Ok(meta) = fs::metadata(path) {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .with_context(|| format!("Failed to copy permissions of {}", path.display()))?;
        }
        tmp.persist(path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "tests/fixtures/posts.csv";

    #[test]
    fn reads_fixture_rows_in_order() {
        let rows = read_rows(Path::new(FIXTURE), "scraped_content").unwrap();
        let slugs: Vec<_> = rows.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, ["hello-world", "rag-in-practice", "fine-tuning-llms", "no-author", "vision-models"]);
        assert_eq!(rows[0].name, "Hello World");
        assert!(rows[1].meta_description.contains("\"quotes\""));
        assert!(rows[1].content.contains('\n'));
        assert_eq!(rows[2].scraped_content, "");
    }

    #[test]
    fn missing_column_defaults_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("min.csv");
        std::fs::write(&path, "Name,Slug,Extra\nA,a,x\n").unwrap();
        let rows = read_rows(&path, "scraped_content").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].author, "");
        assert_eq!(rows[0].slug, "a");
    }

    #[test]
    fn merge_adds_column_and_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.csv");
        std::fs::write(&path, "Name,Slug,Author\nA,a,x\nB,b,y\nC,c,z\n").unwrap();

        let content = HashMap::from([
            ("a".to_string(), Some("<div>A</div>".to_string())),
            ("b".to_string(), None),
        ]);
        let mut table = Table::read(&path).unwrap();
        let stats = table.merge_column("scraped_content", &content, false).unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.enriched, 1);
        assert_eq!(stats.missing, ["b", "c"]);
        table.write_atomic(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "Name,Slug,Author,scraped_content\nA,a,x,<div>A</div>\nB,b,y,\nC,c,z,\n"
        );
        let rows = read_rows(&path, "scraped_content").unwrap();
        assert_eq!(rows[0].scraped_content, "<div>A</div>");
    }

    #[test]
    fn merge_overwrites_existing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.csv");
        std::fs::write(&path, "Slug,scraped_content,Name\na,old,A\nb,stale,B\n").unwrap();

        let content = HashMap::from([("a".to_string(), Some("new".to_string()))]);
        let mut table = Table::read(&path).unwrap();
        table.merge_column("scraped_content", &content, false).unwrap();
        table.write_atomic(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Slug,scraped_content,Name\na,new,A\nb,,B\n");
    }

    #[test]
    fn merge_without_slug_column_fails() {
        let mut table = Table {
            headers: StringRecord::from(vec!["Name"]),
            records: vec![],
        };
        assert!(table.merge_column("scraped_content", &HashMap::new(), false).is_err());
    }

    #[test]
    fn partial_merge_keeps_other_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.csv");
        std::fs::write(&path, "Slug,scraped_content\na,<div>A</div>\nb,<div>B</div>\nc,\n").unwrap();

        let content = HashMap::from([
            ("a".to_string(), Some("<div>A2</div>".to_string())),
            ("b".to_string(), None),
        ]);
        let mut table = Table::read(&path).unwrap();
        let stats = table.merge_column("scraped_content", &content, true).unwrap();
        assert_eq!(stats.enriched, 2);
        assert_eq!(stats.missing, ["c"]);
        table.write_atomic(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Slug,scraped_content\na,<div>A2</div>\nb,<div>B</div>\nc,\n");
    }

    #[cfg(unix)]
    #[test]
    fn rewrite_keeps_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.csv");
        std::fs::write(&path, "Slug\na\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let mut table = Table::read(&path).unwrap();
        table.merge_column("scraped_content", &HashMap::new(), false).unwrap();
        table.write_atomic(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
