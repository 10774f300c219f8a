use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use stormcore::analysis::SiteTable;
use stormcore::export::write_collection;

fn create(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    File::create(path).with_context(|| format!("failed to create {}", path.display()))
}

fn write_rows_to<T: Serialize, W: Write>(rows: &[T], sink: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(sink);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes rows as CSV with a header derived from the row type (`-` for stdout).
pub fn write_rows<T: Serialize>(rows: &[T], path: &Path) -> Result<()> {
    if path == Path::new("-") {
        let stdout = io::stdout();
        return write_rows_to(rows, stdout.lock());
    }
    write_rows_to(rows, create(path)?).with_context(|| format!("writing {}", path.display()))
}

pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .with_context(|| format!("parsing {}", path.display()))
}

pub fn write_table(table: &SiteTable, path: &Path) -> Result<()> {
    table
        .write(create(path)?)
        .with_context(|| format!("writing {}", path.display()))
}

pub fn read_table(path: &Path) -> Result<SiteTable> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    SiteTable::read(file).with_context(|| format!("parsing {}", path.display()))
}

pub fn write_geojson(collection: &serde_json::Value, path: &Path) -> Result<()> {
    write_collection(create(path)?, collection)
        .with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stormcore::records::YearCount;
    use tempfile::tempdir;

    #[test]
    fn rows_round_trip_through_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/counts.csv");
        let rows = vec![
            YearCount {
                year: 2004,
                storm_count: 6,
            },
            YearCount {
                year: 2005,
                storm_count: 8,
            },
        ];
        write_rows(&rows, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("year,storm_count\n2004,6\n"));
        let back: Vec<YearCount> = read_rows(&path).unwrap();
        assert_eq!(back, rows);
    }
}
