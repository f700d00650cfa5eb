// Line-delimited JSON input and per-domain JSON output

use crate::error::{CoreError, Result};
use crate::site::SiteRecord;
use flate2::read::GzDecoder;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Open `path` for line reading, gunzipping it when the name ends in `.gz`
pub fn open_lines(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| CoreError::io(path, e))?;
    let gzipped = path.extension().is_some_and(|ext| ext == "gz");
    if gzipped {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Stream every JSON record in a line-delimited file through `handle`.
/// Blank lines are skipped. Returns the number of records seen.
pub fn for_each_record<F>(path: &Path, mut handle: F) -> Result<usize>
where
    F: FnMut(Value) -> Result<()>,
{
    let reader = open_lines(path)?;
    let mut count = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| CoreError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| CoreError::Json {
            path: path.to_path_buf(),
            line: index + 1,
            source,
        })?;
        handle(record)?;
        count += 1;
    }
    debug!("Read {} records from {}", count, path.display());
    Ok(count)
}

/// Load every record of a line-delimited JSON file into memory
pub fn read_records(path: &Path) -> Result<Vec<Value>> {
    info!("Loading {}", path.display());
    let mut records = Vec::new();
    for_each_record(path, |record| {
        records.push(record);
        Ok(())
    })?;
    Ok(records)
}

/// Output file for a record inside a view directory
pub fn record_path(dir: &Path, domain: &str) -> PathBuf {
    dir.join(format!("{}.json", domain))
}

/// Write one record as indented JSON to `<dir>/<domain>.json`
pub fn write_record(dir: &Path, site: &SiteRecord) -> Result<PathBuf> {
    let path = record_path(dir, &site.domain);
    let file = File::create(&path).map_err(|e| CoreError::io(&path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, site).map_err(|source| CoreError::Serialize {
        domain: site.domain.clone(),
        source,
    })?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| CoreError::io(&path, e))?;
    Ok(path)
}

/// Write a whole view into `dir`, creating it if needed
pub fn write_view(dir: &Path, sites: &[SiteRecord]) -> Result<usize> {
    fs::create_dir_all(dir).map_err(|e| CoreError::io(dir, e))?;
    for site in sites {
        write_record(dir, site)?;
    }
    info!("Wrote {} records to {}", sites.len(), dir.display());
    Ok(sites.len())
}
