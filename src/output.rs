//! Writing matched collections and dedupe reports to disk
//!
//! Every file is written to a temporary file in the target directory first
//! and then renamed over the destination, so readers never observe a
//! partially written JSON document.

use crate::core::error::{Error, Result};
use crate::core::inventory::{Collection, SubnetReport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Subdirectory of the output directory for matched security lists
pub const SECURITY_LISTS_SUBDIR: &str = "sls";

/// Subdirectory of the output directory for matched route tables
pub const ROUTE_TABLES_SUBDIR: &str = "routing";

/// File name for a collection: `<vcn>_<name>.json` with path separators and
/// dots replaced.
///
/// ```
/// use slcheck::output::collection_file_name;
///
/// assert_eq!(collection_file_name("prod", "web/sl.v2"), "prod_web_sl_v2.json");
/// ```
pub fn collection_file_name(vcn_name: &str, display_name: &str) -> String {
    let stem: String = format!("{vcn_name}_{display_name}")
        .chars()
        .map(|c| if matches!(c, '/' | '.') { '_' } else { c })
        .collect();
    format!("{stem}.json")
}

fn persist_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

async fn write_json<T: Serialize + ?Sized>(path: PathBuf, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::task::spawn_blocking(move || persist_atomically(&path, &json))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
}

/// Writes a collection as pretty JSON to
/// `<output_dir>/<subdir>/<vcn>_<name>.json` and returns the path.
///
/// # Async
/// Directory creation uses `tokio::fs`; the write and rename run on the
/// blocking pool.
pub async fn write_collection<C: Collection>(
    output_dir: &Path,
    subdir: &str,
    vcn_name: &str,
    collection: &C,
) -> Result<PathBuf> {
    let path = output_dir
        .join(subdir)
        .join(collection_file_name(vcn_name, collection.display_name()));
    write_json(path.clone(), collection).await?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

/// Deletes every file directly inside `dir`.
///
/// A missing directory is not an error. Subdirectories are left alone.
pub async fn clear_directory(dir: &Path) -> Result<usize> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            tokio::fs::remove_file(entry.path()).await?;
            removed += 1;
        }
    }
    debug!("Cleared {removed} file(s) from {}", dir.display());
    Ok(removed)
}

/// Build that produced a report
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo<'a> {
    pub version: &'a str,
    pub commit: &'a str,
    pub build_time: &'a str,
}

/// JSON document produced by `check --json`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report<'a> {
    pub generated_at: DateTime<Utc>,
    pub build: BuildInfo<'a>,
    pub subnets: &'a [SubnetReport],
}

/// Stores the dedupe reports of a run at `path`.
pub async fn write_report(
    path: &Path,
    build: BuildInfo<'_>,
    subnets: &[SubnetReport],
) -> Result<()> {
    let report = Report {
        generated_at: Utc::now(),
        build,
        subnets,
    };
    write_json(path.to_path_buf(), &report).await?;
    info!("Wrote report for {} subnet(s) to {}", subnets.len(), path.display());
    Ok(())
}
