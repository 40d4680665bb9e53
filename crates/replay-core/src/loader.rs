//! Fixture loading from disk
//!
//! One file per fixture. Directories given on the command line are expanded
//! into the `*.json` files they contain, sorted by file name so runs are
//! reproducible.

use crate::error::{FixtureLoadError, LoadResult};
use crate::fixture::Fixture;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Load a single fixture file
pub async fn load_fixture(path: impl AsRef<Path>) -> LoadResult<Fixture> {
    let path = path.as_ref();
    debug!("Loading fixture: {:?}", path);

    let content = fs::read(path)
        .await
        .map_err(|e| FixtureLoadError::read(path, e))?;

    let mut fixture: Fixture = serde_json::from_slice(&content)
        .map_err(|e| FixtureLoadError::parse(path, e))?;
    fixture.id = path.display().to_string();

    Ok(fixture)
}

/// Expand a list of files and directories into fixture file paths
///
/// Directories contribute their `*.json` entries (not recursive), sorted by
/// name. Plain paths are kept in the order given, even if they do not exist,
/// so that the failure is reported against the fixture rather than dropped.
pub async fn discover_fixtures(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut found = Vec::new();

    for path in paths {
        let is_dir = matches!(fs::metadata(path).await, Ok(meta) if meta.is_dir());
        if !is_dir {
            found.push(path.clone());
            continue;
        }

        let mut entries = match fs::read_dir(path).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read fixture directory {:?}: {}", path, e);
                continue;
            }
        };

        let mut files = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let file = entry.path();
                    if file.extension().and_then(|e| e.to_str()) == Some("json") {
                        files.push(file);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to list fixture directory {:?}: {}", path, e);
                    break;
                }
            }
        }
        files.sort();
        debug!("Found {} fixtures in {:?}", files.len(), path);
        found.extend(files);
    }

    found
}

/// Load every fixture, keeping failures alongside successes
pub async fn load_fixtures(paths: &[PathBuf]) -> Vec<LoadResult<Fixture>> {
    let mut fixtures = Vec::with_capacity(paths.len());
    for path in discover_fixtures(paths).await {
        fixtures.push(load_fixture(&path).await);
    }
    fixtures
}
