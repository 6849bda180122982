// Directory walker: push every matching file under a root to the remote
// service, updating gists whose file name already exists and creating the
// rest.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::api::GistClient;
use crate::bundle;
use crate::error::{GistError, Result};
use crate::resolve::{self, Resolution};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPolicy {
    /// Record each failure and keep going.
    #[default]
    ContinueOnError,
    /// Stop at the first failure and return it.
    FailFast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Created,
    Updated,
}

#[derive(Debug)]
pub struct SyncOutcome {
    pub path: PathBuf,
    pub action: SyncAction,
    pub id: String,
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub synced: Vec<SyncOutcome>,
    pub failed: Vec<(PathBuf, GistError)>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn count(&self, action: SyncAction) -> usize {
        self.synced.iter().filter(|o| o.action == action).count()
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

/// Regular files under `root` with extension `ext`, sorted by path.
/// Hidden files and directories are skipped.
pub fn collect_files(root: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let ext = ext.trim_start_matches('.');
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            GistError::FileNotFound {
                path,
                source: e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop")),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) == Some(ext) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Sync every file in `files`. The remote directory is listed once up front
/// and every file is resolved against that snapshot.
///
/// Files sharing a base name with an earlier file in the list are skipped
/// and reported as failures; pushing both would leave two gists holding the
/// same file name, and every later sync of that name would be ambiguous.
pub fn sync_files<T: Transport>(
    client: &GistClient<T>,
    files: &[PathBuf],
    policy: SyncPolicy,
) -> Result<SyncReport> {
    let directory = client.list_all()?;
    let mut seen: HashMap<String, &Path> = HashMap::new();

    let mut report = SyncReport::default();
    for path in files {
        let result = bundle::base_name(path).and_then(|name| {
            if let Some(first) = seen.get(&name) {
                return Err(GistError::InvalidArgument(format!(
                    "{} has the same file name as {}",
                    path.display(),
                    first.display()
                )));
            }
            seen.insert(name.clone(), path);

            match resolve::resolve_name(&name, &directory) {
                Resolution::Resolved(id) => client
                    .update(path, Some(&id))
                    .map(|g| (SyncAction::Updated, g.id)),
                Resolution::NotFound => client
                    .create(path, None)
                    .map(|g| (SyncAction::Created, g.id)),
                Resolution::Ambiguous(conflicting_ids) => Err(GistError::Ambiguous {
                    file_name: name,
                    conflicting_ids,
                }),
            }
        });
        match result {
            Ok((action, id)) => {
                log::info!("{:?} {} -> {}", action, path.display(), id);
                report.synced.push(SyncOutcome {
                    path: path.clone(),
                    action,
                    id,
                });
            }
            Err(e) if policy == SyncPolicy::FailFast => return Err(e),
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                report.failed.push((path.clone(), e));
            }
        }
    }
    Ok(report)
}

/// Walk `root` for files with extension `ext` and sync them.
pub fn sync_dir<T: Transport>(
    client: &GistClient<T>,
    root: &Path,
    ext: &str,
    policy: SyncPolicy,
) -> Result<SyncReport> {
    let files = collect_files(root, ext)?;
    log::debug!("Found {} file(s) under {}", files.len(), root.display());
    sync_files(client, &files, policy)
}
