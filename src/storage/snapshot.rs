//! Git-backed snapshot store
//!
//! Keeps point-in-time copies of the installed output files in a private
//! git repository under `.rcweave/snapshots`. Every snapshot is one commit
//! with a `snap-<timestamp>` lightweight tag as its handle; cleanup deletes
//! old tags. All git access goes through this module via git2, never the
//! git CLI.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use git2::{ObjectType, Repository, Signature, TreeWalkMode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot '{0}' not found")]
    UnknownSnapshot(String),

    #[error("Nothing to snapshot: no installed output files")]
    NothingToSnapshot,

    #[error("Snapshot repository error: {0}")]
    Git(#[from] git2::Error),

    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Metadata for one stored snapshot
#[derive(Debug, Clone, serde::Serialize)]
pub struct SnapshotInfo {
    /// Tag name, e.g. `snap-20260807-153000`
    pub id: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub file_count: usize,
}

/// Store rooted at a dedicated git repository
pub struct SnapshotStore {
    repo: Repository,
}

impl SnapshotStore {
    /// Opens the store, initializing the repository on first use
    pub fn open_or_init(path: &Path) -> Result<Self, SnapshotError> {
        let repo = if path.join(".git").exists() {
            Repository::open(path)?
        } else {
            fs::create_dir_all(path)?;
            Repository::init(path)?
        };

        Ok(Self { repo })
    }

    /// Records a snapshot of the given files (relative name, content).
    ///
    /// Names may contain directory components (`.config/fish/config.fish`).
    pub fn create(
        &self,
        files: &[(String, String)],
        message: &str,
    ) -> Result<SnapshotInfo, SnapshotError> {
        if files.is_empty() {
            return Err(SnapshotError::NothingToSnapshot);
        }

        let workdir = self
            .repo
            .workdir()
            .expect("snapshot repository is never bare")
            .to_path_buf();

        let mut index = self.repo.index()?;
        // Each snapshot captures exactly the given set, not leftovers from
        // earlier commits
        index.clear()?;
        for (name, content) in files {
            let dest = workdir.join(name);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, content)?;
            index.add_path(Path::new(name))?;
        }
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let sig = Signature::now("rcweave", "rcweave@localhost")?;

        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.target())
            .and_then(|oid| self.repo.find_commit(oid).ok());
        let parents: Vec<_> = parent.iter().collect();

        let commit_id = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;

        let id = self.next_tag_name();
        let object = self.repo.find_object(commit_id, Some(ObjectType::Commit))?;
        self.repo.tag_lightweight(&id, &object, false)?;

        Ok(SnapshotInfo {
            id,
            message: message.to_string(),
            created_at: Utc::now(),
            file_count: files.len(),
        })
    }

    /// Lists snapshots, newest first
    pub fn list(&self) -> Result<Vec<SnapshotInfo>, SnapshotError> {
        let names = self.repo.tag_names(Some("snap-*"))?;

        let mut snapshots = Vec::new();
        for name in names.iter().flatten() {
            let commit = self
                .repo
                .revparse_single(&format!("refs/tags/{}", name))?
                .peel_to_commit()?;

            let created_at = Utc
                .timestamp_opt(commit.time().seconds(), 0)
                .single()
                .unwrap_or_else(Utc::now);

            snapshots.push(SnapshotInfo {
                id: name.to_string(),
                message: commit.summary().unwrap_or("").to_string(),
                created_at,
                file_count: count_blobs(&commit.tree()?),
            });
        }

        // Tag names embed the timestamp, so name order is time order
        snapshots.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(snapshots)
    }

    /// Writes a snapshot's files back into the destination directory and
    /// returns the restored paths.
    pub fn restore(&self, id: &str, dest: &Path) -> Result<Vec<PathBuf>, SnapshotError> {
        let commit = self
            .repo
            .revparse_single(&format!("refs/tags/{}", id))
            .map_err(|_| SnapshotError::UnknownSnapshot(id.to_string()))?
            .peel_to_commit()?;

        let tree = commit.tree()?;
        let mut entries: Vec<(String, Vec<u8>)> = Vec::new();
        let mut walk_err = None;
        let walked = tree.walk(TreeWalkMode::PreOrder, |root, entry| {
            if entry.kind() == Some(ObjectType::Blob) {
                let name = match entry.name() {
                    Some(name) => format!("{}{}", root, name),
                    None => return 0,
                };
                match self.repo.find_blob(entry.id()) {
                    Ok(blob) => entries.push((name, blob.content().to_vec())),
                    Err(e) => {
                        walk_err = Some(e);
                        return -1;
                    }
                }
            }
            0
        });
        // A blob error aborts the walk; report the specific cause
        if let Some(e) = walk_err {
            return Err(e.into());
        }
        walked?;

        let mut restored = Vec::with_capacity(entries.len());
        for (name, content) in entries {
            let path = dest.join(&name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)?;
            restored.push(path);
        }

        Ok(restored)
    }

    /// Deletes all but the newest `keep` snapshots; returns how many went
    pub fn cleanup(&self, keep: usize) -> Result<usize, SnapshotError> {
        let snapshots = self.list()?;
        let mut deleted = 0;

        for snapshot in snapshots.iter().skip(keep) {
            self.repo.tag_delete(&snapshot.id)?;
            deleted += 1;
        }

        Ok(deleted)
    }

    /// Timestamped tag name, suffixed when several snapshots land in the
    /// same second
    fn next_tag_name(&self) -> String {
        let base = format!("snap-{}", Utc::now().format("%Y%m%d-%H%M%S"));
        let mut candidate = base.clone();
        let mut n = 1;
        while self
            .repo
            .find_reference(&format!("refs/tags/{}", candidate))
            .is_ok()
        {
            n += 1;
            candidate = format!("{}-{}", base, n);
        }
        candidate
    }
}

fn count_blobs(tree: &git2::Tree) -> usize {
    let mut count = 0;
    let _ = tree.walk(TreeWalkMode::PreOrder, |_, entry| {
        if entry.kind() == Some(ObjectType::Blob) {
            count += 1;
        }
        0
    });
    count
}
