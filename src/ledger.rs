use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;

/// Durable append-only set of addresses already acted upon.
///
/// One address per line, newline-delimited, loaded fully at open. Membership
/// is an O(1) set lookup; `record` is an atomic check-then-append under a
/// single lock, flushed and fsynced before the entry becomes visible. Entries
/// are never removed and survive restarts.
///
/// An ephemeral variant keeps the same semantics in memory only, for
/// simulation runs that must not touch the durable files.
///
/// Clones share the same underlying file and set (single-writer discipline).
#[derive(Clone)]
pub struct Ledger {
    inner: Arc<Mutex<Inner>>,
    path: Option<PathBuf>,
}

struct Inner {
    file: Option<File>,
    entries: HashSet<String>,
}

impl Ledger {
    /// Open (or create) the ledger file and load existing entries.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&path)
            .with_context(|| format!("failed to open ledger {}", path.display()))?;

        let mut entries = HashSet::new();
        let reader = BufReader::new(
            File::open(&path).with_context(|| format!("failed to read ledger {}", path.display()))?,
        );
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                entries.insert(trimmed.to_string());
            }
        }

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                file: Some(file),
                entries,
            })),
            path: Some(path),
        })
    }

    /// In-memory ledger: same check-then-append guarantees, nothing on disk.
    /// Entries live for this process only.
    pub fn ephemeral() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                file: None,
                entries: HashSet::new(),
            })),
            path: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn contains(&self, address: &str) -> bool {
        self.inner.lock().await.entries.contains(address)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.entries.is_empty()
    }

    /// Record an address. Returns `false` if it was already present (no
    /// duplicate line is written). The line hits disk before this returns.
    pub async fn record(&self, address: &str) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        if inner.entries.contains(address) {
            return Ok(false);
        }
        if let Some(file) = inner.file.as_mut() {
            writeln!(file, "{address}").with_context(|| {
                format!(
                    "failed to append to ledger {}",
                    self.path.as_deref().unwrap_or(Path::new("?")).display()
                )
            })?;
            file.flush()?;
            file.sync_data()?;
        }
        inner.entries.insert(address.to_string());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn record_and_membership() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::open(dir.path().join("bought.txt")).unwrap();

        assert!(!ledger.contains("0:abc").await);
        assert!(ledger.record("0:abc").await.unwrap());
        assert!(ledger.contains("0:abc").await);
        assert_eq!(ledger.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_record_is_detected_and_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bought.txt");
        let ledger = Ledger::open(&path).unwrap();

        assert!(ledger.record("0:abc").await.unwrap());
        assert!(!ledger.record("0:abc").await.unwrap());
        assert!(ledger.contains("0:abc").await);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().filter(|l| *l == "0:abc").count(), 1);
    }

    #[tokio::test]
    async fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sent.txt");
        {
            let ledger = Ledger::open(&path).unwrap();
            ledger.record("EQAAAA").await.unwrap();
            ledger.record("EQBBBB").await.unwrap();
        }
        let reopened = Ledger::open(&path).unwrap();
        assert!(reopened.contains("EQAAAA").await);
        assert!(reopened.contains("EQBBBB").await);
        assert_eq!(reopened.len().await, 2);
    }

    #[tokio::test]
    async fn ephemeral_ledger_keeps_entries_in_memory_only() {
        let ledger = Ledger::ephemeral();
        assert!(ledger.path().is_none());

        assert!(ledger.record("0:abc").await.unwrap());
        assert!(ledger.contains("0:abc").await);
        assert!(!ledger.record("0:abc").await.unwrap());
    }

    #[tokio::test]
    async fn tolerates_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.txt");
        std::fs::write(&path, "0:abc\n\n0:def\n").unwrap();
        let ledger = Ledger::open(&path).unwrap();
        assert!(ledger.contains("0:abc").await);
        assert!(ledger.contains("0:def").await);
        assert_eq!(ledger.len().await, 2);
    }
}
