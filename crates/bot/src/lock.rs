use std::fs;
use std::path::PathBuf;

use anyhow::{Context, bail};
use tracing::warn;

/// Single-instance guard: two pollers on one bot token would steal each
/// other's updates. The lock file holds the owning pid and is removed
/// when the guard drops.
pub struct InstanceLock {
    path: PathBuf,
}

impl InstanceLock {
    pub fn acquire(data_folder: &str) -> anyhow::Result<Self> {
        let path = PathBuf::from(data_folder).join("bot.lock");
        if path.exists() {
            bail!(
                "lock file {} exists; is another instance running? Remove it if not.",
                path.display()
            );
        }
        fs::write(&path, std::process::id().to_string())
            .with_context(|| format!("could not write lock file {}", path.display()))?;
        Ok(Self { path })
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("could not remove lock file {}: {}", self.path.display(), e);
        }
    }
}
