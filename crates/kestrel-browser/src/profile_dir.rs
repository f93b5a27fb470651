use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Manages a profile's browser data directory
pub struct ProfileDir {
    path: PathBuf,
    is_ephemeral: bool,
}

impl ProfileDir {
    /// Create an ephemeral data directory that is deleted on drop
    pub fn ephemeral() -> Result<Self> {
        let temp_dir = tempfile::tempdir().map_err(|e| Error::Io(e.into()))?;
        let path = temp_dir.keep();

        Ok(Self {
            path,
            is_ephemeral: true,
        })
    }

    /// Create or reuse a persistent data directory at the given path
    pub fn persistent(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(&path).map_err(Error::Io)?;
        }

        Ok(Self {
            path,
            is_ephemeral: false,
        })
    }

    /// Create or reuse the named profile under the default root directory
    pub fn named(name: &str) -> Result<Self> {
        Self::persistent(Self::root_dir()?.join(name))
    }

    /// Root directory holding named profiles (`~/.kestrel/profiles`)
    pub fn root_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Browser("Could not determine home directory".to_string()))?;
        Ok(home.join(".kestrel").join("profiles"))
    }

    /// Get the data directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if this directory is deleted on drop
    pub fn is_ephemeral(&self) -> bool {
        self.is_ephemeral
    }

    /// Total size of the data directory in bytes
    pub fn size(&self) -> Result<u64> {
        fn walk(dir: &Path) -> std::io::Result<u64> {
            let mut total = 0;
            for entry in std::fs::read_dir(dir)? {
                let entry = entry?;
                let metadata = entry.metadata()?;
                if metadata.is_dir() {
                    total += walk(&entry.path())?;
                } else {
                    total += metadata.len();
                }
            }
            Ok(total)
        }

        walk(&self.path).map_err(Error::Io)
    }
}

impl Drop for ProfileDir {
    fn drop(&mut self) {
        if self.is_ephemeral && self.path.exists() {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}
