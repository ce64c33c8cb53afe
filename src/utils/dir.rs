use std::{io, path::Path};

use anyhow::Result;

/// Makes sure the directory exists. An existing directory is not an error.
pub fn ensure_dir(path: &Path) -> Result<()> {
    match std::fs::create_dir_all(path) {
        Ok(_) => Ok(()),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(v) => Err(v.into()),
    }
}
