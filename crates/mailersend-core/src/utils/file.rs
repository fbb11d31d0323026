//! File system operations and path handling utilities
//!
//! Everything written here holds credentials, so directories are created
//! owner-only and files are replaced atomically with owner-only permissions.

use crate::error::ConfigError;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[cfg(unix)]
const DIR_MODE: u32 = 0o700;
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

fn io_error(path: &Path, source: std::io::Error) -> ConfigError {
    ConfigError::FileIo {
        path: path.to_string_lossy().to_string(),
        source,
    }
}

/// Ensure a directory exists, creating it owner-only if necessary
pub fn ensure_private_directory<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(path).map_err(|e| io_error(path, e))
}

/// Replace `path` with `contents` through a sibling temp file and a rename.
pub fn write_private_atomic(path: &Path, contents: &[u8]) -> Result<(), ConfigError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(ConfigError::ConfigDirNotFound)?;
    ensure_private_directory(parent)?;

    let mut tmp_file = NamedTempFile::new_in(parent).map_err(|e| io_error(parent, e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp_file
            .as_file()
            .set_permissions(fs::Permissions::from_mode(FILE_MODE))
            .map_err(|e| io_error(tmp_file.path(), e))?;
    }

    tmp_file
        .write_all(contents)
        .and_then(|_| tmp_file.as_file().sync_all())
        .map_err(|e| io_error(tmp_file.path(), e))?;
    tmp_file
        .persist(path)
        .map_err(|e| io_error(path, e.error))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(FILE_MODE))
            .map_err(|e| io_error(path, e))?;
    }

    Ok(())
}
