use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::errors::BackupError;

/// Write `bytes` to `path` through a temp file in the same directory.
///
/// With `overwrite` the temp file replaces `path` atomically. Without it the
/// persist is no-clobber, so a file that appeared meanwhile is left alone.
///
/// # Errors
/// `FileExists` when not overwriting and the target exists; `Io` otherwise.
pub fn write_atomic(path: &Path, bytes: &[u8], overwrite: bool, private: bool) -> Result<(), BackupError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    if private {
        restrict_permissions(tmp.as_file())?;
    }
    let persisted = if overwrite { tmp.persist(path) } else { tmp.persist_noclobber(path) };
    match persisted {
        Ok(_) => Ok(()),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Err(BackupError::FileExists(path.to_path_buf())),
        Err(e) => Err(BackupError::Io(e.error)),
    }
}

/// Owner-only access on Unix; other platforms keep inherited ACLs.
fn restrict_permissions(file: &File) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))
    }
    #[cfg(not(unix))]
    {
        let _ = file;
        Ok(())
    }
}
