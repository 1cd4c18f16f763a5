//! Loading and saving data block files.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::tree::Block;
use crate::writer::WriteOptions;

/// Read and parse a data block file.
///
/// A missing file yields an empty root block. Other I/O errors and parse
/// errors propagate.
pub fn load_text(path: impl AsRef<Path>) -> Result<Block> {
    let path = path.as_ref();
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "data block file not found, using empty block");
            return Ok(Block::new());
        }
        Err(err) => return Err(err.into()),
    };

    debug!(path = %path.display(), bytes = bytes.len(), "loading data block");
    Block::parse(&bytes)
}

/// Serialize `block` and write it to `path` atomically.
pub fn save_text(block: &Block, path: impl AsRef<Path>) -> Result<()> {
    save_text_with(block, path, WriteOptions::default())
}

/// [`save_text`] with explicit layout options.
///
/// The text goes to a temp file in the target's directory first, is synced,
/// then renamed over the target. Parent directories are created.
pub fn save_text_with(block: &Block, path: impl AsRef<Path>, options: WriteOptions) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let text = block.to_text_with(options);
    let temp_path = temp_path_for(path);
    debug!(path = %path.display(), bytes = text.len(), "saving data block");

    let written = write_and_sync(&temp_path, text.as_bytes())
        .and_then(|()| fs::rename(&temp_path, path));
    if let Err(err) = written {
        // The rename error is the one reported
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    Ok(())
}

fn write_and_sync(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.write_all(content)?;
    file.sync_all()
}

/// Sibling temp file, so the rename stays on one filesystem.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

impl Block {
    /// See [`load_text`].
    pub fn load_text(path: impl AsRef<Path>) -> Result<Block> {
        load_text(path)
    }

    /// See [`save_text`].
    pub fn save_text(&self, path: impl AsRef<Path>) -> Result<()> {
        save_text(self, path)
    }
}
