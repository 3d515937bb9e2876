use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Filesystem store for downloaded event images.
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write image bytes for an event, returning the stored path. The path
    /// doubles as the record's image reference. Ids that would escape the
    /// `external_events` directory are rejected.
    pub fn store_image(&self, external_id: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        if external_id.is_empty()
            || external_id == "."
            || external_id == ".."
            || external_id.contains(['/', '\\'])
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsafe external id for image path: {external_id:?}"),
            ));
        }
        let path = self.root.join("external_events").join(external_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        Ok(path)
    }
}
