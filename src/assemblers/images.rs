use crate::assemblers::pdf::PageEncoder;
use crate::error::Result;
use crate::utils::page_index_from_path;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Page images persisted during one run, keyed by page index
#[derive(Debug)]
pub struct ImageStore {
    dir: PathBuf,
    /// Discovery order, not page order
    paths: Vec<PathBuf>,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            paths: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<index>.jpg`
    pub fn image_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{index}.jpg"))
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Writes one page image, replacing any file left at that index
    pub fn persist(&mut self, bytes: &[u8], index: usize) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let path = self.image_path(index);
        match fs::remove_file(&path) {
            Ok(()) => ::log::debug!("Removed stale image {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::write(&path, bytes)?;

        if !self.paths.contains(&path) {
            self.paths.push(path.clone());
        }
        Ok(path)
    }

    /// Recorded paths in page order
    pub fn sorted_paths(&self) -> Vec<PathBuf> {
        let mut paths = self.paths.clone();
        sort_by_page_index(&mut paths);
        paths
    }

    /// Encodes the persisted pages, in page order, into `output`.
    ///
    /// Returns `None` without touching the filesystem when nothing was persisted.
    pub fn assemble<E: PageEncoder>(&self, encoder: &E, output: &Path) -> Result<Option<PathBuf>> {
        if self.is_empty() {
            ::log::info!("No page images persisted, skipping {}", output.display());
            return Ok(None);
        }

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }

        let ordered = self.sorted_paths();
        encoder.encode(&ordered, output)?;

        ::log::info!("Assembled {} pages into {}", ordered.len(), output.display());
        Ok(Some(output.to_path_buf()))
    }
}

/// Sorts image paths by the integer value of their file stem.
///
/// Stems that are not integers sort after every numbered page, by name.
pub fn sort_by_page_index(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| {
        let key_a = page_index_from_path(a).unwrap_or(usize::MAX);
        let key_b = page_index_from_path(b).unwrap_or(usize::MAX);
        key_a.cmp(&key_b).then_with(|| a.cmp(b))
    });
}
