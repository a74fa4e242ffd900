use crate::error::Result;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Plain-text transcript that grows one page fragment at a time.
///
/// The file is opened in append mode for every fragment and closed again, so
/// an interrupted run leaves every completed fragment on disk.
#[derive(Debug)]
pub struct Transcript {
    path: PathBuf,
    fragments: usize,
}

impl Transcript {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fragments: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fragments appended during this run
    pub fn fragments(&self) -> usize {
        self.fragments
    }

    /// Appends each line followed by a newline
    pub fn append(&mut self, lines: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        for line in lines {
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;

        self.fragments += 1;
        ::log::debug!(
            "Appended {} lines to {} (fragment {})",
            lines.len(),
            self.path.display(),
            self.fragments
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_append_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut transcript = Transcript::new(dir.path().join("scribd").join("Doc.txt"));

        transcript.append(&lines(&["page one", "still one"])).unwrap();
        transcript.append(&lines(&["page two"])).unwrap();

        let contents = fs::read_to_string(transcript.path()).unwrap();
        assert_eq!(contents, "page one\nstill one\npage two\n");
        assert_eq!(transcript.fragments(), 2);
    }

    #[test]
    fn test_empty_fragment_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut transcript = Transcript::new(dir.path().join("Doc.txt"));

        transcript.append(&[]).unwrap();

        assert_eq!(fs::read_to_string(transcript.path()).unwrap(), "");
        assert_eq!(transcript.fragments(), 1);
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Doc.txt");
        fs::write(&path, "earlier\n").unwrap();

        let mut transcript = Transcript::new(&path);
        transcript.append(&lines(&["later"])).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "earlier\nlater\n");
    }
}
