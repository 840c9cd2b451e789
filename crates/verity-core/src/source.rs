//! Content sources: where candidate and reference text comes from.

use std::fmt;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::CompareError;

/// Readable, rewindable stream that can be shared across tasks.
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// Shared handle to a pre-opened stream.
pub type SharedStream = Arc<Mutex<dyn ReadSeek>>;

/// Text to compare: a file on disk, a pre-opened stream, or buffered text.
#[derive(Clone)]
pub enum ContentSource {
    /// File read in full; labelled by its path.
    Path(PathBuf),
    /// Pre-opened stream, rewound before every read.
    Stream { label: String, stream: SharedStream },
    /// Text already in memory.
    Text { label: String, text: String },
}

impl ContentSource {
    /// Source backed by a file on disk.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        ContentSource::Path(path.into())
    }

    /// Source backed by buffered text.
    pub fn text(label: impl Into<String>, text: impl Into<String>) -> Self {
        ContentSource::Text {
            label: label.into(),
            text: text.into(),
        }
    }

    /// Source backed by a readable, seekable stream.
    pub fn stream<S>(label: impl Into<String>, stream: S) -> Self
    where
        S: ReadSeek + 'static,
    {
        ContentSource::Stream {
            label: label.into(),
            stream: Arc::new(Mutex::new(stream)),
        }
    }

    /// Label used in reports.
    pub fn label(&self) -> String {
        match self {
            ContentSource::Path(path) => path.display().to_string(),
            ContentSource::Stream { label, .. } | ContentSource::Text { label, .. } => {
                label.clone()
            }
        }
    }

    /// Produce the `(label, text)` pair.
    ///
    /// Streams are rewound to their start before reading. Invalid UTF-8 is
    /// replaced rather than rejected. Blocking; async
    /// callers should run it on a blocking thread.
    pub fn resolve(&self) -> Result<(String, String), CompareError> {
        match self {
            ContentSource::Path(path) => {
                let label = self.label();
                let bytes = std::fs::read(path).map_err(|source| CompareError::Source {
                    label: label.clone(),
                    source,
                })?;
                Ok((label, String::from_utf8_lossy(&bytes).into_owned()))
            }
            ContentSource::Stream { label, stream } => {
                let mut guard = stream.lock().unwrap_or_else(PoisonError::into_inner);
                let text = read_from_start(&mut *guard).map_err(|source| CompareError::Source {
                    label: label.clone(),
                    source,
                })?;
                Ok((label.clone(), text))
            }
            ContentSource::Text { label, text } => Ok((label.clone(), text.clone())),
        }
    }
}

impl fmt::Debug for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            ContentSource::Stream { label, .. } => {
                f.debug_struct("Stream").field("label", label).finish()
            }
            ContentSource::Text { label, text } => f
                .debug_struct("Text")
                .field("label", label)
                .field("len", &text.len())
                .finish(),
        }
    }
}

impl From<PathBuf> for ContentSource {
    fn from(value: PathBuf) -> Self {
        ContentSource::Path(value)
    }
}

impl From<&Path> for ContentSource {
    fn from(value: &Path) -> Self {
        ContentSource::Path(value.to_path_buf())
    }
}

fn read_from_start(stream: &mut dyn ReadSeek) -> std::io::Result<String> {
    stream.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_text_source_resolves_label_and_text() {
        let source = ContentSource::text("candidate1", "3\n");
        let (label, text) = source.resolve().expect("resolve");
        assert_eq!(label, "candidate1");
        assert_eq!(text, "3\n");
    }

    #[test]
    fn test_path_source_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, "42\n").expect("write");
        let source = ContentSource::path(file.path());
        let (label, text) = source.resolve().expect("resolve");
        assert_eq!(label, file.path().display().to_string());
        assert_eq!(text, "42\n");
    }

    #[test]
    fn test_missing_path_is_source_error() {
        let source = ContentSource::path("/nonexistent/verity/out.txt");
        let err = source.resolve().unwrap_err();
        assert!(matches!(err, CompareError::Source { .. }));
    }

    #[test]
    fn test_stream_source_rewinds_before_reading() {
        let mut cursor = Cursor::new(Vec::new());
        cursor.write_all(b"1 2 3\n").expect("write");
        // Position is at the end after writing.
        let source = ContentSource::stream("out", cursor);
        let (_, first) = source.resolve().expect("resolve");
        let (_, second) = source.resolve().expect("resolve");
        assert_eq!(first, "1 2 3\n");
        assert_eq!(first, second);
    }
}
