//! Input sources: the data fed to every program's standard input.
//!
//! Each call to [`InputSource::open_stdin`] yields an independent handle
//! positioned at the start, so concurrent programs never share a read
//! position and nothing has to be rewound afterwards.

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A fresh stdin feed for one process.
#[derive(Debug)]
pub enum StdinHandle {
    /// Opened file, handed to the child directly.
    File(File),
    /// In-memory bytes, written to the child through a pipe.
    Bytes(Arc<[u8]>),
}

/// Provider of program input.
pub trait InputSource: Send + Sync + fmt::Debug {
    /// Open a new handle positioned at the start of the input.
    fn open_stdin(&self) -> io::Result<StdinHandle>;

    /// Short description used in logs.
    fn describe(&self) -> String;
}

/// Input stored in a file; re-opened for every process.
#[derive(Debug, Clone)]
pub struct FileInput {
    path: PathBuf,
}

impl FileInput {
    /// Input read from `path`; the file is opened per process, not here.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InputSource for FileInput {
    fn open_stdin(&self) -> io::Result<StdinHandle> {
        File::open(&self.path).map(StdinHandle::File)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Input held in memory and shared by every process.
#[derive(Clone)]
pub struct MemoryInput {
    label: String,
    bytes: Arc<[u8]>,
}

impl MemoryInput {
    pub fn new(label: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self {
            label: label.into(),
            bytes: Arc::from(bytes),
        }
    }

    /// Buffer a pre-opened stream in full.
    ///
    /// The stream is rewound to its start first, so a handle that was just
    /// written to still yields everything it holds.
    pub fn from_stream<S>(label: impl Into<String>, mut stream: S) -> io::Result<Self>
    where
        S: Read + Seek,
    {
        stream.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes)?;
        Ok(Self::new(label, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for MemoryInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryInput")
            .field("label", &self.label)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl InputSource for MemoryInput {
    fn open_stdin(&self) -> io::Result<StdinHandle> {
        Ok(StdinHandle::Bytes(Arc::clone(&self.bytes)))
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_input_handles_are_independent() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(b"5\n").expect("write");
        let input = FileInput::new(file.path());

        let mut first = match input.open_stdin().expect("open") {
            StdinHandle::File(f) => f,
            StdinHandle::Bytes(_) => panic!("expected file handle"),
        };
        let mut buf = String::new();
        first.read_to_string(&mut buf).expect("read");
        assert_eq!(buf, "5\n");

        // First handle is exhausted; a second open still starts at zero.
        let mut second = match input.open_stdin().expect("open") {
            StdinHandle::File(f) => f,
            StdinHandle::Bytes(_) => panic!("expected file handle"),
        };
        let mut again = String::new();
        second.read_to_string(&mut again).expect("read");
        assert_eq!(again, "5\n");
    }

    #[test]
    fn test_missing_file_input_fails_on_open() {
        let input = FileInput::new("/nonexistent/verity/data.in");
        assert!(input.open_stdin().is_err());
    }

    #[test]
    fn test_memory_input_shares_bytes() {
        let input = MemoryInput::new("data.in", "1 2\n");
        assert_eq!(input.len(), 4);
        assert_eq!(input.describe(), "data.in");
        match input.open_stdin().expect("open") {
            StdinHandle::Bytes(bytes) => assert_eq!(&bytes[..], b"1 2\n"),
            StdinHandle::File(_) => panic!("expected bytes"),
        }
    }

    #[test]
    fn test_memory_input_from_stream() {
        let input =
            MemoryInput::from_stream("cursor", io::Cursor::new(b"abc".to_vec())).expect("read");
        assert!(!input.is_empty());
        assert_eq!(input.len(), 3);
    }

    #[test]
    fn test_memory_input_from_stream_rewinds_written_handle() {
        let mut cursor = io::Cursor::new(Vec::new());
        cursor.write_all(b"5\n").expect("write");
        assert_eq!(cursor.position(), 2);

        let input = MemoryInput::from_stream("written", cursor).expect("read");
        match input.open_stdin().expect("open") {
            StdinHandle::Bytes(bytes) => assert_eq!(&bytes[..], b"5\n"),
            StdinHandle::File(_) => panic!("expected bytes"),
        }
    }

    #[test]
    fn test_memory_input_from_stream_rewinds_file() {
        let mut file = tempfile::tempfile().expect("tempfile");
        file.write_all(b"1 2 3\n").expect("write");

        let input = MemoryInput::from_stream("data.in", file).expect("read");
        assert_eq!(input.len(), 6);
    }
}
