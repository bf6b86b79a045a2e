//! Output sinks and the policy for opening them.
//!
//! The dispatcher only ever appends text to an [`OutputSink`]. Where the text goes
//! is decided by a [`SinkProvider`]:
//!
//! - [`FileSinkProvider`] writes into an output directory, refusing to clobber an
//!   existing file unless its [`OverwritePrompt`] agrees.
//! - [`MemorySinkProvider`] keeps every artifact in memory (dry runs and tests).
//!
//! A provider may answer [`SinkOpen::Declined`]; the dispatcher then skips that
//! artifact and moves on to the next one.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, TegelError};

/// Append-only text destination for one artifact.
pub trait OutputSink {
    fn append(&mut self, text: &str) -> Result<()>;

    /// Flush and release the underlying resource.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl OutputSink for String {
    fn append(&mut self, text: &str) -> Result<()> {
        self.push_str(text);
        Ok(())
    }
}

/// Buffered file sink. Dropping it without [`close`](OutputSink::close) still
/// flushes, but errors are then lost.
pub struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    fn new(path: PathBuf, file: File) -> Self {
        Self {
            path,
            writer: Some(BufWriter::new(file)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_failure(&self, source: std::io::Error) -> TegelError {
        TegelError::SinkWriteFailure {
            path: self.path.clone(),
            source,
        }
    }
}

impl OutputSink for FileSink {
    fn append(&mut self, text: &str) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(self.write_failure(std::io::Error::new(
                ErrorKind::BrokenPipe,
                "sink already closed",
            )));
        };
        if let Err(e) = writer.write_all(text.as_bytes()) {
            return Err(self.write_failure(e));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        match self.writer.take() {
            Some(mut writer) => writer.flush().map_err(|e| self.write_failure(e)),
            None => Ok(()),
        }
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                tracing::warn!("failed to flush {}: {e}", self.path.display());
            }
        }
    }
}

/// Result of asking a provider for a sink.
pub enum SinkOpen<S> {
    Opened(S),
    /// The target exists and overwriting it was refused.
    Declined,
}

/// Opens one sink per artifact path.
pub trait SinkProvider {
    type Sink: OutputSink;

    fn open(&mut self, path: &Path) -> Result<SinkOpen<Self::Sink>>;

    /// Take back a sink once its artifact is done, whether emission succeeded or not.
    fn release(&mut self, mut sink: Self::Sink) -> Result<()> {
        sink.close()
    }
}

/// Decides whether an existing artifact may be replaced.
pub trait OverwritePrompt {
    fn confirm_overwrite(&mut self, path: &Path) -> Result<bool>;
}

/// Non-interactive answers for [`OverwritePrompt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Never replace an existing artifact.
    Never,
    /// Always replace existing artifacts.
    Always,
}

impl OverwritePrompt for OverwritePolicy {
    fn confirm_overwrite(&mut self, _path: &Path) -> Result<bool> {
        Ok(matches!(self, Self::Always))
    }
}

/// Writes artifacts into a directory on disk.
pub struct FileSinkProvider {
    dir: PathBuf,
    prompt: Box<dyn OverwritePrompt>,
}

impl FileSinkProvider {
    /// Use `dir` as the output directory, creating it (and its parents) if absent.
    pub fn create(dir: impl Into<PathBuf>, prompt: Box<dyn OverwritePrompt>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| TegelError::SinkUnavailable {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir, prompt })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SinkProvider for FileSinkProvider {
    type Sink = FileSink;

    fn open(&mut self, path: &Path) -> Result<SinkOpen<FileSink>> {
        let full = self.dir.join(path);
        let unavailable = |source| TegelError::SinkUnavailable {
            path: full.clone(),
            source,
        };

        match OpenOptions::new().write(true).create_new(true).open(&full) {
            Ok(file) => Ok(SinkOpen::Opened(FileSink::new(full.clone(), file))),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if !self.prompt.confirm_overwrite(&full)? {
                    return Ok(SinkOpen::Declined);
                }
                let file = File::create(&full).map_err(unavailable)?;
                Ok(SinkOpen::Opened(FileSink::new(full.clone(), file)))
            }
            Err(e) => Err(unavailable(e)),
        }
    }
}

/// Collects artifacts in memory, keyed by path.
#[derive(Debug, Default)]
pub struct MemorySinkProvider {
    artifacts: BTreeMap<PathBuf, String>,
    declined: Vec<PathBuf>,
    unavailable: Vec<PathBuf>,
}

impl MemorySinkProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer [`SinkOpen::Declined`] when `path` is opened.
    pub fn decline(mut self, path: impl Into<PathBuf>) -> Self {
        self.declined.push(path.into());
        self
    }

    /// Fail with `SinkUnavailable` when `path` is opened.
    pub fn fail(mut self, path: impl Into<PathBuf>) -> Self {
        self.unavailable.push(path.into());
        self
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.artifacts.get(path.as_ref()).map(String::as_str)
    }

    pub fn artifacts(&self) -> &BTreeMap<PathBuf, String> {
        &self.artifacts
    }

    pub fn into_artifacts(self) -> BTreeMap<PathBuf, String> {
        self.artifacts
    }
}

/// In-memory sink handed out by [`MemorySinkProvider`].
#[derive(Debug)]
pub struct MemorySink {
    path: PathBuf,
    buffer: String,
}

impl MemorySink {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contents(&self) -> &str {
        &self.buffer
    }
}

impl OutputSink for MemorySink {
    fn append(&mut self, text: &str) -> Result<()> {
        self.buffer.append(text)
    }
}

impl SinkProvider for MemorySinkProvider {
    type Sink = MemorySink;

    fn open(&mut self, path: &Path) -> Result<SinkOpen<MemorySink>> {
        if self.declined.iter().any(|p| p == path) {
            return Ok(SinkOpen::Declined);
        }
        if self.unavailable.iter().any(|p| p == path) {
            return Err(TegelError::SinkUnavailable {
                path: path.to_path_buf(),
                source: std::io::Error::new(ErrorKind::PermissionDenied, "permission denied"),
            });
        }
        Ok(SinkOpen::Opened(MemorySink {
            path: path.to_path_buf(),
            buffer: String::new(),
        }))
    }

    fn release(&mut self, sink: MemorySink) -> Result<()> {
        self.artifacts.insert(sink.path, sink.buffer);
        Ok(())
    }
}
