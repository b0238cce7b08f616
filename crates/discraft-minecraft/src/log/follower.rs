//! Log follower
//!
//! Tails the server log from its current end. Partial lines are buffered
//! until their newline arrives. When the file shrinks or is replaced by a new
//! file at the same path, it is reopened from the start.

use super::classify_line;
use crate::error::LogError;
use discraft_core::ServerEvent;
use std::fs::Metadata;
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Line that ends following, used by tests
pub const EOF_SENTINEL: &str = "EOF for testing";

/// How often the file is checked for new data
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

const READ_CHUNK: usize = 8 * 1024;

/// Longest line kept; the rest of a longer line is skipped
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Identity of the file behind a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileId(Option<(u64, u64)>);

impl FileId {
    #[cfg(unix)]
    fn of(meta: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self(Some((meta.dev(), meta.ino())))
    }

    #[cfg(not(unix))]
    fn of(_meta: &Metadata) -> Self {
        Self(None)
    }
}

/// An open log being followed
#[derive(Debug)]
pub struct LogFollower {
    path: PathBuf,
    file: File,
    id: FileId,
    offset: u64,
    pending: Vec<u8>,
    skipping_overlong: bool,
    poll_interval: Duration,
}

impl LogFollower {
    /// Open `path` positioned at its end
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let path = path.as_ref().to_path_buf();
        let (mut file, meta) = open_with_metadata(&path).await?;
        let offset = file
            .seek(SeekFrom::End(0))
            .await
            .map_err(|source| LogError::Open {
                path: path.clone(),
                source,
            })?;

        tracing::info!(path = %path.display(), offset, "Following server log");
        Ok(Self {
            id: FileId::of(&meta),
            path,
            file,
            offset,
            pending: Vec::new(),
            skipping_overlong: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Forward classified lines to `events` until cancelled, the sentinel
    /// line is read or the receiver is dropped
    pub async fn run(
        mut self,
        events: mpsc::Sender<ServerEvent>,
        cancel: CancellationToken,
    ) -> Result<(), LogError> {
        let mut chunk = vec![0u8; READ_CHUNK];

        loop {
            if cancel.is_cancelled() {
                tracing::debug!(path = %self.path.display(), "Log follower cancelled");
                return Ok(());
            }

            let read = self
                .file
                .read(&mut chunk)
                .await
                .map_err(|source| self.read_error(source))?;

            if read > 0 {
                self.offset += read as u64;
                self.pending.extend_from_slice(&chunk[..read]);
                if !self.drain_lines(&events, &cancel).await {
                    return Ok(());
                }
                continue;
            }

            self.check_rotation().await?;

            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::debug!(path = %self.path.display(), "Log follower cancelled");
                    return Ok(());
                }
                () = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }

    /// Emit every complete buffered line; `false` means stop following
    async fn drain_lines(&mut self, events: &mpsc::Sender<ServerEvent>, cancel: &CancellationToken) -> bool {
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            if std::mem::take(&mut self.skipping_overlong) {
                continue;
            }
            let line = String::from_utf8_lossy(&raw[..pos]);
            let line = line.trim_end_matches('\r');

            if line == EOF_SENTINEL {
                tracing::info!(path = %self.path.display(), "End-of-log sentinel reached");
                return false;
            }

            if let Some(event) = classify_line(line) {
                tracing::debug!(event = event.event_type(), "Log event");
                let sent = tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        tracing::debug!(path = %self.path.display(), "Log follower cancelled");
                        return false;
                    }
                    sent = events.send(event) => sent,
                };
                if sent.is_err() {
                    tracing::debug!("Log event receiver dropped");
                    return false;
                }
            }
        }

        if self.pending.len() > MAX_LINE_LEN {
            tracing::warn!(
                path = %self.path.display(),
                buffered = self.pending.len(),
                "Skipping overlong log line"
            );
            self.pending.clear();
            self.skipping_overlong = true;
        }
        true
    }

    /// Reopen from the start after truncation or replacement
    async fn check_rotation(&mut self) -> Result<(), LogError> {
        let meta = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta,
            // Mid-rotation: the new file is not there yet
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(source) => return Err(self.read_error(source)),
        };

        let replaced = FileId::of(&meta) != self.id;
        let truncated = meta.len() < self.offset;
        if !replaced && !truncated {
            return Ok(());
        }

        match open_with_metadata(&self.path).await {
            Ok((file, meta)) => {
                tracing::info!(
                    path = %self.path.display(),
                    replaced,
                    truncated,
                    "Log file rotated, reopening"
                );
                self.file = file;
                self.id = FileId::of(&meta);
                self.offset = 0;
                self.pending.clear();
                self.skipping_overlong = false;
                Ok(())
            }
            Err(LogError::Open { source, .. }) if source.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn read_error(&self, source: std::io::Error) -> LogError {
        LogError::Read {
            path: self.path.clone(),
            source,
        }
    }
}

async fn open_with_metadata(path: &Path) -> Result<(File, Metadata), LogError> {
    let open_error = |source| LogError::Open {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).await.map_err(open_error)?;
    let meta = file.metadata().await.map_err(open_error)?;
    Ok((file, meta))
}
