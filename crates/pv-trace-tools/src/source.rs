//! Trace file source: polls a growing file and yields complete lines.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use crate::error::{TraceError, TraceResult};

/// Where and how to tail.
#[derive(Debug, Clone)]
pub struct TailConfig {
    pub path: PathBuf,
    /// Replay content already in the file at startup instead of starting at its end.
    pub from_beginning: bool,
    pub poll_interval: Duration,
}

impl TailConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            from_beginning: false,
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// Poll-based tailer for a trace file that is appended to by another process.
///
/// Emits lines in file order. A trailing fragment without a newline is held
/// back until the rest of the line arrives. If the file is missing at startup
/// it is read from its first byte once it appears; if it shrinks below the
/// read offset it is treated as rotated and re-read from the start.
pub struct FileTailer {
    config: TailConfig,
    offset: u64,
    primed: bool,
    pending: Vec<u8>,
    waiting_logged: bool,
}

impl FileTailer {
    pub fn new(config: TailConfig) -> Self {
        Self {
            config,
            offset: 0,
            primed: false,
            pending: Vec::new(),
            waiting_logged: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Read the complete lines appended since the previous poll.
    pub async fn poll_lines(&mut self) -> TraceResult<Vec<String>> {
        let path = self.config.path.clone();
        let mut file = match File::open(&path).await {
            Ok(f) => f,
            Err(e) => {
                if !self.primed && e.kind() == std::io::ErrorKind::NotFound {
                    // Created later: everything in it is new.
                    self.primed = true;
                    self.offset = 0;
                }
                return Err(TraceError::from_io(&path, e));
            }
        };

        let len = file
            .metadata()
            .await
            .map_err(|e| TraceError::from_io(&path, e))?
            .len();

        if !self.primed {
            self.primed = true;
            self.offset = if self.config.from_beginning { 0 } else { len };
        }

        if len < self.offset {
            tracing::info!(
                path = %path.display(),
                previous_offset = self.offset,
                len,
                "trace file truncated, reading from start"
            );
            self.offset = 0;
            self.pending.clear();
        }

        if len == self.offset {
            return Ok(Vec::new());
        }

        file.seek(SeekFrom::Start(self.offset))
            .await
            .map_err(|e| TraceError::from_io(&path, e))?;
        let mut buf = Vec::new();
        let read = file
            .read_to_end(&mut buf)
            .await
            .map_err(|e| TraceError::from_io(&path, e))?;
        self.offset += read as u64;
        self.pending.extend_from_slice(&buf);

        Ok(self.take_complete_lines())
    }

    fn take_complete_lines(&mut self) -> Vec<String> {
        let Some(last_newline) = self.pending.iter().rposition(|b| *b == b'\n') else {
            return Vec::new();
        };
        let complete: Vec<u8> = self.pending.drain(..=last_newline).collect();
        complete[..complete.len() - 1]
            .split(|b| *b == b'\n')
            .map(|line| {
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                String::from_utf8_lossy(line).into_owned()
            })
            .collect()
    }

    /// Poll forever, forwarding each line to `tx`.
    ///
    /// Returns once the receiving side is dropped. Read errors are logged
    /// and retried on the next tick.
    pub async fn run(mut self, tx: mpsc::Sender<String>) {
        let mut ticker = time::interval(self.config.poll_interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            path = %self.path().display(),
            from_beginning = self.config.from_beginning,
            "tailing trace file"
        );

        loop {
            ticker.tick().await;

            match self.poll_lines().await {
                Ok(lines) => {
                    self.waiting_logged = false;
                    for line in lines {
                        if tx.send(line).await.is_err() {
                            tracing::debug!("line receiver closed, stopping tailer");
                            return;
                        }
                    }
                }
                Err(TraceError::NotFound(path)) => {
                    if !self.waiting_logged {
                        tracing::info!(path = %path, "waiting for trace file to appear");
                        self.waiting_logged = true;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read trace file");
                }
            }

            if tx.is_closed() {
                return;
            }
        }
    }
}

/// Read every line of a file at once.
pub async fn read_lines(path: impl AsRef<Path>) -> TraceResult<Vec<String>> {
    let path = path.as_ref();
    let content = tokio::fs::read(path)
        .await
        .map_err(|e| TraceError::from_io(path, e))?;
    Ok(String::from_utf8_lossy(&content)
        .lines()
        .map(String::from)
        .collect())
}
