use crate::error::StreamError;
use log::{debug, error, info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Polling intervals for [`StreamReader`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// How long to sleep between checks for the log file to appear
    pub wait_interval: Duration,
    /// How long to sleep when no new data is available
    pub poll_interval: Duration,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            wait_interval: Duration::from_secs(2),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Blocking `tail -f` over a log file or any readable stream
///
/// Iterating yields complete lines without their terminator. At end of data
/// the reader sleeps and retries, so the sequence never ends on its own; it
/// yields one `Err` on an unrecoverable read failure and is fused afterwards.
/// Bytes that are not valid UTF-8 are replaced rather than rejected.
pub struct StreamReader<R> {
    reader: BufReader<R>,
    /// Bytes of a line whose terminator has not arrived yet
    pending: Vec<u8>,
    poll_interval: Duration,
    finished: bool,
}

impl StreamReader<File> {
    /// Wait for `path` to exist, open it, and position at its end
    ///
    /// Only lines appended after this call are observed when the file is
    /// seekable.
    ///
    /// # Errors
    ///
    /// Returns `StreamError::IoError` if the file exists but cannot be opened.
    pub fn open(path: &Path, options: ReaderOptions) -> Result<Self, StreamError> {
        while !path.exists() {
            info!("Waiting for log file: {}", path.display());
            thread::sleep(options.wait_interval);
        }

        info!("Starting to tail: {}", path.display());
        let file = File::open(path)?;
        Ok(Self::from_source(file, options))
    }
}

impl<R: Read + Seek> StreamReader<R> {
    /// Wrap a source, skipping its history if it supports seeking
    pub fn from_source(mut source: R, options: ReaderOptions) -> Self {
        match source.seek(SeekFrom::End(0)) {
            Ok(offset) => info!("Seeked to end of log, skipped {} bytes of history", offset),
            Err(e) => warn!("Stream not seekable ({}); reading from current position", e),
        }
        Self::from_reader(source, options)
    }
}

impl<R: Read> StreamReader<R> {
    /// Wrap a source and read it from its current position
    pub fn from_reader(source: R, options: ReaderOptions) -> Self {
        Self {
            reader: BufReader::new(source),
            pending: Vec::new(),
            poll_interval: options.poll_interval,
            finished: false,
        }
    }

    /// Turn the buffered bytes of a complete line into text
    fn take_line(&mut self) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl<R: Read> Iterator for StreamReader<R> {
    type Item = Result<String, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            match self.reader.read_until(b'\n', &mut self.pending) {
                Ok(_) if self.pending.last() == Some(&b'\n') => {
                    return Some(Ok(self.take_line()));
                }
                Ok(_) => {
                    // End of data, possibly mid-line; keep the partial bytes
                    thread::sleep(self.poll_interval);
                }
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                    debug!("Transient read condition: {}", e);
                    thread::sleep(self.poll_interval);
                }
                Err(e) => {
                    error!("Unrecoverable error reading log stream: {}", e);
                    self.finished = true;
                    return Some(Err(StreamError::ReadError(e)));
                }
            }
        }
    }
}
