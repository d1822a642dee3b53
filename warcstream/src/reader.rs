// Copyright 2025 Janek Bevendorff
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Forward-only WARC record reader.
//!
//! Every record is framed as
//!
//! ```text
//! <version line>\r\n
//! <name>: <value>\r\n      (zero or more)
//! \r\n
//! <Content-Length bytes>
//! \r\n
//! \r\n
//! ```
//!
//! The reader moves through the archive one record at a time. Advancing
//! skips whatever the caller left of the previous body and checks the two
//! blank lines that close it.

use std::io::{self, BufReader, Read};
use std::iter::FusedIterator;

use log::{debug, trace};

use crate::compression::{self, Compression, Decompressed};
use crate::config::ReaderConfig;
use crate::error::{Error, Result};
use crate::header::Header;
use crate::line::LineReader;
use crate::record::{Content, OwnedRecord, Record};

/// Number of blank lines closing a record.
pub const RECORD_DELIMITER_LINES: usize = 2;

type Source<R> = LineReader<BufReader<Decompressed<R>>>;

/// Cursor position relative to records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the first record, or between two records after a seek.
    BetweenRecords,
    /// Inside the body of the record starting at `stream_pos`.
    InRecord { stream_pos: u64 },
}

/// Streaming reader over the records of a WARC archive.
///
/// The input may be plain, gzip- or bzip2-compressed; compression is
/// detected when the reader is created.
///
/// # Example
///
/// ```
/// use std::io::Read;
/// use warcstream::RecordReader;
///
/// let data = b"WARC/1.0\r\nContent-Length: 11\r\n\r\nHello World\r\n\r\n";
/// let mut reader = RecordReader::new(&data[..])?;
/// while let Some(mut record) = reader.next()? {
///     let mut body = String::new();
///     record.content().read_to_string(&mut body)?;
///     assert_eq!(body, "Hello World");
/// }
/// # Ok::<(), warcstream::Error>(())
/// ```
#[derive(Debug)]
pub struct RecordReader<R: Read> {
    source: Option<Source<R>>,
    compression: Compression,
    state: State,
}

impl<R: Read> RecordReader<R> {
    /// Create a reader with the default configuration.
    pub fn new(source: R) -> Result<Self> {
        Self::with_config(source, ReaderConfig::default())
    }

    /// Create a reader.
    ///
    /// # Arguments
    ///
    /// * `source` - Raw archive stream
    /// * `config` - Reader configuration
    pub fn with_config(source: R, config: ReaderConfig) -> Result<Self> {
        let decompressed = compression::open(source, config.buffer_capacity)?;
        let compression = decompressed.get_ref().compression();
        debug!(
            "opened {} archive with {} byte buffer",
            compression, config.buffer_capacity
        );
        Ok(RecordReader {
            source: Some(LineReader::with_encoding(decompressed, config.header_encoding)),
            compression,
            state: State::BetweenRecords,
        })
    }

    /// Compression detected on the input.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Decompressed bytes consumed so far.
    pub fn position(&self) -> Result<u64> {
        Ok(self.source.as_ref().ok_or(Error::Closed)?.position())
    }

    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    fn source(&mut self) -> Result<&mut Source<R>> {
        self.source.as_mut().ok_or(Error::Closed)
    }

    /// Advance to the next record.
    ///
    /// Returns `Ok(None)` once the archive has no more records, i.e. when the
    /// stream ends where a version line would start. Any line there, even a
    /// blank one, is taken as a version line, so a stray newline after the
    /// last record yields one more record with an empty header and the call
    /// after that fails with [`Error::Format`].
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<Record<'_, R>>> {
        self.seek()?;

        let source = self.source()?;
        let stream_pos = source.position();
        let Some(version) = source.read_line()? else {
            trace!("end of archive at offset {}", stream_pos);
            return Ok(None);
        };
        let header = read_header(source)?;
        let length = header.content_length();
        trace!(
            "record at offset {}: {} ({} content bytes)",
            stream_pos,
            version,
            length
        );

        self.state = State::InRecord { stream_pos };
        let content = Content::new(self.source()?.read_bounded(length));
        Ok(Some(Record::new(header, version, stream_pos, content)))
    }

    /// Skip the rest of the current record, including its closing blank lines.
    ///
    /// Does nothing if there is no current record.
    pub fn seek(&mut self) -> Result<()> {
        let state = self.state;
        let source = self.source()?;
        let State::InRecord { stream_pos } = state else {
            return Ok(());
        };

        let skipped = source.skip_bound()?;
        if skipped > 0 {
            trace!("skipped {} unread content bytes of record at offset {}", skipped, stream_pos);
        }
        self.state = State::BetweenRecords;

        let source = self.source()?;
        for _ in 0..RECORD_DELIMITER_LINES {
            match source.read_line()? {
                Some(line) if line.is_empty() => {}
                Some(line) => {
                    return Err(Error::Format(format!("unexpected line at end of record: {}", line)))
                }
                None => {
                    return Err(Error::Format(
                        "unexpected end of stream at end of record".to_string(),
                    ))
                }
            }
        }
        Ok(())
    }

    /// Read one line straight from the stream, ignoring record framing.
    ///
    /// Returns `None` at end of stream.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.source()?.read_line()?)
    }

    /// Release the underlying stream.
    ///
    /// Closing twice is allowed. Any other operation afterwards fails with
    /// [`Error::Closed`].
    pub fn close(&mut self) {
        if let Some(source) = self.source.take() {
            debug!("closed archive reader at offset {}", source.position());
        }
        self.state = State::BetweenRecords;
    }

    /// Turn the reader into an iterator of in-memory records.
    pub fn into_records(self) -> Records<R> {
        Records {
            reader: self,
            done: false,
        }
    }
}

/// Raw passthrough on the decompressed stream, ignoring record framing.
impl<R: Read> Read for RecordReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.source.as_mut() {
            Some(source) => source.read(buf),
            None => Err(io::Error::other(Error::Closed)),
        }
    }
}

/// Read header lines up to the blank separator line or the end of the stream.
fn read_header<R: Read>(source: &mut Source<R>) -> io::Result<Header> {
    let mut header = Header::new();
    while let Some(line) = source.read_line()? {
        if line.is_empty() {
            break;
        }
        if !header.parse_line(&line) {
            trace!("skipped malformed header line: {}", line);
        }
    }
    Ok(header)
}

/// Iterator of [`OwnedRecord`]s, see [`RecordReader::into_records`].
///
/// Stops after the last record or after the first error.
#[derive(Debug)]
pub struct Records<R: Read> {
    reader: RecordReader<R>,
    done: bool,
}

impl<R: Read> Records<R> {
    pub fn into_inner(self) -> RecordReader<R> {
        self.reader
    }
}

impl<R: Read> Iterator for Records<R> {
    type Item = Result<OwnedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = match self.reader.next() {
            Ok(Some(record)) => record.freeze().map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };
        match result {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> FusedIterator for Records<R> {}
