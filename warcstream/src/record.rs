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

//! WARC records handed out by [`RecordReader`](crate::RecordReader).

use std::io::{self, BufRead, BufReader, Read};

use crate::compression::Decompressed;
use crate::error::Result;
use crate::header::Header;
use crate::line::Bounded;

/// Upper bound for pre-allocating frozen content.
const FREEZE_PREALLOC_LIMIT: u64 = 1 << 20;

/// Body of the current record.
///
/// Reads straight from the archive stream and stops after `Content-Length`
/// bytes. The content borrows the reader, so it cannot outlive the record
/// it belongs to; whatever is left unread is skipped by the next call to
/// [`RecordReader::next`](crate::RecordReader::next).
#[derive(Debug)]
pub struct Content<'r, R: Read> {
    inner: Bounded<'r, BufReader<Decompressed<R>>>,
}

impl<'r, R: Read> Content<'r, R> {
    pub(crate) fn new(inner: Bounded<'r, BufReader<Decompressed<R>>>) -> Self {
        Content { inner }
    }

    /// Bytes of content not read yet.
    pub fn remaining(&self) -> u64 {
        self.inner.remaining()
    }

    /// Whether all content has been read.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

impl<R: Read> Read for Content<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read> BufRead for Content<'_, R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}

/// A WARC record: its header fields and a stream over its body.
///
/// A record is valid until the next call to `next()` or `seek()` on the
/// reader that produced it.
#[derive(Debug)]
pub struct Record<'r, R: Read> {
    header: Header,
    version: String,
    stream_pos: u64,
    content: Content<'r, R>,
}

impl<'r, R: Read> Record<'r, R> {
    pub(crate) fn new(header: Header, version: String, stream_pos: u64, content: Content<'r, R>) -> Self {
        Record {
            header,
            version,
            stream_pos,
            content,
        }
    }

    /// Record header fields.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Version line preceding the header block, e.g. `WARC/1.1`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Offset of the version line in the decompressed stream.
    pub fn stream_pos(&self) -> u64 {
        self.stream_pos
    }

    /// Declared body length.
    pub fn content_length(&self) -> u64 {
        self.header.content_length()
    }

    /// Record body.
    pub fn content(&mut self) -> &mut Content<'r, R> {
        &mut self.content
    }

    /// Split into header and body.
    pub fn into_parts(self) -> (Header, Content<'r, R>) {
        (self.header, self.content)
    }

    /// Read the rest of the body into memory, decoupling the record from the reader.
    ///
    /// Only content that has not been read yet ends up in the frozen record.
    pub fn freeze(mut self) -> Result<OwnedRecord> {
        let mut content = Vec::with_capacity(self.content.remaining().min(FREEZE_PREALLOC_LIMIT) as usize);
        self.content.read_to_end(&mut content)?;
        Ok(OwnedRecord {
            header: self.header,
            version: self.version,
            stream_pos: self.stream_pos,
            content,
        })
    }
}

/// A record whose body has been read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedRecord {
    header: Header,
    version: String,
    stream_pos: u64,
    content: Vec<u8>,
}

impl OwnedRecord {
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn stream_pos(&self) -> u64 {
        self.stream_pos
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn into_content(self) -> Vec<u8> {
        self.content
    }
}
