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

//! Line-oriented and length-bounded reads over one buffered stream.

use std::io::{self, BufRead, ErrorKind, Read};

use crate::header::HeaderEncoding;

/// Buffered stream reader that hands out whole lines or bounded byte runs.
///
/// The reader keeps count of every byte it consumes and of the bytes still
/// owed to the most recent bounded read, so a bounded run can be abandoned
/// half-way and skipped later with [`LineReader::skip_bound`].
#[derive(Debug)]
pub struct LineReader<B> {
    inner: B,
    encoding: HeaderEncoding,
    position: u64,
    bound: u64,
}

impl<B: BufRead> LineReader<B> {
    /// Create a line reader that decodes lines as UTF-8.
    pub fn new(inner: B) -> Self {
        Self::with_encoding(inner, HeaderEncoding::default())
    }

    pub fn with_encoding(inner: B, encoding: HeaderEncoding) -> Self {
        LineReader {
            inner,
            encoding,
            position: 0,
            bound: 0,
        }
    }

    /// Number of bytes consumed from the underlying stream.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Bytes of the last bounded run that have not been consumed yet.
    pub fn remaining_bound(&self) -> u64 {
        self.bound
    }

    pub fn get_ref(&self) -> &B {
        &self.inner
    }

    pub fn into_inner(self) -> B {
        self.inner
    }

    /// Read one line of raw bytes into `line`, without its terminator.
    ///
    /// A line ends at `\n`; a `\r` directly before it is dropped as well.
    /// Lines longer than the read buffer are reassembled from as many buffer
    /// fills as needed. Returns `false` if the stream was already at its end.
    pub fn read_line_bytes(&mut self, line: &mut Vec<u8>) -> io::Result<bool> {
        let mut seen = false;
        loop {
            let (terminated, used) = {
                let available = match self.inner.fill_buf() {
                    Ok(buf) => buf,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                if available.is_empty() {
                    return Ok(seen);
                }
                seen = true;
                match available.iter().position(|&b| b == b'\n') {
                    Some(i) => {
                        line.extend_from_slice(&available[..i]);
                        (true, i + 1)
                    }
                    None => {
                        line.extend_from_slice(available);
                        (false, available.len())
                    }
                }
            };
            self.consume_raw(used);
            if terminated {
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Ok(true);
            }
        }
    }

    /// Read and decode one line. Returns `None` at end of stream.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = Vec::new();
        if !self.read_line_bytes(&mut line)? {
            return Ok(None);
        }
        Ok(Some(self.encoding.decode(&line)))
    }

    /// Start a bounded run of exactly `n` bytes.
    ///
    /// The returned reader yields at most `n` bytes and never consumes past
    /// them. Bytes it leaves unread stay owed and are reported by
    /// [`remaining_bound`](Self::remaining_bound).
    pub fn read_bounded(&mut self, n: u64) -> Bounded<'_, B> {
        self.bound = n;
        Bounded { source: self }
    }

    /// Consume whatever is left of the current bounded run.
    ///
    /// Returns the number of bytes skipped. Fails with
    /// [`ErrorKind::UnexpectedEof`] if the stream ends first.
    pub fn skip_bound(&mut self) -> io::Result<u64> {
        let mut skipped = 0u64;
        loop {
            let n = match self.fill_bounded() {
                Ok(buf) => buf.len(),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if n == 0 {
                return Ok(skipped);
            }
            self.consume_bounded(n);
            skipped += n as u64;
        }
    }

    fn fill_bounded(&mut self) -> io::Result<&[u8]> {
        if self.bound == 0 {
            return Ok(&[]);
        }
        let bound = self.bound;
        let available = self.inner.fill_buf()?;
        if available.is_empty() {
            return Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("stream ended with {} bytes of content unread", bound),
            ));
        }
        let n = usize::try_from(bound).map_or(available.len(), |b| b.min(available.len()));
        Ok(&available[..n])
    }

    fn consume_bounded(&mut self, amt: usize) {
        let amt = usize::try_from(self.bound).map_or(amt, |b| b.min(amt));
        self.consume_raw(amt);
        self.bound -= amt as u64;
    }

    fn consume_raw(&mut self, amt: usize) {
        self.inner.consume(amt);
        self.position += amt as u64;
    }
}

/// Unframed passthrough read on the underlying stream.
///
/// Does not count against an open bounded run.
impl<B: BufRead> Read for LineReader<B> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

/// Reader over a bounded run of a [`LineReader`], see [`LineReader::read_bounded`].
#[derive(Debug)]
pub struct Bounded<'a, B> {
    source: &'a mut LineReader<B>,
}

impl<B: BufRead> Bounded<'_, B> {
    /// Bytes left in this run.
    pub fn remaining(&self) -> u64 {
        self.source.bound
    }
}

impl<B: BufRead> Read for Bounded<'_, B> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = {
            let available = self.source.fill_bounded()?;
            let n = available.len().min(buf.len());
            buf[..n].copy_from_slice(&available[..n]);
            n
        };
        self.source.consume_bounded(n);
        Ok(n)
    }
}

impl<B: BufRead> BufRead for Bounded<'_, B> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.source.fill_bounded()
    }

    fn consume(&mut self, amt: usize) {
        self.source.consume_bounded(amt);
    }
}
