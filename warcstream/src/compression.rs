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

//! Compression detection and transparent decompression.
//!
//! A WARC stream may be stored plain, gzip-compressed or bzip2-compressed
//! as a whole. The first two bytes decide which:
//!
//! ```text
//! 1F 8B  -> gzip
//! 42 5A  -> bzip2 ("BZ")
//! other  -> uncompressed (also for streams shorter than two bytes)
//! ```
//!
//! Both decoders accept concatenated members, so per-record compressed
//! files read the same as files compressed in one piece.

use std::fmt;
use std::io::{self, BufRead, BufReader, Chain, Cursor, ErrorKind, Read};

use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;
use log::debug;

use crate::error::{Error, Result};

/// Number of leading bytes inspected for detection.
pub const MAGIC_LEN: usize = 2;

const GZIP_MAGIC: [u8; MAGIC_LEN] = [0x1f, 0x8b];
const BZIP2_MAGIC: [u8; MAGIC_LEN] = [0x42, 0x5a];

/// Compression of a WARC byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    Uncompressed,
    Gzip,
    Bzip2,
}

impl Compression {
    /// Classify a stream by its leading bytes.
    pub fn from_magic(magic: &[u8]) -> Self {
        match magic.get(..MAGIC_LEN) {
            Some(m) if m == GZIP_MAGIC => Compression::Gzip,
            Some(m) if m == BZIP2_MAGIC => Compression::Bzip2,
            _ => Compression::Uncompressed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::Uncompressed => "uncompressed",
            Compression::Gzip => "gzip",
            Compression::Bzip2 => "bzip2",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw stream with the inspected leading bytes put back in front of it.
pub type Rewound<R> = Chain<Cursor<Vec<u8>>, R>;

/// Decompressed view of a raw WARC stream.
pub enum Decompressed<R: Read> {
    Uncompressed(Rewound<R>),
    Gzip(MultiGzDecoder<Rewound<R>>),
    Bzip2(MultiBzDecoder<Rewound<R>>),
}

impl<R: Read> Decompressed<R> {
    /// The compression this stream is being decoded from.
    pub fn compression(&self) -> Compression {
        match self {
            Decompressed::Uncompressed(_) => Compression::Uncompressed,
            Decompressed::Gzip(_) => Compression::Gzip,
            Decompressed::Bzip2(_) => Compression::Bzip2,
        }
    }
}

impl<R: Read> Read for Decompressed<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Decompressed::Uncompressed(r) => r.read(buf),
            Decompressed::Gzip(r) => r.read(buf),
            Decompressed::Bzip2(r) => r.read(buf),
        }
    }
}

impl<R: Read> fmt::Debug for Decompressed<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Decompressed").field(&self.compression()).finish()
    }
}

/// Read up to [`MAGIC_LEN`] bytes from the start of a stream.
///
/// Fewer bytes are returned only if the stream ends early.
fn read_magic<R: Read>(source: &mut R) -> io::Result<Vec<u8>> {
    let mut magic = [0u8; MAGIC_LEN];
    let mut filled = 0;
    while filled < MAGIC_LEN {
        match source.read(&mut magic[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(magic[..filled].to_vec())
}

/// Detect the compression of a raw stream.
///
/// The returned stream still yields every byte of the input, including the
/// ones inspected for detection.
pub fn detect<R: Read>(mut source: R) -> io::Result<(Compression, Rewound<R>)> {
    let magic = read_magic(&mut source)?;
    let compression = Compression::from_magic(&magic);
    Ok((compression, Cursor::new(magic).chain(source)))
}

/// Detect the compression of a raw stream and wrap it in the matching decoder.
pub fn decompress<R: Read>(source: R) -> io::Result<Decompressed<R>> {
    let (compression, rewound) = detect(source)?;
    debug!("detected {} stream", compression);
    Ok(match compression {
        Compression::Uncompressed => Decompressed::Uncompressed(rewound),
        Compression::Gzip => Decompressed::Gzip(MultiGzDecoder::new(rewound)),
        Compression::Bzip2 => Decompressed::Bzip2(MultiBzDecoder::new(rewound)),
    })
}

/// Open a raw stream as a buffered, decompressed stream.
///
/// The buffer is filled once before returning, so a compressed stream whose
/// data cannot be decoded fails here with [`Error::CorruptStream`].
///
/// # Arguments
///
/// * `source` - Raw WARC stream
/// * `capacity` - Read buffer capacity in bytes (at least 1)
pub fn open<R: Read>(source: R, capacity: usize) -> Result<BufReader<Decompressed<R>>> {
    let decompressed = decompress(source)?;
    let compression = decompressed.compression();
    let mut reader = BufReader::with_capacity(capacity.max(1), decompressed);
    loop {
        match reader.fill_buf() {
            Ok(_) => break,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(init_error(compression, e)),
        }
    }
    Ok(reader)
}

fn init_error(compression: Compression, err: io::Error) -> Error {
    match (compression, err.kind()) {
        (Compression::Uncompressed, _) => Error::Io(err),
        (_, ErrorKind::InvalidData | ErrorKind::InvalidInput | ErrorKind::UnexpectedEof) => {
            Error::CorruptStream {
                compression,
                source: err,
            }
        }
        _ => Error::Io(err),
    }
}
