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

//! Error types for WARC reading.

use std::io;

use thiserror::Error;

use crate::compression::Compression;

/// Errors returned by [`RecordReader`](crate::RecordReader) and its helpers.
///
/// Reaching the end of the archive is not an error. It is signalled by
/// `Ok(None)` from [`RecordReader::next`](crate::RecordReader::next).
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying stream read failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A compression header was found, but the data behind it cannot be decoded.
    #[error("corrupt {compression} stream: {source}")]
    CorruptStream {
        compression: Compression,
        #[source]
        source: io::Error,
    },

    /// The record framing was violated.
    #[error("{0}")]
    Format(String),

    /// The reader was used after [`RecordReader::close`](crate::RecordReader::close).
    #[error("reader is closed")]
    Closed,
}

impl Error {
    /// Whether the error is a structural violation of the record grammar.
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format(_))
    }
}

/// Convenience `Result` alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
