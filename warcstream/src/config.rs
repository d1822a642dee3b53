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

//! Reader configuration.

use crate::header::HeaderEncoding;

/// Default read buffer capacity in bytes.
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Record reader configuration.
///
/// ```text
/// ┌─────────────────┬──────────────────────────────────────────────┐
/// │ Field           │ Purpose                                      │
/// ├─────────────────┼──────────────────────────────────────────────┤
/// │ buffer_capacity │ Size of the decompressed read buffer         │
/// │ header_encoding │ Text encoding of version and header lines    │
/// └─────────────────┴──────────────────────────────────────────────┘
/// ```
///
/// The buffer capacity only affects performance. Lines longer than the
/// buffer are reassembled, so any capacity of at least one byte yields
/// the same records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Read buffer capacity in bytes. Zero is treated as one.
    pub buffer_capacity: usize,

    /// Encoding used to decode header lines.
    pub header_encoding: HeaderEncoding,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            header_encoding: HeaderEncoding::default(),
        }
    }
}

impl ReaderConfig {
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self
    }

    pub fn with_header_encoding(mut self, encoding: HeaderEncoding) -> Self {
        self.header_encoding = encoding;
        self
    }
}
