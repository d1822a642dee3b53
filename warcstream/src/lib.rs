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

//! Streaming reader for web archive (WARC) files.
//!
//! [`RecordReader`] walks an archive record by record without loading a
//! record body into memory. Gzip and bzip2 compression of the whole
//! stream (or of concatenated members) is detected and undone on the fly.

pub mod compression;
pub mod config;
pub mod error;
pub mod header;
pub mod line;
pub mod reader;
pub mod record;

pub use compression::Compression;
pub use config::ReaderConfig;
pub use error::{Error, Result};
pub use header::{Header, HeaderEncoding, WarcRecordType};
pub use reader::{RecordReader, Records};
pub use record::{Content, OwnedRecord, Record};
