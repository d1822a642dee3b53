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

//! WARC named fields.
//!
//! A header block is a sequence of `name: value` lines. Field names are
//! case-insensitive and are stored lower-cased; a later duplicate of a
//! field replaces the earlier one.

use std::collections::hash_map;
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use encoding::all::WINDOWS_1252;
use encoding::{DecoderTrap, Encoding};
use uuid::Uuid;

pub const CONTENT_LENGTH: &str = "content-length";
pub const WARC_TYPE: &str = "warc-type";
pub const WARC_RECORD_ID: &str = "warc-record-id";
pub const WARC_DATE: &str = "warc-date";

/// Text encoding used to decode header lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderEncoding {
    /// UTF-8, invalid sequences are replaced.
    #[default]
    Utf8,
    /// ISO-8859-1 (decoded as Windows-1252).
    Latin1,
}

impl HeaderEncoding {
    /// Decode raw line bytes into a string.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            HeaderEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            HeaderEncoding::Latin1 => WINDOWS_1252
                .decode(bytes, DecoderTrap::Replace)
                .unwrap_or_default(),
        }
    }
}

/// WARC record type, as named by the `WARC-Type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarcRecordType {
    WarcInfo,
    Response,
    Resource,
    Request,
    Metadata,
    Revisit,
    Conversion,
    Continuation,
    Unknown,
}

impl WarcRecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarcRecordType::WarcInfo => "warcinfo",
            WarcRecordType::Response => "response",
            WarcRecordType::Resource => "resource",
            WarcRecordType::Request => "request",
            WarcRecordType::Metadata => "metadata",
            WarcRecordType::Revisit => "revisit",
            WarcRecordType::Conversion => "conversion",
            WarcRecordType::Continuation => "continuation",
            WarcRecordType::Unknown => "unknown",
        }
    }
}

impl From<&str> for WarcRecordType {
    /// Unrecognised names map to [`WarcRecordType::Unknown`].
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "warcinfo" => WarcRecordType::WarcInfo,
            "response" => WarcRecordType::Response,
            "resource" => WarcRecordType::Resource,
            "request" => WarcRecordType::Request,
            "metadata" => WarcRecordType::Metadata,
            "revisit" => WarcRecordType::Revisit,
            "conversion" => WarcRecordType::Conversion,
            "continuation" => WarcRecordType::Continuation,
            _ => WarcRecordType::Unknown,
        }
    }
}

impl fmt::Display for WarcRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a header line on its first `:`.
///
/// Returns the trimmed field name and the trimmed value, or `None` if the
/// line has no colon. The name is returned as written, not lower-cased.
pub fn split_field(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    Some((key.trim(), value.trim()))
}

/// Map of lower-cased field names to field values for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    fields: HashMap<String, String>,
}

impl Header {
    /// Create an empty header.
    pub fn new() -> Self {
        Header::default()
    }

    /// Get the value of a field. The name is matched case-insensitively.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Set a field, replacing any previous value.
    ///
    /// # Arguments
    ///
    /// * `key` - Field name, lower-cased and trimmed before insertion
    /// * `value` - Field value
    pub fn set(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.fields.insert(key.as_ref().trim().to_lowercase(), value.into());
    }

    /// Remove a field and return its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.fields.remove(&key.to_lowercase())
    }

    /// Check whether a field exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(&key.to_lowercase())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterator of `(name, value)` pairs in arbitrary order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.fields.iter(),
        }
    }

    /// Parse one header line into the map.
    ///
    /// Lines without a colon, or with an empty field name, are skipped.
    /// Returns whether a field was inserted.
    pub fn parse_line(&mut self, line: &str) -> bool {
        match split_field(line) {
            Some((key, value)) if !key.is_empty() => {
                self.set(key, value);
                true
            }
            _ => false,
        }
    }

    /// Record body size in bytes.
    ///
    /// A missing or unparseable `Content-Length` counts as zero.
    pub fn content_length(&self) -> u64 {
        self.get(CONTENT_LENGTH)
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0)
    }

    /// Record type from `WARC-Type`.
    pub fn record_type(&self) -> Option<WarcRecordType> {
        self.get(WARC_TYPE).map(WarcRecordType::from)
    }

    /// UUID from a `WARC-Record-ID` of the form `<urn:uuid:...>`.
    pub fn record_id(&self) -> Option<Uuid> {
        let id = self.get(WARC_RECORD_ID)?;
        let id = id.strip_prefix('<').unwrap_or(id);
        let id = id.strip_suffix('>').unwrap_or(id);
        Uuid::parse_str(id).ok()
    }

    /// Record timestamp from `WARC-Date`.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        let date = self.get(WARC_DATE)?;
        DateTime::parse_from_rfc3339(date)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Header {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut header = Header::new();
        for (key, value) in iter {
            header.set(key, value);
        }
        header
    }
}

impl<'a> IntoIterator for &'a Header {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the fields of a [`Header`].
pub struct Iter<'a> {
    inner: hash_map::Iter<'a, String, String>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
