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

use std::io::{ErrorKind, Read, Write};

use warcstream::{
    Compression, Error, Header, HeaderEncoding, OwnedRecord, ReaderConfig, RecordReader,
    WarcRecordType,
};

const HELLO: &[u8] = b"WARC/1.0\r\ncontent-length: 11\r\n\r\nHello World\r\n\r\n";

fn record(fields: &[(&str, &str)], content: &[u8]) -> Vec<u8> {
    let mut out = b"WARC/1.1\r\n".to_vec();
    for (key, value) in fields {
        out.extend_from_slice(format!("{}: {}\r\n", key, value).as_bytes());
    }
    out.extend_from_slice(format!("Content-Length: {}\r\n\r\n", content.len()).as_bytes());
    out.extend_from_slice(content);
    out.extend_from_slice(b"\r\n\r\n");
    out
}

fn sample_archive() -> Vec<u8> {
    let mut out = record(
        &[
            ("WARC-Type", "warcinfo"),
            ("WARC-Date", "2024-03-01T12:30:00Z"),
            ("WARC-Record-ID", "<urn:uuid:4a6b7c8d-1e2f-4a3b-9c4d-5e6f7a8b9c0d>"),
        ],
        b"software: test\r\n",
    );
    out.extend(record(
        &[
            ("WARC-Type", "response"),
            ("WARC-Target-URI", "http://example.com/"),
        ],
        b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n<html></html>",
    ));
    out.extend(record(&[("WARC-Type", "metadata")], b""));
    out
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn bzip2(data: &[u8]) -> Vec<u8> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn read_all(data: &[u8], config: ReaderConfig) -> Vec<(Header, Vec<u8>)> {
    let mut reader = RecordReader::with_config(data, config).unwrap();
    let mut records = Vec::new();
    while let Some(mut record) = reader.next().unwrap() {
        let mut content = Vec::new();
        record.content().read_to_end(&mut content).unwrap();
        records.push((record.header().clone(), content));
    }
    records
}

#[test]
fn single_record() {
    let mut reader = RecordReader::new(HELLO).unwrap();
    assert_eq!(reader.compression(), Compression::Uncompressed);

    let mut record = reader.next().unwrap().unwrap();
    let expected: Header = [("content-length", "11")].into_iter().collect();
    assert_eq!(record.header(), &expected);
    assert_eq!(record.version(), "WARC/1.0");
    assert_eq!(record.stream_pos(), 0);

    let mut content = Vec::new();
    record.content().read_to_end(&mut content).unwrap();
    assert_eq!(content, b"Hello World");

    assert!(reader.next().unwrap().is_none());
    assert!(reader.next().unwrap().is_none());
}

#[test]
fn end_of_archive_after_last_record() {
    let data = sample_archive();
    let mut reader = RecordReader::new(&data[..]).unwrap();
    for _ in 0..3 {
        assert!(reader.next().unwrap().is_some());
    }
    assert!(reader.next().unwrap().is_none());
}

#[test]
fn empty_archive() {
    let mut reader = RecordReader::new(&b""[..]).unwrap();
    assert_eq!(reader.compression(), Compression::Uncompressed);
    assert!(reader.next().unwrap().is_none());
}

#[test]
fn same_records_for_every_compression() {
    let plain = sample_archive();
    let expected = read_all(&plain, ReaderConfig::default());
    assert_eq!(expected.len(), 3);
    assert_eq!(expected[0].0.record_type(), Some(WarcRecordType::WarcInfo));
    assert_eq!(expected[1].0.get("warc-target-uri"), Some("http://example.com/"));
    assert!(expected[2].1.is_empty());

    assert_eq!(read_all(&gzip(&plain), ReaderConfig::default()), expected);
    assert_eq!(read_all(&bzip2(&plain), ReaderConfig::default()), expected);
}

#[test]
fn compression_is_reported() {
    let plain = sample_archive();
    assert_eq!(
        RecordReader::new(&gzip(&plain)[..]).unwrap().compression(),
        Compression::Gzip
    );
    assert_eq!(
        RecordReader::new(&bzip2(&plain)[..]).unwrap().compression(),
        Compression::Bzip2
    );
}

#[test]
fn per_record_gzip_members() {
    let mut members = gzip(&record(&[("WARC-Type", "warcinfo")], b"a"));
    members.extend(gzip(&record(&[("WARC-Type", "response")], b"bc")));

    let records = read_all(&members, ReaderConfig::default());
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].1, b"a");
    assert_eq!(records[1].1, b"bc");
    assert_eq!(records[1].0.record_type(), Some(WarcRecordType::Response));
}

#[test]
fn tiny_buffers_give_same_records() {
    let plain = sample_archive();
    let expected = read_all(&plain, ReaderConfig::default());
    for capacity in [1, 2, 3, 7] {
        let config = ReaderConfig::default().with_buffer_capacity(capacity);
        assert_eq!(read_all(&plain, config.clone()), expected);
        assert_eq!(read_all(&gzip(&plain), config), expected);
    }
}

#[test]
fn unread_content_is_skipped() {
    let mut data = b"WARC/1.0\r\ncontent-length: 5\r\n\r\nabcde\r\n\r\n".to_vec();
    data.extend_from_slice(HELLO);
    let mut reader = RecordReader::new(&data[..]).unwrap();

    let mut record = reader.next().unwrap().unwrap();
    let mut buf = [0u8; 2];
    record.content().read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"ab");
    assert_eq!(record.content().remaining(), 3);

    let mut record = reader.next().unwrap().unwrap();
    assert_eq!(record.header().content_length(), 11);
    let mut content = String::new();
    record.content().read_to_string(&mut content).unwrap();
    assert_eq!(content, "Hello World");
    assert!(record.content().is_exhausted());
}

#[test]
fn content_never_reads_past_its_length() {
    let mut reader = RecordReader::new(HELLO).unwrap();
    let mut record = reader.next().unwrap().unwrap();
    let mut buf = [0u8; 64];
    let mut total = 0;
    loop {
        let n = record.content().read(&mut buf[total..]).unwrap();
        if n == 0 {
            break;
        }
        total += n;
    }
    assert_eq!(&buf[..total], b"Hello World");
}

#[test]
fn bad_trailing_lines_are_rejected() {
    let data = b"WARC/1.0\r\ncontent-length: 5\r\n\r\nabcde\r\nX\r\n";
    let mut reader = RecordReader::new(&data[..]).unwrap();
    reader.next().unwrap().unwrap();
    match reader.next() {
        Err(Error::Format(msg)) => assert_eq!(msg, "unexpected line at end of record: X"),
        other => panic!("expected format error, got {:?}", other),
    }
}

#[test]
fn wrong_content_length_is_a_format_error() {
    let data = b"WARC/1.0\r\ncontent-length: 3\r\n\r\nabcde\r\n\r\n";
    let mut reader = RecordReader::new(&data[..]).unwrap();
    reader.next().unwrap().unwrap();
    let err = reader.seek().unwrap_err();
    assert!(err.is_format());
    assert_eq!(err.to_string(), "unexpected line at end of record: de");
}

#[test]
fn seek_skips_current_record() {
    let data = sample_archive();
    let mut reader = RecordReader::new(&data[..]).unwrap();
    reader.seek().unwrap();
    reader.next().unwrap().unwrap();
    reader.seek().unwrap();
    reader.seek().unwrap();
    assert_eq!(reader.read_line().unwrap().as_deref(), Some("WARC/1.1"));
}

#[test]
fn read_line_exposes_raw_lines() {
    let mut reader = RecordReader::new(HELLO).unwrap();
    assert_eq!(reader.read_line().unwrap().as_deref(), Some("WARC/1.0"));
    assert_eq!(reader.read_line().unwrap().as_deref(), Some("content-length: 11"));
    assert_eq!(reader.read_line().unwrap().as_deref(), Some(""));
    assert_eq!(reader.read_line().unwrap().as_deref(), Some("Hello World"));
}

#[test]
fn raw_read_sees_first_bytes() {
    let compressed = gzip(HELLO);
    let mut reader = RecordReader::new(&compressed[..]).unwrap();
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"WARC");
    assert_eq!(reader.position().unwrap(), 4);
}

#[test]
fn header_quirks() {
    let data = b"WARC/1.0\r\n\
        WARC-Type: request\r\n\
        this line has no separator\r\n\
        warc-type: response\r\n\
        Content-Length: 2\r\n\
        \r\n\
        ok\r\n\r\n";
    let mut reader = RecordReader::new(&data[..]).unwrap();
    let record = reader.next().unwrap().unwrap();
    let header = record.header();
    assert_eq!(header.len(), 2);
    assert_eq!(header.get("warc-type"), Some("response"));
    assert_eq!(header.record_type(), Some(WarcRecordType::Response));
}

#[test]
fn missing_content_length_means_empty_body() {
    let mut data = b"WARC/1.0\r\nWARC-Type: resource\r\n\r\n\r\n\r\n".to_vec();
    data.extend_from_slice(b"WARC/1.0\r\nContent-Length: nope\r\n\r\n\r\n\r\n");
    let mut reader = RecordReader::new(&data[..]).unwrap();
    for _ in 0..2 {
        let mut record = reader.next().unwrap().unwrap();
        assert_eq!(record.content_length(), 0);
        let mut content = Vec::new();
        record.content().read_to_end(&mut content).unwrap();
        assert!(content.is_empty());
    }
    assert!(reader.next().unwrap().is_none());
}

#[test]
fn truncated_content_is_an_io_error() {
    let data = b"WARC/1.0\r\nContent-Length: 20\r\n\r\nshort";
    let mut reader = RecordReader::new(&data[..]).unwrap();
    reader.next().unwrap().unwrap();
    match reader.next() {
        Err(Error::Io(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
        other => panic!("expected I/O error, got {:?}", other),
    }
}

#[test]
fn truncated_delimiters_are_a_format_error() {
    let data = b"WARC/1.0\r\nContent-Length: 5\r\n\r\nabcde\r\n";
    let mut reader = RecordReader::new(&data[..]).unwrap();
    reader.next().unwrap().unwrap();
    assert!(reader.next().unwrap_err().is_format());
}

#[test]
fn per_record_bzip2_members() {
    let mut members = bzip2(&record(&[("WARC-Type", "warcinfo")], b"a"));
    members.extend(bzip2(&record(&[("WARC-Type", "response")], b"bc")));

    let records = read_all(&members, ReaderConfig::default());
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].1, b"a");
    assert_eq!(records[1].1, b"bc");
}

#[test]
fn corrupt_bzip2_is_reported_on_open() {
    let data = b"BZh9\xff\xff\xff\xff\xff\xff\xff\xff\xff\xff";
    match RecordReader::new(&data[..]) {
        Err(Error::CorruptStream { compression, .. }) => assert_eq!(compression, Compression::Bzip2),
        other => panic!("expected corrupt stream, got {:?}", other),
    }
}

#[test]
fn stray_newline_after_last_record() {
    let mut data = HELLO.to_vec();
    data.extend_from_slice(b"\r\n");
    let mut reader = RecordReader::new(&data[..]).unwrap();
    reader.next().unwrap().unwrap();

    let record = reader.next().unwrap().unwrap();
    assert_eq!(record.version(), "");
    assert!(record.header().is_empty());
    assert_eq!(record.content_length(), 0);

    match reader.next() {
        Err(Error::Format(msg)) => assert_eq!(msg, "unexpected end of stream at end of record"),
        other => panic!("expected format error, got {:?}", other),
    }
}

#[test]
fn corrupt_gzip_is_reported_on_open() {
    let data = [0x1f, 0x8b, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
    match RecordReader::new(&data[..]) {
        Err(Error::CorruptStream { compression, .. }) => assert_eq!(compression, Compression::Gzip),
        other => panic!("expected corrupt stream, got {:?}", other),
    }
}

#[test]
fn close_is_idempotent() {
    let mut reader = RecordReader::new(HELLO).unwrap();
    reader.next().unwrap().unwrap();
    reader.close();
    reader.close();
    assert!(reader.is_closed());
    assert!(matches!(reader.next(), Err(Error::Closed)));
    assert!(matches!(reader.seek(), Err(Error::Closed)));
    assert!(matches!(reader.read_line(), Err(Error::Closed)));
    assert!(matches!(reader.position(), Err(Error::Closed)));
    let mut buf = [0u8; 4];
    assert!(reader.read(&mut buf).is_err());
}

#[test]
fn stream_positions() {
    let mut data = HELLO.to_vec();
    data.extend_from_slice(HELLO);
    let mut reader = RecordReader::new(&data[..]).unwrap();
    assert_eq!(reader.next().unwrap().unwrap().stream_pos(), 0);
    assert_eq!(
        reader.next().unwrap().unwrap().stream_pos(),
        HELLO.len() as u64
    );
    assert!(reader.next().unwrap().is_none());
    assert_eq!(reader.position().unwrap(), 2 * HELLO.len() as u64);
}

#[test]
fn frozen_records() {
    let data = bzip2(&sample_archive());
    let records: Vec<OwnedRecord> = RecordReader::new(&data[..])
        .unwrap()
        .into_records()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].content(), b"software: test\r\n");
    assert_eq!(records[0].version(), "WARC/1.1");
    assert!(records[0].header().record_id().is_some());
    assert!(records[0].header().date().is_some());
    assert_eq!(records[2].header().record_type(), Some(WarcRecordType::Metadata));
}

#[test]
fn record_iterator_stops_after_error() {
    let mut data = HELLO.to_vec();
    data.extend_from_slice(b"WARC/1.0\r\nContent-Length: 1\r\n\r\nxoops\r\n\r\n");
    data.extend_from_slice(HELLO);
    let mut records = RecordReader::new(&data[..]).unwrap().into_records();
    assert!(records.next().unwrap().is_ok());
    assert!(records.next().unwrap().is_ok());
    assert!(records.next().unwrap().unwrap_err().is_format());
    assert!(records.next().is_none());
}

#[test]
fn latin1_headers() {
    let data = b"WARC/1.0\r\nWARC-Filename: caf\xe9.warc\r\n\r\n\r\n\r\n";
    let config = ReaderConfig::default().with_header_encoding(HeaderEncoding::Latin1);
    let mut reader = RecordReader::with_config(&data[..], config).unwrap();
    let record = reader.next().unwrap().unwrap();
    assert_eq!(record.header().get("warc-filename"), Some("café.warc"));
}

#[test]
fn frozen_record_keeps_only_unread_content() {
    let mut reader = RecordReader::new(HELLO).unwrap();
    let mut record = reader.next().unwrap().unwrap();
    let mut buf = [0u8; 6];
    record.content().read_exact(&mut buf).unwrap();
    let frozen = record.freeze().unwrap();
    assert_eq!(frozen.content(), b"World");
    assert!(reader.next().unwrap().is_none());
}
