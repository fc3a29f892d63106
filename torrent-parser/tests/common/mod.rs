#![allow(dead_code)]

use std::io::{self, Read};

pub fn int(value: i64) -> Vec<u8> {
    format!("i{}e", value).into_bytes()
}

pub fn bytes(value: &[u8]) -> Vec<u8> {
    let mut out = format!("{}:", value.len()).into_bytes();
    out.extend_from_slice(value);
    out
}

pub fn text(value: &str) -> Vec<u8> {
    bytes(value.as_bytes())
}

pub fn list(items: Vec<Vec<u8>>) -> Vec<u8> {
    let mut out = vec![b'l'];
    for item in items {
        out.extend(item);
    }
    out.push(b'e');
    out
}

pub fn dict(entries: Vec<(&str, Vec<u8>)>) -> Vec<u8> {
    let mut out = vec![b'd'];
    for (key, value) in entries {
        out.extend(text(key));
        out.extend(value);
    }
    out.push(b'e');
    out
}

pub fn single_file_info(name: &str, length: i64, pieces: &[u8]) -> Vec<u8> {
    dict(vec![
        ("length", int(length)),
        ("name", text(name)),
        ("piece length", int(16384)),
        ("pieces", bytes(pieces)),
    ])
}

pub fn torrent(announce: &str, info: Vec<u8>) -> Vec<u8> {
    dict(vec![("announce", text(announce)), ("info", info)])
}

/// Hands out `chunk` bytes per read call.
pub struct ChunkedReader<'a> {
    data: &'a [u8],
    chunk: usize,
}

impl<'a> ChunkedReader<'a> {
    pub fn new(data: &'a [u8], chunk: usize) -> Self {
        ChunkedReader { data, chunk }
    }
}

impl Read for ChunkedReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.chunk.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

pub struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "source went away"))
    }
}
