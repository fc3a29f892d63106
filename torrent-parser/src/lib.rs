use std::{fs::File, io::Read, path::Path};

use decoder::BencodeDecoder;
use error::TorrentParserError;
use model::TorrentMetadata;

pub mod cursor;
pub mod decoder;
pub mod error;
pub mod model;
mod tracker;
mod validator;
pub mod value;

pub use decoder::{decode, DecoderOptions, DuplicateKeyPolicy};
pub use tracker::{decode_compact_peers, parse_tracker_response};
pub use value::BencodeValue;

pub fn parse_torrent_metadata(bencoded: &[u8]) -> Result<TorrentMetadata, TorrentParserError> {
    parse_torrent_reader(bencoded)
}

pub fn parse_torrent_reader<R: Read>(reader: R) -> Result<TorrentMetadata, TorrentParserError> {
    parse_torrent_reader_with(reader, DecoderOptions::default())
}

/// Decodes and validates a torrent document read from `reader`.
pub fn parse_torrent_reader_with<R: Read>(
    reader: R,
    options: DecoderOptions,
) -> Result<TorrentMetadata, TorrentParserError> {
    let mut decoder = BencodeDecoder::with_options(reader, options);
    let root = decoder.decode()?;
    validator::build_metadata(&root, decoder.info_bytes())
}

pub fn parse_torrent_file<P: AsRef<Path>>(
    file_path: P,
) -> Result<TorrentMetadata, TorrentParserError> {
    let file = File::open(file_path)?;
    parse_torrent_reader(file)
}
