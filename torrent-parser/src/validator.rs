use tracing::debug;
use url::Url;

use crate::{
    error::TorrentParserError,
    model::{FileMode, InfoFile, InfoHash, TorrentMetadata},
    value::{BencodeValue, Dictionary},
};

pub(crate) fn type_error(expected: &str, found: &BencodeValue) -> TorrentParserError {
    TorrentParserError::FieldTypeError {
        expected: expected.to_string(),
        found: found.type_name().to_string(),
    }
}

pub(crate) fn bytes_to_string(bytes: &[u8]) -> Result<String, TorrentParserError> {
    Ok(String::from_utf8(bytes.to_vec())?)
}

pub(crate) fn expect_dict(value: &BencodeValue) -> Result<&Dictionary, TorrentParserError> {
    match value {
        BencodeValue::Dictionary(dict) => Ok(dict),
        other => Err(type_error("Dict", other)),
    }
}

pub(crate) fn required<'a>(
    dict: &'a Dictionary,
    key: &str,
) -> Result<&'a BencodeValue, TorrentParserError> {
    dict.get(key.as_bytes())
        .ok_or_else(|| TorrentParserError::MissingRequiredField(key.to_string()))
}

pub(crate) fn optional_integer(
    dict: &Dictionary,
    key: &str,
) -> Result<Option<i64>, TorrentParserError> {
    match dict.get(key.as_bytes()) {
        Some(BencodeValue::Integer(value)) => Ok(Some(*value)),
        None => Ok(None),
        Some(other) => Err(type_error("Integer", other)),
    }
}

pub(crate) fn required_integer(dict: &Dictionary, key: &str) -> Result<i64, TorrentParserError> {
    optional_integer(dict, key)?
        .ok_or_else(|| TorrentParserError::MissingRequiredField(key.to_string()))
}

pub(crate) fn optional_bytes<'a>(
    dict: &'a Dictionary,
    key: &str,
) -> Result<Option<&'a [u8]>, TorrentParserError> {
    match dict.get(key.as_bytes()) {
        Some(BencodeValue::ByteString(bytes)) => Ok(Some(bytes)),
        None => Ok(None),
        Some(other) => Err(type_error("String", other)),
    }
}

pub(crate) fn optional_string(
    dict: &Dictionary,
    key: &str,
) -> Result<Option<String>, TorrentParserError> {
    optional_bytes(dict, key)?.map(bytes_to_string).transpose()
}

pub(crate) fn required_string(dict: &Dictionary, key: &str) -> Result<String, TorrentParserError> {
    optional_string(dict, key)?
        .ok_or_else(|| TorrentParserError::MissingRequiredField(key.to_string()))
}

fn positive(key: &str, value: i64) -> Result<u64, TorrentParserError> {
    if value <= 0 {
        return Err(TorrentParserError::InvalidField(format!(
            "{} must be positive, found {}",
            key, value
        )));
    }
    Ok(value as u64)
}

/// Builds typed metadata from a decoded torrent document.
///
/// `info_bytes` is the literal encoding of the `info` dictionary captured by
/// the decoder; it is hashed as-is.
pub(crate) fn build_metadata(
    root: &BencodeValue,
    info_bytes: Option<&[u8]>,
) -> Result<TorrentMetadata, TorrentParserError> {
    let dict = expect_dict(root)?;

    let announce = required_string(dict, "announce")?;
    let info = match required(dict, "info")? {
        BencodeValue::Dictionary(info) => info,
        other => return Err(type_error("Dict", other)),
    };

    let piece_length = positive("piece length", required_integer(info, "piece length")?)?;
    let pieces = optional_bytes(info, "pieces")?
        .ok_or_else(|| TorrentParserError::MissingRequiredField("pieces".to_string()))?;
    let piece_hashes = split_piece_hashes(pieces)?;

    let creation_date = match optional_integer(dict, "creation date")? {
        Some(date) if date < 0 => {
            return Err(TorrentParserError::InvalidField(format!(
                "creation date must not be negative, found {}",
                date
            )))
        }
        date => date.map(|date| date as u64),
    };

    let mut announce_list = vec![announce];
    match dict.get(b"announce-list".as_slice()) {
        Some(BencodeValue::List(tiers)) => announce_list.extend(flatten_announce_list(tiers)),
        None => {}
        Some(other) => return Err(type_error("List", other)),
    }

    let comment = optional_string(dict, "comment")?;
    let created_by = optional_string(dict, "created by")?;
    let encoding = optional_string(dict, "encoding")?;
    let private = optional_integer(info, "private")?.is_some_and(|flag| flag != 0);

    let mode = discriminate_mode(info)?;
    // multi-file torrents use the name only as a suggested directory
    let name = optional_string(info, "name")?.unwrap_or_default();

    let info_bytes =
        info_bytes.ok_or_else(|| TorrentParserError::MissingRequiredField("info".to_string()))?;

    Ok(TorrentMetadata {
        name,
        announce_list,
        creation_date,
        comment,
        created_by,
        encoding,
        piece_length,
        piece_hashes,
        private,
        mode,
        info_hash: InfoHash::from_info_bytes(info_bytes),
    })
}

fn split_piece_hashes(pieces: &[u8]) -> Result<Vec<[u8; 20]>, TorrentParserError> {
    if pieces.is_empty() || pieces.len() % 20 != 0 {
        return Err(TorrentParserError::InvalidField(format!(
            "pieces length {} is not a positive multiple of 20",
            pieces.len()
        )));
    }

    let mut hashes = Vec::with_capacity(pieces.len() / 20);
    for chunk in pieces.chunks_exact(20) {
        let mut hash = [0u8; 20];
        hash.copy_from_slice(chunk);
        hashes.push(hash);
    }
    Ok(hashes)
}

// tiers that are not lists and entries that are not URLs are skipped
fn flatten_announce_list(tiers: &[BencodeValue]) -> impl Iterator<Item = String> + '_ {
    tiers
        .iter()
        .filter_map(BencodeValue::as_list)
        .flatten()
        .filter_map(BencodeValue::as_bytes)
        .filter_map(|url| String::from_utf8(url.to_vec()).ok())
        .filter(|url| match Url::parse(url) {
            Ok(_) => true,
            Err(e) => {
                debug!(%url, error = %e, "dropping announce-list entry that is not a URL");
                false
            }
        })
}

/// Single-file wins when both shapes would validate.
fn discriminate_mode(info: &Dictionary) -> Result<FileMode, TorrentParserError> {
    match single_file_mode(info) {
        Ok(mode) => return Ok(mode),
        Err(reason) => debug!(%reason, "info is not single-file, trying multi-file"),
    }

    multi_file_mode(info).map_err(|reason| {
        debug!(%reason, "info is not multi-file either");
        TorrentParserError::AmbiguousMode(reason.to_string())
    })
}

fn single_file_mode(info: &Dictionary) -> Result<FileMode, TorrentParserError> {
    let name = required_string(info, "name")?;
    if name.is_empty() {
        return Err(TorrentParserError::InvalidField("name is empty".to_string()));
    }
    let length = positive("length", required_integer(info, "length")?)?;
    Ok(FileMode::SingleFile { length })
}

fn multi_file_mode(info: &Dictionary) -> Result<FileMode, TorrentParserError> {
    let files = match required(info, "files")? {
        BencodeValue::List(files) => files,
        other => return Err(type_error("List", other)),
    };
    if files.is_empty() {
        return Err(TorrentParserError::InvalidField("files is empty".to_string()));
    }

    let files = files
        .iter()
        .map(|file| {
            let file = expect_dict(file)?;
            let length = positive("file length", required_integer(file, "length")?)?;
            let path = match required(file, "path")? {
                BencodeValue::List(segments) => segments
                    .iter()
                    .map(|segment| match segment {
                        BencodeValue::ByteString(segment) => bytes_to_string(segment),
                        other => Err(type_error("String", other)),
                    })
                    .collect::<Result<Vec<String>, TorrentParserError>>()?,
                other => return Err(type_error("List", other)),
            };
            if path.is_empty() {
                return Err(TorrentParserError::InvalidField(
                    "file path is empty".to_string(),
                ));
            }
            Ok(InfoFile { path, length })
        })
        .collect::<Result<Vec<InfoFile>, TorrentParserError>>()?;

    Ok(FileMode::MultiFile { files })
}
