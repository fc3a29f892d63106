use thiserror::Error;
use torrent_parser::error::TorrentParserError;

#[derive(Error, Debug)]
pub enum TorrentClientError {
    #[error("Torrent Parser Error: {0}")]
    TorrentParserError(#[from] TorrentParserError),

    #[error("HTTP Error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("Config Error: {0}")]
    ConfigError(#[from] serde_json::Error),

    #[error("Invalid Config: {0}")]
    InvalidConfig(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported Scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Tracker Failure: {0}")]
    TrackerFailure(String),

    #[error("UDP Protocol Error: {0}")]
    UdpProtocol(String),

    #[error("Transaction Mismatch: expected {expected}, found {found}")]
    TransactionMismatch { expected: u32, found: u32 },

    #[error("Tracker Timeout")]
    Timeout,

    #[error("No Tracker Reachable: tried {0} trackers")]
    NoTrackerReachable(usize),
}

pub type TorrentClientResult<T> = Result<T, TorrentClientError>;
