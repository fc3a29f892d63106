pub mod announce;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod torrent;
pub mod tracker;
pub mod udp;

pub use client::{AnnounceOutcome, TorrentClient};
pub use config::ClientConfig;
pub use error::{TorrentClientError, TorrentClientResult};
