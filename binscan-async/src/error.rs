use binscan_core::packet::ErrPacket;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("address not found")]
    AddrNotFound,
    #[error("not a binlog")]
    NotBinlog,
    #[error("bad binlog event")]
    BadEvent,
    #[error("unexpected end of event stream")]
    UnexpectedEof,
    #[error("event source closed")]
    Closed,
    #[error("packet error: {0}")]
    PacketError(String),
    #[error("server error {code}: {message}")]
    Server { code: u16, message: String },
    #[error("codec error: {0}")]
    Codec(#[from] bytes_codec::Error),
    #[error("decode error: {0}")]
    Decode(#[from] binscan_core::Error),
    #[error("scan called without calling next")]
    ScanNoRow,
    #[error("expected {expected} destination values in scan, not {actual}")]
    ScanArity { expected: usize, actual: usize },
}

impl From<ErrPacket> for Error {
    fn from(err: ErrPacket) -> Self {
        Error::Server {
            code: err.error_code,
            message: String::from_utf8_lossy(err.error_message.as_ref()).into_owned(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
