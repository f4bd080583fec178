use crate::col::BinlogValue;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid command code: {0}")]
    InvalidCommandCode(u8),
    #[error("invalid column type code: {0}")]
    InvalidColumnTypeCode(u8),
    #[error("invalid binlog format: {0}")]
    InvalidBinlogFormat(String),
    #[error("binlog event error: {0}")]
    BinlogEventError(String),
    #[error("invalid TIME packet length {0}")]
    InvalidTimeLength(u64),
    #[error("invalid DATETIME packet length {0}")]
    InvalidDateTimeLength(u64),
    #[error("null value for non-nullable destination")]
    NullValueError,
    #[error("unsupported conversion: {0}")]
    UnsupportedConversion(String),
    #[error("utf8 string error: {0}")]
    Utf8StringError(#[from] std::string::FromUtf8Error),
    #[error("utf8 str error: {0}")]
    Utf8StrError(#[from] std::str::Utf8Error),
    #[error("codec error: {0}")]
    CodecError(#[from] bytes_codec::Error),
    #[error("parse int error: {0}")]
    ParseIntError(#[from] std::num::ParseIntError),
    #[error("parse float error: {0}")]
    ParseFloatError(#[from] std::num::ParseFloatError),
}

impl Error {
    pub fn unsupported_conversion<T: AsRef<str>>(dest: T, src: &BinlogValue) -> Self {
        Error::UnsupportedConversion(format!("{:?} -> {}", src, dest.as_ref()))
    }
}
