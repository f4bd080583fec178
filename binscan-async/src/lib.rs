//! event sources and the row scanner of the binlog reader
//!
//! a Binlog event source yields framed events from a file on disk or a
//! live replication connection; BinlogScanner turns that stream into
//! typed rows
mod auth_plugin;
pub mod binlog;
pub mod conn;
pub mod error;
pub mod file;
pub mod scanner;
#[cfg(test)]
pub(crate) mod testing;

pub use crate::binlog::{Binlog, BinlogConn};
pub use crate::conn::{Conn, ConnOpts};
pub use crate::error::{Error, Result};
pub use crate::file::BinlogFile;
pub use crate::scanner::BinlogScanner;
