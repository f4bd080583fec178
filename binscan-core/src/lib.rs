//! decoding of MySQL binlog events and the slice of the client/server
//! protocol a replication reader needs
//!
//! no I/O lives here; the event sources and the row scanner are in
//! binscan-async
pub mod binlog;
pub mod bitmap;
pub mod cmd;
pub mod col;
pub mod error;
pub mod flag;
pub mod handshake;
pub mod packet;
pub mod row;
pub mod scan;
pub mod time;

pub use crate::cmd::{BinlogFlags, ComBinlogDump, ComQuit, Command};
pub use crate::error::{Error, Result};
