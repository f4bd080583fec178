//! the replication commands this reader sends
use crate::error::{Error, Result};
use bytes::BytesMut;
use bytes_codec::{WriteBytesExt, WriteToBytes};
use std::convert::TryFrom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    BinlogDump,
}

impl Command {
    pub fn to_byte(self) -> u8 {
        match self {
            Command::Quit => 0x01,
            Command::BinlogDump => 0x12,
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = Error;

    fn try_from(src: u8) -> Result<Self> {
        let cmd = match src {
            0x01 => Command::Quit,
            0x12 => Command::BinlogDump,
            _ => return Err(Error::InvalidCommandCode(src)),
        };
        Ok(cmd)
    }
}

/// blocking behavior of an event source at end of log
///
/// Block tails the log and waits for more events; NonBlock drains what
/// is there and signals end-of-stream. On the wire this is the
/// BINLOG_DUMP_NON_BLOCK flag of COM_BINLOG_DUMP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinlogFlags {
    Block,
    NonBlock,
}

impl BinlogFlags {
    pub fn is_non_block(self) -> bool {
        self == BinlogFlags::NonBlock
    }

    pub fn to_dump_flags(self) -> u16 {
        match self {
            BinlogFlags::Block => 0,
            BinlogFlags::NonBlock => 1,
        }
    }
}

/// request a binlog stream from the master starting at a given position
#[derive(Debug, Clone)]
pub struct ComBinlogDump {
    pub cmd: Command,
    pub binlog_pos: u32,
    pub flags: u16,
    pub server_id: u32,
    pub binlog_filename: String,
}

impl ComBinlogDump {
    pub fn new<S: Into<String>>(
        binlog_filename: S,
        binlog_pos: u32,
        server_id: u32,
        flags: BinlogFlags,
    ) -> Self {
        ComBinlogDump {
            cmd: Command::BinlogDump,
            // positions below the magic word are meaningless
            binlog_pos: binlog_pos.max(4),
            flags: flags.to_dump_flags(),
            server_id,
            binlog_filename: binlog_filename.into(),
        }
    }
}

impl WriteToBytes for ComBinlogDump {
    fn write_to(self, out: &mut BytesMut) -> bytes_codec::Result<usize> {
        let mut len = 0;
        len += out.write_u8(self.cmd.to_byte())?;
        len += out.write_le_u32(self.binlog_pos)?;
        len += out.write_le_u16(self.flags)?;
        len += out.write_le_u32(self.server_id)?;
        len += out.write_bytes(self.binlog_filename.as_bytes())?;
        Ok(len)
    }
}

/// tell the server the connection is going away
#[derive(Debug, Clone)]
pub struct ComQuit {
    pub cmd: Command,
}

impl ComQuit {
    pub fn new() -> Self {
        ComQuit { cmd: Command::Quit }
    }
}

impl Default for ComQuit {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteToBytes for ComQuit {
    fn write_to(self, out: &mut BytesMut) -> bytes_codec::Result<usize> {
        out.write_u8(self.cmd.to_byte())
    }
}
