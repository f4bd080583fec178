//! event source over binlog files on disk
use crate::binlog::Binlog;
use crate::error::{Error, Result};
use async_trait::async_trait;
use binscan_core::binlog::{
    EventHeader, LogEventType, LogEventTypeCode, BINLOG_MAGIC, TYPE_CODE_OFFSET,
};
use binscan_core::cmd::BinlogFlags;
use bytes::{BufMut, Bytes, BytesMut};
use bytes_codec::ReadFromBytes;
use futures::io::{AsyncReadExt, AsyncSeekExt};
use smol::fs::File;
use smol::Timer;
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

const HEADER_LEN: usize = 19;

/// event source over a binlog file, following rotation to successor
/// files in the same directory
///
/// in Block mode the reader tails the log, polling once a second at end
/// of file; in NonBlock mode it drains the log once and signals end of
/// stream
#[derive(Debug)]
pub struct BinlogFile {
    file: Option<File>,
    dir: PathBuf,
    name: String,
    flags: BinlogFlags,
    start_pos: u32,
    pos: u32,
    rotate: bool,
}

impl BinlogFile {
    /// open a binlog file, verifying the magic word
    pub async fn open<P: AsRef<Path>>(
        path: P,
        start_pos: u32,
        flags: BinlogFlags,
    ) -> Result<BinlogFile> {
        let path = path.as_ref();
        let file = open_binlog_file(path).await?;
        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => return Err(Error::NotBinlog),
        };
        let dir = path.parent().map(PathBuf::from).unwrap_or_default();
        Ok(BinlogFile {
            file: Some(file),
            dir,
            name,
            flags,
            start_pos,
            // directly after the magic word
            pos: 4,
            rotate: false,
        })
    }

    /// read and validate the 19-byte common header
    ///
    /// None is the clean end of the log in NonBlock mode; Block mode
    /// polls the file once a second until more bytes arrive
    async fn read_header(&mut self) -> Result<Option<([u8; HEADER_LEN], u32, u32)>> {
        let file = self.file.as_mut().ok_or(Error::Closed)?;
        let mut header = [0u8; HEADER_LEN];
        let mut filled = 0;
        while filled < HEADER_LEN {
            let n = file.read(&mut header[filled..]).await?;
            if n == 0 {
                if self.flags.is_non_block() {
                    if filled == 0 {
                        return Ok(None);
                    }
                    // header torn mid-write with nobody left writing
                    return Err(Error::UnexpectedEof);
                }
                Timer::after(Duration::from_secs(1)).await;
                continue;
            }
            filled += n;
        }
        let mut hdr = Bytes::copy_from_slice(&header[..]);
        let eh = EventHeader::read_from(&mut hdr)?;
        if eh.next_pos < self.pos || self.pos + eh.event_len != eh.next_pos {
            return Err(Error::BadEvent);
        }
        Ok(Some((header, eh.event_len, eh.next_pos)))
    }
}

/// open and strip the magic word, leaving the cursor at offset 4
async fn open_binlog_file(path: &Path) -> Result<File> {
    let mut file = File::open(path).await?;
    let mut magic = [0u8; 4];
    if let Err(e) = file.read_exact(&mut magic).await {
        return Err(if e.kind() == ErrorKind::UnexpectedEof {
            Error::NotBinlog
        } else {
            Error::IO(e)
        });
    }
    if magic != BINLOG_MAGIC {
        return Err(Error::NotBinlog);
    }
    Ok(file)
}

#[async_trait]
impl Binlog for BinlogFile {
    async fn read_event(&mut self) -> Result<Option<Bytes>> {
        if self.rotate {
            let path = self.dir.join(&self.name);
            log::debug!("rotating to {:?}", path);
            let file = open_binlog_file(&path).await?;
            self.file = Some(file);
            self.rotate = false;
        }

        let (header, size, next_pos) = match self.read_header().await? {
            Some(h) => h,
            None => return Ok(None),
        };
        let mut buf = BytesMut::with_capacity(size as usize);
        buf.put(&header[..]);
        if size as usize > HEADER_LEN {
            buf.resize(size as usize, 0);
            let file = self.file.as_mut().ok_or(Error::Closed)?;
            if let Err(e) = file.read_exact(&mut buf[HEADER_LEN..]).await {
                return Err(if e.kind() == ErrorKind::UnexpectedEof {
                    Error::UnexpectedEof
                } else {
                    Error::IO(e)
                });
            }
        }
        let buf = buf.freeze();

        if self.start_pos > next_pos {
            // skip ahead to the position the caller asked for
            let file = self.file.as_mut().ok_or(Error::Closed)?;
            file.seek(SeekFrom::Start(self.start_pos as u64)).await?;
            self.pos = self.start_pos;
        } else if buf[TYPE_CODE_OFFSET] == LogEventTypeCode::from(LogEventType::RotateEvent).0
            && buf.len() >= 27
        {
            self.name = String::from_utf8_lossy(&buf[27..]).into_owned();
            self.pos = u64::from_le_bytes([
                buf[19], buf[20], buf[21], buf[22], buf[23], buf[24], buf[25], buf[26],
            ]) as u32;
            // defer the reopen to the next read
            self.rotate = true;
        } else {
            self.pos = next_pos;
        }
        Ok(Some(buf))
    }

    async fn close(&mut self) -> Result<()> {
        self.file = None;
        Ok(())
    }
}
