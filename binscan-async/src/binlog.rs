//! the event source abstraction and its network implementation
use crate::conn::{Conn, ConnOpts};
use crate::error::{Error, Result};
use async_net::TcpStream;
use async_trait::async_trait;
use binscan_core::cmd::{BinlogFlags, ComBinlogDump};
use binscan_core::packet::ErrPacket;
use bytes::{Buf, Bytes};
use bytes_codec::ReadFromBytesWithContext;
use futures::io::{AsyncRead, AsyncWrite};
use std::net::ToSocketAddrs;

/// a source of framed binlog events
///
/// both implementations yield one complete event buffer per call, with
/// the 19-byte common header at the front; None signals a clean end of
/// stream, distinct from errors. Sources are single-consumer.
#[async_trait]
pub trait Binlog {
    async fn read_event(&mut self) -> Result<Option<Bytes>>;

    async fn close(&mut self) -> Result<()>;
}

/// event source over a live replication connection
///
/// issues COM_BINLOG_DUMP and decodes the reply stream: each event
/// packet is prefixed with a single OK byte which is stripped before
/// the buffer is handed out
#[derive(Debug)]
pub struct BinlogConn<S> {
    conn: Conn<S>,
}

impl BinlogConn<TcpStream> {
    /// connect, authenticate and request the binlog stream
    ///
    /// a zero client_id is replaced with a random slave id; positions
    /// below 4 are clamped to the first event after the magic word
    pub async fn connect<T: ToSocketAddrs>(
        addr: T,
        opts: ConnOpts,
        client_id: u32,
        filename: &str,
        pos: u32,
        flags: BinlogFlags,
    ) -> Result<BinlogConn<TcpStream>> {
        let mut conn = Conn::connect(addr).await?;
        conn.handshake(opts).await?;
        let mut binlog = BinlogConn { conn };
        binlog.request_dump(client_id, filename, pos, flags).await?;
        Ok(binlog)
    }
}

impl<S> BinlogConn<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// wrap an already authenticated connection
    pub fn new(conn: Conn<S>) -> Self {
        BinlogConn { conn }
    }

    async fn request_dump(
        &mut self,
        client_id: u32,
        filename: &str,
        pos: u32,
        flags: BinlogFlags,
    ) -> Result<()> {
        use rand::Rng;
        let server_id = if client_id != 0 {
            client_id
        } else {
            rand::thread_rng().gen()
        };
        let dump = ComBinlogDump::new(filename, pos, server_id, flags);
        log::debug!("dump={:?}", dump);
        self.conn.send_msg(dump, true).await?;
        Ok(())
    }
}

#[async_trait]
impl<S> Binlog for BinlogConn<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn read_event(&mut self) -> Result<Option<Bytes>> {
        let mut msg = self.conn.recv_msg().await?;
        if !msg.has_remaining() {
            return Err(Error::PacketError("empty packet".to_owned()));
        }
        match msg[0] {
            0x00 => {
                // strip the OK byte, the rest is the event buffer
                msg.advance(1);
                Ok(Some(msg))
            }
            0xfe if msg.len() == 5 => Ok(None),
            0xff => {
                let err = ErrPacket::read_with_ctx(&mut msg, (&self.conn.cap_flags, true))?;
                Err(err.into())
            }
            c => Err(Error::PacketError(format!(
                "invalid binlog stream header {:02x}",
                c
            ))),
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.conn.close().await
    }
}
