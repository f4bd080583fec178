use crate::auth_plugin::{AuthPlugin, MysqlNativePassword};
use crate::error::{Error, Result};
use async_net::TcpStream;
use binscan_core::cmd::ComQuit;
use binscan_core::flag::{CapabilityFlags, StatusFlags};
use binscan_core::handshake::{HandshakeClientResponse41, InitialHandshake};
use binscan_core::packet::HandshakeMessage;
use bytes::{Bytes, BytesMut};
use bytes_codec::future::{AsyncReadBytesExt, AsyncWriteBytesExt};
use bytes_codec::{ReadFromBytes, ReadFromBytesWithContext, WriteToBytes};
use futures::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use serde_derive::{Deserialize, Serialize};
use std::net::ToSocketAddrs;

/// a replication-capable connection to a MySQL server
///
/// only the slice of the protocol a binlog reader needs: packet
/// framing, the initial handshake and command dispatch
#[derive(Debug)]
pub struct Conn<S> {
    pub(crate) stream: S,
    pub(crate) cap_flags: CapabilityFlags,
    pkt_nr: u8,
    pub(crate) server_status: StatusFlags,
}

impl Conn<TcpStream> {
    /// make the initial TCP connection to a MySQL server
    ///
    /// the caller has to run the handshake before any command
    pub async fn connect<T: ToSocketAddrs>(addr: T) -> Result<Conn<TcpStream>> {
        let socket_addr = match addr.to_socket_addrs()?.next() {
            Some(addr) => addr,
            None => return Err(Error::AddrNotFound),
        };
        let stream = TcpStream::connect(socket_addr).await?;
        log::debug!("connected to MySQL: {}", socket_addr);
        Ok(Conn::new(stream))
    }
}

impl<S> Conn<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Conn {
            stream,
            cap_flags: CapabilityFlags::empty(),
            pkt_nr: 0,
            server_status: StatusFlags::empty(),
        }
    }

    /// process the initial handshake, authenticating with
    /// mysql_native_password
    pub async fn handshake(&mut self, opts: ConnOpts) -> Result<()> {
        let mut msg = self.recv_msg().await?;
        let handshake = InitialHandshake::read_from(&mut msg)?;
        log::debug!(
            "protocol version: {}, server version: {}, connection id: {}",
            handshake.protocol_version,
            String::from_utf8_lossy(handshake.server_version.as_ref()),
            handshake.connection_id,
        );
        let seed = handshake.seed();

        self.cap_flags.insert(CapabilityFlags::LONG_PASSWORD);
        self.cap_flags.insert(CapabilityFlags::PROTOCOL_41);
        self.cap_flags.insert(CapabilityFlags::TRANSACTIONS);
        self.cap_flags.insert(CapabilityFlags::MULTI_RESULTS);
        self.cap_flags.insert(CapabilityFlags::SECURE_CONNECTION);
        self.cap_flags.insert(CapabilityFlags::PLUGIN_AUTH);
        self.cap_flags
            .insert(CapabilityFlags::PLUGIN_AUTH_LENENC_CLIENT_DATA);
        // allow the server to answer commands with OK instead of EOF
        self.cap_flags.insert(CapabilityFlags::DEPRECATE_EOF);
        if !opts.database.is_empty() {
            self.cap_flags.insert(CapabilityFlags::CONNECT_WITH_DB);
        }

        let (auth_plugin_name, auth_response) =
            gen_auth_resp(&opts.username, &opts.password, &seed)?;
        let client_resp = HandshakeClientResponse41 {
            capability_flags: self.cap_flags,
            username: opts.username,
            auth_response,
            database: opts.database,
            auth_plugin_name,
            ..Default::default()
        };
        self.send_msg(client_resp, false).await?;
        let cap_flags = self.cap_flags;
        let mut msg = self.recv_msg().await?;
        match HandshakeMessage::read_with_ctx(&mut msg, &cap_flags)? {
            HandshakeMessage::Ok(ok) => {
                log::debug!("handshake succeeds");
                self.server_status = ok.status_flags;
                // command phase restarts the packet sequence
                self.reset_pkt_nr();
                Ok(())
            }
            HandshakeMessage::Err(err) => Err(err.into()),
            HandshakeMessage::Switch(switch) => Err(Error::PacketError(format!(
                "unsupported auth switch to {}",
                String::from_utf8_lossy(switch.plugin_name.as_ref()),
            ))),
        }
    }

    /// receive one message, concatenating packets when the payload was
    /// split at the 16 MiB boundary
    pub async fn recv_msg(&mut self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        loop {
            let payload_len = self.stream.read_le_u24().await?;
            let seq_id = self.stream.read_u8().await?;
            log::trace!(
                "receive packet: payload_len={}, seq_id={}",
                payload_len,
                seq_id
            );
            if seq_id != self.pkt_nr {
                return Err(Error::PacketError(format!(
                    "server packet out of order: {} != {}",
                    seq_id, self.pkt_nr
                )));
            }
            self.pkt_nr = self.pkt_nr.wrapping_add(1);
            self.stream
                .read_len_out(payload_len as usize, &mut buf)
                .await?;
            // https://dev.mysql.com/doc/internals/en/sending-more-than-16mbyte.html
            if payload_len < 0xffffff {
                break;
            }
        }
        Ok(buf.freeze())
    }

    /// send one message, splitting into multiple packets if the payload
    /// is too large
    pub async fn send_msg<T>(&mut self, msg: T, reset_pkt_nr: bool) -> Result<()>
    where
        T: WriteToBytes,
    {
        if reset_pkt_nr {
            self.reset_pkt_nr();
        }
        let mut buf = BytesMut::new();
        msg.write_to(&mut buf)?;
        let mut chunk_size = 0;
        for chunk in buf.as_ref().chunks(0xffffff) {
            chunk_size = chunk.len();
            self.stream.write_le_u24(chunk_size as u32).await?;
            self.stream.write_u8(self.pkt_nr).await?;
            self.stream.write_all(chunk).await?;
            self.pkt_nr = self.pkt_nr.wrapping_add(1);
        }
        if chunk_size == 0xffffff {
            // empty trailing chunk marks the end
            self.stream.write_le_u24(0).await?;
            self.stream.write_u8(self.pkt_nr).await?;
            self.pkt_nr = self.pkt_nr.wrapping_add(1);
        }
        Ok(())
    }

    /// reset the packet sequence, done before each command
    pub fn reset_pkt_nr(&mut self) {
        self.pkt_nr = 0;
    }

    /// send COM_QUIT best effort and shut the stream down
    pub async fn close(&mut self) -> Result<()> {
        let _ = self.send_msg(ComQuit::new(), true).await;
        self.stream.close().await?;
        Ok(())
    }
}

fn gen_auth_resp(username: &str, password: &str, seed: &[u8]) -> Result<(String, Vec<u8>)> {
    let mut ap = MysqlNativePassword::new();
    ap.set_credential(username, password);
    let mut auth_response = vec![];
    ap.next(seed, &mut auth_response)?;
    Ok((MysqlNativePassword::NAME.to_owned(), auth_response))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnOpts {
    pub username: String,
    pub password: String,
    pub database: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::io::Cursor;

    fn packet(seq: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes()[..3]);
        out.push(seq);
        out.extend_from_slice(payload);
        out
    }

    #[smol_potat::test]
    async fn test_recv_msg() {
        let stream = Cursor::new(packet(0, b"hello"));
        let mut conn = Conn::new(stream);
        let msg = conn.recv_msg().await.unwrap();
        assert_eq!(b"hello", msg.as_ref());
    }

    #[smol_potat::test]
    async fn test_recv_msg_out_of_order() {
        let stream = Cursor::new(packet(3, b"hello"));
        let mut conn = Conn::new(stream);
        assert!(matches!(
            conn.recv_msg().await,
            Err(Error::PacketError(_))
        ));
    }

    #[smol_potat::test]
    async fn test_recv_msg_sequence() {
        let mut bytes = packet(0, b"first");
        bytes.extend(packet(1, b"second"));
        let stream = Cursor::new(bytes);
        let mut conn = Conn::new(stream);
        assert_eq!(b"first", conn.recv_msg().await.unwrap().as_ref());
        assert_eq!(b"second", conn.recv_msg().await.unwrap().as_ref());
    }

    #[smol_potat::test]
    async fn test_send_msg_frames_packet() {
        let stream = Cursor::new(Vec::new());
        let mut conn = Conn::new(stream);
        conn.send_msg(ComQuit::new(), true).await.unwrap();
        let written = conn.stream.into_inner();
        assert_eq!(vec![1, 0, 0, 0, 0x01], written);
    }
}
