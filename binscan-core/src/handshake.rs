//! connection-phase packets
use crate::flag::CapabilityFlags;
use bytes::{Buf, Bytes, BytesMut};
use bytes_codec::error::Result;
use bytes_codec::my::LenEncInt;
use bytes_codec::{ReadBytesExt, ReadFromBytes, WriteBytesExt, WriteToBytes};

/// the handshake the server opens the connection with
///
/// reference: https://dev.mysql.com/doc/internals/en/connection-phase-packets.html
#[derive(Debug, Clone)]
pub struct InitialHandshake {
    pub protocol_version: u8,
    pub server_version: Bytes,
    pub connection_id: u32,
    pub auth_plugin_data_1: Bytes,
    // filler 0x00
    pub charset: u8,
    pub status_flags: u16,
    pub capability_flags: u32,
    pub auth_plugin_data_length: u8,
    // reserved 10 bytes
    pub auth_plugin_data_2: Bytes,
    pub auth_plugin_name: Bytes,
}

impl InitialHandshake {
    /// the scramble seed is split across two fields
    pub fn seed(&self) -> Vec<u8> {
        let mut seed = Vec::from(self.auth_plugin_data_1.as_ref());
        seed.extend_from_slice(self.auth_plugin_data_2.as_ref());
        // the second part carries a trailing NUL
        if let Some(0x00) = seed.last() {
            seed.pop();
        }
        seed
    }
}

impl ReadFromBytes for InitialHandshake {
    fn read_from(input: &mut Bytes) -> Result<InitialHandshake> {
        let protocol_version = input.read_u8()?;
        let server_version = input.read_until(0, false)?;
        let connection_id = input.read_le_u32()?;
        let auth_plugin_data_1 = input.read_len(8)?;
        input.read_len(1)?;
        let capability_flags_lower = input.read_le_u16()?;
        let charset = input.read_u8()?;
        let status_flags = input.read_le_u16()?;
        let capability_flags_upper = input.read_le_u16()?;
        let auth_plugin_data_length = input.read_u8()?;
        input.read_len(10)?;
        let capability_flags =
            (capability_flags_lower as u32) | ((capability_flags_upper as u32) << 16);
        let cap_flags = CapabilityFlags::from_bits_truncate(capability_flags);
        let auth_plugin_data_2 = if cap_flags.contains(CapabilityFlags::SECURE_CONNECTION) {
            let len = std::cmp::max(13, auth_plugin_data_length.saturating_sub(8));
            input.read_len(len as usize)?
        } else {
            Bytes::new()
        };
        let auth_plugin_name = if cap_flags.contains(CapabilityFlags::PLUGIN_AUTH) {
            input.read_until(0, false)?
        } else {
            Bytes::new()
        };
        Ok(InitialHandshake {
            protocol_version,
            server_version,
            connection_id,
            auth_plugin_data_1,
            charset,
            status_flags,
            capability_flags,
            auth_plugin_data_length,
            auth_plugin_data_2,
            auth_plugin_name,
        })
    }
}

/// client response of protocol 4.1
#[derive(Debug, Clone)]
pub struct HandshakeClientResponse41 {
    pub capability_flags: CapabilityFlags,
    pub max_packet_size: u32,
    pub charset: u8,
    // 23 reserved bytes of 0x00
    pub username: String,
    pub auth_response: Vec<u8>,
    // written only if CONNECT_WITH_DB
    pub database: String,
    // written only if PLUGIN_AUTH
    pub auth_plugin_name: String,
}

impl Default for HandshakeClientResponse41 {
    fn default() -> Self {
        HandshakeClientResponse41 {
            capability_flags: CapabilityFlags::empty(),
            // max length of a three-byte word
            max_packet_size: 0xffffff,
            // utf8
            charset: 33,
            username: String::new(),
            auth_response: Vec::new(),
            database: String::new(),
            auth_plugin_name: String::new(),
        }
    }
}

impl WriteToBytes for HandshakeClientResponse41 {
    fn write_to(self, out: &mut BytesMut) -> Result<usize> {
        let mut len = 0;
        len += out.write_le_u32(self.capability_flags.bits())?;
        len += out.write_le_u32(self.max_packet_size)?;
        len += out.write_u8(self.charset)?;
        len += out.write_bytes(&[0u8; 23][..])?;
        // null-terminated username
        len += out.write_bytes(self.username.as_bytes())?;
        len += out.write_u8(0)?;
        // len-encoded auth response
        let auth_response_len = LenEncInt::from(self.auth_response.len() as u64);
        len += auth_response_len.write_to(out)?;
        len += out.write_bytes(&self.auth_response[..])?;
        if self
            .capability_flags
            .contains(CapabilityFlags::CONNECT_WITH_DB)
        {
            len += out.write_bytes(self.database.as_bytes())?;
            len += out.write_u8(0)?;
        }
        if self.capability_flags.contains(CapabilityFlags::PLUGIN_AUTH) {
            len += out.write_bytes(self.auth_plugin_name.as_bytes())?;
            len += out.write_u8(0)?;
        }
        Ok(len)
    }
}

/// server request to continue auth with a different plugin
#[derive(Debug, Clone)]
pub struct AuthSwitchRequest {
    pub header: u8,
    pub plugin_name: Bytes,
    pub auth_plugin_data: Bytes,
}

impl ReadFromBytes for AuthSwitchRequest {
    fn read_from(input: &mut Bytes) -> Result<AuthSwitchRequest> {
        let header = input.read_u8()?;
        let plugin_name = input.read_until(0, false)?;
        let auth_plugin_data = input.split_to(input.remaining());
        Ok(AuthSwitchRequest {
            header,
            plugin_name,
            auth_plugin_data,
        })
    }
}
