//! generic server packets of the MySQL client/server protocol
use crate::flag::{CapabilityFlags, StatusFlags};
use crate::handshake::AuthSwitchRequest;
use bytes::{Buf, Bytes};
use bytes_codec::error::{Error, Needed, Result};
use bytes_codec::my::ReadMyEnc;
use bytes_codec::{ReadBytesExt, ReadFromBytes, ReadFromBytesWithContext};

/// Ok packet
///
/// reference: https://dev.mysql.com/doc/internals/en/packet-OK_Packet.html
#[derive(Debug, Clone)]
pub struct OkPacket {
    pub header: u8,
    pub affected_rows: u64,
    pub last_insert_id: u64,
    pub status_flags: StatusFlags,
    pub warnings: u16,
    pub info: Bytes,
}

impl<'c> ReadFromBytesWithContext<'c> for OkPacket {
    type Context = &'c CapabilityFlags;

    fn read_with_ctx(input: &mut Bytes, cap_flags: Self::Context) -> Result<Self> {
        let header = input.read_u8()?;
        let affected_rows = input
            .read_len_enc_int()?
            .to_u64()
            .ok_or_else(|| Error::ConstraintError("invalid affected rows".to_owned()))?;
        let last_insert_id = input
            .read_len_enc_int()?
            .to_u64()
            .ok_or_else(|| Error::ConstraintError("invalid last insert id".to_owned()))?;
        let status_flags = if cap_flags.contains(CapabilityFlags::PROTOCOL_41)
            || cap_flags.contains(CapabilityFlags::TRANSACTIONS)
        {
            StatusFlags::from_bits_truncate(input.read_le_u16()?)
        } else {
            StatusFlags::empty()
        };
        let warnings = if cap_flags.contains(CapabilityFlags::PROTOCOL_41) {
            input.read_le_u16()?
        } else {
            0
        };
        let info = if cap_flags.contains(CapabilityFlags::SESSION_TRACK) {
            input
                .read_len_enc_str()?
                .into_bytes()
                .unwrap_or_else(Bytes::new)
        } else {
            input.split_to(input.remaining())
        };
        Ok(OkPacket {
            header,
            affected_rows,
            last_insert_id,
            status_flags,
            warnings,
            info,
        })
    }
}

/// Err packet
///
/// reference: https://dev.mysql.com/doc/internals/en/packet-ERR_Packet.html
#[derive(Debug, Clone)]
pub struct ErrPacket {
    pub header: u8,
    pub error_code: u16,
    // only present after the handshake, when PROTOCOL_41 is active
    pub sql_state_marker: u8,
    pub sql_state: Bytes,
    pub error_message: Bytes,
}

impl<'c> ReadFromBytesWithContext<'c> for ErrPacket {
    type Context = (&'c CapabilityFlags, bool);

    fn read_with_ctx(input: &mut Bytes, (cap_flags, sql): Self::Context) -> Result<Self> {
        let header = input.read_u8()?;
        let error_code = input.read_le_u16()?;
        let (sql_state_marker, sql_state) =
            if sql && cap_flags.contains(CapabilityFlags::PROTOCOL_41) {
                (input.read_u8()?, input.read_len(5)?)
            } else {
                (0, Bytes::new())
            };
        let error_message = input.split_to(input.remaining());
        Ok(ErrPacket {
            header,
            error_code,
            sql_state_marker,
            sql_state,
            error_message,
        })
    }
}

/// Eof packet
///
/// reference: https://dev.mysql.com/doc/internals/en/packet-EOF_Packet.html
#[derive(Debug, Clone)]
pub struct EofPacket {
    pub header: u8,
    pub warnings: u16,
    pub status_flags: StatusFlags,
}

impl<'c> ReadFromBytesWithContext<'c> for EofPacket {
    type Context = &'c CapabilityFlags;

    fn read_with_ctx(input: &mut Bytes, cap_flags: Self::Context) -> Result<Self> {
        let header = input.read_u8()?;
        let (warnings, status_flags) = if cap_flags.contains(CapabilityFlags::PROTOCOL_41) {
            (
                input.read_le_u16()?,
                StatusFlags::from_bits_truncate(input.read_le_u16()?),
            )
        } else {
            (0, StatusFlags::empty())
        };
        Ok(EofPacket {
            header,
            warnings,
            status_flags,
        })
    }
}

/// server reply to the client handshake response
#[derive(Debug, Clone)]
pub enum HandshakeMessage {
    Ok(OkPacket),
    Err(ErrPacket),
    Switch(AuthSwitchRequest),
}

impl<'c> ReadFromBytesWithContext<'c> for HandshakeMessage {
    type Context = &'c CapabilityFlags;

    fn read_with_ctx(input: &mut Bytes, cap_flags: Self::Context) -> Result<Self> {
        if !input.has_remaining() {
            return Err(Error::InputIncomplete(Bytes::new(), Needed::Unknown));
        }
        match input[0] {
            0x00 => Ok(HandshakeMessage::Ok(OkPacket::read_with_ctx(
                input, cap_flags,
            )?)),
            0xff => Ok(HandshakeMessage::Err(ErrPacket::read_with_ctx(
                input,
                (cap_flags, false),
            )?)),
            0xfe => Ok(HandshakeMessage::Switch(AuthSwitchRequest::read_from(
                input,
            )?)),
            c => Err(Error::ConstraintError(format!(
                "invalid packet header {:02x}",
                c
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn test_ok_packet() {
        let mut out = BytesMut::new();
        out.put_u8(0x00);
        out.put_u8(3); // affected rows
        out.put_u8(0); // last insert id
        out.put_u16_le(0x0002);
        out.put_u16_le(1);
        out.put(&b"done"[..]);
        let mut input = out.freeze();
        let cap = CapabilityFlags::PROTOCOL_41;
        let ok = OkPacket::read_with_ctx(&mut input, &cap).unwrap();
        assert_eq!(3, ok.affected_rows);
        assert!(ok.status_flags.contains(StatusFlags::STATUS_AUTOCOMMIT));
        assert_eq!(1, ok.warnings);
        assert_eq!(b"done", ok.info.as_ref());
    }

    #[test]
    fn test_err_packet() {
        let mut out = BytesMut::new();
        out.put_u8(0xff);
        out.put_u16_le(1236);
        out.put_u8(b'#');
        out.put(&b"HY000"[..]);
        out.put(&b"Could not find first log file name"[..]);
        let mut input = out.freeze();
        let cap = CapabilityFlags::PROTOCOL_41;
        let err = ErrPacket::read_with_ctx(&mut input, (&cap, true)).unwrap();
        assert_eq!(1236, err.error_code);
        assert_eq!(b"HY000", err.sql_state.as_ref());
        assert_eq!(
            b"Could not find first log file name",
            err.error_message.as_ref()
        );
    }

    #[test]
    fn test_eof_packet() {
        let mut input = Bytes::from_static(&[0xfe, 0x00, 0x00, 0x02, 0x00]);
        let cap = CapabilityFlags::PROTOCOL_41;
        let eof = EofPacket::read_with_ctx(&mut input, &cap).unwrap();
        assert_eq!(0xfe, eof.header);
        assert_eq!(0, eof.warnings);
        assert!(eof.status_flags.contains(StatusFlags::STATUS_AUTOCOMMIT));
    }
}
