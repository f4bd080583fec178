use super::LogEventTypeCode;
use bitflags::bitflags;
use bytes::Bytes;
use bytes_codec::error::Result;
use bytes_codec::{ReadBytesExt, ReadFromBytes};

bitflags! {
    pub struct EventHeaderFlags: u16 {
        const BINLOG_IN_USE         = 0x0001;
        const FORCED_ROTATE         = 0x0002;
        const THREAD_SPECIFIC       = 0x0004;
        const SUPPRESS_USE          = 0x0008;
        const UPDATE_TABLE_MAP_VERSION = 0x0010;
        const ARTIFICIAL            = 0x0020;
        const RELAY_LOG             = 0x0040;
        const IGNORABLE             = 0x0080;
        const NO_FILTER             = 0x0100;
        const MTS_ISOLATE           = 0x0200;
    }
}

/// the 19-byte common header every v4 event starts with
///
/// timestamp 0:4, type_code 4:1, server_id 5:4, event_len 9:4,
/// next_pos 13:4, flags 17:2
#[derive(Debug, Clone)]
pub struct EventHeader {
    pub timestamp: u32,
    pub type_code: LogEventTypeCode,
    pub server_id: u32,
    pub event_len: u32,
    pub next_pos: u32,
    pub flags: EventHeaderFlags,
}

impl EventHeader {
    pub const LEN: usize = 19;

    /// always event_len - 19
    pub fn data_len(&self) -> u32 {
        self.event_len - Self::LEN as u32
    }
}

impl ReadFromBytes for EventHeader {
    fn read_from(input: &mut Bytes) -> Result<Self> {
        let timestamp = input.read_le_u32()?;
        let type_code = input.read_u8()?;
        let server_id = input.read_le_u32()?;
        let event_len = input.read_le_u32()?;
        let next_pos = input.read_le_u32()?;
        let flags = input.read_le_u16()?;
        Ok(EventHeader {
            timestamp,
            type_code: LogEventTypeCode(type_code),
            server_id,
            event_len,
            next_pos,
            flags: EventHeaderFlags::from_bits_truncate(flags),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binlog::LogEventType;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn test_event_header() {
        let mut out = BytesMut::new();
        out.put_u32_le(100);
        out.put_u8(15);
        out.put_u32_le(1);
        out.put_u32_le(120);
        out.put_u32_le(124);
        out.put_u16_le(0x0001);
        let mut input = out.freeze();
        let header = EventHeader::read_from(&mut input).unwrap();
        assert_eq!(100, header.timestamp);
        assert_eq!(
            LogEventType::FormatDescriptionEvent,
            LogEventType::from(header.type_code)
        );
        assert_eq!(1, header.server_id);
        assert_eq!(120, header.event_len);
        assert_eq!(101, header.data_len());
        assert_eq!(124, header.next_pos);
        assert!(header.flags.contains(EventHeaderFlags::BINLOG_IN_USE));
    }

    #[test]
    fn test_event_header_short() {
        let mut input = Bytes::from_static(&[0u8; 10]);
        assert!(EventHeader::read_from(&mut input).is_err());
    }
}
