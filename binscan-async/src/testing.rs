//! synthetic event construction shared by the source and scanner tests
use crate::binlog::Binlog;
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use std::collections::VecDeque;

/// scripted event source
pub(crate) struct StaticBinlog {
    events: VecDeque<Bytes>,
    /// error out instead of signaling clean end-of-stream
    pub(crate) fail_at_end: bool,
}

impl StaticBinlog {
    pub(crate) fn new(events: Vec<Bytes>) -> Self {
        StaticBinlog {
            events: events.into(),
            fail_at_end: false,
        }
    }
}

#[async_trait]
impl Binlog for StaticBinlog {
    async fn read_event(&mut self) -> Result<Option<Bytes>> {
        match self.events.pop_front() {
            Some(ev) => Ok(Some(ev)),
            None if self.fail_at_end => Err(Error::Closed),
            None => Ok(None),
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.events.clear();
        Ok(())
    }
}

/// builds wire-accurate v4 events with a consistent position chain, so
/// the same buffers satisfy both the scanner and the file reader's
/// header validation
pub(crate) struct EventBuilder {
    pub(crate) pos: u32,
}

impl EventBuilder {
    pub(crate) fn new() -> Self {
        EventBuilder { pos: 4 }
    }

    fn event(&mut self, type_code: u8, body: &[u8]) -> Bytes {
        let size = (19 + body.len()) as u32;
        let next_pos = self.pos + size;
        let mut out = BytesMut::with_capacity(size as usize);
        out.put_u32_le(0); // timestamp
        out.put_u8(type_code);
        out.put_u32_le(1); // server id
        out.put_u32_le(size);
        out.put_u32_le(next_pos);
        out.put_u16_le(0); // header flags
        out.put(body);
        self.pos = next_pos;
        out.freeze()
    }

    pub(crate) fn format_description(&mut self) -> Bytes {
        let mut body = BytesMut::new();
        body.put_u16_le(4);
        let mut server_version = [0u8; 50];
        server_version[..6].copy_from_slice(b"5.7.30");
        body.put(&server_version[..]);
        body.put_u32_le(0);
        body.put_u8(19); // common header size
        let mut post = [0u8; 32];
        post[4 - 1] = 8; // ROTATE_EVENT
        post[19 - 1] = 8; // TABLE_MAP_EVENT
        for code in 20..=25 {
            post[code - 1] = 8; // rows v0/v1
        }
        for code in 30..=32 {
            post[code - 1] = 10; // rows v2
        }
        body.put(&post[..]);
        self.event(15, body.as_ref())
    }

    pub(crate) fn rotate(&mut self, position: u64, name: &str) -> Bytes {
        let mut body = BytesMut::new();
        body.put_u64_le(position);
        body.put(name.as_bytes());
        self.event(4, body.as_ref())
    }

    pub(crate) fn table_map(&mut self, id: u64, db: &str, table: &str, types: &[u8]) -> Bytes {
        let mut body = BytesMut::new();
        body.put(&id.to_le_bytes()[..6]);
        body.put_u16_le(1); // table flags
        body.put_u8(db.len() as u8);
        body.put(db.as_bytes());
        body.put_u8(0);
        body.put_u8(table.len() as u8);
        body.put(table.as_bytes());
        body.put_u8(0);
        body.put_u8(types.len() as u8);
        body.put(types);
        body.put_u8(0); // empty metadata block
        body.put(&vec![0u8; (types.len() + 7) >> 3][..]); // null bitmap
        self.event(19, body.as_ref())
    }

    pub(crate) fn write_rows_v2(
        &mut self,
        id: u64,
        columns: u8,
        bitmap1: &[u8],
        rows: &[u8],
        stmt_end: bool,
    ) -> Bytes {
        self.rows_v2(30, id, columns, bitmap1, None, rows, stmt_end)
    }

    pub(crate) fn update_rows_v2(
        &mut self,
        id: u64,
        columns: u8,
        bitmap1: &[u8],
        bitmap2: &[u8],
        rows: &[u8],
        stmt_end: bool,
    ) -> Bytes {
        self.rows_v2(31, id, columns, bitmap1, Some(bitmap2), rows, stmt_end)
    }

    pub(crate) fn delete_rows_v2(
        &mut self,
        id: u64,
        columns: u8,
        bitmap1: &[u8],
        rows: &[u8],
        stmt_end: bool,
    ) -> Bytes {
        self.rows_v2(32, id, columns, bitmap1, None, rows, stmt_end)
    }

    #[allow(clippy::too_many_arguments)]
    fn rows_v2(
        &mut self,
        type_code: u8,
        id: u64,
        columns: u8,
        bitmap1: &[u8],
        bitmap2: Option<&[u8]>,
        rows: &[u8],
        stmt_end: bool,
    ) -> Bytes {
        let mut body = BytesMut::new();
        body.put(&id.to_le_bytes()[..6]);
        body.put_u16_le(if stmt_end { 0x01 } else { 0 });
        body.put_u16_le(0); // no extra data
        body.put_u8(columns);
        body.put(bitmap1);
        if let Some(bm2) = bitmap2 {
            body.put(bm2);
        }
        body.put(rows);
        self.event(type_code, body.as_ref())
    }

    pub(crate) fn xid(&mut self) -> Bytes {
        self.event(16, &1u64.to_le_bytes())
    }
}
