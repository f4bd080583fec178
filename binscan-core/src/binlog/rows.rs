use super::{BinlogOp, LogEventType, PostHeaderSizes, TableMap, TYPE_CODE_OFFSET};
use crate::error::{Error, Result};
use bytes::Bytes;
use bytes_codec::my::ReadMyEnc;
use bytes_codec::ReadBytesExt;

/// one of the nine WRITE/UPDATE/DELETE rows events, decoded down to its
/// undissected row payload
///
/// `data` is consumed row by row as the scanner advances; bit 0x01 of
/// `flags` is the end-of-statement marker that evicts the table-map
/// cache before the next rows event
#[derive(Debug, Clone, Default)]
pub struct RowsEvent {
    /// resolved table map; left at its empty default (id 0, zero
    /// columns) when no cached map carries the event's table id
    pub table: TableMap,
    pub flags: u16,
    pub op: BinlogOp,
    pub columns: u64,
    /// columns-present bitmap of the only/before image
    pub bitmap1: Bytes,
    /// columns-present bitmap of the update after-image, empty otherwise
    pub bitmap2: Bytes,
    /// remaining row payload
    pub data: Bytes,
}

impl RowsEvent {
    /// decode a full rows-event buffer against the cached table maps
    ///
    /// a rows event whose table id is not cached decodes to zero columns
    /// and is skipped by the scanner, not an error
    pub fn read_from_event(
        event: &Bytes,
        sizes: &PostHeaderSizes,
        tables: &[TableMap],
    ) -> Result<RowsEvent> {
        if event.len() <= TYPE_CODE_OFFSET {
            return Err(Error::BinlogEventError(format!(
                "event buffer too short: {}",
                event.len()
            )));
        }
        let event_type = LogEventType::from(event[TYPE_CODE_OFFSET]);
        let op = BinlogOp::from_event_type(event_type).ok_or_else(|| {
            Error::BinlogEventError(format!("not a rows event: {:?}", event_type))
        })?;
        let hsize = sizes.common()?;
        let psize = sizes.post(event[TYPE_CODE_OFFSET])?;
        if event.len() < hsize {
            return Err(Error::BinlogEventError(
                "rows event shorter than its header".to_owned(),
            ));
        }
        let mut input = event.slice(hsize..);

        let mut rows = RowsEvent {
            op,
            ..RowsEvent::default()
        };
        let table_id = match psize {
            6 => {
                let id = input.read_le_u32()? as u64;
                rows.flags = input.read_le_u16()?;
                id
            }
            8 => {
                let id = input.read_le_u48()?;
                rows.flags = input.read_le_u16()?;
                id
            }
            10 => {
                let id = input.read_le_u48()?;
                rows.flags = input.read_le_u16()?;
                let extra_len = input.read_le_u16()?;
                input.read_len(extra_len as usize)?;
                id
            }
            n => {
                return Err(Error::BinlogEventError(format!(
                    "unknown rows post header size {}",
                    n
                )))
            }
        };

        match tables.iter().rev().find(|tm| tm.id == table_id) {
            Some(tm) => rows.table = tm.clone(),
            // no matching table map cached, caller skips the event
            None => return Ok(rows),
        }

        rows.columns = input
            .read_len_enc_int()?
            .to_u64()
            .ok_or_else(|| Error::BinlogEventError("invalid column count".to_owned()))?;
        if rows.columns == 0 {
            return Ok(rows);
        }
        let bitmap_len = ((rows.columns as usize) + 7) >> 3;
        rows.bitmap1 = input.read_len(bitmap_len)?;
        if event_type.is_update_with_after_image() {
            rows.bitmap2 = input.read_len(bitmap_len)?;
        }
        rows.data = input;
        Ok(rows)
    }
}
