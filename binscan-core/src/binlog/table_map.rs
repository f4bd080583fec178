use super::PostHeaderSizes;
use crate::error::{Error, Result};
use bytes::Bytes;
use bytes_codec::my::ReadMyEnc;
use bytes_codec::ReadBytesExt;
use smol_str::SmolStr;

/// the table-id to schema binding declared by TABLE_MAP_EVENT
///
/// reference: https://dev.mysql.com/doc/internals/en/table-map-event.html
/// column metadata and the null-bitmap tail are not consulted; the raw
/// type codes are kept as decoded
#[derive(Debug, Clone, Default)]
pub struct TableMap {
    // actually a 6-byte integer
    pub id: u64,
    pub flags: u16,
    pub database: SmolStr,
    pub table: SmolStr,
    /// `database + "." + table + "."`, the prefix-filter match target;
    /// the trailing dot keeps "db.tbl" from matching "db.tbl2"
    pub name: String,
    /// raw field type codes, one byte per column in column order
    pub types: Bytes,
}

impl TableMap {
    /// decode a full TABLE_MAP_EVENT buffer
    pub fn read_from_event(event: &Bytes, sizes: &PostHeaderSizes) -> Result<TableMap> {
        let hsize = sizes.common()?;
        let psize = sizes.post(super::LogEventTypeCode::from(super::LogEventType::TableMapEvent).0)?;
        if event.len() < hsize {
            return Err(Error::BinlogEventError(
                "table map event shorter than its header".to_owned(),
            ));
        }
        let mut input = event.slice(hsize..);
        // 6-byte table id after 5.1.4, 4-byte before
        let id = match psize {
            6 => input.read_le_u32()? as u64,
            8 => input.read_le_u48()?,
            n => {
                return Err(Error::BinlogEventError(format!(
                    "unknown table map post header size {}",
                    n
                )))
            }
        };
        let flags = input.read_le_u16()?;
        let db_len = input.read_u8()?;
        let database = input.read_len(db_len as usize)?;
        input.read_len(1)?;
        let table_len = input.read_u8()?;
        let table = input.read_len(table_len as usize)?;
        input.read_len(1)?;
        let col_cnt = input
            .read_len_enc_int()?
            .to_u64()
            .ok_or_else(|| Error::BinlogEventError("invalid column count".to_owned()))?;
        let types = input.read_len(col_cnt as usize)?;
        let database = SmolStr::from(std::str::from_utf8(database.as_ref())?);
        let table = SmolStr::from(std::str::from_utf8(table.as_ref())?);
        let name = format!("{}.{}.", database, table);
        Ok(TableMap {
            id,
            flags,
            database,
            table,
            name,
            types,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    fn sizes() -> PostHeaderSizes {
        let mut event = vec![0u8; 75];
        event.push(19);
        let mut post = vec![0u8; 32];
        post[18] = 8; // TABLE_MAP_EVENT
        event.extend_from_slice(&post);
        PostHeaderSizes::from_event(&Bytes::from(event)).unwrap()
    }

    fn table_map_event(id: u64, db: &str, tbl: &str, types: &[u8]) -> Bytes {
        let mut out = BytesMut::new();
        out.resize(19, 0);
        out[4] = 19;
        out.put(&id.to_le_bytes()[..6]);
        out.put_u16_le(0x0001);
        out.put_u8(db.len() as u8);
        out.put(db.as_bytes());
        out.put_u8(0);
        out.put_u8(tbl.len() as u8);
        out.put(tbl.as_bytes());
        out.put_u8(0);
        out.put_u8(types.len() as u8);
        out.put(types);
        // metadata block and null bitmap, both ignored
        out.put_u8(0);
        out.put_u8(0xff);
        out.freeze()
    }

    #[test]
    fn test_read_table_map() {
        let event = table_map_event(17, "d", "t", &[0x01, 0x03]);
        let tm = TableMap::read_from_event(&event, &sizes()).unwrap();
        assert_eq!(17, tm.id);
        assert_eq!(0x0001, tm.flags);
        assert_eq!("d", tm.database.as_str());
        assert_eq!("t", tm.table.as_str());
        assert_eq!("d.t.", tm.name);
        assert_eq!(&[0x01, 0x03][..], tm.types.as_ref());
    }

    #[test]
    fn test_read_table_map_truncated() {
        let event = table_map_event(17, "d", "t", &[0x01]);
        let event = event.slice(..event.len() - 4);
        assert!(TableMap::read_from_event(&event, &sizes()).is_err());
    }
}
