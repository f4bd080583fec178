//! per-row decoding of the binary row payload
//!
//! a row is decoded against a columns-present bitmap: absent columns
//! leave the destination slot untouched, which is what lets an update
//! after-image overwrite only the columns it actually carries
use crate::bitmap;
use crate::col::{BinlogValue, ColumnType};
use crate::error::{Error, Result};
use crate::time::{read_time_text, MyDateTime};
use bytes::Bytes;
use bytes_codec::my::{LenEncInt, LenEncStr, ReadMyEnc};
use bytes_codec::ReadBytesExt;
use chrono::FixedOffset;
use std::convert::TryFrom;

/// decode one row image from `data` into `dest`
///
/// `bitmap` is the columns-present bitmap of this image; the leading
/// null bitmap covers present columns only, one bit per present column
/// in present order. `data` is advanced past the bytes consumed.
pub fn read_bin_row(
    dest: &mut [BinlogValue],
    bitmap: &[u8],
    data: &mut Bytes,
    types: &[u8],
    tz: FixedOffset,
) -> Result<()> {
    if types.len() < dest.len() {
        return Err(Error::BinlogEventError(format!(
            "table map declares {} columns, rows event carries {}",
            types.len(),
            dest.len()
        )));
    }
    let present = bitmap::count_ones(bitmap);
    let null_len = (present + 7) >> 3;
    let null_bitmap = data.read_len(null_len)?;
    let mut ioff = 0usize;
    for i in 0..dest.len() {
        if !bitmap::index(bitmap, i) {
            // column absent in this image
            ioff += 1;
            continue;
        }
        if bitmap::index(null_bitmap.as_ref(), i - ioff) {
            dest[i] = BinlogValue::Null;
            continue;
        }
        dest[i] = read_bin_value(data, types[i], tz)?;
    }
    Ok(())
}

/// decode one non-null column value of the binary row format
fn read_bin_value(data: &mut Bytes, type_code: u8, tz: FixedOffset) -> Result<BinlogValue> {
    let value = match ColumnType::try_from(type_code)? {
        ColumnType::Null => BinlogValue::Null,

        // numeric types, carried unsigned
        ColumnType::Tiny => BinlogValue::Tiny(data.read_u8()?),
        ColumnType::Short | ColumnType::Year => BinlogValue::Short(data.read_le_u16()?),
        ColumnType::Int24 | ColumnType::Long => BinlogValue::Long(data.read_le_u32()?),
        ColumnType::LongLong => BinlogValue::LongLong(data.read_le_u64()?),
        ColumnType::Float => BinlogValue::Float(data.read_le_f32()?),
        ColumnType::Double => BinlogValue::Double(data.read_le_f64()?),

        // length coded binary strings
        ColumnType::Decimal
        | ColumnType::NewDecimal
        | ColumnType::Varchar
        | ColumnType::Bit
        | ColumnType::Enum
        | ColumnType::Set
        | ColumnType::TinyBlob
        | ColumnType::MediumBlob
        | ColumnType::LongBlob
        | ColumnType::Blob
        | ColumnType::VarString
        | ColumnType::String
        | ColumnType::Geometry => match data.read_len_enc_str()? {
            LenEncStr::Null => BinlogValue::Null,
            LenEncStr::Err => {
                return Err(Error::BinlogEventError(
                    "error marker in length encoded string".to_owned(),
                ))
            }
            LenEncStr::Bytes(bs) => BinlogValue::Bytes(bs),
        },

        // date and datetime, length-prefixed packed payload
        ColumnType::Date
        | ColumnType::NewDate
        | ColumnType::Timestamp
        | ColumnType::DateTime => match data.read_len_enc_int()? {
            LenEncInt::Null => BinlogValue::Null,
            lei => {
                let num = lei
                    .to_u64()
                    .ok_or_else(|| Error::BinlogEventError("invalid datetime length".to_owned()))?;
                BinlogValue::DateTime(MyDateTime::read_packed(data, num, tz)?)
            }
        },

        // time, surfaced as a formatted byte string
        ColumnType::Time => match data.read_len_enc_int()? {
            LenEncInt::Null => BinlogValue::Null,
            lei => {
                let num = lei
                    .to_u64()
                    .ok_or_else(|| Error::BinlogEventError("invalid time length".to_owned()))?;
                if num == 0 {
                    BinlogValue::Bytes(Bytes::from_static(b"00:00:00"))
                } else {
                    BinlogValue::Bytes(read_time_text(data, num)?)
                }
            }
        },
    };
    Ok(value)
}
