//! decoding of the temporal column payloads of the binary row format
//!
//! DATE/DATETIME/TIMESTAMP columns arrive as a length-prefixed packed
//! payload (0, 4, 7 or 11 bytes) and are materialized in the scanner's
//! timezone; TIME columns are surfaced as formatted byte strings and are
//! never localized
use crate::error::{Error, Result};
use bytes::Bytes;
use bytes_codec::ReadBytesExt;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use std::fmt;

/// the UTC fixed offset, default timezone of the scanner
pub fn utc() -> FixedOffset {
    Utc.fix()
}

/// a datetime as MySQL stores it, with the timezone it was decoded for
///
/// zero dates (all fields 0) are representable, unlike chrono's own types
#[derive(Debug, Clone, PartialEq)]
pub struct MyDateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub micro_second: u32,
    pub offset: FixedOffset,
}

impl MyDateTime {
    pub fn zero(offset: FixedOffset) -> Self {
        MyDateTime {
            year: 0,
            month: 0,
            day: 0,
            hour: 0,
            minute: 0,
            second: 0,
            micro_second: 0,
            offset,
        }
    }

    /// decode the packed payload of a binary DATE/DATETIME/TIMESTAMP value
    ///
    /// the length prefix has already been consumed by the caller
    pub fn read_packed(input: &mut Bytes, len: u64, offset: FixedOffset) -> Result<Self> {
        let mut dt = MyDateTime::zero(offset);
        match len {
            0 => (),
            4 | 7 | 11 => {
                dt.year = input.read_le_u16()?;
                dt.month = input.read_u8()?;
                dt.day = input.read_u8()?;
                if len >= 7 {
                    dt.hour = input.read_u8()?;
                    dt.minute = input.read_u8()?;
                    dt.second = input.read_u8()?;
                }
                if len == 11 {
                    dt.micro_second = input.read_le_u32()?;
                }
            }
            n => return Err(Error::InvalidDateTimeLength(n)),
        }
        Ok(dt)
    }

    pub fn is_zero(&self) -> bool {
        self.year == 0
            && self.month == 0
            && self.day == 0
            && self.hour == 0
            && self.minute == 0
            && self.second == 0
            && self.micro_second == 0
    }

    /// the naive calendar datetime, None for zero or out-of-range dates
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)?
            .and_hms_micro_opt(
                self.hour as u32,
                self.minute as u32,
                self.second as u32,
                self.micro_second,
            )
    }

    /// the datetime in its decoded timezone, None for zero dates
    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        self.offset.from_local_datetime(&self.to_naive()?).single()
    }
}

impl fmt::Display for MyDateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )?;
        if self.micro_second > 0 {
            write!(f, ".{:06}", self.micro_second)?;
        }
        Ok(())
    }
}

/// format the payload of a binary TIME value as `[-]HH:MM:SS[.ffffff]`
///
/// only 8 and 12 byte payloads exist; the zero-length form is handled by
/// the caller
pub fn read_time_text(input: &mut Bytes, len: u64) -> Result<Bytes> {
    match len {
        8 | 12 => (),
        n => return Err(Error::InvalidTimeLength(n)),
    }
    let negative = input.read_u8()? == 1;
    let days = input.read_le_u32()?;
    let hours = input.read_u8()? as u32 + days * 24;
    let minutes = input.read_u8()?;
    let seconds = input.read_u8()?;
    let sign = if negative { "-" } else { "" };
    let text = if len == 12 {
        let micro = input.read_le_u32()?;
        format!(
            "{}{:02}:{:02}:{:02}.{:06}",
            sign, hours, minutes, seconds, micro
        )
    } else {
        format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds)
    };
    Ok(Bytes::from(text))
}
