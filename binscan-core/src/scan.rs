//! coercion of decoded row values into caller destinations
//!
//! the binlog does not record column signedness, so integer values reach
//! this layer unsigned; the destination type decides how to reinterpret
//! them (MySQL Bug #71687): a signed destination sign-extends from the
//! source width, an unsigned destination zero-extends
use crate::col::BinlogValue;
use crate::error::{Error, Result};
use crate::time::MyDateTime;
use bytes::Bytes;

/// a single caller destination
pub trait FromValue: Sized {
    fn from_value(value: &BinlogValue) -> Result<Self>;
}

/// a full destination row, implemented for tuples of `FromValue` types
pub trait FromRow: Sized {
    /// number of destinations, checked against the row's column count
    const WIDTH: usize;

    fn from_row(row: &[BinlogValue]) -> Result<Self>;
}

impl BinlogValue {
    /// integer value zero-extended to 64 bits
    fn to_unsigned(&self) -> Option<u64> {
        match self {
            BinlogValue::Tiny(v) => Some(*v as u64),
            BinlogValue::Short(v) => Some(*v as u64),
            BinlogValue::Long(v) => Some(*v as u64),
            BinlogValue::LongLong(v) => Some(*v),
            _ => None,
        }
    }

    /// integer value sign-extended from its source width
    fn to_signed(&self) -> Option<i64> {
        match self {
            BinlogValue::Tiny(v) => Some(*v as i8 as i64),
            BinlogValue::Short(v) => Some(*v as i16 as i64),
            BinlogValue::Long(v) => Some(*v as i32 as i64),
            BinlogValue::LongLong(v) => Some(*v as i64),
            _ => None,
        }
    }
}

macro_rules! from_value_unsigned {
    ($($ty:ty),+) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &BinlogValue) -> Result<Self> {
                    match value {
                        BinlogValue::Null => Err(Error::NullValueError),
                        BinlogValue::Bytes(bs) => {
                            Ok(std::str::from_utf8(bs.as_ref())?.parse::<$ty>()?)
                        }
                        v => v
                            .to_unsigned()
                            .map(|n| n as $ty)
                            .ok_or_else(|| Error::unsupported_conversion(stringify!($ty), v)),
                    }
                }
            }
        )+
    };
}

macro_rules! from_value_signed {
    ($($ty:ty),+) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &BinlogValue) -> Result<Self> {
                    match value {
                        BinlogValue::Null => Err(Error::NullValueError),
                        BinlogValue::Bytes(bs) => {
                            Ok(std::str::from_utf8(bs.as_ref())?.parse::<$ty>()?)
                        }
                        v => v
                            .to_signed()
                            .map(|n| n as $ty)
                            .ok_or_else(|| Error::unsupported_conversion(stringify!($ty), v)),
                    }
                }
            }
        )+
    };
}

from_value_unsigned!(u8, u16, u32, u64, usize);
from_value_signed!(i8, i16, i32, i64, isize);

impl FromValue for f32 {
    fn from_value(value: &BinlogValue) -> Result<Self> {
        match value {
            BinlogValue::Null => Err(Error::NullValueError),
            BinlogValue::Float(v) => Ok(*v),
            BinlogValue::Double(v) => Ok(*v as f32),
            BinlogValue::Bytes(bs) => Ok(std::str::from_utf8(bs.as_ref())?.parse::<f32>()?),
            v => match v.to_signed() {
                Some(n) => Ok(n as f32),
                None => Err(Error::unsupported_conversion("f32", v)),
            },
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &BinlogValue) -> Result<Self> {
        match value {
            BinlogValue::Null => Err(Error::NullValueError),
            BinlogValue::Float(v) => Ok(*v as f64),
            BinlogValue::Double(v) => Ok(*v),
            BinlogValue::Bytes(bs) => Ok(std::str::from_utf8(bs.as_ref())?.parse::<f64>()?),
            v => match v.to_signed() {
                Some(n) => Ok(n as f64),
                None => Err(Error::unsupported_conversion("f64", v)),
            },
        }
    }
}

impl FromValue for String {
    fn from_value(value: &BinlogValue) -> Result<Self> {
        match value {
            BinlogValue::Null => Err(Error::NullValueError),
            BinlogValue::Bytes(bs) => Ok(String::from_utf8(Vec::from(bs.as_ref()))?),
            BinlogValue::Float(v) => Ok(format!("{:e}", v)),
            BinlogValue::Double(v) => Ok(format!("{:e}", v)),
            BinlogValue::DateTime(dt) => Ok(dt.to_string()),
            v => match v.to_signed() {
                Some(n) => Ok(n.to_string()),
                None => Err(Error::unsupported_conversion("String", v)),
            },
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &BinlogValue) -> Result<Self> {
        match value {
            BinlogValue::Bytes(bs) => Ok(Vec::from(bs.as_ref())),
            v => Ok(String::from_value(v)?.into_bytes()),
        }
    }
}

impl FromValue for Bytes {
    fn from_value(value: &BinlogValue) -> Result<Self> {
        match value {
            BinlogValue::Bytes(bs) => Ok(bs.clone()),
            v => Ok(Bytes::from(String::from_value(v)?)),
        }
    }
}

impl FromValue for MyDateTime {
    fn from_value(value: &BinlogValue) -> Result<Self> {
        match value {
            BinlogValue::Null => Err(Error::NullValueError),
            BinlogValue::DateTime(dt) => Ok(dt.clone()),
            v => Err(Error::unsupported_conversion("MyDateTime", v)),
        }
    }
}

/// opaque destination, keeps the decoded variant as-is
impl FromValue for BinlogValue {
    fn from_value(value: &BinlogValue) -> Result<Self> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &BinlogValue) -> Result<Self> {
        match value {
            BinlogValue::Null => Ok(None),
            v => Ok(Some(T::from_value(v)?)),
        }
    }
}

macro_rules! impl_from_row {
    ($width:expr; $($T:ident : $idx:tt),+) => {
        impl<$($T: FromValue),+> FromRow for ($($T,)+) {
            const WIDTH: usize = $width;

            fn from_row(row: &[BinlogValue]) -> Result<Self> {
                Ok(($($T::from_value(&row[$idx])?,)+))
            }
        }
    };
}

impl_from_row!(1; A:0);
impl_from_row!(2; A:0, B:1);
impl_from_row!(3; A:0, B:1, C:2);
impl_from_row!(4; A:0, B:1, C:2, D:3);
impl_from_row!(5; A:0, B:1, C:2, D:3, E:4);
impl_from_row!(6; A:0, B:1, C:2, D:3, E:4, F:5);
impl_from_row!(7; A:0, B:1, C:2, D:3, E:4, F:5, G:6);
impl_from_row!(8; A:0, B:1, C:2, D:3, E:4, F:5, G:6, H:7);
impl_from_row!(9; A:0, B:1, C:2, D:3, E:4, F:5, G:6, H:7, I:8);
impl_from_row!(10; A:0, B:1, C:2, D:3, E:4, F:5, G:6, H:7, I:8, J:9);
impl_from_row!(11; A:0, B:1, C:2, D:3, E:4, F:5, G:6, H:7, I:8, J:9, K:10);
impl_from_row!(12; A:0, B:1, C:2, D:3, E:4, F:5, G:6, H:7, I:8, J:9, K:10, L:11);
