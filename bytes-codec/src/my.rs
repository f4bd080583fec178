//! MySQL specific encodings
//!
//! length encoded integers and strings, used by both the text protocol
//! and the binary row format
use crate::error::{Error, Needed, Result};
use crate::{ReadBytesExt, ReadFromBytes, WriteBytesExt, WriteToBytes};
use bytes::{Buf, Bytes, BytesMut};

/// read MySQL encoded types from a byte cursor
pub trait ReadMyEnc {
    fn read_len_enc_int(&mut self) -> Result<LenEncInt>;

    fn read_len_enc_str(&mut self) -> Result<LenEncStr>;
}

impl ReadMyEnc for Bytes {
    fn read_len_enc_int(&mut self) -> Result<LenEncInt> {
        let len = self.read_u8()?;
        match len {
            0xfb => Ok(LenEncInt::Null),
            0xfc => {
                let n = self.read_le_u16()?;
                Ok(LenEncInt::Len3(n))
            }
            0xfd => {
                let n = self.read_le_u24()?;
                Ok(LenEncInt::Len4(n))
            }
            0xfe => {
                let n = self.read_le_u64()?;
                Ok(LenEncInt::Len9(n))
            }
            0xff => Ok(LenEncInt::Err),
            _ => Ok(LenEncInt::Len1(len)),
        }
    }

    fn read_len_enc_str(&mut self) -> Result<LenEncStr> {
        let lei = self.read_len_enc_int()?;
        match lei {
            LenEncInt::Err => Ok(LenEncStr::Err),
            LenEncInt::Null => Ok(LenEncStr::Null),
            _ => {
                // checked above: cannot be Null or Err
                let len = match lei.to_u64() {
                    Some(n) => n as usize,
                    None => return Ok(LenEncStr::Err),
                };
                if self.remaining() < len {
                    return Err(Error::InputIncomplete(
                        Bytes::new(),
                        Needed::Size(len - self.remaining()),
                    ));
                }
                Ok(LenEncStr::Bytes(self.split_to(len)))
            }
        }
    }
}

/// MySQL length encoded integer
#[derive(Debug, Clone, PartialEq)]
pub enum LenEncInt {
    Null,
    Err,
    Len1(u8),
    Len3(u16),
    Len4(u32),
    Len9(u64),
}

impl LenEncInt {
    pub fn to_u64(&self) -> Option<u64> {
        match self {
            LenEncInt::Len1(n) => Some(*n as u64),
            LenEncInt::Len3(n) => Some(*n as u64),
            LenEncInt::Len4(n) => Some(*n as u64),
            LenEncInt::Len9(n) => Some(*n),
            _ => None,
        }
    }

    pub fn to_u32(&self) -> Option<u32> {
        match self {
            LenEncInt::Len1(n) => Some(*n as u32),
            LenEncInt::Len3(n) => Some(*n as u32),
            LenEncInt::Len4(n) => Some(*n),
            LenEncInt::Len9(n) => Some(*n as u32),
            _ => None,
        }
    }
}

impl ReadFromBytes for LenEncInt {
    fn read_from(input: &mut Bytes) -> Result<Self> {
        input.read_len_enc_int()
    }
}

impl WriteToBytes for LenEncInt {
    fn write_to(self, out: &mut BytesMut) -> Result<usize> {
        let len = match self {
            LenEncInt::Null => out.write_u8(0xfb)?,
            LenEncInt::Err => out.write_u8(0xff)?,
            LenEncInt::Len1(n) => out.write_u8(n)?,
            LenEncInt::Len3(n) => {
                out.write_u8(0xfc)?;
                1 + out.write_le_u16(n)?
            }
            LenEncInt::Len4(n) => {
                out.write_u8(0xfd)?;
                1 + out.write_le_u24(n)?
            }
            LenEncInt::Len9(n) => {
                out.write_u8(0xfe)?;
                1 + out.write_le_u64(n)?
            }
        };
        Ok(len)
    }
}

impl From<u64> for LenEncInt {
    fn from(src: u64) -> Self {
        if src < 0xfb {
            LenEncInt::Len1(src as u8)
        } else if src <= 0xffff {
            LenEncInt::Len3(src as u16)
        } else if src <= 0xff_ffff {
            LenEncInt::Len4(src as u32)
        } else {
            LenEncInt::Len9(src)
        }
    }
}

impl From<u8> for LenEncInt {
    fn from(src: u8) -> Self {
        Self::from(src as u64)
    }
}

impl From<u16> for LenEncInt {
    fn from(src: u16) -> Self {
        Self::from(src as u64)
    }
}

impl From<u32> for LenEncInt {
    fn from(src: u32) -> Self {
        Self::from(src as u64)
    }
}

/// MySQL length encoded string
#[derive(Debug, Clone)]
pub enum LenEncStr {
    Null,
    Err,
    Bytes(Bytes),
}

impl LenEncStr {
    pub fn is_null(&self) -> bool {
        matches!(self, LenEncStr::Null)
    }

    pub fn bytes(&self) -> Option<&Bytes> {
        match self {
            LenEncStr::Bytes(bs) => Some(bs),
            _ => None,
        }
    }

    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            LenEncStr::Bytes(bs) => Some(bs),
            _ => None,
        }
    }

    /// convert into owned string, empty if null or err
    pub fn into_string(self) -> std::result::Result<String, std::string::FromUtf8Error> {
        match self {
            LenEncStr::Bytes(bs) => String::from_utf8(Vec::from(bs.as_ref())),
            _ => Ok(String::new()),
        }
    }
}

impl ReadFromBytes for LenEncStr {
    fn read_from(input: &mut Bytes) -> Result<Self> {
        input.read_len_enc_str()
    }
}

impl WriteToBytes for LenEncStr {
    fn write_to(self, out: &mut BytesMut) -> Result<usize> {
        let len = match self {
            LenEncStr::Null => out.write_u8(0xfb)?,
            LenEncStr::Err => out.write_u8(0xff)?,
            LenEncStr::Bytes(bs) => {
                let lei = LenEncInt::from(bs.len() as u64);
                let prefix_len = lei.write_to(out)?;
                prefix_len + out.write_bytes(bs.as_ref())?
            }
        };
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_enc_int_1() {
        let orig = vec![0x0a_u8];
        let mut bs = Bytes::copy_from_slice(&orig[..]);
        let lei = bs.read_len_enc_int().unwrap();
        assert_eq!(LenEncInt::Len1(0x0a), lei);
        let mut encoded = BytesMut::new();
        lei.write_to(&mut encoded).unwrap();
        assert_eq!(orig, encoded.as_ref());
    }

    #[test]
    fn test_len_enc_int_3() {
        let orig = vec![0xfc_u8, 0x1d, 0x05];
        let mut bs = Bytes::copy_from_slice(&orig[..]);
        let lei = bs.read_len_enc_int().unwrap();
        assert_eq!(LenEncInt::Len3(0x051d_u16), lei);
        let mut encoded = BytesMut::new();
        lei.write_to(&mut encoded).unwrap();
        assert_eq!(orig, encoded.as_ref());
    }

    #[test]
    fn test_len_enc_int_4() {
        let orig = vec![0xfd_u8, 0xc2, 0xb2, 0xa2];
        let mut bs = Bytes::copy_from_slice(&orig[..]);
        let lei = bs.read_len_enc_int().unwrap();
        assert_eq!(LenEncInt::Len4(0xa2b2c2_u32), lei);
        let mut encoded = BytesMut::new();
        lei.write_to(&mut encoded).unwrap();
        assert_eq!(orig, encoded.as_ref());
    }

    #[test]
    fn test_len_enc_int_9() {
        let orig = vec![0xfe, 0x0d, 0x0c, 0x0b, 0x0a, 0x04, 0x03, 0x02, 0x01];
        let mut bs = Bytes::copy_from_slice(&orig[..]);
        let lei = bs.read_len_enc_int().unwrap();
        assert_eq!(LenEncInt::Len9(0x010203040a0b0c0d_u64), lei);
        let mut encoded = BytesMut::new();
        lei.write_to(&mut encoded).unwrap();
        assert_eq!(orig, encoded.as_ref());
    }

    #[test]
    fn test_len_enc_int_null() {
        let mut bs = Bytes::from_static(b"\xfb");
        assert_eq!(LenEncInt::Null, bs.read_len_enc_int().unwrap());
    }

    #[test]
    fn test_len_enc_int_err() {
        let mut bs = Bytes::from_static(b"\xff");
        assert_eq!(LenEncInt::Err, bs.read_len_enc_int().unwrap());
    }

    #[test]
    fn test_len_enc_str() {
        let orig = b"\x05hello";
        let mut bs = Bytes::copy_from_slice(&orig[..]);
        let les = bs.read_len_enc_str().unwrap();
        assert_eq!(b"hello", les.bytes().unwrap().as_ref());
        let mut encoded = BytesMut::new();
        les.write_to(&mut encoded).unwrap();
        assert_eq!(orig, encoded.as_ref());
    }

    #[test]
    fn test_len_enc_str_null() {
        let mut bs = Bytes::from_static(b"\xfb");
        assert!(bs.read_len_enc_str().unwrap().is_null());
    }

    #[test]
    fn test_len_enc_str_incomplete() {
        let mut bs = Bytes::from_static(b"\x05hell");
        assert!(bs.read_len_enc_str().is_err());
    }
}
