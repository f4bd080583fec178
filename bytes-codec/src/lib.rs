//! byte-level codec of the MySQL wire format
//!
//! cursor style reads over bytes::Bytes, with async counterparts
//! for streaming sockets and files
pub mod error;
pub mod future;
pub mod my;

pub use error::*;

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// read an object from a byte cursor
pub trait ReadFromBytes: Sized {
    fn read_from(input: &mut Bytes) -> Result<Self>;
}

/// read an object from a byte cursor with additional context
pub trait ReadFromBytesWithContext<'c>: Sized {
    type Context: 'c;

    fn read_with_ctx(input: &mut Bytes, ctx: Self::Context) -> Result<Self>;
}

/// write an object to a byte buffer, returning number of bytes written
pub trait WriteToBytes {
    fn write_to(self, out: &mut BytesMut) -> Result<usize>;
}

macro_rules! check_remaining {
    ($input:expr, $n:expr) => {
        if $input.remaining() < $n {
            return Err(Error::InputIncomplete(
                Bytes::new(),
                Needed::Size($n - $input.remaining()),
            ));
        }
    };
}

/// number and slice reads over a Bytes cursor
pub trait ReadBytesExt {
    fn read_u8(&mut self) -> Result<u8>;

    fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    fn read_le_u16(&mut self) -> Result<u16>;

    fn read_le_i16(&mut self) -> Result<i16> {
        Ok(self.read_le_u16()? as i16)
    }

    fn read_le_u24(&mut self) -> Result<u32>;

    fn read_le_u32(&mut self) -> Result<u32>;

    fn read_le_i32(&mut self) -> Result<i32> {
        Ok(self.read_le_u32()? as i32)
    }

    /// 6-byte little endian integer, used by table ids
    fn read_le_u48(&mut self) -> Result<u64>;

    fn read_le_u64(&mut self) -> Result<u64>;

    fn read_le_i64(&mut self) -> Result<i64> {
        Ok(self.read_le_u64()? as i64)
    }

    fn read_le_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_le_u32()?))
    }

    fn read_le_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_le_u64()?))
    }

    /// take n bytes out of the cursor
    fn read_len(&mut self, n: usize) -> Result<Bytes>;

    /// take bytes until the given delimiter
    fn read_until(&mut self, b: u8, inclusive: bool) -> Result<Bytes>;
}

impl ReadBytesExt for Bytes {
    fn read_u8(&mut self) -> Result<u8> {
        check_remaining!(self, 1);
        Ok(self.get_u8())
    }

    fn read_le_u16(&mut self) -> Result<u16> {
        check_remaining!(self, 2);
        Ok(self.get_u16_le())
    }

    fn read_le_u24(&mut self) -> Result<u32> {
        check_remaining!(self, 3);
        let mut r = self.get_u8() as u32;
        r += (self.get_u8() as u32) << 8;
        r += (self.get_u8() as u32) << 16;
        Ok(r)
    }

    fn read_le_u32(&mut self) -> Result<u32> {
        check_remaining!(self, 4);
        Ok(self.get_u32_le())
    }

    fn read_le_u48(&mut self) -> Result<u64> {
        check_remaining!(self, 6);
        let mut r = 0u64;
        for i in 0..6 {
            r += (self.get_u8() as u64) << (i * 8);
        }
        Ok(r)
    }

    fn read_le_u64(&mut self) -> Result<u64> {
        check_remaining!(self, 8);
        Ok(self.get_u64_le())
    }

    fn read_len(&mut self, n: usize) -> Result<Bytes> {
        check_remaining!(self, n);
        Ok(self.split_to(n))
    }

    fn read_until(&mut self, b: u8, inclusive: bool) -> Result<Bytes> {
        match self.as_ref().iter().position(|&c| c == b) {
            Some(idx) if inclusive => Ok(self.split_to(idx + 1)),
            Some(idx) => {
                let out = self.split_to(idx);
                // skip the delimiter itself
                self.get_u8();
                Ok(out)
            }
            None => Err(Error::InputIncomplete(
                self.split_to(self.remaining()),
                Needed::Unknown,
            )),
        }
    }
}

/// number and slice writes over a BytesMut buffer
pub trait WriteBytesExt {
    fn write_u8(&mut self, n: u8) -> Result<usize>;

    fn write_le_u16(&mut self, n: u16) -> Result<usize>;

    fn write_le_u24(&mut self, n: u32) -> Result<usize>;

    fn write_le_u32(&mut self, n: u32) -> Result<usize>;

    fn write_le_u48(&mut self, n: u64) -> Result<usize>;

    fn write_le_u64(&mut self, n: u64) -> Result<usize>;

    fn write_le_f32(&mut self, n: f32) -> Result<usize> {
        self.write_le_u32(n.to_bits())
    }

    fn write_le_f64(&mut self, n: f64) -> Result<usize> {
        self.write_le_u64(n.to_bits())
    }

    fn write_bytes(&mut self, bs: &[u8]) -> Result<usize>;
}

impl WriteBytesExt for BytesMut {
    fn write_u8(&mut self, n: u8) -> Result<usize> {
        self.put_u8(n);
        Ok(1)
    }

    fn write_le_u16(&mut self, n: u16) -> Result<usize> {
        self.put_u16_le(n);
        Ok(2)
    }

    fn write_le_u24(&mut self, n: u32) -> Result<usize> {
        debug_assert!(n <= 0xff_ffff);
        self.put(&n.to_le_bytes()[..3]);
        Ok(3)
    }

    fn write_le_u32(&mut self, n: u32) -> Result<usize> {
        self.put_u32_le(n);
        Ok(4)
    }

    fn write_le_u48(&mut self, n: u64) -> Result<usize> {
        debug_assert!(n <= 0xffff_ffff_ffff);
        self.put(&n.to_le_bytes()[..6]);
        Ok(6)
    }

    fn write_le_u64(&mut self, n: u64) -> Result<usize> {
        self.put_u64_le(n);
        Ok(8)
    }

    fn write_bytes(&mut self, bs: &[u8]) -> Result<usize> {
        self.put(bs);
        Ok(bs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u8() {
        let mut bs = Bytes::from_static(&[1]);
        assert_eq!(1, bs.read_u8().unwrap());
        assert!(bs.read_u8().is_err());
    }

    #[test]
    fn test_read_le_u16() {
        let mut bs = Bytes::from_static(&[1, 2, 3]);
        assert_eq!(1 + (2u16 << 8), bs.read_le_u16().unwrap());
        assert!(bs.read_le_u16().is_err());
    }

    #[test]
    fn test_read_le_u24() {
        let mut bs = Bytes::from_static(&[1, 2, 3, 4]);
        assert_eq!(1 + (2u32 << 8) + (3u32 << 16), bs.read_le_u24().unwrap());
        assert!(bs.read_le_u24().is_err());
    }

    #[test]
    fn test_read_le_u32() {
        let mut bs = Bytes::from_static(&[1, 2, 3, 4, 5]);
        assert_eq!(
            1 + (2u32 << 8) + (3u32 << 16) + (4u32 << 24),
            bs.read_le_u32().unwrap()
        );
        assert!(bs.read_le_u32().is_err());
    }

    #[test]
    fn test_read_le_u48() {
        let mut bs = Bytes::from_static(&[1, 2, 3, 4, 1, 2, 9]);
        assert_eq!(
            1 + (2u64 << 8) + (3u64 << 16) + (4u64 << 24) + (1u64 << 32) + (2u64 << 40),
            bs.read_le_u48().unwrap()
        );
        assert!(bs.read_le_u48().is_err());
    }

    #[test]
    fn test_read_le_u64() {
        let mut bs = Bytes::from_static(&[1, 2, 3, 4, 1, 2, 3, 4]);
        assert_eq!(
            1 + (2u64 << 8)
                + (3u64 << 16)
                + (4u64 << 24)
                + (1u64 << 32)
                + (2u64 << 40)
                + (3u64 << 48)
                + (4u64 << 56),
            bs.read_le_u64().unwrap()
        );
    }

    #[test]
    fn test_read_len() {
        let mut bs = Bytes::from_static(&[1, 2, 3, 4, 5]);
        assert_eq!(&[1u8, 2, 3][..], bs.read_len(3).unwrap().as_ref());
        assert!(bs.read_len(3).is_err());
    }

    #[test]
    fn test_read_until() {
        let mut bs = Bytes::from_static(b"abc\0def");
        let head = bs.read_until(0, false).unwrap();
        assert_eq!(b"abc", head.as_ref());
        assert_eq!(b"def", bs.as_ref());
    }

    #[test]
    fn test_write_numbers() {
        let mut out = BytesMut::new();
        out.write_u8(0x01).unwrap();
        out.write_le_u16(0xf102).unwrap();
        out.write_le_u24(0x20a133).unwrap();
        out.write_le_u32(0x1324ffb0).unwrap();
        assert_eq!(
            &[0x01, 0x02, 0xf1, 0x33, 0xa1, 0x20, 0xb0, 0xff, 0x24, 0x13][..],
            out.as_ref()
        );
    }

    #[test]
    fn test_write_le_u48() {
        let mut out = BytesMut::new();
        out.write_le_u48(0x0102_0304_0506).unwrap();
        assert_eq!(&[0x06, 0x05, 0x04, 0x03, 0x02, 0x01][..], out.as_ref());
    }
}
