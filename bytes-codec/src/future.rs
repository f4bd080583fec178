//! async counterparts of the number reads and writes
use crate::error::{Error, Needed, Result};
use bytes::{Bytes, BytesMut};
use futures::io::{AsyncRead, AsyncWrite};
use futures::ready;
use std::future::Future;
use std::io::ErrorKind;
use std::pin::Pin;
use std::task::{Context, Poll};

macro_rules! read_number_future {
    ($name:ident, $ty:ty, $len:expr, $conv:expr) => {
        #[must_use = "futures do nothing unless you `.await` or poll them"]
        pub struct $name<'a, R: Unpin + ?Sized> {
            reader: &'a mut R,
            buf: [u8; $len],
            filled: usize,
        }

        impl<R: AsyncRead + Unpin + ?Sized> Future for $name<'_, R> {
            type Output = Result<$ty>;

            fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
                let Self { reader, buf, filled } = &mut *self;
                let mut reader = Pin::new(reader);
                while *filled < $len {
                    match ready!(reader.as_mut().poll_read(cx, &mut buf[*filled..])) {
                        Ok(0) => {
                            return Poll::Ready(Err(Error::InputIncomplete(
                                Bytes::new(),
                                Needed::Size($len - *filled),
                            )))
                        }
                        Ok(n) => *filled += n,
                        Err(ref e) if e.kind() == ErrorKind::Interrupted => (),
                        Err(e) => return Poll::Ready(Err(Error::from(e))),
                    }
                }
                Poll::Ready(Ok($conv(&buf[..])))
            }
        }
    };
}

macro_rules! write_number_future {
    ($name:ident, $len:expr) => {
        #[must_use = "futures do nothing unless you `.await` or poll them"]
        pub struct $name<'a, W: Unpin + ?Sized> {
            writer: &'a mut W,
            buf: [u8; $len],
            written: usize,
        }

        impl<W: AsyncWrite + Unpin + ?Sized> Future for $name<'_, W> {
            type Output = Result<usize>;

            fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
                let Self {
                    writer,
                    buf,
                    written,
                } = &mut *self;
                let mut writer = Pin::new(writer);
                while *written < $len {
                    match ready!(writer.as_mut().poll_write(cx, &buf[*written..])) {
                        Ok(0) => return Poll::Ready(Err(Error::OutputUnavailable)),
                        Ok(n) => *written += n,
                        Err(ref e) if e.kind() == ErrorKind::Interrupted => (),
                        Err(e) => return Poll::Ready(Err(Error::from(e))),
                    }
                }
                Poll::Ready(Ok($len))
            }
        }
    };
}

pub trait AsyncReadBytesExt: AsyncRead {
    fn read_u8(&mut self) -> ReadU8Future<Self>
    where
        Self: Unpin,
    {
        ReadU8Future {
            reader: self,
            buf: [0; 1],
            filled: 0,
        }
    }

    fn read_le_u16(&mut self) -> ReadLeU16Future<Self>
    where
        Self: Unpin,
    {
        ReadLeU16Future {
            reader: self,
            buf: [0; 2],
            filled: 0,
        }
    }

    fn read_le_u24(&mut self) -> ReadLeU24Future<Self>
    where
        Self: Unpin,
    {
        ReadLeU24Future {
            reader: self,
            buf: [0; 3],
            filled: 0,
        }
    }

    fn read_le_u32(&mut self) -> ReadLeU32Future<Self>
    where
        Self: Unpin,
    {
        ReadLeU32Future {
            reader: self,
            buf: [0; 4],
            filled: 0,
        }
    }

    fn read_len(&mut self, n: usize) -> ReadLenFuture<Self>
    where
        Self: Unpin,
    {
        ReadLenFuture { reader: self, n }
    }

    fn read_len_out<'a, 'b>(
        &'a mut self,
        n: usize,
        out: &'b mut BytesMut,
    ) -> ReadLenOutFuture<'a, 'b, Self>
    where
        Self: Unpin,
    {
        ReadLenOutFuture {
            reader: self,
            n,
            out,
        }
    }
}

impl<R: AsyncRead + ?Sized> AsyncReadBytesExt for R {}

read_number_future!(ReadU8Future, u8, 1, |bs: &[u8]| bs[0]);

read_number_future!(ReadLeU16Future, u16, 2, to_le_u16);

#[inline]
fn to_le_u16(bs: &[u8]) -> u16 {
    debug_assert_eq!(2, bs.len());
    bs[0] as u16 + ((bs[1] as u16) << 8)
}

read_number_future!(ReadLeU24Future, u32, 3, to_le_u24);

#[inline]
fn to_le_u24(bs: &[u8]) -> u32 {
    debug_assert_eq!(3, bs.len());
    bs[0] as u32 + ((bs[1] as u32) << 8) + ((bs[2] as u32) << 16)
}

read_number_future!(ReadLeU32Future, u32, 4, to_le_u32);

#[inline]
fn to_le_u32(bs: &[u8]) -> u32 {
    debug_assert_eq!(4, bs.len());
    bs[0] as u32 + ((bs[1] as u32) << 8) + ((bs[2] as u32) << 16) + ((bs[3] as u32) << 24)
}

#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct ReadLenOutFuture<'a, 'b, T: Unpin + ?Sized> {
    reader: &'a mut T,
    n: usize,
    out: &'b mut BytesMut,
}

impl<R: AsyncRead + Unpin + ?Sized> Future for ReadLenOutFuture<'_, '_, R> {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Self { reader, n, out } = &mut *self;
        if *n == 0 {
            return Poll::Ready(Ok(()));
        }
        read_len_out_internal(reader, cx, *n, out)
    }
}

fn read_len_out_internal<R: AsyncRead + Unpin + ?Sized>(
    reader: &mut R,
    cx: &mut Context<'_>,
    required: usize,
    out: &mut BytesMut,
) -> Poll<Result<()>> {
    // on error roll the buffer back to its original length
    struct Guard<'b> {
        out: &'b mut BytesMut,
        len: usize,
    }
    impl Drop for Guard<'_> {
        fn drop(&mut self) {
            self.out.resize(self.len, 0);
        }
    }
    let len = out.len();
    let mut g = Guard { out, len };
    let mut read = 0;
    g.out.resize(g.len + required, 0);
    let mut reader = Pin::new(reader);
    loop {
        match ready!(reader.as_mut().poll_read(cx, &mut g.out[g.len..])) {
            Ok(0) => {
                return Poll::Ready(Err(Error::InputIncomplete(
                    Bytes::new(),
                    Needed::Size(required - read),
                )))
            }
            Ok(n) if read + n == required => {
                g.len += n;
                return Poll::Ready(Ok(()));
            }
            Ok(n) => {
                read += n;
                g.len += n;
            }
            Err(ref e) if e.kind() == ErrorKind::Interrupted => (),
            Err(e) => return Poll::Ready(Err(Error::from(e))),
        }
    }
}

#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct ReadLenFuture<'a, T: Unpin + ?Sized> {
    reader: &'a mut T,
    n: usize,
}

impl<R: AsyncRead + Unpin + ?Sized> Future for ReadLenFuture<'_, R> {
    type Output = Result<Bytes>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Self { reader, n } = &mut *self;
        if *n == 0 {
            return Poll::Ready(Ok(Bytes::new()));
        }
        let mut out = BytesMut::new();
        match ready!(read_len_out_internal(reader, cx, *n, &mut out)) {
            Ok(..) => Poll::Ready(Ok(out.freeze())),
            Err(e) => Poll::Ready(Err(e)),
        }
    }
}

pub trait AsyncWriteBytesExt: AsyncWrite {
    fn write_u8(&mut self, n: u8) -> WriteU8Future<Self>
    where
        Self: Unpin,
    {
        WriteU8Future {
            writer: self,
            buf: n.to_le_bytes(),
            written: 0,
        }
    }

    fn write_le_u16(&mut self, n: u16) -> WriteLeU16Future<Self>
    where
        Self: Unpin,
    {
        WriteLeU16Future {
            writer: self,
            buf: n.to_le_bytes(),
            written: 0,
        }
    }

    fn write_le_u24(&mut self, n: u32) -> WriteLeU24Future<Self>
    where
        Self: Unpin,
    {
        WriteLeU24Future {
            writer: self,
            buf: u24_to_le_bytes(n),
            written: 0,
        }
    }

    fn write_le_u32(&mut self, n: u32) -> WriteLeU32Future<Self>
    where
        Self: Unpin,
    {
        WriteLeU32Future {
            writer: self,
            buf: n.to_le_bytes(),
            written: 0,
        }
    }
}

impl<W: AsyncWrite + ?Sized> AsyncWriteBytesExt for W {}

write_number_future!(WriteU8Future, 1);

write_number_future!(WriteLeU16Future, 2);

write_number_future!(WriteLeU24Future, 3);

fn u24_to_le_bytes(n: u32) -> [u8; 3] {
    debug_assert!(n <= 0xff_ffff);
    [
        (n & 0xff) as u8,
        ((n >> 8) & 0xff) as u8,
        ((n >> 16) & 0xff) as u8,
    ]
}

write_number_future!(WriteLeU32Future, 4);

#[cfg(test)]
mod tests {
    use super::*;

    #[smol_potat::test]
    async fn test_read_u8() {
        let bs = [1u8, 2, 3];
        let mut reader = &bs[..];
        for i in 1u8..=3 {
            assert_eq!(i, reader.read_u8().await.unwrap());
        }
        assert!(reader.read_u8().await.is_err());
    }

    #[smol_potat::test]
    async fn test_read_le_u16() {
        let bs = [1u8, 1];
        let mut reader = &bs[..];
        assert_eq!(256 + 1, reader.read_le_u16().await.unwrap());
    }

    #[smol_potat::test]
    async fn test_read_le_u24() {
        let bs = [1u8, 1, 1, 0];
        let mut reader = &bs[..];
        assert_eq!(65536 + 256 + 1, reader.read_le_u24().await.unwrap());
    }

    #[smol_potat::test]
    async fn test_read_le_u32() {
        let bs = [1u8, 1, 0, 1];
        let mut reader = &bs[..];
        assert_eq!((1 << 24) + 256 + 1, reader.read_le_u32().await.unwrap());
    }

    #[smol_potat::test]
    async fn test_read_incomplete() {
        let bs = [1u8, 1];
        let mut reader = &bs[..];
        assert!(reader.read_le_u32().await.is_err());
    }

    #[smol_potat::test]
    async fn test_read_len_out() {
        let bs = [1u8, 2, 3, 4, 5];
        let mut reader = &bs[..];
        let mut out = BytesMut::new();
        reader.read_len_out(3, &mut out).await.unwrap();
        assert_eq!(&[1u8, 2, 3][..], out.as_ref());
        let rst = reader.read_len_out(3, &mut out).await;
        assert!(rst.is_err());
        // failed read must not leave partial bytes behind
        assert_eq!(3, out.len());
    }

    #[smol_potat::test]
    async fn test_read_len() {
        let bs = [1u8, 2, 3, 4, 5];
        let mut reader = &bs[..];
        let out = reader.read_len(2).await.unwrap();
        assert_eq!(&[1u8, 2][..], out.as_ref());
        let empty = reader.read_len(0).await.unwrap();
        assert!(empty.is_empty());
    }

    #[smol_potat::test]
    async fn test_write_numbers() {
        let mut bs = Vec::new();
        let writer = &mut bs;
        writer.write_u8(0x01).await.unwrap();
        writer.write_le_u16(0xf102).await.unwrap();
        writer.write_le_u24(0x20a133).await.unwrap();
        writer.write_le_u32(0x1324ffb0).await.unwrap();
        assert_eq!(
            vec![0x01, 0x02, 0xf1, 0x33, 0xa1, 0x20, 0xb0, 0xff, 0x24, 0x13],
            bs
        );
    }
}
