use crate::error::{Error, Result};
use bytes::Bytes;

/// byte offset of the post-header-size table within a
/// FORMAT_DESCRIPTION_EVENT buffer: 19 header + 2 binlog version +
/// 50 server version + 4 create timestamp
const SIZES_OFFSET: usize = 75;

/// per-event-type post-header sizes declared by FORMAT_DESCRIPTION_EVENT
///
/// index 0 is the common-header size; index `type_code` is the
/// post-header size of that event type. Established by the first format
/// description event seen and replaced by any later one.
#[derive(Debug, Clone, Default)]
pub struct PostHeaderSizes(Bytes);

impl PostHeaderSizes {
    /// slice the size table out of a full FORMAT_DESCRIPTION_EVENT buffer
    pub fn from_event(event: &Bytes) -> Result<Self> {
        if event.len() <= SIZES_OFFSET {
            return Err(Error::BinlogEventError(format!(
                "format description event too short: {}",
                event.len()
            )));
        }
        Ok(PostHeaderSizes(event.slice(SIZES_OFFSET..)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// size of the common event header
    pub fn common(&self) -> Result<usize> {
        if self.0.is_empty() {
            return Err(Error::BinlogEventError(
                "no format description event seen".to_owned(),
            ));
        }
        Ok(self.0[0] as usize)
    }

    /// post-header size for the given event type code
    pub fn post(&self, type_code: u8) -> Result<usize> {
        let idx = type_code as usize;
        if idx >= self.0.len() {
            return Err(Error::BinlogEventError(format!(
                "no post header size for event type {}",
                type_code
            )));
        }
        Ok(self.0[idx] as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_event() {
        let mut event = vec![0u8; SIZES_OFFSET];
        // common header size, then the 5.7 sizes for type codes 1..=32
        event.push(19);
        event.extend_from_slice(&[
            56, 13, 0, 8, 0, 18, 0, 4, 4, 4, 4, 18, 0, 0, 95, 0, 4, 26, 8, 0, 0, 0, 8, 8, 8, 2, 0,
            0, 0, 10, 10, 10,
        ]);
        let sizes = PostHeaderSizes::from_event(&Bytes::from(event)).unwrap();
        assert_eq!(19, sizes.common().unwrap());
        assert_eq!(8, sizes.post(19).unwrap());
        assert_eq!(10, sizes.post(30).unwrap());
        assert!(sizes.post(200).is_err());
    }

    #[test]
    fn test_from_event_too_short() {
        let event = Bytes::from(vec![0u8; 40]);
        assert!(PostHeaderSizes::from_event(&event).is_err());
    }

    #[test]
    fn test_empty() {
        let sizes = PostHeaderSizes::default();
        assert!(sizes.is_empty());
        assert!(sizes.common().is_err());
    }
}
