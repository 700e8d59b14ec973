use bytes::{Buf, BufMut, Bytes, BytesMut};
use prost::encoding::{decode_varint, encode_varint, encoded_len_varint};

use crate::errors::{Errors, Result};
use crate::medium::ERASED_BYTE;

/// Maximum key length in bytes. Keys are UTF-8 strings.
pub const MAX_KEY_SIZE: usize = 256;

const CRC_SIZE: usize = 4;

/// Tag byte of a serialized record. `0xff` (the erased-fill byte) is reserved
/// so the scanner can always distinguish an erased tail from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
  Entry = 1,
  Tombstone = 2,
}

impl RecordType {
  fn from_tag(tag: u8) -> Option<RecordType> {
    match tag {
      1 => Some(RecordType::Entry),
      2 => Some(RecordType::Tombstone),
      _ => None,
    }
  }
}

/// One logical operation in a page log: an upsert or a deletion marker.
///
/// Serialized layout:
/// ```text
/// +-----+---------------+-----+-----------------+-------+------------+
/// | tag | key len (var) | key | value len (var) | value | crc32 (LE) |
/// +-----+---------------+-----+-----------------+-------+------------+
/// ```
/// The checksum covers every preceding byte of the record. Tombstones carry a
/// zero value length and no value bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
  pub key: String,
  pub value: Bytes,
  pub rec_type: RecordType,
}

/// Outcome of decoding the head of a log slice.
#[derive(Debug, PartialEq)]
pub enum Decoded {
  Record { record: Record, size: usize },

  /// The slice starts with the erased-fill byte (or is exhausted): no more
  /// records on this page.
  EndOfLog,

  /// The head of the slice is not a valid record. On load this marks the end
  /// of trustworthy data, not a hard failure.
  Corrupt,
}

impl Record {
  pub fn entry(key: String, value: Bytes) -> Record {
    Record {
      key,
      value,
      rec_type: RecordType::Entry,
    }
  }

  pub fn tombstone(key: String) -> Record {
    Record {
      key,
      value: Bytes::new(),
      rec_type: RecordType::Tombstone,
    }
  }

  pub fn encoded_len(&self) -> usize {
    1
      + encoded_len_varint(self.key.len() as u64)
      + self.key.len()
      + encoded_len_varint(self.value.len() as u64)
      + self.value.len()
      + CRC_SIZE
  }

  /// Serializes the record. `available` is the space the caller still has in
  /// the page log; an encoding that would not fit is rejected up front.
  pub fn encode(&self, available: usize) -> Result<Vec<u8>> {
    if self.key.is_empty() {
      return Err(Errors::KeyIsEmpty);
    }
    if self.key.len() > MAX_KEY_SIZE {
      return Err(Errors::KeyTooLarge);
    }
    let size = self.encoded_len();
    if size > available {
      return Err(Errors::PageFull);
    }

    let mut buf = BytesMut::with_capacity(size);
    buf.put_u8(self.rec_type as u8);
    encode_varint(self.key.len() as u64, &mut buf);
    buf.put_slice(self.key.as_bytes());
    encode_varint(self.value.len() as u64, &mut buf);
    buf.put_slice(&self.value);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&buf);
    buf.put_u32_le(hasher.finalize());

    Ok(buf.to_vec())
  }

  /// Decodes the record at the head of `buf`. Never reads past the end of the
  /// slice, so the caller can hand in the rest of a page and rely on the page
  /// boundary being respected.
  pub fn decode(buf: &[u8]) -> Decoded {
    let tag = match buf.first() {
      Some(&tag) => tag,
      None => return Decoded::EndOfLog,
    };
    if tag == ERASED_BYTE {
      return Decoded::EndOfLog;
    }
    let rec_type = match RecordType::from_tag(tag) {
      Some(rec_type) => rec_type,
      None => return Decoded::Corrupt,
    };

    let mut cur = &buf[1..];
    let key_len = match decode_varint(&mut cur) {
      Ok(n) => n as usize,
      Err(_) => return Decoded::Corrupt,
    };
    if key_len == 0 || key_len > MAX_KEY_SIZE || key_len > cur.len() {
      return Decoded::Corrupt;
    }
    let key = match std::str::from_utf8(&cur[..key_len]) {
      Ok(key) => key.to_string(),
      Err(_) => return Decoded::Corrupt,
    };
    cur = &cur[key_len..];

    let value_len = match decode_varint(&mut cur) {
      Ok(n) => n as usize,
      Err(_) => return Decoded::Corrupt,
    };
    if rec_type == RecordType::Tombstone && value_len != 0 {
      return Decoded::Corrupt;
    }
    if value_len > cur.len() {
      return Decoded::Corrupt;
    }
    let value = Bytes::copy_from_slice(&cur[..value_len]);
    cur = &cur[value_len..];

    if cur.len() < CRC_SIZE {
      return Decoded::Corrupt;
    }
    let mut crc_bytes = &cur[..CRC_SIZE];
    let stored_crc = crc_bytes.get_u32_le();
    let size = buf.len() - cur.len() + CRC_SIZE;

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&buf[..size - CRC_SIZE]);
    if hasher.finalize() != stored_crc {
      return Decoded::Corrupt;
    }

    Decoded::Record {
      record: Record {
        key,
        value,
        rec_type,
      },
      size,
    }
  }
}

/// Length of the prefix of `log` that decodes as valid records. Used to pick
/// between two pages that both claim to be active after an interrupted swap.
pub fn valid_prefix_len(log: &[u8]) -> usize {
  let mut offset = 0;
  loop {
    match Record::decode(&log[offset..]) {
      Decoded::Record { size, .. } => offset += size,
      _ => return offset,
    }
  }
}
