use crate::data_structure::ziplist::error::ZipListError;
use crate::data_structure::ziplist::ziplist::{ZipList, ZipValue};
use crate::data_structure::ziplist::*;
use std::fmt::Write as _;

pub fn decode_prev_len_size(ptr: &[u8]) -> usize {
    if ptr[0] < ZIP_BIG_PREVLEN {
        1
    } else {
        5
    }
}

pub fn decode_prev_len(ptr: &[u8]) -> (usize, usize) {
    let prev_len_size = decode_prev_len_size(ptr);
    let prev_len = if prev_len_size == 1 {
        ptr[0] as usize
    } else {
        u32::from_le_bytes([ptr[1], ptr[2], ptr[3], ptr[4]]) as usize
    };
    (prev_len_size, prev_len)
}

/// Bytes needed to store `len` as a prevlen field.
#[inline]
pub fn prev_len_bytes(len: usize) -> usize {
    if len < ZIP_BIG_PREVLEN as usize {
        1
    } else {
        5
    }
}

/// Encodes `len` into a prevlen field exactly `width` bytes wide. A 5 byte
/// field may carry a small length when an entry kept its wider header.
pub fn store_prev_entry_length(len: usize, width: usize) -> Vec<u8> {
    if width == 1 {
        vec![len as u8]
    } else {
        let mut buf = Vec::with_capacity(5);
        buf.push(ZIP_BIG_PREVLEN);
        buf.extend_from_slice(&(len as u32).to_le_bytes());
        buf
    }
}

pub fn entry_encoding(ptr: &[u8]) -> u8 {
    let mut encoding = ptr[0];
    if encoding < ZIP_STR_MASK {
        encoding &= ZIP_STR_MASK;
    }
    encoding
}

#[inline]
pub fn is_str(encoding: u8) -> bool {
    (encoding & ZIP_STR_MASK) < ZIP_STR_MASK
}

/// Returns `(len_size, len)` for the entry whose encoding starts at `ptr`.
/// `None` means the encoding byte is not a valid entry encoding.
pub fn decode_length(ptr: &[u8], encoding: u8) -> Option<(usize, usize)> {
    if encoding < ZIP_STR_MASK {
        match encoding {
            ZIP_STR_06B => Some((1, (ptr[0] & 0x3f) as usize)),
            ZIP_STR_14B => {
                let len = (((ptr[0] & 0x3f) as usize) << 8) | (ptr[1] as usize);
                Some((2, len))
            }
            ZIP_STR_32B => {
                let len = u32::from_be_bytes([ptr[1], ptr[2], ptr[3], ptr[4]]) as usize;
                Some((5, len))
            }
            _ => None,
        }
    } else {
        zip_int_size(encoding).map(|len| (1, len))
    }
}

#[inline]
pub fn encoding_len_size(encoding: u8) -> Option<usize> {
    match encoding {
        ZIP_INT_8B | ZIP_INT_16B | ZIP_INT_24B | ZIP_INT_32B | ZIP_INT_64B => Some(1),
        ZIP_INT_IMM_MIN..=ZIP_INT_IMM_MAX => Some(1),
        ZIP_STR_06B => Some(1),
        ZIP_STR_14B => Some(2),
        ZIP_STR_32B => Some(5),
        _ => None,
    }
}

/// Payload size of an integer encoding.
pub fn zip_int_size(encoding: u8) -> Option<usize> {
    match encoding {
        ZIP_INT_8B => Some(1),
        ZIP_INT_16B => Some(2),
        ZIP_INT_24B => Some(3),
        ZIP_INT_32B => Some(4),
        ZIP_INT_64B => Some(8),
        ZIP_INT_IMM_MIN..=ZIP_INT_IMM_MAX => Some(0),
        _ => None,
    }
}

/// Encoding bytes for a string payload of `raw_len` bytes.
pub fn store_entry_encoding(raw_len: usize) -> Vec<u8> {
    if raw_len <= 0x3f {
        vec![ZIP_STR_06B | raw_len as u8]
    } else if raw_len <= 0x3fff {
        vec![ZIP_STR_14B | ((raw_len >> 8) as u8 & 0x3f), (raw_len & 0xff) as u8]
    } else {
        let mut buf = vec![ZIP_STR_32B];
        buf.extend_from_slice(&(raw_len as u32).to_be_bytes());
        buf
    }
}

/// Strict decimal parse: no sign other than a leading '-', no leading
/// zeros, no "-0", no surrounding whitespace.
pub fn string_to_int(b: &[u8]) -> Result<i64, ZipListError> {
    let s_len = b.len();
    if s_len == 0 || s_len >= LONG_STR_SIZE {
        return Err(ZipListError::InValidString);
    }
    if s_len == 1 && b[0] == b'0' {
        return Ok(0);
    }

    let mut index = 0;
    let negative = b[0] == b'-';
    if negative {
        index += 1;
        if index == s_len {
            return Err(ZipListError::InValidString);
        }
    }

    let mut v: u64 = if (b'1'..=b'9').contains(&b[index]) {
        (b[index] - b'0') as u64
    } else {
        return Err(ZipListError::InvalidFirstDigit);
    };
    index += 1;

    while index < s_len {
        let c = b[index];
        if !c.is_ascii_digit() {
            return Err(ZipListError::InvalidChar);
        }
        v = v.checked_mul(10).ok_or(ZipListError::OverFlowMul)?;
        v = v
            .checked_add((c - b'0') as u64)
            .ok_or(ZipListError::OverFlowAdd)?;
        index += 1;
    }

    if negative {
        if v > (i64::MAX as u64) + 1 {
            return Err(ZipListError::OverFlowNegative);
        }
        Ok((v as i64).wrapping_neg())
    } else {
        if v > i64::MAX as u64 {
            return Err(ZipListError::OverFlowPositive);
        }
        Ok(v as i64)
    }
}

/// Checks whether `entry` can be stored as an integer and picks the
/// smallest encoding for it.
pub fn try_encoding(entry: &[u8]) -> Option<(i64, u8)> {
    if entry.is_empty() || entry.len() >= ZIP_MAX_INT_STR_LEN {
        return None;
    }
    let value = string_to_int(entry).ok()?;
    let encoding = if (0..=12).contains(&value) {
        ZIP_INT_IMM_MIN + value as u8
    } else if value >= i8::MIN as i64 && value <= i8::MAX as i64 {
        ZIP_INT_8B
    } else if value >= i16::MIN as i64 && value <= i16::MAX as i64 {
        ZIP_INT_16B
    } else if (INT_24_MIN..=INT_24_MAX).contains(&value) {
        ZIP_INT_24B
    } else if value >= i32::MIN as i64 && value <= i32::MAX as i64 {
        ZIP_INT_32B
    } else {
        ZIP_INT_64B
    };
    Some((value, encoding))
}

pub fn save_integer(value: i64, encoding: u8) -> Vec<u8> {
    match encoding {
        ZIP_INT_8B => (value as i8).to_le_bytes().to_vec(),
        ZIP_INT_16B => (value as i16).to_le_bytes().to_vec(),
        ZIP_INT_24B => {
            let b = ((value as i32) << 8).to_le_bytes();
            vec![b[1], b[2], b[3]]
        }
        ZIP_INT_32B => (value as i32).to_le_bytes().to_vec(),
        ZIP_INT_64B => value.to_le_bytes().to_vec(),
        _ => Vec::new(),
    }
}

pub fn load_integer(ptr: &[u8], encoding: u8) -> i64 {
    match encoding {
        ZIP_INT_8B => ptr[0] as i8 as i64,
        ZIP_INT_16B => i16::from_le_bytes([ptr[0], ptr[1]]) as i64,
        ZIP_INT_24B => (i32::from_le_bytes([0, ptr[0], ptr[1], ptr[2]]) >> 8) as i64,
        ZIP_INT_32B => i32::from_le_bytes([ptr[0], ptr[1], ptr[2], ptr[3]]) as i64,
        ZIP_INT_64B => i64::from_le_bytes([
            ptr[0], ptr[1], ptr[2], ptr[3], ptr[4], ptr[5], ptr[6], ptr[7],
        ]),
        imm => ((imm & ZIP_INT_IMM_MASK) as i64) - 1,
    }
}

/// Serializes a whole entry: prevlen field, encoding, payload.
pub fn encode_entry(prev_len: usize, s: &[u8]) -> Vec<u8> {
    let mut buf = store_prev_entry_length(prev_len, prev_len_bytes(prev_len));
    match try_encoding(s) {
        Some((value, encoding)) => {
            buf.push(encoding);
            buf.extend(save_integer(value, encoding));
        }
        None => {
            buf.extend(store_entry_encoding(s.len()));
            buf.extend_from_slice(s);
        }
    }
    buf
}

pub fn ziplist_repr(zl: &ZipList) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{{total bytes {}}} {{num entries {}}}\n{{tail offset {}}}",
        zl.blob_len(),
        zl.len(),
        zl.tail_offset()
    );
    for (index, pos) in zl.iter().enumerate() {
        let entry = zl.zip_entry(pos);
        let _ = write!(
            out,
            "{{\n\taddr {pos},\n\tindex {index:2},\n\toffset {pos:5},\n\thdr+entry len: {:5},\n\thdr len{:2},\n\tprevrawlen: {:5},\n\tprevrawlensize: {:2},\n\tpayload {:5}\n",
            entry.head_size + entry.len,
            entry.head_size,
            entry.prev_raw_len,
            entry.prev_raw_len_size,
            entry.len
        );
        match zl.get(pos) {
            Some(ZipValue::Str(s)) => {
                let _ = write!(out, "\t[str]");
                if s.len() > 40 {
                    let _ = write!(out, "{}...", String::from_utf8_lossy(&s[..40]));
                } else {
                    let _ = write!(out, "{}", String::from_utf8_lossy(s));
                }
            }
            Some(ZipValue::Int(v)) => {
                let _ = write!(out, "\t[int]{v}");
            }
            None => {}
        }
        let _ = writeln!(out, "\n}}");
    }
    let _ = writeln!(out, "{{end}}\n");
    out
}
