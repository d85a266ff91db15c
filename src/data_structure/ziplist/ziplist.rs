use crate::data_structure::ziplist::error::ZipListError;
use crate::data_structure::ziplist::lib::{
    decode_length, decode_prev_len, decode_prev_len_size, encode_entry, encoding_len_size,
    entry_encoding, is_str, load_integer, prev_len_bytes, store_prev_entry_length, string_to_int,
};
use crate::data_structure::ziplist::{
    ZIPLIST_BYTES_OFFSET, ZIPLIST_END_SIZE, ZIPLIST_HEADER_SIZE, ZIPLIST_LENGTH_OFFSET,
    ZIPLIST_TAIL_OFFSET, ZIP_BIG_PREVLEN, ZIP_END,
};

/// A decoded entry header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZlEntry {
    /// length of prev entry length info
    pub prev_raw_len_size: usize,
    /// prev entry length
    pub prev_raw_len: usize,
    /// length of cur entry length info
    pub len_size: usize,
    /// cur entry length
    pub len: usize,
    /// cur entry head length
    pub head_size: usize,
    /// cur entry data encode
    pub encoding: u8,
    /// offset of the entry inside the blob
    pub pos: usize,
}

/// Value stored in an entry, borrowed from the blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZipValue<'a> {
    Str(&'a [u8]),
    Int(i64),
}

/// Packed list of strings and integers in one contiguous blob.
///
/// Layout: `<zlbytes u32><zltail u32><zllen u16> <entry>... <0xff>`, header
/// fields little endian. Every entry starts with the byte length of the
/// entry before it, so the list can be walked in both directions. Positions
/// handed out by this type are byte offsets into the blob and stay valid
/// until the next mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZipList {
    data: Vec<u8>,
}

impl Default for ZipList {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipList {
    pub fn new() -> Self {
        let bytes = ZIPLIST_HEADER_SIZE + ZIPLIST_END_SIZE;
        let mut data = vec![0u8; bytes];
        data[bytes - 1] = ZIP_END;
        let mut zl = Self { data };
        zl.set_total_bytes();
        zl.set_tail_offset(ZIPLIST_HEADER_SIZE);
        zl
    }

    /// Adopts an external blob after checking its structure.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ZipListError> {
        let zl = Self { data };
        zl.validate_integrity()?;
        Ok(zl)
    }

    /// Adopts a blob produced by this type without re-validating it.
    pub(crate) fn from_raw(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Total size of the blob in bytes.
    pub fn blob_len(&self) -> usize {
        self.data.len()
    }

    fn read_u32(&self, offset: usize) -> usize {
        let b = &self.data[offset..offset + 4];
        u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize
    }

    fn set_total_bytes(&mut self) {
        let bytes = (self.data.len() as u32).to_le_bytes();
        self.data[ZIPLIST_BYTES_OFFSET..ZIPLIST_BYTES_OFFSET + 4].copy_from_slice(&bytes);
    }

    pub fn tail_offset(&self) -> usize {
        self.read_u32(ZIPLIST_TAIL_OFFSET)
    }

    fn set_tail_offset(&mut self, offset: usize) {
        let bytes = (offset as u32).to_le_bytes();
        self.data[ZIPLIST_TAIL_OFFSET..ZIPLIST_TAIL_OFFSET + 4].copy_from_slice(&bytes);
    }

    fn length_field(&self) -> u16 {
        u16::from_le_bytes([
            self.data[ZIPLIST_LENGTH_OFFSET],
            self.data[ZIPLIST_LENGTH_OFFSET + 1],
        ])
    }

    fn set_length_field(&mut self, len: u16) {
        self.data[ZIPLIST_LENGTH_OFFSET..ZIPLIST_LENGTH_OFFSET + 2]
            .copy_from_slice(&len.to_le_bytes());
    }

    /// The length field saturates at `u16::MAX`, after which the list has
    /// to be walked.
    fn incr_length(&mut self, incr: isize) {
        let len = self.length_field();
        if len < u16::MAX {
            let new_len = (len as isize + incr).clamp(0, u16::MAX as isize);
            self.set_length_field(new_len as u16);
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        let len = self.length_field();
        if len < u16::MAX {
            len as usize
        } else {
            self.iter().count()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data[ZIPLIST_HEADER_SIZE] == ZIP_END
    }

    pub fn zip_entry(&self, pos: usize) -> ZlEntry {
        let (prev_raw_len_size, prev_raw_len) = decode_prev_len(&self.data[pos..]);
        let enc_pos = pos + prev_raw_len_size;
        let encoding = entry_encoding(&self.data[enc_pos..]);
        let (len_size, len) = decode_length(&self.data[enc_pos..], encoding).unwrap_or((0, 0));
        ZlEntry {
            prev_raw_len_size,
            prev_raw_len,
            len_size,
            len,
            head_size: prev_raw_len_size + len_size,
            encoding,
            pos,
        }
    }

    /// Byte length of the entry at `pos`, header included.
    pub fn raw_entry_len(&self, pos: usize) -> usize {
        let entry = self.zip_entry(pos);
        entry.head_size + entry.len
    }

    /// Position of the entry at `index`; negative indexes count from the tail.
    pub fn zip_index(&self, index: i64) -> Option<usize> {
        if index < 0 {
            let mut steps = (-(index + 1)) as u64;
            let mut p = self.tail_offset();
            if self.data[p] == ZIP_END {
                return None;
            }
            while steps > 0 {
                let (_, prev_len) = decode_prev_len(&self.data[p..]);
                if prev_len == 0 {
                    return None;
                }
                p -= prev_len;
                steps -= 1;
            }
            Some(p)
        } else {
            let mut steps = index as u64;
            let mut p = ZIPLIST_HEADER_SIZE;
            while self.data[p] != ZIP_END && steps > 0 {
                p += self.raw_entry_len(p);
                steps -= 1;
            }
            if self.data[p] == ZIP_END {
                None
            } else {
                Some(p)
            }
        }
    }

    pub fn next_entry_position(&self, pos: usize) -> Option<usize> {
        if self.data[pos] == ZIP_END {
            return None;
        }
        let next = pos + self.raw_entry_len(pos);
        if self.data[next] == ZIP_END {
            None
        } else {
            Some(next)
        }
    }

    /// Calling this with the end marker position yields the tail entry.
    pub fn prev_entry_position(&self, pos: usize) -> Option<usize> {
        if self.data[pos] == ZIP_END {
            let tail = self.tail_offset();
            if self.data[tail] == ZIP_END {
                None
            } else {
                Some(tail)
            }
        } else if pos == ZIPLIST_HEADER_SIZE {
            None
        } else {
            let (_, prev_len) = decode_prev_len(&self.data[pos..]);
            Some(pos - prev_len)
        }
    }

    pub fn get(&self, pos: usize) -> Option<ZipValue<'_>> {
        if self.data[pos] == ZIP_END {
            return None;
        }
        let entry = self.zip_entry(pos);
        let start = pos + entry.head_size;
        if is_str(entry.encoding) {
            Some(ZipValue::Str(&self.data[start..start + entry.len]))
        } else {
            Some(ZipValue::Int(load_integer(
                &self.data[start..],
                entry.encoding,
            )))
        }
    }

    pub fn push(&mut self, s: &[u8], at_head: bool) {
        let pos = if at_head {
            ZIPLIST_HEADER_SIZE
        } else {
            self.data.len() - ZIPLIST_END_SIZE
        };
        self.insert(pos, s);
    }

    /// Inserts `s` before the entry at `pos`, or appends when `pos` is the
    /// end marker.
    pub fn insert(&mut self, pos: usize, s: &[u8]) {
        let at_end = self.data[pos] == ZIP_END;
        let prev_len = if !at_end {
            decode_prev_len(&self.data[pos..]).1
        } else {
            let tail = self.tail_offset();
            if self.data[tail] != ZIP_END {
                self.raw_entry_len(tail)
            } else {
                0
            }
        };

        let entry = encode_entry(prev_len, s);
        let req_len = entry.len();

        if at_end {
            self.data.splice(pos..pos, entry);
            self.set_tail_offset(pos);
            self.set_total_bytes();
        } else {
            // the entry at `pos` keeps a wide prevlen field even if a narrow
            // one would do, so only growth can cascade
            let old_width = decode_prev_len_size(&self.data[pos..]);
            let width = old_width.max(prev_len_bytes(req_len));
            let next_diff = width - old_width;
            let mut bytes = entry;
            bytes.extend(store_prev_entry_length(req_len, width));
            self.data.splice(pos..pos + old_width, bytes);

            let tail = self.tail_offset();
            if tail == pos {
                self.set_tail_offset(pos + req_len);
            } else {
                self.set_tail_offset(tail + req_len + next_diff);
            }
            self.set_total_bytes();
            if next_diff != 0 {
                self.cascade_update(pos + req_len);
            }
        }
        self.incr_length(1);
    }

    /// Deletes the entry at `pos`. Returns the position of the entry that
    /// took its place, if any.
    pub fn delete(&mut self, pos: usize) -> Option<usize> {
        self.delete_at(pos, 1);
        if self.data[pos] == ZIP_END {
            None
        } else {
            Some(pos)
        }
    }

    /// Deletes up to `num` entries starting at `index`.
    pub fn delete_range(&mut self, index: i64, num: usize) -> usize {
        match self.zip_index(index) {
            Some(pos) => self.delete_at(pos, num),
            None => 0,
        }
    }

    fn delete_at(&mut self, first: usize, num: usize) -> usize {
        let mut q = first;
        let mut deleted = 0;
        while self.data[q] != ZIP_END && deleted < num {
            q += self.raw_entry_len(q);
            deleted += 1;
        }
        if deleted == 0 {
            return 0;
        }

        let (_, first_prev_len) = decode_prev_len(&self.data[first..]);
        let tail = self.tail_offset();
        if self.data[q] != ZIP_END {
            let old_width = decode_prev_len_size(&self.data[q..]);
            let width = old_width.max(prev_len_bytes(first_prev_len));
            let removed = q - first;
            let field = store_prev_entry_length(first_prev_len, width);
            self.data.splice(first..q + old_width, field);

            if tail == q {
                self.set_tail_offset(first);
            } else {
                self.set_tail_offset(tail - removed + (width - old_width));
            }
            self.set_total_bytes();
            if width != old_width {
                self.cascade_update(first);
            }
        } else {
            self.data.drain(first..q);
            self.set_tail_offset(first - first_prev_len);
            self.set_total_bytes();
        }
        self.incr_length(-(deleted as isize));
        deleted
    }

    /// Rewrites prevlen fields after the entry at `pos` changed size. A
    /// field only ever grows here; one that is already wide enough is
    /// rewritten in place and ends the walk.
    fn cascade_update(&mut self, mut pos: usize) {
        while self.data[pos] != ZIP_END {
            let raw_len = self.raw_entry_len(pos);
            let next = pos + raw_len;
            if self.data[next] == ZIP_END {
                break;
            }
            let (width, prev_len) = decode_prev_len(&self.data[next..]);
            if prev_len == raw_len {
                break;
            }
            let need = prev_len_bytes(raw_len);
            if width < need {
                let field = store_prev_entry_length(raw_len, need);
                self.data.splice(next..next + width, field);
                let tail = self.tail_offset();
                if tail != next {
                    self.set_tail_offset(tail + need - width);
                }
                self.set_total_bytes();
                pos = next;
            } else {
                let field = store_prev_entry_length(raw_len, width);
                self.data[next..next + width].copy_from_slice(&field);
                break;
            }
        }
    }

    /// Compares the entry at `pos` with `s`. Integer entries match any
    /// string that encodes the same integer.
    pub fn compare(&self, pos: usize, s: &[u8]) -> bool {
        match self.get(pos) {
            Some(ZipValue::Str(v)) => v == s,
            Some(ZipValue::Int(v)) => string_to_int(s).is_ok_and(|parsed| parsed == v),
            None => false,
        }
    }

    /// Finds the first entry equal to `s` starting at `pos`, skipping `skip`
    /// entries between every comparison.
    pub fn find(&self, pos: usize, s: &[u8], skip: usize) -> Option<usize> {
        let mut skip_cnt = 0;
        let mut p = if self.data[pos] == ZIP_END {
            None
        } else {
            Some(pos)
        };
        while let Some(cur) = p {
            if skip_cnt == 0 {
                if self.compare(cur, s) {
                    return Some(cur);
                }
                skip_cnt = skip;
            } else {
                skip_cnt -= 1;
            }
            p = self.next_entry_position(cur);
        }
        None
    }

    /// Appends the entries of `second` after the entries of `first`.
    pub fn merge(first: ZipList, second: ZipList) -> ZipList {
        if first.is_empty() {
            return second;
        }
        if second.is_empty() {
            return first;
        }

        let first_tail = first.tail_offset();
        let first_tail_len = first.raw_entry_len(first_tail);
        let second_tail = second.tail_offset();
        let total_len = first.len() + second.len();

        let mut data = first.data;
        data.truncate(data.len() - ZIPLIST_END_SIZE);
        let joint = data.len();
        data.extend_from_slice(&second.data[ZIPLIST_HEADER_SIZE..]);

        let mut zl = ZipList { data };
        zl.set_tail_offset(joint + (second_tail - ZIPLIST_HEADER_SIZE));
        zl.set_length_field(total_len.min(u16::MAX as usize) as u16);

        // the first entry of `second` recorded a zero prevlen
        let old_width = decode_prev_len_size(&zl.data[joint..]);
        let width = old_width.max(prev_len_bytes(first_tail_len));
        let field = store_prev_entry_length(first_tail_len, width);
        zl.data.splice(joint..joint + old_width, field);
        if width != old_width && second_tail != ZIPLIST_HEADER_SIZE {
            let tail = zl.tail_offset();
            zl.set_tail_offset(tail + width - old_width);
        }
        zl.set_total_bytes();
        if width != old_width {
            zl.cascade_update(joint);
        }
        zl
    }

    /// Walks the whole blob checking header fields, entry bounds, prevlen
    /// back links and the entry count.
    pub fn validate_integrity(&self) -> Result<(), ZipListError> {
        let corrupt = |reason: &str| Err(ZipListError::Corrupt(reason.to_string()));
        let total = self.data.len();
        if total < ZIPLIST_HEADER_SIZE + ZIPLIST_END_SIZE {
            return corrupt("blob shorter than the header");
        }
        if self.read_u32(ZIPLIST_BYTES_OFFSET) != total {
            return corrupt("total bytes field does not match the blob");
        }
        if self.data[total - 1] != ZIP_END {
            return corrupt("missing end marker");
        }

        let end = total - ZIPLIST_END_SIZE;
        let mut p = ZIPLIST_HEADER_SIZE;
        let mut prev_raw_len = 0;
        let mut last = ZIPLIST_HEADER_SIZE;
        let mut count = 0usize;
        while p < end {
            if self.data[p] == ZIP_END {
                return corrupt("end marker inside the entries");
            }
            let prev_size = if self.data[p] < ZIP_BIG_PREVLEN { 1 } else { 5 };
            if p + prev_size >= end {
                return corrupt("entry header out of range");
            }
            let (_, prev_len) = decode_prev_len(&self.data[p..]);
            if prev_len != prev_raw_len {
                return corrupt("prevlen does not match the previous entry");
            }
            let enc_pos = p + prev_size;
            let encoding = entry_encoding(&self.data[enc_pos..]);
            let Some(len_size) = encoding_len_size(encoding) else {
                return corrupt("invalid entry encoding");
            };
            if enc_pos + len_size > end {
                return corrupt("entry header out of range");
            }
            let Some((_, len)) = decode_length(&self.data[enc_pos..], encoding) else {
                return corrupt("invalid entry encoding");
            };
            let next = enc_pos + len_size + len;
            if next > end {
                return corrupt("entry payload out of range");
            }
            prev_raw_len = next - p;
            last = p;
            p = next;
            count += 1;
        }

        if self.tail_offset() != last {
            return corrupt("tail offset does not point at the last entry");
        }
        let len = self.length_field();
        if len < u16::MAX && len as usize != count {
            return corrupt("entry count does not match the length field");
        }
        Ok(())
    }
}
