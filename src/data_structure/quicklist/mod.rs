mod error;
mod iter;
mod lib;
mod node;
pub mod quicklist;

pub use error::QuickListError;
pub use iter::{IterPosition, QuickListEntry, QuickListIter, QuickListValue};
pub use node::{BlockInfo, NodeId};
pub use quicklist::{Popped, QuickList};

use crate::data_structure::ziplist::ZIPLIST_HEADER_SIZE;

const QL_FILL_BITS: i32 = 16;
const QL_COMP_BITS: u32 = 16;
pub const FILL_MAX: i32 = 1 << (QL_FILL_BITS - 1);
pub const COMPRESS_MAX: i32 = 1 << QL_COMP_BITS;

/// Most negative fill accepted; selects the 64kb size class.
pub const FILL_MIN: i32 = -5;

///quicklist compression disable
pub const QUICKLIST_NOCOMPRESS: i32 = 0;

pub const DEFAULT_FILL: i32 = -2;
pub const DEFAULT_COMPRESS: i32 = QUICKLIST_NOCOMPRESS;

const MIN_COMPRESS_BYTES: usize = 48;
const MIN_COMPRESS_IMPROVE: usize = 8;

const SIZE_SAFETY_LIMIT: usize = 8192;

/// Header plus end marker, counted once when two blobs become one.
const ZIPLIST_ENVELOPE_SIZE: usize = ZIPLIST_HEADER_SIZE + 1;

const OPTIMIZATION_LEVEL: [usize; 5] = [4096, 8192, 16384, 32768, 65536];

/// End of the list a push or pop works on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Where {
    Head,
    Tail,
}

/// Direction an iterator walks in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// head to tail
    StartHead,
    /// tail to head
    StartTail,
}

pub fn quicklist_node_neg_fill_limit(fill: i32) -> usize {
    assert!(fill < 0);
    let mut offset = -fill - 1;
    let max_level = OPTIMIZATION_LEVEL.len();
    if offset >= max_level as i32 {
        offset = (max_level - 1) as i32;
    }
    OPTIMIZATION_LEVEL[offset as usize]
}

/// Returns the `(bytes, entries)` limits a node is held to. A negative fill
/// is a pure size class; a non-negative fill caps the entry count and is
/// additionally held to the safety limit.
pub fn quicklist_node_limit(fill: i32) -> (usize, u32) {
    if fill >= 0 {
        (SIZE_SAFETY_LIMIT, fill as u32)
    } else {
        (quicklist_node_neg_fill_limit(fill), u32::MAX)
    }
}

pub fn quicklist_node_exceed_limit(fill: i32, new_sz: usize, new_count: u32) -> bool {
    let (sz_limit, count_limit) = quicklist_node_limit(fill);
    new_sz > sz_limit || new_count > count_limit
}

/// Bytes a ziplist spends on headers for an entry of `sz` payload bytes:
/// its prevlen field plus its string encoding.
pub fn ziplist_entry_overhead(sz: usize) -> usize {
    let prev_len = if sz < 254 { 1 } else { 5 };
    let encoding = if sz < 64 {
        1
    } else if sz < 16384 {
        2
    } else {
        5
    };
    prev_len + encoding
}

/// Whether a node of `node_sz` bytes holding `count` entries can take one
/// more entry of `sz` bytes.
pub fn quicklist_node_allow_insert(fill: i32, node_sz: usize, count: u32, sz: usize) -> bool {
    let new_sz = node_sz + sz + ziplist_entry_overhead(sz);
    !quicklist_node_exceed_limit(fill, new_sz, count.saturating_add(1))
}

/// Whether two adjacent nodes fit into one.
pub fn quicklist_node_allow_merge(fill: i32, (a_sz, a_count): (usize, u32), (b_sz, b_count): (usize, u32)) -> bool {
    let merge_sz = (a_sz + b_sz).saturating_sub(ZIPLIST_ENVELOPE_SIZE);
    !quicklist_node_exceed_limit(fill, merge_sz, a_count.saturating_add(b_count))
}
