mod error;
mod iter;
pub mod lib;
pub mod ziplist;

pub use error::ZipListError;
pub use iter::ZipListIter;
pub use ziplist::{ZipList, ZipValue, ZlEntry};

pub const ZIPLIST_HEADER_SIZE: usize = 10;
pub const ZIPLIST_END_SIZE: usize = 1;
pub const ZIP_END: u8 = 255;
pub const ZIP_BIG_PREVLEN: u8 = 254;

const ZIPLIST_BYTES_OFFSET: usize = 0;
const ZIPLIST_TAIL_OFFSET: usize = 4;
const ZIPLIST_LENGTH_OFFSET: usize = 8;

pub const ZIP_STR_MASK: u8 = 0xc0;
pub const ZIP_INT_MASK: u8 = 0x30;

/// string encode
pub const ZIP_STR_06B: u8 = 0 << 6;
pub const ZIP_STR_14B: u8 = 1 << 6;
pub const ZIP_STR_32B: u8 = 2 << 6;

/// integer encode
pub const ZIP_INT_16B: u8 = 0xc0 | (0 << 4);
pub const ZIP_INT_32B: u8 = 0xc0 | (1 << 4);
pub const ZIP_INT_64B: u8 = 0xc0 | (2 << 4);
pub const ZIP_INT_24B: u8 = 0xc0 | (3 << 4);
pub const ZIP_INT_8B: u8 = 0xfe;

const ZIP_INT_IMM_MIN: u8 = 0xf1; /* 11110001 */
const ZIP_INT_IMM_MAX: u8 = 0xfd; /* 11111101 */
const ZIP_INT_IMM_MASK: u8 = 0x0f;

/// strings at least this long are never tried as integers
const ZIP_MAX_INT_STR_LEN: usize = 32;
const LONG_STR_SIZE: usize = 21;

const INT_24_MAX: i64 = 0x7fffff;
const INT_24_MIN: i64 = -INT_24_MAX - 1;
