use lzf::LzfError;

use crate::data_structure::ziplist::ZipListError;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuickListError {
    #[error("[QuickList] invalid ziplist: {0}")]
    InvalidZipList(#[from] ZipListError),
    #[error("[QuickList] lzf decompression failed: {0}")]
    Decompress(LzfError),
    #[error("[QuickList] lzf decompression failed: expected {expected} bytes, got {actual}")]
    DecompressedSize { expected: usize, actual: usize },
}
