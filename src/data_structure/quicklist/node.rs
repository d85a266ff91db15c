use lzf::LzfError;
use tracing::warn;

use crate::data_structure::quicklist::lib::QuickListLzf;
use crate::data_structure::quicklist::{MIN_COMPRESS_BYTES, MIN_COMPRESS_IMPROVE};
use crate::data_structure::ziplist::ZipList;

/// Handle to a node slot inside a `QuickList`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

#[derive(Clone, Debug)]
pub(crate) enum NodeData {
    Raw(ZipList),
    Lzf(QuickListLzf),
}

#[derive(Clone, Debug)]
pub(crate) struct QuickListNode {
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) data: NodeData,
    /// ziplist size in bytes, also while compressed
    pub(crate) sz: usize,
    /// count of items in ziplist
    pub(crate) count: u32,
    /// was this node previous compressed?
    pub(crate) recompress: bool,
    /// node can't compress; too small
    pub(crate) attempted_compress: bool,
}

/// Snapshot of one node, for introspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    pub count: u32,
    pub sz: usize,
    pub compressed: bool,
    pub attempted_compress: bool,
}

impl QuickListNode {
    pub fn create() -> Self {
        Self::from_ziplist(ZipList::new())
    }

    pub fn from_ziplist(zl: ZipList) -> Self {
        Self {
            prev: None,
            next: None,
            sz: zl.blob_len(),
            count: zl.len() as u32,
            data: NodeData::Raw(zl),
            recompress: false,
            attempted_compress: false,
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self.data, NodeData::Lzf(_))
    }

    pub fn info(&self) -> BlockInfo {
        BlockInfo {
            count: self.count,
            sz: self.sz,
            compressed: self.is_compressed(),
            attempted_compress: self.attempted_compress,
        }
    }

    /// The uncompressed ziplist, inflating the node first if needed.
    pub fn ziplist_mut(&mut self) -> &mut ZipList {
        self.decompress();
        match &mut self.data {
            NodeData::Raw(zl) => zl,
            NodeData::Lzf(_) => unreachable!("node was inflated above"),
        }
    }

    /// Compressed bytes of the node, if it is compressed.
    pub fn get_lzf(&self) -> Option<&[u8]> {
        match &self.data {
            NodeData::Lzf(lzf) => Some(&lzf.compressed),
            NodeData::Raw(_) => None,
        }
    }

    pub fn update_sz(&mut self) {
        if let NodeData::Raw(zl) = &self.data {
            self.sz = zl.blob_len();
        }
    }

    pub fn push(&mut self, value: &[u8], at_head: bool) {
        self.ziplist_mut().push(value, at_head);
        self.count += 1;
        self.update_sz();
    }

    /// Replaces the ziplist with its LZF form. Returns false, leaving the
    /// node raw, when it is too small or does not shrink enough.
    pub fn compress(&mut self) -> bool {
        self.attempted_compress = true;
        self.recompress = false;
        if self.sz < MIN_COMPRESS_BYTES {
            return false;
        }
        let NodeData::Raw(zl) = &self.data else {
            return false;
        };
        let compressed = match lzf::compress(zl.as_bytes()) {
            Ok(compressed) => compressed,
            Err(LzfError::NoCompressionPossible) => return false,
            Err(e) => {
                warn!(sz = self.sz, error = ?e, "lzf failed to compress node");
                return false;
            }
        };
        if compressed.is_empty() || compressed.len() + MIN_COMPRESS_IMPROVE >= self.sz {
            return false;
        }
        self.data = NodeData::Lzf(QuickListLzf::new(compressed));
        true
    }

    /// Restores the raw ziplist. A corrupt payload is an internal invariant
    /// violation and panics.
    pub fn decompress(&mut self) {
        let NodeData::Lzf(lzf) = &self.data else {
            return;
        };
        let raw = match lzf.inflate(self.sz) {
            Ok(raw) => raw,
            Err(e) => panic!("{e}"),
        };
        self.data = NodeData::Raw(ZipList::from_raw(raw));
        self.attempted_compress = false;
    }

    /// Copy of the node's payload and counters, unlinked.
    pub fn duplicate(&self) -> Self {
        Self {
            prev: None,
            next: None,
            data: self.data.clone(),
            sz: self.sz,
            count: self.count,
            recompress: false,
            attempted_compress: self.attempted_compress,
        }
    }
}
