use crate::data_structure::quicklist::error::QuickListError;

/// Compressed payload of a node. The uncompressed size lives on the node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuickListLzf {
    /// compressed length
    pub sz: usize,
    pub compressed: Vec<u8>,
}

impl QuickListLzf {
    pub fn new(compressed: Vec<u8>) -> Self {
        Self {
            sz: compressed.len(),
            compressed,
        }
    }

    /// Inflates the payload back into `raw_sz` bytes.
    pub fn inflate(&self, raw_sz: usize) -> Result<Vec<u8>, QuickListError> {
        let raw = lzf::decompress(&self.compressed, raw_sz).map_err(QuickListError::Decompress)?;
        if raw.len() != raw_sz {
            return Err(QuickListError::DecompressedSize {
                expected: raw_sz,
                actual: raw.len(),
            });
        }
        Ok(raw)
    }
}
