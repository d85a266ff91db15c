use bytes::Bytes;

use crate::data_structure::quicklist::node::NodeId;
use crate::data_structure::quicklist::quicklist::QuickList;
use crate::data_structure::quicklist::Direction;
use crate::data_structure::ziplist::lib::string_to_int;
use crate::data_structure::ziplist::ZipValue;

/// An element as read out of a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuickListValue {
    Str(Bytes),
    Int(i64),
}

impl QuickListValue {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            QuickListValue::Str(s) => Some(s),
            QuickListValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            QuickListValue::Int(v) => Some(*v),
            QuickListValue::Str(_) => None,
        }
    }

    /// The value as bytes, integers rendered in decimal.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            QuickListValue::Str(s) => s.clone(),
            QuickListValue::Int(v) => Bytes::from(v.to_string()),
        }
    }
}

impl From<ZipValue<'_>> for QuickListValue {
    fn from(value: ZipValue<'_>) -> Self {
        match value {
            ZipValue::Str(s) => QuickListValue::Str(Bytes::copy_from_slice(s)),
            ZipValue::Int(v) => QuickListValue::Int(v),
        }
    }
}

/// Position of one element, as returned by indexing and iteration.
///
/// The handle is only meaningful until the list is next mutated; positional
/// inserts check this in debug builds.
#[derive(Clone, Debug)]
pub struct QuickListEntry {
    pub(crate) node: NodeId,
    pub(crate) zi: usize,
    pub(crate) offset: i64,
    pub(crate) value: QuickListValue,
    pub(crate) stamp: u64,
}

impl QuickListEntry {
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Offset inside the node; negative when counted from the node's end.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn value(&self) -> &QuickListValue {
        &self.value
    }

    pub fn into_value(self) -> QuickListValue {
        self.value
    }

    /// Byte length of a string entry; zero for integers.
    pub fn sz(&self) -> usize {
        self.value.as_bytes().map_or(0, <[u8]>::len)
    }

    /// Compares the entry with `other`. Integer entries match the decimal
    /// text of the same integer.
    pub fn compare(&self, other: &[u8]) -> bool {
        match &self.value {
            QuickListValue::Str(s) => s.as_ref() == other,
            QuickListValue::Int(v) => string_to_int(other).is_ok_and(|parsed| parsed == *v),
        }
    }
}

/// Where an iterator stands after deleting its current entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IterPosition {
    /// node the next call to `next` reads from
    pub node: Option<NodeId>,
    pub offset: i64,
    /// whether the deleted entry was the last one of its node
    pub node_deleted: bool,
}

/// Iterator over a quicklist. It borrows the list exclusively; the only
/// mutation allowed while it lives is `delete_entry` on the entry it just
/// returned.
pub struct QuickListIter<'a> {
    quicklist: &'a mut QuickList,
    current: Option<NodeId>,
    /// cursor into the current node's ziplist, resolved lazily
    zi: Option<usize>,
    offset: i64,
    direction: Direction,
}

impl<'a> QuickListIter<'a> {
    pub(crate) fn new(
        quicklist: &'a mut QuickList,
        current: Option<NodeId>,
        offset: i64,
        direction: Direction,
    ) -> Self {
        Self {
            quicklist,
            current,
            zi: None,
            offset,
            direction,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Deletes `entry`, which must be the entry last returned by `next`,
    /// and reports where iteration resumes.
    pub fn delete_entry(&mut self, entry: QuickListEntry) -> IterPosition {
        debug_assert_eq!(Some(entry.node), self.current, "entry is not the current one");
        let (prev, next) = self.quicklist.neighbours(entry.node);
        let node_deleted = self.quicklist.del_index(entry.node, entry.zi);
        self.quicklist.touch();

        self.zi = None;
        if node_deleted {
            match self.direction {
                Direction::StartHead => {
                    self.current = next;
                    self.offset = 0;
                }
                Direction::StartTail => {
                    self.current = prev;
                    self.offset = -1;
                }
            }
        }
        // otherwise the next entry slid into `offset` (head first) or the
        // negative offset already names the previous entry (tail first)
        IterPosition {
            node: self.current,
            offset: self.offset,
            node_deleted,
        }
    }
}

impl Iterator for QuickListIter<'_> {
    type Item = QuickListEntry;

    fn next(&mut self) -> Option<QuickListEntry> {
        loop {
            let current = self.current?;
            let forward = self.direction == Direction::StartHead;

            match self.zi {
                None => {
                    self.quicklist.decompress_node_for_use(current);
                    self.zi = self.quicklist.ziplist_mut(current).zip_index(self.offset);
                }
                Some(zi) => {
                    let zl = self.quicklist.ziplist_mut(current);
                    self.zi = if forward {
                        zl.next_entry_position(zi)
                    } else {
                        zl.prev_entry_position(zi)
                    };
                    self.offset += if forward { 1 } else { -1 };
                }
            }

            if let Some(zi) = self.zi {
                if let Some(entry) = self.quicklist.entry_at(current, zi, self.offset) {
                    return Some(entry);
                }
            }

            // node exhausted
            self.quicklist.compress(current);
            let (prev, next) = self.quicklist.neighbours(current);
            if forward {
                self.current = next;
                self.offset = 0;
            } else {
                self.current = prev;
                self.offset = -1;
            }
            self.zi = None;
        }
    }
}

impl Drop for QuickListIter<'_> {
    fn drop(&mut self) {
        if let Some(current) = self.current {
            self.quicklist.compress(current);
        }
    }
}
