use crate::data_structure::ziplist::ziplist::{ZipList, ZipValue};

/// Walks entry positions from head to tail.
pub struct ZipListIter<'a> {
    cur: Option<usize>,
    started: bool,
    ziplist: &'a ZipList,
}

impl ZipList {
    pub fn iter(&self) -> ZipListIter<'_> {
        ZipListIter {
            cur: None,
            started: false,
            ziplist: self,
        }
    }

    pub fn values(&self) -> impl Iterator<Item = ZipValue<'_>> + '_ {
        self.iter().filter_map(move |pos| self.get(pos))
    }
}

impl Iterator for ZipListIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        self.cur = if !self.started {
            self.started = true;
            self.ziplist.zip_index(0)
        } else {
            self.ziplist.next_entry_position(self.cur?)
        };
        self.cur
    }
}
