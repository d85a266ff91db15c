use tracing::debug;

use crate::data_structure::quicklist::error::QuickListError;
use crate::data_structure::quicklist::iter::{QuickListEntry, QuickListIter, QuickListValue};
use crate::data_structure::quicklist::node::{BlockInfo, NodeData, NodeId, QuickListNode};
use crate::data_structure::quicklist::{
    quicklist_node_allow_insert, quicklist_node_allow_merge, Direction, Where, COMPRESS_MAX,
    DEFAULT_COMPRESS, DEFAULT_FILL, FILL_MAX, FILL_MIN,
};
use crate::data_structure::ziplist::{ZipList, ZipValue};

/// Result of `pop_custom`: string entries go through the caller's saver,
/// integer entries come back as they are.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Popped<T> {
    Value(T),
    Int(i64),
}

/// A doubly linked list of ziplists.
///
/// Nodes live in an arena owned by the list and link to each other by
/// `NodeId`. Nodes further than `compress` nodes from both ends are kept
/// LZF compressed; nodes are sized according to `fill`.
pub struct QuickList {
    nodes: Vec<Option<QuickListNode>>,
    free: Vec<usize>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    /// total count of all entries in all ziplists
    count: u64,
    /// number of quicklist nodes
    len: u64,
    /// fill factor for individual nodes
    fill: i32,
    /// depth of end nodes not to compress
    compress: u32,
    /// bumped on every structural change
    stamp: u64,
}

impl Default for QuickList {
    fn default() -> Self {
        Self::create()
    }
}

impl Clone for QuickList {
    fn clone(&self) -> Self {
        self.dup()
    }
}

impl QuickList {
    pub fn create() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            count: 0,
            len: 0,
            fill: DEFAULT_FILL,
            compress: DEFAULT_COMPRESS as u32,
            stamp: 0,
        }
    }

    pub fn new(fill: i32, compress: i32) -> Self {
        let mut quicklist = Self::create();
        quicklist.set_options(fill, compress);
        quicklist
    }

    pub fn set_compress_depth(&mut self, compress: i32) {
        self.compress = compress.clamp(0, COMPRESS_MAX) as u32;
    }

    pub fn set_fill(&mut self, fill: i32) {
        self.fill = fill.clamp(FILL_MIN, FILL_MAX);
    }

    pub fn set_options(&mut self, fill: i32, compress: i32) {
        self.set_fill(fill);
        self.set_compress_depth(compress);
    }

    pub fn fill(&self) -> i32 {
        self.fill
    }

    pub fn compress_depth(&self) -> u32 {
        self.compress
    }

    /// Number of entries.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Number of nodes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Per-node summaries from head to tail.
    pub fn blocks(&self) -> Vec<BlockInfo> {
        let mut blocks = Vec::with_capacity(self.len as usize);
        let mut cur = self.head;
        while let Some(id) = cur {
            let node = self.node(id);
            blocks.push(node.info());
            cur = node.next;
        }
        blocks
    }

    /// Compressed bytes of `node`, if it is compressed.
    pub fn get_lzf(&self, node: NodeId) -> Option<&[u8]> {
        self.node(node).get_lzf()
    }

    pub(crate) fn touch(&mut self) {
        self.stamp = self.stamp.wrapping_add(1);
    }

    fn alloc(&mut self, node: QuickListNode) -> NodeId {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NodeId) -> Option<QuickListNode> {
        let node = self.nodes.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        Some(node)
    }

    pub(crate) fn node(&self, id: NodeId) -> &QuickListNode {
        match self.nodes.get(id.0) {
            Some(Some(node)) => node,
            _ => panic!("quicklist node {} is not live", id.0),
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut QuickListNode {
        match self.nodes.get_mut(id.0) {
            Some(Some(node)) => node,
            _ => panic!("quicklist node {} is not live", id.0),
        }
    }

    pub(crate) fn neighbours(&self, id: NodeId) -> (Option<NodeId>, Option<NodeId>) {
        let node = self.node(id);
        (node.prev, node.next)
    }

    pub(crate) fn ziplist_mut(&mut self, id: NodeId) -> &mut ZipList {
        self.node_mut(id).ziplist_mut()
    }

    fn compress_node(&mut self, id: Option<NodeId>) {
        if let Some(id) = id {
            let node = self.node_mut(id);
            if !node.is_compressed() {
                node.compress();
            }
        }
    }

    fn decompress_node(&mut self, id: Option<NodeId>) {
        if let Some(id) = id {
            self.node_mut(id).decompress();
        }
    }

    /// Boundary nodes stay raw, even if they were only inflated for use.
    fn keep_raw(&mut self, id: Option<NodeId>) {
        if let Some(id) = id {
            let node = self.node_mut(id);
            node.decompress();
            node.recompress = false;
        }
    }

    /// Inflates the node for a single access; `recompress_only` undoes it.
    pub(crate) fn decompress_node_for_use(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        if node.is_compressed() {
            node.decompress();
            node.recompress = true;
        }
    }

    pub(crate) fn recompress_only(&mut self, id: NodeId) {
        if self.node(id).recompress {
            self.compress_node(Some(id));
        }
    }

    /// Re-evaluates compression after a change at `id`.
    pub(crate) fn compress(&mut self, id: NodeId) {
        if self.node(id).recompress {
            self.compress_node(Some(id));
        } else {
            self.enforce_compression(Some(id));
        }
    }

    /// Walks `compress` nodes in from both ends, inflating every node on the
    /// way, then compresses `node` if the walk did not reach it together
    /// with the first node past each boundary.
    fn enforce_compression(&mut self, node: Option<NodeId>) {
        let depth = self.compress as u64;
        if depth == 0 || self.len < depth * 2 {
            return;
        }

        let mut forward = self.head;
        let mut reverse = self.tail;
        let mut in_depth = false;
        for _ in 0..depth {
            self.keep_raw(forward);
            self.keep_raw(reverse);

            if node.is_some() && (forward == node || reverse == node) {
                in_depth = true;
            }

            let next = forward.and_then(|f| self.node(f).next);
            if forward == reverse || next == reverse {
                return;
            }
            forward = next;
            reverse = reverse.and_then(|r| self.node(r).prev);
        }

        if !in_depth {
            self.compress_node(node);
        }
        self.compress_node(forward);
        self.compress_node(reverse);
    }

    fn insert_node(&mut self, old: Option<NodeId>, new: NodeId, after: bool) {
        if after {
            self.node_mut(new).prev = old;
            if let Some(old) = old {
                let old_next = self.node(old).next;
                self.node_mut(new).next = old_next;
                if let Some(next) = old_next {
                    self.node_mut(next).prev = Some(new);
                }
                self.node_mut(old).next = Some(new);
            }
            if self.tail == old {
                self.tail = Some(new);
            }
        } else {
            self.node_mut(new).next = old;
            if let Some(old) = old {
                let old_prev = self.node(old).prev;
                self.node_mut(new).prev = old_prev;
                if let Some(prev) = old_prev {
                    self.node_mut(prev).next = Some(new);
                }
                self.node_mut(old).prev = Some(new);
            }
            if self.head == old {
                self.head = Some(new);
            }
        }
        if self.len == 0 {
            self.head = Some(new);
            self.tail = Some(new);
        }
        self.len += 1;

        if let Some(old) = old {
            self.compress(old);
        }
        self.compress(new);
    }

    fn insert_node_before(&mut self, old: Option<NodeId>, new: NodeId) {
        self.insert_node(old, new, false);
    }

    fn insert_node_after(&mut self, old: Option<NodeId>, new: NodeId) {
        self.insert_node(old, new, true);
    }

    fn allow_insert(&self, id: Option<NodeId>, sz: usize) -> bool {
        match id {
            Some(id) => {
                let node = self.node(id);
                quicklist_node_allow_insert(self.fill, node.sz, node.count, sz)
            }
            None => false,
        }
    }

    fn allow_merge(&self, a: NodeId, b: NodeId) -> bool {
        let (a, b) = (self.node(a), self.node(b));
        quicklist_node_allow_merge(self.fill, (a.sz, a.count), (b.sz, b.count))
    }

    /// Adds an entry at the head. Returns true if a new head node was
    /// created.
    pub fn push_head(&mut self, value: &[u8]) -> bool {
        let orig_head = self.head;
        match orig_head.filter(|_| self.allow_insert(orig_head, value.len())) {
            Some(head) => self.node_mut(head).push(value, true),
            None => {
                let mut node = QuickListNode::create();
                node.push(value, true);
                let id = self.alloc(node);
                self.insert_node_before(orig_head, id);
            }
        }
        self.count += 1;
        self.touch();
        orig_head != self.head
    }

    /// Adds an entry at the tail. Returns true if a new tail node was
    /// created.
    pub fn push_tail(&mut self, value: &[u8]) -> bool {
        let orig_tail = self.tail;
        match orig_tail.filter(|_| self.allow_insert(orig_tail, value.len())) {
            Some(tail) => self.node_mut(tail).push(value, false),
            None => {
                let mut node = QuickListNode::create();
                node.push(value, false);
                let id = self.alloc(node);
                self.insert_node_after(orig_tail, id);
            }
        }
        self.count += 1;
        self.touch();
        orig_tail != self.tail
    }

    pub fn push(&mut self, value: &[u8], place: Where) -> bool {
        match place {
            Where::Head => self.push_head(value),
            Where::Tail => self.push_tail(value),
        }
    }

    /// Appends an already built ziplist as a new tail node.
    pub fn append_ziplist(&mut self, zl: ZipList) {
        if zl.is_empty() {
            return;
        }
        let node = QuickListNode::from_ziplist(zl);
        let count = node.count as u64;
        let id = self.alloc(node);
        self.insert_node_after(self.tail, id);
        self.count += count;
        self.touch();
    }

    /// Validates an external blob and appends it as a new tail node.
    pub fn append_ziplist_bytes(&mut self, blob: Vec<u8>) -> Result<(), QuickListError> {
        let zl = ZipList::from_bytes(blob)?;
        self.append_ziplist(zl);
        Ok(())
    }

    /// Pushes every entry of `zl` to the tail one by one, so the entries
    /// are laid out according to this list's fill.
    pub fn append_values_from_ziplist(&mut self, zl: &ZipList) {
        for value in zl.values() {
            match value {
                ZipValue::Str(s) => self.push_tail(s),
                ZipValue::Int(v) => self.push_tail(v.to_string().as_bytes()),
            };
        }
    }

    pub fn from_ziplist(fill: i32, compress: i32, zl: &ZipList) -> Self {
        let mut quicklist = Self::new(fill, compress);
        quicklist.append_values_from_ziplist(zl);
        quicklist
    }

    /// Unlinks and frees a node, dropping its entries from the count.
    fn del_node(&mut self, id: NodeId) {
        let Some(node) = self.release(id) else {
            return;
        };
        if let Some(next) = node.next {
            self.node_mut(next).prev = node.prev;
        }
        if let Some(prev) = node.prev {
            self.node_mut(prev).next = node.next;
        }
        if self.tail == Some(id) {
            self.tail = node.prev;
        }
        if self.head == Some(id) {
            self.head = node.next;
        }

        self.len -= 1;
        self.count -= node.count as u64;

        // a node inside the uncompressed depth may be gone
        self.enforce_compression(None);
    }

    /// Deletes the entry at `zi` in node `id`. Returns true if the node
    /// became empty and was freed.
    pub(crate) fn del_index(&mut self, id: NodeId, zi: usize) -> bool {
        let node = self.node_mut(id);
        node.ziplist_mut().delete(zi);
        node.count -= 1;
        let gone = node.count == 0;
        if gone {
            self.del_node(id);
        } else {
            self.node_mut(id).update_sz();
        }
        self.count -= 1;
        gone
    }

    pub fn insert_before(&mut self, entry: Option<&QuickListEntry>, value: &[u8]) {
        self.insert(entry, value, false);
    }

    pub fn insert_after(&mut self, entry: Option<&QuickListEntry>, value: &[u8]) {
        self.insert(entry, value, true);
    }

    /// Inserts `value` next to `entry`. Without an entry the value becomes
    /// the new head (before) or tail (after).
    fn insert(&mut self, entry: Option<&QuickListEntry>, value: &[u8], after: bool) {
        let sz = value.len();

        let Some(entry) = entry else {
            debug!(after, "no reference entry, pushing at the end");
            if after {
                self.push_tail(value);
            } else {
                self.push_head(value);
            }
            return;
        };
        debug_assert_eq!(
            entry.stamp, self.stamp,
            "quicklist entry used after the list was modified"
        );

        let node = entry.node;
        let (node_count, prev, next) = {
            let n = self.node(node);
            (n.count as i64, n.prev, n.next)
        };
        let offset = if entry.offset < 0 {
            entry.offset + node_count
        } else {
            entry.offset
        };

        let full = !self.allow_insert(Some(node), sz);
        let at_tail = after && offset == node_count - 1;
        let at_head = !after && offset == 0;
        let full_next = at_tail && !self.allow_insert(next, sz);
        let full_prev = at_head && !self.allow_insert(prev, sz);

        if !full {
            debug!(after, "insert into current node");
            self.decompress_node_for_use(node);
            let n = self.node_mut(node);
            let zl = n.ziplist_mut();
            if after {
                match zl.next_entry_position(entry.zi) {
                    Some(pos) => zl.insert(pos, value),
                    None => zl.push(value, false),
                }
            } else {
                zl.insert(entry.zi, value);
            }
            n.count += 1;
            n.update_sz();
            self.recompress_only(node);
        } else if let Some(next) = next.filter(|_| at_tail && !full_next) {
            debug!("full and tail, but next isn't full; inserting next node head");
            self.decompress_node_for_use(next);
            self.node_mut(next).push(value, true);
            self.recompress_only(next);
            self.recompress_only(node);
        } else if let Some(prev) = prev.filter(|_| at_head && !full_prev) {
            debug!("full and head, but prev isn't full; inserting prev node tail");
            self.decompress_node_for_use(prev);
            self.node_mut(prev).push(value, false);
            self.recompress_only(prev);
            self.recompress_only(node);
        } else if (at_tail && next.is_some()) || (at_head && prev.is_some()) {
            debug!("full and neighbour full; creating new node");
            let mut new_node = QuickListNode::create();
            new_node.push(value, true);
            let id = self.alloc(new_node);
            self.insert_node(Some(node), id, after);
        } else {
            debug!(offset, after, "full node; splitting");
            self.decompress_node_for_use(node);
            let new_node = self.split_node(node, offset as usize, after);
            self.node_mut(new_node).push(value, after);
            self.insert_node(Some(node), new_node, after);
            self.merge_nodes(node);
        }

        self.count += 1;
        self.touch();
    }

    /// Splits `id` at `offset`. The returned node holds the entries after
    /// `offset` when `after` is set, else the entries before it; `id`
    /// keeps the rest. The new node is not linked.
    fn split_node(&mut self, id: NodeId, offset: usize, after: bool) -> NodeId {
        let (orig_start, orig_extent) = if after {
            (offset + 1, usize::MAX)
        } else {
            (0, offset)
        };
        let (new_start, new_extent) = if after {
            (0, offset + 1)
        } else {
            (offset, usize::MAX)
        };

        let node = self.node_mut(id);
        let zl = node.ziplist_mut();
        let mut copy = zl.clone();
        zl.delete_range(orig_start as i64, orig_extent);
        let remaining = zl.len() as u32;
        node.count = remaining;
        node.update_sz();

        copy.delete_range(new_start as i64, new_extent);
        debug!(
            orig_start,
            orig_extent,
            new_start,
            new_extent,
            orig_count = remaining,
            new_count = copy.len(),
            "split node"
        );
        self.alloc(QuickListNode::from_ziplist(copy))
    }

    /// Tries to merge the nodes around `center`:
    /// (prev.prev, prev), (next, next.next), (prev, center), (center, next).
    fn merge_nodes(&mut self, center: NodeId) {
        let (prev, next) = self.neighbours(center);
        let prev_prev = prev.and_then(|p| self.node(p).prev);
        let next_next = next.and_then(|n| self.node(n).next);

        if let (Some(a), Some(b)) = (prev_prev, prev) {
            if self.allow_merge(a, b) {
                debug!("merging prev_prev and prev");
                self.merge_pair(a, b);
            }
        }

        if let (Some(a), Some(b)) = (next, next_next) {
            if self.allow_merge(a, b) {
                debug!("merging next and next_next");
                self.merge_pair(a, b);
            }
        }

        let mut target = center;
        if let Some(prev) = self.node(center).prev {
            if self.allow_merge(prev, center) {
                debug!("merging prev and center");
                target = self.merge_pair(prev, center);
            }
        }

        if let Some(next) = self.node(target).next {
            if self.allow_merge(target, next) {
                debug!("merging target and next");
                self.merge_pair(target, next);
            }
        }
    }

    /// Moves the entries of `b` onto the end of `a` and frees `b`. Returns
    /// the surviving node.
    fn merge_pair(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.decompress_node(Some(a));
        self.decompress_node(Some(b));

        let a_zl = std::mem::take(self.ziplist_mut(a));
        let b_zl = std::mem::take(self.ziplist_mut(b));
        let count = self.node(a).count + self.node(b).count;

        let keep = self.node_mut(a);
        keep.data = NodeData::Raw(ZipList::merge(a_zl, b_zl));
        keep.count = count;
        keep.update_sz();

        // entries moved to `a`, so freeing `b` must not drop them again
        self.node_mut(b).count = 0;
        self.del_node(b);

        self.compress(a);
        a
    }

    /// Reads the entry at `zi` in node `id`; the node must be raw.
    pub(crate) fn entry_at(&mut self, id: NodeId, zi: usize, offset: i64) -> Option<QuickListEntry> {
        let stamp = self.stamp;
        let value = QuickListValue::from(self.ziplist_mut(id).get(zi)?);
        Some(QuickListEntry {
            node: id,
            zi,
            offset,
            value,
            stamp,
        })
    }

    /// Finds the entry at `idx`; negative indexes count from the tail. The
    /// node holding it is left decompressed for use.
    pub fn index(&mut self, idx: i64) -> Option<QuickListEntry> {
        let forward = idx >= 0;
        let index = if forward {
            idx as u64
        } else {
            (-(idx + 1)) as u64
        };
        if index >= self.count {
            return None;
        }

        let mut n = if forward { self.head } else { self.tail };
        let mut accum = 0u64;
        while let Some(id) = n {
            let node = self.node(id);
            if accum + node.count as u64 > index {
                break;
            }
            accum += node.count as u64;
            n = if forward { node.next } else { node.prev };
        }
        let id = n?;

        let offset = if forward {
            (index - accum) as i64
        } else {
            -((index - accum) as i64) - 1
        };
        self.decompress_node_for_use(id);
        let zi = self.ziplist_mut(id).zip_index(offset)?;
        self.entry_at(id, zi, offset)
    }

    /// Value at `idx`, leaving the node's compression as it was.
    pub fn get(&mut self, idx: i64) -> Option<QuickListValue> {
        let entry = self.index(idx)?;
        self.recompress_only(entry.node);
        Some(entry.value)
    }

    /// Overwrites the entry at `idx`. Returns false if `idx` is out of
    /// range.
    pub fn replace_at_index(&mut self, idx: i64, value: &[u8]) -> bool {
        let Some(entry) = self.index(idx) else {
            return false;
        };
        self.replace_entry(&entry, value);
        true
    }

    /// Overwrites the entry `entry` points at.
    pub fn replace_entry(&mut self, entry: &QuickListEntry, value: &[u8]) {
        debug_assert_eq!(
            entry.stamp, self.stamp,
            "quicklist entry used after the list was modified"
        );
        let node = self.node_mut(entry.node);
        let zl = node.ziplist_mut();
        zl.delete(entry.zi);
        zl.insert(entry.zi, value);
        node.update_sz();
        self.compress(entry.node);
        self.touch();
    }

    /// Deletes `count` entries starting at `start`; negative starts count
    /// from the tail. Returns false if nothing was deleted.
    pub fn del_range(&mut self, start: i64, count: i64) -> bool {
        if count <= 0 {
            return false;
        }

        let mut extent = count as u64;
        if start >= 0 {
            extent = extent.min(self.count.saturating_sub(start as u64));
        } else {
            extent = extent.min(start.unsigned_abs());
        }

        let Some(entry) = self.index(start) else {
            return false;
        };
        let mut node = Some(entry.node);
        let mut offset = entry.offset;

        while extent > 0 {
            let Some(id) = node else {
                break;
            };
            let (node_count, next) = {
                let n = self.node(id);
                (n.count as u64, n.next)
            };

            let mut delete_entire_node = false;
            let del = if offset == 0 && extent >= node_count {
                delete_entire_node = true;
                node_count
            } else if offset >= 0 && extent + offset as u64 >= node_count {
                node_count - offset as u64
            } else if offset < 0 {
                offset.unsigned_abs().min(extent)
            } else {
                extent
            };

            debug!(
                extent,
                del,
                offset,
                node_count,
                delete_entire_node,
                "deleting range"
            );

            if delete_entire_node {
                self.del_node(id);
            } else {
                self.decompress_node_for_use(id);
                let n = self.node_mut(id);
                n.ziplist_mut().delete_range(offset, del as usize);
                n.update_sz();
                n.count -= del as u32;
                let empty = n.count == 0;
                self.count -= del;
                if empty {
                    self.del_node(id);
                } else {
                    self.recompress_only(id);
                }
            }

            extent -= del;
            node = next;
            offset = 0;
        }
        self.touch();
        true
    }

    /// Moves the tail entry to the head.
    pub fn rotate(&mut self) {
        if self.count <= 1 {
            return;
        }
        let Some(tail) = self.tail else {
            return;
        };

        let value = {
            let zl = self.ziplist_mut(tail);
            let Some(pos) = zl.zip_index(-1) else {
                return;
            };
            match zl.get(pos) {
                Some(ZipValue::Str(s)) => s.to_vec(),
                Some(ZipValue::Int(v)) => v.to_string().into_bytes(),
                None => return,
            }
        };

        self.push_head(&value);

        // the push may have landed in the tail node when there is only one
        let Some(tail) = self.tail else {
            return;
        };
        if let Some(pos) = self.ziplist_mut(tail).zip_index(-1) {
            self.del_index(tail, pos);
        }
        self.touch();
    }

    /// Pops an entry, handing string payloads to `saver`.
    pub fn pop_custom<T, F>(&mut self, place: Where, saver: F) -> Option<Popped<T>>
    where
        F: FnOnce(&[u8]) -> T,
    {
        if self.count == 0 {
            return None;
        }
        let (id, pos) = match place {
            Where::Head => (self.head?, 0),
            Where::Tail => (self.tail?, -1),
        };

        let zl = self.ziplist_mut(id);
        let zi = zl.zip_index(pos)?;
        let popped = match zl.get(zi)? {
            ZipValue::Str(s) => Popped::Value(saver(s)),
            ZipValue::Int(v) => Popped::Int(v),
        };
        self.del_index(id, zi);
        self.touch();
        Some(popped)
    }

    pub fn pop(&mut self, place: Where) -> Option<QuickListValue> {
        match self.pop_custom(place, bytes::Bytes::copy_from_slice)? {
            Popped::Value(s) => Some(QuickListValue::Str(s)),
            Popped::Int(v) => Some(QuickListValue::Int(v)),
        }
    }

    /// Deep copy. Nodes are copied as they are, compressed or not.
    pub fn dup(&self) -> Self {
        let mut copy = Self::create();
        copy.fill = self.fill;
        copy.compress = self.compress;

        let mut cur = self.head;
        while let Some(id) = cur {
            let node = self.node(id);
            let new = copy.alloc(node.duplicate());
            copy.link_tail(new);
            copy.count += node.count as u64;
            cur = node.next;
        }
        copy
    }

    /// Appends a node without re-running the compression policy.
    fn link_tail(&mut self, id: NodeId) {
        self.node_mut(id).prev = self.tail;
        match self.tail {
            Some(tail) => self.node_mut(tail).next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
    }

    pub fn iter(&mut self, direction: Direction) -> QuickListIter<'_> {
        let (current, offset) = match direction {
            Direction::StartHead => (self.head, 0),
            Direction::StartTail => (self.tail, -1),
        };
        QuickListIter::new(self, current, offset, direction)
    }

    /// Iterator whose first entry is the one at `idx`.
    pub fn iter_at(&mut self, direction: Direction, idx: i64) -> Option<QuickListIter<'_>> {
        let entry = self.index(idx)?;
        let count = self.node(entry.node).count as i64;
        // head first iteration counts offsets up from 0, tail first down
        // from -1
        let offset = match direction {
            Direction::StartHead if entry.offset < 0 => entry.offset + count,
            Direction::StartTail if entry.offset >= 0 => entry.offset - count,
            _ => entry.offset,
        };
        Some(QuickListIter::new(self, Some(entry.node), offset, direction))
    }
}
