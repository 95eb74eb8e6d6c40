//! Document outlines.
//!
//! Outline items are collected in a flat table together with a parent map
//! and a children map; the sentinel parent −1 denotes the top level. The
//! whole tree is serialized at finalization time, once page references are
//! known.

use std::collections::HashMap;

use pdf_writer::{Chunk, Finish, Name, Null, Ref, TextStr};

use crate::serialize::{OutlineId, PageId};

const TOP_LEVEL: i64 = -1;

#[derive(Debug, Clone)]
pub(crate) struct OutlineItem {
    pub(crate) title: String,
    pub(crate) destination: PageId,
}

/// The collected outline items of a document.
#[derive(Debug, Default)]
pub(crate) struct OutlineTree {
    items: Vec<OutlineItem>,
    parent: HashMap<i64, i64>,
    children: HashMap<i64, Vec<i64>>,
}

impl OutlineTree {
    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn add(
        &mut self,
        title: String,
        destination: PageId,
        parent: Option<OutlineId>,
    ) -> OutlineId {
        let id = self.items.len() as i64;
        let parent_id = parent.map(|p| p.0 as i64).unwrap_or(TOP_LEVEL);
        self.parent.insert(id, parent_id);
        self.children.entry(parent_id).or_default().push(id);
        self.items.push(OutlineItem { title, destination });
        OutlineId(id as usize)
    }

    /// Serialize all outline items plus the `/Outlines` root.
    ///
    /// `item_refs` holds one pre-allocated reference per item, `root_ref`
    /// the one of the root dictionary. `page_ref` resolves destinations.
    pub(crate) fn serialize(
        &self,
        item_refs: &[Ref],
        root_ref: Ref,
        page_ref: impl Fn(PageId) -> Ref,
    ) -> Chunk {
        let mut chunk = Chunk::new();

        for (id, item) in self.items.iter().enumerate() {
            let id = id as i64;
            let parent_id = self.parent[&id];
            let siblings = &self.children[&parent_id];

            let mut entry = chunk.outline_item(item_refs[id as usize]);

            if !item.title.is_empty() {
                entry.title(TextStr(&item.title));
            }

            let position = siblings.iter().position(|&s| s == id).unwrap();
            if position > 0 {
                entry.prev(item_refs[siblings[position - 1] as usize]);
            }
            if position + 1 < siblings.len() {
                entry.next(item_refs[siblings[position + 1] as usize]);
            }

            if let Some(children) = self.children.get(&id) {
                entry.first(item_refs[children[0] as usize]);
                entry.last(item_refs[*children.last().unwrap() as usize]);
                entry.count(-(children.len() as i32));
            }

            let parent_ref = if parent_id >= 0 {
                item_refs[parent_id as usize]
            } else {
                root_ref
            };
            entry.parent(parent_ref);

            let mut dest = entry.insert(Name(b"Dest")).array();
            dest.item(page_ref(item.destination));
            dest.item(Name(b"XYZ"));
            dest.item(Null);
            dest.item(Null);
            dest.item(Null);
            dest.finish();

            entry.finish();
        }

        let top_level = &self.children[&TOP_LEVEL];
        let mut outline = chunk.outline(root_ref);
        outline.first(item_refs[top_level[0] as usize]);
        outline.last(item_refs[*top_level.last().unwrap() as usize]);
        outline.count(top_level.len() as i32);
        outline.finish();

        chunk
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_structure_is_tracked() {
        let mut tree = OutlineTree::default();
        let top = tree.add("Chapter".into(), PageId(0), None);
        let child = tree.add("Section".into(), PageId(1), Some(top));
        tree.add("Subsection".into(), PageId(1), Some(child));
        tree.add("Chapter 2".into(), PageId(2), None);

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.children[&TOP_LEVEL], vec![0, 3]);
        assert_eq!(tree.children[&0], vec![1]);
        assert_eq!(tree.parent[&2], 1);
    }
}
