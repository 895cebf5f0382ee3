pub mod btree_index;
pub mod btree_iterator;
pub mod btree_page;
pub mod key;
pub mod key_comparator;

pub use btree_index::BPlusTree;
pub use btree_iterator::BTreeIterator;
pub use btree_page::{
    internal_capacity, leaf_capacity, page_kind, HeaderNode, HeaderNodeRef, InternalNode,
    InternalNodeRef, LeafNode, LeafNodeRef, PageKind,
};
pub use key::FixedKey;
pub use key_comparator::{BytewiseComparator, IntegerComparator, KeyComparator};
