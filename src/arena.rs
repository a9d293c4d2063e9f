//! Backing storage for a document tree.
//!
//! An [Arena] owns every node of a tree along with the bytes of every string in it. Nodes live
//! in a single growable vector and are addressed by [NodeId]; string contents are appended to a
//! single text buffer and addressed by [StrRef]. Nothing is ever freed individually: replacing
//! or removing part of a tree simply leaves the old nodes unreachable until the whole arena is
//! dropped along with its owning [crate::document::Document].
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::errors::{DomError, DomResult};

/// Source of per-arena tags, used to detect handles presented to the wrong document. Shared by
/// every thread, since documents may move between them
static NEXT_ARENA_TAG: AtomicU32 = AtomicU32::new(1);

fn next_arena_tag() -> u32 {
    NEXT_ARENA_TAG.fetch_add(1, Ordering::Relaxed)
}

/// A handle to a single node within an [Arena]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId {
    arena: u32,
    index: usize,
}

/// A reference to a run of string bytes within an [Arena]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StrRef {
    offset: usize,
    len: usize,
}

impl StrRef {
    /// Length of the referenced string, in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A single key/value pair within an object node
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Member {
    pub key: StrRef,
    pub value: NodeId,
}

/// The discriminated union stored for every node. Exactly one representation is active, and
/// containers refer to their children by [NodeId]
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i32),
    Int64(i64),
    Double(f64),
    String(StrRef),
    /// Elements in insertion order
    Array(Vec<NodeId>),
    /// Members in insertion order, keys not necessarily unique
    Object(Vec<Member>),
}

/// Simple allocation counters for an [Arena]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ArenaStats {
    /// Total nodes allocated, reachable or not
    pub nodes: usize,
    /// Total bytes of string data held
    pub string_bytes: usize,
}

impl Display for ArenaStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "nodes: {}, string bytes: {}", self.nodes, self.string_bytes)
    }
}

/// Growable node and string storage for a single document
#[derive(Debug)]
pub struct Arena {
    tag: u32,
    nodes: Vec<Node>,
    text: String,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    pub fn new() -> Self {
        Arena {
            tag: next_arena_tag(),
            nodes: vec![],
            text: String::new(),
        }
    }

    /// Allocate a new node, returning its handle
    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId {
            arena: self.tag,
            index: self.nodes.len() - 1,
        }
    }

    /// Copy a string into the arena
    pub(crate) fn alloc_str(&mut self, value: &str) -> StrRef {
        let offset = self.text.len();
        self.text.push_str(value);
        StrRef {
            offset,
            len: value.len(),
        }
    }

    /// Check that a handle was issued by this arena
    pub(crate) fn check(&self, id: NodeId) -> DomResult<NodeId> {
        if id.arena == self.tag && id.index < self.nodes.len() {
            Ok(id)
        } else {
            Err(DomError::ForeignHandle)
        }
    }

    /// Look up a node. Handles are only ever produced by this arena (see [Arena::check]), so
    /// the index is always in range
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index]
    }

    /// Resolve a string reference
    pub(crate) fn str(&self, s: StrRef) -> &str {
        &self.text[s.offset..s.offset + s.len]
    }

    /// Deep copy the subtree rooted at `id`, returning the content for a new node. Strings are
    /// immutable once written, so the copy shares them with the original
    pub(crate) fn duplicate(&mut self, id: NodeId) -> Node {
        let root = self.node(id).clone();
        self.copy_tree(root, |arena, child| arena.node(child).clone())
    }

    /// Deep copy a subtree held by a *different* arena into this one, copying string data across
    pub(crate) fn transplant(&mut self, source: &Arena, id: NodeId) -> Node {
        let root = self.translate(source, id);
        self.copy_tree(root, |arena, child| arena.translate(source, child))
    }

    /// The content of a node from `source`, with its strings copied into this arena. Any
    /// children still refer to nodes within `source`
    fn translate(&mut self, source: &Arena, id: NodeId) -> Node {
        match source.node(id) {
            Node::String(s) => Node::String(self.alloc_str(source.str(*s))),
            Node::Object(members) => Node::Object(
                members
                    .iter()
                    .map(|member| Member {
                        key: self.alloc_str(source.str(member.key)),
                        value: member.value,
                    })
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Breadth of copying is driven by an explicit worklist, so trees of any depth can be
    /// copied. `copy` produces the shallow content for a source child; the children of that
    /// content are then relinked in turn
    fn copy_tree<F>(&mut self, mut root: Node, copy: F) -> Node
    where
        F: Fn(&mut Arena, NodeId) -> Node,
    {
        let mut pending = vec![];
        self.relink(&mut root, &copy, &mut pending);
        while let Some(id) = pending.pop() {
            let mut node = std::mem::replace(self.node_mut(id), Node::Null);
            self.relink(&mut node, &copy, &mut pending);
            *self.node_mut(id) = node;
        }
        root
    }

    fn relink<F>(&mut self, node: &mut Node, copy: &F, pending: &mut Vec<NodeId>)
    where
        F: Fn(&mut Arena, NodeId) -> Node,
    {
        let children: Vec<&mut NodeId> = match node {
            Node::Array(elements) => elements.iter_mut().collect(),
            Node::Object(members) => members.iter_mut().map(|m| &mut m.value).collect(),
            _ => return,
        };
        for child in children {
            let content = copy(self, *child);
            let container = matches!(content, Node::Array(_) | Node::Object(_));
            *child = self.alloc(content);
            if container {
                pending.push(*child);
            }
        }
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            nodes: self.nodes.len(),
            string_bytes: self.text.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::arena::{Arena, Member, Node};
    use crate::errors::DomError;

    #[test]
    fn strings_should_be_copied_into_the_arena() {
        let mut arena = Arena::new();
        let transient = String::from("transient");
        let s = arena.alloc_str(&transient);
        drop(transient);
        assert_eq!(arena.str(s), "transient");
        assert_eq!(arena.stats().string_bytes, 9);
    }

    #[test]
    fn handles_from_other_arenas_should_be_rejected() {
        let mut first = Arena::new();
        let mut second = Arena::new();
        let id = first.alloc(Node::Null);
        second.alloc(Node::Null);
        assert!(first.check(id).is_ok());
        assert_eq!(second.check(id), Err(DomError::ForeignHandle));
    }

    #[test]
    fn duplicates_should_not_share_nodes() {
        let mut arena = Arena::new();
        let key = arena.alloc_str("k");
        let leaf = arena.alloc(Node::Int(1));
        let object = arena.alloc(Node::Object(vec![Member { key, value: leaf }]));
        let copy = arena.duplicate(object);
        match copy {
            Node::Object(members) => {
                assert_eq!(members.len(), 1);
                assert_ne!(members[0].value, leaf);
                assert_eq!(arena.node(members[0].value), &Node::Int(1));
                assert_eq!(arena.str(members[0].key), "k");
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn transplants_should_copy_strings_across() {
        let mut source = Arena::new();
        let s = source.alloc_str("moved");
        let id = source.alloc(Node::String(s));
        let mut target = Arena::new();
        match target.transplant(&source, id) {
            Node::String(copied) => assert_eq!(target.str(copied), "moved"),
            other => panic!("unexpected node {:?}", other),
        }
        drop(source);
        assert_eq!(target.stats().string_bytes, 5);
    }

    #[test]
    fn deep_subtrees_should_copy_without_recursing() {
        let mut source = Arena::new();
        let key = source.alloc_str("k");
        let mut id = source.alloc(Node::Null);
        for _ in 0..200_000 {
            id = source.alloc(Node::Object(vec![Member { key, value: id }]));
        }
        let mut target = Arena::new();
        let mut node = target.transplant(&source, id);
        let mut depth = 0;
        while let Node::Object(members) = node {
            assert_eq!(target.str(members[0].key), "k");
            node = target.node(members[0].value).clone();
            depth += 1;
        }
        assert_eq!(depth, 200_000);
        assert_eq!(node, Node::Null);

        match source.duplicate(id) {
            Node::Object(members) => assert_ne!(members[0].value, id),
            other => panic!("unexpected node {:?}", other),
        }
        assert_eq!(source.stats().nodes, 2 * 200_001 - 1);
    }
}
