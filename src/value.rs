//! Views onto the nodes of a document.
//!
//! A [ValueRef] is a shared borrow of a document positioned at one node and provides the type
//! predicates, typed getters and navigation. A [ValueMut] is the exclusive counterpart and adds
//! the typed setters and container mutations. Both borrow the owning document, so neither can
//! outlive it, and neither survives a re-parse.
//!
//! Operations that don't make sense for the node's current type (asking a string for its
//! members, indexing past the end of an array, ...) return a [DomError] rather than panicking.
use std::fmt::{Debug, Display, Formatter};

use crate::arena::{Arena, Member, Node, NodeId};
use crate::errors::{DomError, DomResult};
use crate::paths::{as_index, DottedPath};
use crate::{type_mismatch, writer, JsonValue};

/// The discriminant of a node
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Int64,
    Double,
    String,
    Array,
    Object,
}

impl Kind {
    pub(crate) fn of(node: &Node) -> Kind {
        match node {
            Node::Null => Kind::Null,
            Node::Bool(_) => Kind::Bool,
            Node::Int(_) => Kind::Int,
            Node::Int64(_) => Kind::Int64,
            Node::Double(_) => Kind::Double,
            Node::String(_) => Kind::String,
            Node::Array(_) => Kind::Array,
            Node::Object(_) => Kind::Object,
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Int64 => "int64",
            Kind::Double => "double",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        };
        write!(f, "{}", name)
    }
}

/// A structural view of a value, shared by document nodes and freestanding [JsonValue]s so
/// that equality and serialization only need writing once. Integers of either width collapse
/// into a single case
pub(crate) enum Shape<'s, T> {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(&'s str),
    Array(Vec<T>),
    Object(Vec<(&'s str, T)>),
}

/// Cheap handles onto a value whose children are handles of the same kind, so trees can be
/// walked with an explicit stack
pub(crate) trait Shaped<'s>: Copy {
    fn shape(self) -> Shape<'s, Self>;
}

/// JSON value equality: arrays compare element-wise, objects as unordered multisets of
/// key/value pairs
pub(crate) fn equal<'l, 'r, A: Shaped<'l>, B: Shaped<'r>>(lhs: A, rhs: B) -> bool {
    let mut pending = vec![(lhs, rhs)];
    while let Some((lhs, rhs)) = pending.pop() {
        let same = match (lhs.shape(), rhs.shape()) {
            (Shape::Null, Shape::Null) => true,
            (Shape::Bool(l), Shape::Bool(r)) => l == r,
            (Shape::Integer(l), Shape::Integer(r)) => l == r,
            (Shape::Double(l), Shape::Double(r)) => l == r,
            (Shape::String(l), Shape::String(r)) => l == r,
            (Shape::Array(l), Shape::Array(r)) => {
                let same = l.len() == r.len();
                pending.extend(l.into_iter().zip(r));
                same
            }
            (Shape::Object(l), Shape::Object(r)) => {
                l.len() == r.len() && pair_members(&l, &r, &mut pending)
            }
            _ => false,
        };
        if !same {
            return false;
        }
    }
    true
}

/// Pair up the members of two objects with equal lengths, queueing the values of each pair for
/// comparison. A key that occurs once can only pair with the one member carrying it on the
/// other side. Duplicated keys need their values compared up front to find a partner, and
/// since equality is an equivalence, taking the first equal partner is enough
fn pair_members<'l, 'r, A: Shaped<'l>, B: Shaped<'r>>(
    lhs: &[(&'l str, A)],
    rhs: &[(&'r str, B)],
    pending: &mut Vec<(A, B)>,
) -> bool {
    let mut matched = vec![false; rhs.len()];
    for (key, value) in lhs.iter() {
        let duplicated = lhs.iter().filter(|(other, _)| other == key).count() > 1;
        let found = rhs.iter().enumerate().position(|(index, (other, candidate))| {
            !matched[index] && other == key && (!duplicated || equal(*value, *candidate))
        });
        match found {
            Some(index) => {
                matched[index] = true;
                if !duplicated {
                    pending.push((*value, rhs[index].1));
                }
            }
            None => return false,
        }
    }
    true
}

/// Take one step along a dotted path. Objects are searched for the first member with a
/// matching key, arrays are indexed when the segment is numeric
fn step(arena: &Arena, from: NodeId, segment: &str) -> Option<NodeId> {
    match arena.node(from) {
        Node::Object(members) => members
            .iter()
            .find(|m| arena.str(m.key) == segment)
            .map(|m| m.value),
        Node::Array(elements) => as_index(segment).and_then(|index| elements.get(index).copied()),
        _ => None,
    }
}

fn resolve(arena: &Arena, from: NodeId, path: &DottedPath) -> DomResult<NodeId> {
    path.segments()
        .iter()
        .try_fold(from, |current, segment| step(arena, current, segment))
        .ok_or_else(|| DomError::PathNotFound(path.to_string()))
}

/// Read-only view of a single node
#[derive(Copy, Clone)]
pub struct ValueRef<'a> {
    arena: &'a Arena,
    id: NodeId,
}

impl<'a> ValueRef<'a> {
    pub(crate) fn new(arena: &'a Arena, id: NodeId) -> Self {
        ValueRef { arena, id }
    }

    fn node(&self) -> &'a Node {
        self.arena.node(self.id)
    }

    /// The handle for this node, usable with [crate::Document::get] and as a source for
    /// assignments within the same document
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> Kind {
        Kind::of(self.node())
    }

    /// Numeric type code: null 0, false 1, true 2, object 3, array 4, string 5, number 6
    pub fn type_code(&self) -> u8 {
        match self.node() {
            Node::Null => 0,
            Node::Bool(false) => 1,
            Node::Bool(true) => 2,
            Node::Object(_) => 3,
            Node::Array(_) => 4,
            Node::String(_) => 5,
            Node::Int(_) | Node::Int64(_) | Node::Double(_) => 6,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.node(), Node::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self.node(), Node::Bool(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self.node(), Node::Int(_))
    }

    pub fn is_int64(&self) -> bool {
        matches!(self.node(), Node::Int64(_))
    }

    pub fn is_double(&self) -> bool {
        matches!(self.node(), Node::Double(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self.node(), Node::Int(_) | Node::Int64(_) | Node::Double(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self.node(), Node::String(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.node(), Node::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self.node(), Node::Object(_))
    }

    pub fn get_bool(&self) -> DomResult<bool> {
        match self.node() {
            Node::Bool(value) => Ok(*value),
            other => type_mismatch!(Kind::Bool, Kind::of(other)),
        }
    }

    pub fn get_int(&self) -> DomResult<i32> {
        match self.node() {
            Node::Int(value) => Ok(*value),
            other => type_mismatch!(Kind::Int, Kind::of(other)),
        }
    }

    /// Also accepts 32-bit integers, since widening them is lossless
    pub fn get_int64(&self) -> DomResult<i64> {
        match self.node() {
            Node::Int(value) => Ok(i64::from(*value)),
            Node::Int64(value) => Ok(*value),
            other => type_mismatch!(Kind::Int64, Kind::of(other)),
        }
    }

    pub fn get_double(&self) -> DomResult<f64> {
        match self.node() {
            Node::Double(value) => Ok(*value),
            other => type_mismatch!(Kind::Double, Kind::of(other)),
        }
    }

    /// The string contents, borrowed from the document
    pub fn get_string(&self) -> DomResult<&'a str> {
        match self.node() {
            Node::String(s) => Ok(self.arena.str(*s)),
            other => type_mismatch!(Kind::String, Kind::of(other)),
        }
    }

    fn element_ids(&self) -> DomResult<&'a [NodeId]> {
        match self.node() {
            Node::Array(elements) => Ok(elements),
            other => type_mismatch!(Kind::Array, Kind::of(other)),
        }
    }

    fn member_slots(&self) -> DomResult<&'a [Member]> {
        match self.node() {
            Node::Object(members) => Ok(members),
            other => type_mismatch!(Kind::Object, Kind::of(other)),
        }
    }

    pub fn array_size(&self) -> DomResult<usize> {
        Ok(self.element_ids()?.len())
    }

    pub fn get_array_value_at(&self, index: usize) -> DomResult<ValueRef<'a>> {
        let elements = self.element_ids()?;
        match elements.get(index) {
            Some(id) => Ok(ValueRef::new(self.arena, *id)),
            None => Err(DomError::IndexOutOfBounds {
                index,
                len: elements.len(),
            }),
        }
    }

    /// Iterate over the elements of an array, in order
    pub fn elements(&self) -> DomResult<impl Iterator<Item = ValueRef<'a>> + 'a> {
        let arena = self.arena;
        Ok(self
            .element_ids()?
            .iter()
            .map(move |id| ValueRef::new(arena, *id)))
    }

    /// Collect an array of integers. Fails on the first element that isn't an integer
    pub fn int_array(&self) -> DomResult<Vec<i64>> {
        self.elements()?.map(|element| element.get_int64()).collect()
    }

    /// Collect an array of strings. Fails on the first element that isn't a string
    pub fn string_array(&self) -> DomResult<Vec<&'a str>> {
        self.elements()?.map(|element| element.get_string()).collect()
    }

    /// Linear scan for a member with the given key. Always `false` for anything other than
    /// an object
    pub fn has_member(&self, key: &str) -> bool {
        match self.node() {
            Node::Object(members) => members.iter().any(|m| self.arena.str(m.key) == key),
            _ => false,
        }
    }

    /// The *first* member with a matching key
    pub fn get_member(&self, key: &str) -> DomResult<ValueRef<'a>> {
        self.member_slots()?
            .iter()
            .find(|m| self.arena.str(m.key) == key)
            .map(|m| ValueRef::new(self.arena, m.value))
            .ok_or_else(|| DomError::MemberNotFound(key.to_string()))
    }

    pub fn member_count(&self) -> DomResult<usize> {
        Ok(self.member_slots()?.len())
    }

    /// The key of the member at a given position, in insertion order
    pub fn get_member_name(&self, index: usize) -> DomResult<&'a str> {
        let members = self.member_slots()?;
        match members.get(index) {
            Some(m) => Ok(self.arena.str(m.key)),
            None => Err(DomError::IndexOutOfBounds {
                index,
                len: members.len(),
            }),
        }
    }

    pub fn member_names(&self) -> DomResult<Vec<&'a str>> {
        Ok(self.members()?.map(|(key, _)| key).collect())
    }

    /// Iterate over the members of an object, in insertion order
    pub fn members(&self) -> DomResult<impl Iterator<Item = (&'a str, ValueRef<'a>)> + 'a> {
        let arena = self.arena;
        Ok(self
            .member_slots()?
            .iter()
            .map(move |m| (arena.str(m.key), ValueRef::new(arena, m.value))))
    }

    /// Follow a dotted path such as `member3.sub1` or `member2.0`
    pub fn get_path(&self, path: &str) -> DomResult<ValueRef<'a>> {
        let path = DottedPath::parse(path);
        Ok(ValueRef::new(
            self.arena,
            resolve(self.arena, self.id, &path)?,
        ))
    }

    pub fn path_exists(&self, path: &str) -> bool {
        self.get_path(path).is_ok()
    }

    /// Serialize the subtree rooted at this node
    pub fn to_json_string(&self) -> String {
        writer::to_json_string(*self)
    }

    /// Deep copy the subtree into a freestanding value that doesn't borrow the document
    pub fn to_value(&self) -> JsonValue {
        let arena = self.arena;
        let mut stack: Vec<Converting<'a>> = vec![];
        let mut next = Some(self.id);
        loop {
            let mut finished = next.take().and_then(|id| match arena.node(id) {
                Node::Array(elements) => {
                    stack.push(Converting::Array(elements.iter(), vec![]));
                    None
                }
                Node::Object(members) => {
                    stack.push(Converting::Object(members.iter(), "", vec![]));
                    None
                }
                Node::Null => Some(JsonValue::Null),
                Node::Bool(value) => Some(JsonValue::Boolean(*value)),
                Node::Int(value) => Some(JsonValue::Integer(*value)),
                Node::Int64(value) => Some(JsonValue::Integer64(*value)),
                Node::Double(value) => Some(JsonValue::Float(*value)),
                Node::String(s) => Some(JsonValue::String(arena.str(*s).to_string())),
            });
            while next.is_none() {
                let top = match stack.last_mut() {
                    Some(top) => top,
                    None => return finished.unwrap_or(JsonValue::Null),
                };
                if let Some(value) = finished.take() {
                    top.accept(value);
                }
                next = top.advance(arena);
                if next.is_none() {
                    finished = stack.pop().map(Converting::finish);
                }
            }
        }
    }
}

/// A container part way through conversion into a [JsonValue]
enum Converting<'a> {
    Array(std::slice::Iter<'a, NodeId>, Vec<JsonValue>),
    /// Remaining members, the key of the member being converted, and the converted members
    Object(std::slice::Iter<'a, Member>, &'a str, Vec<(String, JsonValue)>),
}

impl<'a> Converting<'a> {
    fn accept(&mut self, value: JsonValue) {
        match self {
            Converting::Array(_, done) => done.push(value),
            Converting::Object(_, key, done) => done.push((key.to_string(), value)),
        }
    }

    fn advance(&mut self, arena: &'a Arena) -> Option<NodeId> {
        match self {
            Converting::Array(rest, _) => rest.next().copied(),
            Converting::Object(rest, key, _) => rest.next().map(|member| {
                *key = arena.str(member.key);
                member.value
            }),
        }
    }

    fn finish(self) -> JsonValue {
        match self {
            Converting::Array(_, done) => JsonValue::Array(done),
            Converting::Object(_, _, done) => JsonValue::Object(done),
        }
    }
}

impl<'a> Shaped<'a> for ValueRef<'a> {
    fn shape(self) -> Shape<'a, Self> {
        match self.node() {
            Node::Null => Shape::Null,
            Node::Bool(value) => Shape::Bool(*value),
            Node::Int(value) => Shape::Integer(i64::from(*value)),
            Node::Int64(value) => Shape::Integer(*value),
            Node::Double(value) => Shape::Double(*value),
            Node::String(s) => Shape::String(self.arena.str(*s)),
            Node::Array(elements) => Shape::Array(
                elements
                    .iter()
                    .map(|id| ValueRef::new(self.arena, *id))
                    .collect(),
            ),
            Node::Object(members) => Shape::Object(
                members
                    .iter()
                    .map(|m| (self.arena.str(m.key), ValueRef::new(self.arena, m.value)))
                    .collect(),
            ),
        }
    }
}

impl PartialEq for ValueRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        equal(*self, *other)
    }
}

impl PartialEq<JsonValue> for ValueRef<'_> {
    fn eq(&self, other: &JsonValue) -> bool {
        equal(*self, other)
    }
}

impl Display for ValueRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writer::write_value(*self, f)
    }
}

impl Debug for ValueRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ValueRef({})", self)
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Anything that can be written into a document: handles to other nodes of the same document,
/// views onto other documents, freestanding values and plain Rust scalars. Every source is
/// deep copied into the receiving document, strings included
pub trait IntoNode: sealed::Sealed {
    #[doc(hidden)]
    fn into_node(self, arena: &mut Arena) -> DomResult<Node>;
}

impl sealed::Sealed for NodeId {}
impl IntoNode for NodeId {
    fn into_node(self, arena: &mut Arena) -> DomResult<Node> {
        let id = arena.check(self)?;
        Ok(arena.duplicate(id))
    }
}

impl sealed::Sealed for ValueRef<'_> {}
impl IntoNode for ValueRef<'_> {
    fn into_node(self, arena: &mut Arena) -> DomResult<Node> {
        Ok(arena.transplant(self.arena, self.id))
    }
}

/// Build the node content for a freestanding value, allocating any children. Children are
/// allocated as placeholders first and filled in from a worklist
pub(crate) fn build(arena: &mut Arena, value: &JsonValue) -> Node {
    let mut pending = vec![];
    let root = build_shallow(arena, value, &mut pending);
    while let Some((id, value)) = pending.pop() {
        let node = build_shallow(arena, value, &mut pending);
        *arena.node_mut(id) = node;
    }
    root
}

fn build_shallow<'v>(
    arena: &mut Arena,
    value: &'v JsonValue,
    pending: &mut Vec<(NodeId, &'v JsonValue)>,
) -> Node {
    let mut placeholder = |arena: &mut Arena, value: &'v JsonValue| {
        let id = arena.alloc(Node::Null);
        pending.push((id, value));
        id
    };
    match value {
        JsonValue::Null => Node::Null,
        JsonValue::Boolean(value) => Node::Bool(*value),
        JsonValue::Integer(value) => Node::Int(*value),
        JsonValue::Integer64(value) => Node::Int64(*value),
        JsonValue::Float(value) => Node::Double(*value),
        JsonValue::String(s) => Node::String(arena.alloc_str(s)),
        JsonValue::Array(elements) => Node::Array(
            elements
                .iter()
                .map(|element| placeholder(arena, element))
                .collect(),
        ),
        JsonValue::Object(pairs) => Node::Object(
            pairs
                .iter()
                .map(|(key, value)| Member {
                    key: arena.alloc_str(key),
                    value: placeholder(arena, value),
                })
                .collect(),
        ),
    }
}

impl sealed::Sealed for &JsonValue {}
impl IntoNode for &JsonValue {
    fn into_node(self, arena: &mut Arena) -> DomResult<Node> {
        Ok(build(arena, self))
    }
}

impl sealed::Sealed for JsonValue {}
impl IntoNode for JsonValue {
    fn into_node(self, arena: &mut Arena) -> DomResult<Node> {
        Ok(build(arena, &self))
    }
}

macro_rules! scalar_into_node {
    ($t: ty, $variant: path) => {
        impl sealed::Sealed for $t {}
        impl IntoNode for $t {
            fn into_node(self, _arena: &mut Arena) -> DomResult<Node> {
                Ok($variant(self))
            }
        }
    };
}

scalar_into_node!(bool, Node::Bool);
scalar_into_node!(i32, Node::Int);
scalar_into_node!(i64, Node::Int64);
scalar_into_node!(f64, Node::Double);

impl sealed::Sealed for &str {}
impl IntoNode for &str {
    fn into_node(self, arena: &mut Arena) -> DomResult<Node> {
        Ok(Node::String(arena.alloc_str(self)))
    }
}

impl sealed::Sealed for String {}
impl IntoNode for String {
    fn into_node(self, arena: &mut Arena) -> DomResult<Node> {
        Ok(Node::String(arena.alloc_str(&self)))
    }
}

/// Mutable view of a single node
pub struct ValueMut<'a> {
    arena: &'a mut Arena,
    id: NodeId,
}

impl<'a> ValueMut<'a> {
    pub(crate) fn new(arena: &'a mut Arena, id: NodeId) -> Self {
        ValueMut { arena, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Reborrow as a read-only view
    pub fn view(&self) -> ValueRef<'_> {
        ValueRef::new(self.arena, self.id)
    }

    /// Give up mutable access in exchange for a read-only view with the same lifetime
    pub fn into_view(self) -> ValueRef<'a> {
        let ValueMut { arena, id } = self;
        ValueRef::new(arena, id)
    }

    /// Replace the node content outright. Any previous children become unreachable
    fn replace(&mut self, node: Node) {
        *self.arena.node_mut(self.id) = node;
    }

    pub fn set_null(&mut self) {
        self.replace(Node::Null)
    }

    pub fn set_bool(&mut self, value: bool) {
        self.replace(Node::Bool(value))
    }

    pub fn set_int(&mut self, value: i32) {
        self.replace(Node::Int(value))
    }

    pub fn set_int64(&mut self, value: i64) {
        self.replace(Node::Int64(value))
    }

    pub fn set_double(&mut self, value: f64) {
        self.replace(Node::Double(value))
    }

    /// Copy the given string into the document and make this node a string
    pub fn set_string(&mut self, value: &str) {
        let s = self.arena.alloc_str(value);
        self.replace(Node::String(s))
    }

    /// Assign a deep copy of `source` to this node. The source may be this node or one of its
    /// ancestors; the copy is taken before anything is overwritten
    pub fn set_value(&mut self, source: impl IntoNode) -> DomResult<()> {
        let node = source.into_node(self.arena)?;
        self.replace(node);
        Ok(())
    }

    /// Reset to an empty array
    pub fn init_array(&mut self) {
        self.replace(Node::Array(vec![]))
    }

    /// Reset to an empty object
    pub fn init_object(&mut self) {
        self.replace(Node::Object(vec![]))
    }

    fn element_ids_mut(&mut self) -> DomResult<&mut Vec<NodeId>> {
        match self.arena.node_mut(self.id) {
            Node::Array(elements) => Ok(elements),
            other => type_mismatch!(Kind::Array, Kind::of(other)),
        }
    }

    fn member_slots_mut(&mut self) -> DomResult<&mut Vec<Member>> {
        match self.arena.node_mut(self.id) {
            Node::Object(members) => Ok(members),
            other => type_mismatch!(Kind::Object, Kind::of(other)),
        }
    }

    /// Append a deep copy of `source` to the end of this array
    pub fn append(&mut self, source: impl IntoNode) -> DomResult<()> {
        self.element_ids_mut()?;
        let node = source.into_node(self.arena)?;
        let element = self.arena.alloc(node);
        self.element_ids_mut()?.push(element);
        Ok(())
    }

    /// Remove the element at `index`, shifting everything after it down by one
    pub fn array_remove(&mut self, index: usize) -> DomResult<()> {
        let elements = self.element_ids_mut()?;
        if index >= elements.len() {
            return Err(DomError::IndexOutOfBounds {
                index,
                len: elements.len(),
            });
        }
        elements.remove(index);
        Ok(())
    }

    pub fn get_array_value_at_mut(&mut self, index: usize) -> DomResult<ValueMut<'_>> {
        let element = self.view().get_array_value_at(index)?.id();
        Ok(ValueMut::new(self.arena, element))
    }

    /// Append a member. The key is copied into the document and duplicates are not checked for
    pub fn add_member(&mut self, key: &str, source: impl IntoNode) -> DomResult<()> {
        self.member_slots_mut()?;
        let key = self.arena.alloc_str(key);
        let node = source.into_node(self.arena)?;
        let value = self.arena.alloc(node);
        self.member_slots_mut()?.push(Member { key, value });
        Ok(())
    }

    /// Overwrite the first member with a matching key, or append a new member when there is none
    pub fn set_member(&mut self, key: &str, source: impl IntoNode) -> DomResult<()> {
        let existing = match self.view().get_member(key) {
            Ok(existing) => Some(existing.id()),
            Err(DomError::MemberNotFound(_)) => None,
            Err(err) => return Err(err),
        };
        match existing {
            Some(existing) => ValueMut::new(self.arena, existing).set_value(source),
            None => self.add_member(key, source),
        }
    }

    /// Remove the first member with a matching key, preserving the order of the rest. Returns
    /// whether anything was removed
    pub fn remove_member(&mut self, key: &str) -> DomResult<bool> {
        let position = self
            .view()
            .member_slots()?
            .iter()
            .position(|m| self.arena.str(m.key) == key);
        match position {
            Some(index) => {
                self.member_slots_mut()?.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn get_member_mut(&mut self, key: &str) -> DomResult<ValueMut<'_>> {
        let member = self.view().get_member(key)?.id();
        Ok(ValueMut::new(self.arena, member))
    }

    pub fn get_path_mut(&mut self, path: &str) -> DomResult<ValueMut<'_>> {
        let target = self.view().get_path(path)?.id();
        Ok(ValueMut::new(self.arena, target))
    }

    /// Follow a dotted path, creating empty objects for any members that are missing along the
    /// way. Returns a view onto the final node
    pub fn get_path_or_create(&mut self, path: &str) -> DomResult<ValueMut<'_>> {
        let path = DottedPath::parse(path);
        let mut current = self.id;
        for segment in path.segments() {
            if let Some(next) = step(self.arena, current, segment) {
                current = next;
                continue;
            }
            match self.arena.node(current) {
                Node::Object(_) => (),
                Node::Array(elements) => {
                    return match as_index(segment) {
                        Some(index) => Err(DomError::IndexOutOfBounds {
                            index,
                            len: elements.len(),
                        }),
                        None => type_mismatch!(Kind::Object, Kind::Array),
                    }
                }
                other => return type_mismatch!(Kind::Object, Kind::of(other)),
            }
            let key = self.arena.alloc_str(segment);
            let child = self.arena.alloc(Node::Object(vec![]));
            ValueMut::new(self.arena, current)
                .member_slots_mut()?
                .push(Member { key, value: child });
            current = child;
        }
        Ok(ValueMut::new(self.arena, current))
    }

    /// Assign a deep copy of `source` at the end of a dotted path, creating intermediate objects
    pub fn set_path(&mut self, path: &str, source: impl IntoNode) -> DomResult<()> {
        self.get_path_or_create(path)?.set_value(source)
    }

    /// Remove whatever a dotted path points at from its parent container. Returns whether
    /// anything was removed
    pub fn remove_path(&mut self, path: &str) -> DomResult<bool> {
        let parsed = DottedPath::parse(path);
        let (last, parents) = match parsed.split_last() {
            Some(split) => split,
            None => return Err(DomError::PathNotFound(path.to_string())),
        };
        let parent = parents
            .iter()
            .try_fold(self.id, |current, segment| step(self.arena, current, segment))
            .ok_or_else(|| DomError::PathNotFound(path.to_string()))?;
        let mut parent = ValueMut::new(self.arena, parent);
        if parent.view().is_array() {
            let len = parent.view().array_size()?;
            match as_index(last) {
                Some(index) if index < len => {
                    parent.array_remove(index)?;
                    Ok(true)
                }
                _ => Ok(false),
            }
        } else {
            parent.remove_member(last)
        }
    }
}

impl Debug for ValueMut<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ValueMut({})", self.view())
    }
}
