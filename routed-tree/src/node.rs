//! The tree proxy: lazy, memoizing, route-aware access over content.

use core::cell::RefCell;
use core::fmt::{self, Debug, Formatter};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;

use crate::error::Error;
use crate::router::{Access, Router};
use crate::segment::{self, Segment};
use crate::trace::trace;
use crate::value::Value;

/// A node of a routed tree: a lazy proxy over one piece of content at one
/// path.
///
/// `Node` is a cheap handle; clones share the same state, including the
/// memo cache, so two accesses with the same key tuple always hand back the
/// identical result — the same node handle for structured children, even
/// when the resolved value was empty.
///
/// Nodes come to life either as a root wrapping externally supplied content
/// ([`Router::root`]) or lazily, the first time a key tuple is accessed on
/// a parent. The parent link is a weak back-reference: parents own their
/// cached children, never the other way around.
#[derive(Clone)]
pub struct Node {
    inner: Rc<NodeInner>,
}

struct NodeInner {
    router: Rc<Router>,
    parent: Option<Weak<NodeInner>>,
    /// Key tuple from the immediate same-kind parent; empty across a kind
    /// boundary.
    route: Box<[Segment]>,
    /// Accumulated route from the routing root of this kind. Computed at
    /// construction and immutable afterwards.
    full_route: Box<[Segment]>,
    contents: Option<Value>,
    cache: RefCell<HashMap<Box<[Segment]>, Entry>>,
}

/// The outcome of one access.
///
/// `Absent` is a legitimate, cacheable outcome — distinct from an explicit
/// `Value::Null` found in content — not an error.
#[derive(Clone, Debug)]
pub enum Entry {
    /// A structured child (or routed construction) wrapped as a node.
    Node(Node),
    /// A raw scalar found in content, or a scalar produced by a route.
    Value(Value),
    /// Nothing at this path.
    Absent,
}

impl Entry {
    /// Whether this access found nothing.
    pub fn is_absent(&self) -> bool {
        matches!(self, Entry::Absent)
    }

    /// The node, if the access produced one.
    pub fn node(&self) -> Option<&Node> {
        match self {
            Entry::Node(node) => Some(node),
            _ => None,
        }
    }

    /// The scalar value, if the access produced one.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Entry::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Consume into a node.
    pub fn into_node(self) -> Option<Node> {
        match self {
            Entry::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Consume into a scalar value.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Entry::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Plain-data rendering: nodes recurse, values pass through, absence
    /// becomes null.
    pub fn serialize(&self) -> Result<Value, Error> {
        match self {
            Entry::Node(node) => node.serialize(),
            Entry::Value(value) => Ok(value.clone()),
            Entry::Absent => Ok(Value::Null),
        }
    }
}

impl PartialEq for Entry {
    /// Nodes compare by handle identity (the memoization invariant), values
    /// by content, absence by itself.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Entry::Node(a), Entry::Node(b)) => a.ptr_eq(b),
            (Entry::Value(a), Entry::Value(b)) => a == b,
            (Entry::Absent, Entry::Absent) => true,
            _ => false,
        }
    }
}

impl From<Value> for Entry {
    fn from(value: Value) -> Self {
        Entry::Value(value)
    }
}

impl From<Node> for Entry {
    fn from(node: Node) -> Self {
        Entry::Node(node)
    }
}

impl Node {
    pub(crate) fn new(
        router: Rc<Router>,
        parent: Option<&Node>,
        keys: &[Segment],
        contents: Option<Value>,
    ) -> Node {
        let (route, full_route): (Box<[Segment]>, Box<[Segment]>) = match parent {
            // same-kind parents accumulate; a kind boundary resets both
            Some(p) if Rc::ptr_eq(&p.inner.router, &router) => {
                let route: Box<[Segment]> = keys.into();
                let full_route = p
                    .full_route()
                    .iter()
                    .chain(route.iter())
                    .cloned()
                    .collect();
                (route, full_route)
            }
            _ => (Box::from([]), Box::from([])),
        };

        Node {
            inner: Rc::new(NodeInner {
                router,
                parent: parent.map(|p| Rc::downgrade(&p.inner)),
                route,
                full_route,
                contents,
                cache: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// The router shared by every node of this kind.
    pub fn router(&self) -> &Rc<Router> {
        &self.inner.router
    }

    /// The parent node, if it exists and is still alive.
    pub fn parent(&self) -> Option<Node> {
        let weak = self.inner.parent.as_ref()?;
        weak.upgrade().map(|inner| Node { inner })
    }

    /// The key tuple that reached this node from its immediate same-kind
    /// parent. Empty at roots and across kind boundaries.
    pub fn route(&self) -> &[Segment] {
        &self.inner.route
    }

    /// The route accumulated from the routing root of this kind: the
    /// concatenation of each same-kind ancestor's own route, root to here.
    /// A node produced under a different kind starts a fresh accumulation.
    pub fn full_route(&self) -> &[Segment] {
        &self.inner.full_route
    }

    /// The raw content this node wraps, when it has any.
    pub fn contents(&self) -> Option<&Value> {
        self.inner.contents.as_ref()
    }

    /// Whether two handles are the same node.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether the other node shares this node's kind (routing table).
    pub fn same_kind(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.inner.router, &other.inner.router)
    }

    /// Access one key.
    pub fn get(&self, key: impl Into<Segment>) -> Result<Entry, Error> {
        self.get_at(&[key.into()])
    }

    /// Access a `/`-delimited path as one key tuple.
    pub fn get_path(&self, path: &str) -> Result<Entry, Error> {
        self.get_at(&Segment::parse_path(path))
    }

    /// Access a key tuple.
    ///
    /// Resolution order: the memo cache (exact tuple, absent and null
    /// results included), then the routing table at `full_route + keys`,
    /// then raw content — containers wrap in a same-kind child, scalars
    /// return verbatim, nothing is [`Entry::Absent`]. The outcome is cached
    /// so the same tuple always resolves to the identical entry; errors
    /// propagate and are not cached.
    pub fn get_at(&self, keys: &[Segment]) -> Result<Entry, Error> {
        if let Some(hit) = self.inner.cache.borrow().get(keys) {
            trace!(keys = %segment::join(keys), "access: cache hit");
            return Ok(hit.clone());
        }

        let mut full: Vec<Segment> = self.inner.full_route.to_vec();
        full.extend_from_slice(keys);

        let entry = match self.inner.router.resolve(&full) {
            Some(resolution) => {
                let router = self.inner.router.clone();
                router.apply(resolution, &Access { keys, parent: self })?
            }
            None => match self.contents_at(keys)? {
                Some(value) if value.is_container() => Entry::Node(Node::new(
                    self.inner.router.clone(),
                    Some(self),
                    keys,
                    Some(value),
                )),
                Some(value) => Entry::Value(value),
                None => Entry::Absent,
            },
        };

        self.inner
            .cache
            .borrow_mut()
            .insert(keys.into(), entry.clone());
        Ok(entry)
    }

    /// Walk the raw content one segment at a time, bypassing the routing
    /// table.
    ///
    /// Sequences index by position (numeric key text coerces; anything else
    /// is an indexing error). Maps try the kind's `key_transform` of the
    /// segment first, then the segment text as stored; first hit wins. A
    /// missing key or position yields `Ok(None)` and short-circuits the
    /// rest of the walk — silent absence, not a failure. Indexing *into* a
    /// scalar is an error carrying the offending segment, the container,
    /// and the full requested tuple.
    pub fn contents_at(&self, keys: &[Segment]) -> Result<Option<Value>, Error> {
        let mut current = self.inner.contents.clone();
        for seg in keys {
            let Some(cur) = current else {
                return Ok(None);
            };
            current = match &cur {
                Value::Array(items) => {
                    let index = seg
                        .as_index()
                        .ok_or_else(|| Error::indexing(seg, &cur, keys))?;
                    items.get(index).cloned()
                }
                Value::Object(map) => {
                    let text = seg.as_text();
                    let transformed = self.inner.router.kind().key_transform(&text);
                    map.get(transformed.as_str())
                        .or_else(|| map.get(text.as_str()))
                        .cloned()
                }
                scalar => return Err(Error::indexing(seg, scalar, keys)),
            };
        }
        Ok(current)
    }

    /// Whether this node wraps a sequence. Mutually exclusive with
    /// [`is_map_like`](Node::is_map_like).
    pub fn is_sequence_like(&self) -> bool {
        matches!(self.inner.contents, Some(Value::Array(_)))
    }

    /// Whether this node behaves as a map: it wraps one, or at least one
    /// configured child key resolves to real content.
    pub fn is_map_like(&self) -> Result<bool, Error> {
        if self.is_sequence_like() {
            return Ok(false);
        }
        if matches!(self.inner.contents, Some(Value::Object(_))) {
            return Ok(true);
        }
        Ok(!self.configured_child_keys()?.is_empty())
    }

    /// The keys of a map-like node: configured child keys with real
    /// content, then the untransformed raw content keys, deduplicated in
    /// that order. Errors with a usage error on nodes that are not
    /// map-like.
    pub fn keys(&self) -> Result<Vec<Segment>, Error> {
        if self.is_sequence_like() {
            return Err(Error::not_map_like(self.full_route()));
        }
        let virtual_keys = self.configured_child_keys()?;
        let content_map = match &self.inner.contents {
            Some(Value::Object(map)) => Some(map),
            _ => None,
        };
        if content_map.is_none() && virtual_keys.is_empty() {
            return Err(Error::not_map_like(self.full_route()));
        }

        let mut keys: IndexSet<Segment> = IndexSet::new();
        keys.extend(virtual_keys);
        if let Some(map) = content_map {
            let kind = self.inner.router.kind();
            for key in map.keys() {
                keys.insert(Segment::Key(kind.key_untransform(key)));
            }
        }
        Ok(keys.into_iter().collect())
    }

    /// Whether `keys()` contains the given key.
    pub fn contains_key(&self, key: impl Into<Segment>) -> Result<bool, Error> {
        let key = key.into();
        Ok(self.keys()?.contains(&key))
    }

    /// Configured child keys at this node's route whose resolved entry has
    /// real backing: present, non-null, and — for nodes carrying no content
    /// of their own — map-like with at least one key. Empty virtual
    /// branches stay invisible. The configuration slot is a trie field, not
    /// a child, so it can never show up here.
    fn configured_child_keys(&self) -> Result<Vec<Segment>, Error> {
        let Some(branch) = self.inner.router.branch_at(self.full_route()) else {
            return Ok(Vec::new());
        };
        let mut keep = Vec::new();
        for key in branch.child_keys() {
            let entry = self.get_at(core::slice::from_ref(key))?;
            let present = match &entry {
                Entry::Absent => false,
                Entry::Value(Value::Null) => false,
                Entry::Value(_) => true,
                Entry::Node(node) => {
                    node.contents().is_some() || (node.is_map_like()? && !node.keys()?.is_empty())
                }
            };
            if present {
                keep.push(key.clone());
            }
        }
        Ok(keep)
    }

    /// Element count of the raw content; `None` when the node wraps a
    /// scalar or nothing. Virtual keys do not count.
    pub fn len(&self) -> Option<usize> {
        self.inner.contents.as_ref().and_then(Value::len)
    }

    /// Whether the raw content is an empty container; `None` when there is
    /// no container to ask.
    pub fn is_empty(&self) -> Option<bool> {
        self.len().map(|len| len == 0)
    }

    /// Iterate this node's children.
    ///
    /// Sequence-like nodes yield `(Index(i), entry)` for each position;
    /// map-like nodes yield `(Key(k), entry)` for each key in [`keys()`]
    /// (untransformed form); scalar nodes yield nothing. Items are
    /// `Result`s because resolution stays lazy during iteration.
    ///
    /// [`keys()`]: Node::keys
    pub fn iter(&self) -> Result<Iter, Error> {
        let plan = if self.is_sequence_like() {
            Plan::Sequence {
                len: self.len().unwrap_or(0),
                next: 0,
            }
        } else if self.is_map_like()? {
            Plan::Map {
                keys: self.keys()?.into_iter(),
            }
        } else {
            Plan::Done
        };
        Ok(Iter {
            node: self.clone(),
            plan,
        })
    }

    /// Render this node as plain nested data: route resolution applies, so
    /// virtual keys, aliases, and computed routes all appear, and no node
    /// handles remain in the result.
    pub fn serialize(&self) -> Result<Value, Error> {
        if self.is_sequence_like() {
            let mut items = Vec::new();
            for item in self.iter()? {
                let (_, entry) = item?;
                items.push(entry.serialize()?);
            }
            Ok(Value::from(items))
        } else if self.is_map_like()? {
            let mut map: IndexMap<SmolStr, Value> = IndexMap::new();
            for item in self.iter()? {
                let (key, entry) = item?;
                map.insert(key.as_text(), entry.serialize()?);
            }
            Ok(Value::from(map))
        } else {
            Ok(self.inner.contents.clone().unwrap_or(Value::Null))
        }
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.inner.router.label())
            .field("full_route", &segment::join(&self.inner.full_route))
            .field("contents", &self.inner.contents)
            .finish()
    }
}

enum Plan {
    Sequence { len: usize, next: usize },
    Map { keys: std::vec::IntoIter<Segment> },
    Done,
}

/// Iterator over a node's children. See [`Node::iter`].
pub struct Iter {
    node: Node,
    plan: Plan,
}

impl std::fmt::Debug for Iter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Iter").finish_non_exhaustive()
    }
}

impl Iterator for Iter {
    type Item = Result<(Segment, Entry), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.plan {
            Plan::Sequence { len, next } => {
                if next < len {
                    let seg = Segment::Index(*next);
                    *next += 1;
                    Some(self.node.get(seg.clone()).map(|entry| (seg, entry)))
                } else {
                    None
                }
            }
            Plan::Map { keys } => {
                let seg = keys.next()?;
                Some(self.node.get(seg.clone()).map(|entry| (seg, entry)))
            }
            Plan::Done => None,
        }
    }
}
