//! Per-kind route registry: the configuration trie and the factory
//! strategies it resolves to.
//!
//! A [`Router`] holds the routing table for one node *kind* (one concrete
//! tree type). It is built once, up front, through [`RouterBuilder`], then
//! shared as `Rc<Router>` by every node of that kind; the `Rc` identity is
//! the kind identity. Routing tables are independent per kind — a node
//! produced under a different kind starts from that kind's own table.

use core::fmt::{self, Debug, Formatter};
use std::rc::Rc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::error::Error;
use crate::node::{Entry, Node};
use crate::segment::{self, Segment};
use crate::trace::trace;
use crate::value::Value;

/// Override points a concrete tree kind supplies.
///
/// The default implementations give an identity key mapping and no named
/// operations; implement this trait to translate between external and
/// stored key forms (say snake case against camel-case content) or to back
/// routes with computed values via [`Route::op`].
pub trait TreeKind {
    /// Translate an external key to the form used by stored content.
    fn key_transform(&self, key: &str) -> SmolStr {
        SmolStr::new(key)
    }

    /// Translate a stored-content key back to external form for
    /// enumeration.
    fn key_untransform(&self, key: &str) -> SmolStr {
        SmolStr::new(key)
    }

    /// Invoke a named operation on behalf of `node`, the node issuing the
    /// access. `Ok(None)` means the operation produced nothing; the default
    /// implementation knows no operations at all.
    fn invoke(&self, op: &str, node: &Node, keys: &[Segment]) -> Result<Option<Value>, Error> {
        let _ = (node, keys);
        Err(Error::unknown_operation(op))
    }
}

/// The identity [`TreeKind`]: no key translation, no operations.
#[derive(Debug, Default)]
pub struct DefaultKind;

impl TreeKind for DefaultKind {}

/// One access being resolved: the requested key tuple and the node that
/// issued the request. Handed to callable factories.
pub struct Access<'a> {
    /// The key tuple of the access, relative to `parent`.
    pub keys: &'a [Segment],
    /// The node the access was issued on.
    pub parent: &'a Node,
}

/// A resolved construction strategy for one path.
pub type Factory = Rc<dyn Fn(&Access<'_>) -> Result<Entry, Error>>;

/// The construction target of a route, fixed at registration time.
#[derive(Clone)]
pub(crate) enum Target {
    /// Construct a node of another kind.
    Kind(Rc<Router>),
    /// Invoke a closure; its result is used as-is.
    Callable(Factory),
    /// Invoke a named operation on the requesting node's kind.
    Op(SmolStr),
    /// Mirror content found at the first of these paths to resolve,
    /// relative to the routing root.
    Alias(Vec<Box<[Segment]>>),
}

impl Debug for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Target::Kind(router) => write!(f, "Kind({})", router.label()),
            Target::Callable(_) => f.write_str("Callable"),
            Target::Op(name) => write!(f, "Op({name})"),
            Target::Alias(paths) => {
                let rendered: Vec<String> = paths.iter().map(|p| segment::join(p)).collect();
                write!(f, "Alias({rendered:?})")
            }
        }
    }
}

/// One route configuration: an optional target plus an optional
/// wrapper-kind override.
///
/// With no target the route still materializes a node of the wrapper kind
/// over whatever raw content backs the path — that is how purely virtual
/// branches come to life.
#[derive(Clone, Default)]
pub struct Route {
    pub(crate) target: Option<Target>,
    pub(crate) wrapper: Option<Rc<Router>>,
}

impl Debug for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("target", &self.target)
            .field("wrapper", &self.wrapper.as_ref().map(|kind| kind.label()))
            .finish()
    }
}

impl Route {
    /// Construct nodes of the given kind at this path.
    pub fn kind(kind: &Rc<Router>) -> Route {
        Route {
            target: Some(Target::Kind(kind.clone())),
            wrapper: None,
        }
    }

    /// Resolve this path by calling a closure; the closure's result is used
    /// exactly as returned, never wrapped.
    pub fn callable<F>(f: F) -> Route
    where
        F: Fn(&Access<'_>) -> Result<Entry, Error> + 'static,
    {
        Route {
            target: Some(Target::Callable(Rc::new(f))),
            wrapper: None,
        }
    }

    /// Resolve this path by invoking the named operation on the requesting
    /// node's kind. Structured results are wrapped, scalars returned raw.
    pub fn op(name: &str) -> Route {
        Route {
            target: Some(Target::Op(SmolStr::new(name))),
            wrapper: None,
        }
    }

    /// Mirror the content found at another path of the same root tree.
    pub fn alias(path: &str) -> Route {
        Route::alias_any([path])
    }

    /// Mirror the content of the first of several candidate paths that
    /// resolves, tried in the order given.
    pub fn alias_any<I, S>(paths: I) -> Route
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Route {
            target: Some(Target::Alias(
                paths
                    .into_iter()
                    .map(|p| Segment::parse_path(p.as_ref()).into_boxed_slice())
                    .collect(),
            )),
            wrapper: None,
        }
    }

    /// No target: materialize a node of the wrapper kind over the raw
    /// content at this path.
    pub fn subtree() -> Route {
        Route::default()
    }

    /// Override the kind used to wrap whatever this route produces.
    pub fn wrap(mut self, kind: &Rc<Router>) -> Route {
        self.wrapper = Some(kind.clone());
        self
    }
}

/// One branch of the route trie.
///
/// Children are keyed by path segment; the configuration slot is a struct
/// field, so a segment named like anything can never collide with it.
#[derive(Default)]
pub struct Branch {
    children: IndexMap<Segment, Branch>,
    config: Option<Route>,
}

impl Branch {
    /// The configured child segments at this branch, in registration order.
    pub fn child_keys(&self) -> impl Iterator<Item = &Segment> {
        self.children.keys()
    }

    /// Whether a route configuration is stored at this branch itself.
    pub fn has_config(&self) -> bool {
        self.config.is_some()
    }

    /// The child branch for one segment.
    pub fn child(&self, segment: &Segment) -> Option<&Branch> {
        self.children.get(segment)
    }

    fn descend(&self, path: &[Segment]) -> Option<&Branch> {
        let mut branch = self;
        for seg in path {
            branch = branch.children.get(seg)?;
        }
        Some(branch)
    }

    fn descend_mut(&mut self, path: &[Segment]) -> &mut Branch {
        let mut branch = self;
        for seg in path {
            branch = branch.children.entry(seg.clone()).or_default();
        }
        branch
    }
}

impl Debug for Branch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Branch")
            .field("config", &self.config)
            .field("children", &self.children)
            .finish()
    }
}

/// Outcome of resolving a path against the trie.
pub(crate) enum Resolution<'a> {
    /// The branch exists and carries a configuration.
    Configured(&'a Route),
    /// The branch exists with no configuration of its own; the default
    /// strategy applies.
    Bare,
}

/// The route registry for one node kind.
///
/// Create one with [`Router::builder`], register routes, then hand the
/// resulting `Rc<Router>` to [`Router::root`] to wrap content.
pub struct Router {
    label: SmolStr,
    kind: Box<dyn TreeKind>,
    routes: Branch,
}

impl Router {
    /// Start configuring a router.
    pub fn builder() -> RouterBuilder {
        RouterBuilder {
            label: SmolStr::new("tree"),
            kind: Box::new(DefaultKind),
            root_path: Vec::new(),
            routes: Branch::default(),
        }
    }

    /// The diagnostic label given at build time.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The kind hooks of this router.
    pub fn kind(&self) -> &dyn TreeKind {
        &*self.kind
    }

    /// The trie branch at `path`, if any. Nodes use this to enumerate their
    /// configured child keys; it also supports membership checks on purely
    /// virtual paths.
    pub fn branch_at(&self, path: &[Segment]) -> Option<&Branch> {
        self.routes.descend(path)
    }

    /// The route configuration stored at `path`, if both the branch and its
    /// configuration slot exist.
    pub fn config_at(&self, path: &[Segment]) -> Option<&Route> {
        self.routes.descend(path)?.config.as_ref()
    }

    /// The construction strategy for `path`, if the path is routed at all.
    /// A bare branch (no configuration slot) still yields the default
    /// strategy, which is how virtual intermediate keys materialize.
    pub fn factory_for(self: &Rc<Self>, path: &[Segment]) -> Option<Factory> {
        let config = match self.resolve(path)? {
            Resolution::Configured(route) => route.clone(),
            Resolution::Bare => Route::subtree(),
        };
        let router = self.clone();
        Some(Rc::new(move |access: &Access<'_>| {
            router.apply(Resolution::Configured(&config), access)
        }))
    }

    /// A parentless node of this kind wrapping `contents`.
    pub fn root(self: &Rc<Self>, contents: impl Into<Value>) -> Node {
        Node::new(self.clone(), None, &[], Some(contents.into()))
    }

    pub(crate) fn resolve(&self, path: &[Segment]) -> Option<Resolution<'_>> {
        let branch = self.routes.descend(path)?;
        match &branch.config {
            Some(route) => Some(Resolution::Configured(route)),
            None => Some(Resolution::Bare),
        }
    }

    /// Build a node of this kind. The node's own route is the key tuple
    /// when the parent belongs to the same kind and empty otherwise, since
    /// routing tables are kind-scoped. Contents fall back to the parent's
    /// raw content at the key tuple.
    pub(crate) fn construct(
        self: &Rc<Self>,
        keys: &[Segment],
        parent: Option<&Node>,
        contents: Option<Value>,
    ) -> Result<Node, Error> {
        let contents = match contents {
            Some(value) => Some(value),
            None => match parent {
                Some(parent) => parent.contents_at(keys)?,
                None => None,
            },
        };
        Ok(Node::new(self.clone(), parent, keys, contents))
    }

    /// Apply the strategy a resolution stands for. Priority is structural:
    /// the target variants are mutually exclusive, and a missing target is
    /// the default strategy.
    pub(crate) fn apply(
        self: &Rc<Self>,
        resolution: Resolution<'_>,
        access: &Access<'_>,
    ) -> Result<Entry, Error> {
        let (target, wrapper_override) = match resolution {
            Resolution::Configured(route) => (route.target.as_ref(), route.wrapper.as_ref()),
            Resolution::Bare => (None, None),
        };
        let wrapper = wrapper_override.unwrap_or(self);

        match target {
            Some(Target::Kind(kind)) => {
                let kind = wrapper_override.unwrap_or(kind);
                trace!(kind = kind.label(), "route: constructing configured kind");
                Ok(Entry::Node(kind.construct(
                    access.keys,
                    Some(access.parent),
                    None,
                )?))
            }
            Some(Target::Callable(factory)) => {
                trace!("route: invoking callable");
                factory(access)
            }
            Some(Target::Op(name)) => {
                trace!(op = name.as_str(), "route: symbolic dispatch");
                let produced =
                    access
                        .parent
                        .router()
                        .kind()
                        .invoke(name, access.parent, access.keys)?;
                match produced {
                    Some(value) if value.is_container() => Ok(Entry::Node(wrapper.construct(
                        access.keys,
                        Some(access.parent),
                        Some(value),
                    )?)),
                    Some(value) => Ok(Entry::Value(value)),
                    None => Ok(Entry::Absent),
                }
            }
            Some(Target::Alias(paths)) => alias_entry(wrapper, paths, access),
            None => {
                trace!("route: default construction");
                Ok(Entry::Node(wrapper.construct(
                    access.keys,
                    Some(access.parent),
                    None,
                )?))
            }
        }
    }
}

impl Debug for Router {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("label", &self.label.as_str())
            .field("routes", &self.routes)
            .finish()
    }
}

/// Resolve an alias: climb from the requesting node through same-kind
/// ancestors to the routing root, then try each destination path against
/// the root's raw contents. First present, non-null content wins; a
/// structured hit is wrapped carrying the requester's own keys and parent
/// (the resulting node reports the requester's route, not the
/// destination's), a scalar hit is returned raw, and a full miss is absent.
fn alias_entry(
    wrapper: &Rc<Router>,
    paths: &[Box<[Segment]>],
    access: &Access<'_>,
) -> Result<Entry, Error> {
    let mut ancestor = access.parent.clone();
    while !ancestor.full_route().is_empty() {
        ancestor = ancestor.parent().ok_or_else(Error::detached)?;
    }

    for path in paths {
        match ancestor.contents_at(path)? {
            None | Some(Value::Null) => {
                trace!(path = %segment::join(path), "alias: candidate missed");
            }
            Some(value) if value.is_container() => {
                trace!(path = %segment::join(path), "alias: candidate hit");
                return Ok(Entry::Node(wrapper.construct(
                    access.keys,
                    Some(access.parent),
                    Some(value),
                )?));
            }
            Some(value) => {
                trace!(path = %segment::join(path), "alias: scalar hit");
                return Ok(Entry::Value(value));
            }
        }
    }
    Ok(Entry::Absent)
}

/// Builder for a [`Router`]. Configuration is a one-time setup phase: the
/// trie is frozen at [`build`](RouterBuilder::build).
pub struct RouterBuilder {
    label: SmolStr,
    kind: Box<dyn TreeKind>,
    root_path: Vec<Segment>,
    routes: Branch,
}

impl RouterBuilder {
    /// Set the diagnostic label used in traces and `Debug` output.
    pub fn label(mut self, label: &str) -> Self {
        self.label = SmolStr::new(label);
        self
    }

    /// Install the kind hooks (key translation, named operations).
    pub fn kind(mut self, kind: impl TreeKind + 'static) -> Self {
        self.kind = Box::new(kind);
        self
    }

    /// Prefix prepended to every subsequently registered path.
    pub fn root_path(mut self, path: &str) -> Self {
        self.root_path = Segment::parse_path(path);
        self
    }

    /// Register a route at a `/`-delimited path. Intermediate segments
    /// create or reuse trie branches; the configuration lands at the
    /// terminal branch's slot.
    pub fn route(mut self, path: &str, route: Route) -> Self {
        let mut full = self.root_path.clone();
        full.extend(Segment::parse_path(path));
        self.routes.descend_mut(&full).config = Some(route);
        self
    }

    /// Shorthand for registering a callable: exactly equivalent to
    /// `route(path, Route::callable(f))`.
    pub fn route_fn<F>(self, path: &str, f: F) -> Self
    where
        F: Fn(&Access<'_>) -> Result<Entry, Error> + 'static,
    {
        self.route(path, Route::callable(f))
    }

    /// Freeze the configuration and hand out the shared router.
    pub fn build(self) -> Rc<Router> {
        Rc::new(Router {
            label: self.label,
            kind: self.kind,
            routes: self.routes,
        })
    }
}
