//! Terminal surfaces and the split tree that lays them out in one window.
//!
//! The coordinator treats a surface as an opaque handle: it only asks whether
//! its process exited, whether closing it needs confirmation, and hands it
//! keyboard focus. Rendering and PTY management live behind [`Surface`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Stable surface identity, persisted in the restoration record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(pub Uuid);

impl SurfaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A terminal surface hosted inside an overlay window
pub trait Surface {
    fn id(&self) -> SurfaceId;
    fn process_exited(&self) -> bool;
    /// Closing would kill a process the user may care about
    fn needs_confirm_quit(&self) -> bool;
    /// Focus-change hook
    fn focus_changed(&self, focused: bool);
    /// Give this surface keyboard focus
    fn grant_focus(&self);
}

/// What to run in a freshly created surface
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceRequest {
    /// One-shot command; `None` runs the login shell
    pub command: Option<String>,
}

impl SurfaceRequest {
    pub fn shell() -> Self {
        Self::default()
    }

    pub fn command(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
        }
    }
}

/// Creates surfaces on demand and revives persisted ones
pub trait SurfaceFactory {
    fn create(&mut self, request: &SurfaceRequest) -> Rc<dyn Surface>;
    /// Rebuild the surface saved under `id`; `None` if it cannot be revived
    fn restore(&mut self, id: SurfaceId) -> Option<Rc<dyn Surface>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitDirection {
    /// Stacked top/bottom
    Horizontal,
    /// Side by side
    Vertical,
}

/// Binary layout node
pub enum SplitNode {
    Leaf(Rc<dyn Surface>),
    Split {
        direction: SplitDirection,
        ratio: f32,
        first: Box<SplitNode>,
        second: Box<SplitNode>,
    },
}

impl SplitNode {
    pub fn leaf(surface: Rc<dyn Surface>) -> Self {
        SplitNode::Leaf(surface)
    }

    pub fn split(direction: SplitDirection, ratio: f32, first: SplitNode, second: SplitNode) -> Self {
        SplitNode::Split {
            direction,
            ratio: ratio.clamp(0.1, 0.9),
            first: Box::new(first),
            second: Box::new(second),
        }
    }

    fn contains(&self, id: SurfaceId) -> bool {
        match self {
            SplitNode::Leaf(surface) => surface.id() == id,
            SplitNode::Split { first, second, .. } => first.contains(id) || second.contains(id),
        }
    }

    fn collect_leaves(&self, out: &mut Vec<Rc<dyn Surface>>) {
        match self {
            SplitNode::Leaf(surface) => out.push(Rc::clone(surface)),
            SplitNode::Split { first, second, .. } => {
                first.collect_leaves(out);
                second.collect_leaves(out);
            }
        }
    }

    /// Drop the leaf `id`; a split left with one child collapses into it
    fn without(self, id: SurfaceId) -> Option<SplitNode> {
        match self {
            SplitNode::Leaf(surface) if surface.id() == id => None,
            leaf @ SplitNode::Leaf(_) => Some(leaf),
            SplitNode::Split {
                direction,
                ratio,
                first,
                second,
            } => match (first.without(id), second.without(id)) {
                (Some(first), Some(second)) => Some(SplitNode::Split {
                    direction,
                    ratio,
                    first: Box::new(first),
                    second: Box::new(second),
                }),
                (Some(only), None) | (None, Some(only)) => Some(only),
                (None, None) => None,
            },
        }
    }

    /// Replace leaf `target` with a split of it and `new_surface`
    fn split_at(
        self,
        target: SurfaceId,
        direction: SplitDirection,
        new_surface: &Rc<dyn Surface>,
    ) -> SplitNode {
        match self {
            SplitNode::Leaf(surface) if surface.id() == target => SplitNode::split(
                direction,
                0.5,
                SplitNode::Leaf(surface),
                SplitNode::Leaf(Rc::clone(new_surface)),
            ),
            leaf @ SplitNode::Leaf(_) => leaf,
            SplitNode::Split {
                direction: d,
                ratio,
                first,
                second,
            } => SplitNode::Split {
                direction: d,
                ratio,
                first: Box::new(first.split_at(target, direction, new_surface)),
                second: Box::new(second.split_at(target, direction, new_surface)),
            },
        }
    }

    fn snapshot(&self) -> NodeSnapshot {
        match self {
            SplitNode::Leaf(surface) => NodeSnapshot::Leaf {
                surface: surface.id(),
            },
            SplitNode::Split {
                direction,
                ratio,
                first,
                second,
            } => NodeSnapshot::Split {
                direction: *direction,
                ratio: *ratio,
                first: Box::new(first.snapshot()),
                second: Box::new(second.snapshot()),
            },
        }
    }
}

/// Surfaces of one overlay window and which of them has focus
#[derive(Default)]
pub struct SplitTree {
    root: Option<SplitNode>,
    focused: Option<SurfaceId>,
}

impl SplitTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_surface(surface: Rc<dyn Surface>) -> Self {
        let focused = Some(surface.id());
        Self {
            root: Some(SplitNode::Leaf(surface)),
            focused,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.root.as_ref().is_some_and(|root| root.contains(id))
    }

    pub fn root(&self) -> Option<&SplitNode> {
        self.root.as_ref()
    }

    /// Surfaces in layout order (first child before second)
    pub fn leaves(&self) -> Vec<Rc<dyn Surface>> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            root.collect_leaves(&mut out);
        }
        out
    }

    pub fn find(&self, id: SurfaceId) -> Option<Rc<dyn Surface>> {
        self.leaves().into_iter().find(|s| s.id() == id)
    }

    pub fn focused(&self) -> Option<SurfaceId> {
        self.focused
    }

    /// Surface that should receive focus: the focused one if still present,
    /// else the first leaf
    pub fn focus_target(&self) -> Option<Rc<dyn Surface>> {
        self.focused
            .and_then(|id| self.find(id))
            .or_else(|| self.leaves().into_iter().next())
    }

    /// Record `id` as focused; ignored when the surface is not in the tree
    pub fn set_focused(&mut self, id: SurfaceId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.focused = Some(id);
        true
    }

    /// Split the leaf `target`, placing `surface` after it
    pub fn split(
        &mut self,
        target: SurfaceId,
        direction: SplitDirection,
        surface: Rc<dyn Surface>,
    ) -> bool {
        if !self.contains(target) {
            return false;
        }
        if let Some(root) = self.root.take() {
            self.root = Some(root.split_at(target, direction, &surface));
        }
        true
    }

    /// Remove one surface; returns whether it was present
    pub fn remove(&mut self, id: SurfaceId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.root = self.root.take().and_then(|root| root.without(id));
        if self.focused == Some(id) {
            self.focused = self.leaves().first().map(|s| s.id());
        }
        debug_trace!("SURFACE", "removed {} (tree empty={})", id, self.is_empty());
        true
    }

    pub fn snapshot(&self) -> SplitTreeSnapshot {
        SplitTreeSnapshot {
            root: self.root.as_ref().map(SplitNode::snapshot),
            focused: self.focused,
        }
    }

    /// Rebuild a tree from a snapshot; surfaces the factory cannot revive
    /// are dropped and their splits collapse
    pub fn from_snapshot(snapshot: &SplitTreeSnapshot, factory: &mut dyn SurfaceFactory) -> Self {
        let root = snapshot
            .root
            .as_ref()
            .and_then(|node| restore_node(node, factory));
        let mut tree = Self {
            root,
            focused: None,
        };
        tree.focused = snapshot
            .focused
            .filter(|id| tree.contains(*id))
            .or_else(|| tree.leaves().first().map(|s| s.id()));
        tree
    }
}

fn restore_node(node: &NodeSnapshot, factory: &mut dyn SurfaceFactory) -> Option<SplitNode> {
    match node {
        NodeSnapshot::Leaf { surface } => factory.restore(*surface).map(SplitNode::Leaf),
        NodeSnapshot::Split {
            direction,
            ratio,
            first,
            second,
        } => match (restore_node(first, factory), restore_node(second, factory)) {
            (Some(first), Some(second)) => Some(SplitNode::split(*direction, *ratio, first, second)),
            (Some(only), None) | (None, Some(only)) => Some(only),
            (None, None) => None,
        },
    }
}

impl fmt::Debug for SplitTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitTree")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

/// Serializable shape of a split tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeSnapshot {
    Leaf {
        surface: SurfaceId,
    },
    Split {
        direction: SplitDirection,
        ratio: f32,
        first: Box<NodeSnapshot>,
        second: Box<NodeSnapshot>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitTreeSnapshot {
    #[serde(default)]
    pub root: Option<NodeSnapshot>,
    #[serde(default)]
    pub focused: Option<SurfaceId>,
}

impl SplitTreeSnapshot {
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}
