//! Scene-graph capability consumed by the banner.
//!
//! The banner never touches a real DOM. Everything it needs from the host
//! page — element lookup, attribute writes, node insertion and removal,
//! eased transform transitions, rendered-height measurement and the two
//! discovery reads (side marker counts and the animation flag) — goes
//! through the [`Scene`] trait. [`document::Document`] is the in-memory
//! implementation used by the demo binary and the tests.

pub mod document;

use std::time::Duration;

use crate::animation::Curve;
use crate::geometry::{Side, Translate};

/// Handle to one element in the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Handle to one running transform transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionId(u64);

impl TransitionId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Element kinds the banner creates or inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// The banner's enclosing container.
    Container,
    /// A host-page element marking one source image for one side.
    SideMarker,
    Svg,
    Defs,
    Pattern,
    Image,
    Group,
    Polygon,
}

/// A transform transition that has reached its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedTransition {
    pub transition: TransitionId,
    pub node: NodeId,
}

pub trait Scene {
    /// Looks up an element by its id attribute.
    fn select(&self, elem_id: &str) -> Option<NodeId>;

    /// Returns the first child of `parent` with the given kind.
    fn child_of_kind(&self, parent: NodeId, kind: ElementKind) -> Option<NodeId>;

    /// Returns all children of `parent` with the given kind, in document
    /// order.
    fn children_of_kind(&self, parent: NodeId, kind: ElementKind) -> Vec<NodeId>;

    /// Appends a new element under `parent`.
    fn append(&mut self, parent: NodeId, kind: ElementKind, elem_id: Option<&str>) -> NodeId;

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str);

    fn attr(&self, node: NodeId, name: &str) -> Option<String>;

    /// Removes `node` and its whole subtree. Transitions targeting removed
    /// nodes are dropped and never reported as finished.
    fn remove(&mut self, node: NodeId);

    /// Starts an eased transition of the node's transform toward `to`.
    ///
    /// The transition replaces whatever transform the node currently has as
    /// the starting point and overwrites the attribute as time advances.
    fn animate_transform(
        &mut self,
        node: NodeId,
        to: Translate,
        duration: Duration,
        curve: Curve,
    ) -> TransitionId;

    /// Drains transitions that completed since the last call, updating the
    /// transform attributes of everything still in flight.
    ///
    /// Completions are reported exactly once, to whoever drains them: one
    /// banner instance per document is the expected arrangement.
    fn finished_transitions(&mut self) -> Vec<FinishedTransition>;

    /// The rendered height of the element in CSS pixels.
    fn measured_height(&self, node: NodeId) -> f64;

    /// Counts the host page's side marker elements under `container`.
    fn count_marked(&self, container: NodeId, side: Side) -> usize;

    /// Reads the container's animation flag, if present and well-formed.
    fn animation_flag(&self, container: NodeId) -> Option<bool>;
}
