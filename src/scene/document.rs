//! In-memory DOM/SVG document.
//!
//! Stands in for the browser: it stores an element tree with attributes,
//! owns the eased transform transitions the banner starts, computes the
//! rendered height of the scene from its declared sizing, and serializes to
//! markup with a deterministic attribute order for snapshot tests.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use tracing::trace;

use super::{ElementKind, FinishedTransition, NodeId, Scene, TransitionId};
use crate::animation::{Animation, Clock, Curve};
use crate::geometry::{Side, Translate};

#[derive(Debug)]
struct Node {
    kind: ElementKind,
    elem_id: Option<String>,
    attrs: BTreeMap<String, String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

#[derive(Debug)]
struct Transition {
    id: TransitionId,
    node: NodeId,
    from: Translate,
    to: Translate,
    anim: Animation,
}

#[derive(Debug)]
pub struct Document {
    clock: Clock,
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    transitions: Vec<Transition>,
    /// CSS pixel width available to block-level elements, i.e. the viewport
    /// width for our purposes.
    layout_width: f64,
    next_node: u64,
    next_transition: u64,
}

impl Document {
    pub fn new(clock: Clock, layout_width: f64) -> Self {
        let root = NodeId::from_raw(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node {
                kind: ElementKind::Container,
                elem_id: None,
                attrs: BTreeMap::new(),
                children: Vec::new(),
                parent: None,
            },
        );

        Self {
            clock,
            nodes,
            root,
            transitions: Vec::new(),
            layout_width,
            next_node: 1,
            next_transition: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn layout_width(&self) -> f64 {
        self.layout_width
    }

    pub fn set_layout_width(&mut self, width: f64) {
        self.layout_width = width;
    }

    /// Builds the host-page fragment the banner expects: a container with
    /// one side marker and one pattern/image slot per source image, plus the
    /// svg scene element.
    pub fn host_page(
        clock: Clock,
        layout_width: f64,
        left_images: usize,
        right_images: usize,
        animated: bool,
    ) -> (Self, NodeId) {
        let mut doc = Self::new(clock, layout_width);
        let root = doc.root();

        let container = doc.append(root, ElementKind::Container, Some("splitBanner"));
        doc.set_attr(container, "data-is-animated", if animated { "true" } else { "false" });

        for (side, count) in [(Side::Left, left_images), (Side::Right, right_images)] {
            for _ in 0..count {
                let marker = doc.append(container, ElementKind::SideMarker, None);
                doc.set_attr(marker, "data-position", side.name());
            }
        }

        let svg = doc.append(container, ElementKind::Svg, None);
        for (side, count) in [(Side::Left, left_images), (Side::Right, right_images)] {
            for n in 1..=count {
                let defs = doc.append(svg, ElementKind::Defs, None);
                let pattern = doc.append(
                    defs,
                    ElementKind::Pattern,
                    Some(&format!("img_{}{n}", side.name())),
                );
                doc.append(pattern, ElementKind::Image, None);
            }
        }

        (doc, container)
    }

    fn alloc(&mut self, kind: ElementKind, elem_id: Option<&str>, parent: NodeId) -> NodeId {
        let id = NodeId::from_raw(self.next_node);
        self.next_node += 1;
        self.nodes.insert(
            id,
            Node {
                kind,
                elem_id: elem_id.map(str::to_owned),
                attrs: BTreeMap::new(),
                children: Vec::new(),
                parent: Some(parent),
            },
        );
        id
    }

    fn collect_subtree(&self, node: NodeId, out: &mut Vec<NodeId>) {
        out.push(node);
        if let Some(n) = self.nodes.get(&node) {
            for child in &n.children {
                self.collect_subtree(*child, out);
            }
        }
    }

    /// Total number of live elements, not counting the synthetic root.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Number of transitions still in flight.
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    fn serialize_node(&self, node: NodeId, depth: usize, out: &mut String) {
        let Some(n) = self.nodes.get(&node) else {
            return;
        };

        let tag = match n.kind {
            ElementKind::Container => "div",
            ElementKind::SideMarker => "figure",
            ElementKind::Svg => "svg",
            ElementKind::Defs => "defs",
            ElementKind::Pattern => "pattern",
            ElementKind::Image => "image",
            ElementKind::Group => "g",
            ElementKind::Polygon => "polygon",
        };

        let indent = "  ".repeat(depth);
        out.push_str(&indent);
        out.push('<');
        out.push_str(tag);
        if let Some(elem_id) = &n.elem_id {
            out.push_str(&format!(" id=\"{elem_id}\""));
        }
        for (name, value) in &n.attrs {
            out.push_str(&format!(" {name}=\"{value}\""));
        }

        if n.children.is_empty() {
            out.push_str("/>\n");
        } else {
            out.push_str(">\n");
            for child in &n.children {
                self.serialize_node(*child, depth + 1, out);
            }
            out.push_str(&indent);
            out.push_str(&format!("</{tag}>\n"));
        }
    }

    /// Serializes the document to markup with deterministic attribute order.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.nodes.get(&self.root) {
            for child in &root.children {
                self.serialize_node(*child, 0, &mut out);
            }
        }
        out
    }
}

fn parse_translate(value: &str) -> Option<Translate> {
    let inner = value.trim().strip_prefix("translate(")?.strip_suffix(')')?;
    let (x, y) = inner.split_once(',')?;
    Some(Translate::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

fn lerp(from: Translate, to: Translate, progress: f64) -> Translate {
    Translate::new(
        from.x + (to.x - from.x) * progress,
        from.y + (to.y - from.y) * progress,
    )
}

impl Scene for Document {
    fn select(&self, elem_id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, n)| n.elem_id.as_deref() == Some(elem_id))
            .map(|(id, _)| *id)
    }

    fn child_of_kind(&self, parent: NodeId, kind: ElementKind) -> Option<NodeId> {
        let n = self.nodes.get(&parent)?;
        n.children
            .iter()
            .copied()
            .find(|child| self.nodes.get(child).map(|c| c.kind) == Some(kind))
    }

    fn children_of_kind(&self, parent: NodeId, kind: ElementKind) -> Vec<NodeId> {
        let Some(n) = self.nodes.get(&parent) else {
            return Vec::new();
        };
        n.children
            .iter()
            .copied()
            .filter(|child| self.nodes.get(child).map(|c| c.kind) == Some(kind))
            .collect()
    }

    fn append(&mut self, parent: NodeId, kind: ElementKind, elem_id: Option<&str>) -> NodeId {
        let id = self.alloc(kind, elem_id, parent);
        self.nodes
            .get_mut(&parent)
            .expect("append target must exist")
            .children
            .push(id);
        id
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.attrs.insert(name.to_owned(), value.to_owned());
        }
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes.get(&node)?.attrs.get(name).cloned()
    }

    fn remove(&mut self, node: NodeId) {
        let mut subtree = Vec::new();
        self.collect_subtree(node, &mut subtree);
        if subtree.is_empty() {
            return;
        }

        if let Some(parent) = self.nodes.get(&node).and_then(|n| n.parent) {
            if let Some(p) = self.nodes.get_mut(&parent) {
                p.children.retain(|child| *child != node);
            }
        }
        for id in &subtree {
            self.nodes.remove(id);
        }
        self.transitions.retain(|t| !subtree.contains(&t.node));
    }

    fn animate_transform(
        &mut self,
        node: NodeId,
        to: Translate,
        duration: Duration,
        curve: Curve,
    ) -> TransitionId {
        let from = self
            .attr(node, "transform")
            .and_then(|value| parse_translate(&value))
            .unwrap_or_default();

        // A new transition interrupts any running one on the same node.
        self.transitions.retain(|t| t.node != node);

        let id = TransitionId::from_raw(self.next_transition);
        self.next_transition += 1;
        trace!("transition {} on node {}: {from} -> {to}", id.get(), node.get());
        self.transitions.push(Transition {
            id,
            node,
            from,
            to,
            anim: Animation::new(self.clock.clone(), 0., 1., duration, curve),
        });
        id
    }

    fn finished_transitions(&mut self) -> Vec<FinishedTransition> {
        let mut finished = Vec::new();
        let mut updates = Vec::new();

        self.transitions.retain(|t| {
            let done = t.anim.is_done();
            let current = if done {
                t.to
            } else {
                lerp(t.from, t.to, t.anim.value())
            };
            updates.push((t.node, current));
            if done {
                finished.push(FinishedTransition {
                    transition: t.id,
                    node: t.node,
                });
            }
            !done
        });

        for (node, current) in updates {
            if let Some(n) = self.nodes.get_mut(&node) {
                n.attrs.insert("transform".to_owned(), current.to_string());
            }
        }

        finished
    }

    fn measured_height(&self, node: NodeId) -> f64 {
        let Some(n) = self.nodes.get(&node) else {
            return 0.;
        };

        let width_frac = n
            .attrs
            .get("width")
            .and_then(|w| w.strip_suffix('%'))
            .and_then(|w| w.parse::<f64>().ok())
            .map_or(1., |pct| pct / 100.);

        let Some((vb_width, vb_height)) = n.attrs.get("viewBox").and_then(|vb| {
            let parts: Vec<f64> = vb.split_whitespace().filter_map(|p| p.parse().ok()).collect();
            match parts[..] {
                [_, _, w, h] if w > 0. => Some((w, h)),
                _ => None,
            }
        }) else {
            return 0.;
        };

        self.layout_width * width_frac * vb_height / vb_width
    }

    fn count_marked(&self, container: NodeId, side: Side) -> usize {
        self.children_of_kind(container, ElementKind::SideMarker)
            .iter()
            .filter(|marker| {
                self.attr(**marker, "data-position").as_deref() == Some(side.name())
            })
            .count()
    }

    fn animation_flag(&self, container: NodeId) -> Option<bool> {
        match self.attr(container, "data-is-animated")?.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn doc() -> (Document, NodeId) {
        Document::host_page(Clock::new(), 1280., 3, 3, true)
    }

    #[test]
    fn host_page_discovery() {
        let (doc, container) = doc();
        assert_eq!(doc.count_marked(container, Side::Left), 3);
        assert_eq!(doc.count_marked(container, Side::Right), 3);
        assert_eq!(doc.animation_flag(container), Some(true));

        let svg = doc.child_of_kind(container, ElementKind::Svg).unwrap();
        assert_eq!(doc.children_of_kind(svg, ElementKind::Defs).len(), 6);
        assert!(doc.select("img_left3").is_some());
        assert!(doc.select("img_right1").is_some());
        assert!(doc.select("img_left4").is_none());
    }

    #[test]
    fn remove_drops_the_subtree_and_its_transitions() {
        let (mut doc, container) = doc();
        let svg = doc.child_of_kind(container, ElementKind::Svg).unwrap();
        let g = doc.append(svg, ElementKind::Group, None);
        let polygon = doc.append(g, ElementKind::Polygon, Some("left_split_1"));

        doc.animate_transform(
            polygon,
            Translate::new(-80., 360.),
            Duration::from_millis(3000),
            Curve::EaseInOutCubic,
        );
        assert_eq!(doc.transition_count(), 1);

        doc.remove(g);
        assert!(doc.select("left_split_1").is_none());
        assert_eq!(doc.transition_count(), 0);
        assert!(doc.finished_transitions().is_empty());
    }

    #[test]
    fn transition_tracks_the_clock() {
        let clock = Clock::new();
        let (mut doc, container) = Document::host_page(clock.clone(), 1280., 1, 1, true);
        let svg = doc.child_of_kind(container, ElementKind::Svg).unwrap();
        let polygon = doc.append(svg, ElementKind::Polygon, Some("p"));
        doc.set_attr(polygon, "transform", "translate(-80, 0)");

        let id = doc.animate_transform(
            polygon,
            Translate::new(-80., 360.),
            Duration::from_millis(1000),
            Curve::Linear,
        );

        clock.advance_to(Duration::from_millis(500));
        assert!(doc.finished_transitions().is_empty());
        let transform = doc.attr(polygon, "transform").unwrap();
        let mid = parse_translate(&transform).unwrap();
        assert_abs_diff_eq!(mid.x, -80.);
        assert_abs_diff_eq!(mid.y, 180.);

        clock.advance_to(Duration::from_millis(1000));
        let finished = doc.finished_transitions();
        assert_eq!(
            finished,
            vec![FinishedTransition { transition: id, node: polygon }]
        );
        assert_eq!(
            doc.attr(polygon, "transform").unwrap(),
            "translate(-80, 360)"
        );
        // Reported exactly once.
        assert!(doc.finished_transitions().is_empty());
    }

    #[test]
    fn new_transition_interrupts_the_old_one() {
        let (mut doc, container) = doc();
        let svg = doc.child_of_kind(container, ElementKind::Svg).unwrap();
        let polygon = doc.append(svg, ElementKind::Polygon, None);

        doc.animate_transform(polygon, Translate::new(10., 0.), Duration::from_secs(1), Curve::Linear);
        doc.animate_transform(polygon, Translate::new(0., 20.), Duration::from_secs(1), Curve::Linear);
        assert_eq!(doc.transition_count(), 1);
    }

    #[test]
    fn measured_height_follows_layout_width() {
        let (mut doc, container) = doc();
        let svg = doc.child_of_kind(container, ElementKind::Svg).unwrap();
        doc.set_attr(svg, "viewBox", "0 0 1280 360");
        doc.set_attr(svg, "width", "106.6667%");

        let height = doc.measured_height(svg);
        assert_abs_diff_eq!(height, 1280. * 1.066667 * 360. / 1280., epsilon = 1e-6);

        doc.set_layout_width(640.);
        assert_abs_diff_eq!(doc.measured_height(svg), height / 2., epsilon = 1e-6);
    }

    #[test]
    fn markup_is_deterministic() {
        let (doc, _) = Document::host_page(Clock::new(), 1280., 1, 1, false);
        let first = doc.to_markup();
        let (doc2, _) = Document::host_page(Clock::new(), 1280., 1, 1, false);
        assert_eq!(first, doc2.to_markup());
        assert!(first.contains("data-is-animated=\"false\""));
    }
}
