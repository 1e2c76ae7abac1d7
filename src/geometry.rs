//! Orientation-indexed geometry and motion tables.
//!
//! Every coordinate below is load-bearing for the visual result: the polygon
//! cuts, the seam offset and the slide vectors were tuned against the banner
//! artwork and have no derivable formula. They are looked up by orientation
//! and side, never computed.

use std::fmt;

/// Which of the two layout profiles the banner currently uses.
///
/// Chosen from the viewport width: wide viewports get [`Horizontal`], narrow
/// ones [`Vertical`].
///
/// [`Horizontal`]: Orientation::Horizontal
/// [`Vertical`]: Orientation::Vertical
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// One of the two independent tile columns of the mosaic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// The side's name as used in element and image ids.
    pub fn name(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Which slide profile of the motion table to use.
///
/// Each orientation carries both a horizontal-style and a vertical-style
/// slide. The sequencer always picks [`MotionProfile::Vertical`], including
/// in horizontal orientation; see [`slide_vector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionProfile {
    Horizontal,
    Vertical,
}

/// A 2D translation, rendered as an SVG `translate(x, y)` transform.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Translate {
    pub x: f64,
    pub y: f64,
}

impl Translate {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Translate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "translate({}, {})", self.x, self.y)
    }
}

/// The tile coordinate space for an orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x, self.y, self.width, self.height)
    }
}

/// Pixel size assigned to every tile's backing image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub width: f64,
    pub height: f64,
}

pub fn view_box(orientation: Orientation) -> ViewBox {
    match orientation {
        Orientation::Horizontal => ViewBox { x: 0., y: 0., width: 1280., height: 360. },
        Orientation::Vertical => ViewBox { x: 0., y: 0., width: 1280., height: 1150. },
    }
}

/// The scene's declared CSS width.
///
/// The horizontal artwork overflows its container slightly so the diagonal
/// cut reaches the edge.
pub fn declared_width(orientation: Orientation) -> &'static str {
    match orientation {
        Orientation::Horizontal => "106.6667%",
        Orientation::Vertical => "100%",
    }
}

pub fn tile_footprint(orientation: Orientation) -> Footprint {
    match orientation {
        Orientation::Horizontal => Footprint { width: 640., height: 360. },
        Orientation::Vertical => Footprint { width: 1280., height: 720. },
    }
}

/// The slice shape reused by every tile on the given side.
///
/// Not a rectangle: both orientations use diagonal cuts, and the two
/// orientations cut differently.
pub fn tile_points(orientation: Orientation, side: Side) -> &'static [(f64, f64)] {
    match (orientation, side) {
        (Orientation::Horizontal, Side::Left) => {
            &[(0., 0.), (640., 0.), (560., 360.), (0., 360.)]
        }
        (Orientation::Horizontal, Side::Right) => {
            &[(720., 0.), (1280., 0.), (1280., 360.), (640., 360.)]
        }
        (Orientation::Vertical, Side::Left) => {
            &[(0., 0.), (1280., 0.), (1280., 430.), (0., 720.)]
        }
        (Orientation::Vertical, Side::Right) => {
            &[(1280., 720.), (0., 1010.), (0., 1440.), (1280., 1440.)]
        }
    }
}

/// Formats polygon points the way the `points` attribute expects them.
pub fn points_attr(points: &[(f64, f64)]) -> String {
    let mut attr = String::new();
    for (i, (x, y)) in points.iter().enumerate() {
        if i > 0 {
            attr.push_str(", ");
        }
        attr.push_str(&format!("{x} {y}"));
    }
    attr
}

/// Translation applied to right-side tiles so their diagonal cut lines up
/// with the left side's.
pub fn seam_offset(orientation: Orientation) -> Translate {
    match orientation {
        Orientation::Horizontal => Translate::new(-80., 0.),
        Orientation::Vertical => Translate::new(0., -290.),
    }
}

/// Translation a tile slides to when it leaves the scene.
///
/// Each orientation carries both profiles, but the sequencer always requests
/// the vertical-style one — also in horizontal orientation, where the tiles
/// consequently exit along the cross axis. Inherited behavior: "fixing" the
/// profile selection changes the visible motion direction, so it is kept
/// exactly.
pub fn slide_vector(orientation: Orientation, profile: MotionProfile, side: Side) -> Translate {
    match (orientation, profile, side) {
        (Orientation::Horizontal, MotionProfile::Vertical, Side::Left) => Translate::new(-80., 360.),
        (Orientation::Horizontal, MotionProfile::Vertical, Side::Right) => Translate::new(0., -360.),
        (Orientation::Horizontal, MotionProfile::Horizontal, Side::Left) => {
            Translate::new(-800., 0.)
        }
        (Orientation::Horizontal, MotionProfile::Horizontal, Side::Right) => {
            Translate::new(720., 0.)
        }
        (Orientation::Vertical, MotionProfile::Vertical, Side::Left) => Translate::new(1280., -290.),
        (Orientation::Vertical, MotionProfile::Vertical, Side::Right) => Translate::new(-1280., 0.),
        (Orientation::Vertical, MotionProfile::Horizontal, Side::Left) => Translate::new(0., -720.),
        (Orientation::Vertical, MotionProfile::Horizontal, Side::Right) => Translate::new(0., 720.),
    }
}
