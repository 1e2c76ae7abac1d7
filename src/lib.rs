//! A two-sided SVG image mosaic with a perpetual slide-and-replace
//! animation.
//!
//! The banner lays a stack of diagonally cut image tiles over an svg scene,
//! then endlessly slides the topmost tile pair out of view, one pair every
//! few seconds, rebuilding the whole stack each time a full pass completes.
//! Two discrete layout profiles exist — horizontal for wide viewports and
//! vertical for narrow ones — and crossing the configured breakpoint tears
//! the banner down and rebuilds it in the other profile.
//!
//! The crate is split along its seams: [`geometry`] holds the per-profile
//! coordinate and motion tables, [`scene`] defines the scene-graph
//! capability the banner drives (with an in-memory document as the stock
//! implementation), and [`banner`] owns layout construction, the step cycle
//! and the initialize/destroy lifecycle. Time only moves when the embedding
//! event loop advances the [`animation::Clock`].

pub mod animation;
pub mod banner;
pub mod geometry;
pub mod scene;
pub mod viewport;

pub use crate::animation::Clock;
pub use crate::banner::{Banner, Options, PairCount, Timings};
pub use crate::geometry::{Orientation, Side};
pub use crate::viewport::Viewport;
