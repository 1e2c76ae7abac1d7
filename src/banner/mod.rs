//! Banner lifecycle.
//!
//! A [`Banner`] cycles through `Uninitialized -> Ready -> TearingDown ->
//! Uninitialized` as it is initialized and destroyed, possibly with a
//! different orientation each time. Destruction is two-phase: [`destroy`]
//! only marks the banner, and the actual teardown (cancel the pending step,
//! clear the tile stack, release the resize subscription) happens on the
//! next [`advance`] call. `initialize` completes any pending teardown first,
//! so a destroy immediately followed by an initialize never races it.
//!
//! [`destroy`]: Banner::destroy
//! [`advance`]: Banner::advance

mod layout;
mod sequencer;


use std::fmt;
use std::mem;
use std::time::Duration;

use anyhow::Context as _;
use tracing::{debug, warn};

pub use self::sequencer::{PairCount, StepState};
use crate::animation::Clock;
use crate::geometry::{Orientation, Side};
use crate::scene::{ElementKind, NodeId, Scene};
use crate::viewport::{ResizeSubscription, Viewport};

/// Number of image tiles discovered on each side at build time.
///
/// A run constant: re-counted only on the next initialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileInventory {
    pub left: usize,
    pub right: usize,
}

/// Fixed animation cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// How long one tile pair takes to slide out.
    pub slide: Duration,
    /// Pause between a completed step and the next one.
    pub delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            slide: Duration::from_millis(3000),
            delay: Duration::from_millis(1500),
        }
    }
}

impl Timings {
    pub fn from_config(animations: &split_banner_config::Animations) -> Self {
        Self {
            slide: animations.slide_duration(),
            delay: animations.step_delay(),
        }
    }
}

/// Caller-supplied options for one initialize.
pub struct Options {
    pub orientation: Orientation,
    /// Forces the banner static regardless of the host page's animation
    /// flag.
    pub animations_off: bool,
    /// Invoked when a tile starts sliding, once per side.
    pub on_slide_start: Option<Box<dyn FnMut()>>,
    /// Invoked when a tile finishes sliding, once per side.
    pub on_slide_end: Option<Box<dyn FnMut()>>,
}

impl Options {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            animations_off: false,
            on_slide_start: None,
            on_slide_end: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("orientation", &self.orientation)
            .field("animations_off", &self.animations_off)
            .field("on_slide_start", &self.on_slide_start.is_some())
            .field("on_slide_end", &self.on_slide_end.is_some())
            .finish()
    }
}

#[derive(Default)]
pub(crate) struct Hooks {
    on_slide_start: Option<Box<dyn FnMut()>>,
    on_slide_end: Option<Box<dyn FnMut()>>,
}

impl Hooks {
    pub(crate) fn slide_start(&mut self) {
        if let Some(hook) = &mut self.on_slide_start {
            hook();
        }
    }

    pub(crate) fn slide_end(&mut self) {
        if let Some(hook) = &mut self.on_slide_end {
            hook();
        }
    }
}

/// State of one initialized run.
#[derive(Debug)]
pub(crate) struct Running {
    pub(crate) orientation: Orientation,
    pub(crate) svg: NodeId,
    pub(crate) group: NodeId,
    pub(crate) inventory: TileInventory,
    pub(crate) pairs: PairCount,
    /// Current cycle position; stays within `[1, count]` while steps are
    /// running, meaningful only when `pairs` is matched.
    pub(crate) counter: usize,
    pub(crate) is_animated: bool,
    pub(crate) step: StepState,
    pub(crate) resize_subscription: Option<ResizeSubscription>,
}

#[derive(Debug)]
enum Phase {
    Uninitialized,
    Ready(Running),
    /// Destroy was requested; teardown runs on the next advance.
    TearingDown(Running),
}

pub struct Banner {
    container: NodeId,
    clock: Clock,
    timings: Timings,
    hooks: Hooks,
    phase: Phase,
}

impl fmt::Debug for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Banner")
            .field("container", &self.container)
            .field("timings", &self.timings)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl Banner {
    pub fn new(container: NodeId, clock: Clock, timings: Timings) -> Self {
        Self {
            container,
            clock,
            timings,
            hooks: Hooks::default(),
            phase: Phase::Uninitialized,
        }
    }

    /// Builds the tile stack for the given orientation and starts the cycle
    /// if the host page asks for animation.
    ///
    /// Fully tears down a previous run first, whether it is still ready or
    /// has a teardown pending.
    pub fn initialize(
        &mut self,
        scene: &mut impl Scene,
        viewport: &mut Viewport,
        options: Options,
    ) -> anyhow::Result<()> {
        match mem::replace(&mut self.phase, Phase::Uninitialized) {
            Phase::Ready(run) | Phase::TearingDown(run) => {
                self.finish_teardown(scene, viewport, run);
            }
            Phase::Uninitialized => {}
        }

        let svg = scene
            .child_of_kind(self.container, ElementKind::Svg)
            .context("banner container has no svg element")?;

        let inventory = TileInventory {
            left: scene.count_marked(self.container, Side::Left),
            right: scene.count_marked(self.container, Side::Right),
        };
        let pairs = PairCount::new(inventory.left, inventory.right);

        let page_animated = scene
            .animation_flag(self.container)
            .context("banner container has no usable animation flag")?;
        let is_animated = page_animated && !options.animations_off;

        self.hooks = Hooks {
            on_slide_start: options.on_slide_start,
            on_slide_end: options.on_slide_end,
        };

        layout::configure_scene(scene, svg, options.orientation)?;
        let group = layout::build(scene, svg, options.orientation, &inventory)?;

        let (counter, step) = match pairs {
            PairCount::Matched(count) if count > 0 && is_animated => (
                count,
                StepState::Waiting {
                    fire_at: self.clock.now() + self.timings.delay,
                },
            ),
            PairCount::Matched(count) => (count, StepState::Idle),
            PairCount::Mismatched { left, right } => {
                warn!("left/right tile counts differ ({left} vs {right}); animation disabled");
                (0, StepState::Idle)
            }
        };

        let run = Running {
            orientation: options.orientation,
            svg,
            group,
            inventory,
            pairs,
            counter,
            is_animated,
            step,
            resize_subscription: Some(viewport.subscribe()),
        };

        let height = scene.measured_height(svg);
        scene.set_attr(self.container, "style", &format!("height: {height:.2}px"));

        debug!(
            "banner initialized: {:?}, {} + {} tiles, animated: {is_animated}",
            options.orientation, inventory.left, inventory.right,
        );
        self.phase = Phase::Ready(run);
        Ok(())
    }

    /// Marks the banner for teardown.
    ///
    /// Safe to call at any point, including before the first initialize and
    /// repeatedly. The actual teardown happens on the next advance.
    pub fn destroy(&mut self) {
        match mem::replace(&mut self.phase, Phase::Uninitialized) {
            Phase::Ready(mut run) => {
                run.is_animated = false;
                self.phase = Phase::TearingDown(run);
            }
            other => self.phase = other,
        }
    }

    /// Drives the banner: performs a pending teardown, reacts to finished
    /// tile motions and fires the inter-step timer when it is due.
    pub fn advance(
        &mut self,
        scene: &mut impl Scene,
        viewport: &mut Viewport,
    ) -> anyhow::Result<()> {
        if matches!(self.phase, Phase::TearingDown(_)) {
            let Phase::TearingDown(run) = mem::replace(&mut self.phase, Phase::Uninitialized)
            else {
                unreachable!();
            };
            self.finish_teardown(scene, viewport, run);
            return Ok(());
        }

        if !matches!(self.phase, Phase::Ready(_)) {
            return Ok(());
        }

        for finished in scene.finished_transitions() {
            self.on_slide_finished(scene, finished)?;
        }

        let now = self.clock.now();
        let due = matches!(
            &self.phase,
            Phase::Ready(run)
                if matches!(run.step, StepState::Waiting { fire_at } if now >= fire_at)
        );
        if due {
            self.begin_step(scene)?;
        }

        Ok(())
    }

    /// Force-starts the cycle from the currently stored counter.
    pub fn animate(&mut self) {
        let Phase::Ready(run) = &mut self.phase else {
            return;
        };

        run.is_animated = true;
        if run.pairs.matched().is_none() || run.counter == 0 {
            warn!("banner has no usable cycle counter; staying static");
            return;
        }

        if matches!(run.step, StepState::Idle) {
            run.step = StepState::Waiting {
                fire_at: self.clock.now() + self.timings.delay,
            };
        }
    }

    /// Stops the cycle. In-flight motion finishes; an already-armed step
    /// still runs, and the cycle halts at its completion check.
    pub fn stop_animation(&mut self) {
        if let Phase::Ready(run) = &mut self.phase {
            run.is_animated = false;
        }
    }

    /// Re-measures the scene height and applies it to the container.
    ///
    /// Only acts while the banner holds a live resize subscription.
    pub fn sync_height(&mut self, scene: &mut impl Scene, viewport: &Viewport) {
        let Phase::Ready(run) = &self.phase else {
            return;
        };
        let Some(subscription) = &run.resize_subscription else {
            return;
        };
        if !viewport.is_subscribed(subscription) {
            return;
        }

        let height = scene.measured_height(run.svg);
        scene.set_attr(self.container, "style", &format!("height: {height:.2}px"));
    }

    fn finish_teardown(
        &mut self,
        scene: &mut impl Scene,
        viewport: &mut Viewport,
        mut run: Running,
    ) {
        // The pending step is dropped before the scene is touched, so a
        // queued step can never fire against removed nodes.
        run.step = StepState::Idle;
        scene.remove(run.group);
        if let Some(subscription) = run.resize_subscription.take() {
            viewport.unsubscribe(subscription);
        }
        debug!("banner torn down");
    }

    pub fn is_uninitialized(&self) -> bool {
        matches!(self.phase, Phase::Uninitialized)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Ready(_))
    }

    pub fn is_tearing_down(&self) -> bool {
        matches!(self.phase, Phase::TearingDown(_))
    }

    /// The current cycle counter, when one exists.
    pub fn counter(&self) -> Option<usize> {
        match &self.phase {
            Phase::Ready(run) => run.pairs.matched().map(|_| run.counter),
            _ => None,
        }
    }

    pub fn orientation(&self) -> Option<Orientation> {
        match &self.phase {
            Phase::Ready(run) | Phase::TearingDown(run) => Some(run.orientation),
            Phase::Uninitialized => None,
        }
    }

    /// When the next step fires, if one is scheduled.
    pub fn pending_step_at(&self) -> Option<Duration> {
        match &self.phase {
            Phase::Ready(run) => match run.step {
                StepState::Waiting { fire_at } => Some(fire_at),
                _ => None,
            },
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn verify_invariants(&self, scene: &impl Scene) {
        let Phase::Ready(run) = &self.phase else {
            return;
        };

        if let Some(count) = run.pairs.matched() {
            if count > 0 {
                assert!(
                    (1..=count).contains(&run.counter),
                    "counter {} out of range [1, {count}]",
                    run.counter,
                );

                // Tiles for the remaining cycle positions must still exist,
                // including the wrap tile.
                for side in Side::BOTH {
                    for index in 0..=run.counter.saturating_sub(1) {
                        let elem_id = format!("{}_split_{index}", side.name());
                        assert!(
                            scene.select(&elem_id).is_some(),
                            "missing tile {elem_id}",
                        );
                    }
                }
            }
        }
    }
}
