//! The perpetual step cycle.
//!
//! One step slides the tile pair at the current counter out of view on both
//! sides at once. The two sides complete independently, so completion is an
//! explicit join: the step is over when every transition it started has
//! reported back. Only then is the single inter-step timer armed, which
//! keeps "at most one pending timer" true by construction.

use std::time::Duration;

use anyhow::Context as _;
use tracing::{debug, trace, warn};

use super::{layout, Banner, Phase};
use crate::animation::Curve;
use crate::geometry::{slide_vector, MotionProfile, Side};
use crate::scene::{FinishedTransition, Scene, TransitionId};

/// Whether the two sides hold equally long tile sequences.
///
/// Unequal sides cannot run a synchronized cycle; the banner then builds the
/// static layout and refuses to animate rather than guessing a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairCount {
    Matched(usize),
    Mismatched { left: usize, right: usize },
}

impl PairCount {
    pub fn new(left: usize, right: usize) -> Self {
        if left == right {
            PairCount::Matched(left)
        } else {
            PairCount::Mismatched { left, right }
        }
    }

    pub fn matched(&self) -> Option<usize> {
        match self {
            PairCount::Matched(count) => Some(*count),
            PairCount::Mismatched { .. } => None,
        }
    }
}

/// Where the cycle currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepState {
    /// Nothing scheduled and nothing mid-motion.
    Idle,
    /// One tile pair is mid-motion; the step completes when every listed
    /// transition has finished.
    Sliding { pending: Vec<TransitionId> },
    /// The next step fires once the clock reaches `fire_at`.
    Waiting { fire_at: Duration },
}

impl Banner {
    /// Starts the step for the current counter: both sides' tiles slide out
    /// simultaneously.
    ///
    /// The slide always uses the vertical-style motion profile, also in
    /// horizontal orientation; see [`slide_vector`].
    pub(super) fn begin_step(&mut self, scene: &mut impl Scene) -> anyhow::Result<()> {
        let Phase::Ready(run) = &mut self.phase else {
            return Ok(());
        };

        let counter = run.counter;
        trace!("step {counter} starting");

        let mut pending = Vec::with_capacity(2);
        for side in Side::BOTH {
            let elem_id = format!("{}_split_{counter}", side.name());
            let node = scene
                .select(&elem_id)
                .with_context(|| format!("tile {elem_id} missing from the scene"))?;

            let target = slide_vector(run.orientation, MotionProfile::Vertical, side);
            let transition =
                scene.animate_transform(node, target, self.timings.slide, Curve::EaseInOutCubic);
            pending.push(transition);
            self.hooks.slide_start();
        }

        run.step = StepState::Sliding { pending };
        Ok(())
    }

    /// Handles one side's slide reaching its target: the tile leaves the
    /// scene, and when the whole pair has reported, the cycle moves on.
    pub(super) fn on_slide_finished(
        &mut self,
        scene: &mut impl Scene,
        finished: FinishedTransition,
    ) -> anyhow::Result<()> {
        let Phase::Ready(run) = &mut self.phase else {
            return Ok(());
        };
        let StepState::Sliding { pending } = &mut run.step else {
            return Ok(());
        };
        let Some(position) = pending.iter().position(|t| *t == finished.transition) else {
            return Ok(());
        };

        pending.remove(position);
        let step_complete = pending.is_empty();
        scene.remove(finished.node);

        if !run.is_animated {
            // Stopping keeps the counter bookkeeping so a later animate()
            // restarts against tiles that still exist, but arms no timer.
            if step_complete {
                self.complete_step(scene, false)?;
            }
            return Ok(());
        }

        self.hooks.slide_end();

        if step_complete {
            self.complete_step(scene, true)?;
        }
        Ok(())
    }

    /// Advances the counter once both sides are done. Wrapping to zero
    /// rebuilds the whole tile stack from scratch, which clears any drift a
    /// full cycle could have accumulated.
    fn complete_step(&mut self, scene: &mut impl Scene, arm_timer: bool) -> anyhow::Result<()> {
        let Phase::Ready(run) = &mut self.phase else {
            return Ok(());
        };

        let Some(count) = run.pairs.matched() else {
            warn!("step completed without a matched pair count");
            run.step = StepState::Idle;
            return Ok(());
        };

        run.counter -= 1;
        if run.counter == 0 {
            run.counter = count;
            scene.remove(run.group);
            run.group = layout::build(scene, run.svg, run.orientation, &run.inventory)?;
            debug!("cycle complete; tile stack rebuilt");
        }

        run.step = if arm_timer {
            StepState::Waiting {
                fire_at: self.clock.now() + self.timings.delay,
            }
        } else {
            StepState::Idle
        };
        Ok(())
    }
}
