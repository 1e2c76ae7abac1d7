//! Viewport width tracking and resize fan-out.
//!
//! The host environment owns the real resize events; this module keeps the
//! last known width, decides which orientation it maps to, and hands out
//! explicitly owned resize subscriptions. A subscription is acquired on
//! banner initialization and released on teardown, so listeners can never
//! accumulate across init/destroy cycles.

use std::collections::HashSet;

use tracing::debug;

use crate::geometry::Orientation;

/// An owned registration for resize notifications.
///
/// Not cloneable: whoever holds it is responsible for releasing it via
/// [`Viewport::unsubscribe`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ResizeSubscription(u64);

#[derive(Debug)]
pub struct Viewport {
    width: f64,
    /// Widths strictly above this get the horizontal layout.
    breakpoint_max_width: f64,
    subscribers: HashSet<u64>,
    next_subscription: u64,
}

impl Viewport {
    pub fn new(width: f64, breakpoint_max_width: f64) -> Self {
        Self {
            width,
            breakpoint_max_width,
            subscribers: HashSet::new(),
            next_subscription: 0,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// The orientation matching the current width.
    pub fn orientation(&self) -> Orientation {
        if self.width > self.breakpoint_max_width {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }

    /// Records a new width. Returns the new orientation if the breakpoint
    /// was crossed.
    pub fn set_width(&mut self, width: f64) -> Option<Orientation> {
        let before = self.orientation();
        self.width = width;
        let after = self.orientation();
        if before != after {
            debug!("breakpoint crossed at width {width}: now {after:?}");
            Some(after)
        } else {
            None
        }
    }

    pub fn subscribe(&mut self) -> ResizeSubscription {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.insert(id);
        ResizeSubscription(id)
    }

    pub fn unsubscribe(&mut self, subscription: ResizeSubscription) {
        self.subscribers.remove(&subscription.0);
    }

    pub fn is_subscribed(&self, subscription: &ResizeSubscription) -> bool {
        self.subscribers.contains(&subscription.0)
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_from_width() {
        let viewport = Viewport::new(1280., 1023.);
        assert_eq!(viewport.orientation(), Orientation::Horizontal);

        let viewport = Viewport::new(1023., 1023.);
        assert_eq!(viewport.orientation(), Orientation::Vertical);
    }

    #[test]
    fn crossing_is_reported_once() {
        let mut viewport = Viewport::new(1280., 1023.);
        assert_eq!(viewport.set_width(1200.), None);
        assert_eq!(viewport.set_width(800.), Some(Orientation::Vertical));
        assert_eq!(viewport.set_width(700.), None);
        assert_eq!(viewport.set_width(1100.), Some(Orientation::Horizontal));
    }

    #[test]
    fn subscriptions_are_scoped() {
        let mut viewport = Viewport::new(1280., 1023.);
        let a = viewport.subscribe();
        let b = viewport.subscribe();
        assert_eq!(viewport.subscription_count(), 2);
        assert!(viewport.is_subscribed(&a));

        viewport.unsubscribe(a);
        assert_eq!(viewport.subscription_count(), 1);
        assert!(viewport.is_subscribed(&b));
    }
}
