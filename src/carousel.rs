//! One card per record in a vertically scrolling viewport.
//!
//! The current card follows the user in both directions: navigating scrolls
//! the viewport to the card, scrolling the viewport selects the card that
//! covers most of it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::trace;

/// Time after a navigation during which further navigation and scroll
/// inference are ignored.
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);
// Idle time after a user scroll before the viewport snaps to the current card
const SNAP_DELAY: Duration = Duration::from_millis(150);
// Length of a smooth scroll, shorter than SETTLE_DELAY
const SCROLL_DURATION: Duration = Duration::from_millis(300);

/// Smooth scroll between two offsets, eased out over SCROLL_DURATION.
#[derive(Debug, Clone, Copy)]
struct ScrollAnimation {
    from: usize,
    to: usize,
    start: Instant,
}

impl ScrollAnimation {
    fn offset_at(&self, now: Instant) -> usize {
        let elapsed = now.saturating_duration_since(self.start);
        if elapsed >= SCROLL_DURATION {
            return self.to;
        }
        let progress = elapsed.as_secs_f64() / SCROLL_DURATION.as_secs_f64();
        let eased = 1.0 - (1.0 - progress).powi(2);
        let (from, to) = (self.from as f64, self.to as f64);
        (from + (to - from) * eased).round() as usize
    }
}

#[derive(Debug, Default)]
pub struct CarouselPosition {
    len: usize,
    index: usize,
    offset: usize,      // Scroll offset in rows from the top of the first card
    viewport: usize,    // Visible rows
    card_height: usize, // Every card fills the viewport
    in_flight: Option<Instant>,
    animation: Option<ScrollAnimation>,
    last_scroll: Option<Instant>,
}

impl CarouselPosition {
    fn new(len: usize) -> Self {
        Self {
            len,
            card_height: 1,
            ..Default::default()
        }
    }

    #[cfg(test)]
    fn reset(&mut self, len: usize) {
        trace!("Carousel reset, {len} cards");
        self.len = len;
        self.index = 0;
        self.offset = 0;
        self.in_flight = None;
        self.animation = None;
        self.last_scroll = None;
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn card_height(&self) -> usize {
        self.card_height
    }

    pub fn set_viewport(&mut self, height: usize) {
        if height == self.viewport {
            return;
        }
        self.viewport = height;
        self.card_height = height.max(1);
        self.offset = self.index * self.card_height;
        self.animation = None;
    }

    fn max_offset(&self) -> usize {
        self.len.saturating_sub(1) * self.card_height
    }

    pub fn is_navigating(&self, now: Instant) -> bool {
        self.in_flight
            .is_some_and(|since| now.saturating_duration_since(since) < SETTLE_DELAY)
    }

    /// Returns false when the request was ignored.
    pub fn navigate_to(&mut self, index: usize, now: Instant) -> bool {
        if index >= self.len || self.is_navigating(now) {
            return false;
        }
        trace!("Navigate to card {index}");
        self.in_flight = Some(now);
        self.index = index;
        self.scroll_to(index * self.card_height, now);
        true
    }

    pub fn next(&mut self, now: Instant) -> bool {
        self.navigate_to(self.index + 1, now)
    }

    pub fn previous(&mut self, now: Instant) -> bool {
        match self.index.checked_sub(1) {
            Some(index) => self.navigate_to(index, now),
            None => false,
        }
    }

    /// User driven scroll, e.g. the mouse wheel.
    pub fn scroll_by(&mut self, delta: isize, now: Instant) {
        if self.len == 0 {
            return;
        }
        self.offset = self
            .offset
            .saturating_add_signed(delta)
            .min(self.max_offset());
        self.animation = None;
        self.last_scroll = Some(now);
        self.on_scroll(now);
    }

    /// Re-derive the current card from the scroll offset. Returns true when
    /// the index changed.
    pub fn on_scroll(&mut self, now: Instant) -> bool {
        if self.is_navigating(now) || self.len == 0 || self.viewport == 0 {
            return false;
        }
        let best = self.most_visible();
        if best != self.index {
            trace!("Scrolled to card {best}");
            self.index = best;
            return true;
        }
        false
    }

    fn most_visible(&self) -> usize {
        let h = self.card_height;
        let top = self.offset;
        let bottom = top + self.viewport;
        let first = top / h;
        let last = std::cmp::min(self.len, bottom.div_ceil(h));

        let mut best = self.index;
        let mut best_area = 0;
        for idx in first..last {
            let card_top = idx * h;
            let visible_top = std::cmp::max(card_top, top);
            let visible_bottom = std::cmp::min(card_top + h, bottom);
            if visible_bottom > visible_top && visible_bottom - visible_top > best_area {
                best_area = visible_bottom - visible_top;
                best = idx;
            }
        }
        best
    }

    fn scroll_to(&mut self, offset: usize, now: Instant) {
        self.animation = Some(ScrollAnimation {
            from: self.offset,
            to: offset,
            start: now,
        });
    }

    /// Advance timers and the scroll animation. Animation frames only move
    /// the offset, the current card is already the one being scrolled to.
    pub fn tick(&mut self, now: Instant) {
        if self.in_flight.is_some() && !self.is_navigating(now) {
            self.in_flight = None;
        }

        let resting = self.index * self.card_height;
        if self.animation.is_none()
            && self.in_flight.is_none()
            && self.offset != resting
            && self
                .last_scroll
                .is_some_and(|at| now.saturating_duration_since(at) >= SNAP_DELAY)
        {
            self.scroll_to(resting, now);
        }

        if let Some(animation) = self.animation {
            self.offset = animation.offset_at(now);
            if self.offset == animation.to {
                self.animation = None;
                self.last_scroll = None;
            }
        }
    }

    /// Cards intersecting the viewport with their top edge relative to it.
    pub fn visible_cards(&self) -> Vec<(usize, isize)> {
        if self.len == 0 || self.viewport == 0 {
            return Vec::new();
        }
        let h = self.card_height;
        let first = self.offset / h;
        let last = std::cmp::min(self.len, (self.offset + self.viewport).div_ceil(h));
        (first..last)
            .map(|idx| (idx, (idx * h) as isize - self.offset as isize))
            .collect()
    }

    /// Single cards get no navigation controls.
    pub fn shows_controls(&self) -> bool {
        self.len > 1
    }

    pub fn can_previous(&self, now: Instant) -> bool {
        self.shows_controls() && self.index > 0 && !self.is_navigating(now)
    }

    pub fn can_next(&self, now: Instant) -> bool {
        self.shows_controls() && self.index + 1 < self.len && !self.is_navigating(now)
    }
}

pub struct CardCarousel<T> {
    data: Arc<Vec<T>>,
    position: CarouselPosition,
}

impl<T> CardCarousel<T> {
    pub fn new(data: Arc<Vec<T>>) -> Self {
        let position = CarouselPosition::new(data.len());
        Self { data, position }
    }

    /// A different sequence (by identity) starts over at the first card.
    #[cfg(test)]
    pub fn set_data(&mut self, data: Arc<Vec<T>>) {
        if Arc::ptr_eq(&self.data, &data) {
            return;
        }
        self.position.reset(data.len());
        self.data = data;
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn current(&self) -> Option<&T> {
        self.data.get(self.position.index)
    }

    pub fn position(&self) -> &CarouselPosition {
        &self.position
    }

    pub fn position_mut(&mut self) -> &mut CarouselPosition {
        &mut self.position
    }
}
