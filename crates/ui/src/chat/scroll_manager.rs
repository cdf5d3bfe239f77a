use gpui::{Pixels, point, px};
use gpui_component::VirtualListScrollHandle;

/// Near-bottom distance used to resume following the tail.
const FOLLOW_RESUME_THRESHOLD: Pixels = px(24.);
/// Ignores floating-point scroll jitter.
const SCROLL_DELTA_EPSILON: f32 = 1.0;

/// Follow-the-tail bookkeeping, kept apart from the scroll handle.
///
/// Offsets use GPUI's convention: scrolling down makes the Y offset negative,
/// so the tail sits at `-max_offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FollowState {
    pending: bool,
    follow_bottom: bool,
    last_offset: Pixels,
    last_max_offset: Pixels,
}

impl FollowState {
    fn new() -> Self {
        Self {
            pending: false,
            follow_bottom: true,
            last_offset: Pixels::ZERO,
            last_max_offset: Pixels::ZERO,
        }
    }

    fn request(&mut self) {
        self.pending = true;
        self.follow_bottom = true;
    }

    fn reset(&mut self) {
        *self = Self::new();
        self.pending = true;
    }

    /// Records the offsets the last layout produced and decides whether the
    /// user has scrolled away from (or back to) the tail.
    fn observe(&mut self, offset: Pixels, max_offset: Pixels) {
        let offset_delta = f32::from(offset) - f32::from(self.last_offset);
        let max_delta = (f32::from(max_offset) - f32::from(self.last_max_offset)).abs();
        let extent_changed = max_delta > SCROLL_DELTA_EPSILON;
        let scrolled_up = offset_delta > SCROLL_DELTA_EPSILON && !extent_changed;
        let scrolled_down = offset_delta < -SCROLL_DELTA_EPSILON && !extent_changed;

        if self.pending || (extent_changed && self.was_near_bottom()) {
            self.follow_bottom = true;
        } else if self.follow_bottom {
            if scrolled_up {
                self.follow_bottom = false;
            }
        } else if scrolled_down && is_near_bottom(offset, max_offset) {
            self.follow_bottom = true;
        }

        self.last_offset = offset;
        self.last_max_offset = max_offset;
    }

    /// Offset to pin to this frame, if any.
    ///
    /// While following, every frame re-pins against the freshest extent, so a
    /// request survives the list growing after this frame's layout.
    fn take_target(&mut self, max_offset: Pixels) -> Option<Pixels> {
        let should_scroll = self.follow_bottom || self.pending;
        self.pending = false;

        should_scroll.then(|| {
            if max_offset > Pixels::ZERO {
                -max_offset
            } else {
                Pixels::ZERO
            }
        })
    }

    fn was_near_bottom(&self) -> bool {
        is_near_bottom(self.last_offset, self.last_max_offset)
    }
}

fn is_near_bottom(offset: Pixels, max_offset: Pixels) -> bool {
    if max_offset <= Pixels::ZERO {
        return true;
    }

    (offset + max_offset).abs() <= FOLLOW_RESUME_THRESHOLD
}

/// Keeps the message list pinned to its newest row.
///
/// Every content change requests the tail. Following stays on across frames
/// until the user scrolls up, and resumes once they return near the bottom.
pub struct ScrollManager {
    scroll_handle: VirtualListScrollHandle,
    follow: FollowState,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self {
            scroll_handle: VirtualListScrollHandle::new(),
            follow: FollowState::new(),
        }
    }

    pub fn handle(&self) -> &VirtualListScrollHandle {
        &self.scroll_handle
    }

    pub fn request_scroll_to_bottom(&mut self) {
        self.follow.request();
    }

    pub fn reset(&mut self) {
        let current_x = self.scroll_handle.offset().x;
        self.scroll_handle.set_offset(point(current_x, Pixels::ZERO));
        self.follow.reset();
    }

    pub fn update_follow_state(&mut self) {
        let offset = self.scroll_handle.offset().y;
        let max_offset = self.scroll_handle.max_offset().height;
        self.follow.observe(offset, max_offset);
    }

    /// Pins the offset to the tail when following. Returns whether it moved.
    pub fn apply_pending_scroll(&mut self) -> bool {
        let max_offset = self.scroll_handle.max_offset().height;
        let Some(target_y) = self.follow.take_target(max_offset) else {
            return false;
        };

        let current_x = self.scroll_handle.offset().x;
        self.scroll_handle.set_offset(point(current_x, target_y));
        true
    }
}

impl Default for ScrollManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_survives_extent_growing_after_layout() {
        let mut state = FollowState::new();
        state.observe(px(-100.), px(100.));

        state.request();
        state.observe(px(-100.), px(100.));
        assert_eq!(state.take_target(px(100.)), Some(px(-100.)));

        // Layout adds a row after the pin: the next frame must reach the new tail.
        state.observe(px(-100.), px(140.));
        assert_eq!(state.take_target(px(140.)), Some(px(-140.)));

        // Measured heights differ from estimates: still follows.
        state.observe(px(-140.), px(152.));
        assert_eq!(state.take_target(px(152.)), Some(px(-152.)));
    }

    #[test]
    fn scrolling_up_pauses_following_until_next_request() {
        let mut state = FollowState::new();
        state.observe(px(-200.), px(200.));
        assert!(state.take_target(px(200.)).is_some());

        state.observe(px(-40.), px(200.));
        assert!(!state.follow_bottom);
        assert_eq!(state.take_target(px(200.)), None);

        state.request();
        state.observe(px(-40.), px(200.));
        assert_eq!(state.take_target(px(200.)), Some(px(-200.)));
    }

    #[test]
    fn returning_near_the_tail_resumes_following() {
        let mut state = FollowState::new();
        state.observe(px(-200.), px(200.));
        state.observe(px(-40.), px(200.));
        assert!(!state.follow_bottom);

        state.observe(px(-190.), px(200.));
        assert!(state.follow_bottom);
    }

    #[test]
    fn short_content_pins_to_top() {
        let mut state = FollowState::new();
        state.request();
        assert_eq!(state.take_target(Pixels::ZERO), Some(Pixels::ZERO));
    }

    #[test]
    fn reset_rewinds_and_requests_tail() {
        let mut manager = ScrollManager::new();

        manager.reset();

        assert_eq!(manager.handle().offset().y, Pixels::ZERO);
        assert!(manager.follow.follow_bottom);
        assert!(manager.apply_pending_scroll());
    }
}
