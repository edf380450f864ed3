use std::time::Duration;

use crate::config::Configuration;
use crate::events::{Direction, Notification};

/// User-controlled playback settings. Owned by the scheduler task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackState {
    autoplay: bool,
    interval: Duration,
    min_interval: Duration,
    max_interval: Duration,
    step: Duration,
    show_caption: bool,
}

impl PlaybackState {
    pub fn new(cfg: &Configuration) -> Self {
        Self::with_bounds(
            cfg.autoplay,
            cfg.slide_interval,
            cfg.min_slide_interval,
            cfg.max_slide_interval,
            cfg.slide_interval_step,
            cfg.caption.visible,
        )
    }

    pub fn with_bounds(
        autoplay: bool,
        interval: Duration,
        min_interval: Duration,
        max_interval: Duration,
        step: Duration,
        show_caption: bool,
    ) -> Self {
        Self {
            autoplay,
            interval: interval.clamp(min_interval, max_interval),
            min_interval,
            max_interval,
            step,
            show_caption,
        }
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn show_caption(&self) -> bool {
        self.show_caption
    }

    /// Returns whether the flag actually changed.
    pub fn set_autoplay(&mut self, autoplay: bool) -> bool {
        let changed = self.autoplay != autoplay;
        self.autoplay = autoplay;
        changed
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.autoplay = !self.autoplay;
        self.autoplay
    }

    /// `Forward` lengthens the interval by one step, `Backward` shortens
    /// it. Returns the new interval only when it changed.
    pub fn adjust_speed(&mut self, direction: Direction) -> Option<Duration> {
        let adjusted = match direction {
            Direction::Forward => self.interval.saturating_add(self.step),
            Direction::Backward => self.interval.saturating_sub(self.step),
        }
        .clamp(self.min_interval, self.max_interval);
        if adjusted == self.interval {
            return None;
        }
        self.interval = adjusted;
        Some(adjusted)
    }

    pub fn toggle_caption(&mut self) -> bool {
        self.show_caption = !self.show_caption;
        self.show_caption
    }

    pub fn autoplay_notification(&self) -> Notification {
        let message = if self.autoplay {
            "Slideshow resumed"
        } else {
            "Slideshow paused"
        };
        Notification::info("Slideshow", message)
    }

    pub fn interval_notification(&self) -> Notification {
        Notification::info(
            "Slide interval",
            format!("Interval: {} s", self.interval.as_secs()),
        )
    }

    pub fn caption_notification(&self) -> Notification {
        let message = if self.show_caption {
            "Captions shown"
        } else {
            "Captions hidden"
        };
        Notification::info("Captions", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(interval: u64, min: u64, max: u64) -> PlaybackState {
        PlaybackState::with_bounds(
            true,
            Duration::from_secs(interval),
            Duration::from_secs(min),
            Duration::from_secs(max),
            Duration::from_secs(1),
            true,
        )
    }

    #[test]
    fn speed_down_stops_at_minimum() {
        let mut s = state(5, 3, 60);
        for _ in 0..100 {
            s.adjust_speed(Direction::Backward);
        }
        assert_eq!(s.interval(), Duration::from_secs(3));
    }

    #[test]
    fn speed_up_stops_at_maximum() {
        let mut s = state(58, 3, 60);
        assert_eq!(
            s.adjust_speed(Direction::Forward),
            Some(Duration::from_secs(59))
        );
        assert_eq!(
            s.adjust_speed(Direction::Forward),
            Some(Duration::from_secs(60))
        );
        assert_eq!(s.adjust_speed(Direction::Forward), None);
        assert_eq!(s.interval_notification().message, "Interval: 60 s");
    }

    #[test]
    fn clamped_step_still_reports_the_change() {
        let mut s = PlaybackState::with_bounds(
            true,
            Duration::from_secs(4),
            Duration::from_secs(3),
            Duration::from_secs(60),
            Duration::from_secs(2),
            true,
        );
        assert_eq!(
            s.adjust_speed(Direction::Backward),
            Some(Duration::from_secs(3))
        );
        assert_eq!(s.adjust_speed(Direction::Backward), None);
    }

    #[test]
    fn initial_interval_is_clamped() {
        assert_eq!(state(1, 3, 60).interval(), Duration::from_secs(3));
    }

    #[test]
    fn autoplay_reports_changes_only() {
        let mut s = state(5, 3, 60);
        assert!(!s.set_autoplay(true));
        assert!(s.set_autoplay(false));
        assert_eq!(s.autoplay_notification().message, "Slideshow paused");
        assert!(s.toggle_pause());
        assert_eq!(s.autoplay_notification().message, "Slideshow resumed");
    }

    #[test]
    fn caption_toggle() {
        let mut s = state(5, 3, 60);
        assert!(!s.toggle_caption());
        assert_eq!(s.caption_notification().message, "Captions hidden");
    }
}
