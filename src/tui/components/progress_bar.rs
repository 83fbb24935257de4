//! # Progress Bar
//!
//! A one-row bar under the browser chrome. The filled width is the track
//! width times the clamped progress; changes are eased (ease-in-out over
//! 0.2 s) rather than jumping.
//!
//! `ProgressAnimation` is persistent state in the browser session; the
//! `ProgressBar` widget is built each frame from its current value.

use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

pub const EASE_DURATION: Duration = Duration::from_millis(200);

/// Cubic ease-in-out over `t` in [0, 1].
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Cells to fill on a track `track` cells wide.
pub fn filled_width(track: u16, progress: f64) -> u16 {
    let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    (f64::from(track) * progress).round() as u16
}

#[derive(Debug, Clone)]
pub struct ProgressAnimation {
    from: f64,
    to: f64,
    started: Option<Instant>,
}

impl ProgressAnimation {
    pub fn new() -> Self {
        Self {
            from: 0.0,
            to: 0.0,
            started: None,
        }
    }

    /// Start easing toward `target` from wherever the bar is at `now`.
    pub fn set_target(&mut self, target: f64, now: Instant) {
        if target == self.to {
            return;
        }
        self.from = self.value_at(now);
        self.to = target;
        self.started = Some(now);
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    pub fn value_at(&self, now: Instant) -> f64 {
        let Some(started) = self.started else {
            return self.to;
        };
        let t = now.saturating_duration_since(started).as_secs_f64() / EASE_DURATION.as_secs_f64();
        self.from + (self.to - self.from) * ease_in_out(t)
    }

    /// Whether frames are still needed to finish the current ease.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.started
            .is_some_and(|s| now.saturating_duration_since(s) < EASE_DURATION)
    }
}

impl Default for ProgressAnimation {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ProgressBar {
    /// Current (eased) progress in [0, 1].
    pub value: f64,
}

impl Component for ProgressBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let filled = filled_width(area.width, self.value);
        let rest = area.width.saturating_sub(filled);
        let line = Line::from(vec![
            Span::styled("━".repeat(filled as usize), Style::default().fg(Color::Cyan)),
            Span::styled("─".repeat(rest as usize), Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(line, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_filled_width_clamps() {
        assert_eq!(filled_width(100, 0.0), 0);
        assert_eq!(filled_width(100, 0.25), 25);
        assert_eq!(filled_width(100, 1.0), 100);
        assert_eq!(filled_width(100, 1.7), 100);
        assert_eq!(filled_width(100, -0.3), 0);
        assert_eq!(filled_width(100, f64::NAN), 0);
        assert_eq!(filled_width(0, 0.5), 0);
    }

    #[test]
    fn test_ease_endpoints_and_midpoint() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-9);
        assert!(ease_in_out(0.25) < 0.25);
        assert!(ease_in_out(0.75) > 0.75);
        assert_eq!(ease_in_out(2.0), 1.0);
    }

    #[test]
    fn test_animation_eases_to_target() {
        let start = Instant::now();
        let mut anim = ProgressAnimation::new();
        anim.set_target(1.0, start);

        assert_eq!(anim.value_at(start), 0.0);
        assert!(anim.is_animating(start + Duration::from_millis(100)));
        let mid = anim.value_at(start + Duration::from_millis(100));
        assert!(mid > 0.0 && mid < 1.0);
        assert_eq!(anim.value_at(start + EASE_DURATION), 1.0);
        assert!(!anim.is_animating(start + EASE_DURATION));
    }

    #[test]
    fn test_retarget_starts_from_current_value() {
        let start = Instant::now();
        let mut anim = ProgressAnimation::new();
        anim.set_target(1.0, start);
        let halfway = start + Duration::from_millis(100);
        let value = anim.value_at(halfway);

        anim.set_target(0.0, halfway);
        assert!((anim.value_at(halfway) - value).abs() < 1e-9);
        assert_eq!(anim.value_at(halfway + EASE_DURATION), 0.0);
        assert_eq!(anim.target(), 0.0);
    }

    #[test]
    fn test_render_fills_proportionally() {
        let backend = TestBackend::new(20, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut bar = ProgressBar { value: 0.5 };
        terminal.draw(|f| bar.render(f, f.area())).unwrap();

        let symbols: Vec<String> = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol().to_string())
            .collect();
        assert_eq!(symbols.iter().filter(|s| *s == "━").count(), 10);
        assert_eq!(symbols.iter().filter(|s| *s == "─").count(), 10);
    }
}
