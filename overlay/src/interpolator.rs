use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    sink::{RenderSink, TextSlot},
    snapshot::PlaybackSnapshot,
};

pub const DEFAULT_FRAME: Duration = Duration::from_micros(16_700);

/// Where in the song we probably are at `now`, going from the last snapshot.
pub fn display_secs(snap: &PlaybackSnapshot, now: Instant) -> f64 {
    let elapsed = if snap.is_playing {
        now.saturating_duration_since(snap.received_at).as_secs_f64()
    } else {
        0.0
    };
    (snap.position_secs + elapsed).clamp(0.0, snap.length_secs)
}

pub fn progress_percent(display_secs: f64, length_secs: f64) -> f64 {
    if length_secs > 0.0 {
        (display_secs / length_secs * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// `m:ss`
pub fn timestamp(secs: f64) -> String {
    let int = if secs.is_finite() && secs > 0.0 {
        secs as u64
    } else {
        0
    };
    format!("{}:{:02}", int / 60, int % 60)
}

/// Renders the position for one frame.
pub fn render_position<S: RenderSink>(snap: &PlaybackSnapshot, now: Instant, sink: &mut S) {
    let secs = display_secs(snap, now);
    sink.set_text(TextSlot::CurrentTime, &timestamp(secs));
    sink.set_text(TextSlot::TotalTime, &timestamp(snap.length_secs));
    sink.set_progress_width(progress_percent(secs, snap.length_secs));
}

/// Ticks once per frame until cancelled, or until it has ticked as many times as it was
/// allowed to.
pub struct FrameClock {
    interval: Interval,
    token: CancellationToken,
    remaining: Option<u64>,
}

impl FrameClock {
    pub fn new(period: Duration, token: CancellationToken) -> Self {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            interval,
            token,
            remaining: None,
        }
    }

    pub fn bounded(period: Duration, token: CancellationToken, ticks: u64) -> Self {
        Self {
            remaining: Some(ticks),
            ..Self::new(period, token)
        }
    }

    /// `None` once the clock has stopped.
    /// Safe to drop before it completes, a tick only counts once it has been returned.
    pub async fn tick(&mut self) -> Option<Instant> {
        if self.remaining == Some(0) {
            return None;
        }
        let now = tokio::select! {
            _ = self.token.cancelled() => None,
            now = self.interval.tick() => Some(now),
        }?;
        if let Some(n) = &mut self.remaining {
            *n -= 1;
        }
        Some(now)
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}
