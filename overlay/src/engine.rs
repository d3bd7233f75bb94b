use protocol::{DisplayConfig, SongInfo};
use tokio::time::Instant;

use crate::{
    interpolator,
    presentation::Presentation,
    reconciler::{OverlayState, Reconciled, Reconciler},
    sink::{AnimationEnd, AnimationWatcher, RenderSink},
    snapshot::PlaybackSnapshot,
};

/// Everything one display session knows: the sink it draws on, the applied config and the
/// state of the card.
pub struct OverlayEngine<S> {
    sink: S,
    presentation: Presentation,
    reconciler: Reconciler,
    config: Option<DisplayConfig>,
}

impl<S: RenderSink> OverlayEngine<S> {
    pub fn new(mut sink: S, watcher: AnimationWatcher) -> Self {
        let reconciler = Reconciler::new(watcher, &mut sink);
        sink.flush();
        Self {
            sink,
            presentation: Presentation::new(),
            reconciler,
            config: None,
        }
    }

    pub fn apply_config(&mut self, conf: DisplayConfig) {
        self.presentation.apply(&conf, &mut self.sink);
        self.config = Some(conf);
        self.sink.flush();
    }

    /// The last applied config, if any.
    pub fn config(&self) -> Option<&DisplayConfig> {
        self.config.as_ref()
    }

    /// A snapshot arrived at `now`.
    pub fn handle_snapshot(&mut self, info: SongInfo, now: Instant) -> Reconciled {
        let snap = PlaybackSnapshot::received(info, now);
        let res =
            self.reconciler
                .reconcile(snap, self.presentation.animation(), &mut self.sink);
        log::debug!("Reconciled snapshot: {:?}", res);
        self.sink.flush();
        res
    }

    pub fn handle_animation_end(&mut self, end: AnimationEnd) {
        if self.reconciler.animation_ended(&end, &mut self.sink) {
            self.sink.flush();
        }
    }

    /// One frame. Does nothing while no song is shown.
    pub fn tick(&mut self, now: Instant) {
        if let Some(snap) = self.reconciler.loaded() {
            interpolator::render_position(snap, now, &mut self.sink);
            self.sink.flush();
        }
    }

    pub fn state(&self) -> &OverlayState {
        self.reconciler.state()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
