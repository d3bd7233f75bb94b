use protocol::TransitionAnimation;

use crate::{
    sink::{
        AnimationEnd, AnimationWatcher, ClassTarget, ImageSlot, RenderSink, TextSlot,
        CLASS_HIDDEN, CLASS_PLAYING,
    },
    snapshot::PlaybackSnapshot,
};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayState {
    pub visible: bool,
    pub playing: bool,
    /// Empty until the first song has been shown.
    pub last_rendered_title: String,
    /// Set only while a song change animation is running.
    pub active_animation_class: Option<String>,
}

/// What a snapshot did to the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    Hidden,
    StillHidden,
    SameSong,
    NewSong { animated: bool },
}

/// Turns snapshots into visibility, text and animation changes on the sink.
pub struct Reconciler {
    state: OverlayState,
    snapshot: Option<PlaybackSnapshot>,
    watcher: AnimationWatcher,
    generation: u64,
}

impl Reconciler {
    /// Starts out hidden, and makes sure the sink agrees.
    pub fn new<S: RenderSink>(watcher: AnimationWatcher, sink: &mut S) -> Self {
        sink.add_class(ClassTarget::Card, CLASS_HIDDEN);
        Self {
            state: OverlayState::default(),
            snapshot: None,
            watcher,
            generation: 0,
        }
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    /// The snapshot to interpolate from, if a song is on display.
    pub fn loaded(&self) -> Option<&PlaybackSnapshot> {
        self.snapshot.as_ref().filter(|_| self.state.visible)
    }

    pub fn reconcile<S: RenderSink>(
        &mut self,
        snap: PlaybackSnapshot,
        animation: &TransitionAnimation,
        sink: &mut S,
    ) -> Reconciled {
        let title = match snap.title() {
            None => return self.hide(sink),
            Some(title) => title.to_string(),
        };

        if !self.state.visible {
            log::info!("Something is playing, showing the overlay");
            sink.remove_class(ClassTarget::Card, CLASS_HIDDEN);
            self.state.visible = true;
        }

        self.state.playing = snap.is_playing;
        if snap.is_playing {
            sink.add_class(ClassTarget::Card, CLASS_PLAYING);
        } else {
            sink.remove_class(ClassTarget::Card, CLASS_PLAYING);
        }

        let mut outcome = Reconciled::SameSong;
        if title != self.state.last_rendered_title {
            let first_song = self.state.last_rendered_title.is_empty();
            render_song(&snap, &title, sink);

            let animated = match animation.class() {
                Some(class) if !first_song => {
                    self.start_animation(class, sink);
                    true
                }
                _ => false,
            };
            log::info!("Now showing '{}' (animated: {})", title, animated);
            outcome = Reconciled::NewSong { animated };
            self.state.last_rendered_title = title;
        }

        self.snapshot = Some(snap);
        outcome
    }

    fn hide<S: RenderSink>(&mut self, sink: &mut S) -> Reconciled {
        let outcome = if self.state.visible {
            log::info!("Nothing is playing, hiding the overlay");
            sink.add_class(ClassTarget::Card, CLASS_HIDDEN);
            if let Some(class) = self.state.active_animation_class.take() {
                sink.remove_class(ClassTarget::Card, &class);
            }
            self.state.visible = false;
            Reconciled::Hidden
        } else {
            Reconciled::StillHidden
        };
        sink.remove_class(ClassTarget::Card, CLASS_PLAYING);
        self.state.playing = false;
        outcome
    }

    fn start_animation<S: RenderSink>(&mut self, class: String, sink: &mut S) {
        if let Some(old) = self.state.active_animation_class.take() {
            sink.remove_class(ClassTarget::Card, &old);
        }
        sink.remove_class(ClassTarget::Card, &class);
        sink.force_layout();
        sink.add_class(ClassTarget::Card, &class);

        self.generation += 1;
        let notifier = self.watcher.notifier(&class, self.generation);
        sink.watch_animation_end(ClassTarget::Card, &class, notifier);
        self.state.active_animation_class = Some(class);
    }

    /// Returns true if this ended the running animation.
    pub fn animation_ended<S: RenderSink>(&mut self, end: &AnimationEnd, sink: &mut S) -> bool {
        if end.target != ClassTarget::Card || end.generation != self.generation {
            log::trace!("Ignoring an unrelated animation end: {:?}", end);
            return false;
        }
        match &self.state.active_animation_class {
            Some(class) if *class == end.class => {
                sink.remove_class(ClassTarget::Card, class);
                self.state.active_animation_class = None;
                true
            }
            _ => false,
        }
    }
}

fn render_song<S: RenderSink>(snap: &PlaybackSnapshot, title: &str, sink: &mut S) {
    sink.set_text(TextSlot::Title, title);
    sink.set_text(
        TextSlot::Artist,
        snap.artist.as_deref().unwrap_or(UNKNOWN_ARTIST),
    );

    let art = snap.art_source();
    sink.set_image(ImageSlot::Artwork, art.as_deref());
    if sink.has_image_slot(ImageSlot::Ambient) {
        sink.set_image(ImageSlot::Ambient, art.as_deref());
    }
}
