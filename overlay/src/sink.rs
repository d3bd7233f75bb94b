//! The display surfaces the engine writes to. The engine never owns any markup, it only
//! writes into named slots that something else draws.

mod memory;

pub use memory::{MemorySink, Surface};

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextSlot {
    Title,
    Artist,
    CurrentTime,
    TotalTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageSlot {
    Artwork,
    /// Blurred copy of the artwork behind the card. Not every sink has one.
    Ambient,
}

/// Parts of the card that can be switched off in the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Artwork,
    Artist,
    Progress,
    Time,
}

/// Elements with a class list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClassTarget {
    /// The display root, carries the theme marker.
    Root,
    /// The card itself, carries state and animation classes.
    Card,
    /// Anything inside the card. Only ever reported, never written to.
    Inner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleVar {
    Accent,
    Background,
    Text,
    FontSize,
    Radius,
    Blur,
    ArtRadius,
}

impl StyleVar {
    pub fn css_name(self) -> &'static str {
        match self {
            StyleVar::Accent => "--accent",
            StyleVar::Background => "--bg",
            StyleVar::Text => "--text",
            StyleVar::FontSize => "--font-size",
            StyleVar::Radius => "--radius",
            StyleVar::Blur => "--blur",
            StyleVar::ArtRadius => "--art-radius",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Align {
    Start,
    End,
}

pub const CLASS_HIDDEN: &str = "state-hidden";
pub const CLASS_PLAYING: &str = "playing";

/// Write access to the slots of whatever draws the overlay.
pub trait RenderSink {
    fn set_text(&mut self, slot: TextSlot, text: &str);

    /// `None` clears the image instead of leaving a broken reference.
    fn set_image(&mut self, slot: ImageSlot, src: Option<&str>);

    fn has_image_slot(&self, slot: ImageSlot) -> bool {
        let _ = slot;
        true
    }

    /// Width of the progress bar in percent, `0.0..=100.0`.
    fn set_progress_width(&mut self, percent: f64);

    fn set_style_var(&mut self, var: StyleVar, value: &str);

    fn add_class(&mut self, target: ClassTarget, class: &str);

    fn remove_class(&mut self, target: ClassTarget, class: &str);

    fn set_region_visible(&mut self, region: Region, visible: bool);

    /// Where the card sits on the screen, as `(horizontal, vertical)`.
    fn set_anchor(&mut self, justify: Align, align: Align);

    fn insert_custom_style(&mut self, css: &str);

    fn remove_custom_style(&mut self);

    /// Recompute layout so a class that was just removed is really gone before it is
    /// added again, which restarts its animation.
    fn force_layout(&mut self);

    /// Call `notifier` once the animation started by `class` on `target` is done.
    fn watch_animation_end(
        &mut self,
        target: ClassTarget,
        class: &str,
        notifier: AnimationNotifier,
    );

    /// Everything for this event has been written.
    fn flush(&mut self) {}
}

/// A finished animation, as reported by the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationEnd {
    pub target: ClassTarget,
    pub class: String,
    pub generation: u64,
}

pub type AnimationEvents = mpsc::UnboundedReceiver<AnimationEnd>;

/// Handed to the sink with every animation so it can say when it is done.
#[derive(Debug, Clone)]
pub struct AnimationNotifier {
    tx: mpsc::UnboundedSender<AnimationEnd>,
    class: String,
    generation: u64,
}

impl AnimationNotifier {
    pub fn class(&self) -> &str {
        &self.class
    }

    /// The animation ended on `target`, which might not be the element it was started on
    /// if the sink reports animations of children too.
    pub fn finished(self, target: ClassTarget) {
        let end = AnimationEnd {
            target,
            class: self.class,
            generation: self.generation,
        };
        if self.tx.send(end).is_err() {
            log::debug!("Animation ended after the engine went away");
        }
    }
}

/// Hands out notifiers that all report to the same place.
#[derive(Debug, Clone)]
pub struct AnimationWatcher {
    tx: mpsc::UnboundedSender<AnimationEnd>,
}

impl AnimationWatcher {
    pub fn new() -> (Self, AnimationEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn notifier(&self, class: &str, generation: u64) -> AnimationNotifier {
        AnimationNotifier {
            tx: self.tx.clone(),
            class: class.to_string(),
            generation,
        }
    }
}
