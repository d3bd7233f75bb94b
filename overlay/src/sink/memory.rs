use std::collections::{BTreeMap, BTreeSet};

use super::{
    Align, AnimationNotifier, ClassTarget, ImageSlot, Region, RenderSink, StyleVar, TextSlot,
};

/// What a [MemorySink] currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Surface {
    pub texts: BTreeMap<TextSlot, String>,
    pub images: BTreeMap<ImageSlot, Option<String>>,
    pub progress_width: Option<f64>,
    pub style_vars: BTreeMap<StyleVar, String>,
    pub classes: BTreeMap<ClassTarget, BTreeSet<String>>,
    pub regions: BTreeMap<Region, bool>,
    pub anchor: Option<(Align, Align)>,
    pub custom_styles: Vec<String>,
}

/// Keeps every write in memory. Useful for headless runs and for checking what the engine
/// did.
#[derive(Debug, Default)]
pub struct MemorySink {
    surface: Surface,
    ambient: bool,
    layouts: usize,
    flushes: usize,
    added: Vec<(ClassTarget, String)>,
    watched: Vec<AnimationNotifier>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            ambient: true,
            ..Default::default()
        }
    }

    pub fn without_ambient() -> Self {
        Self {
            ambient: false,
            ..Default::default()
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn text(&self, slot: TextSlot) -> Option<&str> {
        self.surface.texts.get(&slot).map(String::as_str)
    }

    pub fn image(&self, slot: ImageSlot) -> Option<&str> {
        self.surface.images.get(&slot).and_then(|src| src.as_deref())
    }

    pub fn progress_width(&self) -> Option<f64> {
        self.surface.progress_width
    }

    pub fn style_var(&self, var: StyleVar) -> Option<&str> {
        self.surface.style_vars.get(&var).map(String::as_str)
    }

    pub fn has_class(&self, target: ClassTarget, class: &str) -> bool {
        self.surface
            .classes
            .get(&target)
            .is_some_and(|set| set.contains(class))
    }

    pub fn classes(&self, target: ClassTarget) -> Vec<&str> {
        self.surface
            .classes
            .get(&target)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn region_visible(&self, region: Region) -> Option<bool> {
        self.surface.regions.get(&region).copied()
    }

    pub fn anchor(&self) -> Option<(Align, Align)> {
        self.surface.anchor
    }

    pub fn custom_styles(&self) -> &[String] {
        &self.surface.custom_styles
    }

    /// How many times `class` has been added to `target`, counting re-adds.
    pub fn times_added(&self, target: ClassTarget, class: &str) -> usize {
        self.added
            .iter()
            .filter(|(t, c)| *t == target && c == class)
            .count()
    }

    /// Animations started with a class beginning with `prefix`.
    pub fn animations_started(&self, prefix: &str) -> usize {
        self.added
            .iter()
            .filter(|(t, c)| *t == ClassTarget::Card && c.starts_with(prefix))
            .count()
    }

    pub fn layouts(&self) -> usize {
        self.layouts
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Animations that are waiting to be reported as done, oldest first.
    pub fn take_watched(&mut self) -> Vec<AnimationNotifier> {
        std::mem::take(&mut self.watched)
    }
}

impl RenderSink for MemorySink {
    fn set_text(&mut self, slot: TextSlot, text: &str) {
        self.surface.texts.insert(slot, text.to_string());
    }

    fn set_image(&mut self, slot: ImageSlot, src: Option<&str>) {
        if slot == ImageSlot::Ambient && !self.ambient {
            return;
        }
        self.surface.images.insert(slot, src.map(str::to_string));
    }

    fn has_image_slot(&self, slot: ImageSlot) -> bool {
        slot != ImageSlot::Ambient || self.ambient
    }

    fn set_progress_width(&mut self, percent: f64) {
        let percent = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        self.surface.progress_width = Some(percent);
    }

    fn set_style_var(&mut self, var: StyleVar, value: &str) {
        self.surface.style_vars.insert(var, value.to_string());
    }

    fn add_class(&mut self, target: ClassTarget, class: &str) {
        self.added.push((target, class.to_string()));
        self.surface
            .classes
            .entry(target)
            .or_default()
            .insert(class.to_string());
    }

    fn remove_class(&mut self, target: ClassTarget, class: &str) {
        if let Some(set) = self.surface.classes.get_mut(&target) {
            set.remove(class);
            if set.is_empty() {
                self.surface.classes.remove(&target);
            }
        }
    }

    fn set_region_visible(&mut self, region: Region, visible: bool) {
        self.surface.regions.insert(region, visible);
    }

    fn set_anchor(&mut self, justify: Align, align: Align) {
        self.surface.anchor = Some((justify, align));
    }

    fn insert_custom_style(&mut self, css: &str) {
        self.surface.custom_styles.push(css.to_string());
    }

    fn remove_custom_style(&mut self) {
        self.surface.custom_styles.pop();
    }

    fn force_layout(&mut self) {
        self.layouts += 1;
    }

    fn watch_animation_end(
        &mut self,
        target: ClassTarget,
        class: &str,
        notifier: AnimationNotifier,
    ) {
        debug_assert_eq!(target, ClassTarget::Card);
        debug_assert_eq!(class, notifier.class());
        self.watched.push(notifier);
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn progress_stays_in_range() {
        let mut sink = MemorySink::new();
        sink.set_progress_width(42.5);
        assert_eq!(Some(42.5), sink.progress_width());
        sink.set_progress_width(140.0);
        assert_eq!(Some(100.0), sink.progress_width());
        sink.set_progress_width(-3.0);
        assert_eq!(Some(0.0), sink.progress_width());
        sink.set_progress_width(f64::NAN);
        assert_eq!(Some(0.0), sink.progress_width());
    }
}
