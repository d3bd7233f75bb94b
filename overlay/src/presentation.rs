use protocol::{Anchor, DisplayConfig, Theme, TransitionAnimation};

use crate::sink::{Align, ClassTarget, Region, RenderSink, StyleVar};

/// Puts a [DisplayConfig] on the sink. Can be run any number of times, applying the same
/// config twice leaves the sink exactly as applying it once.
#[derive(Debug, Default)]
pub struct Presentation {
    theme: Option<Theme>,
    custom_style: bool,
    animation: TransitionAnimation,
}

pub fn anchor_alignment(anchor: Anchor) -> (Align, Align) {
    match anchor {
        Anchor::TopLeft => (Align::Start, Align::Start),
        Anchor::TopRight => (Align::End, Align::Start),
        Anchor::BottomLeft => (Align::Start, Align::End),
        Anchor::BottomRight => (Align::End, Align::End),
    }
}

impl Presentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// The animation to play on song changes, as of the latest config.
    pub fn animation(&self) -> &TransitionAnimation {
        &self.animation
    }

    pub fn theme(&self) -> Option<Theme> {
        self.theme
    }

    pub fn apply<S: RenderSink>(&mut self, conf: &DisplayConfig, sink: &mut S) {
        sink.set_style_var(StyleVar::Accent, &conf.accent_color);
        sink.set_style_var(StyleVar::Background, &conf.background_color);
        sink.set_style_var(StyleVar::Text, &conf.text_color);
        sink.set_style_var(StyleVar::FontSize, &px(conf.font_size_px));
        sink.set_style_var(StyleVar::Radius, &px(conf.radius_px()));
        sink.set_style_var(StyleVar::Blur, &px(conf.blur_px()));
        sink.set_style_var(StyleVar::ArtRadius, &px(conf.art_radius_px()));

        self.switch_theme(conf.theme, sink);

        sink.set_region_visible(Region::Artwork, conf.show_thumbnail);
        sink.set_region_visible(Region::Artist, conf.show_artist);
        sink.set_region_visible(Region::Progress, conf.show_progress);
        sink.set_region_visible(Region::Time, conf.show_time);

        let (justify, align) = anchor_alignment(conf.position);
        sink.set_anchor(justify, align);

        if self.custom_style {
            sink.remove_custom_style();
            self.custom_style = false;
        }
        if let Some(css) = conf.custom_style() {
            sink.insert_custom_style(css);
            self.custom_style = true;
        }

        self.animation = conf.transition_animation.clone();
        log::debug!(
            "Applied theme '{}' at {}, animation '{}'",
            conf.theme,
            conf.position,
            self.animation
        );
    }

    fn switch_theme<S: RenderSink>(&mut self, theme: Theme, sink: &mut S) {
        match self.theme.replace(theme) {
            Some(old) if old == theme => return,
            Some(old) => sink.remove_class(ClassTarget::Root, &old.marker()),
            None => (),
        }
        sink.add_class(ClassTarget::Root, &theme.marker());
    }
}

fn px(value: u32) -> String {
    format!("{}px", value)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sink::MemorySink;

    fn applied(conf: &DisplayConfig) -> (Presentation, MemorySink) {
        let mut pres = Presentation::new();
        let mut sink = MemorySink::new();
        pres.apply(conf, &mut sink);
        (pres, sink)
    }

    #[test]
    fn style_variables() {
        let mut conf = DisplayConfig::default();
        conf.font_size_px = 16;
        conf.set_radius_px(Some(3));
        let (_, sink) = applied(&conf);
        assert_eq!(Some("#3498db"), sink.style_var(StyleVar::Accent));
        assert_eq!(Some("#1a1a2e"), sink.style_var(StyleVar::Background));
        assert_eq!(Some("#ffffff"), sink.style_var(StyleVar::Text));
        assert_eq!(Some("16px"), sink.style_var(StyleVar::FontSize));
        assert_eq!(Some("3px"), sink.style_var(StyleVar::Radius));
        assert_eq!(Some("18px"), sink.style_var(StyleVar::Blur));
        assert_eq!(Some("0px"), sink.style_var(StyleVar::ArtRadius));
    }

    #[test]
    fn missing_radius_and_blur() {
        let mut conf = DisplayConfig::default();
        conf.set_radius_px(None);
        conf.set_blur_px(None);
        let (_, sink) = applied(&conf);
        assert_eq!(Some("14px"), sink.style_var(StyleVar::Radius));
        assert_eq!(Some("18px"), sink.style_var(StyleVar::Blur));
        assert_eq!(Some("10px"), sink.style_var(StyleVar::ArtRadius));
    }

    #[test]
    fn anchors() {
        assert_eq!((Align::Start, Align::Start), anchor_alignment(Anchor::TopLeft));
        assert_eq!((Align::End, Align::Start), anchor_alignment(Anchor::TopRight));
        assert_eq!((Align::Start, Align::End), anchor_alignment(Anchor::BottomLeft));
        assert_eq!((Align::End, Align::End), anchor_alignment(Anchor::BottomRight));

        let conf = DisplayConfig::deserialize(r#"{"position":"Middle"}"#).unwrap();
        let (_, sink) = applied(&conf);
        assert_eq!(Some((Align::End, Align::End)), sink.anchor());
    }

    #[test]
    fn regions() {
        let mut conf = DisplayConfig::default();
        conf.show_artist = false;
        conf.show_time = false;
        let (_, sink) = applied(&conf);
        assert_eq!(Some(true), sink.region_visible(Region::Artwork));
        assert_eq!(Some(false), sink.region_visible(Region::Artist));
        assert_eq!(Some(true), sink.region_visible(Region::Progress));
        assert_eq!(Some(false), sink.region_visible(Region::Time));
    }

    #[test]
    fn theme_switch() {
        let mut conf = DisplayConfig::default();
        let (mut pres, mut sink) = applied(&conf);
        assert_eq!(vec!["theme-frosted_glass"], sink.classes(ClassTarget::Root));

        conf.theme = Theme::NeonGlow;
        pres.apply(&conf, &mut sink);
        assert_eq!(vec!["theme-neon_glow"], sink.classes(ClassTarget::Root));
        assert_eq!(Some(Theme::NeonGlow), pres.theme());
    }

    #[test]
    fn same_theme_is_not_touched() {
        let conf = DisplayConfig::default();
        let (mut pres, mut sink) = applied(&conf);
        pres.apply(&conf, &mut sink);
        assert_eq!(1, sink.times_added(ClassTarget::Root, "theme-frosted_glass"));
        assert!(sink.has_class(ClassTarget::Root, "theme-frosted_glass"));
    }

    #[test]
    fn applying_twice_is_applying_once() {
        let mut conf = DisplayConfig::default();
        conf.theme = Theme::Vinyl;
        conf.custom_css = ".card { color: red; }".to_string();
        let (mut pres, mut sink) = applied(&conf);
        let once = sink.surface().clone();
        pres.apply(&conf, &mut sink);
        assert_eq!(&once, sink.surface());
        assert_eq!(1, sink.custom_styles().len());
    }

    #[test]
    fn custom_style_is_replaced() {
        let mut conf = DisplayConfig::default();
        conf.custom_css = "a {}".to_string();
        let (mut pres, mut sink) = applied(&conf);

        conf.custom_css = "b {}".to_string();
        pres.apply(&conf, &mut sink);
        assert_eq!(&["b {}".to_string()], sink.custom_styles());

        conf.custom_css = " \n\t".to_string();
        pres.apply(&conf, &mut sink);
        assert!(sink.custom_styles().is_empty());
    }

    #[test]
    fn animation_choice() {
        let mut conf = DisplayConfig::default();
        let (mut pres, mut sink) = applied(&conf);
        assert_eq!(&TransitionAnimation::default(), pres.animation());

        conf.transition_animation = TransitionAnimation::new("none");
        pres.apply(&conf, &mut sink);
        assert_eq!(&TransitionAnimation::None, pres.animation());
    }
}
