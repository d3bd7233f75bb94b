//! Draws the card on a terminal, redrawing it in place whenever the engine flushes a change.

use std::{collections::HashMap, io::Write, time::Duration};

use colored::{Color, Colorize};
use overlay::{
    sink::{Align, ClassTarget, ImageSlot, Region, StyleVar, TextSlot, CLASS_HIDDEN, CLASS_PLAYING},
    AnimationNotifier, RenderSink,
};

const WIDTH: usize = 48;
const BAR_CELLS: usize = 32;

pub struct TermSink<W> {
    out: W,
    animation: Duration,
    texts: HashMap<TextSlot, String>,
    has_art: bool,
    bar_filled: usize,
    accent: Option<Color>,
    text_color: Option<Color>,
    hidden_regions: Vec<Region>,
    justify: Align,
    hidden: bool,
    playing: bool,
    animating: Option<String>,
    drawn_lines: usize,
    dirty: bool,
}

impl<W: Write> TermSink<W> {
    /// `animation` is how long an entrance animation is pretended to run.
    pub fn new(out: W, animation: Duration) -> Self {
        Self {
            out,
            animation,
            texts: HashMap::new(),
            has_art: false,
            bar_filled: 0,
            accent: None,
            text_color: None,
            hidden_regions: Vec::new(),
            justify: Align::End,
            hidden: false,
            playing: false,
            animating: None,
            drawn_lines: 0,
            dirty: true,
        }
    }

    fn text(&self, slot: TextSlot) -> &str {
        self.texts.get(&slot).map(String::as_str).unwrap_or("")
    }

    fn shows(&self, region: Region) -> bool {
        !self.hidden_regions.contains(&region)
    }

    /// The plain lines of the card, before any color or alignment.
    pub fn lines(&self) -> Vec<String> {
        if self.hidden {
            return Vec::new();
        }

        let mut lines = Vec::new();
        let icon = if self.playing { '▶' } else { '⏸' };
        let art = if self.has_art && self.shows(Region::Artwork) {
            "▣ "
        } else {
            ""
        };
        let sparkle = if self.animating.is_some() { " ✦" } else { "" };
        lines.push(format!(
            "{} {}{}{}",
            icon,
            art,
            self.text(TextSlot::Title),
            sparkle
        ));
        if self.shows(Region::Artist) {
            lines.push(format!("  {}", self.text(TextSlot::Artist)));
        }
        if self.shows(Region::Progress) {
            lines.push(format!(
                "  {}{}",
                "█".repeat(self.bar_filled),
                "░".repeat(BAR_CELLS - self.bar_filled)
            ));
        }
        if self.shows(Region::Time) {
            lines.push(format!(
                "  {} / {}",
                self.text(TextSlot::CurrentTime),
                self.text(TextSlot::TotalTime)
            ));
        }
        lines
    }

    fn paint(&self, index: usize, line: &str) -> String {
        let pad = match self.justify {
            Align::Start => 0,
            Align::End => WIDTH.saturating_sub(line.chars().count()),
        };
        let color = match index {
            0 => self.text_color,
            _ => self.accent.or(self.text_color),
        };
        let line = match color {
            Some(color) => line.color(color),
            None => line.normal(),
        };
        let line = if index == 0 { line.bold() } else { line };
        format!("{}{}", " ".repeat(pad), line)
    }

    fn redraw(&mut self) -> std::io::Result<()> {
        for _ in 0..self.drawn_lines {
            write!(self.out, "\x1b[1A\x1b[2K")?;
        }
        let lines = self.lines();
        for (i, line) in lines.iter().enumerate() {
            let painted = self.paint(i, line);
            writeln!(self.out, "{}", painted)?;
        }
        self.drawn_lines = lines.len();
        self.out.flush()
    }

    /// Erases the card from the terminal.
    pub fn clear(&mut self) -> std::io::Result<()> {
        self.hidden = true;
        self.redraw()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn mark(&mut self) {
        self.dirty = true;
    }
}

/// `#rgb` or `#rrggbb`
pub fn parse_hex(s: &str) -> Option<Color> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    let (r, g, b) = match hex.len() {
        3 => {
            let short = |i: usize| channel(&hex[i..i + 1]).map(|c| c * 17);
            (short(0)?, short(1)?, short(2)?)
        }
        6 => (channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?),
        _ => return None,
    };
    Some(Color::TrueColor { r, g, b })
}

impl<W: Write> RenderSink for TermSink<W> {
    fn set_text(&mut self, slot: TextSlot, text: &str) {
        if self.text(slot) != text {
            self.texts.insert(slot, text.to_string());
            self.mark();
        }
    }

    fn set_image(&mut self, slot: ImageSlot, src: Option<&str>) {
        if slot == ImageSlot::Artwork && self.has_art != src.is_some() {
            self.has_art = src.is_some();
            self.mark();
        }
    }

    fn has_image_slot(&self, slot: ImageSlot) -> bool {
        slot == ImageSlot::Artwork
    }

    fn set_progress_width(&mut self, percent: f64) {
        let filled = ((percent / 100.0) * BAR_CELLS as f64).round() as usize;
        let filled = filled.min(BAR_CELLS);
        if filled != self.bar_filled {
            self.bar_filled = filled;
            self.mark();
        }
    }

    fn set_style_var(&mut self, var: StyleVar, value: &str) {
        let slot = match var {
            StyleVar::Accent => &mut self.accent,
            StyleVar::Text => &mut self.text_color,
            _ => {
                log::trace!("{} = {} has no meaning on a terminal", var.css_name(), value);
                return;
            }
        };
        let color = parse_hex(value);
        if color.is_none() {
            log::debug!("Not a hex color for {}: {:?}", var.css_name(), value);
        }
        if *slot != color {
            *slot = color;
            self.mark();
        }
    }

    fn add_class(&mut self, target: ClassTarget, class: &str) {
        match (target, class) {
            (ClassTarget::Card, CLASS_HIDDEN) => self.hidden = true,
            (ClassTarget::Card, CLASS_PLAYING) => self.playing = true,
            (ClassTarget::Card, anim) if anim.starts_with("anim-") => {
                self.animating = Some(anim.to_string())
            }
            (ClassTarget::Root, theme) => {
                log::debug!("Theme marker {} on the terminal", theme);
                return;
            }
            _ => return,
        }
        self.mark();
    }

    fn remove_class(&mut self, target: ClassTarget, class: &str) {
        match (target, class) {
            (ClassTarget::Card, CLASS_HIDDEN) => self.hidden = false,
            (ClassTarget::Card, CLASS_PLAYING) => self.playing = false,
            (ClassTarget::Card, anim) if self.animating.as_deref() == Some(anim) => {
                self.animating = None
            }
            _ => return,
        }
        self.mark();
    }

    fn set_region_visible(&mut self, region: Region, visible: bool) {
        let was = self.shows(region);
        if visible {
            self.hidden_regions.retain(|r| *r != region);
        } else if was {
            self.hidden_regions.push(region);
        }
        if was != visible {
            self.mark();
        }
    }

    fn set_anchor(&mut self, justify: Align, _align: Align) {
        if self.justify != justify {
            self.justify = justify;
            self.mark();
        }
    }

    fn insert_custom_style(&mut self, css: &str) {
        log::debug!("Ignoring {} bytes of custom style", css.len());
    }

    fn remove_custom_style(&mut self) {}

    fn force_layout(&mut self) {}

    fn watch_animation_end(
        &mut self,
        target: ClassTarget,
        class: &str,
        notifier: AnimationNotifier,
    ) {
        log::trace!("Pretending {} on {:?} runs for {:?}", class, target, self.animation);
        let duration = self.animation;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            notifier.finished(target);
        });
    }

    fn flush(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        if let Err(e) = self.redraw() {
            log::warn!("Could not draw the card: {}", e);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use overlay::sink::AnimationWatcher;

    fn sink() -> TermSink<Vec<u8>> {
        TermSink::new(Vec::new(), Duration::from_millis(600))
    }

    fn song(sink: &mut TermSink<Vec<u8>>) {
        sink.set_text(TextSlot::Title, "Song A");
        sink.set_text(TextSlot::Artist, "Band");
        sink.set_text(TextSlot::CurrentTime, "0:10");
        sink.set_text(TextSlot::TotalTime, "3:20");
        sink.set_progress_width(50.0);
    }

    #[test]
    fn hex_colors() {
        assert_eq!(
            Some(Color::TrueColor {
                r: 0x34,
                g: 0x98,
                b: 0xdb
            }),
            parse_hex("#3498db")
        );
        assert_eq!(
            Some(Color::TrueColor {
                r: 255,
                g: 0,
                b: 255
            }),
            parse_hex(" #f0f ")
        );
        assert_eq!(None, parse_hex("3498db"));
        assert_eq!(None, parse_hex("#34"));
        assert_eq!(None, parse_hex("#zzzzzz"));
        assert_eq!(None, parse_hex("#ééé"));
    }

    #[test]
    fn card_lines() {
        let mut sink = sink();
        song(&mut sink);
        sink.add_class(ClassTarget::Card, CLASS_PLAYING);
        assert_eq!(
            vec![
                "▶ Song A".to_string(),
                "  Band".to_string(),
                format!("  {}{}", "█".repeat(16), "░".repeat(16)),
                "  0:10 / 3:20".to_string(),
            ],
            sink.lines()
        );
    }

    #[test]
    fn regions_and_art() {
        let mut sink = sink();
        song(&mut sink);
        sink.set_image(ImageSlot::Artwork, Some("data:image/png;base64,AAAA"));
        sink.set_region_visible(Region::Progress, false);
        sink.set_region_visible(Region::Time, false);
        sink.set_region_visible(Region::Time, false);
        assert_eq!(vec!["⏸ ▣ Song A", "  Band"], sink.lines());

        sink.set_region_visible(Region::Artwork, false);
        sink.set_region_visible(Region::Time, true);
        assert_eq!(vec!["⏸ Song A", "  Band", "  0:10 / 3:20"], sink.lines());
        assert!(!sink.has_image_slot(ImageSlot::Ambient));
    }

    #[test]
    fn hidden_draws_nothing() {
        let mut sink = sink();
        song(&mut sink);
        sink.add_class(ClassTarget::Card, CLASS_HIDDEN);
        assert!(sink.lines().is_empty());
        sink.remove_class(ClassTarget::Card, CLASS_HIDDEN);
        assert_eq!(4, sink.lines().len());
    }

    #[test]
    fn redraws_only_when_changed() {
        colored::control::set_override(false);
        let mut sink = sink();
        song(&mut sink);
        sink.set_anchor(Align::Start, Align::End);
        sink.flush();
        let first = sink.out.len();
        assert!(first > 0);

        sink.set_progress_width(50.4);
        sink.set_text(TextSlot::Title, "Song A");
        sink.flush();
        assert_eq!(first, sink.out.len());

        sink.set_text(TextSlot::CurrentTime, "0:11");
        sink.flush();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(4, out.matches("\x1b[1A\x1b[2K").count());
        assert!(out.ends_with("  0:11 / 3:20\n"));
    }

    #[test]
    fn right_aligned() {
        colored::control::set_override(false);
        let mut sink = sink();
        sink.set_region_visible(Region::Artist, false);
        sink.set_region_visible(Region::Progress, false);
        sink.set_region_visible(Region::Time, false);
        sink.set_text(TextSlot::Title, "X");
        sink.flush();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(format!("{}⏸ X\n", " ".repeat(WIDTH - 3)), out);
    }

    #[tokio::test(start_paused = true)]
    async fn animation_finishes_after_a_while() {
        let (watcher, mut events) = AnimationWatcher::new();
        let mut sink = sink();
        sink.add_class(ClassTarget::Card, "anim-slide_up");
        sink.watch_animation_end(
            ClassTarget::Card,
            "anim-slide_up",
            watcher.notifier("anim-slide_up", 3),
        );
        let start = tokio::time::Instant::now();
        let end = events.recv().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(600));
        assert_eq!(3, end.generation);
        assert_eq!(ClassTarget::Card, end.target);
        assert_eq!("anim-slide_up", end.class);
    }
}
