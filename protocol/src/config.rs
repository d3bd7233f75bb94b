use std::fmt;

use serde::{Deserialize, Serialize};

use crate::util::{lenient_whole, null_as_default, Lenient};

pub const DEFAULT_RADIUS_PX: u32 = 14;
pub const DEFAULT_BLUR_PX: u32 = 18;
pub const DEFAULT_FONT_SIZE_PX: u32 = 14;

/// How the overlay should look. Replaced as a whole every time it is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub theme: Theme,
    #[serde(deserialize_with = "null_as_default")]
    pub show_thumbnail: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub show_artist: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub show_progress: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub show_time: bool,

    // 0 for primary, 1 for secondary
    #[serde(deserialize_with = "lenient_monitor")]
    pub monitor_index: usize,
    pub position: Anchor,
    #[serde(deserialize_with = "null_as_default")]
    pub accent_color: String,
    #[serde(deserialize_with = "null_as_default")]
    pub background_color: String,
    #[serde(deserialize_with = "null_as_default")]
    pub text_color: String,
    #[serde(deserialize_with = "lenient_font_size")]
    pub font_size_px: u32,
    #[serde(deserialize_with = "lenient_whole")]
    border_radius_px: Option<u32>,
    #[serde(deserialize_with = "lenient_whole")]
    blur_px: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub custom_css: String,

    pub transition_animation: TransitionAnimation,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            show_thumbnail: true,
            show_artist: true,
            show_progress: true,
            show_time: true,
            monitor_index: 0,
            position: Anchor::default(),
            accent_color: "#3498db".to_string(),
            background_color: "#1a1a2e".to_string(),
            text_color: "#ffffff".to_string(),
            font_size_px: DEFAULT_FONT_SIZE_PX,
            border_radius_px: Some(DEFAULT_RADIUS_PX),
            blur_px: Some(DEFAULT_BLUR_PX),
            custom_css: String::new(),
            transition_animation: TransitionAnimation::default(),
        }
    }
}

fn lenient_font_size<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(lenient_whole(deserializer)?.unwrap_or(DEFAULT_FONT_SIZE_PX))
}

fn lenient_monitor<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(lenient_whole(deserializer)?.unwrap_or(0) as usize)
}

impl DisplayConfig {
    pub fn radius_px(&self) -> u32 {
        self.border_radius_px.unwrap_or(DEFAULT_RADIUS_PX)
    }

    pub fn blur_px(&self) -> u32 {
        self.blur_px.unwrap_or(DEFAULT_BLUR_PX)
    }

    /// The artwork sits inside the card, so its corners are a bit tighter.
    pub fn art_radius_px(&self) -> u32 {
        self.radius_px().saturating_sub(4)
    }

    pub fn set_radius_px(&mut self, radius: Option<u32>) {
        self.border_radius_px = radius;
    }

    pub fn set_blur_px(&mut self, blur: Option<u32>) {
        self.blur_px = blur;
    }

    /// The custom style, if there is anything in it.
    pub fn custom_style(&self) -> Option<&str> {
        Some(self.custom_css.as_str()).filter(|css| !css.trim().is_empty())
    }
}

macro_rules! catalog {
    ($name:ident, default $default:ident, $($variant:ident => $text:literal),+ $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "Lenient", into = "&'static str")]
        pub enum $name {
            $($variant,)+
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl From<Lenient> for $name {
            fn from(named: Lenient) -> Self {
                named.name().and_then($name::from_name).unwrap_or($name::$default)
            }
        }

        impl From<$name> for &'static str {
            fn from(it: $name) -> Self {
                it.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

catalog!(Theme, default FrostedGlass,
    FrostedGlass => "frosted_glass",
    NeonGlow => "neon_glow",
    Vinyl => "vinyl",
    Minimal => "minimal",
    Spotify => "spotify",
    Cyberpunk => "cyberpunk",
    PastelDream => "pastel_dream",
    GradientWave => "gradient_wave",
);

catalog!(Anchor, default BottomRight,
    TopLeft => "TopLeft",
    TopRight => "TopRight",
    BottomLeft => "BottomLeft",
    BottomRight => "BottomRight",
);

impl Theme {
    /// The marker put on the display root while this theme is active.
    pub fn marker(self) -> String {
        format!("theme-{}", self.as_str())
    }
}

/// Which animation to play on the card when the song changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Lenient", into = "String")]
pub enum TransitionAnimation {
    None,
    Named(String),
}

impl TransitionAnimation {
    pub const DEFAULT_NAME: &'static str = "slide_up";

    pub fn new(name: &str) -> Self {
        match name.trim() {
            "" => Self::default(),
            "none" => Self::None,
            name => Self::Named(name.to_string()),
        }
    }

    /// The class that plays the animation, `None` if there is no animation.
    pub fn class(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::Named(name) => Some(format!("anim-{}", name)),
        }
    }
}

impl Default for TransitionAnimation {
    fn default() -> Self {
        Self::Named(Self::DEFAULT_NAME.to_string())
    }
}

impl From<Lenient> for TransitionAnimation {
    fn from(named: Lenient) -> Self {
        named.name().map(Self::new).unwrap_or_default()
    }
}

impl From<TransitionAnimation> for String {
    fn from(anim: TransitionAnimation) -> Self {
        anim.to_string()
    }
}

impl fmt::Display for TransitionAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_everything() {
        let conf = DisplayConfig::deserialize("{}").unwrap();
        assert_eq!(DisplayConfig::default(), conf);
        assert_eq!(14, conf.radius_px());
        assert_eq!(18, conf.blur_px());
        assert_eq!(10, conf.art_radius_px());
    }

    #[test]
    fn nulls_fall_back() {
        let conf = DisplayConfig::deserialize(
            r#"{"theme":null,"position":null,"border_radius_px":null,
                "blur_px":null,"transition_animation":null,"custom_css":null}"#,
        )
        .unwrap();
        assert_eq!(Theme::FrostedGlass, conf.theme);
        assert_eq!(Anchor::BottomRight, conf.position);
        assert_eq!(14, conf.radius_px());
        assert_eq!(18, conf.blur_px());
        assert_eq!(TransitionAnimation::default(), conf.transition_animation);
        assert_eq!(None, conf.custom_style());
    }

    #[test]
    fn broken_numbers_fall_back() {
        let conf = DisplayConfig::deserialize(
            r#"{"theme":"vinyl","font_size_px":null,"border_radius_px":14.5,
                "blur_px":"lots","monitor_index":-1}"#,
        )
        .unwrap();
        assert_eq!(Theme::Vinyl, conf.theme);
        assert_eq!(DEFAULT_FONT_SIZE_PX, conf.font_size_px);
        assert_eq!(15, conf.radius_px());
        assert_eq!(DEFAULT_BLUR_PX, conf.blur_px());
        assert_eq!(0, conf.monitor_index);

        let conf = DisplayConfig::deserialize(
            r#"{"font_size_px":"huge","border_radius_px":-2,"blur_px":[6]}"#,
        )
        .unwrap();
        assert_eq!(DEFAULT_FONT_SIZE_PX, conf.font_size_px);
        assert_eq!(DEFAULT_RADIUS_PX, conf.radius_px());
        assert_eq!(DEFAULT_BLUR_PX, conf.blur_px());

        let conf = DisplayConfig::deserialize(r#"{"font_size_px":17.2,"blur_px":0}"#).unwrap();
        assert_eq!(17, conf.font_size_px);
        assert_eq!(0, conf.blur_px());
    }

    #[test]
    fn unknown_names() {
        let conf = DisplayConfig::deserialize(
            r#"{"theme":"bubblegum","position":{"Custom":[10,20]},
                "transition_animation":""}"#,
        )
        .unwrap();
        assert_eq!(Theme::FrostedGlass, conf.theme);
        assert_eq!(Anchor::BottomRight, conf.position);
        assert_eq!(Some("anim-slide_up".to_string()), conf.transition_animation.class());
    }

    #[test]
    fn saved_by_the_editor() {
        let conf = DisplayConfig::deserialize(
            r##"{"theme":"cyberpunk","accent_color":"#ff2d95","background_color":"#060110",
                "text_color":"#eee0ff","font_size_px":16,"border_radius_px":2,"blur_px":6,
                "show_thumbnail":true,"show_artist":false,"show_progress":true,
                "show_time":false,"monitor_index":0,"position":"TopLeft",
                "custom_css":"  ","transition_animation":"none"}"##,
        )
        .unwrap();
        assert_eq!(Theme::Cyberpunk, conf.theme);
        assert_eq!("theme-cyberpunk", conf.theme.marker());
        assert_eq!(Anchor::TopLeft, conf.position);
        assert_eq!(0, conf.art_radius_px());
        assert!(!conf.show_artist);
        assert_eq!(None, conf.custom_style());
        assert_eq!(TransitionAnimation::None, conf.transition_animation);
        assert_eq!(None, conf.transition_animation.class());
    }

    #[test]
    fn written_back_the_same() {
        let mut conf = DisplayConfig::default();
        conf.theme = Theme::Vinyl;
        conf.set_blur_px(None);
        let text = conf.serialize().unwrap();
        assert_eq!(conf, DisplayConfig::deserialize(&text).unwrap());
    }

    #[test]
    fn toml_file() {
        let conf: DisplayConfig =
            toml::from_str("theme = \"minimal\"\nposition = \"TopRight\"\n").unwrap();
        assert_eq!(Theme::Minimal, conf.theme);
        assert_eq!(Anchor::TopRight, conf.position);
        assert!(conf.show_time);
    }

    #[test]
    fn every_theme_has_a_name() {
        for theme in Theme::ALL {
            assert_eq!(Some(*theme), Theme::from_name(theme.as_str()));
        }
    }
}
