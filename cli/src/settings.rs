use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;

pub const PROGNAME: &str = "nowplaying-overlay";
pub const CONFIG_NAME: &str = "config.toml";

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:3333";
pub const DEFAULT_FPS: u32 = 60;
pub const DEFAULT_ANIMATION_MS: u64 = 600;

/// How the terminal overlay runs. Everything is optional, the command line wins over the
/// file.
#[derive(Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub server: Option<String>,
    pub fps: Option<u32>,
    pub config_refresh_secs: Option<u64>,
    pub animation_ms: Option<u64>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Resolved {
    pub server: String,
    pub frame: Duration,
    pub config_refresh: Option<Duration>,
    pub animation: Duration,
}

impl Settings {
    pub fn parse(conts: &str) -> anyhow::Result<Self> {
        toml::from_str(conts).context("parsing settings as TOML")
    }

    /// Fills in what `self` leaves open from `fallback`.
    pub fn or(self, fallback: Settings) -> Settings {
        Settings {
            server: self.server.or(fallback.server),
            fps: self.fps.or(fallback.fps),
            config_refresh_secs: self.config_refresh_secs.or(fallback.config_refresh_secs),
            animation_ms: self.animation_ms.or(fallback.animation_ms),
        }
    }

    pub fn resolve(self) -> Resolved {
        let fps = self.fps.unwrap_or(DEFAULT_FPS).max(1);
        Resolved {
            server: self.server.unwrap_or_else(|| DEFAULT_SERVER.to_string()),
            frame: Duration::from_secs(1) / fps,
            config_refresh: self
                .config_refresh_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            animation: Duration::from_millis(self.animation_ms.unwrap_or(DEFAULT_ANIMATION_MS)),
        }
    }
}

pub fn conf_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(PROGNAME))
}

/// Reads the settings file. A missing file at the default location just means defaults,
/// an explicitly given one has to exist.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<Settings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match conf_dir() {
            Some(dir) => dir.join(CONFIG_NAME),
            None => {
                log::debug!("No config dir on this system, using default settings");
                return Ok(Settings::default());
            }
        },
    };

    let conts = match fs::read_to_string(&path) {
        Ok(conts) => conts,
        Err(e) if e.kind() == io::ErrorKind::NotFound && explicit.is_none() => {
            log::debug!("No settings at {:?}, using defaults", path);
            return Ok(Settings::default());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("reading settings file at {:?}", path))
        }
    };
    log::info!("Read settings from {:?}", path);
    Settings::parse(&conts).with_context(|| format!("in {:?}", path))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let res = Settings::default().resolve();
        assert_eq!(DEFAULT_SERVER, res.server);
        assert_eq!(Duration::from_secs(1) / 60, res.frame);
        assert_eq!(None, res.config_refresh);
        assert_eq!(Duration::from_millis(600), res.animation);
    }

    #[test]
    fn command_line_wins() {
        let file = Settings::parse("server = \"http://box:3333\"\nfps = 30\nconfig_refresh_secs = 5\n")
            .unwrap();
        let cli = Settings {
            fps: Some(10),
            ..Default::default()
        };
        let res = cli.or(file).resolve();
        assert_eq!("http://box:3333", res.server);
        assert_eq!(Duration::from_millis(100), res.frame);
        assert_eq!(Some(Duration::from_secs(5)), res.config_refresh);
    }

    #[test]
    fn zero_means_off() {
        let res = Settings::parse("fps = 0\nconfig_refresh_secs = 0\n")
            .unwrap()
            .resolve();
        assert_eq!(Duration::from_secs(1), res.frame);
        assert_eq!(None, res.config_refresh);
    }

    #[test]
    fn typo_in_file() {
        assert!(Settings::parse("sever = \"http://box\"").is_err());
    }

    #[test]
    fn explicit_file_must_exist() {
        assert!(load(Some(Path::new("/definitely/not/here.toml"))).is_err());
    }
}
