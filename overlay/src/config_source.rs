use std::path::PathBuf;

use async_trait::async_trait;
use protocol::DisplayConfig;
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {0}")]
    Status(reqwest::StatusCode),
    #[error("not a config document: {0}")]
    Decode(#[from] protocol::MessageError),
    #[error("not a config document: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Somewhere to get the current [DisplayConfig] from.
#[async_trait]
pub trait ConfigSource {
    async fn load(&self) -> Result<DisplayConfig, ConfigError>;

    fn describe(&self) -> String;
}

/// The config endpoint of the server.
pub struct HttpConfig {
    client: reqwest::Client,
    url: Url,
}

impl HttpConfig {
    pub fn new(url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl ConfigSource for HttpConfig {
    async fn load(&self) -> Result<DisplayConfig, ConfigError> {
        let response = self.client.get(self.url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(ConfigError::Status(response.status()));
        }
        let text = response.text().await?;
        Ok(DisplayConfig::deserialize(&text)?)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// A local file, TOML if it ends in `.toml` and JSON otherwise.
pub struct FileConfig {
    path: PathBuf,
}

impl FileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn is_toml(&self) -> bool {
        self.path.extension().is_some_and(|ext| ext == "toml")
    }
}

#[async_trait]
impl ConfigSource for FileConfig {
    async fn load(&self) -> Result<DisplayConfig, ConfigError> {
        let conts = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ConfigError::Io {
                path: self.path.clone(),
                source,
            })?;
        if self.is_toml() {
            Ok(toml::from_str(&conts)?)
        } else {
            Ok(DisplayConfig::deserialize(&conts)?)
        }
    }

    fn describe(&self) -> String {
        format!("{}", self.path.display())
    }
}

/// Always the same config.
pub struct StaticConfig(pub DisplayConfig);

#[async_trait]
impl ConfigSource for StaticConfig {
    async fn load(&self) -> Result<DisplayConfig, ConfigError> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "built-in config".to_string()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use protocol::{Anchor, Theme};

    fn temp_file(name: &str, conts: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", std::process::id(), name));
        std::fs::write(&path, conts).unwrap();
        path
    }

    #[tokio::test]
    async fn json_file() {
        let path = temp_file("overlay.json", r#"{"theme":"vinyl","blur_px":null}"#);
        let conf = FileConfig::new(&path).load().await.unwrap();
        assert_eq!(Theme::Vinyl, conf.theme);
        assert_eq!(18, conf.blur_px());
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn toml_file() {
        let path = temp_file("overlay.toml", "position = \"TopLeft\"\nshow_time = false\n");
        let conf = FileConfig::new(&path).load().await.unwrap();
        assert_eq!(Anchor::TopLeft, conf.position);
        assert!(!conf.show_time);
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn missing_file() {
        let res = FileConfig::new("/definitely/not/here.json").load().await;
        assert!(matches!(res, Err(ConfigError::Io { .. })));
    }

    #[tokio::test]
    async fn broken_file() {
        let path = temp_file("broken.json", "{ theme: ");
        let res = FileConfig::new(&path).load().await;
        assert!(matches!(res, Err(ConfigError::Decode(_))));
        std::fs::remove_file(path).ok();
    }
}
