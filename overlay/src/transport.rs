use std::time::Duration;

use futures_util::StreamExt;
use protocol::SongInfo;
use tokio::{select, sync::mpsc};
use tokio_tungstenite::tungstenite::Message as TungMsg;
use tokio_util::sync::CancellationToken;
use url::Url;

pub const RECONNECT_DELAY: Duration = Duration::from_secs(2);
pub const PUSH_PATH: &str = "/ws";
pub const CONFIG_PATH: &str = "/api/config";

pub type Sender = mpsc::Sender<SongInfo>;
pub type Receiver = mpsc::Receiver<SongInfo>;

#[derive(thiserror::Error, Debug)]
pub enum EndpointError {
    #[error("invalid server url: {0}")]
    Url(#[from] url::ParseError),
    #[error("unsupported scheme '{0}', expected http or https")]
    Scheme(String),
}

/// Where the server lives. Both endpoints hang off the same base, and the push channel is
/// encrypted exactly when the base is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
}

impl Endpoint {
    pub fn parse(base: &str) -> Result<Self, EndpointError> {
        let base = Url::parse(base)?;
        match base.scheme() {
            "http" | "https" => Ok(Self { base }),
            other => Err(EndpointError::Scheme(other.to_string())),
        }
    }

    pub fn push_url(&self) -> Url {
        let mut url = self.base.join(PUSH_PATH).unwrap_or_else(|_| self.base.clone());
        let scheme = if self.base.scheme() == "https" {
            "wss"
        } else {
            "ws"
        };
        // NOTE: can't fail, going between special schemes
        url.set_scheme(scheme).ok();
        url
    }

    pub fn config_url(&self) -> Url {
        self.base
            .join(CONFIG_PATH)
            .unwrap_or_else(|_| self.base.clone())
    }
}

/// Keeps a push channel open to `url` for as long as `token` lives, reconnecting
/// [RECONNECT_DELAY] after every disconnect. Every snapshot received is sent on `to_engine`
/// in the order it arrived.
pub async fn transport_actor(url: Url, to_engine: Sender, token: CancellationToken) {
    loop {
        log::info!("Opening push channel to {}", url);
        let connected = select! {
            _ = token.cancelled() => break,
            res = tokio_tungstenite::connect_async(url.as_str()) => res,
        };
        match connected {
            Err(e) => log::warn!("Could not connect to {}: {}", url, e),
            Ok((ws, _response)) => {
                log::info!("Push channel open");
                let (_sink, stream) = ws.split();
                let closed = select! {
                    _ = token.cancelled() => break,
                    closed = receive(stream, &to_engine) => closed,
                };
                match closed {
                    Closed::Engine => {
                        log::info!("Nobody is listening for snapshots anymore");
                        break;
                    }
                    Closed::Server => log::warn!("Push channel closed"),
                }
            }
        }

        log::debug!("Reconnecting in {:?}", RECONNECT_DELAY);
        if !retry_after(RECONNECT_DELAY, &token).await {
            break;
        }
    }
    log::debug!("Transport exited");
}

/// Waits out a retry delay. `false` if `token` was cancelled first.
pub(crate) async fn retry_after(delay: Duration, token: &CancellationToken) -> bool {
    select! {
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

enum Closed {
    Server,
    Engine,
}

async fn receive<S, E>(mut stream: S, to_engine: &Sender) -> Closed
where
    S: futures_util::Stream<Item = Result<TungMsg, E>> + Unpin,
    E: std::fmt::Display,
{
    while let Some(msg) = stream.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                log::warn!("Failed to read from the push channel: {}", e);
                return Closed::Server;
            }
        };

        let text = match msg {
            TungMsg::Text(text) => text,
            TungMsg::Binary(bytes) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    log::warn!("Dropping a binary message that isn't text");
                    continue;
                }
            },
            TungMsg::Close(frame) => {
                log::debug!("Server sent close: {:?}", frame);
                return Closed::Server;
            }
            _ => continue,
        };

        match SongInfo::deserialize(&text) {
            Ok(info) => {
                if to_engine.send(info).await.is_err() {
                    return Closed::Engine;
                }
            }
            Err(e) => log::warn!("Dropping a malformed snapshot: {}", e),
        }
    }
    Closed::Server
}
