use std::{sync::Arc, time::Duration};

use protocol::DisplayConfig;
use tokio::{
    select,
    sync::mpsc,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{
    config_source::ConfigSource,
    engine::OverlayEngine,
    interpolator::FrameClock,
    sink::{AnimationWatcher, RenderSink},
    transport::{retry_after, transport_actor, RECONNECT_DELAY},
};

const CHANNEL_SIZE: usize = 1024;

pub struct SessionOptions {
    pub push_url: Url,
    /// Look for a new config this often, never if `None`.
    pub config_refresh: Option<Duration>,
}

/// Runs one display session on the current task until the frame clock stops, then hands
/// back the engine.
///
/// The push channel is only opened after the first config has been applied, so the first
/// song is never drawn with the default look.
pub async fn run_session<S, C>(
    sink: S,
    config: Arc<C>,
    opts: SessionOptions,
    mut frames: FrameClock,
) -> OverlayEngine<S>
where
    S: RenderSink,
    C: ConfigSource + Send + Sync + 'static,
{
    let token = frames.token().clone();
    let (watcher, mut animation_events) = AnimationWatcher::new();
    let mut engine = OverlayEngine::new(sink, watcher);

    let conf = match initial_config(config.as_ref(), &token).await {
        Some(conf) => conf,
        None => return engine,
    };
    engine.apply_config(conf);

    let children = token.child_token();
    let (to_engine, mut from_transport) = mpsc::channel(CHANNEL_SIZE);
    let transport = tokio::spawn(transport_actor(
        opts.push_url,
        to_engine,
        children.clone(),
    ));

    let (to_engine, mut from_refresher) = mpsc::channel(1);
    let refresher = opts.config_refresh.map(|period| {
        tokio::spawn(config_refresher(
            config,
            period,
            to_engine,
            children.clone(),
        ))
    });

    loop {
        select! {
            biased;
            Some(info) = from_transport.recv() => {
                engine.handle_snapshot(info, Instant::now());
            }
            Some(end) = animation_events.recv() => engine.handle_animation_end(end),
            Some(conf) = from_refresher.recv() => {
                if engine.config() != Some(&conf) {
                    log::info!("Config changed, applying it");
                    engine.apply_config(conf);
                }
            }
            now = frames.tick() => match now {
                Some(now) => engine.tick(now),
                None => break,
            },
        }
    }

    log::debug!("Session over, stopping the rest");
    children.cancel();
    if let Err(e) = transport.await {
        log::error!("Transport join error: {}", e);
    }
    if let Some(handle) = refresher {
        if let Err(e) = handle.await {
            log::error!("Config refresher join error: {}", e);
        }
    }

    engine
}

async fn initial_config<C>(config: &C, token: &CancellationToken) -> Option<DisplayConfig>
where
    C: ConfigSource + Send + Sync,
{
    loop {
        let loaded = select! {
            _ = token.cancelled() => return None,
            loaded = config.load() => loaded,
        };
        match loaded {
            Ok(conf) => {
                log::info!("Loaded config from {}", config.describe());
                return Some(conf);
            }
            Err(e) => log::warn!(
                "Could not load config from {}, trying again in {:?}: {}",
                config.describe(),
                RECONNECT_DELAY,
                e
            ),
        }
        if !retry_after(RECONNECT_DELAY, token).await {
            return None;
        }
    }
}

async fn config_refresher<C>(
    config: Arc<C>,
    period: Duration,
    to_engine: mpsc::Sender<DisplayConfig>,
    token: CancellationToken,
) where
    C: ConfigSource + Send + Sync,
{
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        select! {
            _ = token.cancelled() => break,
            _ = interval.tick() => {}
        }
        let loaded = select! {
            _ = token.cancelled() => break,
            loaded = config.load() => loaded,
        };
        match loaded {
            Ok(conf) => {
                if to_engine.send(conf).await.is_err() {
                    break;
                }
            }
            Err(e) => log::warn!("Keeping the old config, reload failed: {}", e),
        }
    }
}
