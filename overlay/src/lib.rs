//! The "now playing" overlay engine: keeps a card in sync with playback pushes from the
//! server and moves its progress bar along smoothly in between them.

pub mod config_source;
pub mod engine;
pub mod interpolator;
pub mod presentation;
pub mod reconciler;
pub mod session;
pub mod sink;
pub mod snapshot;
pub mod transport;

pub use config_source::{ConfigError, ConfigSource, FileConfig, HttpConfig, StaticConfig};
pub use engine::OverlayEngine;
pub use interpolator::FrameClock;
pub use reconciler::{OverlayState, Reconciled};
pub use session::{run_session, SessionOptions};
pub use sink::{AnimationNotifier, RenderSink};
pub use snapshot::PlaybackSnapshot;
pub use transport::Endpoint;
