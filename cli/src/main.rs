use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::Parser;
use cli::{
    settings::{self, Settings},
    term::TermSink,
};
use overlay::{run_session, Endpoint, FileConfig, FrameClock, HttpConfig, SessionOptions};
use tokio_util::sync::CancellationToken;

/// Shows what is playing on the server as a card in the terminal.
#[derive(Parser)]
struct Cli {
    /// Base url of the server, the push channel and the config are found under it.
    #[arg(long)]
    server: Option<String>,

    /// Read the display config from this JSON or TOML file instead of the server.
    #[arg(long)]
    config_file: Option<PathBuf>,

    /// Settings file to use instead of the one in the config dir.
    #[arg(long)]
    settings: Option<PathBuf>,

    #[arg(long)]
    fps: Option<u32>,

    /// Reload the display config every this many seconds.
    #[arg(long)]
    config_refresh: Option<u64>,

    /// How long the entrance animation pretends to run, in milliseconds.
    #[arg(long)]
    animation_ms: Option<u64>,

    /// More logs, twice for even more.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn overrides(&self) -> Settings {
        Settings {
            server: self.server.clone(),
            fps: self.fps,
            config_refresh_secs: self.config_refresh,
            animation_ms: self.animation_ms,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli::init_logger(cli.verbose);

    match async_main(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn async_main(cli: Cli) -> anyhow::Result<()> {
    let file = settings::load(cli.settings.as_deref())?;
    let settings = cli.overrides().or(file).resolve();
    log::debug!("Running with {:?}", settings);

    let endpoint = Endpoint::parse(&settings.server)
        .with_context(|| format!("server url {:?}", settings.server))?;

    let token = CancellationToken::new();
    tokio::spawn({
        let token = token.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => log::info!("Interrupted, shutting down"),
                Err(e) => log::error!("Could not listen for ctrl-c: {}", e),
            }
            token.cancel();
        }
    });

    let sink = TermSink::new(std::io::stdout(), settings.animation);
    let opts = SessionOptions {
        push_url: endpoint.push_url(),
        config_refresh: settings.config_refresh,
    };
    let frames = FrameClock::new(settings.frame, token);

    log::info!("Listening on {}", opts.push_url);
    let engine = match cli.config_file {
        Some(path) => run_session(sink, Arc::new(FileConfig::new(path)), opts, frames).await,
        None => {
            let conf = HttpConfig::new(endpoint.config_url());
            run_session(sink, Arc::new(conf), opts, frames).await
        }
    };

    engine
        .into_sink()
        .clear()
        .context("erasing the card")?;
    log::info!("Bye");
    Ok(())
}
