pub mod settings;
pub mod term;

use log::LevelFilter;

const TARGETS: &[&str] = &["cli", "nowplaying_overlay", "feeder", "overlay", "protocol"];

/// Logs go to stderr, stdout is where the card is drawn.
pub fn init_logger(verbosity: u8) {
    use fern::colors::{Color, ColoredLevelConfig};

    let level = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let colors = ColoredLevelConfig::new()
        .info(Color::Green)
        .debug(Color::Cyan)
        .trace(Color::BrightBlack);

    let dispatch = TARGETS
        .iter()
        .fold(fern::Dispatch::new().level(LevelFilter::Warn), |d, target| {
            d.level_for(*target, level)
        });
    dispatch
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr())
        .apply()
        .expect("no logger should have been set yet");
}
