//! A stand-in for the server's push channel. Every line on stdin is pushed to whoever is
//! connected: JSON goes out as is, anything else becomes the title of a playing song and an
//! empty line means nothing is playing. `!close` hangs up on the current client.

use std::{
    io::BufRead,
    net::{TcpListener, TcpStream},
    sync::mpsc,
    thread,
};

use anyhow::Context;
use clap::Parser;
use protocol::SongInfo;
use tungstenite::{Message, WebSocket};

#[derive(Parser)]
struct Cli {
    #[arg(long, default_value = "127.0.0.1:3333")]
    listen: String,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

enum Line {
    Push(String),
    Close,
}

fn parse_line(line: &str) -> anyhow::Result<Line> {
    let line = line.trim();
    if line == "!close" {
        return Ok(Line::Close);
    }
    if line.starts_with('{') {
        if let Err(e) = SongInfo::deserialize(line) {
            log::warn!("Not a song, pushing it anyway: {}", e);
        }
        return Ok(Line::Push(line.to_string()));
    }
    let info = SongInfo {
        title: Some(line.to_string()).filter(|t| !t.is_empty()),
        is_playing: !line.is_empty(),
        ..Default::default()
    };
    Ok(Line::Push(info.serialize()?))
}

fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::error!("Could not read stdin: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

enum Hangup {
    Asked,
    Gone,
    Eof,
}

fn serve(socket: &mut WebSocket<TcpStream>, lines: &mpsc::Receiver<String>) -> Hangup {
    for line in lines.iter() {
        let text = match parse_line(&line) {
            Ok(Line::Close) => {
                log::info!("Closing");
                socket.close(None).ok();
                socket.flush().ok();
                return Hangup::Asked;
            }
            Ok(Line::Push(text)) => text,
            Err(e) => {
                log::error!("{:?}", e);
                continue;
            }
        };
        log::debug!("Pushing {}", text);
        if let Err(e) = socket.send(Message::Text(text)) {
            log::warn!("Client is gone: {}", e);
            return Hangup::Gone;
        }
    }
    Hangup::Eof
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli::init_logger(cli.verbose);

    let listener =
        TcpListener::bind(&cli.listen).with_context(|| format!("binding {}", cli.listen))?;
    log::info!("Waiting for an overlay on ws://{}/ws", cli.listen);
    let lines = stdin_lines();

    loop {
        let (stream, addr) = listener.accept().context("accepting")?;
        let mut socket = match tungstenite::accept(stream) {
            Ok(socket) => socket,
            Err(e) => {
                log::warn!("Handshake with {} failed: {}", addr, e);
                continue;
            }
        };
        log::info!("Connected to {}", addr);

        match serve(&mut socket, &lines) {
            Hangup::Asked | Hangup::Gone => continue,
            Hangup::Eof => {
                socket.close(None).ok();
                socket.flush().ok();
                log::info!("Stdin closed, bye");
                return Ok(());
            }
        }
    }
}
