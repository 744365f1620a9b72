//! A terminal chatroom that demonstrates how to use `retrochat` as a
//! library.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::time::Duration;

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use retrochat::contact::ContactForm;
use retrochat::markdown::LineRenderer;
use retrochat::{Overlay, OverlayBuilder};
use retrochat_toolhouse::{ToolhouseBackend, ToolhouseConfigBuilder};
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;

enum OverlayEvent {
    Chunk(String),
    TurnEnded,
}

const BOT_NAME: &str = "PeteBot";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Ok(agent_url) = env::var("RETROCHAT_AGENT_URL") else {
        eprintln!("RETROCHAT_AGENT_URL environment variable is not set");
        return;
    };
    let contact_url = env::var("RETROCHAT_CONTACT_URL").ok();
    let user_name = env::var("RETROCHAT_NAME")
        .unwrap_or_else(|_| "Trainer".to_owned());

    let config = ToolhouseConfigBuilder::with_agent_url(agent_url).build();
    let backend = ToolhouseBackend::new(config);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let overlay = OverlayBuilder::with_backend(backend)
        .with_bot_name(BOT_NAME)
        .with_user_name(user_name.clone())
        .on_chunk({
            let event_tx = event_tx.clone();
            move |chunk| {
                event_tx.send(OverlayEvent::Chunk(chunk.to_owned())).ok();
            }
        })
        .on_turn_ended({
            let event_tx = event_tx.clone();
            move || {
                event_tx.send(OverlayEvent::TurnEnded).ok();
            }
        })
        .open();

    println!(
        "{} === {} has joined the chatroom",
        timestamp().dimmed(),
        BOT_NAME
    );

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    'outer: loop {
        print!("{} <{}> ", timestamp().dimmed(), user_name.bold());
        std::io::stdout().flush().unwrap();

        let Some(line) = read_line().await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/contact" {
            run_contact_form(contact_url.as_deref()).await;
            continue;
        }
        overlay.send_message(line);

        println!("{} <{}>", timestamp().dimmed(), BOT_NAME.cyan());

        let mut renderer = LineRenderer::new();
        let mut streamed = String::new();
        let mut progress_bar = None;

        loop {
            // Create a new progress bar if it has been finished.
            progress_bar
                .get_or_insert_with(|| {
                    let progress_bar = ProgressBar::new_spinner();
                    progress_bar.set_style(progress_style.clone());
                    progress_bar.set_message(format!("{BOT_NAME} is typing..."));
                    progress_bar
                })
                .inc(1);

            let sleep = sleep(Duration::from_millis(100));
            let event = select! {
                event = event_rx.recv() => {
                    let Some(event) = event else {
                        break 'outer;
                    };
                    event
                },
                _ = sleep => {
                    continue;
                }
            };

            // Finish the progress bar before printing anything else.
            if let Some(progress_bar) = &progress_bar {
                progress_bar.finish_and_clear();
            }
            progress_bar = None;

            match event {
                OverlayEvent::Chunk(chunk) => {
                    streamed.push_str(&chunk);
                    for line in renderer.push(&chunk) {
                        println!("{line}");
                    }
                }
                OverlayEvent::TurnEnded => {
                    if let Some(line) = renderer.finish() {
                        println!("{line}");
                    }
                    reconcile_settled_reply(&overlay, &streamed).await;
                    break;
                }
            }
        }
    }

    overlay.close();
}

/// Prints the body the turn actually settled with when it differs
/// from what was streamed. A failed turn replaces the reply — partial
/// or not — with a notice, and that notice must reach the screen even
/// after some chunks were already printed.
async fn reconcile_settled_reply(overlay: &Overlay, streamed: &str) {
    let snapshot = overlay.snapshot().await;
    let Some(reply) = snapshot.messages.last() else {
        return;
    };
    if reply.body() != streamed && !reply.body().is_empty() {
        println!("{}", reply.body().red());
    }
}

async fn run_contact_form(contact_url: Option<&str>) {
    let Some(contact_url) = contact_url else {
        eprintln!("RETROCHAT_CONTACT_URL environment variable is not set");
        return;
    };

    print!("Name: ");
    std::io::stdout().flush().unwrap();
    let Some(name) = read_line().await else {
        return;
    };
    print!("Message: ");
    std::io::stdout().flush().unwrap();
    let Some(message) = read_line().await else {
        return;
    };

    let form = ContactForm::new(contact_url);
    match form.send(name.trim(), message.trim()).await {
        Ok(()) => println!("Message sent!"),
        Err(err) => eprintln!("{}", err.to_string().red()),
    }
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}

#[inline]
fn timestamp() -> String {
    Local::now().format("[%H:%M]").to_string()
}
