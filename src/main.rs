mod api;
mod app;
mod config;
mod events;
mod models;
mod server;
mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::Backend, prelude::*};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use api::IdeaClient;
use app::App;
use events::AppEvent;
use models::AppConfig;
use ui::Theme;

/// Terminal UI that streams AI-generated tech talk ideas
#[derive(Parser, Debug)]
#[command(name = "talkgen")]
#[command(about = "Stream tech talk ideas for a topic", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the idea generation endpoint the UI talks to
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:8000
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = config::load_config()?;

    match args.command {
        Some(Command::Serve { bind }) => {
            dotenvy::dotenv().ok();
            tracing_subscriber::fmt::init();

            let mut serve = config.serve;
            if let Some(bind) = bind {
                serve.bind = bind;
            }
            server::run(&serve).await
        }
        None => run_tui(&config),
    }
}

fn run_tui(config: &AppConfig) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state and API client
    let mut app = App::new(config);
    let theme = Theme::from_config(&config.theme);
    let client = IdeaClient::new(config.endpoint_url.clone(), config.request_timeout)?;

    // Create channel for async events
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();

    // Run app
    let res = run_app(&mut terminal, &mut app, &theme, &client, &tx, &mut rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    theme: &Theme,
    client: &IdeaClient,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
    event_rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    // Handle of the in-flight stream task. Owning it here ties stream
    // lifetime to the loop: a replaced or cancelled stream is aborted, and
    // whatever is still running gets aborted at teardown.
    let mut stream_task: Option<JoinHandle<()>> = None;

    loop {
        terminal.draw(|f| ui::render(f, app, theme))?;

        // Drain stream events that arrived since the last frame
        while let Ok(app_event) = event_rx.try_recv() {
            app.apply_event(app_event);
        }

        // Check for keyboard input with shorter timeout for better responsiveness
        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    // Handle help window first
                    if handle_help_keys(app, key.code, key.modifiers) {
                        continue;
                    }

                    handle_keyboard_input(
                        app,
                        key.code,
                        key.modifiers,
                        client,
                        event_tx,
                        &mut stream_task,
                    );
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    abort_stream(&mut stream_task);
    Ok(())
}

const fn handle_help_keys(app: &mut App, key: KeyCode, modifiers: event::KeyModifiers) -> bool {
    if !app.show_help {
        return false;
    }

    match key {
        KeyCode::Char('h') if modifiers.contains(event::KeyModifiers::CONTROL) => {
            app.toggle_help();
        }
        KeyCode::Esc => {
            app.show_help = false;
        }
        _ => {}
    }
    true
}

fn handle_keyboard_input(
    app: &mut App,
    key: KeyCode,
    modifiers: event::KeyModifiers,
    client: &IdeaClient,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
    stream_task: &mut Option<JoinHandle<()>>,
) {
    match key {
        KeyCode::Char('c') if modifiers.contains(event::KeyModifiers::CONTROL) => {
            if app.exit_pending {
                app.quit();
            } else {
                app.exit_pending = true;
            }
            return;
        }
        KeyCode::Esc => {
            if app.exit_pending {
                app.exit_pending = false;
            } else if app.is_loading() {
                abort_stream(stream_task);
                app.cancel_generation();
            }
            return;
        }
        _ if app.exit_pending => {
            // Any other key cancels pending exit, then is processed normally
            app.exit_pending = false;
        }
        _ => {}
    }

    match key {
        KeyCode::Char('q') if modifiers.contains(event::KeyModifiers::CONTROL) => {
            app.quit();
        }
        KeyCode::Char('h') if modifiers.contains(event::KeyModifiers::CONTROL) => {
            app.toggle_help();
        }

        // Navigation keys scroll the ideas panel
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::Home => app.scroll_to_top(),
        KeyCode::End => app.scroll_to_bottom(),

        // Editing keys affect the topic field
        KeyCode::Backspace => {
            app.topic.pop();
        }
        KeyCode::Enter => {
            if app.can_submit() {
                abort_stream(stream_task);
                *stream_task = Some(start_generation(app, client, event_tx));
            }
        }
        KeyCode::Char(c) => {
            app.topic.push(c);
        }

        _ => {}
    }
}

fn abort_stream(stream_task: &mut Option<JoinHandle<()>>) {
    if let Some(task) = stream_task.take() {
        task.abort();
    }
}

fn start_generation(
    app: &mut App,
    client: &IdeaClient,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    // The topic stays in the field and is sent exactly as typed
    let topic = app.topic.clone();
    let seq = app.begin_generation();

    let client = client.clone();
    let tx = event_tx.clone();

    tokio::spawn(async move {
        match client.stream_ideas(&topic).await {
            Ok(mut stream) => {
                while let Some(result) = stream.next().await {
                    match result {
                        Ok(text) => {
                            let _ = tx.send(AppEvent::IdeaChunk { seq, text });
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "idea stream broke mid-transfer");
                            let _ = tx.send(AppEvent::StreamFailed { seq });
                            return;
                        }
                    }
                }
                let _ = tx.send(AppEvent::StreamEnded { seq });
            }
            Err(e) => {
                tracing::warn!(error = %e, "idea request failed");
                let _ = tx.send(AppEvent::StreamFailed { seq });
            }
        }
    })
}
