//! Terminal UI for TacoTex.

mod app;
mod input;
mod ui;

pub use app::{App, Reply, Request, SharedStore};
pub use input::move_cursor;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use crate::backend::OpponentBackend;
use crate::config::AppConfig;
use crate::wallet::{WalletEvent, WalletEvents, WalletSession};

/// Log file used while the terminal is in raw mode.
pub const TUI_LOG_FILE: &str = "tacotex_tui.log";

type SharedBackend = Arc<Mutex<Box<dyn OpponentBackend>>>;

/// Run the TUI against `backend`, persisting to `store`.
pub async fn run_tui(
    config: &AppConfig,
    backend: Box<dyn OpponentBackend>,
    store: SharedStore,
) -> Result<()> {
    // Setup logging to file to avoid interfering with TUI
    let log_file = std::fs::File::create(TUI_LOG_FILE)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init(); // Don't panic if already initialized

    info!(backend = backend.name(), "Starting TacoTex TUI");

    let mut app = App::new(
        store,
        WalletSession::new(),
        *config.history_limit(),
        backend.name(),
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let res = run_app(&mut terminal, &mut app, config, Arc::new(Mutex::new(backend))).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "Game loop error");
    }
    res
}

/// Event loop: draws, forwards keys to [`App`], and runs backend calls on
/// tasks so the screen stays live while the AI thinks.
#[instrument(skip_all)]
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    config: &AppConfig,
    backend: SharedBackend,
) -> Result<()> {
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<Reply>();
    let (wallet_tx, mut wallet_rx) = mpsc::unbounded_channel::<WalletEvent>();

    let wallet = WalletEvents::new();
    let subscription = wallet.subscribe(move |event| {
        let _ = wallet_tx.send(event.clone());
    });
    wallet.emit(&WalletEvent::AccountChanged(config.wallet_address().clone()));

    let mut in_flight: Option<JoinHandle<()>> = None;

    if let Some(difficulty) = *config.default_difficulty() {
        let request = app.select_difficulty(difficulty);
        in_flight = dispatch(request, app.generation(), &backend, &reply_tx, in_flight.take());
    }

    let result = loop {
        while let Ok(event) = wallet_rx.try_recv() {
            app.apply_wallet_event(&event);
        }
        while let Ok(reply) = reply_rx.try_recv() {
            app.apply_reply(reply);
        }

        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(Duration::from_millis(50))? {
            tokio::task::yield_now().await;
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.handle_key(key.code) {
            Some(Request::Quit) => break Ok(()),
            Some(request) => {
                in_flight = dispatch(
                    request,
                    app.generation(),
                    &backend,
                    &reply_tx,
                    in_flight.take(),
                );
            }
            None => {}
        }
    };

    if let Some(task) = in_flight {
        task.abort();
    }
    wallet.unsubscribe(subscription);
    result
}

/// Starts the backend call for `request`.
///
/// A new game or a cancel aborts whatever was in flight; a move never
/// overlaps another because [`App`] refuses input while pending.
fn dispatch(
    request: Request,
    generation: u64,
    backend: &SharedBackend,
    reply_tx: &mpsc::UnboundedSender<Reply>,
    previous: Option<JoinHandle<()>>,
) -> Option<JoinHandle<()>> {
    if matches!(request, Request::Start(_) | Request::Cancel)
        && let Some(task) = &previous
    {
        debug!("Aborting in-flight backend call");
        task.abort();
    }

    let backend = Arc::clone(backend);
    let reply_tx = reply_tx.clone();
    let task = match request {
        Request::Start(difficulty) => tokio::spawn(async move {
            let result = backend.lock().await.start(difficulty).await;
            let _ = reply_tx.send(Reply { generation, result });
        }),
        Request::Play(position) => tokio::spawn(async move {
            let result = backend.lock().await.play(position).await;
            let _ = reply_tx.send(Reply { generation, result });
        }),
        Request::Cancel | Request::Quit => return None,
    };
    Some(task)
}
