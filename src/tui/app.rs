//! Application state and logic.
//!
//! `App` never talks to the backend itself. Key handling returns a
//! [`Request`] for the run loop to execute, and the loop hands results back
//! through [`App::apply_reply`].

use crossterm::event::KeyCode;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::input::move_cursor;
use crate::backend::{BackendError, GameSnapshot};
use crate::games::tictactoe::{
    Board, Difficulty, GameOutcome, Mark, Position, apply_player_move,
};
use crate::history::{AggregatedStats, GameHistory, GameRecord, KeyValueStore};
use crate::sound::{SoundCue, SoundPlayer};
use crate::wallet::{WalletEvent, WalletSession};

/// Store shared by history and settings.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Work for the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Start a fresh game, cancelling anything in flight.
    Start(Difficulty),
    /// Send the player's move.
    Play(Position),
    /// Cancel anything in flight.
    Cancel,
    /// Leave the UI.
    Quit,
}

/// Backend result tagged with the game it belongs to.
#[derive(Debug)]
pub struct Reply {
    /// Game generation the request was made in.
    pub generation: u64,
    /// What the backend said.
    pub result: Result<GameSnapshot, BackendError>,
}

/// Main application state.
pub struct App {
    board: Board,
    confirmed: Board,
    difficulty: Option<Difficulty>,
    outcome: GameOutcome,
    cursor: Position,
    pending: bool,
    generation: u64,
    notice: Option<String>,
    show_history: bool,
    records: Vec<GameRecord>,
    stats: AggregatedStats,
    history: GameHistory<SharedStore>,
    sound: SoundPlayer<SharedStore>,
    session: WalletSession,
    backend_name: String,
}

impl App {
    /// Creates the app in difficulty selection.
    #[instrument(skip(store))]
    pub fn new(
        store: SharedStore,
        session: WalletSession,
        history_limit: usize,
        backend_name: &str,
    ) -> Self {
        let history =
            GameHistory::with_limit(Arc::clone(&store), session.history_key(), history_limit);
        let mut app = Self {
            board: Board::new(),
            confirmed: Board::new(),
            difficulty: None,
            outcome: GameOutcome::InProgress,
            cursor: Position::Center,
            pending: false,
            generation: 0,
            notice: None,
            show_history: false,
            records: Vec::new(),
            stats: AggregatedStats::default(),
            history,
            sound: SoundPlayer::load(store),
            session,
            backend_name: backend_name.to_string(),
        };
        app.refresh_history();
        app
    }

    /// Board as last known.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Difficulty of the current game; `None` while selecting.
    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    /// Outcome of the board.
    pub fn outcome(&self) -> &GameOutcome {
        &self.outcome
    }

    /// Highlighted square.
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// True while a backend call is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Current game generation; replies from older ones are dropped.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Last error or hint for the player.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Whether the history panel is open.
    pub fn show_history(&self) -> bool {
        self.show_history
    }

    /// Cached history, newest first.
    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    /// Cached statistics.
    pub fn stats(&self) -> &AggregatedStats {
        &self.stats
    }

    /// Wallet state.
    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    /// Whether sound is muted.
    pub fn is_muted(&self) -> bool {
        self.sound.is_muted()
    }

    /// Backend label.
    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// Status line text.
    pub fn status_line(&self) -> String {
        if self.difficulty.is_none() {
            return "Select difficulty".to_string();
        }
        match self.outcome {
            GameOutcome::Draw => "It's a Draw!",
            GameOutcome::Win { mark: Mark::X, .. } => "You Win!",
            GameOutcome::Win { mark: Mark::O, .. } => "AI Wins!",
            GameOutcome::InProgress if self.board.to_move() == Mark::OPPONENT => {
                "AI's Turn (O)..."
            }
            GameOutcome::InProgress => "Your Turn (X)",
        }
        .to_string()
    }

    /// Maps a key press to state changes and, possibly, work for the loop.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn handle_key(&mut self, key: KeyCode) -> Option<Request> {
        if matches!(key, KeyCode::Char('q') | KeyCode::Esc) {
            info!("User quit");
            return Some(Request::Quit);
        }

        if self.difficulty.is_none() {
            let difficulty = match key {
                KeyCode::Char('1' | 'e') => Difficulty::Easy,
                KeyCode::Char('2' | 'm') => Difficulty::Medium,
                KeyCode::Char('3' | 'h') => Difficulty::Hard,
                _ => return None,
            };
            return Some(self.select_difficulty(difficulty));
        }

        match key {
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
                self.cursor = move_cursor(self.cursor, key);
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.play(self.cursor),
            KeyCode::Char(c @ '1'..='9') => {
                let position = Position::from_key_or_label(&c.to_string())?;
                self.cursor = position;
                self.play(position)
            }
            KeyCode::Char('r') => {
                let difficulty = self.difficulty?;
                Some(self.select_difficulty(difficulty))
            }
            KeyCode::Char('d') => Some(self.change_difficulty()),
            KeyCode::Char('m') => {
                self.toggle_mute();
                None
            }
            KeyCode::Char('h') => {
                self.show_history = !self.show_history;
                None
            }
            KeyCode::Char('c') => {
                self.clear_history();
                None
            }
            _ => None,
        }
    }

    /// Begins a game at `difficulty`.
    #[instrument(skip(self))]
    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> Request {
        self.generation += 1;
        self.difficulty = Some(difficulty);
        self.board = Board::new();
        self.confirmed = Board::new();
        self.outcome = GameOutcome::InProgress;
        self.cursor = Position::Center;
        self.pending = true;
        self.notice = None;
        info!(%difficulty, generation = self.generation, "Starting game");
        Request::Start(difficulty)
    }

    /// Back to difficulty selection.
    #[instrument(skip(self))]
    pub fn change_difficulty(&mut self) -> Request {
        self.generation += 1;
        self.difficulty = None;
        self.board = Board::new();
        self.confirmed = Board::new();
        self.outcome = GameOutcome::InProgress;
        self.pending = false;
        self.notice = None;
        Request::Cancel
    }

    /// Shows the player's mark at once and asks the loop to send it.
    ///
    /// Ignored while a reply is pending; invalid moves only set a notice.
    #[instrument(skip(self))]
    pub fn play(&mut self, position: Position) -> Option<Request> {
        if self.pending {
            debug!("Move ignored while waiting for the AI");
            return None;
        }
        match apply_player_move(&self.board, position.to_index()) {
            Ok(board) => {
                self.board = board;
                self.pending = true;
                self.notice = None;
                self.sound.play(SoundCue::Place);
                Some(Request::Play(position))
            }
            Err(e) => {
                self.notice = Some(e.to_string());
                None
            }
        }
    }

    /// Folds a backend result into the state.
    ///
    /// Results from an abandoned game are dropped. A finished game is
    /// recorded in the history and its cue played.
    #[instrument(skip(self, reply), fields(reply_generation = reply.generation))]
    pub fn apply_reply(&mut self, reply: Reply) {
        if reply.generation != self.generation {
            debug!(current = self.generation, "Dropping stale reply");
            return;
        }
        self.pending = false;

        let snapshot = match reply.result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Backend call failed");
                self.notice = Some(e.to_string());
                // The previewed X was never accepted.
                self.board = self.confirmed.clone();
                return;
            }
        };

        if snapshot.opponent_move().is_some() {
            self.sound.play(SoundCue::Place);
        }
        self.board = snapshot.board().clone();
        self.confirmed = self.board.clone();
        self.difficulty = Some(*snapshot.difficulty());
        self.outcome = *snapshot.outcome();

        if let Some(cue) = SoundCue::for_outcome(&self.outcome) {
            self.sound.play(cue);
            self.record_outcome();
        }
    }

    /// Follows a wallet change: history is re-keyed to the new account.
    #[instrument(skip(self))]
    pub fn apply_wallet_event(&mut self, event: &WalletEvent) {
        self.session.apply(event);
        self.history.switch_account(self.session.history_key());
        self.refresh_history();
    }

    fn record_outcome(&mut self) {
        let Some(difficulty) = self.difficulty else {
            return;
        };
        if let Err(e) = self.history.record(&self.outcome, difficulty) {
            warn!(error = %e, "Failed to save game result");
            self.notice = Some(format!("History not saved: {}", e.message));
        }
        self.refresh_history();
    }

    fn toggle_mute(&mut self) {
        if let Err(e) = self.sound.toggle() {
            warn!(error = %e, "Failed to save mute setting");
            self.notice = Some(format!("Setting not saved: {}", e.message));
        }
    }

    fn clear_history(&mut self) {
        if let Err(e) = self.history.clear() {
            warn!(error = %e, "Failed to clear history");
            self.notice = Some(format!("History not cleared: {}", e.message));
        }
        self.refresh_history();
    }

    fn refresh_history(&mut self) {
        match self.history.list() {
            Ok(records) => {
                self.stats = AggregatedStats::from_records(&records);
                self.records = records;
            }
            Err(e) => {
                warn!(error = %e, "Failed to load history");
                self.records.clear();
                self.stats = AggregatedStats::default();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryStore;

    fn app() -> App {
        App::new(Arc::new(MemoryStore::new()), WalletSession::new(), 100, "test")
    }

    fn start(app: &mut App, difficulty: Difficulty) {
        app.select_difficulty(difficulty);
        let reply = Reply {
            generation: app.generation(),
            result: Ok(GameSnapshot::new(
                Board::new(),
                difficulty,
                GameOutcome::InProgress,
                None,
                None,
            )),
        };
        app.apply_reply(reply);
    }

    #[test]
    fn test_selector_keys() {
        let mut app = app();
        assert_eq!(app.status_line(), "Select difficulty");
        assert_eq!(app.handle_key(KeyCode::Char('x')), None);
        assert_eq!(
            app.handle_key(KeyCode::Char('h')),
            Some(Request::Start(Difficulty::Hard))
        );
        assert!(app.is_pending());
    }

    #[test]
    fn test_input_ignored_while_pending() {
        let mut app = app();
        start(&mut app, Difficulty::Easy);
        assert_eq!(
            app.handle_key(KeyCode::Char('5')),
            Some(Request::Play(Position::Center))
        );
        assert_eq!(app.status_line(), "AI's Turn (O)...");
        assert_eq!(app.handle_key(KeyCode::Char('1')), None);
    }

    #[test]
    fn test_stale_reply_is_dropped() {
        let mut app = app();
        start(&mut app, Difficulty::Easy);
        let old = app.generation();
        app.play(Position::Center);
        app.change_difficulty();

        app.apply_reply(Reply {
            generation: old,
            result: Err(BackendError::NotStarted),
        });
        assert_eq!(app.difficulty(), None);
        assert_eq!(app.notice(), None);
    }

    #[test]
    fn test_finished_game_is_recorded_once() {
        let mut app = app();
        start(&mut app, Difficulty::Medium);
        app.play(Position::TopLeft);

        let board = Board::new()
            .with(Position::TopLeft, Mark::X)
            .with(Position::TopCenter, Mark::X)
            .with(Position::TopRight, Mark::X)
            .with(Position::Center, Mark::O)
            .with(Position::BottomLeft, Mark::O);
        let outcome = crate::games::tictactoe::evaluate(&board);
        app.apply_reply(Reply {
            generation: app.generation(),
            result: Ok(GameSnapshot::new(board, Difficulty::Medium, outcome, None, None)),
        });

        assert_eq!(app.status_line(), "You Win!");
        assert_eq!(app.records().len(), 1);
        assert_eq!(*app.stats().wins(), 1);
    }

    #[test]
    fn test_failed_move_is_taken_back() {
        let mut app = app();
        start(&mut app, Difficulty::Easy);
        app.play(Position::Center);
        assert!(!app.board().is_empty(Position::Center));

        app.apply_reply(Reply {
            generation: app.generation(),
            result: Err(BackendError::NotStarted),
        });
        assert!(app.board().is_empty(Position::Center));
        assert!(!app.is_pending());
        assert_eq!(app.status_line(), "Your Turn (X)");
    }

    #[test]
    fn test_occupied_square_sets_notice() {
        let mut app = app();
        start(&mut app, Difficulty::Easy);
        app.play(Position::Center);
        app.apply_reply(Reply {
            generation: app.generation(),
            result: Ok(GameSnapshot::new(
                Board::new()
                    .with(Position::Center, Mark::X)
                    .with(Position::TopLeft, Mark::O),
                Difficulty::Easy,
                GameOutcome::InProgress,
                Some(Position::Center),
                Some(Position::TopLeft),
            )),
        });
        assert_eq!(app.play(Position::TopLeft), None);
        assert!(app.notice().is_some());
    }

    #[test]
    fn test_wallet_change_rekeys_history() {
        let mut app = app();
        app.apply_wallet_event(&WalletEvent::AccountChanged(Some("0xABC".into())));
        assert_eq!(app.session().account(), Some("0xABC"));
        assert!(app.records().is_empty());
    }
}
