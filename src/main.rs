mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use itertools::Itertools;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
};
use tracing_subscriber::EnvFilter;
use wordrush::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    history::{HistoryDb, HistorySummary},
    language::Language,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    session::KeyInput,
    timer::{TestDuration, TimerToken},
    word_source::WordSource,
    ResultRecord, TypingSession,
};

/// How many past results the history screen charts and lists
const HISTORY_WINDOW: usize = 20;
/// How many saved results the results screen compares a finished test against
const TREND_WINDOW: usize = 10;

/// timed random-word typing practice with live wpm and result history
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type an endless stream of random common words against the clock. Words per minute and accuracy are shown live and every finished test can be saved to a local history."
)]
pub struct Cli {
    /// length of the test in seconds
    #[clap(short = 'd', long, value_enum)]
    duration: Option<TestDuration>,

    /// draw words from this file (one word per line) instead of the built-in list
    #[clap(long)]
    words_file: Option<PathBuf>,

    /// save every finished test to history without asking
    #[clap(long)]
    auto_save: bool,

    /// seed the word stream for a reproducible test
    #[clap(long)]
    seed: Option<u64>,

    /// print a summary of saved results and exit
    #[clap(long)]
    summary: bool,

    /// write saved results as csv to PATH and exit
    #[clap(long, value_name = "PATH")]
    export_csv: Option<PathBuf>,

    /// delete all saved results and exit
    #[clap(long)]
    clear_history: bool,
}

impl Cli {
    /// Overlay command line choices onto the persisted preferences
    fn apply_to(&self, config: &mut Config) {
        if let Some(duration) = self.duration {
            config.duration = duration;
        }
        if let Some(ref path) = self.words_file {
            config.words_file = Some(path.clone());
        }
        if self.auto_save {
            config.auto_save = true;
        }
    }

    fn is_utility(&self) -> bool {
        self.summary || self.export_csv.is_some() || self.clear_history
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Typing,
    Results,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub session: TypingSession,
    pub state: AppState,
    pub history: Option<HistoryDb>,
    pub recent: Vec<ResultRecord>,
    pub summary: Option<HistorySummary>,
    /// Saved history as it stood when the current test finished
    pub baseline: Option<HistorySummary>,
    pub trend: Vec<u32>,
    pub saved: bool,
    pub auto_save: bool,
    pub status: Option<String>,
}

impl App {
    pub fn new(session: TypingSession, history: Option<HistoryDb>, auto_save: bool) -> Self {
        let mut app = Self {
            session,
            state: AppState::Typing,
            history,
            recent: Vec::new(),
            summary: None,
            baseline: None,
            trend: Vec::new(),
            saved: false,
            auto_save,
            status: None,
        };
        app.refresh_history();
        app
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }
        if key.code == KeyCode::Esc {
            return Control::Quit;
        }

        match self.state {
            AppState::Typing => match key.code {
                KeyCode::Tab => self.restart(),
                KeyCode::Left if !self.session.has_started() => {
                    self.change_duration(self.session.duration().prev())
                }
                KeyCode::Right if !self.session.has_started() => {
                    self.change_duration(self.session.duration().next())
                }
                KeyCode::F(2) if !self.session.has_started() => self.open_history(),
                KeyCode::Backspace => self.session.apply(KeyInput::Backspace),
                KeyCode::Char(c) if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() => {
                    self.session.apply(KeyInput::from_char(c))
                }
                _ => {}
            },
            AppState::Results => match key.code {
                KeyCode::Char('s') => self.save_result(),
                KeyCode::Char('r') | KeyCode::Char('n') | KeyCode::Tab => self.restart(),
                KeyCode::Char('h') => self.open_history(),
                KeyCode::Char('q') => return Control::Quit,
                _ => {}
            },
            AppState::History => match key.code {
                KeyCode::Char('b') | KeyCode::Backspace => {
                    self.state = if self.session.has_finished() {
                        AppState::Results
                    } else {
                        AppState::Typing
                    };
                }
                KeyCode::Char('x') => self.clear_history(),
                KeyCode::Char('q') => return Control::Quit,
                _ => {}
            },
        }

        Control::Continue
    }

    pub fn on_tick(&mut self, token: TimerToken) {
        if self.session.on_tick(token).is_some() {
            self.baseline = self.summary.clone();
            self.trend = self.recent[self.recent.len().saturating_sub(TREND_WINDOW)..]
                .iter()
                .map(ResultRecord::wpm)
                .collect();
            self.state = AppState::Results;
            if self.auto_save {
                self.save_result();
            }
        }
    }

    pub fn restart(&mut self) {
        self.session.reset();
        self.state = AppState::Typing;
        self.saved = false;
        self.status = None;
        self.baseline = None;
        self.trend.clear();
    }

    fn change_duration(&mut self, duration: TestDuration) {
        if let Err(e) = self.session.set_duration(duration) {
            tracing::debug!(error = %e, "duration change rejected");
        }
    }

    pub fn save_result(&mut self) {
        if self.saved {
            return;
        }
        let Some(record) = self.session.result() else {
            return;
        };
        let Some(ref db) = self.history else {
            self.status = Some("history unavailable".to_string());
            return;
        };

        match db.append(record) {
            Ok(()) => {
                self.saved = true;
                self.status = Some("result saved".to_string());
                self.refresh_history();
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to save result");
                self.status = Some(format!("save failed: {e}"));
            }
        }
    }

    pub fn open_history(&mut self) {
        self.refresh_history();
        self.state = AppState::History;
    }

    /// Reload the summary and recent results from the store
    fn refresh_history(&mut self) {
        let all = match self.history {
            Some(ref db) => db.all().unwrap_or_else(|e| {
                tracing::error!(error = %e, "failed to load history");
                Vec::new()
            }),
            None => Vec::new(),
        };
        self.summary = HistorySummary::from_records(&all);
        self.recent = all[all.len().saturating_sub(HISTORY_WINDOW)..].to_vec();
    }

    fn clear_history(&mut self) {
        if let Some(ref db) = self.history {
            match db.clear() {
                Ok(()) => {
                    self.recent.clear();
                    self.summary = None;
                    self.status = Some("history cleared".to_string());
                }
                Err(e) => tracing::error!(error = %e, "failed to clear history"),
            }
        }
    }
}

fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}

/// Handle the history flags that run without the TUI
fn run_utility(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let db = HistoryDb::open_default()?;

    if cli.clear_history {
        db.clear()?;
        println!("history cleared");
    }

    if let Some(ref path) = cli.export_csv {
        let file = fs::File::create(path)?;
        let written = db.export_csv(file)?;
        println!("exported {written} results to {}", path.display());
    }

    if cli.summary {
        let records = db.all()?;
        match HistorySummary::from_records(&records) {
            Some(s) => {
                println!("tests:    {}", s.total_tests);
                println!("best wpm: {}   avg wpm: {}", s.best_wpm, s.avg_wpm);
                println!("best acc: {}%   avg acc: {}%", s.best_accuracy, s.avg_accuracy);
                let recent = db
                    .recent(10)?
                    .iter()
                    .map(|r| r.wpm().to_string())
                    .join(", ");
                println!("recent:   {recent}");
            }
            None => println!("no saved results yet"),
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    if cli.is_utility() {
        return run_utility(&cli);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    cli.apply_to(&mut config);

    let language = match config.words_file {
        Some(ref path) => Language::from_word_file(path)?,
        None => Language::english()?,
    };
    let source = match cli.seed {
        Some(seed) => WordSource::with_seed(&language, seed),
        None => WordSource::new(&language),
    };
    let history = HistoryDb::open_default()
        .map_err(|e| tracing::warn!(error = %e, "continuing without result history"))
        .ok();

    let mut app = App::new(
        TypingSession::new(source, config.duration),
        history,
        config.auto_save,
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    config.duration = app.session.duration();
    if let Err(e) = config_store.save(&config) {
        tracing::warn!(error = %e, "failed to save config");
    }

    outcome
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(CrosstermEventSource::new(), FixedTicker::per_second());

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            AppEvent::Key(key) => {
                if app.handle_key(key) == Control::Quit {
                    break;
                }
            }
            AppEvent::Tick(token) => app.on_tick(token),
            AppEvent::Resize => {}
            AppEvent::Idle => continue,
        }

        // Keep the scheduler in step with the session's countdown
        match app.session.timer_token() {
            Some(token) => runner.arm(token),
            None => runner.disarm(),
        }

        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordrush::Phase;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app(words: &[&str]) -> App {
        let lang =
            Language::from_words("test", words.iter().map(|w| w.to_string()).collect()).unwrap();
        let session = TypingSession::new(WordSource::with_seed(&lang, 5), TestDuration::Thirty);
        App::new(session, Some(HistoryDb::open_in_memory().unwrap()), false)
    }

    fn finish(app: &mut App) {
        let token = app.session.timer_token().unwrap();
        for _ in 0..app.session.duration().secs() {
            app.on_tick(token);
        }
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["wordrush"]);

        assert_eq!(cli.duration, None);
        assert_eq!(cli.words_file, None);
        assert!(!cli.auto_save);
        assert_eq!(cli.seed, None);
        assert!(!cli.is_utility());
    }

    #[test]
    fn test_cli_duration() {
        let cli = Cli::parse_from(["wordrush", "-d", "60"]);
        assert_eq!(cli.duration, Some(TestDuration::Sixty));

        let cli = Cli::parse_from(["wordrush", "--duration", "120"]);
        assert_eq!(cli.duration, Some(TestDuration::OneTwenty));

        assert!(Cli::try_parse_from(["wordrush", "-d", "45"]).is_err());
    }

    #[test]
    fn test_cli_utility_flags() {
        let cli = Cli::parse_from(["wordrush", "--summary"]);
        assert!(cli.is_utility());

        let cli = Cli::parse_from(["wordrush", "--export-csv", "out.csv"]);
        assert_eq!(cli.export_csv, Some(PathBuf::from("out.csv")));
        assert!(cli.is_utility());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["wordrush", "-d", "60", "--auto-save", "--words-file", "w.txt"]);
        let mut config = Config::default();

        cli.apply_to(&mut config);

        assert_eq!(config.duration, TestDuration::Sixty);
        assert!(config.auto_save);
        assert_eq!(config.words_file, Some(PathBuf::from("w.txt")));
    }

    #[test]
    fn test_cli_keeps_config_when_unset() {
        let cli = Cli::parse_from(["wordrush"]);
        let mut config = Config {
            duration: TestDuration::OneTwenty,
            auto_save: true,
            words_file: None,
        };

        cli.apply_to(&mut config);

        assert_eq!(config.duration, TestDuration::OneTwenty);
        assert!(config.auto_save);
    }

    #[test]
    fn test_typing_keys_drive_session() {
        let mut app = test_app(&["go"]);

        app.handle_key(key(KeyCode::Char('g')));
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Backspace));
        app.handle_key(key(KeyCode::Char('o')));
        app.handle_key(key(KeyCode::Char(' ')));

        assert_eq!(app.session.phase(), Phase::Active);
        assert_eq!(app.session.typed_words().get(&0).map(String::as_str), Some("go"));
        assert_eq!(app.session.total_chars(), 3);
        assert_eq!(app.session.correct_chars(), 2);
    }

    #[test]
    fn test_modified_chars_are_not_typed() {
        let mut app = test_app(&["go"]);

        app.handle_key(KeyEvent::new(KeyCode::Char('g'), KeyModifiers::ALT));
        app.handle_key(KeyEvent::new(KeyCode::Char('g'), KeyModifiers::CONTROL));
        assert_eq!(app.session.phase(), Phase::NotStarted);
        assert_eq!(app.session.total_chars(), 0);

        app.handle_key(KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT));
        assert_eq!(app.session.total_chars(), 1);
    }

    #[test]
    fn test_summary_loaded_at_startup() {
        let db = HistoryDb::open_in_memory().unwrap();
        let first = {
            let mut app = test_app(&["go"]);
            app.handle_key(key(KeyCode::Char('g')));
            finish(&mut app);
            app.session.result().cloned().unwrap()
        };
        db.append(&first).unwrap();
        db.append(&first).unwrap();

        let lang = Language::from_words("test", vec!["go".to_string()]).unwrap();
        let session = TypingSession::new(WordSource::with_seed(&lang, 5), TestDuration::Thirty);
        let app = App::new(session, Some(db), false);

        assert_eq!(app.summary.as_ref().map(|s| s.total_tests), Some(2));
        assert_eq!(app.recent.len(), 2);
    }

    #[test]
    fn test_summary_refreshed_after_save() {
        let mut app = test_app(&["go"]);
        assert!(app.summary.is_none());

        app.handle_key(key(KeyCode::Char('g')));
        finish(&mut app);
        app.handle_key(key(KeyCode::Char('s')));

        assert_eq!(app.summary.as_ref().map(|s| s.total_tests), Some(1));
    }

    #[test]
    fn test_history_from_typing_screen_before_start() {
        let mut app = test_app(&["go"]);

        app.handle_key(key(KeyCode::F(2)));
        assert_eq!(app.state, AppState::History);

        app.handle_key(key(KeyCode::Char('b')));
        assert_eq!(app.state, AppState::Typing);

        app.handle_key(key(KeyCode::Char('g')));
        app.handle_key(key(KeyCode::F(2)));
        assert_eq!(app.state, AppState::Typing);
    }

    #[test]
    fn test_finish_captures_trend_before_saving() {
        let mut app = test_app(&["go"]);
        for _ in 0..2 {
            app.handle_key(key(KeyCode::Char('g')));
            finish(&mut app);
            app.handle_key(key(KeyCode::Char('s')));
            app.handle_key(key(KeyCode::Char('r')));
        }
        assert!(app.trend.is_empty());

        app.handle_key(key(KeyCode::Char('g')));
        finish(&mut app);
        app.handle_key(key(KeyCode::Char('s')));

        assert_eq!(app.trend.len(), 2);
        assert_eq!(app.baseline.as_ref().map(|s| s.total_tests), Some(2));
        assert_eq!(app.summary.as_ref().map(|s| s.total_tests), Some(3));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app(&["go"]);
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Control::Quit);
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Control::Quit
        );
    }

    #[test]
    fn test_duration_arrows_only_before_start() {
        let mut app = test_app(&["go"]);

        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.session.duration(), TestDuration::Sixty);
        app.handle_key(key(KeyCode::Left));
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.session.duration(), TestDuration::OneTwenty);

        app.handle_key(key(KeyCode::Char('g')));
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.session.duration(), TestDuration::OneTwenty);
    }

    #[test]
    fn test_finish_moves_to_results_and_saves_once() {
        let mut app = test_app(&["go"]);
        app.handle_key(key(KeyCode::Char('g')));

        finish(&mut app);
        assert_eq!(app.state, AppState::Results);

        app.handle_key(key(KeyCode::Char('s')));
        app.handle_key(key(KeyCode::Char('s')));

        assert!(app.saved);
        assert_eq!(app.history.as_ref().unwrap().count().unwrap(), 1);
    }

    #[test]
    fn test_auto_save() {
        let mut app = test_app(&["go"]);
        app.auto_save = true;
        app.handle_key(key(KeyCode::Char('g')));

        finish(&mut app);

        assert!(app.saved);
        assert_eq!(app.history.as_ref().unwrap().count().unwrap(), 1);
    }

    #[test]
    fn test_typing_ignored_on_results_screen() {
        let mut app = test_app(&["go"]);
        app.handle_key(key(KeyCode::Char('g')));
        finish(&mut app);

        app.handle_key(key(KeyCode::Char('o')));

        assert_eq!(app.session.total_chars(), 1);
    }

    #[test]
    fn test_restart_from_results() {
        let mut app = test_app(&["go"]);
        app.handle_key(key(KeyCode::Char('g')));
        finish(&mut app);
        app.handle_key(key(KeyCode::Char('s')));

        app.handle_key(key(KeyCode::Char('r')));

        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.session.phase(), Phase::NotStarted);
        assert!(!app.saved);
    }

    #[test]
    fn test_history_screen_roundtrip() {
        let mut app = test_app(&["go"]);
        app.handle_key(key(KeyCode::Char('g')));
        finish(&mut app);
        app.handle_key(key(KeyCode::Char('s')));

        app.handle_key(key(KeyCode::Char('h')));
        assert_eq!(app.state, AppState::History);
        assert_eq!(app.recent.len(), 1);
        assert_eq!(app.summary.as_ref().map(|s| s.total_tests), Some(1));

        app.handle_key(key(KeyCode::Char('x')));
        assert!(app.recent.is_empty());
        assert!(app.summary.is_none());

        app.handle_key(key(KeyCode::Char('b')));
        assert_eq!(app.state, AppState::Results);
    }

    #[test]
    fn test_tab_restarts_mid_session() {
        let mut app = test_app(&["go"]);
        app.handle_key(key(KeyCode::Char('g')));
        let stale = app.session.timer_token().unwrap();

        app.handle_key(key(KeyCode::Tab));
        app.on_tick(stale);

        assert_eq!(app.session.phase(), Phase::NotStarted);
        assert_eq!(app.session.seconds_remaining(), 30);
        assert_eq!(app.state, AppState::Typing);
    }
}
