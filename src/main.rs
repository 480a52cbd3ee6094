mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    ops::ControlFlow,
    panic,
    path::PathBuf,
    time::Instant,
};
use targetsum::{
    config::{Config, ConfigStore, FileConfigStore},
    countdown::Countdown,
    logging,
    runtime::{CrosstermEventSource, GameEvent, Runner, SystemClock},
    GameConfig, GameSession,
};

/// race the clock to pick numbers that add up to the target
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "A terminal arithmetic puzzle: pick numbers from the board whose sum hits the target exactly before the countdown runs out. Go over and you lose."
)]
pub struct Cli {
    /// how many numbers to put on the board (at least 3)
    #[clap(short = 'n', long = "numbers")]
    random_number_count: Option<usize>,

    /// seconds on the clock
    #[clap(short = 's', long = "seconds")]
    initial_seconds: Option<u64>,

    /// seed the puzzle generator for reproducible boards
    #[clap(long)]
    seed: Option<u64>,

    /// show the numbers in the order they were drawn instead of shuffling them
    #[clap(long)]
    no_shuffle: bool,

    /// remember these settings as the new defaults
    #[clap(long)]
    save: bool,

    /// read and write settings at this path instead of the user config dir
    #[clap(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// write logs to a file (default: the user state dir); filter with RUST_LOG
    #[clap(long, value_name = "PATH")]
    log: Option<Option<PathBuf>>,
}

impl Cli {
    /// Command-line options win over stored settings
    fn to_config(&self, stored: &Config) -> Config {
        Config {
            random_number_count: self
                .random_number_count
                .unwrap_or(stored.random_number_count),
            initial_seconds: self.initial_seconds.unwrap_or(stored.initial_seconds),
            shuffle: stored.shuffle && !self.no_shuffle,
        }
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub session: GameSession,
    pub countdown: Countdown,
    /// Board position to index into the session's numbers
    pub order: Vec<usize>,
    pub cursor: usize,
    shuffle: bool,
    rng: StdRng,
}

impl App {
    pub fn new(config: GameConfig, shuffle: bool, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let session = GameSession::with_rng(config, &mut rng);
        let order = board_order(session.numbers().len(), shuffle, &mut rng);

        Self {
            shuffle,
            rng,
            ..Self::from_session(session, order)
        }
    }

    pub fn from_session(session: GameSession, order: Vec<usize>) -> Self {
        Self {
            session,
            countdown: Countdown::start(Instant::now()),
            order,
            cursor: 0,
            shuffle: false,
            rng: StdRng::from_entropy(),
        }
    }

    /// Play again: new numbers, same settings, fresh clock
    pub fn reset(&mut self) {
        self.session = self.session.reset_with_rng(&mut self.rng);
        self.order = board_order(self.session.numbers().len(), self.shuffle, &mut self.rng);
        self.cursor = 0;
        self.countdown = Countdown::start(Instant::now());
    }

    /// Pick the tile at a board position. Returns whether the pick was taken.
    pub fn select_at(&mut self, position: usize) -> bool {
        let Some(&index) = self.order.get(position) else {
            return false;
        };

        self.cursor = position;
        let taken = self.session.toggle(index);
        self.stop_clock_if_over();
        taken
    }

    pub fn move_cursor(&mut self, forward: bool) {
        let len = self.order.len();
        if len == 0 {
            return;
        }

        self.cursor = if forward {
            (self.cursor + 1) % len
        } else {
            (self.cursor + len - 1) % len
        };
    }

    /// Hand whole seconds from the countdown to the round. Returns true when
    /// the shown time changed.
    pub fn on_seconds(&mut self, due: u32) -> bool {
        let before = self.session.remaining_secs();
        for _ in 0..due {
            self.session.tick();
        }
        self.stop_clock_if_over();
        self.session.remaining_secs() != before
    }

    fn stop_clock_if_over(&mut self) {
        if self.session.is_over() && self.countdown.is_running() {
            tracing::debug!(status = %self.session.status(), "countdown stopped");
            self.countdown.stop();
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> ControlFlow<()> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return ControlFlow::Break(()),
            // ctrl+c to quit
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return ControlFlow::Break(())
            }
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(false),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => self.move_cursor(true),
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.select_at(self.cursor);
            }
            KeyCode::Char(c @ '1'..='9') => {
                self.select_at(c as usize - '1' as usize);
            }
            KeyCode::Char('r') => self.reset(),
            _ => {}
        }
        ControlFlow::Continue(())
    }
}

fn board_order<R: Rng + ?Sized>(len: usize, shuffle: bool, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    if shuffle {
        order.shuffle(rng);
    }
    order
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log {
        let path = path.clone().unwrap_or_else(logging::default_log_path);
        logging::init(&path)?;
    }

    let store = cli.config_store();
    let config = cli.to_config(&store.load());
    let game = match config.game_config() {
        Ok(game) => game,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, err).exit();
        }
    };

    if cli.save {
        store.save(&config)?;
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    restore_terminal_on_panic();
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(game, config.shuffle, cli.seed);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Leave raw mode and the alternate screen before the panic message prints
fn restore_terminal_on_panic() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), SystemClock);
    app.countdown = runner.start_clock();

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step(&mut app.countdown) {
            GameEvent::Seconds(due) => {
                if app.on_seconds(due) {
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            GameEvent::Closed => break,
            GameEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            GameEvent::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if app.on_key(key).is_break() {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
