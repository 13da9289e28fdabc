//! App: terminal init, main loop, timing and key handling.

use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::Args;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use sandfall::{Direction, Session, SessionConfig};
use std::time::{Duration, Instant};
use tachyonfx::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    GameOver,
}

/// Rows being flashed after a clear, plus the fade driving them.
#[derive(Default)]
pub struct ClearFlash {
    pub rows: Vec<usize>,
    pub effect: Option<Effect>,
    pub last_process: Option<Instant>,
}

impl ClearFlash {
    pub fn is_active(&self) -> bool {
        !self.rows.is_empty()
    }

    fn reset(&mut self) {
        self.rows.clear();
        self.effect = None;
        self.last_process = None;
    }
}

pub struct App {
    args: Args,
    theme: Theme,
    session: Session,
    screen: Screen,
    paused: bool,
    last_update: Instant,
    frame_interval: Duration,
    seen_clear_events: u64,
    flash: ClearFlash,
}

impl App {
    pub fn new(args: Args, config: SessionConfig, theme: Theme) -> Result<Self> {
        let session = Session::new(config)?;
        let rate = if args.frame_rate > 0.0 { args.frame_rate } else { 60.0 };
        Ok(Self {
            args,
            theme,
            session,
            screen: Screen::Playing,
            paused: false,
            last_update: Instant::now(),
            frame_interval: Duration::from_secs_f64(1.0 / rate),
            seen_clear_events: 0,
            flash: ClearFlash::default(),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        // Shrink the board if the terminal cannot show it whole
        let (term_cols, term_rows) = size()?;
        let (fit_w, fit_h) =
            crate::ui::max_playfield_cells_for_terminal(term_cols, term_rows, self.args.scale);
        let w = self.args.width.min(fit_w).max(crate::ui::MIN_PLAYFIELD_CELLS);
        let h = self.args.height.min(fit_h).max(crate::ui::MIN_PLAYFIELD_CELLS);
        if (w, h) != (self.args.width, self.args.height) {
            log::info!("terminal {term_cols}x{term_rows}: board resized to {w}x{h} cells");
            let mut config = self.args.session_config_for(w, h);
            config.seed = self.session.config().seed;
            self.session = Session::new(config)?;
        }

        let result = self.run_loop(&mut terminal);

        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::MoveLeft => {
                self.session.request_move(Direction::Left);
            }
            Action::MoveRight => {
                self.session.request_move(Direction::Right);
            }
            Action::SoftDrop => {
                self.session.request_move(Direction::Down);
            }
            Action::Rotate => {
                self.session.request_rotate();
            }
            Action::HardDrop => self.session.request_hard_drop(),
            Action::Pause | Action::Restart | Action::Quit | Action::None => {}
        }
    }

    fn restart(&mut self) {
        self.session.restart();
        self.screen = Screen::Playing;
        self.paused = false;
        self.seen_clear_events = self.session.clear_events();
        self.flash.reset();
        self.last_update = Instant::now();
    }

    /// Picks up a clear that happened since the last frame.
    fn sync_clear_flash(&mut self) {
        let events = self.session.clear_events();
        if events != self.seen_clear_events {
            self.seen_clear_events = events;
            if !self.args.no_animation {
                self.flash.reset();
                self.flash.rows = self.session.last_cleared_rows().to_vec();
            }
        }
        if self.flash.effect.as_ref().is_some_and(Effect::done) {
            self.flash.reset();
        }
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            let elapsed = now.duration_since(self.last_update);
            self.last_update = now;
            if self.screen == Screen::Playing && !self.paused {
                self.session.on_tick(elapsed);
                if self.session.is_game_over() {
                    log::info!("final score {}", self.session.score());
                    self.screen = Screen::GameOver;
                }
            }
            self.sync_clear_flash();

            terminal.draw(|f| {
                let area = f.area();
                crate::ui::draw(
                    f,
                    self.screen,
                    &self.session,
                    &self.theme,
                    self.paused,
                    &mut self.flash,
                    area,
                    now,
                );
            })?;

            let timeout = self.frame_interval.saturating_sub(now.elapsed());
            if !event::poll(timeout)? {
                continue;
            }
            while event::poll(Duration::ZERO)? {
                let Event::Key(key) = event::read()? else {
                    continue;
                };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let action = key_to_action(key);
                if action == Action::Quit {
                    return Ok(());
                }
                match self.screen {
                    Screen::Playing if action == Action::Pause => self.paused = !self.paused,
                    Screen::Playing if !self.paused => self.apply_action(action),
                    Screen::GameOver if action == Action::Restart => self.restart(),
                    _ => {}
                }
            }
        }
    }
}
