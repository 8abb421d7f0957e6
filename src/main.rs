use std::{
    fs::File,
    path::Path,
    sync::Mutex,
    time::{Duration, Instant},
};

use color_eyre::Result;
use ratatui::{
    crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::Text,
    widgets::{Block, BorderType, Paragraph},
    DefaultTerminal, Frame,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod entities;
mod filter;
mod input;
mod screens;
mod store;
mod theme;
mod timer;
mod validate;

use screens::{ContactScreen, TodosScreen};
use store::LocalStore;
use theme::{Theme, CONTACT_PALETTE, TODOS_PALETTE};

const TODOS_INFO: [&str; 2] = [
    "Quit: q | Screen: <tab> | Move: j/k | Done: <space> | Delete: d",
    "Add: a | Search: / | Filter: f or 1/2/3",
];
const CONTACT_INFO: [&str; 2] = [
    "Form - Next field: <tab> | Submit: <enter> | History: <esc>",
    "History - Move: j/k | Delete: d | Edit: i | Screen: <tab> | Quit: q",
];

// poll timeout cap when no timer is pending
const IDLE_POLL: Duration = Duration::from_secs(1);

fn main() -> Result<()> {
    color_eyre::install()?;
    let store = LocalStore::open_default();
    init_logging(store.root());
    info!("starting lazydesk");
    let terminal = ratatui::init();
    let app_result = App::new(store).run(terminal);
    ratatui::restore();
    app_result
}

/// Sends tracing output to a file under the data directory so log lines
/// never land in the drawn terminal. Logging is best effort; the app runs
/// fine without it.
fn init_logging(root: &Path) {
    let _ = std::fs::create_dir_all(root);
    let Ok(file) = File::create(root.join("lazydesk.log")) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Todos,
    Contact,
}

impl Tab {
    fn other(self) -> Self {
        match self {
            Tab::Todos => Tab::Contact,
            Tab::Contact => Tab::Todos,
        }
    }
}

struct App {
    tab: Tab,
    todos: TodosScreen,
    contact: ContactScreen,
}

impl App {
    fn new(store: LocalStore) -> Self {
        Self {
            tab: Tab::Todos,
            todos: TodosScreen::new(store.clone()),
            contact: ContactScreen::new(store),
        }
    }

    fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        loop {
            terminal.draw(|frame| self.draw(frame))?;

            // wake up for the nearest pending debounce/success deadline even
            // when no key arrives
            let timeout = self.poll_timeout(Instant::now());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && !self.handle_key(key) {
                        return Ok(());
                    }
                }
            }

            let now = Instant::now();
            self.todos.tick(now);
            self.contact.tick(now);
        }
    }

    fn poll_timeout(&self, now: Instant) -> Duration {
        let deadline = [self.todos.next_deadline(), self.contact.next_deadline()]
            .into_iter()
            .flatten()
            .min();
        match deadline {
            Some(deadline) => deadline.saturating_duration_since(now).min(IDLE_POLL),
            None => IDLE_POLL,
        }
    }

    /// Routes a key press. Returns false when the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let now = Instant::now();
        let editing = match self.tab {
            Tab::Todos => self.todos.is_editing(),
            Tab::Contact => self.contact.is_editing(),
        };
        if !editing {
            match key.code {
                KeyCode::Char('q') => return false,
                KeyCode::Tab => {
                    self.tab = self.tab.other();
                    return true;
                }
                _ => {}
            }
        }
        match self.tab {
            Tab::Todos => self.todos.handle_key(key, now),
            Tab::Contact => self.contact.handle_key(key, now),
        }
        true
    }

    fn draw(&mut self, frame: &mut Frame) {
        let main_vertical =
            Layout::vertical([Constraint::Min(0), Constraint::Length(4)]).split(frame.area());

        match self.tab {
            Tab::Todos => self.todos.draw(frame, main_vertical[0]),
            Tab::Contact => self.contact.draw(frame, main_vertical[0]),
        }
        self.render_footer(frame, main_vertical[1]);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let (info, theme) = match self.tab {
            Tab::Todos => (TODOS_INFO, Theme::new(TODOS_PALETTE)),
            Tab::Contact => (CONTACT_INFO, Theme::new(CONTACT_PALETTE)),
        };
        let footer = Paragraph::new(Text::from_iter(info))
            .style(Style::new().fg(theme.row_fg).bg(theme.buffer_bg))
            .centered()
            .block(
                Block::bordered()
                    .border_type(BorderType::Double)
                    .border_style(Style::new().fg(theme.footer_border)),
            );
        frame.render_widget(footer, area);
    }
}
