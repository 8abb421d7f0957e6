use std::time::{Duration, Instant};

use itertools::Itertools;
use ratatui::{
    crossterm::event::{KeyCode, KeyEvent},
    layout::{Constraint, Layout, Margin, Position, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, BorderType, Cell, HighlightSpacing, Paragraph, Row, Scrollbar,
        ScrollbarOrientation, ScrollbarState, Table, TableState, Wrap,
    },
    Frame,
};
use tracing::debug;

use crate::{
    entities::Todo,
    filter::{project, StatusFilter},
    input::Input,
    store::{LocalStore, TODOS_KEY},
    theme::{Theme, TODOS_PALETTE},
    timer::Debouncer,
};

use super::ListAction;

const SEARCH_DEBOUNCE: Duration = Duration::from_millis(400);
const EMPTY_INPUT_ERROR: &str = "Todo cannot be empty.";
const EMPTY_STATE_TEXT: &str = "No todos match. Add one with 'a' or loosen the search.";

#[derive(Debug, PartialEq, Eq)]
enum Mode {
    List,
    Adding,
    Searching,
}

/// The todo list screen: stored collection, transient view state (search
/// term, status filter), and the input popup for new todos.
pub struct TodosScreen {
    store: LocalStore,
    todos: Vec<Todo>,
    filter: StatusFilter,
    search: Input,
    applied_search: String,
    search_debounce: Debouncer,
    add_input: Input,
    add_error: Option<&'static str>,
    mode: Mode,
    visible: Vec<i64>,
    table: TableState,
    scroll: ScrollbarState,
    theme: Theme,
}

impl TodosScreen {
    pub fn new(store: LocalStore) -> Self {
        let todos: Vec<Todo> = store.load(TODOS_KEY);
        let mut screen = Self {
            store,
            todos,
            filter: StatusFilter::default(),
            search: Input::default(),
            applied_search: String::new(),
            search_debounce: Debouncer::new(SEARCH_DEBOUNCE),
            add_input: Input::default(),
            add_error: None,
            mode: Mode::List,
            visible: Vec::new(),
            table: TableState::default().with_selected(0),
            scroll: ScrollbarState::new(0),
            theme: Theme::new(TODOS_PALETTE),
        };
        screen.reproject();
        screen
    }

    /// True while a text field has focus, so global keys stay out of the way.
    pub fn is_editing(&self) -> bool {
        self.mode != Mode::List
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.search_debounce.deadline()
    }

    /// Fires any due debounced work. The search term only takes effect here,
    /// one trailing invocation per burst of keystrokes.
    pub fn tick(&mut self, now: Instant) {
        if self.search_debounce.fire_if_due(now) {
            self.applied_search = self.search.value().to_string();
            self.reproject();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        match self.mode {
            Mode::Adding => match key.code {
                KeyCode::Esc => {
                    self.add_input.clear();
                    self.add_error = None;
                    self.mode = Mode::List;
                }
                KeyCode::Enter => self.add_todo(),
                KeyCode::Char(c) => {
                    self.add_error = None;
                    self.add_input.enter_char(c);
                }
                KeyCode::Backspace => {
                    self.add_error = None;
                    self.add_input.delete_char();
                }
                KeyCode::Left => self.add_input.move_left(),
                KeyCode::Right => self.add_input.move_right(),
                _ => {}
            },
            Mode::Searching => match key.code {
                KeyCode::Esc | KeyCode::Enter => {
                    // leaving the field applies the term right away instead
                    // of waiting out the debounce window
                    self.search_debounce.cancel();
                    self.applied_search = self.search.value().to_string();
                    self.reproject();
                    self.mode = Mode::List;
                }
                KeyCode::Char(c) => {
                    self.search.enter_char(c);
                    self.search_debounce.arm(now);
                }
                KeyCode::Backspace => {
                    self.search.delete_char();
                    self.search_debounce.arm(now);
                }
                KeyCode::Left => self.search.move_left(),
                KeyCode::Right => self.search.move_right(),
                _ => {}
            },
            Mode::List => match key.code {
                KeyCode::Char('a') => self.mode = Mode::Adding,
                KeyCode::Char('/') | KeyCode::Char('s') => self.mode = Mode::Searching,
                KeyCode::Char('f') => self.set_filter(self.filter.next()),
                KeyCode::Char('1') => self.set_filter(StatusFilter::All),
                KeyCode::Char('2') => self.set_filter(StatusFilter::Active),
                KeyCode::Char('3') => self.set_filter(StatusFilter::Completed),
                KeyCode::Char('j') | KeyCode::Down => self.next_row(),
                KeyCode::Char('k') | KeyCode::Up => self.previous_row(),
                KeyCode::Char(' ') => self.dispatch(ListAction::Toggle),
                KeyCode::Char('d') => self.dispatch(ListAction::Delete),
                _ => {}
            },
        }
    }

    fn dispatch(&mut self, action: ListAction) {
        if let Some(id) = self.selected_id() {
            self.apply(action, id);
        }
    }

    /// Applies a list action to the entity with the given id. Ids come from
    /// the projection, so this hits the right todo no matter how the list is
    /// filtered. An id that is no longer present leaves everything as is.
    pub fn apply(&mut self, action: ListAction, id: i64) {
        match action {
            ListAction::Toggle => {
                if let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) {
                    todo.completed = !todo.completed;
                    self.store.save(TODOS_KEY, &self.todos);
                }
            }
            ListAction::Delete => {
                let before = self.todos.len();
                self.todos.retain(|t| t.id != id);
                if self.todos.len() != before {
                    self.store.save(TODOS_KEY, &self.todos);
                }
            }
        }
        self.reproject();
    }

    fn add_todo(&mut self) {
        let text = self.add_input.value().trim().to_string();
        self.add_error = None;
        if text.is_empty() {
            self.add_error = Some(EMPTY_INPUT_ERROR);
            return;
        }
        debug!(%text, "adding todo");
        self.todos.insert(0, Todo::new(text));
        self.store.save(TODOS_KEY, &self.todos);
        self.add_input.clear();
        self.mode = Mode::List;
        self.reproject();
    }

    fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
        self.reproject();
    }

    fn selected_id(&self) -> Option<i64> {
        self.table
            .selected()
            .and_then(|i| self.visible.get(i))
            .copied()
    }

    /// Recomputes the visible id list from the stored collection plus the
    /// transient search/filter state, keeping the selection on the same
    /// entity when it survives the change.
    fn reproject(&mut self) {
        let selected = self.selected_id();
        self.visible = project(&self.todos, &self.applied_search, self.filter)
            .iter()
            .map(|todo| todo.id)
            .collect();
        let next = if self.visible.is_empty() {
            None
        } else {
            selected
                .and_then(|id| self.visible.iter().find_position(|&&v| v == id))
                .map(|(i, _)| i)
                .or_else(|| {
                    self.table
                        .selected()
                        .map(|i| i.min(self.visible.len() - 1))
                })
                .or(Some(0))
        };
        self.table.select(next);
        self.scroll = ScrollbarState::new(self.visible.len().saturating_sub(1))
            .position(next.unwrap_or(0));
    }

    fn next_row(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.table.selected() {
            Some(i) if i >= self.visible.len() - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.table.select(Some(i));
        self.scroll = self.scroll.position(i);
    }

    fn previous_row(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.table.selected() {
            Some(0) | None => self.visible.len() - 1,
            Some(i) => i - 1,
        };
        self.table.select(Some(i));
        self.scroll = self.scroll.position(i);
    }

    fn counter(&self) -> (usize, usize) {
        let completed = self.todos.iter().filter(|t| t.completed).count();
        (self.todos.len(), completed)
    }

    pub fn draw(&mut self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).split(area);
        let header = Layout::horizontal([Constraint::Min(20), Constraint::Length(32)])
            .split(rows[0]);

        self.render_search(frame, header[0]);
        self.render_filters(frame, header[1]);
        if self.visible.is_empty() {
            self.render_empty_state(frame, rows[1]);
        } else {
            self.render_table(frame, rows[1]);
            self.render_scrollbar(frame, rows[1]);
        }
        if self.mode == Mode::Adding {
            self.render_add_popup(frame);
        }
    }

    fn render_search(&self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title("Search (/)")
            .bg(self.theme.buffer_bg)
            .fg(if self.mode == Mode::Searching {
                self.theme.accent
            } else {
                self.theme.border
            });
        let text = Paragraph::new(Text::from(self.search.value()).fg(self.theme.row_fg))
            .block(block);
        frame.render_widget(text, area);
        if self.mode == Mode::Searching {
            frame.set_cursor_position(Position::new(
                area.x + self.search.cursor_offset() + 1,
                area.y + 1,
            ));
        }
    }

    fn render_filters(&self, frame: &mut Frame, area: Rect) {
        let labels = StatusFilter::ALL.map(|f| {
            let style = if f == self.filter {
                Style::default()
                    .fg(self.theme.selected_fg)
                    .add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(self.theme.muted_fg)
            };
            Span::styled(format!(" {} ", f.label()), style)
        });
        let line = Line::from(labels.to_vec());
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title("Filter (f)")
            .bg(self.theme.buffer_bg)
            .fg(self.theme.border);
        frame.render_widget(Paragraph::new(line).centered().block(block), area);
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect) {
        let (total, completed) = self.counter();
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .style(Style::default().fg(self.theme.border))
            .title(format!("Todos ({total} total, {completed} completed)"));
        let selected_style = Style::default()
            .add_modifier(Modifier::REVERSED)
            .fg(self.theme.selected_fg);

        let rows = self.visible.iter().filter_map(|id| {
            let todo = self.todos.iter().find(|t| t.id == *id)?;
            let marker = if todo.completed { "[x]" } else { "[ ]" };
            let text_style = if todo.completed {
                Style::default()
                    .fg(self.theme.muted_fg)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(self.theme.row_fg)
            };
            Some(
                Row::new(vec![
                    Cell::from(marker),
                    Cell::from(Span::styled(todo.text.clone(), text_style)),
                ])
                .height(1),
            )
        });
        let table = Table::new(rows, [Constraint::Length(4), Constraint::Min(1)])
            .block(block)
            .row_highlight_style(selected_style)
            .bg(self.theme.buffer_bg)
            .highlight_spacing(HighlightSpacing::Always);
        frame.render_stateful_widget(table, area, &mut self.table);
    }

    fn render_scrollbar(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_stateful_widget(
            Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None),
            area.inner(Margin {
                vertical: 1,
                horizontal: 1,
            }),
            &mut self.scroll,
        );
    }

    fn render_empty_state(&self, frame: &mut Frame, area: Rect) {
        let (total, completed) = self.counter();
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .style(Style::default().fg(self.theme.border))
            .title(format!("Todos ({total} total, {completed} completed)"));
        let empty = Paragraph::new(Text::from(EMPTY_STATE_TEXT).fg(self.theme.muted_fg))
            .centered()
            .wrap(Wrap { trim: true })
            .bg(self.theme.buffer_bg)
            .block(block);
        frame.render_widget(empty, area);
    }

    fn render_add_popup(&self, frame: &mut Frame) {
        let area = frame.area();
        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 3,
            width: area.width / 2,
            height: 4,
        };
        let mut lines = vec![Line::from(self.add_input.value().fg(self.theme.row_fg))];
        if let Some(error) = self.add_error {
            lines.push(Line::from(error.fg(self.theme.error_fg)));
        }
        let popup = Paragraph::new(Text::from(lines))
            .bg(self.theme.buffer_bg)
            .block(
                Block::bordered()
                    .title("New Todo")
                    .fg(self.theme.accent)
                    .border_type(BorderType::Rounded),
            );
        frame.render_widget(popup, popup_area);
        frame.set_cursor_position(Position::new(
            popup_area.x + self.add_input.cursor_offset() + 1,
            popup_area.y + 1,
        ));
    }
}
