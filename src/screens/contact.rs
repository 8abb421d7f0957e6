use std::time::{Duration, Instant};

use ratatui::{
    crossterm::event::{KeyCode, KeyEvent},
    layout::{Constraint, Layout, Margin, Position, Rect},
    style::{Modifier, Style, Stylize},
    text::{Span, Text},
    widgets::{
        Block, BorderType, Cell, HighlightSpacing, Paragraph, Row, Scrollbar,
        ScrollbarOrientation, ScrollbarState, Table, TableState, Wrap,
    },
    Frame,
};
use tracing::debug;

use crate::{
    entities::Message,
    input::Input,
    store::{LocalStore, MESSAGES_KEY},
    theme::{Theme, CONTACT_PALETTE},
    timer::Debouncer,
    validate::{validate_field, validate_form, Field},
};

use super::ListAction;

const VALIDATE_DEBOUNCE: Duration = Duration::from_millis(300);
const SUCCESS_CLEAR: Duration = Duration::from_millis(5000);
const SUCCESS_TEXT: &str = "✅ Message sent successfully and saved to history!";
const EMPTY_HISTORY_TEXT: &str = "No messages yet.";

#[derive(Debug, PartialEq, Eq)]
enum Mode {
    Form,
    History,
}

/// The contact screen: a three-field form with inline validation on the
/// left, the persisted message history on the right.
pub struct ContactScreen {
    store: LocalStore,
    messages: Vec<Message>,
    fields: [Input; 3],
    focus: Field,
    errors: [Option<&'static str>; 3],
    submit_enabled: bool,
    validate_debounce: Debouncer,
    success: Option<&'static str>,
    success_clear: Debouncer,
    mode: Mode,
    table: TableState,
    scroll: ScrollbarState,
    theme: Theme,
}

impl ContactScreen {
    pub fn new(store: LocalStore) -> Self {
        let messages: Vec<Message> = store.load(MESSAGES_KEY);
        let mut screen = Self {
            store,
            messages,
            fields: Default::default(),
            focus: Field::Name,
            errors: [None; 3],
            submit_enabled: false,
            validate_debounce: Debouncer::new(VALIDATE_DEBOUNCE),
            success: None,
            success_clear: Debouncer::new(SUCCESS_CLEAR),
            mode: Mode::Form,
            table: TableState::default().with_selected(0),
            scroll: ScrollbarState::new(0),
            theme: Theme::new(CONTACT_PALETTE),
        };
        // initial pass puts the submit control in its disabled state
        screen.validate_all();
        screen.scroll = ScrollbarState::new(screen.messages.len().saturating_sub(1));
        screen
    }

    /// True while the form has focus; history mode leaves global keys free.
    pub fn is_editing(&self) -> bool {
        self.mode == Mode::Form
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.validate_debounce.deadline(),
            self.success_clear.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn tick(&mut self, now: Instant) {
        if self.validate_debounce.fire_if_due(now) {
            self.validate_all();
        }
        if self.success_clear.fire_if_due(now) {
            self.success = None;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        match self.mode {
            Mode::Form => match key.code {
                KeyCode::Tab => {
                    // leaving a field re-checks the whole form at once
                    self.validate_all();
                    self.focus = self.focus.next();
                }
                KeyCode::BackTab => {
                    self.validate_all();
                    self.focus = self.focus.previous();
                }
                KeyCode::Enter => self.submit(now),
                KeyCode::Esc => {
                    self.validate_all();
                    self.mode = Mode::History;
                }
                KeyCode::Char(c) => {
                    self.fields[self.focus.index()].enter_char(c);
                    self.on_keystroke(now);
                }
                KeyCode::Backspace => {
                    self.fields[self.focus.index()].delete_char();
                    self.on_keystroke(now);
                }
                KeyCode::Left => self.fields[self.focus.index()].move_left(),
                KeyCode::Right => self.fields[self.focus.index()].move_right(),
                _ => {}
            },
            Mode::History => match key.code {
                KeyCode::Char('i') | KeyCode::Char('e') | KeyCode::Esc => self.mode = Mode::Form,
                KeyCode::Char('j') | KeyCode::Down => self.next_row(),
                KeyCode::Char('k') | KeyCode::Up => self.previous_row(),
                KeyCode::Char('d') => self.dispatch(ListAction::Delete),
                _ => {}
            },
        }
    }

    /// A keystroke refreshes the current field's error immediately and arms
    /// the debounced full-form pass that controls the submit state.
    fn on_keystroke(&mut self, now: Instant) {
        let value = self.fields[self.focus.index()].value();
        self.errors[self.focus.index()] = validate_field(self.focus, value);
        self.validate_debounce.arm(now);
    }

    /// Runs the full-form validation and mirrors the verdict onto the submit
    /// control. This flag is the only gate on submission.
    fn validate_all(&mut self) -> bool {
        let check = validate_form(
            self.fields[0].value(),
            self.fields[1].value(),
            self.fields[2].value(),
        );
        self.errors = check.errors;
        self.submit_enabled = check.ok;
        check.ok
    }

    fn submit(&mut self, now: Instant) {
        self.success = None;
        if !self.validate_all() {
            return;
        }
        let message = Message::new(
            self.fields[0].value().trim(),
            self.fields[1].value().trim(),
            self.fields[2].value().trim(),
        );
        debug!(id = message.timestamp, "storing contact message");
        self.messages.insert(0, message);
        self.store.save(MESSAGES_KEY, &self.messages);
        for field in &mut self.fields {
            field.clear();
        }
        self.errors = [None; 3];
        self.submit_enabled = false;
        self.focus = Field::Name;
        self.success = Some(SUCCESS_TEXT);
        self.success_clear.arm(now);
        self.scroll = ScrollbarState::new(self.messages.len().saturating_sub(1));
    }

    fn dispatch(&mut self, action: ListAction) {
        if let Some(id) = self.selected_id() {
            self.apply(action, id);
        }
    }

    /// Messages are immutable, so only `Delete` does anything here.
    pub fn apply(&mut self, action: ListAction, id: i64) {
        if action != ListAction::Delete {
            return;
        }
        let before = self.messages.len();
        self.messages.retain(|m| m.timestamp != id);
        if self.messages.len() != before {
            self.store.save(MESSAGES_KEY, &self.messages);
        }
        let len = self.messages.len();
        let next = if len == 0 {
            None
        } else {
            self.table.selected().map(|i| i.min(len - 1)).or(Some(0))
        };
        self.table.select(next);
        self.scroll = ScrollbarState::new(len.saturating_sub(1)).position(next.unwrap_or(0));
    }

    fn selected_id(&self) -> Option<i64> {
        self.table
            .selected()
            .and_then(|i| self.messages.get(i))
            .map(|m| m.timestamp)
    }

    fn next_row(&mut self) {
        if self.messages.is_empty() {
            return;
        }
        let i = match self.table.selected() {
            Some(i) if i >= self.messages.len() - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.table.select(Some(i));
        self.scroll = self.scroll.position(i);
    }

    fn previous_row(&mut self) {
        if self.messages.is_empty() {
            return;
        }
        let i = match self.table.selected() {
            Some(0) | None => self.messages.len() - 1,
            Some(i) => i - 1,
        };
        self.table.select(Some(i));
        self.scroll = self.scroll.position(i);
    }

    pub fn draw(&mut self, frame: &mut Frame, area: Rect) {
        let columns =
            Layout::horizontal([Constraint::Ratio(2, 5), Constraint::Ratio(3, 5)]).split(area);
        self.render_form(frame, columns[0]);
        if self.messages.is_empty() {
            self.render_empty_history(frame, columns[1]);
        } else {
            self.render_history(frame, columns[1]);
            self.render_scrollbar(frame, columns[1]);
        }
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let outer = Block::bordered()
            .border_type(BorderType::Rounded)
            .title("Contact")
            .bg(self.theme.buffer_bg)
            .fg(self.theme.border);
        let inner = outer.inner(area);
        frame.render_widget(outer, area);

        let rows = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

        for field in Field::ALL {
            let i = field.index();
            self.render_field(frame, rows[i * 2], field);
            let error = self.errors[i].unwrap_or("");
            frame.render_widget(
                Paragraph::new(Span::styled(error, Style::default().fg(self.theme.error_fg))),
                rows[i * 2 + 1],
            );
        }

        let submit = if self.submit_enabled {
            Span::styled(
                "Submit: press <enter>",
                Style::default().fg(self.theme.accent),
            )
        } else {
            Span::styled(
                "Submit disabled until the form is valid",
                Style::default().fg(self.theme.muted_fg),
            )
        };
        frame.render_widget(Paragraph::new(submit), rows[6]);

        if let Some(success) = self.success {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    success,
                    Style::default().fg(self.theme.success_fg),
                )),
                rows[7],
            );
        }
    }

    fn render_field(&self, frame: &mut Frame, area: Rect, field: Field) {
        let focused = self.mode == Mode::Form && self.focus == field;
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(field.label())
            .fg(if focused {
                self.theme.accent
            } else {
                self.theme.border
            });
        let input = &self.fields[field.index()];
        let text = Paragraph::new(Text::from(input.value()).fg(self.theme.row_fg)).block(block);
        frame.render_widget(text, area);
        if focused {
            frame.set_cursor_position(Position::new(
                area.x + input.cursor_offset() + 1,
                area.y + 1,
            ));
        }
    }

    fn render_history(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .style(Style::default().fg(self.theme.border))
            .title(format!("History ({})", self.messages.len()));
        let selected_style = Style::default()
            .add_modifier(Modifier::REVERSED)
            .fg(self.theme.selected_fg);

        let rows = self.messages.iter().map(|msg| {
            Row::new(vec![
                Cell::from(format!("{} <{}>", msg.name, msg.email)),
                Cell::from(msg.message.clone()),
                Cell::from(msg.sent_at()),
            ])
            .fg(self.theme.row_fg)
            .height(1)
        });
        let table = Table::new(
            rows,
            [
                Constraint::Ratio(1, 4),
                Constraint::Min(10),
                Constraint::Length(18),
            ],
        )
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

    fn render_empty_history(&self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .style(Style::default().fg(self.theme.border))
            .title("History (0)");
        let empty = Paragraph::new(Text::from(EMPTY_HISTORY_TEXT).fg(self.theme.muted_fg))
            .centered()
            .wrap(Wrap { trim: true })
            .bg(self.theme.buffer_bg)
            .block(block);
        frame.render_widget(empty, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{EMAIL_INVALID, MESSAGE_TOO_SHORT, REQUIRED};

    fn temp_screen(name: &str) -> ContactScreen {
        let dir = std::env::temp_dir().join(format!(
            "lazydesk-contact-{name}-{}-{}",
            std::process::id(),
            chrono::Local::now().timestamp_nanos_opt().unwrap_or_default(),
        ));
        ContactScreen::new(LocalStore::new(dir))
    }

    fn fill(screen: &mut ContactScreen, name: &str, email: &str, message: &str) {
        screen.fields = [
            Input::with_value(name),
            Input::with_value(email),
            Input::with_value(message),
        ];
    }

    #[test]
    fn starts_disabled_with_required_errors_shown() {
        let screen = temp_screen("initial");
        assert!(!screen.submit_enabled);
        assert_eq!(screen.errors, [Some(REQUIRED); 3]);
    }

    #[test]
    fn valid_submit_persists_clears_and_shows_success() {
        let mut screen = temp_screen("valid-submit");
        fill(&mut screen, "Al", "a@b.co", "a message over ten chars");
        let now = Instant::now();
        let before = chrono::Local::now().timestamp_millis();
        screen.submit(now);

        assert_eq!(screen.messages.len(), 1);
        assert_eq!(screen.messages[0].name, "Al");
        assert!(screen.messages[0].timestamp >= before);
        assert_eq!(screen.store.load::<Message>(MESSAGES_KEY), screen.messages);
        assert!(screen.fields.iter().all(Input::is_empty));
        assert!(!screen.submit_enabled);
        assert_eq!(
            screen.success,
            Some("✅ Message sent successfully and saved to history!")
        );

        // the success line clears itself after the fixed delay
        screen.tick(now + Duration::from_millis(4999));
        assert_eq!(screen.success, Some(SUCCESS_TEXT));
        screen.tick(now + SUCCESS_CLEAR);
        assert_eq!(screen.success, None);
    }

    #[test]
    fn submitted_values_are_trimmed_and_prepended() {
        let mut screen = temp_screen("trim");
        fill(&mut screen, "  Al  ", "a@b.co", "a message over ten chars");
        screen.submit(Instant::now());
        fill(&mut screen, "Bo", "b@c.de", "another message over ten");
        screen.submit(Instant::now());
        let names: Vec<&str> = screen.messages.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Bo", "Al"]);
    }

    #[test]
    fn short_message_blocks_submission() {
        let mut screen = temp_screen("short-message");
        fill(&mut screen, "Al", "a@b.co", "short");
        screen.submit(Instant::now());

        assert_eq!(screen.errors[Field::Message.index()], Some(MESSAGE_TOO_SHORT));
        assert!(!screen.submit_enabled);
        assert!(screen.messages.is_empty());
        assert!(screen.store.load::<Message>(MESSAGES_KEY).is_empty());
        assert_eq!(screen.success, None);
    }

    #[test]
    fn keystrokes_validate_the_field_now_and_the_form_later() {
        let mut screen = temp_screen("debounced-validate");
        fill(&mut screen, "", "a@b.co", "a message over ten chars");
        screen.validate_all();
        assert!(!screen.submit_enabled);

        let start = Instant::now();
        screen.handle_key(KeyEvent::from(KeyCode::Char('A')), start);
        screen.handle_key(
            KeyEvent::from(KeyCode::Char('l')),
            start + Duration::from_millis(100),
        );
        // per-field error refreshed immediately, submit state not yet
        assert_eq!(screen.errors[Field::Name.index()], None);
        assert!(!screen.submit_enabled);

        screen.tick(start + Duration::from_millis(350));
        assert!(!screen.submit_enabled);
        screen.tick(start + Duration::from_millis(400));
        assert!(screen.submit_enabled);
    }

    #[test]
    fn leaving_a_field_refreshes_the_submit_state_immediately() {
        let mut screen = temp_screen("blur");
        fill(&mut screen, "Al", "a@b.co", "a message over ten chars");
        assert!(!screen.submit_enabled);

        // no tick in between: the focus change alone runs the full pass
        screen.handle_key(KeyEvent::from(KeyCode::Tab), Instant::now());
        assert!(screen.submit_enabled);
        assert_eq!(screen.focus, Field::Email);

        fill(&mut screen, "", "a@b.co", "a message over ten chars");
        screen.handle_key(KeyEvent::from(KeyCode::Esc), Instant::now());
        assert!(!screen.submit_enabled);
        assert_eq!(screen.errors[Field::Name.index()], Some(REQUIRED));
        assert_eq!(screen.mode, Mode::History);
    }

    #[test]
    fn bad_email_typed_into_the_form_surfaces_inline() {
        let mut screen = temp_screen("bad-email");
        screen.focus = Field::Email;
        let now = Instant::now();
        for c in "a@b".chars() {
            screen.handle_key(KeyEvent::from(KeyCode::Char(c)), now);
        }
        assert_eq!(screen.errors[Field::Email.index()], Some(EMAIL_INVALID));
    }

    #[test]
    fn delete_removes_only_the_addressed_message() {
        let mut screen = temp_screen("delete");
        fill(&mut screen, "Al", "a@b.co", "a message over ten chars");
        screen.submit(Instant::now());
        let id = screen.messages[0].timestamp;

        screen.apply(ListAction::Delete, id + 1);
        assert_eq!(screen.messages.len(), 1);

        screen.apply(ListAction::Toggle, id);
        assert_eq!(screen.messages.len(), 1);

        screen.apply(ListAction::Delete, id);
        assert!(screen.messages.is_empty());
        assert!(screen.store.load::<Message>(MESSAGES_KEY).is_empty());
    }
}
