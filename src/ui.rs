use std::time::Instant;

use chrono::Local;
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState, Widget, Wrap},
};

use crate::browser::TableBrowser;
use crate::cards::{self, tone_color};
use crate::carousel::CardCarousel;
use crate::domain::InputMode;
use crate::formatter::render_cell;
use crate::mock::DATE_FORMAT;
use crate::model::{LoginField, Model};
use crate::pages::Page;
use crate::session::Role;

pub const HEADER_HEIGHT: usize = 3;
pub const STATUSLINE_HEIGHT: usize = 1;
pub const SIDEBAR_WIDTH: usize = 24;
pub const PAGE_TITLE_HEIGHT: usize = 2;
const CONTROLS_WIDTH: u16 = 7;
const MAX_COLUMN_WIDTH: usize = 30;
const MAX_PAGE_BUTTONS: usize = 5;

#[derive(Default)]
pub struct DashUI {
    table_state: TableState,
}

impl DashUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let now = Instant::now();
        let area = frame.area();
        if model.session().is_none() {
            draw_login(model, frame, area);
            return;
        }

        let [header, body, statusline] = Layout::vertical([
            Constraint::Length(HEADER_HEIGHT as u16),
            Constraint::Min(0),
            Constraint::Length(STATUSLINE_HEIGHT as u16),
        ])
        .areas(area);

        draw_header(model, frame, header);
        let content = if model.sidebar_open() {
            let [sidebar, content] = Layout::horizontal([
                Constraint::Length(SIDEBAR_WIDTH as u16),
                Constraint::Min(0),
            ])
            .areas(body);
            draw_sidebar(model, frame, sidebar);
            content
        } else {
            body
        };
        self.draw_page(model, frame, content, now);
        draw_statusline(model, frame, statusline, now);

        if let Some(cursor) = model.column_menu()
            && let Some(browser) = model.browser()
        {
            draw_column_menu(browser, cursor, frame);
        }
        if model.show_popup() {
            draw_popup(model.popup_message(), frame);
        }
    }

    fn draw_page(&mut self, model: &Model, frame: &mut Frame, area: Rect, now: Instant) {
        let page = model.page();
        let [title, body] = Layout::vertical([
            Constraint::Length(PAGE_TITLE_HEIGHT as u16),
            Constraint::Min(0),
        ])
        .areas(area);
        let heading = Text::from(vec![
            Line::from(page.name().bold()),
            Line::from(page.subtitle().dark_gray()),
        ]);
        frame.render_widget(Paragraph::new(heading), title);

        if page == Page::Dashboard {
            draw_dashboard(model, frame, body);
            return;
        }
        if !model.cards() {
            if let Some(browser) = model.browser() {
                self.draw_table(browser, frame, body);
            }
            return;
        }
        match page {
            Page::PocData => draw_carousel(frame, body, &model.poc().carousel, cards::poc_card, now),
            Page::CrmData => draw_carousel(frame, body, &model.crm().carousel, cards::crm_card, now),
            Page::Meetings => {
                draw_carousel(frame, body, &model.meetings().carousel, cards::meeting_card, now)
            }
            Page::Leads => draw_carousel(
                frame,
                body,
                &model.leads().carousel,
                |lead, idx| cards::lead_card(&model.effective_lead(lead), idx),
                now,
            ),
            Page::Imported => {
                if let Some(imported) = model.imported() {
                    let columns = imported.browser.columns();
                    draw_carousel(
                        frame,
                        body,
                        &imported.carousel,
                        |record, idx| cards::record_card(record, columns, idx),
                        now,
                    )
                }
            }
            Page::Dashboard => {}
        }
    }

    fn draw_table(&mut self, browser: &TableBrowser, frame: &mut Frame, area: Rect) {
        let block = Block::bordered().title(Line::from(format!(" {} ", browser.title())).bold());
        if browser.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            draw_centered(frame, inner, "No data available");
            return;
        }

        let inner = block.inner(area);
        frame.render_widget(block, area);
        let [toolbar, table_area, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(inner);

        let search = if browser.search_text().is_empty() {
            Span::styled("[/] search", Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(format!("Search: {}", browser.search_text()))
        };
        let tools = Line::from(vec![
            search,
            "   [c] columns  [x] export  [y/Y] copy".dark_gray(),
        ]);
        frame.render_widget(Paragraph::new(tools), toolbar);

        let columns = browser.display_columns();
        let page_rows = browser.page_rows();
        let cells: Vec<Vec<crate::formatter::Cell>> = page_rows
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| render_cell(c, record.get(&c.key)))
                    .collect()
            })
            .collect();

        let widths: Vec<Constraint> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let content = cells
                    .iter()
                    .map(|row| row[i].text.chars().count() + row[i].tone.map_or(0, |_| 2))
                    .max()
                    .unwrap_or(0);
                let width = std::cmp::max(c.title.chars().count(), content);
                Constraint::Length(std::cmp::min(width, MAX_COLUMN_WIDTH) as u16)
            })
            .collect();

        let header = Row::new(columns.iter().map(|c| Cell::from(c.title.clone())))
            .style(Style::default().add_modifier(Modifier::BOLD))
            .bottom_margin(1);
        let rows = cells.iter().map(|row| {
            Row::new(row.iter().map(|cell| match cell.tone {
                Some(tone) => Cell::from(Span::styled(
                    format!(" {} ", cell.text),
                    Style::default().fg(Color::Black).bg(tone_color(tone)),
                )),
                None => Cell::from(cell.text.clone()),
            }))
        });
        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(2)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        self.table_state.select(Some(browser.selected_row()));
        frame.render_stateful_widget(table, table_area, &mut self.table_state);

        if page_rows.is_empty() {
            draw_centered(frame, table_area, "No results found.");
        }

        // A single page needs neither summary nor pager
        if browser.total_pages() <= 1 {
            return;
        }
        let (first, last, total) = browser.showing();
        let [showing, buttons] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(40)]).areas(footer);
        frame.render_widget(
            Paragraph::new(format!("Showing {first} to {last} of {total} entries")),
            showing,
        );
        frame.render_widget(
            Paragraph::new(pagination(browser.current_page(), browser.total_pages()))
                .right_aligned(),
            buttons,
        );
    }
}

fn draw_header(model: &Model, frame: &mut Frame, area: Rect) {
    let user = model
        .session()
        .map(|s| format!(" {} ({}) ", s.name, role_name(s.role)))
        .unwrap_or_default();
    let block = Block::bordered()
        .title(Line::from(" SDR Dashboard ".bold()).left_aligned())
        .title(Line::from(user).right_aligned());
    let mode = if model.cards() { "cards" } else { "table" };
    let line = Line::from(vec![
        "[b] ".dark_gray(),
        "menu  ".into(),
        model.page().name().bold(),
        format!("  ({mode} view)").dark_gray(),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::Admin => "Admin",
        Role::Sdr => "SDR",
    }
}

/// Previous and next arrows around at most five numbered page buttons.
fn pagination(current: usize, total: usize) -> Line<'static> {
    let enabled = Style::default().fg(Color::Cyan);
    let disabled = Style::default().fg(Color::DarkGray);
    let mut spans = vec![Span::styled(
        "‹ ",
        if current > 1 { enabled } else { disabled },
    )];
    for page in 1..=std::cmp::min(total, MAX_PAGE_BUTTONS) {
        let style = if page == current {
            Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!(" {page} "), style));
    }
    if total > MAX_PAGE_BUTTONS {
        spans.push(Span::raw(" ... "));
    }
    spans.push(Span::styled(
        " ›",
        if current < total { enabled } else { disabled },
    ));
    Line::from(spans)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_centered(frame: &mut Frame, area: Rect, message: &str) {
    let rect = centered(area, area.width, 1);
    frame.render_widget(
        Paragraph::new(message.to_string()).centered().dark_gray(),
        rect,
    );
}

fn draw_login(model: &Model, frame: &mut Frame, area: Rect) {
    let form = model.login_form();
    let rect = centered(area, 50, 11);
    frame.render_widget(Clear, rect);
    let block = Block::bordered().title(Line::from(" SDR Dashboard ".bold()).centered());
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let [intro, email, password, error, hints] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    frame.render_widget(Paragraph::new("Sign in to your account").centered(), intro);

    let masked = "•".repeat(form.password.value().chars().count());
    let fields = [
        (LoginField::Email, " Email ", email, form.email.value().to_string(), &form.email),
        (LoginField::Password, " Password ", password, masked, &form.password),
    ];
    for (field, title, rect, value, input) in fields {
        let focused = form.focus == field;
        let border = if focused { Color::Cyan } else { Color::DarkGray };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(border));
        frame.render_widget(Paragraph::new(value).block(block), rect);
        if focused {
            let x = rect.x + 1 + input.get().cursor_pos as u16;
            frame.set_cursor_position((x.min(rect.right().saturating_sub(2)), rect.y + 1));
        }
    }

    if let Some(message) = &form.error {
        frame.render_widget(
            Paragraph::new(message.clone()).centered().red(),
            error,
        );
    }
    frame.render_widget(
        Paragraph::new("Tab switch field  Enter sign in  Esc quit")
            .centered()
            .dark_gray(),
        hints,
    );
}

fn draw_sidebar(model: &Model, frame: &mut Frame, area: Rect) {
    let block = Block::bordered().title(" Menu ");
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let [list, account] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(inner);

    let lines: Vec<Line> = model
        .pages()
        .iter()
        .enumerate()
        .map(|(i, page)| {
            let text = format!(" {} {} ", i + 1, page.name());
            if *page == model.page() {
                Line::from(text.reversed().bold())
            } else {
                Line::from(text)
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), list);

    if let Some(session) = model.session() {
        let text = Text::from(vec![
            Line::from(session.name.clone().bold()),
            Line::from(session.email.clone().dark_gray()),
            Line::from("[L] log out".dark_gray()),
        ]);
        frame.render_widget(Paragraph::new(text), account);
    }
}

fn draw_dashboard(model: &Model, frame: &mut Frame, area: Rect) {
    let Some(session) = model.session() else {
        return;
    };
    let now = Local::now();
    let elapsed = (now - session.logged_in_at).num_seconds().max(0);
    let stats = model.stats();
    let conversion = stats
        .conversion_rate
        .map(|rate| format!("{rate:.1}%"))
        .unwrap_or_else(|| "N/A".to_string());

    let [welcome, counters, upcoming] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Min(0),
    ])
    .areas(area);

    let text = Text::from(vec![
        Line::from(format!("Welcome back, {}!", session.name).bold()),
        Line::from(
            format!(
                "{}   signed in at {}   session {}:{:02}:{:02}",
                now.format(DATE_FORMAT),
                session.logged_in_at.format("%H:%M"),
                elapsed / 3600,
                elapsed / 60 % 60,
                elapsed % 60
            )
            .dark_gray(),
        ),
    ]);
    frame.render_widget(Paragraph::new(text), welcome);

    let counters_list = [
        ("Total Leads", stats.total_leads.to_string()),
        ("Open Meetings", stats.open_meetings.to_string()),
        ("Conversations", stats.conversations.to_string()),
        ("Conversion Rate", conversion),
    ];
    let boxes: [Rect; 4] = Layout::horizontal([Constraint::Fill(1); 4]).areas(counters);
    for ((label, value), rect) in counters_list.into_iter().zip(boxes) {
        let block = Block::bordered().title(format!(" {label} "));
        frame.render_widget(Paragraph::new(value.bold()).block(block), rect);
    }

    let block = Block::bordered().title(" Upcoming Meetings ");
    let lines: Vec<Line> = if stats.upcoming.is_empty() {
        vec![Line::from("No upcoming meetings".dark_gray())]
    } else {
        stats
            .upcoming
            .iter()
            .map(|m| {
                Line::from(vec![
                    Span::raw(format!("{:<11}{:<10}", m.date, m.time)),
                    Span::raw(format!("{}  ", m.title)),
                    cards::badge(&m.status, crate::formatter::RenderType::MeetingStatus),
                ])
            })
            .collect()
    };
    frame.render_widget(Paragraph::new(lines).block(block), upcoming);
}

fn draw_carousel<T>(
    frame: &mut Frame,
    area: Rect,
    carousel: &CardCarousel<T>,
    render: impl Fn(&T, usize) -> Text<'static>,
    now: Instant,
) {
    if carousel.is_empty() {
        draw_centered(frame, area, "No data available");
        return;
    }
    let position = carousel.position();
    let (cards_area, controls) = if position.shows_controls() {
        let [cards_area, controls] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(CONTROLS_WIDTH)])
                .areas(area);
        (cards_area, Some(controls))
    } else {
        (area, None)
    };

    let height = position.card_height() as u16;
    for (idx, rel_top) in position.visible_cards() {
        let Some(item) = carousel.data().get(idx) else {
            continue;
        };
        let border = if idx == position.index() {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let mut card = Buffer::empty(Rect::new(0, 0, cards_area.width, height));
        Paragraph::new(render(item, idx))
            .wrap(Wrap { trim: false })
            .block(Block::bordered().border_style(Style::default().fg(border)))
            .render(card.area, &mut card);
        blit(&card, rel_top, cards_area, frame.buffer_mut());
    }

    if let Some(controls) = controls {
        let style = |enabled: bool| {
            if enabled {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default().fg(Color::DarkGray)
            }
        };
        let [up, counter, down] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(controls);
        frame.render_widget(
            Paragraph::new(Span::styled("▲", style(position.can_previous(now)))).centered(),
            up,
        );
        let label = format!("{}/{}", position.index() + 1, position.len());
        draw_centered(frame, counter, &label);
        frame.render_widget(
            Paragraph::new(Span::styled("▼", style(position.can_next(now)))).centered(),
            down,
        );
    }
}

// Copies the rows of a pre-rendered card that fall inside the viewport
fn blit(card: &Buffer, rel_top: isize, area: Rect, buf: &mut Buffer) {
    for row in 0..card.area.height {
        let y = rel_top + row as isize;
        if y < 0 || y >= area.height as isize {
            continue;
        }
        for x in 0..std::cmp::min(card.area.width, area.width) {
            if let Some(src) = card.cell((x, row))
                && let Some(dst) = buf.cell_mut((area.x + x, area.y + y as u16))
            {
                *dst = src.clone();
            }
        }
    }
}

fn draw_statusline(model: &Model, frame: &mut Frame, area: Rect, now: Instant) {
    if let Some((mode, input)) = model.cmd_input() {
        let prompt = match mode {
            InputMode::Search => "Search: ",
            InputMode::Notes => "Notes: ",
            InputMode::CallNotes => "Call notes: ",
        };
        let line = Line::from(vec![prompt.bold(), Span::raw(input.input.clone())]);
        frame.render_widget(Paragraph::new(line), area);
        let x = area.x + (prompt.len() + input.cursor_pos) as u16;
        frame.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
        return;
    }

    let line = match model.status_message(now) {
        Some(message) => Line::from(message.to_string().yellow()),
        None => Line::from("? help  1-6 pages  v table/cards  L log out  q quit".dark_gray()),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_column_menu(browser: &TableBrowser, cursor: usize, frame: &mut Frame) {
    let height = browser.columns().len() as u16 + 3;
    let rect = centered(frame.area(), 36, height);
    let lines: Vec<Line> = browser
        .columns()
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let mark = if browser.is_visible(&column.key) { "[x]" } else { "[ ]" };
            let text = format!(" {mark} {} ", column.title);
            if i == cursor {
                Line::from(text.reversed())
            } else {
                Line::from(text)
            }
        })
        .collect();
    let block = Block::bordered()
        .title(" Columns ")
        .title_bottom(Line::from(" space toggle  r reset  Esc close ").centered());
    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

fn draw_popup(message: &str, frame: &mut Frame) {
    let rect = centered(frame.area(), 72, 24);
    let block = Block::bordered()
        .title(" Help ")
        .title_bottom(Line::from(" Esc close ").centered());
    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(message.to_string()).block(block), rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DashConfig, Message};
    use crate::mock::MockData;
    use crate::model::DashData;
    use crate::pages::TableSpec;
    use crate::record::{ColumnSpec, Record};
    use crate::source::Imported;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::crossterm::event::{KeyCode, KeyEvent};

    fn data(imported: Option<Vec<Record>>) -> DashData {
        let mut mock = MockData::new(Local::now(), 5);
        DashData {
            pocs: mock.pocs(),
            crm: mock.crm_entries(),
            meetings: mock.meetings(),
            leads: mock.leads(),
            imported: imported.map(|records| Imported {
                records,
                table: TableSpec {
                    title: "people.csv".to_string(),
                    columns: vec![ColumnSpec::new("name", "name")],
                    search_keys: vec!["name".to_string()],
                    hidden_columns: Vec::new(),
                },
            }),
        }
    }

    fn login(model: &mut Model) {
        model.prefill_login("admin@gmail.com");
        for c in "123456".chars() {
            model.update(Some(Message::RawKey(KeyEvent::from(KeyCode::Char(c)))));
        }
        model.update(Some(Message::RawKey(KeyEvent::from(KeyCode::Enter))));
    }

    fn render(model: &Model, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let mut ui = DashUI::new();
        terminal.draw(|frame| ui.draw(model, frame)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut screen = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                screen.push_str(buffer[(x, y)].symbol());
            }
            screen.push('\n');
        }
        screen
    }

    #[test]
    fn login_screen_before_session() {
        let model = Model::init(&DashConfig::default(), data(None), 120, 40);
        let screen = render(&model, 120, 40);
        assert!(screen.contains("Sign in to your account"));
        assert!(screen.contains("Password"));
    }

    #[test]
    fn dashboard_after_login() {
        let mut model = Model::init(&DashConfig::default(), data(None), 120, 40);
        login(&mut model);
        let screen = render(&model, 120, 40);
        assert!(screen.contains("Welcome back, Admin User!"));
        assert!(screen.contains("Open Meetings"));
        assert!(screen.contains("15.0%"));
    }

    #[test]
    fn table_shows_page_summary() {
        let mut model = Model::init(&DashConfig::default(), data(None), 200, 40);
        login(&mut model);
        model.update(Some(Message::SwitchPage(2)));
        let screen = render(&model, 200, 40);
        assert!(screen.contains("Points of Contact"));
        assert!(screen.contains("Showing 1 to 10 of 20 entries"));
        assert!(screen.contains("POC-1009"));
        assert!(!screen.contains("POC-1010"));
    }

    #[test]
    fn search_without_matches() {
        let mut model = Model::init(&DashConfig::default(), data(None), 140, 40);
        login(&mut model);
        model.update(Some(Message::SwitchPage(2)));
        model.update(Some(Message::Search));
        for c in "zzz".chars() {
            model.update(Some(Message::RawKey(KeyEvent::from(KeyCode::Char(c)))));
        }
        let screen = render(&model, 140, 40);
        assert!(screen.contains("No results found."));
        assert!(!screen.contains("Showing"));
        assert!(!screen.contains("‹"));
        assert!(screen.contains("Search: zzz"));
    }

    #[test]
    fn single_page_has_no_footer() {
        let records = ["Ada", "Grace", "Linus"]
            .iter()
            .map(|name| Record::new().with("name", *name))
            .collect();
        let mut model = Model::init(&DashConfig::default(), data(Some(records)), 140, 40);
        login(&mut model);
        model.update(Some(Message::SwitchPage(6)));
        let screen = render(&model, 140, 40);
        assert!(screen.contains("Grace"));
        assert!(!screen.contains("Showing"));
        assert!(!screen.contains("‹"));
    }

    #[test]
    fn empty_import_shows_empty_state() {
        let mut model = Model::init(&DashConfig::default(), data(Some(Vec::new())), 140, 40);
        login(&mut model);
        model.update(Some(Message::SwitchPage(6)));
        let screen = render(&model, 140, 40);
        assert!(screen.contains("people.csv"));
        assert!(screen.contains("No data available"));
        assert!(!screen.contains("Showing"));
    }

    #[test]
    fn narrow_terminal_renders_carousel() {
        let mut model = Model::init(&DashConfig::default(), data(None), 80, 30);
        login(&mut model);
        model.update(Some(Message::SwitchPage(2)));
        let screen = render(&model, 80, 30);
        assert!(screen.contains("1/20"));
        assert!(screen.contains("▲"));
        assert!(screen.contains("Contact 1"));
    }

    #[test]
    fn single_card_has_no_controls() {
        let records = vec![Record::new().with("name", "Ada")];
        let mut model = Model::init(&DashConfig::default(), data(Some(records)), 80, 30);
        login(&mut model);
        model.update(Some(Message::SwitchPage(6)));
        let screen = render(&model, 80, 30);
        assert!(screen.contains("Ada"));
        assert!(!screen.contains("1/1"));
        assert!(!screen.contains("▼"));
    }

    #[test]
    fn pagination_caps_buttons() {
        let text: String = pagination(2, 7)
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(text, "‹  1  2  3  4  5  ...  ›");
        let text: String = pagination(1, 1)
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(text, "‹  1  ›");
    }
}
