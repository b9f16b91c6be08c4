use arboard::Clipboard;
use chrono::Local;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace};

use crate::browser::TableBrowser;
use crate::carousel::{CardCarousel, CarouselPosition};
use crate::domain::{DashConfig, HELP_TEXT, InputMode, LayoutMode, Message};
use crate::entities::{Contact, ContactCard, CrmEntry, Lead, Meeting, Poc};
use crate::inputter::{InputResult, Inputter};
use crate::mock::DATE_FORMAT;
use crate::pages::{self, Page, TableSpec};
use crate::record::Record;
use crate::session::{self, Session};
use crate::source::Imported;
use crate::store::{self, LeadEdits, MemoryStore};
use crate::ui::{HEADER_HEIGHT, PAGE_TITLE_HEIGHT, STATUSLINE_HEIGHT};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    LOGIN,
    BROWSE,
    COLUMNS,
    POPUP,
    CMDINPUT,
}

/// All records the dashboard starts with.
pub struct DashData {
    pub pocs: Vec<Poc>,
    pub crm: Vec<CrmEntry>,
    pub meetings: Vec<Meeting>,
    pub leads: Vec<Lead>,
    pub imported: Option<Imported>,
}

/// A page's records shown either as a table or as cards.
pub struct PageView<T> {
    pub browser: TableBrowser,
    pub carousel: CardCarousel<T>,
}

impl<T> PageView<T> {
    fn new(items: Vec<T>, spec: TableSpec, to_record: impl Fn(&T) -> Record) -> Self {
        let records = items.iter().map(to_record).collect();
        let browser = TableBrowser::new(
            Arc::new(records),
            spec.columns,
            spec.search_keys,
            spec.hidden_columns,
            &spec.title,
        );
        Self {
            browser,
            carousel: CardCarousel::new(Arc::new(items)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

pub struct LoginForm {
    pub email: Inputter,
    pub password: Inputter,
    pub focus: LoginField,
    pub error: Option<String>,
}

impl LoginForm {
    fn new() -> Self {
        Self {
            email: Inputter::default(),
            password: Inputter::default(),
            focus: LoginField::Email,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_leads: usize,
    pub open_meetings: usize,
    pub conversations: usize,
    pub conversion_rate: Option<f64>,
    pub upcoming: Vec<Meeting>,
}

#[derive(Default, Clone, Debug)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub card_viewport: usize, // Rows a card gets in the carousel
}

impl UILayout {
    pub fn from_values(ui_width: usize, ui_height: usize) -> Self {
        let content_height = ui_height.saturating_sub(HEADER_HEIGHT + STATUSLINE_HEIGHT);
        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            card_viewport: content_height.saturating_sub(PAGE_TITLE_HEIGHT),
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }
}

pub struct Model {
    config: DashConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    session: Option<Session>,
    login: LoginForm,
    page: Page,
    sidebar_open: bool,
    poc: PageView<Poc>,
    crm: PageView<CrmEntry>,
    meetings: PageView<Meeting>,
    leads: PageView<Lead>,
    imported: Option<PageView<Record>>,
    store: MemoryStore,
    input: Inputter,
    input_mode: Option<InputMode>,
    last_input: InputResult,
    column_cursor: usize,
    uilayout: UILayout,
    clipboard: Option<Clipboard>,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    pub fn init(config: &DashConfig, data: DashData, ui_width: usize, ui_height: usize) -> Self {
        let imported = data.imported.map(|imported| {
            PageView::new(imported.records, imported.table, |r: &Record| r.clone())
        });
        let narrow = ui_width < config.narrow_width as usize;
        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::LOGIN,
            previous_modus: Modus::LOGIN,
            session: None,
            login: LoginForm::new(),
            page: Page::Dashboard,
            sidebar_open: !narrow,
            poc: PageView::new(data.pocs, pages::poc_table(), Poc::to_record),
            crm: PageView::new(data.crm, pages::crm_table(), CrmEntry::to_record),
            meetings: PageView::new(data.meetings, pages::meeting_table(), Meeting::to_record),
            leads: PageView::new(data.leads, pages::lead_table(), Lead::to_record),
            imported,
            store: MemoryStore::default(),
            input: Inputter::default(),
            input_mode: None,
            last_input: InputResult::default(),
            column_cursor: 0,
            uilayout: UILayout::default(),
            clipboard: None,
            status_message: String::new(),
            last_status_message_update: Instant::now(),
        };
        model.ui_resize(ui_width, ui_height);
        model
    }

    pub fn prefill_login(&mut self, email: &str) {
        self.login.email.set(email);
        self.login.focus = LoginField::Password;
    }

    // ----------------------------- Accessors ------------------------------ //

    pub fn raw_keyevents(&self) -> bool {
        matches!(self.modus, Modus::LOGIN | Modus::CMDINPUT)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn login_form(&self) -> &LoginForm {
        &self.login
    }

    pub fn page(&self) -> Page {
        self.page
    }

    /// Pages listed in the sidebar.
    pub fn pages(&self) -> Vec<Page> {
        Page::ALL
            .into_iter()
            .filter(|p| *p != Page::Imported || self.imported.is_some())
            .collect()
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    /// Whether pages render cards instead of tables.
    pub fn cards(&self) -> bool {
        match self.config.layout {
            LayoutMode::Auto => self.uilayout.width < self.config.narrow_width as usize,
            LayoutMode::Table => false,
            LayoutMode::Cards => true,
        }
    }

    pub fn layout(&self) -> &UILayout {
        &self.uilayout
    }

    pub fn poc(&self) -> &PageView<Poc> {
        &self.poc
    }

    pub fn crm(&self) -> &PageView<CrmEntry> {
        &self.crm
    }

    pub fn meetings(&self) -> &PageView<Meeting> {
        &self.meetings
    }

    pub fn leads(&self) -> &PageView<Lead> {
        &self.leads
    }

    pub fn imported(&self) -> Option<&PageView<Record>> {
        self.imported.as_ref()
    }

    /// A lead with the user's edits applied.
    pub fn effective_lead(&self, lead: &Lead) -> Lead {
        store::apply(&self.store, lead)
    }

    pub fn browser(&self) -> Option<&TableBrowser> {
        match self.page {
            Page::Dashboard => None,
            Page::PocData => Some(&self.poc.browser),
            Page::CrmData => Some(&self.crm.browser),
            Page::Meetings => Some(&self.meetings.browser),
            Page::Leads => Some(&self.leads.browser),
            Page::Imported => self.imported.as_ref().map(|p| &p.browser),
        }
    }

    fn browser_mut(&mut self) -> Option<&mut TableBrowser> {
        match self.page {
            Page::Dashboard => None,
            Page::PocData => Some(&mut self.poc.browser),
            Page::CrmData => Some(&mut self.crm.browser),
            Page::Meetings => Some(&mut self.meetings.browser),
            Page::Leads => Some(&mut self.leads.browser),
            Page::Imported => self.imported.as_mut().map(|p| &mut p.browser),
        }
    }

    pub fn carousel_position(&self) -> Option<&CarouselPosition> {
        match self.page {
            Page::Dashboard => None,
            Page::PocData => Some(self.poc.carousel.position()),
            Page::CrmData => Some(self.crm.carousel.position()),
            Page::Meetings => Some(self.meetings.carousel.position()),
            Page::Leads => Some(self.leads.carousel.position()),
            Page::Imported => self.imported.as_ref().map(|p| p.carousel.position()),
        }
    }

    fn carousel_position_mut(&mut self) -> Option<&mut CarouselPosition> {
        match self.page {
            Page::Dashboard => None,
            Page::PocData => Some(self.poc.carousel.position_mut()),
            Page::CrmData => Some(self.crm.carousel.position_mut()),
            Page::Meetings => Some(self.meetings.carousel.position_mut()),
            Page::Leads => Some(self.leads.carousel.position_mut()),
            Page::Imported => self.imported.as_mut().map(|p| p.carousel.position_mut()),
        }
    }

    fn all_positions_mut(&mut self) -> Vec<&mut CarouselPosition> {
        let mut positions = vec![
            self.poc.carousel.position_mut(),
            self.crm.carousel.position_mut(),
            self.meetings.carousel.position_mut(),
            self.leads.carousel.position_mut(),
        ];
        if let Some(imported) = self.imported.as_mut() {
            positions.push(imported.carousel.position_mut());
        }
        positions
    }

    pub fn show_popup(&self) -> bool {
        self.modus == Modus::POPUP
    }

    pub fn popup_message(&self) -> &'static str {
        HELP_TEXT
    }

    pub fn column_menu(&self) -> Option<usize> {
        (self.modus == Modus::COLUMNS).then_some(self.column_cursor)
    }

    pub fn cmd_input(&self) -> Option<(InputMode, &InputResult)> {
        match (self.modus, self.input_mode) {
            (Modus::CMDINPUT, Some(mode)) => Some((mode, &self.last_input)),
            _ => None,
        }
    }

    pub fn status_message(&self, now: Instant) -> Option<&str> {
        let fresh = now.saturating_duration_since(self.last_status_message_update)
            < self.config.status_ttl;
        (fresh && !self.status_message.is_empty()).then_some(self.status_message.as_str())
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
        debug!("Status: {}", self.status_message);
    }

    pub fn stats(&self) -> DashboardStats {
        let leads: Vec<Lead> = self
            .leads
            .carousel
            .data()
            .iter()
            .map(|l| self.effective_lead(l))
            .collect();
        let won = leads.iter().filter(|l| l.status() == "Closed Won").count();
        let meetings = self.meetings.carousel.data();
        DashboardStats {
            total_leads: leads.len(),
            open_meetings: meetings.iter().filter(|m| m.is_open()).count(),
            conversations: self
                .crm
                .carousel
                .data()
                .iter()
                .filter(|c| c.status != "New")
                .count(),
            conversion_rate: (!leads.is_empty())
                .then(|| won as f64 * 100.0 / leads.len() as f64),
            upcoming: meetings.iter().filter(|m| m.is_open()).take(3).cloned().collect(),
        }
    }

    // ------------------------------ Update -------------------------------- //

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    /// Advance timers. Called once per event loop iteration.
    pub fn tick(&mut self, now: Instant) {
        for position in self.all_positions_mut() {
            position.tick(now);
        }
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        let threshold = self.config.narrow_width as usize;
        let narrow = |w: usize| w < threshold;
        if self.uilayout.width != 0 && narrow(self.uilayout.width) != narrow(width) {
            // Crossing the breakpoint restores the default sidebar for that size
            self.sidebar_open = !narrow(width);
        }
        self.uilayout = UILayout::from_values(width, height);
        let viewport = self.uilayout.card_viewport;
        for position in self.all_positions_mut() {
            position.set_viewport(viewport);
        }
    }

    pub fn update(&mut self, message: Option<Message>) {
        let Some(msg) = message else {
            return;
        };
        if let Message::Resize(width, height) = msg {
            self.ui_resize(width, height);
            return;
        }

        match self.modus {
            Modus::LOGIN => match msg {
                Message::Quit => self.quit(),
                Message::RawKey(key) => self.login_input(key),
                _ => (),
            },
            Modus::BROWSE => match msg {
                Message::Quit => self.quit(),
                Message::Help => self.show_help(),
                Message::Exit => self.clear_search(),
                Message::MoveUp => self.move_selection(-1),
                Message::MoveDown => self.move_selection(1),
                Message::PreviousPage => self.with_browser(TableBrowser::previous_page),
                Message::NextPage => self.with_browser(TableBrowser::next_page),
                Message::FirstPage => self.first(),
                Message::LastPage => self.last(),
                Message::Search => self.enter_cmd_mode(InputMode::Search),
                Message::ColumnMenu => self.open_column_menu(),
                Message::Export => self.export(),
                Message::ToggleLayout => self.toggle_layout(),
                Message::ToggleSidebar => self.toggle_sidebar(),
                Message::SwitchPage(n) => self.switch_page(n),
                Message::NextSection => self.cycle_page(1),
                Message::PreviousSection => self.cycle_page(-1),
                Message::CycleStatus => self.cycle_lead_status(),
                Message::EditNotes => self.enter_cmd_mode(InputMode::Notes),
                Message::LogCall => self.enter_cmd_mode(InputMode::CallNotes),
                Message::CopyPhone => self.copy_contact(false),
                Message::CopyEmail => self.copy_contact(true),
                Message::Logout => self.logout(),
                Message::Scroll(delta) => self.scroll(delta),
                _ => (),
            },
            Modus::COLUMNS => match msg {
                Message::Quit => self.quit(),
                Message::MoveUp => self.column_cursor = self.column_cursor.saturating_sub(1),
                Message::MoveDown => {
                    let count = self.browser().map(|b| b.columns().len()).unwrap_or(0);
                    self.column_cursor =
                        std::cmp::min(self.column_cursor + 1, count.saturating_sub(1));
                }
                Message::ToggleColumn | Message::Enter => self.toggle_column_at_cursor(),
                Message::ResetColumns => self.with_browser(TableBrowser::reset_columns),
                Message::Exit | Message::ColumnMenu => self.exit(),
                _ => (),
            },
            Modus::POPUP => match msg {
                Message::Quit => self.quit(),
                Message::Exit | Message::Help | Message::Enter => self.exit(),
                _ => (),
            },
            Modus::CMDINPUT => {
                if let Message::RawKey(key) = msg {
                    self.raw_input(key)
                }
            }
        }
    }

    // -------------------- Control handling functions ---------------------- //

    fn exit(&mut self) {
        match self.modus {
            Modus::POPUP | Modus::COLUMNS => {
                trace!("Close {:?} ...", self.modus);
                self.modus = self.previous_modus;
                self.previous_modus = Modus::BROWSE;
            }
            Modus::BROWSE | Modus::LOGIN | Modus::CMDINPUT => {}
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
    }

    fn with_browser(&mut self, action: impl FnOnce(&mut TableBrowser)) {
        if self.cards() {
            return;
        }
        if let Some(browser) = self.browser_mut() {
            action(browser);
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if self.cards() {
            let now = Instant::now();
            if let Some(position) = self.carousel_position_mut() {
                if delta < 0 {
                    position.previous(now);
                } else {
                    position.next(now);
                }
            }
        } else if let Some(browser) = self.browser_mut() {
            browser.move_selection(delta);
        }
    }

    fn first(&mut self) {
        if self.cards() {
            let now = Instant::now();
            if let Some(position) = self.carousel_position_mut() {
                position.navigate_to(0, now);
            }
        } else {
            self.with_browser(TableBrowser::first_page);
        }
    }

    fn last(&mut self) {
        if self.cards() {
            let now = Instant::now();
            if let Some(position) = self.carousel_position_mut() {
                let last = position.len().saturating_sub(1);
                position.navigate_to(last, now);
            }
        } else {
            self.with_browser(TableBrowser::last_page);
        }
    }

    fn scroll(&mut self, delta: isize) {
        if !self.cards() {
            return;
        }
        let rows = delta * self.config.scroll_step as isize;
        if let Some(position) = self.carousel_position_mut() {
            position.scroll_by(rows, Instant::now());
        }
    }

    fn clear_search(&mut self) {
        if let Some(browser) = self.browser_mut()
            && !browser.search_text().is_empty()
        {
            browser.search("");
        }
    }

    fn open_column_menu(&mut self) {
        if self.cards() || self.browser().is_none_or(TableBrowser::is_empty) {
            return;
        }
        self.column_cursor = 0;
        self.previous_modus = self.modus;
        self.modus = Modus::COLUMNS;
    }

    fn toggle_column_at_cursor(&mut self) {
        let cursor = self.column_cursor;
        if let Some(browser) = self.browser_mut()
            && let Some(key) = browser.columns().get(cursor).map(|c| c.key.clone())
        {
            browser.toggle_column(&key);
        }
    }

    fn export(&mut self) {
        if self.cards() {
            return;
        }
        if let Some(message) = self.browser().filter(|b| !b.is_empty()).map(TableBrowser::export) {
            self.set_status_message(message);
        }
    }

    fn toggle_layout(&mut self) {
        self.config.layout = if self.cards() {
            LayoutMode::Table
        } else {
            LayoutMode::Cards
        };
        info!("Layout switched to {:?}", self.config.layout);
    }

    fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
        trace!("Sidebar open: {}", self.sidebar_open);
    }

    fn switch_page(&mut self, number: usize) {
        let pages = self.pages();
        if let Some(page) = number.checked_sub(1).and_then(|idx| pages.get(idx)) {
            self.goto_page(*page);
        }
    }

    fn cycle_page(&mut self, step: isize) {
        let pages = self.pages();
        let current = pages.iter().position(|p| *p == self.page).unwrap_or(0);
        let next = (current as isize + step).rem_euclid(pages.len() as isize) as usize;
        self.goto_page(pages[next]);
    }

    fn goto_page(&mut self, page: Page) {
        debug!("Switching to page {page}");
        self.page = page;
        if self.uilayout.width < self.config.narrow_width as usize && self.sidebar_open {
            self.toggle_sidebar();
        }
    }

    // ------------------------------ Leads ------------------------------- //

    fn selected_lead(&self) -> Option<Lead> {
        if self.page != Page::Leads {
            return None;
        }
        if self.cards() {
            return self.leads.carousel.current().cloned();
        }
        let id = self.leads.browser.selected_record()?.text("id")?;
        self.leads
            .carousel
            .data()
            .iter()
            .find(|lead| lead.id() == id)
            .cloned()
    }

    fn refresh_lead_records(&mut self) {
        let records: Vec<Record> = self
            .leads
            .carousel
            .data()
            .iter()
            .map(|lead| store::apply(&self.store, lead).to_record())
            .collect();
        self.leads.browser.replace_data(Arc::new(records));
    }

    fn cycle_lead_status(&mut self) {
        let Some(lead) = self.selected_lead() else {
            return;
        };
        let status = LeadEdits::new(&mut self.store).cycle_status(&lead);
        self.refresh_lead_records();
        self.set_status_message(format!("Lead status changed to {status}"));
    }

    fn save_notes(&mut self, mode: InputMode, notes: &str) {
        let Some(lead) = self.selected_lead() else {
            return;
        };
        let mut edits = LeadEdits::new(&mut self.store);
        let message = match mode {
            InputMode::CallNotes => {
                let today = Local::now().format(DATE_FORMAT).to_string();
                edits.log_call(&lead, notes, &today);
                format!("Call with {} logged", lead.name())
            }
            _ => {
                edits.set_notes(&lead, notes);
                format!("Notes for {} saved", lead.name())
            }
        };
        self.refresh_lead_records();
        self.set_status_message(message);
    }

    // ----------------------------- Contacts ------------------------------ //

    fn selected_contact(&self) -> Option<ContactCard> {
        let record = if self.cards() {
            match self.page {
                Page::Dashboard | Page::Meetings => None,
                Page::PocData => self.poc.carousel.current().map(Poc::to_record),
                Page::CrmData => self.crm.carousel.current().map(CrmEntry::to_record),
                Page::Leads => self
                    .leads
                    .carousel
                    .current()
                    .map(|l| self.effective_lead(l).to_record()),
                Page::Imported => self
                    .imported
                    .as_ref()
                    .and_then(|p| p.carousel.current().cloned()),
            }
        } else {
            self.browser().and_then(|b| b.selected_record().cloned())
        };
        record.map(|r| ContactCard::from_record(&r))
    }

    fn copy_contact(&mut self, email: bool) {
        let what = if email { "email address" } else { "phone number" };
        let Some(contact) = self.selected_contact() else {
            return;
        };
        let text = if email { contact.email() } else { contact.phone() }.to_string();
        if text.is_empty() {
            self.set_status_message(format!("No {what} on this record"));
            return;
        }

        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    trace!("Error opening clipboard: {:?}", e);
                    self.set_status_message("Clipboard is not available");
                    return;
                }
            }
        }
        let result = match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.set_text(text.clone()),
            None => return,
        };
        match result {
            Ok(_) => self.set_status_message(format!("Copied {what} {text}")),
            Err(e) => {
                trace!("Error copying to clipboard: {:?}", e);
                self.set_status_message("Copy to clipboard failed");
            }
        }
    }

    // ------------------------------ Session ------------------------------ //

    fn login_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.quit(),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.login.focus = match self.login.focus {
                    LoginField::Email => LoginField::Password,
                    LoginField::Password => LoginField::Email,
                };
            }
            KeyCode::Enter => self.submit_login(),
            _ => {
                let field = match self.login.focus {
                    LoginField::Email => &mut self.login.email,
                    LoginField::Password => &mut self.login.password,
                };
                field.read(key);
            }
        }
    }

    fn submit_login(&mut self) {
        let email = self.login.email.value().trim().to_string();
        let password = self.login.password.value().to_string();
        match session::login(&email, &password, Local::now()) {
            Ok(session) => {
                self.session = Some(session);
                self.login.password.clear();
                self.login.error = None;
                self.page = Page::Dashboard;
                self.modus = Modus::BROWSE;
                self.previous_modus = Modus::BROWSE;
            }
            Err(e) => {
                self.login.password.clear();
                self.login.focus = LoginField::Password;
                self.login.error = Some(e.to_string());
            }
        }
    }

    fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            info!("{} (user {}) logged out", session.email, session.id);
        }
        self.modus = Modus::LOGIN;
        self.previous_modus = Modus::LOGIN;
        self.login.focus = LoginField::Password;
    }

    // --------------------------- Command input --------------------------- //

    fn enter_cmd_mode(&mut self, mode: InputMode) {
        match mode {
            InputMode::Search if self.cards() => return,
            InputMode::Search => {
                let Some(browser) = self.browser().filter(|b| !b.is_empty()) else {
                    return;
                };
                let current = browser.search_text().to_string();
                self.input.clear();
                self.input.set(&current);
            }
            InputMode::Notes | InputMode::CallNotes => {
                let Some(lead) = self.selected_lead() else {
                    return;
                };
                self.input.clear();
                if mode == InputMode::Notes {
                    let notes = self.effective_lead(&lead).notes;
                    self.input.set(&notes);
                }
            }
        }
        trace!("Entering command mode {mode:?} ...");
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.input_mode = Some(mode);
        self.last_input = self.input.get();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        let before = std::mem::take(&mut self.last_input.input);
        self.last_input = self.input.read(key);
        let mode = self.input_mode;
        if mode == Some(InputMode::Search) && self.last_input.input != before {
            // Live search while typing
            let text = self.last_input.input.clone();
            if let Some(browser) = self.browser_mut() {
                browser.search(&text);
            }
        }
        if self.last_input.finished {
            self.handle_cmd_input();
        }
    }

    fn handle_cmd_input(&mut self) {
        trace!("Handle cmd input {:?}", self.last_input);
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;

        let input = self.last_input.clone();
        match self.input_mode.take() {
            Some(mode @ (InputMode::Notes | InputMode::CallNotes)) if !input.canceled => {
                self.save_notes(mode, &input.input);
            }
            Some(mode) => trace!("{mode:?} input closed"),
            None => info!("Cmd mode is none!"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockData;
    use ratatui::crossterm::event::KeyModifiers;

    fn data() -> DashData {
        let mut mock = MockData::new(Local::now(), 3);
        DashData {
            pocs: mock.pocs(),
            crm: mock.crm_entries(),
            meetings: mock.meetings(),
            leads: mock.leads(),
            imported: None,
        }
    }

    fn model(width: usize) -> Model {
        Model::init(&DashConfig::default(), data(), width, 40)
    }

    fn type_keys(model: &mut Model, s: &str) {
        for c in s.chars() {
            model.update(Some(Message::RawKey(KeyEvent::from(KeyCode::Char(c)))));
        }
    }

    fn key(model: &mut Model, code: KeyCode) {
        model.update(Some(Message::RawKey(KeyEvent::new(code, KeyModifiers::NONE))));
    }

    fn logged_in(width: usize) -> Model {
        let mut m = model(width);
        type_keys(&mut m, "john@example.com");
        key(&mut m, KeyCode::Tab);
        type_keys(&mut m, "password123");
        key(&mut m, KeyCode::Enter);
        m
    }

    #[test]
    fn login_opens_the_dashboard() {
        let m = logged_in(120);
        assert_eq!(m.session().map(|s| s.name.as_str()), Some("John Doe"));
        assert_eq!(m.page(), Page::Dashboard);
        assert!(!m.raw_keyevents());
    }

    #[test]
    fn bad_password_stays_on_login() {
        let mut m = model(120);
        m.prefill_login("admin@gmail.com");
        type_keys(&mut m, "nope");
        key(&mut m, KeyCode::Enter);
        assert!(m.session().is_none());
        assert_eq!(m.login_form().error.as_deref(), Some("Invalid credentials"));
        assert_eq!(m.login_form().password.value(), "");
        assert!(m.raw_keyevents());
    }

    #[test]
    fn messages_before_login_are_ignored() {
        let mut m = model(120);
        m.update(Some(Message::SwitchPage(2)));
        assert_eq!(m.page(), Page::Dashboard);
        assert!(m.session().is_none());
    }

    #[test]
    fn search_filters_live_and_escape_clears() {
        let mut m = logged_in(120);
        m.update(Some(Message::SwitchPage(2)));
        assert_eq!(m.page(), Page::PocData);
        m.update(Some(Message::Search));
        assert!(m.raw_keyevents());
        type_keys(&mut m, "contact 1");
        assert_eq!(m.browser().unwrap().filtered_len(), 11);
        key(&mut m, KeyCode::Enter);
        assert!(!m.raw_keyevents());
        assert_eq!(m.browser().unwrap().search_text(), "contact 1");

        m.update(Some(Message::Exit));
        assert_eq!(m.browser().unwrap().filtered_len(), 20);
    }

    #[test]
    fn reopening_search_keeps_page() {
        let mut m = logged_in(120);
        m.update(Some(Message::SwitchPage(2)));
        m.update(Some(Message::Search));
        type_keys(&mut m, "contact");
        key(&mut m, KeyCode::Enter);
        m.update(Some(Message::NextPage));
        assert_eq!(m.browser().unwrap().current_page(), 2);

        m.update(Some(Message::Search));
        key(&mut m, KeyCode::Left);
        key(&mut m, KeyCode::Home);
        key(&mut m, KeyCode::Enter);
        assert_eq!(m.browser().unwrap().search_text(), "contact");
        assert_eq!(m.browser().unwrap().current_page(), 2);
    }

    #[test]
    fn paging_through_a_table() {
        let mut m = logged_in(120);
        m.update(Some(Message::SwitchPage(3)));
        m.update(Some(Message::NextPage));
        m.update(Some(Message::NextPage));
        assert_eq!(m.browser().unwrap().current_page(), 2);
        m.update(Some(Message::FirstPage));
        assert_eq!(m.browser().unwrap().current_page(), 1);
    }

    #[test]
    fn column_menu_toggles_and_resets() {
        let mut m = logged_in(120);
        m.update(Some(Message::SwitchPage(2)));
        m.update(Some(Message::ColumnMenu));
        assert_eq!(m.column_menu(), Some(0));
        m.update(Some(Message::MoveDown));
        m.update(Some(Message::ToggleColumn));
        assert!(!m.browser().unwrap().is_visible("poc_name"));
        m.update(Some(Message::ResetColumns));
        assert!(m.browser().unwrap().is_visible("poc_name"));
        m.update(Some(Message::Exit));
        assert_eq!(m.column_menu(), None);
    }

    #[test]
    fn export_only_acknowledges() {
        let mut m = logged_in(120);
        m.update(Some(Message::SwitchPage(2)));
        m.update(Some(Message::NextPage));
        m.update(Some(Message::Export));
        assert_eq!(
            m.status_message(Instant::now()),
            Some(crate::browser::EXPORT_MESSAGE)
        );
        assert_eq!(m.browser().unwrap().current_page(), 2);
    }

    #[test]
    fn narrow_terminal_uses_cards() {
        let mut m = logged_in(60);
        assert!(m.cards());
        assert!(!m.sidebar_open());
        m.update(Some(Message::SwitchPage(2)));
        m.update(Some(Message::MoveDown));
        assert_eq!(m.carousel_position().unwrap().index(), 1);
        // still settling
        m.update(Some(Message::MoveDown));
        assert_eq!(m.carousel_position().unwrap().index(), 1);

        m.update(Some(Message::ToggleLayout));
        assert!(!m.cards());
    }

    #[test]
    fn resizing_across_breakpoint_switches_layout() {
        let mut m = logged_in(120);
        assert!(!m.cards());
        assert!(m.sidebar_open());
        m.update(Some(Message::Resize(80, 30)));
        assert!(m.cards());
        assert!(!m.sidebar_open());
        assert_eq!(m.layout().card_viewport, 30 - HEADER_HEIGHT - STATUSLINE_HEIGHT - PAGE_TITLE_HEIGHT);
    }

    #[test]
    fn lead_status_cycles_through_the_store() {
        let mut m = logged_in(120);
        m.update(Some(Message::SwitchPage(5)));
        assert_eq!(m.page(), Page::Leads);
        m.update(Some(Message::CycleStatus));
        let record = m.browser().unwrap().selected_record().unwrap();
        assert_eq!(record.text("status"), Some("Contacted"));
        assert_eq!(m.stats().total_leads, 20);
    }

    #[test]
    fn logging_a_call_updates_activity() {
        let mut m = logged_in(120);
        m.update(Some(Message::SwitchPage(5)));
        m.update(Some(Message::MoveDown));
        m.update(Some(Message::LogCall));
        type_keys(&mut m, "Left voicemail");
        key(&mut m, KeyCode::Enter);

        let record = m.browser().unwrap().selected_record().unwrap();
        assert_eq!(record.text("lastActivity"), Some("Call"));
        assert_eq!(record.text("notes"), Some("Left voicemail"));
        assert_eq!(record.text("id"), Some("LEAD-4001"));
    }

    #[test]
    fn cancelled_notes_are_not_saved() {
        let mut m = logged_in(120);
        m.update(Some(Message::SwitchPage(5)));
        m.update(Some(Message::EditNotes));
        type_keys(&mut m, " and more");
        key(&mut m, KeyCode::Esc);
        let record = m.browser().unwrap().selected_record().unwrap();
        assert_eq!(record.text("notes"), Some("Interested in our product"));
    }

    #[test]
    fn lead_actions_elsewhere_do_nothing() {
        let mut m = logged_in(120);
        m.update(Some(Message::SwitchPage(2)));
        m.update(Some(Message::EditNotes));
        assert!(!m.raw_keyevents());
    }

    #[test]
    fn logout_returns_to_login() {
        let mut m = logged_in(120);
        m.update(Some(Message::Logout));
        assert!(m.session().is_none());
        assert!(m.raw_keyevents());
    }

    #[test]
    fn dashboard_stats_are_derived_from_data() {
        let m = logged_in(120);
        let stats = m.stats();
        assert_eq!(stats.open_meetings, 10);
        // leads 4 and 10 and 16 are Closed Won
        assert_eq!(stats.conversion_rate, Some(15.0));
        assert_eq!(stats.upcoming.len(), 3);
        assert_eq!(stats.conversations, 16);
    }

    #[test]
    fn page_cycling_wraps() {
        let mut m = logged_in(120);
        m.update(Some(Message::PreviousSection));
        assert_eq!(m.page(), Page::Leads);
        m.update(Some(Message::NextSection));
        assert_eq!(m.page(), Page::Dashboard);
        m.update(Some(Message::SwitchPage(6)));
        assert_eq!(m.page(), Page::Dashboard);
    }
}
