use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::TestBackend;
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use serde::{Deserialize, Serialize};
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;

use crate::api::{ApiError, HttpNewsApi, NewsApi};
use crate::config::Config;
use crate::fetcher::{ArticleFetcher, FetchEvent, Phase, RequestLane};
use crate::filters::store::{JsonFileStore, KeyValueStore, store_path_for};
use crate::filters::{
    ALL, DATE_FORMAT, DateRange, FilterController, LaunchParams, parse_date_selection,
};
use crate::model::types::FilterOptions;
use crate::ui::articles::{ArticleList, CardLayout, CardRegion};
use crate::ui::chrome::{Chrome, ChromeEffect, DrawerClick};
use crate::ui::components::theme::{TerminalWidth, ThemePalette, ThemePreset, chip_style};
use crate::ui::components::widgets::{BarControl, sticky_bar};
use crate::ui::data::{DrawerItem, InputMode, Page};
use crate::ui::pagination::{PageControl, Pagination, PaginationRow, pagination_row};
use crate::ui::shortcuts;
use crate::ui::wordcloud::{CloudControls, WordCloudPage};

/// Sticky bar rows: content plus the border shown once scrolled.
pub const BAR_HEIGHT: u16 = 2;
/// Header banner rows at the top of the article document.
pub const HEADER_LINES: u16 = 4;
const DRAWER_WIDTH: u16 = 34;
const WHEEL_STEP: u16 = 3;

#[derive(Serialize, Deserialize, Default)]
struct TuiStatePersisted {
    theme: Option<String>,
}

fn state_path_for(data_dir: &Path) -> PathBuf {
    // Non-secret UI preferences only; filters live in filters.json.
    data_dir.join("tui_state.json")
}

fn load_state(path: &Path) -> TuiStatePersisted {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

fn save_state(path: &Path, state: &TuiStatePersisted) {
    if let Ok(body) = serde_json::to_string_pretty(state) {
        let _ = std::fs::write(path, body);
    }
}

fn help_lines(palette: ThemePalette) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    let add_section = |title: &str, items: &[String]| -> Vec<Line<'static>> {
        let mut v = Vec::new();
        v.push(Line::from(Span::styled(title.to_string(), palette.title())));
        for item in items {
            v.push(Line::from(format!("  {item}")));
        }
        v.push(Line::from(""));
        v
    };

    lines.extend(add_section(
        "Articles",
        &[
            format!(
                "{} move between cards; {} scroll; {} top/bottom",
                shortcuts::MOVE,
                shortcuts::SCROLL,
                shortcuts::JUMP
            ),
            format!(
                "{} toggle summary; {} source homepage; {} close; {} read whole article",
                shortcuts::TOGGLE_CARD,
                shortcuts::SOURCE_LINK,
                shortcuts::CLOSE_CARD,
                shortcuts::READ_WHOLE
            ),
            format!("{} / {} previous / next page", shortcuts::PREV_PAGE, shortcuts::NEXT_PAGE),
            "Mouse: click cards, badges, page numbers; wheel scrolls".to_string(),
        ],
    ));
    lines.extend(add_section(
        "Filters",
        &[
            format!("{} menu: topics, sources, dates, word cloud", shortcuts::MENU),
            format!(
                "{} search (Enter leaves the box, {} clears)",
                shortcuts::SEARCH,
                shortcuts::CLEAR_SEARCH
            ),
            format!(
                "{} date range: YYYY-MM-DD or YYYY-MM-DD..YYYY-MM-DD; empty clears",
                shortcuts::DATE_RANGE
            ),
            format!("{} home: reset every filter", shortcuts::HOME),
        ],
    ));
    lines.extend(add_section(
        "Word cloud",
        &[
            format!(
                "{} word cloud; arrows pick a word; {} opens its articles",
                shortcuts::WORD_CLOUD,
                shortcuts::CLOUD_OPEN_WORD
            ),
            format!(
                "{} cycle source; {} cycle topic; Esc back to articles",
                shortcuts::CLOUD_SOURCE,
                shortcuts::CLOUD_TOPIC
            ),
        ],
    ));
    lines.extend(add_section(
        "General",
        &[
            format!("{} theme: dark/light/high contrast", shortcuts::THEME),
            format!("{} toggle this help; {} quit", shortcuts::HELP, shortcuts::QUIT),
            "Filters persist in filters.json, theme in tui_state.json (data dir)".to_string(),
        ],
    ));

    lines
}

fn render_help_overlay(frame: &mut Frame, palette: ThemePalette, scroll: u16) {
    let area = frame.area();
    let popup_area = centered_rect(70, 70, area);
    let lines = help_lines(palette);
    let block = Block::default()
        .title(Span::styled("Help / Shortcuts", palette.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent));

    frame.render_widget(Clear, popup_area);

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .scroll((scroll, 0)),
        popup_area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1]);

    horizontal[1]
}

fn contains(rect: Rect, col: u16, row: u16) -> bool {
    col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

pub fn footer_legend(show_help: bool) -> &'static str {
    if show_help {
        "Esc/F10 quit • Up/Down cards • Enter toggle • s source • x close • o read • Left/Right page • m menu • / search • Ctrl+U clear • d dates • w cloud • h home • F2 theme"
    } else {
        "F1 help | m menu | / search | d dates | w cloud | Left/Right page | Enter toggle | h home | F2 theme | Esc/F10 quit"
    }
}

/// One row of the scrollable article document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DocRow {
    Header,
    Status,
    Card(usize, u16),
    Pagination,
    Blank,
}

/// Screen regions from the last frame, used to resolve mouse clicks.
#[derive(Default)]
struct HitMap {
    bar: Rect,
    bar_hits: Vec<(Range<u16>, BarControl)>,
    content: Rect,
    doc: Vec<DocRow>,
    cards: Vec<CardLayout>,
    pagination: Option<PaginationRow>,
    drawer: Option<Rect>,
    drawer_offset: usize,
    cloud_controls: Vec<(Range<u16>, CloudControl)>,
    cloud_controls_row: u16,
    cloud_area: Rect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CloudControl {
    Source,
    Topic,
    Dates,
}

/// Launch-time options for the interactive client.
#[derive(Clone, Debug)]
pub struct TuiOptions {
    pub launch: LaunchParams,
    pub start_page: Page,
    pub theme: ThemePreset,
    /// Spawn the system browser for links; off in tests.
    pub browser: bool,
}

impl Default for TuiOptions {
    fn default() -> Self {
        Self {
            launch: LaunchParams::default(),
            start_page: Page::Articles,
            theme: ThemePreset::Dark,
            browser: true,
        }
    }
}

/// The interactive client. Every field is touched only by the loop thread;
/// network work runs on the runtime and comes back through request lanes.
pub struct App<A: NewsApi, S: KeyValueStore> {
    api: Arc<A>,
    runtime: Handle,
    filters: FilterController<S>,
    fetcher: ArticleFetcher<A>,
    list: ArticleList,
    pagination: Option<Pagination>,
    chrome: Chrome,
    cloud: WordCloudPage,
    options: FilterOptions,
    options_lane: RequestLane<Result<FilterOptions, ApiError>>,
    page: Page,
    input_mode: InputMode,
    date_input: String,
    drawer_cursor: usize,
    scroll: u16,
    doc_height: u16,
    theme: ThemePreset,
    show_help: bool,
    help_scroll: u16,
    status: String,
    browser: bool,
    opened: Vec<String>,
    viewport: Rect,
    hits: HitMap,
    should_quit: bool,
    needs_draw: bool,
}

impl<A: NewsApi, S: KeyValueStore> App<A, S> {
    /// Builds the app and issues the initial requests.
    pub fn new(api: Arc<A>, store: S, runtime: Handle, opts: TuiOptions) -> Self {
        let filters = FilterController::load(store, &opts.launch);
        let chrome = Chrome::with_launch_keyword(&filters.state().keyword);
        let controls = CloudControls::restore(filters.store());
        let mut app = Self {
            fetcher: ArticleFetcher::new(Arc::clone(&api), runtime.clone()),
            api,
            runtime,
            filters,
            list: ArticleList::default(),
            pagination: None,
            chrome,
            cloud: WordCloudPage::new(controls),
            options: FilterOptions::builtin(),
            options_lane: RequestLane::new("filter-options"),
            page: opts.start_page,
            input_mode: InputMode::Browse,
            date_input: String::new(),
            drawer_cursor: 0,
            scroll: 0,
            doc_height: 0,
            theme: opts.theme,
            show_help: false,
            help_scroll: 0,
            status: String::new(),
            browser: opts.browser,
            opened: Vec::new(),
            viewport: Rect::new(0, 0, 100, 30),
            hits: HitMap::default(),
            should_quit: false,
            needs_draw: true,
        };
        app.status = app.filters.state().describe();
        let api = Arc::clone(&app.api);
        app.options_lane
            .spawn(&app.runtime, async move { api.filter_options().await });
        match app.page {
            Page::Articles => {
                app.fetch(1);
            }
            Page::WordCloud => {
                app.cloud.request(&app.api, &app.runtime);
            }
        }
        app
    }

    pub fn filters(&self) -> &FilterController<S> {
        &self.filters
    }

    pub fn list(&self) -> &ArticleList {
        &self.list
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    pub fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    pub fn cloud(&self) -> &WordCloudPage {
        &self.cloud
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn phase(&self) -> Phase {
        self.fetcher.phase()
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn theme(&self) -> ThemePreset {
        self.theme
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    /// URLs the user asked to open, oldest first.
    pub fn opened_urls(&self) -> &[String] {
        &self.opened
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn narrow(&self) -> bool {
        TerminalWidth::from_cols(self.viewport.width).is_narrow()
    }

    fn fetch(&mut self, page: u32) -> u64 {
        self.needs_draw = true;
        self.fetcher.fetch_page(self.filters.state(), page)
    }

    /// Drains finished requests. Call once per loop tick.
    pub fn tick(&mut self) {
        if let Some(event) = self.fetcher.poll() {
            self.apply_fetch(event);
        }
        if let Some(outcome) = self.options_lane.poll_latest() {
            self.apply_options(outcome);
        }
        if self.cloud.poll() {
            self.needs_draw = true;
        }
    }

    /// Blocks until pending article and word requests settle or `timeout`
    /// passes. Returns false on timeout.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        if self.fetcher.phase() != Phase::Idle {
            match self.fetcher.wait(deadline.saturating_duration_since(Instant::now())) {
                Some(event) => self.apply_fetch(event),
                None => return false,
            }
        }
        if self.cloud.is_loading()
            && !self
                .cloud
                .wait(deadline.saturating_duration_since(Instant::now()))
        {
            return false;
        }
        if let Some(outcome) = self.options_lane.poll_latest() {
            self.apply_options(outcome);
        }
        true
    }

    fn apply_fetch(&mut self, event: FetchEvent) {
        self.needs_draw = true;
        match event {
            FetchEvent::Loaded(result) => {
                let count = result.articles.len();
                self.list.render(result.articles);
                self.pagination = Some(Pagination::new(result.current_page, result.total_pages));
                self.scroll_to(0);
                self.chrome.after_fetch();
                self.status = if count == 0 {
                    format!("No articles | {}", self.filters.state().describe())
                } else {
                    format!(
                        "Page {} of {} | {}",
                        result.current_page,
                        result.total_pages,
                        self.filters.state().describe()
                    )
                };
            }
            // Already logged by the fetcher; the previous view and status stay.
            FetchEvent::Failed(_) => {}
        }
    }

    fn apply_options(&mut self, outcome: Result<FilterOptions, ApiError>) {
        match outcome {
            Ok(options) => {
                self.options = options.merged_with_builtin();
                tracing::debug!(
                    sources = self.options.sources.len(),
                    topics = self.options.topics.len(),
                    "filter_options_loaded"
                );
            }
            Err(err) => tracing::warn!("Error loading filter options: {err}"),
        }
        self.needs_draw = true;
    }

    fn scroll_to(&mut self, offset: u16) {
        let visible = self.hits.content.height;
        let max = self.doc_height.saturating_sub(visible);
        self.scroll = if self.doc_height == 0 {
            offset
        } else {
            offset.min(max)
        };
        let bar_bottom = i32::from(BAR_HEIGHT);
        let header_bottom = i32::from(BAR_HEIGHT + HEADER_LINES) - i32::from(self.scroll);
        self.chrome
            .sticky
            .on_scroll(i32::from(self.scroll), bar_bottom, header_bottom);
        self.needs_draw = true;
    }

    fn scroll_by(&mut self, delta: i32) {
        let target = (i32::from(self.scroll) + delta).max(0);
        self.scroll_to(u16::try_from(target).unwrap_or(u16::MAX));
    }

    fn ensure_card_visible(&mut self, index: usize) {
        let Some(first_row) = self
            .hits
            .doc
            .iter()
            .position(|r| *r == DocRow::Card(index, 0))
        else {
            return;
        };
        let first_row = first_row as u16;
        let visible = self.hits.content.height.max(1);
        if first_row < self.scroll || first_row >= self.scroll + visible {
            self.scroll_to(first_row.saturating_sub(visible / 3));
        }
    }

    fn open_url(&mut self, url: String) {
        if self.browser
            && let Err(err) = crate::ui::open_in_browser(&url)
        {
            tracing::warn!(%url, "could not open browser: {err}");
            self.status = format!("Could not open {url}: {err}");
        } else {
            self.status = format!("Opened {url}");
        }
        tracing::info!(%url, "open_link");
        self.opened.push(url);
    }

    fn click_card(&mut self, index: usize, region: CardRegion) {
        let outcome = self.list.click(index, region);
        if let Some(url) = outcome.open_url {
            self.open_url(url);
        }
        self.needs_draw = true;
    }

    fn go_page(&mut self, control: PageControl) {
        if let Some(target) = self.pagination.and_then(|p| p.target(control)) {
            self.fetch(target);
        }
    }

    /// Home control: full reset on the article list, navigation from the cloud.
    fn home(&mut self) {
        if self.page == Page::WordCloud {
            self.show_articles(&LaunchParams::default());
            return;
        }
        self.filters.reset();
        self.chrome.reset();
        self.input_mode = InputMode::Browse;
        self.scroll_to(0);
        self.fetch(1);
    }

    fn clear_search(&mut self) {
        let wide = !self.narrow();
        if self.chrome.clear_search(wide) == ChromeEffect::KeywordCleared {
            self.input_mode = InputMode::Browse;
            self.filters.set_keyword("");
            self.fetch(1);
        }
    }

    fn open_search(&mut self) {
        if self.page != Page::Articles {
            return;
        }
        self.chrome.focus_search();
        self.input_mode = InputMode::Keyword;
        self.needs_draw = true;
    }

    fn edit_keyword(&mut self, edit: impl FnOnce(&mut String)) {
        let mut keyword = self.filters.state().keyword.clone();
        edit(&mut keyword);
        let page = self.filters.set_keyword(&keyword);
        self.fetch(page);
    }

    fn open_date_prompt(&mut self) {
        let current = match self.page {
            Page::Articles => self.filters.state().date_range,
            Page::WordCloud => self.cloud.controls.date_range,
        };
        self.date_input = current
            .map(|r| {
                if r.last_day() == r.start() {
                    r.start_param()
                } else {
                    format!("{}..{}", r.start_param(), r.last_day().format(DATE_FORMAT))
                }
            })
            .unwrap_or_default();
        self.chrome.drawer.close();
        self.input_mode = InputMode::DateRange;
        self.needs_draw = true;
    }

    fn submit_date_prompt(&mut self) {
        match parse_date_selection(&self.date_input) {
            Ok(days) => {
                self.input_mode = InputMode::Browse;
                let range = DateRange::from_selection(&days);
                match self.page {
                    Page::Articles => {
                        let page = self.filters.set_date_range(range);
                        self.chrome.on_filter_selected();
                        self.fetch(page);
                    }
                    Page::WordCloud => {
                        self.cloud.controls.date_range = range;
                        self.cloud.request(&self.api, &self.runtime);
                    }
                }
            }
            Err(msg) => self.status = msg,
        }
        self.needs_draw = true;
    }

    pub fn open_cloud(&mut self) {
        self.chrome.drawer.close();
        self.input_mode = InputMode::Browse;
        self.page = Page::WordCloud;
        self.cloud.controls = CloudControls::restore(self.filters.store());
        self.cloud.request(&self.api, &self.runtime);
        self.status = format!("Word cloud | {}", self.cloud.controls.describe());
        self.needs_draw = true;
    }

    /// Article list as if opened from a link with `params`.
    fn show_articles(&mut self, params: &LaunchParams) {
        self.page = Page::Articles;
        self.input_mode = InputMode::Browse;
        self.filters.reload(params);
        self.chrome = Chrome::with_launch_keyword(&self.filters.state().keyword);
        self.scroll_to(0);
        self.fetch(1);
    }

    fn open_selected_word(&mut self) {
        if let Some(word) = self.cloud.selected_word() {
            let params = self.cloud.controls.navigate(&word, self.filters.store_mut());
            self.show_articles(&params);
        }
    }

    fn drawer_items(&self) -> Vec<DrawerItem> {
        let mut items = vec![DrawerItem::Home, DrawerItem::WordCloud, DrawerItem::Header("Topics")];
        items.push(DrawerItem::Topic(ALL.to_string()));
        items.extend(self.options.topics.iter().cloned().map(DrawerItem::Topic));
        items.push(DrawerItem::Header("Sources"));
        items.push(DrawerItem::Source(ALL.to_string()));
        items.extend(self.options.sources.iter().cloned().map(DrawerItem::Source));
        items.push(DrawerItem::Header("Dates"));
        items.push(DrawerItem::DateRange);
        items.push(DrawerItem::ClearDates);
        items
    }

    fn move_drawer_cursor(&mut self, forward: bool) {
        let items = self.drawer_items();
        let mut idx = self.drawer_cursor.min(items.len().saturating_sub(1));
        loop {
            idx = if forward {
                (idx + 1) % items.len()
            } else {
                (idx + items.len() - 1) % items.len()
            };
            if items[idx].is_selectable() {
                break;
            }
        }
        self.drawer_cursor = idx;
        self.needs_draw = true;
    }

    fn select_drawer_item(&mut self, item: DrawerItem) {
        match item {
            DrawerItem::Header(_) => return,
            DrawerItem::Home => {
                self.chrome.drawer.close();
                if self.page == Page::WordCloud {
                    self.show_articles(&LaunchParams::default());
                } else {
                    self.home();
                }
            }
            DrawerItem::WordCloud => self.open_cloud(),
            DrawerItem::Topic(topic) => {
                let page = self.filters.set_topic(&topic);
                let narrow = self.narrow();
                self.chrome.on_topic_selected(narrow);
                self.page = Page::Articles;
                self.fetch(page);
            }
            DrawerItem::Source(source) => {
                let page = self.filters.set_source(&source);
                self.chrome.on_filter_selected();
                self.page = Page::Articles;
                self.fetch(page);
            }
            DrawerItem::DateRange => self.open_date_prompt(),
            DrawerItem::ClearDates => {
                self.chrome.on_filter_selected();
                match self.page {
                    Page::Articles => {
                        let page = self.filters.set_date_range(None);
                        self.fetch(page);
                    }
                    Page::WordCloud => {
                        self.cloud.controls.date_range = None;
                        self.cloud.request(&self.api, &self.runtime);
                    }
                }
            }
        }
        self.needs_draw = true;
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.needs_draw = true;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if key.code == KeyCode::F(10) {
            self.should_quit = true;
            return;
        }
        if self.show_help {
            match key.code {
                KeyCode::Esc | KeyCode::F(1) => self.show_help = false,
                KeyCode::Down => self.help_scroll = self.help_scroll.saturating_add(1),
                KeyCode::Up => self.help_scroll = self.help_scroll.saturating_sub(1),
                _ => {}
            }
            return;
        }

        match self.input_mode {
            InputMode::Keyword => {
                match key.code {
                    KeyCode::Enter | KeyCode::Esc | KeyCode::Tab => {
                        self.chrome.blur_search();
                        self.input_mode = InputMode::Browse;
                    }
                    KeyCode::Char('u') if ctrl => self.clear_search(),
                    KeyCode::Backspace => self.edit_keyword(|k| {
                        k.pop();
                    }),
                    KeyCode::Char(c) if !ctrl => self.edit_keyword(|k| k.push(c)),
                    _ => {}
                }
                return;
            }
            InputMode::DateRange => {
                match key.code {
                    KeyCode::Esc => self.input_mode = InputMode::Browse,
                    KeyCode::Enter => self.submit_date_prompt(),
                    KeyCode::Backspace => {
                        self.date_input.pop();
                    }
                    KeyCode::Char(c) if !ctrl => self.date_input.push(c),
                    _ => {}
                }
                return;
            }
            InputMode::Browse => {}
        }

        if self.chrome.drawer.is_open() {
            match key.code {
                KeyCode::Esc | KeyCode::Char('m') | KeyCode::F(3) => self.chrome.drawer.close(),
                KeyCode::Down | KeyCode::Char('j') => self.move_drawer_cursor(true),
                KeyCode::Up | KeyCode::Char('k') => self.move_drawer_cursor(false),
                KeyCode::Enter => {
                    if let Some(item) = self.drawer_items().get(self.drawer_cursor).cloned() {
                        self.select_drawer_item(item);
                    }
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::F(1) => {
                self.show_help = true;
                self.help_scroll = 0;
                return;
            }
            KeyCode::F(2) => {
                self.theme = self.theme.next();
                self.status = format!("Theme: {}", self.theme.name());
                return;
            }
            KeyCode::Char('m') | KeyCode::F(3) => {
                self.chrome.drawer.on_click(DrawerClick::Hamburger);
                let items = self.drawer_items();
                if !items
                    .get(self.drawer_cursor)
                    .is_some_and(DrawerItem::is_selectable)
                {
                    self.drawer_cursor = 0;
                }
                return;
            }
            KeyCode::Char('d') => {
                self.open_date_prompt();
                return;
            }
            KeyCode::Char('h') => {
                self.home();
                return;
            }
            KeyCode::Delete if ctrl => {
                self.home();
                return;
            }
            _ => {}
        }

        match self.page {
            Page::Articles => self.handle_article_key(key, ctrl),
            Page::WordCloud => self.handle_cloud_key(key),
        }
    }

    fn handle_article_key(&mut self, key: KeyEvent, ctrl: bool) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('/') => self.open_search(),
            KeyCode::Char('u') if ctrl => self.clear_search(),
            KeyCode::Char('w') => self.open_cloud(),
            KeyCode::Down | KeyCode::Char('j') => {
                self.list.select_next();
                self.ensure_card_visible(self.list.selected());
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.list.select_prev();
                self.ensure_card_visible(self.list.selected());
            }
            KeyCode::Enter => self.click_card(self.list.selected(), CardRegion::Body),
            KeyCode::Char('s') => self.click_card(self.list.selected(), CardRegion::SourceBadge),
            KeyCode::Char('x') => {
                let selected = self.list.selected();
                if self.list.cards().get(selected).is_some_and(|c| c.expanded) {
                    self.click_card(selected, CardRegion::Close);
                }
            }
            KeyCode::Char('o') => {
                let selected = self.list.selected();
                if self.list.cards().get(selected).is_some_and(|c| c.expanded) {
                    self.click_card(selected, CardRegion::ReadWhole);
                }
            }
            KeyCode::Left | KeyCode::Char('[') => self.go_page(PageControl::Prev),
            KeyCode::Right | KeyCode::Char(']') => self.go_page(PageControl::Next),
            KeyCode::PageDown | KeyCode::Char(' ') => {
                let step = self.hits.content.height.max(1);
                self.scroll_by(i32::from(step));
            }
            KeyCode::PageUp => {
                let step = self.hits.content.height.max(1);
                self.scroll_by(-i32::from(step));
            }
            KeyCode::Home => self.scroll_to(0),
            KeyCode::End => self.scroll_to(self.doc_height),
            _ => {}
        }
    }

    fn handle_cloud_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') => self.show_articles(&LaunchParams::default()),
            KeyCode::Right | KeyCode::Down | KeyCode::Char('l') | KeyCode::Char('j') => {
                self.cloud.select_next(true)
            }
            KeyCode::Left | KeyCode::Up | KeyCode::Char('k') => self.cloud.select_next(false),
            KeyCode::Enter => self.open_selected_word(),
            KeyCode::Char('s') | KeyCode::Char('S') => {
                let forward = key.code == KeyCode::Char('s');
                self.cloud.controls.cycle_source(&self.options, forward);
                self.cloud.request(&self.api, &self.runtime);
            }
            KeyCode::Char('t') | KeyCode::Char('T') => {
                let forward = key.code == KeyCode::Char('t');
                self.cloud.controls.cycle_topic(&self.options, forward);
                self.cloud.request(&self.api, &self.runtime);
            }
            _ => {}
        }
        self.status = format!("Word cloud | {}", self.cloud.controls.describe());
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (col, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::ScrollDown if self.page == Page::Articles => {
                self.scroll_by(i32::from(WHEEL_STEP));
            }
            MouseEventKind::ScrollUp if self.page == Page::Articles => {
                self.scroll_by(-i32::from(WHEEL_STEP));
            }
            MouseEventKind::Down(MouseButton::Left) => self.handle_click(col, row),
            _ => {}
        }
    }

    fn handle_click(&mut self, col: u16, row: u16) {
        self.needs_draw = true;
        if self.show_help {
            self.show_help = false;
            return;
        }
        if self.input_mode == InputMode::DateRange {
            return;
        }

        let bar_control = if contains(self.hits.bar, col, row) && row == self.hits.bar.y {
            self.hits
                .bar_hits
                .iter()
                .find(|(span, _)| span.contains(&(col - self.hits.bar.x)))
                .map(|(_, c)| *c)
        } else {
            None
        };

        if self.chrome.drawer.is_open() {
            if bar_control == Some(BarControl::Menu) {
                self.chrome.drawer.on_click(DrawerClick::Hamburger);
                return;
            }
            match self.hits.drawer {
                Some(rect) if contains(rect, col, row) => {
                    self.chrome.drawer.on_click(DrawerClick::Inside);
                    let item_row = row.saturating_sub(rect.y + 1) as usize;
                    let idx = self.hits.drawer_offset + item_row;
                    if row > rect.y
                        && let Some(item) = self.drawer_items().get(idx).cloned()
                        && item.is_selectable()
                    {
                        self.drawer_cursor = idx;
                        self.select_drawer_item(item);
                    }
                }
                _ => self.chrome.drawer.on_click(DrawerClick::Outside),
            }
            return;
        }

        if self.input_mode == InputMode::Keyword && bar_control != Some(BarControl::SearchInput) {
            self.chrome.blur_search();
            self.input_mode = InputMode::Browse;
        }

        if let Some(control) = bar_control {
            match control {
                BarControl::Menu => self.chrome.drawer.on_click(DrawerClick::Hamburger),
                BarControl::Home => self.home(),
                BarControl::SearchIcon | BarControl::SearchInput => self.open_search(),
                BarControl::ClearSearch => self.clear_search(),
            }
            return;
        }

        match self.page {
            Page::Articles => self.click_document(col, row),
            Page::WordCloud => self.click_cloud(col, row),
        }
    }

    fn click_document(&mut self, col: u16, row: u16) {
        let content = self.hits.content;
        if !contains(content, col, row) {
            return;
        }
        let doc_row = (row - content.y + self.scroll) as usize;
        let local_col = col - content.x;
        match self.hits.doc.get(doc_row).copied() {
            Some(DocRow::Card(index, card_row)) => {
                let region = self
                    .hits
                    .cards
                    .get(index)
                    .map(|layout| layout.region_at(card_row, local_col))
                    .unwrap_or(CardRegion::Body);
                self.click_card(index, region);
            }
            Some(DocRow::Pagination) => {
                if let Some(control) = self
                    .hits
                    .pagination
                    .as_ref()
                    .and_then(|p| p.control_at(local_col))
                {
                    self.go_page(control);
                }
            }
            _ => {}
        }
    }

    fn click_cloud(&mut self, col: u16, row: u16) {
        if row == self.hits.cloud_controls_row {
            let control = self
                .hits
                .cloud_controls
                .iter()
                .find(|(span, _)| span.contains(&col))
                .map(|(_, c)| *c);
            match control {
                Some(CloudControl::Source) => {
                    self.cloud.controls.cycle_source(&self.options, true);
                    self.cloud.request(&self.api, &self.runtime);
                }
                Some(CloudControl::Topic) => {
                    self.cloud.controls.cycle_topic(&self.options, true);
                    self.cloud.request(&self.api, &self.runtime);
                }
                Some(CloudControl::Dates) => self.open_date_prompt(),
                None => {}
            }
            return;
        }
        let area = self.hits.cloud_area;
        if contains(area, col, row)
            && self
                .cloud
                .select_at(col - area.x, row - area.y)
                .is_some()
        {
            self.open_selected_word();
        }
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let area = f.area();
        self.viewport = area;
        let palette = self.theme.to_palette();
        f.render_widget(
            Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)),
            area,
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Length(BAR_HEIGHT), // sticky bar
                    Constraint::Min(0),             // document / cloud
                    Constraint::Length(1),          // footer
                ]
                .as_ref(),
            )
            .split(area);

        let bar = sticky_bar(
            chunks[0].width,
            palette,
            self.chrome.title_visible() || self.page == Page::WordCloud,
            if self.page == Page::Articles {
                self.chrome.search
            } else {
                Default::default()
            },
            &self.filters.state().keyword,
            self.chrome.sticky.is_scrolled(),
            self.chrome.sticky.menu_accent(self.chrome.drawer),
        );
        self.hits.bar = chunks[0];
        self.hits.bar_hits = bar.hits;
        f.render_widget(bar.paragraph, chunks[0]);

        self.hits.content = chunks[1];
        match self.page {
            Page::Articles => self.draw_articles(f, chunks[1], palette),
            Page::WordCloud => self.draw_cloud(f, chunks[1], palette),
        }

        let footer = Line::from(vec![
            Span::styled(self.status.clone(), palette.title_subtle()),
            Span::raw("  "),
            Span::styled(footer_legend(self.show_help), palette.hint_style()),
        ]);
        f.render_widget(Paragraph::new(footer), chunks[2]);

        if self.chrome.drawer.is_open() {
            self.draw_drawer(f, chunks[1], palette);
        } else {
            self.hits.drawer = None;
        }
        if self.input_mode == InputMode::DateRange {
            self.draw_date_prompt(f, palette);
        }
        if self.show_help {
            render_help_overlay(f, palette, self.help_scroll);
        }
        self.needs_draw = false;
    }

    fn header_lines(&self, palette: ThemePalette) -> Vec<Line<'static>> {
        let state = self.filters.state();
        let mut chips: Vec<Span<'static>> = Vec::new();
        if state.topic != ALL {
            chips.push(Span::styled(format!("[topic:{}]", state.topic), chip_style(palette)));
            chips.push(Span::raw(" "));
        }
        if state.source != ALL {
            chips.push(Span::styled(format!("[source:{}]", state.source), chip_style(palette)));
            chips.push(Span::raw(" "));
        }
        if !state.keyword_trimmed().is_empty() {
            chips.push(Span::styled(
                format!("[keyword:{}]", state.keyword_trimmed()),
                chip_style(palette),
            ));
            chips.push(Span::raw(" "));
        }
        if let Some(range) = state.date_range {
            chips.push(Span::styled(format!("[{}]", range.label()), chip_style(palette)));
        }
        if chips.is_empty() {
            chips.push(Span::styled(
                "All topics, all sources (m opens the menu)",
                palette.hint_style(),
            ));
        }
        vec![
            Line::from(Span::styled(
                "  S T A T E   O F   T H E   E A R T H",
                palette.title(),
            )),
            Line::from(Span::styled(
                "  Environmental news from around the web",
                palette.hint_style(),
            )),
            Line::from([vec![Span::raw("  ")], chips].concat()),
            Line::from(""),
        ]
    }

    fn draw_articles(&mut self, f: &mut Frame, area: Rect, palette: ThemePalette) {
        let mut lines = self.header_lines(palette);
        let mut doc = vec![DocRow::Header; lines.len()];
        self.hits.cards.clear();
        self.hits.pagination = None;

        match self.fetcher.phase() {
            Phase::Loading => {
                lines.push(Line::from(Span::styled("  Loading articles…", palette.title())));
                doc.push(DocRow::Status);
            }
            Phase::FadingOut => {
                lines.push(Line::from(Span::styled(
                    "  Updating…",
                    palette.hint_style().add_modifier(Modifier::DIM),
                )));
                doc.push(DocRow::Status);
            }
            // Nothing arrived yet: the first load failed, so no placeholder either.
            Phase::Idle if self.pagination.is_none() => {}
            Phase::Idle => {
                let (card_lines, owners, layouts) = self.list.layout(area.width, palette);
                lines.extend(card_lines);
                doc.extend(owners.into_iter().map(|o| match o {
                    Some((idx, row)) => DocRow::Card(idx, row),
                    None => DocRow::Status,
                }));
                self.hits.cards = layouts;
                if let Some(p) = self.pagination.filter(|p| p.total > 0) {
                    let row = pagination_row(&p, palette);
                    lines.push(Line::from(""));
                    doc.push(DocRow::Blank);
                    lines.push(row.line.clone());
                    doc.push(DocRow::Pagination);
                    self.hits.pagination = Some(row);
                }
            }
        }

        self.doc_height = lines.len() as u16;
        self.hits.doc = doc;
        let max_scroll = self.doc_height.saturating_sub(area.height);
        if self.scroll > max_scroll {
            self.scroll_to(max_scroll);
        }
        f.render_widget(Paragraph::new(lines).scroll((self.scroll, 0)), area);
    }

    fn draw_cloud(&mut self, f: &mut Frame, area: Rect, palette: ThemePalette) {
        let controls = &self.cloud.controls;
        let dates = controls
            .date_range
            .map(|r| r.label())
            .unwrap_or_else(|| "any date".to_string());
        let parts = [
            (format!("Source: {}", controls.source), CloudControl::Source),
            (format!("Topic: {}", controls.topic), CloudControl::Topic),
            (format!("Dates: {dates}"), CloudControl::Dates),
        ];
        let mut spans = vec![Span::raw(" ")];
        let mut hits = Vec::new();
        let mut col = area.x + 1;
        for (text, control) in parts {
            let label = format!("[{text}]");
            let w = label.chars().count() as u16;
            hits.push((col..col + w, control));
            spans.push(Span::styled(label, chip_style(palette)));
            spans.push(Span::raw("  "));
            col += w + 2;
        }
        self.hits.cloud_controls = hits;
        self.hits.cloud_controls_row = area.y;

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Min(0),
                ]
                .as_ref(),
            )
            .split(area);
        f.render_widget(Paragraph::new(Line::from(spans)), rows[0]);
        f.render_widget(
            Paragraph::new(Span::styled(
                " s/t cycle source/topic • d dates • arrows pick • Enter opens articles • Esc back",
                palette.hint_style(),
            )),
            rows[1],
        );

        let cloud_area = rows[2];
        self.hits.cloud_area = cloud_area;
        self.cloud.ensure_size(cloud_area.width, cloud_area.height);
        if self.cloud.is_loading() && self.cloud.cloud().selectable().is_empty() {
            f.render_widget(
                Paragraph::new(Span::styled("  Loading word cloud…", palette.title())),
                cloud_area,
            );
        } else {
            let lines = self.cloud.cloud().lines(self.cloud.selected(), palette);
            f.render_widget(Paragraph::new(lines), cloud_area);
        }
    }

    fn draw_drawer(&mut self, f: &mut Frame, area: Rect, palette: ThemePalette) {
        let rect = Rect {
            x: area.x,
            y: area.y,
            width: DRAWER_WIDTH.min(area.width),
            height: area.height,
        };
        let items = self.drawer_items();
        let visible = rect.height.saturating_sub(2) as usize;
        let offset = self.drawer_cursor.saturating_sub(visible.saturating_sub(1));
        let state = self.filters.state();
        let lines: Vec<Line<'static>> = items
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(idx, item)| {
                let (text, active) = match item {
                    DrawerItem::Home => ("Home".to_string(), false),
                    DrawerItem::WordCloud => ("Word cloud".to_string(), self.page == Page::WordCloud),
                    DrawerItem::Header(h) => (h.to_string(), false),
                    DrawerItem::Topic(t) => (
                        if t == ALL { "All topics".to_string() } else { t.clone() },
                        *t == state.topic,
                    ),
                    DrawerItem::Source(s) => (
                        if s == ALL { "All sources".to_string() } else { s.clone() },
                        *s == state.source,
                    ),
                    DrawerItem::DateRange => (
                        state
                            .date_range
                            .map(|r| format!("Dates: {}", r.label()))
                            .unwrap_or_else(|| "Pick dates…".to_string()),
                        state.date_range.is_some(),
                    ),
                    DrawerItem::ClearDates => ("Clear dates".to_string(), false),
                };
                if let DrawerItem::Header(_) = item {
                    return Line::from(Span::styled(text, palette.title()));
                }
                let marker = if active { "● " } else { "  " };
                let style = if idx == self.drawer_cursor {
                    palette.highlight_style()
                } else if active {
                    Style::default().fg(palette.accent)
                } else {
                    Style::default().fg(palette.fg)
                };
                Line::from(Span::styled(format!("{marker}{text}"), style))
            })
            .collect();

        self.hits.drawer = Some(rect);
        self.hits.drawer_offset = offset;
        f.render_widget(Clear, rect);
        f.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .title(Span::styled("Menu", palette.title()))
                    .borders(Borders::ALL)
                    .border_style(palette.border_focus_style())
                    .style(palette.surface_style()),
            ),
            rect,
        );
    }

    fn draw_date_prompt(&self, f: &mut Frame, palette: ThemePalette) {
        let popup = centered_rect(60, 20, f.area());
        let body = vec![
            Line::from(Span::styled(
                "YYYY-MM-DD or YYYY-MM-DD..YYYY-MM-DD (empty clears)",
                palette.hint_style(),
            )),
            Line::from(vec![
                Span::styled(self.date_input.clone(), palette.title_subtle()),
                Span::styled("▏", Style::default().fg(palette.accent)),
            ]),
        ];
        f.render_widget(Clear, popup);
        f.render_widget(
            Paragraph::new(body).block(
                Block::default()
                    .title(Span::styled("Date range", palette.title()))
                    .borders(Borders::ALL)
                    .border_style(palette.border_focus_style()),
            ),
            popup,
        );
    }
}

pub fn run_tui(config: &Config, opts: TuiOptions, once: bool) -> Result<()> {
    let runtime = Handle::try_current().context("the TUI needs a tokio runtime")?;
    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;
    let api = Arc::new(HttpNewsApi::new(&config.api_url, config.timeout())?);
    let store = JsonFileStore::open(store_path_for(&data_dir));

    let state_path = state_path_for(&data_dir);
    let persisted = load_state(&state_path);
    let theme = persisted
        .theme
        .as_deref()
        .or(config.theme.as_deref())
        .map(ThemePreset::from_name)
        .unwrap_or(opts.theme);
    let opts = TuiOptions { theme, ..opts };

    if once
        && dotenvy::var("TUI_HEADLESS")
            .map(|v| v == "1")
            .unwrap_or(false)
    {
        return run_tui_headless(api, store, runtime, opts, config.timeout());
    }

    let mut app = App::new(api, store, runtime, opts);

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    tracing::info!(api = %config.api_url, "tui_start");

    let tick_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();
    let result = (|| -> Result<()> {
        loop {
            if app.needs_draw {
                terminal.draw(|f| app.draw(f))?;
            }
            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) => app.handle_key(key),
                    Event::Mouse(mouse) => app.handle_mouse(mouse),
                    Event::Resize(_, _) => app.needs_draw = true,
                    _ => {}
                }
            }
            if last_tick.elapsed() >= tick_rate {
                app.tick();
                last_tick = Instant::now();
            }
            if app.should_quit() || once {
                if once {
                    terminal.draw(|f| app.draw(f))?;
                }
                return Ok(());
            }
        }
    })();

    save_state(
        &state_path,
        &TuiStatePersisted {
            theme: Some(app.theme().name().to_string()),
        },
    );
    teardown_terminal()?;
    result
}

/// One fetch, one frame into an off-screen buffer, status to stdout.
fn run_tui_headless<S: KeyValueStore>(
    api: Arc<HttpNewsApi>,
    store: S,
    runtime: Handle,
    opts: TuiOptions,
    timeout: Duration,
) -> Result<()> {
    let opts = TuiOptions {
        browser: false,
        ..opts
    };
    let mut app = App::new(api, store, runtime, opts);
    if !app.settle(timeout) {
        anyhow::bail!("timed out waiting for the news API");
    }
    let mut terminal = Terminal::new(TestBackend::new(100, 30))?;
    terminal.draw(|f| app.draw(f))?;
    println!("{}", app.status());
    Ok(())
}

fn teardown_terminal() -> Result<()> {
    let mut stdout = io::stdout();
    disable_raw_mode()?;
    execute!(stdout, DisableMouseCapture, LeaveAlternateScreen)?;
    Ok(())
}
