//! Word-cloud page: word frequencies drawn as a cloud whose words drill into
//! the article list.
//!
//! Sizes and colors follow the browser version: a square-root font scale over
//! `[1, max]` and a linear light-to-dark green ramp. Terminal cells are mapped
//! to nominal pixels so the same ranges apply.

use std::sync::Arc;
use std::time::Duration;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use tokio::runtime::Handle;

use crate::api::{ApiError, NewsApi, WordQuery};
use crate::fetcher::RequestLane;
use crate::filters::store::{KEY_KEYWORD, KEY_SOURCE, KEY_TOPIC, KeyValueStore};
use crate::filters::{
    ALL, DateRange, LaunchParams, normalize_choice, persist_choice, persist_date_range,
    restore_date_range,
};
use crate::model::types::{FilterOptions, WordRecord};
use crate::ui::components::theme::{TerminalWidth, ThemePalette};

pub const DESKTOP_WORD_TARGET: usize = 250;
pub const NARROW_WORD_TARGET: usize = 150;
pub const PLACEHOLDER_GLYPH: &str = "·";
/// Nominal pixel size of one terminal cell.
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

pub const COLOR_LIGHT: (u8, u8, u8) = (0xA9, 0xD8, 0xB8);
pub const COLOR_DARK: (u8, u8, u8) = (0x00, 0x5F, 0x00);

pub fn word_target(cols: u16) -> usize {
    if TerminalWidth::from_cols(cols).is_narrow() {
        NARROW_WORD_TARGET
    } else {
        DESKTOP_WORD_TARGET
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CloudWord {
    pub text: String,
    pub frequency: u32,
    pub placeholder: bool,
}

/// Pads with `size = 1` placeholders up to `target`, then truncates to it.
pub fn pad_words(words: Vec<WordRecord>, target: usize) -> Vec<CloudWord> {
    let mut out: Vec<CloudWord> = words
        .into_iter()
        .take(target)
        .map(|w| CloudWord {
            text: w.text,
            frequency: w.size,
            placeholder: false,
        })
        .collect();
    while out.len() < target {
        out.push(CloudWord {
            text: format!("placeholder{}", out.len()),
            frequency: 1,
            placeholder: true,
        });
    }
    out
}

/// `d3.scaleSqrt` equivalent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SqrtScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl SqrtScale {
    pub fn apply(&self, x: f64) -> f64 {
        let (d0, d1) = (self.domain.0.sqrt(), self.domain.1.sqrt());
        let (r0, r1) = self.range;
        if (d1 - d0).abs() < f64::EPSILON {
            return (r0 + r1) / 2.0;
        }
        r0 + (x.max(0.0).sqrt() - d0) / (d1 - d0) * (r1 - r0)
    }
}

/// Linear RGB interpolation over a numeric domain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorScale {
    pub domain: (f64, f64),
    pub from: (u8, u8, u8),
    pub to: (u8, u8, u8),
}

impl ColorScale {
    pub fn apply(&self, x: f64) -> (u8, u8, u8) {
        let (d0, d1) = self.domain;
        let t = if (d1 - d0).abs() < f64::EPSILON {
            0.5
        } else {
            (x - d0) / (d1 - d0)
        };
        let lerp = |a: u8, b: u8| -> u8 {
            (f64::from(a) + (f64::from(b) - f64::from(a)) * t)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        (
            lerp(self.from.0, self.to.0),
            lerp(self.from.1, self.to.1),
            lerp(self.from.2, self.to.2),
        )
    }
}

/// Font-size range for a `width` x `height` pixel canvas.
pub fn font_range(width: f64, height: f64) -> (f64, f64) {
    ((width / 120.0).max(2.0), (height / 8.0).min(width / 15.0))
}

#[derive(Clone, Debug, PartialEq)]
pub struct SizedWord {
    pub text: String,
    pub frequency: u32,
    pub font_size: f64,
    pub color: (u8, u8, u8),
    pub placeholder: bool,
}

impl SizedWord {
    /// Width in cells when drawn.
    pub fn cell_width(&self) -> u16 {
        if self.placeholder {
            PLACEHOLDER_GLYPH.chars().count() as u16
        } else {
            self.text.chars().count().max(1) as u16
        }
    }
}

/// Scales padded words for a canvas of `cols` x `rows` cells.
pub fn size_words(words: Vec<CloudWord>, cols: u16, rows: u16) -> Vec<SizedWord> {
    let max_frequency = words.iter().map(|w| w.frequency).max().unwrap_or(1).max(1);
    let width = f64::from(cols) * CELL_WIDTH_PX;
    let height = f64::from(rows) * CELL_HEIGHT_PX;
    let domain = (1.0, f64::from(max_frequency));
    let font = SqrtScale {
        domain,
        range: font_range(width, height),
    };
    let color = ColorScale {
        domain,
        from: COLOR_LIGHT,
        to: COLOR_DARK,
    };
    words
        .into_iter()
        .map(|w| {
            let f = f64::from(w.frequency);
            SizedWord {
                font_size: font.apply(f),
                color: color.apply(f),
                text: w.text,
                frequency: w.frequency,
                placeholder: w.placeholder,
            }
        })
        .collect()
}

/// A word's cell position in the cloud.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedWord {
    /// Index into the sized word list.
    pub index: usize,
    pub x: u16,
    pub y: u16,
    pub width: u16,
}

/// Places sized words on a `width` x `height` grid. Words that do not fit
/// are left out.
pub trait CloudLayout {
    fn place(&self, words: &[SizedWord], width: u16, height: u16) -> Vec<PlacedWord>;
}

/// Largest words first, first-fit into rows; rows are filled from the middle
/// outwards and centred horizontally.
#[derive(Clone, Copy, Debug)]
pub struct ShelfLayout {
    pub padding: u16,
}

impl Default for ShelfLayout {
    fn default() -> Self {
        Self { padding: 1 }
    }
}

impl CloudLayout for ShelfLayout {
    fn place(&self, words: &[SizedWord], width: u16, height: u16) -> Vec<PlacedWord> {
        if width == 0 || height == 0 {
            return Vec::new();
        }
        let mut order: Vec<usize> = (0..words.len()).collect();
        order.sort_by(|a, b| words[*b].font_size.total_cmp(&words[*a].font_size));

        // (used width, members)
        let mut rows: Vec<(u16, Vec<(usize, u16)>)> = Vec::new();
        for idx in order {
            let w = words[idx].cell_width();
            if w > width {
                continue;
            }
            let slot = rows.iter().position(|(used, members)| {
                let gap = if members.is_empty() { 0 } else { self.padding };
                used + gap + w <= width
            });
            let slot = match slot {
                Some(s) => s,
                None if rows.len() < height as usize => {
                    rows.push((0, Vec::new()));
                    rows.len() - 1
                }
                None => continue,
            };
            let (used, members) = &mut rows[slot];
            let gap = if members.is_empty() { 0 } else { self.padding };
            members.push((idx, *used + gap));
            *used += gap + w;
        }

        let ys = center_out(height);
        let mut placed = Vec::new();
        for ((used, members), y) in rows.into_iter().zip(ys) {
            let left = (width - used) / 2;
            for (index, offset) in members {
                placed.push(PlacedWord {
                    index,
                    x: left + offset,
                    y,
                    width: words[index].cell_width(),
                });
            }
        }
        placed.sort_by_key(|p| (p.y, p.x));
        placed
    }
}

/// Row order `mid, mid-1, mid+1, mid-2, ...` covering `0..height`.
fn center_out(height: u16) -> Vec<u16> {
    let mid = height.saturating_sub(1) / 2;
    let mut ys = vec![mid];
    for step in 1..height {
        if let Some(up) = mid.checked_sub(step) {
            ys.push(up);
        }
        if mid + step < height {
            ys.push(mid + step);
        }
    }
    ys
}

/// Emphasis tier by relative font size: 0 (smallest) to 2 (largest).
fn tier(word: &SizedWord, range: (f64, f64)) -> u8 {
    let span = range.1 - range.0;
    if span <= f64::EPSILON {
        return 1;
    }
    let t = (word.font_size - range.0) / span;
    if t >= 0.66 {
        2
    } else if t >= 0.33 {
        1
    } else {
        0
    }
}

/// A laid-out cloud ready to draw.
#[derive(Clone, Debug, Default)]
pub struct PreparedCloud {
    pub words: Vec<SizedWord>,
    pub placed: Vec<PlacedWord>,
    pub width: u16,
    pub height: u16,
}

impl PreparedCloud {
    pub fn build(
        records: &[WordRecord],
        width: u16,
        height: u16,
        layout: &dyn CloudLayout,
    ) -> Self {
        let padded = pad_words(records.to_vec(), word_target(width));
        let words = size_words(padded, width, height);
        let placed = layout.place(&words, width, height);
        Self {
            words,
            placed,
            width,
            height,
        }
    }

    /// Indices into `placed` of real (non-placeholder) words, in reading order.
    pub fn selectable(&self) -> Vec<usize> {
        self.placed
            .iter()
            .enumerate()
            .filter(|(_, p)| !self.words[p.index].placeholder)
            .map(|(i, _)| i)
            .collect()
    }

    /// Real word under a cell, if any.
    pub fn word_at(&self, x: u16, y: u16) -> Option<usize> {
        self.placed
            .iter()
            .position(|p| p.y == y && x >= p.x && x < p.x + p.width)
            .filter(|i| !self.words[self.placed[*i].index].placeholder)
    }

    pub fn text_of(&self, placed_idx: usize) -> Option<&str> {
        self.placed
            .get(placed_idx)
            .map(|p| self.words[p.index].text.as_str())
    }

    pub fn lines(&self, selected: Option<usize>, palette: ThemePalette) -> Vec<Line<'static>> {
        let range = font_range(
            f64::from(self.width) * CELL_WIDTH_PX,
            f64::from(self.height) * CELL_HEIGHT_PX,
        );
        let mut lines = Vec::with_capacity(self.height as usize);
        for y in 0..self.height {
            let mut spans = Vec::new();
            let mut col = 0u16;
            for (i, p) in self.placed.iter().enumerate().filter(|(_, p)| p.y == y) {
                if p.x > col {
                    spans.push(Span::raw(" ".repeat((p.x - col) as usize)));
                }
                let word = &self.words[p.index];
                let (r, g, b) = word.color;
                let (text, style) = if word.placeholder {
                    (
                        PLACEHOLDER_GLYPH.to_string(),
                        Style::default().fg(palette.hint).add_modifier(Modifier::DIM),
                    )
                } else {
                    let base = Style::default().fg(Color::Rgb(r, g, b));
                    let style = match tier(word, range) {
                        2 => base.add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                        1 => base.add_modifier(Modifier::BOLD),
                        _ => base,
                    };
                    (word.text.clone(), style)
                };
                let style = if selected == Some(i) {
                    palette.highlight_style()
                } else {
                    style
                };
                spans.push(Span::styled(text, style));
                col = p.x + p.width;
            }
            lines.push(Line::from(spans));
        }
        lines
    }
}

/// Source/topic/date controls of the cloud page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloudControls {
    pub source: String,
    pub topic: String,
    pub date_range: Option<DateRange>,
}

impl Default for CloudControls {
    fn default() -> Self {
        Self {
            source: ALL.to_string(),
            topic: ALL.to_string(),
            date_range: None,
        }
    }
}

fn cycle(current: &str, choices: &[String], forward: bool) -> String {
    let mut all = Vec::with_capacity(choices.len() + 1);
    all.push(ALL.to_string());
    all.extend(choices.iter().cloned());
    let pos = all.iter().position(|c| c == current).unwrap_or(0);
    let next = if forward {
        (pos + 1) % all.len()
    } else {
        (pos + all.len() - 1) % all.len()
    };
    all.swap_remove(next)
}

impl CloudControls {
    pub fn restore(store: &impl KeyValueStore) -> Self {
        Self {
            source: normalize_choice(&store.get(KEY_SOURCE).unwrap_or_default()),
            topic: normalize_choice(&store.get(KEY_TOPIC).unwrap_or_default()),
            date_range: restore_date_range(store),
        }
    }

    pub fn query(&self) -> WordQuery {
        WordQuery {
            source: self.source.clone(),
            topic: self.topic.clone(),
            start_date: self.date_range.map(|r| r.start_param()),
            end_date: self.date_range.map(|r| r.end_param()),
        }
    }

    pub fn cycle_source(&mut self, options: &FilterOptions, forward: bool) {
        self.source = cycle(&self.source, &options.sources, forward);
    }

    pub fn cycle_topic(&mut self, options: &FilterOptions, forward: bool) {
        self.topic = cycle(&self.topic, &options.topics, forward);
    }

    /// Word click: persist the page's filters plus the word as keyword and
    /// return the article-list parameters to open.
    pub fn navigate(&self, word: &str, store: &mut impl KeyValueStore) -> LaunchParams {
        persist_choice(store, KEY_SOURCE, &self.source);
        persist_choice(store, KEY_TOPIC, &self.topic);
        persist_choice(store, KEY_KEYWORD, word);
        persist_date_range(store, self.date_range);
        let keep = |v: &str| (v != ALL).then(|| v.to_string());
        let params = LaunchParams {
            topic: keep(&self.topic),
            source: keep(&self.source),
            keyword: Some(word.to_string()),
        };
        tracing::info!(word, link = %params.to_query(), "cloud_navigate");
        params
    }

    pub fn describe(&self) -> String {
        let dates = self
            .date_range
            .map(|r| r.label())
            .unwrap_or_else(|| "any date".to_string());
        format!("source: {} | topic: {} | {dates}", self.source, self.topic)
    }
}

/// State of the word-cloud page.
pub struct WordCloudPage {
    pub controls: CloudControls,
    records: Vec<WordRecord>,
    cloud: PreparedCloud,
    selected: Option<usize>,
    lane: RequestLane<Result<Vec<WordRecord>, ApiError>>,
    loading: bool,
    layout: Box<dyn CloudLayout + Send>,
}

impl WordCloudPage {
    pub fn new(controls: CloudControls) -> Self {
        Self::with_layout(controls, Box::new(ShelfLayout::default()))
    }

    pub fn with_layout(controls: CloudControls, layout: Box<dyn CloudLayout + Send>) -> Self {
        Self {
            controls,
            records: Vec::new(),
            cloud: PreparedCloud::default(),
            selected: None,
            lane: RequestLane::new("word-data"),
            loading: false,
            layout,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn cloud(&self) -> &PreparedCloud {
        &self.cloud
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn request<A: NewsApi>(&mut self, api: &Arc<A>, runtime: &Handle) -> u64 {
        let api = Arc::clone(api);
        let query = self.controls.query();
        self.loading = true;
        let generation = self
            .lane
            .spawn(runtime, async move { api.word_data(&query).await });
        tracing::info!(generation, controls = %self.controls.describe(), "fetch_word_data");
        generation
    }

    /// Applies the newest answer; returns true when the view changed.
    pub fn poll(&mut self) -> bool {
        match self.lane.poll_latest() {
            Some(outcome) => {
                self.apply(outcome);
                true
            }
            None => false,
        }
    }

    pub fn wait(&mut self, timeout: Duration) -> bool {
        match self.lane.wait_latest(timeout) {
            Some(outcome) => {
                self.apply(outcome);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, outcome: Result<Vec<WordRecord>, ApiError>) {
        self.loading = false;
        match outcome {
            Ok(records) => {
                tracing::info!(words = records.len(), "word_data_loaded");
                self.records = records;
                let (w, h) = (self.cloud.width, self.cloud.height);
                self.relayout(w, h);
            }
            Err(err) => tracing::error!("Error loading word data: {err}"),
        }
    }

    /// Re-runs sizing and layout for a new canvas size.
    pub fn relayout(&mut self, width: u16, height: u16) {
        self.cloud = PreparedCloud::build(&self.records, width, height, self.layout.as_ref());
        self.selected = self.cloud.selectable().first().copied();
    }

    pub fn ensure_size(&mut self, width: u16, height: u16) {
        if self.cloud.width != width || self.cloud.height != height {
            self.relayout(width, height);
        }
    }

    pub fn select_next(&mut self, forward: bool) {
        let selectable = self.cloud.selectable();
        if selectable.is_empty() {
            self.selected = None;
            return;
        }
        let pos = self
            .selected
            .and_then(|s| selectable.iter().position(|i| *i == s))
            .unwrap_or(0);
        let next = if forward {
            (pos + 1) % selectable.len()
        } else {
            (pos + selectable.len() - 1) % selectable.len()
        };
        self.selected = Some(selectable[next]);
    }

    pub fn select_at(&mut self, x: u16, y: u16) -> Option<String> {
        let idx = self.cloud.word_at(x, y)?;
        self.selected = Some(idx);
        self.cloud.text_of(idx).map(str::to_string)
    }

    pub fn selected_word(&self) -> Option<String> {
        self.selected
            .and_then(|i| self.cloud.text_of(i))
            .map(str::to_string)
    }
}
