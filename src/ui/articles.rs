//! Article cards: collapsed/expanded rendering and click resolution.

use std::ops::Range;

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::model::types::{ArticleRecord, source_info};
use crate::ui::components::theme::{ThemePalette, chip_style};

pub const EMPTY_PLACEHOLDER: &str = "No articles found.";
pub const READ_WHOLE_LABEL: &str = "[ Read whole article ]";
pub const CLOSE_LABEL: &str = "[×]";
const GUTTER: u16 = 2;

/// Clickable parts of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardRegion {
    Body,
    /// Opens the outlet's homepage; never toggles the card.
    SourceBadge,
    /// Toggles exactly once; the card's own toggle does not also fire.
    Close,
    /// Opens the article; the click still reaches the card and toggles it.
    ReadWhole,
}

/// Effect of one click on a card.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CardOutcome {
    /// New expansion state when the card toggled.
    pub expanded: Option<bool>,
    pub open_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArticleCard {
    pub record: ArticleRecord,
    pub expanded: bool,
}

impl ArticleCard {
    pub fn new(record: ArticleRecord) -> Self {
        Self {
            record,
            expanded: false,
        }
    }

    fn toggle(&mut self) -> Option<bool> {
        self.expanded = !self.expanded;
        Some(self.expanded)
    }

    pub fn click(&mut self, region: CardRegion) -> CardOutcome {
        match region {
            CardRegion::Body | CardRegion::Close => CardOutcome {
                expanded: self.toggle(),
                open_url: None,
            },
            CardRegion::SourceBadge => CardOutcome {
                expanded: None,
                open_url: source_info(&self.record.source).map(|s| s.homepage.to_string()),
            },
            CardRegion::ReadWhole => {
                let link = self.record.link.trim();
                let open_url = (!link.is_empty()).then(|| link.to_string());
                CardOutcome {
                    expanded: self.toggle(),
                    open_url,
                }
            }
        }
    }

    /// Lines for this card at `width` columns, with click regions.
    pub fn layout(&self, width: u16, palette: ThemePalette, selected: bool) -> CardLayout {
        let mut layout = CardLayout::default();
        let text_width = width.saturating_sub(GUTTER).max(10) as usize;
        let gutter = if selected {
            Span::styled("▌ ", Style::default().fg(palette.accent))
        } else {
            Span::raw("  ")
        };
        let record = &self.record;

        // Date and source badge.
        let date = record.display_date();
        let mut spans = vec![gutter.clone(), Span::styled(date.clone(), palette.hint_style())];
        let mut col = GUTTER + date.chars().count() as u16;
        if !record.source.is_empty() {
            let badge = format!("[{}]", record.source);
            let badge_width = badge.chars().count() as u16;
            spans.push(Span::raw("  "));
            col += 2;
            layout.hit(col..col + badge_width, CardRegion::SourceBadge);
            spans.push(Span::styled(
                badge,
                chip_style(palette).add_modifier(Modifier::UNDERLINED),
            ));
        }
        layout.push(Line::from(spans));

        let title = if record.title.trim().is_empty() {
            "(untitled)"
        } else {
            record.title.trim()
        };
        for chunk in wrap_text(title, text_width) {
            layout.push(Line::from(vec![
                gutter.clone(),
                Span::styled(chunk, palette.title_subtle()),
            ]));
        }

        if !record.image.trim().is_empty() {
            layout.push(Line::from(vec![
                gutter.clone(),
                Span::styled(
                    truncate(&format!("image: {}", record.image.trim()), text_width),
                    palette.hint_style().add_modifier(Modifier::ITALIC),
                ),
            ]));
        }

        if self.expanded {
            layout.hit(
                GUTTER..GUTTER + CLOSE_LABEL.chars().count() as u16,
                CardRegion::Close,
            );
            layout.push(Line::from(vec![
                gutter.clone(),
                Span::styled(CLOSE_LABEL, Style::default().fg(palette.error)),
                Span::raw(" "),
                Span::styled("Summary", palette.title()),
            ]));
            let summary = if record.summary.trim().is_empty() {
                "No summary available."
            } else {
                record.summary.trim()
            };
            for chunk in wrap_text(summary, text_width) {
                layout.push(Line::from(vec![gutter.clone(), Span::raw(chunk)]));
            }
            layout.hit(
                GUTTER..GUTTER + READ_WHOLE_LABEL.chars().count() as u16,
                CardRegion::ReadWhole,
            );
            layout.push(Line::from(vec![
                gutter,
                Span::styled(READ_WHOLE_LABEL, palette.highlight_style()),
            ]));
        }

        layout.push(Line::from(""));
        layout
    }
}

/// Rendered lines of one card and the regions that are not plain body.
#[derive(Debug, Default)]
pub struct CardLayout {
    pub lines: Vec<Line<'static>>,
    hits: Vec<(u16, Range<u16>, CardRegion)>,
}

impl CardLayout {
    /// Registers a region on the line about to be pushed.
    fn hit(&mut self, cols: Range<u16>, region: CardRegion) {
        self.hits.push((self.lines.len() as u16, cols, region));
    }

    fn push(&mut self, line: Line<'static>) {
        self.lines.push(line);
    }

    pub fn height(&self) -> u16 {
        self.lines.len() as u16
    }

    pub fn region_at(&self, row: u16, col: u16) -> CardRegion {
        self.hits
            .iter()
            .find(|(r, cols, _)| *r == row && cols.contains(&col))
            .map(|(_, _, region)| *region)
            .unwrap_or(CardRegion::Body)
    }
}

/// The rendered article list.
#[derive(Debug, Default)]
pub struct ArticleList {
    cards: Vec<ArticleCard>,
    selected: usize,
}

impl ArticleList {
    /// Replaces any previous content.
    pub fn render(&mut self, articles: Vec<ArticleRecord>) {
        self.cards = articles.into_iter().map(ArticleCard::new).collect();
        self.selected = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn cards(&self) -> &[ArticleCard] {
        &self.cards
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select(&mut self, index: usize) {
        if !self.cards.is_empty() {
            self.selected = index.min(self.cards.len() - 1);
        }
    }

    pub fn select_next(&mut self) {
        self.select(self.selected.saturating_add(1));
    }

    pub fn select_prev(&mut self) {
        self.select(self.selected.saturating_sub(1));
    }

    pub fn click(&mut self, index: usize, region: CardRegion) -> CardOutcome {
        match self.cards.get_mut(index) {
            Some(card) => {
                self.selected = index;
                card.click(region)
            }
            None => CardOutcome::default(),
        }
    }

    /// Lines for the whole list. Returns the lines and, per line, the card
    /// index and row within that card.
    pub fn layout(
        &self,
        width: u16,
        palette: ThemePalette,
    ) -> (Vec<Line<'static>>, Vec<Option<(usize, u16)>>, Vec<CardLayout>) {
        let mut lines = Vec::new();
        let mut owners = Vec::new();
        let mut layouts = Vec::with_capacity(self.cards.len());
        if self.cards.is_empty() {
            lines.push(Line::from(Span::styled(
                EMPTY_PLACEHOLDER,
                palette.hint_style(),
            )));
            owners.push(None);
            return (lines, owners, layouts);
        }
        for (idx, card) in self.cards.iter().enumerate() {
            let card_layout = card.layout(width, palette, idx == self.selected);
            for (row, line) in card_layout.lines.iter().enumerate() {
                lines.push(line.clone().style(Style::default().bg(palette.stripe(idx))));
                owners.push(Some((idx, row as u16)));
            }
            layouts.push(card_layout);
        }
        (lines, owners, layouts)
    }
}

/// Greedy word wrap on character counts.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let current_len = current.chars().count();
        if current_len > 0 && current_len + 1 + word_len > width {
            out.push(std::mem::take(&mut current));
        }
        if word_len > width {
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(width) {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
                current = piece.iter().collect();
            }
            continue;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let keep: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{keep}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ArticleRecord {
        ArticleRecord {
            title: "Rivers run dry".into(),
            summary: "A long drought hits the basin.".into(),
            publish_date: "2024-08-02".into(),
            link: "https://example.org/rivers".into(),
            image: "https://example.org/river.jpg".into(),
            source: "Grist".into(),
        }
    }

    #[test]
    fn body_click_toggles() {
        let mut card = ArticleCard::new(record());
        assert_eq!(card.click(CardRegion::Body).expanded, Some(true));
        assert_eq!(card.click(CardRegion::Body).expanded, Some(false));
    }

    #[test]
    fn source_badge_opens_homepage_without_toggle() {
        let mut card = ArticleCard::new(record());
        let outcome = card.click(CardRegion::SourceBadge);
        assert_eq!(outcome.expanded, None);
        assert_eq!(outcome.open_url.as_deref(), Some("https://grist.org/"));
        assert!(!card.expanded);
    }

    #[test]
    fn close_collapses_exactly_once() {
        let mut card = ArticleCard::new(record());
        card.click(CardRegion::Body);
        let outcome = card.click(CardRegion::Close);
        assert_eq!(outcome.expanded, Some(false));
        assert!(!card.expanded);
    }

    #[test]
    fn read_whole_opens_link_and_toggles() {
        let mut card = ArticleCard::new(record());
        card.click(CardRegion::Body);
        let outcome = card.click(CardRegion::ReadWhole);
        assert_eq!(outcome.open_url.as_deref(), Some("https://example.org/rivers"));
        assert_eq!(outcome.expanded, Some(false));
    }

    #[test]
    fn layout_regions_resolve() {
        let mut card = ArticleCard::new(record());
        let collapsed = card.layout(60, ThemePalette::dark(), false);
        // "  August 2, 2024  [Grist]"
        assert_eq!(collapsed.region_at(0, 19), CardRegion::SourceBadge);
        assert_eq!(collapsed.region_at(0, 3), CardRegion::Body);
        assert_eq!(collapsed.height(), 4);

        card.expanded = true;
        let expanded = card.layout(60, ThemePalette::dark(), false);
        assert_eq!(expanded.region_at(3, 2), CardRegion::Close);
        let last_action_row = expanded.height() - 2;
        assert_eq!(expanded.region_at(last_action_row, 4), CardRegion::ReadWhole);
    }

    #[test]
    fn empty_list_renders_placeholder() {
        let list = ArticleList::default();
        let (lines, owners, _) = list.layout(80, ThemePalette::dark());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].to_string(), EMPTY_PLACEHOLDER);
        assert_eq!(owners, vec![None]);
    }

    #[test]
    fn render_replaces_previous_cards() {
        let mut list = ArticleList::default();
        list.render(vec![record(), record()]);
        list.click(1, CardRegion::Body);
        list.render(vec![record()]);
        assert_eq!(list.len(), 1);
        assert!(!list.cards()[0].expanded);
        assert_eq!(list.selected(), 0);
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap_text("one two three four", 9);
        assert_eq!(lines, vec!["one two", "three", "four"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }
}
