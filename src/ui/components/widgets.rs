use std::ops::Range;

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::ui::chrome::SearchBox;
use crate::ui::components::theme::{ThemePalette, chip_style};

pub const SITE_TITLE: &str = "State of the Earth";
pub const HAMBURGER: &str = " ☰ ";
pub const SEARCH_ICON: &str = "⌕ search";
pub const CLEAR_ICON: &str = " ✕ ";

/// Controls on the sticky bar's content row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BarControl {
    Menu,
    Home,
    SearchIcon,
    SearchInput,
    ClearSearch,
}

pub struct BarView<'a> {
    pub paragraph: Paragraph<'a>,
    pub hits: Vec<(Range<u16>, BarControl)>,
}

impl BarView<'_> {
    pub fn control_at(&self, col: u16) -> Option<BarControl> {
        self.hits
            .iter()
            .find(|(span, _)| span.contains(&col))
            .map(|(_, c)| *c)
    }
}

/// The sticky bar: menu, title, search. `width` is the inner width.
pub fn sticky_bar(
    width: u16,
    palette: ThemePalette,
    title_visible: bool,
    search: SearchBox,
    keyword: &str,
    scrolled: bool,
    menu_accent: bool,
) -> BarView<'static> {
    let mut hits = Vec::new();
    let mut left: Vec<Span<'static>> = Vec::new();
    let menu_style = if menu_accent {
        palette.highlight_style()
    } else {
        palette.title()
    };
    left.push(Span::styled(HAMBURGER, menu_style));
    let mut col = HAMBURGER.chars().count() as u16;
    hits.push((0..col, BarControl::Menu));
    if title_visible {
        left.push(Span::raw(" "));
        col += 1;
        let title_width = SITE_TITLE.chars().count() as u16;
        hits.push((col..col + title_width, BarControl::Home));
        left.push(Span::styled(SITE_TITLE, palette.title()));
        col += title_width;
    }

    let mut right: Vec<Span<'static>> = Vec::new();
    let mut right_hits: Vec<(u16, BarControl)> = Vec::new();
    match search {
        SearchBox::Closed => {
            right_hits.push((SEARCH_ICON.chars().count() as u16, BarControl::SearchIcon));
            right.push(Span::styled(SEARCH_ICON, palette.hint_style()));
        }
        SearchBox::Open { focused } => {
            let field_width = width.saturating_sub(col + 6).clamp(8, 32) as usize;
            let shown: String = {
                let chars: Vec<char> = keyword.chars().collect();
                let skip = chars.len().saturating_sub(field_width - 1);
                chars[skip..].iter().collect()
            };
            let cursor = if focused { "▏" } else { " " };
            let field = format!("{shown}{cursor}");
            let field = format!("{field:<field_width$}");
            let style = if focused {
                Style::default()
                    .fg(palette.fg)
                    .bg(palette.surface)
                    .add_modifier(Modifier::BOLD)
            } else {
                chip_style(palette)
            };
            right_hits.push((field.chars().count() as u16, BarControl::SearchInput));
            right.push(Span::styled(field, style));
            right_hits.push((CLEAR_ICON.chars().count() as u16, BarControl::ClearSearch));
            right.push(Span::styled(CLEAR_ICON, Style::default().fg(palette.error)));
        }
    }

    let right_width: u16 = right_hits.iter().map(|(w, _)| *w).sum();
    let gap = width.saturating_sub(col + right_width);
    let mut spans = left;
    spans.push(Span::raw(" ".repeat(gap as usize)));
    let mut x = col + gap;
    for (w, control) in right_hits {
        hits.push((x..x + w, control));
        x += w;
    }
    spans.extend(right);

    let block = Block::default()
        .borders(if scrolled {
            Borders::BOTTOM
        } else {
            Borders::NONE
        })
        .border_style(palette.border_style())
        .style(Style::default().bg(if scrolled { palette.surface } else { palette.bg }));

    BarView {
        paragraph: Paragraph::new(Line::from(spans)).block(block),
        hits,
    }
}
