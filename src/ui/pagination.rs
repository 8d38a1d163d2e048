//! Sliding page-number window with prev/next controls.

use std::ops::{Range, RangeInclusive};

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::ui::components::theme::ThemePalette;

/// Pages on either side of the current one.
pub const WINDOW_HALF: u32 = 2;
pub const MAX_VISIBLE_PAGES: u32 = WINDOW_HALF * 2 + 1;

/// Visible page numbers for `current` of `total`. Empty when `total == 0`.
///
/// Near the first page the window is `1..=min(total, 5)`; near the last it is
/// `max(1, total - 4)..=total`; otherwise it is centred on `current`.
pub fn page_window(current: u32, total: u32) -> RangeInclusive<u32> {
    let mut start = current.saturating_sub(WINDOW_HALF).max(1);
    let mut end = total.min(current.saturating_add(WINDOW_HALF));
    if current <= WINDOW_HALF {
        end = total.min(MAX_VISIBLE_PAGES);
    } else if current.saturating_add(WINDOW_HALF) >= total {
        start = total.saturating_add(1).saturating_sub(MAX_VISIBLE_PAGES).max(1);
    }
    start..=end
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageControl {
    Prev,
    Next,
    Number(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub current: u32,
    pub total: u32,
}

impl Pagination {
    pub fn new(current: u32, total: u32) -> Self {
        Self { current, total }
    }

    pub fn window(&self) -> RangeInclusive<u32> {
        page_window(self.current, self.total)
    }

    pub fn prev_enabled(&self) -> bool {
        self.current > 1
    }

    pub fn next_enabled(&self) -> bool {
        self.current < self.total
    }

    /// Page to fetch for a control, or `None` when the control is disabled
    /// or not on screen. The active page number still re-fetches.
    pub fn target(&self, control: PageControl) -> Option<u32> {
        match control {
            PageControl::Prev => self.prev_enabled().then(|| self.current - 1),
            PageControl::Next => self.next_enabled().then(|| self.current + 1),
            PageControl::Number(n) => self.window().contains(&n).then_some(n),
        }
    }
}

/// Rendered control row plus the column span of each clickable control.
pub struct PaginationRow {
    pub line: Line<'static>,
    pub hits: Vec<(Range<u16>, PageControl)>,
}

impl PaginationRow {
    pub fn control_at(&self, col: u16) -> Option<PageControl> {
        self.hits
            .iter()
            .find(|(span, _)| span.contains(&col))
            .map(|(_, control)| *control)
    }
}

pub fn pagination_row(p: &Pagination, palette: ThemePalette) -> PaginationRow {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut hits = Vec::new();
    let mut col: u16 = 0;
    let mut push = |text: String, style: Style, control: Option<PageControl>| {
        let width = text.chars().count() as u16;
        if let Some(control) = control {
            hits.push((col..col + width, control));
        }
        col += width;
        spans.push(Span::styled(text, style));
    };

    let disabled = Style::default()
        .fg(palette.hint)
        .add_modifier(Modifier::DIM);
    let enabled = Style::default().fg(palette.fg);

    push(
        "‹ Prev".to_string(),
        if p.prev_enabled() { enabled } else { disabled },
        Some(PageControl::Prev),
    );
    for n in p.window() {
        push("  ".to_string(), Style::default(), None);
        if n == p.current {
            push(format!("[{n}]"), palette.highlight_style(), Some(PageControl::Number(n)));
        } else {
            push(format!(" {n} "), enabled, Some(PageControl::Number(n)));
        }
    }
    push("  ".to_string(), Style::default(), None);
    push(
        "Next ›".to_string(),
        if p.next_enabled() { enabled } else { disabled },
        Some(PageControl::Next),
    );

    PaginationRow {
        line: Line::from(spans),
        hits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(current: u32, total: u32) -> Vec<u32> {
        page_window(current, total).collect()
    }

    #[test]
    fn window_boundaries() {
        assert_eq!(pages(1, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(pages(10, 10), vec![6, 7, 8, 9, 10]);
        assert_eq!(pages(5, 10), vec![3, 4, 5, 6, 7]);
        assert_eq!(pages(1, 3), vec![1, 2, 3]);
        assert_eq!(pages(1, 1), vec![1]);
        assert!(pages(1, 0).is_empty());
    }

    #[test]
    fn prev_next_never_wrap() {
        let first = Pagination::new(1, 4);
        assert_eq!(first.target(PageControl::Prev), None);
        assert_eq!(first.target(PageControl::Next), Some(2));
        let last = Pagination::new(4, 4);
        assert_eq!(last.target(PageControl::Next), None);
        assert_eq!(last.target(PageControl::Number(4)), Some(4));
        assert_eq!(last.target(PageControl::Number(9)), None);
    }

    #[test]
    fn row_hits_cover_each_number() {
        let row = pagination_row(&Pagination::new(3, 8), ThemePalette::dark());
        let numbers: Vec<u32> = row
            .hits
            .iter()
            .filter_map(|(_, c)| match c {
                PageControl::Number(n) => Some(*n),
                _ => None,
            })
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert_eq!(row.control_at(0), Some(PageControl::Prev));
    }
}
