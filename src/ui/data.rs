//! Small view-state types shared by the pages.

/// What typed characters go to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Keys drive navigation.
    #[default]
    Browse,
    /// Keys edit the search keyword.
    Keyword,
    /// Keys edit the date-range prompt.
    DateRange,
}

/// Which page is on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Articles,
    WordCloud,
}

/// Rows of the drawer, top to bottom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawerItem {
    Home,
    WordCloud,
    Header(&'static str),
    Topic(String),
    Source(String),
    DateRange,
    ClearDates,
}

impl DrawerItem {
    pub fn is_selectable(&self) -> bool {
        !matches!(self, DrawerItem::Header(_))
    }
}
