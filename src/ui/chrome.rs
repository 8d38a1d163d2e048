//! Page chrome: search box, navigation drawer, sticky bar and its title.
//!
//! Each piece is a small state machine fed by input events and the list's
//! scroll offset. None of them touches filters or the network directly; the
//! event loop acts on what they return.

/// Search box at the right of the sticky bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SearchBox {
    #[default]
    Closed,
    Open {
        focused: bool,
    },
}

impl SearchBox {
    pub fn is_open(self) -> bool {
        matches!(self, SearchBox::Open { .. })
    }

    pub fn is_focused(self) -> bool {
        matches!(self, SearchBox::Open { focused: true })
    }
}

/// Where a click landed relative to the drawer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawerClick {
    Hamburger,
    Inside,
    Outside,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Drawer {
    open: bool,
}

impl Drawer {
    pub fn is_open(self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Hamburger clicks toggle and stop there; inside clicks are handled by
    /// the drawer items; outside clicks close an open drawer.
    pub fn on_click(&mut self, target: DrawerClick) {
        match target {
            DrawerClick::Hamburger => self.toggle(),
            DrawerClick::Inside => {}
            DrawerClick::Outside => {
                if self.open {
                    self.close();
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BarState {
    #[default]
    Resting,
    Scrolled,
}

/// Sticky bar with hysteresis: it only switches state when the scroll
/// direction agrees with the boundary test.
#[derive(Clone, Copy, Debug, Default)]
pub struct StickyBar {
    state: BarState,
    last_scroll: i32,
}

impl StickyBar {
    pub fn state(&self) -> BarState {
        self.state
    }

    pub fn is_scrolled(&self) -> bool {
        self.state == BarState::Scrolled
    }

    /// `bar_bottom` and `header_bottom` are viewport rows.
    pub fn on_scroll(&mut self, scroll: i32, bar_bottom: i32, header_bottom: i32) -> BarState {
        if scroll > self.last_scroll {
            if bar_bottom >= header_bottom {
                self.state = BarState::Scrolled;
            }
        } else if bar_bottom <= header_bottom {
            self.state = BarState::Resting;
        }
        self.last_scroll = scroll;
        self.state
    }

    /// The menu icon shows the open accent only while scrolled.
    pub fn menu_accent(&self, drawer: Drawer) -> bool {
        self.is_scrolled() && drawer.is_open()
    }
}

/// What the event loop must do after a chrome action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChromeEffect {
    None,
    /// Keyword cleared; fetch page 1 with an empty keyword.
    KeywordCleared,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Chrome {
    pub search: SearchBox,
    pub drawer: Drawer,
    pub sticky: StickyBar,
    title_hidden: bool,
}

impl Chrome {
    /// A launch keyword opens the search box (unfocused).
    pub fn with_launch_keyword(keyword: &str) -> Self {
        let mut chrome = Self::default();
        if !keyword.trim().is_empty() {
            chrome.search = SearchBox::Open { focused: false };
            chrome.title_hidden = true;
        }
        chrome
    }

    pub fn title_visible(&self) -> bool {
        !self.title_hidden
    }

    /// Search icon: show and focus the input, hide the title.
    pub fn open_search(&mut self) {
        self.search = SearchBox::Open { focused: true };
        self.title_hidden = true;
    }

    pub fn focus_search(&mut self) {
        if self.search.is_open() {
            self.search = SearchBox::Open { focused: true };
        } else {
            self.open_search();
        }
    }

    /// Enter blurs the input; nothing is submitted.
    pub fn blur_search(&mut self) {
        if self.search.is_open() {
            self.search = SearchBox::Open { focused: false };
        }
    }

    /// Clear control. The title comes back on wide screens or when scrolled.
    pub fn clear_search(&mut self, wide: bool) -> ChromeEffect {
        if !self.search.is_open() {
            return ChromeEffect::None;
        }
        self.search = SearchBox::Closed;
        if wide || self.sticky.is_scrolled() {
            self.title_hidden = false;
        }
        ChromeEffect::KeywordCleared
    }

    /// Picking a topic on a narrow screen hides the title to make room.
    pub fn on_topic_selected(&mut self, narrow: bool) {
        self.drawer.close();
        if narrow {
            self.title_hidden = true;
        }
    }

    pub fn on_filter_selected(&mut self) {
        self.drawer.close();
    }

    pub fn after_fetch(&mut self) {
        if !self.search.is_open() {
            self.title_hidden = false;
        }
    }

    /// Home: search box closed, drawer closed, title back, bar at rest.
    pub fn reset(&mut self) {
        self.search = SearchBox::Closed;
        self.drawer.close();
        self.title_hidden = false;
    }
}
