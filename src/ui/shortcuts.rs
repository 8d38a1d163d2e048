//! Keyboard shortcut constants for consistent documentation.

pub const HELP: &str = "F1";
pub const THEME: &str = "F2";
pub const MENU: &str = "m/F3";
pub const SEARCH: &str = "/";
pub const CLEAR_SEARCH: &str = "Ctrl+U";
pub const DATE_RANGE: &str = "d";
pub const WORD_CLOUD: &str = "w";
pub const HOME: &str = "h/Ctrl+Del";
pub const QUIT: &str = "Esc/F10";

// Cards
pub const TOGGLE_CARD: &str = "Enter";
pub const SOURCE_LINK: &str = "s";
pub const CLOSE_CARD: &str = "x";
pub const READ_WHOLE: &str = "o";

// Pages
pub const PREV_PAGE: &str = "Left/[";
pub const NEXT_PAGE: &str = "Right/]";

// Navigation
pub const MOVE: &str = "Up/Down";
pub const SCROLL: &str = "PgUp/PgDn";
pub const JUMP: &str = "Home/End";

// Word cloud
pub const CLOUD_SOURCE: &str = "s/S";
pub const CLOUD_TOPIC: &str = "t/T";
pub const CLOUD_OPEN_WORD: &str = "Enter";
