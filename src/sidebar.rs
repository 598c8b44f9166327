//! Sidebar open state with cookie persistence.
//!
//! Desktop viewports switch between expanded and collapsed. Mobile viewports
//! show the sidebar as an overlay with its own visibility flag, so opening
//! the overlay never changes the persisted desktop state.

use std::fmt;

/// Cookie holding the desktop sidebar state.
pub const COOKIE_NAME: &str = "sidebar_state";

/// Cookie lifetime in seconds (seven days).
pub const COOKIE_MAX_AGE: u64 = 60 * 60 * 24 * 7;

/// Key toggling the sidebar together with Ctrl or Cmd.
pub const SHORTCUT_KEY: char = 'b';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarState {
    Expanded,
    Collapsed,
}

impl SidebarState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SidebarState::Expanded => "expanded",
            SidebarState::Collapsed => "collapsed",
        }
    }
}

/// `Set-Cookie` value persisting the desktop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidebarCookie {
    pub open: bool,
}

impl fmt::Display for SidebarCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}; path=/; max-age={}",
            COOKIE_NAME, self.open, COOKIE_MAX_AGE
        )
    }
}

/// Outcome of a key press offered to [`Sidebar::handle_shortcut`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Not the toggle shortcut; state unchanged.
    Ignored,
    /// Sidebar toggled. Carries the cookie to persist on desktop, `None`
    /// when only the mobile overlay changed.
    Toggled(Option<SidebarCookie>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sidebar {
    open: bool,
    open_mobile: bool,
    is_mobile: bool,
}

impl Sidebar {
    /// Creates sidebar with the given desktop state, overlay closed.
    pub fn new(open: bool) -> Self {
        Self {
            open,
            open_mobile: false,
            is_mobile: false,
        }
    }

    /// Restores desktop state from a `Cookie` request header.
    ///
    /// Falls back to `default_open` when the cookie is absent or holds
    /// anything other than `true` or `false`.
    pub fn from_cookie_header(header: &str, default_open: bool) -> Self {
        let open = header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == COOKIE_NAME)
            .and_then(|(_, value)| value.trim().parse::<bool>().ok())
            .unwrap_or(default_open);

        Self::new(open)
    }

    pub fn state(&self) -> SidebarState {
        if self.open {
            SidebarState::Expanded
        } else {
            SidebarState::Collapsed
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open_mobile(&self) -> bool {
        self.open_mobile
    }

    pub fn is_mobile(&self) -> bool {
        self.is_mobile
    }

    /// Sets the desktop state and returns the cookie to persist it.
    pub fn set_open(&mut self, open: bool) -> SidebarCookie {
        self.open = open;
        log::debug!("Sidebar {}", self.state().as_str());
        SidebarCookie { open }
    }

    pub fn set_open_mobile(&mut self, open: bool) {
        self.open_mobile = open;
    }

    /// Records the viewport kind. Leaving mobile closes the overlay.
    pub fn set_mobile(&mut self, is_mobile: bool) {
        self.is_mobile = is_mobile;
        if !is_mobile {
            self.open_mobile = false;
        }
    }

    /// Toggles the overlay on mobile, the desktop state otherwise.
    ///
    /// # Returns
    ///
    /// Cookie to persist when the desktop state changed
    pub fn toggle(&mut self) -> Option<SidebarCookie> {
        if self.is_mobile {
            self.open_mobile = !self.open_mobile;
            None
        } else {
            Some(self.set_open(!self.open))
        }
    }

    /// Handles a key press, toggling on Ctrl+B or Cmd+B.
    pub fn handle_shortcut(&mut self, key: char, ctrl: bool, meta: bool) -> Shortcut {
        if (ctrl || meta) && key.eq_ignore_ascii_case(&SHORTCUT_KEY) {
            Shortcut::Toggled(self.toggle())
        } else {
            Shortcut::Ignored
        }
    }
}

impl Default for Sidebar {
    fn default() -> Self {
        Self::new(true)
    }
}
