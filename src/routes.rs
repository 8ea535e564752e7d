use tracing::info;

pub const HOME: &str = "/";
pub const SHOP: &str = "/shop";
pub const ABOUT: &str = "/about";
pub const CONTACT: &str = "/contact";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub name: &'static str,
    pub path: &'static str,
}

pub const NAV_LINKS: [NavLink; 4] = [
    NavLink { name: "Home", path: HOME },
    NavLink { name: "Cookies", path: SHOP },
    NavLink { name: "Our Story", path: ABOUT },
    NavLink { name: "Contact", path: CONTACT },
];

/// Performs the actual view swap. Paths are opaque strings.
pub trait Router {
    fn current(&self) -> &str;
    fn navigate(&mut self, to: &str);
}

#[derive(Debug, Clone)]
pub struct HistoryRouter {
    history: Vec<String>,
}

impl HistoryRouter {
    pub fn new(initial: impl Into<String>) -> Self {
        Self { history: vec![initial.into()] }
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Navigations performed since construction.
    pub fn navigation_count(&self) -> usize {
        self.history.len() - 1
    }
}

impl Default for HistoryRouter {
    fn default() -> Self {
        Self::new(HOME)
    }
}

impl Router for HistoryRouter {
    fn current(&self) -> &str {
        self.history.last().map(String::as_str).unwrap_or(HOME)
    }

    fn navigate(&mut self, to: &str) {
        info!(from = self.current(), to, "navigating");
        self.history.push(to.to_string());
    }
}
