use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Generate,
    Saved,
    Paper,
    About,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::Generate,
        Page::Saved,
        Page::Paper,
        Page::About,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Generate => "Generate",
            Page::Saved => "Saved",
            Page::Paper => "Full Paper",
            Page::About => "About",
        }
    }

    pub fn route(&self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::Generate => "/generate",
            Page::Saved => "/saved",
            Page::Paper => "/paper",
            Page::About => "/about",
        }
    }

    /// Exact path match only.
    pub fn from_route(path: &str) -> Option<Page> {
        Page::ALL.into_iter().find(|page| page.route() == path)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
