//! Page route table.

use std::fmt;

/// Top-level pages served by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    Simulation,
    Benchmark,
    Narrative,
    About,
    NotFound,
}

/// Canonical route table. Paths not listed here (including the retired
/// `/dashboard`) resolve to `Page::NotFound`.
pub const ROUTES: &[(&str, Page)] = &[
    ("/", Page::Home),
    ("/simulation", Page::Simulation),
    ("/benchmark", Page::Benchmark),
    ("/narrative", Page::Narrative),
    ("/about", Page::About),
];

impl Page {
    /// Resolve a request path. Query strings and trailing slashes are ignored.
    pub fn resolve(path: &str) -> Page {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = path.trim_end_matches('/');
        let normalised = if trimmed.is_empty() { "/" } else { trimmed };

        ROUTES
            .iter()
            .find(|(route, _)| *route == normalised)
            .map(|(_, page)| *page)
            .unwrap_or(Page::NotFound)
    }

    pub fn path(&self) -> Option<&'static str> {
        ROUTES.iter().find(|(_, p)| p == self).map(|(route, _)| *route)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Policy Simulation Assistant",
            Page::Simulation => "Policy Simulation",
            Page::Benchmark => "Health Benchmarks",
            Page::Narrative => "Policy Narratives",
            Page::About => "About",
            Page::NotFound => "Page Not Found",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Page::Home => "Explore how health-workforce and spending policy changes affect life expectancy.",
            Page::Simulation => "Adjust doctor density, nurse density, and health spending to predict life expectancy.",
            Page::Benchmark => "Compare countries across health indicators.",
            Page::Narrative => "Generate plain-language summaries of simulation outcomes.",
            Page::About => "Predictions come from regression models over OECD health indicators.",
            Page::NotFound => "The page you requested does not exist.",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}
