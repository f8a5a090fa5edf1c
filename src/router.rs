use std::fmt;

use crate::media::{MovieId, Title};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    MovieDetails(MovieId),
    Search { query: String },
}

impl Route {
    /// Parses `/`, `/home`, `/moviedetails/{id}` and `/search?query={text}`.
    pub fn parse(input: &str) -> Option<Route> {
        let (path, query) = match input.trim().split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (input.trim(), None),
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] | ["home"] => Some(Route::Home),
            ["moviedetails", id] => id.parse().ok().map(Route::MovieDetails),
            ["search"] => Some(Route::Search {
                query: query
                    .and_then(|q| query_value(q, "query"))
                    .unwrap_or_default(),
            }),
            _ => None,
        }
    }

    pub fn to_path(&self) -> String {
        match self {
            Route::Home => String::from("/"),
            Route::MovieDetails(id) => format!("/moviedetails/{}", id),
            Route::Search { query } => format!("/search?query={}", urlencoding::encode(query)),
        }
    }

    pub fn for_title(title: &Title) -> Route {
        Route::MovieDetails(title.id)
    }

    pub fn search(query: &str) -> Route {
        Route::Search {
            query: query.trim().to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}

fn query_value(query: &str, key: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        if name != key {
            return None;
        }
        let value = value.replace('+', " ");
        urlencoding::decode(&value).ok().map(|v| v.into_owned())
    })
}

/// The current route plus the routes that led to it.
#[derive(Debug)]
pub struct Navigator {
    current: Route,
    history: Vec<Route>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        Self {
            current: initial,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> &Route {
        &self.current
    }

    /// Returns false when `route` is already current.
    pub fn push(&mut self, route: Route) -> bool {
        if route == self.current {
            return false;
        }
        let previous = std::mem::replace(&mut self.current, route);
        self.history.push(previous);
        true
    }

    pub fn back(&mut self) -> Option<&Route> {
        let previous = self.history.pop()?;
        self.current = previous;
        Some(&self.current)
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }
}
