use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use iced::widget::image::Handle;
use iced::{Color, Size};
use serde::{Deserialize, Deserializer};

use crate::debounce::DebounceTicket;
use crate::details::MovieDetails;
use crate::remote::Ticket;
use crate::router::Route;

fn simple_hash(s: &str) -> String {
    let mut hash: u64 = 5381;
    for byte in s.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(byte as u64);
    }
    format!("{:016x}", hash)
}

fn get_cache_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".cache")
            .join("moviehub")
            .join("images")
    })
}

pub const BACKGROUND_BLACK: Color = Color::from_rgb(0.0, 0.0, 0.0);
pub const SURFACE_DARK_GRAY: Color = Color::from_rgb(0.078, 0.078, 0.078);
pub const ACCENT_RED: Color = Color::from_rgb(0.898, 0.035, 0.078);
pub const STAR_YELLOW: Color = Color::from_rgb(0.98, 0.8, 0.08);
pub const TEXT_WHITE: Color = Color::from_rgb(1.0, 1.0, 1.0);
pub const TEXT_GRAY: Color = Color::from_rgb(0.702, 0.702, 0.702);

pub type MovieId = u64;
pub type GenreId = u32;

/// Treats an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A movie as it appears in list, search and discover results.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Title {
    pub id: MovieId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre_ids: Vec<GenreId>,
}

impl Title {
    pub fn release_year(&self) -> String {
        release_year(self.release_date.as_deref())
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }
}

/// The full record returned by the single-movie endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub title: Title,
    pub runtime: Option<u32>,
    pub status: Option<String>,
    pub tagline: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// Genre id to display name lookup, fetched once per process and shared.
#[derive(Debug, Clone, Default)]
pub struct GenreCatalog {
    genres: Vec<Genre>,
    names: HashMap<GenreId, String>,
}

impl GenreCatalog {
    pub fn new(genres: Vec<Genre>) -> Self {
        let names = genres.iter().map(|g| (g.id, g.name.clone())).collect();
        Self { genres, names }
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }

    pub fn name(&self, id: GenreId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Names for the mapped ids, in input order. Unmapped ids are skipped.
    pub fn names_for(&self, ids: &[GenreId]) -> Vec<&str> {
        ids.iter().filter_map(|id| self.name(*id)).collect()
    }
}

pub fn release_year(date: Option<&str>) -> String {
    date.and_then(|d| d.get(..4))
        .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
        .map(String::from)
        .unwrap_or_else(|| String::from("N/A"))
}

pub fn format_rating(vote_average: f32) -> String {
    format!("{:.1}", (vote_average * 10.0).round() / 10.0)
}

pub fn format_runtime(minutes: u32) -> String {
    format!("{} min", minutes)
}

/// Number of filled stars out of five for a rating on the 0-10 scale.
pub fn filled_stars(vote_average: f32) -> usize {
    ((vote_average / 2.0).floor().max(0.0) as usize).min(5)
}

pub fn truncate_description(description: &str, max_length: usize) -> String {
    if description.chars().count() <= max_length {
        return description.to_string();
    }
    let truncated: String = description.chars().take(max_length).collect();
    format!(
        "{}...",
        truncated.rfind(' ').map_or(truncated.as_str(), |i| &truncated[..i])
    )
}

#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    cache: HashMap<String, Handle>,
    pending: HashSet<String>,
    failed: HashSet<String>,
    cache_directory: Option<PathBuf>,
}

impl ImageCache {
    pub fn new() -> Self {
        let cache_directory = get_cache_dir();
        if let Some(ref dir) = cache_directory {
            if let Err(e) = std::fs::create_dir_all(dir) {
                tracing::warn!(dir = %dir.display(), error = %e, "image cache directory unavailable");
            }
        }
        Self {
            cache: HashMap::new(),
            pending: HashSet::new(),
            failed: HashSet::new(),
            cache_directory,
        }
    }

    pub fn get(&self, url: &str) -> Option<&Handle> {
        self.cache.get(url)
    }

    pub fn insert(&mut self, url: String, handle: Handle) {
        self.pending.remove(&url);
        self.cache.insert(url, handle);
    }

    /// A failed URL is not requested again for the rest of the session.
    pub fn fail(&mut self, url: &str) {
        self.pending.remove(url);
        self.failed.insert(url.to_string());
    }

    pub fn is_pending(&self, url: &str) -> bool {
        self.pending.contains(url)
    }

    pub fn needs_load(&self, url: &str) -> bool {
        !url.is_empty()
            && self.get(url).is_none()
            && !self.is_pending(url)
            && !self.failed.contains(url)
    }

    pub fn mark_pending(&mut self, url: String) {
        self.pending.insert(url);
    }

    pub fn get_cache_path(&self, url: &str) -> Option<PathBuf> {
        self.cache_directory
            .as_ref()
            .map(|dir| dir.join(simple_hash(url)))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    Parse(String),
    #[error("the API key was rejected")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("rate limited by the movie database")]
    RateLimited,
    #[error("HTTP error: {0}")]
    Status(u16),
}

#[derive(Debug, Clone)]
pub enum Message {
    Setup(crate::settings::SetupMessage),
    Navigate(Route),
    NavigateBack,
    Reload,
    WindowResized(Size),
    GenresLoaded(Result<GenreCatalog, ApiError>),
    UpcomingLoaded(Ticket, Result<Vec<Title>, ApiError>),
    PopularLoaded(Ticket, Result<Vec<Title>, ApiError>),
    CarouselTick,
    CarouselSelect(usize),
    GenreSelected(GenreId),
    GenreRetry,
    GenreMoviesLoaded(Ticket, Result<Vec<Title>, ApiError>),
    DetailsLoaded(Ticket, Result<Box<MovieDetails>, ApiError>),
    SearchResultsLoaded(Ticket, Result<Vec<Title>, ApiError>),
    HeaderQueryChanged(String),
    HeaderDebounceElapsed(DebounceTicket),
    HeaderResultsLoaded(Ticket, Result<Vec<Title>, ApiError>),
    HeaderDropdownDismissed,
    HeaderSeeAllResults,
    LoadImage(String),
    ImageLoaded(String, Result<Handle, String>),
    OpenExternal(String),
}
