use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::media::{ApiError, Genre, GenreCatalog, GenreId, MovieDetail, MovieId, Title};
use crate::settings::AppSettings;
use crate::video::{Video, VideosResponse};

const API_BASE_URL: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
pub const PLACEHOLDER_POSTER_URL: &str = "https://via.placeholder.com/300x450?text=No+Image";

#[derive(Debug, Clone, Copy)]
pub enum ImageSize {
    Poster,
    Backdrop,
}

/// What to render when a record has no image path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFallback {
    Empty,
    Placeholder,
}

pub fn image_url(path: &str, size: ImageSize) -> String {
    let size_path = match size {
        ImageSize::Poster => "w500",
        ImageSize::Backdrop => "original",
    };
    format!("{}/{}{}", IMAGE_BASE_URL, size_path, path)
}

pub fn image_src(path: Option<&str>, size: ImageSize, fallback: ImageFallback) -> String {
    match path.filter(|p| !p.is_empty()) {
        Some(path) => image_url(path, size),
        None => match fallback {
            ImageFallback::Empty => String::new(),
            ImageFallback::Placeholder => String::from(PLACEHOLDER_POSTER_URL),
        },
    }
}

pub async fn fetch_image_bytes(url: String) -> Result<Vec<u8>, String> {
    reqwest::get(&url)
        .await
        .map_err(|e| e.to_string())?
        .error_for_status()
        .map_err(|e| e.to_string())?
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| e.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Search { query: String },
    DiscoverByGenre { genre_id: GenreId },
    GenreList,
    Popular,
    Upcoming,
    Movie { id: MovieId },
    MovieVideos { id: MovieId },
    MovieRecommendations { id: MovieId },
}

impl Endpoint {
    pub fn path(&self) -> String {
        match self {
            Endpoint::Search { .. } => String::from("/search/movie"),
            Endpoint::DiscoverByGenre { .. } => String::from("/discover/movie"),
            Endpoint::GenreList => String::from("/genre/movie/list"),
            Endpoint::Popular => String::from("/movie/popular"),
            Endpoint::Upcoming => String::from("/movie/upcoming"),
            Endpoint::Movie { id } => format!("/movie/{}", id),
            Endpoint::MovieVideos { id } => format!("/movie/{}/videos", id),
            Endpoint::MovieRecommendations { id } => format!("/movie/{}/recommendations", id),
        }
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::Search { query } => vec![("query", query.clone())],
            Endpoint::DiscoverByGenre { genre_id } => vec![
                ("with_genres", genre_id.to_string()),
                ("sort_by", String::from("popularity.desc")),
            ],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ResultsPage<T> {
    #[serde(default)]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct GenreListResponse {
    #[serde(default)]
    genres: Vec<Genre>,
}

/// Everything the screens need from the movie database.
#[async_trait]
pub trait MovieGateway: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Title>, ApiError>;
    async fn discover_by_genre(&self, genre_id: GenreId) -> Result<Vec<Title>, ApiError>;
    async fn genres(&self) -> Result<GenreCatalog, ApiError>;
    async fn popular(&self) -> Result<Vec<Title>, ApiError>;
    async fn upcoming(&self) -> Result<Vec<Title>, ApiError>;
    async fn movie(&self, id: MovieId) -> Result<MovieDetail, ApiError>;
    async fn videos(&self, id: MovieId) -> Result<Vec<Video>, ApiError>;
    async fn recommendations(&self, id: MovieId) -> Result<Vec<Title>, ApiError>;
}

pub type SharedGateway = Arc<dyn MovieGateway>;

#[derive(Clone)]
pub struct TmdbClient {
    api_key: String,
    base_url: String,
    language: String,
    http_client: reqwest::Client,
}

impl fmt::Debug for TmdbClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbClient")
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl TmdbClient {
    pub fn new(api_key: String, language: String) -> Self {
        Self::with_base_url(API_BASE_URL, api_key, language)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: String, language: String) -> Self {
        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            language,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        let language = if settings.language.is_empty() {
            String::from("en-US")
        } else {
            settings.language.clone()
        };
        Self::new(settings.api_key.clone(), language)
    }

    pub fn request_url(&self, endpoint: &Endpoint) -> String {
        let mut url = format!(
            "{}{}?api_key={}&language={}",
            self.base_url,
            endpoint.path(),
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.language)
        );
        for (key, value) in endpoint.query() {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(&value));
        }
        url
    }

    async fn fetch_response(&self, endpoint: &Endpoint) -> Result<reqwest::Response, ApiError> {
        debug!(%endpoint, "requesting");
        let response = self
            .http_client
            .get(self.request_url(endpoint))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.without_url().to_string()))?;

        match response.status().as_u16() {
            401 => Err(ApiError::Unauthorized),
            404 => Err(ApiError::NotFound),
            429 => Err(ApiError::RateLimited),
            s if s >= 400 => Err(ApiError::Status(s)),
            _ => Ok(response),
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, ApiError> {
        let result = match self.fetch_response(&endpoint).await {
            Ok(response) => response
                .json()
                .await
                .map_err(|e| ApiError::Parse(e.without_url().to_string())),
            Err(error) => Err(error),
        };
        if let Err(ref error) = result {
            warn!(%endpoint, %error, "movie database request failed");
        }
        result
    }

    async fn fetch_results(&self, endpoint: Endpoint) -> Result<Vec<Title>, ApiError> {
        let page: ResultsPage<Title> = self.fetch_json(endpoint).await?;
        Ok(page.results)
    }
}

#[async_trait]
impl MovieGateway for TmdbClient {
    async fn search(&self, query: &str) -> Result<Vec<Title>, ApiError> {
        self.fetch_results(Endpoint::Search {
            query: query.to_string(),
        })
        .await
    }

    async fn discover_by_genre(&self, genre_id: GenreId) -> Result<Vec<Title>, ApiError> {
        self.fetch_results(Endpoint::DiscoverByGenre { genre_id })
            .await
    }

    async fn genres(&self) -> Result<GenreCatalog, ApiError> {
        let response: GenreListResponse = self.fetch_json(Endpoint::GenreList).await?;
        Ok(GenreCatalog::new(response.genres))
    }

    async fn popular(&self) -> Result<Vec<Title>, ApiError> {
        self.fetch_results(Endpoint::Popular).await
    }

    async fn upcoming(&self) -> Result<Vec<Title>, ApiError> {
        self.fetch_results(Endpoint::Upcoming).await
    }

    async fn movie(&self, id: MovieId) -> Result<MovieDetail, ApiError> {
        self.fetch_json(Endpoint::Movie { id }).await
    }

    async fn videos(&self, id: MovieId) -> Result<Vec<Video>, ApiError> {
        let response: VideosResponse = self.fetch_json(Endpoint::MovieVideos { id }).await?;
        Ok(response.results)
    }

    async fn recommendations(&self, id: MovieId) -> Result<Vec<Title>, ApiError> {
        self.fetch_results(Endpoint::MovieRecommendations { id })
            .await
    }
}

pub async fn load_genres(gateway: SharedGateway) -> Result<GenreCatalog, ApiError> {
    gateway.genres().await
}

#[cfg(test)]
pub mod fake {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory gateway that records every call it receives.
    #[derive(Default)]
    pub struct FakeGateway {
        pub titles: HashMap<String, Vec<Title>>,
        pub details: HashMap<MovieId, MovieDetail>,
        pub videos: HashMap<MovieId, Vec<Video>>,
        pub fail_with: Option<ApiError>,
        calls: Mutex<Vec<Endpoint>>,
    }

    impl FakeGateway {
        pub fn calls(&self) -> Vec<Endpoint> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, endpoint: Endpoint) -> Result<String, ApiError> {
            let key = endpoint.path();
            self.calls.lock().unwrap().push(endpoint);
            match &self.fail_with {
                Some(error) => Err(error.clone()),
                None => Ok(key),
            }
        }

        fn list(&self, endpoint: Endpoint) -> Result<Vec<Title>, ApiError> {
            let key = self.record(endpoint)?;
            Ok(self.titles.get(&key).cloned().unwrap_or_default())
        }
    }

    #[async_trait]
    impl MovieGateway for FakeGateway {
        async fn search(&self, query: &str) -> Result<Vec<Title>, ApiError> {
            self.list(Endpoint::Search {
                query: query.to_string(),
            })
        }

        async fn discover_by_genre(&self, genre_id: GenreId) -> Result<Vec<Title>, ApiError> {
            self.list(Endpoint::DiscoverByGenre { genre_id })
        }

        async fn genres(&self) -> Result<GenreCatalog, ApiError> {
            self.record(Endpoint::GenreList)?;
            Ok(GenreCatalog::default())
        }

        async fn popular(&self) -> Result<Vec<Title>, ApiError> {
            self.list(Endpoint::Popular)
        }

        async fn upcoming(&self) -> Result<Vec<Title>, ApiError> {
            self.list(Endpoint::Upcoming)
        }

        async fn movie(&self, id: MovieId) -> Result<MovieDetail, ApiError> {
            self.record(Endpoint::Movie { id })?;
            self.details.get(&id).cloned().ok_or(ApiError::NotFound)
        }

        async fn videos(&self, id: MovieId) -> Result<Vec<Video>, ApiError> {
            self.record(Endpoint::MovieVideos { id })?;
            Ok(self.videos.get(&id).cloned().unwrap_or_default())
        }

        async fn recommendations(&self, id: MovieId) -> Result<Vec<Title>, ApiError> {
            self.list(Endpoint::MovieRecommendations { id })
        }
    }

    pub fn title(id: MovieId, name: &str) -> Title {
        Title {
            id,
            title: name.to_string(),
            poster_path: Some(format!("/poster-{}.jpg", id)),
            backdrop_path: None,
            release_date: Some(String::from("2024-05-01")),
            vote_average: 7.0,
            overview: String::new(),
            genre_ids: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> TmdbClient {
        TmdbClient::with_base_url(
            server.uri(),
            String::from("test-key"),
            String::from("en-US"),
        )
    }

    #[test]
    fn endpoint_paths() {
        assert_eq!(Endpoint::Popular.path(), "/movie/popular");
        assert_eq!(Endpoint::Upcoming.path(), "/movie/upcoming");
        assert_eq!(Endpoint::GenreList.path(), "/genre/movie/list");
        assert_eq!(Endpoint::Movie { id: 42 }.path(), "/movie/42");
        assert_eq!(Endpoint::MovieVideos { id: 42 }.path(), "/movie/42/videos");
        assert_eq!(
            Endpoint::MovieRecommendations { id: 42 }.path(),
            "/movie/42/recommendations"
        );
    }

    #[test]
    fn request_url_carries_credential_and_encoded_params() {
        let client = TmdbClient::with_base_url(
            "https://example.test/3/",
            String::from("k3y"),
            String::from("en-US"),
        );
        assert_eq!(
            client.request_url(&Endpoint::Search {
                query: String::from("star wars"),
            }),
            "https://example.test/3/search/movie?api_key=k3y&language=en-US&query=star%20wars"
        );
        assert_eq!(
            client.request_url(&Endpoint::DiscoverByGenre { genre_id: 35 }),
            "https://example.test/3/discover/movie?api_key=k3y&language=en-US&with_genres=35&sort_by=popularity.desc"
        );
    }

    #[test]
    fn missing_image_path_uses_fallback() {
        assert_eq!(
            image_src(None, ImageSize::Poster, ImageFallback::Empty),
            ""
        );
        assert_eq!(
            image_src(None, ImageSize::Poster, ImageFallback::Placeholder),
            PLACEHOLDER_POSTER_URL
        );
        assert_eq!(
            image_src(Some(""), ImageSize::Backdrop, ImageFallback::Empty),
            ""
        );
        assert_eq!(
            image_src(Some("/abc.jpg"), ImageSize::Poster, ImageFallback::Placeholder),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
        assert_eq!(
            image_url("/abc.jpg", ImageSize::Backdrop),
            "https://image.tmdb.org/t/p/original/abc.jpg"
        );
    }

    #[tokio::test]
    async fn search_parses_results_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("query", "the matrix"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 1,
                "results": [
                    { "id": 603, "title": "The Matrix", "poster_path": "/m.jpg", "vote_average": 8.2 },
                    { "id": 604, "title": "The Matrix Reloaded", "poster_path": null }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let titles = client(&server).search("the matrix").await.unwrap();
        let ids: Vec<MovieId> = titles.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![603, 604]);
        assert_eq!(titles[1].poster_path, None);
    }

    #[tokio::test]
    async fn discover_filters_by_genre() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/discover/movie"))
            .and(query_param("with_genres", "28"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let titles = client(&server).discover_by_genre(28).await.unwrap();
        assert!(titles.is_empty());
    }

    #[tokio::test]
    async fn genre_list_builds_catalog() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/genre/movie/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "genres": [{ "id": 28, "name": "Action" }, { "id": 12, "name": "Adventure" }]
            })))
            .mount(&server)
            .await;

        let catalog = client(&server).genres().await.unwrap();
        assert_eq!(catalog.name(12), Some("Adventure"));
        assert_eq!(catalog.genres().len(), 2);
    }

    #[tokio::test]
    async fn missing_results_field_reads_as_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/upcoming"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "page": 1 })))
            .mount(&server)
            .await;

        assert!(client(&server).upcoming().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn maps_http_failures() {
        let server = MockServer::start().await;
        Mock::given(path("/movie/popular"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(path("/movie/7"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(path("/movie/upcoming"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(path("/movie/7/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client(&server);
        assert!(matches!(client.popular().await, Err(ApiError::Unauthorized)));
        assert!(matches!(client.movie(7).await, Err(ApiError::NotFound)));
        assert!(matches!(client.upcoming().await, Err(ApiError::Status(503))));
        assert!(matches!(client.videos(7).await, Err(ApiError::Parse(_))));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let client = TmdbClient::with_base_url(
            "http://127.0.0.1:9",
            String::from("k"),
            String::from("en-US"),
        );
        assert!(matches!(client.popular().await, Err(ApiError::Network(_))));
    }
}
