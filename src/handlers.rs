use std::sync::Arc;
use std::time::Instant;

use iced::widget::scrollable::AbsoluteOffset;
use iced::Task;
use tracing::{debug, info, warn};

use crate::components::PAGE_SCROLL_ID;
use crate::debounce::DebounceTicket;
use crate::details::{load_movie_details, MovieDetails};
use crate::home::poster_urls;
use crate::media::{ApiError, GenreCatalog, GenreId, Message, MovieId, Title};
use crate::remote::Ticket;
use crate::router::Route;
use crate::tmdb::{fetch_image_bytes, ImageFallback, SharedGateway};
use crate::MovieHub;

pub fn handle_message(app: &mut MovieHub, message: Message) -> Task<Message> {
    match message {
        Message::Setup(_) => Task::none(),
        Message::Navigate(route) => handle_navigate(app, route),
        Message::NavigateBack => handle_navigate_back(app),
        Message::Reload => enter_route(app),
        Message::WindowResized(size) => {
            app.viewport.resize(size);
            Task::none()
        }
        Message::GenresLoaded(result) => handle_genres_loaded(app, result),
        Message::UpcomingLoaded(ticket, result) => {
            if !app.home.on_loaded(ticket, result) {
                return Task::none();
            }
            load_images(app, app.home.poster_urls())
        }
        Message::PopularLoaded(ticket, result) => {
            if !app.hero.on_loaded(ticket, result) {
                return Task::none();
            }
            load_images(app, app.hero.image_urls())
        }
        Message::CarouselTick => {
            app.hero.tick();
            load_images(app, app.hero.image_urls())
        }
        Message::CarouselSelect(index) => {
            app.hero.select(index);
            load_images(app, app.hero.image_urls())
        }
        Message::GenreSelected(genre_id) => match app.genre_filter.select(genre_id) {
            Some(ticket) => fetch_genre_movies(app, ticket, genre_id),
            None => Task::none(),
        },
        Message::GenreRetry => {
            let (ticket, genre_id) = app.genre_filter.retry();
            fetch_genre_movies(app, ticket, genre_id)
        }
        Message::GenreMoviesLoaded(ticket, result) => {
            if !app.genre_filter.on_loaded(ticket, result) {
                return Task::none();
            }
            let urls = app
                .genre_filter
                .state()
                .ready()
                .map(|titles| poster_urls(titles, ImageFallback::Empty))
                .unwrap_or_default();
            load_images(app, urls)
        }
        Message::DetailsLoaded(ticket, result) => handle_details_loaded(app, ticket, result),
        Message::SearchResultsLoaded(ticket, result) => {
            if !app.search.on_loaded(ticket, result) {
                return Task::none();
            }
            load_images(app, app.search.poster_urls())
        }
        Message::HeaderQueryChanged(value) => handle_header_query_changed(app, value),
        Message::HeaderDebounceElapsed(ticket) => handle_header_debounce_elapsed(app, ticket),
        Message::HeaderResultsLoaded(ticket, result) => {
            if !app.header.on_results(ticket, result) {
                return Task::none();
            }
            load_images(app, app.header.poster_urls())
        }
        Message::HeaderDropdownDismissed => {
            app.header.dismiss();
            Task::none()
        }
        Message::HeaderSeeAllResults => match app.header.see_all_route() {
            Some(route) => handle_navigate(app, route),
            None => Task::none(),
        },
        Message::LoadImage(url) => handle_load_image(app, url),
        Message::ImageLoaded(url, result) => handle_image_loaded(app, url, result),
        Message::OpenExternal(url) => {
            info!(%url, "opening in browser");
            if let Err(e) = open::that_detached(&url) {
                warn!(%url, error = %e, "failed to open browser");
            }
            Task::none()
        }
    }
}

fn handle_navigate(app: &mut MovieHub, route: Route) -> Task<Message> {
    if !app.navigator.push(route) {
        app.header.dismiss();
        return Task::none();
    }
    enter_route(app)
}

fn handle_navigate_back(app: &mut MovieHub) -> Task<Message> {
    if app.navigator.back().is_none() {
        return Task::none();
    }
    enter_route(app)
}

/// Tears down every page and starts the fetches the current route needs.
pub fn enter_route(app: &mut MovieHub) -> Task<Message> {
    let route = app.navigator.current().clone();
    info!(%route, "entering route");

    app.header.dismiss();
    app.home.unmount();
    app.hero.unmount();
    app.genre_filter.unmount();
    app.details.unmount();
    app.search.unmount();

    let Some(gateway) = app.gateway.clone() else {
        return Task::none();
    };

    let page = match mount_route(app, &route) {
        Some(fetch) => page_task(gateway, fetch),
        None => Task::none(),
    };
    Task::batch([page, scroll_to_top()])
}

/// The requests a freshly mounted page is waiting on.
#[derive(Debug, Clone, PartialEq)]
pub enum PageFetch {
    Home {
        upcoming: Ticket,
        popular: Ticket,
        genre: (Ticket, GenreId),
    },
    Details {
        ticket: Ticket,
        id: MovieId,
    },
    Search {
        ticket: Ticket,
        query: String,
    },
}

/// Mounts the page for `route`. `None` means the page has nothing to fetch.
pub fn mount_route(app: &mut MovieHub, route: &Route) -> Option<PageFetch> {
    match route {
        Route::Home => Some(PageFetch::Home {
            upcoming: app.home.mount(),
            popular: app.hero.mount(),
            genre: app.genre_filter.mount(),
        }),
        Route::MovieDetails(id) => Some(PageFetch::Details {
            ticket: app.details.mount(*id),
            id: *id,
        }),
        Route::Search { query } => {
            let ticket = app.search.mount(query)?;
            Some(PageFetch::Search {
                ticket,
                query: app.search.query().to_string(),
            })
        }
    }
}

fn page_task(gateway: SharedGateway, fetch: PageFetch) -> Task<Message> {
    match fetch {
        PageFetch::Home {
            upcoming,
            popular,
            genre: (genre_ticket, genre_id),
        } => {
            let upcoming_gateway = gateway.clone();
            let popular_gateway = gateway.clone();
            Task::batch([
                Task::perform(
                    async move { upcoming_gateway.upcoming().await },
                    move |result| Message::UpcomingLoaded(upcoming, result),
                ),
                Task::perform(
                    async move { popular_gateway.popular().await },
                    move |result| Message::PopularLoaded(popular, result),
                ),
                genre_movies_task(gateway, genre_ticket, genre_id),
            ])
        }
        PageFetch::Details { ticket, id } => {
            Task::perform(load_movie_details(gateway, id), move |result| {
                Message::DetailsLoaded(ticket, result.map(Box::new))
            })
        }
        PageFetch::Search { ticket, query } => Task::perform(
            async move { gateway.search(&query).await },
            move |result| Message::SearchResultsLoaded(ticket, result),
        ),
    }
}

fn genre_movies_task(gateway: SharedGateway, ticket: Ticket, genre_id: GenreId) -> Task<Message> {
    Task::perform(
        async move { gateway.discover_by_genre(genre_id).await },
        move |result| Message::GenreMoviesLoaded(ticket, result),
    )
}

fn fetch_genre_movies(app: &MovieHub, ticket: Ticket, genre_id: GenreId) -> Task<Message> {
    debug!(genre_id, "genre selected");
    match app.gateway.clone() {
        Some(gateway) => genre_movies_task(gateway, ticket, genre_id),
        None => Task::none(),
    }
}

fn scroll_to_top() -> Task<Message> {
    iced::widget::operation::scroll_to(
        iced::widget::Id::new(PAGE_SCROLL_ID),
        AbsoluteOffset { x: 0.0, y: 0.0 },
    )
}

fn handle_genres_loaded(
    app: &mut MovieHub,
    result: Result<GenreCatalog, ApiError>,
) -> Task<Message> {
    match result {
        Ok(catalog) => {
            info!(genres = catalog.genres().len(), "genre catalog loaded");
            app.genres = Arc::new(catalog);
        }
        Err(e) => warn!(error = %e, "genre catalog unavailable"),
    }
    Task::none()
}

fn handle_details_loaded(
    app: &mut MovieHub,
    ticket: Ticket,
    result: Result<Box<MovieDetails>, ApiError>,
) -> Task<Message> {
    if !app.details.on_loaded(ticket, result) {
        return Task::none();
    }
    debug!(id = ?app.details.movie_id(), "details page ready");
    Task::batch([scroll_to_top(), load_images(app, app.details.image_urls())])
}

fn handle_header_query_changed(app: &mut MovieHub, value: String) -> Task<Message> {
    let Some(ticket) = app.header.on_input(value, Instant::now()) else {
        return Task::none();
    };
    Task::perform(
        tokio::time::sleep(app.header.debounce_delay()),
        move |_| Message::HeaderDebounceElapsed(ticket),
    )
}

fn handle_header_debounce_elapsed(app: &mut MovieHub, ticket: DebounceTicket) -> Task<Message> {
    let Some((request_ticket, query)) = app.header.on_debounce_elapsed(ticket, Instant::now())
    else {
        return Task::none();
    };
    let Some(gateway) = app.gateway.clone() else {
        return Task::none();
    };
    debug!(%query, "header search");
    Task::perform(
        async move { gateway.search(&query).await },
        move |result: Result<Vec<Title>, ApiError>| {
            Message::HeaderResultsLoaded(request_ticket, result)
        },
    )
}

fn load_images(app: &MovieHub, urls: Vec<String>) -> Task<Message> {
    let tasks: Vec<Task<Message>> = urls
        .into_iter()
        .filter(|url| app.image_cache.needs_load(url))
        .map(|url| Task::done(Message::LoadImage(url)))
        .collect();
    Task::batch(tasks)
}

fn handle_load_image(app: &mut MovieHub, url: String) -> Task<Message> {
    if !app.image_cache.needs_load(&url) {
        return Task::none();
    }
    app.image_cache.mark_pending(url.clone());
    let image_url = url.clone();
    let cache_path = app.image_cache.get_cache_path(&url);

    Task::perform(
        async move {
            if let Some(path) = &cache_path {
                if let Ok(bytes) = tokio::fs::read(path).await {
                    return (image_url, Ok(bytes));
                }
            }
            let result = fetch_image_bytes(image_url.clone()).await;
            if let (Ok(bytes), Some(path)) = (&result, &cache_path) {
                if let Err(e) = tokio::fs::write(path, bytes).await {
                    debug!(path = %path.display(), error = %e, "could not cache image");
                }
            }
            (image_url, result)
        },
        |(url, result)| {
            let result = result.map(iced::widget::image::Handle::from_bytes);
            Message::ImageLoaded(url, result)
        },
    )
}

fn handle_image_loaded(
    app: &mut MovieHub,
    url: String,
    result: Result<iced::widget::image::Handle, String>,
) -> Task<Message> {
    match result {
        Ok(handle) => app.image_cache.insert(url, handle),
        Err(error) => {
            warn!(%url, %error, "image failed to load");
            app.image_cache.fail(&url);
        }
    }
    Task::none()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::genre_filter::DEFAULT_GENRE;
    use crate::media::MovieDetail;
    use crate::remote::Remote;
    use crate::tmdb::fake::{title, FakeGateway};
    use crate::tmdb::{Endpoint, MovieGateway, TmdbClient};

    fn route(path: &str) -> Route {
        Route::parse(path).unwrap()
    }

    #[tokio::test]
    async fn details_route_fetches_movie_videos_and_recommendations() {
        let mut fake = FakeGateway::default();
        fake.details.insert(
            42,
            MovieDetail {
                title: title(42, "Answer"),
                runtime: Some(120),
                status: None,
                tagline: None,
                genres: Vec::new(),
            },
        );
        let fake = Arc::new(fake);
        let gateway: SharedGateway = fake.clone();
        let mut app = MovieHub::default();

        let Some(PageFetch::Details { ticket, id }) =
            mount_route(&mut app, &route("/moviedetails/42"))
        else {
            panic!("details route did not mount the details page");
        };
        assert_eq!(id, 42);
        assert!(matches!(app.details.state(), Remote::Loading));

        let result = load_movie_details(gateway, id).await;
        let calls = fake.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.contains(&Endpoint::Movie { id: 42 }));
        assert!(calls.contains(&Endpoint::MovieVideos { id: 42 }));
        assert!(calls.contains(&Endpoint::MovieRecommendations { id: 42 }));

        let _ = handle_message(
            &mut app,
            Message::DetailsLoaded(ticket, result.map(Box::new)),
        );
        let shown = app.details.state().ready().unwrap();
        assert_eq!(shown.movie.title.title, "Answer");
    }

    #[tokio::test]
    async fn search_route_requests_the_query_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .and(query_param("query", "the matrix"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "id": 603, "title": "The Matrix" }]
            })))
            .expect(1)
            .mount(&server)
            .await;
        let gateway = TmdbClient::with_base_url(
            server.uri(),
            String::from("key"),
            String::from("en-US"),
        );
        let mut app = MovieHub::default();

        let Some(PageFetch::Search { ticket, query }) =
            mount_route(&mut app, &route("/search?query=%20the%20matrix%20"))
        else {
            panic!("search route did not mount the search page");
        };
        assert_eq!(query, "the matrix");

        let _ = handle_message(
            &mut app,
            Message::SearchResultsLoaded(ticket, gateway.search(&query).await),
        );
        let ids: Vec<MovieId> = app
            .search
            .state()
            .ready()
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![603]);
    }

    #[test]
    fn empty_search_route_fetches_nothing() {
        let mut app = MovieHub::default();
        assert_eq!(mount_route(&mut app, &route("/search?query=")), None);
        assert_eq!(app.search.state(), &Remote::Idle);
    }

    #[test]
    fn home_route_mounts_three_sections() {
        let mut app = MovieHub::default();
        let Some(PageFetch::Home { genre, .. }) = mount_route(&mut app, &Route::Home) else {
            panic!("home route did not mount the home page");
        };
        assert_eq!(genre.1, DEFAULT_GENRE);
        assert_eq!(app.home.state(), &Remote::Loading);
        assert_eq!(app.hero.state(), &Remote::Loading);
        assert_eq!(app.genre_filter.state(), &Remote::Loading);
    }

    #[test]
    fn leaving_a_details_page_drops_its_late_response() {
        let mut app = MovieHub {
            gateway: Some(Arc::new(FakeGateway::default())),
            ..Default::default()
        };
        let Some(PageFetch::Details { ticket, .. }) =
            mount_route(&mut app, &route("/moviedetails/42"))
        else {
            panic!("details route did not mount the details page");
        };

        let _ = handle_message(&mut app, Message::Navigate(Route::MovieDetails(43)));
        assert_eq!(app.details.movie_id(), Some(43));

        let _ = handle_message(
            &mut app,
            Message::DetailsLoaded(ticket, Err(ApiError::NotFound)),
        );
        assert!(matches!(app.details.state(), Remote::Loading));
    }
}
