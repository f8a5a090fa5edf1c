use iced::widget::{column, text};
use iced::{Element, Length, Padding};

use crate::components::{bold, error_view, loading_view};
use crate::home::poster_urls;
use crate::media::{ApiError, Message, Title, ACCENT_RED, TEXT_GRAY, TEXT_WHITE};
use crate::remote::{Remote, Request, Ticket};
use crate::tmdb::ImageFallback;
use crate::MovieHub;

/// Results for the query carried by the search route.
#[derive(Debug, Default)]
pub struct SearchPage {
    query: String,
    results: Request<Vec<Title>>,
}

impl SearchPage {
    /// An empty query shows the prompt and fetches nothing.
    pub fn mount(&mut self, query: &str) -> Option<Ticket> {
        self.query = query.trim().to_string();
        if self.query.is_empty() {
            self.results.reset();
            return None;
        }
        Some(self.results.begin())
    }

    pub fn unmount(&mut self) {
        self.query.clear();
        self.results.reset();
    }

    pub fn on_loaded(&mut self, ticket: Ticket, result: Result<Vec<Title>, ApiError>) -> bool {
        self.results.resolve(ticket, result)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn state(&self) -> &Remote<Vec<Title>> {
        self.results.state()
    }

    pub fn poster_urls(&self) -> Vec<String> {
        self.results
            .ready()
            .map(|titles| poster_urls(titles, ImageFallback::Placeholder))
            .unwrap_or_default()
    }
}

impl MovieHub {
    pub fn view_search_page(&self) -> Element<'_, Message> {
        let query = self.search.query();
        let shown_query = if query.is_empty() { "..." } else { query };
        let heading = column![
            text("Search Results for:").size(28).color(TEXT_WHITE).font(bold()),
            text(format!("\u{201c}{}\u{201d}", shown_query))
                .size(28)
                .color(ACCENT_RED)
                .font(bold()),
        ]
        .spacing(4);

        let body: Element<Message> = match self.search.state() {
            Remote::Idle => text("Type at least two characters in the search box to find movies.")
                .size(16)
                .color(TEXT_GRAY)
                .into(),
            Remote::Loading => loading_view("Loading...", 256.0),
            Remote::Failed(error) => error_view(error, Message::Reload),
            Remote::Ready(titles) if titles.is_empty() => {
                text(format!("No results found for \"{}\".", query))
                    .size(16)
                    .color(TEXT_GRAY)
                    .into()
            }
            Remote::Ready(titles) => {
                self.view_title_grid(titles, ImageFallback::Placeholder, false)
            }
        };

        column![heading, body]
            .spacing(24)
            .padding(Padding::new(40.0).left(24.0).right(24.0))
            .width(Length::Fill)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::router::Route;
    use crate::tmdb::fake::FakeGateway;
    use crate::tmdb::{MovieGateway, SharedGateway, TmdbClient, PLACEHOLDER_POSTER_URL};

    #[test]
    fn empty_query_issues_no_fetch() {
        let mut page = SearchPage::default();
        assert!(page.mount("   ").is_none());
        assert_eq!(page.state(), &Remote::Idle);
    }

    #[tokio::test]
    async fn matrix_route_lists_results_in_response_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .and(query_param("query", "matrix"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    { "id": 603, "title": "The Matrix", "poster_path": "/a.jpg" },
                    { "id": 624860, "title": "The Matrix Resurrections", "poster_path": null },
                    { "id": 604, "title": "The Matrix Reloaded", "poster_path": "/c.jpg" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;
        let gateway: SharedGateway = Arc::new(TmdbClient::with_base_url(
            server.uri(),
            String::from("key"),
            String::from("en-US"),
        ));

        let Some(Route::Search { query }) = Route::parse("/search?query=matrix") else {
            panic!("search route did not parse");
        };
        let mut page = SearchPage::default();
        let ticket = page.mount(&query).unwrap();
        let result = gateway.search(page.query()).await;
        assert!(page.on_loaded(ticket, result));

        let destinations: Vec<Route> = page
            .state()
            .ready()
            .unwrap()
            .iter()
            .map(Route::for_title)
            .collect();
        assert_eq!(
            destinations,
            vec![
                Route::MovieDetails(603),
                Route::MovieDetails(624860),
                Route::MovieDetails(604),
            ]
        );
        assert_eq!(destinations[0].to_path(), "/moviedetails/603");

        let posters = page.poster_urls();
        assert_eq!(posters.len(), 3);
        assert_eq!(posters[1], PLACEHOLDER_POSTER_URL);
    }

    #[tokio::test]
    async fn empty_results_are_distinct_from_failure() {
        let gateway = FakeGateway::default();
        let mut page = SearchPage::default();
        let ticket = page.mount("zzzz").unwrap();
        page.on_loaded(ticket, gateway.search("zzzz").await);
        assert_eq!(page.state().ready().map(Vec::len), Some(0));

        let mut failing = FakeGateway::default();
        failing.fail_with = Some(ApiError::RateLimited);
        let ticket = page.mount("zzzz").unwrap();
        page.on_loaded(ticket, failing.search("zzzz").await);
        assert!(matches!(page.state(), Remote::Failed(_)));
    }
}
