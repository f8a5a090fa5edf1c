use iced::widget::{column, container, row, text, Column, Row, Space};
use iced::{Element, Length};
use tracing::debug;

use crate::components::{
    bold, chip, error_view, icon, link_button, loading_view, primary_button, section_title,
    ICON_PLAY_FILL,
};
use crate::home::poster_urls;
use crate::media::{
    format_runtime, ApiError, MovieDetail, MovieId, Message, Title, TEXT_GRAY, TEXT_WHITE,
};
use crate::remote::{Remote, Request, Ticket};
use crate::tmdb::{image_src, ImageFallback, ImageSize, SharedGateway};
use crate::video::{select_trailer, trailer_search_url, Video};
use crate::MovieHub;

const POSTER_WIDTH: f32 = 300.0;
const POSTER_HEIGHT: f32 = 450.0;

/// Everything the details page shows, fetched as one unit.
#[derive(Debug, Clone)]
pub struct MovieDetails {
    pub movie: MovieDetail,
    pub trailer: Option<Video>,
    pub recommendations: Vec<Title>,
}

/// Fetches the record, its videos and its recommendations concurrently.
/// Any single failure fails the whole load.
pub async fn load_movie_details(
    gateway: SharedGateway,
    id: MovieId,
) -> Result<MovieDetails, ApiError> {
    let (movie, videos, recommendations) = tokio::try_join!(
        gateway.movie(id),
        gateway.videos(id),
        gateway.recommendations(id)
    )?;
    let trailer = select_trailer(&videos).cloned();
    debug!(
        id,
        videos = videos.len(),
        has_trailer = trailer.is_some(),
        "movie details loaded"
    );
    Ok(MovieDetails {
        movie,
        trailer,
        recommendations,
    })
}

#[derive(Debug, Default)]
pub struct DetailsPage {
    movie_id: Option<MovieId>,
    details: Request<MovieDetails>,
}

impl DetailsPage {
    pub fn mount(&mut self, id: MovieId) -> Ticket {
        self.movie_id = Some(id);
        self.details.begin()
    }

    pub fn unmount(&mut self) {
        self.movie_id = None;
        self.details.reset();
    }

    pub fn on_loaded(
        &mut self,
        ticket: Ticket,
        result: Result<Box<MovieDetails>, ApiError>,
    ) -> bool {
        self.details.resolve(ticket, result.map(|details| *details))
    }

    pub fn movie_id(&self) -> Option<MovieId> {
        self.movie_id
    }

    pub fn state(&self) -> &Remote<MovieDetails> {
        self.details.state()
    }

    pub fn image_urls(&self) -> Vec<String> {
        let Some(details) = self.details.ready() else {
            return Vec::new();
        };
        let mut urls = poster_urls(
            std::slice::from_ref(&details.movie.title),
            ImageFallback::Empty,
        );
        urls.extend(poster_urls(&details.recommendations, ImageFallback::Empty));
        urls
    }
}

impl MovieHub {
    pub fn view_details_page(&self) -> Element<'_, Message> {
        match self.details.state() {
            Remote::Idle | Remote::Loading => loading_view("Loading...", 480.0),
            Remote::Failed(error) => error_view(error, Message::Reload),
            Remote::Ready(details) => self.view_movie_details(details),
        }
    }

    fn view_movie_details<'a>(&'a self, details: &'a MovieDetails) -> Element<'a, Message> {
        let movie = &details.movie;
        let poster_url = image_src(
            movie.title.poster_path.as_deref(),
            ImageSize::Poster,
            ImageFallback::Empty,
        );
        let poster = self.view_image(&poster_url, POSTER_WIDTH, POSTER_HEIGHT);
        let info = self.view_details_info(details);

        let top: Element<Message> = if self.viewport.is_compact() {
            column![container(poster).center_x(Length::Fill), info]
                .spacing(24)
                .into()
        } else {
            row![poster, info].spacing(32).into()
        };

        let mut page = Column::new().push(top).spacing(48).padding(24);
        if !details.recommendations.is_empty() {
            page = page.push(
                column![
                    section_title("Recommended"),
                    self.view_title_grid(&details.recommendations, ImageFallback::Empty, false)
                ]
                .spacing(20),
            );
        }
        page.width(Length::Fill).into()
    }

    fn view_details_info<'a>(&'a self, details: &'a MovieDetails) -> Element<'a, Message> {
        let movie = &details.movie;
        let title = text(movie.title.display_title().to_string())
            .size(36)
            .color(TEXT_WHITE)
            .font(bold())
            .wrapping(text::Wrapping::Word);

        let mut facts = vec![movie.title.release_year()];
        if let Some(runtime) = movie.runtime.filter(|r| *r > 0) {
            facts.push(format_runtime(runtime));
        }
        if let Some(status) = movie.status.as_deref().filter(|s| !s.is_empty()) {
            facts.push(status.to_string());
        }
        let facts = text(facts.join(" • ")).size(14).color(TEXT_GRAY);

        let mut info = Column::new()
            .push(title)
            .push(facts)
            .push(crate::cards::rating_badge(movie.title.vote_average))
            .spacing(12)
            .width(Length::Fill);

        if let Some(tagline) = movie.tagline.as_deref().filter(|t| !t.is_empty()) {
            info = info.push(text(format!("\"{}\"", tagline)).size(16).color(TEXT_GRAY));
        }
        if !movie.title.overview.is_empty() {
            info = info.push(
                text(movie.title.overview.clone())
                    .size(16)
                    .color(TEXT_WHITE)
                    .wrapping(text::Wrapping::Word),
            );
        }
        if !movie.genres.is_empty() {
            let chips: Vec<Element<Message>> =
                movie.genres.iter().map(|g| chip(g.name.clone())).collect();
            info = info.push(Row::with_children(chips).spacing(8).wrap());
        }

        info.push(Space::new().height(8))
            .push(self.view_trailer_action(details))
            .into()
    }

    fn view_trailer_action(&self, details: &MovieDetails) -> Element<'_, Message> {
        match &details.trailer {
            Some(video) => primary_button(
                row![
                    icon(ICON_PLAY_FILL).size(16),
                    text("Watch Trailer").size(15).font(bold())
                ]
                .spacing(8)
                .align_y(iced::Alignment::Center)
                .into(),
                Message::OpenExternal(video.watch_url()),
            )
            .into(),
            None => column![
                text("Trailer not available").size(14).color(TEXT_GRAY),
                link_button(
                    "Search for the trailer on YouTube",
                    Message::OpenExternal(trailer_search_url(
                        details.movie.title.display_title()
                    )),
                ),
            ]
            .spacing(6)
            .into(),
        }
    }
}
