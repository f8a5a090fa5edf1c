use iced::widget::{button, column, text, Row};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::components::{error_view, horizontal_strip, loading_view, section_title};
use crate::media::{ApiError, GenreId, Message, Title, TEXT_GRAY, TEXT_WHITE};
use crate::remote::{Remote, Request, Ticket};
use crate::tmdb::ImageFallback;
use crate::MovieHub;

/// TMDB id of the Action genre.
pub const DEFAULT_GENRE: GenreId = 28;

#[derive(Debug)]
pub struct GenreFilter {
    selected: GenreId,
    movies: Request<Vec<Title>>,
}

impl Default for GenreFilter {
    fn default() -> Self {
        Self {
            selected: DEFAULT_GENRE,
            movies: Request::default(),
        }
    }
}

impl GenreFilter {
    /// Fetches the current selection again, keeping it across visits.
    pub fn mount(&mut self) -> (Ticket, GenreId) {
        (self.movies.begin(), self.selected)
    }

    pub fn unmount(&mut self) {
        self.movies.reset();
    }

    /// Begins a fetch unless `genre_id` is already shown or on its way.
    pub fn select(&mut self, genre_id: GenreId) -> Option<Ticket> {
        if genre_id == self.selected && !self.movies.is_failed() {
            return None;
        }
        self.selected = genre_id;
        Some(self.movies.begin())
    }

    pub fn retry(&mut self) -> (Ticket, GenreId) {
        (self.movies.begin(), self.selected)
    }

    pub fn on_loaded(&mut self, ticket: Ticket, result: Result<Vec<Title>, ApiError>) -> bool {
        self.movies.resolve(ticket, result)
    }

    pub fn selected(&self) -> GenreId {
        self.selected
    }

    pub fn state(&self) -> &Remote<Vec<Title>> {
        self.movies.state()
    }
}

fn genre_chip<'a>(name: &str, genre_id: GenreId, is_selected: bool) -> Element<'a, Message> {
    button(text(name.to_string()).size(14))
        .padding(Padding::new(8.0).left(20.0).right(20.0))
        .style(move |_theme, status| {
            let (background, text_color, border_color) = match (is_selected, status) {
                (true, _) => (TEXT_WHITE, Color::from_rgb(0.07, 0.07, 0.09), Color::TRANSPARENT),
                (false, button::Status::Hovered) => (
                    Color::from_rgba(1.0, 1.0, 1.0, 0.1),
                    TEXT_WHITE,
                    Color::from_rgba(1.0, 1.0, 1.0, 0.4),
                ),
                (false, _) => (
                    Color::TRANSPARENT,
                    TEXT_WHITE,
                    Color::from_rgba(1.0, 1.0, 1.0, 0.4),
                ),
            };
            button::Style {
                background: Some(iced::Background::Color(background)),
                text_color,
                border: Border {
                    color: border_color,
                    width: 1.0,
                    radius: 20.0.into(),
                },
                shadow: Shadow::default(),
                snap: false,
            }
        })
        .on_press(Message::GenreSelected(genre_id))
        .into()
}

impl MovieHub {
    pub fn view_genre_filter(&self) -> Element<'_, Message> {
        let selected = self.genre_filter.selected();
        let chips: Vec<Element<Message>> = self
            .genres
            .genres()
            .iter()
            .map(|genre| genre_chip(&genre.name, genre.id, genre.id == selected))
            .collect();

        let chip_row: Element<Message> = if self.genres.is_empty() {
            text("Genres unavailable").size(14).color(TEXT_GRAY).into()
        } else {
            horizontal_strip(Row::with_children(chips).spacing(12).padding(4))
        };

        let grid: Element<Message> = match self.genre_filter.state() {
            Remote::Idle | Remote::Loading => loading_view("Loading movies...", 240.0),
            Remote::Failed(error) => error_view(error, Message::GenreRetry),
            Remote::Ready(titles) if titles.is_empty() => {
                loading_view("No movies in this category", 120.0)
            }
            Remote::Ready(titles) => self.view_title_grid(titles, ImageFallback::Empty, true),
        };

        column![section_title("Categories"), chip_row, grid]
            .spacing(20)
            .padding(Padding::new(24.0))
            .width(Length::Fill)
            .into()
    }
}
