use iced::widget::{column, container, Row};
use iced::{Element, Length, Padding};

use crate::components::{horizontal_strip, remote_view, section_title, skeleton_row};
use crate::media::{ApiError, Message, Title};
use crate::remote::{Remote, Request, Ticket};
use crate::tmdb::{image_src, ImageFallback, ImageSize};
use crate::MovieHub;

/// The "Coming Soon" row on the home page.
#[derive(Debug, Default)]
pub struct HomePage {
    upcoming: Request<Vec<Title>>,
}

impl HomePage {
    pub fn mount(&mut self) -> Ticket {
        self.upcoming.begin()
    }

    pub fn unmount(&mut self) {
        self.upcoming.reset();
    }

    pub fn on_loaded(&mut self, ticket: Ticket, result: Result<Vec<Title>, ApiError>) -> bool {
        self.upcoming.resolve(ticket, result)
    }

    pub fn state(&self) -> &Remote<Vec<Title>> {
        self.upcoming.state()
    }

    pub fn poster_urls(&self) -> Vec<String> {
        self.upcoming
            .ready()
            .map(|titles| poster_urls(titles, ImageFallback::Empty))
            .unwrap_or_default()
    }
}

/// Poster URLs worth fetching for `titles`; missing posters are skipped.
pub fn poster_urls(titles: &[Title], fallback: ImageFallback) -> Vec<String> {
    titles
        .iter()
        .map(|t| image_src(t.poster_path.as_deref(), ImageSize::Poster, fallback))
        .filter(|url| !url.is_empty())
        .collect()
}

impl MovieHub {
    pub fn view_home_page(&self) -> Element<'_, Message> {
        let hero = container(self.view_hero_section())
            .width(Length::Fill)
            .padding(Padding::new(24.0).bottom(0.0));

        column![hero, self.view_genre_filter(), self.view_coming_soon()]
            .spacing(16)
            .width(Length::Fill)
            .into()
    }

    fn view_coming_soon(&self) -> Element<'_, Message> {
        let body = match self.home.state() {
            Remote::Idle | Remote::Loading => horizontal_strip(skeleton_row(6, 220.0, 225.0)),
            state => remote_view(state, "Loading...", Message::Reload, |titles| {
                let cards: Vec<Element<Message>> = titles
                    .iter()
                    .enumerate()
                    .map(|(i, title)| self.view_ranked_card(i + 1, title))
                    .collect();
                horizontal_strip(Row::with_children(cards).spacing(24).padding(8))
            }),
        };

        column![section_title("Coming Soon"), body]
            .spacing(16)
            .padding(Padding::new(24.0))
            .width(Length::Fill)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmdb::fake::title;

    #[test]
    fn poster_urls_skip_missing_posters() {
        let mut no_poster = title(2, "b");
        no_poster.poster_path = None;
        let titles = vec![title(1, "a"), no_poster];

        assert_eq!(
            poster_urls(&titles, ImageFallback::Empty),
            vec!["https://image.tmdb.org/t/p/w500/poster-1.jpg"]
        );
        assert_eq!(poster_urls(&titles, ImageFallback::Placeholder).len(), 2);
    }

    #[test]
    fn upcoming_failure_is_reported() {
        let mut home = HomePage::default();
        let ticket = home.mount();
        assert!(home.on_loaded(ticket, Err(ApiError::Unauthorized)));
        assert_eq!(
            home.state(),
            &Remote::Failed("the API key was rejected".into())
        );
        assert!(home.poster_urls().is_empty());
    }
}
