use std::time::Duration;

use iced::widget::{column, container, row, text, Row, Space};
use iced::{Border, Color, Element, Length, Padding};

use crate::components::{
    bold, chip, error_view, icon, loading_view, outline_button, primary_button, ICON_INFO_CIRCLE,
    ICON_PLAY_FILL,
};
use crate::media::{ApiError, Message, Title, ACCENT_RED, TEXT_GRAY, TEXT_WHITE};
use crate::remote::{Remote, Request, Ticket};
use crate::router::Route;
use crate::tmdb::{image_src, ImageFallback, ImageSize};
use crate::video::trailer_search_url;
use crate::MovieHub;

pub const CAROUSEL_INTERVAL: Duration = Duration::from_secs(5);
const HERO_HEIGHT: f32 = 480.0;
const COMPACT_BACKDROP_HEIGHT: f32 = 220.0;
const MAX_SLIDE_GENRES: usize = 3;

/// Index into a title sequence that wraps around its length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    index: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { len, index: 0 }
    }

    pub fn advance(&mut self) {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub fn select(&mut self, index: usize) {
        if index < self.len {
            self.index = index;
        }
    }

    /// A new sequence starts over from the first slide.
    pub fn replace(&mut self, len: usize) {
        *self = Self::new(len);
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The item on screen, when `items` is the sequence this carousel was sized for.
    pub fn current<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        items.get(self.index)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Debug, Default)]
pub struct HeroCarousel {
    popular: Request<Vec<Title>>,
    carousel: Carousel,
}

impl HeroCarousel {
    pub fn mount(&mut self) -> Ticket {
        self.carousel.replace(0);
        self.popular.begin()
    }

    pub fn unmount(&mut self) {
        self.popular.reset();
        self.carousel.replace(0);
    }

    pub fn on_loaded(&mut self, ticket: Ticket, result: Result<Vec<Title>, ApiError>) -> bool {
        if !self.popular.resolve(ticket, result) {
            return false;
        }
        let len = self.popular.ready().map_or(0, Vec::len);
        self.carousel.replace(len);
        true
    }

    pub fn tick(&mut self) {
        self.carousel.advance();
    }

    pub fn select(&mut self, index: usize) {
        self.carousel.select(index);
    }

    pub fn current(&self) -> Option<&Title> {
        self.carousel.current(self.popular.ready()?)
    }

    /// The timer only runs while there is something to rotate.
    pub fn is_ticking(&self) -> bool {
        !self.carousel.is_empty()
    }

    pub fn index(&self) -> usize {
        self.carousel.index()
    }

    pub fn state(&self) -> &Remote<Vec<Title>> {
        self.popular.state()
    }

    /// Images for the slide on screen and the one after it.
    pub fn image_urls(&self) -> Vec<String> {
        let Some(titles) = self.popular.ready() else {
            return Vec::new();
        };
        if titles.is_empty() {
            return Vec::new();
        }
        let next = (self.carousel.index() + 1) % titles.len();
        [self.carousel.index(), next]
            .iter()
            .filter_map(|&i| titles.get(i))
            .flat_map(|title| {
                let backdrop = title.backdrop_path.as_deref();
                let poster = title.poster_path.as_deref();
                [
                    image_src(backdrop, ImageSize::Backdrop, ImageFallback::Empty),
                    image_src(poster, ImageSize::Poster, ImageFallback::Empty),
                ]
            })
            .filter(|url| !url.is_empty())
            .collect()
    }
}

impl MovieHub {
    pub fn view_hero_section(&self) -> Element<'_, Message> {
        match self.hero.state() {
            Remote::Idle | Remote::Loading => loading_view("Loading...", HERO_HEIGHT),
            Remote::Failed(error) => error_view(error, Message::Reload),
            Remote::Ready(_) => match self.hero.current() {
                Some(title) if self.viewport.is_compact() => self.view_hero_compact(title),
                Some(title) => self.view_hero_wide(title),
                None => loading_view("No popular movies right now", HERO_HEIGHT),
            },
        }
    }

    fn slide_genres(&self, title: &Title) -> Vec<Element<'_, Message>> {
        self.genres
            .names_for(&title.genre_ids)
            .into_iter()
            .take(MAX_SLIDE_GENRES)
            .map(chip)
            .collect()
    }

    fn view_hero_rating(&self, title: &Title) -> Element<'_, Message> {
        container(crate::cards::rating_badge(title.vote_average))
            .padding(Padding::new(8.0).left(16.0).right(16.0))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(Color::from_rgba(
                    0.0, 0.0, 0.0, 0.5,
                ))),
                border: Border {
                    color: TEXT_GRAY,
                    width: 1.0,
                    radius: 20.0.into(),
                },
                ..Default::default()
            })
            .into()
    }

    fn view_hero_buttons(&self, title: &Title) -> Element<'_, Message> {
        let play = primary_button(
            row![icon(ICON_PLAY_FILL).size(16), text("Play").size(15).font(bold())]
                .spacing(8)
                .align_y(iced::Alignment::Center)
                .into(),
            Message::OpenExternal(trailer_search_url(title.display_title())),
        );
        let more_info = outline_button(
            row![icon(ICON_INFO_CIRCLE).size(16), text("More Info").size(15).font(bold())]
                .spacing(8)
                .align_y(iced::Alignment::Center)
                .into(),
            Message::Navigate(Route::for_title(title)),
        );
        row![play, more_info].spacing(16).into()
    }

    fn view_slide_dots(&self) -> Element<'_, Message> {
        let count = self.hero.state().ready().map_or(0, Vec::len);
        let current = self.hero.index();
        let dots: Vec<Element<Message>> = (0..count)
            .map(|i| {
                let color = if i == current {
                    ACCENT_RED
                } else {
                    Color::from_rgba(1.0, 1.0, 1.0, 0.4)
                };
                let width = if i == current { 20.0 } else { 8.0 };
                iced::widget::mouse_area(
                    container(Space::new().width(width).height(8)).style(move |_theme| {
                        container::Style {
                            background: Some(iced::Background::Color(color)),
                            border: Border {
                                color: Color::TRANSPARENT,
                                width: 0.0,
                                radius: 4.0.into(),
                            },
                            ..Default::default()
                        }
                    }),
                )
                .on_press(Message::CarouselSelect(i))
                .interaction(iced::mouse::Interaction::Pointer)
                .into()
            })
            .collect();
        Row::with_children(dots)
            .spacing(6)
            .align_y(iced::Alignment::Center)
            .into()
    }

    fn view_hero_wide(&self, title: &Title) -> Element<'_, Message> {
        let backdrop_url = image_src(
            title.backdrop_path.as_deref(),
            ImageSize::Backdrop,
            ImageFallback::Empty,
        );
        let poster_url = image_src(
            title.poster_path.as_deref(),
            ImageSize::Poster,
            ImageFallback::Empty,
        );

        let backdrop: Element<Message> = match self.image_cache.get(&backdrop_url) {
            Some(handle) => iced::widget::image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fixed(HERO_HEIGHT))
                .content_fit(iced::ContentFit::Cover)
                .into(),
            None => Space::new().width(Length::Fill).height(HERO_HEIGHT).into(),
        };

        let left = column![
            self.view_image(&poster_url, 200.0, 240.0),
            text(title.display_title().to_string())
                .size(36)
                .color(TEXT_WHITE)
                .font(bold())
                .wrapping(text::Wrapping::Word),
        ]
        .spacing(12)
        .max_width(420.0);

        let left_panel = container(left)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(32)
            .align_y(iced::alignment::Vertical::Center)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Gradient(iced::Gradient::Linear(
                    iced::gradient::Linear::new(std::f32::consts::FRAC_PI_2)
                        .add_stop(0.0, Color::from_rgba(0.0, 0.0, 0.0, 0.8))
                        .add_stop(0.5, Color::from_rgba(0.0, 0.0, 0.0, 0.5))
                        .add_stop(1.0, Color::TRANSPARENT),
                ))),
                ..Default::default()
            });

        let top_right = container(
            column![
                Row::with_children(self.slide_genres(title)).spacing(8),
                self.view_hero_rating(title),
            ]
            .spacing(8)
            .align_x(iced::Alignment::End),
        )
        .width(Length::Fill)
        .padding(24)
        .align_x(iced::alignment::Horizontal::Right)
        .align_y(iced::alignment::Vertical::Top);

        let bottom_right = container(self.view_hero_buttons(title))
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(32)
            .align_x(iced::alignment::Horizontal::Right)
            .align_y(iced::alignment::Vertical::Bottom);

        let dots = container(self.view_slide_dots())
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(16)
            .center_x(Length::Fill)
            .align_y(iced::alignment::Vertical::Bottom);

        container(
            iced::widget::stack![backdrop, left_panel, top_right, bottom_right, dots]
                .width(Length::Fill)
                .height(Length::Fixed(HERO_HEIGHT)),
        )
        .clip(true)
        .into()
    }

    fn view_hero_compact(&self, title: &Title) -> Element<'_, Message> {
        let backdrop_url = image_src(
            title.backdrop_path.as_deref(),
            ImageSize::Backdrop,
            ImageFallback::Empty,
        );

        let backdrop: Element<Message> = match self.image_cache.get(&backdrop_url) {
            Some(handle) => iced::widget::image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fixed(COMPACT_BACKDROP_HEIGHT))
                .content_fit(iced::ContentFit::Cover)
                .into(),
            None => Space::new()
                .width(Length::Fill)
                .height(COMPACT_BACKDROP_HEIGHT)
                .into(),
        };

        column![
            backdrop,
            column![
                text(title.display_title().to_string())
                    .size(24)
                    .color(TEXT_WHITE)
                    .font(bold())
                    .wrapping(text::Wrapping::Word),
                row![
                    self.view_hero_rating(title),
                    Row::with_children(self.slide_genres(title)).spacing(6)
                ]
                .spacing(8)
                .align_y(iced::Alignment::Center),
                self.view_hero_buttons(title),
                container(self.view_slide_dots()).center_x(Length::Fill),
            ]
            .spacing(12)
            .padding(16),
        ]
        .width(Length::Fill)
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmdb::fake::title;

    #[test]
    fn index_wraps_modulo_length() {
        let mut carousel = Carousel::new(5);
        for _ in 0..12 {
            carousel.advance();
        }
        assert_eq!(carousel.index(), 2);

        let slides = ["a", "b", "c", "d", "e"];
        assert_eq!(carousel.current(&slides), Some(&"c"));
        assert_eq!(Carousel::default().current(&slides), Some(&"a"));
        assert_eq!(Carousel::new(0).current::<&str>(&[]), None);
    }

    #[test]
    fn empty_carousel_never_moves() {
        let mut carousel = Carousel::default();
        carousel.advance();
        carousel.select(3);
        assert_eq!(carousel.index(), 0);
        assert!(carousel.is_empty());
    }

    #[test]
    fn replacing_the_sequence_starts_over() {
        let mut carousel = Carousel::new(4);
        carousel.advance();
        carousel.advance();
        carousel.replace(3);
        assert_eq!(carousel, Carousel::new(3));

        carousel.select(2);
        assert_eq!(carousel.index(), 2);
        carousel.select(7);
        assert_eq!(carousel.index(), 2);
    }

    #[test]
    fn controller_rotates_only_loaded_titles() {
        let mut hero = HeroCarousel::default();
        let ticket = hero.mount();
        assert!(!hero.is_ticking());
        assert!(hero.current().is_none());

        let titles = (1..=3).map(|id| title(id, "popular")).collect();
        assert!(hero.on_loaded(ticket, Ok(titles)));
        assert!(hero.is_ticking());
        assert_eq!(hero.current().map(|t| t.id), Some(1));

        for _ in 0..4 {
            hero.tick();
        }
        assert_eq!(hero.current().map(|t| t.id), Some(2));
    }

    #[test]
    fn failed_fetch_leaves_nothing_to_rotate() {
        let mut hero = HeroCarousel::default();
        let ticket = hero.mount();
        hero.on_loaded(ticket, Err(ApiError::Status(500)));
        assert!(!hero.is_ticking());
        assert!(matches!(hero.state(), Remote::Failed(_)));
    }

    #[test]
    fn prefetches_current_and_next_slide() {
        let mut hero = HeroCarousel::default();
        let ticket = hero.mount();
        let mut first = title(1, "a");
        first.backdrop_path = Some(String::from("/b1.jpg"));
        hero.on_loaded(ticket, Ok(vec![first, title(2, "b")]));
        assert_eq!(
            hero.image_urls(),
            vec![
                "https://image.tmdb.org/t/p/original/b1.jpg",
                "https://image.tmdb.org/t/p/w500/poster-1.jpg",
                "https://image.tmdb.org/t/p/w500/poster-2.jpg",
            ]
        );
    }
}
