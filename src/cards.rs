use iced::widget::{column, container, row, text, Column, Row, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::components::{icon, ICON_FILM, ICON_STAR, ICON_STAR_FILL};
use crate::media::{
    filled_stars, format_rating, truncate_description, Message, Title, STAR_YELLOW,
    SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE,
};
use crate::router::Route;
use crate::tmdb::{image_src, ImageFallback, ImageSize};
use crate::MovieHub;

pub const GRID_CARD_WIDTH: f32 = 180.0;
pub const GRID_POSTER_HEIGHT: f32 = 270.0;
const GRID_SPACING: f32 = 16.0;
const RANKED_POSTER_WIDTH: f32 = 150.0;
const RANKED_POSTER_HEIGHT: f32 = 225.0;
const NO_DESCRIPTION: &str = "No description available.";

fn card_style(_theme: &iced::Theme) -> container::Style {
    container::Style {
        background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
        border: Border {
            color: Color::TRANSPARENT,
            width: 0.0,
            radius: 8.0.into(),
        },
        shadow: Shadow {
            color: Color::from_rgba(0.0, 0.0, 0.0, 0.3),
            offset: iced::Vector::new(0.0, 4.0),
            blur_radius: 8.0,
        },
        ..Default::default()
    }
}

pub fn star_row<'a>(vote_average: f32, size: f32) -> Element<'a, Message> {
    let filled = filled_stars(vote_average);
    let stars: Vec<Element<Message>> = (0..5)
        .map(|i| {
            let glyph = if i < filled { ICON_STAR_FILL } else { ICON_STAR };
            icon(glyph).size(size).color(STAR_YELLOW).into()
        })
        .collect();
    Row::with_children(stars).spacing(2).into()
}

pub fn rating_badge<'a>(vote_average: f32) -> Element<'a, Message> {
    row![
        icon(ICON_STAR_FILL).size(14).color(STAR_YELLOW),
        text(format_rating(vote_average)).size(14).color(TEXT_WHITE),
    ]
    .spacing(6)
    .align_y(iced::Alignment::Center)
    .into()
}

impl MovieHub {
    /// Cached image for `url`, or a dark box while it loads or when there is no image.
    pub fn view_image(&self, url: &str, width: f32, height: f32) -> Element<'_, Message> {
        match self.image_cache.get(url) {
            Some(handle) => container(
                iced::widget::image(handle.clone())
                    .width(Length::Fixed(width))
                    .height(Length::Fixed(height))
                    .content_fit(iced::ContentFit::Cover),
            )
            .style(|_theme| container::Style {
                border: Border {
                    color: Color::TRANSPARENT,
                    width: 0.0,
                    radius: 8.0.into(),
                },
                ..Default::default()
            })
            .into(),
            None => container(icon(ICON_FILM).size(32).color(TEXT_GRAY))
                .width(Length::Fixed(width))
                .height(Length::Fixed(height))
                .center_x(Length::Fixed(width))
                .center_y(Length::Fixed(height))
                .style(|_theme| container::Style {
                    background: Some(iced::Background::Color(Color::from_rgba(
                        0.2, 0.2, 0.2, 0.5,
                    ))),
                    border: Border {
                        color: Color::TRANSPARENT,
                        width: 0.0,
                        radius: 8.0.into(),
                    },
                    ..Default::default()
                })
                .into(),
        }
    }

    pub fn view_grid_card(
        &self,
        title: &Title,
        fallback: ImageFallback,
        show_overview: bool,
    ) -> Element<'_, Message> {
        let poster_url = image_src(title.poster_path.as_deref(), ImageSize::Poster, fallback);
        let poster = self.view_image(&poster_url, GRID_CARD_WIDTH, GRID_POSTER_HEIGHT);

        let name = text(title.display_title().to_string())
            .size(15)
            .color(TEXT_WHITE)
            .wrapping(text::Wrapping::Word);
        let year = text(title.release_year()).size(13).color(TEXT_GRAY);

        let meta = row![
            year,
            Space::new().width(Length::Fill),
            star_row(title.vote_average, 11.0)
        ]
        .align_y(iced::Alignment::Center);

        let mut info = column![name, meta]
            .spacing(6)
            .padding(Padding::new(10.0).top(8.0));

        if show_overview {
            let overview = if title.overview.is_empty() {
                String::from(NO_DESCRIPTION)
            } else {
                truncate_description(&title.overview, 90)
            };
            info = info.push(text(overview).size(12).color(TEXT_GRAY));
        }

        let card = container(column![poster, info])
            .width(Length::Fixed(GRID_CARD_WIDTH))
            .style(card_style);

        iced::widget::mouse_area(card)
            .on_press(Message::Navigate(Route::for_title(title)))
            .interaction(iced::mouse::Interaction::Pointer)
            .into()
    }

    /// Cards wrapped into rows that fit the current window width.
    pub fn view_title_grid<'a>(
        &'a self,
        titles: &'a [Title],
        fallback: ImageFallback,
        show_overview: bool,
    ) -> Element<'a, Message> {
        let columns = self.viewport.columns(GRID_CARD_WIDTH, GRID_SPACING, 96.0);
        let rows: Vec<Element<Message>> = titles
            .chunks(columns)
            .map(|chunk| {
                let cards: Vec<Element<Message>> = chunk
                    .iter()
                    .map(|title| self.view_grid_card(title, fallback, show_overview))
                    .collect();
                Row::with_children(cards)
                    .spacing(GRID_SPACING)
                    .align_y(iced::Alignment::Start)
                    .into()
            })
            .collect();

        container(Column::with_children(rows).spacing(GRID_SPACING))
            .width(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    pub fn view_ranked_card(&self, rank: usize, title: &Title) -> Element<'_, Message> {
        let poster_url = image_src(
            title.poster_path.as_deref(),
            ImageSize::Poster,
            ImageFallback::Empty,
        );
        let number = text(rank.to_string())
            .size(96)
            .color(Color::from_rgba(1.0, 1.0, 1.0, 0.85))
            .font(crate::components::bold());

        let poster = container(self.view_image(
            &poster_url,
            RANKED_POSTER_WIDTH,
            RANKED_POSTER_HEIGHT,
        ))
        .style(card_style);

        let card = row![number, poster]
            .spacing(4)
            .align_y(iced::Alignment::End);

        iced::widget::mouse_area(card)
            .on_press(Message::Navigate(Route::for_title(title)))
            .interaction(iced::mouse::Interaction::Pointer)
            .into()
    }

    pub fn view_dropdown_entry(&self, title: &Title) -> Element<'_, Message> {
        let poster_url = image_src(
            title.poster_path.as_deref(),
            ImageSize::Poster,
            ImageFallback::Empty,
        );
        let entry = row![
            self.view_image(&poster_url, 40.0, 60.0),
            column![
                text(title.display_title().to_string())
                    .size(14)
                    .color(TEXT_WHITE),
                text(title.release_year()).size(12).color(TEXT_GRAY),
            ]
            .spacing(4),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center);

        iced::widget::mouse_area(container(entry).padding(8).width(Length::Fill))
            .on_press(Message::Navigate(Route::for_title(title)))
            .interaction(iced::mouse::Interaction::Pointer)
            .into()
    }
}
