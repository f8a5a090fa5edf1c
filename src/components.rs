use chrono::Datelike;
use iced::widget::{button, column, container, row, scrollable, text, Column, Row, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow, Size};

use crate::media::{Message, ACCENT_RED, SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE};
use crate::remote::Remote;
use crate::router::Route;
use crate::MovieHub;

pub const PAGE_SCROLL_ID: &str = "page-scroll";
pub const HEADER_HEIGHT: f32 = 72.0;
const COMPACT_BREAKPOINT: f32 = 768.0;

pub const ICON_SEARCH: char = '\u{F52A}';
pub const ICON_STAR_FILL: char = '\u{F586}';
pub const ICON_STAR: char = '\u{F588}';
pub const ICON_ARROW_LEFT: char = '\u{F12F}';
pub const ICON_INFO_CIRCLE: char = '\u{F431}';
pub const ICON_PLAY_FILL: char = '\u{F4F4}';
pub const ICON_FILM: char = '\u{F3A9}';

pub fn icon(icon_char: char) -> iced::widget::Text<'static> {
    text(icon_char.to_string()).font(iced::Font {
        family: iced::font::Family::Name("bootstrap-icons"),
        ..Default::default()
    })
}

pub fn bold() -> iced::Font {
    iced::Font {
        weight: iced::font::Weight::Bold,
        ..Default::default()
    }
}

/// Window width and the layout breakpoint derived from it.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    width: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1280.0 }
    }
}

impl Viewport {
    pub fn resize(&mut self, size: Size) {
        self.width = size.width;
    }

    pub fn is_compact(&self) -> bool {
        self.width < COMPACT_BREAKPOINT
    }

    /// Cards per row for a grid of `card_width` wide cards.
    pub fn columns(&self, card_width: f32, spacing: f32, horizontal_padding: f32) -> usize {
        let usable = (self.width - horizontal_padding).max(card_width);
        (((usable + spacing) / (card_width + spacing)).floor() as usize).max(1)
    }
}

fn hidden_rail() -> scrollable::Rail {
    scrollable::Rail {
        background: None,
        border: Border::default(),
        scroller: scrollable::Scroller {
            background: iced::Background::Color(Color::TRANSPARENT),
            border: Border::default(),
        },
    }
}

pub fn hidden_scrollbar_style(_theme: &iced::Theme, _status: scrollable::Status) -> scrollable::Style {
    scrollable::Style {
        container: container::Style::default(),
        vertical_rail: hidden_rail(),
        horizontal_rail: hidden_rail(),
        gap: None,
        auto_scroll: scrollable::AutoScroll {
            background: iced::Background::Color(Color::TRANSPARENT),
            border: Border::default(),
            shadow: Shadow::default(),
            icon: Color::TRANSPARENT,
        },
    }
}

pub fn horizontal_strip<'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    scrollable(content)
        .direction(scrollable::Direction::Horizontal(
            scrollable::Scrollbar::new().width(0).scroller_width(0),
        ))
        .width(Length::Fill)
        .style(hidden_scrollbar_style)
        .into()
}

pub fn section_title(label: impl Into<String>) -> iced::widget::Text<'static> {
    text(label.into()).size(26).color(TEXT_WHITE).font(bold())
}

pub fn chip<'a>(label: impl Into<String>) -> Element<'a, Message> {
    container(text(label.into()).size(13).color(TEXT_WHITE))
        .padding(Padding::new(4.0).left(12.0).right(12.0))
        .style(|_theme| container::Style {
            background: Some(iced::Background::Color(Color::from_rgba(
                1.0, 1.0, 1.0, 0.1,
            ))),
            border: Border {
                color: Color::from_rgba(1.0, 1.0, 1.0, 0.2),
                width: 1.0,
                radius: 16.0.into(),
            },
            ..Default::default()
        })
        .into()
}

pub fn outline_button<'a>(
    label: Element<'a, Message>,
    message: Message,
) -> iced::widget::Button<'a, Message> {
    button(label)
        .padding(Padding::new(12.0).left(24.0).right(24.0))
        .style(|_theme, status| {
            let background_color = match status {
                button::Status::Hovered => Color::from_rgba(1.0, 1.0, 1.0, 0.1),
                _ => Color::TRANSPARENT,
            };
            button::Style {
                background: Some(iced::Background::Color(background_color)),
                text_color: TEXT_WHITE,
                border: Border {
                    color: TEXT_WHITE,
                    width: 1.0,
                    radius: 16.0.into(),
                },
                shadow: Shadow::default(),
                snap: false,
            }
        })
        .on_press(message)
}

pub fn primary_button<'a>(
    label: Element<'a, Message>,
    message: Message,
) -> iced::widget::Button<'a, Message> {
    button(label)
        .padding(Padding::new(12.0).left(24.0).right(24.0))
        .style(|_theme, status| {
            let background_color = match status {
                button::Status::Hovered => Color::from_rgb(0.85, 0.85, 0.85),
                _ => TEXT_WHITE,
            };
            button::Style {
                background: Some(iced::Background::Color(background_color)),
                text_color: Color::from_rgb(0.07, 0.07, 0.09),
                border: Border {
                    color: Color::TRANSPARENT,
                    width: 0.0,
                    radius: 16.0.into(),
                },
                shadow: Shadow::default(),
                snap: false,
            }
        })
        .on_press(message)
}

pub fn link_button<'a>(label: impl Into<String>, message: Message) -> Element<'a, Message> {
    button(text(label.into()).size(14))
        .padding(0)
        .style(|_theme, status| {
            let text_color = match status {
                button::Status::Hovered => TEXT_WHITE,
                _ => TEXT_GRAY,
            };
            button::Style {
                background: None,
                text_color,
                border: Border::default(),
                shadow: Shadow::default(),
                snap: false,
            }
        })
        .on_press(message)
        .into()
}

pub fn loading_view<'a>(label: &str, height: f32) -> Element<'a, Message> {
    container(text(label.to_string()).size(16).color(TEXT_GRAY))
        .width(Length::Fill)
        .height(Length::Fixed(height))
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

pub fn error_view<'a>(error_message: &str, retry: Message) -> Element<'a, Message> {
    let error_text = text(format!("Something went wrong: {}", error_message))
        .size(16)
        .color(ACCENT_RED);
    let retry_button = button(text("Retry").size(16).color(TEXT_WHITE))
        .padding(Padding::new(10.0).left(24.0).right(24.0))
        .style(|_theme, _status| button::Style {
            background: Some(iced::Background::Color(ACCENT_RED)),
            text_color: TEXT_WHITE,
            border: Border {
                color: Color::TRANSPARENT,
                width: 0.0,
                radius: 4.0.into(),
            },
            shadow: Shadow::default(),
            snap: false,
        })
        .on_press(retry);

    container(
        column![error_text, retry_button]
            .spacing(16)
            .align_x(iced::Alignment::Center),
    )
    .width(Length::Fill)
    .padding(48)
    .center_x(Length::Fill)
    .into()
}

/// Renders a remote value with the shared loading and failure views.
pub fn remote_view<'a, T>(
    state: &'a Remote<T>,
    loading_label: &str,
    retry: Message,
    ready: impl FnOnce(&'a T) -> Element<'a, Message>,
) -> Element<'a, Message> {
    match state {
        Remote::Idle | Remote::Loading => loading_view(loading_label, 240.0),
        Remote::Failed(error) => error_view(error, retry),
        Remote::Ready(value) => ready(value),
    }
}

pub fn skeleton_card<'a>(width: f32, height: f32) -> Element<'a, Message> {
    container(Space::new().width(width).height(height))
        .width(Length::Fixed(width))
        .height(Length::Fixed(height))
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
        .into()
}

pub fn skeleton_row<'a>(count: usize, width: f32, height: f32) -> Element<'a, Message> {
    let cards: Vec<Element<Message>> = (0..count).map(|_| skeleton_card(width, height)).collect();
    Row::with_children(cards).spacing(16).into()
}

impl MovieHub {
    /// Header over a scrollable page body.
    pub fn view_main_content(&self) -> Element<'_, Message> {
        let page: Element<Message> = match self.navigator.current() {
            Route::Home => self.view_home_page(),
            Route::MovieDetails(_) => self.view_details_page(),
            Route::Search { .. } => self.view_search_page(),
        };

        let side_padding = if self.viewport.is_compact() { 0.0 } else { 24.0 };
        let body = column![
            Space::new().height(HEADER_HEIGHT),
            container(page)
                .width(Length::Fill)
                .padding(Padding::new(0.0).left(side_padding).right(side_padding)),
            self.view_footer()
        ]
        .width(Length::Fill);

        let page_scroll = scrollable(body)
            .id(iced::widget::Id::new(PAGE_SCROLL_ID))
            .direction(scrollable::Direction::Vertical(
                scrollable::Scrollbar::new().width(0).scroller_width(0),
            ))
            .width(Length::Fill)
            .height(Length::Fill)
            .style(hidden_scrollbar_style);

        let base = iced::widget::stack![page_scroll, self.view_header()]
            .width(Length::Fill)
            .height(Length::Fill);

        if !self.header.is_dropdown_open() {
            return base.into();
        }

        let click_catcher = iced::widget::mouse_area(
            container(Space::new().width(Length::Fill).height(Length::Fill))
                .width(Length::Fill)
                .height(Length::Fill),
        )
        .on_press(Message::HeaderDropdownDismissed);

        iced::widget::stack![base, click_catcher, self.view_header_dropdown()]
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    pub fn view_footer(&self) -> Element<'_, Message> {
        let brand = column![
            text("MovieVerse").size(24).color(TEXT_WHITE).font(bold()),
            text("Your world of movies and entertainment.")
                .size(14)
                .color(TEXT_GRAY),
        ]
        .spacing(4);

        let links = row![
            link_button("Home", Message::Navigate(Route::Home)),
            link_button("Upcoming", Message::Navigate(Route::Home)),
            link_button("Genres", Message::Navigate(Route::Home)),
        ]
        .spacing(20);

        let top: Element<Message> = if self.viewport.is_compact() {
            column![brand, links].spacing(24).into()
        } else {
            row![brand, Space::new().width(Length::Fill), links]
                .align_y(iced::Alignment::Center)
                .into()
        };

        let year = chrono::Local::now().year();
        let copyright = container(
            text(format!("© {} MovieVerse. All rights reserved.", year))
                .size(13)
                .color(TEXT_GRAY),
        )
        .width(Length::Fill)
        .center_x(Length::Fill)
        .padding(16);

        container(
            Column::new()
                .push(container(top).padding(Padding::new(40.0).left(24.0).right(24.0)))
                .push(copyright),
        )
        .width(Length::Fill)
        .style(|_theme| container::Style {
            background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
            border: Border {
                color: Color::from_rgba(1.0, 1.0, 1.0, 0.1),
                width: 1.0,
                radius: 0.0.into(),
            },
            ..Default::default()
        })
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_follows_width() {
        let mut viewport = Viewport::default();
        assert!(!viewport.is_compact());
        viewport.resize(Size::new(600.0, 800.0));
        assert!(viewport.is_compact());
        viewport.resize(Size::new(768.0, 800.0));
        assert!(!viewport.is_compact());
    }

    #[test]
    fn grid_columns_never_zero() {
        let mut viewport = Viewport::default();
        viewport.resize(Size::new(100.0, 600.0));
        assert_eq!(viewport.columns(180.0, 16.0, 48.0), 1);
        viewport.resize(Size::new(1280.0, 720.0));
        assert_eq!(viewport.columns(180.0, 16.0, 48.0), 6);
    }
}
