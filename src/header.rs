use std::time::{Duration, Instant};

use iced::widget::{button, column, container, row, text, text_input, Column, Space};
use iced::{Border, Color, Element, Length, Padding, Shadow};

use crate::components::{bold, icon, HEADER_HEIGHT, ICON_ARROW_LEFT, ICON_SEARCH};
use crate::debounce::{DebounceTicket, Debouncer};
use crate::home::poster_urls;
use crate::media::{
    ApiError, Message, Title, ACCENT_RED, SURFACE_DARK_GRAY, TEXT_GRAY, TEXT_WHITE,
};
use crate::remote::{Remote, Request, Ticket};
use crate::router::Route;
use crate::tmdb::ImageFallback;
use crate::MovieHub;

pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(400);
pub const MIN_QUERY_CHARS: usize = 2;
pub const MAX_DROPDOWN_RESULTS: usize = 6;
const DROPDOWN_WIDTH: f32 = 360.0;

/// The header's quick search. Its query is independent of the search page.
#[derive(Debug)]
pub struct HeaderSearch {
    input: String,
    debouncer: Debouncer<String>,
    results: Request<Vec<Title>>,
    dropdown_open: bool,
}

impl Default for HeaderSearch {
    fn default() -> Self {
        Self {
            input: String::new(),
            debouncer: Debouncer::new(DEBOUNCE_DELAY),
            results: Request::default(),
            dropdown_open: false,
        }
    }
}

impl HeaderSearch {
    /// Records a keystroke. Returns a ticket to wake up with once the input has settled.
    pub fn on_input(&mut self, value: String, now: Instant) -> Option<DebounceTicket> {
        self.input = value;
        let query = self.input.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            self.debouncer.cancel();
            self.results.reset();
            self.dropdown_open = false;
            return None;
        }
        Some(self.debouncer.push(query.to_string(), now))
    }

    /// Starts the search if `ticket` is for the latest keystroke.
    pub fn on_debounce_elapsed(
        &mut self,
        ticket: DebounceTicket,
        now: Instant,
    ) -> Option<(Ticket, String)> {
        let query = self.debouncer.fire(ticket, now)?;
        self.dropdown_open = true;
        Some((self.results.begin(), query))
    }

    pub fn on_results(&mut self, ticket: Ticket, result: Result<Vec<Title>, ApiError>) -> bool {
        let result = result.map(|mut titles| {
            titles.truncate(MAX_DROPDOWN_RESULTS);
            titles
        });
        self.results.resolve(ticket, result)
    }

    pub fn dismiss(&mut self) {
        self.dropdown_open = false;
    }

    pub fn debounce_delay(&self) -> Duration {
        self.debouncer.delay()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_dropdown_open(&self) -> bool {
        self.dropdown_open && !matches!(self.results.state(), Remote::Idle)
    }

    pub fn state(&self) -> &Remote<Vec<Title>> {
        self.results.state()
    }

    /// Where "See all results" leads, if the input holds anything.
    pub fn see_all_route(&self) -> Option<Route> {
        let query = self.input.trim();
        (!query.is_empty()).then(|| Route::search(query))
    }

    pub fn poster_urls(&self) -> Vec<String> {
        self.results
            .ready()
            .map(|titles| poster_urls(titles, ImageFallback::Empty))
            .unwrap_or_default()
    }
}

impl MovieHub {
    pub fn view_header(&self) -> Element<'_, Message> {
        let logo_mark = container(text("M").size(18).color(TEXT_WHITE).font(bold()))
            .width(Length::Fixed(32.0))
            .height(Length::Fixed(32.0))
            .center_x(Length::Fixed(32.0))
            .center_y(Length::Fixed(32.0))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(ACCENT_RED)),
                border: Border {
                    color: Color::TRANSPARENT,
                    width: 0.0,
                    radius: 6.0.into(),
                },
                ..Default::default()
            });

        let mut brand = row![logo_mark].spacing(8).align_y(iced::Alignment::Center);
        if !self.viewport.is_compact() {
            brand = brand.push(text("MovieHub").size(20).color(TEXT_WHITE).font(bold()));
        }
        let logo = iced::widget::mouse_area(brand)
            .on_press(Message::Navigate(Route::Home))
            .interaction(iced::mouse::Interaction::Pointer);

        let mut left = row![].spacing(16).align_y(iced::Alignment::Center);
        if self.navigator.can_go_back() {
            left = left.push(
                button(icon(ICON_ARROW_LEFT).size(18).color(TEXT_WHITE))
                    .padding(8)
                    .style(|_theme, status| {
                        let background_color = match status {
                            button::Status::Hovered => Color::from_rgba(1.0, 1.0, 1.0, 0.1),
                            _ => Color::TRANSPARENT,
                        };
                        button::Style {
                            background: Some(iced::Background::Color(background_color)),
                            text_color: TEXT_WHITE,
                            border: Border {
                                color: Color::TRANSPARENT,
                                width: 0.0,
                                radius: 20.0.into(),
                            },
                            shadow: Shadow::default(),
                            snap: false,
                        }
                    })
                    .on_press(Message::NavigateBack),
            );
        }
        left = left.push(logo);

        let bar = row![left, Space::new().width(Length::Fill), self.view_header_search_box()]
            .align_y(iced::Alignment::Center)
            .padding(Padding::new(0.0).left(24.0).right(24.0))
            .height(Length::Fixed(HEADER_HEIGHT));

        container(bar)
            .width(Length::Fill)
            .height(Length::Fixed(HEADER_HEIGHT))
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(Color::from_rgba(
                    0.0, 0.0, 0.0, 0.85,
                ))),
                border: Border {
                    color: Color::from_rgba(1.0, 1.0, 1.0, 0.1),
                    width: 1.0,
                    radius: 0.0.into(),
                },
                ..Default::default()
            })
            .into()
    }

    fn view_header_search_box(&self) -> Element<'_, Message> {
        let width = if self.viewport.is_compact() {
            180.0
        } else {
            280.0
        };
        let search_icon = icon(ICON_SEARCH).size(14).color(TEXT_GRAY);
        let search_input = text_input("Search movies...", self.header.input())
            .on_input(Message::HeaderQueryChanged)
            .padding(8)
            .size(14)
            .width(Length::Fill)
            .style(|_theme, _status| text_input::Style {
                background: iced::Background::Color(Color::TRANSPARENT),
                border: Border::default(),
                icon: TEXT_GRAY,
                placeholder: TEXT_GRAY,
                value: TEXT_WHITE,
                selection: ACCENT_RED,
            });

        container(
            row![search_icon, search_input]
                .spacing(8)
                .align_y(iced::Alignment::Center),
        )
        .width(Length::Fixed(width))
        .padding(Padding::new(2.0).left(12.0).right(8.0))
        .style(|_theme| container::Style {
            background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
            border: Border {
                color: Color::from_rgba(1.0, 1.0, 1.0, 0.2),
                width: 1.0,
                radius: 8.0.into(),
            },
            ..Default::default()
        })
        .into()
    }

    /// Results panel anchored under the search box.
    pub fn view_header_dropdown(&self) -> Element<'_, Message> {
        let body: Element<Message> = match self.header.state() {
            Remote::Idle | Remote::Loading => {
                text("Searching...").size(14).color(TEXT_GRAY).into()
            }
            Remote::Failed(error) => text(format!("Search failed: {}", error))
                .size(14)
                .color(ACCENT_RED)
                .into(),
            Remote::Ready(titles) if titles.is_empty() => {
                text("No results").size(14).color(TEXT_GRAY).into()
            }
            Remote::Ready(titles) => Column::with_children(
                titles
                    .iter()
                    .map(|title| self.view_dropdown_entry(title))
                    .collect::<Vec<_>>(),
            )
            .spacing(2)
            .into(),
        };

        let mut panel = column![body].spacing(8).width(Length::Fill);
        if self.header.see_all_route().is_some() {
            panel = panel.push(
                button(text("See all results").size(14).color(TEXT_WHITE))
                    .width(Length::Fill)
                    .padding(10)
                    .style(|_theme, status| {
                        let background_color = match status {
                            button::Status::Hovered => Color::from_rgb(0.7, 0.02, 0.06),
                            _ => ACCENT_RED,
                        };
                        button::Style {
                            background: Some(iced::Background::Color(background_color)),
                            text_color: TEXT_WHITE,
                            border: Border {
                                color: Color::TRANSPARENT,
                                width: 0.0,
                                radius: 6.0.into(),
                            },
                            shadow: Shadow::default(),
                            snap: false,
                        }
                    })
                    .on_press(Message::HeaderSeeAllResults),
            );
        }

        let dropdown = container(panel)
            .width(Length::Fixed(DROPDOWN_WIDTH))
            .padding(12)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(SURFACE_DARK_GRAY)),
                border: Border {
                    color: Color::from_rgba(1.0, 1.0, 1.0, 0.15),
                    width: 1.0,
                    radius: 8.0.into(),
                },
                shadow: Shadow {
                    color: Color::from_rgba(0.0, 0.0, 0.0, 0.6),
                    offset: iced::Vector::new(0.0, 8.0),
                    blur_radius: 16.0,
                },
                ..Default::default()
            });

        container(dropdown)
            .width(Length::Fill)
            .padding(Padding::new(HEADER_HEIGHT - 8.0).left(0.0).right(24.0).bottom(0.0))
            .align_x(iced::alignment::Horizontal::Right)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmdb::fake::{title, FakeGateway};
    use crate::tmdb::{Endpoint, MovieGateway};

    /// Types `input`, lets the debounce run out and performs any search it asks for.
    async fn type_and_wait(header: &mut HeaderSearch, gateway: &FakeGateway, input: &str) {
        let start = Instant::now();
        let Some(debounce) = header.on_input(input.to_string(), start) else {
            return;
        };
        let settled = start + DEBOUNCE_DELAY;
        if let Some((ticket, query)) = header.on_debounce_elapsed(debounce, settled) {
            let result = gateway.search(&query).await;
            header.on_results(ticket, result);
        }
    }

    #[tokio::test]
    async fn short_queries_never_hit_the_network() {
        let gateway = FakeGateway::default();
        let mut header = HeaderSearch::default();
        for input in ["", "a", " b ", "é"] {
            type_and_wait(&mut header, &gateway, input).await;
        }
        assert!(gateway.calls().is_empty());
        assert!(!header.is_dropdown_open());
    }

    #[tokio::test]
    async fn settled_query_searches_once_and_caps_results() {
        let mut gateway = FakeGateway::default();
        gateway.titles.insert(
            String::from("/search/movie"),
            (1..=10).map(|id| title(id, "match")).collect(),
        );
        let mut header = HeaderSearch::default();

        type_and_wait(&mut header, &gateway, "matrix").await;

        assert_eq!(
            gateway.calls(),
            vec![Endpoint::Search {
                query: String::from("matrix")
            }]
        );
        assert!(header.is_dropdown_open());
        assert_eq!(
            header.state().ready().map(Vec::len),
            Some(MAX_DROPDOWN_RESULTS)
        );
    }

    #[test]
    fn only_the_last_keystroke_fires() {
        let start = Instant::now();
        let mut header = HeaderSearch::default();
        let first = header.on_input(String::from("ma"), start).unwrap();
        let second = header
            .on_input(String::from("mat"), start + Duration::from_millis(100))
            .unwrap();

        let later = start + Duration::from_secs(1);
        assert!(header.on_debounce_elapsed(first, later).is_none());
        let (_, query) = header.on_debounce_elapsed(second, later).unwrap();
        assert_eq!(query, "mat");
    }

    #[test]
    fn clearing_the_input_closes_the_dropdown() {
        let start = Instant::now();
        let mut header = HeaderSearch::default();
        let debounce = header.on_input(String::from("alien"), start).unwrap();
        let (ticket, _) = header
            .on_debounce_elapsed(debounce, start + DEBOUNCE_DELAY)
            .unwrap();
        header.on_results(ticket, Ok(vec![title(1, "Alien")]));
        assert!(header.is_dropdown_open());

        assert!(header.on_input(String::from("a"), start).is_none());
        assert!(!header.is_dropdown_open());
        assert!(!header.on_results(ticket, Ok(vec![title(2, "late")])));
    }

    #[test]
    fn dismiss_keeps_the_query_for_see_all() {
        let start = Instant::now();
        let mut header = HeaderSearch::default();
        let debounce = header.on_input(String::from(" blade runner "), start).unwrap();
        header.on_debounce_elapsed(debounce, start + DEBOUNCE_DELAY);
        header.dismiss();

        assert!(!header.is_dropdown_open());
        assert_eq!(header.see_all_route(), Some(Route::search("blade runner")));
        assert_eq!(header.input(), " blade runner ");
    }
}
