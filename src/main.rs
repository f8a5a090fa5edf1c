mod cards;
mod components;
mod debounce;
mod details;
mod genre_filter;
mod handlers;
mod header;
mod hero;
mod home;
mod media;
mod remote;
mod router;
mod search;
mod settings;
mod tmdb;
mod video;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use iced::widget::container;
use iced::{Element, Font, Length, Size, Subscription, Task, Theme};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use components::Viewport;
use details::DetailsPage;
use genre_filter::GenreFilter;
use header::HeaderSearch;
use hero::{HeroCarousel, CAROUSEL_INTERVAL};
use home::HomePage;
use media::{GenreCatalog, ImageCache, Message, BACKGROUND_BLACK};
use router::{Navigator, Route};
use search::SearchPage;
use settings::{AppSettings, Cli, SetupPage};
use tmdb::{load_genres, SharedGateway, TmdbClient};

pub struct MovieHub {
    pub setup_page: Option<SetupPage>,
    pub gateway: Option<SharedGateway>,
    pub navigator: Navigator,
    pub viewport: Viewport,
    pub genres: Arc<GenreCatalog>,
    pub home: HomePage,
    pub hero: HeroCarousel,
    pub genre_filter: GenreFilter,
    pub details: DetailsPage,
    pub search: SearchPage,
    pub header: HeaderSearch,
    pub image_cache: ImageCache,
}

impl Default for MovieHub {
    fn default() -> Self {
        Self {
            setup_page: None,
            gateway: None,
            navigator: Navigator::new(Route::Home),
            viewport: Viewport::default(),
            genres: Arc::new(GenreCatalog::default()),
            home: HomePage::default(),
            hero: HeroCarousel::default(),
            genre_filter: GenreFilter::default(),
            details: DetailsPage::default(),
            search: SearchPage::default(),
            header: HeaderSearch::default(),
            image_cache: ImageCache::new(),
        }
    }
}

impl MovieHub {
    fn new(cli: &Cli) -> (Self, Task<Message>) {
        let initial_route = Route::parse(&cli.route).unwrap_or_else(|| {
            warn!(route = %cli.route, "unknown route, opening home instead");
            Route::Home
        });
        let mut app = Self {
            navigator: Navigator::new(initial_route),
            ..Default::default()
        };

        match AppSettings::resolve(cli) {
            Some(settings) => {
                let task = app.initialize_with_settings(settings);
                (app, task)
            }
            None => {
                info!("no API key configured, showing setup");
                app.setup_page = Some(SetupPage::default());
                (app, Task::none())
            }
        }
    }

    fn initialize_with_settings(&mut self, settings: AppSettings) -> Task<Message> {
        let client = TmdbClient::from_settings(&settings);
        info!(?client, "movie database client ready");
        let gateway: SharedGateway = Arc::new(client);
        self.gateway = Some(gateway.clone());
        self.setup_page = None;

        Task::batch([
            Task::perform(load_genres(gateway), Message::GenresLoaded),
            handlers::enter_route(self),
        ])
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        if let Message::Setup(setup_msg) = message {
            if let Some(ref mut setup) = self.setup_page {
                if let Some(settings) = setup.update(setup_msg) {
                    return self.initialize_with_settings(settings);
                }
            }
            return Task::none();
        }
        handlers::handle_message(self, message)
    }

    fn view(&self) -> Element<'_, Message> {
        if let Some(ref setup) = self.setup_page {
            return setup.view().map(Message::Setup);
        }

        container(self.view_main_content())
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(BACKGROUND_BLACK)),
                ..Default::default()
            })
            .into()
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subs =
            vec![iced::window::resize_events().map(|(_id, size)| Message::WindowResized(size))];
        if matches!(self.navigator.current(), Route::Home) && self.hero.is_ticking() {
            subs.push(iced::time::every(CAROUSEL_INTERVAL).map(|_| Message::CarouselTick));
        }
        Subscription::batch(subs)
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,wgpu=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> anyhow::Result<()> {
    let dotenv_result = dotenv();
    init_tracing();
    match dotenv_result {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => info!("No .env file loaded ({}), relying on environment", e),
    }

    let cli = Cli::parse();
    info!(route = %cli.route, "starting MovieHub");

    iced::application(move || MovieHub::new(&cli), MovieHub::update, MovieHub::view)
        .title("MovieHub")
        .theme(MovieHub::theme)
        .window_size(Size::new(1280.0, 720.0))
        .font(iced_fonts::BOOTSTRAP_FONT_BYTES)
        .default_font(Font::DEFAULT)
        .subscription(MovieHub::subscription)
        .run()
        .context("the window could not be started")
}
