use std::path::PathBuf;

use clap::Parser;
use iced::widget::{button, column, container, row, text, text_input, Space};
use iced::{Alignment, Element, Length};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::media::{ACCENT_RED, BACKGROUND_BLACK, TEXT_GRAY, TEXT_WHITE};

const DEFAULT_LANGUAGE: &str = "en-US";

#[derive(Debug, Clone, Parser)]
#[command(name = "moviehub", version, about = "Browse, filter and search movies from TMDB")]
pub struct Cli {
    /// TMDB API key (v3). Overrides the saved configuration.
    #[arg(long, env = "TMDB_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Language passed to the movie database, e.g. en-US.
    #[arg(long, env = "TMDB_LANGUAGE")]
    pub language: Option<String>,

    /// Route to open on start, e.g. /moviedetails/603 or "/search?query=matrix".
    #[arg(long, default_value = "/")]
    pub route: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppSettings {
    pub api_key: String,
    pub language: String,
}

impl AppSettings {
    pub fn config_path() -> Option<PathBuf> {
        std::env::var("HOME").ok().map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("moviehub")
                .join("config.json")
        })
    }

    pub fn load() -> Option<Self> {
        let path = Self::config_path()?;
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    /// Command line and environment win over the saved file.
    pub fn resolve(cli: &Cli) -> Option<Self> {
        let saved = Self::load();
        let language = cli
            .language
            .clone()
            .or_else(|| saved.as_ref().map(|s| s.language.clone()))
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| String::from(DEFAULT_LANGUAGE));

        if let Some(api_key) = cli.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            info!("using API key from command line or environment");
            return Some(Self {
                api_key: api_key.trim().to_string(),
                language,
            });
        }

        saved.filter(Self::is_valid).map(|s| {
            info!("using API key from saved configuration");
            Self {
                api_key: s.api_key,
                language,
            }
        })
    }

    pub fn save(&self) -> Result<(), String> {
        let path = Self::config_path().ok_or("Could not determine config path")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())
    }

    pub fn is_valid(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum SetupMessage {
    ApiKeyChanged(String),
    LanguageChanged(String),
    Submit,
}

pub struct SetupPage {
    pub api_key: String,
    pub language: String,
    pub error: Option<String>,
}

impl Default for SetupPage {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: String::from(DEFAULT_LANGUAGE),
            error: None,
        }
    }
}

impl SetupPage {
    pub fn update(&mut self, message: SetupMessage) -> Option<AppSettings> {
        match message {
            SetupMessage::ApiKeyChanged(key) => {
                self.api_key = key;
                self.error = None;
                None
            }
            SetupMessage::LanguageChanged(lang) => {
                self.language = lang;
                None
            }
            SetupMessage::Submit => {
                if self.api_key.trim().is_empty() {
                    self.error = Some(String::from("API key is required"));
                    return None;
                }
                let settings = AppSettings {
                    api_key: self.api_key.trim().to_string(),
                    language: if self.language.trim().is_empty() {
                        String::from(DEFAULT_LANGUAGE)
                    } else {
                        self.language.trim().to_string()
                    },
                };
                if let Err(e) = settings.save() {
                    warn!(error = %e, "failed to save configuration");
                    self.error = Some(format!("Failed to save: {}", e));
                    return None;
                }
                Some(settings)
            }
        }
    }

    pub fn view(&self) -> Element<'_, SetupMessage> {
        let logo = text("MovieHub").size(48).color(ACCENT_RED);

        let title = text("Welcome to MovieHub").size(28).color(TEXT_WHITE);
        let subtitle = text("Add your TMDB API key to start browsing")
            .size(14)
            .color(TEXT_GRAY);

        let api_label = text("TMDB API Key").size(14).color(TEXT_WHITE);
        let api_hint = text("Get a free key at themoviedb.org/settings/api")
            .size(12)
            .color(TEXT_GRAY);
        let api_input = text_input("Enter your TMDB API key...", &self.api_key)
            .on_input(SetupMessage::ApiKeyChanged)
            .on_submit(SetupMessage::Submit)
            .padding(12)
            .size(14)
            .width(Length::Fill);

        let lang_label = text("Language").size(14).color(TEXT_WHITE);
        let lang_input = text_input(DEFAULT_LANGUAGE, &self.language)
            .on_input(SetupMessage::LanguageChanged)
            .on_submit(SetupMessage::Submit)
            .padding(12)
            .size(14)
            .width(Length::Fill);

        let submit_button = button(text("Start Browsing").size(16).color(TEXT_WHITE))
            .padding([12, 32])
            .style(|_theme, status| {
                let bg = match status {
                    button::Status::Hovered => iced::Color::from_rgb(0.7, 0.02, 0.06),
                    _ => ACCENT_RED,
                };
                button::Style {
                    background: Some(iced::Background::Color(bg)),
                    text_color: TEXT_WHITE,
                    border: iced::Border::default().rounded(4),
                    ..Default::default()
                }
            })
            .on_press(SetupMessage::Submit);

        let error_text = match self.error {
            Some(ref err) => text(err).size(14).color(ACCENT_RED),
            None => text("").size(14),
        };

        let spacer = || Space::new().height(16);
        let small_spacer = || Space::new().height(4);

        let form = column![
            logo,
            spacer(),
            title,
            small_spacer(),
            subtitle,
            spacer(),
            api_label,
            small_spacer(),
            api_hint,
            small_spacer(),
            api_input,
            spacer(),
            lang_label,
            small_spacer(),
            lang_input,
            spacer(),
            error_text,
            small_spacer(),
            row![submit_button].width(Length::Fill),
        ]
        .width(Length::Fixed(400.0))
        .align_x(Alignment::Start);

        container(form)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(iced::Background::Color(BACKGROUND_BLACK)),
                ..Default::default()
            })
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_route_and_key() {
        let cli = Cli::try_parse_from([
            "moviehub",
            "--api-key",
            "abc",
            "--route",
            "/moviedetails/42",
        ])
        .unwrap();
        assert_eq!(cli.api_key.as_deref(), Some("abc"));
        assert_eq!(cli.route, "/moviedetails/42");
    }

    #[test]
    fn setup_requires_a_key() {
        let mut page = SetupPage::default();
        assert!(page.update(SetupMessage::Submit).is_none());
        assert_eq!(page.error.as_deref(), Some("API key is required"));

        page.update(SetupMessage::ApiKeyChanged(String::from("  ")));
        assert!(page.error.is_none());
        assert!(page.update(SetupMessage::Submit).is_none());
    }

    #[test]
    fn validity_ignores_whitespace() {
        let settings = AppSettings {
            api_key: String::from("   "),
            language: String::new(),
        };
        assert!(!settings.is_valid());
    }
}
