use serde::Deserialize;

const YOUTUBE_SITE: &str = "YouTube";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Video {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
    #[serde(default)]
    pub name: String,
}

impl Video {
    fn is_youtube(&self) -> bool {
        self.site == YOUTUBE_SITE
    }

    fn looks_official(&self) -> bool {
        let name = self.name.to_lowercase();
        name.contains("official") || name.contains("trailer")
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.key)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideosResponse {
    #[serde(default)]
    pub results: Vec<Video>,
}

/// First YouTube trailer whose name reads as official, else the first YouTube clip.
pub fn select_trailer(videos: &[Video]) -> Option<&Video> {
    videos
        .iter()
        .find(|v| v.is_youtube() && v.video_type == "Trailer" && v.looks_official())
        .or_else(|| videos.iter().find(|v| v.is_youtube()))
}

/// Where to send the user when a title has no trailer of its own.
pub fn trailer_search_url(title: &str) -> String {
    format!(
        "https://www.youtube.com/results?search_query={}",
        urlencoding::encode(&format!("{} trailer", title))
    )
}
