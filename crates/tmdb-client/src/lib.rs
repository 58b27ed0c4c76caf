//! TMDb metadata client.
//!
//! Fetches display metadata (title, overview, poster, genre names) for an
//! external TMDb id. This is a thin collaborator for the display layer: a
//! failed fetch is surfaced as a `GatewayError`, never silently replaced
//! with blank data.

use reqwest::Client as HttpClient;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Production API root
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Poster images are served from a separate CDN at a fixed width
const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Errors from the metadata gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TMDb returned status {status} for movie {tmdb_id}")]
    Status { tmdb_id: u32, status: StatusCode },
}

/// Display metadata for one movie
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetails {
    pub title: String,
    pub overview: String,
    /// Absent when TMDb has no poster for the movie
    pub poster_url: Option<String>,
    pub genres: Vec<String>,
}

/// Wire shape of the details endpoint
#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    title: String,
    #[serde(default)]
    overview: String,
    poster_path: Option<String>,
    #[serde(default)]
    genres: Vec<GenreEntry>,
}

#[derive(Debug, Deserialize)]
struct GenreEntry {
    name: String,
}

impl From<DetailsResponse> for MovieDetails {
    fn from(raw: DetailsResponse) -> Self {
        MovieDetails {
            title: raw.title,
            overview: raw.overview,
            poster_url: raw
                .poster_path
                .map(|path| format!("{POSTER_BASE_URL}{path}")),
            genres: raw.genres.into_iter().map(|g| g.name).collect(),
        }
    }
}

/// Client for the TMDb details endpoint.
pub struct TmdbClient {
    http: HttpClient,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the client at a different API root (tests, proxies)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Fetch display metadata for a TMDb movie id.
    ///
    /// Non-2xx responses and transport failures are both errors; the caller
    /// decides how to present them.
    pub async fn fetch_movie(&self, tmdb_id: u32) -> Result<MovieDetails, GatewayError> {
        let url = format!("{}/movie/{}", self.base_url, tmdb_id);
        debug!("Fetching TMDb metadata for movie {}", tmdb_id);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", "en-US"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status { tmdb_id, status });
        }

        let raw: DetailsResponse = response.json().await?;
        Ok(raw.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_mapping() {
        let raw: DetailsResponse = serde_json::from_value(serde_json::json!({
            "title": "Avatar",
            "overview": "A paraplegic Marine is dispatched to Pandora.",
            "poster_path": "/kyeqWdyUXW608qlYkRqosgbbJyK.jpg",
            "genres": [{"id": 28, "name": "Action"}, {"id": 12, "name": "Adventure"}]
        }))
        .unwrap();

        let details = MovieDetails::from(raw);
        assert_eq!(details.title, "Avatar");
        assert_eq!(
            details.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/kyeqWdyUXW608qlYkRqosgbbJyK.jpg")
        );
        assert_eq!(details.genres, vec!["Action", "Adventure"]);
    }

    #[test]
    fn test_missing_poster_stays_absent() {
        let raw: DetailsResponse = serde_json::from_value(serde_json::json!({
            "title": "Obscure Short",
            "overview": "",
            "poster_path": null,
            "genres": []
        }))
        .unwrap();

        let details = MovieDetails::from(raw);
        // No poster is represented as absence, not a fabricated URL
        assert_eq!(details.poster_url, None);
        assert!(details.genres.is_empty());
    }
}
