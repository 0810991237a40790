use crate::domain::{Identity, ItemId};
use std::str::FromStr;

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Partial profile update. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.avatar.is_none()
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    pub user: Identity,
}

fn bearer() -> String {
    "bearer".into()
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body of the backend. `detail` is a plain string for handled errors and a list of field
/// errors when request validation fails.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorMessage {
    #[serde(default)]
    pub detail: serde_json::Value,
}

impl ErrorMessage {
    pub fn reason(&self) -> Option<String> {
        match &self.detail {
            serde_json::Value::String(v) if !v.is_empty() => Some(v.clone()),
            serde_json::Value::Array(items) => {
                let messages = items
                    .iter()
                    .filter_map(|x| x.get("msg").and_then(|m| m.as_str()))
                    .collect::<Vec<_>>();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Movie {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    #[serde(default = "default_media_type")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub trailer_url: Option<String>,
}

fn default_media_type() -> Option<String> {
    Some("movie".into())
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub budget: Option<i64>,
    #[serde(default)]
    pub revenue: Option<i64>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Trailer {
    pub trailer_url: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct WatchlistResponse {
    pub watchlist: Vec<Movie>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MediaType {
    #[default]
    All,
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::All => "all",
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "movie" => Ok(Self::Movie),
            "tv" => Ok(Self::Tv),
            _ => Err(format!("unknown media type '{s}', expected all, movie or tv")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeWindow {
    #[default]
    Day,
    Week,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            _ => Err(format!("unknown time window '{s}', expected day or week")),
        }
    }
}
