//! Catalog Types
//!
//! A catalog record is keyed by its `_id`. Only the title and the genre and
//! director sub-records are interpreted; every other field is carried through
//! untouched in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Genre sub-record of a catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Director sub-record of a catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Director {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Bio", default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(rename = "Birth", default, skip_serializing_if = "Option::is_none")]
    pub birth: Option<String>,
}

/// One catalog record as returned by the remote service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "Title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "Genre", default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<Genre>,
    #[serde(rename = "Director", default, skip_serializing_if = "Option::is_none")]
    pub director: Option<Director>,
    /// Passthrough payload
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MovieSummary {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            genre: None,
            director: None,
            extra: Map::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.extra.get("Description").and_then(Value::as_str)
    }

    pub fn genre_view(&self) -> Option<DetailView> {
        self.genre.clone().map(DetailView::Genre)
    }

    pub fn director_view(&self) -> Option<DetailView> {
        self.director.clone().map(DetailView::Director)
    }

    pub fn details_view(&self) -> DetailView {
        DetailView::Details(self.clone())
    }
}

/// What a detail dialog shows for a catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Genre(Genre),
    Director(Director),
    Details(MovieSummary),
}

impl DetailView {
    pub fn title(&self) -> &str {
        match self {
            DetailView::Genre(genre) => &genre.name,
            DetailView::Director(director) => &director.name,
            DetailView::Details(movie) => movie.title.as_deref().unwrap_or(&movie.id),
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            DetailView::Genre(genre) => genre.description.as_deref(),
            DetailView::Director(director) => director.bio.as_deref(),
            DetailView::Details(movie) => movie.description(),
        }
    }
}
