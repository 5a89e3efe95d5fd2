use serde::{Deserialize, Deserializer};
use time::OffsetDateTime;

use crate::error::{AppError, AppResult};

pub const MAX_DURATION_SECS: i32 = 7200;
pub const MIN_YEAR: i32 = 1900;

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`).
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

fn check_len(field: &str, value: &str, min: usize, max: usize) -> AppResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(AppError::Validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

/// Trimmed text, with blank values collapsed to `None`.
fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_duration(duration: i32) -> AppResult<()> {
    if duration <= 0 {
        return Err(AppError::Validation(
            "duration must be greater than 0 seconds".into(),
        ));
    }
    if duration > MAX_DURATION_SECS {
        return Err(AppError::Validation(format!(
            "duration cannot exceed {MAX_DURATION_SECS} seconds"
        )));
    }
    Ok(())
}

fn check_year(year: i32) -> AppResult<()> {
    let max_year = OffsetDateTime::now_utc().year() + 1;
    if !(MIN_YEAR..=max_year).contains(&year) {
        return Err(AppError::Validation(format!(
            "year must be between {MIN_YEAR} and {max_year}"
        )));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateSongRequest {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    pub duration: i32,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub genre: Option<String>,
}

impl CreateSongRequest {
    pub fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        self.artist = self.artist.trim().to_string();
        self.album = trim_optional(self.album.take());
        self.genre = trim_optional(self.genre.take());
    }

    pub fn validate(&self) -> AppResult<()> {
        check_len("title", &self.title, 1, 200)?;
        check_len("artist", &self.artist, 0, 200)?;
        if let Some(album) = &self.album {
            check_len("album", album, 0, 200)?;
        }
        check_duration(self.duration)?;
        if let Some(year) = self.year {
            check_year(year)?;
        }
        if let Some(genre) = &self.genre {
            check_len("genre", genre, 0, 100)?;
        }
        Ok(())
    }
}

/// Partial update. Optional columns accept `null` to clear them.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSongRequest {
    pub title: Option<String>,
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub album: Option<Option<String>>,
    pub duration: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub genre: Option<Option<String>>,
}

impl UpdateSongRequest {
    pub fn normalize(&mut self) {
        if let Some(title) = &mut self.title {
            *title = title.trim().to_string();
        }
        if let Some(artist) = &mut self.artist {
            *artist = artist.trim().to_string();
        }
        self.album = self.album.take().map(trim_optional);
        self.genre = self.genre.take().map(trim_optional);
    }

    pub fn validate(&self) -> AppResult<()> {
        if let Some(title) = &self.title {
            check_len("title", title, 1, 200)?;
        }
        if let Some(artist) = &self.artist {
            check_len("artist", artist, 0, 200)?;
        }
        if let Some(Some(album)) = &self.album {
            check_len("album", album, 0, 200)?;
        }
        if let Some(duration) = self.duration {
            check_duration(duration)?;
        }
        if let Some(Some(year)) = self.year {
            check_year(year)?;
        }
        if let Some(Some(genre)) = &self.genre {
            check_len("genre", genre, 0, 100)?;
        }
        Ok(())
    }
}

/// Search filters; blank values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub genre: Option<String>,
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl SearchQuery {
    pub fn title(&self) -> Option<&str> {
        non_blank(&self.title)
    }

    pub fn artist(&self) -> Option<&str> {
        non_blank(&self.artist)
    }

    pub fn genre(&self) -> Option<&str> {
        non_blank(&self.genre)
    }
}
