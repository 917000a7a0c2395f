// Domain models and the wire DTOs they are built from
//
// DTOs mirror the Unsplash JSON field names; domain types are what the
// services store and hand out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fallback format for offsets written without a colon (`+0000`)
const PLAIN_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Pixel dimensions of a photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhotoSize {
    pub width: u32,
    pub height: u32,
}

/// A photo in the feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Photo {
    /// Unique within the feed
    pub id: String,
    pub size: PhotoSize,
    /// None when the server value was missing or unparsable
    pub created_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub thumb_image_url: String,
    pub large_image_url: String,
    pub is_liked: bool,
}

impl From<PhotoResult> for Photo {
    fn from(dto: PhotoResult) -> Self {
        Self {
            created_at: parse_created_at(dto.created_at.as_deref()),
            id: dto.id,
            size: PhotoSize {
                width: dto.width,
                height: dto.height,
            },
            description: dto.description,
            thumb_image_url: dto.urls.thumb,
            large_image_url: dto.urls.full,
            is_liked: dto.liked_by_user,
        }
    }
}

/// The signed-in user's profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub username: String,
    /// First and last name joined by a space; empty when both are absent
    pub name: String,
    /// `@username`
    pub login_name: String,
    pub bio: Option<String>,
}

impl From<ProfileResult> for Profile {
    fn from(dto: ProfileResult) -> Self {
        let name = [dto.first_name.as_deref(), dto.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            login_name: format!("@{}", dto.username),
            username: dto.username,
            name,
            bio: dto.bio,
        }
    }
}

/// Parse a creation timestamp, with or without fractional seconds
///
/// Tries RFC 3339 first (fractional seconds optional, `Z` or `+hh:mm`),
/// then a plain `+hhmm` offset form. Anything else yields None.
pub fn parse_created_at(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();

    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, PLAIN_DATE_FORMAT))
        .map(|date| date.with_timezone(&Utc))
        .ok()
}

// Wire types

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoUrls {
    pub thumb: String,
    pub full: String,
}

/// One item of `GET /photos`
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoResult {
    pub id: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub urls: PhotoUrls,
    pub liked_by_user: bool,
}

/// Body of `POST`/`DELETE /photos/{id}/like`
#[derive(Debug, Clone, Deserialize)]
pub struct LikeResponse {
    pub photo: PhotoResult,
}

/// Body of `POST /oauth/token`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Body of `GET /me`
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResult {
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileImage {
    pub small: String,
}

/// Body of `GET /users/{username}`
#[derive(Debug, Clone, Deserialize)]
pub struct UserResult {
    pub profile_image: ProfileImage,
}
