//! Artist types

use crate::types::ArtistId;
use serde::{Deserialize, Serialize};

/// An artist profile as served by the catalog API
///
/// Consumed by catalog/search/library screens; the player itself only reads
/// the fields embedded in `Track`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    /// Unique artist identifier
    pub id: ArtistId,

    /// Display name
    pub name: String,

    /// Short biography
    pub bio: Option<String>,

    /// Avatar image URL
    pub avatar_url: Option<String>,

    /// Number of followers
    pub follower_count: u64,

    /// Number of published tracks
    pub track_count: u64,

    /// Whether the requesting user follows this artist
    pub is_following: bool,

    /// Genres associated with the artist
    pub genres: Vec<String>,
}
