//! Domain types shared across the player

mod artist;
mod ids;
mod track;

pub use artist::Artist;
pub use ids::{ArtistId, TrackId};
pub use track::Track;
