//! Aria Mobile - app shell for the playback engine
//!
//! Ties the platform-agnostic pieces together the way the mobile app uses
//! them:
//! - [`session::PlayerSession`] - the dependency-injected owner of player
//!   state, wiring the state machine to the audio engine
//! - [`surfaces`] - the mini-player bar and the full-screen player, two
//!   projections of the same session
//!
//! Native bridges embed this crate and drive it through `PlayerSession`;
//! the `aria-mobile` binary is a development shell that plays streaming
//! URLs from the command line.

pub mod session;
pub mod surfaces;

pub use session::PlayerSession;
pub use surfaces::{FullPlayer, FullPlayerView, MiniPlayer, MiniPlayerView};
