//! Narration engine - sequential, single-flight page narration
//!
//! - `playlist`: builds the ordered, filtered queue from page content
//! - `player`: single-flight audio player over an [`AudioBackend`]
//! - `highlight`: marks the item being narrated on the host page
//! - `speed`: playback-rate preference
//! - `gate`: first-interaction gate
//! - `engine`: the playback state machine tying the above together

mod engine;
mod gate;
mod highlight;
mod player;
mod playlist;
mod speed;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{Direction, NarrationEngine, NarrationEvent, PlaybackSnapshot};
pub use gate::InteractionGate;
pub use highlight::{HighlightCoordinator, HighlightSurface, MarkerSet};
pub use player::{AudioBackend, AudioHandle, AudioPlayer, LoadedAudio, PendingPlay, PlayOutcome};
pub use playlist::{ContentItem, ItemKind, ModeFlags, Playlist, PlaylistSource, build_playlist};
pub use speed::{DEFAULT_SPEED, PreferenceStore, SpeedController, is_valid_speed};
