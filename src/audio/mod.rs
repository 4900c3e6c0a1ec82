pub mod player;
pub mod voice;

pub use player::{AudioPlayer, AudioPlayerHandle};
