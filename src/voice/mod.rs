//! Audio capture, WAV encoding, and playback

mod playback;
mod recorder;
mod wav;

pub use playback::*;
pub use recorder::*;
pub use wav::*;
