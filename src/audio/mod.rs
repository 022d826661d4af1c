pub mod clip;
pub mod playback;
