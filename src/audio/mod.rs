//! Audio input for the speech variant.

pub mod wav;

pub use wav::{decode_wav, load_audio_file, samples_to_le_bytes};
