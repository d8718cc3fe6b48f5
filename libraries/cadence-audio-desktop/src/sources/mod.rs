//! Audio sources decoded for the desktop engine

mod local;

pub use local::{rescale, FileDecoder, OUTPUT_CHANNELS};
