//! Core traits for the voice turn service
//!
//! Provider backends implement these traits so the turn pipeline can swap
//! implementations and run against fakes in tests.
//!
//! ```text
//! Speech Processing:
//!   - SpeechToText: recorded audio -> transcript alternatives
//!   - TextToSpeech: reply text -> audio byte stream
//! ```

mod speech;

pub use speech::{AudioStream, SpeechToText, SynthesisRequest, TextToSpeech};
