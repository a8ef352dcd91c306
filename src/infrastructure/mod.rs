pub mod encoder;
pub mod pdf;
pub mod storage;
pub mod tts;
