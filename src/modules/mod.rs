pub mod document;
pub mod reel;
pub mod status;
