pub mod download;
pub mod error;
pub mod response;
pub mod upload;
