pub mod tracker;
pub mod upload;
