//! Staged-upload pipeline: one driver, parameterized by media kind.

mod driver;

pub use driver::UploadDriver;
