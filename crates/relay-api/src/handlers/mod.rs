pub mod cancel_upload;
pub mod health;
pub mod init_upload;
pub mod proxy;
pub mod upload_file;
pub mod upload_status;
