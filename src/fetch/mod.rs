pub mod archive;
pub mod downloader;
