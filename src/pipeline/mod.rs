pub mod download;
pub mod fs_ops;
pub mod search;
pub mod video;
