// Library exports for reelforge

pub mod app;
pub mod components;
pub mod config;
pub mod event;
pub mod model;
pub mod pipeline;
pub mod pipeline_worker;
pub mod widgets;

// Re-export commonly used types from pipeline
pub use pipeline::{search::SearchEngine, video::create_video};
