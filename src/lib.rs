pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod fonts;
pub mod metadata;
pub mod navigator;
pub mod playlist;
pub mod processing;
pub mod slideshow;
pub mod state;
pub mod platform {
    pub mod display;
}
pub mod tasks {
    pub mod input;
    pub mod scheduler;
}
