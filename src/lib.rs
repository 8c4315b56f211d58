pub mod config;
pub mod output;
pub mod pipeline;
pub mod prices;
pub mod provider;
pub mod scoring;
pub mod summary;
