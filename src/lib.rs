pub mod assess;
pub mod config;
pub mod data_source;
pub mod domains;
pub mod error;
pub mod logging;
pub mod output;
pub mod request;
pub mod scoring;
