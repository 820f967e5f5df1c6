pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod generate;
pub mod load;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod types;
