pub mod config;
pub mod dataset;
pub mod layout;
pub mod pipeline;
pub mod round_file;
pub mod team_stats;
