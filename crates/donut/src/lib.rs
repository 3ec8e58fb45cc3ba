pub mod chart;
pub mod config;
pub mod events;
pub mod sys;
