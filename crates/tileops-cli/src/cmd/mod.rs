pub mod analytics;
pub mod config;
pub mod invoices;
pub mod jobs;
pub mod serve;
pub mod team;
pub mod views;
