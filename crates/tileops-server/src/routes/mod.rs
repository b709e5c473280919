pub mod analytics;
pub mod content;
pub mod dashboard;
pub mod invoices;
pub mod jobs;
pub mod team;
pub mod views;
