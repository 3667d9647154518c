pub mod capture;
pub mod config;
pub mod db;
pub mod error;
pub mod fetch;
pub mod index;
pub mod models;
pub mod platform;
pub mod vaults;
