pub mod api;
pub mod config;
pub mod database;
pub mod global;
pub mod service;

#[cfg(test)]
mod tests;
