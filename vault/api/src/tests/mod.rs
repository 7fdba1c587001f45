mod database;
mod service;
