pub mod app;
pub mod auth;
pub mod calendar;
pub mod coerce;
pub mod config;
pub mod diary;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod foods;
pub mod goals;
pub mod health;
pub mod nutrients;
pub mod patch;
pub mod profile;
pub mod state;
pub mod tasks;
