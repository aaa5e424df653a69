pub mod activities;
pub mod data;
pub mod models;
