// src/ocr/mod.rs
pub mod client;
pub mod grid;
pub mod models;
