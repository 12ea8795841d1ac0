// src/feed/providers/mod.rs
pub mod rsshub;
pub mod tianapi;
pub mod tophub;
