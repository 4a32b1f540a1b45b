//! Tidings - reader-facing blog pages with read statistics
//!
//! Paginated blog lists, category and month archives, blog detail pages
//! that count each reader once, and hot-blog rankings over trailing read
//! windows.

pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod theme;
pub mod web;
