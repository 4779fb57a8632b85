//! ObjectSwatch Library
//!
//! This library provides the core of the ObjectSwatch placement tool:
//! discovering placeable templates in a two-level library directory,
//! previewing and committing copies of them into a scene, and keeping the
//! scene hierarchy tidy with predictable sibling names.

/// Headless command handlers
pub mod cli;
/// Configuration and the preference file
pub mod config;
/// Application-wide constants
pub mod constants;
/// Collaborator traits and their concrete implementations
pub mod host;
/// Plain data types shared by every layer
pub mod models;
/// Catalog discovery and placement services
pub mod services;
