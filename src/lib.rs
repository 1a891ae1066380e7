//! itunes-lister - search the iTunes catalog for albums and list their tracks
//!
//! This library provides the fetch-and-decode pipelines for iTunes album search
//! and track lookup, plus the per-screen result state a front end drives.

/// Client modules for the iTunes catalog and offline fixtures
pub mod clients;
/// Runtime configuration from the environment
pub mod config;
/// Result state for the album and track screens
pub mod screen;
