//! Poképédia regional Pokédex numbers
//!
//! - `client`: MediaWiki API client
//! - `parser`: wikitext rule table
//! - `cache`: in-memory cache by species name
//! - `fallback`: bundled dataset by national ID
//! - `resolver`: the three tiers put together

pub mod cache;
pub mod client;
pub mod fallback;
pub mod parser;
pub mod resolver;

pub use cache::RegionalIdCache;
pub use client::WikiClient;
pub use fallback::LocalDataset;
pub use resolver::RegionalIdResolver;
