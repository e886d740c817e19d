//! Binary asset storage for company banners and logos.
//!
//! Blobs live outside the relational store; a company's `banner_url` /
//! `logo_url` column is the only durable pointer to them.

pub mod fs;
pub mod repository;

pub use fs::FsAssetRepository;
pub use repository::{AssetKind, AssetRepository};
