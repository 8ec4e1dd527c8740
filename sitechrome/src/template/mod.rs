//! Template-facing surface: the block registry and markup helpers.

pub mod blocks;
pub mod helpers;

pub use blocks::BlockRegistry;
pub use helpers::{AssetHelpers, BreadcrumbItem};
