//! `kitforge-catalog` — products, variants and bundle definitions.
//!
//! An **assembly** is a product with at least one [`BundlePart`]; whether a
//! product is an assembly is always answered by an explicit `has_parts`
//! query against the store, never by a cached flag.

pub mod bundle;
pub mod event;
pub mod product;

pub use bundle::{AssignPartForm, BundlePart, PartCount, PartUpsert};
pub use event::CatalogEvent;
pub use product::{Product, Variant};
