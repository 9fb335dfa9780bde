// ==============================================================================
// lib.rs - seqr Search Library
// ==============================================================================
// Description: Library interface for variant search form validation
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

pub mod catalog;
pub mod filters;
pub mod forms;
pub mod genomeloc;
pub mod lookup;
pub mod reference;
pub mod search_spec;

pub use catalog::{Catalog, CatalogError, MemoryCatalog, PgCatalog};
pub use forms::{FormError, SearchContext};
pub use reference::{GeneReference, Reference};
