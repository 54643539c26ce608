//! Product catalog reads from the headless CMS, and line-item configuration.

mod error;
mod model;
mod sanity;

pub use error::CatalogError;
pub use model::{LocalizedText, OptionValue, Product, ProductOption, ProductSummary, Selection, Variant};
pub use sanity::{SanityCatalog, SanityConfig};

use async_trait::async_trait;

/// Read access to published products.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_products(&self) -> Result<Vec<ProductSummary>, CatalogError>;

    async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, CatalogError>;
}
