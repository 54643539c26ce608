use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog returned status {0}")]
    Status(u16),

    #[error("Catalog response could not be decoded: {0}")]
    Decode(String),

    #[error("Product has no variant {0}")]
    UnknownVariant(usize),

    #[error("Option {option} has no value {label}")]
    UnknownOption { option: String, label: String },

    #[error("Product {0} has a price outside the chargeable range")]
    PriceOutOfRange(String),
}
