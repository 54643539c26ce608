use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use super::Cart;

pub const CART_FILE_NAME: &str = "knots_cart.json";

#[derive(Error, Debug)]
pub enum CartError {
    #[error("Cart storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cart could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Persists a cart as one JSON document inside a directory.
#[derive(Debug, Clone)]
pub struct CartStorage {
    path: PathBuf,
}

impl CartStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(CART_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rehydrates the cart. A missing or unreadable document yields an empty cart.
    pub async fn load(&self) -> Cart {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Cart::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cart could not be read, starting empty");
                return Cart::default();
            }
        };
        match serde_json::from_slice::<Cart>(&bytes) {
            Ok(cart) => {
                info!(lines = cart.items().len(), "Cart rehydrated");
                cart
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cart document is corrupt, starting empty");
                Cart::default()
            }
        }
    }

    pub async fn save(&self, cart: &Cart) -> Result<(), CartError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(cart)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
