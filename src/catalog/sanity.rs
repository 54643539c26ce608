use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{CatalogError, CatalogSource, Product, ProductSummary};

const PRODUCTS_QUERY: &str = r#"*[_type == "product"]{
  _id,
  "slug": slug.current,
  title,
  price,
  "image": coalesce(variants[active != false][0].images[0].asset->url, images[0].asset->url)
}"#;

const PRODUCT_QUERY: &str = r#"*[_type == "product" && slug.current == $slug][0]{
  _id,
  "slug": slug.current,
  title,
  price,
  "images": images[].asset->url,
  variants[]{
    colorName,
    "colorHex": colorHex.hex,
    "images": images[].asset->url,
    active
  },
  options[]{
    _key,
    type,
    values[]{ label, priceModifier }
  }
}"#;

#[derive(Debug, Clone)]
pub struct SanityConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
}

impl SanityConfig {
    fn query_url(&self) -> String {
        format!(
            "https://{}.api.sanity.io/v{}/data/query/{}",
            self.project_id,
            self.api_version.trim_start_matches('v'),
            self.dataset
        )
    }
}

#[derive(Deserialize)]
struct QueryResponse<T> {
    result: T,
}

/// Reads products through the CMS's HTTP query API, uncached.
pub struct SanityCatalog {
    client: Client,
    url: String,
}

impl SanityCatalog {
    pub fn new(config: &SanityConfig) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: &SanityConfig, client: Client) -> Self {
        Self {
            client,
            url: config.query_url(),
        }
    }

    async fn query<T: DeserializeOwned>(
        &self,
        groq: &str,
        params: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let mut query = vec![("query", groq.to_string())];
        query.extend(params.iter().map(|(name, value)| (*name, value.clone())));

        let response = self.client.get(&self.url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }
        let body: QueryResponse<T> = response
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;
        Ok(body.result)
    }
}

#[async_trait]
impl CatalogSource for SanityCatalog {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<ProductSummary>, CatalogError> {
        let products: Option<Vec<ProductSummary>> = self.query(PRODUCTS_QUERY, &[]).await?;
        let products = products.unwrap_or_default();
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, CatalogError> {
        // Query parameters are JSON literals.
        let slug = serde_json::Value::String(slug.to_string()).to_string();
        self.query(PRODUCT_QUERY, &[("$slug", slug)]).await
    }
}
