use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::CatalogError;
use crate::cart::{CartItem, MAX_LINE_QUANTITY};
use crate::domain::money::bounded;
use crate::domain::Language;

/// CMS projections return `null` for absent arrays and numbers.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Plain(String),
    Localized {
        #[serde(default)]
        en: Option<String>,
        #[serde(default)]
        af: Option<String>,
    },
}

/// A bilingual string. Older documents carry a plain string, read as English.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawText")]
pub struct LocalizedText {
    pub en: Option<String>,
    pub af: Option<String>,
}

impl From<RawText> for LocalizedText {
    fn from(raw: RawText) -> Self {
        match raw {
            RawText::Plain(text) => Self {
                en: Some(text),
                af: None,
            },
            RawText::Localized { en, af } => Self { en, af },
        }
    }
}

impl LocalizedText {
    /// Falls back to the other language, then to an empty string.
    pub fn get(&self, language: Language) -> &str {
        let (first, second) = match language {
            Language::En => (&self.en, &self.af),
            Language::Af => (&self.af, &self.en),
        };
        first
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(second.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub slug: String,
    #[serde(default, deserialize_with = "null_default")]
    pub title: LocalizedText,
    #[serde(default, deserialize_with = "null_default")]
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub color_name: String,
    #[serde(default)]
    pub color_hex: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub images: Vec<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionValue {
    pub label: String,
    #[serde(default, deserialize_with = "null_default")]
    pub price_modifier: Decimal,
}

/// A technical option such as width or style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductOption {
    #[serde(rename = "_key", default)]
    pub key: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_default")]
    pub values: Vec<OptionValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub slug: String,
    #[serde(default, deserialize_with = "null_default")]
    pub title: LocalizedText,
    #[serde(default, deserialize_with = "null_default")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "null_default")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub variants: Vec<Variant>,
    #[serde(default, deserialize_with = "null_default")]
    pub options: Vec<ProductOption>,
}

/// What the buyer picked on the product page.
///
/// Unset options fall back to the first value of each option.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Selection {
    pub variant: Option<usize>,
    pub options: HashMap<String, String>,
    pub quantity: Option<u32>,
}

impl Product {
    /// Variants shown to buyers; a variant without an `active` flag is shown.
    pub fn active_variants(&self) -> Vec<&Variant> {
        self.variants
            .iter()
            .filter(|variant| variant.active != Some(false))
            .collect()
    }

    /// Prices a selection and builds the cart line for it.
    ///
    /// The line id is `{productId}-{colour}-{labels}`, with `Standard` for
    /// products without colour variants.
    pub fn configure(&self, selection: &Selection, language: Language) -> Result<CartItem, CatalogError> {
        let variants = self.active_variants();
        let variant = match selection.variant {
            Some(index) => Some(
                *variants
                    .get(index)
                    .ok_or(CatalogError::UnknownVariant(index))?,
            ),
            None => variants.first().copied(),
        };

        let mut picked = Vec::with_capacity(self.options.len());
        for option in &self.options {
            let value = match selection.options.get(&option.kind) {
                Some(label) => option
                    .values
                    .iter()
                    .find(|value| &value.label == label)
                    .ok_or_else(|| CatalogError::UnknownOption {
                        option: option.kind.clone(),
                        label: label.clone(),
                    })?,
                None => match option.values.first() {
                    Some(value) => value,
                    None => continue,
                },
            };
            picked.push((option.kind.as_str(), value));
        }

        let price = picked
            .iter()
            .try_fold(self.price, |sum, (_, value)| sum.checked_add(value.price_modifier))
            .and_then(bounded)
            .ok_or_else(|| CatalogError::PriceOutOfRange(self.id.clone()))?;

        let colour = variant.map_or("Standard", |v| v.color_name.as_str());
        let labels = picked
            .iter()
            .map(|(_, value)| value.label.as_str())
            .collect::<Vec<_>>()
            .join("-");

        let colour_label = match language {
            Language::En => "Color",
            Language::Af => "Kleur",
        };
        let options_text = variant
            .map(|v| format!("{colour_label}: {}", v.color_name))
            .into_iter()
            .chain(picked.iter().map(|(kind, value)| format!("{kind}: {}", value.label)))
            .collect::<Vec<_>>()
            .join(", ");

        let image = variant
            .and_then(|v| v.images.first())
            .or_else(|| self.images.first())
            .cloned();

        Ok(CartItem {
            id: format!("{}-{colour}-{labels}", self.id),
            product_id: self.id.clone(),
            title: self.title.get(language).to_string(),
            price,
            image,
            options_text,
            quantity: selection.quantity.unwrap_or(1).clamp(1, MAX_LINE_QUANTITY),
        })
    }
}
