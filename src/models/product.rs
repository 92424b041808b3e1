use std::fs;
use std::path::Path;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::cart_item::ItemDisplayInfo;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid catalog JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Duplicate product id '{id}'")]
    DuplicateId { id: String },

    #[error("Product id must not be blank")]
    BlankId,

    #[error("Catalog contains no products")]
    Empty,
}

/// A product a shopper can put in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub image_src: String,
    #[serde(deserialize_with = "decimal_price")]
    pub price: BigDecimal,
}

/// Reads a price from a JSON number or a decimal string. Numbers are parsed
/// from their decimal text so `95.99` stays exactly `95.99`.
fn decimal_price<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(number) => number.to_string(),
        serde_json::Value::String(text) => text.trim().to_string(),
        other => {
            return Err(de::Error::custom(format!(
                "price must be a number or a decimal string, got {}",
                other
            )));
        }
    };
    BigDecimal::from_str(&text)
        .map_err(|e| de::Error::custom(format!("invalid price '{}': {}", text, e)))
}

impl Product {
    pub fn display_info(&self) -> ItemDisplayInfo {
        ItemDisplayInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            image_src: self.image_src.clone(),
            price: self.price.clone(),
        }
    }
}

/// Image files are published lower-cased with spaces turned into
/// underscores; catalog entries are rewritten to match.
pub fn normalize_image_src(src: &str) -> String {
    let (dir, file) = match src.rfind('/') {
        Some(pos) => src.split_at(pos + 1),
        None => ("", src),
    };
    format!("{}{}", dir, file.to_lowercase().replace(' ', "_"))
}

#[derive(Debug, Clone)]
pub struct Catalog {
    products: IndexMap<String, Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        if products.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut by_id = IndexMap::with_capacity(products.len());
        for mut product in products {
            let id = product.id.trim().to_string();
            if id.is_empty() {
                return Err(CatalogError::BlankId);
            }
            if by_id.contains_key(&id) {
                return Err(CatalogError::DuplicateId { id });
            }
            product.id = id.clone();
            product.image_src = normalize_image_src(&product.image_src);
            by_id.insert(id, product);
        }

        Ok(Self { products: by_id })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::new(products)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        debug!("Loading catalog from {}", path.display());
        let content = fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        info!(
            "Catalog loaded from {} with {} products",
            path.display(),
            catalog.len()
        );
        Ok(catalog)
    }

    /// Built-in products used when no catalog file is configured.
    pub fn demo() -> Self {
        let entries = [
            ("cafe-molido", "Café molido 500g", "/products/Cafe Molido.svg", 18_500),
            ("pan-dulce", "Pan dulce (pieza)", "/products/Pan Dulce.svg", 1_850),
            ("miel", "Miel de abeja 250ml", "/products/Miel.svg", 9_500),
            ("salsa-verde", "Salsa verde artesanal", "/products/Salsa Verde.svg", 6_000),
        ];

        let products = entries
            .iter()
            .map(|&(id, name, image, cents): &(&str, &str, &str, i64)| Product {
                id: id.to_string(),
                name: name.to_string(),
                image_src: normalize_image_src(image),
                price: BigDecimal::new(cents.into(), 2),
            })
            .map(|product| (product.id.clone(), product))
            .collect();

        Self { products }
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.get(id.trim())
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
