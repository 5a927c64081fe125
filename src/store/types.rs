use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Language used for the primary (record-keeping) product name
pub const PRIMARY_LANGUAGE: &str = "en";

/// Product name keyed by language code
///
/// Serialized as a plain `{"en": "Rice", "hi": "चावल"}` map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductName(BTreeMap<String, String>);

impl ProductName {
    pub fn new(primary: impl Into<String>) -> Self {
        let mut names = BTreeMap::new();
        names.insert(PRIMARY_LANGUAGE.to_string(), primary.into());
        Self(names)
    }

    pub fn with_translation(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(language.into(), text.into());
        self
    }

    /// The English name, or the alphabetically first language's name
    pub fn primary(&self) -> &str {
        self.0
            .get(PRIMARY_LANGUAGE)
            .filter(|name| !name.is_empty())
            .or_else(|| self.0.values().next())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Name in `language`, falling back to the primary name
    pub fn localized(&self, language: &str) -> &str {
        self.0
            .get(language)
            .filter(|name| !name.is_empty())
            .map(String::as_str)
            .unwrap_or_else(|| self.primary())
    }

    /// Case-insensitive substring match against every known name
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.0
            .values()
            .any(|name| name.to_lowercase().contains(&query))
    }

    pub fn translations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(lang, name)| (lang.as_str(), name.as_str()))
    }
}

/// A catalog entry with its current stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: ProductName,
    #[serde(default)]
    pub category: String,
    #[serde(deserialize_with = "number_or_string")]
    pub price: f64,
    pub stock: u32,
    #[serde(default)]
    pub max_stock: u32,
    #[serde(default)]
    pub shelf_position: Option<String>,
}

impl Product {
    pub fn new(id: impl Into<String>, name: ProductName, price: f64, stock: u32) -> Self {
        Self {
            id: id.into(),
            name,
            category: String::new(),
            price,
            stock,
            max_stock: stock,
            shelf_position: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_max_stock(mut self, max_stock: u32) -> Self {
        self.max_stock = max_stock;
        self
    }

    pub fn with_shelf(mut self, shelf_position: impl Into<String>) -> Self {
        self.shelf_position = Some(shelf_position.into());
        self
    }
}

/// A recorded sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub total_amount: f64,
    pub timestamp: DateTime<Utc>,
}

/// Input for recording a sale
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    pub product_id: String,
    /// Defaults to the product's primary name
    pub product_name: Option<String>,
    /// Zero is treated as one
    pub quantity: u32,
    /// Defaults to `quantity * price`
    pub total_amount: Option<f64>,
}

impl NewSale {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: None,
            quantity,
            total_amount: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn with_total(mut self, total_amount: f64) -> Self {
        self.total_amount = Some(total_amount);
        self
    }
}

// Prices were historically stored as strings ("50").
fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Number(f64),
        Text(String),
    }

    match Price::deserialize(deserializer)? {
        Price::Number(value) => Ok(value),
        Price::Text(text) => Ok(text.trim().parse().unwrap_or(0.0)),
    }
}
