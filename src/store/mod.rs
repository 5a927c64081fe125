//! Inventory and sales store
//!
//! The voice session reads and mutates the store synchronously from the action
//! dispatcher. `LocalStore` keeps everything in memory and optionally mirrors it
//! to a JSON file.

pub mod local;
pub mod seed;
pub mod summary;
pub mod types;

pub use local::{LocalStore, StoreData};
pub use summary::{format_amount, SalesSummary};
pub use types::{NewSale, Product, ProductName, Sale, PRIMARY_LANGUAGE};

use crate::Result;

/// Synchronous CRUD access to products and sales
pub trait InventoryStore: Send + Sync {
    /// All products in catalog order
    fn inventory(&self) -> Vec<Product>;

    /// Look up a product by id
    fn product(&self, id: &str) -> Option<Product>;

    /// Add a product; the store assigns a fresh id
    fn add_product(&self, product: Product) -> Result<Product>;

    /// Replace the product with the same id
    fn update_product(&self, product: Product) -> Result<Product>;

    /// Set the stock level of a product
    fn set_stock(&self, id: &str, stock: u32) -> Result<Product>;

    /// Remove a product
    fn delete_product(&self, id: &str) -> Result<()>;

    /// All sales, newest first
    fn sales(&self) -> Vec<Sale>;

    /// Record a sale and decrement the product's stock (floored at zero)
    fn add_sale(&self, sale: NewSale) -> Result<Sale>;
}
