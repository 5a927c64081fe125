use super::seed::default_inventory;
use super::types::{NewSale, Product, Sale};
use super::InventoryStore;
use crate::{KiranaError, Result};
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Everything the store persists
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub inventory: Vec<Product>,
    #[serde(default)]
    pub sales: Vec<Sale>,
}

/// In-memory store with optional JSON file persistence
#[derive(Debug)]
pub struct LocalStore {
    data: RwLock<StoreData>,
    path: Option<PathBuf>,
}

impl LocalStore {
    /// In-memory store seeded with the default catalog
    pub fn in_memory() -> Self {
        Self::with_inventory(default_inventory())
    }

    /// In-memory store with the given products and no sales
    pub fn with_inventory(inventory: Vec<Product>) -> Self {
        Self {
            data: RwLock::new(StoreData {
                inventory,
                sales: Vec::new(),
            }),
            path: None,
        }
    }

    /// Open a file-backed store, seeding it when the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let data = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            let data: StoreData = serde_json::from_str(&text)?;
            info!(
                "Loaded {} products and {} sales from {}",
                data.inventory.len(),
                data.sales.len(),
                path.display()
            );
            data
        } else {
            info!("No store at {}, seeding default catalog", path.display());
            StoreData {
                inventory: default_inventory(),
                sales: Vec::new(),
            }
        };

        let store = Self {
            data: RwLock::new(data),
            path: Some(path),
        };
        store.persist(&store.data.read())?;
        Ok(store)
    }

    /// Path of the backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Replace inventory and/or sales in bulk
    pub fn import(&self, inventory: Option<Vec<Product>>, sales: Option<Vec<Sale>>) -> Result<()> {
        let mut data = self.data.write();
        if let Some(inventory) = inventory {
            data.inventory = inventory;
        }
        if let Some(sales) = sales {
            data.sales = sales;
        }
        self.persist(&data)
    }

    /// Drop all data and re-seed the default catalog
    pub fn clear_all(&self) -> Result<Vec<Product>> {
        let mut data = self.data.write();
        data.inventory = default_inventory();
        data.sales.clear();
        self.persist(&data)?;
        Ok(data.inventory.clone())
    }

    fn persist(&self, data: &StoreData) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(data)?;
        std::fs::write(path, json).map_err(|e| {
            warn!("Failed to write store {}: {}", path.display(), e);
            KiranaError::StoreError(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl InventoryStore for LocalStore {
    fn inventory(&self) -> Vec<Product> {
        self.data.read().inventory.clone()
    }

    fn product(&self, id: &str) -> Option<Product> {
        self.data
            .read()
            .inventory
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    fn add_product(&self, mut product: Product) -> Result<Product> {
        product.id = Uuid::new_v4().to_string();

        let mut data = self.data.write();
        data.inventory.push(product.clone());
        self.persist(&data)?;

        debug!("Added product {} ({})", product.name.primary(), product.id);
        Ok(product)
    }

    fn update_product(&self, product: Product) -> Result<Product> {
        let mut data = self.data.write();
        let slot = data
            .inventory
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| KiranaError::ProductNotFound(product.id.clone()))?;
        *slot = product.clone();
        self.persist(&data)?;
        Ok(product)
    }

    fn set_stock(&self, id: &str, stock: u32) -> Result<Product> {
        let mut data = self.data.write();
        let product = data
            .inventory
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| KiranaError::ProductNotFound(id.to_string()))?;
        product.stock = stock;
        let updated = product.clone();
        self.persist(&data)?;
        Ok(updated)
    }

    fn delete_product(&self, id: &str) -> Result<()> {
        let mut data = self.data.write();
        let before = data.inventory.len();
        data.inventory.retain(|p| p.id != id);
        if data.inventory.len() == before {
            return Err(KiranaError::ProductNotFound(id.to_string()));
        }
        self.persist(&data)
    }

    fn sales(&self) -> Vec<Sale> {
        self.data.read().sales.clone()
    }

    fn add_sale(&self, sale: NewSale) -> Result<Sale> {
        let mut data = self.data.write();
        let product = data
            .inventory
            .iter()
            .find(|p| p.id == sale.product_id)
            .cloned();

        if product.is_none() && sale.product_name.is_none() {
            return Err(KiranaError::ProductNotFound(sale.product_id));
        }

        let quantity = sale.quantity.max(1);
        let product_name = sale
            .product_name
            .or_else(|| product.as_ref().map(|p| p.name.primary().to_string()))
            .unwrap_or_else(|| "Unknown Product".to_string());
        let total_amount = sale
            .total_amount
            .or_else(|| product.as_ref().map(|p| p.price * quantity as f64))
            .unwrap_or(0.0);

        let record = Sale {
            id: Uuid::new_v4().to_string(),
            product_id: sale.product_id,
            product_name,
            quantity,
            total_amount,
            timestamp: Utc::now(),
        };
        data.sales.insert(0, record.clone());

        if let Some(item) = data.inventory.iter_mut().find(|p| p.id == record.product_id) {
            item.stock = item.stock.saturating_sub(quantity);
        }

        self.persist(&data)?;
        debug!(
            "Recorded sale of {} x {} ({})",
            record.quantity, record.product_name, record.total_amount
        );
        Ok(record)
    }
}
