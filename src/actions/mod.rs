//! Local execution of assistant actions against the store
//!
//! The assistant may attach a structured action to its reply. Actions run
//! synchronously here and produce the spoken feedback for the turn.

pub mod phrases;

use crate::store::{format_amount, InventoryStore, NewSale, Product, SalesSummary};
use serde_json::Value;
use tracing::{debug, warn};

/// Actions the assistant can request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    UpdateStock,
    RecordSale,
    GetInfo,
    None,
    Unknown,
}

impl ActionKind {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "UPDATE_STOCK" => ActionKind::UpdateStock,
            "RECORD_SALE" => ActionKind::RecordSale,
            "GET_INFO" => ActionKind::GetInfo,
            "NONE" | "" => ActionKind::None,
            _ => ActionKind::Unknown,
        }
    }

    /// Whether this action is executed locally
    pub fn is_actionable(&self) -> bool {
        matches!(
            self,
            ActionKind::UpdateStock | ActionKind::RecordSale | ActionKind::GetInfo
        )
    }
}

/// `query_type` values of `GET_INFO`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoQuery {
    Stock,
    Sales,
    Price,
}

impl InfoQuery {
    pub fn parse(query_type: &str) -> Option<Self> {
        match query_type.trim().to_ascii_lowercase().as_str() {
            "stock" => Some(InfoQuery::Stock),
            "sales" | "sales_today" | "profit" => Some(InfoQuery::Sales),
            "price" => Some(InfoQuery::Price),
            _ => None,
        }
    }
}

/// Outcome of a local action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    pub speech: String,
    pub success: bool,
}

impl ActionResult {
    pub fn success(speech: impl Into<String>) -> Self {
        Self {
            speech: speech.into(),
            success: true,
        }
    }

    pub fn failure(speech: impl Into<String>) -> Self {
        Self {
            speech: speech.into(),
            success: false,
        }
    }
}

/// Parse a quantity the way a leading-integer parse would
///
/// Accepts JSON integers, truncates fractional numbers and reads the leading
/// integer of strings such as `"5 kg"`.
pub fn parse_quantity(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(text) => leading_integer(text),
        _ => None,
    }
}

fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, rest) = match text.as_bytes().first() {
        Some(b'-') => (-1, &text[1..]),
        Some(b'+') => (1, &text[1..]),
        _ => (1, text),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok().map(|n| n * sign)
}

/// First product whose primary name or any translation contains `query`
pub fn resolve_product<'a>(inventory: &'a [Product], query: &str) -> Option<&'a Product> {
    inventory.iter().find(|p| p.name.matches(query))
}

/// Executes assistant actions against a store
pub struct ActionDispatcher<'a> {
    store: &'a dyn InventoryStore,
    language: &'a str,
}

impl<'a> ActionDispatcher<'a> {
    pub fn new(store: &'a dyn InventoryStore, language: &'a str) -> Self {
        Self { store, language }
    }

    /// Run `action` with `params`
    ///
    /// Returns `None` when the action is not executed locally (unknown, `NONE`,
    /// missing product parameter or unsupported query type).
    pub fn dispatch(&self, action: &str, params: &Value) -> Option<ActionResult> {
        let kind = ActionKind::parse(action);
        if !kind.is_actionable() {
            debug!("Action {:?} is not handled locally", action);
            return None;
        }

        let query = params
            .get("query_type")
            .and_then(Value::as_str)
            .and_then(InfoQuery::parse);

        if kind == ActionKind::GetInfo && query == Some(InfoQuery::Sales) {
            return Some(self.sales_today());
        }

        let name = params
            .get("product")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())?;

        let inventory = self.store.inventory();
        let Some(product) = resolve_product(&inventory, name) else {
            warn!("Product not found for: {}", name);
            return Some(ActionResult::failure(phrases::product_not_found()));
        };

        match kind {
            ActionKind::UpdateStock => Some(self.update_stock(product, params)),
            ActionKind::RecordSale => Some(self.record_sale(product, params)),
            ActionKind::GetInfo => match query {
                Some(InfoQuery::Stock) => Some(ActionResult::success(phrases::stock_level(
                    product.name.localized(self.language),
                    product.stock,
                ))),
                Some(InfoQuery::Price) => Some(ActionResult::success(phrases::price(
                    product.name.localized(self.language),
                    &format_amount(product.price),
                ))),
                _ => None,
            },
            _ => None,
        }
    }

    fn update_stock(&self, product: &Product, params: &Value) -> ActionResult {
        let Some(delta) = params.get("quantity").and_then(parse_quantity) else {
            return ActionResult::failure(phrases::invalid_quantity());
        };

        let new_stock = (product.stock as i64).saturating_add(delta).clamp(0, u32::MAX as i64) as u32;
        match self.store.set_stock(&product.id, new_stock) {
            Ok(updated) => {
                debug!(
                    "Stock of {} changed {} -> {}",
                    product.name.primary(),
                    product.stock,
                    updated.stock
                );
                ActionResult::success(phrases::stock_updated(
                    product.name.localized(self.language),
                    updated.stock,
                ))
            }
            Err(e) => {
                warn!("Stock update failed: {}", e);
                ActionResult::failure(phrases::update_failed())
            }
        }
    }

    fn record_sale(&self, product: &Product, params: &Value) -> ActionResult {
        let quantity = match params.get("quantity").and_then(parse_quantity) {
            Some(q) if q > 0 => q,
            _ => return ActionResult::failure(phrases::invalid_quantity()),
        };

        if quantity > product.stock as i64 {
            return ActionResult::failure(phrases::insufficient_stock(product.stock));
        }
        let quantity = quantity as u32;

        // Sales are recorded under the primary name to keep the ledger consistent
        let sale = NewSale::new(product.id.clone(), quantity)
            .with_name(product.name.primary())
            .with_total(quantity as f64 * product.price);

        if let Err(e) = self.store.add_sale(sale) {
            warn!("Recording sale failed: {}", e);
            return ActionResult::failure(phrases::update_failed());
        }

        let remaining = self
            .store
            .product(&product.id)
            .map(|p| p.stock)
            .unwrap_or(product.stock - quantity);

        ActionResult::success(phrases::sale_recorded(
            product.name.localized(self.language),
            remaining,
        ))
    }

    fn sales_today(&self) -> ActionResult {
        let summary = SalesSummary::today(&self.store.sales());
        ActionResult::success(phrases::sales_today(
            &format_amount(summary.total),
            summary.count(),
        ))
    }
}

/// Final spoken and displayed text for a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedReply {
    pub speech: String,
    pub display: String,
}

/// Choose between the local action feedback and the assistant's own phrasing
///
/// `RECORD_SALE` and `GET_INFO` always speak the local result since only it
/// reflects the post-mutation store. Other actions keep the assistant's speech
/// when the local action succeeded. The displayed text follows the spoken text
/// whenever that differs from the assistant's speech.
pub fn compose_reply(
    kind: ActionKind,
    result: Option<&ActionResult>,
    response: &str,
    speech: Option<&str>,
) -> ComposedReply {
    let remote_speech = speech.filter(|s| !s.is_empty());
    let mut spoken = remote_speech.unwrap_or(response).to_string();

    if let Some(result) = result.filter(|r| !r.speech.is_empty()) {
        spoken = match (kind, remote_speech) {
            (ActionKind::RecordSale | ActionKind::GetInfo, _) => result.speech.clone(),
            (_, Some(remote)) if result.success => remote.to_string(),
            _ => result.speech.clone(),
        };
    }

    let display = if remote_speech != Some(spoken.as_str()) {
        spoken.clone()
    } else {
        response.to_string()
    };

    ComposedReply {
        speech: spoken,
        display,
    }
}
