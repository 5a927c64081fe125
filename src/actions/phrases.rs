//! Spoken feedback for locally executed actions

pub fn product_not_found() -> String {
    "Product not found.".to_string()
}

pub fn invalid_quantity() -> String {
    "I didn't catch the quantity. Please say it again.".to_string()
}

pub fn update_failed() -> String {
    "Error updating data.".to_string()
}

pub fn stock_level(name: &str, stock: u32) -> String {
    format!("{} stock is {}.", name, stock)
}

pub fn stock_updated(name: &str, stock: u32) -> String {
    format!("Stock updated. {} now has {} in stock.", name, stock)
}

pub fn insufficient_stock(stock: u32) -> String {
    format!("Not enough stock. Only {} left.", stock)
}

pub fn sale_recorded(name: &str, remaining: u32) -> String {
    format!("Sale recorded for {}. Remaining stock: {}.", name, remaining)
}

pub fn sales_today(amount: &str, count: usize) -> String {
    format!("Total sales today: {} from {} sales.", amount, count)
}

pub fn price(name: &str, price: &str) -> String {
    format!("{} costs {}.", name, price)
}
