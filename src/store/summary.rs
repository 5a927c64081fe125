use super::types::Sale;
use chrono::{Local, NaiveDate};

/// Revenue and sale count for one calendar day (local time)
#[derive(Debug, Clone, PartialEq)]
pub struct SalesSummary {
    pub date: NaiveDate,
    pub total: f64,
    pub sales: Vec<Sale>,
}

impl SalesSummary {
    pub fn for_date(sales: &[Sale], date: NaiveDate) -> Self {
        let sales: Vec<Sale> = sales
            .iter()
            .filter(|s| s.timestamp.with_timezone(&Local).date_naive() == date)
            .cloned()
            .collect();
        let total = sales.iter().map(|s| s.total_amount).sum();

        Self { date, total, sales }
    }

    pub fn today(sales: &[Sale]) -> Self {
        Self::for_date(sales, Local::now().date_naive())
    }

    pub fn count(&self) -> usize {
        self.sales.len()
    }
}

/// Whole amounts print without decimals ("250"), others with two ("12.50")
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{:.0}", amount)
    } else {
        format!("{:.2}", amount)
    }
}
