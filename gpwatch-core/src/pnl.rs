//! Profit/loss against a purchase price.

/// Change of the current price relative to the purchase price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfitLoss {
    pub percent: f64,
    pub amount: f64,
    /// `amount >= 0`; a flat position counts as profit.
    pub is_profit: bool,
}

impl ProfitLoss {
    /// `None` when `purchase_price` is 0.00, the "no cost basis" sentinel.
    pub fn calculate(current_price: f64, purchase_price: f64) -> Option<Self> {
        if purchase_price == 0.0 {
            return None;
        }
        let amount = current_price - purchase_price;
        Some(Self {
            percent: amount / purchase_price * 100.0,
            amount,
            is_profit: amount >= 0.0,
        })
    }

    /// `+1.23%` / `-4.56%`.
    pub fn format_percent(&self) -> String {
        let sign = if self.is_profit { "+" } else { "" };
        format!("{sign}{:.2}%", self.percent)
    }

    /// `+1.23 PLN` / `-4.56 PLN`.
    pub fn format_amount(&self, currency: &str) -> String {
        let sign = if self.is_profit { "+" } else { "" };
        format!("{sign}{:.2} {currency}", self.amount)
    }
}
