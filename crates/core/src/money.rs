//! Amount arithmetic and currency formatting.

use serde::{Deserialize, Serialize};

use crate::types::Amount;

/// Net amount after a refund, floored at zero.
pub fn net(amount: Amount, refund: Amount) -> Amount {
    if refund > amount {
        0.0
    } else {
        amount - refund
    }
}

/// Average of `total` over `count`, zero when there is nothing to average.
pub fn average(total: Amount, count: i64) -> Amount {
    if count <= 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Share of `part` in `whole` as a percentage rounded to two decimals.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        return 0.0;
    }
    ((part / whole) * 10_000.0).round() / 100.0
}

/// Where the currency symbol goes relative to the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SymbolPosition {
    #[default]
    Left,
    Right,
    LeftWithSpace,
    RightWithSpace,
}

/// Currency display rules, derived from the plugin settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub position: SymbolPosition,
    pub decimal_separator: String,
    pub thousands_separator: String,
    pub decimal_count: usize,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "$".to_string(),
            position: SymbolPosition::Left,
            decimal_separator: ".".to_string(),
            thousands_separator: ",".to_string(),
            decimal_count: 2,
        }
    }
}

/// Symbol for an ISO 4217 currency code. Unknown codes render as the code.
pub fn currency_symbol(code: &str) -> String {
    match code.to_ascii_uppercase().as_str() {
        "USD" | "AUD" | "CAD" | "NZD" | "HKD" | "SGD" | "MXN" => "$".to_string(),
        "EUR" => "\u{20ac}".to_string(),
        "GBP" => "\u{a3}".to_string(),
        "JPY" | "CNY" => "\u{a5}".to_string(),
        "INR" => "\u{20b9}".to_string(),
        "ZAR" => "R".to_string(),
        "CHF" => "CHF".to_string(),
        "BRL" => "R$".to_string(),
        other => other.to_string(),
    }
}

impl CurrencyFormat {
    /// Format a number with separators but no symbol, e.g. `1,234.50`.
    pub fn format_number(&self, amount: Amount) -> String {
        let negative = amount < 0.0;
        let fixed = format!("{:.*}", self.decimal_count, amount.abs());
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((i, f)) => (i.to_string(), Some(f.to_string())),
            None => (fixed.clone(), None),
        };

        let digits: Vec<char> = int_part.chars().collect();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (idx, ch) in digits.iter().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                grouped.push_str(&self.thousands_separator);
            }
            grouped.push(*ch);
        }

        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&grouped);
        if let Some(frac) = frac_part {
            out.push_str(&self.decimal_separator);
            out.push_str(&frac);
        }
        out
    }

    /// Format an amount with the currency symbol placed per the settings.
    pub fn format(&self, amount: Amount) -> String {
        let number = self.format_number(amount);
        match self.position {
            SymbolPosition::Left => format!("{}{}", self.symbol, number),
            SymbolPosition::Right => format!("{}{}", number, self.symbol),
            SymbolPosition::LeftWithSpace => format!("{} {}", self.symbol, number),
            SymbolPosition::RightWithSpace => format!("{} {}", number, self.symbol),
        }
    }
}
