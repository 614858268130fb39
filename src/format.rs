// Display formatting for amounts and user feedback messages

use rust_decimal::{Decimal, RoundingStrategy};

pub const DEFAULT_CURRENCY: &str = "$";

/// Format an amount as `$1,234.56` (negatives as `-$1,234.56`)
pub fn format_currency(amount: Decimal) -> String {
    format_currency_with(DEFAULT_CURRENCY, amount)
}

pub fn format_currency_with(symbol: &str, amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let plain = format!("{:.2}", rounded.abs());

    let (whole, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
    format!("{}{}{}.{}", sign, symbol, group_thousands(whole), fraction)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Annotation shown over the distribution chart when spending exceeds income
pub fn deficit_annotation(symbol: &str, deficit: Decimal) -> String {
    format!("Account Deficit: -{}", format_currency_with(symbol, deficit.abs()))
}

// ============================================================================
// FEEDBACK MESSAGES
// ============================================================================

pub fn income_updated() -> String {
    "Monthly income updated successfully!".to_string()
}

pub fn category_added(name: &str) -> String {
    format!("Category '{}' has been added!", name)
}

pub fn expense_added(symbol: &str, category: &str, amount: Decimal) -> String {
    format!("Added {} to {}", format_currency_with(symbol, amount), category)
}

pub fn debt_added(symbol: &str, name: &str, amount: Decimal) -> String {
    format!("Added {} with amount {}", name, format_currency_with(symbol, amount))
}
