// 💼 Financial Snapshot - the current-month figures of one session
//
// Holds raw values only. Totals and remaining balance are derived on every
// read (see summary.rs) and never stored here.

use crate::ledger::AmountTable;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// SEED DEFAULTS
// ============================================================================

pub const DEFAULT_INCOME: i64 = 5000;

pub const DEFAULT_EXPENSES: [(&str, i64); 5] = [
    ("Housing", 1000),
    ("Food", 500),
    ("Transport", 300),
    ("Entertainment", 200),
    ("Others", 300),
];

pub const DEFAULT_DEBTS: [(&str, i64); 3] = [
    ("Credit Card", 1000),
    ("Student Loan", 500),
    ("Car Loan", 700),
];

// ============================================================================
// SNAPSHOT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    /// Monthly income (not validated)
    pub income: Decimal,

    /// Expense category → amount spent this month
    pub expenses: AmountTable,

    /// Debt name → outstanding amount
    pub debts: AmountTable,

    /// Category names offered by the "add expense" picker, in display order.
    /// Only ever grows; a name may be listed without an expense entry.
    pub known_categories: Vec<String>,
}

impl FinancialSnapshot {
    /// Snapshot with the fixed session seed values
    pub fn seeded() -> Self {
        let expenses: AmountTable = DEFAULT_EXPENSES
            .iter()
            .map(|(name, amount)| (*name, Decimal::from(*amount)))
            .collect();

        let debts: AmountTable = DEFAULT_DEBTS
            .iter()
            .map(|(name, amount)| (*name, Decimal::from(*amount)))
            .collect();

        let known_categories = expenses.names().map(str::to_string).collect();

        FinancialSnapshot {
            income: Decimal::from(DEFAULT_INCOME),
            expenses,
            debts,
            known_categories,
        }
    }

    pub fn is_known_category(&self, name: &str) -> bool {
        self.known_categories.iter().any(|c| c == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_values() {
        let snapshot = FinancialSnapshot::seeded();

        assert_eq!(snapshot.income, Decimal::from(5000));
        assert_eq!(snapshot.expenses.len(), 5);
        assert_eq!(snapshot.expenses.get("Food"), Some(Decimal::from(500)));
        assert_eq!(snapshot.debts.get("Car Loan"), Some(Decimal::from(700)));
        assert_eq!(
            snapshot.known_categories,
            vec!["Housing", "Food", "Transport", "Entertainment", "Others"]
        );
    }

    #[test]
    fn test_known_category_lookup() {
        let snapshot = FinancialSnapshot::seeded();
        assert!(snapshot.is_known_category("Transport"));
        assert!(!snapshot.is_known_category("transport"));
        assert!(!snapshot.is_known_category("Travel"));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let json = serde_json::to_value(FinancialSnapshot::seeded()).unwrap();

        assert_eq!(json["income"], "5000");
        assert_eq!(json["debts"]["Student Loan"], "500");
        assert_eq!(json["known_categories"][0], "Housing");
    }
}
