// 📊 Derived figures - totals, remaining balance and chart series
//
// Everything here is a pure function of a FinancialSnapshot. Nothing is
// cached, so any read after a mutation reflects it immediately.

use crate::error::{StoreError, StoreResult};
use crate::snapshot::FinancialSnapshot;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const REMAINING_LABEL: &str = "Remaining Money";

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub income: Decimal,
    pub total_expenses: Decimal,
    pub total_debts: Decimal,
    /// income - total_expenses - total_debts (may be negative)
    pub remaining: Decimal,
}

impl Summary {
    /// Fails with `StoreError::Overflow` when a total does not fit in a Decimal
    pub fn of(snapshot: &FinancialSnapshot) -> StoreResult<Self> {
        let total_expenses = snapshot.expenses.total().ok_or(StoreError::Overflow)?;
        let total_debts = snapshot.debts.total().ok_or(StoreError::Overflow)?;
        let remaining = snapshot
            .income
            .checked_sub(total_expenses)
            .and_then(|r| r.checked_sub(total_debts))
            .ok_or(StoreError::Overflow)?;

        Ok(Summary {
            income: snapshot.income,
            total_expenses,
            total_debts,
            remaining,
        })
    }

    pub fn is_deficit(&self) -> bool {
        self.remaining < Decimal::ZERO
    }

    /// Bars for the financial overview chart
    pub fn overview(&self) -> Vec<ChartPoint> {
        vec![
            ChartPoint::new("Income", self.income),
            ChartPoint::new("Expenses", self.total_expenses),
            ChartPoint::new("Debts", self.total_debts),
            ChartPoint::new(REMAINING_LABEL, self.remaining),
        ]
    }
}

// ============================================================================
// CHART SERIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub amount: Decimal,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, amount: Decimal) -> Self {
        ChartPoint {
            label: label.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SliceKind {
    Expense,
    Remaining,
    Debt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    pub label: String,
    pub amount: Decimal,
    pub kind: SliceKind,
    /// Share of the distribution total, in percent
    pub percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub slices: Vec<Slice>,
    pub total: Decimal,
    /// Set when remaining money is negative; holds the shortfall as a positive amount
    pub deficit: Option<Decimal>,
}

/// Per-category spending bars, in table order
pub fn spending_breakdown(snapshot: &FinancialSnapshot) -> Vec<ChartPoint> {
    snapshot
        .expenses
        .iter()
        .map(|(name, amount)| ChartPoint::new(name, amount))
        .collect()
}

/// Debt bars, in table order
pub fn debt_portfolio(snapshot: &FinancialSnapshot) -> Vec<ChartPoint> {
    snapshot
        .debts
        .iter()
        .map(|(name, amount)| ChartPoint::new(name, amount))
        .collect()
}

/// Expense slices, then remaining money (absolute value), then debt slices
pub fn expense_distribution(snapshot: &FinancialSnapshot) -> StoreResult<Distribution> {
    let summary = Summary::of(snapshot)?;

    let mut parts: Vec<(String, Decimal, SliceKind)> = snapshot
        .expenses
        .iter()
        .map(|(name, amount)| (name.to_string(), amount, SliceKind::Expense))
        .collect();
    parts.push((
        REMAINING_LABEL.to_string(),
        summary.remaining.abs(),
        SliceKind::Remaining,
    ));
    parts.extend(
        snapshot
            .debts
            .iter()
            .map(|(name, amount)| (name.to_string(), amount, SliceKind::Debt)),
    );

    let total = parts
        .iter()
        .try_fold(Decimal::ZERO, |acc, (_, amount, _)| acc.checked_add(*amount))
        .ok_or(StoreError::Overflow)?;

    let slices = parts
        .into_iter()
        .map(|(label, amount, kind)| Slice {
            percent: share(amount, total),
            label,
            amount,
            kind,
        })
        .collect();

    Ok(Distribution {
        slices,
        total,
        deficit: summary.is_deficit().then(|| summary.remaining.abs()),
    })
}

fn share(amount: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    // amount * 100 can overflow near Decimal::MAX; amount / total never exceeds 1
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(total))
        .or_else(|| {
            amount
                .checked_div(total)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        })
        .unwrap_or(Decimal::ZERO)
        .round_dp(2)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub overview: Vec<ChartPoint>,
    pub spending: Vec<ChartPoint>,
    pub debts: Vec<ChartPoint>,
    pub distribution: Distribution,
}

impl ChartData {
    pub fn of(snapshot: &FinancialSnapshot) -> StoreResult<Self> {
        Ok(ChartData {
            overview: Summary::of(snapshot)?.overview(),
            spending: spending_breakdown(snapshot),
            debts: debt_portfolio(snapshot),
            distribution: expense_distribution(snapshot)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::AmountTable;

    #[test]
    fn test_summary_of_seeded_snapshot() {
        let summary = Summary::of(&FinancialSnapshot::seeded()).unwrap();

        assert_eq!(summary.total_expenses, Decimal::from(2300));
        assert_eq!(summary.total_debts, Decimal::from(2200));
        assert_eq!(summary.remaining, Decimal::from(500));
        assert!(!summary.is_deficit());
    }

    #[test]
    fn test_remaining_identity_with_deficit() {
        let mut snapshot = FinancialSnapshot::seeded();
        snapshot.income = Decimal::from(1000);
        let summary = Summary::of(&snapshot).unwrap();

        assert_eq!(
            summary.remaining,
            summary.income - summary.total_expenses - summary.total_debts
        );
        assert_eq!(summary.remaining, Decimal::from(-3500));
        assert!(summary.is_deficit());
    }

    #[test]
    fn test_overview_labels() {
        let overview = Summary::of(&FinancialSnapshot::seeded()).unwrap().overview();
        let labels: Vec<_> = overview.iter().map(|p| p.label.as_str()).collect();

        assert_eq!(labels, vec!["Income", "Expenses", "Debts", "Remaining Money"]);
        assert_eq!(overview[3].amount, Decimal::from(500));
    }

    #[test]
    fn test_distribution_order_and_shares() {
        let dist = expense_distribution(&FinancialSnapshot::seeded()).unwrap();

        assert_eq!(dist.slices.len(), 9);
        assert_eq!(dist.slices[0].label, "Housing");
        assert_eq!(dist.slices[5].label, REMAINING_LABEL);
        assert_eq!(dist.slices[5].kind, SliceKind::Remaining);
        assert_eq!(dist.slices[8].label, "Car Loan");
        assert_eq!(dist.total, Decimal::from(5000));
        // Housing: 1000 / 5000
        assert_eq!(dist.slices[0].percent, Decimal::from(20));
        assert_eq!(dist.deficit, None);
    }

    #[test]
    fn test_distribution_deficit_uses_absolute_remaining() {
        let mut snapshot = FinancialSnapshot::seeded();
        snapshot.income = Decimal::from(4000);
        let dist = expense_distribution(&snapshot).unwrap();

        let remaining = dist
            .slices
            .iter()
            .find(|s| s.kind == SliceKind::Remaining)
            .unwrap();
        assert_eq!(remaining.amount, Decimal::from(500));
        assert_eq!(dist.deficit, Some(Decimal::from(500)));
    }

    #[test]
    fn test_distribution_of_empty_snapshot() {
        let snapshot = FinancialSnapshot {
            income: Decimal::ZERO,
            expenses: AmountTable::new(),
            debts: AmountTable::new(),
            known_categories: Vec::new(),
        };
        let dist = expense_distribution(&snapshot).unwrap();

        assert_eq!(dist.slices.len(), 1);
        assert_eq!(dist.total, Decimal::ZERO);
        assert_eq!(dist.slices[0].percent, Decimal::ZERO);
    }

    #[test]
    fn test_summary_overflow_is_an_error() {
        let mut snapshot = FinancialSnapshot::seeded();
        snapshot.income = Decimal::MIN;

        assert_eq!(Summary::of(&snapshot), Err(StoreError::Overflow));
        assert_eq!(ChartData::of(&snapshot), Err(StoreError::Overflow));
    }

    #[test]
    fn test_share_of_huge_amounts() {
        let half = Decimal::MAX / Decimal::TWO;
        assert_eq!(share(half, Decimal::MAX), Decimal::from(50));
        assert_eq!(share(Decimal::ONE, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_chart_data_series() {
        let charts = ChartData::of(&FinancialSnapshot::seeded()).unwrap();

        assert_eq!(charts.spending.len(), 5);
        assert_eq!(charts.debts[0], ChartPoint::new("Credit Card", Decimal::from(1000)));
        assert_eq!(charts.overview.len(), 4);
    }
}
