// 🗃️ Session State Store - single owner of a session's FinancialSnapshot
//
// Every mutation goes through here. Amounts for expenses and debts must be
// non-negative; income is taken as given. Edge cases the user can trigger by
// leaving a field blank (empty names, missing amounts) are ignored and
// reported through the boolean outcome rather than as errors. A write that
// would leave totals or remaining money outside the Decimal range is rejected
// with the snapshot untouched.

use crate::error::{StoreError, StoreResult};
use crate::ledger::AmountTable;
use crate::snapshot::FinancialSnapshot;
use crate::summary::{ChartData, Summary};
use rust_decimal::Decimal;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    snapshot: Option<FinancialSnapshot>,
}

impl SessionStore {
    /// Empty store; call `initialize` before anything else
    pub fn new() -> Self {
        SessionStore { snapshot: None }
    }

    /// Store that has already been seeded
    pub fn initialized() -> Self {
        let mut store = SessionStore::new();
        store.initialize();
        store
    }

    /// Seed the snapshot with default values. No-op if already seeded.
    /// Returns true when this call performed the seeding.
    pub fn initialize(&mut self) -> bool {
        if self.snapshot.is_some() {
            return false;
        }
        self.snapshot = Some(FinancialSnapshot::seeded());
        info!("Session snapshot initialized with defaults");
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn snapshot(&self) -> StoreResult<&FinancialSnapshot> {
        self.snapshot.as_ref().ok_or(StoreError::NotInitialized)
    }

    fn snapshot_mut(&mut self) -> StoreResult<&mut FinancialSnapshot> {
        self.snapshot.as_mut().ok_or(StoreError::NotInitialized)
    }

    /// Swap in `candidate` only if every derived figure can still be computed
    fn commit(&mut self, candidate: FinancialSnapshot) -> StoreResult<()> {
        ChartData::of(&candidate)?;
        *self.snapshot_mut()? = candidate;
        Ok(())
    }

    // ========================================================================
    // INCOME
    // ========================================================================

    /// Replace income unconditionally. Returns whether the value changed.
    pub fn set_income(&mut self, income: Decimal) -> StoreResult<bool> {
        let snapshot = self.snapshot()?;
        if snapshot.income == income {
            return Ok(false);
        }
        debug!(old = %snapshot.income, new = %income, "Updating income");
        let mut candidate = snapshot.clone();
        candidate.income = income;
        self.commit(candidate)?;
        Ok(true)
    }

    // ========================================================================
    // EXPENSES
    // ========================================================================

    /// Add `amount` to `category`, creating the entry if needed.
    ///
    /// An empty category name is ignored (`Ok(None)`). On success returns the
    /// category's new total. The category does not have to be registered in
    /// the picker first.
    pub fn add_or_increment_expense(
        &mut self,
        category: &str,
        amount: Decimal,
    ) -> StoreResult<Option<Decimal>> {
        let snapshot = self.snapshot()?;
        if category.is_empty() {
            return Ok(None);
        }
        if amount < Decimal::ZERO {
            return Err(StoreError::negative(category, amount));
        }

        let mut candidate = snapshot.clone();
        let total = candidate
            .expenses
            .increment(category, amount)
            .ok_or(StoreError::Overflow)?;
        self.commit(candidate)?;
        debug!(category, %amount, %total, "Expense recorded");
        Ok(Some(total))
    }

    /// Offer `name` in the expense picker. Returns true if it was newly added;
    /// empty or already-known names are a silent no-op.
    pub fn register_category(&mut self, name: &str) -> StoreResult<bool> {
        let snapshot = self.snapshot_mut()?;
        if name.is_empty() || snapshot.is_known_category(name) {
            return Ok(false);
        }
        snapshot.known_categories.push(name.to_string());
        info!(category = name, "Category registered");
        Ok(true)
    }

    // ========================================================================
    // DEBTS
    // ========================================================================

    /// Replace the whole debt table if it differs from the current one.
    ///
    /// Used to reconcile bulk edits (row edits and deletions at once). Any
    /// negative amount rejects the entire edit and leaves the table as it was.
    pub fn upsert_debts(&mut self, debts: AmountTable) -> StoreResult<bool> {
        let snapshot = self.snapshot()?;
        if let Some((name, amount)) = debts.first_negative() {
            return Err(StoreError::negative(name, amount));
        }
        if snapshot.debts == debts {
            return Ok(false);
        }
        let entries = debts.len();
        let mut candidate = snapshot.clone();
        candidate.debts = debts;
        self.commit(candidate)?;
        info!(entries, "Debt table replaced");
        Ok(true)
    }

    /// Insert or overwrite a single debt.
    ///
    /// `None` means no amount was provided and is ignored, as is an empty
    /// name. An explicit zero is accepted. Returns whether the debt was written.
    pub fn add_debt(&mut self, name: &str, amount: Option<Decimal>) -> StoreResult<bool> {
        let snapshot = self.snapshot()?;
        let Some(amount) = amount else {
            return Ok(false);
        };
        if name.is_empty() {
            return Ok(false);
        }
        if amount < Decimal::ZERO {
            return Err(StoreError::negative(name, amount));
        }

        let mut candidate = snapshot.clone();
        candidate.debts.insert(name, amount);
        self.commit(candidate)?;
        info!(debt = name, %amount, "Debt recorded");
        Ok(true)
    }

    /// Drop one debt row, going through the same reconciliation as a table edit
    pub fn remove_debt(&mut self, name: &str) -> StoreResult<bool> {
        let mut edited = self.snapshot()?.debts.clone();
        if edited.remove(name).is_none() {
            return Ok(false);
        }
        self.upsert_debts(edited)
    }

    // ========================================================================
    // READS
    // ========================================================================

    pub fn compute_summary(&self) -> StoreResult<Summary> {
        Summary::of(self.snapshot()?)
    }

    pub fn chart_data(&self) -> StoreResult<ChartData> {
        ChartData::of(self.snapshot()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn test_operations_require_initialize() {
        let mut store = SessionStore::new();

        assert!(!store.is_initialized());
        assert_eq!(store.compute_summary(), Err(StoreError::NotInitialized));
        assert_eq!(store.set_income(d(1)), Err(StoreError::NotInitialized));
        assert_eq!(store.register_category("X"), Err(StoreError::NotInitialized));
        assert_eq!(store.add_debt("X", Some(d(1))), Err(StoreError::NotInitialized));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut store = SessionStore::new();
        assert!(store.initialize());
        let first = store.snapshot().unwrap().clone();

        assert!(!store.initialize());
        assert_eq!(store.snapshot().unwrap(), &first);
    }

    #[test]
    fn test_initialize_keeps_existing_edits() {
        let mut store = SessionStore::initialized();
        store.set_income(d(9000)).unwrap();

        store.initialize();
        assert_eq!(store.snapshot().unwrap().income, d(9000));
    }

    #[test]
    fn test_set_income_reflected_in_summary() {
        let mut store = SessionStore::initialized();

        assert!(store.set_income(d(7000)).unwrap());
        assert!(!store.set_income(d(7000)).unwrap());

        let summary = store.compute_summary().unwrap();
        assert_eq!(summary.income, d(7000));
        assert_eq!(summary.remaining, d(2500));
    }

    #[test]
    fn test_set_income_accepts_negative() {
        let mut store = SessionStore::initialized();
        assert!(store.set_income(d(-100)).unwrap());
        assert_eq!(store.compute_summary().unwrap().income, d(-100));
    }

    #[test]
    fn test_add_expense_twice_increments() {
        let mut store = SessionStore::initialized();

        assert_eq!(store.add_or_increment_expense("Food", d(50)).unwrap(), Some(d(550)));
        assert_eq!(store.add_or_increment_expense("Food", d(50)).unwrap(), Some(d(600)));
        assert_eq!(store.snapshot().unwrap().expenses.get("Food"), Some(d(600)));
    }

    #[test]
    fn test_add_expense_new_category_without_registering() {
        let mut store = SessionStore::initialized();

        store.add_or_increment_expense("Travel", d(120)).unwrap();
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.expenses.get("Travel"), Some(d(120)));
        assert!(!snapshot.is_known_category("Travel"));
    }

    #[test]
    fn test_add_expense_edge_cases() {
        let mut store = SessionStore::initialized();
        let before = store.snapshot().unwrap().clone();

        assert_eq!(store.add_or_increment_expense("", d(10)).unwrap(), None);
        assert_eq!(
            store.add_or_increment_expense("Food", d(-10)),
            Err(StoreError::negative("Food", d(-10)))
        );
        assert_eq!(store.snapshot().unwrap(), &before);

        assert_eq!(store.add_or_increment_expense("Food", d(0)).unwrap(), Some(d(500)));
    }

    #[test]
    fn test_register_category_once() {
        let mut store = SessionStore::initialized();

        assert!(store.register_category("Travel").unwrap());
        assert!(!store.register_category("Travel").unwrap());
        assert!(!store.register_category("").unwrap());

        let known = &store.snapshot().unwrap().known_categories;
        assert_eq!(known.iter().filter(|c| *c == "Travel").count(), 1);
        assert_eq!(known.last().map(String::as_str), Some("Travel"));
    }

    #[test]
    fn test_upsert_empty_debts() {
        let mut store = SessionStore::initialized();

        assert!(store.upsert_debts(AmountTable::new()).unwrap());
        let summary = store.compute_summary().unwrap();
        assert_eq!(summary.total_debts, Decimal::ZERO);
        assert_eq!(summary.remaining, summary.income - summary.total_expenses);
    }

    #[test]
    fn test_upsert_same_debts_is_unchanged() {
        let mut store = SessionStore::initialized();
        let reordered: AmountTable = vec![
            ("Car Loan", d(700)),
            ("Credit Card", d(1000)),
            ("Student Loan", d(500)),
        ]
        .into_iter()
        .collect();

        assert!(!store.upsert_debts(reordered).unwrap());
    }

    #[test]
    fn test_upsert_rejects_negative_and_accepts_empty_name() {
        let mut store = SessionStore::initialized();
        let bad: AmountTable = vec![("Car Loan", d(-1))].into_iter().collect();

        assert!(store.upsert_debts(bad).is_err());
        assert_eq!(store.snapshot().unwrap().debts.len(), 3);

        let odd: AmountTable = vec![("", d(25))].into_iter().collect();
        assert!(store.upsert_debts(odd).unwrap());
        assert_eq!(store.snapshot().unwrap().debts.get(""), Some(d(25)));
    }

    #[test]
    fn test_add_debt_presence_checks() {
        let mut store = SessionStore::initialized();

        assert!(!store.add_debt("Mortgage", None).unwrap());
        assert!(!store.add_debt("", Some(d(100))).unwrap());
        assert!(store.add_debt("Mortgage", Some(Decimal::ZERO)).unwrap());
        assert_eq!(store.snapshot().unwrap().debts.get("Mortgage"), Some(Decimal::ZERO));

        assert!(store.add_debt("Car Loan", Some(d(300))).unwrap());
        assert_eq!(store.snapshot().unwrap().debts.get("Car Loan"), Some(d(300)));
        assert!(store.add_debt("Car Loan", Some(d(-300))).is_err());
    }

    #[test]
    fn test_remove_debt() {
        let mut store = SessionStore::initialized();

        assert!(store.remove_debt("Student Loan").unwrap());
        assert!(!store.remove_debt("Student Loan").unwrap());
        assert_eq!(store.compute_summary().unwrap().total_debts, d(1700));
    }

    #[test]
    fn test_summary_identity_after_mixed_edits() {
        let mut store = SessionStore::initialized();
        store.set_income(d(3200)).unwrap();
        store.add_or_increment_expense("Gym", d(45)).unwrap();
        store.add_debt("Phone", Some(d(80))).unwrap();

        let s = store.compute_summary().unwrap();
        assert_eq!(s.remaining, s.income - s.total_expenses - s.total_debts);
        assert_eq!(s.total_expenses, d(2345));
        assert_eq!(s.total_debts, d(2280));
    }

    #[test]
    fn test_expense_overflow_is_rejected() {
        let mut store = SessionStore::initialized();
        let before = store.snapshot().unwrap().clone();

        assert_eq!(
            store.add_or_increment_expense("Savings", Decimal::MAX),
            Err(StoreError::Overflow)
        );
        assert_eq!(store.snapshot().unwrap(), &before);
    }

    #[test]
    fn test_expense_added_twice_at_max_is_rejected() {
        let mut store = SessionStore {
            snapshot: Some(FinancialSnapshot {
                income: Decimal::MAX,
                expenses: AmountTable::new(),
                debts: AmountTable::new(),
                known_categories: Vec::new(),
            }),
        };

        assert_eq!(
            store.add_or_increment_expense("Rent", Decimal::MAX).unwrap(),
            Some(Decimal::MAX)
        );
        assert_eq!(
            store.add_or_increment_expense("Rent", Decimal::MAX),
            Err(StoreError::Overflow)
        );
        assert_eq!(store.snapshot().unwrap().expenses.get("Rent"), Some(Decimal::MAX));
        assert_eq!(store.compute_summary().unwrap().remaining, Decimal::ZERO);

        let charts = store.chart_data().unwrap();
        assert_eq!(charts.distribution.slices[0].percent, Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_income_that_breaks_remaining_is_rejected() {
        let mut store = SessionStore::initialized();

        assert_eq!(store.set_income(Decimal::MIN), Err(StoreError::Overflow));
        assert_eq!(store.snapshot().unwrap().income, d(5000));
        assert_eq!(store.compute_summary().unwrap().remaining, d(500));
    }

    #[test]
    fn test_debt_overflow_is_rejected() {
        let mut store = SessionStore::initialized();
        let before = store.snapshot().unwrap().clone();

        assert_eq!(store.add_debt("Mortgage", Some(Decimal::MAX)), Err(StoreError::Overflow));
        let huge: AmountTable = vec![("A", Decimal::MAX), ("B", Decimal::MAX)]
            .into_iter()
            .collect();
        assert_eq!(store.upsert_debts(huge), Err(StoreError::Overflow));

        assert_eq!(store.snapshot().unwrap(), &before);
        assert!(store.chart_data().is_ok());
    }
}
