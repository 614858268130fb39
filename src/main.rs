// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use finance_dashboard::{format_currency_with, Config, SessionStore};
use std::env;

fn main() -> Result<()> {
    let config = Config::from_env()?;
    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "summary" {
        // Print the seeded session figures and exit
        run_summary(&config)?;
    } else {
        // UI mode (default)
        run_ui_mode(&config)?;
    }

    Ok(())
}

fn run_summary(config: &Config) -> Result<()> {
    let store = SessionStore::initialized();
    let snapshot = store.snapshot()?;
    let summary = store.compute_summary()?;
    let money = |amount| format_currency_with(&config.currency, amount);

    println!("💰 Financial Overview");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!("\nExpenses:");
    for (name, amount) in snapshot.expenses.iter() {
        println!("  {:<20} {:>12}", name, money(amount));
    }

    println!("\nDebts:");
    for (name, amount) in snapshot.debts.iter() {
        println!("  {:<20} {:>12}", name, money(amount));
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Monthly Income:  {}", money(summary.income));
    println!("Total Expenses:  {}", money(summary.total_expenses));
    println!("Total Debts:     {}", money(summary.total_debts));
    println!("Remaining Money: {}", money(summary.remaining));

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    println!("🖥️  Loading Financial Dashboard...\n");

    let mut app = ui::App::new(config.currency.clone());
    ui::run_ui(&mut app)?;

    println!("\n✅ Session closed (nothing is saved)");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin dashboard-server --features server");
    std::process::exit(1);
}
