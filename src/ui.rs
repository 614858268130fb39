use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use finance_dashboard::{
    deficit_annotation, format, format_currency_with, AmountTable, SessionStore, SliceKind,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::io;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    AddExpense,
    BudgetTracker,
    DebtTracker,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Home, Page::AddExpense, Page::BudgetTracker, Page::DebtTracker];

    pub fn next(&self) -> Self {
        match self {
            Page::Home => Page::AddExpense,
            Page::AddExpense => Page::BudgetTracker,
            Page::BudgetTracker => Page::DebtTracker,
            Page::DebtTracker => Page::Home,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Home => Page::DebtTracker,
            Page::AddExpense => Page::Home,
            Page::BudgetTracker => Page::AddExpense,
            Page::DebtTracker => Page::BudgetTracker,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Home => "Home",
            Page::AddExpense => "Add Expense",
            Page::BudgetTracker => "Budget Tracker",
            Page::DebtTracker => "Debt Tracker",
        }
    }
}

/// Which text field is receiving keystrokes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Income,
    NewCategory,
    ExpenseAmount,
    DebtName,
    DebtAmount,
    DebtEdit,
}

impl InputField {
    fn prompt(&self) -> &str {
        match self {
            InputField::Income => "New monthly income",
            InputField::NewCategory => "New category name",
            InputField::ExpenseAmount => "Expense amount",
            InputField::DebtName => "Debt type",
            InputField::DebtAmount => "Debt amount",
            InputField::DebtEdit => "New amount",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

pub struct App {
    pub store: SessionStore,
    pub current_page: Page,
    pub category_state: ListState,
    pub debt_state: TableState,
    pub editing: Option<InputField>,
    pub input: String,
    pub status: Option<StatusMessage>,
    pending_debt_name: Option<String>,
    currency: String,
}

impl App {
    pub fn new(currency: impl Into<String>) -> Self {
        let mut store = SessionStore::new();
        store.initialize();

        let mut category_state = ListState::default();
        category_state.select(Some(0));

        let mut debt_state = TableState::default();
        debt_state.select(Some(0));

        Self {
            store,
            current_page: Page::Home,
            category_state,
            debt_state,
            editing: None,
            input: String::new(),
            status: None,
            pending_debt_name: None,
            currency: currency.into(),
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    fn known_categories(&self) -> Vec<String> {
        self.store
            .snapshot()
            .map(|s| s.known_categories.clone())
            .unwrap_or_default()
    }

    fn debts(&self) -> AmountTable {
        self.store
            .snapshot()
            .map(|s| s.debts.clone())
            .unwrap_or_default()
    }

    pub fn selected_category(&self) -> Option<String> {
        let categories = self.known_categories();
        self.category_state
            .selected()
            .and_then(|i| categories.get(i).cloned())
    }

    pub fn selected_debt(&self) -> Option<String> {
        let debts = self.debts();
        self.debt_state
            .selected()
            .and_then(|i| debts.names().nth(i).map(str::to_string))
    }

    fn move_selection(&mut self, forward: bool) {
        let (len, selected) = match self.current_page {
            Page::AddExpense => (self.known_categories().len(), self.category_state.selected()),
            Page::DebtTracker => (self.debts().len(), self.debt_state.selected()),
            _ => return,
        };
        if len == 0 {
            return;
        }
        let i = match selected {
            Some(i) if forward => (i + 1) % len,
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        match self.current_page {
            Page::AddExpense => self.category_state.select(Some(i)),
            _ => self.debt_state.select(Some(i)),
        }
    }

    fn clamp_debt_selection(&mut self) {
        let len = self.debts().len();
        match self.debt_state.selected() {
            _ if len == 0 => self.debt_state.select(None),
            Some(i) if i >= len => self.debt_state.select(Some(len - 1)),
            None => self.debt_state.select(Some(0)),
            _ => {}
        }
    }

    fn info(&mut self, text: String) {
        self.status = Some(StatusMessage { text, is_error: false });
    }

    fn error(&mut self, text: String) {
        self.status = Some(StatusMessage { text, is_error: true });
    }

    fn start_editing(&mut self, field: InputField) {
        self.editing = Some(field);
        self.input.clear();
    }

    /// Handle one key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.editing.is_some() {
            self.handle_input_key(key);
            return false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.next_page(),
            KeyCode::BackTab => self.previous_page(),
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                self.current_page = Page::ALL[index];
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(true),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(false),
            KeyCode::Char('i') if self.current_page == Page::BudgetTracker => {
                self.start_editing(InputField::Income)
            }
            KeyCode::Char('n') if self.current_page == Page::AddExpense => {
                self.start_editing(InputField::NewCategory)
            }
            KeyCode::Char('a') | KeyCode::Enter if self.current_page == Page::AddExpense => {
                self.start_editing(InputField::ExpenseAmount)
            }
            KeyCode::Char('n') if self.current_page == Page::DebtTracker => {
                self.pending_debt_name = None;
                self.start_editing(InputField::DebtName)
            }
            KeyCode::Char('e') if self.current_page == Page::DebtTracker => {
                if self.selected_debt().is_some() {
                    self.start_editing(InputField::DebtEdit)
                }
            }
            KeyCode::Char('d') if self.current_page == Page::DebtTracker => self.delete_selected_debt(),
            _ => {}
        }
        false
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.editing = None;
                self.pending_debt_name = None;
                self.input.clear();
            }
            KeyCode::Enter => self.submit_input(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => self.input.push(c),
            _ => {}
        }
    }

    fn submit_input(&mut self) {
        let Some(field) = self.editing.take() else {
            return;
        };
        let text = std::mem::take(&mut self.input);

        let result = match field {
            InputField::Income => self.submit_income(&text),
            InputField::NewCategory => self.submit_category(&text),
            InputField::ExpenseAmount => self.submit_expense(&text),
            InputField::DebtName => {
                self.pending_debt_name = Some(text);
                self.start_editing(InputField::DebtAmount);
                Ok(())
            }
            InputField::DebtAmount => self.submit_debt(&text),
            InputField::DebtEdit => self.submit_debt_edit(&text),
        };

        if let Err(err) = result {
            self.error(err.to_string());
        }
    }

    fn submit_income(&mut self, text: &str) -> Result<()> {
        let Some(income) = parse_amount(text)? else {
            return Ok(());
        };
        if self.store.set_income(income)? {
            self.info(format::income_updated());
        }
        Ok(())
    }

    fn submit_category(&mut self, text: &str) -> Result<()> {
        if self.store.register_category(text)? {
            self.info(format::category_added(text));
            let last = self.known_categories().len().saturating_sub(1);
            self.category_state.select(Some(last));
        }
        Ok(())
    }

    fn submit_expense(&mut self, text: &str) -> Result<()> {
        let Some(category) = self.selected_category() else {
            self.error("Select a category first".to_string());
            return Ok(());
        };
        let amount = parse_amount(text)?.unwrap_or(Decimal::ZERO);
        if self.store.add_or_increment_expense(&category, amount)?.is_some() {
            self.info(format::expense_added(&self.currency, &category, amount));
        }
        Ok(())
    }

    fn submit_debt(&mut self, text: &str) -> Result<()> {
        let name = self.pending_debt_name.take().unwrap_or_default();
        let amount = parse_amount(text)?;
        if self.store.add_debt(&name, amount)? {
            self.info(format::debt_added(&self.currency, &name, amount.unwrap_or_default()));
            self.clamp_debt_selection();
        } else {
            self.error("Enter both a debt type and an amount".to_string());
        }
        Ok(())
    }

    /// Edit the selected row, then reconcile the whole table
    fn submit_debt_edit(&mut self, text: &str) -> Result<()> {
        let Some(name) = self.selected_debt() else {
            return Ok(());
        };
        let Some(amount) = parse_amount(text)? else {
            return Ok(());
        };
        let mut edited = self.debts();
        edited.insert(name.clone(), amount);
        if self.store.upsert_debts(edited)? {
            self.info(format!("Updated {} to {}", name, format_currency_with(&self.currency, amount)));
        }
        Ok(())
    }

    fn delete_selected_debt(&mut self) {
        let Some(name) = self.selected_debt() else {
            return;
        };
        match self.store.remove_debt(&name) {
            Ok(true) => self.info(format!("Removed {}", name)),
            Ok(false) => {}
            Err(err) => self.error(err.to_string()),
        }
        self.clamp_debt_selection();
    }
}

/// Empty input means "not provided"
fn parse_amount(text: &str) -> Result<Option<Decimal>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(trimmed)
        .map(Some)
        .map_err(|_| anyhow::anyhow!("'{}' is not a number", trimmed))
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Home => render_home(f, chunks[1]),
        Page::AddExpense => render_add_expense(f, chunks[1], app),
        Page::BudgetTracker => render_budget(f, chunks[1], app),
        Page::DebtTracker => render_debts(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(format!("{} {}", i + 1, page.title()), style));
    }

    if let Ok(summary) = app.store.compute_summary() {
        let color = if summary.is_deficit() { Color::Red } else { Color::Green };
        tab_spans.push(Span::raw("  |  "));
        tab_spans.push(Span::styled(
            format!("Remaining: {}", format_currency_with(&app.currency, summary.remaining)),
            Style::default().fg(color),
        ));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_home(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(Span::styled(
            "Welcome to your Financial Dashboard",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Use Tab / Shift-Tab or 1-4 to move between pages."),
        Line::from(""),
        Line::from("This dashboard helps you manage your personal finances and debts:"),
        Line::from("  • Budget Tracker: track your income and expenses"),
        Line::from("  • Debt Tracker: monitor your debts"),
        Line::from("  • Add Expense: quickly add your expenses"),
    ];

    let home = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Home "));
    f.render_widget(home, area);
}

fn render_add_expense(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let Ok(snapshot) = app.store.snapshot() else {
        return;
    };

    let items: Vec<ListItem> = snapshot
        .known_categories
        .iter()
        .map(|name| {
            let spent = snapshot.expenses.get(name).unwrap_or_default();
            ListItem::new(format!("{:<20} {:>12}", name, format_currency_with(&app.currency, spent)))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Expense Category "))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");

    let help = Paragraph::new(vec![
        Line::from("Quickly add your expenses to keep track of your spending."),
        Line::from(""),
        Line::from(vec![Span::styled("n", Style::default().fg(Color::Yellow)), Span::raw("  new category name")]),
        Line::from(vec![Span::styled("↑/↓", Style::default().fg(Color::Yellow)), Span::raw(" select category")]),
        Line::from(vec![Span::styled("a", Style::default().fg(Color::Yellow)), Span::raw("  add amount to selected category")]),
    ])
    .wrap(Wrap { trim: false })
    .block(Block::default().borders(Borders::ALL).title(" Add a New Expense "));

    f.render_stateful_widget(list, chunks[0], &mut app.category_state);
    f.render_widget(help, chunks[1]);
}

/// Bar values are whole currency units; negative amounts draw as empty bars
fn bar_value(amount: Decimal) -> u64 {
    amount.max(Decimal::ZERO).round().to_u64().unwrap_or(0)
}

fn render_budget(f: &mut Frame, area: Rect, app: &App) {
    let (Ok(summary), Ok(charts)) = (app.store.compute_summary(), app.store.chart_data()) else {
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Percentage(40),
            Constraint::Min(0),
        ])
        .split(area);

    let money = |amount: Decimal| format_currency_with(&app.currency, amount);
    let remaining_color = if summary.is_deficit() { Color::Red } else { Color::Green };
    let figures = Paragraph::new(vec![
        Line::from(format!("Monthly Income:  {}", money(summary.income))),
        Line::from(format!("Total Expenses:  {}", money(summary.total_expenses))),
        Line::from(format!("Total Debts:     {}", money(summary.total_debts))),
        Line::from(Span::styled(
            format!("Remaining Money: {}", money(summary.remaining)),
            Style::default().fg(remaining_color).add_modifier(Modifier::BOLD),
        )),
    ])
    .block(Block::default().borders(Borders::ALL).title(" Budget Tracker (i: update income) "));
    f.render_widget(figures, rows[0]);

    let overview: Vec<(&str, u64)> = charts
        .overview
        .iter()
        .map(|p| (p.label.as_str(), bar_value(p.amount)))
        .collect();
    let overview_chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" Financial Overview "))
        .data(overview.as_slice())
        .bar_width(12)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Blue))
        .value_style(Style::default().fg(Color::Black).bg(Color::Blue));
    f.render_widget(overview_chart, rows[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);

    let spending: Vec<(&str, u64)> = charts
        .spending
        .iter()
        .map(|p| (p.label.as_str(), bar_value(p.amount)))
        .collect();
    let spending_chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" Monthly Spending Breakdown "))
        .data(spending.as_slice())
        .bar_width(9)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Red));
    f.render_widget(spending_chart, bottom[0]);

    let header = Row::new(["Category", "Amount", "Share"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    }));
    let slice_rows = charts.distribution.slices.iter().map(|slice| {
        let color = match slice.kind {
            SliceKind::Expense => Color::Red,
            SliceKind::Remaining if charts.distribution.deficit.is_some() => Color::Blue,
            SliceKind::Remaining => Color::Green,
            SliceKind::Debt => Color::Magenta,
        };
        Row::new(vec![
            Cell::from(slice.label.clone()),
            Cell::from(money(slice.amount)).style(Style::default().fg(color)),
            Cell::from(format!("{:.1}%", slice.percent)),
        ])
    });

    let title = match charts.distribution.deficit {
        Some(deficit) => format!(" {} ", deficit_annotation(&app.currency, deficit)),
        None => " Expense Distribution ".to_string(),
    };
    let table = Table::new(
        slice_rows,
        [Constraint::Min(16), Constraint::Length(14), Constraint::Length(8)],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(table, bottom[1]);
}

fn render_debts(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let debts = app.debts();
    let currency = app.currency.clone();
    let money = |amount: Decimal| format_currency_with(&currency, amount);

    let header = Row::new(["Debt Type", "Amount"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    }))
    .style(Style::default().bg(Color::DarkGray));

    let rows = debts.iter().map(|(name, amount)| {
        Row::new(vec![Cell::from(name.to_string()), Cell::from(money(amount))])
    });

    let table = Table::new(rows, [Constraint::Min(20), Constraint::Length(16)])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Debt Portfolio (n: add, e: edit, d: delete) "),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");

    let bars: Vec<(&str, u64)> = debts.iter().map(|(name, amount)| (name, bar_value(amount))).collect();
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" Debt Portfolio "))
        .data(bars.as_slice())
        .bar_width(12)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Magenta));

    f.render_stateful_widget(table, chunks[0], &mut app.debt_state);
    f.render_widget(chart, chunks[1]);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let line = if let Some(field) = app.editing {
        Line::from(vec![
            Span::styled(format!(" {}: ", field.prompt()), Style::default().fg(Color::Cyan)),
            Span::raw(format!("{}_", app.input)),
            Span::raw("  | "),
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" Save | "),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" Cancel"),
        ])
    } else {
        let mut spans = vec![];
        if let Some(status) = &app.status {
            let color = if status.is_error { Color::Red } else { Color::Green };
            spans.push(Span::styled(format!(" {} ", status.text), Style::default().fg(color)));
            spans.push(Span::raw("| "));
        }
        spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(" Page | "));
        spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(" Nav | "));
        spans.push(Span::styled("q", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(" Quit"));
        Line::from(spans)
    };

    let status = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(status, area);
}
