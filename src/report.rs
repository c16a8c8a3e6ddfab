//! Text output for the CLI
//!
//! The currency is passed in explicitly; nothing here reads configuration.

use crate::batch::BatchReport;
use crate::goal::GoalSolution;
use crate::interest::{CalculationInput, CalculationResult, GrowthPoint};
use crate::scenario::ScenarioOutcome;
use crate::simulation::{SimulationRun, SummaryStats};
use crate::store::{HistoryEntry, Template};
use std::io::{self, Write};

/// Width of the growth bar at the largest value
const BAR_WIDTH: usize = 20;

/// Display symbol for an ISO currency code, `$` when unknown
pub fn currency_symbol(currency: &str) -> &'static str {
    match currency.to_ascii_uppercase().as_str() {
        "USD" => "$",
        "IDR" => "Rp",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" | "CNY" => "¥",
        "AUD" => "A$",
        "CAD" => "C$",
        "CHF" => "CHF",
        "SEK" => "kr",
        "NZD" => "NZ$",
        _ => "$",
    }
}

/// Format with thousands separators and two decimals; IDR uses `.` groups and no decimals
pub fn format_currency(amount: f64, currency: &str) -> String {
    let symbol = currency_symbol(currency);
    let sign = if amount < 0.0 { "-" } else { "" };

    if currency.eq_ignore_ascii_case("IDR") {
        let whole = format!("{:.0}", amount.abs());
        return format!("{}{}{}", sign, symbol, group_digits(&whole, '.'));
    }

    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{}{}{}.{}", sign, symbol, group_digits(whole, ','), cents)
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

/// Writes calculation results for one currency
#[derive(Debug, Clone)]
pub struct Report {
    currency: String,
    show_graph: bool,
}

impl Report {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            show_graph: true,
        }
    }

    pub fn with_graph(mut self, show_graph: bool) -> Self {
        self.show_graph = show_graph;
        self
    }

    fn money(&self, amount: f64) -> String {
        format_currency(amount, &self.currency)
    }

    fn amount_label(&self, input: &CalculationInput) -> String {
        match input.payment_frequency() {
            Some(frequency) => format!("{}/{}", self.money(input.payment()), frequency),
            None => self.money(input.principal()),
        }
    }

    pub fn summary<W: Write>(&self, out: &mut W, input: &CalculationInput, result: &CalculationResult) -> io::Result<()> {
        writeln!(out, "Compound Interest Summary")?;
        writeln!(out, "{}", "=".repeat(40))?;
        if let Some(frequency) = input.payment_frequency() {
            writeln!(out, "  Payment:               {} per {}", self.money(input.payment()), frequency)?;
            writeln!(out, "  Total Invested:        {}", self.money(result.total_contributed))?;
        } else {
            writeln!(out, "  Principal:             {}", self.money(input.principal()))?;
        }
        writeln!(out, "  Interest Rate:         {:.2}%", input.annual_rate())?;
        writeln!(out, "  Time:                  {:.2} years", input.years())?;
        writeln!(out, "  Compounding Frequency: {} times/year", input.compounds_per_year())?;
        writeln!(out, "  Tax Rate:              {:.2}%", input.tax_rate())?;
        writeln!(out, "  Fee Rate:              {:.2}%", input.fee_rate())?;
        writeln!(out)?;
        writeln!(out, "  Future Value:          {}", self.money(result.future_value))?;
        writeln!(out, "  Gross Interest:        {}", self.money(result.interest))?;
        writeln!(out, "  Tax:                   {}", self.money(result.tax))?;
        writeln!(out, "  Fee:                   {}", self.money(result.fee))?;
        writeln!(out, "  Final Amount:          {}", self.money(result.net_value))?;
        writeln!(out, "  Interest Earned:       {}", self.money(result.net_interest()))?;
        Ok(())
    }

    pub fn growth<W: Write>(&self, out: &mut W, growth: &[GrowthPoint]) -> io::Result<()> {
        if growth.is_empty() {
            return writeln!(out, "No yearly growth data to display.");
        }

        writeln!(out, "\nYearly Growth")?;
        writeln!(out, "{:>6} {:>20}", "Year", "Amount")?;
        let max_value = growth.iter().map(|p| p.net_value).fold(0.0_f64, f64::max);

        for point in growth {
            write!(out, "{:>6} {:>20}", point.year, self.money(point.net_value))?;
            if self.show_graph {
                write!(out, "  {}", bar(point.net_value, max_value))?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    pub fn comparison<W: Write>(&self, out: &mut W, outcomes: &[ScenarioOutcome]) -> io::Result<()> {
        if outcomes.is_empty() {
            return writeln!(out, "No scenarios to compare.");
        }

        writeln!(out, "Scenario Comparison")?;
        writeln!(
            out,
            "{:<16} {:>22} {:>8} {:>10} {:>6} {:>8} {:>8} {:>18} {:>18}",
            "Scenario", "Principal/Payment", "Rate", "Time", "N/Yr", "Tax", "Fee", "Amount", "Interest"
        )?;
        writeln!(out, "{}", "-".repeat(124))?;
        for outcome in outcomes {
            let input = &outcome.input;
            writeln!(
                out,
                "{:<16} {:>22} {:>7.2}% {:>6.2} yrs {:>6} {:>7.2}% {:>7.2}% {:>18} {:>18}",
                outcome.label,
                self.amount_label(input),
                input.annual_rate(),
                input.years(),
                input.compounds_per_year(),
                input.tax_rate(),
                input.fee_rate(),
                self.money(outcome.result.net_value),
                self.money(outcome.result.net_interest()),
            )?;
        }
        Ok(())
    }

    pub fn simulation<W: Write>(&self, out: &mut W, run: &SimulationRun) -> io::Result<()> {
        writeln!(out, "Monte Carlo Simulation Results")?;
        writeln!(
            out,
            "  {} trials, {:?} rate around {:.2}% with volatility {:.2} points (seed {})",
            run.config.trials,
            run.config.distribution,
            run.base_input.annual_rate(),
            run.config.rate_volatility,
            run.config.seed
        )?;
        if let Some(stats) = run.summary() {
            writeln!(out, "\n  Future value (before tax and fee)")?;
            self.stats(out, &stats)?;
        }
        if let Some(stats) = run.net_summary() {
            writeln!(out, "\n  Net value (after tax and fee)")?;
            self.stats(out, &stats)?;
        }
        Ok(())
    }

    fn stats<W: Write>(&self, out: &mut W, stats: &SummaryStats) -> io::Result<()> {
        writeln!(out, "    Mean Amount:        {}", self.money(stats.mean))?;
        writeln!(out, "    Min Amount:         {}", self.money(stats.min))?;
        writeln!(out, "    10th Percentile:    {}", self.money(stats.p10))?;
        writeln!(out, "    Median:             {}", self.money(stats.median))?;
        writeln!(out, "    90th Percentile:    {}", self.money(stats.p90))?;
        writeln!(out, "    Max Amount:         {}", self.money(stats.max))?;
        writeln!(out, "    Standard Deviation: {}", self.money(stats.std_dev))?;
        Ok(())
    }

    pub fn goal<W: Write>(&self, out: &mut W, solution: &GoalSolution) -> io::Result<()> {
        match solution {
            GoalSolution::Principal(principal) => writeln!(out, "Required Principal: {}", self.money(*principal)),
            GoalSolution::Years(years) => writeln!(out, "Required Time: {:.2} years", years),
            GoalSolution::Rate(rate) => writeln!(out, "Required Annual Rate: {:.4}%", rate),
        }
    }

    pub fn templates<W: Write>(&self, out: &mut W, templates: &[Template]) -> io::Result<()> {
        if templates.is_empty() {
            return writeln!(out, "No templates found.");
        }

        writeln!(out, "Saved Templates")?;
        writeln!(
            out,
            "{:>4} {:<20} {:>22} {:>8} {:>10} {:>6} {:>8} {:>8}",
            "ID", "Name", "Principal/Payment", "Rate", "Time", "N/Yr", "Tax", "Fee"
        )?;
        for template in templates {
            let input = &template.input;
            writeln!(
                out,
                "{:>4} {:<20} {:>22} {:>7.2}% {:>6.2} yrs {:>6} {:>7.2}% {:>7.2}%",
                template.id,
                template.name,
                self.amount_label(input),
                input.annual_rate(),
                input.years(),
                input.compounds_per_year(),
                input.tax_rate(),
                input.fee_rate(),
            )?;
        }
        Ok(())
    }

    pub fn history<W: Write>(&self, out: &mut W, entries: &[HistoryEntry]) -> io::Result<()> {
        if entries.is_empty() {
            return writeln!(out, "No calculations found in history.");
        }

        writeln!(out, "Calculation History")?;
        writeln!(
            out,
            "{:>4} {:<16} {:>22} {:>8} {:>10} {:>18} {:>18} {:>20}",
            "ID", "Type", "Principal/Payment", "Rate", "Time", "Amount", "Interest", "Timestamp"
        )?;
        for entry in entries {
            writeln!(
                out,
                "{:>4} {:<16} {:>22} {:>7.2}% {:>6.2} yrs {:>18} {:>18} {:>20}",
                entry.id,
                entry.kind(),
                self.amount_label(&entry.input),
                entry.input.annual_rate(),
                entry.input.years(),
                self.money(entry.result.net_value),
                self.money(entry.result.net_interest()),
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            )?;
        }
        Ok(())
    }

    pub fn notifications<W: Write>(&self, out: &mut W, entries: &[HistoryEntry]) -> io::Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        writeln!(out, "Upcoming Investment Targets")?;
        for entry in entries {
            let target = entry
                .target_date
                .map(|d| d.to_string())
                .unwrap_or_default();
            writeln!(
                out,
                "{:>4} {:<16} {:>22} {:>18} {:>12}",
                entry.id,
                entry.kind(),
                self.amount_label(&entry.input),
                self.money(entry.result.net_value),
                target,
            )?;
        }
        Ok(())
    }

    pub fn batch<W: Write>(&self, out: &mut W, report: &BatchReport) -> io::Result<()> {
        if report.outcomes.is_empty() {
            return writeln!(out, "No calculations processed from the batch file.");
        }

        for (position, outcome) in report.outcomes.iter().enumerate() {
            writeln!(out, "\nBatch Calculation {}:", position + 1)?;
            match outcome {
                Ok(item) => self.summary(out, &item.input, &item.result)?,
                Err(e) => writeln!(out, "  skipped: {}", e)?,
            }
        }
        writeln!(
            out,
            "\nBatch processing complete: {} calculated, {} skipped.",
            report.success_count(),
            report.failure_count()
        )
    }
}

fn bar(value: f64, max_value: f64) -> String {
    if max_value <= 0.0 {
        return String::new();
    }
    let len = ((value / max_value) * BAR_WIDTH as f64) as usize;
    "█".repeat(len.min(BAR_WIDTH))
}
