//! Compound Interest CLI
//!
//! Command-line interface for compound-interest projections

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use compound_interest::batch::{FailurePolicy, JsonFileSource};
use compound_interest::config::DEFAULT_CONFIG_PATH;
use compound_interest::interest::yearly_growth;
use compound_interest::report::Report;
use compound_interest::simulation::{RateDistribution, DEFAULT_SEED, DEFAULT_TRIALS};
use compound_interest::store::{History, HistoryEntry, JsonFileStore, Template, Templates, HISTORY_FILE, TEMPLATES_FILE};
use compound_interest::{
    calculate, AppConfig, BatchRunner, CalculationInput, GoalSpec, MonteCarloSimulator, PaymentFrequency, ScenarioSet,
    SimulationConfig,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "compound-interest", version, about = "Compound interest calculator")]
struct Cli {
    /// Configuration file (display currency)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory holding history and template files
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Hide the growth bars in yearly tables
    #[arg(long)]
    no_graph: bool,

    /// Do not append calculations to the history
    #[arg(long)]
    no_save: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Grow a one-off principal
    LumpSum {
        #[arg(long)]
        principal: f64,
        #[arg(long, default_value_t = 12)]
        compounds: u32,
        #[command(flatten)]
        plan: PlanArgs,
        /// Optional target date (YYYY-MM-DD) for notifications
        #[arg(long)]
        target_date: Option<NaiveDate>,
    },
    /// Regular payments at the end of every period
    Savings {
        #[arg(long)]
        payment: f64,
        #[arg(long, value_enum, default_value_t = Frequency::Monthly)]
        frequency: Frequency,
        #[command(flatten)]
        plan: PlanArgs,
        /// Optional target date (YYYY-MM-DD) for notifications
        #[arg(long)]
        target_date: Option<NaiveDate>,
    },
    /// Compare labelled scenarios from a JSON file
    Compare { file: PathBuf },
    /// Simulate randomized annual rates
    MonteCarlo {
        #[arg(long)]
        principal: f64,
        #[arg(long, default_value_t = 12)]
        compounds: u32,
        #[command(flatten)]
        plan: PlanArgs,
        /// Rate spread in percentage points (default: 20% of the rate)
        #[arg(long)]
        volatility: Option<f64>,
        #[arg(long, default_value_t = DEFAULT_TRIALS)]
        trials: usize,
        #[arg(long, value_enum, default_value_t = Distribution::Normal)]
        distribution: Distribution,
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
        /// Spread trials across threads
        #[arg(long)]
        parallel: bool,
    },
    /// Solve for the principal, duration or rate that reaches a target
    #[command(subcommand)]
    Goal(GoalCommand),
    #[command(subcommand)]
    Template(TemplateCommand),
    #[command(subcommand)]
    History(HistoryCommand),
    /// Calculate every record of a JSON batch file
    Batch {
        file: PathBuf,
        /// Tax rate for records without one
        #[arg(long, default_value_t = 0.0)]
        tax: f64,
        /// Fee rate for records without one
        #[arg(long, default_value_t = 0.0)]
        fee: f64,
        /// Stop at the first bad record instead of skipping it
        #[arg(long)]
        halt: bool,
    },
    /// Saved calculations with a target date in the next week
    Notifications,
}

#[derive(Debug, Args)]
struct PlanArgs {
    /// Annual rate in percent
    #[arg(long)]
    rate: f64,
    #[arg(long)]
    years: f64,
    /// Tax on gains in percent
    #[arg(long, default_value_t = 0.0)]
    tax: f64,
    /// Fee on total value in percent
    #[arg(long, default_value_t = 0.0)]
    fee: f64,
}

impl PlanArgs {
    fn apply(&self, input: CalculationInput) -> compound_interest::Result<CalculationInput> {
        input.with_tax_rate(self.tax)?.with_fee_rate(self.fee)
    }
}

#[derive(Debug, Subcommand)]
enum GoalCommand {
    /// Principal needed to reach the target
    Principal {
        #[arg(long)]
        target: f64,
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        years: f64,
        #[arg(long, default_value_t = 12)]
        compounds: u32,
    },
    /// Years needed to reach the target
    Years {
        #[arg(long)]
        target: f64,
        #[arg(long)]
        principal: f64,
        #[arg(long)]
        rate: f64,
        #[arg(long, default_value_t = 12)]
        compounds: u32,
    },
    /// Annual rate needed to reach the target
    Rate {
        #[arg(long)]
        target: f64,
        #[arg(long)]
        principal: f64,
        #[arg(long)]
        years: f64,
        #[arg(long, default_value_t = 12)]
        compounds: u32,
    },
}

#[derive(Debug, Subcommand)]
enum TemplateCommand {
    /// Save a named input
    Save {
        name: String,
        #[arg(long, conflicts_with = "payment")]
        principal: Option<f64>,
        #[arg(long)]
        payment: Option<f64>,
        #[arg(long, default_value_t = 12)]
        compounds: u32,
        #[command(flatten)]
        plan: PlanArgs,
    },
    List,
    /// Calculate a saved template by id or name
    Run { key: String },
}

#[derive(Debug, Subcommand)]
enum HistoryCommand {
    Show,
    /// Write the history to a CSV file
    Export {
        #[arg(default_value = "calculations_history.csv")]
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Frequency {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    fn periods_per_year(self) -> u32 {
        match self {
            Frequency::Weekly => 52,
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
            Frequency::Yearly => 1,
        }
    }
}

impl From<Frequency> for PaymentFrequency {
    fn from(value: Frequency) -> Self {
        match value {
            Frequency::Weekly => PaymentFrequency::Weekly,
            Frequency::Monthly => PaymentFrequency::Monthly,
            Frequency::Quarterly => PaymentFrequency::Quarterly,
            Frequency::Yearly => PaymentFrequency::Yearly,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Distribution {
    Normal,
    Uniform,
}

impl From<Distribution> for RateDistribution {
    fn from(value: Distribution) -> Self {
        match value {
            Distribution::Normal => RateDistribution::Normal,
            Distribution::Uniform => RateDistribution::Uniform,
        }
    }
}

/// Shared state for one invocation
struct App {
    report: Report,
    history: History<JsonFileStore<HistoryEntry>>,
    templates: Templates<JsonFileStore<Template>>,
    save: bool,
}

impl App {
    fn open(config: &AppConfig, data_dir: &Path, show_graph: bool, save: bool) -> Self {
        Self {
            report: Report::new(config.currency.clone()).with_graph(show_graph),
            history: History::new(JsonFileStore::new(data_dir.join(HISTORY_FILE))),
            templates: Templates::new(JsonFileStore::new(data_dir.join(TEMPLATES_FILE))),
            save,
        }
    }

    /// Print saved targets due within the notification window, if any
    ///
    /// An unreadable history only logs a warning so the command itself still runs.
    fn show_due_targets<W: Write>(&self, out: &mut W, today: NaiveDate) -> anyhow::Result<()> {
        match self.history.notifications(today) {
            Ok(due) if due.is_empty() => {}
            Ok(due) => {
                self.report.notifications(out, &due)?;
                writeln!(out)?;
            }
            Err(e) => log::warn!("could not check upcoming targets: {}", e),
        }
        Ok(())
    }

    /// Calculate, print and log one input
    fn run_calculation<W: Write>(
        &self,
        out: &mut W,
        input: CalculationInput,
        target_date: Option<NaiveDate>,
    ) -> anyhow::Result<()> {
        let result = calculate(&input);
        self.report.summary(out, &input, &result)?;
        self.report.growth(out, &yearly_growth(&input))?;

        if self.save {
            self.history
                .record(input, result, target_date, Local::now().naive_local())
                .context("failed to save calculation to history")?;
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config);
    log::debug!("using currency {}", config.currency);

    let app = App::open(&config, &cli.data_dir, !cli.no_graph, !cli.no_save);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !matches!(cli.command, Command::Notifications) {
        app.show_due_targets(&mut out, Local::now().date_naive())?;
    }

    match cli.command {
        Command::LumpSum { principal, compounds, plan, target_date } => {
            let input = plan.apply(CalculationInput::lump_sum(principal, plan.rate, plan.years, compounds)?)?;
            app.run_calculation(&mut out, input, target_date)?;
        }
        Command::Savings { payment, frequency, plan, target_date } => {
            let input = plan.apply(CalculationInput::regular_savings(
                payment,
                plan.rate,
                plan.years,
                frequency.periods_per_year(),
            )?)?;
            app.run_calculation(&mut out, input.with_payment_frequency(frequency.into()), target_date)?;
        }
        Command::Compare { file } => {
            let set = ScenarioSet::from_path(&file)
                .with_context(|| format!("failed to read scenarios from {}", file.display()))?;
            if set.len() < 2 {
                bail!("need at least two scenarios to compare, found {}", set.len());
            }
            app.report.comparison(&mut out, &set.compare())?;
        }
        Command::MonteCarlo {
            principal,
            compounds,
            plan,
            volatility,
            trials,
            distribution,
            seed,
            parallel,
        } => {
            let input = plan.apply(CalculationInput::lump_sum(principal, plan.rate, plan.years, compounds)?)?;
            let mut config = SimulationConfig::for_input(&input)
                .with_distribution(distribution.into())
                .with_seed(seed);
            config.trials = trials;
            if let Some(volatility) = volatility {
                config.rate_volatility = volatility;
            }

            let simulator = MonteCarloSimulator::new(input, config)?;
            let run = if parallel {
                simulator.run_parallel()?
            } else {
                simulator.run_seeded()?
            };
            app.report.simulation(&mut out, &run)?;
        }
        Command::Goal(goal) => {
            let spec = match goal {
                GoalCommand::Principal { target, rate, years, compounds } => GoalSpec::Principal {
                    target,
                    annual_rate: rate,
                    years,
                    compounds_per_year: compounds,
                },
                GoalCommand::Years { target, principal, rate, compounds } => GoalSpec::Years {
                    target,
                    principal,
                    annual_rate: rate,
                    compounds_per_year: compounds,
                },
                GoalCommand::Rate { target, principal, years, compounds } => GoalSpec::Rate {
                    target,
                    principal,
                    years,
                    compounds_per_year: compounds,
                },
            };
            app.report.goal(&mut out, &spec.solve()?)?;
        }
        Command::Template(TemplateCommand::Save { name, principal, payment, compounds, plan }) => {
            let input = match (principal, payment) {
                (_, Some(payment)) => CalculationInput::regular_savings(payment, plan.rate, plan.years, compounds)?,
                (Some(principal), None) => CalculationInput::lump_sum(principal, plan.rate, plan.years, compounds)?,
                (None, None) => bail!("a template needs either --principal or --payment"),
            };
            let template = app.templates.save(&name, plan.apply(input)?)?;
            writeln!(out, "Template '{}' saved with id {}.", template.name, template.id)?;
        }
        Command::Template(TemplateCommand::List) => {
            app.report.templates(&mut out, &app.templates.list()?)?;
        }
        Command::Template(TemplateCommand::Run { key }) => {
            let Some(template) = app.templates.find(&key)? else {
                bail!("no template matches '{}'", key);
            };
            writeln!(out, "Loading template '{}'...\n", template.name)?;
            app.run_calculation(&mut out, template.input, None)?;
        }
        Command::History(HistoryCommand::Show) => {
            app.report.history(&mut out, &app.history.entries()?)?;
        }
        Command::History(HistoryCommand::Export { path }) => {
            let rows = app
                .history
                .export_csv(&path)
                .with_context(|| format!("failed to export history to {}", path.display()))?;
            if rows == 0 {
                writeln!(out, "No history to export.")?;
            } else {
                writeln!(out, "Exported {} calculations to {}", rows, path.display())?;
            }
        }
        Command::Batch { file, tax, fee, halt } => {
            let runner = BatchRunner::new()
                .with_default_rates(tax, fee)
                .with_policy(if halt { FailurePolicy::Halt } else { FailurePolicy::Skip });
            let report = runner
                .run(&JsonFileSource::new(&file))
                .with_context(|| format!("failed to process batch file {}", file.display()))?;

            if app.save {
                let now = Local::now().naive_local();
                for item in report.items() {
                    app.history.record(item.input, item.result, None, now)?;
                }
            }
            app.report.batch(&mut out, &report)?;
        }
        Command::Notifications => {
            let due = app.history.notifications(Local::now().date_naive())?;
            if due.is_empty() {
                writeln!(out, "No upcoming investment targets.")?;
            } else {
                app.report.notifications(&mut out, &due)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("compound-interest").chain(args.iter().copied()))
    }

    fn at(date: &str) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn test_target_date_only_on_saved_calculations() {
        let lump = parse(&["lump-sum", "--principal", "1000", "--rate", "5", "--years", "10", "--target-date", "2030-01-01"]);
        assert!(matches!(
            lump.unwrap().command,
            Command::LumpSum { target_date: Some(_), .. }
        ));

        let savings = parse(&["savings", "--payment", "100", "--rate", "5", "--years", "10", "--target-date", "2030-01-01"]);
        assert!(savings.is_ok());

        let simulation = parse(&["monte-carlo", "--principal", "1000", "--rate", "5", "--years", "10", "--target-date", "2030-01-01"]);
        assert!(simulation.is_err());

        let template = parse(&["template", "save", "plan", "--principal", "1000", "--rate", "5", "--years", "10", "--target-date", "2030-01-01"]);
        assert!(template.is_err());
    }

    #[test]
    fn test_due_targets_shown_before_commands() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::open(&AppConfig::default(), dir.path(), false, true);
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let mut out = Vec::new();
        app.show_due_targets(&mut out, today).unwrap();
        assert!(out.is_empty());

        let input = CalculationInput::lump_sum(1000.0, 5.0, 2.0, 12).unwrap();
        let result = calculate(&input);
        app.history.record(input, result, Some(today + chrono::Days::new(3)), at("2024-05-01")).unwrap();
        app.history.record(input, result, Some(today + chrono::Days::new(30)), at("2024-05-01")).unwrap();

        let mut out = Vec::new();
        app.show_due_targets(&mut out, today).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Upcoming Investment Targets"));
        assert!(text.contains("2024-06-04"));
        assert!(!text.contains("2024-07-01"));
    }

    #[test]
    fn test_unreadable_history_does_not_block_commands() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(HISTORY_FILE), "{ not json").unwrap();
        let app = App::open(&AppConfig::default(), dir.path(), false, true);

        let mut out = Vec::new();
        app.show_due_targets(&mut out, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_savings_frequency_sets_periods_and_label() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::open(&AppConfig::default(), dir.path(), false, true);
        let input = CalculationInput::regular_savings(50.0, 4.0, 1.0, Frequency::Weekly.periods_per_year())
            .unwrap()
            .with_payment_frequency(Frequency::Weekly.into());

        let mut out = Vec::new();
        app.run_calculation(&mut out, input, None).unwrap();
        let saved = app.history.entries().unwrap();
        assert_eq!(saved[0].input.payment_frequency(), Some(PaymentFrequency::Weekly));
        assert_eq!(saved[0].input.compounds_per_year(), 52);
    }
}
