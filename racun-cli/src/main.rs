use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use racun_core::export::strategy_from_config;
use racun_core::locale::{format_amount, format_date};
use racun_core::{Config, FieldEdit, InvoiceForm, InvoiceRecords, Session, StrategyKind, SyncOutcome};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Strategy {
    Direct,
    Raster,
}

impl From<Strategy> for StrategyKind {
    fn from(s: Strategy) -> Self {
        match s {
            Strategy::Direct => StrategyKind::Direct,
            Strategy::Raster => StrategyKind::Raster,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "racun", version, about = "Apartment rental invoices")]
struct Cli {
    /// Configuration file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Filled-in form (TOML). Without it the sample invoice is used.
    #[arg(short = 'f', long = "form")]
    form: Option<PathBuf>,

    /// Field edit, e.g. `--set reservation.prepayment=150`. Unknown paths are
    /// rejected. Repeatable.
    #[arg(short = 's', long = "set", value_name = "PATH=VALUE")]
    set: Vec<FieldEdit>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the stored fields and derived totals
    Show,
    /// Write the print layout to stdout
    Print,
    /// Export the invoice as racun-<number>.pdf
    Export {
        /// Output directory
        #[arg(short = 'o', long = "out")]
        out: Option<PathBuf>,

        #[arg(long = "strategy", value_enum)]
        strategy: Option<Strategy>,

        /// PNG capture of the invoice for the raster strategy
        #[arg(long = "snapshot")]
        snapshot: Option<PathBuf>,
    },
    /// Write the current form as TOML, ready to edit and pass to --form
    Template,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli).inspect_err(|e| error!("{e:#}"))
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let today = chrono::Local::now().date_naive();
    let mut session = Session::new(InvoiceRecords::seed(today));

    if let Some(path) = &cli.form {
        let form = InvoiceForm::load(path)
            .with_context(|| format!("failed to load form {}", path.display()))?;
        report(session.submit(form));
        info!(form = %path.display(), "form loaded");
    }
    if !cli.set.is_empty() {
        report(session.edit_many(&cli.set)?);
    }
    session.mount();

    let mut stdout = io::stdout().lock();
    match cli.command {
        Command::Show => show(&session, &mut stdout)?,
        Command::Print => session.print(&mut stdout)?,
        Command::Template => stdout.write_all(session.form().to_toml_string()?.as_bytes())?,
        Command::Export {
            out,
            strategy,
            snapshot,
        } => {
            if let Some(strategy) = strategy {
                config.export.strategy = strategy.into();
            }
            if let Some(snapshot) = snapshot {
                config.export.snapshot = Some(snapshot);
            }
            let dir = out.unwrap_or_else(|| config.export.output_dir.clone());
            let strategy = strategy_from_config(&config)?;
            match session.export_pdf(strategy.as_ref(), &dir)? {
                Some(path) => writeln!(stdout, "{}", path.display())?,
                None => bail!("nothing to export"),
            }
        }
    }
    stdout.flush()?;
    Ok(())
}

/// The store keeps its previous contents when a sync is suppressed; say so.
fn report(outcome: SyncOutcome) {
    if let SyncOutcome::Suppressed(issues) = outcome {
        warn!(
            issues = issues.len(),
            "form has invalid fields, keeping previous values"
        );
    }
}

fn show(session: &Session, out: &mut impl Write) -> Result<()> {
    let store = session.store();
    let r = store.reservation();
    let invoice = store.invoice();
    let totals = store.totals();

    writeln!(out, "invoice          {}", invoice.number)?;
    writeln!(out, "issued           {}", format_date(invoice.issue_date))?;
    writeln!(out, "due              {}", format_date(invoice.due_date))?;
    writeln!(out, "host             {}", store.host().name)?;
    writeln!(out, "guest            {}", store.guest().name)?;
    writeln!(
        out,
        "stay             {} - {} ({} nights)",
        format_date(r.arrival),
        format_date(r.departure),
        r.nights
    )?;
    writeln!(out, "accommodation    {}", format_amount(totals.accommodation_cost))?;
    writeln!(out, "tourist tax      {}", format_amount(totals.tourist_tax_total))?;
    writeln!(out, "cleaning         {}", format_amount(r.cleaning_fee))?;
    writeln!(out, "total            {}", format_amount(totals.total_amount))?;
    writeln!(out, "prepayment       {}", format_amount(r.prepayment))?;
    writeln!(out, "balance due      {}", format_amount(totals.balance_due))?;
    Ok(())
}
