mod config;
mod repl;

use config::Config;

use std::fmt::Display;
use std::io;

use clap::{Parser, Subcommand};
use colored::{control::set_override, Colorize};
use is_terminal::IsTerminal;
use omnicalc_core::currency::{self, CurrencyConverter};
use omnicalc_core::{
    emi, eval_str, format_currency, format_grouped, Calculator, EmiInput, Key, NumberFormatter,
    SessionConfig, TenureUnit,
};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

use crate::repl::ReplConfig;

const LONG_ABOUT: &str = r##"
Omnicalc is a terminal calculator with basic, scientific, loan EMI and
currency conversion modes.

MODES:
  eval         Evaluate an expression:  2 + 3 × 4, sqrt(16), pow(2, 10)
  keys         Press calculator keys:   7 + 3 =, 5 n!, 9 √
  repl         Interactive keypad session (default when no command is given)
  emi          Monthly installment for a loan
  convert      Convert between currencies using live exchange rates
  currencies   List or search supported currencies

EXAMPLES:
  omnicalc eval '2 + 3 × 4'                 14
  omnicalc eval 'sin(30) + cos(60)'         Trig functions take degrees
  omnicalc keys 2 xʸ 1 0 =                  1024
  omnicalc keys 1 0 0 M+ MR                 Memory register
  omnicalc emi --amount 250000 --rate 6 --tenure 20 --unit years
  omnicalc convert 100 USD INR
  omnicalc currencies rupee

CONFIGURATION:
  Settings are read from a TOML file (see --config-path), overridden by
  OMNICALC_* environment variables, overridden by command line flags."##;

#[derive(Parser)]
#[command(name = "omnicalc")]
#[command(version)]
#[command(about = "Calculator with scientific, loan EMI and currency modes")]
#[command(long_about = LONG_ABOUT)]
#[command(after_help = "For more information, visit: https://github.com/mjukis-ab/omnicalc")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Output as JSON
    #[arg(long, short = 'j', global = true)]
    json: bool,

    /// Disable colored output
    #[arg(long, short = 'C', global = true)]
    no_color: bool,

    /// Fraction digits shown for results
    #[arg(long, short = 'p', value_name = "DIGITS", global = true)]
    precision: Option<usize>,

    /// Enable verbose logging (use multiple times for more detail)
    ///
    /// -v shows debug messages, -vv shows trace messages.
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Show config file path
    #[arg(long)]
    config_path: bool,

    /// Generate default config file (see --config-path for location)
    #[arg(long)]
    config_init: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate an expression
    Eval {
        /// Expression; several arguments are joined with spaces
        #[arg(required = true, allow_hyphen_values = true, num_args = 1..)]
        expression: Vec<String>,
    },

    /// Run a sequence of keypad presses and show the display
    Keys {
        /// Key labels, e.g. `7 + 3 =` or `2 xʸ 8 =`
        #[arg(required = true, allow_hyphen_values = true, num_args = 1..)]
        keys: Vec<String>,

        /// Also print the session history
        #[arg(long, short = 'H')]
        history: bool,
    },

    /// Interactive keypad session on stdin
    Repl,

    /// Loan EMI (equated monthly installment)
    Emi {
        /// Principal
        #[arg(long, short = 'a', default_value_t = 1_000_000.0)]
        amount: f64,

        /// Annual interest rate in percent
        #[arg(long, short = 'r', default_value_t = 8.5)]
        rate: f64,

        /// Loan tenure, in --unit
        #[arg(long, short = 't', default_value_t = 120.0)]
        tenure: f64,

        /// Tenure unit: months or years
        #[arg(long, short = 'u', default_value = "months")]
        unit: TenureUnit,

        /// Currency used for display
        #[arg(long, short = 'c', default_value = "USD")]
        currency: String,

        /// Fail on invalid inputs instead of printing zeros
        #[arg(long)]
        strict: bool,
    },

    /// Convert an amount between currencies using live rates
    Convert {
        #[arg(allow_negative_numbers = true)]
        amount: f64,

        /// Source currency (default: base_currency from config)
        from: Option<String>,

        /// Target currency (default: target_currency from config)
        to: Option<String>,
    },

    /// List supported currencies, optionally filtered by code or name
    Currencies {
        query: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Handle --config-path
    if cli.config_path {
        match Config::path() {
            Some(path) => println!("{}", path.display()),
            None => fail("Cannot determine config directory"),
        }
        return;
    }

    // Handle --config-init
    if cli.config_init {
        match config::init_config() {
            Ok(path) => println!("Created config file: {}", path.display()),
            Err(e) => fail(e),
        }
        return;
    }

    // Initialize tracing based on verbosity level (before config loading for logging)
    let level = match cli.verbose {
        0 => LevelFilter::OFF,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    if level != LevelFilter::OFF {
        let filter = EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy();
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    // Load config file and merge with CLI args
    // Precedence: CLI args > Environment vars > Config file > Defaults
    let file_config = Config::load();

    if let Some(path) = Config::path() {
        if path.exists() {
            tracing::debug!("Loaded config from: {}", path.display());
        } else {
            tracing::trace!("No config file at: {}", path.display());
        }
    }

    let precision = if let Some(p) = cli.precision {
        tracing::debug!("precision = {} (from CLI)", p);
        p
    } else {
        let p = file_config.precision();
        let source = if std::env::var("OMNICALC_PRECISION").is_ok() {
            "env OMNICALC_PRECISION"
        } else if file_config.precision.is_some() {
            "config file"
        } else {
            "default"
        };
        tracing::debug!("precision = {} (from {})", p, source);
        p
    };

    let no_color = if cli.no_color {
        tracing::debug!("no_color = true (from CLI)");
        true
    } else {
        let nc = file_config.no_color();
        if nc {
            let source = if std::env::var("NO_COLOR").is_ok() {
                "env NO_COLOR"
            } else if std::env::var("OMNICALC_NO_COLOR").is_ok() {
                "env OMNICALC_NO_COLOR"
            } else {
                "config file"
            };
            tracing::debug!("no_color = true (from {})", source);
        }
        nc
    };
    if no_color || !io::stdout().is_terminal() {
        set_override(false);
    }

    let session = SessionConfig {
        precision,
        ..file_config.session()
    };

    match cli.command.unwrap_or(Command::Repl) {
        Command::Eval { expression } => {
            handle_eval(&expression.join(" "), &NumberFormatter::new(precision), cli.json)
        }
        Command::Keys { keys, history } => handle_keys(&keys, session, history, cli.json),
        Command::Repl => handle_repl(session, cli.json),
        Command::Emi {
            amount,
            rate,
            tenure,
            unit,
            currency,
            strict,
        } => {
            let input = EmiInput {
                loan_amount: amount,
                interest_rate: rate,
                tenure,
                tenure_unit: unit,
                currency: currency.to_uppercase(),
            };
            handle_emi(&input, strict, cli.json)
        }
        Command::Convert { amount, from, to } => {
            let from = from.map_or_else(|| file_config.base_currency(), |c| c.to_uppercase());
            let to = to.map_or_else(|| file_config.target_currency(), |c| c.to_uppercase());
            handle_convert(&file_config, amount, &from, &to, cli.json)
        }
        Command::Currencies { query } => handle_currencies(query.as_deref().unwrap_or(""), cli.json),
    }
}

/// Print an error and exit with status 1.
fn fail(message: impl Display) -> ! {
    eprintln!("{}: {}", "error".red().bold(), message);
    std::process::exit(1);
}

fn print_json(value: &impl Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => fail(e),
    }
}

fn handle_eval(expression: &str, formatter: &NumberFormatter, json: bool) {
    match eval_str(expression) {
        Ok(value) => {
            if json {
                print_json(&json!({
                    "expression": expression,
                    "result": value,
                    "display": formatter.format(value),
                }));
            } else {
                println!("{}", formatter.format(value));
            }
        }
        Err(e) => fail(e),
    }
}

fn handle_keys(labels: &[String], session: SessionConfig, show_history: bool, json: bool) {
    let keys: Vec<Key> = labels
        .iter()
        .flat_map(|l| l.split_whitespace())
        .map(|l| l.parse::<Key>().unwrap_or_else(|e| fail(e)))
        .collect();

    let mut calc = Calculator::with_config(session);
    for key in keys {
        calc.press(key);
    }

    if json {
        let mut output = json!({
            "display": calc.rendered_display(),
            "raw": calc.display(),
            "expression": calc.expression(),
            "memory": calc.memory(),
        });
        if show_history {
            let items: Vec<_> = calc.history().iter().collect();
            output["history"] = json!(items);
        }
        print_json(&output);
        return;
    }

    if show_history {
        for item in calc.history().iter().rev() {
            println!("{} {}", item.expression.dimmed(), format!("= {}", item.result).dimmed());
        }
    }
    println!("{}", calc.to_string().bold());
}

fn handle_repl(session: SessionConfig, json: bool) {
    let stdin = io::stdin();
    let config = ReplConfig {
        prompt: stdin.is_terminal() && !json,
        json,
    };
    let mut calc = Calculator::with_config(session);
    let mut out = io::stdout().lock();
    if let Err(e) = repl::run_repl(&mut calc, stdin.lock(), &mut out, &config) {
        fail(e);
    }
}

fn handle_emi(input: &EmiInput, strict: bool, json: bool) {
    if strict {
        if let Err(e) = input.validate() {
            fail(e);
        }
    }
    let out = emi::calculate(input);
    tracing::debug!(emi = out.emi, installments = input.installments(), "emi computed");

    if json {
        print_json(&json!({
            "input": input,
            "emi": out.emi,
            "total_interest": out.total_interest,
            "total_payment": out.total_payment,
            "interest_share": out.interest_share(),
        }));
        return;
    }

    let code = &input.currency;
    println!("{:<16}{}", "Monthly EMI", format_currency(out.emi, code).bold());
    println!("{:<16}{}", "Principal", format_currency(input.loan_amount, code));
    println!("{:<16}{}", "Total interest", format_currency(out.total_interest, code));
    println!("{:<16}{}", "Total payment", format_currency(out.total_payment, code));
    println!(
        "{:<16}{}",
        "Interest share",
        format!("{}%", format_grouped(out.interest_share() * 100.0, 1)).dimmed()
    );
}

fn handle_convert(config: &Config, amount: f64, from: &str, to: &str, json: bool) {
    for code in [from, to] {
        if currency::find(code).is_none() {
            tracing::debug!(code, "currency not in reference table, asking provider anyway");
        }
    }

    let provider = config.rate_provider();
    let mut converter = CurrencyConverter::new(from, to);
    converter.set_amount(amount);
    converter.fetch_with(&provider);

    if let Some(error) = converter.error() {
        fail(error);
    }
    let rate = converter.exchange_rate();
    if rate == 0.0 {
        fail(format!("no exchange rate from {from} to {to}"));
    }

    if json {
        print_json(&json!({
            "amount": amount,
            "from": converter.base(),
            "to": converter.target(),
            "rate": rate,
            "converted": converter.converted_amount(),
            "last_updated": converter.last_updated(),
        }));
        return;
    }

    println!(
        "{} {} = {} {}",
        format_grouped(amount, 4),
        converter.base(),
        format_grouped(converter.converted_amount(), 4).bold(),
        converter.target().bold()
    );
    println!(
        "{}",
        format!("1 {} = {:.4} {}", converter.base(), rate, converter.target()).dimmed()
    );
    if let Some(updated) = converter.last_updated() {
        println!(
            "{}",
            format!("Rates updated {}", updated.format("%Y-%m-%d %H:%M UTC")).dimmed()
        );
    }
}

fn handle_currencies(query: &str, json: bool) {
    let matches = currency::search(query);

    if json {
        print_json(&matches);
        return;
    }
    if matches.is_empty() {
        fail(format!("no currency matches '{query}'"));
    }
    for c in matches {
        println!("{}  {:<4} {}", c.code.bold(), c.symbol, c.name);
    }
}
