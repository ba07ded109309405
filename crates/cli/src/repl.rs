//! Interactive mode: keystrokes from stdin, one line at a time.
//!
//! Each line is a whitespace-separated list of key labels (`7 + 3 =`) or a
//! `:command`. After every line the session is echoed back.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use omnicalc_core::{Calculator, Key};
use serde_json::json;

const HELP: &str = "\
keys:      0-9 . ( ) e + - × ÷ = sin cos tan log ln √ x² xʸ n! π % M+ M- MR MC C AC
commands:  :history  :recall N  :memory  :help  :quit";

/// Configuration for interactive mode.
pub struct ReplConfig {
    /// Print a prompt before each line (only when stdin is a terminal)
    pub prompt: bool,
    /// Output one JSON object per line instead of human-readable
    pub json: bool,
}

/// What the loop should do after a line.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Quit,
}

/// Run interactive mode until `:quit` or end of input.
pub fn run_repl(
    calc: &mut Calculator,
    input: impl BufRead,
    out: &mut impl Write,
    config: &ReplConfig,
) -> io::Result<()> {
    if config.prompt {
        writeln!(out, "{}", "omnicalc (:help for keys, :quit to exit)".dimmed())?;
        write_prompt(out)?;
    }

    for line in input.lines() {
        let line = line?;
        if process_line(calc, &line, out, config)? == Step::Quit {
            break;
        }
        if config.prompt {
            write_prompt(out)?;
        }
    }

    Ok(())
}

fn write_prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "{} ", ">".cyan().bold())?;
    out.flush()
}

fn process_line(
    calc: &mut Calculator,
    line: &str,
    out: &mut impl Write,
    config: &ReplConfig,
) -> io::Result<Step> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Step::Continue);
    }

    if let Some(command) = line.strip_prefix(':') {
        return run_command(calc, command, out, config);
    }

    // Reject the whole line on a bad key so half a sequence is never applied.
    let keys: Result<Vec<Key>, _> = line.split_whitespace().map(str::parse).collect();
    match keys {
        Ok(keys) => {
            tracing::trace!(count = keys.len(), "applying keys");
            for key in keys {
                calc.press(key);
            }
            write_state(calc, out, config)?;
        }
        Err(e) => writeln!(out, "{}: {}", "error".red().bold(), e)?,
    }
    Ok(Step::Continue)
}

fn run_command(
    calc: &mut Calculator,
    command: &str,
    out: &mut impl Write,
    config: &ReplConfig,
) -> io::Result<Step> {
    let mut parts = command.split_whitespace();
    match parts.next().unwrap_or_default() {
        "q" | "quit" | "exit" => return Ok(Step::Quit),
        "h" | "help" => writeln!(out, "{HELP}")?,
        "history" => write_history(calc, out, config)?,
        "memory" | "m" => {
            if config.json {
                writeln!(out, "{}", json!({ "memory": calc.memory() }))?;
            } else {
                writeln!(out, "M = {}", calc.formatter().format(calc.memory()))?;
            }
        }
        "recall" | "r" => {
            let index = parts.next().and_then(|n| n.parse::<usize>().ok());
            match index {
                Some(i) if calc.recall_history(i) => write_state(calc, out, config)?,
                Some(i) => writeln!(out, "{}: no history entry {}", "error".red().bold(), i)?,
                None => writeln!(out, "{}: usage: :recall N", "error".red().bold())?,
            }
        }
        other => writeln!(
            out,
            "{}: unknown command ':{}' (try :help)",
            "error".red().bold(),
            other
        )?,
    }
    Ok(Step::Continue)
}

fn write_state(calc: &Calculator, out: &mut impl Write, config: &ReplConfig) -> io::Result<()> {
    if config.json {
        let state = json!({
            "display": calc.rendered_display(),
            "raw": calc.display(),
            "expression": calc.expression(),
            "memory": calc.memory(),
        });
        writeln!(out, "{state}")
    } else if calc.expression().is_empty() {
        writeln!(out, "{}", calc.rendered_display().bold())
    } else {
        writeln!(
            out,
            "{}{}",
            calc.expression().dimmed(),
            calc.rendered_display().bold()
        )
    }
}

fn write_history(calc: &Calculator, out: &mut impl Write, config: &ReplConfig) -> io::Result<()> {
    if config.json {
        let items: Vec<_> = calc.history().iter().collect();
        return writeln!(out, "{}", json!(items));
    }
    if calc.history().is_empty() {
        return writeln!(out, "{}", "(no history)".dimmed());
    }
    for (i, item) in calc.history().iter().enumerate() {
        writeln!(
            out,
            "{:>3}  {} = {}",
            i.to_string().dimmed(),
            item.expression,
            calc.formatter().format(item.result.parse().unwrap_or(f64::NAN)).bold()
        )?;
    }
    Ok(())
}
