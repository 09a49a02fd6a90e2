//! Interactive terminal walk through the decision map.

use anyhow::Result;
use leetmigo_core::{DecisionMap, Navigator, NavigatorState, outline::render_outline};
use std::io::{BufRead, Write};
use tracing::debug;

const HELP: &str = "\
Commands:
  <number>   choose the numbered option
  <label>    choose an option by its exact label
  u          undo the last choice
  b <depth>  keep only the first <depth> choices
  r          reset to the root
  h          show the path so far
  o          outline everything below this stop
  q          quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pick(usize),
    Descend(String),
    Undo,
    Backtrack(usize),
    Reset,
    History,
    Outline,
    Help,
    Quit,
}

impl Command {
    /// Parses one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        let command = match line {
            "" => return Ok(None),
            "u" | "undo" => Command::Undo,
            "r" | "reset" => Command::Reset,
            "h" | "history" => Command::History,
            "o" | "outline" => Command::Outline,
            "?" | "help" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            _ => {
                if let Some(arg) = line.strip_prefix("b ") {
                    let depth = arg
                        .trim()
                        .parse()
                        .map_err(|_| format!("'{}' is not a depth", arg.trim()))?;
                    Command::Backtrack(depth)
                } else if let Ok(index) = line.parse::<usize>() {
                    Command::Pick(index)
                } else {
                    Command::Descend(line.to_string())
                }
            }
        };
        Ok(Some(command))
    }
}

/// Runs the walk until `q` or end of input and returns the final state.
pub fn run<R: BufRead, W: Write>(
    map: &DecisionMap,
    input: R,
    out: &mut W,
) -> Result<NavigatorState> {
    let mut navigator = Navigator::new(map);
    show_stop(&navigator, out)?;

    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next().transpose()? else {
            break;
        };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(out, "{}", message)?;
                continue;
            }
        };
        debug!(?command, "Walk command");

        match command {
            Command::Quit => break,
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::History => show_history(&navigator, out)?,
            Command::Outline => {
                write!(out, "{}", render_outline(&title(&navigator), navigator.current(), None))?
            }
            Command::Undo => {
                if navigator.undo().is_none() {
                    writeln!(out, "Already at the root.")?;
                }
                show_stop(&navigator, out)?;
            }
            Command::Reset => {
                navigator.reset();
                show_stop(&navigator, out)?;
            }
            Command::Backtrack(depth) => {
                navigator.backtrack(depth);
                show_stop(&navigator, out)?;
            }
            Command::Pick(index) => {
                let choices = navigator.choices();
                match index.checked_sub(1).and_then(|i| choices.get(i)) {
                    Some(label) => {
                        let label = label.to_string();
                        descend(&mut navigator, &label, out)?;
                    }
                    None => writeln!(out, "No option numbered {}.", index)?,
                }
            }
            Command::Descend(label) => descend(&mut navigator, &label, out)?,
        }
    }

    Ok(navigator.into_state())
}

fn descend<W: Write>(navigator: &mut Navigator<'_>, label: &str, out: &mut W) -> Result<()> {
    match navigator.descend(label) {
        Ok(_) => show_stop(navigator, out),
        Err(e) => {
            writeln!(out, "{}", e)?;
            Ok(())
        }
    }
}

fn title(navigator: &Navigator<'_>) -> String {
    if navigator.is_at_root() {
        "Subjects".to_string()
    } else {
        navigator.path().join(" > ")
    }
}

fn show_stop<W: Write>(navigator: &Navigator<'_>, out: &mut W) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "== {} ==", title(navigator))?;

    let current = navigator.current();
    if let Some(content) = current.content() {
        writeln!(out, "{}", content)?;
    }
    if let Some(code) = current.code() {
        writeln!(out, "```")?;
        writeln!(out, "{}", code)?;
        writeln!(out, "```")?;
    }

    let choices = navigator.choices();
    if choices.is_empty() {
        writeln!(out, "(no further choices: u, b <depth> or r to move on)")?;
    }
    for (i, label) in choices.iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, label)?;
    }
    Ok(())
}

fn show_history<W: Write>(navigator: &Navigator<'_>, out: &mut W) -> Result<()> {
    let history = navigator.history();
    if history.is_empty() {
        writeln!(out, "No choices made yet.")?;
    }
    for (i, step) in history.iter().enumerate() {
        let marker = if step.code.is_some() { " </>" } else { "" };
        writeln!(out, "{}. {}{}", i + 1, step.label, marker)?;
    }
    Ok(())
}
