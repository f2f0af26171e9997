//! Text commands standing in for touch input.
//!
//! One command per line on stdin. Product and category arguments are ids;
//! a product argument may also be the 1-based position shown on the grid.

/// An input event for the terminal loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TerminalEvent {
    /// Product button pressed.
    Tap(String),
    /// Category tab pressed; `None` is the "All" tab.
    SelectCategory(Option<String>),
    /// Cart line tapped: remove one unit.
    Remove(String),
    /// Pay button pressed.
    Pay,
    /// Card reader reported an approval.
    Confirm,
    /// Cancel on the payment overlay.
    Cancel,
    /// Manual catalog refresh.
    Sync,
    /// Redraw the screen.
    Show,
    Help,
    Quit,
}

pub(crate) const HELP: &str = "\
commands:
  tap <product|#>   add one unit
  rm <product|#>    remove one unit
  cat <category>    filter products (`cat all` clears)
  pay               checkout
  confirm           approve the pending payment
  cancel            cancel the pending payment
  sync              refresh the catalog now
  show              redraw
  quit";

/// Parses one input line. Blank lines and `#` comments yield `Ok(None)`.
///
/// # Errors
///
/// Returns an error for unknown commands or a missing argument.
pub(crate) fn parse_command(line: &str) -> anyhow::Result<Option<TerminalEvent>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default().to_ascii_lowercase();
    let argument = parts.collect::<Vec<_>>().join(" ");
    let require = |what: &str| -> anyhow::Result<String> {
        if argument.is_empty() {
            anyhow::bail!("`{command}` needs a {what}");
        }
        Ok(argument.clone())
    };

    let event = match command.as_str() {
        "tap" | "add" => TerminalEvent::Tap(require("product")?),
        "rm" | "remove" => TerminalEvent::Remove(require("product")?),
        "cat" | "category" => {
            let id = require("category")?;
            if id.eq_ignore_ascii_case("all") {
                TerminalEvent::SelectCategory(None)
            } else {
                TerminalEvent::SelectCategory(Some(id))
            }
        }
        "pay" | "checkout" => TerminalEvent::Pay,
        "confirm" | "approve" => TerminalEvent::Confirm,
        "cancel" => TerminalEvent::Cancel,
        "sync" => TerminalEvent::Sync,
        "show" | "ls" => TerminalEvent::Show,
        "help" | "?" => TerminalEvent::Help,
        "quit" | "exit" | "q" => TerminalEvent::Quit,
        other => anyhow::bail!("unknown command `{other}`; type `help`"),
    };
    Ok(Some(event))
}
