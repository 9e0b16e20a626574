//! Interactive line-driven dashboard session.
//!
//! DESIGN
//! ======
//! One loop waits on two sources at once: the next input line and the next
//! live-feed frame. Both waits are cancel-safe, so whichever loses the
//! `select!` race simply resumes on the next turn. The screen is redrawn after
//! every command and every applied feed frame.
//!
//! ERROR HANDLING
//! ==============
//! Command errors are printed and the session continues. Only I/O failures on
//! the input or output stream end the loop early.

#[cfg(test)]
#[path = "shell_test.rs"]
mod shell_test;

use std::io::Write;
use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::dashboard::{Dashboard, DashboardError, FeedPoll, Registration};
use crate::render;

pub const HELP: &str = "\
commands:
  list | ls             show the asset list
  select <n|id>         open an asset (list position or id)
  back                  return to the list
  refresh               reload the asset list
  new                   open the registration form
  set <field> <value>   edit a form field
  submit                register the drafted asset
  cancel                close the form
  dismiss               close the alert
  log <kWh>             submit today's production reading (push variant)
  penalties             load the penalty summary for the open asset
  help                  show this text
  quit | exit           leave
";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShellError {
    #[error("unknown command `{0}` (try `help`)")]
    UnknownCommand(String),
    #[error("`{command}` needs {argument}")]
    MissingArgument { command: &'static str, argument: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Redraw,
    List,
    Select(String),
    Back,
    Refresh,
    New,
    Set { field: String, value: String },
    Submit,
    Cancel,
    Dismiss,
    Log(String),
    Penalties,
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = ShellError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let required = |command: &'static str, argument: &'static str| {
            if rest.is_empty() {
                Err(ShellError::MissingArgument { command, argument })
            } else {
                Ok(rest.to_owned())
            }
        };

        match verb.to_ascii_lowercase().as_str() {
            "" => Ok(Self::Redraw),
            "list" | "ls" => Ok(Self::List),
            "select" | "open" => required("select", "a list position or bond id").map(Self::Select),
            "back" => Ok(Self::Back),
            "refresh" => Ok(Self::Refresh),
            "new" => Ok(Self::New),
            "set" => {
                let assignment = required("set", "a field and a value")?;
                let (field, value) = assignment.split_once(char::is_whitespace).unwrap_or((assignment.as_str(), ""));
                Ok(Self::Set { field: field.to_owned(), value: value.trim().to_owned() })
            }
            "submit" => Ok(Self::Submit),
            "cancel" => Ok(Self::Cancel),
            "dismiss" => Ok(Self::Dismiss),
            "log" => required("log", "a kWh value").map(Self::Log),
            "penalties" => Ok(Self::Penalties),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(ShellError::UnknownCommand(other.to_owned())),
        }
    }
}

/// Apply one command, returning a status line to print under the screen.
///
/// # Errors
///
/// Propagates the controller's rejection of the command.
pub async fn execute(dash: &mut Dashboard, command: ShellCommand) -> Result<Option<String>, DashboardError> {
    match command {
        ShellCommand::Redraw | ShellCommand::Quit => {}
        ShellCommand::List | ShellCommand::Back => dash.clear_selection(),
        ShellCommand::Select(key) => {
            let bond_id = dash
                .registry
                .resolve(&key)
                .map(|bond| bond.id.clone())
                .ok_or(DashboardError::UnknownBond(key))?;
            dash.select(&bond_id).await?;
        }
        ShellCommand::Refresh => {
            dash.load_registry().await;
            return Ok(Some(format!("{} assets", dash.registry.len())));
        }
        ShellCommand::New => dash.open_registration(),
        ShellCommand::Set { field, value } => {
            let draft = dash.draft.as_mut().ok_or(DashboardError::FormClosed)?;
            draft.set_field(&field, &value)?;
        }
        ShellCommand::Submit => {
            if dash.submit_registration().await? == Registration::Created {
                return Ok(Some("asset registered".to_owned()));
            }
        }
        ShellCommand::Cancel => dash.cancel_registration(),
        ShellCommand::Dismiss => dash.ui.dismiss_alert(),
        ShellCommand::Log(value) => {
            dash.ui.manual_input = value;
            let sent = dash.submit_manual_log().await?;
            return Ok(Some(if sent { "reading submitted" } else { "not a number; nothing sent" }.to_owned()));
        }
        ShellCommand::Penalties => dash.load_penalty_summary().await?,
        ShellCommand::Help => return Ok(Some(HELP.to_owned())),
    }
    Ok(None)
}

enum Event {
    Line(Option<String>),
    Feed(FeedPoll),
}

/// Run the session until `quit` or end of input, then release the feed.
///
/// # Errors
///
/// Returns I/O errors from reading `input` or writing `out`.
pub async fn run<R, W>(dash: &mut Dashboard, input: R, out: &mut W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    write!(out, "{}", render::screen(dash))?;
    out.flush()?;

    loop {
        let event = tokio::select! {
            line = lines.next_line() => Event::Line(line?),
            poll = dash.poll_feed() => Event::Feed(poll),
        };

        let status = match event {
            Event::Line(None) => break,
            Event::Line(Some(line)) => match line.parse::<ShellCommand>() {
                Ok(ShellCommand::Quit) => break,
                Ok(command) => execute(dash, command)
                    .await
                    .unwrap_or_else(|error| Some(format!("error: {error}"))),
                Err(error) => Some(error.to_string()),
            },
            Event::Feed(FeedPoll::Ignored) => continue,
            Event::Feed(FeedPoll::Applied) => None,
            Event::Feed(FeedPoll::Ended) => Some("live feed closed by server".to_owned()),
        };

        write!(out, "{}", render::screen(dash))?;
        if let Some(status) = status {
            writeln!(out, "{status}")?;
        }
        out.flush()?;
    }

    dash.shutdown();
    Ok(())
}
