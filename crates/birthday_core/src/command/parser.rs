//! Chat command parsing.
//!
//! # Responsibility
//! - Turn raw message text into a typed [`Command`] in a single step.
//! - Reject malformed arguments with a [`FormatError`] naming the usage.
//!
//! # Invariants
//! - Only the leading token is matched case-insensitively; arguments keep
//!   their original text.
//! - Text whose leading token is not a known command parses to `Ok(None)`.
//! - The parser never checks calendar validity; it only checks shape.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static DATE_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{2})/([0-9]{2})$").expect("valid date token regex"));

/// One recognized chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `!help`
    Help,
    /// `!add <name...> <DD/MM>`; `day`/`month` are raw numerals.
    Add { name: String, day: u32, month: u32 },
    /// `!remove <name...>`
    Remove { name: String },
    /// `!list` (alias `!listar`)
    List,
    /// `!upcoming` (alias `!proximos`)
    Upcoming,
    /// `!misterio`: acknowledges and logs the group id for operators.
    Reveal,
}

impl Command {
    /// Stable command name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::List => "list",
            Self::Upcoming => "upcoming",
            Self::Reveal => "reveal",
        }
    }
}

/// Malformed command arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// `!add` without a name and a trailing `DD/MM` token.
    AddUsage,
    /// `!remove` without a name.
    RemoveUsage,
    /// `!remove` given a date where a full name was expected.
    RemoveExpectsName,
}

impl Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AddUsage => write!(f, "expected `!add <name> <DD/MM>`"),
            Self::RemoveUsage => write!(f, "expected `!remove <name>`"),
            Self::RemoveExpectsName => write!(f, "`!remove` expects a full name, not a date"),
        }
    }
}

impl Error for FormatError {}

/// Parses one message.
///
/// Returns `Ok(None)` when the text is not a command this bot knows.
///
/// # Errors
/// - `FormatError` when a known command has malformed arguments.
pub fn parse_command(text: &str) -> Result<Option<Command>, FormatError> {
    let mut tokens = text.split_whitespace();
    let Some(head) = tokens.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = tokens.collect();

    let command = match head.to_lowercase().as_str() {
        "!help" => Command::Help,
        "!add" => parse_add(&args)?,
        "!remove" => parse_remove(&args)?,
        "!list" | "!listar" => Command::List,
        "!upcoming" | "!proximos" => Command::Upcoming,
        "!misterio" => Command::Reveal,
        _ => return Ok(None),
    };
    Ok(Some(command))
}

/// Splits a `DD/MM` token into raw `(day, month)` numerals.
pub fn parse_date_token(token: &str) -> Option<(u32, u32)> {
    let captures = DATE_TOKEN_RE.captures(token)?;
    let day = captures.get(1)?.as_str().parse().ok()?;
    let month = captures.get(2)?.as_str().parse().ok()?;
    Some((day, month))
}

fn parse_add(args: &[&str]) -> Result<Command, FormatError> {
    let [name_tokens @ .., date_token] = args else {
        return Err(FormatError::AddUsage);
    };
    if name_tokens.is_empty() {
        return Err(FormatError::AddUsage);
    }
    let (day, month) = parse_date_token(date_token).ok_or(FormatError::AddUsage)?;
    Ok(Command::Add {
        name: name_tokens.join(" "),
        day,
        month,
    })
}

fn parse_remove(args: &[&str]) -> Result<Command, FormatError> {
    if args.is_empty() {
        return Err(FormatError::RemoveUsage);
    }
    let name = args.join(" ");
    if DATE_TOKEN_RE.is_match(&name) {
        return Err(FormatError::RemoveExpectsName);
    }
    Ok(Command::Remove { name })
}

#[cfg(test)]
mod tests {
    use super::{parse_command, parse_date_token, Command, FormatError};

    #[test]
    fn add_takes_last_token_as_date_and_joins_the_rest() {
        let command = parse_command("!add Henrique   Jambu 09/06").unwrap();
        assert_eq!(
            command,
            Some(Command::Add {
                name: "Henrique Jambu".to_string(),
                day: 9,
                month: 6,
            })
        );
    }

    #[test]
    fn add_keeps_unreal_numerals_for_later_validation() {
        assert_eq!(
            parse_command("!add Ana 31/04").unwrap(),
            Some(Command::Add {
                name: "Ana".to_string(),
                day: 31,
                month: 4,
            })
        );
    }

    #[test]
    fn add_rejects_missing_name_or_bad_date_shape() {
        assert_eq!(parse_command("!add"), Err(FormatError::AddUsage));
        assert_eq!(parse_command("!add 09/06"), Err(FormatError::AddUsage));
        assert_eq!(parse_command("!add Ana 9/6"), Err(FormatError::AddUsage));
        assert_eq!(parse_command("!add Ana 09-06"), Err(FormatError::AddUsage));
        assert_eq!(parse_command("!add Ana Maria"), Err(FormatError::AddUsage));
    }

    #[test]
    fn remove_rejects_dates_and_empty_names() {
        assert_eq!(parse_command("!remove"), Err(FormatError::RemoveUsage));
        assert_eq!(
            parse_command("!remove 31/12"),
            Err(FormatError::RemoveExpectsName)
        );
        assert_eq!(
            parse_command("!remove  Ana   Maria "),
            Ok(Some(Command::Remove {
                name: "Ana Maria".to_string()
            }))
        );
    }

    #[test]
    fn leading_token_is_case_insensitive_and_aliases_resolve() {
        assert_eq!(parse_command("!HELP"), Ok(Some(Command::Help)));
        assert_eq!(parse_command("!List"), Ok(Some(Command::List)));
        assert_eq!(parse_command("!listar"), Ok(Some(Command::List)));
        assert_eq!(parse_command("!proximos"), Ok(Some(Command::Upcoming)));
        assert_eq!(parse_command("!upcoming"), Ok(Some(Command::Upcoming)));
        assert_eq!(parse_command("!misterio"), Ok(Some(Command::Reveal)));
    }

    #[test]
    fn unknown_text_is_not_a_command() {
        assert_eq!(parse_command(""), Ok(None));
        assert_eq!(parse_command("hello there"), Ok(None));
        assert_eq!(parse_command("!dance"), Ok(None));
        assert_eq!(parse_command("add Ana 01/01"), Ok(None));
    }

    #[test]
    fn date_token_requires_two_digit_parts() {
        assert_eq!(parse_date_token("09/06"), Some((9, 6)));
        assert_eq!(parse_date_token("00/13"), Some((0, 13)));
        assert_eq!(parse_date_token("9/06"), None);
        assert_eq!(parse_date_token("09/06/2020"), None);
    }
}
