//! User-facing reply texts.

use crate::format::{display_name, join_names, record_line, upcoming_line};
use crate::model::birthday::{BirthdayRecord, UpcomingEntry};

pub const HELP: &str = "🤖 Hi, I keep the birthdays of this group's members! 🤖

How to use me:

✏️ *!add [Name] [DD/MM]*
Adds a birthday to my memory (e.g. !add Henrique Jambu 09/06)

❌ *!remove [Name]*
Removes a birthday from my memory.

📋 *!list*
Lists every birthday I know.

3️⃣ *!upcoming*
Shows the next 3 birthdays.

‼️ *!help*
Shows this help message :)";

pub const GROUPS_ONLY: &str = "🙈 I only keep birthdays inside groups. Send !help to see what I can do.";
pub const ADD_USAGE: &str = "❌ Formatting error! Use: !add Name DD/MM";
pub const REMOVE_USAGE: &str = "❌ Formatting error! Use: !remove Name";
pub const REMOVE_EXPECTS_NAME: &str =
    "Use: !remove Name (it has to be the person's full name, ok? 👍🏽)";
pub const INVALID_DATE: &str = "Nice try... 🤔 I only accept days and months that exist!";
pub const LIST_EMPTY: &str = "I don't know any birthdays yet :(";
pub const LIST_HEADER: &str = "🦜 Birthdays I know: 🦜";
pub const UPCOMING_EMPTY: &str = "Oh no! No birthdays in sight in this group...";
pub const UPCOMING_HEADER: &str = "🎉 Upcoming birthdays: 🎈";
pub const RETRY_LATER: &str = "⚠️ Something went wrong on my side. Please try again later.";
pub const REVEAL: &str = "🤫";

pub fn added(name: &str) -> String {
    format!("Now I know {}'s birthday! ✨", display_name(name))
}

pub fn already_known(name: &str) -> String {
    format!("Aaah, I already knew {}'s birthday", display_name(name))
}

pub fn removed(name: &str) -> String {
    format!("I forgot when {} was born... 🪦", display_name(name))
}

pub fn never_known(name: &str) -> String {
    format!("I didn't even know {} had been born! 👁️👄👁️", display_name(name))
}

pub fn list(records: &[BirthdayRecord]) -> String {
    if records.is_empty() {
        return LIST_EMPTY.to_string();
    }
    let mut lines = vec![LIST_HEADER.to_string()];
    lines.extend(records.iter().map(record_line));
    lines.join("\n")
}

pub fn upcoming(entries: &[UpcomingEntry]) -> String {
    if entries.is_empty() {
        return UPCOMING_EMPTY.to_string();
    }
    let mut lines = vec![UPCOMING_HEADER.to_string()];
    lines.extend(entries.iter().map(upcoming_line));
    lines.join("\n")
}

/// Scheduler announcement naming everyone celebrating in one group.
pub fn announcement(records: &[BirthdayRecord]) -> String {
    let names: Vec<String> = records.iter().map(|r| display_name(&r.name)).collect();
    format!(
        "🚨 ATTENTION EVERYONE 🚨\nToday is the birthday of {}! May your day be amazing and full of joy!! 🥳🎂",
        join_names(&names)
    )
}
