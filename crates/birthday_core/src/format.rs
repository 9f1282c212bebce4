//! Presentation helpers shared by replies and announcements.

use crate::model::birthday::{BirthdayRecord, UpcomingEntry};

/// Rebuilds a display name by capitalizing the first letter of every word.
///
/// Whitespace runs collapse to one space and empty words are dropped.
pub fn display_name(name: &str) -> String {
    name.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Formats an anniversary as `DD/MM`.
pub fn display_date(day: u32, month: u32) -> String {
    format!("{day:02}/{month:02}")
}

/// Formats one record as `Display Name - DD/MM`.
pub fn record_line(record: &BirthdayRecord) -> String {
    format!(
        "{} - {}",
        display_name(&record.name),
        display_date(record.day, record.month)
    )
}

/// Formats one upcoming entry as `Display Name - DD/MM`.
pub fn upcoming_line(entry: &UpcomingEntry) -> String {
    record_line(&entry.record)
}

/// Joins names as `A`, `A and B`, or `A, B and C`.
pub fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [rest @ .., last] => format!("{} and {last}", rest.join(", ")),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{display_date, display_name, join_names, record_line};
    use crate::model::birthday::BirthdayRecord;

    #[test]
    fn display_name_capitalizes_each_word() {
        assert_eq!(display_name("henrique jambu"), "Henrique Jambu");
        assert_eq!(display_name("  ana   maria "), "Ana Maria");
        assert_eq!(display_name("élodie"), "Élodie");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn display_date_zero_pads() {
        assert_eq!(display_date(9, 6), "09/06");
        assert_eq!(display_date(31, 12), "31/12");
    }

    #[test]
    fn record_line_uses_display_forms() {
        let record = BirthdayRecord::new("Henrique Jambu", 9, 6, "g");
        assert_eq!(record_line(&record), "Henrique Jambu - 09/06");
    }

    #[test]
    fn join_names_reads_naturally() {
        let names = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(join_names(&names(&[])), "");
        assert_eq!(join_names(&names(&["Ana"])), "Ana");
        assert_eq!(join_names(&names(&["Ana", "Bia"])), "Ana and Bia");
        assert_eq!(join_names(&names(&["Ana", "Bia", "Caio"])), "Ana, Bia and Caio");
    }
}
