//! Command dispatcher.
//!
//! # Responsibility
//! - Route parsed commands to the birthday service and render replies.
//! - Convert every expected failure into a reply, never into an error.
//!
//! # Invariants
//! - Private chats may only use `!help`.
//! - A success reply is produced only after the service call returned `Ok`,
//!   which implies the write was persisted.
//! - Storage failures are logged with command and chat context and answered
//!   with a generic retry-later reply.

use crate::clock::Clock;
use crate::command::parser::{parse_command, Command, FormatError};
use crate::command::replies;
use crate::model::birthday::normalize_name;
use crate::repo::birthday_repo::BirthdayRepository;
use crate::service::birthday_service::{BirthdayService, ServiceError, DEFAULT_UPCOMING_LIMIT};
use crate::transport::{Chat, Transport};
use log::{debug, error, info, warn};

/// Single-shot command handler; holds no state between messages.
pub struct Dispatcher<R: BirthdayRepository, C: Clock> {
    service: BirthdayService<R>,
    clock: C,
    upcoming_limit: usize,
}

impl<R: BirthdayRepository, C: Clock> Dispatcher<R, C> {
    pub fn new(service: BirthdayService<R>, clock: C) -> Self {
        Self {
            service,
            clock,
            upcoming_limit: DEFAULT_UPCOMING_LIMIT,
        }
    }

    /// Overrides how many entries `!upcoming` shows.
    pub fn with_upcoming_limit(mut self, limit: usize) -> Self {
        self.upcoming_limit = limit.max(1);
        self
    }

    /// Handles one inbound message and sends the reply, if any, to its chat.
    ///
    /// Send failures are logged and swallowed; they never reach the caller.
    pub fn on_command<T: Transport + ?Sized>(&self, transport: &T, chat: &Chat, text: &str) {
        let Some(reply) = self.handle(chat, text) else {
            return;
        };
        if let Err(err) = transport.send_text(&chat.id, &reply) {
            warn!(
                "event=reply_send module=dispatcher status=error chat_id={} error={}",
                chat.id, err
            );
        }
    }

    /// Handles one inbound message and returns the reply text.
    ///
    /// Returns `None` when the text is not a recognized command.
    pub fn handle(&self, chat: &Chat, text: &str) -> Option<String> {
        let parsed = parse_command(text);
        if matches!(parsed, Ok(None)) {
            return None;
        }

        let is_help = matches!(parsed, Ok(Some(Command::Help)));
        let group_id = match chat.group_id() {
            Some(group_id) => group_id,
            None if is_help => return Some(replies::HELP.to_string()),
            None => {
                debug!(
                    "event=command module=dispatcher status=skip reason=private_chat chat_id={}",
                    chat.id
                );
                return Some(replies::GROUPS_ONLY.to_string());
            }
        };

        let command = match parsed {
            Ok(Some(command)) => command,
            Ok(None) => return None,
            Err(err) => {
                debug!(
                    "event=command module=dispatcher status=rejected group_id={} error={}",
                    group_id, err
                );
                return Some(format_error_reply(err).to_string());
            }
        };

        let command_name = command.name();
        match self.execute(command, group_id) {
            Ok(reply) => Some(reply),
            Err(err) if err.is_expected() => Some(expected_error_reply(&err)),
            Err(err) => {
                error!(
                    "event=command module=dispatcher status=error command={} group_id={} error={}",
                    command_name, group_id, err
                );
                Some(replies::RETRY_LATER.to_string())
            }
        }
    }

    fn execute(&self, command: Command, group_id: &str) -> Result<String, ServiceError> {
        match command {
            Command::Help => Ok(replies::HELP.to_string()),
            Command::Add { name, day, month } => {
                let record = self.service.add(&name, day, month, group_id)?;
                info!(
                    "event=birthday_add module=dispatcher status=ok group_id={}",
                    group_id
                );
                Ok(replies::added(&record.name))
            }
            Command::Remove { name } => {
                self.service.remove(&name, group_id)?;
                info!(
                    "event=birthday_remove module=dispatcher status=ok group_id={}",
                    group_id
                );
                Ok(replies::removed(&normalize_name(&name)))
            }
            Command::List => {
                let records = self.service.list(group_id)?;
                Ok(replies::list(&records))
            }
            Command::Upcoming => {
                let entries =
                    self.service
                        .upcoming(group_id, self.clock.today(), self.upcoming_limit)?;
                Ok(replies::upcoming(&entries))
            }
            Command::Reveal => {
                info!(
                    "event=group_reveal module=dispatcher status=ok group_id={}",
                    group_id
                );
                Ok(replies::REVEAL.to_string())
            }
        }
    }
}

fn format_error_reply(err: FormatError) -> &'static str {
    match err {
        FormatError::AddUsage => replies::ADD_USAGE,
        FormatError::RemoveUsage => replies::REMOVE_USAGE,
        FormatError::RemoveExpectsName => replies::REMOVE_EXPECTS_NAME,
    }
}

fn expected_error_reply(err: &ServiceError) -> String {
    match err {
        ServiceError::InvalidDate { .. } => replies::INVALID_DATE.to_string(),
        ServiceError::InvalidName => replies::ADD_USAGE.to_string(),
        ServiceError::MissingGroup => replies::GROUPS_ONLY.to_string(),
        ServiceError::DuplicateName { name } => replies::already_known(name),
        ServiceError::NotFound { name } => replies::never_known(name),
        ServiceError::Storage(_) => replies::RETRY_LATER.to_string(),
    }
}
