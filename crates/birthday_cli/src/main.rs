//! Line-oriented host for the birthday bot.
//!
//! # Responsibility
//! - Wire configuration, logging, storage, dispatcher and scheduler together.
//! - Stand in for a chat transport: inbound messages are JSON lines on stdin,
//!   outbound messages are JSON lines on stdout.
//!
//! # Invariants
//! - A malformed input line is logged and skipped; it never stops the host.
//! - The scheduler runs on its own thread with its own connection.

use birthday_core::db::{close_db, open_db};
use birthday_core::{
    init_logging, BirthdayRepository, BirthdayService, BotConfig, Chat, Clock, DailyScheduler,
    Dispatcher, SendError, SqliteBirthdayRepository, SystemClock, Transport,
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One inbound chat message.
#[derive(Debug, Deserialize)]
struct InboundMessage {
    chat_id: String,
    #[serde(default)]
    is_group: bool,
    text: String,
}

/// One outbound chat message.
#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Writes outbound messages to any line sink, one JSON document per line.
struct JsonLinesTransport<W: Write + Send> {
    sink: Mutex<W>,
}

impl<W: Write + Send> JsonLinesTransport<W> {
    fn new(sink: W) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }
}

impl<W: Write + Send> Transport for JsonLinesTransport<W> {
    fn send_text(&self, chat_id: &str, text: &str) -> Result<(), SendError> {
        let line = serde_json::to_string(&OutboundMessage { chat_id, text })
            .map_err(|err| SendError::new(chat_id, err.to_string()))?;
        let mut sink = self
            .sink
            .lock()
            .map_err(|_| SendError::new(chat_id, "output lock poisoned"))?;
        writeln!(sink, "{line}")
            .and_then(|()| sink.flush())
            .map_err(|err| SendError::new(chat_id, err.to_string()))
    }
}

fn parse_inbound(line: &[u8]) -> Result<InboundMessage, serde_json::Error> {
    serde_json::from_slice(line)
}

/// Feeds every input line to `dispatcher` until end of input.
///
/// Lines that are not a valid message (bad JSON, bad UTF-8) are logged and
/// skipped. Only a read failure on `input` ends the loop early.
fn serve<B, R, C, T>(
    mut input: B,
    dispatcher: &Dispatcher<R, C>,
    transport: &T,
) -> std::io::Result<()>
where
    B: BufRead,
    R: BirthdayRepository,
    C: Clock,
    T: Transport + ?Sized,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = buf.trim_ascii();
        if line.is_empty() {
            continue;
        }
        match parse_inbound(line) {
            Ok(message) => {
                let chat = Chat {
                    id: message.chat_id,
                    is_group: message.is_group,
                };
                dispatcher.on_command(transport, &chat, &message.text);
            }
            Err(err) => warn!(
                "event=inbound_parse module=cli status=error error={}",
                err
            ),
        }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=bot_exit module=cli status=error error={}", err);
            eprintln!("birthday_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = BotConfig::from_env()?;
    init_logging(&config.log_level, &config.log_dir)?;
    info!(
        "event=bot_config module=cli status=ok db_path={} timezone={} announce_at={}",
        config.db_path.display(),
        config.timezone.name(),
        config.announce_at
    );

    let transport = Arc::new(JsonLinesTransport::new(std::io::stdout()));
    let clock = SystemClock::new(config.timezone);
    let shutdown = Arc::new(AtomicBool::new(false));

    let conn = open_db(&config.db_path)?;
    let scheduler_thread = spawn_scheduler(&config, Arc::clone(&transport), Arc::clone(&shutdown));

    let service = BirthdayService::new(SqliteBirthdayRepository::try_new(&conn)?);
    let dispatcher =
        Dispatcher::new(service, clock).with_upcoming_limit(config.upcoming_limit);

    serve(std::io::stdin().lock(), &dispatcher, transport.as_ref())?;

    info!("event=bot_stop module=cli status=start reason=stdin_closed");
    shutdown.store(true, Ordering::Relaxed);
    drop(dispatcher);
    close_db(conn)?;
    if scheduler_thread.join().is_err() {
        error!("event=scheduler_join module=cli status=error reason=panicked");
    }
    info!("event=bot_stop module=cli status=ok");
    Ok(())
}

fn spawn_scheduler<T>(
    config: &BotConfig,
    transport: Arc<T>,
    shutdown: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()>
where
    T: Transport + Send + Sync + 'static,
{
    let db_path: PathBuf = config.db_path.clone();
    let scheduler = DailyScheduler::new(config.timezone, config.announce_at);
    let clock = SystemClock::new(config.timezone);

    std::thread::spawn(move || {
        let conn = match open_db(&db_path) {
            Ok(conn) => conn,
            Err(err) => {
                error!(
                    "event=scheduler_start module=cli status=error error={}",
                    err
                );
                return;
            }
        };
        let repo = match SqliteBirthdayRepository::try_new(&conn) {
            Ok(repo) => repo,
            Err(err) => {
                error!(
                    "event=scheduler_start module=cli status=error error={}",
                    err
                );
                return;
            }
        };
        let service = BirthdayService::new(repo);
        scheduler.run_forever(&service, transport.as_ref(), &clock, &shutdown);
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_inbound, serve, JsonLinesTransport};
    use birthday_core::db::open_db_in_memory;
    use birthday_core::{BirthdayService, Dispatcher, FixedClock, SqliteBirthdayRepository, Transport};
    use chrono::NaiveDate;
    use chrono_tz::America::Belem;
    use serde_json::Value;
    use std::io::Cursor;

    fn output_lines(transport: JsonLinesTransport<Vec<u8>>) -> Vec<Value> {
        let output = String::from_utf8(transport.sink.into_inner().unwrap()).unwrap();
        output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn inbound_defaults_to_private_chat() {
        let message = parse_inbound(br#"{"chat_id":"c1","text":"!help"}"#).unwrap();
        assert_eq!(message.chat_id, "c1");
        assert!(!message.is_group);
        assert_eq!(message.text, "!help");
    }

    #[test]
    fn inbound_rejects_missing_text() {
        assert!(parse_inbound(br#"{"chat_id":"c1"}"#).is_err());
    }

    #[test]
    fn transport_writes_one_json_line_per_message() {
        let transport = JsonLinesTransport::new(Vec::new());
        transport.send_text("g1", "line one\nline two").unwrap();
        transport.send_text("g2", "🎂").unwrap();

        let lines = output_lines(transport);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["chat_id"], "g1");
        assert_eq!(lines[0]["text"], "line one\nline two");
        assert_eq!(lines[1]["chat_id"], "g2");
    }

    #[test]
    fn invalid_utf8_line_is_skipped_and_later_lines_are_served() {
        let conn = open_db_in_memory().unwrap();
        let service = BirthdayService::new(SqliteBirthdayRepository::try_new(&conn).unwrap());
        let today = NaiveDate::from_ymd_opt(2026, 6, 9).unwrap();
        let dispatcher = Dispatcher::new(service, FixedClock::at_noon(Belem, today));
        let transport = JsonLinesTransport::new(Vec::new());

        let mut input = Vec::new();
        input.extend_from_slice(b"{\"chat_id\":\"g\",\"is_group\":true,\"text\":\"!add Ana 01/01\"}\n");
        input.extend_from_slice(b"{\"chat_id\":\"g\",\"is_group\":true,\"text\":\"caf\xe9\"}\n");
        input.extend_from_slice(b"not json\n\n");
        input.extend_from_slice(b"{\"chat_id\":\"g\",\"is_group\":true,\"text\":\"!list\"}");

        serve(Cursor::new(input), &dispatcher, &transport).unwrap();

        let lines = output_lines(transport);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["chat_id"], "g");
        assert!(lines[1]["text"].as_str().unwrap().contains("Ana"));
    }
}
