use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use voicebook::booking::SeatingPreference;
use voicebook::config::SpeechBackend;
use voicebook::driver::{event_channel, SessionServices};
use voicebook::kernel::{DialogueConfig, SlotKey};
use voicebook::speech::{ConsoleListener, ConsoleSpeech, SaySpeech, SpeechInput, SpeechOutput};
use voicebook::{AppConfig, DialogueController, DialogueEvent, SessionDriver};

const HELP: &str = "\
/start              begin a new booking conversation
/listen, /stop      toggle the (console) microphone
/set <field> <val>  edit a field, e.g. /set location Mumbai,IN
/seating <pref>     indoor, outdoor or unspecified
/save, /save!       create the booking (! overrides an unfinished conversation)
/bookings           list stored bookings
/cancel <id>        cancel a booking
/status             show the current form
/quit
anything else is an answer to the current question";

enum Command {
    Event(DialogueEvent),
    Bookings,
    Cancel(String),
    Status,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if !line.starts_with('/') {
        return Ok(Command::Event(DialogueEvent::utterance(line)));
    }

    let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let command = match name {
        "/start" => Command::Event(DialogueEvent::Start),
        "/listen" => Command::Event(DialogueEvent::ListenRequested),
        "/stop" => Command::Event(DialogueEvent::StopListening),
        "/set" => {
            let (field, value) = rest.split_once(char::is_whitespace).ok_or("usage: /set <field> <value>")?;
            let slot: SlotKey = field.parse()?;
            Command::Event(DialogueEvent::FieldEdited {
                slot,
                value: value.trim().to_string(),
            })
        }
        "/seating" => {
            let pref = SeatingPreference::parse(rest).ok_or("seating is indoor, outdoor or unspecified")?;
            Command::Event(DialogueEvent::SeatingEdited(pref))
        }
        "/save" => Command::Event(DialogueEvent::Commit { force: false }),
        "/save!" => Command::Event(DialogueEvent::Commit { force: true }),
        "/bookings" => Command::Bookings,
        "/cancel" if !rest.is_empty() => Command::Cancel(rest.to_string()),
        "/status" => Command::Status,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        other => return Err(format!("unknown command {other}, try /help")),
    };
    Ok(command)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    voicebook::init_tracing();
    let config = AppConfig::from_env()?;

    let (tx, rx) = event_channel();
    let speech: Arc<dyn SpeechOutput> = match config.speech_backend {
        SpeechBackend::Console => Arc::new(ConsoleSpeech),
        SpeechBackend::Say => Arc::new(SaySpeech::spawn("say")),
    };
    let listener: Arc<dyn SpeechInput> = Arc::new(ConsoleListener::new(tx.clone()));
    let bookings = voicebook::booking_service(&config).await?;

    let services = SessionServices {
        speech,
        listener: Some(listener),
        bookings: bookings.clone(),
        forecasts: Arc::new(voicebook::forecast_provider(&config)),
    };
    let controller = DialogueController::new(DialogueConfig {
        prompt_delay: config.prompt_delay,
        speech_input_available: true,
        forecast_offset: config.forecast_offset,
    });

    let driver = SessionDriver::new(controller, services, rx, tx.clone());
    let view = driver.subscribe();
    let shutdown = CancellationToken::new();
    let session = tokio::spawn(driver.run(shutdown.clone()));

    println!("{HELP}\n");
    tx.send(DialogueEvent::RefreshBookings).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(Command::Event(event)) => {
                tracing::debug!("console input dispatched");
                tx.send(event).await?;
            }
            Ok(Command::Bookings) => match bookings.list().await {
                Ok(list) if list.is_empty() => println!("no bookings yet"),
                Ok(list) => {
                    for b in list {
                        println!(
                            "{}  {:<9}  {}  {} guests  {} {}  {}  {}",
                            b.booking_id,
                            format!("{:?}", b.status).to_lowercase(),
                            b.customer_name,
                            b.number_of_guests,
                            b.booking_date.format("%Y-%m-%d"),
                            b.booking_time,
                            b.location,
                            b.seating_preference.as_str(),
                        );
                    }
                }
                Err(e) => eprintln!("error: {e}"),
            },
            Ok(Command::Cancel(id)) => match bookings.cancel(&id).await {
                Ok(b) => println!("{} cancelled", b.booking_id),
                Err(e) => eprintln!("error: {e}"),
            },
            Ok(Command::Status) => {
                let snapshot = view.borrow().clone();
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Quit) => break,
            Err(message) => eprintln!("{message}"),
        }
    }

    shutdown.cancel();
    let controller = session.await?;
    let stats = controller.telemetry().snapshot();
    tracing::info!(
        runs = stats.runs_started,
        answers = stats.answers_accepted,
        bookings = stats.booking_stats.created,
        "session ended"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert!(matches!(parse_command("/start"), Ok(Command::Event(DialogueEvent::Start))));
        assert!(matches!(
            parse_command("/save!"),
            Ok(Command::Event(DialogueEvent::Commit { force: true }))
        ));
        match parse_command("/set location  Mumbai, IN") {
            Ok(Command::Event(DialogueEvent::FieldEdited { slot, value })) => {
                assert_eq!(slot, SlotKey::Location);
                assert_eq!(value, "Mumbai, IN");
            }
            _ => panic!("expected a field edit"),
        }
        assert!(matches!(parse_command("two people"), Ok(Command::Event(DialogueEvent::Utterance(_)))));
        assert!(parse_command("/set").is_err());
        assert!(parse_command("/seating balcony").is_err());
        assert!(parse_command("/dance").is_err());
    }
}
