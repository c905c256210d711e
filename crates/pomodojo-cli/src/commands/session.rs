use std::time::Duration;

use clap::Subcommand;
use pomodojo_core::storage::Database;
use pomodojo_core::timer::{format_duration_ms, TimerType};
use pomodojo_core::{now_ms, Config, Event, EventListener, QuoteBook, SessionController};
use serde_json::json;

use super::print_json;

type Controller<'a> = SessionController<&'a Database, &'a Database>;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a session, or pick up the saved one
    Start {
        /// Discard the saved session and start over
        #[arg(long)]
        force: bool,
        /// Use this quote instead of a random one
        #[arg(long)]
        quote: Option<String>,
    },
    /// Print the current session state as JSON
    Status,
    /// Pause the running segment
    Pause,
    /// Resume the paused segment
    Resume,
    /// Pause when running, resume when paused
    Toggle,
    /// End the session now and record it in history
    Finish,
    /// Discard the session without recording history
    Cancel,
    /// Keep the session ticking until it ends or Ctrl-C is pressed
    Watch {
        /// Seconds between ticks
        #[arg(long, default_value = "1")]
        interval: u64,
    },
}

/// Prints segment and session completions to stderr.
struct StderrNotifier;

impl EventListener for StderrNotifier {
    fn on_event(&self, event: &Event) {
        match event {
            Event::SegmentCompleted {
                timer_type: TimerType::Focus,
                cycle_number,
                ..
            } => eprintln!("focus {cycle_number} done, take a break"),
            Event::SegmentCompleted { timer_type, .. } => {
                eprintln!("{} over, back to focus", timer_type.label().to_lowercase())
            }
            Event::SessionCompleted { summary, .. } => eprintln!(
                "session complete: {} min focus, {} min break",
                summary.total_focus_minutes, summary.total_break_minutes
            ),
            _ => {}
        }
    }
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut controller = SessionController::new(&db, &db);
    controller.add_listener(StderrNotifier);

    let now = now_ms();
    let mut events = controller.restore(now);

    match action {
        SessionAction::Start { force, quote } => {
            let config = Config::load()?;
            let book = QuoteBook::builtin();
            let quote = match quote {
                Some(id) => book.by_id(&id),
                None => book.random(&mut rand::thread_rng()),
            };
            if force || !controller.has_session() {
                events.extend(controller.start_new(now, &config.preferences, quote)?);
            }
        }
        SessionAction::Status => {}
        SessionAction::Pause => events.extend(controller.pause(now)),
        SessionAction::Resume => events.extend(controller.resume(now)),
        SessionAction::Toggle => events.extend(controller.toggle_pause(now)),
        SessionAction::Finish => events.extend(controller.finish(now)),
        SessionAction::Cancel => events.extend(controller.cancel(now)),
        SessionAction::Watch { interval } => return watch(&mut controller, interval),
    }

    print_json(&json!({
        "events": events,
        "state": controller.snapshot(now),
        "notification": controller.notification_summary(now),
    }))
}

fn watch(controller: &mut Controller<'_>, interval_secs: u64) -> Result<(), Box<dyn std::error::Error>> {
    if !controller.has_session() {
        return Err("no active session".into());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let now = now_ms();
                    controller.tick(now);
                    let Some(n) = controller.notification_summary(now) else {
                        break;
                    };
                    let paused = if n.is_paused { " (paused)" } else { "" };
                    println!("{} {}{paused}", n.title, n.timer_text);
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::debug!("watch interrupted");
                    break;
                }
            }
        }
    });

    if let Some(session) = controller.session() {
        let left: u64 = session
            .segments
            .iter()
            .map(|s| s.remaining_ms(now_ms()))
            .sum();
        eprintln!("stopped watching, {} left in session", format_duration_ms(left));
    }
    Ok(())
}
