//! A pomodoro cycle composed from a timer machine.
//!
//! The children table here is built from a factory so the three hooks
//! can share one "next job" slot: entering Stopped clears the slot,
//! which is how a still-sleeping timer gets neutered without any
//! cancellation primitive.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use flowstate::runtime::{Children, Machine, Reaction, RunOptions};
use flowstate::state_enum;
use flowstate::time::delay;

state_enum! {
    pub enum TimerState {
        Started,
        Ended,
    }
    final: [Ended]
}

#[derive(Clone, Debug)]
pub enum TimerEvent {
    WentOff,
}

/// One-shot timer: sleeps out its context (milliseconds), then ends.
fn timer_machine() -> Machine<TimerState, TimerEvent, u64> {
    Machine::builder()
        .transition_sync(|state, event, _cx| {
            Ok(match (state, event) {
                (TimerState::Started, TimerEvent::WentOff) => TimerState::Ended,
                (state, _) => state,
            })
        })
        .children(Children::new().on(TimerState::Started, |cap| async move {
            delay(cap.context().unwrap_or(0)).await;
            let _ = cap.forward(TimerEvent::WentOff).await;
        }))
        .initial_context(0)
        .build()
        .expect("timer machine builds")
}

/// Start a detached timer and invoke `done` when it goes off.
fn run_timer(ms: u64, done: Arc<dyn Fn() + Send + Sync>) {
    let reaction = Reaction::new().entry(TimerState::Ended, move |_| done());
    timer_machine().handle_with(
        TimerState::Started,
        RunOptions::new().reaction(reaction).context(ms),
    );
}

state_enum! {
    pub enum Pomodoro {
        Stopped,
        Started,
        OnBreak,
    }
}

#[derive(Clone, Debug)]
pub enum PomodoroEvent {
    Start,
    HaveBreak,
    Stop,
}

#[derive(Clone, Debug)]
struct Info {
    label: &'static str,
    delay_ms: u64,
}

type PomodoroContext = HashMap<Pomodoro, Info>;

fn default_context() -> PomodoroContext {
    HashMap::from([
        (
            Pomodoro::Started,
            Info {
                label: "Running",
                delay_ms: 3000,
            },
        ),
        (
            Pomodoro::OnBreak,
            Info {
                label: "On a break",
                delay_ms: 1000,
            },
        ),
        (
            Pomodoro::Stopped,
            Info {
                label: "Stopped",
                delay_ms: 0,
            },
        ),
    ])
}

type JobSlot = Arc<Mutex<Option<PomodoroEvent>>>;

fn phase_hook(
    slot: &JobSlot,
    next_event: PomodoroEvent,
) -> impl Fn(
    flowstate::runtime::Capability<Pomodoro, PomodoroEvent, PomodoroContext>,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
       + Send
       + Sync
       + 'static {
    let slot = Arc::clone(slot);
    move |cap| {
        let slot = Arc::clone(&slot);
        let next_event = next_event.clone();
        Box::pin(async move {
            let state = cap.state();
            let ms = cap
                .context()
                .and_then(|c| c.get(&state).map(|info| info.delay_ms))
                .unwrap_or(0);

            *slot.lock().unwrap() = Some(next_event);

            let parent = cap.clone();
            let armed = Arc::clone(&slot);
            run_timer(
                ms,
                Arc::new(move || {
                    // A cleared slot means Stopped won the race.
                    if let Some(event) = armed.lock().unwrap().clone() {
                        let parent = parent.clone();
                        tokio::spawn(async move {
                            let _ = parent.forward(event).await;
                        });
                    }
                }),
            );
        })
    }
}

fn pomodoro_machine() -> Machine<Pomodoro, PomodoroEvent, PomodoroContext> {
    Machine::builder()
        .transition_sync(|_state, event, _cx| {
            Ok(match event {
                PomodoroEvent::Start => Pomodoro::Started,
                PomodoroEvent::HaveBreak => Pomodoro::OnBreak,
                PomodoroEvent::Stop => Pomodoro::Stopped,
            })
        })
        .children_with(|_cap| {
            let slot: JobSlot = Arc::new(Mutex::new(None));
            let clear = Arc::clone(&slot);

            Children::new()
                .on(Pomodoro::Stopped, move |_cap| {
                    let clear = Arc::clone(&clear);
                    async move {
                        *clear.lock().unwrap() = None;
                    }
                })
                .on(
                    Pomodoro::Started,
                    phase_hook(&slot, PomodoroEvent::HaveBreak),
                )
                .on(Pomodoro::OnBreak, phase_hook(&slot, PomodoroEvent::Start))
        })
        .initial_context(default_context())
        .build()
        .expect("pomodoro machine builds")
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let reaction = Reaction::new().any_entry(|cap| {
        let state = cap.state();
        let label = cap
            .context()
            .and_then(|c: PomodoroContext| c.get(&state).map(|info| info.label))
            .unwrap_or("?");
        println!("pomodoro: {label}");
    });

    let mut pomodoro = pomodoro_machine().start_with(
        Pomodoro::Stopped,
        RunOptions::new().reaction(reaction),
    );

    pomodoro.advance(PomodoroEvent::Start).await.unwrap();

    // Two work/break rounds drive themselves through the timers.
    delay(9000).await;

    pomodoro.advance(PomodoroEvent::Stop).await.unwrap();
}
