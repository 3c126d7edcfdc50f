//! Traffic lights composed from a nested delay machine.
//!
//! The light machine never sleeps itself: each state's child hook
//! starts a delay machine and wires its "caught up" reaction back into
//! the parent through the capability closure. The child machine knows
//! nothing about the parent's event type.

use std::collections::HashMap;

use flowstate::runtime::{Capability, Children, Machine, Reaction, RunOptions};
use flowstate::state_enum;
use flowstate::time::delay;

state_enum! {
    pub enum DelayState {
        Delayed,
        CaughtUp,
    }
    final: [CaughtUp]
}

#[derive(Clone, Debug)]
pub enum DelayEvent {
    CatchUp,
}

/// A machine that waits out its context (milliseconds) and then
/// catches up on its own.
fn delay_machine() -> Machine<DelayState, DelayEvent, u64> {
    Machine::builder()
        .transition_sync(|state, event, _cx| {
            Ok(match (state, event) {
                (DelayState::Delayed, DelayEvent::CatchUp) => DelayState::CaughtUp,
                (state, _) => state,
            })
        })
        .children(Children::new().on(DelayState::Delayed, |cap| async move {
            delay(cap.context().unwrap_or(0)).await;
            let _ = cap.forward(DelayEvent::CatchUp).await;
        }))
        .initial_context(1000)
        .build()
        .expect("delay machine builds")
}

state_enum! {
    pub enum Light {
        Green,
        Yellow,
        Red,
    }
}

#[derive(Clone, Debug)]
pub enum LightEvent {
    Next,
}

type LightContext = HashMap<Light, u64>;

/// Each light state spawns a delay child sized from the light's own
/// context; when the child catches up it pushes Next into the parent.
async fn run_delay_child(cap: Capability<Light, LightEvent, LightContext>) {
    let ms = cap
        .context()
        .and_then(|c| c.get(&cap.state()).copied())
        .unwrap_or(0);

    let parent = cap.clone();
    let reaction = Reaction::new().entry(DelayState::CaughtUp, move |_| {
        let parent = parent.clone();
        tokio::spawn(async move {
            let _ = parent.forward(LightEvent::Next).await;
        });
    });

    delay_machine().handle_with(
        DelayState::Delayed,
        RunOptions::new().reaction(reaction).context(ms),
    );
}

fn light_machine() -> Machine<Light, LightEvent, LightContext> {
    Machine::builder()
        .transition_sync(|state, event, _cx| {
            Ok(match event {
                LightEvent::Next => match state {
                    Light::Green => Light::Yellow,
                    Light::Yellow => Light::Red,
                    Light::Red => Light::Green,
                },
            })
        })
        .children(
            Children::new()
                .on(Light::Green, run_delay_child)
                .on(Light::Yellow, run_delay_child)
                .on(Light::Red, run_delay_child),
        )
        .initial_context(HashMap::from([
            (Light::Green, 3000),
            (Light::Yellow, 1000),
            (Light::Red, 2000),
        ]))
        .build()
        .expect("light machine builds")
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let reaction = Reaction::new().any_entry(|cap| println!("light is {:?}", cap.state()));

    let _handle = light_machine().handle_with(Light::Green, RunOptions::new().reaction(reaction));

    // The machine drives itself through its children; watch one full
    // cycle and a bit more.
    delay(8000).await;
}
