//! The on/off switch machine, driven in both styles.

use flowstate::runtime::{Machine, Reaction, RunOptions};
use flowstate::state_enum;
use flowstate::time::delay;

state_enum! {
    pub enum Switch {
        Off,
        On,
    }
}

#[derive(Clone, Debug)]
pub enum Event {
    Toggle,
    DelayOn(u64),
    DelayOff(u64),
}

fn switch_machine() -> Machine<Switch, Event, ()> {
    Machine::builder()
        .transition(|state, event, _cx| async move {
            Ok(match event {
                Event::Toggle => match state {
                    Switch::Off => Switch::On,
                    Switch::On => Switch::Off,
                },
                Event::DelayOn(ms) => {
                    delay(ms).await;
                    Switch::On
                }
                Event::DelayOff(ms) => {
                    delay(ms).await;
                    Switch::Off
                }
            })
        })
        .build()
        .expect("switch machine builds")
}

fn logging_reaction() -> Reaction<Switch, Event, ()> {
    Reaction::new()
        .entry(Switch::On, |_| println!("  reaction: entered On"))
        .entry(Switch::Off, |_| println!("  reaction: entered Off"))
        .exit(Switch::Off, |_| println!("  reaction: leaving Off"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let machine = switch_machine();

    println!("functional style:");
    let options = RunOptions::new().reaction(logging_reaction());
    let handle = machine.handle_with(Switch::Off, options);

    let handle = handle.forward(Event::DelayOn(200)).await.unwrap();
    println!("  state is now {:?}", handle.state());
    let handle = handle.forward(Event::DelayOff(100)).await.unwrap();
    println!("  state is now {:?}", handle.state());
    let handle = handle.forward(Event::Toggle).await.unwrap();
    println!("  state is now {:?}", handle.state());

    println!("stateful style:");
    let options = RunOptions::new().reaction(logging_reaction());
    let mut switch = machine.start_with(Switch::Off, options);

    switch.advance(Event::DelayOn(200)).await.unwrap();
    switch.advance(Event::DelayOff(100)).await.unwrap();
    switch.advance(Event::Toggle).await.unwrap();

    println!(
        "  visited: {:?}",
        switch
            .history()
            .path()
            .iter()
            .map(|s| format!("{s:?}"))
            .collect::<Vec<_>>()
    );
}
