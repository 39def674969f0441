//! Locomotion State Machine
//!
//! This example drives a character through idle, walking and running states
//! with a transition table, the way a game loop would.
//!
//! Key concepts:
//! - States keyed by type, each with its own hooks
//! - Guarded, prioritized transitions including an "any state" edge
//! - Observers notified on every change
//! - Checkpointing the current state as a single byte
//!
//! Run with: RUST_LOG=statecraft=debug cargo run --example locomotion

use statecraft::core::{Context, State};
use statecraft::transitions::TransitionStateMachine;
use statecraft::states;
use tracing_subscriber::EnvFilter;

#[derive(Default)]
struct Character {
    speed: u32,
    distance: u32,
}

struct Idle;
struct Walking;
struct Running;

impl State<Character> for Idle {
    fn enter(&mut self, _cx: &mut Context<'_, Character>) {
        println!("  standing still");
    }

    fn exit(&mut self, _cx: &mut Context<'_, Character>) {}
}

impl State<Character> for Walking {
    fn enter(&mut self, _cx: &mut Context<'_, Character>) {
        println!("  starting to walk");
    }

    fn exit(&mut self, _cx: &mut Context<'_, Character>) {}

    fn update(&mut self, cx: &mut Context<'_, Character>) {
        let character = cx.owner_mut();
        character.distance += character.speed;
    }
}

impl State<Character> for Running {
    fn enter(&mut self, _cx: &mut Context<'_, Character>) {
        println!("  breaking into a run");
    }

    fn exit(&mut self, _cx: &mut Context<'_, Character>) {
        println!("  slowing down");
    }

    fn update(&mut self, cx: &mut Context<'_, Character>) {
        let character = cx.owner_mut();
        character.distance += character.speed * 2;
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Locomotion State Machine ===\n");

    let mut machine = TransitionStateMachine::new(Character::default());
    machine.init(states![Idle, Walking, Running], true);
    machine
        .add_transition::<Idle, Walking>(|c| c.speed > 0)
        .expect("Idle and Walking are registered");
    machine
        .add_transition::<Walking, Running>(|c| c.speed > 5)
        .expect("Walking and Running are registered");
    machine
        .add_any_transition_with_priority::<Idle>(10, |c| c.speed == 0)
        .expect("Idle is registered");

    machine.subscribe(|change, _cx| {
        println!("  -> now {} (id {})", change.state_type, change.state_id);
    });

    for speed in [0, 2, 3, 7, 8, 0] {
        println!("tick with speed {speed}");
        machine.owner_mut().speed = speed;
        machine.tick().expect("machine was initialized");
    }

    let checkpoint = machine.checkpoint();
    println!(
        "\nTravelled {} units, current state byte: {:?}",
        machine.owner().distance,
        machine.current_state_byte()
    );
    println!(
        "Checkpoint: {}",
        checkpoint.to_json().expect("checkpoint serializes")
    );

    println!("\n=== Example Complete ===");
}
