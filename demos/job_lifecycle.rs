//! Job Lifecycle
//!
//! This example embeds a machine in a host struct to track a job from
//! submission to completion.
//!
//! Key concepts:
//! - Rules registered once, then driven by transition requests
//! - The initial transition only needs a registered state
//! - Rejected transitions leave the machine untouched
//! - An asynchronous observer notified in transition order
//!
//! Run with: cargo run --example job_lifecycle

use statekeeper::{CallbackResult, DispatchMode, MachineBuilder, StateId};
use statekeeper::{Machine, TransitionCallback};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

struct Job {
    id: u32,
    lifecycle: Machine,
}

struct AuditLog;

impl TransitionCallback<StateId> for AuditLog {
    fn on_transition(&self, state: &StateId) -> CallbackResult {
        println!("  [audit] job entered {state}");
        Ok(())
    }
}

fn main() {
    println!("=== Job Lifecycle Example ===\n");

    let lifecycle = MachineBuilder::<StateId>::new()
        .rules("start", ["started"])
        .rules("started", ["finishing", "aborted"])
        .rules("finishing", ["finished"])
        .state("aborted")
        .state("finished")
        .callback(Arc::new(AuditLog), DispatchMode::Asynchronous)
        .initial("start")
        .build()
        .expect("start is registered");

    let job = Job { id: 7, lifecycle };
    println!("Job {} is in {:?}", job.id, job.lifecycle.current_state());

    for target in ["finished", "started", "finishing", "finished", "started"] {
        match job.lifecycle.transition_to(target) {
            Ok(()) => println!("Job {} -> {target}", job.id),
            Err(err) => println!("Job {} rejected {target}: {err}", job.id),
        }
    }

    println!("Terminal: {}", job.lifecycle.is_terminal());

    // Give the notification thread a moment to print.
    thread::sleep(Duration::from_millis(50));

    println!("\n=== Example Complete ===");
}
