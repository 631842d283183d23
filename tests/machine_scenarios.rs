//! End-to-end lifecycle scenarios, including concurrent use.

use statekeeper::{
    CallbackResult, DispatchMode, ErrorCode, Machine, MachineBuilder, StateId, TransitionCallback,
};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

fn lifecycle() -> Machine {
    let machine: Machine = Machine::new();
    machine.register_rules("start", ["started", "never_exist"]);
    machine.register_rules("started", ["finishing", "aborted"]);
    machine.register_state("aborted");
    machine.register_rules("finishing", ["finished"]);
    machine.register_state("finished");
    machine
}

/// Remembers the last two states it was told about.
#[derive(Default)]
struct TestCallback {
    states: Mutex<(Option<StateId>, Option<StateId>)>,
}

impl TestCallback {
    fn previous_and_current(&self) -> (Option<StateId>, Option<StateId>) {
        self.states.lock().unwrap().clone()
    }
}

impl TransitionCallback<StateId> for TestCallback {
    fn on_transition(&self, state: &StateId) -> CallbackResult {
        let mut states = self.states.lock().unwrap();
        states.0 = states.1.take();
        states.1 = Some(state.clone());
        Ok(())
    }
}

/// Forwards every notification into a channel.
struct Forwarder {
    tx: Mutex<Sender<StateId>>,
}

impl Forwarder {
    fn new() -> (Arc<Self>, Receiver<StateId>) {
        let (tx, rx) = mpsc::channel();
        (Arc::new(Self { tx: Mutex::new(tx) }), rx)
    }
}

impl TransitionCallback<StateId> for Forwarder {
    fn on_transition(&self, state: &StateId) -> CallbackResult {
        self.tx.lock().unwrap().send(state.clone())?;
        Ok(())
    }
}

#[test]
fn lifecycle_walkthrough() {
    let machine = lifecycle();
    assert_eq!(machine.current_state(), None);

    machine.transition_to("start").unwrap();
    assert_eq!(machine.current_state().unwrap(), "start");

    let err = machine.transition_to("finished").unwrap_err();
    assert_eq!(err.code(), ErrorCode::TransitionNotPermitted);
    assert_eq!(
        err.to_string(),
        "TransitionNotPermitted (2): transition from state start to finished is not permitted"
    );

    let err = machine.transition_to("never_exist").unwrap_err();
    assert_eq!(err.code(), ErrorCode::StateUndefined);
    assert_eq!(machine.current_state().unwrap(), "start");

    machine.transition_to("started").unwrap();
    assert_eq!(machine.current_state().unwrap(), "started");
    assert!(!machine.is_terminal());
}

#[test]
fn rule_queries_before_and_after_registration() {
    let machine: Machine = Machine::new();

    let err = machine.rules_for("aborted").unwrap_err();
    assert_eq!(err.code(), ErrorCode::MachineNotInitialized);

    machine.register_state("aborted");
    assert!(machine.rules_for("aborted").unwrap().is_empty());

    let err = machine.rules_for("ghost").unwrap_err();
    assert_eq!(err.code(), ErrorCode::StateUndefined);
    assert_eq!(
        err.to_string(),
        "StateUndefined (3): state ghost has not been registered"
    );
}

#[test]
fn rule_query_lists_all_destinations() {
    let machine = lifecycle();

    let rules = machine.rules_for("started").unwrap();
    assert_eq!(rules.len(), 2);
    assert!(rules.contains(&StateId::from("finishing")));
    assert!(rules.contains(&StateId::from("aborted")));
}

#[test]
fn synchronous_then_asynchronous_callbacks() {
    let machine = lifecycle();
    machine.transition_to("start").unwrap();
    machine.transition_to("started").unwrap();

    let tc = Arc::new(TestCallback::default());
    machine.set_callback(tc.clone(), true);

    machine.transition_to("finishing").unwrap();
    assert_eq!(machine.current_state().unwrap(), "finishing");
    assert_eq!(
        tc.previous_and_current(),
        (None, Some(StateId::from("finishing")))
    );

    let (forwarder, rx) = Forwarder::new();
    machine.set_callback(forwarder, DispatchMode::Asynchronous);

    machine.transition_to("finished").unwrap();
    assert_eq!(machine.current_state().unwrap(), "finished");
    assert_eq!(
        rx.recv_timeout(Duration::from_secs(5)).unwrap(),
        StateId::from("finished")
    );
    assert!(machine.is_terminal());
}

#[test]
fn asynchronous_callback_runs_after_transition_returns() {
    let machine = Arc::new(lifecycle());
    machine.transition_to("start").unwrap();

    let gate = Arc::new(Barrier::new(2));
    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);
    let worker_gate = Arc::clone(&gate);
    machine.set_callback(
        Arc::new(move |state: &StateId| -> CallbackResult {
            worker_gate.wait();
            tx.lock().unwrap().send(state.clone())?;
            Ok(())
        }),
        false,
    );

    // The callback is parked on the barrier, so the transition must already
    // have returned and released the lock.
    machine.transition_to("started").unwrap();
    assert_eq!(machine.current_state().unwrap(), "started");
    assert!(rx.try_recv().is_err());

    gate.wait();
    assert_eq!(
        rx.recv_timeout(Duration::from_secs(5)).unwrap(),
        StateId::from("started")
    );
}

#[test]
fn asynchronous_callback_may_reenter_machine() {
    let machine = Arc::new(lifecycle());
    machine.transition_to("start").unwrap();

    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);
    let observed = Arc::downgrade(&machine);
    machine.set_callback(
        Arc::new(move |_: &StateId| -> CallbackResult {
            let current = observed.upgrade().and_then(|m| m.current_state());
            tx.lock().unwrap().send(current)?;
            Ok(())
        }),
        DispatchMode::Asynchronous,
    );

    machine.transition_to("started").unwrap();
    let seen = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(seen, Some(StateId::from("started")));
}

#[test]
fn concurrent_readers_and_writers_stay_consistent() {
    let machine = Arc::new(
        MachineBuilder::<StateId>::new()
            .rules("idle", ["busy"])
            .rules("busy", ["idle"])
            .initial("idle")
            .build()
            .unwrap(),
    );

    let writers: Vec<_> = (0..4)
        .map(|_| {
            let machine = Arc::clone(&machine);
            thread::spawn(move || {
                let mut applied = 0usize;
                for _ in 0..200 {
                    for target in ["busy", "idle"] {
                        match machine.transition_to(target) {
                            Ok(()) => applied += 1,
                            Err(err) => {
                                assert_eq!(err.code(), ErrorCode::TransitionNotPermitted)
                            }
                        }
                    }
                }
                applied
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let machine = Arc::clone(&machine);
            thread::spawn(move || {
                for _ in 0..500 {
                    let state = machine.current_state().unwrap();
                    assert!(state == "idle" || state == "busy");
                    assert_eq!(machine.rules_for(state).unwrap().len(), 1);
                }
            })
        })
        .collect();

    let applied: usize = writers.into_iter().map(|h| h.join().unwrap()).sum();
    for reader in readers {
        reader.join().unwrap();
    }

    // Moves alternate strictly, so the parity of applied moves fixes the state.
    let expected = if applied % 2 == 0 { "idle" } else { "busy" };
    assert_eq!(machine.current_state().unwrap(), expected);
}

#[test]
fn notifications_keep_transition_order_across_threads() {
    let machine = Arc::new(
        MachineBuilder::<StateId>::new()
            .rules("idle", ["busy"])
            .rules("busy", ["idle"])
            .initial("idle")
            .build()
            .unwrap(),
    );
    let (forwarder, rx) = Forwarder::new();
    machine.set_callback(forwarder, DispatchMode::Asynchronous);

    let workers: Vec<_> = (0..3)
        .map(|_| {
            let machine = Arc::clone(&machine);
            thread::spawn(move || {
                let mut applied = 0usize;
                for _ in 0..100 {
                    for target in ["busy", "idle"] {
                        if machine.transition_to(target).is_ok() {
                            applied += 1;
                        }
                    }
                }
                applied
            })
        })
        .collect();
    let applied: usize = workers.into_iter().map(|h| h.join().unwrap()).sum();

    let delivered: Vec<_> = (0..applied)
        .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
        .collect();

    // Applied transitions alternate, so in-order delivery alternates too.
    for (i, state) in delivered.iter().enumerate() {
        let expected = if i % 2 == 0 { "busy" } else { "idle" };
        assert_eq!(state, &expected);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn machine_is_shared_between_tokio_tasks() {
    let machine = Arc::new(lifecycle());
    machine.transition_to("start").unwrap();

    let (forwarder, rx) = Forwarder::new();
    machine.set_callback(forwarder, DispatchMode::Asynchronous);

    let driver = {
        let machine = Arc::clone(&machine);
        tokio::spawn(async move {
            for target in ["started", "finishing", "finished"] {
                machine.transition_to(target)?;
                tokio::task::yield_now().await;
            }
            Ok::<_, statekeeper::Error>(())
        })
    };
    driver.await.unwrap().unwrap();

    let delivered = tokio::task::spawn_blocking(move || {
        (0..3)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect::<Vec<_>>()
    })
    .await
    .unwrap();

    let expected: Vec<StateId> = ["started", "finishing", "finished"]
        .into_iter()
        .map(StateId::from)
        .collect();
    assert_eq!(delivered, expected);
    assert!(machine.is_terminal());
}

#[test]
fn version_is_exposed() {
    assert_eq!(statekeeper::VERSION, env!("CARGO_PKG_VERSION"));
}
