use std::{
    num::NonZeroU32,
    sync::{Arc, Mutex},
};

use pipeflow_system_flow_timer::{FlowTimer, TimerFire, TimerState};
use proptest::prelude::*;

fn period(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).expect("non-zero period")
}

#[test]
fn delay_two_period_three_flows_on_expected_ticks() {
    let mut timer = FlowTimer::new(2, period(3));
    let flows = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&flows);
    timer.on_flow(move |ticks| recorder.lock().expect("lock").push(*ticks));
    assert!(timer.start());

    for _ in 0..12 {
        let _ = timer.tick();
    }

    assert_eq!(*flows.lock().expect("lock"), vec![2, 5, 8, 11]);
}

#[test]
fn tick_handlers_run_before_flow_handlers() {
    let mut timer = FlowTimer::new(1, period(1));
    let order = Arc::new(Mutex::new(Vec::new()));
    let ticks = Arc::clone(&order);
    timer.on_tick(move |t| ticks.lock().expect("lock").push(format!("tick {t}")));
    let flows = Arc::clone(&order);
    timer.on_flow(move |t| flows.lock().expect("lock").push(format!("flow {t}")));
    assert!(timer.start());

    assert_eq!(
        timer.tick(),
        Some(TimerFire {
            ticks_elapsed: 1,
            flow: true
        })
    );
    assert_eq!(*order.lock().expect("lock"), vec!["tick 1", "flow 1"]);
}

#[test]
fn paused_timer_keeps_its_count_and_fires_nothing() {
    let mut timer = FlowTimer::new(1, period(1));
    let fired = Arc::new(Mutex::new(0_u32));
    let counter = Arc::clone(&fired);
    timer.on_tick(move |_| *counter.lock().expect("lock") += 1);

    assert!(timer.start());
    let _ = timer.tick();
    assert!(timer.pause());
    assert_eq!(timer.tick(), None);
    assert_eq!(timer.tick(), None);
    assert_eq!(timer.ticks_elapsed(), 1);
    assert_eq!(*fired.lock().expect("lock"), 1);

    assert!(timer.resume());
    assert_eq!(timer.tick().map(|fire| fire.ticks_elapsed), Some(2));
    assert_eq!(timer.state(), TimerState::Running);
}

proptest! {
    #[test]
    fn flow_never_fires_before_the_delay(
        delay in 0_u32..20,
        every in 1_u32..10,
        ticks in 1_u32..60,
    ) {
        let mut timer = FlowTimer::new(delay, period(every));
        prop_assert!(timer.start());

        for _ in 0..ticks {
            let fire = timer.tick().expect("running timer fires");
            let t = fire.ticks_elapsed;
            let expected = t >= delay && (t - delay) % every == 0;
            prop_assert_eq!(fire.flow, expected, "tick {}", t);
        }
    }
}
