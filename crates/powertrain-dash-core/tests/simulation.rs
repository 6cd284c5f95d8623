use powertrain_dash_core::prelude::*;
use powertrain_dash_core::simulation::step::{self, TickDraws};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn running_state() -> (StateHandle, Arc<AtomicUsize>) {
    let state = StateHandle::default();
    state.apply_silent(&StateUpdate::new().running(true));
    let renders = Arc::new(AtomicUsize::new(0));
    let r = renders.clone();
    state.subscribe(move |_: &VehicleState| {
        r.fetch_add(1, Ordering::SeqCst);
    });
    (state, renders)
}

#[test]
fn test_smoothing_step_reaches_tenth_of_target() {
    let state = VehicleState::default();
    let profile = DrivingMode::Sport.profile();

    for u in [0.1, 0.37, 0.5, 0.93] {
        let draws = TickDraws {
            speed: u,
            rpm: u,
            gear_change: 0.9,
            gear_pick: 0.0,
            oil: 0.9,
        };
        let mut next = state.clone();
        next.merge(&step::advance(&state, profile, &draws));

        let target = profile.speed_at(u);
        assert!(
            (next.speed - 0.1 * target).abs() < 1e-9,
            "target {target}, got {}",
            next.speed
        );
    }
}

#[test]
fn test_smoothing_converges_toward_target() {
    let mut state = VehicleState::default();
    let profile = DrivingMode::Highway.profile();
    let draws = TickDraws {
        speed: 0.5,
        rpm: 0.5,
        gear_change: 0.9,
        gear_pick: 0.0,
        oil: 0.9,
    };

    // Seven ticks close a little over half the gap
    for _ in 0..7 {
        let update = step::advance(&state, profile, &draws);
        state.merge(&update);
    }
    let fraction = state.speed / 90.0;
    assert!((0.5..0.55).contains(&fraction), "fraction {fraction}");
}

#[test]
fn test_long_run_respects_profile() {
    let state = StateHandle::default();
    state.apply_silent(&StateUpdate::new().running(true));
    let engine = SimulationEngine::with_seed(state.clone(), 2024);

    for _ in 0..2000 {
        engine.simulate_tick(DrivingMode::City);
    }

    let snapshot = state.snapshot();
    assert!(snapshot.speed >= 0.0 && snapshot.speed <= 60.0);
    assert!(snapshot.rpm >= 0.0 && snapshot.rpm <= 3000.0);
    assert!(snapshot.odometer > 12345.0);
    assert!(snapshot.fuel_level < 75.0);
    assert_eq!(snapshot.fuel_consumption, 7.2);
    assert_eq!(snapshot.warnings.battery, snapshot.fuel_level < 10.0);
    assert_eq!(snapshot.warnings.engine, snapshot.engine_temp > 105.0);
}

#[tokio::test(start_paused = true)]
async fn test_double_start_leaves_single_schedule() {
    let (state, renders) = running_state();
    let mut engine = SimulationEngine::with_seed(state, 5);

    engine.start(DrivingMode::City);
    engine.start(DrivingMode::City);
    tokio::time::sleep(Duration::from_millis(550)).await;

    // One schedule ticks five times in 550ms; two would tick ten
    assert_eq!(renders.load(Ordering::SeqCst), 5);

    engine.stop();
    let after_stop = renders.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(renders.load(Ordering::SeqCst), after_stop);
}

#[tokio::test(start_paused = true)]
async fn test_restart_resets_tick_phase() {
    let (state, renders) = running_state();
    let mut engine = SimulationEngine::with_seed(state, 5);

    engine.start(DrivingMode::City);
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(renders.load(Ordering::SeqCst), 1);

    // Restarting at 150ms pushes the next tick to 250ms instead of 200ms
    engine.start(DrivingMode::Sport);
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(renders.load(Ordering::SeqCst), 1);
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(renders.load(Ordering::SeqCst), 2);
    assert_eq!(engine.mode(), DrivingMode::Sport);
}

#[tokio::test(start_paused = true)]
async fn test_ticks_do_nothing_once_engine_flag_clears() {
    let (state, renders) = running_state();
    let mut engine = SimulationEngine::with_seed(state.clone(), 5);

    engine.start(DrivingMode::Idle);
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(renders.load(Ordering::SeqCst), 2);

    state.apply_silent(&StateUpdate::new().running(false));
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(renders.load(Ordering::SeqCst), 2);
    engine.stop();
}

#[tokio::test(start_paused = true)]
async fn test_stalled_schedule_does_not_catch_up() {
    let (state, renders) = running_state();
    let mut engine = SimulationEngine::with_seed(state, 5);
    engine.start(DrivingMode::City);

    // The clock jumps 450ms without the tick task being polled, as if a
    // sink had blocked the runtime for four and a half periods
    tokio::time::advance(Duration::from_millis(450)).await;
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(renders.load(Ordering::SeqCst), 1);

    // The next tick waits a full period after the late one
    tokio::time::sleep(Duration::from_millis(90)).await;
    assert_eq!(renders.load(Ordering::SeqCst), 1);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(renders.load(Ordering::SeqCst), 2);
    engine.stop();
}

#[tokio::test(start_paused = true)]
async fn test_custom_tick_interval() {
    let (state, renders) = running_state();
    let mut engine =
        SimulationEngine::with_seed(state, 5).with_tick_interval(Duration::from_millis(40));
    assert_eq!(engine.tick_interval(), Duration::from_millis(40));

    engine.start(DrivingMode::Highway);
    tokio::time::sleep(Duration::from_millis(210)).await;
    assert_eq!(renders.load(Ordering::SeqCst), 5);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_engine_cancels_schedule() {
    let (state, renders) = running_state();
    {
        let mut engine = SimulationEngine::with_seed(state, 5);
        engine.start(DrivingMode::City);
        tokio::time::sleep(Duration::from_millis(120)).await;
    }
    let before = renders.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(renders.load(Ordering::SeqCst), before);
}
