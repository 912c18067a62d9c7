use super::*;
use crate::foundation::core::{Point, Polyline};
use crate::foundation::signal::Signal;
use crate::hop::model::{Hop, LabelPlacement, Stop};
use crate::render::display::MemoryDisplay;
use crate::render::frames::FixedStepFrames;
use crate::render::layer::{PathGraphic, PathRole};
use crate::GraphicsLayer;

fn stop(seq: i64, x: f64) -> Stop {
    Stop {
        sequence: seq,
        name: format!("S{seq}"),
        position: Point::new(x, 0.0),
        label: LabelPlacement::default(),
    }
}

fn data(hop_count: usize) -> RunData {
    let stops: Vec<_> = (0..=hop_count).map(|i| stop(i as i64 + 1, i as f64 * 10.0)).collect();
    let hops: Rc<[Hop]> = stops
        .windows(2)
        .map(|w| Hop {
            origin: w[0].clone(),
            destination: w[1].clone(),
            display_path: Polyline::straight(w[0].position, w[1].position),
            animation_path: Polyline::straight(w[0].position, w[1].position),
        })
        .collect();
    RunData {
        hops,
        hop_duration: Duration::from_millis(500),
        target_frame_rate: 20.0,
    }
}

fn ready(d: RunData) -> DataReady {
    Box::pin(async move { d })
}

fn settled(memory: &MemoryDisplay) -> DisplaySurface {
    memory
        .surface(Rc::new(FixedStepFrames::per_second(20.0)))
        .settled()
}

#[tokio::test]
async fn run_completes_and_reports_progress() {
    let memory = MemoryDisplay::new();
    let animator = Animator::new();
    let mut handle = animator.start(settled(&memory), ready(data(3)), None);
    let mut progress = handle.take_progress().unwrap();
    assert!(handle.take_progress().is_none());
    assert_eq!(handle.state(), AnimatorState::Idle);

    assert_eq!((&mut handle).await, AnimationOutcome::Completed);
    assert_eq!(handle.state(), AnimatorState::Completed);
    assert_eq!(animator.generation(), 1);

    let mut seen = Vec::new();
    while let Ok(p) = progress.try_recv() {
        seen.push(p.current_hop);
    }
    assert_eq!(seen, vec![1, 2, 3]);
    assert_eq!(memory.stops.add_count(), 8);
}

#[tokio::test]
async fn run_clears_previous_graphics() {
    let memory = MemoryDisplay::new();
    memory.paths.add(PathGraphic {
        role: PathRole::CompletedHops,
        path: Polyline::straight(Point::ZERO, Point::new(1.0, 0.0)),
    });
    let outcome = Animator::new()
        .start(settled(&memory), ready(data(1)), None)
        .await;
    assert_eq!(outcome, AnimationOutcome::Completed);
    let live = memory.paths.graphics();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].path.planar_length(), 10.0);
}

#[tokio::test]
async fn cancel_before_first_tick() {
    let memory = MemoryDisplay::new();
    let handle = Animator::new().start(settled(&memory), ready(data(2)), None);
    handle.cancel();
    assert_eq!(handle.await, AnimationOutcome::Cancelled);
    assert_eq!(memory.paths.add_count(), 0);
    assert_eq!(memory.stops.add_count(), 0);
}

#[tokio::test]
async fn cancel_while_waiting_for_the_display() {
    let memory = MemoryDisplay::new();
    let surface = memory.surface(Rc::new(FixedStepFrames::per_second(20.0)));
    let handle = Animator::new().start(surface, ready(data(2)), None);
    let canceller = handle.canceller();
    let (outcome, ()) = tokio::join!(handle, async move {
        tokio::task::yield_now().await;
        canceller.cancel();
    });
    assert_eq!(outcome, AnimationOutcome::Cancelled);
    assert_eq!(memory.stops.add_count(), 0);
}

#[tokio::test]
async fn waits_for_display_and_data() {
    let memory = MemoryDisplay::new();
    let surface = memory.surface(Rc::new(FixedStepFrames::per_second(20.0)));
    let display_ready = surface.ready.clone();
    let data_ready = Signal::new();
    let gate = data_ready.clone();
    let pending: DataReady = Box::pin(async move {
        gate.wait().await;
        data(1)
    });

    let handle = Animator::new().start(surface, pending, None);
    let (outcome, ()) = tokio::join!(handle, async {
        tokio::task::yield_now().await;
        assert_eq!(memory.stops.add_count(), 0);
        data_ready.fire();
        tokio::task::yield_now().await;
        assert_eq!(memory.stops.add_count(), 0);
        display_ready.fire();
    });
    assert_eq!(outcome, AnimationOutcome::Completed);
    assert_eq!(memory.stops.add_count(), 4);
}

#[tokio::test]
async fn newer_run_supersedes_older() {
    let memory = MemoryDisplay::new();
    let animator = Animator::new();
    let mut first = animator.start(settled(&memory), ready(data(2)), None);
    let mut second = animator.start(settled(&memory), ready(data(2)), None);

    // The first run claims generation 1 and draws; the second claims 2 on its
    // first poll, so the first run's next tick is stale.
    let (a, b) = tokio::join!(&mut first, async {
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        (&mut second).await
    });
    assert_eq!(a, AnimationOutcome::Superseded);
    assert_eq!(b, AnimationOutcome::Completed);
    assert_eq!(first.state(), AnimatorState::Superseded);
    assert_eq!(second.state(), AnimatorState::Completed);
    assert_eq!(animator.generation(), 2);
}

#[tokio::test(start_paused = true)]
async fn delay_postpones_the_start() {
    let memory = MemoryDisplay::new();
    let animator = Animator::new();
    let started = tokio::time::Instant::now();
    let outcome = animator
        .start(settled(&memory), ready(data(1)), Some(Duration::from_millis(500)))
        .await;
    assert_eq!(outcome, AnimationOutcome::Completed);
    assert!(started.elapsed() >= Duration::from_millis(500));
}

#[tokio::test]
async fn zero_hops_complete_immediately() {
    let memory = MemoryDisplay::new();
    let outcome = Animator::new()
        .start(settled(&memory), ready(data(0)), None)
        .await;
    assert_eq!(outcome, AnimationOutcome::Completed);
    assert_eq!(memory.stops.add_count(), 0);
}
