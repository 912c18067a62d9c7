use super::*;

#[tokio::test]
async fn fixed_step_frames_advance_a_virtual_clock() {
    let frames = FixedStepFrames::new(Duration::from_millis(10));
    assert_eq!(frames.next_frame().await, Duration::ZERO);
    assert_eq!(frames.next_frame().await, Duration::from_millis(10));
    assert_eq!(frames.next_frame().await, Duration::from_millis(20));
    assert_eq!(frames.now(), Duration::from_millis(20));
}

#[tokio::test]
async fn cycling_periods_repeat() {
    let frames = FixedStepFrames::cycling(vec![Duration::from_millis(10), Duration::from_millis(30)]);
    let mut stamps = Vec::new();
    for _ in 0..5 {
        stamps.push(frames.next_frame().await.as_millis());
    }
    assert_eq!(stamps, vec![0, 10, 40, 50, 80]);
}

#[tokio::test(start_paused = true)]
async fn interval_frames_follow_the_timer() {
    let frames = IntervalFrames::new(Duration::from_millis(20));
    let first = frames.next_frame().await;
    let second = frames.next_frame().await;
    let third = frames.next_frame().await;
    assert_eq!(first, Duration::ZERO);
    assert_eq!(second, Duration::from_millis(20));
    assert_eq!(third, Duration::from_millis(40));
}

#[tokio::test(start_paused = true)]
async fn interval_frames_skip_missed_frames() {
    let frames = IntervalFrames::new(Duration::from_millis(20));
    frames.next_frame().await;
    tokio::time::sleep(Duration::from_millis(95)).await;
    // Behind schedule: the next frame is delivered immediately.
    let late = frames.next_frame().await;
    assert_eq!(late, Duration::from_millis(95));
    let next = frames.next_frame().await;
    assert_eq!(next, Duration::from_millis(115));
}

#[test]
fn per_second_periods() {
    assert_eq!(IntervalFrames::per_second(4.0).period(), Duration::from_millis(250));
    assert_eq!(
        IntervalFrames::per_second(0.0).period(),
        Duration::from_micros(16_667)
    );
}
