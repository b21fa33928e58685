use canvas_td_system_clock::{SimulationClock, FPS_SAMPLE_FRAMES};

#[test]
fn non_decreasing_timestamps_yield_non_negative_deltas() {
    let mut clock = SimulationClock::new();
    clock.init();

    let timestamps = [0.0, 0.0, 16.6, 33.3, 33.3, 50.0, 1_000.0, 1_016.7];
    for timestamp in timestamps {
        let delta = clock.update(timestamp);
        assert!(delta >= 0.0);
        assert_eq!(delta, clock.delta_time());
        assert_eq!(clock.tick(), clock.delta_time() / 1000.0);
    }
}

#[test]
fn ten_frames_of_sixteen_milliseconds_sample_sixty_two_fps() {
    let mut clock = SimulationClock::new();
    clock.init();

    for frame in 1..=FPS_SAMPLE_FRAMES {
        let _ = clock.update(f64::from(frame) * 16.0);
        clock.count_fps();
        if frame < FPS_SAMPLE_FRAMES {
            assert_eq!(clock.fps(), 0);
        }
    }

    assert_eq!(clock.fps(), 62);
}

#[test]
fn fps_sample_refreshes_every_ten_frames() {
    let mut clock = SimulationClock::new();
    let mut timestamp = 0.0;

    for _ in 0..FPS_SAMPLE_FRAMES {
        timestamp += 16.0;
        let _ = clock.update(timestamp);
        clock.count_fps();
    }
    assert_eq!(clock.fps(), 62);

    for _ in 0..FPS_SAMPLE_FRAMES {
        timestamp += 20.0;
        let _ = clock.update(timestamp);
        clock.count_fps();
    }
    assert_eq!(clock.fps(), 50);
}
