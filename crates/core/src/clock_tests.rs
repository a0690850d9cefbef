use super::*;

#[test]
fn system_clock_is_monotonic_nondecreasing() {
    let clock = SystemClock;
    let a = clock.now_ms();
    let b = clock.now_ms();
    assert!(b >= a);
}

#[test]
fn fake_clock_starts_at_given_value() {
    let clock = FakeClock::new(1_000);
    assert_eq!(clock.now_ms(), 1_000);
}

#[test]
fn fake_clock_advance_accumulates() {
    let clock = FakeClock::new(0);
    clock.advance(500);
    clock.advance(250);
    assert_eq!(clock.now_ms(), 750);
}

#[test]
fn fake_clock_set_overrides_value() {
    let clock = FakeClock::new(0);
    clock.advance(1_000);
    clock.set(42);
    assert_eq!(clock.now_ms(), 42);
}
