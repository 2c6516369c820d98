use super::*;

#[test]
fn test_fixed_clock() {
    assert_eq!(FixedClock(42).now_millis(), 42);
}

#[test]
fn test_system_clock_is_after_2020() {
    // 2020-01-01T00:00:00Z
    assert!(SystemClock.now_millis() > 1_577_836_800_000);
}

#[test]
fn test_clock_as_trait_object() {
    let clock: Box<dyn Clock> = Box::new(FixedClock(-1));
    assert_eq!(clock.now_millis(), -1);
}
