// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_returns_current_time() {
    let clock = SystemClock;
    let t1 = clock.now_utc();
    let t2 = Utc::now();
    assert!((t2 - t1).num_seconds().abs() < 5);
}

#[test]
fn epoch_secs_matches_now_utc() {
    let clock = FakeClock::new();
    assert_eq!(clock.epoch_secs(), clock.now_utc().timestamp());
}

#[test]
fn fake_clock_starts_at_fixed_instant() {
    let a = FakeClock::new();
    let b = FakeClock::new();
    assert_eq!(a.now_utc(), b.now_utc());
}

#[test]
fn fake_clock_can_be_advanced() {
    let clock = FakeClock::new();
    let t1 = clock.now_utc();
    clock.advance_secs(60);
    assert_eq!((clock.now_utc() - t1).num_seconds(), 60);
}

#[test]
fn fake_clock_is_cloneable_and_shared() {
    let clock1 = FakeClock::new();
    let clock2 = clock1.clone();
    let t1 = clock1.now_utc();
    clock2.advance_secs(30);
    assert_eq!((clock1.now_utc() - t1).num_seconds(), 30);
}

#[test]
fn fake_clock_set() {
    let clock = FakeClock::new();
    let target = Utc.with_ymd_and_hms(2027, 6, 1, 0, 0, 0).unwrap();
    clock.set(target);
    assert_eq!(clock.now_utc(), target);
}
