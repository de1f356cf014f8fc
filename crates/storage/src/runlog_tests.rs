// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn append_creates_and_accumulates() {
    let dir = tempfile::tempdir().unwrap();
    let log = RunLog::new(dir.path().join("20260115120000-0a1b2c3d.log"));

    log.append_line("starting backup").unwrap();
    log.append_line("ERROR: gzip self-test failed").unwrap();

    let text = std::fs::read_to_string(log.path()).unwrap();
    assert_eq!(text, "starting backup\nERROR: gzip self-test failed\n");
}

#[test]
fn two_handles_interleave_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.log");
    let a = RunLog::new(&path);
    let b = RunLog::new(&path);

    a.append_line("from a").unwrap();
    b.append_line("from b").unwrap();
    a.append_line("from a again").unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 3);
}
