// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed-confirmation gate specs: exact literal match, nothing else.

use ob_core::{RestoreMode, RestoreReq};

const RUN_ID: &str = "20260115120000-0a1b2c3d";

fn req(mode: RestoreMode, confirmation: Option<&str>) -> RestoreReq {
    RestoreReq {
        run_id: RUN_ID.into(),
        mode,
        apps: None,
        typed_confirmation: confirmation.map(str::to_string),
        allow_same_server: false,
    }
}

#[test]
fn the_exact_literal_unlocks_every_destructive_mode() {
    let confirmation = format!("RESTORE {RUN_ID}");
    for mode in [
        RestoreMode::RestoreDb,
        RestoreMode::RestoreFiles,
        RestoreMode::RestoreCaddy,
        RestoreMode::Full,
    ] {
        assert!(req(mode, Some(&confirmation)).confirmation_ok(), "{mode:?}");
    }
}

#[test]
fn near_misses_are_all_rejected() {
    let near_misses = [
        format!("restore {RUN_ID}"),  // lowercase verb
        format!("RESTORE {RUN_ID} "), // trailing space
        format!("RESTORE  {RUN_ID}"), // doubled space
        format!(" RESTORE {RUN_ID}"), // leading space
        format!("RESTORE {}", &RUN_ID[..RUN_ID.len() - 1]),
        String::new(),
    ];
    for text in &near_misses {
        assert!(
            !req(RestoreMode::Full, Some(text)).confirmation_ok(),
            "accepted {text:?}"
        );
    }
    assert!(!req(RestoreMode::Full, None).confirmation_ok());
}

#[test]
fn read_only_modes_need_no_confirmation() {
    assert!(req(RestoreMode::ValidateOnly, None).confirmation_ok());
    assert!(req(RestoreMode::ExportBundle, None).confirmation_ok());
}

#[test]
fn serde_rejects_modes_outside_the_closed_set() {
    let body = serde_json::json!({
        "run_id": RUN_ID,
        "mode": "drop-everything",
    });
    assert!(serde_json::from_value::<RestoreReq>(body).is_err());
}
