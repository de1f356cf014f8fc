// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ob-adapters: the agent's external collaborators.
//!
//! Each adapter owns the argv construction for one tool — the
//! deduplicating snapshot store (restic), the container runtime
//! (docker), the archiver (tar + zstd, gzip), recipient encryption
//! (age), and off-site sync (rclone) — and executes it through
//! `ob-proc`. Config-sourced values (container names, users, remotes)
//! are untrusted and only ever appear as single argv elements.

pub mod agekey;
pub mod archive;
pub mod docker;
pub mod rclone;
pub mod restic;

pub use agekey::AgeTool;
pub use archive::Archiver;
pub use docker::{ContainerStatus, Docker};
pub use rclone::Rclone;
pub use restic::{Restic, ResticError, Retention, Snapshot};
