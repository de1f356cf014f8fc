// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ob-core: domain types for the ops backup daemon.

pub mod apps;
pub mod clock;
pub mod id;
pub mod job;
pub mod manifest;
pub mod paths;
pub mod request;
pub mod scope;

pub use apps::{AppConfig, AppsError, AppsFile};
pub use clock::{Clock, FakeClock, SystemClock};
pub use id::JobId;
pub use job::{Action, JobRecord, JobStatus, UnknownAction};
pub use manifest::{Artifact, ArtifactKind, Manifest, ManifestError, ResticInfo, Validation};
pub use paths::OpsPaths;
pub use request::{
    BackupReq, CloudTestReq, ExportReq, Payload, RestoreMode, RestoreReq, UploadReq, ValidateReq,
};
pub use scope::{Scope, ScopeSet};
