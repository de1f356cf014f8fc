// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ob-proc: external tool execution.
//!
//! Everything the agent does to the outside world goes through here:
//! single commands with captured output ([`Cmd`]) and explicit
//! producer→consumer chains ([`Pipeline`]) for streaming dumps. No shell
//! is ever involved — argv elements from config are untrusted and are
//! passed through exec verbatim.

pub mod error;
pub mod pipe;
pub mod run;

pub use error::ProcError;
pub use pipe::Pipeline;
pub use run::{Cmd, CmdOutput};
