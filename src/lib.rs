// SPDX-License-Identifier: AGPL-3.0-or-later

//! Commit-Check action
//!
//! Runs `commit-check` inside a GitHub Actions job and reports the verdict
//! to the job summary and, optionally, as a pull request comment.

pub mod checker;
pub mod comment;
pub mod config;
pub mod outcome;
pub mod pipeline;
pub mod summary;
