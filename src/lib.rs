/*
 * SPDX-FileCopyrightText: 2026 The msbfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
// for now we don't need any new feature but we might remove this in the future
#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_pub)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]
#![deny(unused_doc_comments)]
#![allow(clippy::type_complexity)]

pub mod traits;
pub mod graphs;
#[macro_use]
pub mod utils;
pub mod frontier;
pub mod bfs;
pub mod sched;
#[cfg(feature = "cli")]
pub mod cli;

/// Prelude module to import everything from this crate
pub mod prelude {
    pub use crate::bfs::*;
    pub use crate::frontier::*;
    pub use crate::graphs::prelude::*;
    pub use crate::sched::*;
    pub use crate::traits::*;
    pub use crate::utils::*;
}
