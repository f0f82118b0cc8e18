/*
 * SPDX-FileCopyrightText: 2026 Inria
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

pub mod checkpoint;
#[cfg(feature = "cli")]
pub mod cli;
pub mod codec;
pub mod config;
pub mod counters;
pub mod driver;
pub mod init;
pub mod inspect;
pub mod log_prob;
pub mod node;
pub mod round;
pub mod sources;
pub mod utils;

#[cfg(feature = "cli")]
pub mod build_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));

    pub fn version_string() -> String {
        format!(
            "{}
git info: {} {} {}
build info: built for {} with {}",
            PKG_VERSION,
            GIT_VERSION.unwrap_or(""),
            GIT_COMMIT_HASH.unwrap_or(""),
            match GIT_DIRTY {
                None => "",
                Some(true) => "(dirty)",
                Some(false) => "(clean)",
            },
            TARGET,
            RUSTC_VERSION
        )
    }
}

/// Prelude module to import everything from this crate
pub mod prelude {
    pub use crate::checkpoint::*;
    pub use crate::codec::*;
    pub use crate::config::*;
    pub use crate::counters::*;
    pub use crate::driver::*;
    pub use crate::init::*;
    pub use crate::inspect::*;
    pub use crate::log_prob::*;
    pub use crate::node::*;
    pub use crate::round::*;
    pub use crate::sources::*;
}
