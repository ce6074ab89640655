/*
 * SPDX-FileCopyrightText: 2026 The msbfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use clap::Subcommand;

use super::GlobalArgs;

pub mod bfs;

#[derive(Subcommand, Debug)]
#[command(name = "bench")]
/// Benchmark utilities.
pub enum SubCommands {
    Bfs(bfs::CliArgs),
}

pub fn main(global_args: GlobalArgs, subcommand: SubCommands) -> Result<()> {
    match subcommand {
        SubCommands::Bfs(args) => bfs::main(global_args, args),
    }
}
