// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::path::Path;
use std::process::Command as StdCommand;

use anyhow::Context;
use anyhow::bail;
use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "x", about = "Development tasks for bloomset")]
struct Command {
    #[command(subcommand)]
    sub: SubCommand,
}

impl Command {
    fn run(self) -> anyhow::Result<()> {
        match self.sub {
            SubCommand::Lint(cmd) => cmd.run(),
            SubCommand::Test(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum SubCommand {
    #[command(about = "Check formatting and run clippy.")]
    Lint(CommandLint),
    #[command(about = "Run unit, integration and doc tests.")]
    Test(CommandTest),
}

#[derive(Parser)]
struct CommandLint {
    #[arg(long, help = "Automatically apply lint suggestions.")]
    fix: bool,
}

impl CommandLint {
    fn run(self) -> anyhow::Result<()> {
        run_command(rustfmt(self.fix))?;
        run_command(clippy(self.fix))
    }
}

#[derive(Parser)]
struct CommandTest {
    #[arg(long, help = "Run tests serially and do not capture output.")]
    no_capture: bool,
}

impl CommandTest {
    fn run(self) -> anyhow::Result<()> {
        run_command(test(self.no_capture))
    }
}

fn main() -> anyhow::Result<()> {
    Command::parse().run()
}

fn cargo() -> anyhow::Result<StdCommand> {
    let cargo = which::which("cargo").context("cargo not found in PATH")?;
    let mut cmd = StdCommand::new(cargo);
    cmd.current_dir(workspace_root());
    Ok(cmd)
}

fn workspace_root() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap_or_else(|| Path::new("."))
}

fn rustfmt(fix: bool) -> anyhow::Result<StdCommand> {
    let mut cmd = cargo()?;
    cmd.args(["fmt", "--all"]);
    if !fix {
        cmd.arg("--check");
    }
    Ok(cmd)
}

fn clippy(fix: bool) -> anyhow::Result<StdCommand> {
    let mut cmd = cargo()?;
    cmd.args(["clippy", "--workspace", "--all-targets", "--all-features"]);
    if fix {
        cmd.args(["--allow-staged", "--allow-dirty", "--fix"]);
    }
    cmd.args(["--", "-D", "warnings"]);
    Ok(cmd)
}

fn test(no_capture: bool) -> anyhow::Result<StdCommand> {
    let mut cmd = cargo()?;
    cmd.args(["test", "--workspace"]);
    if no_capture {
        cmd.args(["--", "--nocapture", "--test-threads=1"]);
    }
    Ok(cmd)
}

fn run_command(cmd: anyhow::Result<StdCommand>) -> anyhow::Result<()> {
    let mut cmd = cmd?;
    eprintln!("$ {cmd:?}");
    let status = cmd
        .status()
        .with_context(|| format!("failed to spawn {cmd:?}"))?;
    if !status.success() {
        bail!("{cmd:?} failed: {status}");
    }
    Ok(())
}
