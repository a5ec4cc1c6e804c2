// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! TaskBridge - keep local reminders and CalDAV tasks in sync

use std::process::ExitCode;

use taskbridge_cli::run;

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}
