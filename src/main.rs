// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::env;
use std::process::ExitCode;

use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use wegrow_dashboard::config::Config;
use wegrow_dashboard::gate::GateState;
use wegrow_dashboard::identity::CallbackLoginFlow;
use wegrow_dashboard::routes::MembersQuery;
use wegrow_dashboard::state::AppState;
use wegrow_dashboard::{logging, Result};

const USAGE: &str = "usage: wegrow-dashboard [status|login|logout|members]";

#[derive(Debug, Clone, Copy)]
enum Command {
    Status,
    Login,
    Logout,
    Members,
}

impl Command {
    fn parse(arg: Option<&str>) -> Option<Self> {
        match arg {
            None | Some("status") => Some(Command::Status),
            Some("login") => Some(Command::Login),
            Some("logout") => Some(Command::Logout),
            Some("members") => Some(Command::Members),
            Some(_) => None,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let Some(command) = Command::parse(env::args().nth(1).as_deref()) else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::from(2);
        }
    };

    if let Err(e) = logging::init(config.log_format) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, ?command, "Command failed");
            eprintln!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Status => {
            let state = AppState::from_config(config)?;
            match state.check_landing().await? {
                Some(principal) => println!("Signed in as {principal}"),
                None => println!("Not signed in"),
            }
        }
        Command::Login => {
            let flow = CallbackLoginFlow::new(config.login_callback_addr)
                .on_authorize(|url| println!("Open this URL to sign in:\n\n  {url}\n"));
            let state = AppState::open(config, flow)?;

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => on_interrupt.cancel(),
                    Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
                }
            });

            let principal = state.sign_in(&cancel).await?;
            println!("Signed in as {principal}");
        }
        Command::Logout => {
            AppState::from_config(config)?.sign_out().await?;
            println!("Signed out");
        }
        Command::Members => {
            let state = AppState::from_config(config)?;
            let mut view = state.protected_view();
            match view.mount().await? {
                GateState::Authenticated(_) => {
                    let members = state.governance().members(&MembersQuery::default()).await?;
                    for (principal, member) in members {
                        println!("{}\t{}\t{}\t{principal}", member.name, member.role, member.github);
                    }
                }
                GateState::NotMember { principal } => {
                    println!("Signed in as {principal}, but not registered as a member");
                }
                GateState::Unauthenticated | GateState::Checking => println!("Not signed in"),
            }
        }
    }
    Ok(())
}
