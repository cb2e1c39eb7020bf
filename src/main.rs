// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::process::ExitCode;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use expensedesk::api::ApiClient;
use expensedesk::config::Config;
use expensedesk::currency::ExchangeRateApi;
use expensedesk::errors::Error;
use expensedesk::session::SessionStore;
use expensedesk::{cli, commands, db};

fn init_tracing(verbosity: u8) {
    let fallback = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(matches: &clap::ArgMatches) -> Result<()> {
    let config = Config::from_env()?.with_overrides(
        matches.get_one::<String>("auth-url").map(String::as_str),
        matches.get_one::<String>("api-url").map(String::as_str),
    )?;
    let storage = db::open_or_init(config.db_path.as_deref())?;
    let mut session = SessionStore::init(storage)?;

    if let Some(("session", sub)) = matches.subcommand() {
        return commands::session::handle(&mut session, sub);
    }

    let rates = ExchangeRateApi::new(&config)?;
    let mut client = ApiClient::connect(config, session)?;
    match matches.subcommand() {
        Some(("auth", sub)) => commands::auth::handle(&mut client, sub)?,
        Some(("dashboard", sub)) => commands::dashboard::handle(&mut client, rates, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut client, &rates, sub)?,
        Some(("category", sub)) => commands::categories::handle(&mut client, sub)?,
        Some(("import", sub)) => commands::importer::handle(&mut client, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&mut client, sub)?,
        Some(("fx", sub)) => commands::fx::handle(&rates, sub)?,
        Some(("settings", sub)) => commands::settings::handle(&mut client, &rates, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

/// Last-resort error boundary: print, then point at the recovery command.
fn report(err: &anyhow::Error) {
    match err.downcast_ref::<Error>() {
        Some(Error::SessionExpired { redirect }) => {
            eprintln!("Session expired, please log in again ({}).", redirect);
            eprintln!("Run `expensedesk auth login --email <email> --password <password>`.");
        }
        Some(Error::NotAuthenticated) => {
            eprintln!("Not logged in. Run `expensedesk auth login` first.");
        }
        Some(Error::Validation(fields)) => {
            for (field, msg) in fields.iter() {
                eprintln!("{}: {}", field, msg);
            }
        }
        _ => {
            eprintln!("Error: {:#}", err);
            eprintln!(
                "If this keeps happening, run `expensedesk session reset` to clear the session and login again."
            );
        }
    }
}

fn main() -> ExitCode {
    let matches = cli::build_cli().get_matches();
    init_tracing(matches.get_count("verbose"));
    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}
