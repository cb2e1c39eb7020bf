// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn email_arg() -> Arg {
    Arg::new("email").long("email").required(true)
}

fn period_arg() -> Arg {
    Arg::new("period")
        .long("period")
        .default_value("month")
        .value_parser(["week", "month", "year"])
}

pub fn build_cli() -> Command {
    Command::new("expensedesk")
        .about("Expense tracking client: dashboard, transactions, imports and settings")
        .version(clap::crate_version!())
        .arg(
            Arg::new("auth-url")
                .long("auth-url")
                .global(true)
                .help("Auth service base URL (overrides EXPENSEDESK_AUTH_URL)"),
        )
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .global(true)
                .help("Expense service base URL (overrides EXPENSEDESK_API_URL)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity"),
        )
        .subcommand(
            Command::new("auth")
                .about("Log in, register and recover accounts")
                .subcommand(
                    Command::new("login")
                        .arg(email_arg())
                        .arg(Arg::new("password").long("password").required(true)),
                )
                .subcommand(
                    Command::new("register")
                        .arg(Arg::new("first-name").long("first-name").required(true))
                        .arg(Arg::new("last-name").long("last-name").required(true))
                        .arg(email_arg())
                        .arg(Arg::new("password").long("password").required(true))
                        .arg(
                            Arg::new("confirm-password")
                                .long("confirm-password")
                                .required(true),
                        ),
                )
                .subcommand(Command::new("logout"))
                .subcommand(Command::new("whoami"))
                .subcommand(
                    Command::new("verify")
                        .about("Confirm an email address with the emailed token")
                        .arg(Arg::new("token").long("token").required(true)),
                )
                .subcommand(Command::new("resend").arg(email_arg()))
                .subcommand(Command::new("forgot").arg(email_arg()))
                .subcommand(
                    Command::new("reset")
                        .arg(Arg::new("token").long("token").required(true))
                        .arg(Arg::new("password").long("password").required(true))
                        .arg(
                            Arg::new("confirm-password")
                                .long("confirm-password")
                                .required(true),
                        ),
                ),
        )
        .subcommand(
            Command::new("dashboard")
                .about("Summary, trends and breakdowns for the current month")
                .subcommand(json_flags(Command::new("show").arg(period_arg())))
                .subcommand(
                    Command::new("watch")
                        .about("Refresh the dashboard until interrupted")
                        .arg(period_arg())
                        .arg(
                            Arg::new("interval")
                                .long("interval")
                                .value_parser(value_parser!(u64).range(1..))
                                .default_value("60")
                                .help("Seconds between refreshes"),
                        )
                        .arg(
                            Arg::new("count")
                                .long("count")
                                .value_parser(value_parser!(u32))
                                .help("Stop after this many refreshes"),
                        ),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Transactions")
                .subcommand(
                    Command::new("add")
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .default_value("expense")
                                .value_parser(["income", "expense", "INCOME", "EXPENSE"]),
                        )
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .required(true)
                                .help("Category id or name"),
                        )
                        .arg(Arg::new("description").long("description").required(true))
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, defaults to today"))
                        .arg(
                            Arg::new("currency")
                                .long("currency")
                                .help("Currency of the amount, defaults to the preferred one"),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(
                        Arg::new("size")
                            .long("size")
                            .value_parser(value_parser!(u32).range(1..))
                            .default_value("10"),
                    ),
                )),
        )
        .subcommand(
            Command::new("category").about("Categories").subcommand(json_flags(
                Command::new("list").arg(
                    Arg::new("type")
                        .long("type")
                        .value_parser(["income", "expense", "INCOME", "EXPENSE"]),
                ),
            )),
        )
        .subcommand(
            Command::new("import")
                .about("Upload an .xlsx/.xls file of transactions")
                .arg(Arg::new("file").long("file").required(true))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Download reports and templates, or save transactions locally")
                .subcommand(
                    Command::new("report")
                        .arg(Arg::new("month").long("month").help("YYYY-MM, defaults to this month"))
                        .arg(Arg::new("out").long("out")),
                )
                .subcommand(Command::new("template").arg(Arg::new("out").long("out")))
                .subcommand(
                    Command::new("transactions")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .value_parser(["csv", "json"])
                                .default_value("csv"),
                        )
                        .arg(Arg::new("out").long("out").required(true))
                        .arg(
                            Arg::new("size")
                                .long("size")
                                .value_parser(value_parser!(u32).range(1..))
                                .default_value("100"),
                        ),
                ),
        )
        .subcommand(
            Command::new("fx")
                .about("Exchange rates and display currency")
                .subcommand(json_flags(
                    Command::new("rates").arg(Arg::new("base").long("base").default_value("USD")),
                ))
                .subcommand(
                    Command::new("convert")
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true)),
                )
                .subcommand(json_flags(Command::new("currencies"))),
        )
        .subcommand(
            Command::new("settings")
                .about("Profile, password and preferences")
                .subcommand(json_flags(Command::new("show")))
                .subcommand(
                    Command::new("profile")
                        .arg(Arg::new("first-name").long("first-name").required(true))
                        .arg(Arg::new("last-name").long("last-name").required(true)),
                )
                .subcommand(
                    Command::new("password")
                        .arg(Arg::new("current").long("current").required(true))
                        .arg(Arg::new("new").long("new").required(true))
                        .arg(Arg::new("confirm").long("confirm").required(true)),
                )
                .subcommand(
                    Command::new("prefs")
                        .arg(Arg::new("currency").long("currency"))
                        .arg(
                            Arg::new("theme")
                                .long("theme")
                                .value_parser(["light", "dark"]),
                        )
                        .arg(Arg::new("language").long("language"))
                        .arg(
                            Arg::new("email-notifications")
                                .long("email-notifications")
                                .value_parser(value_parser!(bool)),
                        )
                        .arg(
                            Arg::new("push-notifications")
                                .long("push-notifications")
                                .value_parser(value_parser!(bool)),
                        )
                        .arg(
                            Arg::new("monthly-reports")
                                .long("monthly-reports")
                                .value_parser(value_parser!(bool)),
                        )
                        .arg(
                            Arg::new("budget-alerts")
                                .long("budget-alerts")
                                .value_parser(value_parser!(bool)),
                        )
                        .arg(
                            Arg::new("sound")
                                .long("sound")
                                .value_parser(value_parser!(bool)),
                        ),
                )
                .subcommand(
                    Command::new("budget")
                        .about("Set the monthly budget in the display currency")
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("currency").long("currency")),
                ),
        )
        .subcommand(
            Command::new("session")
                .about("Local session state")
                .subcommand(Command::new("status"))
                .subcommand(
                    Command::new("reset")
                        .about("Clear the session and all local preferences, then log in again"),
                ),
        )
}
