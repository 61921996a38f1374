// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{DB_ENV, USER_ENV};
use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    )
}

fn month_arg(required: bool) -> Arg {
    let arg = Arg::new("month").long("month").value_name("YYYY-MM");
    if required {
        arg.required(true)
    } else {
        arg.help("Defaults to the current month")
    }
}

fn name_arg() -> Arg {
    Arg::new("name").long("name").required(true)
}

fn users() -> Command {
    Command::new("user")
        .about("Manage users")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Add a user and create their default accounts and categories")
                .arg(name_arg())
                .arg(Arg::new("admin").long("admin").action(ArgAction::SetTrue)),
        )
        .subcommand(json_flags(Command::new("list").about("List users")))
        .subcommand(
            Command::new("rm")
                .about("Remove a user and everything they own")
                .arg(name_arg()),
        )
}

fn accounts() -> Command {
    let type_help = "Checking, Savings, Credit Card, Cash, Investment or Loan";
    Command::new("account")
        .about("Manage accounts")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(name_arg())
                .arg(Arg::new("type").long("type").required(true).help(type_help))
                .arg(
                    Arg::new("initial")
                        .long("initial")
                        .default_value("0")
                        .help("Opening balance (debt owed for credit cards)"),
                ),
        )
        .subcommand(json_flags(Command::new("list")))
        .subcommand(
            Command::new("edit")
                .arg(name_arg())
                .arg(Arg::new("rename").long("rename"))
                .arg(Arg::new("type").long("type").help(type_help))
                .arg(Arg::new("initial").long("initial")),
        )
        .subcommand(Command::new("rm").arg(name_arg()))
}

fn categories() -> Command {
    Command::new("category")
        .about("Manage categories")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(name_arg())
                .arg(Arg::new("type").long("type").required(true).help("Income or Expense")),
        )
        .subcommand(json_flags(
            Command::new("list").arg(Arg::new("type").long("type")),
        ))
        .subcommand(
            Command::new("edit")
                .arg(name_arg())
                .arg(Arg::new("rename").long("rename"))
                .arg(Arg::new("type").long("type")),
        )
        .subcommand(Command::new("rm").arg(name_arg()))
}

fn transactions() -> Command {
    Command::new("tx")
        .about("Record and browse transactions")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("date").long("date").required(true).value_name("YYYY-MM-DD"))
                .arg(Arg::new("account").long("account").required(true))
                .arg(Arg::new("category").long("category").required(true))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(
                    Arg::new("type")
                        .long("type")
                        .help("Income or Expense; defaults to the category's type"),
                )
                .arg(Arg::new("description").long("description").default_value("")),
        )
        .subcommand(
            Command::new("edit")
                .arg(
                    Arg::new("id")
                        .long("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                )
                .arg(Arg::new("date").long("date").value_name("YYYY-MM-DD"))
                .arg(Arg::new("account").long("account"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("amount").long("amount"))
                .arg(Arg::new("type").long("type"))
                .arg(Arg::new("description").long("description")),
        )
        .subcommand(
            Command::new("rm").arg(
                Arg::new("id")
                    .long("id")
                    .required(true)
                    .value_parser(value_parser!(i64)),
            ),
        )
        .subcommand(json_flags(
            Command::new("list")
                .arg(Arg::new("month").long("month").value_name("YYYY-MM"))
                .arg(Arg::new("account").long("account"))
                .arg(Arg::new("category").long("category"))
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                ),
        ))
}

fn budgets() -> Command {
    Command::new("budget")
        .about("Monthly spending limits per expense category")
        .subcommand_required(true)
        .subcommand(
            Command::new("set")
                .arg(month_arg(true))
                .arg(Arg::new("category").long("category").required(true))
                .arg(Arg::new("amount").long("amount").required(true)),
        )
        .subcommand(json_flags(Command::new("list").arg(
            Arg::new("month").long("month").value_name("YYYY-MM"),
        )))
        .subcommand(
            Command::new("rm")
                .arg(month_arg(true))
                .arg(Arg::new("category").long("category").required(true)),
        )
}

fn reports() -> Command {
    Command::new("report")
        .about("Summaries of income and spending")
        .subcommand_required(true)
        .subcommand(json_flags(
            Command::new("summary")
                .about("Income, expenses and net for a month")
                .arg(month_arg(false)),
        ))
        .subcommand(json_flags(
            Command::new("breakdown")
                .about("Spending per category for a month")
                .arg(month_arg(false)),
        ))
        .subcommand(json_flags(
            Command::new("monthly")
                .about("Expense totals for the last N months")
                .arg(
                    Arg::new("months")
                        .long("months")
                        .default_value("6")
                        .value_parser(value_parser!(u32).range(1..=120)),
                )
                .arg(month_arg(false)),
        ))
        .subcommand(json_flags(
            Command::new("forecast")
                .about("Expected spending per category from the preceding three months")
                .arg(month_arg(false).help("Month to forecast; defaults to next month")),
        ))
        .subcommand(json_flags(
            Command::new("balances").about("Initial and current balance of every account"),
        ))
}

pub fn build_cli() -> Command {
    Command::new("fintrack")
        .version(crate_version!())
        .about("Personal finance ledger: accounts, transactions, budgets")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env(DB_ENV)
                .value_name("PATH")
                .help("SQLite database file"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .env(USER_ENV)
                .help("Acting user"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(users())
        .subcommand(accounts())
        .subcommand(categories())
        .subcommand(transactions())
        .subcommand(budgets())
        .subcommand(reports())
        .subcommand(
            Command::new("doctor")
                .about("Check stored balances against the transaction history")
                .arg(
                    Arg::new("fix")
                        .long("fix")
                        .action(ArgAction::SetTrue)
                        .help("Rewrite drifted balances"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Display settings")
                .subcommand_required(true)
                .subcommand(Command::new("get").arg(Arg::new("key").long("key").required(true)))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").long("key").required(true))
                        .arg(Arg::new("value").long("value").required(true)),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand_required(true)
                .subcommand(
                    Command::new("transactions")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .required(true)
                                .value_parser(["csv", "json"]),
                        )
                        .arg(Arg::new("out").long("out").required(true).value_name("PATH")),
                ),
        )
}
