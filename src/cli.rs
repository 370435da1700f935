// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

const TYPES: [&str; 2] = ["income", "expense"];
const SORTS: [&str; 3] = ["none", "asc", "desc"];

fn with_json(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    )
}

fn with_base(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("base")
            .long("base")
            .action(ArgAction::SetTrue)
            .help("Normalize amounts into the reference currency using cached rates"),
    )
}

fn id_arg() -> Arg {
    Arg::new("id").required(true).help("Transaction id")
}

fn tx_command() -> Command {
    Command::new("tx")
        .about("Record and browse transactions")
        .subcommand(
            Command::new("add")
                .about("Record a new transaction")
                .arg(Arg::new("description").long("description").short('d').required(true))
                .arg(Arg::new("amount").long("amount").short('a').required(true))
                .arg(
                    Arg::new("type")
                        .long("type")
                        .short('t')
                        .required(true)
                        .value_parser(TYPES),
                )
                .arg(Arg::new("category").long("category").short('c').required(true))
                .arg(Arg::new("currency").long("currency").default_value("USD")),
        )
        .subcommand(with_json(
            Command::new("list")
                .about("List transactions with filters, sorting and paging")
                .arg(
                    Arg::new("type")
                        .long("type")
                        .short('t')
                        .value_parser(["all", "income", "expense"])
                        .default_value("all"),
                )
                .arg(Arg::new("category").long("category").short('c'))
                .arg(
                    Arg::new("search")
                        .long("search")
                        .short('s')
                        .help("Case-insensitive match on description"),
                )
                .arg(
                    Arg::new("sort-date")
                        .long("sort-date")
                        .value_parser(SORTS)
                        .conflicts_with("sort-amount"),
                )
                .arg(Arg::new("sort-amount").long("sort-amount").value_parser(SORTS))
                .arg(
                    Arg::new("page")
                        .long("page")
                        .value_parser(value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    Arg::new("per-page")
                        .long("per-page")
                        .value_parser(value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .conflicts_with_all(["page", "per-page"])
                        .help("Show every matching row"),
                ),
        ))
        .subcommand(with_json(
            Command::new("show").about("Show one transaction").arg(id_arg()),
        ))
        .subcommand(
            Command::new("edit")
                .about("Change fields of an existing transaction")
                .arg(id_arg())
                .arg(Arg::new("description").long("description").short('d'))
                .arg(Arg::new("amount").long("amount").short('a'))
                .arg(Arg::new("type").long("type").short('t').value_parser(TYPES))
                .arg(Arg::new("category").long("category").short('c'))
                .arg(Arg::new("currency").long("currency")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a transaction")
                .arg(id_arg()),
        )
}

pub fn build_cli() -> Command {
    Command::new("fintrack")
        .version(crate_version!())
        .about("Track income and expenses, browse them, and summarize across currencies")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("FINTRACK_DB")
                .value_parser(value_parser!(PathBuf))
                .help("Database file (defaults to the platform data dir)"),
        )
        .arg(
            Arg::new("rates-url")
                .long("rates-url")
                .global(true)
                .env("FINTRACK_RATES_URL")
                .help("Latest-rates endpoint"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(tx_command())
        .subcommand(
            Command::new("category")
                .about("Default and custom categories")
                .subcommand(
                    Command::new("list")
                        .arg(Arg::new("type").long("type").short('t').value_parser(TYPES)),
                )
                .subcommand(
                    Command::new("add")
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .short('t')
                                .required(true)
                                .value_parser(TYPES),
                        )
                        .arg(Arg::new("name").long("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Totals and breakdowns")
                .subcommand(with_json(with_base(Command::new("summary"))))
                .subcommand(with_json(with_base(Command::new("by-category"))))
                .subcommand(with_json(with_base(Command::new("monthly")))),
        )
        .subcommand(
            Command::new("fx")
                .about("Reference currency and exchange rates")
                .subcommand(
                    Command::new("set-base").arg(Arg::new("currency").required(true)),
                )
                .subcommand(Command::new("fetch").about("Fetch and cache the latest rates"))
                .subcommand(with_json(Command::new("rates")))
                .subcommand(
                    Command::new("convert")
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("from").long("from").required(true)),
                ),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(Arg::new("format").long("format").required(true))
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(Command::new("doctor").about("Check stored data for problems"))
}
