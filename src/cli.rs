// Copyright (c) 2025 Soumyadip Sarkar.
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
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn period_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("month").long("month").help("Calendar month, YYYY-MM"))
        .arg(Arg::new("from").long("from").help("First day, YYYY-MM-DD"))
        .arg(Arg::new("to").long("to").help("Last day, YYYY-MM-DD"))
}

fn type_arg(required: bool) -> Arg {
    Arg::new("type")
        .long("type")
        .value_parser(["income", "expense"])
        .required(required)
}

fn transaction_fields(cmd: Command) -> Command {
    cmd.arg(Arg::new("amount").long("amount"))
        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, defaults to today"))
        .arg(Arg::new("category").long("category").help("Category name"))
        .arg(Arg::new("description").long("description"))
        .arg(Arg::new("notes").long("notes"))
        .arg(
            Arg::new("attach")
                .long("attach")
                .help("File to store alongside the transaction"),
        )
}

fn category_style_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("icon").long("icon"))
        .arg(Arg::new("color").long("color").help("#RRGGBB"))
}

pub fn build_cli() -> Command {
    Command::new("pocketbook")
        .about("Track income and expenses by category and review each month")
        .version(clap::crate_version!())
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .help("Owner id; overrides the configured user"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Configuration file (TOML)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count),
        )
        .subcommand(Command::new("init").about("Create the local database"))
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(category_style_args(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(["income", "expense", "both"]),
                        ),
                ))
                .subcommand(Command::new("list").arg(type_arg(false)))
                .subcommand(category_style_args(
                    Command::new("edit")
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(Arg::new("name").long("name"))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(["income", "expense", "both"]),
                        ),
                ))
                .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true)))
                .subcommand(Command::new("defaults").about("Seed the stock categories")),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and browse transactions")
                .subcommand(
                    transaction_fields(Command::new("add").arg(type_arg(true)))
                        .mut_arg("amount", |a| a.required(true)),
                )
                .subcommand(json_flags(period_args(
                    Command::new("list")
                        .arg(type_arg(false))
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                )))
                .subcommand(json_flags(
                    Command::new("show").arg(Arg::new("id").long("id").required(true)),
                ))
                .subcommand(
                    transaction_fields(
                        Command::new("edit")
                            .arg(Arg::new("id").long("id").required(true))
                            .arg(type_arg(false)),
                    )
                    .arg(
                        Arg::new("uncategorize")
                            .long("uncategorize")
                            .action(ArgAction::SetTrue)
                            .conflicts_with("category"),
                    ),
                )
                .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true))),
        )
        .subcommand(
            Command::new("report")
                .about("Aggregates over a period (default: current month)")
                .subcommand(json_flags(period_args(Command::new("summary"))))
                .subcommand(json_flags(period_args(
                    Command::new("categories").arg(
                        Arg::new("top")
                            .long("top")
                            .value_parser(value_parser!(usize)),
                    ),
                )))
                .subcommand(json_flags(period_args(Command::new("largest")))),
        )
        .subcommand(json_flags(
            Command::new("dashboard")
                .about("Month overview")
                .arg(Arg::new("month").long("month").help("YYYY-MM")),
        ))
        .subcommand(
            Command::new("export")
                .about("Write transactions to a file")
                .subcommand(period_args(
                    Command::new("transactions")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv|json"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                )),
        )
        .subcommand(Command::new("doctor").about("Check stored data for problems"))
}
