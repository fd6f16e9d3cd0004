// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

fn budget_name() -> Arg {
    Arg::new("name")
        .long("name")
        .required(true)
        .help("Budget record name")
}

pub fn build_cli() -> Command {
    Command::new("tripbudget")
        .version(crate_version!())
        .about("Cost and revenue planning for group trips")
        .subcommand(Command::new("init").about("Create the database if it does not exist"))
        .subcommand(
            Command::new("config").about("Settings").subcommand(
                Command::new("locale")
                    .about("Show or set the numeric locale (pt-BR, en-US)")
                    .arg(Arg::new("set").long("set")),
            ),
        )
        .subcommand(
            Command::new("trip")
                .about("Trips that budgets can be linked to")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("departure").long("departure"))
                        .arg(Arg::new("return").long("return")),
                )
                .subcommand(Command::new("list").arg(json_flag()))
                .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true))),
        )
        .subcommand(
            Command::new("passenger")
                .about("Passenger records feeding the real results")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("trip").long("trip").required(true))
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("promo").long("promo").help("Promotional discount"))
                        .arg(Arg::new("referral").long("referral").help("Referral discount")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(Arg::new("trip").long("trip").required(true))
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("cancel").arg(Arg::new("id").long("id").required(true)),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Trip budget records")
                .subcommand(
                    Command::new("new")
                        .arg(budget_name())
                        .arg(Arg::new("trip").long("trip")),
                )
                .subcommand(Command::new("list").arg(json_flag()))
                .subcommand(
                    Command::new("fields")
                        .about("List field keys")
                        .arg(Arg::new("category").long("category")),
                )
                .subcommand(
                    Command::new("set")
                        .about("Write raw fields and recompute")
                        .arg(budget_name())
                        .arg(
                            Arg::new("field")
                                .long("field")
                                .required(true)
                                .action(ArgAction::Append)
                                .help("KEY=VALUE, repeatable"),
                        ),
                )
                .subcommand(
                    Command::new("link")
                        .about("Link to a trip, or unlink with --clear")
                        .arg(budget_name())
                        .arg(Arg::new("trip").long("trip"))
                        .arg(
                            Arg::new("clear")
                                .long("clear")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("trip"),
                        ),
                )
                .subcommand(
                    Command::new("show")
                        .arg(budget_name())
                        .arg(Arg::new("category").long("category"))
                        .arg(json_flag()),
                )
                .subcommand(Command::new("recompute").arg(budget_name()))
                .subcommand(Command::new("rm").arg(budget_name())),
        )
        .subcommand(Command::new("doctor").about("Check stored budgets for problems"))
}
