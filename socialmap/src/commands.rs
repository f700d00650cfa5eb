use clap::{arg, command};
use std::path::PathBuf;

use crate::handlers::{DEFAULT_OUTPUT_DIR, DEFAULT_TAGS_DIR};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("socialmap")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("socialmap")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and progress output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("build")
                .about(
                    "Aggregate link data and site metadata into per-domain JSON records. \
                Writes the full, base and internal views.",
                )
                .arg(
                    arg!(<SITES>)
                        .help("Line-delimited JSON site records (optionally .gz)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(<LINKS>)
                        .help("Line-delimited JSON link records (optionally .gz)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!([EXTRA] ...)
                        .required(false)
                        .help("Auxiliary site data, applied in order; later files win")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-o --"output" <DIR>)
                        .required(false)
                        .help("Directory to write the full/, base/ and internal/ views into")
                        .default_value(DEFAULT_OUTPUT_DIR),
                )
                .arg(
                    arg!(-t --"tags" <DIR>)
                        .required(false)
                        .help("Directory of tag domain lists")
                        .default_value(DEFAULT_TAGS_DIR),
                )
                .arg(
                    arg!(--"internal" <FILE>)
                        .required(false)
                        .help(
                            "Newline-delimited domains for the internal view (default: the \
                        domains in SITES)",
                        )
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"max-base-links" <N>)
                        .required(false)
                        .help("Maximum links per record in the base view")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("500"),
                ),
        )
        .subcommand(
            command!("init")
                .about("Creates the tag domain lists on your filesystem")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Location to store the tag domain lists")
                        .default_value(DEFAULT_TAGS_DIR),
                )
                .arg(
                    arg!(-f --"force")
                        .help("Overwrite any existing lists at the specified location.")
                        .required(false),
                ),
        )
}
