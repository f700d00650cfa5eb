use socialmap::{command_argument_builder, handle_build, handle_init, init_tracing};
use socialmap_core::print_banner;

fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    init_tracing(quiet);

    match chosen_command.subcommand() {
        Some(("build", primary_command)) => handle_build(primary_command, quiet),
        Some(("init", primary_command)) => handle_init(primary_command),
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
