pub mod assemble;
pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod site;
pub mod views;

use colored::Colorize;

pub use assemble::SiteAssembler;
pub use config::TagConfig;
pub use error::CoreError;
pub use pipeline::{BuildInput, BuildOptions, BuildSummary, build_views, execute_build};
pub use site::SiteRecord;
pub use views::{MAX_BASE_LINKS, ViewGenerator, Views};

pub fn print_banner() {
    println!(
        "{} {}",
        "socialmap".bright_cyan().bold(),
        env!("CARGO_PKG_VERSION").bright_black()
    );
    println!("{}", "per-domain snapshots of the web social graph".bright_black());
    println!();
}
