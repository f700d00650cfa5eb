pub mod commands;

// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

pub use commands::{CLAP_STYLING, command_argument_builder};
pub use handlers::{
    build_options, expand_path, handle_build, handle_init, init_tracing, load_internal_domains,
    run_build, run_init,
};
