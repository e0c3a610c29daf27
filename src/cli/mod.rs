mod command;
mod flows;
mod prompt;
mod runner;
mod util;

pub use command::Command;
pub use flows::{backup_flow, decrypt_flow, purge_flow, resolve_connection, restore_flow};
pub use prompt::{Prompter, ScriptedPrompter, TerminalPrompter};
pub use runner::run;
pub use util::{parse_choice, parse_confirm, parse_selection};
