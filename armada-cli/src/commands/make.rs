//! `armada make` — run a make target in every module.

use anyhow::Result;
use clap::Args;

use crate::modules::{self, MODULES};
use crate::Globals;

/// Arguments for `armada make`.
#[derive(Args, Debug)]
pub struct MakeArgs {
    /// Make target to run.
    pub command: String,

    /// Only run in modules matching these substrings.
    #[arg(value_name = "only")]
    pub only: Vec<String>,
}

impl MakeArgs {
    pub fn run(self, globals: &Globals) -> Result<()> {
        let session = globals.session();
        let system = globals.load_system(&session)?;

        modules::run_in_modules(&MODULES, |module| {
            if modules::should_skip_module(module, &self.only) {
                return Ok(());
            }

            modules::run_make_command(&session, &globals.repos, &system, module, &self.command)
        })
    }
}
