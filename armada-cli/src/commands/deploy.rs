//! `armada deploy` — ordered module deploy to the current context.

use anyhow::Result;
use clap::Args;

use armada_k8s::system_config;

use crate::modules::{self, MODULES, SYSTEM_CONFIG_MODULE};
use crate::Globals;

/// Arguments for `armada deploy`.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Only deploy modules matching these substrings.
    #[arg(value_name = "only")]
    pub only: Vec<String>,
}

impl DeployArgs {
    pub fn run(self, globals: &Globals) -> Result<()> {
        let session = globals.session();
        let system = globals.load_system(&session)?;

        modules::run_in_modules(&MODULES, |module| {
            if modules::should_skip_module(module, &self.only) {
                return Ok(());
            }

            modules::deploy_module(&session, &globals.repos, &system, module)?;

            if module.contains(SYSTEM_CONFIG_MODULE) {
                println!("Creating SystemConfiguration...");
                system_config::apply(&session, &system)?;
            }

            Ok(())
        })
    }
}
