//! `armada undeploy` — reverse-order module teardown.

use anyhow::Result;
use clap::Args;

use armada_k8s::system_config;

use crate::modules::{self, MODULES, SYSTEM_CONFIG_MODULE};
use crate::Globals;

/// Arguments for `armada undeploy`.
#[derive(Args, Debug)]
pub struct UndeployArgs {
    /// Only undeploy modules matching these substrings.
    #[arg(value_name = "only")]
    pub only: Vec<String>,
}

impl UndeployArgs {
    pub fn run(self, globals: &Globals) -> Result<()> {
        let session = globals.session();
        let system = globals.load_system(&session)?;

        let mut reversed = MODULES.to_vec();
        reversed.reverse();

        modules::run_in_modules(&reversed, |module| {
            if modules::should_skip_module(module, &self.only) {
                return Ok(());
            }

            if module.contains(SYSTEM_CONFIG_MODULE) {
                system_config::delete(&session)?;
            }

            // Uninstall first so the CRDs, and therefore all related custom
            // resources, are deleted while the controllers are still running.
            // The CSI driver ships no CRDs of its own.
            if module != "seafs-csi-driver" {
                modules::run_make_command(&session, &globals.repos, &system, module, "uninstall")?;
            }

            modules::run_make_command(&session, &globals.repos, &system, module, "undeploy")
        })
    }
}
