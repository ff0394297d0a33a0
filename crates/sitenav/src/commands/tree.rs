//! `sitenav tree` command implementation.

use clap::Args;

use super::CommonArgs;
use crate::error::CliError;

/// Arguments for the tree command.
#[derive(Args)]
pub(crate) struct TreeArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

impl TreeArgs {
    /// Execute the tree command.
    ///
    /// # Errors
    ///
    /// Returns an error if no builder can produce the navigation model.
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let session = self.common.session(version)?;

        let tree = session.provider.navigation_model(&session.localization)?;
        session.output.info(&format!(
            "Localization {}: {} nodes",
            session.localization.id,
            tree.len()
        ));
        session.output.json(&tree.to_items())
    }
}
