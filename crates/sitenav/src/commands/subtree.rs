//! `sitenav subtree` command implementation.

use clap::Args;
use sitenav_site::NavigationFilter;

use super::CommonArgs;
use crate::error::CliError;

/// Arguments for the subtree command.
#[derive(Args)]
pub(crate) struct SubtreeArgs {
    /// Sitemap item id (e.g. `t5-k12`); omit for the root level.
    #[arg(long)]
    pub id: Option<String>,

    /// Wrap the result in its ancestor chain.
    #[arg(long)]
    pub ancestors: bool,

    /// Levels of descendants to include.
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub levels: i32,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl SubtreeArgs {
    /// Execute the subtree command.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed id, negative levels, or a failing
    /// source. An unknown id prints an empty list.
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let session = self.common.session(version)?;
        let filter = NavigationFilter {
            include_ancestors: self.ancestors,
            descendant_levels: self.levels,
        };

        let tree = session.provider.navigation_subtree(
            self.id.as_deref(),
            &filter,
            &session.localization,
        )?;
        session.output.json(&tree.to_items())
    }
}
