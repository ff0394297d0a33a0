//! `sitenav top|context|breadcrumb` command implementation.

use clap::Args;

use super::CommonArgs;
use crate::error::CliError;

/// Which link list to print.
#[derive(Clone, Copy, Debug)]
pub(crate) enum LinkQuery {
    Top,
    Context,
    Breadcrumb,
}

/// Arguments for the link commands.
#[derive(Args)]
pub(crate) struct LinksArgs {
    /// Request path (e.g. `/products/widget.html`).
    #[arg(default_value = "/")]
    pub path: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl LinksArgs {
    /// Execute a link command.
    ///
    /// Link queries never fail on source errors; an unavailable model prints
    /// an empty list.
    pub(crate) fn execute(self, query: LinkQuery, version: &str) -> Result<(), CliError> {
        let session = self.common.session(version)?;
        let (provider, localization) = (&session.provider, &session.localization);

        let links = match query {
            LinkQuery::Top => provider.top_navigation_links(&self.path, localization),
            LinkQuery::Context => provider.context_navigation_links(&self.path, localization),
            LinkQuery::Breadcrumb => provider.breadcrumb_navigation_links(&self.path, localization),
        };
        session.output.json(&links)
    }
}
