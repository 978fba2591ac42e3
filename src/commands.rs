//! CLI command definitions
//!
//! Defines the clap commands for the scenario runner CLI.

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run scenarios against the dashboard
    Run {
        /// Scenario files, or built-in names such as builtin:workspace-details
        #[arg(required = true)]
        scenarios: Vec<String>,

        /// Only run the named case (repeatable)
        #[arg(long = "case", short = 'c')]
        cases: Vec<String>,

        /// Number of scenarios run in parallel, each with its own browser
        #[arg(long, short = 'j', default_value_t = 1)]
        jobs: usize,

        /// Run against the in-memory dashboard instead of a browser
        #[arg(long)]
        simulate: bool,

        /// Print the reports as JSON instead of progress lines
        #[arg(long)]
        json: bool,
    },

    /// List scenarios and their cases
    List {
        /// Scenario files or built-in names; all built-ins if empty
        scenarios: Vec<String>,
    },

    /// Parse scenarios and check their variables without running them
    Validate {
        #[arg(required = true)]
        scenarios: Vec<String>,
    },

    /// Delete a workspace out-of-band, e.g. a fixture left by an aborted run
    Cleanup {
        /// Workspace name
        workspace: String,

        /// Owner of the workspace (default: configured user)
        #[arg(long)]
        user: Option<String>,
    },
}
