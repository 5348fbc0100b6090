use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "vlei", version, about = "Explore, build and run vLEI credential workflows")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Derive the visualization graph and print it as JSON
    Graph(GraphArgs),
    /// Re-serialize a workflow and configuration into a directory
    Export(ExportArgs),
    /// Turn a builder graph (JSON) into workflow and configuration files
    Build(BuildArgs),
    /// Submit a workflow to the runner and stream its events as JSON lines
    Run(RunArgs),
    /// Browse and create workflow templates
    #[command(subcommand)]
    Templates(TemplatesCommand),
}

#[derive(Debug, Args)]
pub struct DocumentArgs {
    /// Workflow file (YAML or JSON)
    #[arg(short, long)]
    pub workflow: PathBuf,
    /// Configuration file (JSON)
    #[arg(short, long)]
    pub config: PathBuf,
}

#[derive(Debug, Args)]
pub struct GraphArgs {
    #[command(flatten)]
    pub documents: DocumentArgs,
    /// Seed for layout jitter; defaults to the configured seed, then entropy
    #[arg(long)]
    pub seed: Option<u64>,
    /// Print the editable builder form instead of the derived graph
    #[arg(long)]
    pub builder: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub documents: DocumentArgs,
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Builder graph JSON (`{ nodes, edges }`)
    #[arg(short, long)]
    pub graph: PathBuf,
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,
    /// Base name of the written files
    #[arg(long, default_value = "builder")]
    pub name: String,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub documents: DocumentArgs,
    /// Runner base URL; overrides VLEI_RUNNER_URL and the config file
    #[arg(long)]
    pub runner_url: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum TemplatesCommand {
    /// List templates, optionally narrowed by query and tags
    List {
        #[arg(short, long, default_value = "")]
        query: String,
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Case-insensitive search over names, descriptions and tags
    Search { query: String },
    /// Print every distinct tag
    Tags,
    /// Print a template as JSON
    Show { id: String },
    /// Write a template's documents (or the template itself) to a directory
    Export {
        id: String,
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
        /// Write the template JSON instead of workflow and configuration files
        #[arg(long)]
        as_template: bool,
    },
    /// Package a workflow and configuration as a new template file
    Create {
        #[command(flatten)]
        documents: DocumentArgs,
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Check a template file and report every problem found
    Validate { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repeated_tag_filters() {
        let cli = Cli::try_parse_from(["vlei", "templates", "list", "-t", "qvi", "--tag", "multisig", "--json"]).expect("parse");
        let Command::Templates(TemplatesCommand::List { query, tags, json }) = cli.command else {
            panic!("expected templates list");
        };
        assert!(query.is_empty());
        assert_eq!(tags, vec!["qvi", "multisig"]);
        assert!(json);
    }

    #[test]
    fn graph_accepts_seed_and_documents() {
        let cli = Cli::try_parse_from(["vlei", "graph", "-w", "flow.yaml", "-c", "config.json", "--seed", "7"]).expect("parse");
        let Command::Graph(args) = cli.command else {
            panic!("expected graph");
        };
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.documents.workflow, PathBuf::from("flow.yaml"));
        assert!(!args.builder);
    }
}
