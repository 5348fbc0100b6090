use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{info, warn};
use vlei_api::{RunnerClient, RunnerSettings};
use vlei_engine::{LayoutRng, derive_graph, export_documents, graph_to_builder, load_configuration_file, load_workflow_file, require_steps, to_documents};
use vlei_registry::{TemplateCatalog, export_template, import_template_str, template_export};
use vlei_types::{BuilderGraph, Configuration, RunEvent, TemplateMetadata, WorkflowDocument};
use vlei_util::ExplorerConfig;

use crate::args::{BuildArgs, Cli, Command, DocumentArgs, ExportArgs, GraphArgs, RunArgs, TemplatesCommand};

/// Exit status when the user interrupts a run.
const INTERRUPTED: u8 = 130;

pub async fn dispatch(cli: Cli) -> Result<ExitCode> {
    let config = ExplorerConfig::load().context("load explorer config")?;
    match cli.command {
        Command::Graph(args) => graph(args, &config),
        Command::Export(args) => export(args),
        Command::Build(args) => build(args),
        Command::Run(args) => run(args, &config).await,
        Command::Templates(command) => templates(command, &config),
    }
}

struct Documents {
    workflow: WorkflowDocument,
    config: Configuration,
    workflow_file: String,
    config_file: String,
}

fn load_documents(args: &DocumentArgs) -> Result<Documents> {
    let workflow = load_workflow_file(&args.workflow).with_context(|| format!("load workflow {}", args.workflow.display()))?;
    let config = load_configuration_file(&args.config).with_context(|| format!("load configuration {}", args.config.display()))?;
    Ok(Documents {
        workflow,
        config,
        workflow_file: file_name(&args.workflow),
        config_file: file_name(&args.config),
    })
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("serialize output")?);
    Ok(())
}

fn graph(args: GraphArgs, config: &ExplorerConfig) -> Result<ExitCode> {
    let documents = load_documents(&args.documents)?;
    if let Err(error) = require_steps(&documents.workflow, &documents.workflow_file) {
        warn!(error = %error, "workflow has no steps; the graph will be empty");
    }

    let mut rng = match args.seed.or(config.layout_seed) {
        Some(seed) => LayoutRng::seeded(seed),
        None => LayoutRng::from_entropy(),
    };
    let graph = derive_graph(&documents.workflow, &documents.config, &mut rng);
    info!(nodes = graph.nodes.len(), edges = graph.edges.len(), "derived graph");

    if args.builder {
        print_json(&graph_to_builder(&graph, &documents.config))?;
    } else {
        print_json(&graph)?;
    }
    Ok(ExitCode::SUCCESS)
}

fn export(args: ExportArgs) -> Result<ExitCode> {
    let documents = load_documents(&args.documents)?;
    let bundle = export_documents(&documents.workflow, &documents.config, &documents.workflow_file, &documents.config_file)?;
    let (workflow_path, config_path) = bundle.write_to(&args.out_dir)?;
    println!("{}\n{}", workflow_path.display(), config_path.display());
    Ok(ExitCode::SUCCESS)
}

fn build(args: BuildArgs) -> Result<ExitCode> {
    let text = fs::read_to_string(&args.graph).with_context(|| format!("read builder graph {}", args.graph.display()))?;
    let graph: BuilderGraph = serde_json::from_str(&text).with_context(|| format!("parse builder graph {}", args.graph.display()))?;

    let (workflow, config) = to_documents(&graph);
    let bundle = export_documents(&workflow, &config, &format!("{}.yaml", args.name), &format!("{}.json", args.name))?;
    let (workflow_path, config_path) = bundle.write_to(&args.out_dir)?;
    println!("{}\n{}", workflow_path.display(), config_path.display());
    Ok(ExitCode::SUCCESS)
}

async fn run(args: RunArgs, config: &ExplorerConfig) -> Result<ExitCode> {
    let documents = load_documents(&args.documents)?;
    let settings = RunnerSettings::resolve(args.runner_url.as_deref(), config)?;
    let client = RunnerClient::new(settings)?;
    let mut handle = client.submit(&documents.workflow, &documents.config).await?;
    let run_id = handle.run_id().to_string();
    info!(%run_id, "streaming run events");

    loop {
        let event = tokio::select! {
            event = handle.next() => event,
            _ = tokio::signal::ctrl_c() => {
                warn!(%run_id, "interrupted; abandoning run");
                return Ok(ExitCode::from(INTERRUPTED));
            }
        };
        let Some(event) = event else {
            return Ok(ExitCode::FAILURE);
        };

        println!("{}", serde_json::to_string(&event).context("serialize run event")?);
        match event {
            RunEvent::Step { .. } => {}
            RunEvent::Completed { .. } => return Ok(ExitCode::SUCCESS),
            RunEvent::Failed { error, .. } => {
                warn!(%error, "runner reported failure");
                return Ok(ExitCode::FAILURE);
            }
            RunEvent::TransportLost { message, .. } => {
                warn!(%message, "lost connection to runner");
                return Ok(ExitCode::FAILURE);
            }
        }
    }
}

fn load_catalog(config: &ExplorerConfig) -> Result<TemplateCatalog> {
    let catalog = TemplateCatalog::embedded().context("load built-in templates")?;
    match config.templates_path() {
        Some(dir) if dir.is_dir() => catalog
            .with_directory(&dir)
            .with_context(|| format!("load templates from {}", dir.display())),
        Some(dir) => {
            warn!(dir = %dir.display(), "configured templates directory does not exist");
            Ok(catalog)
        }
        None => Ok(catalog),
    }
}

fn print_listing<'a>(templates: impl IntoIterator<Item = &'a vlei_types::ExportedTemplate>) {
    for template in templates {
        println!("{}\t{}\t{}", template.id, template.name, template.tags.join(","));
    }
}

fn templates(command: TemplatesCommand, config: &ExplorerConfig) -> Result<ExitCode> {
    match command {
        TemplatesCommand::List { query, tags, json } => {
            let catalog = load_catalog(config)?;
            let selected = catalog.query(&query, &tags);
            if json {
                let metadata: Vec<TemplateMetadata> = selected.into_iter().map(TemplateMetadata::from).collect();
                print_json(&metadata)?;
            } else {
                print_listing(selected);
            }
        }
        TemplatesCommand::Search { query } => print_listing(load_catalog(config)?.search(&query)),
        TemplatesCommand::Tags => {
            for tag in load_catalog(config)?.tags() {
                println!("{tag}");
            }
        }
        TemplatesCommand::Show { id } => print_json(load_catalog(config)?.require(&id)?)?,
        TemplatesCommand::Export { id, out_dir, as_template } => {
            let catalog = load_catalog(config)?;
            let template = catalog.require(&id)?;
            if as_template {
                println!("{}", template_export(template)?.write_to(&out_dir)?.display());
            } else {
                let bundle = export_documents(&template.workflow, &template.config, &format!("{id}.yaml"), &format!("{id}.json"))?;
                let (workflow_path, config_path) = bundle.write_to(&out_dir)?;
                println!("{}\n{}", workflow_path.display(), config_path.display());
            }
        }
        TemplatesCommand::Create { documents, out_dir } => {
            let documents = load_documents(&documents)?;
            let export = export_template(&documents.workflow, &documents.config, &documents.workflow_file, &documents.config_file)?;
            println!("{}", export.write_to(&out_dir)?.display());
        }
        TemplatesCommand::Validate { path } => {
            let text = fs::read_to_string(&path).with_context(|| format!("read template {}", path.display()))?;
            match import_template_str(&text) {
                Ok(template) => println!("{}: valid template '{}'", path.display(), template.id),
                Err(error) => {
                    eprintln!("{}: {error}", path.display());
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
