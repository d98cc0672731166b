//! `viewc` CLI entry point. Loads `authority.json`, then runs a self-check compile
//! over a fixed in-memory template using the host crate's reference collaborators
//! (no production `MarkupParser`/`ExprParser`/`HostTypeChecker` ships in this
//! workspace — those are out of scope per §6 and supplied by an embedder).

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use indexmap::IndexSet;
use serde::Serialize;

use viewc_authority::config::{read_configuration, resolve_root_files, AuthorityConfig};
use viewc_authority::logging::{ConsoleLogger, LogLevel, Logger};
use viewc_authority::pipeline::{bind, link, lower, plan_and_emit, typecheck, EmitOptions, LowerInput};
use viewc_core::envelope::{CommandEnvelope, CommandMeta, Epistemic};
use viewc_core::ir::{DomNode, DomNodeKind};
use viewc_core::semantics::{MaterializedSemantics, ResourceCatalog, Semantics};
use viewc_host::memory::MemoryExprParser;
use viewc_host::MarkupParser;

#[derive(Parser)]
#[command(name = "viewc", version, about = "Aurelia-style template compiler authority CLI")]
struct Cli {
    /// Project root, or a direct path to `authority.json`.
    #[arg(short = 'p', long, value_name = "PATH", default_value = ".")]
    project: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Loads the project configuration and prints it.
    Config,
    /// Runs a self-check compile over a fixed template and prints the resulting
    /// command envelope as JSON.
    Check,
    /// Expands the configured `include`/`exclude` globs and prints the resolved
    /// root file list, one path per line.
    Files,
}

struct EmptyMarkup;

impl MarkupParser for EmptyMarkup {
    fn parse(&self, _text: &str, file: Option<viewc_core::ids::SourceFileId>) -> viewc_host::markup::ParsedMarkup {
        viewc_host::markup::ParsedMarkup {
            root: DomNode {
                id: viewc_core::ids::NodeId::new(0),
                kind: DomNodeKind::Element,
                tag: Some("div".to_string()),
                tag_span: Some(viewc_core::ids::Span::new(file, 0, 3)),
                close_tag_span: None,
                end_of_open_span: None,
                text: None,
                attrs: vec![],
                children: vec![],
            },
            diagnostics: vec![],
        }
    }
}

#[derive(Debug, Serialize)]
struct CheckSummary {
    templates_compiled: usize,
    diagnostics: usize,
}

fn main() {
    let cli = Cli::parse();
    let logger = ConsoleLogger::new(LogLevel::Info);

    match cli.command {
        Command::Config => match read_configuration(&cli.project) {
            Ok(config) => print_config(&config),
            Err(err) => {
                logger.error(&err.to_string());
                process::exit(1);
            }
        },
        Command::Check => run_self_check(&logger),
        Command::Files => match read_configuration(&cli.project) {
            Ok(config) => {
                let root = if cli.project.is_dir() { cli.project.clone() } else { cli.project.parent().unwrap_or(&cli.project).to_path_buf() };
                for path in resolve_root_files(&root, &config) {
                    println!("{}", path.display());
                }
            }
            Err(err) => {
                logger.error(&err.to_string());
                process::exit(1);
            }
        },
    }
}

fn print_config(config: &AuthorityConfig) {
    println!("include: {:?}", config.include);
    println!("exclude: {:?}", config.exclude);
    println!("scanThirdParty: {}", config.scan_third_party);
}

fn run_self_check(logger: &ConsoleLogger) {
    logger.info("compiling self-check template");

    let markup = EmptyMarkup;
    let exprs = MemoryExprParser;
    let syntax = viewc_core::builtins::builtin_syntax_registry();
    let visible: IndexSet<String> = IndexSet::new();
    let semantics = MaterializedSemantics { base: Semantics::builtin(), catalog: ResourceCatalog::default() };

    let module = lower(LowerInput { text: "<div></div>", file: None, markup: &markup, exprs: &exprs, syntax: &syntax, visible: &visible });
    let link_out = link(&module, &semantics, &syntax, None);
    let scopes = bind(&module, &semantics);
    let tc_out = typecheck(&module, &scopes, &viewc_host::memory::MemoryTypeChecker::default(), None);
    let plan = plan_and_emit(&module, &EmitOptions::default());

    let summary = CheckSummary { templates_compiled: plan.templates.len(), diagnostics: link_out.diagnostics.len() + tc_out.diagnostics.len() };
    let envelope = CommandEnvelope::ok(
        summary,
        Epistemic::exact(),
        CommandMeta { command_id: 0, memory: None, cache: viewc_core::envelope::CacheInfo { hit: false, tier: viewc_core::envelope::CacheTier::None } },
    );
    println!("{}", serde_json::to_string_pretty(&envelope).expect("envelope serializes"));
}
