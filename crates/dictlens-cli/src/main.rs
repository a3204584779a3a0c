use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dictlens_core::{
    ComparisonReport, Config, Dictionary, DiffStatus, EdgeDirection, Severity, SourceKind,
};
use dictlens_engine::{
    compare_dictionaries, compare_field, filter_by_text, find_field, match_counts, LinkKind,
    NodeId, RelationTree,
};
use dictlens_store::{validate, DictionarySource, DictionaryStore, DirectorySource, HttpSource};
use dictlens_submission::{HttpSubmissionService, SubmissionModel};

const DEFAULT_CONFIG: &str = "dictlens.toml";

/// dictlens - Compare and explore versioned data dictionaries
#[derive(Parser)]
#[command(name = "dictlens")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: dictlens.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two dictionary versions
    Diff {
        /// Version to compare
        to: String,

        /// Previous version (omit to treat every field as new)
        #[arg(long)]
        from: Option<String>,

        /// Write the comparison report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also list unchanged fields
        #[arg(long)]
        all: bool,
    },

    /// Compare a single field between two versions
    Field {
        version: String,
        file_type: String,
        field: String,

        /// Previous version
        #[arg(long)]
        from: Option<String>,
    },

    /// Show the relation tree of a dictionary
    Tree {
        version: String,

        /// Root file type (default from config)
        #[arg(long)]
        root: Option<String>,

        /// Treat relations as pointing at the parent file type
        #[arg(long)]
        reverse: bool,
    },

    /// Find fields matching a case-insensitive pattern
    Filter {
        version: String,
        pattern: String,
    },

    /// Check a dictionary's structure
    Validate { version: String },

    /// List available dictionary versions
    Versions,

    /// Inspect or queue a project submission
    Submission {
        #[command(subcommand)]
        command: SubmissionCommands,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum SubmissionCommands {
    /// Show a project's submission in a release
    Show { release: String, project: String },

    /// Queue a project for validation
    Queue {
        release: String,
        project: String,

        /// Notification address (repeatable)
        #[arg(long = "email")]
        emails: Vec<String>,

        /// Data type to validate (repeatable)
        #[arg(long = "data-type")]
        data_types: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    if let Commands::Init { force } = cli.command {
        return init_command(&config_path, force);
    }

    // Load config if present
    let config = if config_path.exists() {
        Config::from_file(&config_path)?
    } else if cli.config.is_some() {
        return Err(anyhow::anyhow!("Config file not found: {}", config_path.display()));
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    let format = cli.format;

    match cli.command {
        Commands::Diff { to, from, output, all } => {
            diff_command(&config, &to, from.as_deref(), output.as_deref(), all, format).await
        }
        Commands::Field { version, file_type, field, from } => {
            field_command(&config, &version, &file_type, &field, from.as_deref(), format).await
        }
        Commands::Tree { version, root, reverse } => {
            tree_command(&config, &version, root.as_deref(), reverse, format).await
        }
        Commands::Filter { version, pattern } => {
            filter_command(&config, &version, &pattern, format).await
        }
        Commands::Validate { version } => validate_command(&config, &version, format).await,
        Commands::Versions => versions_command(&config, format).await,
        Commands::Submission { command } => submission_command(&config, command, format).await,
        Commands::Init { .. } => Ok(()),
    }
}

/// Build the dictionary source named by the config
fn make_source(config: &Config) -> Result<Box<dyn DictionarySource>> {
    match config.source.kind {
        SourceKind::Directory => {
            let dir = config.dictionary_dir().ok_or_else(|| {
                anyhow::anyhow!("No dictionary directory configured. Set [source] path in {}.", DEFAULT_CONFIG)
            })?;
            Ok(Box::new(DirectorySource::new(dir)))
        }
        SourceKind::Http => {
            let base_url = config.source.base_url.as_deref().ok_or_else(|| {
                anyhow::anyhow!("HTTP source requires [source] base_url in {}.", DEFAULT_CONFIG)
            })?;
            let mut source = HttpSource::new(base_url);
            if let Some(token) = config.submission.as_ref().and_then(|s| s.auth_token()) {
                source = source.with_auth_token(token);
            }
            Ok(Box::new(source))
        }
    }
}

/// Load the requested versions into a fresh store
async fn load_versions(config: &Config, versions: &[&str]) -> Result<DictionaryStore> {
    let source = make_source(config)?;
    let mut store = DictionaryStore::new();

    for version in versions {
        store
            .load(source.as_ref(), version)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to load dictionary {}: {}", version, e))?;
    }

    Ok(store)
}

fn loaded(store: &DictionaryStore, version: &str) -> Result<Arc<Dictionary>> {
    store
        .get_dictionary(version)
        .ok_or_else(|| anyhow::anyhow!("Dictionary {} is not loaded", version))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Diff command - compare two dictionary versions
async fn diff_command(
    config: &Config,
    to: &str,
    from: Option<&str>,
    output: Option<&Path>,
    all: bool,
    format: Format,
) -> Result<()> {
    let versions: Vec<&str> = std::iter::once(to).chain(from).collect();
    let store = load_versions(config, &versions).await?;

    let current = loaded(&store, to)?;
    let previous = from.map(|v| loaded(&store, v)).transpose()?;

    let report = compare_dictionaries(&current, previous.as_deref());

    if let Some(path) = output {
        report.save_to_file(path)?;
        eprintln!("{} {}", "Report saved to:".green(), path.display());
    }

    match format {
        Format::Json => print_json(&report),
        Format::Text => {
            print_comparison(&report, &current, &config.sorting_order, all);
            Ok(())
        }
    }
}

fn print_comparison(report: &ComparisonReport, current: &Dictionary, order: &[String], all: bool) {
    println!();
    println!("{}", "=".repeat(60).bright_blue());
    println!(
        "{} {} → {}",
        "Dictionary comparison:".bold(),
        report.from_version.as_deref().unwrap_or("(none)"),
        report.to_version
    );
    println!("{}", "=".repeat(60).bright_blue());

    for file_type in current.sorted_file_types(order) {
        let Some(comparison) = report.file_type(&file_type.name) else {
            continue;
        };
        if !all && !comparison.has_changes() {
            continue;
        }

        println!();
        if comparison.is_new {
            println!("{} {}", file_type.name.bold(), "(new)".green());
        } else {
            println!("{}", file_type.name.bold());
        }

        for field in &comparison.fields {
            let diffs: Vec<String> = field.result.diffs.iter().map(|d| d.to_string()).collect();
            match field.result.status {
                DiffStatus::New => println!("  {} {}", "+".green(), field.name),
                DiffStatus::Changed => {
                    println!("  {} {} [{}]", "~".yellow(), field.name, diffs.join(", ").yellow())
                }
                DiffStatus::Unchanged if all => println!("    {}", field.name.dimmed()),
                DiffStatus::Unchanged => {}
            }
        }

        for removed in &comparison.removed_fields {
            println!("  {} {}", "-".red(), removed);
        }
    }

    for removed in &report.removed_file_types {
        println!();
        println!("{} {}", removed.bold(), "(removed)".red());
    }

    let summary = &report.summary;
    println!();
    println!("{}", "Summary:".bold());
    println!("  File types: {} ({} new, {} removed)", summary.file_types, summary.new_file_types, summary.removed_file_types);
    println!("  New:        {}", summary.new_fields.to_string().green());
    println!("  Changed:    {}", summary.changed_fields.to_string().yellow());
    println!("  Removed:    {}", summary.removed_fields.to_string().red());
    println!("  Unchanged:  {}", summary.unchanged_fields);
    println!();

    if !report.has_changes() {
        println!("{}", "✓ No differences".green().bold());
    }
}

/// Field command - diff one field
async fn field_command(
    config: &Config,
    version: &str,
    file_type: &str,
    field: &str,
    from: Option<&str>,
    format: Format,
) -> Result<()> {
    let versions: Vec<&str> = std::iter::once(version).chain(from).collect();
    let store = load_versions(config, &versions).await?;

    let current_dict = loaded(&store, version)?;
    let current = find_field(&current_dict, file_type, field).ok_or_else(|| {
        anyhow::anyhow!("Field '{}.{}' not found in dictionary {}", file_type, field, version)
    })?;

    let previous_dict = from.map(|v| loaded(&store, v)).transpose()?;
    let previous = previous_dict
        .as_deref()
        .and_then(|d| find_field(d, file_type, field));

    let result = compare_field(current, previous);

    if format == Format::Json {
        return print_json(&serde_json::json!({
            "field": current,
            "result": result,
        }));
    }

    println!("{} {}.{}", "Field:".bold(), file_type, field.green());
    if !current.label.is_empty() {
        println!("  Label:      {}", current.label);
    }
    println!("  Value type: {}", current.value_type);
    println!("  Controlled: {}", current.controlled);
    for restriction in &current.restrictions {
        println!("  Restriction {}: {}", restriction.kind().as_str().cyan(), restriction.search_terms().join(" "));
    }
    if let Some(code_list) = current.codelist_name() {
        // Code lists are optional; a missing file is not an error here
        let source = make_source(config)?;
        let mut lists = DictionaryStore::new();
        if lists.load_code_lists(source.as_ref()).await.is_ok() {
            if let Some(list) = lists.get_code_list(code_list) {
                for term in &list.terms {
                    println!("    {} = {}", term.code, term.value);
                }
            }
        }
    }

    println!();
    match result.status {
        DiffStatus::New => println!("{}", "New field".green().bold()),
        DiffStatus::Unchanged => println!("{}", "✓ Unchanged".green()),
        DiffStatus::Changed => {
            let diffs: Vec<String> = result.diffs.iter().map(|d| d.to_string()).collect();
            println!("{} {}", "Changed:".yellow().bold(), diffs.join(", "));
        }
    }

    Ok(())
}

/// Tree command - print the relation tree
async fn tree_command(
    config: &Config,
    version: &str,
    root: Option<&str>,
    reverse: bool,
    format: Format,
) -> Result<()> {
    let store = load_versions(config, &[version]).await?;
    let dictionary = loaded(&store, version)?;

    let direction = if reverse { EdgeDirection::Reverse } else { config.direction };
    let root = root.unwrap_or(&config.root);
    let tree = RelationTree::build(&dictionary, root, direction);

    if format == Format::Json {
        return print_json(&serde_json::json!({
            "nodes": tree.nodes(),
            "links": tree.links(&dictionary),
        }));
    }

    print_node(&tree, 0, 0);

    let dropped = tree.dropped_relations();
    if !dropped.is_empty() {
        println!();
        println!("{}", "Relations not shown in the tree:".bold());
        for link in tree.links(&dictionary) {
            let LinkKind::Dropped(kind) = link.kind else {
                continue;
            };
            for line in link.describe() {
                println!("  {} [{:?}]", line, kind);
            }
        }
    }

    Ok(())
}

fn print_node(tree: &RelationTree, id: NodeId, indent: usize) {
    let Some(node) = tree.node(id) else {
        return;
    };

    let marker = if tree.has_same_level_relation(id) { " ↔".cyan().to_string() } else { String::new() };
    println!(
        "{}{} {}{}",
        "  ".repeat(indent),
        node.name.bold(),
        format!("({} fields)", node.fields.len()).dimmed(),
        marker
    );

    for &child in &node.children {
        print_node(tree, child, indent + 1);
    }
}

/// Filter command - search fields by pattern
async fn filter_command(config: &Config, version: &str, pattern: &str, format: Format) -> Result<()> {
    let store = load_versions(config, &[version]).await?;
    let dictionary = loaded(&store, version)?;

    let filter = filter_by_text(pattern);
    if let Some(error) = filter.error() {
        tracing::warn!(pattern, error, "invalid filter pattern");
    }

    let counts = match_counts(&dictionary, &filter);

    if format == Format::Json {
        let matches: Vec<serde_json::Value> = dictionary
            .sorted_file_types(&config.sorting_order)
            .into_iter()
            .filter(|ft| counts.contains_key(&ft.name))
            .map(|ft| {
                let names: Vec<&str> = filter.apply(&ft.fields).iter().map(|f| f.name.as_str()).collect();
                serde_json::json!({ "fileType": ft.name, "fields": names })
            })
            .collect();
        return print_json(&serde_json::json!({
            "pattern": pattern,
            "invalid": filter.is_invalid(),
            "matches": matches,
        }));
    }

    if counts.is_empty() {
        println!("{}", "No results".yellow());
        return Ok(());
    }

    for file_type in dictionary.sorted_file_types(&config.sorting_order) {
        let Some(count) = counts.get(&file_type.name) else {
            continue;
        };
        println!("{} ({})", file_type.name.bold(), count);
        for field in filter.apply(&file_type.fields) {
            println!("  {} {}", field.name, field.label.dimmed());
        }
    }

    Ok(())
}

/// Validate command - report structural issues
async fn validate_command(config: &Config, version: &str, format: Format) -> Result<()> {
    let source = make_source(config)?;
    let dictionary = source
        .fetch_dictionary(version)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to fetch dictionary {}: {}", version, e))?;

    let issues = validate(&dictionary);
    let errors = issues.iter().filter(|i| i.is_error()).count();

    match format {
        Format::Json => print_json(&issues)?,
        Format::Text => {
            for issue in &issues {
                let label = match issue.severity {
                    Severity::Error => "error".red().bold(),
                    Severity::Warn => "warning".yellow().bold(),
                };
                println!("{}[{}]: {}", label, issue.code, issue.message);
            }

            if issues.is_empty() {
                println!("{}", "✓ No issues found!".green().bold());
            } else {
                println!();
                println!("  Errors:   {}", errors.to_string().red());
                println!("  Warnings: {}", (issues.len() - errors).to_string().yellow());
            }
        }
    }

    // Exit with error code if there are errors
    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Versions command - list what the source can serve
async fn versions_command(config: &Config, format: Format) -> Result<()> {
    let source = make_source(config)?;
    let versions = source
        .list_versions()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list versions from {} source: {}", source.name(), e))?;

    match format {
        Format::Json => print_json(&versions),
        Format::Text => {
            for version in versions {
                println!("{}", version);
            }
            Ok(())
        }
    }
}

/// Submission commands - talk to the submission server
async fn submission_command(config: &Config, command: SubmissionCommands, format: Format) -> Result<()> {
    let submission_config = config.submission.as_ref().ok_or_else(|| {
        anyhow::anyhow!(
            "No submission configuration found in {}. Add a [submission] section with base_url.",
            DEFAULT_CONFIG
        )
    })?;
    let service = Arc::new(HttpSubmissionService::from_config(submission_config));

    match command {
        SubmissionCommands::Show { release, project } => {
            let model = SubmissionModel::new(service, release, project);
            model.fetch().await?;
            let state = model.snapshot();

            if format == Format::Json {
                return print_json(&state);
            }

            println!(
                "{} {} / {}",
                "Submission:".bold(),
                state.release_name,
                state.project_key.green()
            );
            if let Some(name) = &state.project_name {
                println!("  Project: {}", name);
            }
            println!("  State:   {}", state.state.as_deref().unwrap_or("unknown"));
            println!("  Locked:  {}", state.locked);
            println!("  Size:    {} bytes", model.total_file_size_in_bytes());

            for (group, files) in model.grouped_submission_files() {
                println!();
                println!("{} ({})", group.as_str().bold(), files.len());
                for file in files {
                    let file_state = file
                        .report
                        .as_ref()
                        .and_then(|r| r.file_state.as_deref())
                        .unwrap_or("-");
                    println!("  {} {} bytes [{}]", file.name, file.size, file_state);
                }
            }
            Ok(())
        }
        SubmissionCommands::Queue { release, project, emails, data_types } => {
            let model = SubmissionModel::new(service, release, project);
            let response = model.queue_for_validation(emails, data_types).await?;

            match format {
                Format::Json => print_json(&response),
                Format::Text => {
                    println!("{}", "✓ Queued for validation".green().bold());
                    if !response.is_null() {
                        println!("{}", response);
                    }
                    Ok(())
                }
            }
        }
    }
}

/// Init command - write a default config
fn init_command(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(anyhow::anyhow!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        ));
    }

    Config::default().save_to_file(path)?;
    println!("{} {}", "Wrote".green(), path.display());
    Ok(())
}
