use clap::ArgMatches;
use colored::Colorize;
use graphscape_core::data::{Database, ProjectStatus};
use graphscape_core::worker::{self, ProcessJob};
use graphscape_core::{export, export::ExportFormat};
use graphscape_engine::stats::Metadata;
use graphscape_engine::{Mapping, PipelineOutput};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

// Helper functions for the process/analyze handlers

/// Expand `~` in a database directory argument and point at the database
/// file inside it.
pub fn resolve_database_path(dir: &str) -> PathBuf {
    let expanded = shellexpand::tilde(dir);
    Path::new(expanded.as_ref()).join("graphscape.db")
}

/// Build a mapping from explicit --source/--target/--weight arguments. Roles
/// left unset fall back to the keyword heuristic downstream.
pub fn mapping_from_args(
    source: Option<&String>,
    target: Option<&String>,
    weight: Option<&String>,
) -> Mapping {
    Mapping {
        source: source.cloned(),
        target: target.cloned(),
        weight: weight.cloned(),
    }
}

/// Render graph statistics as aligned text lines.
pub fn format_metadata(metadata: &Metadata) -> String {
    let mut out = String::new();
    out.push_str(&format!("  Nodes:      {}\n", metadata.node_count));
    out.push_str(&format!("  Edges:      {}\n", metadata.edge_count));
    out.push_str(&format!("  Density:    {:.4}\n", metadata.density));
    out.push_str(&format!(
        "  Connected:  {}\n",
        if metadata.is_connected { "yes" } else { "no" }
    ));
    out.push_str(&format!("  Avg degree: {:.2}\n", metadata.avg_degree));
    out
}

/// Render a suggested mapping as text, one role per line.
pub fn format_suggestions(mapping: &Mapping) -> String {
    let role = |value: &Option<String>| {
        value
            .as_deref()
            .unwrap_or("(no suggestion)")
            .to_string()
    };
    format!(
        "  source: {}\n  target: {}\n  weight: {}\n",
        role(&mapping.source),
        role(&mapping.target),
        role(&mapping.weight)
    )
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn layout_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn fail(message: String) -> ! {
    eprintln!("{} {}", "✗".red().bold(), message);
    std::process::exit(1);
}

pub fn handle_init(args: &ArgMatches) {
    print_divider();
    println!("{}", "  GRAPHSCAPE INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    let dir = args.get_one::<String>("PATH").unwrap();
    let force = args.get_flag("force");
    let db_path = resolve_database_path(dir);
    let config_dir = db_path.parent().expect("Invalid database path");

    if Database::exists(&db_path) && !force {
        fail(format!(
            "A database already exists at {} (use --force to overwrite)",
            db_path.display()
        ));
    }

    if let Err(err) = std::fs::create_dir_all(config_dir) {
        fail(format!(
            "Failed to create config directory {}: {}",
            config_dir.display(),
            err
        ));
    }
    println!("{} Config directory: {}", "✓".green().bold(), config_dir.display());

    if Database::exists(&db_path) {
        println!("{} Deleting existing database", "→".blue());
        Database::drop(&db_path);
    }

    match Database::new(&db_path) {
        Ok(_) => println!("{} Database initialized at {}", "✓".green().bold(), db_path.display()),
        Err(err) => fail(format!("Failed to create database: {}", err)),
    }
}

pub fn handle_analyze(args: &ArgMatches) {
    let file = args.get_one::<PathBuf>("file").unwrap();
    let as_json = args.get_flag("json");

    let analysis = match graphscape_engine::analyze(file) {
        Ok(analysis) => analysis,
        Err(err) => fail(format!("Analysis failed: {}", err)),
    };

    if as_json {
        match serde_json::to_string_pretty(&analysis) {
            Ok(json) => println!("{}", json),
            Err(err) => fail(format!("Could not serialize analysis: {}", err)),
        }
        return;
    }

    print_divider();
    println!("{}", format!("  {}", file.display()).bright_white().bold());
    print_divider();
    println!("Detected shape: {}", analysis.kind.bright_cyan());

    if !analysis.columns.is_empty() {
        println!("\nColumns: {}", analysis.columns.join(", "));
    }
    if let Some(message) = &analysis.message {
        println!("\n{} {}", "[!]".yellow(), message);
        return;
    }

    println!("\n{}", "Suggested mapping:".bright_white());
    print!("{}", format_suggestions(&analysis.suggestions));

    if let Some(stats) = &analysis.stats {
        println!(
            "\nSample of {} rows: {} nodes, {} edges, density {:.4}, {}",
            stats.sample_size,
            stats.node_count,
            stats.edge_count,
            stats.density,
            if stats.is_connected {
                "connected"
            } else {
                "not connected"
            }
        );
    }
}

pub async fn handle_process(args: &ArgMatches) {
    tracing_subscriber::fmt::init();

    let file = args.get_one::<PathBuf>("file").unwrap();
    let algorithm = args.get_one::<String>("algorithm").unwrap();
    let format = args.get_one::<String>("format").unwrap();
    let output_path = args.get_one::<PathBuf>("output");
    let project_name = args.get_one::<String>("project");

    let mapping = mapping_from_args(
        args.get_one::<String>("source"),
        args.get_one::<String>("target"),
        args.get_one::<String>("weight"),
    );

    let mut job = ProcessJob::new(file.clone())
        .with_mapping(mapping.clone())
        .with_algorithm(algorithm.clone())
        .with_scale(*args.get_one::<f64>("scale").unwrap());
    if let Some(seed) = args.get_one::<u64>("seed") {
        job = job.with_seed(*seed);
    }

    let spinner = layout_spinner();
    spinner.set_message(format!("Processing {}", file.display()));

    let result = if let Some(name) = project_name {
        let db_path = resolve_database_path(args.get_one::<String>("db").unwrap());
        let db = match Database::new(&db_path) {
            Ok(db) => db,
            Err(err) => {
                spinner.finish_and_clear();
                fail(format!(
                    "Could not open database {} (run 'graphscape init'?): {}",
                    db_path.display(),
                    err
                ));
            }
        };
        let mapping_json = serde_json::to_string(&mapping).ok();
        let project_id = match db.create_project(
            name,
            &file.display().to_string(),
            mapping_json.as_deref(),
            algorithm,
        ) {
            Ok(id) => id,
            Err(err) => {
                spinner.finish_and_clear();
                fail(format!("Could not create project '{}': {}", name, err));
            }
        };
        worker::run_job(&db, &project_id, job, true, None).await
    } else {
        worker::run_pipeline(job, None).await
    };

    spinner.finish_and_clear();

    let output = match result {
        Ok(output) => output,
        Err(err) => fail(format!("Processing failed: {}", err)),
    };

    report_output(&output, file, output_path, format);
}

fn report_output(
    output: &PipelineOutput,
    source: &Path,
    output_path: Option<&PathBuf>,
    format: &str,
) {
    let rendered = match ExportFormat::from_str(format) {
        Some(ExportFormat::Json) => match export::generate_json_export(output) {
            Ok(json) => json,
            Err(err) => fail(format!("Could not serialize result: {}", err)),
        },
        Some(ExportFormat::Summary) | None => {
            export::generate_summary(output, &source.display().to_string())
        }
    };

    match output_path {
        Some(path) => match export::save_export(&rendered, path) {
            Ok(()) => {
                println!(
                    "{} Saved {} layout of {} nodes to {}",
                    "✓".green().bold(),
                    output.algorithm_used,
                    output.metadata.node_count,
                    path.display()
                );
            }
            Err(err) => fail(format!("Could not write {}: {}", path.display(), err)),
        },
        None => println!("{}", rendered),
    }
}

pub fn handle_project_list(args: &ArgMatches) {
    let db = open_database(args);
    let projects = match db.list_projects() {
        Ok(projects) => projects,
        Err(err) => fail(format!("Could not list projects: {}", err)),
    };

    if projects.is_empty() {
        println!("No projects yet. Create one with 'graphscape process --project <NAME>'.");
        return;
    }

    for project in projects {
        let status = match project.status {
            ProjectStatus::Ready => "ready".green(),
            ProjectStatus::Failed => "failed".red(),
            ProjectStatus::Processing => "processing".yellow(),
            ProjectStatus::Pending => "pending".normal(),
        };
        println!(
            "{}  [{}]  {} ({})",
            project.name.bright_white().bold(),
            status,
            project.algorithm,
            project.source_file
        );
    }
}

pub fn handle_project_show(args: &ArgMatches) {
    let db = open_database(args);
    let project = find_project(&db, args);

    print_divider();
    println!("{}", format!("  {}", project.name).bright_white().bold());
    print_divider();
    println!("Id:         {}", project.id);
    println!("Status:     {}", project.status.as_str());
    println!("Algorithm:  {}", project.algorithm);
    println!("Source:     {}", project.source_file);
    if let Some(mapping) = &project.mapping {
        println!("Mapping:    {}", mapping);
    }
    if let Some(error) = &project.last_error {
        println!("{} {}", "Last error:".red(), error);
    }
    if let Some(metadata) = project
        .metadata
        .as_deref()
        .and_then(|json| serde_json::from_str::<Metadata>(json).ok())
    {
        println!("\n{}", "Graph:".bright_white());
        print!("{}", format_metadata(&metadata));
    }
}

pub fn handle_project_remove(args: &ArgMatches) {
    let db = open_database(args);
    let project = find_project(&db, args);
    match db.delete_project(&project.id) {
        Ok(()) => println!("{} Removed project '{}'", "✓".green().bold(), project.name),
        Err(err) => fail(format!("Could not remove '{}': {}", project.name, err)),
    }
}

pub async fn handle_project_recompute(args: &ArgMatches) {
    tracing_subscriber::fmt::init();

    let db = open_database(args);
    let project = find_project(&db, args);
    let algorithm = args.get_one::<String>("algorithm").cloned();

    let spinner = layout_spinner();
    spinner.set_message(format!("Recomputing '{}'", project.name));

    let result = worker::recompute(&db, &project.id, algorithm, None).await;
    spinner.finish_and_clear();

    match result {
        Ok(output) => println!(
            "{} Recomputed '{}' with {} ({} nodes)",
            "✓".green().bold(),
            project.name,
            output.algorithm_used,
            output.metadata.node_count
        ),
        Err(err) => fail(format!(
            "Recompute failed, previous layout kept: {}",
            err
        )),
    }
}

fn open_database(args: &ArgMatches) -> Database {
    let db_path = resolve_database_path(args.get_one::<String>("db").unwrap());
    if !Database::exists(&db_path) {
        fail(format!(
            "No database at {} (run 'graphscape init' first)",
            db_path.display()
        ));
    }
    match Database::new(&db_path) {
        Ok(db) => db,
        Err(err) => fail(format!("Could not open database: {}", err)),
    }
}

fn find_project(db: &Database, args: &ArgMatches) -> graphscape_core::data::Project {
    let name = args.get_one::<String>("name").unwrap();
    match db.get_project_by_name(name) {
        Ok(Some(project)) => project,
        Ok(None) => fail(format!("No project named '{}'", name)),
        Err(err) => fail(format!("Could not load project '{}': {}", name, err)),
    }
}
