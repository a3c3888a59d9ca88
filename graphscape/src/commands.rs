use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("graphscape")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("graphscape")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Initializes the graphscape project database on your filesystem")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Location to store the graphscape database")
                        .default_value("~/.config/graphscape/"),
                )
                .arg(
                    arg!(-f - -"force")
                        .help(
                            "Forces the overwriting of any existing database at the specified \
                        location.",
                        )
                        .required(false),
                ),
        )
        .subcommand(
            command!("analyze")
                .about(
                    "Inspect an input file: columns, a short preview, a suggested \
                source/target/weight mapping and quick statistics.",
                )
                .arg(
                    arg!(-f --"file" <PATH>)
                        .required(true)
                        .help("The CSV or JSON file to inspect")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"json" "Print the analysis as JSON instead of text")
                        .required(false)
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("process")
                .about(
                    "Build a graph from a CSV, JSON or GEXF file and compute a 3-D layout \
                for visualization.",
                )
                .arg(
                    arg!(-f --"file" <PATH>)
                        .required(true)
                        .help("The input file (.csv, .json or .gexf)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-s --"source" <COLUMN>)
                        .required(false)
                        .help("Column holding the edge source (suggested from headers if omitted)"),
                )
                .arg(
                    arg!(-t --"target" <COLUMN>)
                        .required(false)
                        .help("Column holding the edge target (suggested from headers if omitted)"),
                )
                .arg(
                    arg!(-w --"weight" <COLUMN>)
                        .required(false)
                        .help("Column holding the edge weight (defaults every edge to 1.0)"),
                )
                .arg(
                    arg!(-a --"algorithm" <NAME>)
                        .required(false)
                        .help("Layout algorithm, or 'auto' to pick one from the graph's shape")
                        .value_parser([
                            "auto",
                            "fruchterman_reingold",
                            "spring",
                            "kamada_kawai",
                            "drl",
                            "force_atlas",
                            "random",
                            "sphere",
                            "grid",
                        ])
                        .default_value("auto"),
                )
                .arg(
                    arg!(--"scale" <SCALE>)
                        .required(false)
                        .help("Half-width of the normalized coordinate cube")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("50.0"),
                )
                .arg(
                    arg!(--"seed" <SEED>)
                        .required(false)
                        .help("Random seed; runs with the same seed are identical")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save the result to a file (default: print to stdout)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"format" <FORMAT>)
                        .required(false)
                        .help("Output format: json, summary")
                        .value_parser(["json", "summary"])
                        .default_value("json"),
                )
                .arg(
                    arg!(-p --"project" <NAME>)
                        .required(false)
                        .help("Persist the result as a named project in the database"),
                )
                .arg(
                    arg!(--"db" <PATH>)
                        .required(false)
                        .help("Database directory")
                        .default_value("~/.config/graphscape/"),
                ),
        )
        .subcommand(
            command!("project")
                .about("Manage stored graph projects")
                .subcommand(
                    command!("list").about("List all projects").arg(
                        arg!(--"db" <PATH>)
                            .required(false)
                            .help("Database directory")
                            .default_value("~/.config/graphscape/"),
                    ),
                )
                .subcommand(
                    command!("show")
                        .about("Show a project's metadata")
                        .arg(
                            arg!(-n --"name" <NAME>)
                                .required(true)
                                .help("The name of the project"),
                        )
                        .arg(
                            arg!(--"db" <PATH>)
                                .required(false)
                                .help("Database directory")
                                .default_value("~/.config/graphscape/"),
                        ),
                )
                .subcommand(
                    command!("remove")
                        .about("Remove a project")
                        .arg(
                            arg!(-n --"name" <NAME>)
                                .required(true)
                                .help("The name of the project"),
                        )
                        .arg(
                            arg!(--"db" <PATH>)
                                .required(false)
                                .help("Database directory")
                                .default_value("~/.config/graphscape/"),
                        ),
                )
                .subcommand(
                    command!("recompute")
                        .about(
                            "Recompute a project's layout from its retained source file. \
                        A failed recompute keeps the previous graph.",
                        )
                        .arg(
                            arg!(-n --"name" <NAME>)
                                .required(true)
                                .help("The name of the project"),
                        )
                        .arg(
                            arg!(-a --"algorithm" <NAME>)
                                .required(false)
                                .help("Override the stored layout algorithm")
                                .value_parser([
                                    "auto",
                                    "fruchterman_reingold",
                                    "spring",
                                    "kamada_kawai",
                                    "drl",
                                    "force_atlas",
                                    "random",
                                    "sphere",
                                    "grid",
                                ]),
                        )
                        .arg(
                            arg!(--"db" <PATH>)
                                .required(false)
                                .help("Database directory")
                                .default_value("~/.config/graphscape/"),
                        ),
                ),
        )
}
