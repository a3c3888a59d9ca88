use commands::command_argument_builder;
use graphscape_core::print_banner;

mod commands;
mod handlers;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    match chosen_command.subcommand() {
        Some(("init", primary_command)) => handlers::handle_init(primary_command),
        Some(("analyze", primary_command)) => handlers::handle_analyze(primary_command),
        Some(("process", primary_command)) => handlers::handle_process(primary_command).await,
        Some(("project", primary_command)) => match primary_command.subcommand() {
            Some(("list", secondary_command)) => handlers::handle_project_list(secondary_command),
            Some(("show", secondary_command)) => handlers::handle_project_show(secondary_command),
            Some(("remove", secondary_command)) => {
                handlers::handle_project_remove(secondary_command)
            }
            Some(("recompute", secondary_command)) => {
                handlers::handle_project_recompute(secondary_command).await
            }
            _ => unreachable!("clap should ensure we don't get here"),
        },
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
