use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;
use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

/// Admin tool for configuration properties and typed objects.
///
/// Results are printed to stdout as JSON and logs go to stderr. The property cache
/// lives only for the duration of one command, so there is no cache subcommand.
#[derive(Debug, Parser)]
#[command(name = "objconf", version, about)]
struct Cli {
    /// Emit logs as JSON lines instead of the compact format.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current value of a property.
    Get { name: String },
    /// Set a property from a JSON literal.
    Set {
        name: String,
        value: String,
        #[arg(long, default_value = "admin")]
        committer: String,
    },
    /// Reset a property to its default.
    Revert {
        name: String,
        #[arg(long, default_value = "admin")]
        committer: String,
    },
    /// Print the commit log of a property.
    History { name: String },
    /// List registered properties with their current values.
    List,
    /// Normalize a JSON literal as the given object type.
    Normalize { object_type: String, value: String },
    /// List object type names.
    Types,
    /// Print an object type's editor template.
    Template {
        object_type: String,
        #[arg(long, value_enum, default_value_t = TemplateKind::Js)]
        kind: TemplateKind,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TemplateKind {
    Js,
    Html,
}

fn init_logging(json: bool) {
    // 提前加载 .env，使得 RUST_LOG 等环境变量生效
    dotenv().ok();
    // stdout 只输出命令结果
    if json {
        common::utils::logging::init_logging_json(std::io::stderr);
    } else {
        common::utils::logging::init_logging_default(std::io::stderr);
    }
}

fn parse_json(raw: &str) -> anyhow::Result<Value> {
    serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("value is not valid JSON: {e}"))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli, cfg: configs::AppConfig) -> anyhow::Result<()> {
    match &cli.command {
        Command::Normalize { object_type, value } => {
            let out = objects::catalog().normalize(object_type, &parse_json(value)?)?;
            return print_json(&out);
        }
        Command::Types => {
            for name in objects::catalog().names() {
                println!("{name}");
            }
            return Ok(());
        }
        Command::Template { object_type, kind } => {
            let t = objects::catalog().get(object_type)?;
            let body = match kind {
                TemplateKind::Js => t.get_editor_js_template(&cfg.objects.templates_dir).await?,
                TemplateKind::Html => t.get_editor_html_template(&cfg.objects.templates_dir).await?,
            };
            println!("{body}");
            return Ok(());
        }
        _ => {}
    }

    service::runtime::ensure_env(&cfg).await?;
    let svc = service::runtime::build_config_service(&cfg).await?;
    match cli.command {
        Command::Get { name } => print_json(&svc.get_property(&name).await?),
        Command::Set { name, value, committer } => {
            let saved = svc.set_property(&committer, &name, &parse_json(&value)?).await?;
            print_json(&saved)
        }
        Command::Revert { name, committer } => print_json(&svc.revert_property(&committer, &name).await?),
        Command::History { name } => print_json(&svc.history(&name).await?),
        Command::List => print_json(&svc.registered_properties().await?),
        Command::Normalize { .. } | Command::Types | Command::Template { .. } => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let run_id = Uuid::new_v4();
    std::panic::set_hook(Box::new(move |info| {
        error!(service = "objconf", event = "panic", %run_id, message = %info, "unhandled panic occurred");
    }));

    let cfg = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "objconf", event = "config_invalid", error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "objconf", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(service = "objconf", event = "start", %run_id, command = ?cli.command, "objconf starting");
    match rt.block_on(run(cli, cfg)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(service = "objconf", event = "command_failed", %run_id, error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_subcommands_parse() {
        let cli = Cli::try_parse_from(["objconf", "set", "allow_yaml_file_upload", "true"]).expect("parse");
        match cli.command {
            Command::Set { name, value, committer } => {
                assert_eq!(name, "allow_yaml_file_upload");
                assert_eq!(value, "true");
                assert_eq!(committer, "admin");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(Cli::try_parse_from(["objconf", "--json-logs", "template", "Graph", "--kind", "html"]).is_ok());
    }

    #[test]
    fn no_cache_subcommand_is_offered() {
        assert!(Cli::try_parse_from(["objconf", "invalidate", "allow_yaml_file_upload"]).is_err());
    }
}
