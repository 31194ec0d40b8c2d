//! schema-drift CLI
//!
//! Command-line tool for monitoring schema drift between two databases.

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use schema_drift::prelude::*;

/// Monitor structural drift between source and target database schemas.
#[derive(Parser)]
#[command(name = "schema-drift")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// File listing the objects to monitor, one per line.
    #[arg(short, long, default_value = "DB_objects.txt")]
    objects: PathBuf,

    /// File with the source and target connections (two lines).
    #[arg(short, long, default_value = "Access.txt")]
    access: PathBuf,

    /// Source connection, overriding the access file.
    #[arg(long, env = "SCHEMA_DRIFT_SOURCE")]
    source: Option<ConnectionSpec>,

    /// Target connection, overriding the access file.
    #[arg(long, env = "SCHEMA_DRIFT_TARGET")]
    target: Option<ConnectionSpec>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Source and target connections, flags taking precedence over the
    /// access file.
    fn access_config(&self) -> Result<AccessConfig> {
        AccessConfig::resolve(&self.access, self.source.clone(), self.target.clone())
    }

    /// Target connection only.
    fn target_connection(&self) -> Result<ConnectionSpec> {
        resolve_target(&self.access, self.target.clone())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create the monitoring table in the target database.
    Init,

    /// Compare source and target without recording anything.
    Check {
        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Compare source and target and record the results.
    Monitor,

    /// Show recorded results.
    Show {
        /// Object to show the history of (latest run if not specified).
        #[arg(long)]
        object: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match &cli.command {
        Commands::Init => {
            let target = cli.target_connection()?;
            info!(schema = %target.schema_name, "Initializing monitoring table...");
            MonitoringSink::new(target.connect().await?)
                .ensure_table()
                .await?;
            info!("Monitoring table created successfully.");
        }

        Commands::Check { json } => {
            let access = cli.access_config()?;
            let objects = load_object_list(&cli.objects)?;

            let source = SqliteCatalog::new(access.source.connect().await?, &access.source.schema_name);
            let target = SqliteCatalog::new(access.target.connect().await?, &access.target.schema_name);

            let report = Monitor::new(source, target).run(&objects, Utc::now()).await;
            println!("{}", render_report(&report, *json)?);
        }

        Commands::Monitor => {
            let access = cli.access_config()?;
            let objects = load_object_list(&cli.objects)?;

            let source_pool = access.source.connect().await?;
            let target_pool = access.target.connect().await?;

            // One timestamp for the whole run; it keys every row written below.
            let run_timestamp = Utc::now();

            let source = SqliteCatalog::new(source_pool, &access.source.schema_name);
            let target = SqliteCatalog::new(target_pool.clone(), &access.target.schema_name);
            let report = Monitor::new(source, target).run(&objects, run_timestamp).await;

            let sink = MonitoringSink::new(target_pool);
            sink.ensure_table().await?;
            let recorded = report.record_with(&sink).await?;

            for (object, reason) in report.failed() {
                warn!(object = %object, reason = %reason, "Not recorded");
            }
            info!(
                recorded,
                run = %schema_drift::sink::timestamp_key(&run_timestamp),
                "Results recorded."
            );
        }

        Commands::Show { object } => {
            let target = cli.target_connection()?;
            let sink = MonitoringSink::new(target.connect().await?);

            // Listing never creates the table.
            let rows = if sink.table_exists().await? {
                match object {
                    Some(object) => sink.rows_for_object(object).await?,
                    None => match sink.latest_run().await? {
                        Some(run) => sink.rows_for_run(&run).await?,
                        None => Vec::new(),
                    },
                }
            } else {
                Vec::new()
            };

            if rows.is_empty() {
                info!("No monitoring results recorded yet.");
            } else {
                println!("\nMonitoring results:");
                println!("{:-<60}", "");

                for row in &rows {
                    let marker = if row.is_clean() { " " } else { "!" };
                    println!(
                        " [{}] {} {} ({} -> {}) fields {}/{} new={} deleted={} changed={}",
                        marker,
                        row.run_timestamp.format("%Y-%m-%d %H:%M:%S"),
                        row.db_object,
                        row.source_name,
                        row.target_name,
                        row.source_fields_count,
                        row.target_fields_count,
                        row.new_fields_count.unwrap_or(0),
                        row.deleted_fields_count.unwrap_or(0),
                        row.changed_fields_count.unwrap_or(0),
                    );
                    for list in [
                        &row.new_fields_list,
                        &row.deleted_fields_list,
                        &row.changed_fields_list,
                    ]
                    .into_iter()
                    .flatten()
                    {
                        println!("       {list}");
                    }
                }
                println!();
            }
        }
    }

    Ok(())
}

/// Formats a run report for `check`.
fn render_report(report: &RunReport, json: bool) -> serde_json::Result<String> {
    if json {
        serde_json::to_string_pretty(report)
    } else {
        Ok(report.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::TimeZone;
    use clap::CommandFactory;

    use super::*;

    fn access_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sqlite:file_source.db").unwrap();
        writeln!(file, "sqlite:file_target.db").unwrap();
        file
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["schema-drift", "monitor"]).unwrap();
        assert_eq!(cli.objects, PathBuf::from("DB_objects.txt"));
        assert_eq!(cli.access, PathBuf::from("Access.txt"));
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Monitor));
    }

    #[test]
    fn target_flag_overrides_access_file() {
        let file = access_file();
        let cli = Cli::try_parse_from([
            "schema-drift",
            "--access",
            file.path().to_str().unwrap(),
            "--target",
            "sqlite:override.db",
            "check",
            "--json",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Check { json: true }));

        let access = cli.access_config().unwrap();
        assert_eq!(access.source.schema_name, "file_source");
        assert_eq!(access.target.schema_name, "override");
        assert_eq!(cli.target_connection().unwrap().schema_name, "override");
    }

    #[test]
    fn access_file_used_without_flags() {
        let file = access_file();
        let cli = Cli::try_parse_from([
            "schema-drift",
            "--access",
            file.path().to_str().unwrap(),
            "--source",
            "sqlite:file_source.db",
            "show",
            "--object",
            "ORDERS_V",
        ])
        .unwrap();

        match &cli.command {
            Commands::Show { object } => assert_eq!(object.as_deref(), Some("ORDERS_V")),
            _ => panic!("Expected show"),
        }
        assert_eq!(cli.target_connection().unwrap().schema_name, "file_target");
    }

    #[test]
    fn invalid_connection_flag_is_rejected() {
        assert!(Cli::try_parse_from(["schema-drift", "--source", "postgres://h/db", "check"]).is_err());
    }

    #[test]
    fn connections_read_from_environment() {
        let command = Cli::command();
        let env = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .map(|name| name.to_string_lossy().into_owned())
        };
        assert_eq!(env("source").as_deref(), Some("SCHEMA_DRIFT_SOURCE"));
        assert_eq!(env("target").as_deref(), Some("SCHEMA_DRIFT_TARGET"));
    }

    #[test]
    fn check_output_formats() {
        let report = RunReport::new(Utc.with_ymd_and_hms(2026, 10, 18, 6, 30, 0).unwrap());

        let text = render_report(&report, false).unwrap();
        assert_eq!(text, "0 objects: 0 drifted, 0 clean, 0 failed");

        let json: serde_json::Value =
            serde_json::from_str(&render_report(&report, true).unwrap()).unwrap();
        assert_eq!(json["run_timestamp"], "2026-10-18T06:30:00Z");
        assert!(json["outcomes"].as_object().unwrap().is_empty());
    }
}
