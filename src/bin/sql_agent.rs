use sql_agent::agent::{AgentState, Role};
use sql_agent::config::AgentConfig;
use sql_agent::db::{init_pool, setup_database, Row};
use sql_agent::logging::init_logging;
use sql_agent::schema::EXAMPLE_QUESTIONS;
use sql_agent::SqlAgent;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "sql-agent")]
#[command(about = "Ask questions about a PostgreSQL database in natural language")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn a question into SQL, run it and explain the results
    Ask {
        /// The question in natural language
        question: String,

        /// Print the full request state as JSON
        #[arg(long)]
        json: bool,

        /// Write the result rows to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Export the model conversation to a JSON file
        #[arg(long)]
        transcript: Option<PathBuf>,
    },
    /// Create the sample tables and insert sample data if they are empty
    Setup,
    /// List example questions
    Examples,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let args = Args::parse();

    let config = AgentConfig::from_env()?;
    init_logging(&config.logging)?;

    match args.command {
        Commands::Ask { question, json, csv, transcript } => {
            ask(&config, &question, json, csv, transcript).await
        }
        Commands::Setup => setup(&config).await,
        Commands::Examples => {
            for (i, example) in EXAMPLE_QUESTIONS.iter().enumerate() {
                println!("{}. {}", i + 1, example);
            }
            Ok(())
        }
    }
}

async fn ask(
    config: &AgentConfig,
    question: &str,
    json: bool,
    csv_path: Option<PathBuf>,
    transcript_path: Option<PathBuf>,
) -> Result<()> {
    let agent = SqlAgent::from_config(config).context("failed to build the SQL agent")?;
    let state = agent.process_query(question).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print_state(&state);
    }

    if let (Some(path), Some(rows)) = (csv_path, state.results.as_ref()) {
        write_csv(&path, rows)?;
        info!("Wrote {} rows to {}", rows.len(), path.display());
    }

    if let Some(path) = transcript_path {
        std::fs::write(&path, serde_json::to_string_pretty(&state.transcript)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Transcript exported to {}", path.display());
    }

    Ok(())
}

async fn setup(config: &AgentConfig) -> Result<()> {
    let pool = init_pool(&config.database)
        .await
        .context("failed to connect to the database")?;
    match setup_database(&pool).await {
        Ok(true) => println!("Database configured and sample data inserted."),
        Ok(false) => println!("Database configured; existing data kept."),
        Err(e) => {
            error!("Database setup failed: {}", e);
            return Err(e.into());
        }
    }
    Ok(())
}

fn print_state(state: &AgentState) {
    if let Some(ref err) = state.error {
        println!("Error: {}", err);
        if !state.sql.is_empty() {
            println!("\nSQL:\n{}", state.sql);
        }
        print_timing(state);
        return;
    }

    println!("SQL:\n{}\n", state.sql);
    println!("Query explanation:\n{}\n", state.explanation);

    match state.results.as_deref() {
        Some(rows) if !rows.is_empty() => {
            println!("Results ({} rows):", rows.len());
            print_table(rows);
        }
        _ => println!("No results found."),
    }

    if let Some(ref narration) = state.result_explanation {
        println!("\nAnalysis:\n{}", narration);
    }

    let turns = state.transcript.len();
    let model_turns = state.transcript.iter().filter(|t| t.role == Role::Assistant).count();
    println!("\n{} transcript turns ({} from the model)", turns, model_turns);
    print_timing(state);
}

fn print_timing(state: &AgentState) {
    println!("\nTiming:");
    for (stage, seconds) in &state.timing {
        println!("  {}: {:.4}s", stage, seconds);
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn print_table(rows: &[Row]) {
    let columns: Vec<&String> = match rows.first() {
        Some(first) => first.keys().collect(),
        None => return,
    };

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, column) in columns.iter().enumerate() {
            let len = row.get(*column).map(cell).unwrap_or_default().chars().count();
            widths[i] = widths[i].max(len);
        }
    }

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<width$}", c, width = *w))
        .collect();
    println!("{}", header.join(" | "));
    println!(
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
    );

    for row in rows {
        let line: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| {
                let value = row.get(*c).map(cell).unwrap_or_default();
                format!("{:<width$}", value, width = *w)
            })
            .collect();
        println!("{}", line.join(" | "));
    }
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    if let Some(first) = rows.first() {
        writer.write_record(first.keys())?;
        for row in rows {
            writer.write_record(first.keys().map(|k| row.get(k).map(cell).unwrap_or_default()))?;
        }
    }

    writer.flush()?;
    Ok(())
}
