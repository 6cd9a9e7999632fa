mod api;
mod chat;
mod upload;
mod view;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

use api::ApiClient;
use chat::ChatController;
use upload::UploadController;
use view::TerminalView;

// Flask's development default, which the detection server runs on.
const DEFAULT_SERVER: &str = "http://localhost:5000";
const DEFAULT_REPORT_PATH: &str = "anomalies-report.pdf";

#[derive(Deserialize, Debug)]
struct Environment {
    anomaly_console_server: Option<String>,
}

#[derive(StructOpt, Debug)]
#[structopt(
    name = "anomaly-console",
    about = "Console client for the fraud-detection chat and CSV screening server"
)]
struct Args {
    /// Base URL of the detection server
    #[structopt(short, long)]
    server: Option<String>,

    /// Path to a TOML configuration file
    #[structopt(short = "c", long)]
    config: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
struct Config {
    server: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let environment = envy::from_env::<Environment>()?;
    let args = Args::from_args();

    let config = match &args.config {
        Some(path) => toml::from_str::<Config>(
            &tokio::fs::read_to_string(path)
                .await
                .context("Failed to read config file")?,
        )
        .context("Failed to parse config TOML")?,
        None => Config::default(),
    };

    let server = args
        .server
        .or(environment.anomaly_console_server)
        .or(config.server)
        .unwrap_or_else(|| DEFAULT_SERVER.to_owned());

    let client = ApiClient::new(&server);
    let mut chat = ChatController::new(client.clone(), TerminalView);
    let mut upload = UploadController::new(client, TerminalView);

    println!("Connected to {server}.");
    println!("Type a message to chat, /upload <file.csv> to screen transactions, /help for more.");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let (command, rest) = match input.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (input, ""),
        };

        let outcome = match command {
            "/quit" | "/exit" => break,
            "/help" => {
                print_help();
                continue;
            }
            "/upload" => {
                if rest.is_empty() {
                    println!("Usage: /upload <file.csv>");
                    continue;
                }
                upload.submit(Path::new(rest)).await
            }
            "/report" => {
                let dest = if rest.is_empty() {
                    Path::new(DEFAULT_REPORT_PATH)
                } else {
                    Path::new(rest)
                };
                match upload.save_report(dest).await {
                    Ok(saved) => {
                        println!("Report saved to {}.", saved.display());
                        Ok(())
                    }
                    Err(error) => Err(error),
                }
            }
            _ if command.starts_with('/') => {
                println!("Unknown command `{command}`. Try /help.");
                continue;
            }
            _ => chat.send(input).await,
        };

        // Failures end the command, never the session.
        if let Err(error) = outcome {
            log::error!("{error:#}");
        }
    }

    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  <text>                chat with the assistant");
    println!("  /upload <file.csv>    screen a CSV of transactions for anomalies");
    println!("  /report [dest.pdf]    save the latest PDF report (default {DEFAULT_REPORT_PATH})");
    println!("  /quit                 leave the console");
}
