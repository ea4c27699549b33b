mod cleanup;
mod error;
mod pipeline;

use clap::Parser;
use colored::Colorize;
use pipeline::{Pipeline, Services};
use shipyard_config::{GitHubContext, Inputs};
use shipyard_core::workflow;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "shipyard", version)]
#[command(
    about = "Build a container image, verify it and publish it to ECR and its mirrors",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    inputs: Inputs,

    #[command(flatten)]
    github: GitHubContext,
}

#[tokio::main]
async fn main() -> ExitCode {
    // 入力エラーは 1 で終了（clap の既定は 2 で、Dockerfile 読み込み失敗と衝突する）
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // ログは stderr、stdout はワークフローコマンド用
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let services = match Services::live() {
        Ok(services) => services,
        Err(e) => {
            workflow::error(&format!("{:#}", e));
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            return ExitCode::from(1);
        }
    };

    match Pipeline::new(cli.inputs, cli.github, services).run().await {
        Ok(()) => {
            println!("{}", "✓ Done".green());
            ExitCode::SUCCESS
        }
        Err(e) => {
            workflow::error(&e.to_string());
            eprintln!("{} {}", "Error:".red().bold(), e.user_message());
            ExitCode::from(e.exit_code())
        }
    }
}
