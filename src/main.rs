// Copyright 2026 Sitescore Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use sitescore::model::FactorStatus;
use sitescore::pipeline::CancelFlag;
use sitescore::{progress, run_audit, AuditConfig};

#[derive(Parser)]
#[command(
    name = "sitescore",
    about = "Sitescore — crawl, analyze, and score a website against weighted quality factors",
    version
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a website and print its score card
    Audit {
        /// Site to audit (e.g. "example.com")
        url: String,
        /// Maximum pages fetched beyond the homepage
        #[arg(long, default_value = "25")]
        max_pages: usize,
        /// Include subdomains of the target host
        #[arg(long)]
        subdomains: bool,
        /// Disable the headless-render path even for JavaScript-heavy sites
        #[arg(long)]
        no_js: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "sitescore=debug" } else { "sitescore=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Audit {
            url,
            max_pages,
            subdomains,
            no_js,
        } => {
            let config = AuditConfig {
                max_pages,
                include_subdomains: subdomains,
                analyze_javascript: !no_js,
                ..Default::default()
            };

            let (tx, rx) = progress::channel();
            let display = tokio::spawn(render_progress(rx, cli.json));

            let result = run_audit(&url, &config, Some(tx), CancelFlag::new()).await?;
            let _ = display.await;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            println!("\n  {} — overall score {}/100", result.base_url, result.overall_score);
            println!(
                "  {} pages analyzed in {:.1}s ({} factors)\n",
                result.pages_analyzed,
                result.elapsed_ms as f64 / 1000.0,
                result.total_factors
            );
            for (category, score) in &result.category_scores {
                println!("  {category:<24} {score:>5.1}");
            }
            let counts = result.status_counts;
            println!(
                "\n  OK {}  ·  OFI {}  ·  Priority OFI {}  ·  N/A {}\n",
                counts.ok, counts.ofi, counts.priority_ofi, counts.not_applicable
            );

            let mut priority_items: Vec<_> = result
                .assessments
                .iter()
                .zip(result.classifications.iter())
                .filter(|(_, c)| c.status == FactorStatus::PriorityOfi)
                .collect();
            priority_items.truncate(10);
            if !priority_items.is_empty() {
                println!("  Top priorities:");
                for (a, c) in priority_items {
                    let tag = if c.quick_win { " [quick win]" } else { "" };
                    println!("   - {} on {}{tag}", a.name, a.page_url);
                    println!("     {}", a.rationale);
                }
            }
        }
    }

    Ok(())
}

/// Stream progress events to the terminal (bar) or stdout (JSON lines).
async fn render_progress(mut rx: progress::ProgressReceiver, json: bool) {
    let bar = if json {
        None
    } else {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("  [{bar:40.cyan/blue}] {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(bar)
    };

    while let Ok(event) = rx.recv().await {
        if json {
            if let Ok(line) = serde_json::to_string(&event) {
                println!("{line}");
            }
            continue;
        }
        if let Some(bar) = &bar {
            bar.set_position((event.fraction * 100.0) as u64);
            match &event.event {
                progress::ProgressKind::PhaseStarted { message, .. }
                | progress::ProgressKind::PhaseCompleted { message, .. } => {
                    bar.set_message(message.clone());
                }
                progress::ProgressKind::PageFetched { url, fetched, total, .. } => {
                    bar.set_message(format!("{fetched}/{total} {url}"));
                }
                progress::ProgressKind::Warning { message } => {
                    bar.set_message(format!("warning: {message}"));
                }
                progress::ProgressKind::AuditComplete { .. } => {
                    bar.finish_and_clear();
                }
            }
        }
    }

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
}
