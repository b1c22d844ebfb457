// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, controlled by RUST_LOG or --verbose)
// 3. Dispatch to the appropriate subcommand handler
// 4. Print the results as a table or JSON
// 5. Exit with proper code (0 = success, 1 = broken links, 2 = error)
// =============================================================================

mod cli; // src/cli.rs - command-line parsing

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ScanArgs};
use md_link_guardian::checker::{HttpChecker, LinkCheckResult, LinkStatus};
use md_link_guardian::extract::{extract_links, LinkKind};
use md_link_guardian::scan::{scan, ScanReport};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain: "Scan failed: Path not found: x"
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = no broken links
//   Ok(1) = broken links found
//   Err = the scan could not run (exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Scan(args) => handle_scan(args, cli.verbose).await,
        Commands::Extract { file, json } => handle_extract(&file, json).await,
    }
}

// Logs go to stderr so they never mix with the report (or JSON) on stdout
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "warn,md_link_guardian=debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// Handles the 'scan' subcommand
async fn handle_scan(args: ScanArgs, verbose: bool) -> Result<i32> {
    let config = args.to_config().context("Invalid configuration")?;

    if !args.json {
        println!("🔍 Scanning markdown files in: {}", args.dir.display());
        if config.offline {
            println!("📴 Offline mode: only relative links are checked");
        }
    }

    let checker = HttpChecker::new(&config).context("Failed to set up HTTP checker")?;
    let report = scan(&args.dir, &config, &checker)
        .await
        .context("Scan failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, verbose);
    }

    if report.has_broken() {
        Ok(1) // Exit code 1 = broken links found
    } else {
        Ok(0) // Exit code 0 = all good
    }
}

// Handles the 'extract' subcommand
async fn handle_extract(file: &Path, json: bool) -> Result<i32> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    let links = extract_links(&content);

    if json {
        println!("{}", serde_json::to_string_pretty(&links)?);
    } else {
        for link in &links {
            let kind = match link.kind {
                LinkKind::Absolute => "absolute",
                LinkKind::Relative => "relative",
            };
            println!("{:<10} {}", kind, link.target);
        }
    }

    Ok(0)
}

// Prints the scan as one table per file, followed by a summary
//
// Only problems are listed unless --verbose is given.
fn print_report(report: &ScanReport, verbose: bool) {
    println!("📄 Scanned {} file(s)\n", report.files.len());

    for file in &report.files {
        let shown: Vec<&LinkCheckResult> = if verbose {
            file.results.iter().collect()
        } else {
            file.broken().collect()
        };
        if shown.is_empty() {
            continue;
        }

        println!("{}", file.file.display());
        println!("{:<60} {:<24} {:<30}", "LINK", "STATUS", "MESSAGE");
        println!("{}", "=".repeat(114));
        for result in shown {
            let message = result.message.as_deref().unwrap_or("");
            println!(
                "{:<60} {:<24} {:<30}",
                truncate(&result.url, 57),
                format_status(&result.status),
                message
            );
        }
        println!();
    }

    let ok_count = report.checked - report.broken;

    println!("📊 Summary:");
    println!("   ✅ OK: {}", ok_count);
    println!("   ❌ Broken: {}", report.broken);
    if report.excluded > 0 {
        println!("   🚫 Excluded: {}", report.excluded);
    }
    if report.skipped > 0 {
        println!("   📴 Skipped (offline): {}", report.skipped);
    }
    println!("   📋 Total checked: {}", report.checked);
}

// Cuts long links for the table; counts characters so multi-byte
// text never gets split in half
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max).collect::<String>())
    }
}

fn format_status(status: &LinkStatus) -> String {
    match status {
        LinkStatus::Ok => "✅ OK".to_string(),
        LinkStatus::Redirect { .. } => "🔀 REDIRECT".to_string(),
        LinkStatus::Broken => "❌ BROKEN".to_string(),
        LinkStatus::Timeout => "⏱️  TIMEOUT".to_string(),
        LinkStatus::SslError => "🔒 SSL ERROR".to_string(),
        LinkStatus::TooManyRedirects => "🔁 TOO MANY REDIRECTS".to_string(),
        LinkStatus::DnsError => "🌐 DNS ERROR".to_string(),
        LinkStatus::Error => "⚠️  ERROR".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a very long string", 7), "this is...");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }
}
