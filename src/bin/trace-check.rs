use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use themeweaver::config::load_config;
use themeweaver::observability::span::RecordedSpan;
use themeweaver::observability::{RequestDescriptor, SpanEnricher, TraceParent};
use themeweaver::routing::Whitelist;

#[derive(Parser)]
#[command(name = "trace-check")]
#[command(about = "Inspect HTTP tracing decisions for a Themeweaver config", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether a request would be traced and how its span is named
    Check {
        #[arg(short, long)]
        config: PathBuf,
        method: String,
        path: String,
    },
    /// Print a fresh sampled traceparent header value
    Traceparent,
    /// Post a trace payload to a running server's relay endpoint
    Send {
        #[arg(short, long, default_value = "http://localhost:3000")]
        url: String,
        payload: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config, method, path } => {
            let config = load_config(&config)?;
            let whitelist = Arc::new(Whitelist::new(
                config.otel.server.http_tracing.whitelisted_urls.iter().cloned(),
                &config.app.base_url,
            ));
            let enricher = SpanEnricher::new(config.app.name.clone(), whitelist.clone());

            let request = RequestDescriptor::inbound(Some(&method), Some(&path));
            let result = whitelist.match_path(request.path());
            println!("path:        {}", request.path());
            println!("base path:   {}", whitelist.base_path());
            println!("whitelisted: {}", result.matched);
            if let Some(pattern) = result.matched_pattern {
                println!("pattern:     {}", pattern);
            }
            if !config.otel.server.enable {
                println!("note:        server tracing is disabled in this config");
            }

            if result.matched {
                let mut span = RecordedSpan::default();
                enricher.enrich(&mut span, &request);
                println!("span name:   {}", span.name);
                for (key, value) in &span.attributes {
                    println!("  {} = {}", key, value);
                }
            }
        }
        Commands::Traceparent => {
            println!("{}", TraceParent::generate());
        }
        Commands::Send { url, payload } => {
            let body = std::fs::read(&payload)?;
            let res = reqwest::Client::new()
                .post(format!("{}/api/traces", url.trim_end_matches('/')))
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        eprintln!("Response: {}", text);
        return Ok(());
    }
    println!("{}", text);
    Ok(())
}
