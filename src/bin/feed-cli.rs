use std::path::{Path, PathBuf};

use bytes::Bytes;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use feed_gateway::client::{ClientError, GatewayClient, Invocation};
use feed_gateway::payload::{MimeType, PayloadList};

#[derive(Parser)]
#[command(name = "feed-cli")]
#[command(about = "Command line client for the Feed Gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(long, default_value = "/api/v1")]
    prefix: String,

    /// Correlation id to send; the gateway generates one when omitted.
    #[arg(short, long)]
    correlation_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Invoke a consumer
    Invoke {
        /// Consumer name (path after the API prefix)
        consumer: String,

        /// Text field, `name=value`
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// File field, `name=path[@content/type]`
        #[arg(short = 'f', long = "file", value_parser = parse_file)]
        files: Vec<FileArg>,

        /// Directory receiving returned payloads that carry a filename
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone)]
struct FileArg {
    name: String,
    path: PathBuf,
    content_type: MimeType,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))
}

fn parse_file(raw: &str) -> Result<FileArg, String> {
    let (name, rest) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=path[@type], got '{}'", raw))?;
    let (path, content_type) = match rest.rsplit_once('@') {
        Some((path, ct)) if ct.contains('/') => {
            let mime = ct.parse::<MimeType>().map_err(|e| format!("invalid content type '{}': {}", ct, e))?;
            (path, mime)
        }
        _ => (rest, MimeType::application_octet_stream()),
    };
    Ok(FileArg {
        name: name.to_string(),
        path: PathBuf::from(path),
        content_type,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = GatewayClient::new(cli.url).with_prefix(cli.prefix);

    match cli.command {
        Commands::Invoke {
            consumer,
            params,
            files,
            out,
        } => {
            let mut builder = PayloadList::builder();
            for (name, value) in params {
                builder.add_text(name, value)?;
            }
            for file in files {
                let content = Bytes::from(tokio::fs::read(&file.path).await?);
                let filename = file.path.to_string_lossy().into_owned();
                builder.add_file(file.name, content, file.content_type, filename)?;
            }

            match client
                .invoke(&consumer, &builder.build(), cli.correlation_id.as_deref())
                .await
            {
                Ok(invocation) => {
                    if let Some(dir) = &out {
                        write_payloads(dir, &invocation.payloads).await?;
                    }
                    println!("{}", serde_json::to_string_pretty(&summary(&invocation))?);
                }
                Err(ClientError::Status {
                    status,
                    message,
                    correlation_id,
                }) => {
                    eprintln!("Error: gateway returned status {}", status);
                    eprintln!("Correlation id: {}", correlation_id.as_deref().unwrap_or("none"));
                    eprintln!("Response: {}", message);
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

fn summary(invocation: &Invocation) -> Value {
    let payloads: Vec<Value> = invocation
        .payloads
        .iter()
        .map(|p| {
            json!({
                "name": p.name(),
                "content_type": p.content_type().to_string(),
                "filename": p.filename(),
                "bytes": p.as_bytes().len(),
                "text": p.as_text(),
            })
        })
        .collect();
    json!({
        "status": invocation.status,
        "correlation_id": invocation.correlation_id,
        "payloads": payloads,
    })
}

async fn write_payloads(dir: &Path, payloads: &PayloadList) -> Result<(), std::io::Error> {
    tokio::fs::create_dir_all(dir).await?;
    for payload in payloads {
        if let Some(name) = payload.file_base_name().filter(|n| !matches!(*n, "" | "." | "..")) {
            let target = dir.join(name);
            tokio::fs::write(&target, payload.as_bytes()).await?;
            eprintln!("Wrote {}", target.display());
        }
    }
    Ok(())
}
