use clap::{Parser, Subcommand, ValueEnum};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "logctl")]
#[command(about = "Management CLI for the logrelay logging API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Sent as the X-API-Key header, for hosts that put auth in front of the API.
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enable or disable debug logging
    Debug {
        #[arg(long, conflicts_with = "disable", required_unless_present = "disable")]
        enable: bool,
        #[arg(long)]
        disable: bool,
    },
    /// Show the most recent log lines
    Tail {
        #[arg(short = 'n', long, default_value_t = 100)]
        lines: u64,
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Show lines from the last N minutes
    Since {
        #[arg(short, long)]
        minutes: u64,
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Show lines between two RFC 3339 instants
    Range {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Jsonpretty,
    Csv,
    Text,
}

impl Format {
    fn as_str(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Jsonpretty => "jsonpretty",
            Format::Csv => "csv",
            Format::Text => "text",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert("X-API-Key", HeaderValue::from_str(key)?);
    }

    let base = cli.url.trim_end_matches('/');
    let res = match cli.command {
        Commands::Debug { enable, .. } => {
            client
                .post(format!("{}/api/loggersettings/debug", base))
                .headers(headers)
                .header(CONTENT_TYPE, "application/json")
                .body(json!({ "enabled": enable }).to_string())
                .send()
                .await?
        }
        Commands::Tail { lines, format } => {
            client
                .get(format!("{}/api/logging/log", base))
                .headers(headers)
                .query(&[("last_lines", lines.to_string()), ("format", format.as_str().to_string())])
                .send()
                .await?
        }
        Commands::Since { minutes, format } => {
            client
                .get(format!("{}/api/logging/log", base))
                .headers(headers)
                .query(&[("last_minutes", minutes.to_string()), ("format", format.as_str().to_string())])
                .send()
                .await?
        }
        Commands::Range { from, to, format } => {
            let mut body = json!({ "format": format.as_str() });
            if let Some(from) = from {
                body["from_time"] = Value::String(from);
            }
            if let Some(to) = to {
                body["to_time"] = Value::String(to);
            }
            client
                .post(format!("{}/api/logging/log", base))
                .headers(headers)
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_string())
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let is_json = res
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: logging API returned status {}", status);
        eprintln!("Response: {}", text.trim_end());
        std::process::exit(1);
    }

    if is_json {
        if let Ok(json) = serde_json::from_str::<Value>(&text) {
            println!("{}", serde_json::to_string_pretty(&json)?);
            return Ok(());
        }
    }
    print!("{}", text);
    Ok(())
}
