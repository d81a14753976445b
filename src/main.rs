use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use do_logsink::config::Config;
use do_logsink::digitalocean::client::DoClient;
use do_logsink::digitalocean::http::format_api_error;
use do_logsink::logsink::LogsinkResource;
use do_logsink::provider::{parse_sink_type, Provider};
use do_logsink::schema::{ResourceData, Schema};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Manage DigitalOcean database logsinks
#[derive(Parser, Debug)]
#[command(name = "do-logsink", version = do_logsink::VERSION, about, long_about = None)]
struct Args {
    /// API token (defaults to DIGITALOCEAN_TOKEN, then the config file)
    #[arg(long, global = true)]
    token: Option<String>,

    /// API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(ClapArgs, Debug)]
struct Target {
    /// Sink type (rsyslog, elasticsearch, opensearch) or full resource name
    #[arg(short = 't', long = "type")]
    sink_type: String,

    /// State file holding the resource id and attributes
    #[arg(short, long, default_value = "logsink.state.json")]
    state: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a configuration and show the planned attributes
    Plan {
        #[command(flatten)]
        target: Target,
        /// Attribute file (.json, .yaml or .yml)
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Create a logsink from a configuration
    Create {
        #[command(flatten)]
        target: Target,
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Refresh a logsink's state from the API
    Read {
        #[command(flatten)]
        target: Target,
    },
    /// Apply a changed configuration, replacing the logsink if required
    Update {
        #[command(flatten)]
        target: Target,
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Delete a logsink
    Delete {
        #[command(flatten)]
        target: Target,
    },
    /// Adopt an existing logsink by its `cluster_id,logsink_id`
    Import {
        #[command(flatten)]
        target: Target,
        /// Composite id, e.g. `<cluster_id>,<logsink_id>`
        id: String,
    },
    /// Print the attributes of a resource or data source type
    Schema {
        /// Sink type, resource name or data source name
        #[arg(short = 't', long = "type")]
        sink_type: String,
    },
    /// Store the given --token and --api-url in the config file
    Configure,
    /// Show the account's database metrics credentials
    MetricsCredentials {
        #[arg(long)]
        cluster_id: String,
        /// Print the password instead of masking it
        #[arg(long)]
        show_password: bool,
    },
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("do-logsink started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("do-logsink").join("do-logsink.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".do-logsink").join("do-logsink.log");
    }
    PathBuf::from("do-logsink.log")
}

/// Read an attribute file; YAML when the extension says so, JSON otherwise
fn read_attributes(path: &Path) -> Result<Map<String, Value>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;

    let value: Value = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML in {:?}", path))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON in {:?}", path))?,
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(anyhow::anyhow!("{:?} must contain a mapping of attributes", path)),
    }
}

fn read_state(path: &Path) -> Result<ResourceData> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read state {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse state {:?}", path))
}

fn write_state(path: &Path, data: &ResourceData) -> Result<()> {
    let content = serde_json::to_string_pretty(data)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write state {:?}", path))
}

fn print_attributes(resource: &LogsinkResource, data: &ResourceData) -> Result<()> {
    let mut view = Map::new();
    view.insert("id".into(), Value::String(data.id().to_string()));
    view.extend(data.redacted(resource.schema()));
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn print_schema(name: &str, schema: &Schema) {
    println!("{}", name);
    for (attr, attribute) in schema.attributes() {
        let mode = match (attribute.required, attribute.computed) {
            (true, _) => "required",
            (_, true) => "computed",
            _ => "optional",
        };
        println!(
            "  {:<16} {:<8} {:?}{}{}  {}",
            attr,
            mode,
            attribute.attr_type,
            if attribute.force_new { " force-new" } else { "" },
            if attribute.sensitive { " sensitive" } else { "" },
            attribute.description
        );
    }
}

fn build_client(args: &Args, config: &Config) -> Result<DoClient> {
    let token = config.effective_token(args.token.as_deref()).unwrap_or_default();
    let api_url = config.effective_api_url(args.api_url.as_deref());
    tracing::info!("Using API endpoint: {}", api_url);
    DoClient::new(&api_url, &token)
}

fn lookup<'a>(provider: &'a Provider, sink_type: &str) -> Result<&'a LogsinkResource> {
    let sink_type = parse_sink_type(sink_type)?;
    provider
        .logsink(sink_type)
        .ok_or_else(|| anyhow::anyhow!("No resource registered for {}", sink_type))
}

async fn run(args: &Args) -> Result<()> {
    let config = Config::load();
    let provider = Provider::new();

    match &args.command {
        Command::Plan { target, config: cfg } => {
            let resource = lookup(&provider, &target.sink_type)?;
            let prior = target
                .state
                .exists()
                .then(|| read_state(&target.state))
                .transpose()?;

            let plan = resource.plan(prior.as_ref(), read_attributes(cfg)?)?;
            if plan.requires_replacement() {
                println!(
                    "# {} must be replaced ({} changed)",
                    resource.name(),
                    plan.requires_replace.join(", ")
                );
            }
            print_attributes(resource, &plan.planned)
        }
        Command::Create { target, config: cfg } => {
            let resource = lookup(&provider, &target.sink_type)?;
            let mut data = resource.plan(None, read_attributes(cfg)?)?.planned;

            let client = build_client(args, &config)?;
            resource.create(&client, &mut data).await?;

            write_state(&target.state, &data)?;
            print_attributes(resource, &data)
        }
        Command::Read { target } => {
            let resource = lookup(&provider, &target.sink_type)?;
            let mut data = read_state(&target.state)?;

            let client = build_client(args, &config)?;
            resource.read(&client, &mut data).await?;

            if data.is_absent() {
                println!("{} no longer exists", resource.name());
            } else {
                print_attributes(resource, &data)?;
            }
            write_state(&target.state, &data)
        }
        Command::Update { target, config: cfg } => {
            let resource = lookup(&provider, &target.sink_type)?;
            let mut prior = read_state(&target.state)?;
            let plan = resource.plan(Some(&prior), read_attributes(cfg)?)?;

            let client = build_client(args, &config)?;
            let mut data = plan.planned;
            if plan.requires_replace.is_empty() {
                resource.update(&client, &mut data).await?;
            } else {
                tracing::info!(
                    "Replacing {} {}: {} changed",
                    resource.name(),
                    prior.id(),
                    plan.requires_replace.join(", ")
                );
                resource.delete(&client, &mut prior).await?;
                resource.create(&client, &mut data).await?;
            }

            write_state(&target.state, &data)?;
            print_attributes(resource, &data)
        }
        Command::Delete { target } => {
            let resource = lookup(&provider, &target.sink_type)?;
            let mut data = read_state(&target.state)?;

            let client = build_client(args, &config)?;
            resource.delete(&client, &mut data).await?;

            write_state(&target.state, &data)?;
            println!("{} deleted", resource.name());
            Ok(())
        }
        Command::Import { target, id } => {
            let resource = lookup(&provider, &target.sink_type)?;
            let mut data = resource.import(id)?;

            let client = build_client(args, &config)?;
            resource.read(&client, &mut data).await?;
            if data.is_absent() {
                return Err(anyhow::anyhow!("Cannot import non-existent logsink {}", id));
            }

            write_state(&target.state, &data)?;
            print_attributes(resource, &data)
        }
        Command::Schema { sink_type } => {
            if let Some(data_source) = provider.data_source(sink_type) {
                print_schema(data_source.name(), data_source.schema());
                return Ok(());
            }
            let resource = lookup(&provider, sink_type)?;
            print_schema(resource.name(), resource.schema());
            Ok(())
        }
        Command::Configure => {
            let mut updated = config.clone();
            if let Some(token) = &args.token {
                updated.token = Some(token.clone());
            }
            if let Some(api_url) = &args.api_url {
                updated.api_url = Some(api_url.clone());
            }
            updated.save()?;
            match Config::config_path() {
                Some(path) => println!("Saved configuration to {:?}", path),
                None => println!("No config directory available; nothing saved"),
            }
            Ok(())
        }
        Command::MetricsCredentials {
            cluster_id,
            show_password,
        } => {
            let data_source = provider
                .data_source(do_logsink::datasource::METRICS_CREDENTIALS)
                .ok_or_else(|| anyhow::anyhow!("Metrics credentials data source missing"))?;

            let mut cfg = Map::new();
            cfg.insert("cluster_id".into(), Value::String(cluster_id.clone()));

            let client = build_client(args, &config)?;
            let data = data_source.read(&client, cfg).await?;

            println!("username: {}", data.str_or_empty("username"));
            if *show_password {
                println!("password: {}", data.str_or_empty("password"));
            } else {
                println!("password: <sensitive>");
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    if let Err(err) = run(&args).await {
        tracing::error!("{:#}", err);
        eprintln!("Error: {}", format_api_error(&err));
        std::process::exit(1);
    }

    Ok(())
}
