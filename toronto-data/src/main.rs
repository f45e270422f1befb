use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tracing_subscriber::{EnvFilter, fmt};

use toronto_data::{QuerySpec, TorontoDataClient, TorontoDataConfig};

/// Command-line access to the City of Toronto open data catalog
#[derive(Debug, Parser)]
#[command(name = "toronto-data", version, about)]
struct Cli {
    /// CKAN action API base, overrides TORONTO_OPEN_DATA_BASE_URL
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the recommended workflow
    Start,
    /// Show curated datasets by theme
    Popular,
    /// List every dataset in the catalog
    List,
    /// Search datasets by keyword
    Search {
        query: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show a dataset with all of its resources
    Show { dataset_id: String },
    /// Show the field names and types of a dataset's live table
    Schema { dataset_id: String },
    /// Overview of a dataset with sample rows or a file preview
    Helper {
        dataset_id: String,
        #[arg(long, default_value = "")]
        question: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Query a dataset's live table
    Query {
        dataset_id: String,
        /// Exact-match filter, repeatable
        #[arg(long = "filter", value_name = "FIELD=VALUE", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
        /// Field to include in the output, repeatable
        #[arg(long = "field", value_name = "FIELD")]
        fields: Vec<String>,
        #[arg(long)]
        limit: Option<u32>,
        /// Sort expression, e.g. "Inspection Date desc"
        #[arg(long)]
        sort: Option<String>,
    },
    /// Record count and fields of a dataset
    Stats { dataset_id: String },
    /// Print the first lines of a remote CSV or text file
    Fetch {
        url: String,
        #[arg(long)]
        max_lines: Option<usize>,
    },
}

fn parse_filter(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected FIELD=VALUE, got '{}'", arg)),
    }
}

fn query_spec(
    filters: Vec<(String, String)>,
    fields: Vec<String>,
    limit: Option<u32>,
    sort: Option<String>,
) -> QuerySpec {
    let filters = (!filters.is_empty()).then(|| {
        filters
            .into_iter()
            .map(|(field, value)| (field, Value::String(value)))
            .collect::<Map<String, Value>>()
    });
    QuerySpec {
        filters,
        fields: (!fields.is_empty()).then_some(fields),
        limit,
        sort,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = TorontoDataConfig::from_env();
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }
    let client = TorontoDataClient::with_config(config)?;

    let report = match cli.command {
        Command::Start => client.start_here(),
        Command::Popular => client.popular_datasets(),
        Command::List => client.list_datasets().await,
        Command::Search { query, limit } => client.search_datasets(&query, limit).await,
        Command::Show { dataset_id } => client.dataset_details(&dataset_id).await,
        Command::Schema { dataset_id } => client.dataset_schema(&dataset_id).await,
        Command::Helper {
            dataset_id,
            question,
            limit,
        } => client.smart_data_helper(&dataset_id, &question, limit).await,
        Command::Query {
            dataset_id,
            filters,
            fields,
            limit,
            sort,
        } => {
            let spec = query_spec(filters, fields, limit, sort);
            client.query_dataset(&dataset_id, &spec).await
        }
        Command::Stats { dataset_id } => client.dataset_stats(&dataset_id).await,
        Command::Fetch { url, max_lines } => client.fetch_file(&url, max_lines).await,
    };

    println!("{}", report);
    Ok(())
}
