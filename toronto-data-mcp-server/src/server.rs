use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use thiserror::Error;
use tokio::io::{self, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use toronto_data::tools;
use toronto_data::{QuerySpec, TorontoDataClient, TorontoDataConfig, TorontoDataError};

const SERVER_NAME: &str = "toronto-data-mcp-server";
/// Protocol revision answered when the client does not name one
const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

pub struct TorontoDataMcpServer {
    client: TorontoDataClient,
}

impl TorontoDataMcpServer {
    pub async fn bootstrap() -> Result<(), ServerError> {
        let server = Self::new(TorontoDataConfig::from_env())?;
        server.run().await
    }

    fn new(config: TorontoDataConfig) -> Result<Self, ServerError> {
        let client = TorontoDataClient::with_config(config)?;
        tracing::info!(base_url = %client.config().base_url(), "catalog client configured");
        Ok(Self { client })
    }

    async fn run(self) -> Result<(), ServerError> {
        let reader = BufReader::new(io::stdin());
        let mut writer = BufWriter::new(io::stdout());
        let mut lines = reader.lines();

        tracing::info!("Toronto open data MCP server ready");

        while let Some(line) = lines.next_line().await? {
            if let Some(response) = self.handle_line(&line).await {
                write_response(&mut writer, &response).await?;
            }
        }

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Answer one input line. Blank lines and notifications get no reply.
    async fn handle_line(&self, line: &str) -> Option<Response> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        let value = match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("unparseable request: {err}");
                return Some(Response::error(None, ServerError::Json(err)));
            }
        };

        let request = match serde_json::from_value::<Request>(value) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!("invalid request: {err}");
                return Some(Response::error(
                    None,
                    ServerError::InvalidRequest(err.to_string()),
                ));
            }
        };

        let Some(id) = request.id else {
            tracing::debug!(method = %request.method, "notification received");
            return None;
        };

        match self.dispatch(&request.method, request.params).await {
            Ok(result) => Some(Response::success(id, result)),
            Err(err) => {
                tracing::warn!(method = %request.method, "request failed: {err}");
                Some(Response::error(Some(id), err))
            }
        }
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> ServerResult<Value> {
        match method {
            "initialize" => {
                let params: InitializeParams = parse_optional_params(method, params)?;
                if let Some(info) = &params.client_info {
                    tracing::info!(client = %info.name, version = ?info.version, "client connected");
                }
                to_value(InitializeResult::new(params.protocol_version))
            }
            "ping" | "shutdown" => Ok(json!({})),
            "tools/list" => {
                let params: ListToolsParams = parse_optional_params(method, params)?;
                let _ = params.cursor;
                to_value(ListToolsResult {
                    tools: tool_descriptors(),
                    next_cursor: None,
                })
            }
            "tools/call" => {
                let params: CallToolParams = parse_required_params(method, params)?;
                let text = self.call_tool(&params.name, params.arguments).await?;
                to_value(ToolResponse::text(text))
            }
            other => Err(ServerError::InvalidMethod(other.to_string())),
        }
    }

    async fn call_tool(&self, name: &str, arguments: Option<Value>) -> ServerResult<String> {
        tracing::debug!(tool = name, "tool call");
        let client = &self.client;

        let text = match name {
            tools::START_HERE => client.start_here(),
            tools::POPULAR_DATASETS => client.popular_datasets(),
            tools::LIST_DATASETS => client.list_datasets().await,
            tools::SEARCH_DATASETS => {
                let args: SearchArgs = parse_required_params(name, arguments)?;
                client.search_datasets(&args.query, args.limit).await
            }
            tools::DATASET_DETAILS => {
                let args: DatasetArgs = parse_required_params(name, arguments)?;
                client.dataset_details(&args.dataset_id).await
            }
            tools::DATASET_SCHEMA => {
                let args: DatasetArgs = parse_required_params(name, arguments)?;
                client.dataset_schema(&args.dataset_id).await
            }
            tools::SMART_DATA_HELPER => {
                let args: HelperArgs = parse_required_params(name, arguments)?;
                client
                    .smart_data_helper(&args.dataset_id, &args.user_question, args.limit)
                    .await
            }
            tools::QUERY_DATASET => {
                let args: QueryArgs = parse_required_params(name, arguments)?;
                client.query_dataset(&args.dataset_id, &args.spec).await
            }
            tools::DATASET_STATS => {
                let args: DatasetArgs = parse_required_params(name, arguments)?;
                client.dataset_stats(&args.dataset_id).await
            }
            tools::FETCH_CSV => {
                let args: FetchArgs = parse_required_params(name, arguments)?;
                client.fetch_file(&args.csv_url, args.max_lines).await
            }
            other => return Err(ServerError::InvalidMethod(other.to_string())),
        };

        Ok(text)
    }
}

async fn write_response<W>(writer: &mut W, response: &Response) -> ServerResult<()>
where
    W: AsyncWrite + Unpin,
{
    let payload = serde_json::to_string(response).map_err(ServerError::Serialization)?;
    writer.write_all(payload.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

fn to_value<T: Serialize>(value: T) -> ServerResult<Value> {
    serde_json::to_value(value).map_err(ServerError::Serialization)
}

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default, rename = "jsonrpc")]
    _jsonrpc: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Option<Value>,
}

#[derive(Debug, Serialize)]
struct Response {
    jsonrpc: &'static str,
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ResponseError>,
}

impl Response {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Option<Value>, error: ServerError) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(ResponseError::from(error)),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResponseError {
    code: i32,
    message: String,
}

impl From<ServerError> for ResponseError {
    fn from(err: ServerError) -> Self {
        let code = match &err {
            ServerError::InvalidRequest(_) => -32600,
            ServerError::InvalidMethod(_) => -32601,
            ServerError::InvalidParams(_) => -32602,
            ServerError::Json(_) => -32700,
            ServerError::Io(_) => -32020,
            ServerError::Client(_) | ServerError::Serialization(_) => -32603,
        };
        let message = match err {
            ServerError::InvalidMethod(method) => format!("Unknown method: {method}"),
            other => other.to_string(),
        };
        Self { code, message }
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("unknown method: {0}")]
    InvalidMethod(String),
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Client(#[from] TorontoDataError),
    #[error("serialization error: {0}")]
    Serialization(serde_json::Error),
}

type ServerResult<T> = Result<T, ServerError>;

fn parse_required_params<T>(method: &str, params: Option<Value>) -> ServerResult<T>
where
    T: DeserializeOwned,
{
    match params {
        Some(value) => serde_json::from_value(value)
            .map_err(|err| ServerError::InvalidParams(format!("{method}: {err}"))),
        None => Err(ServerError::InvalidParams(format!(
            "{method}: missing parameters"
        ))),
    }
}

fn parse_optional_params<T>(method: &str, params: Option<Value>) -> ServerResult<T>
where
    T: DeserializeOwned + Default,
{
    match params {
        Some(Value::Null) | None => Ok(T::default()),
        Some(value) => serde_json::from_value(value)
            .map_err(|err| ServerError::InvalidParams(format!("{method}: {err}"))),
    }
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct DatasetArgs {
    dataset_id: String,
}

#[derive(Debug, Deserialize)]
struct HelperArgs {
    dataset_id: String,
    #[serde(default)]
    user_question: String,
    #[serde(default)]
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct QueryArgs {
    dataset_id: String,
    #[serde(flatten)]
    spec: QuerySpec,
}

#[derive(Debug, Deserialize)]
struct FetchArgs {
    csv_url: String,
    #[serde(default)]
    max_lines: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct InitializeParams {
    #[serde(default, rename = "protocolVersion")]
    protocol_version: Option<String>,
    #[serde(default, rename = "clientInfo")]
    client_info: Option<ClientInfo>,
}

#[derive(Debug, Deserialize)]
struct ClientInfo {
    name: String,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Serialize)]
struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    protocol_version: String,
    capabilities: Value,
    #[serde(rename = "serverInfo")]
    server_info: ServerInfo,
}

impl InitializeResult {
    fn new(protocol_version: Option<String>) -> Self {
        Self {
            protocol_version: protocol_version
                .unwrap_or_else(|| DEFAULT_PROTOCOL_VERSION.to_string()),
            capabilities: json!({ "tools": {} }),
            server_info: ServerInfo {
                name: SERVER_NAME,
                version: env!("CARGO_PKG_VERSION"),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ServerInfo {
    name: &'static str,
    version: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct ListToolsParams {
    #[serde(default)]
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Debug, Serialize)]
struct ListToolsResult {
    tools: Vec<ToolDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "nextCursor")]
    next_cursor: Option<String>,
}

#[derive(Debug, Serialize)]
struct ToolDescriptor {
    name: &'static str,
    description: &'static str,
    #[serde(rename = "inputSchema")]
    input_schema: Value,
}

/// Tool results stay textual: one text block per call
#[derive(Debug, Serialize)]
struct ToolResponse {
    content: Vec<ToolContent>,
}

impl ToolResponse {
    fn text(text: String) -> Self {
        Self {
            content: vec![ToolContent::Text { text }],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

fn no_arguments() -> Value {
    json!({"type": "object", "properties": {}, "additionalProperties": false})
}

fn dataset_id_only() -> Value {
    json!({
        "type": "object",
        "properties": {
            "dataset_id": {"type": "string", "description": "Dataset name, e.g. dinesafe"}
        },
        "required": ["dataset_id"],
        "additionalProperties": false
    })
}

fn tool_descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: tools::START_HERE,
            description: "START HERE: the recommended workflow for finding and reading Toronto open data",
            input_schema: no_arguments(),
        },
        ToolDescriptor {
            name: tools::POPULAR_DATASETS,
            description: "Curated list of popular Toronto datasets grouped by theme",
            input_schema: no_arguments(),
        },
        ToolDescriptor {
            name: tools::LIST_DATASETS,
            description: "List every dataset in the catalog with a short description (slow: one lookup per dataset)",
            input_schema: no_arguments(),
        },
        ToolDescriptor {
            name: tools::SEARCH_DATASETS,
            description: "Search Toronto datasets by keyword",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Keywords, e.g. restaurant inspections"},
                    "limit": {"type": "integer", "minimum": 1, "maximum": 1000, "description": "Maximum datasets to return (default 10)"}
                },
                "required": ["query"],
                "additionalProperties": false
            }),
        },
        ToolDescriptor {
            name: tools::DATASET_DETAILS,
            description: "Dataset metadata with every resource, its format and download URL",
            input_schema: dataset_id_only(),
        },
        ToolDescriptor {
            name: tools::DATASET_SCHEMA,
            description: "Exact field names and types of a dataset's live datastore table",
            input_schema: dataset_id_only(),
        },
        ToolDescriptor {
            name: tools::SMART_DATA_HELPER,
            description: "One-call overview: detects API data or downloadable files and shows samples",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "dataset_id": {"type": "string", "description": "Dataset name, e.g. dinesafe"},
                    "user_question": {"type": "string", "description": "What you want to find out"},
                    "limit": {"type": "integer", "minimum": 0, "description": "Sample records to show (default 10)"}
                },
                "required": ["dataset_id"],
                "additionalProperties": false
            }),
        },
        ToolDescriptor {
            name: tools::QUERY_DATASET,
            description: "Filter, sort and project records of a dataset's live datastore table",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "dataset_id": {"type": "string", "description": "Dataset name, e.g. dinesafe"},
                    "filters": {"type": "object", "description": "Exact-match filters, field name to value (case-sensitive)"},
                    "fields": {"type": "array", "items": {"type": "string"}, "description": "Fields to return"},
                    "limit": {"type": "integer", "minimum": 0, "description": "Maximum records (default 10)"},
                    "sort": {"type": "string", "description": "\"field asc\" or \"field desc\""}
                },
                "required": ["dataset_id"],
                "additionalProperties": false
            }),
        },
        ToolDescriptor {
            name: tools::DATASET_STATS,
            description: "Record count and field list of a dataset, or its downloadable files",
            input_schema: dataset_id_only(),
        },
        ToolDescriptor {
            name: tools::FETCH_CSV,
            description: "Read the first lines of a CSV or text file by URL",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "csv_url": {"type": "string", "description": "http:// or https:// URL of the file"},
                    "max_lines": {"type": "integer", "minimum": 0, "description": "Lines to read (default 50)"}
                },
                "required": ["csv_url"],
                "additionalProperties": false
            }),
        },
    ]
}
