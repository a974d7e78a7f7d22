use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use llm_gateway::{AnthropicClient, GatewayConfig, LlmService};
use verdict_engine::{
    CabinClass, EmbeddedAirports, EngineConfig, ItemParams, Itinerary, PreviewState,
    RegulationIndex, RegulationStore, Segment, Taxonomy,
};
use verdict_engine_classifier::{ClassifierConfig, ItemClassifier};
use verdict_engine_narrator::{DecisionNarrator, NarratorConfig};
use verdict_engine_preview::{PreviewConfig, PreviewRequest, PreviewResponse, PreviewService};

#[derive(Parser)]
#[command(name = "verdict-preview", version, about = "Baggage advisor preview pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Preview one item against an itinerary
    Preview(PreviewArgs),

    /// Preview a stream of JSON requests from stdin, one per line.
    /// SIGHUP reloads the regulation index between requests.
    Batch,

    /// Validate a regulation data directory
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },

    /// Inspect the taxonomy
    Taxonomy {
        #[command(subcommand)]
        command: TaxonomyCommands,
    },
}

#[derive(Args)]
struct PreviewArgs {
    /// Free-text item label, e.g. "hair spray 350ml"
    label: String,

    /// Origin airport code
    #[arg(long = "from", value_name = "IATA")]
    origin: String,

    /// Destination airport code
    #[arg(long = "to", value_name = "IATA")]
    destination: String,

    /// Via-point airport codes, repeatable
    #[arg(long = "via", value_name = "IATA")]
    via: Vec<String>,

    /// The itinerary re-screens carry-on at a via-point
    #[arg(long)]
    rescreening: bool,

    /// Operating carrier code for the trip's segments
    #[arg(long)]
    carrier: Option<String>,

    /// Cabin class: economy, business, first, or prestige
    #[arg(long)]
    cabin: Option<String>,

    /// Fare class letter
    #[arg(long)]
    fare: Option<String>,

    /// BCP-47 locale of the label
    #[arg(long)]
    locale: Option<String>,

    #[arg(long = "volume-ml")]
    volume_ml: Option<f64>,

    #[arg(long)]
    wh: Option<f64>,

    #[arg(long)]
    count: Option<f64>,

    #[arg(long = "weight-kg")]
    weight_kg: Option<f64>,

    #[arg(long = "abv-percent")]
    abv_percent: Option<f64>,

    #[arg(long = "blade-cm")]
    blade_length_cm: Option<f64>,

    /// The item was bought duty-free past security
    #[arg(long = "duty-free")]
    duty_free: bool,

    /// Print the full response as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum RulesCommands {
    /// Load every rule file and report what was indexed
    Validate {
        /// Data directory (defaults to ADVISOR_REGULATIONS_DIR)
        dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum TaxonomyCommands {
    /// List every canonical key with its required parameters
    List,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Preview(args) => run_preview(args),
        Commands::Batch => run_batch(),
        Commands::Rules {
            command: RulesCommands::Validate { dir },
        } => run_rules_validate(dir),
        Commands::Taxonomy {
            command: TaxonomyCommands::List,
        } => run_taxonomy_list(),
    };
    process::exit(code);
}

fn run_rules_validate(dir: Option<PathBuf>) -> i32 {
    let dir = dir.unwrap_or_else(|| EngineConfig::from_env().regulations_dir);
    match RegulationIndex::load_dir(&dir) {
        Ok(index) => {
            println!(
                "ok: {} rules across {} files in {}",
                index.rule_count(),
                index.file_count(),
                dir.display()
            );
            0
        }
        Err(err) => {
            eprintln!("invalid regulation data: {err}");
            1
        }
    }
}

fn run_taxonomy_list() -> i32 {
    let taxonomy = match load_taxonomy() {
        Ok(taxonomy) => taxonomy,
        Err(code) => return code,
    };
    for entry in taxonomy.iter() {
        let required: Vec<&str> = entry.required.iter().map(|p| p.as_str()).collect();
        let required = if required.is_empty() {
            "-".to_string()
        } else if entry.required_any {
            format!("any of {}", required.join(","))
        } else {
            required.join(",")
        };
        println!("{}\t{}\t{}", entry.key, entry.family, required);
    }
    0
}

fn load_taxonomy() -> Result<Taxonomy, i32> {
    let config = EngineConfig::from_env();
    let loaded = match &config.taxonomy_path {
        Some(path) => Taxonomy::load_from(path),
        None => Taxonomy::load_default(),
    };
    loaded.map_err(|err| {
        eprintln!("taxonomy error: {err}");
        1
    })
}

/// Assemble the full pipeline from environment configuration.
fn build_service() -> Result<PreviewService, i32> {
    let engine_config = EngineConfig::from_env();
    let taxonomy = Arc::new(load_taxonomy()?);
    let store = match RegulationStore::open(&engine_config.regulations_dir) {
        Ok(store) => Arc::new(store),
        Err(err) => {
            eprintln!("regulation data error: {err}");
            return Err(1);
        }
    };

    let gateway_config = GatewayConfig::from_env();
    // Without an API key the pipeline still runs and takes the
    // documented llm_error fallback, so the CLI works offline.
    let llm: Arc<dyn LlmService> = match AnthropicClient::new(&gateway_config) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            tracing::warn!(error = %err, "model client unavailable");
            Arc::new(UnconfiguredLlm)
        }
    };

    let classifier =
        ItemClassifier::new(llm.clone(), taxonomy.clone(), ClassifierConfig::from_env());
    let narrator_config = NarratorConfig::from_env();
    let narrator = (narrator_config.enabled && gateway_config.has_api_key())
        .then(|| DecisionNarrator::new(llm.clone(), narrator_config));

    Ok(PreviewService::new(
        classifier,
        narrator,
        taxonomy,
        store,
        Arc::new(EmbeddedAirports::new()),
        engine_config,
        PreviewConfig::from_env(),
    ))
}

fn run_preview(args: PreviewArgs) -> i32 {
    let cabin_class = match args.cabin.as_deref() {
        None | Some("economy") => CabinClass::Economy,
        Some("business") => CabinClass::Business,
        Some("first") => CabinClass::First,
        Some("prestige") => CabinClass::Prestige,
        Some(other) => {
            eprintln!("unknown cabin class '{other}'");
            return 1;
        }
    };

    let segments = match args.carrier {
        Some(carrier) => vec![Segment {
            carrier,
            cabin_class,
            fare_class: args.fare,
        }],
        None => Vec::new(),
    };

    let params = ItemParams {
        volume_ml: args.volume_ml,
        wh: args.wh,
        count: args.count,
        weight_kg: args.weight_kg,
        abv_percent: args.abv_percent,
        blade_length_cm: args.blade_length_cm,
    };

    let request = PreviewRequest {
        label: args.label,
        locale: args.locale,
        req_id: None,
        itinerary: Itinerary {
            origin: args.origin,
            via: args.via,
            destination: args.destination,
            has_rescreening: args.rescreening,
        },
        segments,
        item_params: (!params.is_empty()).then_some(params),
        duty_free: args.duty_free,
    };

    let service = match build_service() {
        Ok(service) => service,
        Err(code) => return code,
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("runtime error: {err}");
            return 1;
        }
    };
    let response = runtime.block_on(service.preview(&request));

    if args.json {
        match serde_json::to_string_pretty(&response) {
            Ok(body) => println!("{body}"),
            Err(err) => {
                eprintln!("serialization error: {err}");
                return 1;
            }
        }
    } else {
        print_human(&response);
    }

    match response.state {
        PreviewState::Complete => 0,
        PreviewState::NeedsReview => 2,
    }
}

fn run_batch() -> i32 {
    let service = match build_service() {
        Ok(service) => Arc::new(service),
        Err(code) => return code,
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("runtime error: {err}");
            return 1;
        }
    };

    runtime.block_on(async {
        #[cfg(unix)]
        {
            let service = service.clone();
            tokio::spawn(async move {
                let mut hangup = match tokio::signal::unix::signal(
                    tokio::signal::unix::SignalKind::hangup(),
                ) {
                    Ok(hangup) => hangup,
                    Err(err) => {
                        tracing::warn!(error = %err, "cannot install SIGHUP handler");
                        return;
                    }
                };
                while hangup.recv().await.is_some() {
                    match service.reload_rules() {
                        Ok((files, rules)) => {
                            tracing::info!(files, rules, "regulation index reloaded")
                        }
                        Err(err) => tracing::error!(error = %err, "reload failed"),
                    }
                }
            });
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<PreviewRequest>(line) {
                        Ok(request) => {
                            let response = service.preview(&request).await;
                            match serde_json::to_string(&response) {
                                Ok(body) => println!("{body}"),
                                Err(err) => eprintln!("serialization error: {err}"),
                            }
                        }
                        Err(err) => eprintln!("bad request line: {err}"),
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    eprintln!("stdin error: {err}");
                    return 1;
                }
            }
        }
        0
    })
}

fn print_human(response: &PreviewResponse) {
    println!("item:     {}", response.engine.canonical);
    println!(
        "state:    {}",
        match response.state {
            PreviewState::Complete => "complete",
            PreviewState::NeedsReview => "needs review",
        }
    );
    for (bag, verdict) in [
        ("carry-on", &response.resolved.carry_on),
        ("checked", &response.resolved.checked),
    ] {
        println!("{bag:9} {}", verdict.status.as_str());
        for badge in &verdict.badges {
            println!("          - {badge}");
        }
    }
    let flags = &response.flags;
    if flags.any() {
        let mut raised = Vec::new();
        if flags.llm_error {
            raised.push("llm_error");
        }
        if flags.validation_error {
            raised.push("validation_error");
        }
        if flags.low_confidence {
            raised.push("low_confidence");
        }
        if flags.conflict {
            raised.push("conflict");
        }
        if flags.override_review {
            raised.push("override");
        }
        if !flags.missing_params.is_empty() {
            raised.push("missing_params");
        }
        println!("flags:    {}", raised.join(", "));
        for param in &flags.missing_params {
            println!("          missing {param}");
        }
    }
    if !response.narration.is_empty() {
        println!("\n{}", response.narration.title);
        for bullet in &response.narration.bullets {
            println!("  • {bullet}");
        }
        if let Some(footnote) = &response.narration.footnote {
            println!("  {footnote}");
        }
    }
}

/// Stand-in LLM when no API key is configured; every call reports the
/// gateway as unavailable.
struct UnconfiguredLlm;

#[async_trait::async_trait]
impl LlmService for UnconfiguredLlm {
    async fn complete(
        &self,
        _req: llm_gateway::CompletionRequest,
    ) -> Result<llm_gateway::CompletionResponse, llm_gateway::GatewayError> {
        Err(llm_gateway::GatewayError::MissingApiKey)
    }
}
