use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cachetorrent_core::{
    ChannelTransport, Config, ControlTransport, Election, LoggingConfig, MultiElection, NodeId,
};

mod scenario;

use scenario::{LayerSummary, Population, ScenarioOptions};

#[derive(Parser)]
#[command(name = "cachetorrent")]
#[command(about = "Run a CacheTorrent leader election over a synthetic overlay", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of nodes joining the overlay
    #[arg(long, default_value = "200")]
    nodes: usize,

    /// Number of autonomous systems the nodes are spread over
    #[arg(long, default_value = "8")]
    partitions: usize,

    /// Percentage of nodes that register as candidates
    #[arg(long, default_value = "50", value_parser = clap::value_parser!(u32).range(0..=100))]
    candidate_ratio: u32,

    /// Overlay layers (overrides the configuration; >1 runs a multi-layer election)
    #[arg(long)]
    layers: Option<usize>,

    /// Quorum limit (overrides the configuration)
    #[arg(long)]
    quorum_limit: Option<usize>,

    /// Seed for node capacities
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Run the election even if the quorum was not reached
    #[arg(long)]
    force_election: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!(
            "cachetorrent={0},cachetorrent_core={0}",
            logging.level
        ))
    })?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format.as_str() {
        "json" => builder.json().init(),
        "compact" => builder.compact().init(),
        _ => builder.pretty().init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::from_env().context("building configuration from environment")?,
    };
    if let Some(layers) = cli.layers {
        config.election.layers = layers;
    }
    if let Some(limit) = cli.quorum_limit {
        config.election.quorum_limit = limit;
    }
    config.validate().context("invalid configuration")?;

    init_logging(&config.logging)?;

    let population = Population::generate(&ScenarioOptions {
        nodes: cli.nodes,
        partitions: cli.partitions,
        candidate_ratio: cli.candidate_ratio,
        seed: cli.seed,
    });
    info!(
        nodes = population.joins.len(),
        candidates = population.candidates.len(),
        quorum_limit = config.election.quorum_limit,
        layers = config.election.layers,
        "Generated overlay population"
    );
    if population.candidates.len() < config.election.quorum_limit && !cli.force_election {
        warn!("Not enough candidates to reach the quorum; pass --force-election to elect anyway");
    }

    let (transport, mut rx) = ChannelTransport::channel();
    let collector = tokio::spawn(async move {
        let mut deliveries: BTreeMap<NodeId, usize> = BTreeMap::new();
        while let Some(notification) = rx.recv().await {
            *deliveries.entry(notification.to).or_insert(0) += 1;
        }
        deliveries
    });

    let transport: Arc<dyn ControlTransport> = Arc::new(transport);
    let summaries = if config.election.layers > 1 {
        let multi = MultiElection::from_config(&config.election, transport)?;
        population.drive(&multi);
        if cli.force_election {
            for election in multi.layers() {
                election.run_election();
            }
        }
        multi
            .layers()
            .iter()
            .enumerate()
            .map(|(layer, election)| LayerSummary::of(layer, election))
            .collect::<Vec<_>>()
    } else {
        let election = Election::new(&config.election, transport)?;
        population.drive(&election);
        if cli.force_election {
            election.run_election();
        }
        vec![LayerSummary::of(0, &election)]
    };

    // Engines are gone, so the channel closes once the collector drains it
    let deliveries = collector.await.context("notification collector failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for summary in &summaries {
        println!(
            "layer {}: {} registrations, {}",
            summary.layer,
            summary.registrations,
            if summary.elected { "elected" } else { "quorum not reached" }
        );
        for partition in &summary.partitions {
            let leaders = match &partition.leaders {
                Some(leaders) => leaders
                    .iter()
                    .map(NodeId::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
                None => "-".to_string(),
            };
            println!(
                "  {:<8} members={:<4} candidates={:<4} leaders=[{}]",
                partition.partition.as_str(),
                partition.members,
                partition.candidates,
                leaders
            );
        }
    }
    println!(
        "{} notifications delivered to {} nodes",
        deliveries.values().sum::<usize>(),
        deliveries.len()
    );

    Ok(())
}
