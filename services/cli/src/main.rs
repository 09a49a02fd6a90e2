use anyhow::Context;
use clap::{Parser, Subcommand};
use leetmigo_core::{
    NavigatorState, Sampler, Subject, assemble, outline::render_outline, tools::NavigatorService,
};
use rmcp::ServiceExt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod walk;

#[derive(Parser)]
#[command(name = "leetmigo", version)]
#[command(about = "Walk decision trees of algorithm patterns")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the subjects and their first choices
    Subjects,
    /// Print a subject tree, or the whole map
    Outline {
        /// Subject name, e.g. "Edge Lists"
        subject: Option<Subject>,

        /// Only draw this many levels
        #[arg(short, long)]
        depth: Option<usize>,
    },
    /// Draw a random subject with its code stripped and print it as JSON
    Sample {
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Walk the map interactively on stdin
    Walk,
    /// Serve the navigator tools over MCP stdio
    Mcp {
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

/// Logs go to stderr so stdout stays clean for output and the MCP protocol.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "leetmigo_core=warn".into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339()),
        )
        .init();
}

fn sampler(seed: Option<u64>) -> Sampler {
    match seed {
        Some(seed) => Sampler::seeded(seed),
        None => Sampler::from_os_rng(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let map = Arc::new(assemble().context("Failed to assemble the decision map")?);

    match cli.command {
        Commands::Subjects => {
            for name in map.subject_names() {
                let choices: Vec<_> = map
                    .root()
                    .child(name)
                    .map(|node| node.labels().collect())
                    .unwrap_or_default();
                println!("{}: {}", name, choices.join(", "));
            }
        }
        Commands::Outline { subject, depth } => match subject {
            Some(subject) => {
                let node = map
                    .subject(subject)
                    .with_context(|| format!("Subject '{}' is missing from the map", subject))?;
                print!("{}", render_outline(subject.name(), node, depth));
            }
            None => print!("{}", render_outline("Subjects", map.root(), depth)),
        },
        Commands::Sample { seed } => {
            let tree = sampler(seed).sample()?;
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }
        Commands::Walk => {
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            let state = walk::run(&map, stdin.lock(), &mut stdout)?;
            info!(path = ?state.path(), "Walk finished");
        }
        Commands::Mcp { seed } => {
            info!("Starting MCP navigator server via stdio");
            let trail = Arc::new(Mutex::new(NavigatorState::default()));
            let service = NavigatorService::new(map, trail, None, sampler(seed));
            let server = service.serve(rmcp::transport::stdio()).await?;
            let quit_reason = server.waiting().await?;
            info!("MCP server stopped: {:?}", quit_reason);
        }
    }

    Ok(())
}
