use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use redpen_ai::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use redpen_ai::{Critic, CritiqueError, GeminiClient, MockModel, TextModel};
use redpen_core::{Analysis, AnalysisKind, Session};
use tracing_subscriber::EnvFilter;

mod display;
mod interactive;

#[derive(Parser)]
#[command(
    name = "redpen",
    version,
    about = "Critique text with a language model and overlay the results"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyse a text file (or `-` for stdin) and overlay the critique.
    Analyze(AnalyzeArgs),
}

#[derive(clap::Args)]
struct AnalyzeArgs {
    /// Text to analyse; `-` reads stdin.
    input: PathBuf,

    /// Which analysis to run.
    #[arg(long, value_enum, default_value_t = KindArg::Rules)]
    kind: KindArg,

    /// Use a saved model response instead of calling the provider.
    #[arg(long)]
    response: Option<PathBuf>,

    /// Print segments as JSON instead of the terminal overlay.
    #[arg(long, conflicts_with = "interactive")]
    json: bool,

    /// Resolve and unresolve items at a prompt after rendering.
    #[arg(long, short)]
    interactive: bool,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model name.
    #[arg(long, env = "REDPEN_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Provider base URL.
    #[arg(long, env = "REDPEN_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Output token budget per request.
    #[arg(long, default_value_t = 2048)]
    max_tokens: u32,

    /// Sampling temperature.
    #[arg(long, default_value_t = 0.2)]
    temperature: f32,
}

impl AnalyzeArgs {
    fn reads_stdin(&self) -> bool {
        self.input == Path::new("-")
    }

    /// Reject flag combinations clap cannot express.
    fn check(&self) -> anyhow::Result<()> {
        if self.interactive && self.reads_stdin() {
            bail!("--interactive reads commands from stdin; pass the text as a file, not `-`");
        }
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Rules,
    General,
    Both,
}

impl KindArg {
    fn kinds(self) -> &'static [AnalysisKind] {
        match self {
            KindArg::Rules => &[AnalysisKind::Rules],
            KindArg::General => &[AnalysisKind::General],
            KindArg::Both => &AnalysisKind::ALL,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("redpen v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Analyze(args) => cmd_analyze(args).await,
    }
}

async fn cmd_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    args.check()?;
    let text = read_input(&args.input)?;

    match &args.response {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading model response {}", path.display()))?;
            tracing::info!(path = %path.display(), "using saved model response");
            run(Critic::new(MockModel::new(raw)), text, &args).await
        }
        None => {
            let Some(api_key) = args.api_key.clone() else {
                bail!("no API key: set GEMINI_API_KEY or pass --api-key (or use --response)");
            };
            let client = GeminiClient::with_base_url(args.base_url.clone(), api_key, &args.model);
            let critic = Critic::new(client).with_generation(args.max_tokens, args.temperature);
            run(critic, text, &args).await
        }
    }
}

async fn run<M: TextModel>(
    critic: Critic<M>,
    text: String,
    args: &AnalyzeArgs,
) -> anyhow::Result<()> {
    let mut session = Session::new(text);
    let kinds = args.kind.kinds();
    for &kind in kinds {
        session.begin(kind);
    }

    let results: Vec<(AnalysisKind, Result<Analysis, CritiqueError>)> =
        if args.kind == KindArg::Both {
            let (rules, general) = critic.analyze_both(session.input()).await;
            vec![(AnalysisKind::Rules, rules), (AnalysisKind::General, general)]
        } else {
            let kind = kinds[0];
            vec![(kind, critic.analyze(kind, session.input()).await)]
        };

    let mut failures = 0;
    for (kind, result) in results {
        match result {
            Ok(analysis) => session.install(analysis),
            Err(CritiqueError::Analysis(e)) => {
                failures += 1;
                eprintln!("{kind}: {e}. Raw response:\n{}\n", e.raw);
            }
            Err(e) => {
                failures += 1;
                eprintln!("{kind}: {e}");
            }
        }
    }

    if args.json {
        let reports: Vec<display::JsonReport<'_>> = AnalysisKind::ALL
            .into_iter()
            .filter_map(|k| session.analysis(k))
            .map(display::JsonReport::new)
            .collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        interactive::print_session(&session);
    }

    if failures == kinds.len() {
        bail!("no analysis succeeded");
    }

    if args.interactive {
        interactive::run(&mut session).context("reading commands from stdin")?;
    }
    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading text from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
