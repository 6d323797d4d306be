/// Preludio - session player host
use clap::{Parser, Subcommand};
use preludio_cli::{
    config::CliConfig,
    script::{parse_script, Command},
    session::{self, Session},
};
use preludio_playback::binder::RequestDraft;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "preludio")]
#[command(about = "Preludio session player", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PRELUDIO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a session script, or read commands from stdin
    Simulate {
        /// Script file, one command per line
        script: Option<PathBuf>,

        /// Content file whose `%%audio_*` directives act as page defaults
        #[arg(long)]
        defaults: Option<PathBuf>,
    },
    /// Show the persisted player state
    Inspect,
    /// Delete the persisted player state
    Clear,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "preludio_cli=info,preludio_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Simulate { script, defaults } => simulate(&config, script, defaults)?,
        Commands::Inspect => inspect(&config)?,
        Commands::Clear => {
            session::clear(&config)?;
            tracing::info!("Cleared stored player state");
        }
    }

    Ok(())
}

fn simulate(
    config: &CliConfig,
    script: Option<PathBuf>,
    defaults: Option<PathBuf>,
) -> anyhow::Result<()> {
    let defaults = match defaults {
        Some(path) => preludio_playback::binder::parse_directives(&std::fs::read_to_string(path)?),
        None => RequestDraft::default(),
    };
    let mut session = Session::open(config).with_defaults(defaults);

    if let Some(path) = script {
        let commands = parse_script(&std::fs::read_to_string(&path)?)?;
        tracing::info!(script = %path.display(), commands = commands.len(), "Running script");
        session.run(&commands)?;
        return Ok(());
    }

    // Interactive: keep going after bad lines
    let stdin = io::stdin();
    prompt()?;
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line == "quit" || line == "exit" {
            break;
        }
        if !line.is_empty() && !line.starts_with('#') {
            let result = line
                .parse::<Command>()
                .and_then(|command| session.execute(&command));
            if let Err(e) = result {
                eprintln!("{e}");
            }
        }
        prompt()?;
    }

    Ok(())
}

fn inspect(config: &CliConfig) -> anyhow::Result<()> {
    match session::inspect(config)? {
        Some(snapshot) => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        None => println!("No stored player state in {}", config.state_dir.display()),
    }
    Ok(())
}

fn prompt() -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()
}
