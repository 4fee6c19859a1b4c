//! Questline - console entry point.

use questline_domain::UserId;
use questline_engine::{api::Console, App, EngineConfig};
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root.
    load_dotenv_from_repo_root();

    // Logs go to stderr so they never interleave with the story on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "questline_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Questline");

    let config = EngineConfig::from_env();
    tracing::info!(
        story_file = %config.story_file.display(),
        insight = config.insight.name(),
        "Configuration loaded"
    );

    let app = App::from_config(&config).await?;
    let user = UserId::new(config.console_user.as_str())?;

    let console = Console::new(&app, user);
    let mut stdout = tokio::io::stdout();
    console
        .run(BufReader::new(tokio::io::stdin()), &mut stdout)
        .await?;

    tracing::info!("Questline stopped");
    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
