use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use codepane_application::{ChatDashboard, CodePanel, ConversationSettings};
use codepane_core::content::ContentService;
use codepane_core::session::ChatStore;
use codepane_core::storage::KeyValueStore;
use codepane_infrastructure::{
    CodepanePaths, ConfigService, FileKeyValueStore, LocalChatStore, MemoryKeyValueStore,
};
use codepane_interaction::RemoteContentService;

mod commands;
mod helper;
mod logging;
mod repl;

#[derive(Parser)]
#[command(name = "codepane", version)]
#[command(about = "Chat with Gemini and keep the code it writes at hand", long_about = None)]
struct Cli {
    /// Directory holding config.toml, secret.json and logs
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Model to start with (overrides config.toml)
    #[arg(long)]
    model: Option<String>,

    /// Id of the chat to open
    #[arg(long)]
    chat: Option<String>,

    /// Keep chat history in memory only
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = CodepanePaths::new(cli.config_dir.as_deref());
    let config = ConfigService::new(paths.clone())
        .load()
        .context("failed to load configuration")?;
    let _log_guard = logging::init(&config.logs_dir)?;
    paths
        .ensure_secret_file()
        .context("failed to prepare secret.json")?;

    tracing::info!(
        data_dir = %config.data_dir.display(),
        ephemeral = cli.ephemeral,
        "codepane starting"
    );

    let kv: Arc<dyn KeyValueStore> = if cli.ephemeral {
        Arc::new(MemoryKeyValueStore::new())
    } else {
        Arc::new(
            FileKeyValueStore::new(&config.data_dir)
                .await
                .context("failed to open chat history directory")?,
        )
    };
    let store: Arc<dyn ChatStore> = Arc::new(
        LocalChatStore::open(kv)
            .await
            .context("failed to load chat history")?,
    );
    let content: Arc<dyn ContentService> =
        Arc::new(RemoteContentService::from_config(&config.app, &config.secrets));

    if config.secrets.gemini_api_key().is_none() {
        eprintln!(
            "No Gemini API key configured. Set GEMINI_API_KEY or edit {}.",
            paths.secret_file().map(|p| p.display().to_string()).unwrap_or_default()
        );
    }

    let mut dashboard = ChatDashboard::new(store);
    match cli.chat.as_deref() {
        Some(id) => dashboard
            .select_chat(id)
            .await
            .with_context(|| format!("cannot open chat {id}"))?,
        None => {
            if dashboard.selected_chat_id().await.is_none() {
                dashboard.create_chat(None).await?;
            }
        }
    }

    let mut settings = ConversationSettings::from_config(&config.app);
    if let Some(model) = cli.model {
        settings.model = model;
    }

    let repl = repl::Repl::new(dashboard, content, Arc::new(CodePanel::default()), settings).await?;
    repl.run().await?;

    tracing::info!("codepane stopped");
    Ok(())
}
