//! CodeGenesis terminal client.
//!
//! Subcommands cover the dashboard's surfaces: project management, the
//! two-pane editor's chat loop (with auto-save), provider key management,
//! and the MemoRAG status/query view.

use std::io::Write as _;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use uuid::Uuid;

mod client;
mod editor;
mod memorag;

use client::{ApiClient, ProviderKeys};
use editor::{AutoSaver, ProjectSaver, SessionState, ACKNOWLEDGMENT};
use memorag::MemoRagClient;

/// Default server URL.
const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";
/// Default MemoRAG backend URL.
const DEFAULT_MEMORAG: &str = "http://127.0.0.1:8000";

/// Build the single-file content map persisted on projects.
pub(crate) fn files_map(code: &str) -> JsonValue {
    serde_json::json!({
        "index.html": {
            "content": code,
            "language": "html",
        }
    })
}

#[derive(Parser)]
#[command(name = "codegenesis")]
#[command(about = "Terminal client for the CodeGenesis dashboard")]
#[command(version)]
struct Cli {
    /// Server base URL
    #[arg(long, default_value = DEFAULT_SERVER)]
    server: String,

    /// Session token (falls back to CG_SESSION_TOKEN)
    #[arg(long)]
    session_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage projects
    Projects {
        #[command(subcommand)]
        action: ProjectAction,
    },
    /// Open the interactive editor for a project
    Editor {
        /// Project id
        #[arg(long)]
        project: Uuid,
    },
    /// Manage provider API keys
    Keys {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// Show the caller's profile
    Profile,
    /// MemoRAG document backend views
    Memorag {
        /// Backend base URL (falls back to CG_MEMORAG_URL)
        #[arg(long)]
        url: Option<String>,
        #[command(subcommand)]
        action: MemoragAction,
    },
}

#[derive(Subcommand)]
enum ProjectAction {
    /// List your projects
    List,
    /// Create a project
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Technology-stack tags (repeatable)
        #[arg(long = "tech")]
        tech_stack: Vec<String>,
    },
    /// Delete a project
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum KeyAction {
    /// List configured providers
    List,
    /// Store a key (prompted on stdin, encrypted at rest server-side)
    Store {
        provider: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
    /// Delete a provider's stored keys
    Delete { provider: String },
}

#[derive(Subcommand)]
enum MemoragAction {
    /// Show system health
    Status,
    /// Query the knowledge base
    Query { question: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // MemoRAG views need no session
    if let Commands::Memorag { url, action } = &cli.command {
        let base = url
            .clone()
            .or_else(|| std::env::var("CG_MEMORAG_URL").ok())
            .unwrap_or_else(|| DEFAULT_MEMORAG.to_string());
        return run_memorag(&base, action).await;
    }

    let token = cli
        .session_token
        .clone()
        .or_else(|| std::env::var("CG_SESSION_TOKEN").ok())
        .ok_or_else(|| {
            anyhow!("No session token. Pass --session-token or set CG_SESSION_TOKEN.")
        })?;

    let api = ApiClient::new(&cli.server, &token)?;

    match cli.command {
        Commands::Projects { action } => run_projects(&api, action).await,
        Commands::Editor { project } => run_editor(&api, project).await,
        Commands::Keys { action } => run_keys(&api, action).await,
        Commands::Profile => run_profile(&api).await,
        Commands::Memorag { .. } => unreachable!("handled above"),
    }
}

async fn run_projects(api: &ApiClient, action: ProjectAction) -> Result<()> {
    match action {
        ProjectAction::List => {
            let projects = api.list_projects().await?;
            if projects.is_empty() {
                println!("No projects.");
                return Ok(());
            }

            println!(
                "{:<36} {:<24} {:<12} {:<20}",
                "ID", "NAME", "STATUS", "UPDATED"
            );
            for p in projects {
                println!(
                    "{:<36} {:<24} {:<12} {:<20}",
                    p.id,
                    p.name,
                    p.status,
                    p.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
            Ok(())
        }
        ProjectAction::Create {
            name,
            description,
            tech_stack,
        } => {
            let project = api
                .create_project(&name, description.as_deref(), &tech_stack)
                .await?;
            println!("Created project {} ({})", project.name, project.id);
            Ok(())
        }
        ProjectAction::Delete { id } => {
            api.delete_project(id).await?;
            println!("Deleted project {}", id);
            Ok(())
        }
    }
}

/// Adapter letting the auto-save loop persist through the API client.
struct RemoteSaver {
    api: ApiClient,
}

#[async_trait]
impl ProjectSaver for RemoteSaver {
    async fn save_files(&self, project_id: Uuid, files: &JsonValue) -> Result<(), String> {
        self.api
            .update_project_files(project_id, files)
            .await
            .map_err(|e| e.to_string())
    }
}

async fn run_editor(api: &ApiClient, project_id: Uuid) -> Result<()> {
    let keys = ProviderKeys {
        openai: std::env::var("OPENAI_API_KEY").ok(),
        anthropic: std::env::var("ANTHROPIC_API_KEY").ok(),
    };
    if keys.is_empty() {
        eprintln!(
            "warning: OPENAI_API_KEY/ANTHROPIC_API_KEY are not set; \
             generation will use keys stored in Settings, if any."
        );
    }

    let detail = api
        .get_project(project_id)
        .await
        .context("Failed to load project")?;

    println!("Editing '{}' ({})", detail.project.name, project_id);

    let state = Arc::new(Mutex::new(SessionState::from_project(&detail)));

    // Print the replayed transcript
    for msg in &state.lock().await.messages {
        print_message(msg);
    }

    // Auto-save task; lives until the editor exits
    let autosaver = AutoSaver::new(
        state.clone(),
        RemoteSaver { api: api.clone() },
        project_id,
    );
    let autosave_handle = tokio::spawn(async move { autosaver.run().await });

    println!("\nDescribe your app. Commands: /code prints the buffer, /quit exits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let line = match lines.next_line().await? {
            Some(l) => l,
            None => break,
        };
        let prompt = line.trim();

        match prompt {
            "" => continue,
            "/quit" | "/exit" => break,
            "/code" => {
                println!("{}", state.lock().await.code);
                continue;
            }
            _ => {}
        }

        let current_code = {
            let mut s = state.lock().await;
            s.begin_turn(prompt);
            s.code.clone()
        };

        match api.generate(prompt, Some(&current_code), &keys).await {
            Ok(result) => {
                {
                    let mut s = state.lock().await;
                    s.complete_turn(result.code.clone());
                }
                print_message(&editor::Message::assistant(ACKNOWLEDGMENT));

                // Best-effort persistence of the turn; the auto-save loop
                // covers the file map if this fails
                if let Err(e) = api
                    .record_generation(
                        project_id,
                        prompt,
                        ACKNOWLEDGMENT,
                        &result.code,
                        &result.model,
                        &result.provider,
                    )
                    .await
                {
                    eprintln!("warning: failed to record generation: {}", e);
                }
            }
            Err(e) => {
                let message = e.to_string();
                state.lock().await.fail_turn(&message);
                print_message(&editor::Message::assistant(format!("Error: {}", message)));
            }
        }
    }

    autosave_handle.abort();

    // Final save if the buffer is still dirty
    let s = state.lock().await;
    if s.is_dirty() {
        api.update_project_files(project_id, &files_map(&s.code))
            .await
            .context("Final save failed")?;
        println!("Saved.");
    }

    Ok(())
}

fn print_message(msg: &editor::Message) {
    match msg.role {
        editor::Role::User => println!("you: {}", msg.content),
        editor::Role::Assistant => println!("codegenesis: {}", msg.content),
    }
}

async fn run_keys(api: &ApiClient, action: KeyAction) -> Result<()> {
    match action {
        KeyAction::List => {
            let response = api.list_keys().await?;
            if response.providers.is_empty() {
                println!("No provider keys configured.");
                return Ok(());
            }

            println!("{:<12} {:<20} {:<20}", "PROVIDER", "NAME", "LAST USED");
            for key in response.providers {
                println!(
                    "{:<12} {:<20} {:<20}",
                    key.provider,
                    key.key_name.as_deref().unwrap_or("-"),
                    key.last_used_at
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "never".to_string())
                );
            }
            Ok(())
        }
        KeyAction::Store {
            provider,
            name,
            model,
        } => {
            // Read the key from stdin so it never lands in shell history
            print!("API key for {}: ", provider);
            std::io::stdout().flush().ok();
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            let api_key = line.trim();
            if api_key.is_empty() {
                bail!("No key entered");
            }

            api.store_key(&provider, api_key, name.as_deref(), model.as_deref())
                .await?;
            println!("Stored {} key (encrypted at rest).", provider);
            Ok(())
        }
        KeyAction::Delete { provider } => {
            api.delete_key(&provider).await?;
            println!("Deleted {} key.", provider);
            Ok(())
        }
    }
}

async fn run_profile(api: &ApiClient) -> Result<()> {
    let profile = api.get_profile().await?;
    println!("id:    {}", profile.id);
    println!("email: {}", profile.email.as_deref().unwrap_or("-"));
    println!("name:  {}", profile.full_name.as_deref().unwrap_or("-"));
    println!("tier:  {}", profile.subscription_tier);
    Ok(())
}

async fn run_memorag(base_url: &str, action: &MemoragAction) -> Result<()> {
    let client = MemoRagClient::new(base_url)?;

    match action {
        MemoragAction::Status => {
            let status = client.status().await?;
            println!("{}", memorag::render_status(&status));
        }
        MemoragAction::Query { question } => {
            let result = client.query(question).await?;
            println!("{}", memorag::render_query(&result));
        }
    }

    Ok(())
}
