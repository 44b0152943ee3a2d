mod files;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use compgen::api::{ComponentDraft, ComponentRecord, Credentials, ListQuery, Registration};
use compgen::config::AppConfig;
use compgen::conversation::{Conversation, TurnBody};
use compgen::generation::config::{Feature, GenerationConfig, Preset, StyleMethod};
use compgen::generation::extract::DEFAULT_COMPONENT_NAME;
use compgen::generation::prompt::{ExistingSource, QUICK_ACTIONS};
use compgen::generation::service::ChatReply;
use compgen::generation::GenerationRequest;
use compgen::preview::PreviewDocument;
use compgen::validate::{defined_component, ensure_default_export};
use compgen::{AppContext, AppError, ErrorCode, Surface};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    App(#[from] AppError),
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::App(e) => e.error_code(),
            Self::Io { .. } => "E_IO",
            Self::Json(_) => "E_JSON",
            Self::Usage(_) => "E_USAGE",
        }
    }

    fn hint(&self) -> Option<&'static str> {
        let Self::App(e) = self else {
            return None;
        };
        match e.surface() {
            Surface::RedirectToLogin => Some("run `compgen auth login` and try again"),
            Surface::RephraseBanner => Some("the model returned no usable code; rephrase the prompt"),
            Surface::Banner if e.retryable() => Some("temporary failure; run the command again"),
            Surface::Banner | Surface::Inline => None,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "compgen", about = "AI component generator")]
struct Cli {
    #[arg(long, env = "COMPGEN_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "COMPGEN_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Auth(AuthCommand),
    Component(ComponentCommand),
    /// Generate a component from a description (structured reply).
    Generate(GenerateArgs),
    /// Interactive generation with conversation history.
    Chat(ChatArgs),
    /// Write a sandboxed HTML preview for a component.
    Preview(PreviewArgs),
}

#[derive(Args, Debug)]
struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
enum AuthSubcommand {
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "COMPGEN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "COMPGEN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Whoami,
}

#[derive(Args, Debug)]
struct ComponentCommand {
    #[command(subcommand)]
    command: ComponentSubcommand,
}

#[derive(Args, Debug)]
struct SourceArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long, help = "File holding the component markup")]
    markup_file: Option<PathBuf>,
    #[arg(long)]
    style_file: Option<PathBuf>,
    #[arg(long)]
    tests_file: Option<PathBuf>,
    #[arg(long)]
    story_file: Option<PathBuf>,
    #[arg(long, help = "Prompt the component was generated from")]
    prompt: Option<String>,
    #[arg(long = "type")]
    kind: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ComponentSubcommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long = "type", default_value = "")]
        kind: String,
    },
    Get {
        id: String,
        #[arg(long)]
        code_only: bool,
        #[arg(long, help = "Write the sources into this directory instead of printing JSON")]
        out_dir: Option<PathBuf>,
    },
    Create(SourceArgs),
    Update {
        id: String,
        #[command(flatten)]
        source: SourceArgs,
    },
    Delete {
        id: String,
    },
    Versions {
        id: String,
    },
    Restore {
        id: String,
        version_id: String,
    },
    Export {
        id: String,
        #[arg(long, help = "Output path; defaults to the server-provided filename")]
        out: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    prompt: String,
    #[arg(long, default_value = "REACT")]
    preset: Preset,
    #[arg(long, default_value = "css-modules")]
    style: StyleMethod,
    #[arg(long = "feature", help = "typescript, tests or storybook; repeatable (default: typescript)")]
    features: Vec<Feature>,
    #[arg(long, help = "Refine this stored component instead of starting fresh")]
    refine_from: Option<String>,
    #[arg(long)]
    out_dir: Option<PathBuf>,
    #[arg(long, help = "Save the result to the backend")]
    save: bool,
    #[arg(long, help = "Override the generated component name")]
    name: Option<String>,
}

#[derive(Args, Debug)]
struct ChatArgs {
    #[arg(long, default_value = "REACT")]
    preset: Preset,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[arg(long, conflicts_with = "markup_file", help = "Stored component to preview")]
    id: Option<String>,
    #[arg(long)]
    markup_file: Option<PathBuf>,
    #[arg(long)]
    style_file: Option<PathBuf>,
    #[arg(long, default_value = "REACT")]
    preset: Preset,
    #[arg(long, default_value = "preview.html")]
    out: PathBuf,
    #[arg(long, help = "Write the bare document instead of the sandboxed host page")]
    raw: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = AppConfig::from_env().map_err(AppError::from)?;
    if let Some(url) = cli.api_url.filter(|u| !u.trim().is_empty()) {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(path) = cli.session_file {
        config.session_file = path;
    }
    let mut ctx = AppContext::start(config)?;

    match cli.command {
        Command::Auth(auth) => run_auth(&mut ctx, auth.command).await,
        Command::Component(component) => run_component(&mut ctx, component.command).await,
        Command::Generate(args) => run_generate(&mut ctx, args).await,
        Command::Chat(args) => run_chat(&mut ctx, args).await,
        Command::Preview(args) => run_preview(&mut ctx, args).await,
    }
}

// =============================================================================
// AUTH
// =============================================================================

async fn run_auth(ctx: &mut AppContext, command: AuthSubcommand) -> Result<(), CliError> {
    match command {
        AuthSubcommand::Register { name, email, password } => {
            let registration = Registration { name, email, password };
            ctx.register(&registration).await?;
            println!("registered {}; run `compgen auth login` to sign in", registration.email);
        }
        AuthSubcommand::Login { email, password } => {
            let session = ctx.login(&Credentials { email, password }).await?;
            println!("signed in as {}", session.display_name);
        }
        AuthSubcommand::Logout => {
            ctx.logout()?;
            println!("signed out");
        }
        AuthSubcommand::Whoami => match ctx.session() {
            Some(session) => {
                let email = session.email.as_deref().unwrap_or("-");
                println!("{} <{email}> ({})", session.display_name, session.user_id);
            }
            None => println!("not signed in"),
        },
    }
    Ok(())
}

// =============================================================================
// COMPONENTS
// =============================================================================

async fn read_file(path: &Path) -> Result<String, CliError> {
    tokio::fs::read_to_string(path).await.map_err(|e| CliError::io(path, e))
}

async fn read_optional(path: Option<&PathBuf>) -> Result<Option<String>, CliError> {
    match path {
        Some(path) => Ok(Some(read_file(path).await?)),
        None => Ok(None),
    }
}

/// Overlay the given sources onto `base`.
async fn apply_source(mut base: ComponentDraft, source: &SourceArgs) -> Result<ComponentDraft, CliError> {
    if let Some(name) = &source.name {
        base.name.clone_from(name);
    }
    if let Some(markup) = read_optional(source.markup_file.as_ref()).await? {
        base.markup = markup;
    }
    if let Some(style) = read_optional(source.style_file.as_ref()).await? {
        base.style = style;
    }
    if let Some(tests) = read_optional(source.tests_file.as_ref()).await? {
        base.tests = Some(tests);
    }
    if let Some(story) = read_optional(source.story_file.as_ref()).await? {
        base.story = Some(story);
    }
    if let Some(prompt) = &source.prompt {
        base.origin_prompt.clone_from(prompt);
    }
    if let Some(kind) = &source.kind {
        base.kind = Some(kind.clone());
    }
    Ok(base)
}

fn print_json(value: &impl serde::Serialize) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_record_line(record: &ComponentRecord) {
    let kind = record.kind.as_deref().unwrap_or("-");
    let updated = record.updated_at.as_deref().unwrap_or("-");
    println!("{}\t{}\t{kind}\t{updated}", record.id, record.name);
}

async fn run_component(ctx: &mut AppContext, command: ComponentSubcommand) -> Result<(), CliError> {
    match command {
        ComponentSubcommand::List { page, limit, search, kind } => {
            let page = ctx.list_components(&ListQuery { page, limit, search, kind }).await?;
            for record in &page.components {
                print_record_line(record);
            }
            println!("page {}/{} ({} total)", page.page, page.pages.max(1), page.total);
            let summary: Vec<String> =
                page.kind_summary().into_iter().map(|(kind, count)| format!("{kind}: {count}")).collect();
            println!("{}", summary.join(", "));
        }
        ComponentSubcommand::Get { id, code_only, out_dir } => {
            let record = ctx.get_component(&id, code_only).await?;
            match out_dir {
                Some(dir) => {
                    let written = files::write_all(&dir, &files::record_files(&record))
                        .await
                        .map_err(|e| CliError::io(&dir, e))?;
                    for path in written {
                        println!("wrote {}", path.display());
                    }
                }
                None => print_json(&record)?,
            }
        }
        ComponentSubcommand::Create(source) => {
            if source.markup_file.is_none() {
                return Err(CliError::Usage("--markup-file is required to create a component".into()));
            }
            let draft = apply_source(ComponentDraft::default(), &source).await?;
            let record = ctx.save_component(None, &draft).await?;
            println!("created {} ({})", record.name, record.id);
        }
        ComponentSubcommand::Update { id, source } => {
            let current = ctx.get_component(&id, false).await?;
            let draft = apply_source(current.to_draft(), &source).await?;
            let record = ctx.save_component(Some(&id), &draft).await?;
            println!("updated {} ({})", record.name, record.id);
        }
        ComponentSubcommand::Delete { id } => {
            ctx.delete_component(&id).await?;
            println!("deleted {id}");
        }
        ComponentSubcommand::Versions { id } => {
            for version in ctx.component_versions(&id).await? {
                let number = version.version.map_or_else(|| "-".to_string(), |v| v.to_string());
                let created = version.created_at.as_deref().unwrap_or("-");
                println!("{}\tv{number}\t{created}", version.id);
            }
        }
        ComponentSubcommand::Restore { id, version_id } => {
            let record = ctx.restore_version(&id, &version_id).await?;
            println!("restored {} to {version_id}", record.name);
        }
        ComponentSubcommand::Export { id, out } => {
            let blob = ctx.export_component(&id).await?;
            let path = out.unwrap_or_else(|| PathBuf::from(&blob.filename));
            tokio::fs::write(&path, &blob.bytes).await.map_err(|e| CliError::io(&path, e))?;
            println!("exported {} bytes to {}", blob.bytes.len(), path.display());
        }
    }
    Ok(())
}

// =============================================================================
// GENERATE
// =============================================================================

async fn run_generate(ctx: &mut AppContext, args: GenerateArgs) -> Result<(), CliError> {
    let mut config = GenerationConfig { preset: args.preset, style_method: args.style, ..GenerationConfig::default() };
    if !args.features.is_empty() {
        config.features = args.features.into_iter().collect();
    }

    let existing = match &args.refine_from {
        Some(id) => {
            let record = ctx.get_component(id, true).await?;
            Some(ExistingSource { markup: record.markup, style: record.style })
        }
        None => None,
    };
    let request = GenerationRequest { prompt: args.prompt.clone(), config, existing };
    let mut response = ctx.generator().generate_component(&request).await?;
    if let Some(name) = args.name {
        response.component_name = name;
    }

    println!("{}\n", response.component_name);
    println!("{}\n", response.explanation);
    match &args.out_dir {
        Some(dir) => {
            let written = files::write_all(dir, &files::generation_files(&response, &request.config))
                .await
                .map_err(|e| CliError::io(dir, e))?;
            for path in written {
                println!("wrote {}", path.display());
            }
        }
        None => {
            println!("```{}\n{}\n```", request.config.preset.markup_tag(), response.markup);
            if !response.style.trim().is_empty() {
                println!("```css\n{}\n```", response.style);
            }
        }
    }

    if args.save {
        let mut draft = response.into_draft(&args.prompt);
        draft.markup = ensure_default_export(&draft.markup, &draft.name);
        let record = ctx.save_component(args.refine_from.as_deref(), &draft).await?;
        println!("saved {} ({})", record.name, record.id);
    }
    Ok(())
}

// =============================================================================
// CHAT
// =============================================================================

fn print_reply(reply: &ChatReply, preset: Preset) {
    if !reply.explanation.is_empty() {
        println!("\n{}", reply.explanation);
    }
    println!("\n```{}\n{}\n```", preset.markup_tag(), reply.markup);
    if !reply.style.is_empty() {
        println!("```css\n{}\n```", reply.style);
    }
}

fn print_chat_help() {
    println!("Describe a component, or pick a quick action:");
    for (i, action) in QUICK_ACTIONS.iter().enumerate() {
        println!("  /{}  {}: {}", i + 1, action.label, action.prompt);
    }
    println!("  /save [Name]  save the last component");
    println!("  /preview      write preview.html for the last component");
    println!("  /history      show the conversation");
    println!("  /log          show the raw turn log");
    println!("  /quit         leave");
    println!("Ctrl-C cancels a pending response, or leaves when idle.");
}

fn print_history(conversation: &Conversation) {
    for turn in conversation.view() {
        let who = match turn.speaker {
            compgen::conversation::Speaker::User => "you",
            compgen::conversation::Speaker::Assistant => "ai",
        };
        match &turn.body {
            TurnBody::Pending => println!("[{who}] ..."),
            TurnBody::Settled(text) => println!("[{who}] {text}"),
            TurnBody::Errored(message) => println!("[{who}] error: {message}"),
        }
    }
}

/// Next input line; `None` on end of input or once `interrupt` fires.
async fn next_input<R>(lines: &mut Lines<R>, interrupt: impl Future<Output = ()>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    tokio::select! {
        line = lines.next_line() => line,
        () = interrupt => Ok(None),
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn print_log(conversation: &Conversation) {
    for turn in conversation.log() {
        let state = match &turn.body {
            TurnBody::Pending => "pending",
            TurnBody::Settled(_) => "settled",
            TurnBody::Errored(_) => "errored",
        };
        match turn.resolves {
            Some(ticket) => println!("#{} {:?} {state} (resolves #{ticket})", turn.id, turn.speaker),
            None => println!("#{} {:?} {state}", turn.id, turn.speaker),
        }
    }
}

async fn save_reply(ctx: &mut AppContext, reply: &ChatReply, prompt: &str, name: Option<&str>) -> Result<(), CliError> {
    let name = name
        .map(str::to_string)
        .or_else(|| defined_component(&reply.markup))
        .unwrap_or_else(|| DEFAULT_COMPONENT_NAME.to_string());
    let draft = ComponentDraft {
        markup: ensure_default_export(&reply.markup, &name),
        name,
        style: reply.style.clone(),
        origin_prompt: prompt.to_string(),
        ..ComponentDraft::default()
    };
    let record = ctx.save_component(None, &draft).await?;
    println!("saved {} ({})", record.name, record.id);
    Ok(())
}

async fn run_chat(ctx: &mut AppContext, args: ChatArgs) -> Result<(), CliError> {
    let preset = args.preset;
    let mut conversation = Conversation::new();
    let mut last: Option<(String, ChatReply)> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("compgen chat ({preset}, model {})", ctx.generator().model());
    print_chat_help();

    loop {
        stdout.write_all(b"\n> ").await.map_err(|e| CliError::io(Path::new("<stdout>"), e))?;
        stdout.flush().await.map_err(|e| CliError::io(Path::new("<stdout>"), e))?;
        let line = next_input(&mut lines, interrupted())
            .await
            .map_err(|e| CliError::io(Path::new("<stdin>"), e))?;
        let Some(line) = line else {
            println!();
            break;
        };
        let input = line.trim();

        let prompt = match input {
            "/quit" | "/exit" => break,
            "/help" => {
                print_chat_help();
                continue;
            }
            "/history" => {
                print_history(&conversation);
                continue;
            }
            "/log" => {
                print_log(&conversation);
                continue;
            }
            "/preview" => {
                match &last {
                    Some((_, reply)) => {
                        let doc = PreviewDocument::render(&reply.markup, &reply.style, preset);
                        let path = PathBuf::from("preview.html");
                        tokio::fs::write(&path, doc.host_page("Preview"))
                            .await
                            .map_err(|e| CliError::io(&path, e))?;
                        println!("wrote {}", path.display());
                    }
                    None => println!("nothing to preview yet"),
                }
                continue;
            }
            cmd if cmd == "/save" || cmd.starts_with("/save ") => {
                let name = cmd.strip_prefix("/save").map(str::trim).filter(|n| !n.is_empty());
                match &last {
                    Some((prompt, reply)) => {
                        if let Err(e) = save_reply(ctx, reply, prompt, name).await {
                            report(&e);
                        }
                    }
                    None => println!("nothing to save yet"),
                }
                continue;
            }
            cmd => match cmd.strip_prefix('/').and_then(|n| n.parse::<usize>().ok()) {
                Some(n) if (1..=QUICK_ACTIONS.len()).contains(&n) => QUICK_ACTIONS[n - 1].prompt.to_string(),
                _ => cmd.to_string(),
            },
        };

        if !conversation.can_submit(&prompt) {
            continue;
        }

        let cancel = CancellationToken::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };
        println!("thinking...");
        let result = ctx.generator().run_turn(&mut conversation, &prompt, preset, &cancel).await;
        watcher.abort();

        match result {
            Ok(reply) => {
                print_reply(&reply, preset);
                last = Some((prompt, reply));
            }
            Err(e) => report(&CliError::App(e)),
        }
    }
    Ok(())
}

fn report(e: &CliError) {
    eprintln!("error[{}]: {e}", e.code());
    if let Some(hint) = e.hint() {
        eprintln!("  hint: {hint}");
    }
}

// =============================================================================
// PREVIEW
// =============================================================================

async fn run_preview(ctx: &mut AppContext, args: PreviewArgs) -> Result<(), CliError> {
    let (markup, style, title) = match (&args.id, &args.markup_file) {
        (Some(id), _) => {
            let record = ctx.get_component(id, true).await?;
            (record.markup, record.style, record.name)
        }
        (None, Some(path)) => {
            let markup = read_file(path).await?;
            let style = read_optional(args.style_file.as_ref()).await?.unwrap_or_default();
            (markup, style, path.display().to_string())
        }
        (None, None) => return Err(CliError::Usage("pass --id or --markup-file".into())),
    };

    let doc = PreviewDocument::render(&markup, &style, args.preset);
    let html = if args.raw { doc.into_string() } else { doc.host_page(&title) };
    tokio::fs::write(&args.out, html).await.map_err(|e| CliError::io(&args.out, e))?;
    println!("wrote {}", args.out.display());
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
