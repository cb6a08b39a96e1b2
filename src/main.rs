//! CLI entry point for `promptshell`.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};

use promptshell::config;
use promptshell::error::PromptError;
use promptshell::format;
use promptshell::i18n;
use promptshell::model::{Group, Role};
use promptshell::persist::FileStorage;
use promptshell::session::{Command, Session, SessionOptions};
use promptshell::workspace::Workspace;

#[derive(Parser)]
#[command(name = "promptshell", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Language (en, es). Defaults to system locale.
    #[arg(long, global = true, value_name = "LANG")]
    lang: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List prompt groups
    List,
    /// Show the messages of a group
    Show {
        /// Group id, 1-based index or title prefix (selected group if omitted)
        group: Option<String>,
    },
    /// Create a new prompt group and select it
    New,
    /// Select a group
    Select { group: String },
    /// Rename a group
    Rename { group: String, title: String },
    /// Delete a group
    Delete {
        group: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Add a message to a group
    Add {
        /// Group to add to (selected group if omitted)
        group: Option<String>,
        /// Message role: system, user or assistant
        #[arg(short, long, default_value = "user")]
        role: String,
        /// Message text
        #[arg(short, long)]
        message: Option<String>,
        /// Files to attach (repeatable)
        #[arg(short, long, value_name = "FILE")]
        attach: Vec<PathBuf>,
    },
    /// Replace the content of a message
    Edit {
        message: String,
        content: String,
        /// Group holding the message (selected group if omitted)
        #[arg(short, long)]
        group: Option<String>,
    },
    /// Delete a message from a group
    RmMessage {
        message: String,
        #[arg(short, long)]
        group: Option<String>,
    },
    /// Delete an attachment from a message
    RmAttachment {
        message: String,
        attachment: String,
        #[arg(short, long)]
        group: Option<String>,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Detect language early from --lang arg, before clap processes --help.
fn lang_from_args() -> Option<i18n::Lang> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--lang" {
            if let Some(lang) = args.get(i + 1).and_then(|c| i18n::Lang::from_code(c)) {
                return Some(lang);
            }
        }
        if let Some(code) = args[i].strip_prefix("--lang=") {
            if let Some(lang) = i18n::Lang::from_code(code) {
                return Some(lang);
            }
        }
    }
    None
}

/// Build a localized clap Command using i18n strings.
fn build_localized_command() -> clap::Command {
    let mut cmd = Cli::command()
        .about(i18n::app_about())
        .long_about(i18n::app_long_about())
        .mut_arg("verbose", |a| a.help(i18n::help_verbose()))
        .mut_arg("lang", |a| a.help(i18n::help_lang()));

    let subcommands: Vec<clap::Command> = cmd
        .get_subcommands()
        .map(|sub| {
            let mut s = sub.clone();
            match s.get_name() {
                "list" => s = s.about(i18n::help_cmd_list()),
                "show" => s = s.about(i18n::help_cmd_show()),
                "new" => s = s.about(i18n::help_cmd_new()),
                "select" => s = s.about(i18n::help_cmd_select()),
                "rename" => s = s.about(i18n::help_cmd_rename()),
                "delete" => s = s.about(i18n::help_cmd_delete()),
                "add" => s = s.about(i18n::help_cmd_add()),
                "edit" => s = s.about(i18n::help_cmd_edit()),
                "rm-message" => s = s.about(i18n::help_cmd_rm_message()),
                "rm-attachment" => s = s.about(i18n::help_cmd_rm_attachment()),
                "completions" => s = s.about(i18n::help_cmd_completions()),
                _ => {}
            }
            s
        })
        .collect();

    for sub in subcommands {
        cmd = cmd.mut_subcommand(sub.get_name(), |_| sub.clone());
    }

    cmd
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Language precedence: --lang flag, then config, then system locale.
    // set_lang is first-write-wins, so later calls are no-ops.
    if let Some(lang) = lang_from_args() {
        i18n::set_lang(lang);
    }
    let cfg = config::load_config();
    if let Some(lang) = cfg.general.language.as_deref().and_then(i18n::Lang::from_code) {
        i18n::set_lang(lang);
    }
    i18n::set_lang(i18n::detect_system_lang());

    let cmd = build_localized_command();
    let matches = cmd.get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let log_level = match cli.verbose {
        0 => cfg.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level);

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "promptshell", &mut std::io::stdout());
        return Ok(());
    }

    let backend = Arc::new(FileStorage::new(config::storage_file_path(&cfg)));
    let options = SessionOptions {
        save_delay: Duration::from_millis(cfg.autosave.delay_ms),
        inline_ceiling: cfg.storage.inline_ceiling_bytes,
    };
    let mut session = Session::load_with(backend, options);

    match cli.command {
        Commands::List => cmd_list(&session),
        Commands::Show { group } => cmd_show(&session, group.as_deref()),
        Commands::New => {
            session.dispatch(Command::CreateGroup).await?;
            let snapshot = session.snapshot();
            if let Some(group) = snapshot.selected_group() {
                println!("{} ({})", group.title, group.id);
            }
            finish(&mut session)
        }
        Commands::Select { group } => {
            let id = resolve_group(&session.snapshot(), Some(&group))?;
            session.dispatch(Command::SelectGroup { id }).await?;
            finish(&mut session)
        }
        Commands::Rename { group, title } => {
            let id = resolve_group(&session.snapshot(), Some(&group))?;
            session.dispatch(Command::RenameGroup { id, title }).await?;
            finish(&mut session)
        }
        Commands::Delete { group, yes } => cmd_delete(&mut session, &group, yes).await,
        Commands::Add {
            group,
            role,
            message,
            attach,
        } => cmd_add(&mut session, group.as_deref(), &role, message, attach).await,
        Commands::Edit {
            group,
            message,
            content,
        } => {
            let snapshot = session.snapshot();
            let group_id = resolve_group(&snapshot, group.as_deref())?;
            let message_id = resolve_message(group_of(&snapshot, &group_id)?, &message)?;
            session
                .dispatch(Command::EditMessage {
                    group_id,
                    message_id,
                    content,
                })
                .await?;
            finish(&mut session)
        }
        Commands::RmMessage { group, message } => {
            let snapshot = session.snapshot();
            let group_id = resolve_group(&snapshot, group.as_deref())?;
            let message_id = resolve_message(group_of(&snapshot, &group_id)?, &message)?;
            session
                .dispatch(Command::DeleteMessage {
                    group_id,
                    message_id,
                })
                .await?;
            finish(&mut session)
        }
        Commands::RmAttachment {
            group,
            message,
            attachment,
        } => {
            let snapshot = session.snapshot();
            let group_id = resolve_group(&snapshot, group.as_deref())?;
            let grp = group_of(&snapshot, &group_id)?;
            let message_id = resolve_message(grp, &message)?;
            let attachment_id = resolve_attachment(grp, &message_id, &attachment)?;
            session
                .dispatch(Command::DeleteAttachment {
                    group_id,
                    message_id,
                    attachment_id,
                })
                .await?;
            finish(&mut session)
        }
        Commands::Completions { .. } => unreachable!("handled above"),
    }
}

/// Set up tracing with stderr output and file logging.
fn setup_logging(level: &str) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = config::cache_dir();
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "promptshell.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

// ── Command implementations ─────────────────────────────────────

fn cmd_list(session: &Session) -> anyhow::Result<()> {
    let sidebar = session.sidebar();
    if sidebar.is_empty() {
        println!("{}", i18n::no_groups());
        return Ok(());
    }
    for (i, summary) in sidebar.iter().enumerate() {
        let marker = if summary.selected { '*' } else { ' ' };
        let noun = if summary.message_count == 1 {
            i18n::msg_singular()
        } else {
            i18n::msg_plural()
        };
        println!(
            "{marker} {:>2}. {}  \u{b7} {} {noun} \u{b7} {}",
            i + 1,
            summary.title,
            summary.message_count,
            summary.updated_label,
        );
    }
    println!("{}", session.last_saved_label());
    Ok(())
}

fn cmd_show(session: &Session, group: Option<&str>) -> anyhow::Result<()> {
    let snapshot = session.snapshot();
    let group_id = resolve_group(&snapshot, group)?;
    let group = group_of(&snapshot, &group_id)?;

    println!("{}  ({})", group.title, group.id);
    for (i, message) in group.messages.iter().enumerate() {
        println!("\n{:>2}. [{}] {}", i + 1, message.role.label(), message.content);
        for attachment in &message.attachments {
            let note = if attachment.is_inline() {
                String::new()
            } else {
                format!(" \u{b7} {}", i18n::reference_only())
            };
            println!(
                "      - {} ({}){note}",
                attachment.name,
                format::file_size(attachment.size_bytes),
            );
        }
    }
    Ok(())
}

async fn cmd_delete(session: &mut Session, group: &str, yes: bool) -> anyhow::Result<()> {
    let id = resolve_group(&session.snapshot(), Some(group))?;
    if !yes && !confirm(i18n::confirm_delete())? {
        println!("{}", i18n::aborted());
        return Ok(());
    }
    session.dispatch(Command::DeleteGroup { id }).await?;
    finish(session)
}

async fn cmd_add(
    session: &mut Session,
    group: Option<&str>,
    role: &str,
    message: Option<String>,
    attach: Vec<PathBuf>,
) -> anyhow::Result<()> {
    let group_id = resolve_group(&session.snapshot(), group)?;
    let role = Role::from_str_opt(role)
        .ok_or_else(|| anyhow::anyhow!("invalid role '{role}' (system, user, assistant)"))?;

    let mut files = Vec::with_capacity(attach.len());
    for path in &attach {
        files.push(promptshell::codec::PendingFile::from_path(path)?);
    }

    let warnings = session
        .dispatch(Command::AddMessage {
            group_id,
            role,
            content: message.unwrap_or_default(),
            files,
        })
        .await?;
    for warning in &warnings {
        eprintln!("{}: {}", warning.file, warning.reason);
    }
    finish(session)
}

/// Flush pending changes and report the save outcome.
fn finish(session: &mut Session) -> anyhow::Result<()> {
    use promptshell::persist::autosave::SaveStatus;
    match session.flush() {
        SaveStatus::Error => Err(anyhow::anyhow!("{}", i18n::save_error())),
        _ => {
            println!("{}", session.status_label());
            Ok(())
        }
    }
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let answer = line.trim().to_lowercase();
    Ok(matches!(answer.as_str(), "y" | "yes" | "s" | "si" | "s\u{ed}"))
}

// ── Argument resolution ─────────────────────────────────────────

fn group_of<'a>(workspace: &'a Workspace, id: &str) -> anyhow::Result<&'a Group> {
    workspace
        .group(id)
        .ok_or_else(|| PromptError::GroupNotFound(id.to_string()).into())
}

/// Resolve a group argument: exact id, 1-based index, or case-insensitive
/// title prefix. With no argument, the selected group.
fn resolve_group(workspace: &Workspace, needle: Option<&str>) -> anyhow::Result<String> {
    let Some(needle) = needle else {
        return workspace
            .selected_group()
            .map(|g| g.id.clone())
            .ok_or_else(|| anyhow::anyhow!("{}", i18n::no_selection()));
    };

    if let Some(group) = workspace.group(needle) {
        return Ok(group.id.clone());
    }
    if let Ok(index) = needle.parse::<usize>() {
        if index >= 1 && index <= workspace.groups.len() {
            return Ok(workspace.groups[index - 1].id.clone());
        }
    }
    let lowered = needle.to_lowercase();
    let mut matches = workspace
        .groups
        .iter()
        .filter(|g| g.title.to_lowercase().starts_with(&lowered));
    if let (Some(group), None) = (matches.next(), matches.next()) {
        return Ok(group.id.clone());
    }
    Err(PromptError::GroupNotFound(needle.to_string()).into())
}

/// Resolve a message argument: exact id or 1-based index within the group.
fn resolve_message(group: &Group, needle: &str) -> anyhow::Result<String> {
    if let Some(message) = group.message(needle) {
        return Ok(message.id.clone());
    }
    if let Ok(index) = needle.parse::<usize>() {
        if index >= 1 && index <= group.messages.len() {
            return Ok(group.messages[index - 1].id.clone());
        }
    }
    Err(PromptError::MessageNotFound {
        group_id: group.id.clone(),
        message_id: needle.to_string(),
    }
    .into())
}

/// Resolve an attachment argument: exact id, 1-based index, or filename.
fn resolve_attachment(group: &Group, message_id: &str, needle: &str) -> anyhow::Result<String> {
    let message = group.message(message_id).ok_or_else(|| PromptError::MessageNotFound {
        group_id: group.id.clone(),
        message_id: message_id.to_string(),
    })?;
    if let Some(att) = message.attachments.iter().find(|a| a.id == needle) {
        return Ok(att.id.clone());
    }
    if let Ok(index) = needle.parse::<usize>() {
        if index >= 1 && index <= message.attachments.len() {
            return Ok(message.attachments[index - 1].id.clone());
        }
    }
    if let Some(att) = message.attachments.iter().find(|a| a.name == needle) {
        return Ok(att.id.clone());
    }
    Err(PromptError::AttachmentNotFound {
        message_id: message_id.to_string(),
        attachment_id: needle.to_string(),
    }
    .into())
}
