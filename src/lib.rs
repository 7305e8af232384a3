// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use std::path::Path;
use anyhow::{bail, Context, Result};
use application::{Authenticator, DeleteOutcome, NoteStore};
use domain::{ImageFile, Note, Session};
use infrastructure::{Config, FileSessionStore, GraphQlClient, S3Storage};
use ports::{HtmlPresenter, NoteForm, PageModel};
use tracing::{debug, info};
use crate::cli::args::{Args, Command};

/// Width of the description column in `list` output
const SUMMARY_WIDTH: usize = 60;

pub fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting cloudnotes with arguments");

    let config_path = match args.config {
        Some(path) => {
            debug!(?path, "Using provided config path");
            path
        }
        None => Config::default_path()?,
    };

    if let Command::Init { force } = args.command {
        return init_config(&config_path, force);
    }

    let config = load_config(&config_path)?;
    let sessions = FileSessionStore::new(config.session_path(&config_path));

    match args.command {
        Command::SignIn { username, token } => {
            sessions.sign_in(&Session { username, token })?;
            println!("Signed in");
            Ok(())
        }
        Command::SignOut => {
            sessions.sign_out()?;
            println!("Signed out");
            Ok(())
        }
        command => {
            // Nothing below runs without a session
            let session = sessions.session()?;
            config.validate()?;

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to start async runtime")?;
            runtime.block_on(execute(command, &config, &session))
        }
    }
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config file {} already exists (use --force to overwrite)",
            path.display()
        );
    }
    Config::create_default(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Missing file means defaults, so that sign-in works before any setup
fn load_config(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        Config::load(path)?
    } else {
        debug!(?path, "No config file, using defaults");
        Config::default()
    };
    Ok(config.with_env_credentials())
}

async fn execute(command: Command, config: &Config, session: &Session) -> Result<()> {
    let executor = GraphQlClient::new(&config.api.endpoint, session)
        .context("Failed to set up GraphQL client")?
        .with_api_key(&config.api.api_key);
    let storage = S3Storage::new(&config.storage);
    let mut store = NoteStore::new(executor, storage).with_key_prefix(&config.storage.key_prefix);

    match command {
        Command::List { json } => {
            let notes = store.fetch_all().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(notes)?);
            } else {
                print_notes(notes);
            }
        }
        Command::Create {
            name,
            description,
            image,
        } => {
            let image = image
                .map(|path| {
                    ImageFile::from_path(&path)
                        .with_context(|| format!("Failed to read image {}", path.display()))
                })
                .transpose()?;
            let mut form = NoteForm {
                name,
                description,
                image,
            };
            let submission = form.submit()?;

            store
                .create(&submission.name, &submission.description, submission.image)
                .await?;
            form.reset();
            println!("Created note '{}'", submission.name);
            print_notes(store.notes());
        }
        Command::Delete { note_id } => {
            store.fetch_all().await?;
            let Some(note) = store.notes().iter().find(|n| n.id == note_id).cloned() else {
                println!("Note {} not found", note_id);
                return Ok(());
            };

            match store.delete(&note).await? {
                DeleteOutcome::Deleted { image_removed } => {
                    info!(note_id = %note.id, image_removed, "Note deleted");
                    println!("Deleted note {}", note.id);
                }
                DeleteOutcome::AlreadyAbsent => println!("Note {} not found", note.id),
            }
        }
        Command::View => {
            let notes = store.fetch_all().await?;
            let page = PageModel {
                notes,
                username: Some(session.username.as_str()),
            };
            let html = HtmlPresenter::new().render(&page);

            let mut renderer = infrastructure::renderer::ContentRenderer::new();
            let path = renderer.create_temp_file(&html)?;
            info!(?path, "Opening notes page");
            renderer.open_in_browser(&path)?;
        }
        Command::Init { .. } | Command::SignIn { .. } | Command::SignOut => {
            bail!("{:?} does not need the backend", command)
        }
    }
    Ok(())
}

fn print_notes(notes: &[Note]) {
    for note in notes {
        println!(
            "{}\t{}\t{}{}",
            note.id,
            note.name,
            util::text::summarize(&note.description, SUMMARY_WIDTH),
            if note.image.is_some() { "\t[image]" } else { "" }
        );
    }
}
