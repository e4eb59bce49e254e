//! runa-translate CLI - Quechua/Spanish translation with local history

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use runa_translate_lib::core::features::translator::assess_health;
use runa_translate_lib::shared::languages::{self, SUPPORTED_LANGUAGES, TRANSLATION_DIRECTIONS};
use runa_translate_lib::shared::types::{
    ConfidenceLevel, HistoryEntry, PreferencesPatch, TranslationResult,
};
use runa_translate_lib::{init_logging, AppResult, ClientSettings, TranslatorSession};

#[derive(Parser)]
#[command(name = "runa-translate")]
#[command(version)]
#[command(about = "Quechua/Spanish translator with local history and favorites", long_about = None)]
struct Cli {
    /// Backend base URL (overrides settings and RUNA_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate one text and record it in the history
    Translate {
        #[arg(required = true)]
        text: Vec<String>,

        /// Source language (defaults to preferences)
        #[arg(long)]
        from: Option<String>,

        /// Target language (defaults to preferences)
        #[arg(long)]
        to: Option<String>,
    },

    /// Translate several texts in one request
    Batch {
        #[arg(required = true)]
        texts: Vec<String>,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,
    },

    /// List the translation history, newest first
    History {
        /// Case-insensitive filter on original or translated text
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long, requires = "to")]
        from: Option<String>,

        #[arg(long, requires = "from")]
        to: Option<String>,
    },

    /// List favorites
    Favorites,

    /// Add a history entry to the favorites
    Favorite { history_id: String },

    /// Remove a history entry or favorite by id
    Forget { id: String },

    /// Delete the whole history
    ClearHistory,

    /// Show or change preferences
    Prefs {
        #[arg(long)]
        save_history: Option<bool>,

        #[arg(long)]
        max_history: Option<usize>,

        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        target: Option<String>,
    },

    /// Check the backend health
    Health,

    /// Show information about the translation model
    ModelInfo,

    /// List supported languages
    Languages,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the command succeeded.
async fn run(cli: Cli) -> AppResult<bool> {
    let mut settings = ClientSettings::load().await?;
    if let Some(url) = cli.api_url {
        settings.api_base_url = url;
    }
    tracing::debug!(api = %settings.api_base_url, "settings loaded");

    let session = TranslatorSession::from_settings(&settings)?;
    let store = session.store().clone();

    match cli.command {
        Commands::Translate { text, from, to } => {
            apply_direction(&session, from, to)?;
            match session.translate_text(&text.join(" ")).await {
                Some(result) => {
                    print_result(&result);
                    Ok(true)
                }
                None => report_lifecycle_error(&session),
            }
        }
        Commands::Batch { texts, from, to } => {
            apply_direction(&session, from, to)?;
            match session.batch_translate(&texts).await {
                Some(results) => {
                    for (text, result) in texts.iter().zip(&results) {
                        println!("{} => {}", text, result.translated_text);
                    }
                    Ok(true)
                }
                None => report_lifecycle_error(&session),
            }
        }
        Commands::History { search, from, to } => {
            let direction = match (from.as_deref(), to.as_deref()) {
                (Some(from), Some(to)) => {
                    Some((languages::validate_code(from)?, languages::validate_code(to)?))
                }
                _ => None,
            };
            let entries = store.query_history(search.as_deref(), direction);
            if entries.is_empty() {
                println!("No hay traducciones en el historial");
            }
            for entry in &entries {
                print_history_entry(entry);
            }
            Ok(true)
        }
        Commands::Favorites => {
            let favorites = store.favorites();
            if favorites.is_empty() {
                println!("No hay favoritos");
            }
            for fav in favorites {
                println!(
                    "{}  [{}→{}] {} => {}",
                    fav.favorite_id,
                    fav.source_language,
                    fav.target_language,
                    fav.original_text,
                    fav.translated_text
                );
            }
            Ok(true)
        }
        Commands::Favorite { history_id } => {
            if store.find_history(&history_id).is_none() {
                eprintln!("No existe la entrada {}", history_id);
                return Ok(false);
            }
            match session.favorite_from_history(&history_id) {
                Some(fav) => println!("Añadido a favoritos: {}", fav.favorite_id),
                None => println!("Ya está en favoritos"),
            }
            Ok(true)
        }
        Commands::Forget { id } => {
            let removed = store.remove_from_history(&id) || store.remove_from_favorites(&id);
            if !removed {
                eprintln!("No existe la entrada {}", id);
            }
            Ok(removed)
        }
        Commands::ClearHistory => {
            store.clear_history();
            println!("Historial borrado");
            Ok(true)
        }
        Commands::Prefs {
            save_history,
            max_history,
            source,
            target,
        } => {
            if let Some(code) = source.as_deref() {
                languages::validate_code(code)?;
            }
            if let Some(code) = target.as_deref() {
                languages::validate_code(code)?;
            }
            let patch = PreferencesPatch {
                default_source_language: source,
                default_target_language: target,
                save_history,
                max_history_items: max_history,
            };
            let prefs = if patch == PreferencesPatch::default() {
                store.preferences()
            } else {
                store.update_preferences(patch)
            };
            println!("defaultSourceLanguage = {}", prefs.default_source_language);
            println!("defaultTargetLanguage = {}", prefs.default_target_language);
            println!("saveHistory           = {}", prefs.save_history);
            println!("maxHistoryItems       = {}", prefs.max_history_items);
            Ok(true)
        }
        Commands::Health => {
            let envelope = session.lifecycle().gateway().health_check().await;
            let healthy = assess_health(&envelope);
            match &envelope.data {
                Some(report) => {
                    println!("status: {}", report.status);
                    if let Some(uptime) = report.uptime {
                        println!("uptime: {:.0}s", uptime);
                    }
                    if let Some(env) = &report.environment {
                        println!("environment: {}", env);
                    }
                }
                None => println!(
                    "{}",
                    envelope
                        .error
                        .as_deref()
                        .unwrap_or("No se puede conectar con el servidor de traducción")
                ),
            }
            println!("{}", if healthy { "Servicio disponible" } else { "Servicio no disponible" });
            Ok(healthy)
        }
        Commands::ModelInfo => {
            let resource = session.model_info_resource();
            resource.activate(Vec::<String>::new()).await;
            let state = resource.snapshot();
            match (state.data, state.error) {
                (_, Some(error)) => {
                    eprintln!("{}", error);
                    Ok(false)
                }
                (Some(info), None) => {
                    println!("model: {} ({})", info.model_name, info.version);
                    println!("real model: {}", if info.has_real_model { "sí" } else { "no" });
                    println!("vocabulary: {}", info.vocabulary_size);
                    Ok(true)
                }
                (None, None) => Ok(false),
            }
        }
        Commands::Languages => {
            let envelope = session.lifecycle().gateway().supported_languages().await;
            match envelope.data {
                Some(remote) => {
                    for lang in remote {
                        println!("{}  {}", lang.code, lang.name);
                    }
                }
                None => {
                    tracing::warn!(error = ?envelope.error, "backend language list unavailable, using built-in catalogue");
                    for lang in SUPPORTED_LANGUAGES {
                        println!("{} {}  {} ({})", lang.flag, lang.code, lang.name, lang.native_name);
                    }
                }
            }
            for dir in TRANSLATION_DIRECTIONS {
                println!();
                println!("{}", dir.label);
                for phrase in languages::examples(dir.from) {
                    println!("  {}", phrase);
                }
            }
            Ok(true)
        }
    }
}

fn apply_direction(session: &TranslatorSession, from: Option<String>, to: Option<String>) -> AppResult<()> {
    if from.is_none() && to.is_none() {
        return Ok(());
    }
    let view = session.view();
    let from = from.unwrap_or(view.source_language);
    let to = to.unwrap_or(view.target_language);
    session.set_languages(&from, &to)?;
    if languages::direction(&from, &to).is_none() {
        tracing::warn!(%from, %to, "source and target language are the same");
    }
    Ok(())
}

fn report_lifecycle_error(session: &TranslatorSession) -> AppResult<bool> {
    if let Some(error) = session.lifecycle().error() {
        eprintln!("{}", error);
    }
    Ok(false)
}

fn print_result(result: &TranslationResult) {
    println!("{}", result.translated_text);
    println!(
        "{} · {}",
        ConfidenceLevel::label(result.confidence),
        result.method
    );
    if let Some(ms) = result.processing_time {
        println!("{} ms", ms);
    }
}

fn print_history_entry(entry: &HistoryEntry) {
    println!(
        "{}  {}  [{}→{}] {} => {}",
        entry.id,
        entry.timestamp.format("%Y-%m-%d %H:%M"),
        entry.source_language,
        entry.target_language,
        entry.original_text,
        entry.translated_text
    );
}
