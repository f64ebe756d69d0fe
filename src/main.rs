// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use drillquiz_i18n::app_config::{self, Config};
use drillquiz_i18n::content::{
    ActingUser, EntityKind, LocalizedEntity, LocalizedFieldAccessor, LogicalField,
    MultilingualContentManager, UpdateRequest,
};
use drillquiz_i18n::database::{DatabaseConnection, Repository, UserProfile};
use drillquiz_i18n::language::{self, Language};
use drillquiz_i18n::translation::TranslationGateway;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate free text through the configured providers
    Translate {
        /// Source language code
        #[arg(long = "from")]
        from: Language,

        /// Target language code
        #[arg(long = "to")]
        to: Language,

        /// Texts to translate
        #[arg(value_name = "TEXT", required = true)]
        texts: Vec<String>,
    },

    /// Create an entity from fields written in one language
    Create {
        /// Entity kind (study, exam, question, study-task, tag, tag-category)
        #[arg(long)]
        kind: EntityKind,

        /// Language the fields are written in
        #[arg(long)]
        lang: Language,

        /// Field value as FIELD=VALUE (repeatable)
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_field_assignment)]
        set: Vec<(LogicalField, String)>,

        /// Entity id (a new UUID when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Acting user id (anonymous when omitted)
        #[arg(long)]
        user: Option<String>,
    },

    /// Write source fields (optional) and translate missing content
    Sync {
        /// Entity id
        #[arg(long)]
        entity: String,

        /// Language the content was written in
        #[arg(long)]
        source: Language,

        /// Field value as FIELD=VALUE written before syncing (repeatable)
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_field_assignment)]
        set: Vec<(LogicalField, String)>,

        /// Restrict translation to these fields
        #[arg(long, value_delimiter = ',')]
        fields: Vec<LogicalField>,

        /// Acting user id (anonymous when omitted)
        #[arg(long)]
        user: Option<String>,

        /// Keep the supported language set as it is
        #[arg(long)]
        skip_completion: bool,
    },

    /// Translate an entity into one language now, overwriting existing content
    Retranslate {
        /// Entity id
        #[arg(long)]
        entity: String,

        /// Source language code
        #[arg(long = "from")]
        from: Language,

        /// Target language code
        #[arg(long = "to")]
        to: Language,

        /// Restrict to these fields
        #[arg(long, value_delimiter = ',')]
        fields: Vec<LogicalField>,
    },

    /// Print an entity, or its localized view in one language
    Show {
        /// Entity id
        #[arg(long)]
        entity: String,

        /// Display language code; unsupported codes use the default language
        #[arg(long)]
        lang: Option<String>,

        /// Print localized placeholders ("No Title", "제목 없음", ...) for missing fields
        #[arg(long)]
        placeholder: bool,
    },

    /// List stored entities
    List {
        /// Only entities of this kind
        #[arg(long)]
        kind: Option<EntityKind>,
    },

    /// Remove a language from an entity's supported languages
    RemoveLanguage {
        /// Entity id
        #[arg(long)]
        entity: String,

        /// Language to remove
        #[arg(long)]
        lang: Language,
    },

    /// Resolve the display language of a request
    Resolve {
        /// Explicit `lang` request parameter
        #[arg(long)]
        lang: Option<String>,

        /// Acting user id
        #[arg(long)]
        user: Option<String>,

        /// `Accept-Language` header value
        #[arg(long)]
        accept_language: Option<String>,
    },

    /// Show or update a user's language and auto-translation settings
    Profile {
        /// User id
        #[arg(long)]
        user: String,

        /// Preferred display language code
        #[arg(long)]
        language: Option<String>,

        /// Enable or disable auto-translation of the user's content
        #[arg(long)]
        auto_translate: Option<bool>,
    },

    /// Show provider availability, cache and database statistics
    Status {
        /// Send a test request to every provider
        #[arg(long)]
        probe: bool,
    },

    /// Generate shell completions for drillquiz-i18n
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// drillquiz-i18n - Multilingual content engine for DrillQuiz
///
/// Keeps quiz and study content translated and consistent across Korean,
/// English, Spanish, Chinese and Japanese.
#[derive(Parser, Debug)]
#[command(name = "drillquiz-i18n")]
#[command(version)]
#[command(about = "Multilingual content engine for DrillQuiz")]
#[command(long_about = "drillquiz-i18n stores localized quiz content and machine-translates missing languages.

EXAMPLES:
    drillquiz-i18n create --kind question --lang ko --set title=제목 --set content=내용 --set answer=정답
    drillquiz-i18n sync --entity <ID> --source en --set title=\"New title\"
    drillquiz-i18n show --entity <ID> --lang ja
    drillquiz-i18n translate --from ko --to en \"안녕하세요\"
    drillquiz-i18n resolve --accept-language \"ja-JP,ja;q=0.9,en;q=0.8\"
    drillquiz-i18n profile --user alice --auto-translate false
    drillquiz-i18n status --probe
    drillquiz-i18n completions bash > drillquiz-i18n.bash

CONFIGURATION:
    Configuration is stored in drillquiz-i18n.json by default. You can specify a
    different config file with --config-path. If the config file doesn't exist,
    a default one will be created automatically. API keys may be left empty in
    the file and provided through OPENAI_API_KEY, GEMINI_API_KEY or
    ANTHROPIC_API_KEY.

SUPPORTED PROVIDERS:
    openai    - OpenAI API (primary by default)
    gemini    - Google Gemini API (fallback by default)
    anthropic - Anthropic Claude API")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "drillquiz-i18n.json", global = true)]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// SQLite database file (overrides the config)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

fn parse_field_assignment(value: &str) -> Result<(LogicalField, String), String> {
    let (field, text) = value
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", value))?;
    let field = field.parse::<LogicalField>().map_err(|e| e.to_string())?;
    Ok((field, text.to_string()))
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and emoji for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌ "),
            Level::Warn => ("1;33", "🚧 "),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "🔍 "),
            Level::Trace => ("1;35", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, emoji) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                colour,
                now,
                emoji,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Loaded configuration and store shared by the commands
struct App {
    config: Config,
    repo: Repository,
}

impl App {
    fn open(config: Config) -> Result<Self> {
        let db = DatabaseConnection::open(config.database.path.as_deref())?;
        Ok(Self {
            config,
            repo: Repository::new(db),
        })
    }

    fn accessor(&self) -> LocalizedFieldAccessor {
        LocalizedFieldAccessor::new(self.config.default_language)
    }

    fn gateway(&self) -> Result<TranslationGateway> {
        self.config
            .validate()
            .context("Configuration validation failed")?;
        TranslationGateway::from_config(&self.config)
    }

    fn manager(&self) -> Result<MultilingualContentManager> {
        Ok(MultilingualContentManager::new(
            Arc::new(self.gateway()?),
            Arc::new(self.repo.clone()),
            Arc::new(self.repo.clone()),
        ))
    }

    async fn load(&self, id: &str) -> Result<LocalizedEntity> {
        self.repo
            .load_entity(id)
            .await?
            .ok_or_else(|| anyhow!("Entity not found: {}", id))
    }
}

fn acting_user(user: Option<String>) -> ActingUser {
    user.map(ActingUser::User).unwrap_or(ActingUser::Anonymous)
}

fn print_completions(shell: Shell) {
    let mut cmd = CommandLineOptions::command();
    generate(shell, &mut cmd, "drillquiz-i18n", &mut std::io::stdout());
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config says otherwise
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(level) = &cli.log_level {
        log::set_max_level(app_config::LogLevel::from(level.clone()).to_level_filter());
    }

    if let Commands::Completions { shell } = cli.command {
        print_completions(shell);
        return Ok(());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    config.apply_env_overrides();
    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }
    if let Some(db) = cli.db {
        config.database.path = Some(db);
    }

    let app = App::open(config)?;

    if let Err(e) = run(&app, cli.command).await {
        error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Translate { from, to, texts } => {
            let gateway = app.gateway()?;
            let translations = gateway.translate_texts(&texts, from, to).await?;
            for translation in translations {
                println!("{}", translation);
            }
        }

        Commands::Create {
            kind,
            lang,
            set,
            id,
            user,
        } => {
            let id = id.unwrap_or_else(Repository::new_entity_id);
            if app.repo.load_entity(&id).await?.is_some() {
                return Err(anyhow!("Entity already exists: {}", id));
            }

            let mut entity = LocalizedEntity::new(id, kind, lang);
            for (field, value) in set {
                entity.set_field(lang, field, value)?;
            }
            app.repo.save_entity(&entity).await?;
            info!("Created {} '{}'", entity.kind(), entity.id());

            let outcome = app
                .manager()?
                .handle_update(&mut entity, &acting_user(user), &UpdateRequest::new(lang))
                .await?;
            print_json(&outcome)?;
        }

        Commands::Sync {
            entity,
            source,
            set,
            fields,
            user,
            skip_completion,
        } => {
            let mut entity = app.load(&entity).await?;
            if !set.is_empty() {
                for (field, value) in set {
                    entity.set_field(source, field, value)?;
                }
                app.repo.save_entity(&entity).await?;
            }

            let request = UpdateRequest::new(source)
                .fields(fields)
                .skip_completion_update(skip_completion);
            let outcome = app
                .manager()?
                .handle_update(&mut entity, &acting_user(user), &request)
                .await?;
            print_json(&outcome)?;
        }

        Commands::Retranslate {
            entity,
            from,
            to,
            fields,
        } => {
            let mut entity = app.load(&entity).await?;
            let outcome = app
                .manager()?
                .translate_now(&mut entity, from, to, &fields)
                .await?;
            print_json(&outcome)?;
        }

        Commands::Show {
            entity,
            lang,
            placeholder,
        } => {
            let entity = app.load(&entity).await?;
            let accessor = app.accessor();
            match lang {
                None => print_json(&entity)?,
                Some(code) => {
                    let lang = Language::from_code(&code).unwrap_or_else(|| {
                        warn!(
                            "Unsupported language '{}', showing {}",
                            code,
                            accessor.default_language()
                        );
                        accessor.default_language()
                    });
                    if placeholder {
                        for field in entity.kind().translatable_fields() {
                            println!(
                                "{}: {}",
                                field,
                                accessor.get_field_or_placeholder(&entity, *field, lang)
                            );
                        }
                    } else {
                        print_json(&accessor.localized_view(&entity, lang))?;
                    }
                }
            }
        }

        Commands::List { kind } => {
            print_json(&app.repo.list_entities(kind).await?)?;
        }

        Commands::RemoveLanguage { entity, lang } => {
            let mut entity = app.load(&entity).await?;
            let removed = app.manager()?.remove_supported_language(&mut entity, lang).await?;
            if !removed {
                warn!("{} was not a supported language of '{}'", lang, entity.id());
            }
            println!("{}", entity.supported_languages());
        }

        Commands::Resolve {
            lang,
            user,
            accept_language,
        } => {
            let resolved = language::resolve_for_user(
                &app.repo,
                &acting_user(user),
                lang.as_deref(),
                accept_language.as_deref(),
                app.config.default_language,
            )
            .await;
            println!("{} ({})", resolved.code(), resolved.english_name());
        }

        Commands::Profile {
            user,
            language,
            auto_translate,
        } => {
            let mut profile = app
                .repo
                .get_profile(&user)
                .await?
                .unwrap_or_else(|| UserProfile::new(&user));

            if language.is_some() || auto_translate.is_some() {
                if let Some(language) = language {
                    if !Language::is_supported(&language) {
                        warn!("'{}' is not a supported language; it will be ignored when resolving", language);
                    }
                    profile = profile.with_language(language);
                }
                if let Some(enabled) = auto_translate {
                    profile = profile.with_auto_translation(enabled);
                }
                app.repo.upsert_profile(&profile).await?;
                info!("Updated profile of {}", user);
            }

            print_json(&profile)?;
        }

        Commands::Status { probe } => {
            let gateway = app.gateway()?;
            if probe {
                for (name, result) in gateway.probe_providers().await {
                    match result {
                        Ok(()) => info!("Provider '{}' is reachable", name),
                        Err(e) => warn!("Provider '{}' failed: {}", name, e),
                    }
                }
            }

            #[derive(Serialize)]
            struct Status {
                gateway: drillquiz_i18n::translation::GatewayStatus,
                database: drillquiz_i18n::database::DatabaseStats,
            }

            print_json(&Status {
                gateway: gateway.status(),
                database: app.repo.connection().stats()?,
            })?;
        }

        Commands::Completions { shell } => print_completions(shell),
    }

    Ok(())
}
