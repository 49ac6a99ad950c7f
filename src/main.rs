//! MediSeek CLI - symptom analysis, nearby services and the admin blog

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use mediseek::action::{self, Payload, ViewState};
use mediseek::blog::BlogPost;
use mediseek::config::{mask_api_key, MediSeekConfig};
use mediseek::context::AppContext;
use mediseek::error::{FixSuggestion, MediSeekError, Result};
use mediseek::form::FormData;
use mediseek::i18n::Language;
use mediseek::links::nearby_links;
use mediseek::render::{render_links, render_post_list, render_state, Render};
use mediseek::session::{self, AdminGate, GateDecision};

#[derive(Parser)]
#[command(name = "mediseek")]
#[command(about = "MediSeek - AI-assisted symptom analysis and health-service lookup")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    globals: Globals,
}

#[derive(Args, Clone)]
struct Globals {
    /// Response language (en, es, fr, de, hi)
    #[arg(long, global = true)]
    lang: Option<Language>,

    /// Override provider (gemini, openai, mock)
    #[arg(short, long, global = true)]
    provider: Option<String>,

    /// Override model
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Print the raw view-state as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest over-the-counter medicines, a specialty and a diet plan
    Analyze {
        /// Description of the symptoms (10-1000 characters)
        symptoms: String,
    },

    /// Generate illustrative nearby health services
    Find {
        #[command(subcommand)]
        target: FindTarget,
    },

    /// Print live map/search links for nearby services
    Nearby {
        /// Search around this place instead of "near me"
        location: Option<String>,
    },

    /// Read the blog
    Blog {
        #[command(subcommand)]
        action: BlogAction,
    },

    /// Admin session and post management
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum FindTarget {
    Pharmacies {
        location: String,
    },
    Doctors {
        location: String,
        /// Restrict to a specialty
        #[arg(long)]
        specialty: Option<String>,
    },
    Hospitals {
        location: String,
    },
    Labs {
        location: String,
    },
}

#[derive(Subcommand)]
enum BlogAction {
    /// List posts, newest first
    List,
    /// Show one post
    Show { slug: String },
}

#[derive(Args)]
struct PostArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    content: String,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    excerpt: Option<String>,
}

#[derive(Args)]
struct SessionArg {
    /// Session token from `admin login`
    #[arg(long, env = "MEDISEEK_SESSION")]
    session: Option<String>,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Log in and print a session token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// Admin page to continue to
        #[arg(long)]
        from: Option<String>,
    },
    /// Print the cookie that ends the session
    Logout,
    /// Show what the admin gate decides for a path
    Gate {
        path: String,
        #[command(flatten)]
        session: SessionArg,
    },
    CreatePost {
        #[command(flatten)]
        post: PostArgs,
        #[command(flatten)]
        session: SessionArg,
    },
    UpdatePost {
        id: String,
        #[command(flatten)]
        post: PostArgs,
        #[command(flatten)]
        session: SessionArg,
    },
    DeletePost {
        id: String,
        #[command(flatten)]
        session: SessionArg,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show effective configuration (keys masked)
    Show,
    /// Print the config file path
    Path,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            if let Some(suggestion) = e.fix_suggestion() {
                eprintln!("  {} {}", "Fix:".yellow(), suggestion);
            }
            std::process::exit(1);
        }
    }
}

/// `Ok(false)` when the view-state carries errors
async fn run(cli: Cli) -> Result<bool> {
    let globals = cli.globals;
    let command = match cli.command {
        Commands::Config { action } => return handle_config(action, &globals),
        command => command,
    };

    let config = load_config(&globals)?;
    let ctx = if matches!(command, Commands::Analyze { .. } | Commands::Find { .. }) {
        AppContext::init(config)?
    } else {
        AppContext::without_model(config)?
    };
    let lang = globals.lang.unwrap_or_else(|| ctx.default_language());

    let ok = match command {
        Commands::Analyze { symptoms } => {
            let form = with_language(FormData::new().with("symptoms", symptoms), lang);
            let state = action::handle_symptom_analysis(&ctx, &ViewState::initial(), &form).await;
            emit(&ctx, &globals, lang, &state)?
        }
        Commands::Find { target } => handle_find(&ctx, &globals, lang, target).await?,
        Commands::Nearby { location } => {
            let links = nearby_links(location.as_deref())?;
            if globals.json {
                let urls: Vec<&str> = links.iter().map(|l| l.url.as_str()).collect();
                println!("{}", serde_json::to_string_pretty(&urls)?);
            } else {
                print!("{}", render_links(&links, ctx.catalog(), lang));
            }
            true
        }
        Commands::Blog { action } => handle_blog(&ctx, &globals, lang, action).await?,
        Commands::Admin { action } => handle_admin(&ctx, &globals, lang, action).await?,
        Commands::Config { action } => handle_config(action, &globals)?,
    };

    ctx.shutdown().await;
    Ok(ok)
}

fn load_config(globals: &Globals) -> Result<MediSeekConfig> {
    let mut config = MediSeekConfig::load()?.with_env();
    if let Some(provider) = &globals.provider {
        config.ai.provider = Some(provider.clone());
    }
    if let Some(model) = &globals.model {
        config.ai.model = Some(model.clone());
    }
    Ok(config)
}

fn with_language(form: FormData, lang: Language) -> FormData {
    form.with("language", lang.code())
}

/// Print a view-state; returns whether it carries output
fn emit<T: Payload + Render>(
    ctx: &AppContext,
    globals: &Globals,
    lang: Language,
    state: &ViewState<T>,
) -> Result<bool> {
    if globals.json {
        println!("{}", serde_json::to_string_pretty(state)?);
    } else {
        print!("{}", render_state(state, ctx.catalog(), lang));
    }
    Ok(state.is_success())
}

async fn handle_find(
    ctx: &AppContext,
    globals: &Globals,
    lang: Language,
    target: FindTarget,
) -> Result<bool> {
    match target {
        FindTarget::Pharmacies { location } => {
            let form = with_language(FormData::new().with("location", location), lang);
            let state = action::handle_find_pharmacies(ctx, &ViewState::initial(), &form).await;
            emit(ctx, globals, lang, &state)
        }
        FindTarget::Doctors {
            location,
            specialty,
        } => {
            let mut form = FormData::new().with("location", location);
            if let Some(specialty) = specialty {
                form.insert("specialty", specialty);
            }
            let form = with_language(form, lang);
            let state = action::handle_find_doctors(ctx, &ViewState::initial(), &form).await;
            emit(ctx, globals, lang, &state)
        }
        FindTarget::Hospitals { location } => {
            let form = with_language(FormData::new().with("location", location), lang);
            let state = action::handle_find_hospitals(ctx, &ViewState::initial(), &form).await;
            emit(ctx, globals, lang, &state)
        }
        FindTarget::Labs { location } => {
            let form = with_language(FormData::new().with("location", location), lang);
            let state = action::handle_find_pathology_labs(ctx, &ViewState::initial(), &form).await;
            emit(ctx, globals, lang, &state)
        }
    }
}

async fn handle_blog(
    ctx: &AppContext,
    globals: &Globals,
    lang: Language,
    action: BlogAction,
) -> Result<bool> {
    let store = ctx.blog().await;
    match action {
        BlogAction::List => {
            let posts = store.list_all().await?;
            if globals.json {
                println!("{}", serde_json::to_string_pretty(&posts)?);
            } else if posts.is_empty() {
                println!("{}", "No posts yet.".dimmed());
            } else {
                print!("{}", render_post_list(&posts));
            }
        }
        BlogAction::Show { slug } => {
            let post: BlogPost = store
                .get_by_slug(&slug)
                .await?
                .ok_or(MediSeekError::PostNotFound { id: slug })?;
            if globals.json {
                println!("{}", serde_json::to_string_pretty(&post)?);
            } else {
                print!("{}", post.render(ctx.catalog(), lang));
            }
        }
    }
    Ok(true)
}

async fn handle_admin(
    ctx: &AppContext,
    globals: &Globals,
    lang: Language,
    action: AdminAction,
) -> Result<bool> {
    match action {
        AdminAction::Login {
            username,
            password,
            from,
        } => {
            let mut form = FormData::new()
                .with("username", username)
                .with("password", password);
            if let Some(from) = from {
                form.insert("from", from);
            }
            let state = action::handle_admin_login(ctx, &ViewState::initial(), &form).await;
            emit(ctx, globals, lang, &state)
        }
        AdminAction::Logout => {
            let state =
                action::handle_admin_logout(ctx, &ViewState::initial(), &FormData::new()).await;
            emit(ctx, globals, lang, &state)
        }
        AdminAction::Gate { path, session } => {
            let decision = AdminGate::new(ctx.signer()).check(&path, session.session.as_deref());
            match decision {
                GateDecision::Continue => println!("{} {}", "continue".green(), path),
                GateDecision::Redirect(to) => println!("{} {}", "redirect".yellow(), to),
            }
            Ok(true)
        }
        AdminAction::CreatePost { post, session } => {
            require_session(ctx, "/admin/create-post", &session)?;
            let form = post_form(post);
            let state = action::handle_create_post(ctx, &ViewState::initial(), &form).await;
            emit(ctx, globals, lang, &state)
        }
        AdminAction::UpdatePost { id, post, session } => {
            require_session(ctx, &format!("/admin/edit-post/{}", id), &session)?;
            let mut form = post_form(post);
            form.insert("postId", id);
            let state = action::handle_update_post(ctx, &ViewState::initial(), &form).await;
            emit(ctx, globals, lang, &state)
        }
        AdminAction::DeletePost { id, session } => {
            require_session(ctx, "/admin/manage-blogs", &session)?;
            let form = FormData::new().with("postId", id);
            let state = action::handle_delete_post(ctx, &ViewState::initial(), &form).await;
            emit(ctx, globals, lang, &state)
        }
    }
}

fn require_session(ctx: &AppContext, path: &str, session: &SessionArg) -> Result<()> {
    match AdminGate::new(ctx.signer()).check(path, session.session.as_deref()) {
        GateDecision::Continue => Ok(()),
        GateDecision::Redirect(_) => Err(MediSeekError::Unauthorized {
            path: path.to_string(),
        }),
    }
}

fn post_form(post: PostArgs) -> FormData {
    let mut form = FormData::new()
        .with("title", post.title)
        .with("content", post.content);
    if let Some(author) = post.author {
        form.insert("author", author);
    }
    if let Some(excerpt) = post.excerpt {
        form.insert("excerpt", excerpt);
    }
    form
}

fn handle_config(action: ConfigAction, globals: &Globals) -> Result<bool> {
    let path = MediSeekConfig::config_path();
    match action {
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Show => {
            let config = load_config(globals)?;
            let masked = |key: Option<&str>| {
                key.map(|k| mask_api_key(k, 6))
                    .unwrap_or_else(|| "(not set)".to_string())
            };
            println!("{}", "Configuration".cyan().bold());
            println!("  File:          {}", path.display());
            println!("  Provider:      {}", config.provider_name());
            println!(
                "  Model:         {}",
                config.ai.model.as_deref().unwrap_or("(default)")
            );
            println!("  Gemini key:    {}", masked(config.gemini_key()));
            println!("  OpenAI key:    {}", masked(config.openai_key()));
            println!("  Timeout:       {}s", config.ai.timeout_secs);
            println!(
                "  Language:      {} ({})",
                config.app.default_language.native_name(),
                config.app.default_language
            );
            println!("  Blog file:     {}", config.blog.data_path.display());
            println!("  Admin user:    {}", config.admin.username);
            println!(
                "  Admin login:   {}",
                if config.admin.login_password().is_ok() {
                    "enabled"
                } else if config.admin.password.is_none() {
                    "disabled (no password)"
                } else {
                    "disabled (no session secret)"
                }
            );
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                println!(
                    "{} Config already exists at {} (use --force to overwrite)",
                    "→".cyan(),
                    path.display()
                );
                return Ok(true);
            }
            // tokens must verify across processes, so the secret is persisted
            let mut config = MediSeekConfig::default();
            config.admin.session_secret = Some(session::generate_secret()?);
            config.save_to(&path)?;
            println!("{} Wrote {}", "✓".green(), path.display());
            println!("  Set ADMIN_PASSWORD (or [admin].password) to enable admin login");
        }
    }
    Ok(true)
}
