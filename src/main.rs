//! Bulk CLI
//!
//! Command-line client for the Bulk community platform:
//! - Log in and out (the session persists between runs)
//! - Browse the feed, communities, posts and notifications
//! - Like, comment, join and subscribe

use anyhow::{bail, Context};
use bulk::dto::{CommunityQuery, CommunitySort, Registration};
use bulk::{BulkApp, ClientError, Config, GuardOutcome, Role, Route, Theme, ToggleOutcome};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "bulk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Command-line client for the Bulk community platform")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/bulk/config.toml or ./bulk.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL, overriding the config file
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    #[command(flatten)]
    App(AppCommand),
}

/// Commands that run against the backend and the stored session
#[derive(Subcommand)]
pub enum AppCommand {
    /// Log in with email and password
    Login {
        email: String,
        #[arg(short, long, env = "BULK_PASSWORD")]
        password: String,
    },

    /// Create an account
    Register {
        name: String,
        username: String,
        email: String,
        #[arg(short, long, env = "BULK_PASSWORD")]
        password: String,
        /// Account role (creator, crew)
        #[arg(short, long, default_value = "crew")]
        role: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Personalized feed
    Feed {
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Creator dashboard
    Dashboard,

    /// Browse the community directory
    Communities {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Sort order (recent, popular, name)
        #[arg(long, default_value = "recent")]
        sort: String,
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Show one community with its plans
    Community { id: String },

    /// Join a community (or leave it with --leave)
    Join {
        id: String,
        #[arg(long)]
        leave: bool,
    },

    /// Posts of a community
    Posts {
        community_id: String,
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Show a post with its comments
    Post { id: String },

    /// Toggle your like on a post
    Like { post_id: String },

    /// Comment on a post
    Comment { post_id: String, text: String },

    /// Search users, communities and posts
    Search { query: String },

    /// Notification feed
    Notifications {
        /// Mark everything as read afterwards
        #[arg(long)]
        mark_read: bool,
    },

    /// Subscribe to a plan; without arguments, list your subscriptions
    Subscribe {
        plan_id: Option<String>,
        /// Cancel a subscription by id
        #[arg(long)]
        cancel: Option<String>,
    },

    /// Show or change the theme (light, dark, toggle)
    Theme { value: Option<String> },

    /// Check whether the current session may open a path
    Route { path: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match Config::load_with_env(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    init_logging(&config);

    if let Err(e) = run(cli, config).await {
        report(&e);
        std::process::exit(1);
    }
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bulk={}", config.logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn report(error: &anyhow::Error) {
    match error.downcast_ref::<ClientError>() {
        Some(client_error) => {
            eprintln!("Error: {}", client_error.user_message());
            for field in client_error.field_errors() {
                eprintln!("  {}: {}", field.field, field.message);
            }
            if client_error.is_unauthorized() {
                eprintln!();
                eprintln!("Log in again with:");
                eprintln!("  bulk login <email>");
            }
        }
        None => eprintln!("Error: {:#}", error),
    }
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    match cli.command {
        Commands::Config { output } => write_config(output),
        Commands::App(command) => {
            let app = BulkApp::open(config)?;
            execute(app, command, cli.format == "json").await
        }
    }
}

fn write_config(output: Option<PathBuf>) -> anyhow::Result<()> {
    let content = bulk::generate_default_config();
    match output {
        Some(path) => {
            std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
            println!("Config written to {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

async fn execute(app: BulkApp, command: AppCommand, json: bool) -> anyhow::Result<()> {
    match command {
        AppCommand::Login { email, password } => {
            let session = app.login(&email, &password).await?;
            println!(
                "Logged in as {} (@{}, {})",
                session.display_name(),
                session.username(),
                session.role()
            );
        }

        AppCommand::Register {
            name,
            username,
            email,
            password,
            role,
        } => {
            let role = role.parse::<Role>().map_err(anyhow::Error::msg)?;
            let session = app
                .register(&Registration {
                    name,
                    username,
                    email,
                    password,
                    role,
                })
                .await?;
            println!("Welcome to Bulk, {}!", session.display_name());
        }

        AppCommand::Logout => {
            app.logout();
            println!("Logged out.");
        }

        AppCommand::Whoami => match app.session().current_session() {
            Some(session) if json => print_json(&session.user)?,
            Some(session) => {
                println!("{} (@{})", session.display_name(), session.username());
                println!("Role: {}", session.role());
                if let Some(email) = &session.user.email {
                    println!("Email: {}", email);
                }
            }
            None => println!("Not logged in."),
        },

        AppCommand::Feed { page } => {
            require(&app, &Route::Feed)?;
            let page = app.profile().feed(page).await?;
            if json {
                print_json(&page)?;
            } else {
                print_posts(&page.items);
                print_page_footer(page.page, page.total_pages);
            }
        }

        AppCommand::Dashboard => {
            require(&app, &Route::Dashboard)?;
            let dashboard = app.profile().dashboard().await?;
            if json {
                print_json(&dashboard)?;
            } else {
                println!("Subscribers:     {}", dashboard.total_subscribers);
                println!("Members:         {}", dashboard.total_members);
                println!("Posts:           {}", dashboard.total_posts);
                println!("Likes:           {}", dashboard.total_likes);
                println!("Monthly revenue: {:.2}", dashboard.monthly_revenue);
                if !dashboard.communities.is_empty() {
                    println!();
                    print_communities(&dashboard.communities);
                }
            }
        }

        AppCommand::Communities {
            search,
            category,
            sort,
            page,
        } => {
            let query = CommunityQuery {
                search,
                category,
                sort: sort.parse::<CommunitySort>().map_err(anyhow::Error::msg)?,
            };
            let page = app.communities().list(&query, page).await?;
            if json {
                print_json(&page)?;
            } else if page.items.is_empty() {
                println!("No communities found.");
            } else {
                print_communities(&page.items);
                print_page_footer(page.page, page.total_pages);
            }
        }

        AppCommand::Community { id } => {
            let (community, plans) =
                tokio::try_join!(app.communities().get(&id), app.communities().plans(&id))?;
            if json {
                print_json(&serde_json::json!({ "community": community, "plans": plans }))?;
            } else {
                println!("{}", community.name);
                if !community.description.is_empty() {
                    println!("{}", community.description);
                }
                println!("Members: {}", community.member_count);
                if !plans.is_empty() {
                    println!();
                    println!("{:<12} {:<20} {:>10}", "Plan", "Name", "Price");
                    println!("{}", "-".repeat(44));
                    for plan in plans {
                        println!(
                            "{:<12} {:<20} {:>6.2} {}",
                            plan.id, plan.name, plan.price, plan.currency
                        );
                    }
                }
            }
        }

        AppCommand::Join { id, leave } => {
            require(&app, &Route::Community { id: id.clone() })?;
            if leave {
                app.communities().leave(&id).await?;
                println!("Left community {}.", id);
            } else {
                app.communities().join(&id).await?;
                println!("Joined community {}.", id);
            }
        }

        AppCommand::Posts { community_id, page } => {
            let page = app.posts().list_for_community(&community_id, page).await?;
            if json {
                print_json(&page)?;
            } else {
                print_posts(&page.items);
                print_page_footer(page.page, page.total_pages);
            }
        }

        AppCommand::Post { id } => {
            require(&app, &Route::Post { id: id.clone() })?;
            let (post, comments) =
                tokio::try_join!(app.open_post(&id), app.comments().list(&id, 1))?;
            if json {
                print_json(&serde_json::json!({ "post": post, "comments": comments.items }))?;
            } else {
                print_posts(std::slice::from_ref(&post));
                println!();
                for comment in &comments.items {
                    let author = comment
                        .author
                        .as_ref()
                        .map(|a| a.username.as_str())
                        .unwrap_or("?");
                    println!("  @{}: {}", author, comment.content);
                }
            }
        }

        AppCommand::Like { post_id } => {
            require(&app, &Route::Post { id: post_id.clone() })?;
            app.open_post(&post_id).await?;
            match app.toggle_like(&post_id).await? {
                ToggleOutcome::Confirmed(state) => println!(
                    "{} ({} likes)",
                    if state.liked { "Liked" } else { "Unliked" },
                    state.like_count
                ),
                ToggleOutcome::Ignored => println!("A like request is already pending."),
            }
        }

        AppCommand::Comment { post_id, text } => {
            require(&app, &Route::Post { id: post_id.clone() })?;
            let comment = app.comments().create(&post_id, &text).await?;
            println!("Comment {} posted.", comment.id);
        }

        AppCommand::Search { query } => {
            if query.trim().is_empty() {
                bail!("search query is empty");
            }
            let results = app.search().search(query.trim()).await?;
            if json {
                print_json(&results)?;
            } else if results.is_empty() {
                println!("No results for \"{}\".", query.trim());
            } else {
                if !results.users.is_empty() {
                    println!("Users:");
                    for user in &results.users {
                        println!("  @{:<20} {}", user.username, user.name);
                    }
                }
                if !results.communities.is_empty() {
                    println!("Communities:");
                    print_communities(&results.communities);
                }
                if !results.posts.is_empty() {
                    println!("Posts:");
                    print_posts(&results.posts);
                }
            }
        }

        AppCommand::Notifications { mark_read } => {
            require(&app, &Route::Notifications)?;
            let page = app.notifications().list(1).await?;
            if json {
                print_json(&page)?;
            } else if page.items.is_empty() {
                println!("No notifications.");
            } else {
                for notification in &page.items {
                    let marker = if notification.read { " " } else { "*" };
                    println!("{} [{}] {}", marker, notification.kind, notification.message);
                }
            }
            if mark_read {
                app.notifications().mark_as_read(&[]).await?;
            }
        }

        AppCommand::Subscribe { plan_id, cancel } => {
            require(&app, &Route::Subscriptions)?;
            if let Some(id) = cancel {
                app.subscriptions().cancel(&id).await?;
                println!("Subscription {} cancelled.", id);
            } else if let Some(plan_id) = plan_id {
                let subscription = app.subscriptions().subscribe(&plan_id).await?;
                println!("Subscribed ({}).", subscription.id);
            } else {
                let subscriptions = app.subscriptions().mine().await?;
                if json {
                    print_json(&subscriptions)?;
                } else if subscriptions.is_empty() {
                    println!("No subscriptions.");
                } else {
                    println!("{:<12} {:<12} {:<12} {}", "ID", "Community", "Plan", "Status");
                    println!("{}", "-".repeat(50));
                    for s in subscriptions {
                        println!(
                            "{:<12} {:<12} {:<12} {}",
                            s.id, s.community_id, s.plan_id, s.status
                        );
                    }
                }
            }
        }

        AppCommand::Theme { value } => {
            let theme = match value.as_deref() {
                None => app.theme().load(),
                Some("toggle") => app.theme().toggle()?,
                Some(value) => {
                    let theme: Theme = value.parse().map_err(anyhow::Error::msg)?;
                    app.theme().set(theme)?;
                    theme
                }
            };
            println!("Theme: {}", theme);
        }

        AppCommand::Route { path } => {
            let resolution = app.router().resolve(&path);
            match resolution.outcome {
                GuardOutcome::Allow => println!("{}: allowed", resolution.route),
                GuardOutcome::Loading => println!("{}: session loading", resolution.route),
                GuardOutcome::RedirectToLogin { from } => {
                    println!("{}: login required (returns to {})", resolution.route, from)
                }
                GuardOutcome::Deny { message, home } => {
                    println!("{}: {} (back to {})", resolution.route, message, home)
                }
            }
        }
    }

    Ok(())
}

/// Run the route guard before a command that needs a session
fn require(app: &BulkApp, route: &Route) -> anyhow::Result<()> {
    match app.visit(&route.path()).outcome {
        GuardOutcome::Allow | GuardOutcome::Loading => Ok(()),
        GuardOutcome::RedirectToLogin { .. } => {
            bail!("you need to log in first: bulk login <email>")
        }
        GuardOutcome::Deny { message, .. } => bail!(message),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_posts(posts: &[bulk::Post]) {
    if posts.is_empty() {
        println!("No posts yet.");
        return;
    }
    for post in posts {
        let author = post
            .author
            .as_ref()
            .map(|a| a.username.as_str())
            .unwrap_or("?");
        let premium = if post.is_premium { " [premium]" } else { "" };
        let liked = if post.liked_by_me { " (liked)" } else { "" };
        println!("{} @{}{}", post.id, author, premium);
        if let Some(title) = &post.title {
            println!("  {}", title);
        }
        println!("  {}", truncate(&post.content, 120));
        println!(
            "  {} likes{}, {} comments",
            post.like_count, liked, post.comment_count
        );
    }
}

fn print_communities(communities: &[bulk::Community]) {
    println!("{:<12} {:<30} {:>8}", "ID", "Name", "Members");
    println!("{}", "-".repeat(52));
    for community in communities {
        println!(
            "{:<12} {:<30} {:>8}",
            community.id,
            truncate(&community.name, 30),
            community.member_count
        );
    }
}

fn print_page_footer(page: u32, total_pages: u32) {
    if total_pages > 1 {
        println!();
        println!("Page {} of {}", page, total_pages);
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
