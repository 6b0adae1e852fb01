//! Microblog command line entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use microblog_common::Config;
use microblog_core::{
    CreatePostInput, FeedService, FollowOutcome, FollowService, PostService, RegisterInput,
    UpdateProfileInput, UserService,
};
use microblog_db::{
    entities::{post, user},
    repositories::{FollowerRepository, PostRepository, UserRepository},
};
use sea_orm::DatabaseConnection;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "microblog")]
#[command(about = "Microblog administration CLI", long_about = None)]
struct Cli {
    /// Configuration file (defaults to config/default.toml plus environment)
    #[arg(long, global = true, env = "MICROBLOG_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run pending database migrations
    Migrate,
    /// Register a new user
    Register {
        username: String,
        email: String,
        password: String,
    },
    /// Check a username and password
    Login { username: String, password: String },
    /// Publish a post as a user
    Post { username: String, body: String },
    /// Follow another user
    Follow { username: String, target: String },
    /// Stop following another user
    Unfollow { username: String, target: String },
    /// Show a user's feed
    Feed {
        username: String,
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Show every post, newest first
    Explore {
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Show a user's profile
    Profile { username: String },
    /// Set a user's bio
    SetBio { username: String, text: String },
}

struct App {
    users: UserService,
    follows: FollowService,
    posts: PostService,
    feeds: FeedService,
    user_repo: UserRepository,
}

impl App {
    fn new(db: &Arc<DatabaseConnection>, config: &Config) -> Self {
        let user_repo = UserRepository::new(Arc::clone(db));
        let post_repo = PostRepository::new(Arc::clone(db));

        Self {
            users: UserService::new(user_repo.clone(), config),
            follows: FollowService::new(FollowerRepository::new(Arc::clone(db))),
            posts: PostService::new(post_repo.clone()),
            feeds: FeedService::new(post_repo, user_repo.clone(), config),
            user_repo,
        }
    }

    /// Resolve a username and mark the user as active.
    async fn acting_user(&self, username: &str) -> Result<user::Model> {
        let user = self.users.get_by_username(username).await?;
        self.users.touch_last_seen(user.id).await?;
        Ok(user)
    }

    async fn print_posts(&self, posts: &[post::Model]) -> Result<()> {
        let mut author_ids: Vec<i32> = posts.iter().map(|p| p.user_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors = self.user_repo.find_by_ids(&author_ids).await?;

        for post in posts {
            let author = authors
                .iter()
                .find(|u| u.id == post.user_id)
                .map_or("?", |u| u.username.as_str());
            println!(
                "{} {author}: {}",
                post.timestamp.format("%Y-%m-%d %H:%M:%S"),
                post.body
            );
        }
        if posts.is_empty() {
            println!("(no posts)");
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "microblog=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    let db = Arc::new(microblog_db::init(&config).await?);

    if matches!(cli.command, Commands::Migrate) {
        microblog_db::migrate(&db).await?;
        info!("Migrations applied");
        return Ok(());
    }

    let app = App::new(&db, &config);
    run(&app, cli.command).await
}

async fn run(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Migrate => {}
        Commands::Register {
            username,
            email,
            password,
        } => {
            let user = app
                .users
                .register(RegisterInput {
                    username,
                    email,
                    password,
                })
                .await?;
            println!("Registered {} (id {})", user.username, user.id);
        }
        Commands::Login { username, password } => {
            let user = app.users.authenticate(&username, &password).await?;
            app.users.touch_last_seen(user.id).await?;
            println!("Welcome back, {}", user.username);
        }
        Commands::Post { username, body } => {
            let user = app.acting_user(&username).await?;
            let post = app.posts.create(user.id, CreatePostInput { body }).await?;
            println!("Posted (id {})", post.id);
        }
        Commands::Follow { username, target } => {
            let user = app.acting_user(&username).await?;
            let target = app.users.get_by_username(&target).await?;
            match app.follows.follow(user.id, target.id).await? {
                FollowOutcome::Changed => println!("You are following {}", target.username),
                FollowOutcome::Unchanged => {
                    println!("You are already following {}", target.username);
                }
            }
        }
        Commands::Unfollow { username, target } => {
            let user = app.acting_user(&username).await?;
            let target = app.users.get_by_username(&target).await?;
            match app.follows.unfollow(user.id, target.id).await? {
                FollowOutcome::Changed => println!("You are not following {}", target.username),
                FollowOutcome::Unchanged => {
                    println!("You were not following {}", target.username);
                }
            }
        }
        Commands::Feed { username, limit } => {
            let user = app.acting_user(&username).await?;
            let posts = app.feeds.feed_page(user.id, limit, None).await?;
            app.print_posts(&posts).await?;
        }
        Commands::Explore { limit } => {
            let posts = app.feeds.explore(limit, None).await?;
            app.print_posts(&posts).await?;
        }
        Commands::Profile { username } => {
            let user = app.users.get_by_username(&username).await?;
            println!("{}", user.username);
            if let Some(about_me) = &user.about_me {
                println!("  {about_me}");
            }
            if let Some(last_seen) = user.last_seen {
                println!("  last seen {}", last_seen.format("%Y-%m-%d %H:%M:%S"));
            }
            println!(
                "  {} followers, {} following, {} posts",
                app.follows.follower_count(user.id).await?,
                app.follows.following_count(user.id).await?,
                app.feeds.post_count(user.id).await?
            );
            println!("  avatar {}", app.users.avatar_url(&user, None)?);
            let posts = app.feeds.user_posts(user.id, None, None).await?;
            app.print_posts(&posts).await?;
        }
        Commands::SetBio { username, text } => {
            let user = app.acting_user(&username).await?;
            let about_me = if text.is_empty() { None } else { Some(text) };
            let updated = app
                .users
                .update_profile(
                    user.id,
                    UpdateProfileInput {
                        username: user.username,
                        about_me,
                    },
                )
                .await?;
            println!("Updated profile of {}", updated.username);
        }
    }

    Ok(())
}
