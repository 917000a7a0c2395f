use anyhow::Context;
use clap::{Parser, Subcommand};
use imagefeed::auth;
use imagefeed::models::Photo;
use imagefeed::{AppBuilder, AppDependencies, UnsplashConfig};
use reqwest::Url;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Unsplash photo feed client", long_about = None)]
struct Cli {
    /// Verbose mode
    /// Optional. Log debug messages unless RUST_LOG says otherwise.
    #[clap(short = 'v', long, help = "Print verbose messages")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the URL to open in a browser to authorize this application
    AuthUrl,

    /// Exchange an authorization code (or the full redirect URL) for a token
    Login { code: String },

    /// Show the signed-in user's profile and avatar
    Profile,

    /// List photos from the feed
    Feed {
        #[clap(short = 'n', long, default_value = "1", help = "number of pages to load")]
        pages: u32,
    },

    /// Like a photo
    Like { photo_id: String },

    /// Remove a like from a photo
    Unlike { photo_id: String },

    /// Forget the stored token
    Logout,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Accept either a bare code or the redirect URL carrying one
fn extract_code(input: &str) -> anyhow::Result<String> {
    match Url::parse(input) {
        Ok(url) => auth::code_from_redirect(&url)
            .with_context(|| format!("No authorization code in redirect URL: {}", input)),
        Err(_) => Ok(input.trim().to_string()),
    }
}

fn print_photo(photo: &Photo) {
    let created = photo
        .created_at
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    let liked = if photo.is_liked { "♥" } else { " " };

    println!(
        "{} {:<14} {:>5}x{:<5} {} {}",
        liked,
        photo.id,
        photo.size.width,
        photo.size.height,
        created,
        photo.description.as_deref().unwrap_or("")
    );
}

async fn show_feed(deps: &AppDependencies, pages: u32) -> anyhow::Result<()> {
    for _ in 0..pages {
        let before = deps.feed.snapshot().last_loaded_page;
        let snapshot = deps.feed.load_next_page().await?;

        if snapshot.last_loaded_page == before {
            anyhow::bail!(
                "Failed to load page {} (see log for details)",
                before.map_or(1, |page| page + 1)
            );
        }
    }

    let snapshot = deps.feed.snapshot();
    for photo in snapshot.photos.iter() {
        print_photo(photo);
    }
    println!(
        "{} photos, {} page(s) loaded",
        snapshot.len(),
        snapshot.last_loaded_page.unwrap_or(0)
    );
    Ok(())
}

async fn run(command: Command) -> anyhow::Result<()> {
    if let Command::AuthUrl = command {
        let config = UnsplashConfig::load()?;
        println!("{}", auth::authorize_url(&config)?);
        return Ok(());
    }

    let deps = AppBuilder::new()
        .with_production_deps()
        .context("Failed to initialize")?
        .build()?;

    match command {
        Command::AuthUrl => {}
        Command::Login { code } => {
            let code = extract_code(&code)?;
            let profile = deps.sign_in(&code).await.context("Login failed")?;
            println!("Signed in as {} {}", profile.name, profile.login_name);
        }
        Command::Profile => match deps.load_session().await? {
            Some(profile) => {
                println!("{}", profile.name);
                println!("{}", profile.login_name);
                if let Some(bio) = &profile.bio {
                    println!("{}", bio);
                }
                if let Some(url) = deps.avatar.avatar_url() {
                    println!("avatar: {}", url);
                }
            }
            None => {
                println!("Not signed in. Run `imagefeed auth-url` and `imagefeed login <code>`.")
            }
        },
        Command::Feed { pages } => show_feed(&deps, pages).await?,
        Command::Like { photo_id } => {
            deps.feed.change_like(&photo_id, true).await?;
            println!("Liked {}", photo_id);
        }
        Command::Unlike { photo_id } => {
            deps.feed.change_like(&photo_id, false).await?;
            println!("Unliked {}", photo_id);
        }
        Command::Logout => {
            deps.logout().await?;
            println!("Signed out");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    run(cli.command).await
}
