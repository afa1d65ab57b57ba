use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use config_core::{init_tracing, ClientConfig};
use error_types::ClientResult;
use forum_api::ImageUpload;
use forum_app::{ForumApp, PostDraft, RegistrationForm};
use tracing::debug;

use crate::args::Commands;

mod args;

impl Commands {
    /// Message shown when a failure carries nothing more specific
    fn fallback_message(&self) -> &'static str {
        match self {
            Commands::Register { .. } => "Could not register.",
            Commands::Login { .. } => "Could not sign in.",
            Commands::Logout | Commands::Whoami => "Could not read the session.",
            Commands::Feed { .. } => "Could not load posts.",
            Commands::Post { .. } => "Could not create the post.",
            Commands::Like { .. } => "Could not process the like.",
            Commands::Favorite { .. } => "Could not process the favorite.",
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let opt = args::Opt::parse();

    let config = ClientConfig::load(opt.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.observability).context("Failed to initialize logging")?;

    let app = ForumApp::bootstrap(config)
        .await
        .context("Failed to start the client")?;

    let fallback = opt.command.fallback_message();
    match run(&app, opt.command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            e.log();
            eprintln!("Error: {}", e.user_message_or(fallback));
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(app: &ForumApp, command: Commands) -> ClientResult<()> {
    debug!(?command, "Running command");

    match command {
        Commands::Register {
            username,
            email,
            password,
            picture,
        } => {
            let picture = match picture {
                Some(path) => Some(ImageUpload::from_path(path).await?),
                None => None,
            };
            let form = RegistrationForm::new(username, email, password);
            let outcome = app.accounts.register(&form, picture.as_ref()).await?;

            println!("Account created. Sign in to continue.");
            if let Some(e) = outcome.profile_upload_error {
                eprintln!("Warning: {}", e.user_message());
            }
        }
        Commands::Login {
            identifier,
            password,
        } => match app.accounts.sign_in(&identifier, &password).await? {
            Some(profile) => println!("Signed in as @{}", profile.username),
            None => println!("Signed in"),
        },
        Commands::Logout => {
            app.accounts.sign_out().await;
            println!("Signed out");
        }
        Commands::Whoami => {
            let session = app.session.snapshot();
            match (&session.token, &session.profile) {
                (Some(_), Some(profile)) => match &profile.email {
                    Some(email) => println!("@{} <{}> (id {})", profile.username, email, profile.id),
                    None => println!("@{} (id {})", profile.username, profile.id),
                },
                (Some(_), None) => println!("Signed in"),
                (None, _) => println!("Not signed in"),
            }
        }
        Commands::Feed { search } => {
            let outcome = app
                .feed
                .fetch_feed(&search, app.session.current_user_id())
                .await?;
            let page = outcome.page();
            if page.posts.is_empty() {
                println!("No posts found");
            }
            for post in &page.posts {
                let liked = if page.likes.is_set(post.id) { " [liked]" } else { "" };
                println!(
                    "#{} {} by @{}  likes: {}{}  comments: {}",
                    post.id,
                    post.title,
                    post.author_username,
                    post.likes_count,
                    liked,
                    post.comments_count
                );
                println!("    {}", post.content);
                if let Some(image_url) = &post.image_url {
                    println!("    image: {}", app.api.media_url(image_url));
                }
            }
        }
        Commands::Post {
            title,
            content,
            image,
        } => {
            let mut draft = PostDraft::new(title, content);
            // Validate before touching the attachment
            draft.validate()?;
            if let Some(path) = image {
                draft = draft.with_image(ImageUpload::from_path(path).await?);
            }
            let post = app.feed.create_post(draft).await?;
            println!("Post #{} created", post.id);
        }
        Commands::Like { post_id } => {
            let liked = app.feed.toggle_like(post_id).await?;
            println!("{} post #{}", if liked { "Liked" } else { "Unliked" }, post_id);
        }
        Commands::Favorite { post_id } => {
            let toggle = app.feed.toggle_favorite(post_id).await?;
            if toggle.message.is_empty() {
                println!("Favorite updated for post #{}", post_id);
            } else {
                println!("{}", toggle.message);
            }
        }
    }

    Ok(())
}
