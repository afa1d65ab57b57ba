use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(name = "devsocial", version, about = "devsocial forum client")]
pub struct Opt {
    /// Configuration file; `config.<environment>.toml` next to it is layered on top
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account
    Register {
        username: String,
        email: String,
        password: String,
        /// Profile picture to upload after registering
        #[clap(long)]
        picture: Option<PathBuf>,
    },
    /// Sign in with a username or email
    Login {
        identifier: String,
        password: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List posts
    Feed {
        /// Only posts whose title or content matches
        #[clap(short, long, default_value = "")]
        search: String,
    },
    /// Create a post
    Post {
        title: String,
        content: String,
        /// Image to attach
        #[clap(long)]
        image: Option<PathBuf>,
    },
    /// Like or unlike a post
    Like {
        post_id: i64,
    },
    /// Favorite or unfavorite a post
    Favorite {
        post_id: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feed_search() {
        let opt = Opt::parse_from(["devsocial", "feed", "--search", "rust"]);
        assert!(matches!(opt.command, Commands::Feed { ref search } if search == "rust"));
        assert!(opt.config.is_none());
    }

    #[test]
    fn test_parse_post_with_image_and_config() {
        let opt = Opt::parse_from([
            "devsocial",
            "post",
            "Hello",
            "World",
            "--image",
            "cat.png",
            "--config",
            "client.toml",
        ]);
        assert_eq!(opt.config, Some(PathBuf::from("client.toml")));
        match opt.command {
            Commands::Post { title, content, image } => {
                assert_eq!(title, "Hello");
                assert_eq!(content, "World");
                assert_eq!(image, Some(PathBuf::from("cat.png")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
