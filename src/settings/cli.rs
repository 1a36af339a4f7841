use super::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "sessiongate", about = "Client-side session and route guard")]
pub struct Cli {
    #[arg(long, global = true)]
    pub settings: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account and start a session.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        username: String,
    },
    /// Start a session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Login page location the user came from, e.g. `/login?redirect=%2Fbooks`.
        #[arg(long)]
        from: Option<String>,
    },
    /// End the session, locally and on the server when reachable.
    Logout,
    /// Show the persisted session.
    Status,
    /// Evaluate the route guard for a path.
    Navigate { path: String },
    /// GET a URL with the session's bearer credential.
    Fetch { url: String },
}
