use sessiongate::client::*;
use sessiongate::domain_model::*;
use sessiongate::logger::*;
use sessiongate::settings::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    debug!(?project_settings);
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;

    let client = SessionClient::try_new(&project_settings)?;

    match cli.command {
        Command::Register {
            email,
            password,
            username,
        } => {
            client
                .register(RegisterPayload {
                    email,
                    password,
                    username,
                })
                .await?;
            println!(
                "registered, session valid for {}s",
                client.store.remaining_seconds()
            );
        }
        Command::Login {
            email,
            password,
            from,
        } => {
            client.login(LoginPayload { email, password }).await?;
            let login_page = match from {
                Some(from) => Location::parse(&from),
                None => Location::new(client.guard.routes().login.clone()),
            };
            println!(
                "logged in, session valid for {}s, continue to {}",
                client.store.remaining_seconds(),
                client.post_login_destination(&login_page)
            );
        }
        Command::Logout => {
            let outcome = client.logout().await;
            if outcome.server_ack {
                println!("logged out");
            } else {
                println!("logged out locally, server did not confirm");
            }
        }
        Command::Status => {
            client.store.hydrate();
            let state = client.store.snapshot();
            match state.user_id() {
                Some(user_id) if client.store.is_authenticated() => println!(
                    "authenticated as {}, {}s remaining",
                    user_id,
                    client.store.remaining_seconds()
                ),
                Some(user_id) => println!("session for {} has expired", user_id),
                None => println!("no session"),
            }
        }
        Command::Navigate { path } => match client.navigate(&path) {
            NavigationDecision::Allow => println!("allow {}", path),
            NavigationDecision::Redirect(to) => println!("redirect {} -> {}", path, to),
            NavigationDecision::Block(reason) => println!("block {}: {}", path, reason),
        },
        Command::Fetch { url } => {
            client.store.hydrate();
            let response = client.http.get(url.as_str()).send().await?;
            let status = response.status();
            println!("{}", status);
            println!("{}", response.text().await?);
            if !status.is_success() {
                warn!(%status, %url, "request failed");
            }
        }
    }

    Ok(())
}
