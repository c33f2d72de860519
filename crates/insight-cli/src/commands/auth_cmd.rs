use insight_core::api::{LoginRequest, SignupRequest};
use insight_core::InsightClient;

use crate::cli::AuthCommands;
use crate::error::CliError;

pub async fn run_auth(client: &InsightClient, command: AuthCommands) -> Result<(), CliError> {
    match command {
        AuthCommands::Signup {
            name,
            email,
            password,
            confirm,
        } => {
            let user = client
                .signup(&SignupRequest {
                    user_name: name,
                    user_email: email,
                    user_password: password,
                    confirm_password: confirm,
                })
                .await?;
            println!("Signed up as {} <{}>", user.user_name, user.user_email);
        }
        AuthCommands::Login { email, password } => {
            let user = client
                .login(&LoginRequest {
                    user_email: email,
                    user_password: password,
                })
                .await?;
            println!("Logged in as {} <{}>", user.user_name, user.user_email);
        }
        AuthCommands::Logout => {
            if !client.auth().has_session() {
                println!("Not logged in.");
                return Ok(());
            }
            client.logout().await?;
        }
        AuthCommands::Status => println!("{}", status_line(client)),
        AuthCommands::Profile => {
            if !client.auth().has_session() {
                return Err(CliError::NotLoggedIn);
            }
            let user = client.fetch_profile().await?;
            println!("{}", user.user_id);
            println!("{} <{}>", user.user_name, user.user_email);
        }
    }
    Ok(())
}

pub fn status_line(client: &InsightClient) -> String {
    let auth = client.auth();
    match &auth.user {
        Some(user) if auth.has_session() => {
            format!("Logged in as {} <{}>", user.user_name, user.user_email)
        }
        None if auth.has_session() => {
            "Session token present; run `insight auth profile` to load the profile.".to_string()
        }
        _ => "Not logged in.".to_string(),
    }
}
