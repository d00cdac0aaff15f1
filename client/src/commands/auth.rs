//! `login` and `register`

use clap::Args;
use serde::Serialize;

use shared::models::{LoginInput, RegisterInput};
use shared::validation::{validate_login, validate_registration};

use super::output::print_json;
use crate::error::AppResult;
use crate::external::BusyFoolApi;

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    /// Also read from `BF_PASSWORD`
    #[arg(long, env = "BF_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "BF_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long, default_value = "owner")]
    pub role: String,
}

#[derive(Serialize)]
struct LoginOutput<'a> {
    access_token: &'a str,
}

pub async fn login(api: &BusyFoolApi, args: LoginArgs, json: bool) -> AppResult<()> {
    let input = LoginInput {
        email: args.email.trim().to_string(),
        password: args.password,
    };
    validate_login(&input)?;

    let session = api.login(&input).await?;
    tracing::info!("Logged in as {}", input.email);

    if json {
        return print_json(&LoginOutput {
            access_token: &session.access_token,
        });
    }
    println!("Logged in as {}.", input.email);
    println!("export BF_API__ACCESS_TOKEN={}", session.access_token);
    Ok(())
}

pub async fn register(api: &BusyFoolApi, args: RegisterArgs, json: bool) -> AppResult<()> {
    let input = RegisterInput {
        name: args.name.trim().to_string(),
        email: args.email.trim().to_string(),
        password: args.password,
        role: args.role,
    };
    validate_registration(&input)?;

    let user = api.register(&input).await?;
    tracing::info!("Registered {}", user.email);

    if json {
        return print_json(&user);
    }
    println!("Account created for {} <{}>. Run `busy-fool login` next.", user.name, user.email);
    Ok(())
}
