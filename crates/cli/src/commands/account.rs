//! Session commands.

#![allow(clippy::print_stdout)] // command output

use kasra_storefront::error::AppError;
use kasra_storefront::state::AppState;
use tracing::info;

use super::{money, require_session};

/// Sign in and print who we are.
pub async fn login(
    state: &AppState,
    email: &str,
    password: &str,
    remember: bool,
) -> Result<(), AppError> {
    state.session().login(email, password).await?;
    state.session().set_remember_me(remember);
    greet(state);
    Ok(())
}

pub async fn register(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), AppError> {
    state.session().register(username, email, password).await?;
    info!(username, "Registered");
    greet(state);
    Ok(())
}

pub fn logout(state: &AppState) {
    state.session().logout();
    println!("Signed out.");
}

/// Print the profile, roles, groups and wallet of the signed-in user.
pub async fn whoami(state: &AppState) -> Result<(), AppError> {
    require_session(state).await?;
    let session = state.session().session();
    let Some(user) = session.user.as_ref() else {
        return Err(AppError::Unauthorized("no user in session".to_string()));
    };

    println!("{} <{}> (#{})", user.username, user.email, user.id);
    if let Some(phone) = &user.phone {
        println!("  phone:  {phone}");
    }
    if !session.roles.is_empty() {
        println!("  roles:  {}", session.roles.join(", "));
    }
    if !session.groups.is_empty() {
        let groups: Vec<&str> = session.groups.iter().map(|g| g.name.as_str()).collect();
        println!("  groups: {}", groups.join(", "));
    }

    let wallet = state.api().get_wallet().await?;
    println!("  wallet: {}", wallet.balance_price());
    if !state.cart().is_empty() {
        println!(
            "  cart:   {} item(s), {}",
            state.cart().count(),
            money(state.cart().total())
        );
    }
    Ok(())
}

fn greet(state: &AppState) {
    let session = state.session().session();
    if let Some(user) = &session.user {
        println!("Signed in as {} <{}>.", user.username, user.email);
        if session.is_admin() {
            println!("Admin access enabled.");
        }
    }
}
