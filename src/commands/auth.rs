// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::api::{ApiClient, Transport};
use crate::forms::PasswordReset;
use crate::models::{ApiMessage, Credentials, Registration};
use crate::session::Route;
use crate::utils::arg;

pub fn handle<T: Transport>(client: &mut ApiClient<T>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("login", sub)) => login(client, sub)?,
        Some(("register", sub)) => register(client, sub)?,
        Some(("logout", _)) => {
            let route = client.logout()?;
            println!("Logged out. Next: {}", route);
        }
        Some(("whoami", _)) => match client.session().user() {
            Some(u) => println!("{} <{}>", u.display_name(), u.email),
            None => println!("Not logged in"),
        },
        Some(("verify", sub)) => {
            let msg = client.verify_email(arg(sub, "token")?)?;
            print_ack(&msg, "Email verified successfully. You can now log in.");
            println!("Next: {}", Route::Login);
        }
        Some(("resend", sub)) => {
            let msg = client.resend_verification(arg(sub, "email")?)?;
            print_ack(&msg, "Verification email sent. Please check your inbox.");
        }
        Some(("forgot", sub)) => {
            let msg = client.forgot_password(arg(sub, "email")?)?;
            print_ack(&msg, "Password reset link sent. Please check your email.");
        }
        Some(("reset", sub)) => {
            let reset = PasswordReset {
                new_password: arg(sub, "password")?.to_string(),
                confirm_password: arg(sub, "confirm-password")?.to_string(),
            };
            let msg = client.reset_password(arg(sub, "token")?, &reset)?;
            print_ack(&msg, "Password reset successfully. You can now log in.");
            println!("Next: {}", Route::Login);
        }
        _ => {}
    }
    Ok(())
}

fn login<T: Transport>(client: &mut ApiClient<T>, sub: &clap::ArgMatches) -> Result<()> {
    let credentials = Credentials {
        email: arg(sub, "email")?.trim().to_string(),
        password: arg(sub, "password")?.to_string(),
    };
    let session = client.login(&credentials)?;
    println!(
        "Logged in as {} <{}>. Next: {}",
        session.user.display_name(),
        session.user.email,
        Route::Dashboard
    );
    Ok(())
}

fn register<T: Transport>(client: &mut ApiClient<T>, sub: &clap::ArgMatches) -> Result<()> {
    let registration = Registration {
        first_name: arg(sub, "first-name")?.trim().to_string(),
        last_name: arg(sub, "last-name")?.trim().to_string(),
        email: arg(sub, "email")?.trim().to_string(),
        password: arg(sub, "password")?.to_string(),
        confirm_password: arg(sub, "confirm-password")?.to_string(),
    };
    let msg = client.register(&registration)?;
    print_ack(
        &msg,
        "Registration successful! Please check your email to verify your account.",
    );
    Ok(())
}

fn print_ack(msg: &ApiMessage, default: &str) {
    let text = msg
        .message
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(default);
    println!("{}", text);
}
