//! Interactive sign-in against a running portal auth service.
//!
//! ```bash
//! portal-signin --base-url http://localhost:3112 --email jane@example.com
//! ```
//!
//! Walks through credentials, two-factor method selection and code entry,
//! then prints the established session.

use anyhow::{Result, bail};
use clap::Parser;

use portal_core::tracing::init_cli_tracing;
use portal_domain::channel::Channel;
use portal_signin::flow::SignInFlow;
use portal_signin::http::HttpAuthApi;
use portal_signin::state::{Event, SignInState};

mod prompt;

use prompt::{ask, show_toasts};

#[derive(Parser)]
#[command(about = "Sign in to a portal account from the terminal")]
struct Args {
    /// Base URL of the auth service
    #[arg(long, env = "PORTAL_AUTH_URL", default_value = "http://localhost:3112")]
    base_url: String,

    /// Account email; prompted for when omitted
    #[arg(long)]
    email: Option<String>,
}

/// Next event from the user for the current phase, or `None` to quit.
fn next_event(state: &SignInState, email: &mut Option<String>) -> Result<Option<Event>> {
    let event = match state {
        SignInState::Credentials => {
            let email = match email.take() {
                Some(e) => e,
                None => ask("Email: ")?,
            };
            if email == "q" {
                return Ok(None);
            }
            let password = ask("Password: ")?;
            Event::Submit { email, password }
        }
        SignInState::MethodSelection { phone_on_file, .. } => {
            match ask("Send a code by [e]mail or [s]ms? ([b]ack, [q]uit) ")?.as_str() {
                "e" | "email" => Event::SelectMethod {
                    channel: Channel::Email,
                    phone: None,
                },
                "s" | "sms" => {
                    let phone = if *phone_on_file {
                        let p = ask("Phone (blank for number on file): ")?;
                        (!p.trim().is_empty()).then_some(p)
                    } else {
                        Some(ask("Phone (e.g. +15551234567): ")?)
                    };
                    Event::SelectMethod {
                        channel: Channel::Sms,
                        phone,
                    }
                }
                "b" | "back" => Event::Back,
                "q" | "quit" => return Ok(None),
                other => {
                    eprintln!("  unknown choice {other:?}");
                    return next_event(state, email);
                }
            }
        }
        SignInState::AwaitingCode { channel, .. } => {
            let input = ask(&format!(
                "Code sent by {channel} ([r]esend, [b]ack, [q]uit): "
            ))?;
            match input.as_str() {
                "r" | "resend" => Event::Resend,
                "b" | "back" => Event::Back,
                "q" | "quit" => return Ok(None),
                // Entering the code and submitting are one step on a terminal.
                code => Event::ChangeCode(code.to_owned()),
            }
        }
        SignInState::Verified => return Ok(None),
    };
    Ok(Some(event))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_cli_tracing();
    let args = Args::parse();

    let api = HttpAuthApi::new(&args.base_url)?;
    let mut flow = SignInFlow::new(api);
    let mut email = args.email;

    while let Some(event) = next_event(flow.state(), &mut email)? {
        let typed_code = matches!(event, Event::ChangeCode(_));
        flow.dispatch(event).await;
        if typed_code {
            flow.dispatch(Event::Verify).await;
        }
        show_toasts(flow.take_toasts());
    }

    if *flow.state() != SignInState::Verified {
        bail!("sign-in abandoned");
    }

    println!("Signed in. Redirect to {}", flow.location().unwrap_or("/"));
    if let Some(session) = flow.session() {
        println!(
            "  user {} (role {}), access token valid until {}",
            session.user_id, session.user_role, session.access_token_exp
        );
    }
    Ok(())
}
