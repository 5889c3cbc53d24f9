use std::path::PathBuf;

use anyhow::{anyhow, ensure, Context, Result};
use clap::{Parser, Subcommand};

use pinclient::config::{Config, ConfigStore, SecureString};
use pinclient::gateway::Session;
use pinclient::guard::GuardState;
use pinclient::model::{
    Board, Connection, EntityId, Invitation, InvitationResponse, LoginRequest, PasswordResetRequest, Pin,
    RegisterRequest,
};
use pinclient::{telemetry, Client};

#[derive(Parser, Debug)]
#[command(author, version, about = "Command-line client for the pin sharing service")]
struct Args {
    /// Config file (default: the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and keep the session for later commands
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PINCLIENT_PASSWORD")]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        mobile_number: Option<String>,
        #[arg(long, env = "PINCLIENT_PASSWORD")]
        password: String,
        #[arg(long, env = "PINCLIENT_CONFIRM_PASSWORD")]
        confirm_password: String,
    },
    /// Set a new password using the account's email and mobile number
    ResetPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        mobile_number: String,
        #[arg(long, env = "PINCLIENT_NEW_PASSWORD")]
        new_password: String,
        #[arg(long, env = "PINCLIENT_CONFIRM_PASSWORD")]
        confirm_password: String,
    },
    #[command(subcommand)]
    Pins(PinCommand),
    #[command(subcommand)]
    Boards(BoardCommand),
    Follow {
        user_id: EntityId,
    },
    Unfollow {
        user_id: EntityId,
    },
    /// Users followed by USER_ID (default: you)
    Following {
        user_id: Option<EntityId>,
    },
    #[command(subcommand)]
    Invitations(InvitationCommand),
    #[command(subcommand)]
    Businesses(BusinessCommand),
    #[command(subcommand)]
    Lockout(LockoutCommand),
}

#[derive(Subcommand, Debug)]
enum PinCommand {
    Public,
    User { user_id: Option<EntityId> },
    Search { keyword: String },
    Show { id: EntityId },
}

#[derive(Subcommand, Debug)]
enum BoardCommand {
    User { user_id: Option<EntityId> },
    Search { keyword: String },
    Show { id: EntityId },
}

#[derive(Subcommand, Debug)]
enum InvitationCommand {
    List,
    Respond {
        id: EntityId,
        /// accept or decline
        #[arg(value_parser = parse_response)]
        response: InvitationResponse,
    },
}

#[derive(Subcommand, Debug)]
enum BusinessCommand {
    List,
    Show { id: EntityId },
}

#[derive(Subcommand, Debug)]
enum LockoutCommand {
    Status,
}

fn parse_response(value: &str) -> Result<InvitationResponse, String> {
    InvitationResponse::parse(value).ok_or_else(|| format!("expected accept or decline, got '{}'", value))
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing("warn");
    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(Config::config_path);
    let config = ConfigStore::open(config_path)
        .context("Failed to load configuration")?
        .get();

    let session_path = config.session_path();
    let session = Session::load_from(&session_path);
    let client = Client::from_config(&config, session.clone())?;

    let result = run(&client, args.command).await;

    session
        .save_to(&session_path)
        .with_context(|| format!("Failed to write session to {}", session_path.display()))?;
    result
}

async fn run(client: &Client, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let response = client.login(&LoginRequest::new(email, password)).await?;
            let name = response.username.or(response.email).unwrap_or_default();
            println!("Signed in as {}", name);
        }
        Command::Logout => {
            client.logout();
            println!("Signed out");
        }
        Command::Register {
            email,
            username,
            first_name,
            last_name,
            mobile_number,
            password,
            confirm_password,
        } => {
            let request = RegisterRequest {
                email,
                username,
                password: SecureString::new(password),
                confirm_password: SecureString::new(confirm_password),
                first_name,
                last_name,
                mobile_number,
            };
            let response = client.register(&request).await?;
            match client.current_user_id() {
                Some(id) => println!("Registered and signed in as user {}", id),
                None => println!("{}", response.message.unwrap_or_else(|| "Registered".to_string())),
            }
        }
        Command::ResetPassword {
            email,
            mobile_number,
            new_password,
            confirm_password,
        } => {
            ensure!(new_password == confirm_password, "Passwords do not match");
            let request = PasswordResetRequest {
                email,
                mobile_number,
                new_password: SecureString::new(new_password),
            };
            let response = client.reset_password(&request).await?;
            println!(
                "{}",
                response
                    .message
                    .unwrap_or_else(|| "Password reset successful".to_string())
            );
        }
        Command::Pins(cmd) => {
            let store = client.pins();
            match cmd {
                PinCommand::Public => print_pins(&store.fetch_public_pins().await?),
                PinCommand::User { user_id } => {
                    let user_id = user_or_self(client, user_id)?;
                    print_pins(&store.fetch_user_pins(user_id).await?)
                }
                PinCommand::Search { keyword } => print_pins(&store.search_pins(&keyword).await?),
                PinCommand::Show { id } => print_json(&store.fetch_pin_by_id(id).await?)?,
            }
        }
        Command::Boards(cmd) => {
            let store = client.boards();
            match cmd {
                BoardCommand::User { user_id } => {
                    let user_id = user_or_self(client, user_id)?;
                    print_boards(&store.fetch_user_boards(user_id).await?)
                }
                BoardCommand::Search { keyword } => print_boards(&store.search_boards(&keyword).await?),
                BoardCommand::Show { id } => print_json(&store.fetch_board_by_id(id).await?)?,
            }
        }
        Command::Follow { user_id } => {
            require_session(client)?;
            client.coordinator().follow_user(user_id).await?;
            println!("Following {}", user_id);
        }
        Command::Unfollow { user_id } => {
            require_session(client)?;
            client.coordinator().unfollow_user(user_id).await?;
            println!("Unfollowed {}", user_id);
        }
        Command::Following { user_id } => {
            let user_id = user_or_self(client, user_id)?;
            let edges = client.connections().fetch_following(user_id).await?;
            print_connections(client, &edges).await;
        }
        Command::Invitations(cmd) => {
            let user_id = require_session(client)?;
            match cmd {
                InvitationCommand::List => {
                    print_invitations(&client.invitations().fetch_invitations(user_id).await?)
                }
                InvitationCommand::Respond { id, response } => {
                    let invitation = client
                        .coordinator()
                        .respond_to_invitation(id, response)
                        .await?;
                    println!("Invitation {} {:?}", invitation.id, invitation.status);
                }
            }
        }
        Command::Businesses(cmd) => {
            let store = client.businesses();
            match cmd {
                BusinessCommand::List => {
                    for profile in store.fetch_profiles().await? {
                        println!("{:>6}  {}", profile.id, profile.business_name);
                    }
                }
                BusinessCommand::Show { id } => print_json(&store.fetch_profile(id).await?)?,
            }
        }
        Command::Lockout(LockoutCommand::Status) => {
            let guard = client.guard();
            let remaining = guard.tick();
            match guard.state() {
                GuardState::Open => println!("Open ({} failed attempts recorded)", guard.record().count),
                GuardState::Locked { .. } => println!("Locked, {} seconds remaining", remaining),
            }
        }
    }
    Ok(())
}

fn require_session(client: &Client) -> Result<EntityId> {
    client
        .current_user_id()
        .ok_or_else(|| anyhow!("Not signed in. Run `pinclient login` first."))
}

fn user_or_self(client: &Client, user_id: Option<EntityId>) -> Result<EntityId> {
    match user_id {
        Some(id) => Ok(id),
        None => require_session(client),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_pins(pins: &[Pin]) {
    for pin in pins {
        let marker = if pin.is_sponsored { " [sponsored]" } else { "" };
        println!("{:>6}  {}{}", pin.id, pin.title, marker);
    }
}

fn print_boards(boards: &[Board]) {
    for board in boards {
        println!("{:>6}  {} ({} pins)", board.id, board.name, board.pin_count);
    }
}

async fn print_connections(client: &Client, edges: &[Connection]) {
    for edge in edges {
        let name = match client.user_profile(edge.following_id).await {
            Ok(profile) => profile.username,
            Err(e) => {
                tracing::debug!(user_id = edge.following_id, error = %e, "Profile lookup failed");
                edge.following_id.to_string()
            }
        };
        println!("{:>6}  follows {}", edge.follower_id, name);
    }
}

fn print_invitations(invitations: &[Invitation]) {
    for invitation in invitations {
        println!(
            "{:>6}  {:?} from {}{}",
            invitation.id,
            invitation.invitation_type,
            invitation.inviter_id,
            invitation
                .board_id
                .map(|b| format!(" (board {})", b))
                .unwrap_or_default()
        );
    }
}
