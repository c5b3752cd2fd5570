//! Solidario CLI - campaign moderation from the terminal

mod render;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use futures::StreamExt;
use solidario::chat::ChatPoller;
use solidario::moderation::{CampaignAction, ModerationDesk};
use solidario::{ApiClient, AppError, Config, SessionStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "solidario-cli")]
#[command(about = "CLI client for Solidario - campaign moderation and delegation")]
#[command(version)]
struct Cli {
    /// Backend URL
    #[arg(long, env = "SOLIDARIO_API_URL")]
    api_url: Option<String>,

    /// Session database URL
    #[arg(long, env = "SOLIDARIO_DATABASE_URL")]
    database_url: Option<String>,

    /// Chat poll interval in seconds
    #[arg(long, env = "SOLIDARIO_POLL_SECS")]
    poll_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "SOLIDARIO_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Campaign moderation
    #[command(subcommand)]
    Campaigns(CampaignCommands),

    /// Participant moderation
    #[command(subcommand)]
    Participants(ParticipantCommands),

    /// Notification feed and delegation offers
    #[command(subcommand)]
    Notifications(NotificationCommands),

    /// Institution approval
    #[command(subcommand)]
    Institutions(InstitutionCommands),

    /// Administrative regions
    #[command(subcommand)]
    Regions(RegionCommands),

    /// List user accounts (candidates for region moderation)
    Users,

    /// Donate to a campaign
    Donate {
        campaign: i64,
        amount: f64,
    },

    /// Sign up as a volunteer
    Volunteer { campaign: i64 },

    /// Help-request chat
    #[command(subcommand)]
    Chat(ChatCommands),
}

#[derive(Subcommand)]
enum CampaignCommands {
    /// List campaigns with the actions available to you
    List,
    /// Show the actions available for one campaign
    Actions { campaign: i64 },
    /// Approve, pause, activate or finalize a campaign
    Act {
        campaign: i64,
        /// approve | pause | activate | finalize
        action: CampaignAction,
    },
    /// Reject a pending campaign
    Reject {
        campaign: i64,
        #[arg(short, long)]
        reason: Option<String>,
    },
    /// Delegate a pending campaign to an institution
    Delegate {
        campaign: i64,
        #[arg(short, long)]
        institution: i64,
    },
    /// Edit a pending campaign
    Edit(EditArgs),
}

#[derive(Args)]
struct EditArgs {
    campaign: i64,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    goal: Option<f64>,
}

#[derive(Subcommand)]
enum ParticipantCommands {
    /// List a campaign's participants
    List { campaign: i64 },
    /// Remove a participant (reason required)
    Remove {
        campaign: i64,
        participant: i64,
        #[arg(short, long)]
        reason: String,
    },
    /// Warn a participant
    Warn {
        campaign: i64,
        participant: i64,
        #[arg(short, long, default_value = "")]
        message: String,
    },
}

#[derive(Subcommand)]
enum NotificationCommands {
    /// List notifications
    List,
    /// Answer a delegation offer
    Respond {
        notification: i64,
        #[arg(long, conflicts_with = "decline", required_unless_present = "decline")]
        accept: bool,
        #[arg(long)]
        decline: bool,
    },
    /// Mark a notification read
    Read { notification: i64 },
}

#[derive(Subcommand)]
enum InstitutionCommands {
    /// List institutions
    List,
    /// Approve an institution
    Approve { institution: i64 },
    /// Reject an institution
    Reject { institution: i64 },
}

#[derive(Subcommand)]
enum RegionCommands {
    /// List regions
    List,
    /// Assign a moderator to a region
    Assign { region: i64, user: i64 },
}

#[derive(Subcommand)]
enum ChatCommands {
    /// List help requests
    List,
    /// Follow a help-request chat
    Watch { help_request: i64 },
    /// Send a message
    Send { help_request: i64, message: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "solidario=info,solidario_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    tracing::debug!(api_url = %config.api_url, "Using backend");

    let store = SessionStore::connect(&config.database_url).await?;
    let client = Arc::new(ApiClient::from_config(&config, store));

    let outcome = run(cli.command, client, &config).await;

    if let Err(e) = &outcome {
        if let Some(AppError::SessionExpired | AppError::NotAuthenticated) =
            e.downcast_ref::<AppError>()
        {
            eprintln!("{}. Run `{} login` first.", e, env!("CARGO_BIN_NAME"));
            std::process::exit(2);
        }
    }

    outcome
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::from_env()?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url)?;
    }
    if let Some(db) = &cli.database_url {
        config = config.with_database_url(db.clone());
    }
    if let Some(secs) = cli.poll_secs {
        if secs == 0 {
            bail!("poll interval must be positive");
        }
        config = config.with_poll_interval(Duration::from_secs(secs));
    }
    Ok(config)
}

async fn run(command: Commands, client: Arc<ApiClient>, config: &Config) -> Result<()> {
    match command {
        Commands::Login { email, password } => {
            let user = client.login(&email, &password).await?;
            match user {
                Some(user) => println!("Logged in as {} ({})", user.name, user.role.as_str()),
                None => println!("Logged in as {}", email),
            }
            Ok(())
        }
        Commands::Logout => {
            client.logout().await?;
            println!("Logged out.");
            Ok(())
        }
        Commands::Whoami => {
            let user = client.session_user().await?;
            render::user(&user);
            Ok(())
        }
        Commands::Campaigns(cmd) => run_campaigns(cmd, client).await,
        Commands::Participants(cmd) => run_participants(cmd, client).await,
        Commands::Notifications(cmd) => run_notifications(cmd, client).await,
        Commands::Institutions(cmd) => run_institutions(cmd, client).await,
        Commands::Regions(cmd) => run_regions(cmd, client).await,
        Commands::Users => {
            let users = client.list_users().await?;
            render::users(&users);
            Ok(())
        }
        Commands::Donate { campaign, amount } => {
            client.donate(campaign, amount).await?;
            println!("Donated {:.2} to campaign {}.", amount, campaign);
            Ok(())
        }
        Commands::Volunteer { campaign } => {
            client.volunteer(campaign).await?;
            println!("Signed up for campaign {}.", campaign);
            Ok(())
        }
        Commands::Chat(cmd) => run_chat(cmd, client, config).await,
    }
}

async fn run_campaigns(cmd: CampaignCommands, client: Arc<ApiClient>) -> Result<()> {
    let desk = ModerationDesk::for_session(client).await?;

    match cmd {
        CampaignCommands::List => {
            let campaigns = desk.refresh_campaigns().await?;
            render::campaigns(&campaigns, desk.role());
        }
        CampaignCommands::Actions { campaign } => {
            let actions = desk.actions_for(campaign).await?;
            render::actions(campaign, &actions);
        }
        CampaignCommands::Act { campaign, action } => {
            let campaigns = desk.perform(campaign, action).await?;
            println!("{} done for campaign {}.", action.label(), campaign);
            render::campaigns(&campaigns, desk.role());
        }
        CampaignCommands::Reject { campaign, reason } => {
            desk.reject(campaign, reason.as_deref()).await?;
            println!("Campaign {} rejected.", campaign);
        }
        CampaignCommands::Delegate {
            campaign,
            institution,
        } => {
            desk.delegate(campaign, institution).await?;
            println!(
                "Campaign {} offered to institution {}; waiting for its answer.",
                campaign, institution
            );
        }
        CampaignCommands::Edit(args) => {
            let update = solidario::models::CampaignUpdate {
                title: args.title,
                description: args.description,
                goal: args.goal,
            };
            desk.edit(args.campaign, &update).await?;
            println!("Campaign {} updated.", args.campaign);
        }
    }

    Ok(())
}

async fn run_participants(cmd: ParticipantCommands, client: Arc<ApiClient>) -> Result<()> {
    let desk = ModerationDesk::for_session(client).await?;

    match cmd {
        ParticipantCommands::List { campaign } => {
            let participants = desk.load_participants(campaign).await?;
            render::participants(&participants);
        }
        ParticipantCommands::Remove {
            campaign,
            participant,
            reason,
        } => {
            let removed = desk
                .remove_participant(campaign, participant, &reason)
                .await?;
            println!("Removed {} from campaign {}.", removed.name, campaign);
        }
        ParticipantCommands::Warn {
            campaign,
            participant,
            message,
        } => {
            desk.warn_participant(campaign, participant, &message)
                .await?;
            println!("Warning sent to participant {}.", participant);
        }
    }

    Ok(())
}

async fn run_notifications(cmd: NotificationCommands, client: Arc<ApiClient>) -> Result<()> {
    let desk = ModerationDesk::for_session(client).await?;

    match cmd {
        NotificationCommands::List => {
            let notifications = desk.refresh_notifications().await?;
            render::notifications(&notifications);
            println!("{} unread", desk.unread_count().await);
        }
        NotificationCommands::Respond {
            notification,
            accept,
            decline: _,
        } => {
            let status = desk.respond_delegation(notification, accept).await?;
            println!("Delegation {}.", status.as_str());
        }
        NotificationCommands::Read { notification } => {
            desk.mark_read(notification).await?;
        }
    }

    Ok(())
}

async fn run_institutions(cmd: InstitutionCommands, client: Arc<ApiClient>) -> Result<()> {
    match cmd {
        InstitutionCommands::List => {
            let institutions = client.list_institutions().await?;
            render::institutions(&institutions);
        }
        InstitutionCommands::Approve { institution } => {
            let desk = ModerationDesk::for_session(client).await?;
            desk.review_institution(institution, true).await?;
            println!("Institution {} approved.", institution);
        }
        InstitutionCommands::Reject { institution } => {
            let desk = ModerationDesk::for_session(client).await?;
            desk.review_institution(institution, false).await?;
            println!("Institution {} rejected.", institution);
        }
    }

    Ok(())
}

async fn run_regions(cmd: RegionCommands, client: Arc<ApiClient>) -> Result<()> {
    match cmd {
        RegionCommands::List => {
            let regions = client.list_regions().await?;
            render::regions(&regions);
        }
        RegionCommands::Assign { region, user } => {
            let desk = ModerationDesk::for_session(client).await?;
            desk.assign_region_moderator(region, user).await?;
            println!("User {} now moderates region {}.", user, region);
        }
    }

    Ok(())
}

async fn run_chat(cmd: ChatCommands, client: Arc<ApiClient>, config: &Config) -> Result<()> {
    match cmd {
        ChatCommands::List => {
            let requests = client.list_help_requests().await?;
            render::help_requests(&requests);
        }
        ChatCommands::Watch { help_request } => {
            println!("Following help request {} (Ctrl-C to stop)...", help_request);
            let poller = ChatPoller::new(client, config.poll_interval);
            let stream = poller.watch(help_request);
            futures::pin_mut!(stream);

            loop {
                tokio::select! {
                    next = stream.next() => match next {
                        Some(batch) => render::chat(&batch?),
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
        ChatCommands::Send {
            help_request,
            message,
        } => {
            let sent = client.send_chat_message(help_request, &message).await?;
            render::chat(&[sent]);
        }
    }

    Ok(())
}
