//! Command Handlers

use cf_api::{run_server, shutdown_signal, ApiConfig};
use cf_db::{LedgerDatabase, RetryConfig, StoreBackend, StoreConfig};

use crate::client::{CfClient, CreateCampaignRequest, MilestoneRequest, RecordContributionRequest};
use crate::commands::{
    campaign::{parse_milestone, CampaignCommands},
    contribution::ContributionCommands,
    user::UserCommands,
    Cli, Commands, OutputFormat, StartArgs,
};
use crate::error::{CliError, CliResult};
use crate::output;

/// Run the CLI with parsed arguments
pub async fn run(cli: Cli) -> CliResult<()> {
    let format = cli.format;
    match cli.command {
        Commands::Start(args) => handle_start(args).await,
        command => {
            let client = CfClient::new(&cli.api_url)?;
            match command {
                Commands::Status => handle_status(&client, format).await,
                Commands::Campaign(cmd) => handle_campaign(&client, cmd, format).await,
                Commands::Contribution(cmd) => handle_contribution(&client, cmd, format).await,
                Commands::User(cmd) => handle_user(&client, cmd, format).await,
                Commands::Achievements { wallet } => {
                    let campaigns = client.achievements(&wallet).await?;
                    output::print_campaigns(&campaigns, format);
                    Ok(())
                }
                Commands::Start(_) => Err(CliError::invalid_arg("start cannot run as a client command")),
            }
        }
    }
}

fn store_config(args: &StartArgs) -> CliResult<StoreConfig> {
    let backend = args
        .backend
        .parse::<StoreBackend>()
        .map_err(|_| CliError::config(format!("unknown store backend: {}", args.backend)))?;

    Ok(StoreConfig {
        backend,
        data_dir: args.data_dir.clone(),
        flush_on_shutdown: args.flush_on_shutdown,
    })
}

async fn handle_start(args: StartArgs) -> CliResult<()> {
    let store = store_config(&args)?;
    let retry = RetryConfig::from_env()?;

    println!(
        "Starting crowdfunding API on {}:{} ({} store)...",
        args.host,
        args.port,
        store.backend.as_str()
    );

    let database = LedgerDatabase::open(store, &retry)?;
    let config = ApiConfig {
        host: args.host,
        port: args.port,
        enable_cors: args.cors,
    };

    run_server(config, database, shutdown_signal())
        .await
        .map_err(|e| CliError::server(e.to_string()))
}

async fn handle_status(client: &CfClient, format: OutputFormat) -> CliResult<()> {
    let health = client.health().await?;
    let ready = match client.ready().await {
        Ok(ready) => Some(ready),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness probe failed");
            None
        }
    };

    output::print_health(&health, ready.as_ref(), format);
    Ok(())
}

async fn handle_campaign(client: &CfClient, cmd: CampaignCommands, format: OutputFormat) -> CliResult<()> {
    match cmd {
        CampaignCommands::Create {
            creator,
            title,
            description,
            goal,
            email,
            deadline,
            category,
            milestones,
        } => {
            let milestones = milestones
                .iter()
                .map(|raw| {
                    parse_milestone(raw).map(|(title, target_amount)| MilestoneRequest {
                        title,
                        target_amount,
                    })
                })
                .collect::<CliResult<Vec<_>>>()?;

            let detail = client
                .create_campaign(&CreateCampaignRequest {
                    creator_wallet: creator,
                    title,
                    description,
                    goal_amount: goal,
                    email,
                    deadline,
                    category,
                    milestones,
                })
                .await?;
            output::print_campaign_detail(&detail, format);
        }

        CampaignCommands::List {
            status,
            creator,
            exclude_fulfilled,
        } => {
            let campaigns = client
                .list_campaigns(status.as_deref(), creator.as_deref(), exclude_fulfilled)
                .await?;
            output::print_campaigns(&campaigns, format);
        }

        CampaignCommands::Get { id } => {
            let detail = client.get_campaign(&id).await?;
            output::print_campaign_detail(&detail, format);
        }

        CampaignCommands::Close { id, requester } => {
            let campaign = client.close_campaign(&id, requester.as_deref()).await?;
            output::print_campaign(&campaign, format);
        }

        CampaignCommands::Update { id, title, content } => {
            let update = client.post_update(&id, &title, &content).await?;
            output::print_update(&update, format);
        }
    }

    Ok(())
}

async fn handle_contribution(
    client: &CfClient,
    cmd: ContributionCommands,
    format: OutputFormat,
) -> CliResult<()> {
    match cmd {
        ContributionCommands::Record {
            campaign,
            donor,
            amount,
            tx_hash,
            block_number,
            anonymous,
        } => {
            let result = client
                .record_contribution(&RecordContributionRequest {
                    campaign_id: campaign,
                    donor_wallet: donor,
                    amount,
                    transaction_hash: tx_hash,
                    block_number,
                    is_anonymous: anonymous,
                })
                .await?;
            output::print_record_result(&result, format);
        }

        ContributionCommands::List { campaign, donor } => {
            let contributions = client
                .list_contributions(campaign.as_deref(), donor.as_deref())
                .await?;
            output::print_contributions(&contributions, format);
        }
    }

    Ok(())
}

async fn handle_user(client: &CfClient, cmd: UserCommands, format: OutputFormat) -> CliResult<()> {
    match cmd {
        UserCommands::Connect {
            wallet,
            email,
            username,
        } => {
            let user = client
                .connect(&wallet, email.as_deref(), username.as_deref())
                .await?;
            output::print_user(&user, format);
        }

        UserCommands::Profile { wallet } => {
            let profile = client.profile(&wallet).await?;
            output::print_profile(&profile, format);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn start_args(extra: &[&str]) -> StartArgs {
        let mut argv = vec!["cf", "start"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Start(args) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_store_config_from_args() {
        let config = store_config(&start_args(&["--backend", "memory"])).unwrap();
        assert_eq!(config.backend, StoreBackend::Memory);

        let config = store_config(&start_args(&["--data-dir", "/tmp/ledger"])).unwrap();
        assert_eq!(config.backend, StoreBackend::Sled);
        assert_eq!(config.data_dir, std::path::PathBuf::from("/tmp/ledger"));
        assert!(config.flush_on_shutdown);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = store_config(&start_args(&["--backend", "rocksdb"])).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_client_against_background_server() {
        let config = ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            enable_cors: false,
        };
        let database = LedgerDatabase::in_memory(cf_db::RetryPolicy::no_retry());
        let addr = cf_api::start_background_server(config, database).await.unwrap();
        let client = CfClient::new(format!("http://{}", addr)).unwrap();

        assert_eq!(client.health().await.unwrap().backend, "memory");

        let detail = client
            .create_campaign(&CreateCampaignRequest {
                creator_wallet: "0xA11CE".to_string(),
                title: "Garden".to_string(),
                description: "Raised beds".to_string(),
                goal_amount: "500".to_string(),
                email: "alice@example.com".to_string(),
                deadline: None,
                category: None,
                milestones: vec![MilestoneRequest {
                    title: "Seeds".to_string(),
                    target_amount: "300".to_string(),
                }],
            })
            .await
            .unwrap();
        assert_eq!(detail.campaign.creator_wallet, "0xa11ce");
        assert_eq!(detail.milestones.len(), 1);

        let request = RecordContributionRequest {
            campaign_id: detail.campaign.id.clone(),
            donor_wallet: "0xb0b".to_string(),
            amount: "600".to_string(),
            transaction_hash: "0xcli".to_string(),
            block_number: Some(12),
            is_anonymous: false,
        };
        let result = client.record_contribution(&request).await.unwrap();
        assert_eq!(result.campaign.status, "FULFILLED");
        assert_eq!(result.reached_milestones.len(), 1);

        let err = client.record_contribution(&request).await.unwrap_err();
        assert!(matches!(err, CliError::ApiError { status: 409, .. }));

        let achievements = client.achievements("0xa11ce").await.unwrap();
        assert_eq!(achievements.len(), 1);
    }

    #[tokio::test]
    async fn test_status_without_server() {
        // nothing listens on port 1
        let client = CfClient::with_timeout("http://127.0.0.1:1", 2).unwrap();
        let err = handle_status(&client, OutputFormat::Json).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::ConnectionError { .. } | CliError::HttpError(_)
        ));
    }
}
