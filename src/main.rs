use anyhow::{Context, Result};
use clap::{Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use openstax_aws::AwsContext;
use openstax_deploy::deploy::{self, Action, CustomizedPages, Deployment, DeploymentOptions, HostedEdited};
use openstax_deploy::{init_openstax_aws, standard_args, StandardFlag, StandardFlags};
use openstax_deploy_config::{AwsAccount, DeployConfig};
use std::path::PathBuf;
use tracing::info;

const ABOUT: &str = "Create, update or delete the customized_pages and hosted_edited stacks.\n\
Runs against the sandbox account unless --production_aws is given; \
nothing is changed unless --do_it is given.";

#[derive(Parser)]
#[command(name = "openstax-deploy")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    deployment: DeploymentCommand,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum DeploymentCommand {
    /// Pages bucket, CDN and DNS for customized pages
    CustomizedPages(TargetArgs),
    /// DNS for the hosted edited site
    HostedEdited(TargetArgs),
}

#[derive(Args)]
struct TargetArgs {
    /// What to do with the deployment's stacks
    #[arg(value_enum)]
    action: Action,

    /// Environment name, e.g. qa, staging, production
    #[arg(long = "env_name", value_name = "NAME")]
    env_name: String,

    /// AWS region of the stacks (defaults to the configured region)
    #[arg(long, value_name = "REGION")]
    region: Option<String>,
}

fn main() -> Result<()> {
    let matches = standard_args(Cli::command(), &[StandardFlag::DoIt], ABOUT).get_matches();
    let flags = StandardFlags::from_matches(&matches);
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(run(cli, flags))
}

async fn run(cli: Cli, flags: StandardFlags) -> Result<()> {
    let config = match &cli.config {
        Some(path) => DeployConfig::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => DeployConfig::load().context("Failed to load configuration")?,
    };

    let target = match &cli.deployment {
        DeploymentCommand::CustomizedPages(target) | DeploymentCommand::HostedEdited(target) => {
            target
        }
    };

    let region = target
        .region
        .clone()
        .unwrap_or_else(|| config.aws.default_region.clone());
    let aws = AwsContext::load(&region, config.aws.s3_endpoint.as_deref()).await;

    init_openstax_aws(flags.production_aws, &config, &aws).await?;

    let options = DeploymentOptions::new(target.env_name.clone(), region)
        .in_aws_sandbox(AwsAccount::from_production_flag(flags.production_aws).in_sandbox())
        .dry_run(flags.dry_run());
    if options.dry_run {
        info!("Dry run; pass --do_it to make changes");
    }

    let deployment: Box<dyn Deployment> = match &cli.deployment {
        DeploymentCommand::CustomizedPages(_) => Box::new(CustomizedPages::new(options, &aws)),
        DeploymentCommand::HostedEdited(_) => Box::new(HostedEdited::new(options, &aws)),
    };

    deploy::run(deployment.as_ref(), target.action)
        .await
        .with_context(|| format!("{} failed", target.action))?;

    Ok(())
}
