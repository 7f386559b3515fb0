//! `braintree`: manage Braintree subscriptions from the command line.
//!
//! Credentials come from a TOML file (`--config`) or from the `BRAINTREE_*`
//! environment variables. Each command prints the resulting subscription as
//! pretty JSON on stdout; failures go to stderr with a non-zero exit status.

use std::{fs, path::PathBuf, process::ExitCode};

use braintree_gateway::{
    Decimal, Gateway, GatewayConfig, GatewayError, Subscription, SubscriptionOptions,
    SubscriptionRequest, SubscriptionTrialDurationUnit,
};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

mod observability;

use observability::{LogFormat, init_observability};

#[derive(Parser, Debug)]
#[command(author, version, about = "Braintree subscription management", long_about = None)]
struct Cli {
    /// TOML configuration file. Without it, settings are read from the environment.
    #[arg(long, short = 'c', global = true, env = "BRAINTREE_CONFIG")]
    config: Option<PathBuf>,

    /// Log output format (defaults to `LOG_FORMAT`, then pretty).
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a subscription
    Find {
        /// Subscription id
        id: String,
    },
    /// Cancel a subscription
    Cancel {
        /// Subscription id
        id: String,
    },
    /// Create a subscription
    Create(CreateArgs),
    /// Update a subscription
    Update(UpdateArgs),
}

#[derive(Args, Debug)]
struct CreateArgs {
    /// Plan to subscribe to
    #[arg(long)]
    plan_id: String,

    /// Vaulted payment method to bill
    #[arg(long)]
    payment_method_token: String,

    /// Price overriding the plan price, e.g. `9.99`
    #[arg(long)]
    price: Option<Decimal>,

    /// Day of the month to bill on (1-28, or 31 for the last day)
    #[arg(long)]
    billing_day_of_month: Option<i64>,

    /// Date of the first charge (YYYY-MM-DD)
    #[arg(long)]
    first_billing_date: Option<NaiveDate>,

    /// Bill until canceled
    #[arg(long)]
    never_expires: Option<bool>,

    /// Stop after this many billing cycles
    #[arg(long)]
    number_of_billing_cycles: Option<i64>,

    /// Enable or disable the trial period
    #[arg(long)]
    trial_period: Option<bool>,

    /// Trial length, in `--trial-duration-unit`s; sent as given
    #[arg(long, requires = "trial_duration_unit")]
    trial_duration: Option<String>,

    /// Trial unit: `day` or `month`
    #[arg(long)]
    trial_duration_unit: Option<SubscriptionTrialDurationUnit>,

    /// Merchant account to bill through
    #[arg(long)]
    merchant_account_id: Option<String>,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    /// Subscription id
    id: String,

    /// New plan
    #[arg(long)]
    plan_id: Option<String>,

    /// New price, e.g. `12.50`
    #[arg(long)]
    price: Option<Decimal>,

    /// Bill until canceled
    #[arg(long)]
    never_expires: Option<bool>,

    /// Stop after this many billing cycles
    #[arg(long)]
    number_of_billing_cycles: Option<i64>,

    /// Charge or credit the prorated difference now
    #[arg(long)]
    prorate_charges: bool,

    /// Undo the update if the prorated charge fails
    #[arg(long)]
    revert_on_proration_failure: bool,

    /// Replace all add-ons and discounts
    #[arg(long)]
    replace_all_add_ons_and_discounts: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    ReadConfig { path: PathBuf, source: std::io::Error },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CreateArgs {
    fn into_request(self) -> SubscriptionRequest {
        SubscriptionRequest {
            plan_id: Some(self.plan_id),
            payment_method_token: Some(self.payment_method_token),
            price: self.price,
            billing_day_of_month: self.billing_day_of_month.into(),
            first_billing_date: self.first_billing_date,
            never_expires: self.never_expires.into(),
            number_of_billing_cycles: self.number_of_billing_cycles.into(),
            trial_period: self.trial_period.into(),
            trial_duration: self.trial_duration,
            trial_duration_unit: self.trial_duration_unit,
            merchant_account_id: self.merchant_account_id,
            ..SubscriptionRequest::default()
        }
    }
}

impl UpdateArgs {
    fn into_request(self) -> SubscriptionRequest {
        let options = SubscriptionOptions {
            prorate_charges: self.prorate_charges,
            revert_subscription_on_proration_failure: self.revert_on_proration_failure,
            replace_all_add_ons_and_discounts: self.replace_all_add_ons_and_discounts,
            ..SubscriptionOptions::default()
        };
        SubscriptionRequest {
            id: Some(self.id),
            plan_id: self.plan_id,
            price: self.price,
            never_expires: self.never_expires.into(),
            number_of_billing_cycles: self.number_of_billing_cycles.into(),
            options: (options != SubscriptionOptions::default()).then_some(options),
            ..SubscriptionRequest::default()
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<GatewayConfig, CliError> {
    match path {
        Some(path) => {
            let document = fs::read_to_string(path)
                .map_err(|source| CliError::ReadConfig { path: path.clone(), source })?;
            Ok(GatewayConfig::from_toml(&document)?)
        }
        None => Ok(GatewayConfig::from_env()?),
    }
}

async fn run(cli: Cli) -> Result<Subscription, CliError> {
    let config = load_config(cli.config.as_ref())?;
    debug!(environment = %config.environment, "configuration loaded");

    let gateway = Gateway::new(config)?;
    let subscriptions = gateway.subscription();

    let subscription = match cli.command {
        Command::Find { id } => subscriptions.find(&id).await?,
        Command::Cancel { id } => subscriptions.cancel(&id).await?,
        Command::Create(args) => subscriptions.create(&args.into_request()).await?,
        Command::Update(args) => subscriptions.update(&args.into_request()).await?,
    };
    Ok(subscription)
}

fn report(error: &CliError) {
    eprintln!("error: {error}");
    if let CliError::Gateway(GatewayError::Validation(errors)) = error {
        for (path, field_errors) in errors.fields() {
            for field_error in field_errors {
                eprintln!("  {path} [{}]: {}", field_error.code, field_error.message);
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_observability(cli.log_format.unwrap_or_else(LogFormat::from_env));

    let outcome = run(cli)
        .await
        .and_then(|subscription| Ok(serde_json::to_string_pretty(&subscription)?));

    match outcome {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}
