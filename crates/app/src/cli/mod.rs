use clap::{Args, Parser, Subcommand};

mod baskets;
mod discounts;
mod logging;
mod migrate;
mod output;
mod quote;

#[derive(Debug, Parser)]
#[command(name = "trolley", about = "Trolley basket pricing CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    logging: logging::LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Price a basket described in a YAML file and print its receipt.
    Quote(quote::QuoteArgs),
    Baskets(baskets::BasketsCommand),
    Discounts(discounts::DiscountsCommand),
    /// Apply pending database migrations.
    Migrate(migrate::MigrateArgs),
}

/// PostgreSQL connection settings shared by stored-basket commands.
#[derive(Debug, Args)]
pub(crate) struct DatabaseArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        logging::init(&self.logging)?;

        match self.command {
            Commands::Quote(args) => quote::run(args).await,
            Commands::Baskets(command) => baskets::run(command).await,
            Commands::Discounts(command) => discounts::run(command).await,
            Commands::Migrate(args) => migrate::run(args).await,
        }
    }
}
