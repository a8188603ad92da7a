use clap::{Args, Subcommand};
use trolley_app::context::AppContext;

use super::DatabaseArgs;

#[derive(Debug, Args)]
pub(crate) struct DiscountsCommand {
    #[command(subcommand)]
    command: DiscountsSubcommand,

    #[command(flatten)]
    database: DatabaseArgs,
}

#[derive(Debug, Subcommand)]
enum DiscountsSubcommand {
    /// Stop honouring a discount code on every basket that carries it.
    Deactivate {
        /// Discount code
        code: String,
    },
}

pub(crate) async fn run(command: DiscountsCommand) -> Result<(), String> {
    let ctx = AppContext::from_database_url(&command.database.database_url)
        .await
        .map_err(|error| format!("failed to initialise: {error}"))?;

    match command.command {
        DiscountsSubcommand::Deactivate { code } => {
            let definition = ctx
                .discounts
                .deactivate(&code)
                .await
                .map_err(|error| format!("failed to deactivate {code}: {error}"))?;

            println!("definition_uuid: {}", definition.uuid);
            println!("code: {}", definition.code);
            println!("active: {}", definition.is_active);

            Ok(())
        }
    }
}
