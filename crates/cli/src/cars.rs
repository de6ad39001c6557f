//! `rulectl cars ...`: browse the make/model/year catalog.

use anyhow::Result;
use brokerage_core::types::DbId;
use brokerage_store::CarCatalog;
use clap::Subcommand;

use crate::Context;

#[derive(Subcommand)]
pub enum CarCommands {
    /// List car makes
    Makes,

    /// List the models of a make
    Models {
        /// Make id
        make: DbId,
    },

    /// List the model years of a model
    Years {
        /// Model id
        model: DbId,
    },
}

pub async fn handle_command(cmd: CarCommands, ctx: &Context) -> Result<()> {
    let catalog: &dyn CarCatalog = ctx.store.as_ref();

    match cmd {
        CarCommands::Makes => {
            for make in catalog.makes().await? {
                println!("{:>6}  {}", make.id, make.name);
            }
        }
        CarCommands::Models { make } => {
            let models = catalog.models(make).await?;
            if models.is_empty() {
                println!("No models for make {make}");
            }
            for model in models {
                println!("{:>6}  {}", model.id, model.name);
            }
        }
        CarCommands::Years { model } => {
            let years: Vec<String> = catalog
                .years(model)
                .await?
                .into_iter()
                .map(|y| y.year.to_string())
                .collect();
            println!("{}", years.join(", "));
        }
    }

    Ok(())
}
