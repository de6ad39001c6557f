//! `rulectl plans list`: the plans rules can be attached to.

use anyhow::Result;
use brokerage_core::catalog::default_car_plan;
use brokerage_core::scope::InsuranceType;
use clap::Subcommand;

use crate::Context;

#[derive(Subcommand)]
pub enum PlanCommands {
    /// List insurance plans
    List {
        /// CAR, HEALTH or LIFE; all types when omitted
        #[arg(long = "type")]
        insurance_type: Option<InsuranceType>,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn handle_command(cmd: PlanCommands, ctx: &Context) -> Result<()> {
    match cmd {
        PlanCommands::List {
            insurance_type,
            json,
        } => {
            let plans = ctx.store.get_plans(insurance_type).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plans)?);
                return Ok(());
            }

            let default_id = default_car_plan(&plans).map(|p| p.id);
            for plan in &plans {
                let marker = if Some(plan.id) == default_id { "*" } else { " " };
                println!(
                    "{marker} {:>6}  {:<7} {}",
                    plan.id, plan.insurance_type, plan.name
                );
            }
        }
    }

    Ok(())
}
