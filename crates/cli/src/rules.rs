//! `rulectl rules ...`: list, add, extend, and delete car pricing rules.

use anyhow::{bail, Result};
use brokerage_core::group::ComposerMode;
use brokerage_core::range::RangeDraft;
use brokerage_core::rules::{CarRulePartition, GroupRule};
use brokerage_core::scope::{PlanScope, VehicleCondition};
use brokerage_core::types::DbId;
use brokerage_editor::{EditorError, GroupRuleEditor, RangeRuleEditor, RuleDeletion, RuleListingCache};
use clap::{Args, Subcommand};

use crate::Context;

/// Plan and company a command operates on.
#[derive(Args, Debug, Clone, Copy)]
pub struct ScopeArgs {
    /// Insurance plan id
    #[arg(long)]
    plan: DbId,

    /// Insurance company id
    #[arg(long)]
    company: DbId,
}

impl ScopeArgs {
    fn plan_scope(self) -> PlanScope {
        PlanScope::new(self.plan, self.company)
    }
}

/// Car selection shared by the group commands.
#[derive(Args, Debug, Clone)]
pub struct CarArgs {
    /// Car make id
    #[arg(long)]
    make: DbId,

    /// Car model id
    #[arg(long)]
    model: DbId,

    /// Model years, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    years: Vec<i32>,
}

#[derive(Subcommand)]
pub enum RuleCommands {
    /// List the car rules of a plan
    List {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Show one condition only
        #[arg(long)]
        condition: Option<VehicleCondition>,
    },

    /// Add a price-range rule
    AddRange {
        #[command(flatten)]
        scope: ScopeArgs,

        /// new or used
        #[arg(long)]
        condition: VehicleCondition,

        #[arg(long)]
        from: f64,

        #[arg(long)]
        to: f64,

        /// Percentage applied to cars priced in the range
        #[arg(long)]
        percentage: f64,
    },

    /// Create a named car group rule
    AddGroup {
        #[command(flatten)]
        scope: ScopeArgs,

        #[arg(long)]
        condition: VehicleCondition,

        /// Group name, unique within the plan and condition
        #[arg(long)]
        name: String,

        #[arg(long)]
        percentage: f64,

        #[command(flatten)]
        car: CarArgs,
    },

    /// Add cars to an existing group rule
    AppendGroup {
        #[command(flatten)]
        scope: ScopeArgs,

        #[arg(long)]
        condition: VehicleCondition,

        /// Id of the group rule to extend
        #[arg(long)]
        rule_id: DbId,

        #[command(flatten)]
        car: CarArgs,
    },

    /// Delete rules by id
    Delete {
        #[command(flatten)]
        scope: ScopeArgs,

        #[arg(long)]
        condition: VehicleCondition,

        /// Rule ids, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<DbId>,
    },
}

pub async fn handle_command(cmd: RuleCommands, ctx: &Context) -> Result<()> {
    let cache = RuleListingCache::new(ctx.store.clone());

    match cmd {
        RuleCommands::List { scope, condition } => {
            let rules = cache.car_rules(scope.plan_scope()).await?;
            let conditions = match condition {
                Some(c) => vec![c],
                None => VehicleCondition::ALL.to_vec(),
            };
            for condition in conditions {
                let partition = rules.partition(condition).cloned().unwrap_or_default();
                print_partition(condition, &partition);
            }
        }

        RuleCommands::AddRange {
            scope,
            condition,
            from,
            to,
            percentage,
        } => {
            let plan_scope = scope.plan_scope();
            let existing = cache.car_rules(plan_scope).await?;
            let mut editor = RangeRuleEditor::new(plan_scope, ctx.store.clone(), ctx.bus.clone());
            editor.set_draft(RangeDraft::new(from, to, condition, percentage));
            editor.submit(&existing).await.or_else(report)?;
            println!("Added {condition} range {from}..{to} at {percentage}%");
        }

        RuleCommands::AddGroup {
            scope,
            condition,
            name,
            percentage,
            car,
        } => {
            let mut editor = group_editor(ctx, &cache, scope, condition).await?;
            editor.set_group_name(name.as_str()).or_else(report)?;
            editor.set_percentage(percentage).or_else(report)?;
            pick_car(&mut editor, &car).await?;
            editor.submit().await.or_else(report)?;
            println!("Created group '{name}' for {condition} cars at {percentage}%");
        }

        RuleCommands::AppendGroup {
            scope,
            condition,
            rule_id,
            car,
        } => {
            let mut editor = group_editor(ctx, &cache, scope, condition).await?;
            editor.set_mode(ComposerMode::Append);
            editor.select_existing(rule_id).or_else(report)?;
            let name = editor.composer().group_name().to_string();
            pick_car(&mut editor, &car).await?;
            editor.submit().await.or_else(report)?;
            println!("Appended to group '{name}' (rule {rule_id})");
        }

        RuleCommands::Delete {
            scope,
            condition,
            ids,
        } => {
            let rule_scope = scope.plan_scope().with_condition(condition);
            let mut deletion = RuleDeletion::new(rule_scope, ctx.store.clone(), ctx.bus.clone());
            for id in ids {
                if !deletion.selection().contains(id) {
                    deletion.toggle_one(id);
                }
            }
            let count = deletion.selection().len();
            deletion.submit().await.or_else(report)?;
            println!("Deleted {count} rule(s) from {rule_scope}");
        }
    }

    Ok(())
}

async fn group_editor(
    ctx: &Context,
    cache: &RuleListingCache,
    scope: ScopeArgs,
    condition: VehicleCondition,
) -> Result<GroupRuleEditor> {
    let plan_scope = scope.plan_scope();
    let existing: Vec<GroupRule> = cache.car_rules(plan_scope).await?.groups(condition).to_vec();
    let mut editor = GroupRuleEditor::new(
        plan_scope,
        condition,
        existing,
        ctx.store.clone(),
        ctx.store.clone(),
        ctx.bus.clone(),
    );
    editor.open();
    Ok(editor)
}

/// Walk the make/model/year cascade the way the dialog does.
async fn pick_car(editor: &mut GroupRuleEditor, car: &CarArgs) -> Result<()> {
    editor.select_make(Some(car.make)).await.or_else(report)?;
    if !editor.composer().models().iter().any(|m| m.id == car.model) {
        bail!("Model {} does not belong to make {}", car.model, car.make);
    }
    editor.select_model(Some(car.model)).await.or_else(report)?;

    let available = editor.composer().available_years();
    if let Some(year) = car.years.iter().find(|y| !available.contains(y)) {
        bail!("Year {year} is not available for model {}", car.model);
    }
    editor.set_years(car.years.iter().copied());
    Ok(())
}

/// Turn an editor failure into the message a user would see on the form.
fn report<T>(err: EditorError) -> Result<T> {
    tracing::debug!(error = ?err, "Editor rejected command");
    bail!(err.user_message())
}

fn print_partition(condition: VehicleCondition, partition: &CarRulePartition) {
    println!("== {condition} ==");
    if partition.is_empty() {
        println!("  (no rules)");
        return;
    }
    for rule in &partition.range {
        println!(
            "  RANGE #{:<5} {:>12} .. {:<12} {}%",
            rule.id, rule.from, rule.to, rule.percentage
        );
    }
    for rule in &partition.groups {
        let cars: usize = rule.groups.iter().map(|g| g.cars.len()).sum();
        println!(
            "  GROUP #{:<5} {:<28} {}% ({cars} car spec(s))",
            rule.id,
            rule.primary_group_name().unwrap_or("-"),
            rule.percentage
        );
    }
}
