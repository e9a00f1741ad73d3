use super::OutputArgs;
use crate::{config::Config, report::Report};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct TensionArmArgs {
    /// Path to a belt configuration with a `[tensioner_arm]` section.
    pub config: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl TensionArmArgs {
    pub fn run(&self) -> Result<()> {
        let config = Config::from_file(&self.config)?;
        config.validate()?;

        let Some((arm, search)) = config.tensioner_arm()? else {
            anyhow::bail!("{} has no [tensioner_arm] section", self.config.display());
        };
        let mut belt = config.belt()?;

        let limits = arm.limits(&belt).context("invalid tensioner arm")?;
        tracing::info!(
            lower_deg = limits.lower.to_degrees(),
            upper_deg = limits.upper.to_degrees(),
            target = search.target_length,
            "searching tensioner arm angle"
        );

        let solution = arm
            .solve(&mut belt, &search)
            .context("tensioner arm search failed")?;
        tracing::info!(
            angle_deg = solution.angle.to_degrees(),
            length = solution.length,
            iterations = solution.iterations,
            "tensioner placed"
        );

        let report =
            Report::new(&mut belt, Some(solution)).context("failed to solve belt forces")?;
        self.output.emit(&mut belt, &config.render, &report)
    }
}
