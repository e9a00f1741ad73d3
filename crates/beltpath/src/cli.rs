use crate::{config::RenderConfig, report::Report};
use anyhow::{Context, Result};
use beltpath_core::Belt;
use clap::Args;
use std::path::PathBuf;

pub mod solve;
pub mod tension_arm;

/// Output flags shared by every command.
#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    /// Also draw the belt as an SVG file.
    #[arg(long)]
    pub svg: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl OutputArgs {
    pub fn emit(&self, belt: &mut Belt, render: &RenderConfig, report: &Report) -> Result<()> {
        if let Some(path) = &self.svg {
            let document = beltpath_render::render_belt(belt, &render.options())
                .context("failed to draw belt")?;
            beltpath_render::save(path, &document)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote drawing");
        }

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(report).context("failed to serialize report")?
            );
        } else {
            println!("{report}");
        }

        Ok(())
    }
}
