use super::OutputArgs;
use crate::{config::Config, report::Report};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct SolveArgs {
    /// Path to the belt configuration file (TOML or JSON).
    pub config: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl SolveArgs {
    pub fn run(&self) -> Result<()> {
        let config = Config::from_file(&self.config)?;
        config.validate()?;

        let mut belt = config.belt()?;
        tracing::info!(
            pulleys = belt.len(),
            length = belt.total_length(),
            "loaded belt from {}",
            self.config.display()
        );

        let report = Report::new(&mut belt, None).context("failed to solve belt forces")?;
        self.output.emit(&mut belt, &config.render, &report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn writes_drawing() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("belt.json");
        fs::write(
            &config,
            r#"{
                "belt": { "min_tension": 1 },
                "pulleys": [
                    { "radius": 10, "x": 0, "y": 0, "direction": "CW" },
                    { "radius": 20, "x": 100, "y": 0, "direction": "CW", "torque": 40 }
                ]
            }"#,
        )
        .unwrap();
        let svg = dir.path().join("out/belt.svg");
        fs::create_dir_all(svg.parent().unwrap()).unwrap();

        SolveArgs {
            config,
            output: OutputArgs {
                svg: Some(svg.clone()),
                json: true,
            },
        }
        .run()
        .unwrap();

        let drawing = fs::read_to_string(svg).unwrap();
        assert!(drawing.contains("<svg"));
        assert_eq!(drawing.matches("<text").count(), 2);
    }

    #[test]
    fn reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SolveArgs {
            config: dir.path().join("missing.toml"),
            output: OutputArgs::default(),
        }
        .run()
        .unwrap_err();
        assert!(err.to_string().starts_with("failed to read config file"));
    }
}
