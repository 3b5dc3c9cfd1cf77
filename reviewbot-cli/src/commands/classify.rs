//! Classify command - Show how paths are treated by the diff filter

use clap::Args;
use reviewbot_core::{Config, ResourceRules};

/// Arguments for the classify command
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Repository-relative paths to classify
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Print one JSON object per path
    #[arg(long)]
    pub json: bool,
}

impl ClassifyArgs {
    /// Execute the classify command
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let rules = ResourceRules::from_config(&config.resources);

        for path in &self.paths {
            let classification = rules.classify(path);
            if self.json {
                println!("{}", serde_json::to_string(&classification)?);
                continue;
            }

            let kind = if classification.is_resource {
                "resource"
            } else {
                "review"
            };
            let category = classification.source_category.unwrap_or("-");
            let unity = if classification.unity_related {
                " (unity)"
            } else {
                ""
            };
            println!("{kind:<8} {category:<12} {path}{unity}");
        }

        Ok(())
    }
}
