//! The `adaptiq init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("adaptiq.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("pools")?;
    write_if_missing(Path::new("pools/example.toml"), EXAMPLE_POOL)?;

    println!("\nNext steps:");
    println!("  1. Run: adaptiq validate --pool pools/example.toml");
    println!("  2. Run: adaptiq session --learner you");
    println!("  3. Answer the questions, then: adaptiq record --learner you --answers 1,0,1,...");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# adaptiq configuration

# One JSON state file per learner is kept here.
store_dir = "./adaptiq-data"

# Default pool for `session`, `record`, `mastery` and `simulate`.
pool = "pools/example.toml"

# 8 regular questions + 1 bonus.
questions_per_session = 9

default_learner = "guest"

[selection]
srs_weight = 0.4
irt_weight = 0.6
jitter = 0.15
"#;

const EXAMPLE_POOL: &str = include_str!("../../../../pools/example.toml");
