//! Grid command - Learn to walk a 4×4 grid to its goal cell

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    app::App,
    cli::{
        config::{CommandDefaults, CommonArgs},
        output::{print_kv, print_section, print_subsection, print_training_result},
    },
    env::GridWorld,
};

#[derive(Parser, Debug)]
#[command(about = "Train an agent on the grid world")]
pub struct GridArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Move limit per episode
    #[arg(long, default_value_t = 50)]
    pub max_steps: usize,
}

fn defaults() -> CommandDefaults {
    CommandDefaults {
        episodes: 200,
        hidden: vec![16, 16],
        learning_rate: 0.01,
    }
}

pub fn execute(args: GridArgs) -> Result<()> {
    let defaults = defaults();
    let mut env = GridWorld::new().with_max_steps(args.max_steps);
    let app = App::new();
    let mut agent = app
        .create_agent(
            &env,
            args.common.agent_config()?,
            args.common.network_config(&defaults)?,
        )
        .context("Failed to create grid agent")?;

    print_section("Grid world");
    print_kv("Goal", &format!("{:?}", env.goal()));
    print_kv("Move limit", &args.max_steps.to_string());

    let mut pipeline = args.common.pipeline(&defaults, None)?;
    let result = pipeline
        .run_environment(&mut agent, &mut env)
        .context("Grid training failed")?;

    print_training_result(&result);
    print_subsection("Steps per episode");
    let tail = result.episode_steps.len().saturating_sub(10);
    for (offset, steps) in result.episode_steps[tail..].iter().enumerate() {
        print_kv(&format!("Episode {}", tail + offset + 1), &steps.to_string());
    }
    let best = result.episode_steps.iter().min().copied().unwrap_or(0);
    print_kv("Shortest", &best.to_string());
    Ok(())
}
