//! Text command - Learn next-letter transitions and generate words

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    app::App,
    cli::{
        config::{CommandDefaults, CommonArgs},
        output::{print_kv, print_section, print_subsection, print_training_result},
    },
    env::LetterChain,
};

#[derive(Parser, Debug)]
#[command(about = "Train the letter chain on a word list and generate text")]
pub struct TextArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Words to learn from
    #[arg(long, value_delimiter = ',', default_value = "hello,world,java,code,learn")]
    pub words: Vec<String>,

    /// Letters to start generated words from
    #[arg(long, default_value = "hwjcl")]
    pub starts: String,

    /// Letters generated after each start letter
    #[arg(long, default_value_t = 5)]
    pub length: usize,
}

fn defaults() -> CommandDefaults {
    CommandDefaults {
        episodes: 100,
        hidden: vec![64, 64, 32],
        learning_rate: 0.01,
    }
}

pub fn execute(args: TextArgs) -> Result<()> {
    let defaults = defaults();
    let mut env = LetterChain::new(&args.words).context("Word list has no usable words")?;
    let app = App::new();
    let mut agent = app
        .create_agent(
            &env,
            args.common.agent_config()?,
            args.common.network_config(&defaults)?,
        )
        .context("Failed to create text agent")?;

    print_section("Letter chain");
    print_kv("Words", &args.words.join(", "));
    print_kv("Pairs per episode", &env.pair_count().to_string());

    let mut pipeline = args.common.pipeline(&defaults, None)?;
    let result = pipeline
        .run_environment(&mut agent, &mut env)
        .context("Text training failed")?;
    print_training_result(&result);

    agent.disable_exploration();
    print_subsection("Generated");
    for start in args.starts.chars() {
        let text = LetterChain::generate(&agent, start, args.length)?;
        print_kv(&start.to_string(), &text);
    }
    Ok(())
}
