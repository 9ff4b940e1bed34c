//! Chat command - Train a response-selection chatbot on a Q&A corpus

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::warn;

use crate::{
    app::{AgentConfig, App, ChatConfig, ChatLearning, GrowthConfig, UnknownLabelPolicy},
    approximator::GrowthStrategy,
    chatbot::TeachOutcome,
    cli::{
        config::{CommandDefaults, CommonArgs},
        output::{format_percent, print_kv, print_section, print_subsection, print_training_result},
    },
    corpus::TrainingCorpus,
    encoding::TextEncoding,
};

#[derive(Parser, Debug)]
#[command(about = "Train a chatbot on a question/answer corpus")]
pub struct ChatArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// JSON corpus: an array of {"question", "answer"} objects
    #[arg(long, short = 'c', required_unless_present = "load")]
    pub corpus: Option<PathBuf>,

    /// Resume from a saved chatbot instead of a corpus
    #[arg(long, conflicts_with = "corpus")]
    pub load: Option<PathBuf>,

    /// Save the trained chatbot (MessagePack)
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Write one CSV row of metrics per episode
    #[arg(long)]
    pub metrics_csv: Option<PathBuf>,

    /// Teach a new pair after training, as `question=answer` (repeatable)
    #[arg(long, value_parser = parse_teach)]
    pub teach: Vec<(String, String)>,

    /// Ask a question after training (repeatable)
    #[arg(long)]
    pub ask: Vec<String>,

    /// How exchanges turn into updates: supervised (default), bootstrap, classification
    #[arg(long, conflicts_with = "load")]
    pub learning: Option<ChatLearning>,

    /// Question encoding: frequency (default) or presence
    #[arg(long, conflicts_with = "load")]
    pub encoding: Option<TextEncoding>,

    /// How the network grows for new answers: rebuild (default) or preserve
    #[arg(long, conflicts_with = "load")]
    pub growth: Option<GrowthStrategy>,

    /// Unregistered expected answers: reject (default) or fallback
    #[arg(long, conflicts_with = "load")]
    pub unknown_label: Option<UnknownLabelPolicy>,
}

/// Parse `question=answer`.
pub fn parse_teach(value: &str) -> std::result::Result<(String, String), String> {
    let (question, answer) = value
        .split_once('=')
        .ok_or_else(|| format!("expected 'question=answer', got '{value}'"))?;
    let (question, answer) = (question.trim(), answer.trim());
    if question.is_empty() || answer.is_empty() {
        return Err(format!("question and answer must be non-empty in '{value}'"));
    }
    Ok((question.to_string(), answer.to_string()))
}

fn defaults() -> CommandDefaults {
    CommandDefaults {
        episodes: 100,
        hidden: vec![128, 64],
        learning_rate: 0.001,
    }
}

impl ChatArgs {
    /// Chat options for a fresh bot; a loaded bot keeps its saved ones.
    fn chat_config(&self) -> ChatConfig {
        ChatConfig::default()
            .with_learning(self.learning.unwrap_or_default())
            .with_encoding(self.encoding.unwrap_or_default())
            .with_unknown_label(self.unknown_label.unwrap_or_default())
            .with_growth(GrowthConfig::default().with_strategy(self.growth.unwrap_or_default()))
    }
}

pub fn execute(args: ChatArgs) -> Result<()> {
    let defaults = defaults();
    let app = App::new();
    let agent_config: AgentConfig = args.common.agent_config()?;

    let mut chatbot = match (&args.load, &args.corpus) {
        (Some(path), _) => {
            if args.common.sets_model_options() {
                warn!("Agent and network options are ignored with --load");
            }
            app.load_chatbot(path)
                .with_context(|| format!("Failed to load chatbot from {}", path.display()))?
        }
        (None, Some(path)) => {
            let corpus = TrainingCorpus::load_json(path)?;
            app.create_chatbot(
                corpus,
                args.chat_config(),
                agent_config,
                args.common.network_config(&defaults)?,
            )
            .context("Failed to create chatbot")?
        }
        (None, None) => bail!("either --corpus or --load is required"),
    };

    print_section("Chatbot");
    print_kv("Pairs", &chatbot.corpus().len().to_string());
    print_kv("Answers", &chatbot.registry().count().to_string());
    print_kv("Learning", &chatbot.config().learning.to_string());
    print_kv("Encoding", &chatbot.config().encoding.to_string());

    let mut pipeline = args.common.pipeline(&defaults, args.metrics_csv.as_deref())?;
    let result = pipeline
        .run_chatbot(&mut chatbot)
        .context("Chatbot training failed")?;
    print_training_result(&result);

    if !args.teach.is_empty() {
        print_subsection("Teaching");
        for (question, answer) in &args.teach {
            let outcome = pipeline
                .teach(&mut chatbot, question, answer)
                .with_context(|| format!("Failed to teach '{question}'"))?;
            let description = match outcome {
                TeachOutcome::Grew(event) => format!("new answer, {} actions", event.action_count),
                TeachOutcome::Reinforced { index } => format!("known answer #{index}"),
            };
            print_kv(question, &description);
        }
    }

    let evaluation = chatbot.evaluate()?;
    print_subsection("Evaluation");
    print_kv(
        "Accuracy",
        &format!(
            "{} ({}/{})",
            format_percent(evaluation.accuracy()),
            evaluation.correct,
            evaluation.total
        ),
    );
    for (question, expected, replied) in evaluation.mistakes.iter().take(5) {
        print_kv(question, &format!("'{replied}' (expected '{expected}')"));
    }

    if !args.ask.is_empty() {
        print_subsection("Answers");
        for question in &args.ask {
            print_kv(question, &chatbot.reply(question)?);
        }
    }

    if let Some(path) = &args.save {
        app.save_chatbot(&chatbot, path)
            .with_context(|| format!("Failed to save chatbot to {}", path.display()))?;
        print_kv("Saved", &path.display().to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_teach() {
        assert_eq!(
            parse_teach("como te llamas = me llamo bot").unwrap(),
            ("como te llamas".to_string(), "me llamo bot".to_string())
        );
        assert!(parse_teach("sin respuesta").is_err());
        assert!(parse_teach("=vacio").is_err());
    }

    #[test]
    fn test_unset_chat_options_use_defaults() {
        let args = ChatArgs::parse_from(["chat", "-c", "a.json"]);
        assert_eq!(args.chat_config(), ChatConfig::default());
        assert_eq!(args.chat_config().learning, ChatLearning::Supervised);

        let args = ChatArgs::parse_from(["chat", "-c", "a.json", "--learning", "bootstrap"]);
        assert_eq!(args.chat_config().learning, ChatLearning::Bootstrap);
    }

    #[test]
    fn test_chat_options_conflict_with_load() {
        for flag in [
            ["--learning", "classification"],
            ["--encoding", "presence"],
            ["--growth", "preserve"],
            ["--unknown-label", "fallback"],
        ] {
            let result = ChatArgs::try_parse_from(["chat", "--load", "bot.msgpack", flag[0], flag[1]]);
            assert!(result.is_err(), "{} accepted with --load", flag[0]);
        }
        assert!(ChatArgs::try_parse_from(["chat", "--load", "bot.msgpack", "-e", "2"]).is_ok());
    }
}
