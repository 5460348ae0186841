//! `learnpath`: generate a learning plan for a topic from the terminal.

mod run_cmd;

use clap::Parser;

/// Exit code for configuration and startup errors.
pub const EXIT_CONFIG: i32 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "learnpath",
    version,
    about = "Generate a personalized learning path for a topic"
)]
pub struct Cli {
    /// What you want to learn, e.g. "Python for Data Analysis"
    #[arg(required = true, num_args = 1..)]
    pub topic: Vec<String>,

    /// Print the plan as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Do not print progress lines on stderr
    #[arg(long, short)]
    pub quiet: bool,

    /// Attempts per agent call (overrides MAX_ATTEMPTS)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: Option<u32>,

    /// Seconds to wait for a single agent call (overrides CALL_TIMEOUT_SECS)
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl Cli {
    /// The topic words joined back into one string.
    pub fn topic_text(&self) -> String {
        self.topic.join(" ")
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let code = match run_cmd::run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_CONFIG
        }
    };
    std::process::exit(code);
}
