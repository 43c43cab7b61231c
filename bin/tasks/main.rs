//! AI Devs exercise runner
//!
//! One subcommand per exercise. Secrets and hosts come from the environment
//! (optionally seeded from an env file); local data paths are arguments.

mod style;

use aidevs_tasks::tasks::{
    arxiv, calibration, categories, censorship, database, keywords, login, map_city, research,
    theft_date, transcripts, verify,
};
use aidevs_tasks::Env;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use style::*;

#[derive(Parser, Debug)]
#[command(name = "tasks")]
#[command(about = "Run AI Devs exercises: fetch input, ask a model, report the answer")]
#[command(version)]
struct Cli {
    /// Env file with API keys and hosts (defaults to ./.env when present)
    #[arg(long, global = true, env = "TASKS_ENV_FILE")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log into the robot page by answering its question
    #[command(name = "s0101", visible_alias = "login")]
    Login,

    /// Pass the robot identity check
    #[command(name = "s0102", visible_alias = "verify")]
    Verify,

    /// Repair the calibration file and submit it
    #[command(name = "s0103", visible_alias = "calibration")]
    Calibration {
        #[arg(long, default_value = "json.txt")]
        input: PathBuf,
        #[arg(long, default_value = "final.json")]
        output: PathBuf,
    },

    /// Censor personal data with the local model
    #[command(name = "s0105", visible_alias = "censorship")]
    Censorship,

    /// Find the street from witness recordings
    #[command(name = "s0201", visible_alias = "transcripts")]
    Transcripts {
        #[arg(long, default_value = "records")]
        records_dir: PathBuf,
    },

    /// Name the city from map fragments
    #[command(name = "s0202", visible_alias = "map")]
    MapCity {
        #[arg(long, default_value = "images")]
        images_dir: PathBuf,
    },

    /// Sort factory reports into people and hardware notes
    #[command(name = "s0204", visible_alias = "categories")]
    Categories {
        #[arg(long, default_value = "pliki_z_fabryki")]
        files_dir: PathBuf,
        /// Seconds between model calls
        #[arg(long, default_value = "10")]
        pause: u64,
    },

    /// Answer questions about the indexed article
    #[command(name = "s0205", visible_alias = "arxiv")]
    Arxiv {
        /// Where indexed.md and downloaded media are written
        #[arg(long, default_value = ".")]
        work_dir: PathBuf,
        #[arg(long, default_value = "5")]
        pause: u64,
    },

    /// Generate keywords for factory reports
    #[command(name = "s0301", visible_alias = "keywords")]
    Keywords {
        #[arg(long, default_value = "pliki_z_fabryki")]
        reports_dir: PathBuf,
        #[arg(long, default_value = "5")]
        pause: u64,
    },

    /// Find the date of the prototype theft
    #[command(name = "s0302", visible_alias = "theft-date")]
    TheftDate {
        #[arg(long, default_value = "pliki_z_fabryki/do-not-share")]
        reports_dir: PathBuf,
    },

    /// Query the database until the model can answer
    #[command(name = "s0303", visible_alias = "database")]
    Database {
        #[arg(long, default_value = "5")]
        pause: u64,
    },

    /// Build the fine-tuning file from labelled samples
    #[command(name = "s0402-prepare")]
    ResearchPrepare {
        #[arg(long, default_value = "lab_data/correct.txt")]
        correct: PathBuf,
        #[arg(long, default_value = "lab_data/incorrect.txt")]
        incorrect: PathBuf,
        #[arg(long, default_value = "data.jsonl")]
        output: PathBuf,
        /// Samples taken per label
        #[arg(long, default_value_t = research::SAMPLES_PER_LABEL)]
        limit: usize,
    },

    /// Classify samples with the fine-tuned model and report accepted ids
    #[command(name = "s0402-validate")]
    ResearchValidate {
        #[arg(long, default_value = "lab_data/verify.txt")]
        input: PathBuf,
        #[arg(long, default_value = research::TUNED_MODEL)]
        model: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("aidevs_tasks=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let env = Env::load(cli.env_file.as_deref())?;

    match cli.command {
        Commands::Login => {
            print_header("s0101 Login");
            let outcome = login::run(&env).await?;
            print_key_value("Question", &outcome.question);
            print_key_value("Answer", &outcome.answer);
            print_success("Logged in");
        }
        Commands::Verify => {
            print_header("s0102 Verify");
            let verdict = verify::run(&env).await?;
            print_key_value("Final message", &verdict.text);
            print_success("Verification finished");
        }
        Commands::Calibration { input, output } => {
            print_header("s0103 Calibration");
            let options = calibration::Options { input, output };
            let data = calibration::run(&env, &options).await?;
            print_key_value("Samples", &data.test_data.len().to_string());
            print_key_value("Saved", &options.output.display().to_string());
            print_success("Report sent");
        }
        Commands::Censorship => {
            print_header("s0105 Censorship");
            let outcome = censorship::run(&env).await?;
            print_key_value("Original", &outcome.original);
            print_key_value("Censored", &outcome.censored);
            for violation in &outcome.violations {
                print_warning(&format!("{:?}", violation));
            }
            print_success("Report sent");
        }
        Commands::Transcripts { records_dir } => {
            print_header("s0201 Transcripts");
            let street = transcripts::run(&env, &transcripts::Options { records_dir }).await?;
            print_key_value("Street", &street);
            print_success("Report sent");
        }
        Commands::MapCity { images_dir } => {
            print_header("s0202 Map");
            let answer = map_city::run(&env, &map_city::Options { images_dir }).await?;
            println!("{}", answer);
        }
        Commands::Categories { files_dir, pause } => {
            print_header("s0204 Categories");
            let options = categories::Options {
                files_dir,
                pause: Duration::from_secs(pause),
            };
            let result = categories::run(&env, &options).await?;
            print_key_value("People", &result.people.join(", "));
            print_key_value("Hardware", &result.hardware.join(", "));
            print_success("Report sent");
        }
        Commands::Arxiv { work_dir, pause } => {
            print_header("s0205 Arxiv");
            let options = arxiv::Options {
                work_dir,
                pause: Duration::from_secs(pause),
            };
            for (id, answer) in arxiv::run(&env, &options).await? {
                print_key_value(&id, &answer);
            }
            print_success("Report sent");
        }
        Commands::Keywords { reports_dir, pause } => {
            print_header("s0301 Keywords");
            let options = keywords::Options {
                reports_dir,
                pause: Duration::from_secs(pause),
            };
            let tags = keywords::run(&env, &options).await?;
            print_info(&format!("{} reports tagged", tags.len()));
            print_success("Report sent");
        }
        Commands::TheftDate { reports_dir } => {
            print_header("s0302 Theft date");
            let date = theft_date::run(&env, &theft_date::Options { reports_dir }).await?;
            print_key_value("Date", &date);
            print_success("Report sent");
        }
        Commands::Database { pause } => {
            print_header("s0303 Database");
            let options = database::Options {
                pause: Duration::from_secs(pause),
            };
            let outcome = database::run(&env, &options).await?;
            print_key_value("Queries", &outcome.queries.to_string());
            print_key_value("Answer", &outcome.answer.join(", "));
            print_success("Report sent");
        }
        Commands::ResearchPrepare {
            correct,
            incorrect,
            output,
            limit,
        } => {
            print_header("s0402 Prepare");
            let options = research::PrepareOptions {
                correct,
                incorrect,
                output,
                limit,
            };
            let count = research::prepare(&options)?;
            print_success(&format!(
                "{} examples written to {}",
                count,
                options.output.display()
            ));
        }
        Commands::ResearchValidate { input, model } => {
            print_header("s0402 Validate");
            let accepted =
                research::validate(&env, &research::ValidateOptions { input, model }).await?;
            print_key_value("Accepted", &accepted.join(", "));
            print_success("Report sent");
        }
    }
    Ok(())
}
