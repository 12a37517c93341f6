use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;
use libqbot::alert::Alert;
use libqbot::api::{ApiClient, ApiError, DEFAULT_BASE_URL};
use libqbot::export::{ExportError, ExportFormat};
use libqbot::question::{Difficulty, GenerationRequest, QuestionType};
use log::debug;
use std::path::PathBuf;
use thiserror::Error;

mod cli;
#[cfg(feature = "gui")]
mod gui;

#[derive(Parser, Debug)]
#[command(name = "Q-Bot")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(long, global = true, env = "QBOT_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,
    #[arg(short, long, global = true, default_value = "error")]
    log_level: String,
    #[arg(short, long, global = true, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Generate questions from a subject and topic, or from a custom prompt
    Generate {
        #[command(flatten)]
        form: FormArgs,
        /// Save every generated question on the backend
        #[arg(long)]
        save: bool,
        /// Also export the generated questions
        #[arg(long, value_enum)]
        export: Option<ExportFormat>,
    },
    /// List saved questions
    Saved {
        #[arg(short, long, default_value = "")]
        search: String,
        /// Print the records as JSON (readable by qbot-export)
        #[arg(long)]
        json: bool,
    },
    /// Delete a saved question
    Delete { id: String },
    /// Show how many questions have been generated
    Stats,
    /// Export saved questions to a file
    Export {
        #[arg(short, long, value_enum, default_value = "pdf")]
        format: ExportFormat,
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Generate and export a full question paper
    Paper {
        #[command(flatten)]
        form: FormArgs,
        #[arg(short = 'n', long, default_value_t = 10)]
        count: u32,
        /// Time allowed, in minutes
        #[arg(long, default_value_t = 60)]
        duration: u32,
        #[arg(short, long, value_enum, default_value = "pdf")]
        format: ExportFormat,
    },
    /// Check that the backend is up
    Health,
    /// Interactive terminal session
    Shell,
    /// Desktop window
    #[cfg(feature = "gui")]
    Gui,
}

#[derive(clap::Args, Debug, Clone)]
pub(crate) struct FormArgs {
    #[arg(short, long, default_value = "")]
    subject: String,
    #[arg(short, long, default_value = "")]
    topic: String,
    #[arg(short, long, value_enum, default_value = "easy")]
    difficulty: Difficulty,
    #[arg(long = "type", value_enum, default_value = "mcq")]
    question_type: QuestionType,
    /// Free-form prompt; overrides subject and topic
    #[arg(short, long)]
    prompt: Option<String>,
}

impl From<FormArgs> for GenerationRequest {
    fn from(form: FormArgs) -> Self {
        GenerationRequest {
            subject: form.subject,
            topic: form.topic,
            difficulty: form.difficulty,
            question_type: form.question_type,
            custom_prompt: form.prompt.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("cannot set up the API client: {0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Alert(#[from] Alert),
    #[error("{0}")]
    Export(#[from] ExportError),
    #[error("cannot serialize questions: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot read input: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "gui")]
    #[error("window closed with an error: {0}")]
    Gui(#[from] eframe::Error),
}

fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str())).init();

    if let Err(err) = run(args) {
        eprintln!("{}", err.to_string().bright_red());
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Error> {
    let client = ApiClient::new(&args.api_url)?;
    debug!("[Setup] Backend at {}", client.base_url());

    match args.command {
        None => default_frontend(client, args.out_dir),
        Some(Commands::Shell) => cli::shell_loop(&client, &args.out_dir),
        #[cfg(feature = "gui")]
        Some(Commands::Gui) => gui::init_gui(client, args.out_dir),
        Some(command) => cli::run_command(&client, command, &args.out_dir),
    }
}

fn default_frontend(client: ApiClient, out_dir: PathBuf) -> Result<(), Error> {
    cfg_if::cfg_if! {
        if #[cfg(all(feature = "gui", not(feature = "cli")))] {
            gui::init_gui(client, out_dir)
        } else {
            cli::shell_loop(&client, &out_dir)
        }
    }
}
