use colored::Colorize;
use env_logger::Env;
use log::{error, info};
use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use libqbot::export::{ExportFormat, Exporter};
use libqbot::question::QuestionRecord;

/// Turn a JSON list of questions (as printed by `qbot saved --json`) into a PDF or text file.
#[derive(Parser, Debug)]
#[command(name = "Q-Bot Export")]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "info")]
    log_level: String,
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,
    #[arg(short, long, value_enum, default_value = "pdf")]
    format: ExportFormat,
    /// Lay the file out as a timed paper
    #[arg(long, value_name = "MINUTES")]
    paper_duration: Option<u32>,

    json: PathBuf,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str())).init();

    info!(
        "{}",
        format!("Reading {:?}, writing into {:?}", args.json, args.out_dir).cyan()
    );
    let json = match std::fs::read_to_string(&args.json) {
        Ok(j) => j,
        Err(e) => {
            error!("{}{}", "Unable to read file: ".red(), e);
            std::process::exit(1);
        }
    };
    let records: Vec<QuestionRecord> = match serde_json::from_str(json.as_str()) {
        Ok(r) => r,
        Err(error) => {
            error!("{}", format!("Malformed JSON: {}!", error).red());
            std::process::exit(1);
        }
    };

    let questions = keep_exportable(records);

    let exporter = match args.paper_duration {
        Some(minutes) => Exporter::paper(minutes),
        None => Exporter::default(),
    };
    match exporter.write(args.format, &questions, &args.out_dir) {
        Ok(path) => info!("{}", format!("Exported to {}", path.display()).green()),
        Err(e) => {
            error!("{}", e.to_string().red());
            std::process::exit(1);
        }
    }
}

/// Log every record grouped by subject and drop the ones without question text.
fn keep_exportable(records: Vec<QuestionRecord>) -> Vec<QuestionRecord> {
    let mut by_subject: BTreeMap<&str, usize> = BTreeMap::new();
    for record in &records {
        *by_subject.entry(record.subject.as_str()).or_default() += 1;
    }
    info!(
        "{}",
        format!(
            "Exporting {} questions ({} Subjects)",
            records.len(),
            by_subject.len()
        )
        .blue()
    );
    for (subject, count) in &by_subject {
        info!("{}", format!("├ Subject: {} ({} Questions)", subject, count).blue());
    }

    records
        .into_iter()
        .filter(|record| {
            if record.content.trim().is_empty() {
                error!(
                    "{} {}",
                    "│".blue(),
                    format!("├ ✘ Question: {:?} (Missing `question`)", record.id)
                        .red()
                        .strikethrough()
                );
                false
            } else {
                info!(
                    "{} {}",
                    "│".blue(),
                    format!("├ Question: {} [{}]", record.content, record.difficulty).green()
                );
                true
            }
        })
        .collect()
}
