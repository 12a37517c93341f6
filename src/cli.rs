use crate::{Commands, Error};
use colored::Colorize;
use libqbot::alert::Alert;
use libqbot::api::ApiClient;
use libqbot::export::{ExportFormat, Exporter};
use libqbot::generate::GeneratePage;
use libqbot::home::{HomePage, ABOUT, TAGLINE};
use libqbot::page::Page;
use libqbot::paper::{generate_paper, PaperConfig};
use libqbot::question::{Difficulty, QuestionRecord, QuestionType};
use libqbot::saved::SavedPage;
use log::debug;
use std::io::{self, Write};
use std::path::Path;
use text_io::read;

#[derive(Debug, PartialEq)]
pub(crate) enum Choice {
    Go(Page),
    Ask,
    Export,
    Quit,
    Unknown,
}

impl Choice {
    fn from_str(input: &str) -> Choice {
        match input.trim() {
            "q" => Choice::Quit,
            "e" => Choice::Export,
            "p" => Choice::Ask,
            path if path.starts_with('/') => Page::from_route(path).map_or(Choice::Unknown, Choice::Go),
            input => match input.parse::<usize>() {
                Ok(num) if (1..=Page::ALL.len()).contains(&num) => Choice::Go(Page::ALL[num - 1]),
                _ => Choice::Unknown,
            },
        }
    }
}

/// 1-based pick from `options`; anything else keeps `current`.
fn pick<T: Copy>(input: &str, options: &[T], current: T) -> T {
    match input.trim().parse::<usize>() {
        Ok(num) if num >= 1 && num <= options.len() => options[num - 1],
        _ => current,
    }
}

/// 1-based list number to index. `0` names no question.
fn list_index(number: usize) -> Result<usize, Alert> {
    number.checked_sub(1).ok_or(Alert::NoSuchQuestion(number))
}

fn parse_format(input: &str) -> ExportFormat {
    match input.trim().to_lowercase().as_str() {
        "t" | "txt" | "text" => ExportFormat::Text,
        _ => ExportFormat::Pdf,
    }
}

fn prompt(label: &str) -> String {
    print!("{} ", label.cyan());
    io::stdout().flush().ok();
    let line: String = read!("{}\n");
    line.trim().to_string()
}

fn alert(alert: &Alert) {
    println!("{}", alert.to_string().bright_red());
}

pub(crate) fn print_question(number: usize, q: &QuestionRecord) {
    let leading = format!("{}. ", number);
    let indent = " ".repeat(leading.len());
    println!("{}{}", leading.cyan(), q.content.bold());
    for option in &q.options {
        println!("{}{}", indent, option);
    }
    if let Some(answer) = &q.correct_answer {
        println!("{}{}", indent, format!("Answer: {}", answer).green());
    }
    let mut meta = format!(
        "{} • {} • {} / {} • {}",
        q.question_type, q.difficulty, q.subject, q.topic, q.timestamp
    );
    if !q.id.is_empty() {
        meta.push_str(&format!(" • id {}", q.id));
    }
    if q.saved {
        meta.push_str(" • saved");
    }
    println!("{}{}", indent, meta.dimmed());
}

fn print_list(questions: &[&QuestionRecord]) {
    if questions.is_empty() {
        println!("{}", "No questions yet.".yellow());
    }
    for (idx, q) in questions.iter().enumerate() {
        print_question(idx + 1, q);
    }
}

/// One-shot subcommands.
pub(crate) fn run_command(client: &ApiClient, command: Commands, out_dir: &Path) -> Result<(), Error> {
    debug!("[Setup] Running {:?}", command);
    match command {
        Commands::Generate { form, save, export } => {
            let mut page = GeneratePage::new();
            page.form = form.into();
            let appended = page.submit(client)?;
            println!("{}", format!("Generated {} questions.", appended).bright_green());
            print_list(&page.questions.iter().collect::<Vec<_>>());
            if save {
                for idx in 0..page.questions.len() {
                    page.save(client, idx)?;
                }
                println!("{}", "Saved all questions.".bright_green());
            }
            if let Some(format) = export {
                let path = Exporter::default().write(format, &page.questions, out_dir)?;
                println!("{}", format!("Exported to {}", path.display()).bright_green());
            }
        }
        Commands::Saved { search, json } => {
            let mut page = SavedPage::new();
            page.refresh(client);
            page.search = search;
            if json {
                println!("{}", serde_json::to_string_pretty(&page.visible())?);
            } else {
                print_list(&page.visible());
            }
        }
        Commands::Delete { id } => {
            SavedPage::new().delete(client, &id)?;
            println!("{}", format!("Deleted {}.", id).bright_green());
        }
        Commands::Stats => {
            let mut home = HomePage::default();
            home.refresh(client);
            println!("{}", home.headline().cyan());
        }
        Commands::Export { format, search } => {
            let mut page = SavedPage::new();
            page.refresh(client);
            page.search = search;
            let questions: Vec<QuestionRecord> = page.visible().into_iter().cloned().collect();
            let path = Exporter::default().write(format, &questions, out_dir)?;
            println!("{}", format!("Exported to {}", path.display()).bright_green());
        }
        Commands::Paper {
            form,
            count,
            duration,
            format,
        } => {
            let config = PaperConfig {
                question_count: count,
                duration_minutes: duration,
            };
            let paper = generate_paper(client, &form.into(), &config)?;
            let path = Exporter::paper(paper.duration_minutes).write(format, &paper.questions, out_dir)?;
            println!(
                "{}",
                format!(
                    "Paper with {} questions exported to {}",
                    paper.questions.len(),
                    path.display()
                )
                .bright_green()
            );
        }
        Commands::Health => match client.health() {
            Some(health) => println!(
                "{}",
                format!(
                    "Backend {}: {} (API key loaded: {})",
                    client.base_url(),
                    health.status,
                    health.api_key_loaded
                )
                .bright_green()
            ),
            None => println!(
                "{}",
                format!("Backend {} is unreachable.", client.base_url()).bright_red()
            ),
        },
        // dispatched in main
        Commands::Shell => {}
        #[cfg(feature = "gui")]
        Commands::Gui => {}
    }
    Ok(())
}

struct Shell<'a> {
    client: &'a ApiClient,
    out_dir: &'a Path,
    page: Page,
    home: HomePage,
    generate: GeneratePage,
    saved: SavedPage,
    paper: PaperConfig,
}

impl Shell<'_> {
    fn show(&mut self) {
        println!(
            "{}",
            format!("==========> {} <==========", self.page.label()).cyan()
        );
        match self.page {
            Page::Home => self.home_page(),
            Page::Generate => self.generate_page(),
            Page::Saved => self.saved_page(),
            Page::Paper => self.paper_page(),
            Page::About => println!("{}", ABOUT),
        }
    }

    fn home_page(&mut self) {
        println!("{}", "Welcome to Q-Bot".bold());
        println!("{}", TAGLINE);
        self.home.refresh(self.client);
        println!("{}", self.home.headline().bright_green());
    }

    fn generate_page(&mut self) {
        let form = &mut self.generate.form;
        form.subject = prompt(&format!("Subject [{}]:", form.subject)).or_keep(&form.subject);
        form.topic = prompt(&format!("Topic [{}]:", form.topic)).or_keep(&form.topic);
        println!("{}", menu(&QuestionType::ALL.map(|t| t.label())));
        form.question_type = pick(
            &prompt(&format!("Question type [{}]:", form.question_type)),
            &QuestionType::ALL,
            form.question_type,
        );
        println!("{}", menu(&Difficulty::ALL.map(|d| d.label())));
        form.difficulty = pick(
            &prompt(&format!("Difficulty [{}]:", form.difficulty)),
            &Difficulty::ALL,
            form.difficulty,
        );
        form.custom_prompt = prompt("Custom prompt (optional):");

        let before = self.generate.questions.len();
        match self.generate.submit(self.client) {
            Ok(appended) => {
                println!("{}", format!("Generated {} questions.", appended).bright_green());
                for (idx, q) in self.generate.questions.iter().enumerate().skip(before) {
                    print_question(idx + 1, q);
                }
            }
            Err(err) => alert(&err),
        }

        let to_save = prompt("Save question number (empty to skip):");
        if let Ok(num) = to_save.parse::<usize>() {
            let saved = list_index(num).and_then(|idx| self.generate.save(self.client, idx));
            match saved {
                Ok(()) => println!("{}", "Saved!".bright_green()),
                Err(err) => alert(&err),
            }
        }
    }

    fn saved_page(&mut self) {
        self.saved.refresh(self.client);
        self.saved.search = prompt("Search saved questions (empty for all):");
        print_list(&self.saved.visible());

        let id = prompt("Delete question id (empty to skip):");
        if !id.is_empty() {
            match self.saved.delete(self.client, &id) {
                Ok(()) => println!("{}", format!("Deleted {}.", id).bright_green()),
                Err(err) => alert(&err),
            }
        }
    }

    fn paper_page(&mut self) {
        if let Ok(count) = prompt(&format!("Number of questions [{}]:", self.paper.question_count)).parse() {
            self.paper.question_count = count;
        }
        if let Ok(duration) =
            prompt(&format!("Time duration in minutes [{}]:", self.paper.duration_minutes)).parse()
        {
            self.paper.duration_minutes = duration;
        }
        let format = parse_format(&prompt("Format (pdf/text) [pdf]:"));

        println!("{}", "Generating full paper...".cyan());
        let paper = match generate_paper(self.client, &self.generate.form, &self.paper) {
            Ok(paper) => paper,
            Err(err) => {
                alert(&err);
                if err == Alert::MissingInput {
                    println!("{}", "Fill in the Generate page first.".yellow());
                }
                return;
            }
        };
        match Exporter::paper(paper.duration_minutes).write(format, &paper.questions, self.out_dir) {
            Ok(path) => println!("{}", format!("Paper exported to {}", path.display()).bright_green()),
            Err(err) => println!("{}", err.to_string().bright_red()),
        }
    }

    /// Generate from a bare prompt without touching the form.
    fn ask(&mut self) {
        let text = prompt("Prompt:");
        let before = self.generate.questions.len();
        match self.generate.submit_prompt(self.client, &text) {
            None => println!("{}", "Nothing asked.".yellow()),
            Some(Ok(_)) => {
                for (idx, q) in self.generate.questions.iter().enumerate().skip(before) {
                    print_question(idx + 1, q);
                }
            }
            Some(Err(err)) => alert(&err),
        }
    }

    fn export(&self) {
        let format = parse_format(&prompt("Export as (pdf/text) [pdf]:"));
        let questions: Vec<QuestionRecord> = match self.page {
            Page::Saved => self.saved.visible().into_iter().cloned().collect(),
            _ => self.generate.questions.clone(),
        };
        match Exporter::default().write(format, &questions, self.out_dir) {
            Ok(path) => println!("{}", format!("Exported to {}", path.display()).bright_green()),
            Err(err) => println!("{}", err.to_string().bright_red()),
        }
    }
}

trait OrKeep {
    fn or_keep(self, current: &str) -> String;
}

impl OrKeep for String {
    fn or_keep(self, current: &str) -> String {
        if self.is_empty() {
            current.to_string()
        } else {
            self
        }
    }
}

fn menu(labels: &[&str]) -> String {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| format!("{}. {}", i + 1, label))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Page-switching terminal session.
pub(crate) fn shell_loop(client: &ApiClient, out_dir: &Path) -> Result<(), Error> {
    let mut shell = Shell {
        client,
        out_dir,
        page: Page::Home,
        home: HomePage::default(),
        generate: GeneratePage::new(),
        saved: SavedPage::new(),
        paper: PaperConfig::default(),
    };
    shell.show();

    loop {
        let nav = menu(&Page::ALL.map(|p| p.label()));
        let choice = Choice::from_str(&prompt(&format!("{}  p. Prompt  e. Export  q. Quit >", nav)));
        debug!("choice: {:?}", choice);
        match choice {
            Choice::Go(page) => {
                shell.page = page;
                shell.show();
            }
            Choice::Ask => shell.ask(),
            Choice::Export => shell.export(),
            Choice::Quit => {
                println!("{}", "Bye!".cyan());
                return Ok(());
            }
            Choice::Unknown => println!("{}", "Pick a page number or path, p, e or q.".yellow()),
        }
    }
}
