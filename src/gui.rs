use crate::Error;
use eframe::egui;
use eframe::egui::{Align2, Button, Color32, ComboBox, DragValue, RichText, ScrollArea, Ui};
use libqbot::alert::Alert;
use libqbot::api::{ApiClient, QuestionBackend};
use libqbot::export::{ExportFormat, Exporter};
use libqbot::generate::GeneratePage;
use libqbot::home::{HomePage, ABOUT, TAGLINE};
use libqbot::page::Page;
use libqbot::paper::{generate_paper, Paper, PaperConfig, DURATION_MINUTES, QUESTION_COUNT};
use libqbot::question::{
    Difficulty, GenerateResponse, GenerationRequest, QuestionRecord, QuestionType,
};
use libqbot::saved::SavedPage;
use log::debug;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;

struct PendingGenerate {
    request: GenerationRequest,
    rx: Receiver<Option<GenerateResponse>>,
}

struct GuiState {
    client: ApiClient,
    out_dir: PathBuf,
    page: Page,

    home: HomePage,
    generate: GeneratePage,
    saved: SavedPage,
    paper: PaperConfig,
    last_paper: Option<Paper>,

    pending_generate: Option<PendingGenerate>,
    pending_paper: Option<Receiver<Result<Paper, Alert>>>,
    alert: Option<String>,
    notice: Option<String>,
}

impl GuiState {
    fn new(client: ApiClient, out_dir: PathBuf) -> Self {
        let mut home = HomePage::default();
        home.refresh(&client);

        Self {
            client,
            out_dir,
            page: Page::Home,

            home,
            generate: GeneratePage::new(),
            saved: SavedPage::new(),
            paper: PaperConfig::default(),
            last_paper: None,

            pending_generate: None,
            pending_paper: None,
            alert: None,
            notice: None,
        }
    }

    fn go(&mut self, page: Page) {
        debug!("[GUI] {} -> {}", self.page, page);
        self.page = page;
        match page {
            Page::Home => self.home.refresh(&self.client),
            Page::Saved => {
                self.saved.refresh(&self.client);
            }
            _ => {}
        }
    }

    fn start_generation(&mut self, ctx: &egui::Context) {
        let request = match self.generate.begin_submit() {
            Ok(request) => request,
            Err(alert) => {
                self.alert = Some(alert.to_string());
                return;
            }
        };
        let (tx, rx) = channel();
        let client = self.client.clone();
        let worker_request = request.clone();
        let ctx = ctx.clone();
        thread::spawn(move || {
            let response = client.generate_question(&worker_request);
            tx.send(response).ok();
            ctx.request_repaint();
        });
        self.pending_generate = Some(PendingGenerate { request, rx });
    }

    fn start_paper(&mut self, ctx: &egui::Context) {
        let (tx, rx) = channel();
        let client = self.client.clone();
        let request = self.generate.form.clone();
        let config = self.paper;
        let ctx = ctx.clone();
        thread::spawn(move || {
            tx.send(generate_paper(&client, &request, &config)).ok();
            ctx.request_repaint();
        });
        self.pending_paper = Some(rx);
    }

    fn poll_workers(&mut self) {
        if let Some(pending) = &self.pending_generate {
            let response = match pending.rx.try_recv() {
                Ok(response) => Some(response),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => Some(None),
            };
            if let Some(response) = response {
                let request = pending.request.clone();
                self.pending_generate = None;
                match self.generate.finish_submit(&request, response) {
                    Ok(appended) => self.notice = Some(format!("Generated {} questions.", appended)),
                    Err(alert) => self.alert = Some(alert.to_string()),
                }
            }
        }

        if let Some(rx) = &self.pending_paper {
            let result = match rx.try_recv() {
                Ok(result) => Some(result),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => Some(Err(Alert::InvalidResponse)),
            };
            if let Some(result) = result {
                self.pending_paper = None;
                match result {
                    Ok(paper) => {
                        self.notice = Some(format!(
                            "Paper ready with {} questions.",
                            paper.questions.len()
                        ));
                        self.last_paper = Some(paper);
                    }
                    Err(alert) => self.alert = Some(alert.to_string()),
                }
            }
        }
    }

    fn export(&mut self, format: ExportFormat) {
        let questions: Vec<QuestionRecord> = match self.page {
            Page::Saved => self.saved.visible().into_iter().cloned().collect(),
            _ => self.generate.questions.clone(),
        };
        self.write_export(&Exporter::default(), format, &questions);
    }

    fn write_export(&mut self, exporter: &Exporter, format: ExportFormat, questions: &[QuestionRecord]) {
        match exporter.write(format, questions, &self.out_dir) {
            Ok(path) => self.notice = Some(format!("Exported to {}", path.display())),
            Err(err) => self.alert = Some(err.to_string()),
        }
    }

    fn draw_nav(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading(RichText::new("Q-Bot").color(Color32::from_rgb(0x60, 0xA5, 0xFA)));
            ui.separator();
            for page in Page::ALL {
                if ui.selectable_label(self.page == page, page.label()).clicked() {
                    self.go(page);
                }
            }
            ui.separator();
            ui.menu_button("Export", |ui| {
                if ui.button("Export as PDF").clicked() {
                    self.export(ExportFormat::Pdf);
                    ui.close_menu();
                }
                if ui.button("Export as Text").clicked() {
                    self.export(ExportFormat::Text);
                    ui.close_menu();
                }
            });
        });
    }

    fn draw_home(&mut self, ui: &mut Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading(RichText::new("Welcome to Q-Bot").size(36.0));
            ui.label(TAGLINE);
            ui.add_space(20.0);
            ui.label(RichText::new(self.home.headline()).size(20.0).strong());
            ui.add_space(20.0);
            if ui.button("Start Generating Questions").clicked() {
                self.go(Page::Generate);
            }
        });
    }

    fn draw_form(&mut self, ui: &mut Ui) {
        let form = &mut self.generate.form;
        egui::Grid::new("generate_form")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("Subject");
                ui.text_edit_singleline(&mut form.subject);
                ui.end_row();

                ui.label("Topic");
                ui.text_edit_singleline(&mut form.topic);
                ui.end_row();

                ui.label("Question Type");
                ComboBox::from_id_salt("question_type")
                    .selected_text(form.question_type.label())
                    .show_ui(ui, |ui| {
                        for kind in QuestionType::ALL {
                            ui.selectable_value(&mut form.question_type, kind, kind.label());
                        }
                    });
                ui.end_row();

                ui.label("Difficulty Level");
                ComboBox::from_id_salt("difficulty")
                    .selected_text(form.difficulty.label())
                    .show_ui(ui, |ui| {
                        for level in Difficulty::ALL {
                            ui.selectable_value(&mut form.difficulty, level, level.label());
                        }
                    });
                ui.end_row();
            });
        ui.label("Custom Prompt (Optional)");
        ui.text_edit_multiline(&mut form.custom_prompt);
    }

    fn draw_generate(&mut self, ui: &mut Ui, ctx: &egui::Context) {
        ui.heading("Generate Questions");
        self.draw_form(ui);

        let submitting = self.generate.is_submitting();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!submitting, Button::new("Generate Question"))
                .clicked()
            {
                self.start_generation(ctx);
            }
            if ui.button("Load saved").clicked() {
                self.generate.load_saved(&self.client);
            }
            if submitting {
                ui.spinner();
                ui.label("Generating...");
            }
        });

        ui.separator();
        ui.heading("Generated Questions");
        if self.generate.questions.is_empty() {
            ui.label("No questions generated yet.");
            if let Some(preview) = &self.generate.preview {
                ui.label(format!("Generated Question: {}", preview));
            }
            return;
        }

        let mut save_clicked = None;
        ScrollArea::vertical().show(ui, |ui| {
            for (idx, q) in self.generate.questions.iter().enumerate() {
                if draw_question(ui, idx + 1, q, !q.saved, "Save") {
                    save_clicked = Some(idx);
                }
            }
        });
        if let Some(idx) = save_clicked {
            if let Err(alert) = self.generate.save(&self.client, idx) {
                self.alert = Some(alert.to_string());
            }
        }
    }

    fn draw_saved(&mut self, ui: &mut Ui) {
        ui.heading("Saved Questions");
        ui.horizontal(|ui| {
            ui.label("Search");
            ui.text_edit_singleline(&mut self.saved.search);
            if ui.button("Refresh").clicked() {
                self.saved.refresh(&self.client);
            }
        });
        ui.separator();

        let visible = self.saved.visible();
        if visible.is_empty() {
            ui.label("No saved questions available.");
            return;
        }
        let mut delete_id = None;
        ScrollArea::vertical().show(ui, |ui| {
            for (idx, q) in visible.iter().enumerate() {
                if draw_question(ui, idx + 1, q, true, "Delete") {
                    delete_id = Some(q.id.clone());
                }
            }
        });
        if let Some(id) = delete_id {
            if let Err(alert) = self.saved.delete(&self.client, &id) {
                self.alert = Some(alert.to_string());
            }
        }
    }

    fn draw_paper(&mut self, ui: &mut Ui, ctx: &egui::Context) {
        ui.heading("Generate Full Paper");
        ui.label("Questions are drawn from the form on the Generate page.");
        egui::Grid::new("paper_form").num_columns(2).show(ui, |ui| {
            ui.label("Number of Questions");
            ui.add(DragValue::new(&mut self.paper.question_count).range(QUESTION_COUNT));
            ui.end_row();
            ui.label("Time Duration (minutes)");
            ui.add(DragValue::new(&mut self.paper.duration_minutes).range(DURATION_MINUTES));
            ui.end_row();
        });

        let running = self.pending_paper.is_some();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!running, Button::new("Generate Full Paper"))
                .clicked()
            {
                self.start_paper(ctx);
            }
            if running {
                ui.spinner();
            }
        });

        let Some(paper) = self.last_paper.clone() else {
            return;
        };
        ui.separator();
        ui.label(format!(
            "{} questions, {} minutes",
            paper.questions.len(),
            paper.duration_minutes
        ));
        let exporter = Exporter::paper(paper.duration_minutes);
        ui.horizontal(|ui| {
            if ui.button("Export paper as PDF").clicked() {
                self.write_export(&exporter, ExportFormat::Pdf, &paper.questions);
            }
            if ui.button("Export paper as Text").clicked() {
                self.write_export(&exporter, ExportFormat::Text, &paper.questions);
            }
        });
        ScrollArea::vertical().show(ui, |ui| {
            for (idx, q) in paper.questions.iter().enumerate() {
                draw_question(ui, idx + 1, q, false, "");
            }
        });
    }

    fn draw_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.alert.clone() else {
            return;
        };
        egui::Window::new("Q-Bot")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    self.alert = None;
                }
            });
    }
}

/// Draw one question card. Returns true when its action button was clicked.
fn draw_question(ui: &mut Ui, number: usize, q: &QuestionRecord, action: bool, label: &str) -> bool {
    let mut clicked = false;
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(format!(
                    "{} Question • {} • {} / {}",
                    q.question_type.to_uppercase(),
                    q.difficulty,
                    q.subject,
                    q.topic
                ))
                .weak(),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(RichText::new(&q.timestamp).weak());
            });
        });
        ui.label(RichText::new(format!("{}. {}", number, q.content)).strong());
        if q.options.is_empty() {
            ui.label(RichText::new("No options available").weak());
        }
        for option in &q.options {
            ui.label(format!("    {}", option));
        }
        if let Some(answer) = &q.correct_answer {
            ui.colored_label(Color32::LIGHT_GREEN, format!("Answer: {}", answer));
        }
        if action && ui.button(label).clicked() {
            clicked = true;
        }
        if q.saved {
            ui.label(RichText::new("Saved").italics());
        }
    });
    clicked
}

impl eframe::App for GuiState {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_workers();

        egui::TopBottomPanel::top("navigation").show(ctx, |ui| {
            self.draw_nav(ui);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            let text = self
                .notice
                .clone()
                .unwrap_or_else(|| format!("Backend: {}", self.client.base_url()));
            ui.label(RichText::new(text).weak());
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.page {
            Page::Home => self.draw_home(ui),
            Page::Generate => self.draw_generate(ui, ctx),
            Page::Saved => self.draw_saved(ui),
            Page::Paper => self.draw_paper(ui, ctx),
            Page::About => {
                ui.heading("About Q-Bot");
                ui.label(ABOUT);
            }
        });

        self.draw_alert(ctx);
    }
}

pub fn init_gui(client: ApiClient, out_dir: PathBuf) -> Result<(), Error> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Q-Bot",
        native_options,
        Box::new(move |_cc| Ok(Box::new(GuiState::new(client, out_dir)))),
    )?;

    Ok(())
}
