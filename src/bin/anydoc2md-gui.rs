//! Desktop front-end for anydoc2md.
//!
//! A single window: drop a file (or browse for one), press
//! "Convert to Markdown", and the result is written next to the source.
//! Conversions run on Tokio's blocking pool; the window polls for the result
//! each frame so it never freezes.

use anydoc2md::desktop::{containing_folder, DesktopState, Dialog, FilePicker};
use anydoc2md::{ConversionConfig, ConversionOutcome, ConversionWorkflow, WorkflowError};
use anyhow::{Context, Result};
use eframe::egui;
use std::path::{Path, PathBuf};
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

type RunResult = std::result::Result<ConversionOutcome, WorkflowError>;

struct App {
    state: DesktopState,
    workflow: ConversionWorkflow,
    runtime: tokio::runtime::Handle,
    pending: Option<oneshot::Receiver<RunResult>>,
    picker: Option<FilePicker>,
    /// Last failure of "Open File" / "Open Folder".
    open_error: Option<String>,
}

impl App {
    fn new(
        cc: &eframe::CreationContext<'_>,
        workflow: ConversionWorkflow,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        Self {
            state: DesktopState::new(),
            workflow,
            runtime,
            pending: None,
            picker: None,
            open_error: None,
        }
    }

    fn start_conversion(&mut self, ctx: &egui::Context) {
        let Some(request) = self.state.begin_conversion() else {
            return;
        };
        info!("Converting {}", request.source_path());

        let (tx, rx) = oneshot::channel();
        let workflow = self.workflow.clone();
        let repaint = ctx.clone();
        self.runtime.spawn(async move {
            let result = workflow.run_async(request).await;
            let _ = tx.send(result);
            repaint.request_repaint();
        });
        self.pending = Some(rx);
    }

    fn poll_conversion(&mut self) {
        let Some(rx) = self.pending.as_mut() else {
            return;
        };
        match rx.try_recv() {
            Ok(result) => {
                self.pending = None;
                self.open_error = None;
                self.state.finish_conversion(result);
            }
            Err(oneshot::error::TryRecvError::Empty) => {}
            Err(oneshot::error::TryRecvError::Closed) => {
                warn!("Conversion task ended without a result");
                self.pending = None;
                self.state.finish_conversion(Err(WorkflowError::Conversion(
                    anydoc2md::ConversionError::new(
                        self.state.selected().map(Path::to_path_buf).unwrap_or_default(),
                        anydoc2md::ExtractError::Delegate(
                            "conversion task ended unexpectedly".into(),
                        ),
                    ),
                )));
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if !dropped.is_empty() {
            self.state.select_dropped(&dropped);
        }
    }

    fn open_with_system(&mut self, path: &Path) {
        if let Err(e) = open::that(path) {
            warn!("Failed to open {}: {}", path.display(), e);
            self.open_error = Some(format!("Could not open {}: {e}", path.display()));
        }
    }

    fn drop_area(&mut self, ui: &mut egui::Ui) {
        let hovering = ui.ctx().input(|i| !i.raw.hovered_files.is_empty());
        let stroke_color = if hovering {
            egui::Color32::from_rgb(0x15, 0x65, 0xc0)
        } else {
            egui::Color32::from_gray(0x66)
        };

        egui::Frame::new()
            .fill(egui::Color32::from_gray(0x2b))
            .stroke(egui::Stroke::new(2.0, stroke_color))
            .corner_radius(6.0)
            .inner_margin(20.0)
            .show(ui, |ui| {
                ui.set_min_height(160.0);
                ui.vertical_centered(|ui| {
                    ui.add_space(30.0);
                    ui.label("Drop File Here\nor");
                    ui.add_space(8.0);
                    if ui
                        .add_enabled(!self.state.is_busy(), egui::Button::new("Browse File"))
                        .clicked()
                    {
                        self.picker = Some(FilePicker::in_current_dir());
                    }
                });
            });
    }

    fn picker_window(&mut self, ctx: &egui::Context) {
        let Some(picker) = self.picker.as_mut() else {
            return;
        };
        let mut open = true;
        let mut chosen: Option<PathBuf> = None;

        egui::Window::new("Select File to Convert")
            .open(&mut open)
            .default_size([480.0, 360.0])
            .collapsible(false)
            .show(ctx, |ui| {
                ui.label(picker.current_dir.display().to_string());
                let mut show_all = picker.show_all;
                if ui.checkbox(&mut show_all, "Show all files").changed() {
                    picker.set_show_all(show_all);
                }
                ui.separator();

                let mut activated = None;
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for entry in &picker.entries {
                        let label = if entry.is_dir {
                            format!("📁 {}", entry.name)
                        } else {
                            entry.name.clone()
                        };
                        if ui.selectable_label(false, label).clicked() {
                            activated = Some(entry.clone());
                        }
                    }
                });
                if let Some(entry) = activated {
                    chosen = picker.activate(&entry);
                }
            });

        if let Some(path) = chosen {
            self.state.select(path);
            self.picker = None;
        } else if !open {
            self.picker = None;
        }
    }

    fn dialog_window(&mut self, ctx: &egui::Context) {
        let Some(dialog) = self.state.dialog().cloned() else {
            return;
        };
        let mut close = false;

        egui::Window::new(dialog.title())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(dialog.text());
                });
                if let Some(err) = &self.open_error {
                    ui.colored_label(egui::Color32::LIGHT_RED, err);
                }
                ui.add_space(8.0);
                ui.horizontal(|ui| match &dialog {
                    Dialog::Success { output_path } => {
                        if ui.button("Open File").clicked() {
                            let path = output_path.clone();
                            self.open_with_system(&path);
                        }
                        if ui.button("Open Folder").clicked() {
                            let folder = containing_folder(output_path);
                            self.open_with_system(&folder);
                        }
                        if ui.button("Close").clicked() {
                            close = true;
                        }
                    }
                    Dialog::Error { .. } => {
                        if ui.button("OK").clicked() {
                            close = true;
                        }
                    }
                });
            });

        if close {
            self.open_error = None;
            self.state.dismiss_dialog();
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_conversion();
        self.handle_dropped_files(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.drop_area(ui);
            ui.add_space(12.0);

            ui.vertical_centered(|ui| {
                ui.label(self.state.selection_label());
                ui.add_space(8.0);

                let convert = ui.add_enabled(
                    self.state.can_convert(),
                    egui::Button::new("Convert to Markdown").min_size(egui::vec2(180.0, 32.0)),
                );
                if convert.clicked() {
                    self.start_conversion(ctx);
                }
                if self.state.is_busy() {
                    ui.add_space(4.0);
                    ui.spinner();
                }

                ui.add_space(16.0);
                ui.label("Supported Formats:\n• PDF, PowerPoint, Word, Excel\n• HTML, JSON, XML, TXT");
            });
        });

        self.picker_window(ctx);
        self.dialog_window(ctx);

        if self.pending.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut builder = ConversionConfig::builder();
    if let Ok(lib) = std::env::var("PDFIUM_LIB_PATH") {
        builder = builder.pdfium_library_path(lib);
    }
    let config = builder.build().context("Invalid configuration")?;
    let workflow = ConversionWorkflow::new(&config);

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let handle = runtime.handle().clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("AnyDoc to Markdown Converter")
            .with_inner_size([600.0, 460.0])
            .with_min_inner_size([600.0, 400.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "AnyDoc to Markdown Converter",
        options,
        Box::new(move |cc| Ok(Box::new(App::new(cc, workflow, handle)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI failed: {e}"))
}
