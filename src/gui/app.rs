// Desktop window: input box, batch controls, progress, results table.
//
// All pipeline work happens in a QuerySession worker thread; this side only
// polls the event channel once per frame and renders whatever has arrived.
use crate::batch::{BatchEvent, QuerySession};
use crate::config::AppConfig;
use crate::export::export_records;
use crate::model::PhoneRecord;
use crate::parser::Ip138Parser;
use crate::phones::validate_phone_list;
use crate::scraper::PhoneFetcher;

use eframe::egui;
use egui_extras::{Column, TableBuilder};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const RESULT_COLUMNS: [&str; 6] = ["手机号", "归属地", "运营商", "区号", "邮编", "状态"];

pub fn run(config: AppConfig) -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "手机号归属地批量查询工具",
        options,
        Box::new(|cc| {
            install_cjk_font(&cc.egui_ctx);
            Ok(Box::new(App::new(config)))
        }),
    )
}

/// The default egui fonts carry no CJK glyphs, so pull a system font in.
/// Missing fonts are only logged; the window still opens.
fn install_cjk_font(ctx: &egui::Context) {
    const CANDIDATES: &[&str] = &[
        "C:/Windows/Fonts/msyh.ttc",
        "C:/Windows/Fonts/simhei.ttf",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
        "/System/Library/Fonts/PingFang.ttc",
    ];

    for path in CANDIDATES {
        let Ok(bytes) = std::fs::read(path) else {
            continue;
        };
        let mut fonts = egui::FontDefinitions::default();
        fonts
            .font_data
            .insert("cjk".to_owned(), Arc::new(egui::FontData::from_owned(bytes)));
        for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
            fonts
                .families
                .entry(family)
                .or_default()
                .push("cjk".to_owned());
        }
        ctx.set_fonts(fonts);
        info!("loaded CJK font from {}", path);
        return;
    }

    warn!("no CJK font found on this system, UI text may not render");
}

pub struct App {
    config: AppConfig,

    input_text: String,
    import_path: String,
    export_path: String,

    // Read-only once a run starts; also used to show which number is next.
    phone_list: Vec<String>,
    records: Vec<PhoneRecord>,

    session: Option<QuerySession>,
    progress: f32,
    status: String,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            input_text: String::new(),
            import_path: String::new(),
            export_path: "results.csv".to_string(),
            phone_list: Vec::new(),
            records: Vec::new(),
            session: None,
            progress: 0.0,
            status: "准备就绪，请输入手机号".to_string(),
        }
    }

    fn poll_session(&mut self) {
        let mut events = Vec::new();
        match &self.session {
            Some(session) => {
                while let Some(event) = session.try_next() {
                    events.push(event);
                }
            }
            None => return,
        }

        for event in events {
            match event {
                BatchEvent::Record(record) => {
                    self.records.push(record);

                    let total = self.phone_list.len();
                    let done = self.records.len();
                    if total > 0 {
                        self.progress = done as f32 / total as f32;
                    }
                    // A stopped session still delivers its in-flight record,
                    // but there is no "next" item to announce.
                    let stopped = self.session.as_ref().is_some_and(|s| s.is_stopped());
                    if !stopped && done < total {
                        self.status = format!(
                            "正在查询 ({}/{}): {}",
                            done + 1,
                            total,
                            self.phone_list[done]
                        );
                    }
                }
                BatchEvent::Finished(summary) => {
                    self.session = None;
                    self.progress = 1.0;
                    self.status = format!(
                        "查询完成! 成功: {}/{}",
                        summary.succeeded, summary.total
                    );
                    info!(
                        "batch finished: {}/{} succeeded, {} attempted",
                        summary.succeeded, summary.total, summary.attempted
                    );
                }
            }
        }
    }

    fn import_phones(&mut self) {
        let path = self.import_path.trim();
        if path.is_empty() {
            self.status = "请输入要导入的文件路径 (.txt / .csv)".to_string();
            return;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => {
                self.input_text = content;
                self.status = format!("已导入文件: {}", path);
            }
            Err(e) => {
                warn!("import failed for {}: {}", path, e);
                self.status = format!("导入文件失败: {}", e);
            }
        }
    }

    fn clear_input(&mut self) {
        self.input_text.clear();
    }

    fn start_query(&mut self) {
        if self.session.is_some() {
            self.status = "查询正在进行中".to_string();
            return;
        }

        let phones = validate_phone_list(&self.input_text);
        if phones.is_empty() {
            self.status = "未找到有效的手机号".to_string();
            return;
        }

        self.records.clear();
        self.progress = 0.0;
        self.phone_list = phones.clone();

        let fetcher = PhoneFetcher::new(&self.config);
        let delay = Duration::from_millis(self.config.request_delay_ms);
        info!("starting batch of {} queries", phones.len());
        self.status = format!("正在查询 (1/{}): {}", phones.len(), phones[0]);
        self.session = Some(QuerySession::spawn(
            fetcher,
            Ip138Parser::new(),
            phones,
            delay,
        ));
    }

    fn stop_query(&mut self) {
        if let Some(session) = &self.session {
            session.stop();
            self.status = "查询已停止".to_string();
        }
    }

    fn export_results(&mut self) {
        if self.records.is_empty() {
            self.status = "没有可导出的结果".to_string();
            return;
        }

        let path = self.export_path.trim();
        if path.is_empty() {
            self.status = "请输入导出路径".to_string();
            return;
        }

        match export_records(&PathBuf::from(path), &self.records) {
            Ok(written) => {
                info!("exported {} records to {}", self.records.len(), written.display());
                self.status = format!("结果已导出到: {}", written.display());
            }
            Err(e) => {
                warn!("export failed: {}", e);
                self.status = format!("导出失败: {}", e);
            }
        }
    }

    fn draw_results_table(&self, ui: &mut egui::Ui) {
        TableBuilder::new(ui)
            .striped(true)
            .columns(Column::remainder().at_least(60.0), RESULT_COLUMNS.len())
            .header(20.0, |mut header| {
                for title in RESULT_COLUMNS {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, self.records.len(), |mut row| {
                    let record = &self.records[row.index()];
                    let status = if record.success {
                        "成功".to_string()
                    } else {
                        format!("失败: {}", record.error.as_deref().unwrap_or(""))
                    };

                    let field = |value: &Option<String>| value.clone().unwrap_or_default();
                    let cells = [
                        record.phone.clone(),
                        field(&record.fields.location),
                        field(&record.fields.operator),
                        field(&record.fields.area_code),
                        field(&record.fields.zip_code),
                        status,
                    ];
                    for cell in cells {
                        row.col(|ui| {
                            ui.label(cell);
                        });
                    }
                });
            });
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_session();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("手机号归属地批量查询");
            ui.separator();

            ui.label("手机号列表（每行一个）:");
            egui::ScrollArea::vertical()
                .id_salt("phone_input")
                .max_height(120.0)
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut self.input_text)
                            .desired_rows(6)
                            .desired_width(f32::INFINITY)
                            .hint_text("13800138000"),
                    );
                });

            ui.horizontal(|ui| {
                ui.label("文件路径:");
                ui.text_edit_singleline(&mut self.import_path);
                if ui.button("导入手机号").clicked() {
                    self.import_phones();
                }
                if ui.button("清空列表").clicked() {
                    self.clear_input();
                }
            });

            ui.horizontal(|ui| {
                if ui.button("开始查询").clicked() {
                    self.start_query();
                }
                if ui.button("停止查询").clicked() {
                    self.stop_query();
                }
                ui.label("导出路径:");
                ui.text_edit_singleline(&mut self.export_path);
                if ui.button("导出结果").clicked() {
                    self.export_results();
                }
            });

            ui.separator();
            ui.add(egui::ProgressBar::new(self.progress).show_percentage());
            ui.label(&self.status);
            ui.separator();

            self.draw_results_table(ui);
        });

        // Keep polling while the worker is busy, even without input events.
        if self.session.is_some() {
            ctx.request_repaint_after(Duration::from_millis(200));
        }
    }
}
