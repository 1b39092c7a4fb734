use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};
use nalgebra::Point2;
use tracing::level_filters::LevelFilter;
use tracing::error;
use tracing_subscriber::FmtSubscriber;

use segway_sim::control::StateFeedback;
use segway_sim::error::SimError;
use segway_sim::render::{draw_segway, Color, Layout, Renderer, WindowConfig};
use segway_sim::{RunState, Scenario, Simulation};

const HISTORY_LEN: usize = 6_000;

/// Real-time segway window: one RK4 step per rendered frame.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Scenario file (TOML). Built-in parameters when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    if let Err(e) = tracing::subscriber::set_global_default(
        FmtSubscriber::builder().with_max_level(level).finish(),
    ) {
        eprintln!("failed to install log subscriber: {e}");
    }

    let scenario = match &args.config {
        Some(path) => match Scenario::from_file(path) {
            Ok(s) => s,
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Scenario::default(),
    };

    let window = WindowConfig::default();
    let sim = Simulation::new(&scenario.segway, StateFeedback::new(scenario.gains), &scenario.sim);
    let app = SegwayViz {
        sim,
        layout: Layout::default(),
        clear_color: color32(window.clear_color),
        theta_history: Vec::new(),
        phi_history: Vec::new(),
        show_plots: false,
        halted: None,
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([window.width as f32, window.height as f32])
            .with_title(window.title.clone()),
        ..Default::default()
    };
    match eframe::run_native(&window.title, options, Box::new(|_| Ok(Box::new(app)))) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn color32(c: Color) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

// ---------------------------------------------------------------------------
// egui painter as the simulation's renderer
// ---------------------------------------------------------------------------

struct EguiRenderer<'a> {
    ctx: &'a egui::Context,
    painter: egui::Painter,
    offset: egui::Vec2,
    clear_color: egui::Color32,
}

impl EguiRenderer<'_> {
    fn pos(&self, p: Point2<f32>) -> egui::Pos2 {
        egui::pos2(p.x, p.y) + self.offset
    }
}

impl Renderer for EguiRenderer<'_> {
    fn should_close(&self) -> bool {
        self.ctx.input(|i| i.viewport().close_requested())
    }

    fn begin_frame(&mut self) {
        self.painter.rect_filled(self.painter.clip_rect(), 0.0, self.clear_color);
    }

    fn draw_filled_circle(&mut self, center: Point2<f32>, radius: f32, color: Color) {
        self.painter.circle_filled(self.pos(center), radius, color32(color));
    }

    fn draw_line(&mut self, p0: Point2<f32>, p1: Point2<f32>, color: Color, thickness: f32) {
        self.painter.line_segment(
            [self.pos(p0), self.pos(p1)],
            egui::Stroke::new(thickness, color32(color)),
        );
    }

    fn end_frame_and_present(&mut self) {
        // Keep frames coming: simulated time advances once per repaint.
        self.ctx.request_repaint();
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

struct SegwayViz {
    sim: Simulation<StateFeedback>,
    layout: Layout,
    clear_color: egui::Color32,
    theta_history: Vec<[f64; 2]>,
    phi_history: Vec<[f64; 2]>,
    show_plots: bool,
    halted: Option<SimError>,
}

impl SegwayViz {
    fn record(&mut self) {
        let t = self.sim.time();
        let s = self.sim.state();
        self.theta_history.push([t, s.theta.to_degrees()]);
        self.phi_history.push([t, s.phi]);
        if self.theta_history.len() > HISTORY_LEN {
            self.theta_history.drain(..HISTORY_LEN / 2);
            self.phi_history.drain(..HISTORY_LEN / 2);
        }
    }
}

impl eframe::App for SegwayViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let s = self.sim.state();
                ui.label(format!(
                    "t = {:>7.2} s   theta = {:+7.2} deg   phi = {:+8.3} rad   [{:?}]",
                    self.sim.time(),
                    s.theta.to_degrees(),
                    s.phi,
                    self.sim.run_state(),
                ));
                if ui.add_enabled(self.sim.is_running(), egui::Button::new("Stop")).clicked() {
                    self.sim.stop();
                }
                ui.checkbox(&mut self.show_plots, "Plots");
                if let Some(e) = &self.halted {
                    ui.colored_label(egui::Color32::RED, e.to_string());
                }
            });
        });

        egui::CentralPanel::default().frame(egui::Frame::NONE).show(ctx, |ui| {
            let rect = ui.max_rect();
            let mut renderer = EguiRenderer {
                ctx,
                painter: ui.painter_at(rect),
                offset: rect.min.to_vec2(),
                clear_color: self.clear_color,
            };

            match self.sim.frame(&mut renderer, &self.layout) {
                Ok(RunState::Running) => self.record(),
                Ok(RunState::Stopped) => {
                    // Frozen: redraw the last pose without stepping.
                    renderer.begin_frame();
                    draw_segway(&mut renderer, self.sim.state(), &self.layout);
                }
                Err(e) => {
                    error!("{e}");
                    self.halted = Some(e);
                }
            }
        });

        if self.show_plots {
            egui::Window::new("History")
                .default_size([420.0, 320.0])
                .show(ctx, |ui| {
                    let half_h = ui.available_height() / 2.0 - 8.0;
                    ui.label("Tilt (deg)");
                    let theta: PlotPoints = self.theta_history.iter().copied().collect();
                    Plot::new("theta")
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .legend(Legend::default())
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("theta", theta));
                        });
                    ui.label("Wheel angle (rad)");
                    let phi: PlotPoints = self.phi_history.iter().copied().collect();
                    Plot::new("phi")
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("phi", phi));
                        });
                });
        }
    }
}

impl Drop for SegwayViz {
    fn drop(&mut self) {
        self.sim.stop();
    }
}
