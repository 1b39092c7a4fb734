//! Screen-space drawing of the segway through an external renderer.
//!
//! The simulation never talks to a windowing toolkit directly. Anything that
//! can poll a close request, draw filled circles and thick lines, and present
//! a frame can display it.

use nalgebra::{Point2, Vector2};

use crate::dynamics::state::State;

// ---------------------------------------------------------------------------
// Renderer collaborator
// ---------------------------------------------------------------------------

/// RGBA colour, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const PINK: Color = Color::rgb(245, 5, 150);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
}

/// Window parameters handed to the renderer at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub clear_color: Color,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 500,
            title: "Seagway robot".into(),
            clear_color: Color::BLACK,
        }
    }
}

/// Immediate-mode drawing backend. Window creation and teardown belong to
/// the implementor's constructor and `Drop`.
pub trait Renderer {
    /// External close request (window closed, Esc, ...).
    fn should_close(&self) -> bool;

    fn begin_frame(&mut self);

    fn draw_filled_circle(&mut self, center: Point2<f32>, radius: f32, color: Color);

    fn draw_line(&mut self, p0: Point2<f32>, p1: Point2<f32>, color: Color, thickness: f32);

    fn end_frame_and_present(&mut self);
}

// ---------------------------------------------------------------------------
// Screen layout
// ---------------------------------------------------------------------------

/// Fixed mapping from physical state to pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub pixels_per_unit: f32,
    pub origin: Point2<f32>,       // wheel centre at phi = 0
    pub pendulum_px: f32,
    pub wheel_radius_px: f32,
    pub marker_radius_px: f32,
    pub body_thickness: f32,
    pub marker_thickness: f32,
    pub body_color: Color,
    pub wheel_color: Color,
    pub marker_color: Color,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            pixels_per_unit: 50.0,
            origin: Point2::new(400.0, 400.0),
            pendulum_px: 200.0,
            wheel_radius_px: 50.0,
            marker_radius_px: 5.0,
            body_thickness: 10.0,
            marker_thickness: 3.0,
            body_color: Color::WHITE,
            wheel_color: Color::PINK,
            marker_color: Color::BLUE,
        }
    }
}

// ---------------------------------------------------------------------------
// Pose: screen geometry of one state
// ---------------------------------------------------------------------------

/// Screen-space points for one frame. y grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub wheel_center: Point2<f32>,
    pub pendulum_tip: Point2<f32>,
    pub marker: Point2<f32>,
}

impl Pose {
    pub fn from_state(state: &State, layout: &Layout) -> Self {
        let theta = state.theta as f32;
        let phi = state.phi as f32;

        let wheel_center = layout.origin + Vector2::new(phi * layout.pixels_per_unit, 0.0);
        let pendulum_tip =
            wheel_center + Vector2::new(theta.sin(), -theta.cos()) * layout.pendulum_px;
        let marker = wheel_center + Vector2::new(phi.sin(), -phi.cos()) * layout.wheel_radius_px;

        Self { wheel_center, pendulum_tip, marker }
    }
}

/// Issue the draw list for one state: wheel, pendulum body, rotation marker.
pub fn draw_segway<R: Renderer + ?Sized>(renderer: &mut R, state: &State, layout: &Layout) {
    let pose = Pose::from_state(state, layout);

    renderer.draw_filled_circle(pose.wheel_center, layout.wheel_radius_px, layout.wheel_color);
    renderer.draw_line(pose.wheel_center, pose.pendulum_tip, layout.body_color, layout.body_thickness);
    renderer.draw_filled_circle(pose.marker, layout.marker_radius_px, layout.marker_color);
    renderer.draw_line(pose.wheel_center, pose.marker, layout.marker_color, layout.marker_thickness);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
