use crate::app::{App, Focus};
use crate::braille;
use crate::settings::Variant;
use crate::simulation::RunState;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 24;

/// Max scroll for help content (generous to account for text wrapping on small screens)
pub const HELP_CONTENT_LINES: u16 = 50;

/// Number of lines in controls content
pub const CONTROLS_CONTENT_LINES: u16 = 15;

const STATUS_HEIGHT: u16 = 7;
const PARAMS_HEIGHT: u16 = 10;

// UI color scheme
const BORDER_COLOR: Color = Color::Cyan;
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;

/// Creates a standard styled block with rounded borders
fn styled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.fullscreen_mode {
        render_canvas(frame, area, app);
    } else {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);

        render_sidebar(frame, layout[0], app);
        render_canvas(frame, layout[1], app);
    }

    if app.show_help {
        render_help_overlay(frame, area, app);
    }
}

/// Lines of the controls box visible for a terminal height (minus borders)
pub fn get_controls_visible_lines(terminal_height: u16) -> u16 {
    terminal_height
        .saturating_sub(STATUS_HEIGHT + PARAMS_HEIGHT)
        .saturating_sub(2)
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(STATUS_HEIGHT),
            Constraint::Length(PARAMS_HEIGHT),
            Constraint::Min(10), // Controls
        ])
        .split(area);

    render_status_box(frame, sections[0], app);
    render_params_box(frame, sections[1], app);
    render_controls_box(frame, sections[2], app);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let sim = &app.simulation;
    let title = format!(" {} ", sim.settings.variant.name());
    let block = styled_block(&title);

    let progress = sim.progress();
    let progress_width = (area.width.saturating_sub(4)) as usize;
    let filled = (progress * progress_width as f32) as usize;
    let empty = progress_width.saturating_sub(filled);

    let (status_text, status_color) = if sim.paused {
        ("PAUSED", HIGHLIGHT_COLOR)
    } else {
        let state = sim.state();
        let color = match state {
            RunState::Running => BORDER_COLOR,
            RunState::Converged => Color::Green,
            RunState::Stopped => Color::Red,
        };
        (state.name(), color)
    };

    let swarm = sim.swarm();
    let maze_line = match sim.maze() {
        Some(maze) if maze.is_complete() => format!("maze {}x{}", maze.cols(), maze.rows()),
        Some(maze) => format!("maze {}x{} (partial)", maze.cols(), maze.rows()),
        None => "open field".to_string(),
    };

    let mut content = vec![
        Line::from(Span::styled(
            format!("{} / {} reached", swarm.reached_count(), swarm.len()),
            Style::default().fg(TEXT_COLOR),
        )),
        Line::from(vec![
            Span::styled("█".repeat(filled), Style::default().fg(Color::Green)),
            Span::styled("░".repeat(empty), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(vec![
            Span::styled(status_text, Style::default().fg(status_color)),
            Span::styled(format!("  t={}", sim.ticks()), Style::default().fg(DIM_TEXT_COLOR)),
        ]),
        Line::from(Span::styled(maze_line, Style::default().fg(DIM_TEXT_COLOR))),
    ];
    if let Some(message) = &app.status_message {
        content.push(Line::from(Span::styled(message.clone(), Style::default().fg(HIGHLIGHT_COLOR))));
    }

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_params_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Parameters ");

    let make_line = |label: &str, value: String, focused: bool| {
        let prefix = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().fg(HIGHLIGHT_COLOR)
        } else {
            Style::default().fg(TEXT_COLOR)
        };
        Line::from(Span::styled(format!("{}{}: {}", prefix, label, value), style))
    };

    let settings = &app.simulation.settings;
    let swarm = &settings.swarm;

    let content = vec![
        make_line("Agents", format!("{}", swarm.agent_count), app.focus == Focus::Agents),
        make_line("Decay", format!("{:.1}", settings.trail_decay_step), app.focus == Focus::Decay),
        make_line(
            "Food",
            format!("{:.0}", swarm.food_detection_range),
            app.focus == Focus::FoodRange,
        ),
        make_line(
            "S.Angle",
            format!("{:.0}°", swarm.sensor_angle.to_degrees()),
            app.focus == Focus::SensorAngle,
        ),
        make_line(
            "S.Offset",
            format!("{:.0}", swarm.sensor_offset),
            app.focus == Focus::SensorOffset,
        ),
        make_line("Speed", format!("{}", app.ticks_per_frame), app.focus == Focus::Speed),
        make_line(
            "Stop at",
            format!("{:.2}%", swarm.agents_reached_threshold * 100.0),
            app.focus == Focus::Threshold,
        ),
        make_line(
            "Turn",
            format!("{:.0}°", swarm.turn_angle.to_degrees()),
            app.focus == Focus::TurnAngle,
        ),
    ];

    // Calculate scroll to keep focused item visible based on actual area
    let focus_line = app.focus.line_index();
    let visible_height = area.height.saturating_sub(2); // minus borders
    let content_height = content.len() as u16;

    let scroll = if visible_height == 0 || visible_height >= content_height {
        0 // No scrolling needed
    } else if focus_line >= visible_height {
        // Scroll to show focused line at bottom of visible area
        focus_line.saturating_sub(visible_height - 1)
    } else {
        0 // Focus is within first visible lines
    };

    let paragraph = Paragraph::new(content).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_controls_box(frame: &mut Frame, area: Rect, app: &App) {
    let key_style = Style::default().fg(HIGHLIGHT_COLOR);
    let desc_style = Style::default().fg(DIM_TEXT_COLOR);

    let settings = &app.simulation.settings;

    // Helper to create a control line
    let make_control = |key: &str, desc: String| -> Line<'_> {
        Line::from(vec![
            Span::styled(format!("{:>5}", key), key_style),
            Span::styled(format!(" {}", desc), desc_style),
        ])
    };

    let walls = if settings.maze.solid_walls { "solid" } else { "open" };
    let content = vec![
        make_control("Space", "pause/resume".to_string()),
        make_control("H/?", "help".to_string()),
        make_control("R", "reset".to_string()),
        make_control("X", "stop + route".to_string()),
        make_control("M", settings.variant.next().name().to_string()),
        make_control("W", format!("walls: {}", walls)),
        make_control("V", "fullscreen".to_string()),
        make_control("P", "save PNG".to_string()),
        make_control("S", "save config".to_string()),
        make_control("Tab", "select param".to_string()),
        make_control("↑/↓", "adjust param".to_string()),
        make_control("+/-", "speed".to_string()),
        make_control("[/]", "trail decay".to_string()),
        make_control("Esc", "leave param".to_string()),
        make_control("Q", "quit".to_string()),
    ];

    let content_height = content.len() as u16;
    let visible_height = area.height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);
    let is_scrollable = max_scroll > 0;

    let title = if is_scrollable {
        " Controls (↑↓) "
    } else {
        " Controls "
    };

    let block = styled_block(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .scroll((app.controls_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block("");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cells = braille::render_to_braille(&app.simulation, inner.width, inner.height);

    for cell in cells {
        let x = inner.x + cell.x;
        let y = inner.y + cell.y;

        if x < inner.x + inner.width && y < inner.y + inner.height {
            let cell_rect = Rect {
                x,
                y,
                width: 1,
                height: 1,
            };
            let span = Span::styled(cell.char.to_string(), Style::default().fg(cell.color));
            let paragraph = Paragraph::new(Line::from(span));
            frame.render_widget(paragraph, cell_rect);
        }
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect, app: &App) {
    // Calculate the canvas area (exclude sidebar unless fullscreen)
    let canvas_x = if app.fullscreen_mode { 0 } else { SIDEBAR_WIDTH };
    let canvas_width = if app.fullscreen_mode {
        area.width
    } else {
        area.width.saturating_sub(SIDEBAR_WIDTH)
    };

    // Center the help dialog within the canvas
    let help_width = 56.min(canvas_width.saturating_sub(4));
    let help_height = area.height.saturating_sub(4).min(40);
    let x = canvas_x + (canvas_width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: help_width,
        height: help_height,
    };

    // Clear the background
    frame.render_widget(Clear, help_area);

    let heading = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(HIGHLIGHT_COLOR)));
    let term = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(TEXT_COLOR)));

    let variant_note = match app.simulation.settings.variant {
        Variant::Maze => "Maze: agents start in the top-left cell. When enough reach the goal, the shortest successful trail is cleaned of loops and drawn in yellow.",
        Variant::OpenField => "Open field: the edges wrap around. Several goals can be placed with --points.",
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled("SLIME-MOLD PATHFINDING", Style::default().fg(BORDER_COLOR))),
        Line::from(""),
        Line::from("Each agent lays a trail and probes three points ahead of it. It turns toward the weakest reading, so the swarm keeps spreading into unexplored space until an agent senses a goal."),
        Line::from(""),
        Line::from(variant_note),
        Line::from(""),
        heading("PARAMETERS:"),
        Line::from(""),
        term("Agents, Food, S.Angle, S.Offset, Turn, Stop at"),
        Line::from("Swarm shape. Changes apply after R."),
        Line::from(""),
        term("Decay"),
        Line::from("Trail fade per frame. Applies immediately."),
        Line::from(""),
        term("Speed"),
        Line::from("Ticks per frame. The stop check still runs every tick."),
        Line::from(""),
        heading("MAZE:"),
        Line::from(""),
        term("W - Solid walls"),
        Line::from("Off: only blocked cells stop agents. On: agents must follow carved passages."),
        Line::from(""),
        term("X - Stop"),
        Line::from("Halts the run and extracts the best route found so far."),
        Line::from(""),
        heading("BASIC CONTROLS:"),
        Line::from("Space=Pause, R=Reset, M=Variant, V=Fullscreen, P=PNG, S=Save config, Tab/Arrows=Adjust, +/-=Speed, Q=Quit"),
        Line::from(""),
    ];

    let content_height = content.len() as u16;
    let visible_height = help_height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);
    let is_scrollable = max_scroll > 0;

    // Update title to show scroll hint if scrollable
    let title = if is_scrollable {
        " Help (J/K scroll, H to close) "
    } else {
        " Help (H to close) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, help_area);
}
