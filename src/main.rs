mod agent;
mod app;
mod braille;
mod config;
mod error;
mod export;
mod geometry;
mod goals;
mod maze;
mod path;
mod presets;
mod settings;
mod simulation;
mod swarm;
mod trail;
mod ui;

use app::{App, Focus};
use clap::Parser;
use config::AppConfig;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use env_logger::{Env, Target};
use error::SimError;
use export::GifRecorder;
use geometry::Position;
use presets::{Preset, PresetManager};
use ratatui::{backend::CrosstermBackend, Terminal};
use settings::{SimulationSettings, Variant};
use simulation::PathSimulation;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "slime-path")]
#[command(about = "Slime-mold swarm pathfinding through mazes and open fields in the terminal")]
struct Args {
    // === Sources ===
    /// Start from a named preset (see --list-presets)
    #[arg(long)]
    preset: Option<String>,

    /// Load settings from a JSON config file (applied before other flags)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Print the available presets and exit
    #[arg(long = "list-presets")]
    list_presets: bool,

    // === Layout ===
    /// Layout variant (maze, open)
    #[arg(long)]
    variant: Option<String>,

    /// Goal points and optional field size, e.g. "(720x720) (100, 200) (300,400)"
    #[arg(long)]
    points: Option<String>,

    /// Start position, e.g. "(10, 10)"
    #[arg(long)]
    start: Option<String>,

    /// Open-field width
    #[arg(long)]
    width: Option<usize>,

    /// Open-field height
    #[arg(long)]
    height: Option<usize>,

    // === Swarm ===
    /// Number of agents (1-20000)
    #[arg(short = 'a', long)]
    agents: Option<usize>,

    /// Probe distance ahead of each agent
    #[arg(long = "sensor-offset")]
    sensor_offset: Option<f32>,

    /// Angle between centre and side probes in degrees
    #[arg(long = "sensor-angle")]
    sensor_angle: Option<f32>,

    /// Turn per tick in degrees
    #[arg(long = "turn-angle")]
    turn_angle: Option<f32>,

    /// Distance at which an agent senses a goal
    #[arg(long = "food-range")]
    food_range: Option<f32>,

    /// Fraction of agents that must reach a goal before the run stops (0-1]
    #[arg(long)]
    threshold: Option<f32>,

    /// Trail fade per frame
    #[arg(long)]
    decay: Option<f32>,

    // === Maze ===
    /// Maze columns
    #[arg(long)]
    cols: Option<usize>,

    /// Maze rows
    #[arg(long)]
    rows: Option<usize>,

    /// Field units per maze cell
    #[arg(long = "cell-size")]
    cell_size: Option<usize>,

    /// Maze generation budget in milliseconds (0 = unbounded)
    #[arg(long = "maze-budget-ms")]
    maze_budget_ms: Option<u64>,

    /// Agents may only cross carved passages
    #[arg(long = "solid-walls")]
    solid_walls: bool,

    // === Run ===
    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation speed (ticks per frame, 1-200)
    #[arg(long)]
    speed: Option<usize>,

    /// Run without the terminal UI and print a JSON summary
    #[arg(long)]
    headless: bool,

    /// Tick limit for headless runs
    #[arg(long = "max-ticks", default_value = "100000")]
    max_ticks: u64,

    // === Output ===
    /// Record frames to an animated GIF
    #[arg(long)]
    record: Option<PathBuf>,

    /// Write a PNG of the final state (headless runs)
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Write the resolved settings to a JSON config file and exit
    #[arg(long = "export-config")]
    export_config: Option<PathBuf>,

    /// Save the resolved settings as a user preset and exit
    #[arg(long = "save-preset")]
    save_preset: Option<String>,

    /// Delete a user preset and exit
    #[arg(long = "delete-preset")]
    delete_preset: Option<String>,

    /// Log file for the terminal UI (logs go to stderr in headless mode)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

fn parse_variant(s: &str) -> Variant {
    match s.to_lowercase().as_str() {
        "open" | "open-field" | "openfield" | "field" => Variant::OpenField,
        _ => Variant::Maze,
    }
}

/// Accepts "(x, y)" or bare "x, y"
fn parse_start(text: &str) -> Result<Position, SimError> {
    let text = if text.contains('(') {
        text.to_string()
    } else {
        format!("({text})")
    };
    let layout = goals::parse_layout(&text)?;
    layout
        .points
        .first()
        .copied()
        .ok_or_else(|| SimError::PointParse(format!("no start point in {text:?}")))
}

fn init_logging(args: &Args) -> io::Result<()> {
    let env = Env::default().default_filter_or("info");
    if args.headless {
        env_logger::Builder::from_env(env).target(Target::Stderr).init();
    } else if let Some(path) = &args.log_file {
        let file = File::create(path)?;
        env_logger::Builder::from_env(env)
            .target(Target::Pipe(Box::new(file)))
            .init();
    }
    Ok(())
}

/// Config file, then preset, then individual flags
fn resolve(args: &Args, presets: &PresetManager) -> Result<(SimulationSettings, usize), SimError> {
    let (mut settings, mut ticks_per_frame) = match &args.config {
        Some(path) => {
            let config = AppConfig::load_from_file(path)?;
            (config.settings, config.ticks_per_frame)
        }
        None => (SimulationSettings::default(), AppConfig::default().ticks_per_frame),
    };

    if let Some(name) = &args.preset {
        let preset = presets.find(name).ok_or_else(|| {
            SimError::InvalidConfig(format!(
                "unknown preset '{name}' (available: {})",
                presets.preset_names().join(", ")
            ))
        })?;
        settings = preset.settings.clone();
    }

    if let Some(v) = &args.variant {
        settings.variant = parse_variant(v);
    }
    if let Some(text) = &args.points {
        let layout = goals::parse_layout(text)?;
        if let Some((w, h)) = layout.size {
            if settings.variant == Variant::Maze {
                log::warn!("field size in --points is ignored for the maze variant");
            }
            settings.field_width = w as usize;
            settings.field_height = h as usize;
        }
        if !layout.points.is_empty() {
            settings.goals = layout.points;
        }
    }
    if let Some(text) = &args.start {
        settings.start = Some(parse_start(text)?);
    }
    if let Some(w) = args.width {
        settings.field_width = w;
    }
    if let Some(h) = args.height {
        settings.field_height = h;
    }

    let swarm = &mut settings.swarm;
    if let Some(n) = args.agents {
        swarm.agent_count = n.clamp(1, 20_000);
    }
    if let Some(v) = args.sensor_offset {
        swarm.sensor_offset = v;
    }
    if let Some(deg) = args.sensor_angle {
        swarm.sensor_angle = deg.to_radians();
    }
    if let Some(deg) = args.turn_angle {
        swarm.turn_angle = deg.to_radians();
    }
    if let Some(v) = args.food_range {
        swarm.food_detection_range = v;
    }
    if let Some(v) = args.threshold {
        swarm.agents_reached_threshold = v;
    }
    if let Some(v) = args.decay {
        settings.trail_decay_step = v;
    }

    let maze = &mut settings.maze;
    if let Some(v) = args.cols {
        maze.cols = v;
    }
    if let Some(v) = args.rows {
        maze.rows = v;
    }
    if let Some(v) = args.cell_size {
        maze.cell_size = v;
    }
    if let Some(ms) = args.maze_budget_ms {
        maze.time_budget_ms = (ms > 0).then_some(ms);
    }
    if args.solid_walls {
        maze.solid_walls = true;
    }

    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    if let Some(speed) = args.speed {
        ticks_per_frame = speed;
    }

    settings.validate()?;
    Ok((settings, ticks_per_frame.clamp(1, 200)))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(&args)?;

    let mut presets = PresetManager::new();
    if args.list_presets {
        for preset in presets.all_presets() {
            println!("{:<16} {}", preset.name, preset.description);
        }
        return Ok(());
    }
    if let Some(name) = &args.delete_preset {
        presets.delete_preset(name)?;
        println!("Preset '{}' deleted", name);
        return Ok(());
    }

    let (settings, ticks_per_frame) = resolve(&args, &presets)?;

    if let Some(path) = &args.export_config {
        let config = AppConfig {
            settings,
            ticks_per_frame,
            ..Default::default()
        };
        config.save_to_file(path)?;
        println!("Config written to {}", path.display());
        return Ok(());
    }
    if let Some(name) = &args.save_preset {
        presets.save_preset(Preset::new(name.clone(), "Saved from the command line", settings))?;
        println!("Preset '{}' saved", name);
        return Ok(());
    }

    let simulation = PathSimulation::new(settings)?;

    if args.headless {
        return run_headless(simulation, ticks_per_frame, &args);
    }

    let mut app = App::new(simulation, ticks_per_frame);
    if let Some(path) = &args.config {
        app.config_path = path.clone();
    }
    if let Some(path) = &args.record {
        let field = app.simulation.field();
        app.recorder = Some(GifRecorder::create(path, field.width(), field.height(), 4)?);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, &mut app);
    app.finish_recording();

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn run_headless(mut sim: PathSimulation, ticks_per_frame: usize, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut recorder = match &args.record {
        Some(path) => Some(GifRecorder::create(path, sim.field().width(), sim.field().height(), 4)?),
        None => None,
    };

    while sim.ticks() < args.max_ticks && !sim.is_complete() {
        let budget = (args.max_ticks - sim.ticks()).min(ticks_per_frame as u64) as usize;
        sim.run_frame(budget);
        sim.render_tick();
        if let Some(recorder) = recorder.as_mut() {
            recorder.capture(&sim)?;
        }
    }
    sim.stop();

    if let Some(mut recorder) = recorder {
        recorder.capture(&sim)?;
        recorder.finish()?;
    }
    if let Some(path) = &args.snapshot {
        export::save_snapshot(&sim, path)?;
    }

    println!("{}", serde_json::to_string_pretty(&sim.summary())?);
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    // Target ~60fps for smooth animation
    const FRAME_DURATION: Duration = Duration::from_millis(16);

    loop {
        // Render current state
        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll for events with timeout
        if event::poll(FRAME_DURATION)? {
            if let Event::Key(key) = event::read()? {
                // Only process Press events
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Handle Ctrl+C
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                match key.code {
                    // System controls
                    KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                    KeyCode::Char(' ') => app.toggle_pause(),
                    KeyCode::Char('r') | KeyCode::Char('R') => app.reset(),
                    KeyCode::Char('x') | KeyCode::Char('X') => app.stop(),
                    KeyCode::Char('v') | KeyCode::Char('V') => app.toggle_fullscreen(),
                    KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => app.toggle_help(),
                    KeyCode::Char('m') | KeyCode::Char('M') => app.cycle_variant(),
                    KeyCode::Char('w') | KeyCode::Char('W') => app.toggle_solid_walls(),
                    KeyCode::Char('p') | KeyCode::Char('P') => app.save_snapshot(),
                    KeyCode::Char('s') | KeyCode::Char('S') => app.save_config(),
                    KeyCode::Char('+') | KeyCode::Char('=') => {
                        app.increase_speed();
                        app.focus = Focus::Speed;
                    }
                    KeyCode::Char('-') | KeyCode::Char('_') => {
                        app.decrease_speed();
                        app.focus = Focus::Speed;
                    }
                    KeyCode::Char('[') => {
                        app.simulation.adjust_trail_decay_step(-0.5);
                        app.focus = Focus::Decay;
                    }
                    KeyCode::Char(']') => {
                        app.simulation.adjust_trail_decay_step(0.5);
                        app.focus = Focus::Decay;
                    }

                    // Navigation
                    KeyCode::Tab => app.next_focus(),
                    KeyCode::BackTab => app.prev_focus(),
                    KeyCode::Up => {
                        if !app.show_help {
                            if app.focus.is_param() {
                                app.adjust_focused_up();
                            } else {
                                app.scroll_controls_up();
                            }
                        }
                    }
                    KeyCode::Down => {
                        if !app.show_help {
                            if app.focus.is_param() {
                                app.adjust_focused_down();
                            } else {
                                let term_size = terminal.size()?;
                                let visible = ui::get_controls_visible_lines(term_size.height);
                                app.scroll_controls_down(ui::CONTROLS_CONTENT_LINES.saturating_sub(visible));
                            }
                        }
                    }
                    KeyCode::Esc => {
                        if app.show_help {
                            app.toggle_help();
                        } else if app.focus.is_param() {
                            app.focus = Focus::Controls;
                        }
                    }
                    KeyCode::Char('j') | KeyCode::Char('J') => {
                        if app.show_help {
                            app.scroll_help_down(ui::HELP_CONTENT_LINES);
                        }
                    }
                    KeyCode::Char('k') | KeyCode::Char('K') => {
                        if app.show_help {
                            app.scroll_help_up();
                        }
                    }
                    _ => {}
                }
            }
        }

        // Run simulation tick
        app.tick();
    }
}
