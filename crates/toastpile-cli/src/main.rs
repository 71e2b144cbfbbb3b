mod logging;
mod simulate;

use std::path::PathBuf;
use std::rc::Rc;

use clap::{ArgAction, Parser, Subcommand};
use toastpile_core::headless::HeadlessWindow;
use toastpile_core::{StackCoordinator, StackLayout, ToastWindow};
use toastpile_shared::config;
use toastpile_shared::models::{Corner, Direction, Point, Rect};

#[derive(Parser)]
#[command(name = "toastpile", about = "toastpile - stacked toast notification core")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Also append logs to $XDG_DATA_HOME/toastpile/toastpile.log
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON trace of show / hover / dismiss steps and print the outcome
    Simulate {
        /// Trace file (reads stdin if omitted)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Pretty-print the JSON result
        #[arg(long)]
        pretty: bool,
    },

    /// Print where the first N toasts of a corner would be placed
    Layout {
        /// Number of stacked toasts
        #[arg(short = 'n', long, default_value_t = 3)]
        count: usize,

        /// Corner: top-left, top-right, bottom-left, bottom-right (default: from config)
        #[arg(short = 'c', long)]
        corner: Option<String>,

        /// Screen work area as WIDTHxHEIGHT
        #[arg(short = 's', long, default_value = "1920x1080")]
        screen: String,
    },

    /// Open config file in editor
    Config,
}

#[derive(serde::Serialize)]
struct PlacedSlot {
    slot: usize,
    direction: Direction,
    position: Point,
}

fn parse_screen(s: &str) -> Result<Rect, String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("Invalid screen '{}', expected WIDTHxHEIGHT", s))?;
    let width: f64 = w
        .trim()
        .parse()
        .map_err(|_| format!("Invalid screen width '{}'", w))?;
    let height: f64 = h
        .trim()
        .parse()
        .map_err(|_| format!("Invalid screen height '{}'", h))?;
    Ok(Rect::new(0.0, 0.0, width, height))
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_file);

    match cli.command {
        Commands::Simulate { input, pretty } => {
            simulate::handle(input.as_deref(), config::load_config(), pretty);
        }
        Commands::Layout {
            count,
            corner,
            screen,
        } => {
            let app_config = config::load_config();
            let corner: Corner = match corner {
                Some(c) => c.parse().unwrap_or_else(|e: String| {
                    eprintln!("{} Use 'top-left', 'top-right', 'bottom-left', or 'bottom-right'.", e);
                    std::process::exit(1);
                }),
                None => app_config.toast.corner,
            };
            let screen = parse_screen(&screen).unwrap_or_else(|e| {
                eprintln!("{}", e);
                std::process::exit(1);
            });

            let mut stack = StackCoordinator::new(StackLayout {
                screen,
                margin: app_config.stack.margin,
                gap: app_config.stack.gap,
            });
            let windows: Vec<Rc<dyn ToastWindow>> = (0..count)
                .map(|_| HeadlessWindow::new(app_config.toast.size()) as Rc<dyn ToastWindow>)
                .collect();
            let placed: Vec<PlacedSlot> = windows
                .iter()
                .map(|w| {
                    let r = stack.reserve(corner, w, app_config.animation.direction);
                    PlacedSlot {
                        slot: r.slot,
                        direction: r.direction,
                        position: r.position,
                    }
                })
                .collect();

            println!(
                "{}",
                serde_json::to_string(&placed).unwrap_or_else(|_| "[]".to_string())
            );
        }
        Commands::Config => {
            let config_path = config::ensure_config_file().unwrap_or_else(|e| {
                eprintln!("Failed to create config file: {}", e);
                std::process::exit(1);
            });

            let editor = config::resolve_editor();

            let status = std::process::Command::new("sh")
                .arg("-c")
                .arg(format!("{} \"{}\"", editor, config_path.display()))
                .status()
                .unwrap_or_else(|e| {
                    eprintln!("Failed to launch editor '{}': {}", editor, e);
                    std::process::exit(1);
                });

            if !status.success() {
                std::process::exit(status.code().unwrap_or(1));
            }
        }
    }
}
