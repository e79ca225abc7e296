use anyhow::Context;
use clap::{Parser, Subcommand};
use ratekit::control::{self, Command};
use ratekit::data::{self, ContestResult, DEFAULT_GOAL, Username};
use ratekit::geometry::layers_for;
use ratekit::{BandTable, Frame, GoalProgress, Rating, contrast_for, svg};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "ratekit", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Show the rating badge
    Show,
    /// Hide the rating badge
    Hide,
    /// Reload rating data and replay the animations
    Reload,
    /// Print the colour band, contrast and ring layers for a rating
    Band { rating: Rating },
    /// Print tiles and progress from a rating towards a target
    Goal { rating: Rating, target: Rating },
    /// Write the settled ring for a rating as SVG to stdout
    Svg {
        rating: Rating,
        /// Side length of the square image
        #[arg(short, long, default_value_t = 200.0)]
        size: f64,
    },
    /// Build a rating data file from a contest history export (JSON array)
    Import {
        history: PathBuf,
        #[arg(short, long)]
        username: String,
        #[arg(short, long, default_value_t = DEFAULT_GOAL)]
        goal: Rating,
        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let table = BandTable::atcoder();

    match cli.command {
        Commands::Show => control::send(Command::Show),
        Commands::Hide => control::send(Command::Hide),
        Commands::Reload => control::send(Command::Reload),
        Commands::Band { rating } => {
            print_band(&table, rating);
            Ok(())
        }
        Commands::Goal { rating, target } => {
            let p = GoalProgress::new(rating, target);
            println!("tiles:     {} -> {}", p.tiles_current, p.tiles_target);
            println!("progress:  {}%", p.percent_to_target);
            if p.achieved {
                println!("remaining: achieved");
            } else {
                println!("remaining: {} pt", p.remaining);
            }
            Ok(())
        }
        Commands::Svg { rating, size } => {
            if !(size.is_finite() && size > 0.0) {
                anyhow::bail!("--size must be a positive number, got {}", size);
            }
            print!("{}", svg::render(&Frame::at_rest(&table, rating), size));
            Ok(())
        }
        Commands::Import {
            history,
            username,
            goal,
            output,
        } => import(&history, Username::new(username), goal, output.as_deref()),
    }
}

fn import(
    history: &Path,
    username: Username,
    goal: Rating,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let text = fs_err::read_to_string(history)?;
    let results: Vec<ContestResult> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a contest history", history.display()))?;
    let rating_data = data::parse_history(username, goal, &results);
    let json = serde_json::to_string_pretty(&rating_data)?;

    match output {
        Some(path) => {
            fs_err::write(path, json)?;
            log::info!("Wrote {} contests to {}", results.len(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn print_band(table: &BandTable, rating: Rating) {
    let band = table.band_for(rating);
    let contrast = contrast_for(&band.hex());
    println!("band:    {} ({}..={}) {}", band.label, band.min, band.max, band.hex());
    println!(
        "outline: {}",
        if contrast.is_dark_outline() { "dark" } else { "light" }
    );
    println!("shadow:  {}", contrast.shadow);

    for layer in layers_for(table, rating, 0.0, rating.layer_count()) {
        println!(
            "layer {}: {:>6.1}° #{:02x}{:02x}{:02x}",
            layer.index, layer.sweep_degrees, layer.color.red, layer.color.green, layer.color.blue
        );
    }
}
