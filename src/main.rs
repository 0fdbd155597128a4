mod api;
mod bonsai;
mod canvas;
mod config;
mod error;
mod flyer;
mod haiku;
mod help;
mod logging;
mod palette;
mod particles;
mod render;
mod scene;
mod scenery;
mod settings;
mod terminal;
mod tree;

use clap::{Parser, Subcommand};
use config::{BonsaiConfig, HaikuLang, ServerConfig, WindMode};
use haiku::HaikuOutcome;
use logging::LogTarget;
use palette::SeasonChoice;
use settings::Settings;

#[derive(Parser)]
#[command(name = "edobonsai")]
#[command(author = "Terminal Art Generator")]
#[command(version = "0.2.0")]
#[command(about = "Edo-era ink bonsai that grows in your terminal, with haiku", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grow an animated bonsai
    Grow {
        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// Season: random, auto, spring, summer, autumn, winter
        #[arg(short = 'S', long)]
        season: Option<String>,

        /// Maximum branch depth
        #[arg(short, long)]
        depth: Option<u32>,

        /// Seconds per frame
        #[arg(short, long)]
        time: Option<f32>,

        /// Wind: cached (whole tree sways) or branch (every branch sways)
        #[arg(short, long)]
        wind: Option<String>,

        /// Base URL of a haiku API, e.g. http://127.0.0.1:8787
        #[arg(short, long)]
        api: Option<String>,

        /// Never contact the haiku API
        #[arg(long)]
        no_haiku: bool,

        /// Print the grown tree to stdout (no interactive display)
        #[arg(short, long)]
        print: bool,
    },

    /// Serve the Edo-AI haiku API
    Serve {
        /// Address to listen on
        #[arg(short, long)]
        bind: Option<String>,

        /// Haiku language: en, ja, composed
        #[arg(short, long)]
        lang: Option<String>,
    },

    /// Fetch one haiku and print it
    Haiku {
        /// Base URL of the haiku API
        #[arg(short, long)]
        api: Option<String>,
    },
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Grow {
            seed,
            season,
            depth,
            time,
            wind,
            api,
            no_haiku,
            print,
        } => {
            logging::init(if print { LogTarget::Stderr } else { LogTarget::File });

            let mut config = BonsaiConfig {
                print,
                seed,
                ..BonsaiConfig::default()
            };
            Settings::load().apply_to_scene(&mut config);

            if let Some(season) = season {
                config.season = SeasonChoice::parse(&season).unwrap_or_else(|| {
                    eprintln!("Unknown season: {}. Using random.", season);
                    eprintln!("Available: random, auto, spring, summer, autumn, winter");
                    SeasonChoice::Random
                });
            }
            if let Some(depth) = depth {
                if !config.growth.set_max_depth(depth) {
                    eprintln!("Depth {} is too deep. Using {}.", depth, config.growth.max_depth);
                }
            }
            if let Some(time) = time {
                config.time_step = time;
            }
            if let Some(wind) = wind {
                config.wind = WindMode::parse(&wind).unwrap_or_else(|| {
                    eprintln!("Unknown wind mode: {}. Using cached.", wind);
                    WindMode::Cached
                });
            }
            if api.is_some() {
                config.api_base = api;
            }
            if no_haiku {
                config.api_base = None;
            }

            bonsai::run(config)?;
        }
        Commands::Serve { bind, lang } => {
            logging::init(LogTarget::Stderr);

            let mut config = ServerConfig::default();
            Settings::load().apply_to_server(&mut config);
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(lang) = lang {
                config.lang = HaikuLang::parse(&lang).unwrap_or_else(|| {
                    eprintln!("Unknown language: {}. Using en.", lang);
                    eprintln!("Available: en, ja, composed");
                    HaikuLang::English
                });
            }

            api::serve(&config)?;
        }
        Commands::Haiku { api } => {
            logging::init(LogTarget::Stderr);

            let settings = Settings::load();
            let base = api
                .or(settings.haiku.api_base)
                .unwrap_or_else(|| format!("http://{}", ServerConfig::default().bind));

            match haiku::fetch_once(&base) {
                HaikuOutcome::Fetched(text) => println!("{}", text),
                HaikuOutcome::Fallback(text) => {
                    println!("{}", text);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
