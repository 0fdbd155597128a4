use crate::config::BonsaiConfig;
use crate::haiku::{self, HaikuFetcher};
use crate::help::show_help_modal;
use crate::palette::PAPER;
use crate::scene::{Phase, Scene};
use crate::terminal::{Input, Terminal};
use crossterm::event::{KeyCode, KeyModifiers};
use rand::prelude::*;
use std::io;

const HELP: &str = "\
EDO BONSAI
─────────────────
r/Space  Grow a new tree
Mouse    Stir the petals
q/Esc    Quit
?        Close help";

/// Size used when stdout is not a terminal
const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// Run the bonsai scene
pub fn run(config: BonsaiConfig) -> io::Result<()> {
    let seed = config.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0) // Fallback seed for misconfigured system clocks
    });
    log::info!("seed {}", seed);

    if config.print {
        run_print_mode(&config, seed)?;
    } else {
        run_interactive(&config, seed)?;
    }

    Ok(())
}

/// Grow the whole tree at once and print it
fn run_print_mode(config: &BonsaiConfig, seed: u64) -> io::Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut term = match Terminal::new(false) {
        Ok(term) if term.size().0 > 0 && term.size().1 > 0 => term,
        Ok(_) => Terminal::offscreen(FALLBACK_SIZE.0, FALLBACK_SIZE.1),
        Err(e) => {
            log::debug!("no terminal size ({}), printing at {:?}", e, FALLBACK_SIZE);
            Terminal::offscreen(FALLBACK_SIZE.0, FALLBACK_SIZE.1)
        }
    };

    let (width, height) = term.size();
    let mut scene = Scene::new(width, height, config);
    scene.regenerate(&mut rng);
    scene.finish_growth();

    let caption = match &config.api_base {
        Some(base) => haiku::fetch_once(base).text().to_string(),
        None => haiku::local_haiku(config.haiku_lang, &mut rng),
    };
    scene.set_caption(caption);

    scene.draw().blit_to(&mut term, PAPER);
    term.print_to_stdout();
    Ok(())
}

fn run_interactive(config: &BonsaiConfig, seed: u64) -> io::Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut term = Terminal::new(true)?;
    let mut fetcher = HaikuFetcher::new();

    let (width, height) = term.size();
    let mut scene = Scene::new(width, height, config);
    regenerate(&mut scene, &mut fetcher, config, &mut rng);

    loop {
        while let Some(input) = term.poll_input()? {
            match input {
                Input::Key(KeyCode::Char('q'), _) | Input::Key(KeyCode::Esc, _) => return Ok(()),
                Input::Key(KeyCode::Char('c'), mods) if mods.contains(KeyModifiers::CONTROL) => {
                    return Ok(());
                }
                Input::Key(KeyCode::Char('r'), _) | Input::Key(KeyCode::Char(' '), _) => {
                    regenerate(&mut scene, &mut fetcher, config, &mut rng);
                }
                Input::Key(KeyCode::Char('?'), _) => {
                    if show_help_modal(&mut term, HELP)? {
                        return Ok(());
                    }
                }
                Input::Key(..) => {}
                Input::Pointer(col, row) => scene.set_pointer(col, row),
                Input::Resize(w, h) => {
                    log::debug!("resized to {}x{}", w, h);
                    term.resize(w, h);
                    scene.resize(w, h, &mut rng);
                }
            }
        }

        if let Some(outcome) = fetcher.poll() {
            scene.set_caption(outcome.text());
        }

        let was_growing = matches!(scene.phase(), Phase::Growing { .. });
        scene.update(&mut rng);
        if was_growing && matches!(scene.phase(), Phase::Grown { .. }) {
            log::info!(
                "tree fully grown: {} branches",
                scene.tree().map_or(0, |tree| tree.branch_count())
            );
        }

        scene.draw().blit_to(&mut term, PAPER);
        term.present()?;
        term.sleep(config.time_step);
    }
}

/// New tree, and a new haiku to go with it
fn regenerate(scene: &mut Scene, fetcher: &mut HaikuFetcher, config: &BonsaiConfig, rng: &mut StdRng) {
    scene.regenerate(rng);
    match &config.api_base {
        Some(base) => fetcher.request(base),
        None => scene.set_caption(haiku::local_haiku(config.haiku_lang, rng)),
    }
}
