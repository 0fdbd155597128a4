//! Edo-tech haiku: the phrase lists served by the API and a background
//! client that fetches one without ever blocking a frame.

use crate::config::HaikuLang;
use crate::error::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Shown whenever the haiku cannot be fetched
pub const FALLBACK: &str = "The connection is lost in the mist...";

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

pub const ENGLISH: [&str; 15] = [
    "The server is down, like a cherry blossom falling. 404.",
    "Deploying to production is like crossing the Hakone mountains.",
    "A bug in the code, hidden like a ninja in the night.",
    "The cloud is vast, but my wifi is weak. Wabi-sabi.",
    "Refactoring legacy code... the endless rain of the rainy season.",
    "Git merge conflict: a duel of samurais.",
    "Infinite loop: the wheel of reincarnation turns forever.",
    "Cache invalidation is as fleeting as the morning dew.",
    "Docker container: a small tea room for your code.",
    "Kubernetes: the Shogun of orchestration.",
    "Stack Overflow: the ancient scroll of wisdom.",
    "404 Not Found: The path you seek is lost in the mist.",
    "500 Internal Server Error: The spirits are restless.",
    "Console.log is the ink brush of the debugger.",
    "Async/Await: Waiting for the moon to rise.",
];

pub const JAPANESE: [&str; 15] = [
    "サーバー落ちて　散る桜かな　404",
    "デプロイや　箱根の山を　越えるごとし",
    "バグ潜む　闇夜の忍者　見つけたり",
    "クラウドは　広けれど我が　Wifi弱し",
    "レガシーや　五月雨のごと　降り止まぬ",
    "マージコンフリクト　侍たちの　決闘かな",
    "無限ループ　輪廻転生　止まらざる",
    "キャッシュ消え　朝露のごと　儚きかな",
    "コンテナは　コードのための　茶室なり",
    "クバネテス　指揮する将軍　威風堂々",
    "スタックオーバーフロー　古き知恵の　巻物よ",
    "404　探す道は　霧の中",
    "500エラー　御霊（みたま）鎮めよ　サーバー室",
    "コンソールログ　デバッガーの　墨跡なり",
    "非同期や　月出るを待つ　心持ち",
];

/// Opening five-mora phrases
pub const KAMI: [&str; 5] = ["古池や", "夏草や", "五月雨や", "初しぐれ", "閑さや"];
/// Middle seven-mora phrases
pub const NAKA: [&str; 5] = [
    "コードの海に",
    "サーバーの間に",
    "バグの足跡",
    "ログに染み入る",
    "キャッシュの夢の",
];
/// Closing five-mora phrases
pub const SHIMO: [&str; 5] = ["蝉の声", "月の影", "散る桜", "霧の中", "墨の跡"];

/// Uniform pick from a phrase list
pub fn pick_phrase<'a, R: Rng + ?Sized>(list: &[&'a str], rng: &mut R) -> &'a str {
    list.choose(rng).copied().unwrap_or(FALLBACK)
}

/// kami, naka and shimo joined with ideographic spaces
pub fn compose<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{}　{}　{}",
        pick_phrase(&KAMI, rng),
        pick_phrase(&NAKA, rng),
        pick_phrase(&SHIMO, rng)
    )
}

/// A haiku in the requested language, generated locally
pub fn local_haiku<R: Rng + ?Sized>(lang: HaikuLang, rng: &mut R) -> String {
    match lang {
        HaikuLang::English => pick_phrase(&ENGLISH, rng).to_string(),
        HaikuLang::Japanese => pick_phrase(&JAPANESE, rng).to_string(),
        HaikuLang::Composed => compose(rng),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HaikuOutcome {
    Fetched(String),
    Fallback(String),
}

impl HaikuOutcome {
    pub fn text(&self) -> &str {
        match self {
            HaikuOutcome::Fetched(text) | HaikuOutcome::Fallback(text) => text,
        }
    }

    fn from_result(result: Result<String>) -> Self {
        match result {
            Ok(text) => HaikuOutcome::Fetched(text),
            Err(e) => {
                log::warn!("haiku fetch failed: {}", e);
                HaikuOutcome::Fallback(FALLBACK.to_string())
            }
        }
    }
}

#[derive(Deserialize)]
struct HaikuBody {
    haiku: String,
}

/// Blocking `GET {api_base}/api/haiku`
pub fn fetch(api_base: &str) -> Result<String> {
    let url = format!("{}/api/haiku", api_base.trim_end_matches('/'));
    log::debug!("fetching {}", url);
    let response = ureq::get(&url).timeout(FETCH_TIMEOUT).call()?;
    let body: HaikuBody = response.into_json()?;
    Ok(body.haiku)
}

/// One fetch, with the fallback substituted on failure
pub fn fetch_once(api_base: &str) -> HaikuOutcome {
    HaikuOutcome::from_result(fetch(api_base))
}

/// Background haiku loader.
///
/// Each request supersedes the previous one: the older worker is told to
/// stop and anything it still delivers is discarded.
pub struct HaikuFetcher {
    generation: u64,
    cancel_flag: Arc<AtomicBool>,
    receiver: Receiver<(u64, HaikuOutcome)>,
    sender: Sender<(u64, HaikuOutcome)>,
}

impl HaikuFetcher {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            generation: 0,
            cancel_flag: Arc::new(AtomicBool::new(false)),
            receiver: rx,
            sender: tx,
        }
    }

    /// Start fetching from `api_base` (non-blocking)
    pub fn request(&mut self, api_base: &str) {
        let base = api_base.to_string();
        self.request_with(move || fetch(&base));
    }

    fn request_with<F>(&mut self, job: F)
    where
        F: FnOnce() -> Result<String> + Send + 'static,
    {
        self.cancel_flag.store(true, Ordering::Relaxed);
        self.cancel_flag = Arc::new(AtomicBool::new(false));
        self.generation += 1;

        let generation = self.generation;
        let tx = self.sender.clone();
        let cancel = self.cancel_flag.clone();

        thread::spawn(move || {
            let outcome = HaikuOutcome::from_result(job());
            if !cancel.load(Ordering::Relaxed) {
                let _ = tx.send((generation, outcome));
            }
        });
    }

    /// The latest outcome, if the current request has finished
    pub fn poll(&mut self) -> Option<HaikuOutcome> {
        let mut latest = None;
        loop {
            match self.receiver.try_recv() {
                Ok((generation, outcome)) => {
                    if generation == self.generation {
                        latest = Some(outcome);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        latest
    }
}

impl Default for HaikuFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Instant;

    fn wait_for(fetcher: &mut HaikuFetcher) -> HaikuOutcome {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(outcome) = fetcher.poll() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "fetch never completed");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn every_phrase_is_reachable() {
        let mut rng = StdRng::seed_from_u64(9);
        for list in [&ENGLISH, &JAPANESE] {
            let mut seen = std::collections::HashSet::new();
            for _ in 0..2000 {
                seen.insert(pick_phrase(list, &mut rng));
            }
            assert_eq!(seen.len(), list.len());
        }
    }

    #[test]
    fn composed_lines_have_three_parts() {
        let mut rng = StdRng::seed_from_u64(1);
        let line = compose(&mut rng);
        let parts: Vec<&str> = line.split('　').collect();
        assert_eq!(parts.len(), 3);
        assert!(KAMI.contains(&parts[0]));
        assert!(NAKA.contains(&parts[1]));
        assert!(SHIMO.contains(&parts[2]));
    }

    #[test]
    fn local_haiku_follows_language() {
        let mut rng = StdRng::seed_from_u64(2);
        assert!(ENGLISH.contains(&local_haiku(HaikuLang::English, &mut rng).as_str()));
        assert!(JAPANESE.contains(&local_haiku(HaikuLang::Japanese, &mut rng).as_str()));
    }

    #[test]
    fn failure_falls_back() {
        let mut fetcher = HaikuFetcher::new();
        fetcher.request_with(|| Err(Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "offline"))));
        assert_eq!(wait_for(&mut fetcher), HaikuOutcome::Fallback(FALLBACK.to_string()));
    }

    #[test]
    fn newer_request_supersedes_older() {
        let mut fetcher = HaikuFetcher::new();
        fetcher.request_with(|| {
            thread::sleep(Duration::from_millis(100));
            Ok("stale".to_string())
        });
        fetcher.request_with(|| Ok("fresh".to_string()));

        assert_eq!(wait_for(&mut fetcher), HaikuOutcome::Fetched("fresh".to_string()));
        thread::sleep(Duration::from_millis(200));
        assert_eq!(fetcher.poll(), None);
    }

    #[test]
    fn unreachable_server_falls_back() {
        // nothing listens on port 9 of localhost in test environments
        let outcome = fetch_once("http://127.0.0.1:9");
        assert_eq!(outcome.text(), FALLBACK);
    }
}
