use crate::config::{BonsaiConfig, HaikuLang, ServerConfig, WindMode};
use crate::error::Result;
use crate::palette::SeasonChoice;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub scene: SceneSettings,
    #[serde(default)]
    pub haiku: HaikuSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Default, Deserialize)]
pub struct SceneSettings {
    pub season: Option<String>, // random, auto, spring, summer, autumn, winter
    pub max_depth: Option<u32>,
    pub wind: Option<String>, // cached or branch
    pub time_step: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HaikuSettings {
    pub api_base: Option<String>, // e.g. http://127.0.0.1:8787
    pub lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerSettings {
    pub bind: Option<String>,
}

impl Settings {
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                log::warn!("ignoring {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("cannot read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("edobonsai")
            .join("config.toml")
    }

    /// Fill `config` from the file; unknown values are logged and skipped
    pub fn apply_to_scene(&self, config: &mut BonsaiConfig) {
        if let Some(season) = self.scene.season.as_deref() {
            match SeasonChoice::parse(season) {
                Some(choice) => config.season = choice,
                None => log::warn!("unknown season {:?} in settings", season),
            }
        }
        if let Some(depth) = self.scene.max_depth {
            if !config.growth.set_max_depth(depth) {
                log::warn!("max_depth {} in settings clamped to {}", depth, config.growth.max_depth);
            }
        }
        if let Some(wind) = self.scene.wind.as_deref() {
            match WindMode::parse(wind) {
                Some(mode) => config.wind = mode,
                None => log::warn!("unknown wind mode {:?} in settings", wind),
            }
        }
        if let Some(step) = self.scene.time_step {
            config.time_step = step;
        }
        if let Some(base) = &self.haiku.api_base {
            config.api_base = Some(base.clone());
        }
        if let Some(lang) = self.haiku_lang() {
            config.haiku_lang = lang;
        }
    }

    pub fn apply_to_server(&self, config: &mut ServerConfig) {
        if let Some(bind) = &self.server.bind {
            config.bind = bind.clone();
        }
        if let Some(lang) = self.haiku_lang() {
            config.lang = lang;
        }
    }

    fn haiku_lang(&self) -> Option<HaikuLang> {
        let lang = self.haiku.lang.as_deref()?;
        let parsed = HaikuLang::parse(lang);
        if parsed.is_none() {
            log::warn!("unknown haiku language {:?} in settings", lang);
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Season;

    #[test]
    fn empty_file_is_default() {
        let settings = Settings::parse("").expect("empty toml");
        let mut config = BonsaiConfig::default();
        settings.apply_to_scene(&mut config);
        assert_eq!(config.season, SeasonChoice::Random);
        assert_eq!(config.growth.max_depth, 12);
    }

    #[test]
    fn sections_override_defaults() {
        let settings = Settings::parse(
            r#"
            [scene]
            season = "winter"
            max_depth = 8
            wind = "branch"

            [haiku]
            api_base = "http://localhost:8787"
            lang = "ja"

            [server]
            bind = "0.0.0.0:9000"
            "#,
        )
        .expect("valid toml");

        let mut scene = BonsaiConfig::default();
        settings.apply_to_scene(&mut scene);
        assert_eq!(scene.season, SeasonChoice::Fixed(Season::Winter));
        assert_eq!(scene.growth.max_depth, 8);
        assert_eq!(scene.wind, WindMode::Branch);
        assert_eq!(scene.api_base.as_deref(), Some("http://localhost:8787"));
        assert_eq!(scene.haiku_lang, HaikuLang::Japanese);

        let mut server = ServerConfig::default();
        settings.apply_to_server(&mut server);
        assert_eq!(server.bind, "0.0.0.0:9000");
        assert_eq!(server.lang, HaikuLang::Japanese);
    }

    #[test]
    fn unknown_values_keep_defaults() {
        let settings = Settings::parse("[scene]\nseason = \"monsoon\"\n").expect("valid toml");
        let mut config = BonsaiConfig::default();
        settings.apply_to_scene(&mut config);
        assert_eq!(config.season, SeasonChoice::Random);
    }

    #[test]
    fn huge_depth_is_clamped() {
        let settings = Settings::parse("[scene]\nmax_depth = 4294967295\n").expect("valid toml");
        let mut config = BonsaiConfig::default();
        settings.apply_to_scene(&mut config);
        assert_eq!(config.growth.max_depth, 16);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(Settings::parse("[scene\nseason = ").is_err());
    }
}
