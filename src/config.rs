use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::optimizer::BigM;
use crate::selection::SelectorOptions;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub solver: SolverConfig,
    pub model: ModelConfig,
    pub input: InputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Seconds before the solve is abandoned; unset waits indefinitely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_seconds: Option<f64>,
    pub verify_connectivity: bool,
    pub tolerance: f64,
    pub presolve_screen: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_seconds: None,
            verify_connectivity: true,
            tolerance: 1e-6,
            presolve_screen: true,
        }
    }
}

impl SolverConfig {
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_seconds
            .filter(|s| s.is_finite() && *s > 0.0)
            .map(Duration::from_secs_f64)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub big_m: BigM,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    pub default_cost: f64,
    pub default_utility: f64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            default_cost: 1.0,
            default_utility: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub json: bool,
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: false,
            filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Built-in defaults, then the TOML file (if present), then `SUBSEL__`
    /// environment variables, e.g. `SUBSEL__SOLVER__TIME_LIMIT_SECONDS=30`
    pub fn load_from(path: &Path) -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("SUBSEL__").split("__"));
        Ok(figment.extract()?)
    }

    pub fn selector_options(&self) -> SelectorOptions {
        SelectorOptions {
            time_limit: self.solver.time_limit(),
            verify_connectivity: self.solver.verify_connectivity,
            tolerance: self.solver.tolerance,
            presolve_screen: self.solver.presolve_screen,
            big_m: self.model.big_m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let cfg = Config::load_from(Path::new("does/not/exist.toml")).unwrap();
        assert_eq!(cfg.model.big_m, BigM::VertexCount);
        assert!(cfg.solver.verify_connectivity);
        assert_eq!(cfg.input.default_cost, 1.0);
    }

    #[test]
    fn test_toml_values_parse() {
        let cfg: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string(
                r#"
                [solver]
                time_limit_seconds = 2.5
                presolve_screen = false

                [model]
                big_m = "budget-tightened"
                "#,
            ))
            .extract()
            .unwrap();

        assert_eq!(cfg.model.big_m, BigM::BudgetTightened);
        let options = cfg.selector_options();
        assert_eq!(options.time_limit, Some(Duration::from_millis(2500)));
        assert!(!options.presolve_screen);
        assert!(options.verify_connectivity);
    }

    #[test]
    fn test_non_positive_time_limit_means_unlimited() {
        let solver = SolverConfig {
            time_limit_seconds: Some(0.0),
            ..SolverConfig::default()
        };
        assert_eq!(solver.time_limit(), None);
    }
}
