//! Registry mapping integrator names to factories.
//!
//! Integrators carry state (their RNG and resolved parameters), so the
//! registry stores constructor functions rather than instances. Aliases map
//! to the same factory as the canonical name; lookups are case-sensitive.

use super::{Integrator, brownian, brownian_align};
use crate::config::IntegratorConfig;
use crate::error::{Result, SimulationError};
use crate::math::Scalar;
use std::collections::HashMap;

type IntegratorFactory = fn(&IntegratorConfig, Scalar) -> Result<Box<dyn Integrator>>;

pub struct IntegratorRegistry {
    /// Key (canonical name or alias) to canonical name plus factory.
    factories: HashMap<String, (String, IntegratorFactory)>,
}

impl IntegratorRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register the integrators that ship with the engine.
    pub fn with_standard_integrators(mut self) -> Self {
        self.register("brownian", &["bd"], brownian::factory);
        self.register("brownian_align", &["align"], brownian_align::factory);
        self
    }

    pub fn register(&mut self, name: &str, aliases: &[&str], factory: IntegratorFactory) {
        self.factories
            .insert(name.to_string(), (name.to_string(), factory));
        for alias in aliases {
            self.factories
                .insert(alias.to_string(), (name.to_string(), factory));
        }
    }

    /// Build an integrator from its configuration and the run time step.
    pub fn create(&self, config: &IntegratorConfig, dt: Scalar) -> Result<Box<dyn Integrator>> {
        match self.factories.get(&config.kind) {
            Some((_, factory)) => factory(config, dt),
            None => Err(SimulationError::config(format!(
                "unknown integrator: '{}'. Available integrators: {}. Aliases: {}",
                config.kind,
                self.list_available().join(", "),
                self.list_aliases()
                    .iter()
                    .map(|(a, c)| format!("{a} -> {c}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    /// Sorted canonical names.
    pub fn list_available(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .factories
            .iter()
            .filter(|(key, (canonical, _))| *key == canonical)
            .map(|(key, _)| key.to_string())
            .collect();
        names.sort();
        names
    }

    /// Sorted (alias, canonical name) pairs.
    pub fn list_aliases(&self) -> Vec<(String, String)> {
        let mut aliases: Vec<(String, String)> = self
            .factories
            .iter()
            .filter(|(key, (canonical, _))| *key != canonical)
            .map(|(key, (canonical, _))| (key.clone(), canonical.clone()))
            .collect();
        aliases.sort_by(|a, b| a.0.cmp(&b.0));
        aliases
    }
}

impl Default for IntegratorRegistry {
    fn default() -> Self {
        Self::new().with_standard_integrators()
    }
}
