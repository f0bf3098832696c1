//! Layer and service registries

use std::collections::BTreeMap;

use serde::Serialize;

use super::AutodocConfig;

/// Canonical display name and URL of an external endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    pub name: String,
    pub url: String,
}

/// Externally declared layers and services, keyed by lowercase name
#[derive(Debug, Clone, Default)]
pub struct Registries {
    layers: BTreeMap<String, RegistryEntry>,
    services: BTreeMap<String, RegistryEntry>,
}

impl Registries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AutodocConfig) -> Self {
        let mut registries = Self::new();

        if let Some(layers) = &config.layers {
            for (layer, values) in &layers.arguments_values {
                let mut url = layers.url.clone();
                for (i, (name, value)) in layers.arguments_names.iter().zip(values).enumerate() {
                    url.push(if i == 0 { '?' } else { '&' });
                    url.push_str(name);
                    url.push('=');
                    url.push_str(value);
                }
                registries.add_layer(layer, &url);
            }
        }

        for (service, url) in &config.services {
            registries.add_service(service, url);
        }

        registries
    }

    pub fn add_layer(&mut self, name: &str, url: &str) {
        self.layers.insert(
            name.to_lowercase(),
            RegistryEntry {
                name: name.to_string(),
                url: url.to_string(),
            },
        );
    }

    pub fn add_service(&mut self, name: &str, url: &str) {
        self.services.insert(
            name.to_lowercase(),
            RegistryEntry {
                name: name.to_string(),
                url: url.to_string(),
            },
        );
    }

    /// Case-insensitive layer lookup
    pub fn layer(&self, name: &str) -> Option<&RegistryEntry> {
        self.layers.get(&name.to_lowercase())
    }

    /// Case-insensitive service lookup
    pub fn service(&self, name: &str) -> Option<&RegistryEntry> {
        self.services.get(&name.to_lowercase())
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }
}
