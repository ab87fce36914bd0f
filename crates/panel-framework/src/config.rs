//! # Runtime Configuration
//!
//! Knobs for a [`PanelRuntime`](crate::runtime::PanelRuntime). Everything has
//! a default; `from_env` lets a binary override them without code changes.
//!
//! | variable | field | default |
//! |---|---|---|
//! | `PANEL_MAILBOX_CAPACITY` | `mailbox_capacity` | 32 |
//! | `PANEL_VIEWPORT` (`WIDTHxHEIGHT`) | `viewport` | scene graph viewport |

use crate::error::PanelError;
use crate::scene::Size;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAILBOX_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Capacity of each panel actor's request channel.
    pub mailbox_capacity: usize,
    /// Fixed size for new panel nodes. `None` asks the scene graph each time.
    pub viewport: Option<Size>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            viewport: None,
        }
    }
}

impl RuntimeConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self, PanelError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PanelError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("PANEL_MAILBOX_CAPACITY") {
            config.mailbox_capacity = raw.trim().parse().map_err(|_| {
                PanelError::InvalidConfig(format!("PANEL_MAILBOX_CAPACITY is not a number: {raw}"))
            })?;
        }
        if let Some(raw) = lookup("PANEL_VIEWPORT") {
            config.viewport = Some(parse_viewport(&raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PanelError> {
        if self.mailbox_capacity == 0 {
            return Err(PanelError::InvalidConfig("mailbox_capacity must be at least 1".into()));
        }
        if let Some(size) = self.viewport {
            if size.width <= 0.0 || size.height <= 0.0 {
                return Err(PanelError::InvalidConfig(format!(
                    "viewport must be positive, got {}x{}",
                    size.width, size.height
                )));
            }
        }
        Ok(())
    }
}

fn parse_viewport(raw: &str) -> Result<Size, PanelError> {
    let invalid = || PanelError::InvalidConfig(format!("PANEL_VIEWPORT must be WIDTHxHEIGHT, got {raw}"));
    let (width, height) = raw.trim().split_once('x').ok_or_else(invalid)?;
    let width = width.trim().parse().map_err(|_| invalid())?;
    let height = height.trim().parse().map_err(|_| invalid())?;
    Ok(Size::new(width, height))
}
