use super::{UiError, UiEvent, UiServices};
use async_trait::async_trait;
use panel_framework::{NodeRef, Panel};
use serde::{Deserialize, Serialize};

/// Page of the settings panel to show on open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SettingsTab {
    #[default]
    General,
    Audio,
    Video,
}

/// Settings page. Hidden rather than destroyed on close, so it keeps its
/// state between openings.
pub struct SettingsPanel {
    node: NodeRef,
    tab: SettingsTab,
    shown: u32,
}

impl SettingsPanel {
    pub const NAME: &'static str = "settings";
}

#[async_trait]
impl Panel for SettingsPanel {
    type Context = UiServices;
    type OpenParams = SettingsTab;
    type CloseParams = ();
    type Error = UiError;

    fn attach(node: &NodeRef, _services: &UiServices) -> Result<Self, UiError> {
        if node.is_destroyed() {
            return Err(UiError::NodeGone(node.id()));
        }
        Ok(Self {
            node: node.clone(),
            tab: SettingsTab::default(),
            shown: 0,
        })
    }

    async fn on_create(&mut self, services: &UiServices) -> Result<(), UiError> {
        services.events.push(UiEvent::Created {
            panel: Self::NAME,
            node: self.node.id(),
        });
        Ok(())
    }

    async fn on_open(&mut self, tab: SettingsTab, services: &UiServices) -> Result<(), UiError> {
        self.tab = tab;
        self.shown += 1;
        services.animate().await;
        services.events.push(UiEvent::Opened {
            panel: Self::NAME,
            detail: format!("{:?} #{}", self.tab, self.shown),
        });
        Ok(())
    }

    async fn on_close(&mut self, _params: (), services: &UiServices) -> Result<(), UiError> {
        services.animate().await;
        services.events.push(UiEvent::Closed {
            panel: Self::NAME,
            detail: format!("{:?}", self.tab),
        });
        Ok(())
    }
}
