use super::{UiError, UiEvent, UiServices};
use async_trait::async_trait;
use panel_framework::{NodeRef, Panel};

/// How the user dismissed a confirm dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
}

/// Modal yes/no question, stacked above every other panel.
pub struct ConfirmDialog {
    node: NodeRef,
    message: String,
}

impl ConfirmDialog {
    pub const NAME: &'static str = "confirm";
    /// Keeps dialogs above panels registered with a lower base.
    pub const Z_INDEX_BASE: i64 = 1000;
}

#[async_trait]
impl Panel for ConfirmDialog {
    type Context = UiServices;
    type OpenParams = String;
    type CloseParams = Answer;
    type Error = UiError;

    fn attach(node: &NodeRef, _services: &UiServices) -> Result<Self, UiError> {
        if node.is_destroyed() {
            return Err(UiError::NodeGone(node.id()));
        }
        Ok(Self {
            node: node.clone(),
            message: String::new(),
        })
    }

    async fn on_create(&mut self, services: &UiServices) -> Result<(), UiError> {
        services.events.push(UiEvent::Created {
            panel: Self::NAME,
            node: self.node.id(),
        });
        Ok(())
    }

    async fn on_open(&mut self, message: String, services: &UiServices) -> Result<(), UiError> {
        if message.trim().is_empty() {
            return Err(UiError::EmptyMessage);
        }
        self.message = message;
        services.animate().await;
        services.events.push(UiEvent::Opened {
            panel: Self::NAME,
            detail: self.message.clone(),
        });
        Ok(())
    }

    async fn on_close(&mut self, answer: Answer, services: &UiServices) -> Result<(), UiError> {
        services.animate().await;
        services.events.push(UiEvent::Closed {
            panel: Self::NAME,
            detail: format!("{} -> {:?}", self.message, answer),
        });
        Ok(())
    }
}
