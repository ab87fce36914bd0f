use super::{UiError, UiEvent, UiServices};
use async_trait::async_trait;
use panel_framework::{NodeRef, Panel};

/// Full-screen loading cover. Created fresh for every use.
pub struct LoadingPanel {
    node: NodeRef,
}

impl LoadingPanel {
    pub const NAME: &'static str = "loading";
}

#[async_trait]
impl Panel for LoadingPanel {
    type Context = UiServices;
    type OpenParams = ();
    type CloseParams = ();
    type Error = UiError;

    fn attach(node: &NodeRef, _services: &UiServices) -> Result<Self, UiError> {
        if node.is_destroyed() {
            return Err(UiError::NodeGone(node.id()));
        }
        Ok(Self { node: node.clone() })
    }

    async fn on_create(&mut self, services: &UiServices) -> Result<(), UiError> {
        services.events.push(UiEvent::Created {
            panel: Self::NAME,
            node: self.node.id(),
        });
        Ok(())
    }

    async fn on_open(&mut self, _params: (), services: &UiServices) -> Result<(), UiError> {
        services.animate().await;
        services.events.push(UiEvent::Opened {
            panel: Self::NAME,
            detail: String::new(),
        });
        Ok(())
    }

    async fn on_close(&mut self, _params: (), services: &UiServices) -> Result<(), UiError> {
        services.animate().await;
        services.events.push(UiEvent::Closed {
            panel: Self::NAME,
            detail: String::new(),
        });
        Ok(())
    }
}
