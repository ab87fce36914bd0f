//! Demo: open and close the sample panels and print what is on screen.
//!
//! ```bash
//! RUST_LOG=info cargo run -p panel-sample
//! ```

use panel_framework::tracing::setup_tracing;
use panel_framework::RuntimeConfig;
use panel_sample::lifecycle::{UiOptions, UiSystem};
use panel_sample::panels::{Answer, ConfirmDialog, LoadingPanel, SettingsPanel, SettingsTab};
use tracing::{info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let options = UiOptions {
        runtime: RuntimeConfig::from_env()?,
        ..UiOptions::default()
    };
    let ui = UiSystem::new(options)?;
    let runtime = &ui.runtime;

    let span = tracing::info_span!("boot");
    async {
        runtime.open_panel::<LoadingPanel>(()).await?;
        info!(top = ?ui.topmost(), "Loading cover up");

        // Warm the caches while the cover is shown.
        runtime.pre_panel::<SettingsPanel>().await?;
        runtime.pre_panel::<ConfirmDialog>().await?;

        runtime.close_panel::<LoadingPanel>(()).await?;
        Ok::<_, panel_framework::PanelError>(())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("settings");
    async {
        runtime.open_panel::<SettingsPanel>(SettingsTab::Audio).await?;
        runtime
            .open_panel::<ConfirmDialog>("Discard unsaved changes?".to_string())
            .await?;
        info!(visible = ?ui.visible(), "Dialog over settings");

        runtime.close_panel::<ConfirmDialog>(Answer::Yes).await?;
        runtime.close_panel::<SettingsPanel>(()).await?;

        // Hidden, not destroyed: reopening keeps the panel's state.
        runtime.open_panel::<SettingsPanel>(SettingsTab::Video).await?;
        info!(top = ?ui.topmost(), "Settings reopened");
        Ok::<_, panel_framework::PanelError>(())
    }
    .instrument(span)
    .await?;

    // A failing open hook leaves the dialog open; closing it recovers.
    if let Err(e) = runtime.open_panel::<ConfirmDialog>(String::new()).await {
        warn!(error = %e, "Empty dialog refused");
        runtime.close_panel::<ConfirmDialog>(Answer::No).await?;
    }

    for event in ui.services.events.snapshot() {
        println!("{event:?}");
    }

    ui.shutdown().await?;
    info!("Demo completed successfully");
    Ok(())
}
