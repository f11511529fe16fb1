use std::rc::Rc;
use std::time::Duration;

use color_eyre::{eyre::eyre, Result};
use joycore::config::Settings;
use joycore::controller::{ControllerProvider, GilrsProvider, InputManager, MonotonicClock};
use joycore::keys::key_name;
use joycore::persistence::{MemoryProfileStore, ProfileStore, TomlProfileStore};
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const FRAME_INTERVAL_MS: u64 = 16;
const AUTOSAVE_INTERVAL_SECS: u64 = 300;
const PRESS_RUMBLE: f32 = 0.3;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    setup()?;

    let settings = load_settings()?;
    let store = open_store()?;

    let clock = Rc::new(MonotonicClock::new());
    let provider =
        GilrsProvider::new(clock).map_err(|e| eyre!("Failed to start controller backend: {}", e))?;
    let mut manager = InputManager::new(provider, settings, store);

    for controller in manager.provider_mut().controllers() {
        info!(
            "Controller {} ({}) with {} axes",
            controller.name(),
            controller.identifier(),
            controller.num_axes()
        );
    }

    let mut frame = tokio::time::interval(Duration::from_millis(FRAME_INTERVAL_MS));
    let mut autosave = tokio::time::interval(Duration::from_secs(AUTOSAVE_INTERVAL_SECS));
    autosave.tick().await;

    info!("Polling controllers, press Ctrl+C to exit");
    loop {
        tokio::select! {
            _ = frame.tick() => {
                let events = manager.tick();
                for event in &events {
                    let name = key_name(event.key).unwrap_or_else(|| format!("{:#x}", event.key));
                    info!(
                        "{} {:?} at {}",
                        name,
                        event.state,
                        event.timestamp.format("%H:%M:%S.%3f")
                    );
                }
                if events.iter().any(|event| event.is_pressed()) {
                    manager.set_joystick_rumble(PRESS_RUMBLE);
                }

                let axes = manager.axes();
                if axes.iter().any(|value| *value != 0.0) {
                    debug!("Axes: {:?}", axes);
                }
            }
            _ = autosave.tick() => {
                if let Err(e) = manager.save_all() {
                    warn!("Autosave failed: {}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    if let Err(e) = manager.save_all() {
        error!("Failed to save controller profiles: {}", e);
    }
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

fn load_settings() -> Result<Settings> {
    match Settings::default_path() {
        Some(path) => {
            let settings = Settings::ensure_default_config(&path)?;
            info!("Using settings from {}", path.display());
            Ok(settings)
        }
        None => {
            warn!("No config directory on this platform, using default settings");
            Ok(Settings::default())
        }
    }
}

fn open_store() -> Result<Box<dyn ProfileStore>> {
    match TomlProfileStore::default_path() {
        Some(path) => Ok(Box::new(TomlProfileStore::open(path)?)),
        None => {
            warn!("No config directory on this platform, profiles will not be saved");
            Ok(Box::new(MemoryProfileStore::new()))
        }
    }
}
