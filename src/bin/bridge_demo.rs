use std::time::Duration;

use anyhow::Result;

use alsabridge::config::BridgeConfig;
use alsabridge::hal::drivers::ProcfsEnumerator;
use alsabridge::hal::mock::MockEnumerator;
use alsabridge::hal::{CardEnumerator, DeviceRegistry, Direction};
use alsabridge::supervisor::BridgeEvent;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("alsabridge - ALSA/JACK bridge supervisor demo");
    println!("=============================================\n");

    let procfs = ProcfsEnumerator::new();
    let enumerator: Box<dyn CardEnumerator> = if procfs.available() {
        Box::new(procfs)
    } else {
        println!("(/proc/asound not available, using sample devices)\n");
        Box::new(MockEnumerator::sample())
    };

    let registry =
        DeviceRegistry::new(Direction::Capture, enumerator, BridgeConfig::default()).await?;

    println!("Capture devices:");
    for entry in registry.iter() {
        println!(
            "  {:8} {:28} {}",
            entry.descriptor.hw(),
            entry.descriptor.display_name(),
            entry.descriptor.detail()
        );
    }

    let first = match registry.iter().next() {
        Some(entry) => entry,
        None => {
            println!("\nNo capture devices found.");
            return Ok(());
        }
    };

    println!(
        "\nActivating {} for 5 seconds...",
        first.descriptor.display_name()
    );
    let mut events = first.supervisor.subscribe();
    first.supervisor.activate();

    let deadline = tokio::time::sleep(Duration::from_secs(5));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            event = events.recv() => match event {
                Ok(BridgeEvent::DelayChanged(delay)) => println!("  delay = {}", delay),
                Ok(BridgeEvent::LogMessage(message)) => println!("  log: {}", message),
                Err(_) => break,
            },
        }
    }

    registry.stop().await;
    println!("\nDone.");

    Ok(())
}
