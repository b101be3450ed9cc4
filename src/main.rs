//! Expiring Cache demo
//!
//! Walks through hooks, the data loader and expiration on a named table.

use std::any::Any;
use std::thread::sleep;
use std::time::Duration;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expiring_cache::{cache, CacheItem, CacheTable, Config, TracingLogger};

/// Value type stored by the demo
#[derive(Debug)]
struct Greeting {
    text: String,
}

fn main() -> Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expiring_cache=info,expiring_cache_demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: scheduler_threads={}, scheduler_thread_name={}",
        config.scheduler_threads, config.scheduler_thread_name
    );

    callbacks()?;
    data_loader()?;

    let table = cache::<String, Greeting>("demo");
    info!("Final stats: {}", serde_json::to_string_pretty(&table.stats())?);
    Ok(())
}

/// Added / deleting / expire hooks on one table.
fn callbacks() -> Result<()> {
    let table = cache::<String, Greeting>("demo");
    table.set_logger(TracingLogger::new("demo"));

    table.set_added_hook(|item| info!("Added callback 1: {} {:?}", item.key(), item.value()));
    table.add_added_hook(|item| info!("Added callback 2: {} {}", item.key(), item.created_at()));
    table.set_deleting_hook(|item| info!("Deleting: {} {}", item.key(), item.value().text));

    table.add(
        "someKey".to_string(),
        Duration::ZERO,
        Greeting {
            text: "This is a test!".to_string(),
        },
    );

    let found = table.value(&"someKey".to_string())?;
    info!("Found value in cache: {}", found.value().text);

    table.delete("someKey")?;
    table.remove_added_hooks();

    let item = table.add(
        "anotherKey".to_string(),
        Duration::from_secs(1),
        Greeting {
            text: "This is another test".to_string(),
        },
    );
    item.set_expire_hook(|key| info!("About to expire: {}", key));

    sleep(Duration::from_millis(1500));
    if let Err(err) = table.value(&"anotherKey".to_string()) {
        info!("Item is not cached (anymore): {}", err);
    }
    Ok(())
}

/// Values synthesized on demand by the data loader.
fn data_loader() -> Result<()> {
    let table: CacheTable<String, String> = cache("demo-loader");
    table.set_data_loader(|key: &String, _args: &[&dyn Any]| {
        let value = format!("This is a test with key {}", key);
        Some(CacheItem::new(key.clone(), Duration::ZERO, value))
    });

    for i in 0..5 {
        let item = table.value(&format!("someKey_{}", i))?;
        info!("Found value in cache: {}", item.value());
    }

    for item in table.most_accessed(3) {
        info!("{} accessed {} times", item.key(), item.access_count());
    }

    table.flush();
    info!("Flushed table, {} entries left", table.count());
    Ok(())
}
