//! # Example: rescue
//!
//! Shows the three ways an update can end without changing the value.
//!
//! Demonstrates how to:
//! - Reject results with a validator (silent discard).
//! - Route failures to rescuers by [`ErrorKind`].
//! - Bound slow updates with a timeout.
//! - Watch committed changes with the built-in [`LogObserver`].
//!
//! ## Flow
//! ```text
//! post(-50)            ─► validator rejects  ─► (nothing)
//! post(Err(Argument))  ─► rescuer[Argument]  ─► "[rescue] argument ..."
//! post(sleep 500ms)    ─► timeout 100ms      ─► rescuer[Any] "[rescue] timeout ..."
//! post(+25)            ─► commit             ─► LogObserver "[changed]"
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example rescue --features logging
//! ```

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use agentcell::{Agent, ErrorKind, Executors, LogObserver, UpdateError};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let rt = tokio::runtime::Runtime::new()?;
    let executors = Executors::new(rt.handle().clone());

    let stock = Agent::builder(100i64)
        .name("stock")
        .timeout(Duration::from_millis(100))
        .validator(|n| *n >= 0)
        .observer(Arc::new(LogObserver::new()))
        .build(&executors);

    stock
        .rescue(ErrorKind::Argument, |err| {
            println!("[rescue] argument: {}", err.message);
            Ok(())
        })
        .rescue(ErrorKind::Any, |err| {
            println!("[rescue] {}: {}", err.kind, err.message);
            Ok(())
        });

    stock.post(|n| Ok(n - 150));
    stock.post(|_| Err(UpdateError::argument("quantity must be positive")));
    stock.post_blocking(|n| {
        thread::sleep(Duration::from_millis(500));
        Ok(n * 2)
    });
    stock.post(|n| Ok(n + 25));

    if !stock.wait(Some(Duration::from_secs(5))) {
        return Err("updates did not finish in time".into());
    }
    println!("[stock] final: {}", stock.value());

    // Give the observer worker a moment to print the last change.
    thread::sleep(Duration::from_millis(50));
    Ok(())
}
