//! # Example: counter
//!
//! Many threads bump one shared counter through an [`Agent`].
//!
//! Demonstrates how to:
//! - Build the default [`Executors`] once and share them.
//! - Post updates from several threads without locks in user code.
//! - Block until all earlier updates are applied with [`Agent::wait`].
//!
//! ## Flow
//! ```text
//! thread 1..4 ──► post(x + 1) ×250 ──► SerialQueue ──► run_update (one at a time)
//! main        ──► wait() ──► value() == 1000
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example counter
//! ```

use std::thread;
use std::time::Duration;

use agentcell::{Agent, Executors};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // 1. One runtime and one pair of executors for the whole process
    let rt = tokio::runtime::Runtime::new()?;
    let executors = Executors::new(rt.handle().clone());

    // 2. The cell
    let counter = Agent::builder(0u64).name("counter").build(&executors);

    // 3. Concurrent writers
    let writers: Vec<_> = (0..4)
        .map(|_| {
            let counter = counter.clone();
            thread::spawn(move || {
                for _ in 0..250 {
                    counter.post(|n| Ok(n + 1));
                }
            })
        })
        .collect();
    for w in writers {
        w.join().map_err(|_| "writer panicked")?;
    }

    // 4. Read without waiting, then wait for the queue to drain
    println!("[counter] before wait: {}", counter.value());
    if counter.wait(Some(Duration::from_secs(5))) {
        println!("[counter] after wait: {}", counter.value());
    } else {
        println!("[counter] still {} updates queued", counter.queued());
    }
    Ok(())
}
