use navkeys::input::ev::EvDevContext;
use navkeys::input::scan::SCAN;
use navkeys::input::RawKeyEvent;
use navkeys::remap::{Button, DebounceDispatcher, OutputKeyEvent, RemapConfig};

use log::{info, warn};
use std::sync::mpsc::channel;
use std::sync::Arc;

fn main() {
    env_logger::init();

    let config = RemapConfig::from_env();
    info!("Starting with {:?}", config);

    let names: Vec<&str> = Button::ALL.iter().map(|b| b.device_name()).collect();
    let sensors = SCAN.find_named(&names);
    if sensors.is_empty() {
        eprintln!("None of {:?} is present under /dev/input", names);
        return;
    }

    // Send all input events to input_rx
    let (input_tx, input_rx) = channel::<RawKeyEvent>();
    let mut contexts = Vec::new();
    for (id, dev) in sensors {
        eprintln!("{:?} is '{}' ({})", dev.path, dev.name, id);
        let mut ctx = EvDevContext::new(dev.path, id, input_tx.clone());
        match ctx.start() {
            Ok(()) => contexts.push(ctx),
            Err(e) => warn!("Could not start reading {}: {}", id, e),
        }
    }
    drop(input_tx);

    let (output_tx, output_rx) = channel::<OutputKeyEvent>();
    let _ = std::thread::spawn(move || {
        while let Ok(event) = output_rx.recv() {
            println!("{:?}", event);
        }
    });

    let mut dispatcher = DebounceDispatcher::for_host(&config, Arc::new(output_tx));

    eprintln!("Waiting for input events...");
    while let Ok(event) = input_rx.recv() {
        if let Some(unhandled) = dispatcher.filter(event) {
            info!("passthrough {:?}", unhandled);
        }
    }
    eprintln!("All event loops were closed?!?");
}
