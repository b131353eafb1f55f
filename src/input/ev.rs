use super::{DeviceId, RawKeyEvent, ScanState};

use log::{error, info, warn};

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Reads one evdev node on a worker thread and forwards its key records
pub struct EvDevContext {
    path: PathBuf,
    device_id: DeviceId,
    pub tx: std::sync::mpsc::Sender<RawKeyEvent>,
    exit_requested: Arc<AtomicBool>,
    exited: Arc<AtomicBool>,
    started: Arc<AtomicBool>,
}

impl EvDevContext {
    pub fn started(&self) -> bool {
        self.started.load(Ordering::Relaxed)
    }

    pub fn exited(&self) -> bool {
        self.exited.load(Ordering::Relaxed)
    }

    /// After exit is requested, there will be one more event read from the device before
    /// it is closed.
    pub fn exit_requested(&self) -> bool {
        self.exit_requested.load(Ordering::Relaxed)
    }

    pub fn stop(&mut self) {
        self.exit_requested.store(true, Ordering::Relaxed);
    }

    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    pub fn new<P: Into<PathBuf>>(
        path: P,
        device_id: DeviceId,
        tx: std::sync::mpsc::Sender<RawKeyEvent>,
    ) -> EvDevContext {
        EvDevContext {
            path: path.into(),
            device_id,
            tx,
            started: Arc::new(AtomicBool::new(false)),
            exit_requested: Arc::new(AtomicBool::new(false)),
            exited: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Non-blocking function that will open the provided path and wait for more data with epoll
    pub fn start(&mut self) -> std::io::Result<()> {
        let mut dev = evdev::Device::open(&self.path)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

        let mut v = vec![epoll::Event {
            events: (epoll::Events::EPOLLET | epoll::Events::EPOLLIN | epoll::Events::EPOLLPRI)
                .bits(),
            data: 0,
        }];
        let epfd = epoll::create(false)?;
        epoll::ctl(epfd, epoll::ControlOptions::EPOLL_CTL_ADD, dev.fd(), v[0])?;

        self.started.store(true, Ordering::Relaxed);
        self.exited.store(false, Ordering::Relaxed);
        self.exit_requested.store(false, Ordering::Relaxed);

        // init callback
        info!("Init complete for {:?} ({})", self.path, self.device_id);

        let exit_req = Arc::clone(&self.exit_requested);
        let exited = Arc::clone(&self.exited);
        let device_id = self.device_id;
        let tx = self.tx.clone();
        let _ = std::thread::spawn(move || {
            let mut state = ScanState::new();
            while !exit_req.load(Ordering::Relaxed) {
                let res = match epoll::wait(epfd, -1, &mut v[0..1]) {
                    Ok(res) => res,
                    Err(err) => {
                        warn!("epoll_wait failed: {}", err);
                        continue;
                    }
                };
                if res != 1 {
                    warn!("epoll_wait returned {0}", res);
                }

                let events = match dev.events_no_sync() {
                    Ok(events) => events,
                    Err(e) => {
                        error!("Failed to read events from {}: {}", device_id, e);
                        break;
                    }
                };
                for ev in events {
                    if let Some(event) = super::decode(&ev, device_id, &mut state) {
                        if let Err(e) = tx.send(event) {
                            error!("Failed to write RawKeyEvent into the channel: {}", e);
                            exit_req.store(true, Ordering::Relaxed);
                        }
                    }
                }
            }
            exited.store(true, Ordering::Relaxed);
        });
        Ok(())
    }
}
