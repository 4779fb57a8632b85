//! Background catalog scans with progress polling.
//!
//! A scan runs on a worker thread and reports back over a channel. The owner
//! calls [`CatalogLoader::poll`] from its own loop, so the finished catalog is
//! always installed on the caller's thread.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

use crate::models::SwatchCatalog;
use crate::services::index::SwatchIndexBuilder;

/// Messages sent from the scan thread.
#[derive(Debug)]
pub enum ScanMessage {
    /// The scan completed
    Finished(SwatchCatalog),
    /// The scan observed its cancel flag and stopped
    Cancelled,
    /// The scan failed
    Failed(String),
}

/// Runs at most one catalog scan at a time.
#[derive(Debug, Default)]
pub struct CatalogLoader {
    receiver: Option<Receiver<ScanMessage>>,
    cancel: Arc<AtomicBool>,
    last_error: Option<String>,
}

impl CatalogLoader {
    /// Creates an idle loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while a scan is in flight.
    pub fn is_loading(&self) -> bool {
        self.receiver.is_some()
    }

    /// Error message of the most recent failed scan.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Starts scanning `root` (optionally one section of it) in the background.
    ///
    /// Returns false and does nothing when a scan is already running.
    pub fn request(
        &mut self,
        builder: SwatchIndexBuilder,
        root: PathBuf,
        section: Option<String>,
    ) -> bool {
        if self.is_loading() {
            debug!("Scan already in progress, dropping request");
            return false;
        }

        let (sender, receiver) = channel();
        let cancel = Arc::new(AtomicBool::new(false));
        self.receiver = Some(receiver);
        self.cancel = Arc::clone(&cancel);
        self.last_error = None;

        thread::spawn(move || {
            let message = match builder.rebuild_cancellable(&root, section.as_deref(), &cancel) {
                Ok(Some(catalog)) => ScanMessage::Finished(catalog),
                Ok(None) => ScanMessage::Cancelled,
                Err(e) => ScanMessage::Failed(format!("{:#}", e)),
            };
            // The loader may have been dropped or cancelled
            let _ = sender.send(message);
        });

        true
    }

    /// Checks for a finished scan without blocking.
    ///
    /// Returns the new catalog once, when a scan completes successfully.
    pub fn poll(&mut self) -> Option<SwatchCatalog> {
        let receiver = self.receiver.as_ref()?;
        match receiver.try_recv() {
            Ok(message) => self.handle_message(message),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                // Thread finished without reporting
                self.receiver = None;
                None
            }
        }
    }

    /// Blocks until the running scan finishes.
    pub fn wait(&mut self) -> Option<SwatchCatalog> {
        let receiver = self.receiver.as_ref()?;
        match receiver.recv() {
            Ok(message) => self.handle_message(message),
            Err(_) => {
                self.receiver = None;
                None
            }
        }
    }

    /// Abandons the running scan; its result will never be installed.
    pub fn cancel(&mut self) {
        if self.receiver.take().is_some() {
            self.cancel.store(true, Ordering::Relaxed);
            debug!("Scan cancelled");
        }
    }

    fn handle_message(&mut self, message: ScanMessage) -> Option<SwatchCatalog> {
        self.receiver = None;
        match message {
            ScanMessage::Finished(catalog) => Some(catalog),
            ScanMessage::Cancelled => None,
            ScanMessage::Failed(error) => {
                warn!("Library scan failed: {}", error);
                self.last_error = Some(error);
                None
            }
        }
    }
}

impl Drop for CatalogLoader {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}
