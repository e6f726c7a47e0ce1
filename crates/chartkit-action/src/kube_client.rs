//! Cluster execution seam
//!
//! Actions apply and delete manifests through a [`KubeClient`]. The two
//! clients here never talk to a cluster: one prints what it is asked to do,
//! the other wraps it and fails on demand.

use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{ActionError, Result};

/// Applies and removes manifests on a cluster
pub trait KubeClient: Send + Sync {
    /// Create the resources in `manifests`
    fn create(&self, manifests: &str) -> Result<()>;

    /// Delete the resources in `manifests`
    fn delete(&self, manifests: &str) -> Result<()>;

    /// Wait until the resources in `manifests` are ready
    fn wait(&self, manifests: &str, timeout: Duration) -> Result<()>;

    /// Check that the cluster answers
    fn is_reachable(&self) -> Result<()>;
}

/// Client that writes every manifest to an output stream
pub struct PrintingKubeClient {
    out: Mutex<Box<dyn Write + Send>>,
}

impl PrintingKubeClient {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }

    /// Client that discards everything
    pub fn discard() -> Self {
        Self::new(std::io::sink())
    }

    fn print(&self, op: &'static str, manifests: &str) -> Result<()> {
        let mut out = self.out.lock().map_err(|_| ActionError::KubeClient {
            op,
            message: "output lock poisoned".to_string(),
        })?;
        writeln!(out, "{}", manifests)?;
        Ok(())
    }
}

impl KubeClient for PrintingKubeClient {
    fn create(&self, manifests: &str) -> Result<()> {
        self.print("create", manifests)
    }

    fn delete(&self, manifests: &str) -> Result<()> {
        self.print("delete", manifests)
    }

    fn wait(&self, manifests: &str, _timeout: Duration) -> Result<()> {
        self.print("wait", manifests)
    }

    fn is_reachable(&self) -> Result<()> {
        Ok(())
    }
}

/// Client that fails selected operations and prints the rest
pub struct FailingKubeClient {
    printing: PrintingKubeClient,
    pub create_error: Option<String>,
    pub delete_error: Option<String>,
    pub wait_error: Option<String>,
    pub unreachable: Option<String>,
}

impl FailingKubeClient {
    /// Wrap `printing`; nothing fails until an error is configured
    pub fn new(printing: PrintingKubeClient) -> Self {
        Self {
            printing,
            create_error: None,
            delete_error: None,
            wait_error: None,
            unreachable: None,
        }
    }

    pub fn fail_create(mut self, message: impl Into<String>) -> Self {
        self.create_error = Some(message.into());
        self
    }

    pub fn fail_delete(mut self, message: impl Into<String>) -> Self {
        self.delete_error = Some(message.into());
        self
    }

    pub fn fail_wait(mut self, message: impl Into<String>) -> Self {
        self.wait_error = Some(message.into());
        self
    }

    pub fn fail_reachability(mut self, message: impl Into<String>) -> Self {
        self.unreachable = Some(message.into());
        self
    }
}

fn configured(op: &'static str, error: &Option<String>) -> Result<()> {
    match error {
        Some(message) => Err(ActionError::KubeClient {
            op,
            message: message.clone(),
        }),
        None => Ok(()),
    }
}

impl KubeClient for FailingKubeClient {
    fn create(&self, manifests: &str) -> Result<()> {
        configured("create", &self.create_error)?;
        self.printing.create(manifests)
    }

    fn delete(&self, manifests: &str) -> Result<()> {
        configured("delete", &self.delete_error)?;
        self.printing.delete(manifests)
    }

    fn wait(&self, manifests: &str, timeout: Duration) -> Result<()> {
        configured("wait", &self.wait_error)?;
        self.printing.wait(manifests, timeout)
    }

    fn is_reachable(&self) -> Result<()> {
        configured("reachability check", &self.unreachable)?;
        self.printing.is_reachable()
    }
}
