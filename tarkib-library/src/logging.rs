//! Application loggers.
//!
//! Both write through `tracing`; the forgetful one drops every other
//! message.

use std::sync::atomic::{AtomicUsize, Ordering};

use tarkib::{Component, Constructor};
use tracing::{error, info};

const FORGOT: &str = "Forgot what I was going to say";

pub trait Logger: Send + Sync {
    fn name(&self) -> &'static str;

    fn info(&self, message: &str);

    fn error(&self, error: &dyn std::error::Error);
}

/// Faithful logger.
#[derive(Debug, Default)]
pub struct ConsoleLogger;

tarkib::implements!(ConsoleLogger => dyn Logger);

impl Component for ConsoleLogger {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new("new").build(|_| Ok(ConsoleLogger))]
    }
}

impl Logger for ConsoleLogger {
    fn name(&self) -> &'static str {
        "console"
    }

    fn info(&self, message: &str) {
        info!(logger = self.name(), "{message}");
    }

    fn error(&self, error: &dyn std::error::Error) {
        error!(logger = self.name(), "{error}");
    }
}

/// Replaces every other message with an apology.
#[derive(Debug, Default)]
pub struct ForgetfulLogger {
    calls: AtomicUsize,
}

tarkib::implements!(ForgetfulLogger => dyn Logger);

impl ForgetfulLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn recall<'a>(&self, message: &'a str) -> &'a str {
        if self.calls.fetch_add(1, Ordering::Relaxed) % 2 == 0 {
            FORGOT
        } else {
            message
        }
    }
}

impl Component for ForgetfulLogger {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new("new").build(|_| Ok(ForgetfulLogger::new()))]
    }
}

impl Logger for ForgetfulLogger {
    fn name(&self) -> &'static str {
        "forgetful"
    }

    fn info(&self, message: &str) {
        info!(logger = self.name(), "{}", self.recall(message));
    }

    fn error(&self, error: &dyn std::error::Error) {
        let message = error.to_string();
        error!(logger = self.name(), "{}", self.recall(&message));
    }
}
