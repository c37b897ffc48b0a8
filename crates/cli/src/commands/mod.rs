//! Subcommand implementations.
//!
//! Every command writes through [`Output`], which also prints the session's
//! notifications as they are published.

#![allow(clippy::print_stdout)]

pub mod cart;
pub mod plants;
pub mod wishlist;

use std::cell::RefCell;

use greenhouse_core::PlantId;
use greenhouse_storefront::Session;
use greenhouse_storefront::api::ApiError;
use greenhouse_storefront::notifications::{Notice, NoticeLevel};
use greenhouse_storefront::stores::MutationOutcome;
use serde::Serialize;
use tokio::sync::broadcast::{self, error::TryRecvError};

/// Boxed error returned by every command.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Terminal output for one invocation.
pub struct Output {
    json: bool,
    notices: RefCell<broadcast::Receiver<Notice>>,
}

impl Output {
    pub fn new(json: bool, notices: broadcast::Receiver<Notice>) -> Self {
        Self {
            json,
            notices: RefCell::new(notices),
        }
    }

    pub const fn is_json(&self) -> bool {
        self.json
    }

    pub fn line(&self, text: &str) {
        println!("{text}");
    }

    /// Print `value` as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> CommandResult {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Print every notice published since the last call.
    pub fn flush_notices(&self) {
        let mut notices = self.notices.borrow_mut();
        loop {
            match notices.try_recv() {
                Ok(notice) => {
                    let marker = match notice.level {
                        NoticeLevel::Success => "✔",
                        NoticeLevel::Info => "ℹ",
                        NoticeLevel::Error => "✖",
                    };
                    println!("{marker} {}", notice.message);
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Dropped notices");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }

    /// Print pending notices and turn a failed outcome into an error.
    ///
    /// # Errors
    ///
    /// Returns the outcome message if the mutation failed.
    pub fn finish(&self, outcome: MutationOutcome) -> CommandResult {
        self.flush_notices();
        if outcome.success {
            Ok(())
        } else {
            Err(outcome.message.into())
        }
    }
}

/// Fetch the plant a command refers to.
async fn plant_by_id(
    session: &Session,
    id: &str,
) -> Result<greenhouse_core::Plant, ApiError> {
    session.client().get_plant(&PlantId::new(id)).await
}
