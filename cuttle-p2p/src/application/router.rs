use crate::infrastructure::message;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Handler invoked with the full decoded message, `type` field included.
pub type Handler = Box<dyn FnMut(Value) + Send>;

/// Capability to remove a handler registration.
///
/// Consuming it in [`MessageRouter::unregister`] removes whatever handler
/// currently occupies the type tag, matching the overwrite-blind semantics
/// of the registration map itself. Not clonable, so a registration can be
/// revoked once.
#[derive(PartialEq, Eq)]
pub struct HandlerRegistration {
    message_type: String,
}

impl HandlerRegistration {
    pub fn message_type(&self) -> &str {
        &self.message_type
    }
}

impl fmt::Debug for HandlerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistration")
            .field("message_type", &self.message_type)
            .finish()
    }
}

/// Routes inbound messages by their `type` tag.
///
/// A plain mapping, not an event bus: exactly one handler per tag, a later
/// registration silently replaces an earlier one. Messages that cannot be
/// routed (malformed bytes, missing tag, no handler) are dropped with a
/// debug log and nothing else; the sender never learns about them and no
/// buffering happens.
#[derive(Default)]
pub struct MessageRouter {
    handlers: HashMap<String, Handler>,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for a message type, replacing any previous one.
    /// The last registration wins.
    pub fn register<F>(&mut self, message_type: impl Into<String>, handler: F) -> HandlerRegistration
    where
        F: FnMut(Value) + Send + 'static,
    {
        let message_type = message_type.into();
        if self
            .handlers
            .insert(message_type.clone(), Box::new(handler))
            .is_some()
        {
            debug!(message_type = %message_type, "handler replaced");
        }
        HandlerRegistration { message_type }
    }

    /// Removes the handler currently registered for the capability's tag.
    pub fn unregister(&mut self, registration: HandlerRegistration) {
        self.handlers.remove(&registration.message_type);
    }

    pub fn is_registered(&self, message_type: &str) -> bool {
        self.handlers.contains_key(message_type)
    }

    /// Dispatches one inbound frame. Returns whether a handler ran.
    pub fn dispatch(&mut self, data: &[u8]) -> bool {
        let value: Value = match serde_json::from_slice(data) {
            Ok(value) => value,
            Err(err) => {
                debug!(error = %err, "dropping unparseable message");
                return false;
            }
        };

        let Some(message_type) = message::message_type(&value).map(str::to_owned) else {
            debug!("dropping message without a type field");
            return false;
        };

        match self.handlers.get_mut(&message_type) {
            Some(handler) => {
                handler(value);
                true
            }
            None => {
                debug!(message_type = %message_type, "dropping message with no handler");
                false
            }
        }
    }
}

impl fmt::Debug for MessageRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&String> = self.handlers.keys().collect();
        types.sort();
        f.debug_struct("MessageRouter")
            .field("registered", &types)
            .finish()
    }
}
