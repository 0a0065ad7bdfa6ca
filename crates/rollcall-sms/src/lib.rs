//! Parent notification over SMS.
//!
//! The [`Dispatcher`] formats nothing itself: it takes a finished message,
//! normalises the destination number, hands it to an [`SmsTransport`],
//! classifies the provider's answer and appends one
//! [`MessageLog`](rollcall_core::log::MessageLog) per recipient. Delivery is
//! best-effort; a failure never touches attendance records.

mod classify;
mod debug_log;
mod dispatcher;
mod phone;
mod termii;
mod transport;

pub mod error;

pub use classify::classify;
pub use debug_log::DebugLog;
pub use dispatcher::{Delivery, Dispatcher};
pub use error::{ProviderError, TransportError};
pub use phone::{DEFAULT_COUNTRY_CODE, normalize_phone};
pub use termii::{SmsConfig, TermiiTransport};
pub use transport::{ProviderResponse, SmsTransport};
