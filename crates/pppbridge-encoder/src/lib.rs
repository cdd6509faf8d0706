//! # pppbridge-encoder
//!
//! Turns the arguments and environment `pppd` hands to its hook scripts into
//! a single term and delivers it to the supervisor's datagram socket.
//!
//! - [`filter`]: which variables are reported and how list values split.
//! - [`message`]: building and encoding the `{Args, Env}` tuple.
//! - [`transport`]: one connected `AF_UNIX` datagram, sent whole or not at all.

pub mod filter;
pub mod message;
pub mod transport;

use pppbridge_common::config::{EncoderConfig, NotifyConfig};
use pppbridge_common::error::Result;
use pppbridge_common::types::EnvSnapshot;

use crate::message::Message;
use crate::transport::{DatagramSink, UnixDatagramSink};

/// Connects to the configured socket and delivers one notification.
///
/// The socket is connected before the message is built, so a missing
/// listener is reported ahead of any encoding problem.
///
/// # Errors
///
/// Returns an error if the socket cannot be created or connected, if the
/// environment cannot be encoded, or if the send fails or is short.
pub fn notify(config: &NotifyConfig, args: Vec<Vec<u8>>, env: &EnvSnapshot) -> Result<usize> {
    let sink = UnixDatagramSink::connect(&config.socket_path)?;
    notify_via(&sink, &config.encoder, args, env)
}

/// Builds, encodes, and delivers one notification through `sink`.
///
/// Returns the size of the delivered message.
///
/// # Errors
///
/// Returns an error if encoding fails or the sink does not accept the whole
/// message in one send.
pub fn notify_via<S: DatagramSink>(
    sink: &S,
    encoder: &EncoderConfig,
    args: Vec<Vec<u8>>,
    env: &EnvSnapshot,
) -> Result<usize> {
    let message = Message::build(args, env, encoder)?;
    let payload = message.encode()?;
    transport::deliver(sink, &payload)?;
    tracing::info!(
        args = message.args.len(),
        vars = message.env.len(),
        bytes = payload.len(),
        "notification delivered"
    );
    Ok(payload.len())
}
