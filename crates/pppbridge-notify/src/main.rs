//! # ppp-notify
//!
//! Installed as (or exec'd from) `pppd`'s `ip-up`, `ip-down`, `auth-up`, and
//! similar hook scripts. Sends its own arguments and the `pppd` environment
//! to the supervisor as one datagram and exits.
//!
//! The command line is the payload, so nothing in it is interpreted.
//! Settings come from `PPPBRIDGE_*` variables; see
//! [`pppbridge_common::config::NotifyConfig`].

use std::os::unix::ffi::OsStringExt;

use anyhow::Context;
use pppbridge_common::config::NotifyConfig;
use pppbridge_common::constants::BIN_NAME;
use pppbridge_common::types::EnvSnapshot;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let env = EnvSnapshot::capture();
    let config = NotifyConfig::load(&env).context("loading configuration")?;
    let args: Vec<Vec<u8>> = std::env::args_os().map(OsStringExt::into_vec).collect();
    tracing::debug!(args = args.len(), vars = env.len(), "captured invocation");

    let _ = pppbridge_encoder::notify(&config, args, &env)
        .with_context(|| format!("{BIN_NAME}: notifying {}", config.socket_path.display()))?;
    Ok(())
}
