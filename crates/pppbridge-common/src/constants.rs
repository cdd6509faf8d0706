//! Well-known paths, variable names, and wire limits.

/// Datagram socket the supervisor binds and listens on.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/vintage_net/pppd_comms";

/// Variable naming the private directory that `/etc/` lookups are redirected into.
pub const PRIV_DIR_ENV: &str = "PRIV_DIR";

/// Path prefix rewritten by the preload shim.
pub const REDIRECT_PREFIX: &str = "/etc/";

/// Maximum path length accepted by the kernel, including the terminating NUL.
pub const PATH_MAX: usize = 4096;

/// Default maximum length of an environment variable name, in bytes.
pub const DEFAULT_MAX_KEY_LEN: usize = 31;

/// Maximum number of characters in an atom.
pub const MAX_ATOM_CHARS: usize = 255;

/// Variable-name prefixes reported under allow-list filtering.
///
/// These are the variables `pppd` exports to its `ip-up`/`ip-down` style
/// scripts: link identity, addresses, timing and byte counters, call
/// metadata, DNS servers, and the daemon's PID.
pub const PPP_ENV_PREFIXES: &[&str] = &[
    "DEVICE",
    "IFNAME",
    "IPLOCAL",
    "IPREMOTE",
    "PEERNAME",
    "SPEED",
    "ORIG_UID",
    "PPPLOGNAME",
    "CONNECT_TIME",
    "BYTES_SENT",
    "BYTES_RCVD",
    "LINKNAME",
    "CALL_FILE",
    "DNS1",
    "DNS2",
    "PPPD_PID",
    "USEPEERDNS",
];

/// Names a JSON file holding a [`crate::config::NotifyConfig`].
pub const CONFIG_FILE_ENV: &str = "PPPBRIDGE_CONFIG";
/// Overrides [`crate::config::NotifyConfig::socket_path`].
pub const SOCKET_ENV: &str = "PPPBRIDGE_SOCKET";
/// Overrides [`crate::config::EncoderConfig::filter`].
pub const FILTER_ENV: &str = "PPPBRIDGE_FILTER";
/// Overrides [`crate::config::EncoderConfig::strictness`].
pub const STRICTNESS_ENV: &str = "PPPBRIDGE_STRICTNESS";
/// Overrides [`crate::config::EncoderConfig::list_vars`] (space-separated).
pub const LIST_VARS_ENV: &str = "PPPBRIDGE_LIST_VARS";

/// Binary name of the notification helper.
pub const BIN_NAME: &str = "ppp-notify";
