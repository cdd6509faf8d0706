//! Notification message construction.
//!
//! A message is the pair `{Args, Env}`: `Args` is the process's `argv` as a
//! list of binaries, `Env` a map from variable-name atoms to either a binary
//! or, for configured list variables, a list of binaries.

use std::collections::HashSet;

use pppbridge_common::config::{EncoderConfig, Strictness};
use pppbridge_common::error::{BridgeError, Result};
use pppbridge_common::types::{EnvSnapshot, split_entry};
use pppbridge_term::Term;

use crate::filter;

/// Value of a reported environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    /// The raw value.
    Binary(Vec<u8>),
    /// The value split on spaces.
    List(Vec<Vec<u8>>),
}

impl EnvValue {
    fn to_term(&self) -> Term {
        match self {
            Self::Binary(bytes) => Term::binary(bytes.as_slice()),
            Self::List(items) => Term::binary_list(items.iter().map(Vec::as_slice)),
        }
    }
}

/// One notification, ready to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Invocation arguments, `argv[0]` included.
    pub args: Vec<Vec<u8>>,
    /// Reported variables in environment order, names unique.
    pub env: Vec<(Vec<u8>, EnvValue)>,
}

impl Message {
    /// Builds a message from `argv` and an environment snapshot.
    ///
    /// # Errors
    ///
    /// Under [`Strictness::Strict`], returns an error for a reported entry
    /// without `=`, a name longer than `max_key_len`, or a repeated name.
    /// Under [`Strictness::Lenient`] those entries are skipped, truncated,
    /// or dropped instead and this never fails.
    pub fn build(args: Vec<Vec<u8>>, env: &EnvSnapshot, config: &EncoderConfig) -> Result<Self> {
        let strict = config.strictness == Strictness::Strict;
        let mut seen: HashSet<&[u8]> = HashSet::new();
        let mut vars = Vec::new();

        for entry in env.entries() {
            let parsed = split_entry(entry);
            let name = parsed.map_or(entry, |(name, _)| name);
            if !filter::is_allowed(config.filter, name) {
                continue;
            }

            let Some((name, value)) = parsed else {
                if strict {
                    return Err(BridgeError::MalformedEnvEntry {
                        entry: String::from_utf8_lossy(entry).into_owned(),
                    });
                }
                tracing::warn!(entry = %String::from_utf8_lossy(entry), "skipping malformed environment entry");
                continue;
            };

            let key = if name.len() > config.max_key_len {
                if strict {
                    return Err(BridgeError::KeyTooLong {
                        key: String::from_utf8_lossy(name).into_owned(),
                        max: config.max_key_len,
                    });
                }
                tracing::warn!(
                    key = %String::from_utf8_lossy(name),
                    max = config.max_key_len,
                    "truncating environment variable name"
                );
                &name[..config.max_key_len]
            } else {
                name
            };

            if !seen.insert(key) {
                if strict {
                    return Err(BridgeError::DuplicateKey {
                        key: String::from_utf8_lossy(key).into_owned(),
                    });
                }
                tracing::debug!(key = %String::from_utf8_lossy(key), "dropping repeated variable");
                continue;
            }

            let value = if config.is_list_var(key) {
                EnvValue::List(filter::split_list(value).into_iter().map(<[u8]>::to_vec).collect())
            } else {
                EnvValue::Binary(value.to_vec())
            };
            vars.push((key.to_vec(), value));
        }

        tracing::debug!(
            args = args.len(),
            reported = vars.len(),
            total = env.len(),
            filter = %config.filter,
            "built notification"
        );
        Ok(Self { args, env: vars })
    }

    /// Returns the `{Args, Env}` term for this message.
    #[must_use]
    pub fn to_term(&self) -> Term {
        let args = Term::binary_list(self.args.iter().map(Vec::as_slice));
        let env = Term::Map(
            self.env
                .iter()
                .map(|(key, value)| (Term::atom_latin1(key), value.to_term()))
                .collect(),
        );
        Term::Tuple(vec![args, env])
    }

    /// Encodes the message for the wire.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::TermTooLarge` if any part exceeds its wire limit.
    pub fn encode(&self) -> Result<Vec<u8>> {
        pppbridge_term::to_bytes(&self.to_term())
    }

    #[cfg(test)]
    fn var(&self, name: &str) -> Option<&EnvValue> {
        self.env
            .iter()
            .find(|(key, _)| key.as_slice() == name.as_bytes())
            .map(|(_, value)| value)
    }
}

#[cfg(test)]
mod tests {
    use pppbridge_common::config::FilterPolicy;

    use super::*;

    fn args(items: &[&str]) -> Vec<Vec<u8>> {
        items.iter().map(|s| s.as_bytes().to_vec()).collect()
    }

    fn lenient() -> EncoderConfig {
        EncoderConfig {
            strictness: Strictness::Lenient,
            ..EncoderConfig::default()
        }
    }

    #[test]
    fn allow_list_keeps_only_ppp_variables() {
        let env = EnvSnapshot::from_entries(["IFNAME=ppp0", "SPEED=115200", "UNRELATED=x"]);
        let msg = Message::build(args(&["pppd", "call", "isp"]), &env, &EncoderConfig::default())
            .expect("build");

        assert_eq!(msg.args, args(&["pppd", "call", "isp"]));
        let names: Vec<&[u8]> = msg.env.iter().map(|(k, _)| k.as_slice()).collect();
        assert_eq!(names, vec![&b"IFNAME"[..], &b"SPEED"[..]]);
        assert_eq!(msg.var("SPEED"), Some(&EnvValue::Binary(b"115200".to_vec())));
        assert!(msg.var("UNRELATED").is_none());
    }

    #[test]
    fn pass_through_keeps_everything() {
        let env = EnvSnapshot::from_entries(["IFNAME=ppp0", "UNRELATED=x", "EMPTY="]);
        let config = EncoderConfig {
            filter: FilterPolicy::PassThrough,
            ..EncoderConfig::default()
        };
        let msg = Message::build(Vec::new(), &env, &config).expect("build");
        assert_eq!(msg.env.len(), 3);
        assert_eq!(msg.var("EMPTY"), Some(&EnvValue::Binary(Vec::new())));
    }

    #[test]
    fn list_vars_are_split() {
        let env = EnvSnapshot::from_entries(["DNS1=1.1.1.1 8.8.8.8", "DNS2=", "IFNAME=ppp0"]);
        let config = EncoderConfig {
            list_vars: vec!["DNS1".into(), "DNS2".into()],
            ..EncoderConfig::default()
        };
        let msg = Message::build(Vec::new(), &env, &config).expect("build");
        assert_eq!(
            msg.var("DNS1"),
            Some(&EnvValue::List(vec![b"1.1.1.1".to_vec(), b"8.8.8.8".to_vec()]))
        );
        assert_eq!(msg.var("DNS2"), Some(&EnvValue::List(Vec::new())));
        assert_eq!(msg.var("IFNAME"), Some(&EnvValue::Binary(b"ppp0".to_vec())));
    }

    #[test]
    fn strict_rejects_malformed_reported_entry() {
        let env = EnvSnapshot::from_entries(["IFNAME"]);
        let err = Message::build(Vec::new(), &env, &EncoderConfig::default())
            .expect_err("should fail");
        assert!(matches!(err, BridgeError::MalformedEnvEntry { .. }));
    }

    #[test]
    fn strict_ignores_malformed_unreported_entry() {
        let env = EnvSnapshot::from_entries(["GARBAGE", "SPEED=9600"]);
        let msg = Message::build(Vec::new(), &env, &EncoderConfig::default()).expect("build");
        assert_eq!(msg.env.len(), 1);
    }

    #[test]
    fn lenient_skips_malformed_entry() {
        let env = EnvSnapshot::from_entries(["IFNAME", "SPEED=9600"]);
        let msg = Message::build(Vec::new(), &env, &lenient()).expect("build");
        assert_eq!(msg.env.len(), 1);
        assert!(msg.var("SPEED").is_some());
    }

    #[test]
    fn strict_rejects_long_names() {
        let name = format!("DEVICE{}", "X".repeat(40));
        let env = EnvSnapshot::from_entries([format!("{name}=tty")]);
        let err = Message::build(Vec::new(), &env, &EncoderConfig::default())
            .expect_err("should fail");
        assert!(matches!(err, BridgeError::KeyTooLong { max: 31, .. }));
    }

    #[test]
    fn lenient_truncates_long_names() {
        let name = format!("DEVICE{}", "X".repeat(40));
        let env = EnvSnapshot::from_entries([format!("{name}=tty")]);
        let msg = Message::build(Vec::new(), &env, &lenient()).expect("build");
        assert_eq!(msg.env[0].0, name.as_bytes()[..31].to_vec());
    }

    #[test]
    fn duplicates_follow_strictness() {
        let env = EnvSnapshot::from_entries(["IFNAME=ppp0", "IFNAME=ppp1"]);
        let err = Message::build(Vec::new(), &env, &EncoderConfig::default())
            .expect_err("should fail");
        assert!(matches!(err, BridgeError::DuplicateKey { .. }));

        let msg = Message::build(Vec::new(), &env, &lenient()).expect("build");
        assert_eq!(msg.env, vec![(b"IFNAME".to_vec(), EnvValue::Binary(b"ppp0".to_vec()))]);
    }

    #[test]
    fn term_shape_is_args_then_env() {
        let env = EnvSnapshot::from_entries(["IFNAME=ppp0"]);
        let msg = Message::build(args(&["ip-up"]), &env, &EncoderConfig::default())
            .expect("build");
        assert_eq!(
            msg.to_term(),
            Term::Tuple(vec![
                Term::binary_list(["ip-up"]),
                Term::Map(vec![(Term::Atom("IFNAME".into()), Term::binary("ppp0"))]),
            ])
        );
    }
}
