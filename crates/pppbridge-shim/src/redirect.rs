//! Path rewriting for redirected lookups.

use std::borrow::Cow;
use std::ffi::{CStr, CString, OsString, c_int};
use std::os::unix::ffi::OsStringExt;

use pppbridge_common::constants::{PATH_MAX, PRIV_DIR_ENV, REDIRECT_PREFIX};
use pppbridge_common::error::{BridgeError, Result};

/// Maps a path requested by the host process to the path actually used.
pub trait PathResolver {
    /// Returns the path to use in place of `path`.
    ///
    /// Paths that need no change are returned borrowed.
    ///
    /// # Errors
    ///
    /// Returns an error if the rewritten path cannot be represented.
    fn resolve<'a>(&self, path: &'a CStr) -> Result<Cow<'a, CStr>>;
}

/// Prepends a base directory to every path starting with a prefix.
///
/// The prefix itself is kept, so `/etc/ppp/ip-up` under base `/priv`
/// becomes `/priv/etc/ppp/ip-up`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixRedirect {
    prefix: Vec<u8>,
    base: CString,
    max_len: usize,
}

impl PrefixRedirect {
    /// Creates a rule redirecting paths under `prefix` into `base`.
    #[must_use]
    pub fn new(prefix: impl Into<Vec<u8>>, base: CString) -> Self {
        Self {
            prefix: prefix.into(),
            base,
            max_len: PATH_MAX,
        }
    }

    /// Creates the `/etc/` rule for a private directory.
    ///
    /// An absent directory leaves an empty base, which turns every rewrite
    /// into the identity.
    #[must_use]
    pub fn for_private_dir(dir: Option<OsString>) -> Self {
        let base = dir
            .and_then(|d| CString::new(d.into_vec()).ok())
            .unwrap_or_default();
        Self::new(REDIRECT_PREFIX, base)
    }

    /// Creates the `/etc/` rule from the `PRIV_DIR` variable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::for_private_dir(std::env::var_os(PRIV_DIR_ENV))
    }

    /// Overrides the maximum rewritten length, terminating NUL included.
    #[must_use]
    pub const fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Returns the base directory.
    #[must_use]
    pub fn base(&self) -> &CStr {
        &self.base
    }
}

impl PathResolver for PrefixRedirect {
    fn resolve<'a>(&self, path: &'a CStr) -> Result<Cow<'a, CStr>> {
        let requested = path.to_bytes();
        if !requested.starts_with(&self.prefix) {
            return Ok(Cow::Borrowed(path));
        }

        let base = self.base.to_bytes();
        let len = base.len() + requested.len() + 1;
        if len > self.max_len {
            return Err(BridgeError::PathTooLong {
                len,
                max: self.max_len,
            });
        }

        let mut rewritten = Vec::with_capacity(len);
        rewritten.extend_from_slice(base);
        rewritten.extend_from_slice(requested);
        rewritten.push(0);
        let rewritten = CString::from_vec_with_nul(rewritten).map_err(|e| BridgeError::Config {
            message: format!("rewritten path: {e}"),
        })?;
        Ok(Cow::Owned(rewritten))
    }
}

/// Resolves `path` and hands the result to `call`.
///
/// If resolution fails, `call` is not invoked: `errno` is set and `-1` is
/// returned, as the intercepted libc function would on failure.
pub fn forward_with<R, F>(resolver: &R, path: &CStr, call: F) -> c_int
where
    R: PathResolver + ?Sized,
    F: FnOnce(&CStr) -> c_int,
{
    match resolver.resolve(path) {
        Ok(resolved) => call(&resolved),
        Err(e) => {
            set_errno(errno_for(&e));
            -1
        }
    }
}

/// Returns the `errno` value reported for a resolution failure.
#[must_use]
pub const fn errno_for(err: &BridgeError) -> c_int {
    match err {
        BridgeError::PathTooLong { .. } => libc::ENAMETOOLONG,
        _ => libc::EINVAL,
    }
}

pub(crate) fn set_errno(code: c_int) {
    nix::errno::Errno::set_raw(code);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(base: &str) -> PrefixRedirect {
        PrefixRedirect::for_private_dir(Some(OsString::from(base)))
    }

    fn errno() -> c_int {
        nix::errno::Errno::last_raw()
    }

    #[test]
    fn ppp_options_are_redirected() {
        let resolved = rule("/priv").resolve(c"/etc/ppp/options").expect("resolve");
        assert_eq!(resolved.as_ref(), c"/priv/etc/ppp/options");
        assert!(matches!(resolved, Cow::Owned(_)));
    }

    #[test]
    fn other_paths_are_untouched() {
        let r = rule("/priv");
        for path in [
            c"/usr/sbin/pppd",
            c"/etc",
            c"etc/ppp/options",
            c"/etcetera/x",
            c"/var/etc/ppp",
            c"",
        ] {
            let resolved = r.resolve(path).expect("resolve");
            assert_eq!(resolved.as_ref(), path);
            assert!(matches!(resolved, Cow::Borrowed(_)));
        }
    }

    #[test]
    fn prefix_alone_is_redirected() {
        let resolved = rule("/priv").resolve(c"/etc/").expect("resolve");
        assert_eq!(resolved.as_ref(), c"/priv/etc/");
    }

    #[test]
    fn unset_private_dir_is_identity() {
        let r = PrefixRedirect::for_private_dir(None);
        assert!(r.base().is_empty());
        let resolved = r.resolve(c"/etc/ppp/ip-up").expect("resolve");
        assert_eq!(resolved.as_ref(), c"/etc/ppp/ip-up");
    }

    #[test]
    fn overflow_is_an_error() {
        let r = rule("/priv").with_max_len(16);
        // "/priv" + "/etc/ppp/ip-up" + NUL = 20 bytes.
        let err = r.resolve(c"/etc/ppp/ip-up").expect_err("should fail");
        assert!(matches!(err, BridgeError::PathTooLong { len: 20, max: 16 }));
    }

    #[test]
    fn exact_fit_is_accepted() {
        let r = rule("/priv").with_max_len(20);
        assert!(r.resolve(c"/etc/ppp/ip-up").is_ok());
    }

    #[test]
    fn default_limit_is_path_max() {
        let base = format!("/{}", "p".repeat(PATH_MAX));
        let err = rule(&base).resolve(c"/etc/ppp/ip-up").expect_err("should fail");
        assert!(matches!(err, BridgeError::PathTooLong { max: PATH_MAX, .. }));
    }

    #[test]
    fn forward_passes_rewritten_path() {
        let mut seen = None;
        let rc = forward_with(&rule("/priv"), c"/etc/ppp/ip-up", |p| {
            seen = Some(p.to_owned());
            7
        });
        assert_eq!(rc, 7);
        assert_eq!(seen.as_deref(), Some(c"/priv/etc/ppp/ip-up"));
    }

    #[test]
    fn forward_refuses_overflow_without_calling() {
        let r = rule("/priv").with_max_len(8);
        let mut called = false;
        let rc = forward_with(&r, c"/etc/ppp/ip-up", |_| {
            called = true;
            0
        });
        assert_eq!(rc, -1);
        assert!(!called);
        assert_eq!(errno(), libc::ENAMETOOLONG);
    }

    struct Refuse;

    impl PathResolver for Refuse {
        fn resolve<'a>(&self, _path: &'a CStr) -> Result<Cow<'a, CStr>> {
            Err(BridgeError::Config {
                message: "no private dir".into(),
            })
        }
    }

    #[test]
    fn other_resolver_errors_set_einval() {
        nix::errno::Errno::set_raw(0);
        let rc = forward_with(&Refuse, c"/etc/ppp/options", |_| 0);
        assert_eq!(rc, -1);
        assert_eq!(errno(), libc::EINVAL);
    }

    #[test]
    fn resolver_is_usable_as_trait_object() {
        let r: Box<dyn PathResolver> = Box::new(rule("/priv"));
        let rc = forward_with(r.as_ref(), c"/bin/sh", |p| {
            assert_eq!(p, c"/bin/sh");
            0
        });
        assert_eq!(rc, 0);
    }
}
