//! Symbol interposition for `LD_PRELOAD`.
//!
//! Exports `execve` and the "stat by path" entry point under every name
//! glibc binds it to:
//! - `stat` and `stat64` on glibc 2.33 and later, the latter for callers
//!   built with `_FILE_OFFSET_BITS=64`;
//! - `__xstat` and `__xstat64` on older releases, where `stat` is an inline
//!   wrapper around them.
//!
//! Each replacement rewrites its path argument and calls the next definition
//! in lookup order.

use std::ffi::{CStr, c_char, c_int, c_void};
use std::sync::OnceLock;

use ctor::ctor;

use crate::redirect::{PrefixRedirect, forward_with, set_errno};

type ExecveFn =
    unsafe extern "C" fn(*const c_char, *const *const c_char, *const *const c_char) -> c_int;
type StatFn = unsafe extern "C" fn(*const c_char, *mut libc::stat) -> c_int;
type Stat64Fn = unsafe extern "C" fn(*const c_char, *mut libc::stat64) -> c_int;
type XstatFn = unsafe extern "C" fn(c_int, *const c_char, *mut libc::stat) -> c_int;
type Xstat64Fn = unsafe extern "C" fn(c_int, *const c_char, *mut libc::stat64) -> c_int;

/// Definitions the replacements forward to.
struct Originals {
    execve: Option<ExecveFn>,
    stat: Option<StatFn>,
    stat64: Option<Stat64Fn>,
    xstat: Option<XstatFn>,
    xstat64: Option<Xstat64Fn>,
}

static RESOLVER: OnceLock<PrefixRedirect> = OnceLock::new();
static ORIGINALS: OnceLock<Originals> = OnceLock::new();

macro_rules! next_fn {
    ($name:literal, $ty:ty) => {{
        // SAFETY: RTLD_NEXT with a NUL-terminated name is always a valid query.
        let sym = unsafe { libc::dlsym(libc::RTLD_NEXT, $name.as_ptr()) };
        if sym.is_null() {
            None
        } else {
            // SAFETY: the symbol is the libc function of that name, whose
            // signature is $ty.
            Some(unsafe { std::mem::transmute::<*mut c_void, $ty>(sym) })
        }
    }};
}

impl Originals {
    fn lookup() -> Self {
        Self {
            execve: next_fn!(c"execve", ExecveFn),
            stat: next_fn!(c"stat", StatFn),
            stat64: next_fn!(c"stat64", Stat64Fn),
            xstat: next_fn!(c"__xstat", XstatFn),
            xstat64: next_fn!(c"__xstat64", Xstat64Fn),
        }
    }
}

fn resolver() -> &'static PrefixRedirect {
    RESOLVER.get_or_init(PrefixRedirect::from_env)
}

fn originals() -> &'static Originals {
    ORIGINALS.get_or_init(Originals::lookup)
}

/// Reads `PRIV_DIR` and looks up the originals when the library is mapped.
///
/// # Safety
///
/// Runs before the host's `main`; touches only this library's statics and
/// the environment, which the loader has already set up.
#[ctor]
unsafe fn init() {
    let redirect = resolver();
    let _ = originals();
    tracing::debug!(base = ?redirect.base(), "path redirection installed");
}

fn enosys() -> c_int {
    set_errno(libc::ENOSYS);
    -1
}

/// Forwards a path-taking call through the resolver.
///
/// `$original` is the field of [`Originals`] to call, `$path` the raw path
/// argument; `$call` receives the resolved path pointer.
macro_rules! redirect_call {
    ($original:ident, $path:expr, |$orig:ident, $p:ident| $call:expr) => {{
        let Some($orig) = originals().$original else {
            return enosys();
        };
        let raw: *const c_char = $path;
        if raw.is_null() {
            let $p = raw;
            // SAFETY: forwarded unchanged; libc reports EFAULT.
            return unsafe { $call };
        }
        // SAFETY: non-null and NUL-terminated per the caller's contract.
        let path = unsafe { CStr::from_ptr(raw) };
        forward_with(resolver(), path, |resolved| {
            let $p = resolved.as_ptr();
            // SAFETY: `$p` is NUL-terminated and outlives the call; the other
            // arguments are the caller's, passed through untouched.
            unsafe { $call }
        })
    }};
}

/// Replacement for `execve(2)`.
///
/// # Safety
///
/// Same contract as libc `execve`: `path` is null or NUL-terminated, and
/// `argv`/`envp` are null-terminated arrays of NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn execve(
    path: *const c_char,
    argv: *const *const c_char,
    envp: *const *const c_char,
) -> c_int {
    redirect_call!(execve, path, |original, p| original(p, argv, envp))
}

/// Replacement for `stat(2)`.
///
/// # Safety
///
/// Same contract as libc `stat`: `path` is null or NUL-terminated and `buf`
/// points to writable storage for a `struct stat`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stat(path: *const c_char, buf: *mut libc::stat) -> c_int {
    redirect_call!(stat, path, |original, p| original(p, buf))
}

/// Replacement for the large-file `stat64`.
///
/// # Safety
///
/// Same contract as libc `stat64`: `path` is null or NUL-terminated and
/// `buf` points to writable storage for a `struct stat64`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stat64(path: *const c_char, buf: *mut libc::stat64) -> c_int {
    redirect_call!(stat64, path, |original, p| original(p, buf))
}

/// Replacement for glibc's versioned `__xstat`.
///
/// # Safety
///
/// Same contract as glibc `__xstat`: `ver` is the caller's stat ABI version,
/// `path` is null or NUL-terminated, and `buf` is writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __xstat(ver: c_int, path: *const c_char, buf: *mut libc::stat) -> c_int {
    redirect_call!(xstat, path, |original, p| original(ver, p, buf))
}

/// Replacement for glibc's versioned `__xstat64`.
///
/// # Safety
///
/// Same contract as glibc `__xstat64`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __xstat64(
    ver: c_int,
    path: *const c_char,
    buf: *mut libc::stat64,
) -> c_int {
    redirect_call!(xstat64, path, |original, p| original(ver, p, buf))
}
