/* This file is part of bundlr-contracts (https://bundlr.network)
 *
 * Copyright (C) 2022-2025 Bundlr Network
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::{
    env,
    path::{Path, PathBuf},
};

use crate::{Error, Result};

/// Name of the directory holding our configuration files
const CONFIG_DIR_NAME: &str = "bundlr";

#[cfg(target_family = "unix")]
mod home_dir_impl {
    use std::{
        env,
        ffi::{CStr, OsString},
        mem,
        os::unix::prelude::OsStringExt,
        path::PathBuf,
        ptr,
    };

    /// Returns the path to the user's home directory.
    /// `$HOME` takes precedence, then the passwd entry of the current user.
    pub fn home_dir() -> Option<PathBuf> {
        match env::var_os("HOME") {
            Some(h) if !h.is_empty() => Some(PathBuf::from(h)),
            _ => unsafe { passwd_home() }.map(PathBuf::from),
        }
    }

    /// Look up the home directory with `getpwuid_r(3)`.
    unsafe fn passwd_home() -> Option<OsString> {
        let bufsize = match libc::sysconf(libc::_SC_GETPW_R_SIZE_MAX) {
            n if n < 0 => 512_usize,
            n => n as usize,
        };

        let mut buf: Vec<libc::c_char> = Vec::with_capacity(bufsize);
        let mut entry: libc::passwd = mem::zeroed();
        let mut found = ptr::null_mut();

        let ret = libc::getpwuid_r(
            libc::getuid(),
            &mut entry,
            buf.as_mut_ptr(),
            buf.capacity(),
            &mut found,
        );

        if ret != 0 || found.is_null() {
            return None
        }

        let dir = CStr::from_ptr(entry.pw_dir).to_bytes();
        if dir.is_empty() {
            return None
        }

        Some(OsStringExt::from_vec(dir.to_vec()))
    }
}

#[cfg(target_family = "windows")]
mod home_dir_impl {
    use std::{env, path::PathBuf};

    pub fn home_dir() -> Option<PathBuf> {
        env::var_os("APPDATA").map(PathBuf::from)
    }
}

pub use home_dir_impl::home_dir;

/// Returns `$XDG_CONFIG_HOME`, `$HOME/.config`, or `None`.
pub fn config_dir() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(|| home_dir().map(|h| h.join(".config")))
}

/// Expand a leading `~` into the user's home directory.
pub fn expand_path(path: &str) -> Result<PathBuf> {
    let Some(rest) = path.strip_prefix('~') else { return Ok(PathBuf::from(path)) };

    // `~user` forms are not supported
    if !rest.is_empty() && !rest.starts_with('/') {
        return Ok(PathBuf::from(path))
    }

    let Some(home) = home_dir() else {
        return Err(Error::Custom("Could not fetch path for home directory".to_string()))
    };

    Ok(home.join(rest.trim_start_matches('/')))
}

/// Join a path with `config_dir()/bundlr`.
pub fn join_config_path(file: &Path) -> Result<PathBuf> {
    let mut path = PathBuf::new();

    if let Some(v) = config_dir() {
        path.push(v);
    }

    path.push(CONFIG_DIR_NAME);
    path.push(file);

    Ok(path)
}

/// Use the given config path if any, otherwise fall back to the default
/// file name inside our config directory.
pub fn get_config_path(arg: Option<String>, fallback: &str) -> Result<PathBuf> {
    match arg {
        Some(a) => expand_path(&a),
        None => join_config_path(Path::new(fallback)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_plain_paths_untouched() {
        assert_eq!(expand_path("./wallet.json").unwrap(), PathBuf::from("./wallet.json"));
        assert_eq!(expand_path("/tmp/wallet.json").unwrap(), PathBuf::from("/tmp/wallet.json"));
        assert_eq!(expand_path("~alice/w.json").unwrap(), PathBuf::from("~alice/w.json"));
    }

    #[test]
    fn expand_home_prefix() {
        let Some(home) = home_dir() else { return };
        assert_eq!(expand_path("~").unwrap(), home);
        assert_eq!(expand_path("~/keys/wallet.json").unwrap(), home.join("keys/wallet.json"));
    }

    #[test]
    fn explicit_config_path_wins() {
        let path = get_config_path(Some("/etc/validator.toml".to_string()), "x.toml").unwrap();
        assert_eq!(path, PathBuf::from("/etc/validator.toml"));

        let path = get_config_path(None, "validator_config.toml").unwrap();
        assert!(path.ends_with("bundlr/validator_config.toml"));
    }
}
