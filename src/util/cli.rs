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

use std::{fs, io::Write, path::Path};

use tracing::{level_filters::LevelFilter, Dispatch};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::{util::path::expand_path, Error, Result};

/// Write the bundled default configuration to `path` unless a file
/// already exists there. Returns whether a file was created.
pub fn spawn_config(path: &Path, contents: &[u8]) -> Result<bool> {
    if path.exists() {
        return Ok(false)
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = fs::File::create(path)?;
    file.write_all(contents)?;
    eprintln!("Config file created in {path:?}. Edit it to change the defaults.");

    Ok(true)
}

/// Read the configuration at `path`, spawning the bundled defaults first
/// if it does not exist yet.
pub fn load_config(path: &Path, contents: &[u8]) -> Result<String> {
    spawn_config(path, contents)?;
    Ok(fs::read_to_string(path)?)
}

/// Map `-v` occurrences to a level filter.
pub fn log_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Build a logging handle for the given verbosity. Output goes to stderr,
/// or to `log_file` when one is given.
///
/// Nothing is installed globally: callers scope the returned [`Dispatch`]
/// with `tracing::dispatcher::with_default`.
pub fn log_dispatch(verbosity: u8, log_file: Option<&str>) -> Result<Dispatch> {
    let writer = match log_file {
        Some(file) => {
            let path = expand_path(file)?;
            let Some(name) = path.file_name() else {
                return Err(Error::ParseFailed("Log path has no file name"))
            };
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => ".".into(),
            };
            fs::create_dir_all(&dir)?;
            BoxMakeWriter::new(tracing_appender::rolling::never(dir, name))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level(verbosity))
        .with_ansi(log_file.is_none())
        .with_writer(writer)
        .finish();

    Ok(Dispatch::new(subscriber))
}
