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

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Sequential spinner reporting the phases of a command
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    /// Spinner drawn on stderr, ticking until finished
    pub fn spinner(msg: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_message(msg.to_string());
        Self { bar }
    }

    /// Spinner that never draws
    pub fn hidden() -> Self {
        Self { bar: ProgressBar::hidden() }
    }

    pub fn set_text(&self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    /// Current text of the spinner
    #[cfg(test)]
    pub fn text(&self) -> String {
        self.bar.message()
    }

    pub fn succeed(&self, msg: &str) {
        self.bar.finish_with_message(format!("✔ {msg}"));
    }

    pub fn fail(&self, msg: &str) {
        self.bar.abandon_with_message(format!("✖ {msg}"));
    }
}
