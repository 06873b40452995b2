// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Default location of the Wipeseal configuration file.

use std::path::PathBuf;

/// `$XDG_CONFIG_HOME/wipeseal/config.json`, falling back to
/// `~/.config/wipeseal/config.json`, then `./wipeseal.json`.
pub fn default_config_path() -> PathBuf {
    config_base()
        .map(|base| base.join("wipeseal").join("config.json"))
        .unwrap_or_else(|| PathBuf::from("wipeseal.json"))
}

fn config_base() -> Option<PathBuf> {
    let xdg = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|xdg| !xdg.is_empty());
    if let Some(xdg) = xdg {
        return Some(PathBuf::from(xdg));
    }
    std::env::var("HOME")
        .ok()
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(".config"))
}
