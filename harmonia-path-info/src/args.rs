// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use harmonia_path_info::{Config, ReportRequest};

/// Query information about store paths.
///
/// Prints each path, followed by the requested columns. With `--json` a
/// list of objects is printed instead.
#[derive(Parser, Debug)]
#[command(author, version, about, disable_help_flag = true)]
pub struct Args {
    /// Store paths, or symlinks to store paths, to report on
    pub paths: Vec<String>,

    /// Print the NAR size of each path
    #[arg(short = 's', long)]
    pub size: bool,

    /// Print the size of each path's closure
    #[arg(short = 'S', long)]
    pub closure_size: bool,

    /// Print sizes in human-readable units
    #[arg(short = 'h', long)]
    pub human_readable: bool,

    /// Print trust and signatures of each path
    #[arg(long)]
    pub sigs: bool,

    /// Only show paths no substituter can provide; annotate JSON instead
    #[arg(long)]
    pub filter_substitutable: bool,

    /// Print a JSON list of objects
    #[arg(long)]
    pub json: bool,

    /// Also report on the closure of each path
    #[arg(short = 'r', long)]
    pub recursive: bool,

    /// Report on every valid path in the store
    #[arg(long, conflicts_with = "paths")]
    pub all: bool,

    /// Configuration file
    #[arg(long, env = "HARMONIA_PATH_INFO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Overrides `store_dir` of the configuration
    #[arg(long)]
    pub store_dir: Option<String>,

    /// Overrides `db_path` of the configuration
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Space separated substituter URIs; overrides the configuration
    #[arg(long, value_delimiter = ' ')]
    pub substituters: Option<Vec<String>>,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

impl Args {
    pub fn request(&self) -> ReportRequest {
        ReportRequest {
            show_size: self.size,
            show_closure_size: self.closure_size,
            human_readable: self.human_readable,
            show_sigs: self.sigs,
            show_sub_status: self.filter_substitutable,
            json: self.json,
        }
    }

    /// Let command-line options take precedence over `config`.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(store_dir) = &self.store_dir {
            config.store_dir = store_dir.clone();
        }
        if let Some(db) = &self.db {
            config.db_path = db.clone();
        }
        if let Some(substituters) = &self.substituters {
            config.substituters = substituters
                .iter()
                .filter(|s| !s.is_empty())
                .cloned()
                .collect();
        }
    }
}
