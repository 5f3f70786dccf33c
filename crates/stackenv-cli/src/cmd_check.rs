// Copyright (c) Contributors to the stackenv project.
// SPDX-License-Identifier: Apache-2.0

//! Verify that a cache record still matches the package files.

use clap::Args;
use miette::Result;
use stackenv::cache::cache_record_path;
use stackenv::{CacheChangeKind, CacheRecord};

/// Verify an environment's cache record against the package files
#[derive(Debug, Args)]
pub struct CmdCheck {
    #[clap(flatten)]
    pub selection: crate::SelectionFlags,

    /// Exit with error on mismatch
    #[clap(long)]
    pub strict: bool,
}

impl CmdCheck {
    pub fn run(&mut self) -> Result<i32> {
        let ctx = self.selection.context(self.selection.request())?;
        let record_path = cache_record_path(&ctx.locations.script_file);

        if !record_path.exists() {
            if self.strict {
                return Err(miette::miette!("No cache record found at {:?}", record_path));
            }
            println!("Warning: No cache record found at {}", record_path.display());
            return Ok(2);
        }

        let record = CacheRecord::load(&record_path)?;
        let changes = stackenv::verify_cache(&record)?;

        if changes.is_empty() {
            println!("✓ Package files match the cache record");
            return Ok(0);
        }

        if self.strict {
            eprintln!("Error: Package files differ from the cache record:");
        } else {
            println!("Warning: Package files differ from the cache record:");
        }

        for change in &changes {
            match change.kind {
                CacheChangeKind::DescriptorChanged => {
                    println!("  - '{}' was modified", change.path.display());
                    if let Some(actual) = &change.actual {
                        println!("    Expected: {}", change.expected);
                        println!("    Actual:   {actual}");
                    }
                }
                CacheChangeKind::DescriptorRemoved => {
                    println!("  - '{}' was removed", change.path.display());
                }
            }
        }

        if self.strict {
            return Ok(1);
        }

        println!("\nRun 'stackenv env --cache-write' to refresh the cache record");
        Ok(0)
    }
}
