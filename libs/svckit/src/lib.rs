// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! svckit - Service Toolkit Library
//!
//! Small utilities for command-line programs and daemons: UUIDs,
//! hashing, LS_COLORS, CSV lines, sd_notify, process titles, emoji.

pub mod config;
pub mod cron;
pub mod csv;
pub mod emoji;
pub mod hash;
pub mod kv;
pub mod lscolors;
pub mod prefixed;
pub mod procname;
pub mod sdnotify;
pub mod uuid;

pub use config::{Config, ConfigFile};
pub use hash::{file_hash, jump_hash};
pub use kv::{Kv, Value};
pub use lscolors::LsColors;
pub use prefixed::PrefixedUuid;
pub use sdnotify::Notifier;
pub use uuid::{gen_uuid4, gen_uuid5, Uuid};
