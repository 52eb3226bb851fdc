//! Shared test harness modules for the Sleigh CLI.

use super::*;

mod helpers;
