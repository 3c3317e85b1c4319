//! Shared test harness modules for the Stopwise CLI.

use super::*;

mod helpers;
