//! Test suites for the `relayd` supervisor.

mod support;
