//! Tests for argument parsing and configuration layering
