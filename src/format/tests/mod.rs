//! Unit tests for label file formats.
