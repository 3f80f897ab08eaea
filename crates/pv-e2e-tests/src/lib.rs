//! End-to-end tests for procviz live in `tests/`; this crate has no library code.
