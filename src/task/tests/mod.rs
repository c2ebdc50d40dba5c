//! Unit tests for task lifecycle reconciliation.
