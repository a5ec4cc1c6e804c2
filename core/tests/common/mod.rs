// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Common test utilities for integration tests.
//!
//! This module provides in-memory fakes of both stores, which record every
//! mutating call and can be told to fail, and test data factories.


#[allow(unused_imports)]
pub use fixtures::{engine, seed_snapshot, snapshot, task, ts};
#[allow(unused_imports)]
pub use stores::{BrokenSnapshot, FakeLocal, FakeRemote};
