// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! studio-core: shared types for the AI App Studio message bus

pub mod address;
pub mod clock;
pub mod envelope;
pub mod id;
pub mod tracking;
pub mod unit;

pub use address::{is_root_unit, mailbox_name, task_id_of, BUS, PMAI, ROOT_UNIT};
pub use clock::{iso8601, Clock, FakeClock, SystemClock};
pub use envelope::{Envelope, EnvelopeError, MessageKind, SpawnData};
pub use id::{envelope_id, hex_tag, sortable_stamp};
pub use tracking::{ChildRecord, ChildrenStatus, DocError, TaskBreakdown, TaskEntry};
pub use unit::{UnitRecord, UnitStatus};
