// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rollmark Print — delivers compiled label programs to the printer over the
// configured transport: a spooled copy to an OS printer share, a raw TCP
// socket, or a dedicated serial write. Every print is one shot: a failure
// is returned to the caller with the OS error text and nothing is retried
// behind their back.

pub mod dispatcher;
pub mod network;
pub mod serial;
pub mod shares;
pub mod usb_spool;

pub use dispatcher::dispatch;
pub use shares::shared_printers;
