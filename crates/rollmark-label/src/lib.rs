// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rollmark Label — compiles packaging records into printer-ready ZPL
// programs. The compiler builds a structured row table and draw-instruction
// list first; serialisation to the wire format happens in one isolated
// step, so the geometry logic is testable without parsing ZPL.

pub mod compiler;
pub mod zpl;

pub use compiler::{compile, LabelDocument, LabelRow};
pub use zpl::ZplBuilder;
