// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod event_id;
mod eventbus;
mod ledger_event;
mod record_id;
mod request_id;
mod reveal_target;
mod traits;

pub use event_id::*;
pub use eventbus::*;
pub use ledger_event::*;
pub use record_id::*;
pub use request_id::*;
pub use reveal_target::*;
pub use traits::*;
