// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod capability;
mod handle;
mod proof;
mod reveal_delivered;

pub use capability::*;
pub use handle::*;
pub use proof::*;
pub use reveal_delivered::*;
