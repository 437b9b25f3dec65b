// SPDX-License-Identifier: Apache-2.0

mod ttl;

pub use ttl::TtlCache;
