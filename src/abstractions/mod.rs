/*!

Types/type aliases that abstract over the implementing backing type.

Definition ids, cycle member sets and the names attached to definitions and parameters all go through this module,
so the rest of the crate never names `bit_set` or `string_cache` directly.

*/

mod nat_set;
mod string_join;

// Logging
pub mod log;

// A set of natural numbers
pub use nat_set::NatSet;

// Interned string.
pub use string_cache::DefaultAtom as IString;

// Join sequences with a separator
pub use string_join::join_string;
