/*!

Ordering and type checking of definitions. `dependency_order` finds the units and cycles of the dependency graph and
delivers them in dependency order; `typechecking` acts on each delivery; `scheduler` ties the two together into
batches that either complete or are rolled back.

*/

pub mod dependency_order;
pub mod typechecking;
pub mod scheduler;


pub use dependency_order::DependencyOrder;
pub use typechecking::TypecheckingListener;
pub use scheduler::{BatchOutcome, Scheduler};
