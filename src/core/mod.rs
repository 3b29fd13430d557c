/*!

The algorithms: the ordering of definitions into units and cycles (`ordering`), and the termination check run on
recursive groups (`termination`).

*/

pub mod config;
pub mod format;
pub mod termination;
pub mod ordering;
