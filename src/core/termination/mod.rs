/*!

Size-change termination checking for recursive groups.

A recursive group is checked in three stages.

 1. `extractor`: every call inside a member's compiled body to another member becomes a `CallMatrix`, using what
    the enclosing case splits say about each argument (`pattern_context`).
 2. `call_graph`: the matrices seed a graph that is completed under composition, keeping only the least
    informative matrices between each pair of vertices.
 3. `checker`: either the lexicographic search over a single function's self-loops (`behavior`) or an inspection of
    the self-loops of the completed graph decides the group.

*/

pub mod relation;
pub mod call_matrix;
pub mod call_graph;
pub mod behavior;
pub mod pattern_context;
pub mod extractor;
pub mod checker;

pub use relation::Relation;
pub use call_matrix::CallMatrix;
pub use call_graph::{CallGraph, Completion, Insertion};
pub use behavior::{find_lexicographic_order, RecursiveBehavior};
pub use pattern_context::{Elimination, PatternContext, Position};
pub use extractor::{CallExtractor, FunctionSource};
pub use checker::{check_completed_graph, check_self_loops, TerminationChecker, TerminationResult};
