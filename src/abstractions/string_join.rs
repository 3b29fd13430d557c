use std::fmt::{Display, Write};

/// Join a list of things that can be displayed as string with a given separator. The standard library only offers
/// this for slices of strings (`[String]::join`), and we mostly have iterators of ids and names.
pub fn join_string<T: Display>(iter: impl Iterator<Item = T>, sep: &str) -> String {
  let mut joined = String::new();
  for (i, item) in iter.enumerate() {
    if i > 0 {
      joined.push_str(sep);
    }
    // Writing into a `String` cannot fail.
    let _ = write!(joined, "{}", item);
  }
  joined
}
